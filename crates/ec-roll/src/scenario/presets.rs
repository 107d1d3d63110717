//! Built-in scenario presets

use ec_stage::{Direction, GridIndex, HenColor, PipeKind, RollOutcome};

use super::{RollScenario, ScenarioExpectation};

/// Get all built-in presets
pub fn all_presets() -> Vec<RollScenario> {
    vec![
        straight_drop(),
        color_mismatch(),
        loop_revisit(),
        empty_path(),
        dry_supply(),
    ]
}

/// Look up a preset by name
pub fn preset(name: &str) -> Option<RollScenario> {
    all_presets().into_iter().find(|p| p.name == name)
}

fn baskets() -> Vec<Option<HenColor>> {
    vec![Some(HenColor::Red), Some(HenColor::Blue), None, Some(HenColor::Green)]
}

/// Three vertical pipes worth 10, 20 and 30 stacked over column 0
fn drop_column(scenario: &mut RollScenario) {
    for (id, (score, row)) in [(10, 2), (20, 1), (30, 0)].into_iter().enumerate() {
        let id = id as u64 + 1;
        scenario.add_segment(id, PipeKind::Vertical, score, GridIndex::new(0, row));
        scenario.add_step(id, Direction::Up, Direction::Down);
    }
}

/// Straight drop: three distinct pipes into the matching basket
pub fn straight_drop() -> RollScenario {
    let mut scenario = RollScenario::new("straight_drop", HenColor::Red, baskets());
    scenario.description = "Three pipes straight into a matching basket".to_string();
    drop_column(&mut scenario);
    scenario.supply.queue = vec![Some(PipeKind::Vertical); 3];
    scenario.expect = ScenarioExpectation {
        outcome: Some(RollOutcome::Success),
        awarded: Some(60),
        raw_score: Some(60),
        multiplier: Some(1),
        deleted: Some(3),
    };
    scenario
}

/// Color mismatch: same drop, wrong basket color
pub fn color_mismatch() -> RollScenario {
    let mut scenario = RollScenario::new("color_mismatch", HenColor::Blue, baskets());
    scenario.description = "Blue egg dropped into the red basket".to_string();
    drop_column(&mut scenario);
    scenario.supply.queue = vec![Some(PipeKind::Vertical); 3];
    scenario.expect = ScenarioExpectation {
        outcome: Some(RollOutcome::Fail),
        awarded: Some(0),
        raw_score: Some(60),
        multiplier: Some(0),
        deleted: Some(3),
    };
    scenario
}

/// Loop revisit: the egg crosses the top crossing twice
pub fn loop_revisit() -> RollScenario {
    let mut scenario = RollScenario::new("loop_revisit", HenColor::Blue, baskets());
    scenario.description = "Revisits a crossing once, doubling the score".to_string();
    scenario.add_segment(1, PipeKind::Cross, 10, GridIndex::new(1, 2));
    scenario.add_segment(2, PipeKind::Vertical, 20, GridIndex::new(1, 1));
    scenario.add_segment(3, PipeKind::Vertical, 30, GridIndex::new(1, 0));
    scenario.add_step(1, Direction::Up, Direction::Left);
    scenario.add_step(1, Direction::Right, Direction::Down);
    scenario.add_step(2, Direction::Up, Direction::Down);
    scenario.add_step(3, Direction::Up, Direction::Down);
    scenario.supply.queue = vec![Some(PipeKind::Cross), Some(PipeKind::Vertical)];
    scenario.expect = ScenarioExpectation {
        outcome: Some(RollOutcome::Success),
        awarded: Some(140),
        raw_score: Some(70),
        multiplier: Some(2),
        deleted: Some(3),
    };
    scenario
}

/// Empty path: silent failure
pub fn empty_path() -> RollScenario {
    let mut scenario = RollScenario::new("empty_path", HenColor::Green, baskets());
    scenario.description = "No path at all".to_string();
    scenario.expect = ScenarioExpectation {
        outcome: Some(RollOutcome::Fail),
        awarded: Some(0),
        raw_score: Some(0),
        multiplier: Some(0),
        deleted: Some(0),
    };
    scenario
}

/// Dry supply: the level runs out of replacements halfway
pub fn dry_supply() -> RollScenario {
    let mut scenario = RollScenario::new("dry_supply", HenColor::Red, baskets());
    scenario.description = "Replacement queue with gaps".to_string();
    drop_column(&mut scenario);
    scenario.supply.queue = vec![Some(PipeKind::Cross), None];
    scenario.expect = ScenarioExpectation {
        outcome: Some(RollOutcome::Success),
        awarded: Some(60),
        deleted: Some(3),
        ..ScenarioExpectation::default()
    };
    scenario
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_presets_valid() {
        let presets = all_presets();
        assert_eq!(presets.len(), 5);

        for preset in presets {
            assert!(!preset.name.is_empty());
            assert!(!preset.description.is_empty());
            assert!(preset.validate().is_ok(), "{} is invalid", preset.name);
            assert!(!preset.expect.is_empty());
        }
    }

    #[test]
    fn test_preset_lookup() {
        assert!(preset("loop_revisit").is_some_and(|p| p.path.len() == 4));
        assert!(preset("empty_path").is_some_and(|p| p.path.is_empty()));
        assert!(preset("nope").is_none());
    }

    #[test]
    fn test_loop_revisit_repeats_first_segment() {
        let scenario = loop_revisit();
        assert_eq!(scenario.path[0].segment, scenario.path[1].segment);
    }
}

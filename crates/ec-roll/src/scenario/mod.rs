//! Scenario System — Scripted boards for replaying a single roll
//!
//! A scenario describes everything a roll needs: the basket row, the pipe
//! segments on the board, the path through them, the egg color and the
//! replacement supply. Scenarios load from YAML and build into a path plus
//! a set of recording collaborators.
//!
//! ## Key Components
//!
//! - `RollScenario` — Serializable scenario description
//! - `ScenarioRun` — Built path, services and inspection handles
//! - `ScenarioExpectation` — Optional checks against the roll report
//!
//! ## Built-in Presets
//!
//! - `straight_drop` — Three pipes straight into a matching basket
//! - `color_mismatch` — Same drop into a basket of the wrong color
//! - `loop_revisit` — Revisits a crossing once, doubling the score
//! - `empty_path` — No path at all, silent failure
//! - `dry_supply` — Replacement queue with gaps

pub mod presets;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use ec_stage::{Direction, GridIndex, HenColor, PipeKind, RollOutcome, SegmentId};

use crate::board::{
    BasketRow, PipeTile, RecordingBoard, RecordingEmitter, ScriptedSupply, SeededSupply,
    SharedPlayState,
};
use crate::engine::RollReport;
use crate::path::{Path, PathStep};
use crate::services::{LevelSupply, PipeSegment, RollServices};
use crate::{RollError, RollResult};

/// A pipe placed on the scenario board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSpec {
    pub id: u64,
    pub kind: PipeKind,
    pub score: u32,
    pub at: GridIndex,
    #[serde(default = "destroyed_by_default")]
    pub destroy_on_roll: bool,
}

fn destroyed_by_default() -> bool {
    true
}

/// One path step, referencing a segment by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    pub segment: u64,
    pub enter: Direction,
    pub exit: Direction,
}

/// Replacement pipes offered by the level
///
/// A `seed` switches to seeded random replacements and ignores `queue`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SupplySpec {
    #[serde(default)]
    pub queue: Vec<Option<PipeKind>>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub budget: Option<u32>,
}

impl SupplySpec {
    fn build(&self) -> Box<dyn LevelSupply> {
        match self.seed {
            Some(seed) => {
                if !self.queue.is_empty() {
                    log::warn!("Supply seed set, ignoring {} queued pipes", self.queue.len());
                }
                let supply = SeededSupply::new(seed);
                match self.budget {
                    Some(budget) => Box::new(supply.with_budget(budget)),
                    None => Box::new(supply),
                }
            }
            None => Box::new(ScriptedSupply::new(self.queue.iter().copied())),
        }
    }
}

/// Checks applied to the report after the roll
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScenarioExpectation {
    #[serde(default)]
    pub outcome: Option<RollOutcome>,
    #[serde(default)]
    pub awarded: Option<u64>,
    #[serde(default)]
    pub raw_score: Option<u64>,
    #[serde(default)]
    pub multiplier: Option<u32>,
    #[serde(default)]
    pub deleted: Option<usize>,
}

impl ScenarioExpectation {
    /// Mismatches between the expectation and a report
    pub fn check(&self, report: &RollReport) -> Vec<String> {
        let mut mismatches = Vec::new();

        if let Some(outcome) = self.outcome.filter(|o| *o != report.outcome) {
            mismatches.push(format!("outcome: expected {outcome:?}, got {:?}", report.outcome));
        }
        let counts = [
            ("awarded", self.awarded, report.awarded),
            ("raw_score", self.raw_score, report.raw_score),
            ("multiplier", self.multiplier.map(u64::from), report.multiplier as u64),
            ("deleted", self.deleted.map(|d| d as u64), report.deleted.len() as u64),
        ];
        for (name, expected, actual) in counts {
            if let Some(expected) = expected.filter(|e| *e != actual) {
                mismatches.push(format!("{name}: expected {expected}, got {actual}"));
            }
        }

        mismatches
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Scripted roll scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollScenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub color: HenColor,
    /// Basket color per column, `~` for no basket
    pub baskets: Vec<Option<HenColor>>,
    #[serde(default)]
    pub segments: Vec<SegmentSpec>,
    #[serde(default)]
    pub path: Vec<StepSpec>,
    #[serde(default)]
    pub supply: SupplySpec,
    /// Eggs in the inventory
    #[serde(default = "default_eggs")]
    pub eggs: u32,
    #[serde(default)]
    pub expect: ScenarioExpectation,
}

fn default_eggs() -> u32 {
    3
}

/// A built scenario, ready to hand to an engine
pub struct ScenarioRun {
    pub path: Path,
    pub color: HenColor,
    pub services: RollServices,
    pub emitter: RecordingEmitter,
    pub board: RecordingBoard,
    pub baskets: BasketRow,
    pub play: SharedPlayState,
    pub tiles: Vec<Arc<PipeTile>>,
}

impl RollScenario {
    /// Create an empty scenario
    pub fn new(name: impl Into<String>, color: HenColor, baskets: Vec<Option<HenColor>>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            color,
            baskets,
            segments: Vec::new(),
            path: Vec::new(),
            supply: SupplySpec::default(),
            eggs: default_eggs(),
            expect: ScenarioExpectation::default(),
        }
    }

    /// Place a pipe on the board
    pub fn add_segment(&mut self, id: u64, kind: PipeKind, score: u32, at: GridIndex) {
        self.segments.push(SegmentSpec {
            id,
            kind,
            score,
            at,
            destroy_on_roll: true,
        });
    }

    /// Append a path step through segment `id`
    pub fn add_step(&mut self, segment: u64, enter: Direction, exit: Direction) {
        self.path.push(StepSpec {
            segment,
            enter,
            exit,
        });
    }

    /// Parse and validate a YAML scenario
    pub fn from_yaml(yaml: &str) -> RollResult<Self> {
        let scenario: Self = serde_yml::from_str(yaml)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load a YAML scenario file
    pub fn load(path: impl AsRef<std::path::Path>) -> RollResult<Self> {
        let path = path.as_ref();
        log::debug!("Loading scenario from {}", path.display());
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }

    pub fn to_yaml(&self) -> RollResult<String> {
        Ok(serde_yml::to_string(self)?)
    }

    /// Check segment ids and path references
    pub fn validate(&self) -> RollResult<()> {
        let mut cells = HashMap::new();
        let mut ids = HashMap::new();

        for segment in &self.segments {
            if ids.insert(segment.id, segment.at).is_some() {
                return Err(RollError::InvalidScenario(format!(
                    "duplicate segment id {}",
                    segment.id
                )));
            }
            if let Some(other) = cells.insert(segment.at, segment.id) {
                return Err(RollError::InvalidScenario(format!(
                    "segments {} and {} share cell {}",
                    other, segment.id, segment.at
                )));
            }
        }

        for (i, step) in self.path.iter().enumerate() {
            if !ids.contains_key(&step.segment) {
                return Err(RollError::InvalidScenario(format!(
                    "path step {} references unknown segment {}",
                    i, step.segment
                )));
            }
        }

        Ok(())
    }

    /// Build the path and a fresh set of recording collaborators
    pub fn build(&self) -> RollResult<ScenarioRun> {
        self.validate()?;

        let tiles: HashMap<u64, (GridIndex, Arc<PipeTile>)> = self
            .segments
            .iter()
            .map(|spec| {
                let tile = PipeTile::new(SegmentId(spec.id), spec.kind, spec.score, spec.at);
                let tile = if spec.destroy_on_roll {
                    tile
                } else {
                    tile.persistent()
                };
                (spec.id, (spec.at, Arc::new(tile)))
            })
            .collect();

        let mut path = Path::empty();
        for step in &self.path {
            let (at, tile) = tiles.get(&step.segment).cloned().ok_or_else(|| {
                RollError::InvalidScenario(format!("unknown segment {}", step.segment))
            })?;
            path.push(PathStep::new(tile, step.enter, step.exit, at));
        }

        let emitter = RecordingEmitter::new();
        let board = RecordingBoard::new();
        let baskets = BasketRow::new(self.baskets.clone());
        let play = SharedPlayState::new(self.eggs);

        let services = RollServices {
            emitter: Box::new(emitter.clone()),
            board: Box::new(board.clone()),
            baskets: Box::new(baskets.clone()),
            supply: self.supply.build(),
            play: Box::new(play.clone()),
        };

        let mut tiles: Vec<_> = tiles.into_values().map(|(_, tile)| tile).collect();
        tiles.sort_by_key(|t| t.id());

        Ok(ScenarioRun {
            path,
            color: self.color,
            services,
            emitter,
            board,
            baskets,
            play,
            tiles,
        })
    }
}

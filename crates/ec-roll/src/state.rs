//! RollState — the mutable record of one in-flight roll

use std::collections::HashSet;

use ec_stage::{GridIndex, HenColor, RollOutcome, SegmentId};

/// Result of scoring one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepScore {
    /// The segment had already been visited this roll
    pub revisit: bool,
    /// Multiplier after this step
    pub multiplier: u32,
    /// Raw score after this step
    pub raw_score: u64,
}

/// Score, multiplier and outcome of the active roll
#[derive(Debug, Clone)]
pub struct RollState {
    step_index: u32,
    raw_score: u64,
    multiplier: u32,
    visited: HashSet<SegmentId>,
    color: HenColor,
    outcome: RollOutcome,
}

impl RollState {
    /// Fresh state for a new roll
    pub fn new(color: HenColor) -> Self {
        Self {
            step_index: 0,
            raw_score: 0,
            multiplier: 1,
            visited: HashSet::new(),
            color,
            outcome: RollOutcome::Pending,
        }
    }

    /// Apply a step's points and revisit rule. Does not advance the step index.
    pub fn score_step(&mut self, segment: SegmentId, points: u32) -> StepScore {
        self.raw_score += points as u64;

        // insert() is false when the segment was already counted
        let revisit = !self.visited.insert(segment);
        if revisit {
            self.multiplier += 1;
        }

        StepScore {
            revisit,
            multiplier: self.multiplier,
            raw_score: self.raw_score,
        }
    }

    /// Mark the current step as complete
    pub fn advance_step(&mut self) {
        self.step_index += 1;
    }

    /// Zero the multiplier; a failed roll never awards points
    pub fn forfeit(&mut self) {
        self.multiplier = 0;
    }

    /// Write the terminal outcome. Returns false if already resolved.
    pub fn resolve(&mut self, outcome: RollOutcome) -> bool {
        if self.outcome.is_resolved() {
            log::warn!(
                "Roll outcome already {:?}, ignoring {:?}",
                self.outcome,
                outcome
            );
            return false;
        }
        self.outcome = outcome;
        true
    }

    pub fn step_index(&self) -> u32 {
        self.step_index
    }

    pub fn raw_score(&self) -> u64 {
        self.raw_score
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    /// raw score × multiplier
    pub fn effective_score(&self) -> u64 {
        self.raw_score * self.multiplier as u64
    }

    pub fn color(&self) -> HenColor {
        self.color
    }

    pub fn outcome(&self) -> RollOutcome {
        self.outcome
    }

    pub fn has_visited(&self, segment: SegmentId) -> bool {
        self.visited.contains(&segment)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

/// Cells already deleted during board mutation, in insertion order
#[derive(Debug, Clone, Default)]
pub struct DeletedIndexSet {
    order: Vec<GridIndex>,
    seen: HashSet<GridIndex>,
}

impl DeletedIndexSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the cell was already recorded
    pub fn insert(&mut self, at: GridIndex) -> bool {
        if !self.seen.insert(at) {
            return false;
        }
        self.order.push(at);
        true
    }

    pub fn contains(&self, at: GridIndex) -> bool {
        self.seen.contains(&at)
    }

    pub fn get(&self, index: usize) -> Option<GridIndex> {
        self.order.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = GridIndex> + '_ {
        self.order.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state() {
        let state = RollState::new(HenColor::Blue);
        assert_eq!(state.step_index(), 0);
        assert_eq!(state.raw_score(), 0);
        assert_eq!(state.multiplier(), 1);
        assert_eq!(state.visited_count(), 0);
        assert_eq!(state.color(), HenColor::Blue);
        assert_eq!(state.outcome(), RollOutcome::Pending);
    }

    #[test]
    fn test_revisit_increments_once_per_revisit() {
        let mut state = RollState::new(HenColor::Red);

        assert!(!state.has_visited(SegmentId(1)));
        let first = state.score_step(SegmentId(1), 10);
        assert!(!first.revisit);
        assert!(state.has_visited(SegmentId(1)));
        assert_eq!(first.multiplier, 1);

        let again = state.score_step(SegmentId(1), 10);
        assert!(again.revisit);
        assert_eq!(again.multiplier, 2);
        assert_eq!(state.effective_score(), 20 * 2);

        state.score_step(SegmentId(2), 5);
        assert_eq!(state.multiplier(), 2);

        let third = state.score_step(SegmentId(1), 10);
        assert_eq!(third.multiplier, 3);
        assert_eq!(third.raw_score, 35);
        assert_eq!(state.effective_score(), 105);
        assert_eq!(state.visited_count(), 2);
    }

    #[test]
    fn test_forfeit_zeroes_effective_score() {
        let mut state = RollState::new(HenColor::Green);
        state.score_step(SegmentId(7), 30);
        state.forfeit();
        assert_eq!(state.raw_score(), 30);
        assert_eq!(state.effective_score(), 0);
    }

    #[test]
    fn test_outcome_written_once() {
        let mut state = RollState::new(HenColor::Yellow);
        assert!(state.resolve(RollOutcome::Fail));
        assert!(!state.resolve(RollOutcome::Success));
        assert_eq!(state.outcome(), RollOutcome::Fail);
    }

    #[test]
    fn test_deleted_set_keeps_insertion_order() {
        let mut deleted = DeletedIndexSet::new();
        assert!(deleted.insert(GridIndex::new(2, 1)));
        assert!(deleted.insert(GridIndex::new(0, 3)));
        assert!(!deleted.insert(GridIndex::new(2, 1)));
        assert!(deleted.insert(GridIndex::new(1, 0)));

        let order: Vec<_> = deleted.iter().collect();
        assert_eq!(
            order,
            vec![GridIndex::new(2, 1), GridIndex::new(0, 3), GridIndex::new(1, 0)]
        );
        assert_eq!(deleted.len(), 3);
        assert!(deleted.contains(GridIndex::new(0, 3)));
        assert_eq!(deleted.get(3), None);
    }
}

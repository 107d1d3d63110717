//! Path — ordered steps an egg will traverse
//!
//! Produced by the external path planner, consumed once by a roll.

use std::fmt;
use std::sync::Arc;

use ec_stage::{Direction, GridIndex, SegmentId};

use crate::services::PipeSegment;

/// One step of a path
#[derive(Clone)]
pub struct PathStep {
    /// Segment the egg passes through (owned by the board)
    pub segment: Arc<dyn PipeSegment>,
    /// Side the egg enters from
    pub enter: Direction,
    /// Side the egg leaves towards
    pub exit: Direction,
    /// Cell of the segment
    pub at: GridIndex,
}

impl PathStep {
    pub fn new(
        segment: Arc<dyn PipeSegment>,
        enter: Direction,
        exit: Direction,
        at: GridIndex,
    ) -> Self {
        Self {
            segment,
            enter,
            exit,
            at,
        }
    }

    /// Identity of the traversed segment
    pub fn segment_id(&self) -> SegmentId {
        self.segment.id()
    }

    /// Does this step drop out of the bottom of the grid?
    pub fn exits_bottom(&self) -> bool {
        self.exit.is_down() && self.at.is_bottom_row()
    }
}

impl fmt::Debug for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathStep")
            .field("segment", &self.segment.id())
            .field("enter", &self.enter)
            .field("exit", &self.exit)
            .field("at", &self.at)
            .finish()
    }
}

/// Ordered, finite sequence of path steps
#[derive(Debug, Clone, Default)]
pub struct Path {
    steps: Vec<PathStep>,
}

impl Path {
    pub fn new(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: PathStep) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<&PathStep> {
        self.steps.get(index)
    }

    pub fn last(&self) -> Option<&PathStep> {
        self.steps.last()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathStep> {
        self.steps.iter()
    }

    /// Sum of segment points, counting revisits each time
    pub fn total_points(&self) -> u64 {
        self.steps.iter().map(|s| s.segment.score() as u64).sum()
    }
}

impl FromIterator<PathStep> for Path {
    fn from_iter<I: IntoIterator<Item = PathStep>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathStep;
    type IntoIter = std::slice::Iter<'a, PathStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::PipeTile;
    use ec_stage::PipeKind;

    fn step(id: u64, score: u32, at: GridIndex, exit: Direction) -> PathStep {
        let tile = Arc::new(PipeTile::new(SegmentId(id), PipeKind::Cross, score, at));
        PathStep::new(tile, Direction::Up, exit, at)
    }

    #[test]
    fn test_exits_bottom() {
        assert!(step(1, 10, GridIndex::new(2, 0), Direction::Down).exits_bottom());
        assert!(!step(1, 10, GridIndex::new(2, 1), Direction::Down).exits_bottom());
        assert!(!step(1, 10, GridIndex::new(2, 0), Direction::Left).exits_bottom());
    }

    #[test]
    fn test_path_points_and_order() {
        let path: Path = [
            step(1, 10, GridIndex::new(0, 2), Direction::Down),
            step(2, 20, GridIndex::new(0, 1), Direction::Down),
            step(1, 10, GridIndex::new(0, 2), Direction::Down),
        ]
        .into_iter()
        .collect();

        assert_eq!(path.len(), 3);
        assert_eq!(path.total_points(), 40);
        let ids: Vec<_> = path.iter().map(|s| s.segment_id().0).collect();
        assert_eq!(ids, vec![1, 2, 1]);
        assert!(format!("{:?}", path.last().unwrap()).contains("SegmentId(1)"));
        assert!(Path::empty().last().is_none());
    }
}

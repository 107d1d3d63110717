//! Reference collaborators
//!
//! Plain in-memory implementations of every capability in
//! [`crate::services`]. The CLI drives rolls with them and tests inspect
//! them. Recording types are cheap clones that share one journal, so a
//! caller can keep a clone after handing the original to the engine.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use ec_stage::{Direction, GridIndex, HenColor, PipeKind, SegmentId, WorldPos};

use crate::services::{
    BoardGateway, CollectionPoints, EventEmitter, LevelSupply, PipeSegment, PlayState, ScoreText,
};

/// Distance between neighbouring cells in world units
pub const CELL_SIZE: f32 = 1.0;

/// World position of a grid cell
pub fn cell_position(at: GridIndex) -> WorldPos {
    WorldPos::new(at.column as f32 * CELL_SIZE, at.row as f32 * CELL_SIZE)
}

// ═══════════════════════════════════════════════════════════════════════════
// PIPES
// ═══════════════════════════════════════════════════════════════════════════

/// A pipe tile placed on a grid cell
#[derive(Debug)]
pub struct PipeTile {
    id: SegmentId,
    kind: PipeKind,
    score: u32,
    position: WorldPos,
    destroy_on_roll: bool,
    entries: Mutex<Vec<Direction>>,
}

impl PipeTile {
    pub fn new(id: SegmentId, kind: PipeKind, score: u32, at: GridIndex) -> Self {
        Self {
            id,
            kind,
            score,
            position: cell_position(at),
            destroy_on_roll: true,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Tile that survives rolls (e.g. stone pipes)
    pub fn persistent(mut self) -> Self {
        self.destroy_on_roll = false;
        self
    }

    pub fn kind(&self) -> PipeKind {
        self.kind
    }

    /// Sides the egg entered from, in order
    pub fn entries(&self) -> Vec<Direction> {
        self.entries.lock().clone()
    }
}

impl PipeSegment for PipeTile {
    fn id(&self) -> SegmentId {
        self.id
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn position(&self) -> WorldPos {
        self.position
    }

    fn enter(&self, from: Direction) {
        if !self.kind.opens(from) {
            log::debug!("{} ({:?}) entered through closed side {:?}", self.id, self.kind, from);
        }
        self.entries.lock().push(from);
    }

    fn destroy_on_roll(&self) -> bool {
        self.destroy_on_roll
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// BASKETS
// ═══════════════════════════════════════════════════════════════════════════

/// Row of baskets under the grid, one optional basket per column
#[derive(Debug, Clone, Default)]
pub struct BasketRow {
    colors: Vec<Option<HenColor>>,
    falls: Arc<Mutex<Vec<(u32, HenColor)>>>,
}

impl BasketRow {
    pub fn new(colors: Vec<Option<HenColor>>) -> Self {
        Self {
            colors,
            falls: Arc::default(),
        }
    }

    /// Catch animations played so far: (column, color)
    pub fn falls(&self) -> Vec<(u32, HenColor)> {
        self.falls.lock().clone()
    }
}

impl CollectionPoints for BasketRow {
    fn color_of(&self, column: u32) -> Option<HenColor> {
        self.colors.get(column as usize).copied().flatten()
    }

    fn world_position(&self, column: u32) -> Option<WorldPos> {
        self.color_of(column)
            .map(|_| WorldPos::new(column as f32 * CELL_SIZE, -CELL_SIZE))
    }

    fn animate_fall(&mut self, column: u32, color: HenColor) {
        self.falls.lock().push((column, color));
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// LEVEL SUPPLY
// ═══════════════════════════════════════════════════════════════════════════

/// Replacement queue authored by the level. `None` entries are gaps.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSupply {
    queue: VecDeque<Option<PipeKind>>,
}

impl ScriptedSupply {
    pub fn new(queue: impl IntoIterator<Item = Option<PipeKind>>) -> Self {
        Self {
            queue: queue.into_iter().collect(),
        }
    }

    /// Supply that never has anything to place
    pub fn exhausted() -> Self {
        Self::default()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl LevelSupply for ScriptedSupply {
    fn next_replacement(&mut self) -> Option<PipeKind> {
        self.queue.pop_front().flatten()
    }
}

/// Seeded random replacements with per-kind weights
#[derive(Debug, Clone)]
pub struct SeededSupply {
    rng: ChaCha8Rng,
    weights: Vec<(PipeKind, u32)>,
    /// Pipes left before the level runs dry (None = endless)
    budget: Option<u32>,
}

impl SeededSupply {
    /// Uniform weights over every pipe kind
    pub fn new(seed: u64) -> Self {
        Self::with_weights(seed, PipeKind::ALL.iter().map(|k| (*k, 1)).collect())
    }

    pub fn with_weights(seed: u64, weights: Vec<(PipeKind, u32)>) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            weights,
            budget: None,
        }
    }

    /// Stop supplying after `budget` pipes
    pub fn with_budget(mut self, budget: u32) -> Self {
        self.budget = Some(budget);
        self
    }
}

impl LevelSupply for SeededSupply {
    fn next_replacement(&mut self) -> Option<PipeKind> {
        if let Some(budget) = self.budget.as_mut() {
            if *budget == 0 {
                return None;
            }
            *budget -= 1;
        }

        let total: u32 = self.weights.iter().map(|(_, w)| *w).sum();
        if total == 0 {
            return None;
        }

        let mut roll = self.rng.random_range(0..total);
        for (kind, weight) in &self.weights {
            if roll < *weight {
                return Some(*kind);
            }
            roll -= weight;
        }
        None
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// BOARD
// ═══════════════════════════════════════════════════════════════════════════

/// Grid operation received by [`RecordingBoard`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardOp {
    Delete(GridIndex),
    Spawn(GridIndex, PipeKind),
    ClearHighlight,
    ApplyHighlight,
}

#[derive(Debug, Default)]
struct BoardJournal {
    ops: Vec<BoardOp>,
    highlighted: bool,
}

/// Board gateway that records every operation
#[derive(Debug, Clone)]
pub struct RecordingBoard {
    journal: Arc<Mutex<BoardJournal>>,
}

impl RecordingBoard {
    /// New board with path highlighting on
    pub fn new() -> Self {
        Self {
            journal: Arc::new(Mutex::new(BoardJournal {
                ops: Vec::new(),
                highlighted: true,
            })),
        }
    }

    pub fn ops(&self) -> Vec<BoardOp> {
        self.journal.lock().ops.clone()
    }

    pub fn deletions(&self) -> Vec<GridIndex> {
        self.journal
            .lock()
            .ops
            .iter()
            .filter_map(|op| match op {
                BoardOp::Delete(at) => Some(*at),
                _ => None,
            })
            .collect()
    }

    pub fn spawns(&self) -> Vec<(GridIndex, PipeKind)> {
        self.journal
            .lock()
            .ops
            .iter()
            .filter_map(|op| match op {
                BoardOp::Spawn(at, kind) => Some((*at, *kind)),
                _ => None,
            })
            .collect()
    }

    pub fn is_highlighted(&self) -> bool {
        self.journal.lock().highlighted
    }
}

impl Default for RecordingBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardGateway for RecordingBoard {
    fn delete_segment_at(&mut self, at: GridIndex) {
        self.journal.lock().ops.push(BoardOp::Delete(at));
    }

    fn spawn_segment_at(&mut self, at: GridIndex, kind: PipeKind) {
        self.journal.lock().ops.push(BoardOp::Spawn(at, kind));
    }

    fn clear_highlight(&mut self) {
        let mut journal = self.journal.lock();
        journal.highlighted = false;
        journal.ops.push(BoardOp::ClearHighlight);
    }

    fn apply_highlight(&mut self) {
        let mut journal = self.journal.lock();
        journal.highlighted = true;
        journal.ops.push(BoardOp::ApplyHighlight);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// EMITTER
// ═══════════════════════════════════════════════════════════════════════════

/// Call received by [`RecordingEmitter`]
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    Text(ScoreText),
    Sound(String),
}

/// Emitter that records texts and sounds
#[derive(Debug, Clone, Default)]
pub struct RecordingEmitter {
    journal: Arc<Mutex<Vec<Emission>>>,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emissions(&self) -> Vec<Emission> {
        self.journal.lock().clone()
    }

    pub fn texts(&self) -> Vec<ScoreText> {
        self.journal
            .lock()
            .iter()
            .filter_map(|e| match e {
                Emission::Text(text) => Some(text.clone()),
                Emission::Sound(_) => None,
            })
            .collect()
    }

    pub fn sounds(&self) -> Vec<String> {
        self.journal
            .lock()
            .iter()
            .filter_map(|e| match e {
                Emission::Sound(clip) => Some(clip.clone()),
                Emission::Text(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.journal.lock().clear();
    }
}

impl EventEmitter for RecordingEmitter {
    fn emit_score_text(&mut self, text: ScoreText) {
        self.journal.lock().push(Emission::Text(text));
    }

    fn play_sound(&mut self, clip: &str) {
        self.journal.lock().push(Emission::Sound(clip.to_string()));
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PLAY STATE
// ═══════════════════════════════════════════════════════════════════════════

/// Snapshot of [`SharedPlayState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayCounters {
    pub rolling: bool,
    pub eggs_remaining: u32,
    pub eggs_consumed: u32,
    pub score: u64,
    pub rolls_completed: u32,
}

/// Rolling gate, egg inventory and score accumulator shared with the host
#[derive(Debug, Clone, Default)]
pub struct SharedPlayState {
    counters: Arc<Mutex<PlayCounters>>,
}

impl SharedPlayState {
    pub fn new(eggs: u32) -> Self {
        Self {
            counters: Arc::new(Mutex::new(PlayCounters {
                eggs_remaining: eggs,
                ..PlayCounters::default()
            })),
        }
    }

    pub fn snapshot(&self) -> PlayCounters {
        *self.counters.lock()
    }

    pub fn score(&self) -> u64 {
        self.counters.lock().score
    }

    pub fn has_eggs(&self) -> bool {
        self.counters.lock().eggs_remaining > 0
    }
}

impl PlayState for SharedPlayState {
    fn is_rolling(&self) -> bool {
        self.counters.lock().rolling
    }

    fn set_rolling(&mut self, rolling: bool) {
        self.counters.lock().rolling = rolling;
    }

    fn consume_egg(&mut self) {
        let mut counters = self.counters.lock();
        counters.eggs_remaining = counters.eggs_remaining.saturating_sub(1);
        counters.eggs_consumed += 1;
    }

    fn add_score(&mut self, amount: u64) {
        self.counters.lock().score += amount;
    }

    fn roll_completed(&mut self) {
        self.counters.lock().rolls_completed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipe_tile_records_entries() {
        let tile = PipeTile::new(SegmentId(4), PipeKind::Vertical, 15, GridIndex::new(2, 3));
        assert_eq!(tile.position(), WorldPos::new(2.0, 3.0));
        assert!(tile.destroy_on_roll());

        tile.enter(Direction::Up);
        tile.enter(Direction::Left);
        assert_eq!(tile.entries(), vec![Direction::Up, Direction::Left]);
        assert!(!tile.persistent().destroy_on_roll());
    }

    #[test]
    fn test_basket_row_lookup() {
        let mut baskets = BasketRow::new(vec![Some(HenColor::Red), None, Some(HenColor::Blue)]);
        assert_eq!(baskets.color_of(0), Some(HenColor::Red));
        assert_eq!(baskets.color_of(1), None);
        assert_eq!(baskets.color_of(9), None);
        assert_eq!(baskets.world_position(2), Some(WorldPos::new(2.0, -1.0)));
        assert_eq!(baskets.world_position(1), None);

        let shared = baskets.clone();
        baskets.animate_fall(2, HenColor::Blue);
        assert_eq!(shared.falls(), vec![(2, HenColor::Blue)]);
    }

    #[test]
    fn test_scripted_supply_gaps() {
        let mut supply = ScriptedSupply::new([Some(PipeKind::Cross), None, Some(PipeKind::UpLeft)]);
        assert_eq!(supply.next_replacement(), Some(PipeKind::Cross));
        assert_eq!(supply.next_replacement(), None);
        assert_eq!(supply.next_replacement(), Some(PipeKind::UpLeft));
        assert_eq!(supply.next_replacement(), None);
        assert_eq!(supply.remaining(), 0);
    }

    #[test]
    fn test_seeded_supply_is_deterministic() {
        let mut a = SeededSupply::new(42);
        let mut b = SeededSupply::new(42);
        let first: Vec<_> = (0..16).map(|_| a.next_replacement()).collect();
        let second: Vec<_> = (0..16).map(|_| b.next_replacement()).collect();
        assert_eq!(first, second);
        assert!(first.iter().all(Option::is_some));
    }

    #[test]
    fn test_seeded_supply_budget_and_weights() {
        let mut supply =
            SeededSupply::with_weights(7, vec![(PipeKind::Vertical, 1), (PipeKind::Cross, 0)])
                .with_budget(2);
        assert_eq!(supply.next_replacement(), Some(PipeKind::Vertical));
        assert_eq!(supply.next_replacement(), Some(PipeKind::Vertical));
        assert_eq!(supply.next_replacement(), None);

        let mut empty = SeededSupply::with_weights(7, Vec::new());
        assert_eq!(empty.next_replacement(), None);
    }

    #[test]
    fn test_recording_board_highlight() {
        let mut board = RecordingBoard::new();
        let view = board.clone();
        board.clear_highlight();
        assert!(!view.is_highlighted());
        board.delete_segment_at(GridIndex::new(1, 1));
        board.spawn_segment_at(GridIndex::new(1, 1), PipeKind::Horizontal);
        board.apply_highlight();

        assert!(view.is_highlighted());
        assert_eq!(view.deletions(), vec![GridIndex::new(1, 1)]);
        assert_eq!(view.spawns(), vec![(GridIndex::new(1, 1), PipeKind::Horizontal)]);
        assert_eq!(view.ops().len(), 4);
    }

    #[test]
    fn test_shared_play_state() {
        let mut play = SharedPlayState::new(1);
        let view = play.clone();
        play.set_rolling(true);
        play.consume_egg();
        play.consume_egg();
        play.add_score(60);
        play.roll_completed();

        let counters = view.snapshot();
        assert!(counters.rolling);
        assert_eq!(counters.eggs_remaining, 0);
        assert_eq!(counters.eggs_consumed, 2);
        assert_eq!(counters.score, 60);
        assert_eq!(counters.rolls_completed, 1);
        assert!(!view.has_eggs());
    }
}

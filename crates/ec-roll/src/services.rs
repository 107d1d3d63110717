//! Collaborator capabilities the roll engine calls
//!
//! The engine owns none of the systems behind these traits. It receives
//! them once, at construction, bundled in [`RollServices`].

use ec_stage::{
    Direction, GridIndex, HenColor, PipeKind, SegmentId, TextColor, TextStyle, WorldPos,
};

/// A pipe segment on the board
///
/// Implementations are shared with the board, so `enter` takes `&self`.
pub trait PipeSegment: Send + Sync {
    /// Stable identity used for revisit detection
    fn id(&self) -> SegmentId;

    /// Points awarded each time the egg passes through
    fn score(&self) -> u32;

    /// World position the egg moves to while inside this segment
    fn position(&self) -> WorldPos;

    /// Egg entered from the given side
    fn enter(&self, from: Direction);

    /// Should this segment be removed once the roll completes?
    fn destroy_on_roll(&self) -> bool;
}

/// Floating score text request
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreText {
    pub text: String,
    pub position: WorldPos,
    pub color: TextColor,
    pub size: f32,
    pub style: TextStyle,
}

/// Text and audio dispatch
///
/// Calls never fail from the engine's point of view.
pub trait EventEmitter {
    fn emit_score_text(&mut self, text: ScoreText);

    fn play_sound(&mut self, clip: &str);
}

/// Grid operations used during board mutation
pub trait BoardGateway {
    fn delete_segment_at(&mut self, at: GridIndex);

    fn spawn_segment_at(&mut self, at: GridIndex, kind: PipeKind);

    fn clear_highlight(&mut self);

    fn apply_highlight(&mut self);
}

/// Source of replacement pipes for the current level
pub trait LevelSupply {
    /// Next pipe kind to spawn, `None` when the level has nothing to place
    fn next_replacement(&mut self) -> Option<PipeKind>;
}

/// The basket row under the grid
pub trait CollectionPoints {
    /// Color of the basket under a column, if there is one
    fn color_of(&self, column: u32) -> Option<HenColor>;

    /// World position of the basket under a column
    fn world_position(&self, column: u32) -> Option<WorldPos>;

    /// Play the catch animation
    fn animate_fall(&mut self, column: u32, color: HenColor);
}

/// Game-wide flags and counters
pub trait PlayState {
    /// Is a roll holding the rolling gate?
    fn is_rolling(&self) -> bool;

    fn set_rolling(&mut self, rolling: bool);

    /// One egg taken from the inventory
    fn consume_egg(&mut self);

    fn add_score(&mut self, amount: u64);

    /// A roll reached its outcome
    fn roll_completed(&mut self);
}

/// Everything the engine talks to, injected at construction
pub struct RollServices {
    pub emitter: Box<dyn EventEmitter>,
    pub board: Box<dyn BoardGateway>,
    pub baskets: Box<dyn CollectionPoints>,
    pub supply: Box<dyn LevelSupply>,
    pub play: Box<dyn PlayState>,
}

impl RollServices {
    pub fn new(
        emitter: impl EventEmitter + 'static,
        board: impl BoardGateway + 'static,
        baskets: impl CollectionPoints + 'static,
        supply: impl LevelSupply + 'static,
        play: impl PlayState + 'static,
    ) -> Self {
        Self {
            emitter: Box::new(emitter),
            board: Box::new(board),
            baskets: Box::new(baskets),
            supply: Box::new(supply),
            play: Box::new(play),
        }
    }
}

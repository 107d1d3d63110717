//! Stage Taxonomy — Enums and small value types for board elements
//!
//! Colors, directions, grid coordinates and pipe kinds shared by the roll
//! engine, its collaborators and recorded traces.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Hen / basket color an egg must be collected into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HenColor {
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
}

impl HenColor {
    /// All colors in declaration order
    pub const ALL: [HenColor; 5] = [
        Self::Red,
        Self::Green,
        Self::Blue,
        Self::Yellow,
        Self::Purple,
    ];

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Green => "Green",
            Self::Blue => "Blue",
            Self::Yellow => "Yellow",
            Self::Purple => "Purple",
        }
    }
}

/// Direction an egg enters or leaves a pipe segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Opposite direction
    pub fn opposite(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Is this the downward direction (towards the basket row)?
    pub fn is_down(&self) -> bool {
        matches!(self, Self::Down)
    }
}

/// Grid coordinate of a pipe cell
///
/// Row 0 is the bottom row, directly above the baskets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridIndex {
    pub column: u32,
    pub row: u32,
}

impl GridIndex {
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Is this cell on the bottom row?
    pub fn is_bottom_row(&self) -> bool {
        self.row == 0
    }
}

impl fmt::Display for GridIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Stable identity of a pipe segment, used for revisit detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(pub u64);

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pipe#{}", self.0)
    }
}

/// Kind of pipe that can be spawned into a cell
///
/// Named after the two openings of the pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipeKind {
    Vertical,
    Horizontal,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
    Cross,
}

impl PipeKind {
    /// All pipe kinds in declaration order
    pub const ALL: [PipeKind; 7] = [
        Self::Vertical,
        Self::Horizontal,
        Self::UpLeft,
        Self::UpRight,
        Self::DownLeft,
        Self::DownRight,
        Self::Cross,
    ];

    /// Does this pipe have an opening on the given side?
    pub fn opens(&self, side: Direction) -> bool {
        use Direction::*;
        match self {
            Self::Vertical => matches!(side, Up | Down),
            Self::Horizontal => matches!(side, Left | Right),
            Self::UpLeft => matches!(side, Up | Left),
            Self::UpRight => matches!(side, Up | Right),
            Self::DownLeft => matches!(side, Down | Left),
            Self::DownRight => matches!(side, Down | Right),
            Self::Cross => true,
        }
    }
}

/// Fade style of a floating score text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyle {
    #[default]
    Normal,
    Multiplier,
    Loss,
    Success,
}

/// RGBA text color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl TextColor {
    pub const WHITE: TextColor = TextColor::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

impl Default for TextColor {
    fn default() -> Self {
        Self::WHITE
    }
}

/// World-space position (board units)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Terminal state of a roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollOutcome {
    #[default]
    Pending,
    Success,
    Fail,
}

impl RollOutcome {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Sprite shown by a pooled egg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EggSprite {
    #[default]
    Egg,
    /// Broken egg, shown after a failed roll
    Yolk,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipe_openings() {
        assert!(PipeKind::Vertical.opens(Direction::Down));
        assert!(!PipeKind::Vertical.opens(Direction::Left));
        assert!(PipeKind::DownRight.opens(Direction::Right));
        assert!(PipeKind::ALL.iter().all(|k| {
            [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
                .iter()
                .filter(|d| k.opens(**d))
                .count()
                >= 2
        }));
    }

    #[test]
    fn test_grid_index_bottom_row() {
        assert!(GridIndex::new(3, 0).is_bottom_row());
        assert!(!GridIndex::new(0, 1).is_bottom_row());
        assert_eq!(GridIndex::new(2, 5).to_string(), "(2, 5)");
    }

    #[test]
    fn test_text_color_alpha_default() {
        let color: TextColor = serde_json::from_str(r#"{"r":10,"g":20,"b":30}"#).unwrap();
        assert_eq!(color, TextColor::rgb(10, 20, 30));
    }

    #[test]
    fn test_direction_opposite() {
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Left.opposite().opposite(), Direction::Left);
        assert!(Direction::Down.is_down());
    }
}

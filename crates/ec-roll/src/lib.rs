//! # ec-roll — Egg Roll Engine
//!
//! Resolves one egg roll at a time: walks a precomputed path through the
//! pipe grid, accrues score and a revisit multiplier, resolves the roll
//! against the basket row, then removes consumed pipes and requests
//! replacements before handing control back to the game loop.
//!
//! ## Architecture
//!
//! ```text
//! RollEngine
//!     │
//!     ├── RollConfig (timing, sounds, text, dead bonus config)
//!     ├── RollServices (emitter, board, baskets, supply, play state)
//!     └── EggPool (handle arena of egg visuals)
//!           │
//!           v
//!     start_roll(Path, HenColor) → resume(dt)… → RollReport + RollTrace
//! ```
//!
//! The engine never sleeps. Every timed delay of a roll is a suspension
//! point; the host advances simulated time with [`RollEngine::resume`].

pub mod board;
pub mod config;
pub mod engine;
pub mod path;
pub mod pool;
pub mod scenario;
pub mod services;
pub mod state;
pub mod timing;

pub use board::*;
pub use config::*;
pub use engine::*;
pub use path::*;
pub use pool::*;
pub use scenario::*;
pub use services::*;
pub use state::*;
pub use timing::*;

pub use ec_stage as stage;

use thiserror::Error;

/// Roll engine error types
#[derive(Debug, Error)]
pub enum RollError {
    #[error("A roll is already in progress")]
    RollInProgress,

    #[error("Stale egg handle: {0}")]
    StaleHandle(EggHandle),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yml::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type RollResult<T> = Result<T, RollError>;

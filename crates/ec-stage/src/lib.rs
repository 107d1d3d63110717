//! # ec-stage — Egg Collector Stage System
//!
//! Defines the canonical moments of an egg roll. Traces hold STAGES, never
//! audio or UI calls.
//!
//! ## Philosophy
//!
//! Every roll, regardless of board layout, passes through the same phases:
//! - Roll starts → Pipes entered → Outcome resolved → Board mutated → Roll ends
//!
//! This crate defines those stages, the shared taxonomy (colors, directions,
//! grid coordinates, pipe kinds) and timed traces of stage events.

pub mod event;
pub mod stage;
pub mod taxonomy;
pub mod trace;

pub use event::*;
pub use stage::*;
pub use taxonomy::*;
pub use trace::*;

use thiserror::Error;

/// Stage system error types
#[derive(Debug, Error)]
pub enum StageError {
    #[error("Event {index} at {timestamp_ms}ms is earlier than previous event at {previous_ms}ms")]
    OutOfOrder {
        index: usize,
        previous_ms: f64,
        timestamp_ms: f64,
    },

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type StageResult<T> = Result<T, StageError>;

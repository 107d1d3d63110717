//! Stage — The core enum defining all canonical roll moments
//!
//! A Stage is NOT an animation and NOT a collaborator call.
//! A Stage is the SEMANTIC MEANING of a moment in the roll flow.

use serde::{Deserialize, Serialize};

use crate::taxonomy::{
    Direction, GridIndex, HenColor, PipeKind, RollOutcome, SegmentId, TextColor, TextStyle,
    WorldPos,
};

/// Canonical roll stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stage {
    // ═══════════════════════════════════════════════════════════════════════
    // ROLL LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════
    /// Egg taken from inventory, rolling gate closed
    RollStart {
        color: HenColor,
        path_len: u32,
    },

    /// Rolling gate opened, egg returned to its pool
    RollEnd,

    // ═══════════════════════════════════════════════════════════════════════
    // TRAVERSAL
    // ═══════════════════════════════════════════════════════════════════════
    /// Egg moved to a new world position
    EggMove { position: WorldPos },

    /// Egg entered a pipe segment
    PipeEnter {
        segment: SegmentId,
        at: GridIndex,
        from: Direction,
    },

    /// Raw score grew by a step's points
    StepScored {
        step_index: u32,
        points: u32,
        raw_score: u64,
    },

    /// Segment revisited, multiplier raised
    MultiplierUp { multiplier: u32 },

    // ═══════════════════════════════════════════════════════════════════════
    // PRESENTATION
    // ═══════════════════════════════════════════════════════════════════════
    /// Floating score text requested
    ScoreText {
        text: String,
        position: WorldPos,
        color: TextColor,
        size: f32,
        style: TextStyle,
    },

    /// Sound clip requested
    Sound { clip: String },

    // ═══════════════════════════════════════════════════════════════════════
    // RESOLUTION
    // ═══════════════════════════════════════════════════════════════════════
    /// Egg dropped into a matching basket
    BasketFall { column: u32, color: HenColor },

    /// Effective score handed to the score accumulator
    ScoreAwarded { amount: u64 },

    /// Outcome written
    RollResolved {
        outcome: RollOutcome,
        raw_score: u64,
        multiplier: u32,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // BOARD MUTATION
    // ═══════════════════════════════════════════════════════════════════════
    /// Path highlighting cleared before mutation
    HighlightCleared,

    /// Consumed pipe removed
    PipeDeleted { at: GridIndex },

    /// Replacement pipe installed
    PipeSpawned { at: GridIndex, kind: PipeKind },

    /// Level supply had nothing to place
    SpawnSkipped { at: GridIndex },

    /// Path highlighting restored after mutation
    HighlightApplied,
}

impl Stage {
    /// Get stage category
    pub fn category(&self) -> StageCategory {
        match self {
            Stage::RollStart { .. } | Stage::RollEnd => StageCategory::RollLifecycle,

            Stage::EggMove { .. }
            | Stage::PipeEnter { .. }
            | Stage::StepScored { .. }
            | Stage::MultiplierUp { .. } => StageCategory::Traversal,

            Stage::ScoreText { .. } | Stage::Sound { .. } => StageCategory::Presentation,

            Stage::BasketFall { .. } | Stage::ScoreAwarded { .. } | Stage::RollResolved { .. } => {
                StageCategory::Resolution
            }

            Stage::HighlightCleared
            | Stage::PipeDeleted { .. }
            | Stage::PipeSpawned { .. }
            | Stage::SpawnSkipped { .. }
            | Stage::HighlightApplied => StageCategory::BoardMutation,
        }
    }

    /// Get stage type name (snake_case, matches serde tag)
    pub fn type_name(&self) -> &'static str {
        match self {
            Stage::RollStart { .. } => "roll_start",
            Stage::RollEnd => "roll_end",
            Stage::EggMove { .. } => "egg_move",
            Stage::PipeEnter { .. } => "pipe_enter",
            Stage::StepScored { .. } => "step_scored",
            Stage::MultiplierUp { .. } => "multiplier_up",
            Stage::ScoreText { .. } => "score_text",
            Stage::Sound { .. } => "sound",
            Stage::BasketFall { .. } => "basket_fall",
            Stage::ScoreAwarded { .. } => "score_awarded",
            Stage::RollResolved { .. } => "roll_resolved",
            Stage::HighlightCleared => "highlight_cleared",
            Stage::PipeDeleted { .. } => "pipe_deleted",
            Stage::PipeSpawned { .. } => "pipe_spawned",
            Stage::SpawnSkipped { .. } => "spawn_skipped",
            Stage::HighlightApplied => "highlight_applied",
        }
    }

    /// Is this stage delivered to the event emitter (text or sound)?
    pub fn is_emitted(&self) -> bool {
        self.category() == StageCategory::Presentation
    }
}

/// Stage category for grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageCategory {
    RollLifecycle,
    Traversal,
    Presentation,
    Resolution,
    BoardMutation,
}

impl StageCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::RollLifecycle => "Roll Lifecycle",
            Self::Traversal => "Traversal",
            Self::Presentation => "Text/Sound",
            Self::Resolution => "Resolution",
            Self::BoardMutation => "Board Mutation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_serialization() {
        let stage = Stage::PipeDeleted {
            at: GridIndex::new(2, 0),
        };
        let json = serde_json::to_string(&stage).unwrap();
        assert!(json.contains("pipe_deleted"));
        assert!(json.contains("column"));

        let deserialized: Stage = serde_json::from_str(&json).unwrap();
        assert_eq!(stage, deserialized);
    }

    #[test]
    fn test_type_name_matches_serde_tag() {
        let stages = [
            Stage::RollEnd,
            Stage::MultiplierUp { multiplier: 2 },
            Stage::Sound {
                clip: "pop".into(),
            },
            Stage::SpawnSkipped {
                at: GridIndex::new(0, 0),
            },
        ];
        for stage in stages {
            let json = serde_json::to_value(&stage).unwrap();
            assert_eq!(json["type"], stage.type_name());
        }
    }

    #[test]
    fn test_stage_category() {
        assert_eq!(Stage::RollEnd.category(), StageCategory::RollLifecycle);
        assert_eq!(
            Stage::MultiplierUp { multiplier: 3 }.category(),
            StageCategory::Traversal
        );
        assert!(Stage::Sound { clip: "x".into() }.is_emitted());
        assert!(!Stage::HighlightApplied.is_emitted());
    }
}

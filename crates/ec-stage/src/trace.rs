//! RollTrace — A complete sequence of stage events for one roll
//!
//! A trace captures the full timeline of a roll, from the egg leaving the
//! inventory to the egg returning to its pool.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::StageEvent;
use crate::stage::{Stage, StageCategory};
use crate::taxonomy::{GridIndex, PipeKind, RollOutcome};
use crate::{StageError, StageResult};

/// A complete trace of stage events for one roll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollTrace {
    /// Unique identifier for this trace
    pub trace_id: String,

    /// Level or board identifier
    #[serde(default)]
    pub board_id: Option<String>,

    /// All events in chronological order
    pub events: Vec<StageEvent>,

    /// When this trace was recorded
    pub recorded_at: DateTime<Utc>,

    /// Custom metadata
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl RollTrace {
    /// Create a new empty trace
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            board_id: None,
            events: Vec::new(),
            recorded_at: Utc::now(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Set board ID
    pub fn with_board(mut self, board_id: impl Into<String>) -> Self {
        self.board_id = Some(board_id.into());
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Add an event to the trace
    pub fn push(&mut self, event: StageEvent) {
        self.events.push(event);
    }

    /// Add an event, rejecting it if it would go back in time
    pub fn try_push(&mut self, event: StageEvent) -> StageResult<()> {
        if let Some(last) = self.events.last() {
            if event.timestamp_ms < last.timestamp_ms {
                return Err(StageError::OutOfOrder {
                    index: self.events.len(),
                    previous_ms: last.timestamp_ms,
                    timestamp_ms: event.timestamp_ms,
                });
            }
        }
        self.events.push(event);
        Ok(())
    }

    /// Parse a trace from JSON
    pub fn from_json(json: &str) -> StageResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> StageResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get total duration in milliseconds
    pub fn duration_ms(&self) -> f64 {
        match (self.events.first(), self.events.last()) {
            (Some(first), Some(last)) => last.timestamp_ms - first.timestamp_ms,
            _ => 0.0,
        }
    }

    /// Get events by category
    pub fn events_by_category(&self, category: StageCategory) -> Vec<&StageEvent> {
        self.events
            .iter()
            .filter(|e| e.stage.category() == category)
            .collect()
    }

    /// Get events by stage type name
    pub fn events_by_type(&self, type_name: &str) -> Vec<&StageEvent> {
        self.events
            .iter()
            .filter(|e| e.stage.type_name() == type_name)
            .collect()
    }

    /// Check if trace contains a specific stage type
    pub fn has_stage(&self, type_name: &str) -> bool {
        self.events.iter().any(|e| e.stage.type_name() == type_name)
    }

    /// Events that reached the text/sound emitter
    pub fn emitted(&self) -> Vec<&StageEvent> {
        self.events.iter().filter(|e| e.stage.is_emitted()).collect()
    }

    /// Clips requested, in order
    pub fn sounds(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match &e.stage {
                Stage::Sound { clip } => Some(clip.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Deleted coordinates, in order
    pub fn deletions(&self) -> Vec<GridIndex> {
        self.events
            .iter()
            .filter_map(|e| match e.stage {
                Stage::PipeDeleted { at } => Some(at),
                _ => None,
            })
            .collect()
    }

    /// Spawned pipes, in order
    pub fn spawns(&self) -> Vec<(GridIndex, PipeKind)> {
        self.events
            .iter()
            .filter_map(|e| match e.stage {
                Stage::PipeSpawned { at, kind } => Some((at, kind)),
                _ => None,
            })
            .collect()
    }

    /// Outcome recorded in the trace
    pub fn outcome(&self) -> RollOutcome {
        self.events
            .iter()
            .rev()
            .find_map(|e| match e.stage {
                Stage::RollResolved { outcome, .. } => Some(outcome),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Points handed to the score accumulator
    pub fn awarded(&self) -> u64 {
        self.events
            .iter()
            .filter_map(|e| match e.stage {
                Stage::ScoreAwarded { amount } => Some(amount),
                _ => None,
            })
            .sum()
    }

    /// Highest multiplier reached during traversal
    pub fn peak_multiplier(&self) -> u32 {
        self.events
            .iter()
            .filter_map(|e| match e.stage {
                Stage::MultiplierUp { multiplier } => Some(multiplier),
                _ => None,
            })
            .max()
            .unwrap_or(1)
    }

    /// Validate trace has required stages
    pub fn validate(&self) -> TraceValidation {
        let deletions = self.deletions();
        let mut unique = deletions.clone();
        unique.sort();
        unique.dedup();

        TraceValidation {
            has_roll_start: self.has_stage("roll_start"),
            has_roll_end: self.has_stage("roll_end"),
            is_resolved: self.outcome().is_resolved(),
            is_chronological: self
                .events
                .windows(2)
                .all(|w| w[0].timestamp_ms <= w[1].timestamp_ms),
            duplicate_deletions: deletions.len() - unique.len(),
            ends_with_roll_end: self
                .events
                .last()
                .is_some_and(|e| matches!(e.stage, Stage::RollEnd)),
        }
    }

    /// Get summary of trace
    pub fn summary(&self) -> TraceSummary {
        TraceSummary {
            trace_id: self.trace_id.clone(),
            event_count: self.events.len(),
            emitted_count: self.emitted().len(),
            duration_ms: self.duration_ms(),
            outcome: self.outcome(),
            awarded: self.awarded(),
            peak_multiplier: self.peak_multiplier(),
            deleted: self.deletions().len(),
            spawned: self.spawns().len(),
        }
    }
}

/// Validation result for a trace
#[derive(Debug, Clone, Default)]
pub struct TraceValidation {
    pub has_roll_start: bool,
    pub has_roll_end: bool,
    pub is_resolved: bool,
    pub is_chronological: bool,
    pub duplicate_deletions: usize,
    pub ends_with_roll_end: bool,
}

impl TraceValidation {
    /// Check if trace is valid (has all required elements)
    pub fn is_valid(&self) -> bool {
        self.has_roll_start
            && self.has_roll_end
            && self.is_resolved
            && self.is_chronological
            && self.duplicate_deletions == 0
            && self.ends_with_roll_end
    }

    /// Get list of warnings
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();

        if !self.has_roll_start {
            warnings.push("Missing ROLL_START event");
        }
        if !self.has_roll_end {
            warnings.push("Missing ROLL_END event");
        }
        if !self.is_resolved {
            warnings.push("Roll never resolved");
        }
        if !self.is_chronological {
            warnings.push("Events are not in chronological order");
        }
        if self.duplicate_deletions > 0 {
            warnings.push("A cell was deleted more than once");
        }
        if self.has_roll_end && !self.ends_with_roll_end {
            warnings.push("Events recorded after ROLL_END");
        }

        warnings
    }
}

/// Summary of a trace for quick overview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceSummary {
    pub trace_id: String,
    pub event_count: usize,
    pub emitted_count: usize,
    pub duration_ms: f64,
    pub outcome: RollOutcome,
    pub awarded: u64,
    pub peak_multiplier: u32,
    pub deleted: usize,
    pub spawned: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::HenColor;

    fn create_basic_trace() -> RollTrace {
        let mut trace = RollTrace::new("roll-000001").with_board("meadow-01");

        trace.push(StageEvent::new(
            Stage::RollStart {
                color: HenColor::Red,
                path_len: 2,
            },
            0.0,
        ));
        trace.push(StageEvent::new(Stage::Sound { clip: "point_0".into() }, 500.0));
        trace.push(StageEvent::new(Stage::MultiplierUp { multiplier: 2 }, 1000.0));
        trace.push(StageEvent::new(Stage::ScoreAwarded { amount: 40 }, 1920.0));
        trace.push(StageEvent::new(
            Stage::RollResolved {
                outcome: RollOutcome::Success,
                raw_score: 20,
                multiplier: 2,
            },
            2420.0,
        ));
        trace.push(StageEvent::new(
            Stage::PipeDeleted {
                at: GridIndex::new(0, 1),
            },
            2420.0,
        ));
        trace.push(StageEvent::new(
            Stage::PipeSpawned {
                at: GridIndex::new(0, 1),
                kind: PipeKind::Cross,
            },
            2520.0,
        ));
        trace.push(StageEvent::new(Stage::RollEnd, 2620.0));

        trace
    }

    #[test]
    fn test_trace_queries() {
        let trace = create_basic_trace();

        assert_eq!(trace.len(), 8);
        assert_eq!(trace.duration_ms(), 2620.0);
        assert_eq!(trace.outcome(), RollOutcome::Success);
        assert_eq!(trace.awarded(), 40);
        assert_eq!(trace.peak_multiplier(), 2);
        assert_eq!(trace.sounds(), vec!["point_0"]);
        assert_eq!(trace.deletions(), vec![GridIndex::new(0, 1)]);
        assert_eq!(trace.spawns().len(), 1);
        assert_eq!(trace.emitted().len(), 1);
    }

    #[test]
    fn test_trace_validation() {
        let trace = create_basic_trace();
        let validation = trace.validate();
        assert!(validation.is_valid(), "{:?}", validation.warnings());

        let mut broken = trace.clone();
        broken.push(StageEvent::new(
            Stage::PipeDeleted {
                at: GridIndex::new(0, 1),
            },
            100.0,
        ));
        let validation = broken.validate();
        assert!(!validation.is_valid());
        assert_eq!(validation.duplicate_deletions, 1);
        assert!(!validation.is_chronological);
        assert!(validation.warnings().contains(&"Events recorded after ROLL_END"));
    }

    #[test]
    fn test_try_push_rejects_out_of_order() {
        let mut trace = create_basic_trace();
        let err = trace
            .try_push(StageEvent::new(Stage::HighlightApplied, 10.0))
            .unwrap_err();
        assert!(matches!(err, StageError::OutOfOrder { index: 8, .. }));
        assert_eq!(trace.len(), 8);
    }

    #[test]
    fn test_trace_serialization() {
        let trace = create_basic_trace();
        let json = trace.to_json().unwrap();

        assert!(json.contains("meadow-01"));
        assert!(json.contains("roll_start"));

        let deserialized = RollTrace::from_json(&json).unwrap();
        assert_eq!(deserialized, trace);
    }

    #[test]
    fn test_empty_trace_summary() {
        let trace = RollTrace::new("empty");
        let summary = trace.summary();
        assert_eq!(summary.event_count, 0);
        assert_eq!(summary.outcome, RollOutcome::Pending);
        assert_eq!(summary.peak_multiplier, 1);
        assert!(!trace.validate().is_valid());
    }
}

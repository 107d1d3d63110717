//! Roll Engine — single-roll state machine
//!
//! Drives one egg along a path, resolves it against the basket row and
//! mutates the board afterwards. Time only moves when the host calls
//! [`RollEngine::resume`]; each timed delay is a suspension point.

use serde::{Deserialize, Serialize};

use ec_stage::{
    EggSprite, GridIndex, HenColor, RollOutcome, RollTrace, Stage, StageEvent, TextStyle,
    WorldPos,
};

use crate::config::RollConfig;
use crate::path::Path;
use crate::pool::{EggHandle, EggPool};
use crate::services::{RollServices, ScoreText};
use crate::state::{DeletedIndexSet, RollState};
use crate::timing::{RollTiming, TimingProfile};
use crate::{RollError, RollResult};

/// Remaining wait below this counts as elapsed
const WAIT_EPSILON: f64 = 1e-9;

/// Outcome of a [`RollEngine::resume`] call
#[derive(Debug, Clone)]
pub enum StepResult {
    /// No roll in progress
    Idle,
    /// Suspended, `remaining` seconds until the next suspension point resumes
    Waiting { remaining: f64 },
    /// The roll reached Idle during this call
    Completed(RollReport),
}

impl StepResult {
    pub fn is_waiting(&self) -> bool {
        matches!(self, Self::Waiting { .. })
    }
}

/// Final record of a completed roll
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollReport {
    pub handle: EggHandle,
    pub color: HenColor,
    pub outcome: RollOutcome,
    pub raw_score: u64,
    /// Final multiplier (0 after a failure)
    pub multiplier: u32,
    /// Points handed to the score accumulator
    pub awarded: u64,
    pub steps: u32,
    pub deleted: Vec<GridIndex>,
    pub spawned: usize,
    /// Simulated seconds from start to Idle
    pub duration_secs: f64,
    pub trace: RollTrace,
}

impl RollReport {
    pub fn is_success(&self) -> bool {
        self.outcome == RollOutcome::Success
    }
}

/// Session statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub rolls: u64,
    pub successes: u64,
    pub fails: u64,
    /// Fails on an empty path
    pub silent_fails: u64,
    pub total_awarded: u64,
    pub best_multiplier: u32,
    pub pipes_deleted: u64,
    pub pipes_spawned: u64,
}

impl SessionStats {
    /// Percentage of rolls that reached a basket
    pub fn success_rate(&self) -> f64 {
        if self.rolls > 0 {
            (self.successes as f64 / self.rolls as f64) * 100.0
        } else {
            0.0
        }
    }

    fn record(&mut self, report: &RollReport) {
        self.rolls += 1;
        match report.outcome {
            RollOutcome::Success => self.successes += 1,
            _ => {
                self.fails += 1;
                if report.steps == 0 {
                    self.silent_fails += 1;
                }
            }
        }
        self.total_awarded += report.awarded;
        self.best_multiplier = self.best_multiplier.max(report.trace.peak_multiplier());
        self.pipes_deleted += report.deleted.len() as u64;
        self.pipes_spawned += report.spawned as u64;
    }
}

/// Where the roll resumes next
#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Traverse(usize),
    Resolve,
    /// Egg landed in a matching basket
    Payout,
    Settle(RollOutcome),
    Cleanup,
    Delete(usize),
    Spawn(usize),
    Finish,
}

/// Everything owned by the roll in flight
#[derive(Debug)]
struct ActiveRoll {
    handle: EggHandle,
    path: Path,
    state: RollState,
    phase: Phase,
    deleted: DeletedIndexSet,
    spawned: usize,
    awarded: u64,
    position: WorldPos,
    trace: RollTrace,
    /// Seconds left before the next phase runs; may go negative on overshoot
    wait: f64,
    /// Simulated seconds since the roll started
    clock: f64,
}

impl ActiveRoll {
    fn suspend(&mut self, secs: f64) {
        self.wait += secs;
        self.clock += secs;
    }

    fn record(&mut self, stage: Stage) {
        self.push(StageEvent::new(stage, self.clock * 1000.0));
    }

    fn record_step(&mut self, stage: Stage) {
        let step = self.state.step_index();
        self.push(StageEvent::new(stage, self.clock * 1000.0).at_step(step));
    }

    fn push(&mut self, event: StageEvent) {
        if let Err(err) = self.trace.try_push(event) {
            log::warn!("Dropped trace event: {}", err);
        }
    }
}

/// Egg roll engine
///
/// Holds at most one roll at a time. Collaborators are injected through
/// [`RollServices`] and only called from inside the engine.
pub struct RollEngine {
    config: RollConfig,
    services: RollServices,
    pool: EggPool,
    active: Option<ActiveRoll>,
    stats: SessionStats,
    roll_count: u64,
    board_id: Option<String>,
}

impl RollEngine {
    /// Create an engine around its collaborators
    pub fn new(config: RollConfig, services: RollServices) -> Self {
        let pool = EggPool::with_capacity(config.pool_size);
        Self {
            config,
            services,
            pool,
            active: None,
            stats: SessionStats::default(),
            roll_count: 0,
            board_id: None,
        }
    }

    /// Tag traces with a level or board identifier
    pub fn with_board(mut self, board_id: impl Into<String>) -> Self {
        self.board_id = Some(board_id.into());
        self
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &RollConfig {
        &self.config
    }

    /// Switch timing profile. Applies from the next suspension point.
    pub fn set_timing(&mut self, profile: TimingProfile) {
        self.config.timing = RollTiming::from_profile(profile);
        log::debug!("Roll timing set to {:?}", profile);
    }

    /// Export current config as JSON
    pub fn export_config(&self) -> RollResult<String> {
        self.config.to_json()
    }

    /// Replace config from JSON
    pub fn import_config(&mut self, json: &str) -> RollResult<()> {
        self.config = RollConfig::from_json(json)?;
        Ok(())
    }

    pub fn services(&self) -> &RollServices {
        &self.services
    }

    /// Collaborators, e.g. to swap the level supply between rolls
    pub fn services_mut(&mut self) -> &mut RollServices {
        &mut self.services
    }

    pub fn pool(&self) -> &EggPool {
        &self.pool
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = SessionStats::default();
    }

    /// No roll in progress
    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// State of the roll in flight
    pub fn state(&self) -> Option<&RollState> {
        self.active.as_ref().map(|roll| &roll.state)
    }

    /// Handle of the egg currently rolling
    pub fn active_egg(&self) -> Option<EggHandle> {
        self.active.as_ref().map(|roll| roll.handle)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ROLL CONTROL
    // ═══════════════════════════════════════════════════════════════════════════

    /// Start a roll along `path`
    ///
    /// Fails with [`RollError::RollInProgress`] and no side effects while
    /// the rolling gate is closed. Otherwise takes one egg from the
    /// inventory and suspends for the pre-roll delay.
    pub fn start_roll(&mut self, path: Path, color: HenColor) -> RollResult<EggHandle> {
        if self.active.is_some() || self.services.play.is_rolling() {
            log::warn!("Rejected roll start for {:?} egg, gate busy", color);
            return Err(RollError::RollInProgress);
        }

        self.roll_count += 1;
        let handle = self.pool.acquire(color);
        self.services.play.set_rolling(true);
        self.services.play.consume_egg();

        let mut trace = RollTrace::new(format!("roll-{:06}", self.roll_count))
            .with_metadata("profile", serde_json::json!(self.config.timing.profile));
        if let Some(board_id) = &self.board_id {
            trace = trace.with_board(board_id.clone());
        }

        let path_len = path.len() as u32;
        let mut roll = ActiveRoll {
            handle,
            path,
            state: RollState::new(color),
            phase: Phase::Traverse(0),
            deleted: DeletedIndexSet::new(),
            spawned: 0,
            awarded: 0,
            position: WorldPos::default(),
            trace,
            wait: 0.0,
            clock: 0.0,
        };
        roll.record(Stage::RollStart { color, path_len });
        roll.suspend(self.config.timing.step_time);

        log::info!(
            "Roll {} started: {} egg, {} steps ({})",
            self.roll_count,
            color.display_name(),
            path_len,
            handle
        );

        self.active = Some(roll);
        Ok(handle)
    }

    /// Advance simulated time by `delta_secs` and run every phase that
    /// became due
    pub fn resume(&mut self, delta_secs: f64) -> StepResult {
        let Some(mut roll) = self.active.take() else {
            return StepResult::Idle;
        };

        let delta = if delta_secs.is_finite() {
            delta_secs.max(0.0)
        } else {
            0.0
        };
        roll.wait -= delta;

        loop {
            if roll.wait > WAIT_EPSILON {
                let remaining = roll.wait;
                self.active = Some(roll);
                return StepResult::Waiting { remaining };
            }
            if roll.phase == Phase::Finish {
                return StepResult::Completed(self.finish(roll));
            }
            self.run_phase(&mut roll);
        }
    }

    /// Run the current roll to completion, jumping straight to each
    /// suspension point
    pub fn run_to_idle(&mut self) -> Option<RollReport> {
        let mut delta = 0.0;
        loop {
            match self.resume(delta) {
                StepResult::Idle => return None,
                StepResult::Waiting { remaining } => delta = remaining,
                StepResult::Completed(report) => return Some(report),
            }
        }
    }

    /// Run the current roll with a fixed tick, as a frame loop would
    pub fn run_with_tick(&mut self, tick_secs: f64) -> Option<RollReport> {
        if !(tick_secs.is_finite() && tick_secs > 0.0) {
            return self.run_to_idle();
        }
        loop {
            match self.resume(tick_secs) {
                StepResult::Idle => return None,
                StepResult::Waiting { .. } => {}
                StepResult::Completed(report) => return Some(report),
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PHASES
    // ═══════════════════════════════════════════════════════════════════════════

    fn run_phase(&mut self, roll: &mut ActiveRoll) {
        match roll.phase {
            Phase::Traverse(index) => self.traverse(roll, index),
            Phase::Resolve => self.resolve(roll),
            Phase::Payout => self.payout(roll),
            Phase::Settle(outcome) => self.settle(roll, outcome),
            Phase::Cleanup => self.cleanup(roll),
            Phase::Delete(index) => self.delete(roll, index),
            Phase::Spawn(index) => self.spawn(roll, index),
            Phase::Finish => {}
        }
    }

    fn traverse(&mut self, roll: &mut ActiveRoll, index: usize) {
        let Some(step) = roll.path.get(index).cloned() else {
            roll.phase = Phase::Resolve;
            return;
        };

        let position = step.segment.position();
        self.move_egg(roll, position);

        step.segment.enter(step.enter);
        roll.record_step(Stage::PipeEnter {
            segment: step.segment_id(),
            at: step.at,
            from: step.enter,
        });

        let points = step.segment.score();
        let scored = roll.state.score_step(step.segment_id(), points);
        let step_index = roll.state.step_index();
        roll.record_step(Stage::StepScored {
            step_index,
            points,
            raw_score: scored.raw_score,
        });
        log::debug!(
            "Step {} at {}: {} +{} (raw {}, x{})",
            step_index,
            step.at,
            step.segment_id(),
            points,
            scored.raw_score,
            scored.multiplier
        );

        if scored.revisit {
            roll.record_step(Stage::MultiplierUp {
                multiplier: scored.multiplier,
            });
            let text = ScoreText {
                text: format!("X{}!", scored.multiplier),
                position,
                color: self.config.text.multiplier_color,
                size: self.config.text.multiplier_font_size,
                style: TextStyle::Multiplier,
            };
            self.emit_text(roll, text);
            let clip = self
                .config
                .sounds
                .multiplier_clip(scored.multiplier)
                .map(str::to_owned);
            self.play_sound(roll, clip);
        }

        let text = ScoreText {
            text: roll.state.effective_score().to_string(),
            position,
            color: self.config.text.points_color(step_index),
            size: self.config.text.score_size(step_index),
            style: TextStyle::Normal,
        };
        self.emit_text(roll, text);
        let clip = self
            .config
            .sounds
            .points_clip(step_index)
            .map(str::to_owned);
        self.play_sound(roll, clip);

        roll.state.advance_step();
        roll.suspend(self.config.timing.step_time);
        roll.phase = Phase::Traverse(index + 1);
    }

    fn resolve(&mut self, roll: &mut ActiveRoll) {
        let color = roll.state.color();

        let last = roll
            .path
            .last()
            .map(|step| (step.at, step.exit, step.exits_bottom()));
        let Some((at, exit, exits_bottom)) = last else {
            // Silent fail: nothing shown, nothing played, no delay
            log::debug!("Empty path, failing silently");
            roll.state.forfeit();
            self.set_sprite(roll, EggSprite::Yolk);
            self.services.play.roll_completed();
            roll.phase = Phase::Settle(RollOutcome::Fail);
            return;
        };

        let column = at.column;
        let caught = exits_bottom && self.services.baskets.color_of(column) == Some(color);

        if caught {
            if let Some(position) = self.services.baskets.world_position(column) {
                self.move_egg(roll, position);
            }
            self.services.baskets.animate_fall(column, color);
            roll.record(Stage::BasketFall { column, color });
            log::debug!("Egg caught by {} basket {}", color.display_name(), column);

            roll.suspend(self.config.timing.basket_animation_delay);
            roll.phase = Phase::Payout;
            return;
        }

        log::debug!(
            "Egg missed: exit {:?} at {}, basket {:?}",
            exit,
            at,
            self.services.baskets.color_of(column)
        );

        // Loss text shows what is being forfeited
        let text = ScoreText {
            text: roll.state.effective_score().to_string(),
            position: roll.position,
            color: self.config.text.fail_color,
            size: self.config.text.loss_font_size,
            style: TextStyle::Loss,
        };
        self.emit_text(roll, text);
        let clip = Some(self.config.sounds.fail_clip.clone());
        self.play_sound(roll, clip);

        roll.state.forfeit();
        self.set_sprite(roll, EggSprite::Yolk);
        self.services.play.roll_completed();
        roll.suspend(self.config.timing.step_time);
        roll.phase = Phase::Settle(RollOutcome::Fail);
    }

    fn payout(&mut self, roll: &mut ActiveRoll) {
        let step_index = roll.state.step_index();
        let amount = roll.state.effective_score();

        let text = ScoreText {
            text: amount.to_string(),
            position: roll.position,
            color: self.config.text.points_color(step_index),
            size: self.config.text.score_size(step_index),
            style: TextStyle::Success,
        };
        self.emit_text(roll, text);
        let clip = Some(self.config.sounds.success_clip.clone());
        self.play_sound(roll, clip);

        self.services.play.add_score(amount);
        roll.awarded = amount;
        roll.record(Stage::ScoreAwarded { amount });
        self.services.play.roll_completed();

        roll.suspend(self.config.timing.step_time);
        roll.phase = Phase::Settle(RollOutcome::Success);
    }

    fn settle(&mut self, roll: &mut ActiveRoll, outcome: RollOutcome) {
        roll.state.resolve(outcome);
        roll.record(Stage::RollResolved {
            outcome: roll.state.outcome(),
            raw_score: roll.state.raw_score(),
            multiplier: roll.state.multiplier(),
        });
        log::info!(
            "Roll {} resolved {:?}: raw {} x{}, awarded {}",
            roll.trace.trace_id,
            roll.state.outcome(),
            roll.state.raw_score(),
            roll.state.multiplier(),
            roll.awarded
        );
        roll.phase = Phase::Cleanup;
    }

    fn cleanup(&mut self, roll: &mut ActiveRoll) {
        if let Some(egg) = self.pool.get_mut(roll.handle) {
            egg.visible = false;
        }
        self.services.board.clear_highlight();
        roll.record(Stage::HighlightCleared);
        roll.phase = Phase::Delete(0);
    }

    fn delete(&mut self, roll: &mut ActiveRoll, index: usize) {
        let Some(step) = roll.path.get(index) else {
            roll.phase = Phase::Spawn(0);
            return;
        };
        let at = step.at;
        let destroy = step.segment.destroy_on_roll();
        roll.phase = Phase::Delete(index + 1);

        // Revisited cells and persistent pipes are skipped without delay
        if !destroy || !roll.deleted.insert(at) {
            return;
        }

        self.services.board.delete_segment_at(at);
        roll.record(Stage::PipeDeleted { at });
        log::debug!("Deleted pipe at {}", at);
        roll.suspend(self.config.timing.destroy_time);
    }

    fn spawn(&mut self, roll: &mut ActiveRoll, index: usize) {
        let Some(at) = roll.deleted.get(index) else {
            roll.phase = Phase::Finish;
            return;
        };
        roll.phase = Phase::Spawn(index + 1);

        match self.services.supply.next_replacement() {
            Some(kind) => {
                self.services.board.spawn_segment_at(at, kind);
                roll.record(Stage::PipeSpawned { at, kind });
                roll.spawned += 1;
                log::debug!("Spawned {:?} at {}", kind, at);
                roll.suspend(self.config.timing.spawn_time);
            }
            None => {
                roll.record(Stage::SpawnSkipped { at });
                log::debug!("No replacement for {}", at);
            }
        }
    }

    fn finish(&mut self, mut roll: ActiveRoll) -> RollReport {
        self.services.board.apply_highlight();
        roll.record(Stage::HighlightApplied);

        self.services.play.set_rolling(false);
        if let Err(err) = self.pool.release(roll.handle) {
            log::warn!("Egg release failed: {}", err);
        }
        roll.record(Stage::RollEnd);

        let report = RollReport {
            handle: roll.handle,
            color: roll.state.color(),
            outcome: roll.state.outcome(),
            raw_score: roll.state.raw_score(),
            multiplier: roll.state.multiplier(),
            awarded: roll.awarded,
            steps: roll.state.step_index(),
            deleted: roll.deleted.iter().collect(),
            spawned: roll.spawned,
            duration_secs: roll.clock,
            trace: roll.trace,
        };
        self.stats.record(&report);

        log::debug!(
            "{} back to pool after {:.2}s ({} deleted, {} spawned)",
            report.handle,
            report.duration_secs,
            report.deleted.len(),
            report.spawned
        );
        report
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SIDE EFFECTS
    // ═══════════════════════════════════════════════════════════════════════════

    fn move_egg(&mut self, roll: &mut ActiveRoll, position: WorldPos) {
        roll.position = position;
        if let Some(egg) = self.pool.get_mut(roll.handle) {
            egg.position = position;
        }
        roll.record_step(Stage::EggMove { position });
    }

    fn set_sprite(&mut self, roll: &ActiveRoll, sprite: EggSprite) {
        if let Some(egg) = self.pool.get_mut(roll.handle) {
            egg.sprite = sprite;
        }
    }

    fn emit_text(&mut self, roll: &mut ActiveRoll, text: ScoreText) {
        roll.record_step(Stage::ScoreText {
            text: text.text.clone(),
            position: text.position,
            color: text.color,
            size: text.size,
            style: text.style,
        });
        self.services.emitter.emit_score_text(text);
    }

    /// Play a clip; empty tables and blank names stay silent
    fn play_sound(&mut self, roll: &mut ActiveRoll, clip: Option<String>) {
        let Some(clip) = clip.filter(|c| !c.is_empty()) else {
            return;
        };
        self.services.emitter.play_sound(&clip);
        roll.record_step(Stage::Sound { clip });
    }
}

//! Timing profiles for roll suspension points
//!
//! All durations are in seconds of simulated game time.

use serde::{Deserialize, Serialize};

/// Timing profile for a roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Normal gameplay timing
    #[default]
    Normal,
    /// Fast mode
    Turbo,
    /// No delays (tests, batch simulation)
    Instant,
    /// Scaled or hand-edited timing
    Custom,
}

/// Durations of every suspension point of a roll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollTiming {
    /// Profile type
    pub profile: TimingProfile,

    /// Pre-roll delay, per-step delay and post-resolution delay
    pub step_time: f64,

    /// Delay after each deleted pipe
    pub destroy_time: f64,

    /// Delay after each spawned pipe
    pub spawn_time: f64,

    /// Delay for the basket catch animation (success only)
    pub basket_animation_delay: f64,

    /// Score popup linger time. Not consumed by the engine.
    pub score_delay_time: f64,
}

impl RollTiming {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            step_time: 0.5,
            destroy_time: 0.1,
            spawn_time: 0.1,
            basket_animation_delay: 0.42,
            score_delay_time: 1.25,
        }
    }

    /// Turbo mode
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            step_time: 0.25,
            destroy_time: 0.05,
            spawn_time: 0.05,
            basket_animation_delay: 0.21,
            score_delay_time: 0.6,
        }
    }

    /// Instant mode, every suspension point resumes immediately
    pub fn instant() -> Self {
        Self {
            profile: TimingProfile::Instant,
            step_time: 0.0,
            destroy_time: 0.0,
            spawn_time: 0.0,
            basket_animation_delay: 0.0,
            score_delay_time: 0.0,
        }
    }

    /// Get timing for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Instant => Self::instant(),
            TimingProfile::Custom => Self::normal(),
        }
    }

    /// Scale timing by factor (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        Self {
            profile: TimingProfile::Custom,
            step_time: self.step_time * factor,
            destroy_time: self.destroy_time * factor,
            spawn_time: self.spawn_time * factor,
            basket_animation_delay: self.basket_animation_delay * factor,
            score_delay_time: self.score_delay_time * factor,
        }
    }

    /// Named durations, for validation and display
    pub fn durations(&self) -> [(&'static str, f64); 5] {
        [
            ("step_time", self.step_time),
            ("destroy_time", self.destroy_time),
            ("spawn_time", self.spawn_time),
            ("basket_animation_delay", self.basket_animation_delay),
            ("score_delay_time", self.score_delay_time),
        ]
    }

    /// Predicted length of a roll in seconds, given its shape
    ///
    /// `success` adds the basket delay; `empty` paths skip the post-resolution delay.
    pub fn roll_duration(
        &self,
        steps: usize,
        success: bool,
        deleted: usize,
        spawned: usize,
    ) -> f64 {
        let mut total = self.step_time + steps as f64 * self.step_time;
        if success {
            total += self.basket_animation_delay;
        }
        if steps > 0 {
            total += self.step_time;
        }
        total + deleted as f64 * self.destroy_time + spawned as f64 * self.spawn_time
    }
}

impl Default for RollTiming {
    fn default() -> Self {
        Self::normal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_timing_profiles() {
        let normal = RollTiming::normal();
        let turbo = RollTiming::turbo();
        let instant = RollTiming::instant();

        assert!(turbo.step_time < normal.step_time);
        assert!(turbo.basket_animation_delay < normal.basket_animation_delay);
        assert!(instant.durations().iter().all(|(_, d)| *d == 0.0));
        assert_eq!(RollTiming::from_profile(TimingProfile::Turbo), turbo);
    }

    #[test]
    fn test_scaled_marks_custom() {
        let half = RollTiming::normal().scaled(0.5);
        assert_eq!(half.profile, TimingProfile::Custom);
        assert_relative_eq!(half.step_time, 0.25);
        assert_relative_eq!(half.basket_animation_delay, 0.21);

        let clamped = RollTiming::normal().scaled(-3.0);
        assert_eq!(clamped.step_time, 0.0);
    }

    #[test]
    fn test_roll_duration() {
        let timing = RollTiming::normal();

        // Pre-roll only
        assert_relative_eq!(timing.roll_duration(0, false, 0, 0), 0.5);

        // Three steps into a basket, three pipes replaced
        let expected = 0.5 + 1.5 + 0.42 + 0.5 + 0.3 + 0.3;
        assert_relative_eq!(timing.roll_duration(3, true, 3, 3), expected, epsilon = 1e-9);
    }
}

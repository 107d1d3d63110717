//! Roll engine configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use ec_stage::TextColor;

use crate::timing::RollTiming;
use crate::{RollError, RollResult};

/// Clamped table lookup
///
/// Out-of-range indices resolve to the nearest valid element. Returns `None`
/// only when the table is empty.
pub fn clamped<T>(items: &[T], index: i64) -> Option<&T> {
    if items.is_empty() {
        return None;
    }
    let last = items.len() as i64 - 1;
    items.get(index.clamp(0, last) as usize)
}

/// Sound clips played during a roll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundBank {
    /// Played when the egg lands in a matching basket
    pub success_clip: String,
    /// Played when a non-empty roll fails
    pub fail_clip: String,
    /// Per-step point clips, indexed by step
    pub points_clips: Vec<String>,
    /// Revisit clips, indexed by multiplier - 1
    pub multiplier_clips: Vec<String>,
}

impl SoundBank {
    /// Point clip for a step index
    pub fn points_clip(&self, step_index: u32) -> Option<&str> {
        clamped(&self.points_clips, step_index as i64).map(String::as_str)
    }

    /// Multiplier clip for a multiplier value
    pub fn multiplier_clip(&self, multiplier: u32) -> Option<&str> {
        clamped(&self.multiplier_clips, multiplier as i64 - 1).map(String::as_str)
    }
}

impl Default for SoundBank {
    fn default() -> Self {
        Self {
            success_clip: "basket_success".into(),
            fail_clip: "egg_crack".into(),
            points_clips: (1..=8).map(|i| format!("points_{i:02}")).collect(),
            multiplier_clips: (1..=4).map(|i| format!("multiplier_{i:02}")).collect(),
        }
    }
}

/// Floating text colors and sizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Score text colors, indexed by step
    pub points_colors: Vec<TextColor>,
    pub multiplier_color: TextColor,
    pub fail_color: TextColor,
    /// Score text size at step 0
    pub base_font_size: f32,
    /// Score text growth per completed step
    pub font_growth_per_step: f32,
    pub multiplier_font_size: f32,
    pub loss_font_size: f32,
}

impl TextConfig {
    /// Score text color for a step index
    pub fn points_color(&self, step_index: u32) -> TextColor {
        clamped(&self.points_colors, step_index as i64)
            .copied()
            .unwrap_or_default()
    }

    /// Score text size for a step index
    pub fn score_size(&self, step_index: u32) -> f32 {
        self.base_font_size + step_index as f32 * self.font_growth_per_step
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            points_colors: vec![
                TextColor::rgb(255, 255, 255),
                TextColor::rgb(255, 241, 118),
                TextColor::rgb(255, 213, 79),
                TextColor::rgb(255, 167, 38),
                TextColor::rgb(255, 112, 67),
            ],
            multiplier_color: TextColor::rgb(186, 104, 200),
            fail_color: TextColor::rgb(229, 57, 53),
            base_font_size: 32.0,
            font_growth_per_step: 2.0,
            multiplier_font_size: 72.0,
            loss_font_size: 52.0,
        }
    }
}

/// Row/column completion bonuses
///
/// Declared for level designers but no roll rule awards them yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusConfig {
    pub row_bonus: u32,
    pub column_bonus: u32,
}

impl Default for BonusConfig {
    fn default() -> Self {
        Self {
            row_bonus: 200,
            column_bonus: 200,
        }
    }
}

/// Complete roll engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollConfig {
    pub timing: RollTiming,
    pub sounds: SoundBank,
    pub text: TextConfig,
    pub bonus: BonusConfig,
    /// Eggs pre-allocated in the pool
    pub pool_size: usize,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            timing: RollTiming::normal(),
            sounds: SoundBank::default(),
            text: TextConfig::default(),
            bonus: BonusConfig::default(),
            pool_size: 4,
        }
    }
}

impl RollConfig {
    /// Config with no delays, for tests and batch runs
    pub fn instant() -> Self {
        Self {
            timing: RollTiming::instant(),
            ..Self::default()
        }
    }

    /// Replace timing
    pub fn with_timing(mut self, timing: RollTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Check durations and sizes
    pub fn validate(&self) -> RollResult<()> {
        for (name, value) in self.timing.durations() {
            if !value.is_finite() || value < 0.0 {
                return Err(RollError::InvalidConfig(format!(
                    "timing.{name} must be a non-negative number of seconds, got {value}"
                )));
            }
        }

        let sizes = [
            ("base_font_size", self.text.base_font_size),
            ("font_growth_per_step", self.text.font_growth_per_step),
            ("multiplier_font_size", self.text.multiplier_font_size),
            ("loss_font_size", self.text.loss_font_size),
        ];
        for (name, value) in sizes {
            if !value.is_finite() || value < 0.0 {
                return Err(RollError::InvalidConfig(format!(
                    "text.{name} must be non-negative, got {value}"
                )));
            }
        }

        if self.sounds.points_clips.is_empty() {
            log::warn!("No point clips configured, steps will be silent");
        }
        if self.sounds.multiplier_clips.is_empty() {
            log::warn!("No multiplier clips configured, revisits will be silent");
        }

        Ok(())
    }

    /// Parse and validate YAML config
    pub fn from_yaml(yaml: &str) -> RollResult<Self> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate JSON config
    pub fn from_json(json: &str) -> RollResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from file, format picked by extension (`.json`, otherwise YAML)
    pub fn load(path: impl AsRef<Path>) -> RollResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        log::debug!("Loading roll config from {}", path.display());
        if is_json {
            Self::from_json(&text)
        } else {
            Self::from_yaml(&text)
        }
    }

    /// Export config as pretty JSON
    pub fn to_json(&self) -> RollResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::TimingProfile;
    use std::io::Write;

    #[test]
    fn test_clamped_lookup() {
        let clips = ["a", "b", "c"];
        assert_eq!(clamped(&clips, -4), Some(&"a"));
        assert_eq!(clamped(&clips, 1), Some(&"b"));
        assert_eq!(clamped(&clips, 2), Some(&"c"));
        assert_eq!(clamped(&clips, 99), Some(&"c"));
        assert_eq!(clamped::<&str>(&[], 0), None);
    }

    #[test]
    fn test_points_clip_clamps_to_last() {
        let sounds = SoundBank::default();
        let last = sounds.points_clips.len() as u32 - 1;
        assert_eq!(sounds.points_clip(last), sounds.points_clip(last + 10));
        assert_eq!(sounds.points_clip(0), Some("points_01"));
    }

    #[test]
    fn test_multiplier_clip_offset() {
        let sounds = SoundBank::default();
        assert_eq!(sounds.multiplier_clip(2), Some("multiplier_02"));
        assert_eq!(sounds.multiplier_clip(3), Some("multiplier_03"));
        assert_eq!(sounds.multiplier_clip(0), Some("multiplier_01"));
        assert_eq!(sounds.multiplier_clip(40), Some("multiplier_04"));
    }

    #[test]
    fn test_text_sizes_and_colors() {
        let text = TextConfig::default();
        assert_eq!(text.score_size(0), 32.0);
        assert_eq!(text.score_size(3), 38.0);
        assert_eq!(text.points_color(100), *text.points_colors.last().unwrap());

        let empty = TextConfig {
            points_colors: Vec::new(),
            ..TextConfig::default()
        };
        assert_eq!(empty.points_color(2), TextColor::WHITE);
    }

    #[test]
    fn test_yaml_partial_config() {
        let yaml = r#"
timing:
  profile: custom
  step_time: 0.3
sounds:
  points_clips: [tick]
pool_size: 2
"#;
        let config = RollConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.timing.profile, TimingProfile::Custom);
        assert_eq!(config.timing.step_time, 0.3);
        assert_eq!(config.timing.destroy_time, 0.1);
        assert_eq!(config.sounds.points_clip(7), Some("tick"));
        assert_eq!(config.sounds.fail_clip, "egg_crack");
        assert_eq!(config.bonus.row_bonus, 200);
        assert_eq!(config.pool_size, 2);
    }

    #[test]
    fn test_negative_duration_rejected() {
        let json = r#"{ "timing": { "spawn_time": -0.1 } }"#;
        let err = RollConfig::from_json(json).unwrap_err();
        assert!(matches!(err, RollError::InvalidConfig(msg) if msg.contains("spawn_time")));
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let json = RollConfig::instant().to_json().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let loaded = RollConfig::load(file.path()).unwrap();
        assert_eq!(loaded, RollConfig::instant());
    }
}

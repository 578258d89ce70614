//! Configuration file support for formrep.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/formrep/config.toml`.
//! Every field has a default, so partial files are fine.

use crate::phase::Hysteresis;
use crate::{Error, Result, Side};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub pose: PoseConfig,

    #[serde(default)]
    pub squat: SquatConfig,

    #[serde(default)]
    pub pushup: PushupConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

/// Landmark stream handling
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoseConfig {
    /// Body side whose joints drive both analyzers
    #[serde(default)]
    pub side: Side,

    #[serde(default = "default_smoothing")]
    pub smoothing: bool,

    /// EMA weight of the current frame, in (0, 1]
    #[serde(default = "default_smoothing_alpha")]
    pub smoothing_alpha: f64,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            side: Side::default(),
            smoothing: default_smoothing(),
            smoothing_alpha: default_smoothing_alpha(),
        }
    }
}

/// Squat thresholds, in degrees except `knee_over_toe_max`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SquatConfig {
    #[serde(default = "default_squat_descend_below")]
    pub descend_below: f64,

    #[serde(default = "default_ascend_above")]
    pub ascend_above: f64,

    #[serde(default = "default_squat_depth_max_angle")]
    pub depth_max_angle: f64,

    /// Horizontal knee/ankle offset in normalized frame units
    #[serde(default = "default_knee_over_toe_max")]
    pub knee_over_toe_max: f64,
}

impl Default for SquatConfig {
    fn default() -> Self {
        Self {
            descend_below: default_squat_descend_below(),
            ascend_above: default_ascend_above(),
            depth_max_angle: default_squat_depth_max_angle(),
            knee_over_toe_max: default_knee_over_toe_max(),
        }
    }
}

impl SquatConfig {
    pub fn hysteresis(&self) -> Hysteresis {
        Hysteresis {
            descend_below: self.descend_below,
            ascend_above: self.ascend_above,
        }
    }
}

/// Pushup thresholds, in degrees
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PushupConfig {
    #[serde(default = "default_pushup_descend_below")]
    pub descend_below: f64,

    #[serde(default = "default_ascend_above")]
    pub ascend_above: f64,

    /// Allowed deviation of the body line angle from 180°
    #[serde(default = "default_body_line_tolerance")]
    pub body_line_tolerance: f64,

    #[serde(default = "default_elbow_flare_below")]
    pub elbow_flare_below: f64,
}

impl Default for PushupConfig {
    fn default() -> Self {
        Self {
            descend_below: default_pushup_descend_below(),
            ascend_above: default_ascend_above(),
            body_line_tolerance: default_body_line_tolerance(),
            elbow_flare_below: default_elbow_flare_below(),
        }
    }
}

impl PushupConfig {
    pub fn hysteresis(&self) -> Hysteresis {
        Hysteresis {
            descend_below: self.descend_below,
            ascend_above: self.ascend_above,
        }
    }
}

/// Report output configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

// Default value functions
fn default_smoothing() -> bool {
    true
}

fn default_smoothing_alpha() -> f64 {
    0.5
}

fn default_squat_descend_below() -> f64 {
    100.0
}

fn default_pushup_descend_below() -> f64 {
    90.0
}

fn default_ascend_above() -> f64 {
    160.0
}

fn default_squat_depth_max_angle() -> f64 {
    100.0
}

fn default_knee_over_toe_max() -> f64 {
    0.2
}

fn default_body_line_tolerance() -> f64 {
    15.0
}

fn default_elbow_flare_below() -> f64 {
    60.0
}

fn default_output_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|base| base.join("formrep"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reports")
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("formrep")
            .join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_toml()?)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Reject values the analyzers cannot work with
    pub fn validate(&self) -> Result<()> {
        let alpha = self.pose.smoothing_alpha;
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(Error::Config(format!(
                "pose.smoothing_alpha must be in (0, 1], got {}",
                alpha
            )));
        }

        check_hysteresis("squat", &self.squat.hysteresis())?;
        check_hysteresis("pushup", &self.pushup.hysteresis())?;

        if self.squat.knee_over_toe_max < 0.0 {
            return Err(Error::Config(format!(
                "squat.knee_over_toe_max must not be negative, got {}",
                self.squat.knee_over_toe_max
            )));
        }
        if self.pushup.body_line_tolerance < 0.0 {
            return Err(Error::Config(format!(
                "pushup.body_line_tolerance must not be negative, got {}",
                self.pushup.body_line_tolerance
            )));
        }

        Ok(())
    }
}

fn check_hysteresis(section: &str, thresholds: &Hysteresis) -> Result<()> {
    let in_range = |angle: f64| (0.0..=180.0).contains(&angle);
    if !in_range(thresholds.descend_below) || !in_range(thresholds.ascend_above) {
        return Err(Error::Config(format!(
            "{} thresholds must lie within [0, 180] degrees",
            section
        )));
    }
    if thresholds.descend_below >= thresholds.ascend_above {
        return Err(Error::Config(format!(
            "{}.descend_below ({}) must be lower than {}.ascend_above ({})",
            section, thresholds.descend_below, section, thresholds.ascend_above
        )));
    }
    Ok(())
}

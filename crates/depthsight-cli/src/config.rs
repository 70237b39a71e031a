//! Configuration vault – reads/writes `~/.depthsight/config.toml`.
//!
//! Every tunable of the pipeline lives here: camera calibration and mounting,
//! extraction bounds, depth unit scale, sensor mode, and the simulated scene.
//! Loaded once at startup; the pipeline treats the values as immutable for
//! the life of the process.

use depthsight_extract::ExtractorConfig;
use depthsight_hal::SimScene;
use depthsight_perception::{CameraExtrinsics, CameraIntrinsics, CameraModel, DEFAULT_DEPTH_SCALE};
use depthsight_types::SightError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Which frame source to open at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SensorMode {
    /// Synthesized frames from the configured [`SimScene`].
    #[default]
    Sim,
    /// A physical depth camera.
    Device,
}

/// Persisted configuration stored in `~/.depthsight/config.toml`.
///
/// Scalar fields come first so the TOML serializer emits them before the
/// nested tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Frame source opened at startup.
    #[serde(default)]
    pub sensor: SensorMode,

    /// Divides native depth samples into meters.
    #[serde(default = "default_depth_scale")]
    pub depth_scale: f64,

    /// Lower bound on the circle-equivalent pixel diameter of a candidate.
    #[serde(default = "default_low_diameter_px")]
    pub low_diameter_px: f64,

    /// Upper bound on the circle-equivalent pixel diameter of a candidate.
    #[serde(default = "default_high_diameter_px")]
    pub high_diameter_px: f64,

    /// Upper bound on the distance estimate, native depth units.
    #[serde(default = "default_max_distance")]
    pub max_distance: f64,

    /// Pause between pipeline iterations, milliseconds. 0 runs frames back
    /// to back.
    #[serde(default)]
    pub frame_interval_ms: u64,

    /// Optical calibration of the depth camera.
    #[serde(default)]
    pub intrinsics: CameraIntrinsics,

    /// Physical mounting of the sensor.
    #[serde(default)]
    pub mounting: CameraExtrinsics,

    /// Scene rendered by the simulated sensor.
    #[serde(default)]
    pub sim_scene: SimScene,
}

fn default_depth_scale() -> f64 {
    DEFAULT_DEPTH_SCALE
}
fn default_low_diameter_px() -> f64 {
    20.0
}
fn default_high_diameter_px() -> f64 {
    100.0
}
fn default_max_distance() -> f64 {
    3000.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sensor: SensorMode::default(),
            depth_scale: default_depth_scale(),
            low_diameter_px: default_low_diameter_px(),
            high_diameter_px: default_high_diameter_px(),
            max_distance: default_max_distance(),
            frame_interval_ms: 0,
            intrinsics: CameraIntrinsics::default(),
            mounting: CameraExtrinsics::default(),
            sim_scene: SimScene::default(),
        }
    }
}

impl Config {
    /// Assemble the camera description, checking the calibration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SightError::Config`] for invalid intrinsics.
    pub fn camera_model(&self) -> Result<CameraModel, SightError> {
        self.intrinsics.validate()?;
        Ok(CameraModel::new(self.intrinsics, self.mounting).with_depth_scale(self.depth_scale))
    }

    /// Extraction bounds as the extractor consumes them.
    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            low_diameter_px: self.low_diameter_px,
            high_diameter_px: self.high_diameter_px,
            max_distance: self.max_distance,
            ..ExtractorConfig::default()
        }
    }

    /// Inter-frame pause, if configured.
    pub fn frame_interval(&self) -> Option<Duration> {
        (self.frame_interval_ms > 0).then(|| Duration::from_millis(self.frame_interval_ms))
    }
}

/// Return the path to `~/.depthsight/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".depthsight").join("config.toml")
}

/// Load the config from disk. Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `DEPTHSIGHT_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `DEPTHSIGHT_SENSOR` | `sensor` (`sim` or `device`) |
/// | `DEPTHSIGHT_MAX_DISTANCE` | `max_distance` |
/// | `DEPTHSIGHT_FRAME_INTERVAL_MS` | `frame_interval_ms` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("DEPTHSIGHT_SENSOR") {
        match v.as_str() {
            "sim" => cfg.sensor = SensorMode::Sim,
            "device" => cfg.sensor = SensorMode::Device,
            _ => {}
        }
    }
    if let Ok(v) = std::env::var("DEPTHSIGHT_MAX_DISTANCE")
        && let Ok(distance) = v.parse::<f64>()
    {
        cfg.max_distance = distance;
    }
    if let Ok(v) = std::env::var("DEPTHSIGHT_FRAME_INTERVAL_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.frame_interval_ms = ms;
    }
}

/// Save the config to disk, creating `~/.depthsight/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}

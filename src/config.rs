use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::GlobeError;
use crate::geo::GLOBE_RADIUS;
use crate::selection::ReopenPolicy;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "GLOBE_PINS_CONFIG";

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "globe-pins.json";

/// Tunables for the globe session. Every field has a default, so a config
/// file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    pub globe_radius: f64,
    /// Bounding sphere radius used for pin picking and drawing.
    pub pin_radius: f64,
    /// Ignore pins hidden behind the globe when picking.
    pub occlude_hidden_pins: bool,
    pub camera_distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    /// Distance change per wheel notch.
    pub zoom_step: f64,
    /// Radians of yaw per pixel of horizontal drag.
    pub drag_sensitivity_x: f64,
    /// Radians of pitch per pixel of vertical drag.
    pub drag_sensitivity_y: f64,
    /// Radians of yaw added per frame while idle.
    pub idle_rotation: f64,
    pub label_open_secs: f64,
    pub label_close_secs: f64,
    pub reopen_policy: ReopenPolicy,
    pub pause_on_hover: bool,
    pub star_count: usize,
    pub countries_path: Option<PathBuf>,
    pub surface_path: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            globe_radius: GLOBE_RADIUS,
            // Braille cells are coarse; 0.03 is unclickable from a terminal.
            pin_radius: 0.1,
            occlude_hidden_pins: true,
            camera_distance: 10.0,
            min_distance: 6.0,
            max_distance: 40.0,
            zoom_step: 0.5,
            drag_sensitivity_x: 0.005,
            drag_sensitivity_y: 0.005,
            idle_rotation: 0.0003,
            label_open_secs: 0.3,
            label_close_secs: 0.3,
            reopen_policy: ReopenPolicy::Swap,
            pause_on_hover: true,
            star_count: 1000,
            countries_path: None,
            surface_path: None,
            log_file: Some(PathBuf::from("globe-pins.log")),
        }
    }
}

impl GlobeConfig {
    /// Parse a JSON config document. The buffer is used as scratch space.
    pub fn from_json(path: &Path, bytes: &mut [u8]) -> Result<Self, GlobeError> {
        let config: GlobeConfig =
            simd_json::serde::from_slice(bytes).map_err(|source| GlobeError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a config file.
    pub fn load(path: &Path) -> Result<Self, GlobeError> {
        let mut bytes = fs::read(path).map_err(|e| GlobeError::io(path, e))?;
        Self::from_json(path, &mut bytes)
    }

    /// Config from `$GLOBE_PINS_CONFIG`, else `./globe-pins.json`, else defaults.
    pub fn discover() -> Result<Self, GlobeError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::load(local);
        }
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<(), GlobeError> {
        let invalid = |msg: String| Err(GlobeError::InvalidConfig(msg));

        if !(self.globe_radius > 0.0) {
            return invalid(format!("globe_radius must be positive, got {}", self.globe_radius));
        }
        if !(self.pin_radius > 0.0) {
            return invalid(format!("pin_radius must be positive, got {}", self.pin_radius));
        }
        if !(self.min_distance > self.globe_radius) {
            return invalid(format!(
                "min_distance ({}) must exceed globe_radius ({})",
                self.min_distance, self.globe_radius
            ));
        }
        if !(self.min_distance <= self.max_distance) {
            return invalid(format!(
                "min_distance ({}) is greater than max_distance ({})",
                self.min_distance, self.max_distance
            ));
        }
        if !(self.zoom_step >= 0.0) {
            return invalid(format!("zoom_step must not be negative, got {}", self.zoom_step));
        }
        if !(self.label_open_secs >= 0.0 && self.label_close_secs >= 0.0) {
            return invalid("label durations must not be negative".to_string());
        }
        Ok(())
    }
}

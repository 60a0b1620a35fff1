//! Machine configuration model.
//!
//! Deserialized from `machine.toml` at startup. The model is purely
//! declarative — pin specs stay strings here and are resolved against the
//! pin registry during topology resolution, never later.
//!
//! ```toml
//! name = "mpcnc-laser"
//! shared_disable_pin = "gpio.13:low"
//!
//! [stepping]
//! pulse_us = 4
//! dir_delay_us = 1
//!
//! [axes.x]
//! steps_per_mm = 100.0
//! motors = [{ step_pin = "gpio.12", dir_pin = "gpio.14" }]
//!
//! [axes.y]
//! motors = [
//!     { step_pin = "gpio.26", dir_pin = "gpio.15" },
//!     { step_pin = "gpio.25", dir_pin = "gpio.33", homing = false },
//! ]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration file loading error.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

// ─── Stepping ───────────────────────────────────────────────────────

/// Pulse-timing figures consumed by the pulse clock and the timed-pulse
/// pin block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SteppingConfig {
    /// Minimum step pulse active width [µs].
    pub pulse_us: u32,
    /// Direction-setup delay before the first step edge [µs].
    pub dir_delay_us: u32,
    /// Idle timeout before drivers may be released [ms].
    pub idle_ms: u32,
}

impl Default for SteppingConfig {
    fn default() -> Self {
        Self {
            pulse_us: 4,
            dir_delay_us: 0,
            idle_ms: 250,
        }
    }
}

// ─── Motors ─────────────────────────────────────────────────────────

/// One motor slot of an axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotorConfig {
    /// Motor backend name. Default: `stepstick`.
    #[serde(default = "default_motor_backend")]
    pub backend: String,

    /// Step line spec. Required by real backends.
    #[serde(default)]
    pub step_pin: Option<String>,

    /// Direction line spec. Required by real backends.
    #[serde(default)]
    pub dir_pin: Option<String>,

    /// Per-motor disable line spec. Omit when wired to the shared line.
    #[serde(default)]
    pub disable_pin: Option<String>,

    /// Negative-travel limit switch spec.
    #[serde(default)]
    pub limit_neg_pin: Option<String>,

    /// Positive-travel limit switch spec.
    #[serde(default)]
    pub limit_pos_pin: Option<String>,

    /// Whether this motor participates in homing cycles. Default: true.
    #[serde(default = "default_true")]
    pub homing: bool,
}

fn default_motor_backend() -> String {
    "stepstick".to_string()
}

fn default_true() -> bool {
    true
}

// ─── Axes ───────────────────────────────────────────────────────────

/// One logical axis with its calibration and motor slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisConfig {
    /// Steps per millimeter of travel.
    pub steps_per_mm: f64,
    /// Maximum feed rate [mm/min].
    pub max_rate_mm_min: f64,
    /// Maximum travel from the homed position [mm].
    pub max_travel_mm: f64,
    /// Motor slots, gang 0 first. At most two.
    pub motors: Vec<MotorConfig>,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            steps_per_mm: 80.0,
            max_rate_mm_min: 1000.0,
            max_travel_mm: 300.0,
            motors: Vec::new(),
        }
    }
}

// ─── Machine ────────────────────────────────────────────────────────

/// Top-level machine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Machine display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Number of live axes. Defaults to one past the highest configured
    /// axis; set explicitly to carry trailing inert axes.
    #[serde(default)]
    pub num_axes: Option<usize>,

    /// Shared hardware disable line tied to every driver's enable input.
    #[serde(default)]
    pub shared_disable_pin: Option<String>,

    /// Pulse timing.
    #[serde(default)]
    pub stepping: SteppingConfig,

    /// Configured axes, keyed by axis name (`x`..`c`). Missing axes
    /// become inert during topology resolution.
    #[serde(default)]
    pub axes: BTreeMap<String, AxisConfig>,
}

impl MachineConfig {
    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml(&content)?)
    }
}

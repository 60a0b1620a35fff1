//! Configuration-resolution error types.
//!
//! Everything detected while turning a declarative machine config into a
//! live topology surfaces here as a catchable, reportable error. Only
//! violations detected inside the running pulse path halt instead — there
//! is no safe mid-pulse recovery.

use thiserror::Error;

use kerf_common::mask::MAX_AXES;
use kerf_common::pin::PinSpecError;

use crate::motor::SlotAddr;

/// Topology resolution error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Axis table key is not a known axis name.
    #[error("'{name}' is not a valid axis name")]
    UnknownAxis { name: String },

    /// More axes requested than the machine supports.
    #[error("machine cannot have {requested} axes (maximum {MAX_AXES})")]
    TooManyAxes { requested: usize },

    /// A configured axis lies beyond the declared axis count.
    #[error("axis {axis} is configured but the machine has only {num_axes} axes")]
    AxisOutOfRange { axis: char, num_axes: usize },

    /// An axis declares more motor slots than it has gangs.
    #[error("axis {axis} has {count} motors (maximum {max})")]
    TooManyGangs { axis: char, count: usize, max: usize },

    /// Motor backend name not registered.
    #[error("unknown motor backend '{backend}' for {slot}")]
    UnknownMotorBackend { slot: SlotAddr, backend: String },

    /// A pin spec failed to parse or resolve.
    #[error("{role} pin for {slot}: {source}")]
    Pin {
        slot: SlotAddr,
        role: &'static str,
        source: PinSpecError,
    },

    /// A pulse-path position was given a backend that is unsafe there.
    #[error("{role} pin '{spec}' for {slot} is not pulse-path capable")]
    NotRtCapable {
        slot: SlotAddr,
        role: &'static str,
        spec: String,
    },

    /// The timed backend needs a self-resetting pulse line.
    #[error("{role} pin '{spec}' for {slot} is not a timed-pulse line")]
    NotPulseCapable {
        slot: SlotAddr,
        role: &'static str,
        spec: String,
    },

    /// The shared disable line failed to resolve.
    #[error("shared disable pin: {source}")]
    SharedDisable { source: PinSpecError },
}

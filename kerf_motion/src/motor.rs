//! The `MotorDriver` contract and the motor backend registry.
//!
//! A motor is one physical stepper driver occupying one (axis, gang)
//! slot. Backends:
//!
//! - [`stepstick`] - direct-pulse step/dir driver over RT-capable pins
//! - [`timed`] - peripheral-timed driver over a self-resetting pulse line
//! - [`null`] - explicit absent motor for unconfigured slots
//!
//! Backend names are resolved once, at topology resolution, through
//! [`MotorRegistry`]; the pulse path only ever sees `dyn MotorDriver`.

pub mod null;
pub mod stepstick;
pub mod timed;

use core::fmt;
use std::collections::HashMap;

use kerf_common::config::MotorConfig;
use kerf_common::mask::axis_name;
use kerf_common::pin::PinRegistry;

use crate::axis::AxisSettings;
use crate::error::ConfigError;

/// Opaque motor identity, unique per resolved topology.
///
/// Every live motor object is reachable from exactly one (axis, gang)
/// slot; the Axes manager's reverse lookups translate an id back into
/// that position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MotorId(pub(crate) u16);

impl fmt::Display for MotorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Topological position of a motor slot, for diagnostics and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotAddr {
    pub axis: usize,
    pub gang: usize,
}

impl fmt::Display for SlotAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} axis gang {}", axis_name(self.axis), self.gang)
    }
}

/// One physical stepper driver's control surface.
///
/// # Real-time constraints
///
/// `set_direction`, `step` and `unstep` are called from the pulse path:
/// no blocking, no allocation, no logging. The remaining methods run in
/// cooperative context only.
pub trait MotorDriver: Send {
    /// Backend name this motor was resolved from.
    fn name(&self) -> &'static str;

    /// False only for the null backend standing in for an empty slot.
    fn is_real(&self) -> bool {
        true
    }

    /// Configure pins and log the slot's topology. Called once by
    /// `Axes::init` before any pulse is scheduled.
    fn init(&mut self);

    /// Reload calibration into the driver hardware.
    fn read_settings(&mut self, settings: &AxisSettings);

    /// Enter or leave homing mode. Returns whether this motor can
    /// participate in homing for the requested mode.
    fn set_homing_mode(&mut self, is_homing: bool) -> bool;

    /// Drive the motor's disable input.
    fn set_disable(&mut self, disable: bool);

    /// Latch the travel direction for subsequent step edges.
    fn set_direction(&mut self, forward: bool);

    /// Issue the active step edge.
    fn step(&mut self);

    /// Return the step line to its inactive level.
    fn unstep(&mut self);
}

// ─── Backend registry ───────────────────────────────────────────────

/// Everything a motor factory needs to build one slot.
pub struct MotorContext<'a> {
    /// Slot being built.
    pub slot: SlotAddr,
    /// Declarative motor configuration.
    pub config: &'a MotorConfig,
    /// Pin registry for spec resolution.
    pub pins: &'a PinRegistry,
}

/// Factory producing a motor instance for a slot.
pub type MotorFactory =
    Box<dyn Fn(&MotorContext) -> Result<Box<dyn MotorDriver>, ConfigError> + Send + Sync>;

/// Registry of available motor backends.
///
/// Constructed at startup, populated via `register()`, consulted once
/// per configured slot during topology resolution.
pub struct MotorRegistry {
    factories: HashMap<&'static str, MotorFactory>,
}

impl MotorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the standard backends.
    pub fn with_standard_backends() -> Self {
        let mut registry = Self::new();
        registry.register("stepstick", Box::new(|ctx| stepstick::StepStick::build(ctx)));
        registry.register("timed", Box::new(|ctx| timed::TimedStepper::build(ctx)));
        registry.register("null", Box::new(|ctx| Ok(null::NullMotor::build(ctx.slot))));
        registry
    }

    /// Register a motor backend factory.
    ///
    /// # Panics
    /// Panics if a backend with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: MotorFactory) {
        if self.factories.contains_key(name) {
            panic!("motor backend '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    /// Build a motor for a slot through the named backend.
    pub fn create(
        &self,
        name: &str,
        ctx: &MotorContext,
    ) -> Result<Box<dyn MotorDriver>, ConfigError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ConfigError::UnknownMotorBackend {
                slot: ctx.slot,
                backend: name.to_string(),
            })?;
        factory(ctx)
    }
}

impl Default for MotorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Factory helpers ────────────────────────────────────────────────

/// Resolve a pin spec for a pulse-path position.
///
/// An omitted spec yields the fail-fast error pin; a resolved backend
/// must be interrupt-safe.
pub(crate) fn resolve_step_path_pin(
    ctx: &MotorContext,
    spec: &Option<String>,
    role: &'static str,
) -> Result<kerf_common::pin::Pin, ConfigError> {
    let Some(spec) = spec else {
        return Ok(kerf_common::pin::Pin::unspecified());
    };
    let pin = ctx
        .pins
        .resolve(spec)
        .map_err(|source| ConfigError::Pin {
            slot: ctx.slot,
            role,
            source,
        })?;
    if !pin.rt_capable() {
        return Err(ConfigError::NotRtCapable {
            slot: ctx.slot,
            role,
            spec: spec.clone(),
        });
    }
    Ok(pin)
}

/// Resolve an optional pin outside the pulse path (disable lines).
pub(crate) fn resolve_optional_pin(
    ctx: &MotorContext,
    spec: &Option<String>,
    role: &'static str,
) -> Result<Option<kerf_common::pin::Pin>, ConfigError> {
    match spec {
        None => Ok(None),
        Some(spec) => ctx
            .pins
            .resolve(spec)
            .map(Some)
            .map_err(|source| ConfigError::Pin {
                slot: ctx.slot,
                role,
                source,
            }),
    }
}

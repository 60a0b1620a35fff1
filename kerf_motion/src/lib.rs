//! Kerf Motion Core
//!
//! The axis/motor abstraction and real-time pulse-generation core:
//! per-interval step/direction bitmasks become physical pin transitions
//! across logical axes of up to two ganged motors each, with homing-mode
//! negotiation and per-motor lockout.
//!
//! # Module Structure
//!
//! - [`motor`] - The `MotorDriver` contract and its backends
//! - [`axis`] - Axis entity: gang slots, calibration settings
//! - [`axes`] - The Axes manager: masks, lockout, the `step`/`unstep` path
//! - [`stepping`] - Pulse-window timing contract and spin-wait clock
//! - [`builder`] - Configuration resolution into a live topology
//! - [`error`] - Configuration-time error types
//!
//! # Execution contexts
//!
//! Everything except [`axes::Axes::step`] and [`axes::Axes::unstep`] runs
//! in cooperative context and may log. The two pulse-path methods are
//! called at pulse cadence from a timer interrupt: they never block,
//! allocate or log, and touch hardware only through backends that
//! advertise interrupt safety.

pub mod axes;
pub mod axis;
pub mod builder;
pub mod error;
pub mod motor;
pub mod stepping;

//! Pin capability abstraction.
//!
//! One contract over heterogeneous hardware lines:
//!
//! - [`backend`] - The [`PinBackend`] trait and the owning [`Pin`] wrapper
//! - [`caps`] - Capability and attribute flag sets
//! - [`gpio`] - Direct digital I/O against an atomic port bank
//! - [`shift`] - Serial shift-register chain output (never pulse-path safe)
//! - [`timed`] - Hardware-timed self-resetting pulse channels
//! - [`error`] - Fail-fast backend for missing/malformed specifications
//! - [`registry`] - Name-keyed backend factories and pin-spec resolution
//!
//! Backends used inside the pulse path advertise [`caps::PinCapabilities::RT`];
//! resolution refuses anything else in a step/direction position, so the
//! real-time code never has to check.

pub mod backend;
pub mod caps;
pub mod error;
pub mod gpio;
pub mod registry;
pub mod shift;
pub mod timed;

pub use backend::{Pin, PinBackend};
pub use caps::{PinAttributes, PinCapabilities};
pub use registry::{PinBanks, PinRegistry, PinSpec, PinSpecError};

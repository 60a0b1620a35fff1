//! Kerf Common Library
//!
//! Shared types for the kerf workspace: motor-mask arithmetic, the pin
//! capability abstraction with its hardware backends, and the machine
//! configuration model.
//!
//! # Module Structure
//!
//! - [`mask`] - Axis/motor bitmask types and bit-addressing helpers
//! - [`pin`] - Pin capability contract, backends and spec resolution
//! - [`config`] - TOML machine configuration model
//!
//! The real-time pulse path in `kerf_motion` consumes only the resolved
//! [`pin::Pin`] contract; everything string-driven (pin specs, backend
//! names) is resolved once at configuration time.

pub mod config;
pub mod mask;
pub mod pin;

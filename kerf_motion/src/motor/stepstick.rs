//! Direct-pulse stepper backend.
//!
//! Drives a step/dir driver module through three digital lines. The step
//! and direction pins must be interrupt-safe; the disable line is
//! optional when the driver's enable input is wired to the machine's
//! shared disable rail.

use tracing::info;

use kerf_common::pin::{Pin, PinAttributes};

use crate::axis::AxisSettings;

use super::{MotorContext, MotorDriver, SlotAddr, resolve_optional_pin, resolve_step_path_pin};

/// Standard step/dir stepper driver.
pub struct StepStick {
    slot: SlotAddr,
    step_pin: Pin,
    dir_pin: Pin,
    disable_pin: Option<Pin>,
    homing: bool,
}

impl StepStick {
    /// Factory entry for the motor registry.
    pub fn build(ctx: &MotorContext) -> Result<Box<dyn MotorDriver>, crate::error::ConfigError> {
        Ok(Box::new(Self {
            slot: ctx.slot,
            step_pin: resolve_step_path_pin(ctx, &ctx.config.step_pin, "step")?,
            dir_pin: resolve_step_path_pin(ctx, &ctx.config.dir_pin, "direction")?,
            disable_pin: resolve_optional_pin(ctx, &ctx.config.disable_pin, "disable")?,
            homing: ctx.config.homing,
        }))
    }
}

impl MotorDriver for StepStick {
    fn name(&self) -> &'static str {
        "stepstick"
    }

    fn init(&mut self) {
        self.step_pin.set_attr(PinAttributes::OUTPUT);
        self.dir_pin.set_attr(PinAttributes::OUTPUT);
        if let Some(pin) = &mut self.disable_pin {
            pin.set_attr(PinAttributes::OUTPUT);
        }
        info!(
            "{} step:{} dir:{} disable:{}",
            self.slot,
            self.step_pin,
            self.dir_pin,
            self.disable_pin
                .as_ref()
                .map_or("shared", |p| p.spec())
        );
    }

    fn read_settings(&mut self, _settings: &AxisSettings) {
        // Nothing to push: a step/dir module has no registers to reload.
    }

    fn set_homing_mode(&mut self, _is_homing: bool) -> bool {
        self.homing
    }

    fn set_disable(&mut self, disable: bool) {
        if let Some(pin) = &self.disable_pin {
            pin.write(disable);
        }
    }

    fn set_direction(&mut self, forward: bool) {
        self.dir_pin.write(forward);
    }

    fn step(&mut self) {
        self.step_pin.write(true);
    }

    fn unstep(&mut self) {
        self.step_pin.write(false);
    }
}

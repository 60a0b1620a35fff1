//! Peripheral-timed stepper backend.
//!
//! The step line is a self-resetting pulse channel: one arming write per
//! interval, and the peripheral produces the falling edge on its own.
//! `unstep` is therefore a no-op — the inactive level is restored by
//! hardware, not by software.

use tracing::info;

use kerf_common::pin::{Pin, PinAttributes, PinCapabilities};

use crate::axis::AxisSettings;
use crate::error::ConfigError;

use super::{MotorContext, MotorDriver, SlotAddr, resolve_optional_pin, resolve_step_path_pin};

/// Stepper driven through a hardware pulse peripheral.
pub struct TimedStepper {
    slot: SlotAddr,
    step_pin: Pin,
    dir_pin: Pin,
    disable_pin: Option<Pin>,
    homing: bool,
}

impl TimedStepper {
    /// Factory entry for the motor registry.
    pub fn build(ctx: &MotorContext) -> Result<Box<dyn MotorDriver>, ConfigError> {
        let step_pin = resolve_step_path_pin(ctx, &ctx.config.step_pin, "step")?;
        // A timed backend without a pulse peripheral would emit step
        // edges that never end.
        let caps = step_pin.capabilities();
        if !caps.intersects(PinCapabilities::PULSE | PinCapabilities::ERROR) {
            return Err(ConfigError::NotPulseCapable {
                slot: ctx.slot,
                role: "step",
                spec: step_pin.spec().to_string(),
            });
        }
        Ok(Box::new(Self {
            slot: ctx.slot,
            step_pin,
            dir_pin: resolve_step_path_pin(ctx, &ctx.config.dir_pin, "direction")?,
            disable_pin: resolve_optional_pin(ctx, &ctx.config.disable_pin, "disable")?,
            homing: ctx.config.homing,
        }))
    }
}

impl MotorDriver for TimedStepper {
    fn name(&self) -> &'static str {
        "timed"
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
        // Pulse width lives in the peripheral block, configured at
        // resolution time.
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
        // The peripheral restores the inactive level itself.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kerf_common::config::MotorConfig;
    use kerf_common::pin::{PinBanks, PinRegistry};

    fn config(step: &str) -> MotorConfig {
        MotorConfig {
            backend: "timed".to_string(),
            step_pin: Some(step.to_string()),
            dir_pin: Some("gpio.15".to_string()),
            disable_pin: None,
            limit_neg_pin: None,
            limit_pos_pin: None,
            homing: true,
        }
    }

    #[test]
    fn step_arms_the_pulse_channel() {
        let banks = PinBanks::new(4);
        let pins = PinRegistry::with_standard_backends(&banks);
        let cfg = config("pulse.0");
        let ctx = MotorContext {
            slot: SlotAddr { axis: 0, gang: 0 },
            config: &cfg,
            pins: &pins,
        };
        let mut motor = TimedStepper::build(&ctx).unwrap();
        motor.init();

        motor.step();
        motor.unstep();
        motor.step();
        assert_eq!(banks.pulse.pulse_count(0), 2);
    }

    #[test]
    fn rejects_plain_gpio_step_pin() {
        let banks = PinBanks::new(4);
        let pins = PinRegistry::with_standard_backends(&banks);
        let cfg = config("gpio.12");
        let ctx = MotorContext {
            slot: SlotAddr { axis: 0, gang: 0 },
            config: &cfg,
            pins: &pins,
        };
        assert!(matches!(
            TimedStepper::build(&ctx),
            Err(ConfigError::NotPulseCapable { .. })
        ));
    }
}

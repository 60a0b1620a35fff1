//! Explicit absent motor.
//!
//! Fills every unconfigured (axis, gang) slot, so the pulse path never
//! branches on a missing motor: all operations are no-ops, and the slot
//! never volunteers for homing.

use crate::axis::AxisSettings;

use super::{MotorDriver, SlotAddr};

/// Motor standing in for an empty slot.
pub struct NullMotor {
    _slot: SlotAddr,
}

impl NullMotor {
    pub fn build(slot: SlotAddr) -> Box<dyn MotorDriver> {
        Box::new(Self { _slot: slot })
    }
}

impl MotorDriver for NullMotor {
    fn name(&self) -> &'static str {
        "null"
    }

    fn is_real(&self) -> bool {
        false
    }

    fn init(&mut self) {}

    fn read_settings(&mut self, _settings: &AxisSettings) {}

    fn set_homing_mode(&mut self, _is_homing: bool) -> bool {
        false
    }

    fn set_disable(&mut self, _disable: bool) {}

    fn set_direction(&mut self, _forward: bool) {}

    fn step(&mut self) {}

    fn unstep(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_homing_capable() {
        let mut motor = NullMotor::build(SlotAddr { axis: 3, gang: 1 });
        assert!(!motor.is_real());
        assert!(!motor.set_homing_mode(true));
        assert!(!motor.set_homing_mode(false));
    }
}

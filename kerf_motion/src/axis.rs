//! Axis entity: gang slots and calibration settings.

use kerf_common::config::AxisConfig;
use kerf_common::mask::MAX_GANGS;
use kerf_common::pin::Pin;

use crate::motor::{MotorDriver, MotorId};

/// Per-axis calibration reloaded into motors by `read_settings`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSettings {
    pub steps_per_mm: f64,
    pub max_rate_mm_min: f64,
    pub max_travel_mm: f64,
}

impl From<&AxisConfig> for AxisSettings {
    fn from(config: &AxisConfig) -> Self {
        Self {
            steps_per_mm: config.steps_per_mm,
            max_rate_mm_min: config.max_rate_mm_min,
            max_travel_mm: config.max_travel_mm,
        }
    }
}

impl Default for AxisSettings {
    fn default() -> Self {
        (&AxisConfig::default()).into()
    }
}

/// One motor slot of an axis, with its claimed limit switches.
pub struct Gang {
    pub(crate) id: MotorId,
    pub(crate) motor: Box<dyn MotorDriver>,
    pub(crate) limit_neg: Option<Pin>,
    pub(crate) limit_pos: Option<Pin>,
}

impl Gang {
    pub(crate) fn new(
        id: MotorId,
        motor: Box<dyn MotorDriver>,
        limit_neg: Option<Pin>,
        limit_pos: Option<Pin>,
    ) -> Self {
        Self {
            id,
            motor,
            limit_neg,
            limit_pos,
        }
    }

    /// Identity of the motor in this slot.
    #[inline]
    pub fn motor_id(&self) -> MotorId {
        self.id
    }

    pub fn motor(&self) -> &dyn MotorDriver {
        self.motor.as_ref()
    }

    pub fn limit_neg(&self) -> Option<&Pin> {
        self.limit_neg.as_ref()
    }

    pub fn limit_pos(&self) -> Option<&Pin> {
        self.limit_pos.as_ref()
    }
}

/// One logical machine axis owning up to [`MAX_GANGS`] motor slots.
pub struct Axis {
    name: char,
    settings: AxisSettings,
    gangs: [Gang; MAX_GANGS],
}

impl Axis {
    pub(crate) fn new(name: char, settings: AxisSettings, gangs: [Gang; MAX_GANGS]) -> Self {
        Self {
            name,
            settings,
            gangs,
        }
    }

    /// Axis display name.
    #[inline]
    pub fn name(&self) -> char {
        self.name
    }

    /// Calibration settings for this axis.
    #[inline]
    pub fn settings(&self) -> &AxisSettings {
        &self.settings
    }

    /// Gang slot by index.
    #[inline]
    pub fn gang(&self, index: usize) -> &Gang {
        &self.gangs[index]
    }

    #[inline]
    pub(crate) fn gang_mut(&mut self, index: usize) -> &mut Gang {
        &mut self.gangs[index]
    }

    /// If this axis owns the motor, its gang index.
    pub fn has_motor(&self, id: MotorId) -> Option<usize> {
        self.gangs.iter().position(|g| g.id == id)
    }

    /// Whether any slot holds a real (non-null) motor.
    pub fn has_any_motor(&self) -> bool {
        self.gangs.iter().any(|g| g.motor.is_real())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::null::NullMotor;
    use crate::motor::SlotAddr;

    fn null_gang(axis: usize, gang: usize, id: u16) -> Gang {
        Gang::new(
            MotorId(id),
            NullMotor::build(SlotAddr { axis, gang }),
            None,
            None,
        )
    }

    #[test]
    fn membership_query_finds_gang() {
        let axis = Axis::new(
            'x',
            AxisSettings::default(),
            [null_gang(0, 0, 1), null_gang(0, 1, 2)],
        );
        assert_eq!(axis.has_motor(MotorId(1)), Some(0));
        assert_eq!(axis.has_motor(MotorId(2)), Some(1));
        assert_eq!(axis.has_motor(MotorId(3)), None);
    }

    #[test]
    fn inert_axis_has_no_motor() {
        let axis = Axis::new(
            'y',
            AxisSettings::default(),
            [null_gang(1, 0, 1), null_gang(1, 1, 2)],
        );
        assert!(!axis.has_any_motor());
    }

    #[test]
    fn settings_derive_from_config() {
        let config = AxisConfig {
            steps_per_mm: 200.0,
            ..AxisConfig::default()
        };
        let settings = AxisSettings::from(&config);
        assert_eq!(settings.steps_per_mm, 200.0);
    }
}

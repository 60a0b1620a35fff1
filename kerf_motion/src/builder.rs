//! Configuration resolution.
//!
//! Turns the declarative [`MachineConfig`] into a live [`Axes`] topology:
//! every motor is built through the motor backend registry, every pin
//! spec is resolved exactly once, the global masks are accumulated, and
//! unspecified axes or gangs become explicit inert slots. Everything that
//! can go wrong here surfaces as a catchable [`ConfigError`] — the pulse
//! path starts only after resolution has fully succeeded.

use tracing::{debug, info};

use kerf_common::config::{AxisConfig, MachineConfig};
use kerf_common::mask::{MAX_AXES, MAX_GANGS, MotorMask, axis_index, axis_name, set_motor};
use kerf_common::pin::{Pin, PinAttributes, PinBanks, PinRegistry};

use crate::axes::{Axes, AxesParts};
use crate::axis::{Axis, AxisSettings, Gang};
use crate::error::ConfigError;
use crate::motor::{MotorContext, MotorId, MotorRegistry, SlotAddr, null::NullMotor};
use crate::stepping::{PulseClock, SpinClock};

/// Resolve a machine configuration against explicit registries and clock.
pub fn resolve(
    config: &MachineConfig,
    pins: &PinRegistry,
    motors: &MotorRegistry,
    clock: Box<dyn PulseClock>,
) -> Result<Axes, ConfigError> {
    // Map axis-table keys onto axis indices first, so a typo is caught
    // before any pin gets claimed.
    let mut by_index: [Option<&AxisConfig>; MAX_AXES] = [None; MAX_AXES];
    let mut highest = None;
    for (key, axis_config) in &config.axes {
        let index = key
            .chars()
            .next()
            .filter(|_| key.chars().count() == 1)
            .and_then(axis_index)
            .ok_or_else(|| ConfigError::UnknownAxis { name: key.clone() })?;
        by_index[index] = Some(axis_config);
        highest = Some(highest.map_or(index, |h: usize| h.max(index)));
    }

    let n_axis = match config.num_axes {
        Some(n) if n > MAX_AXES => return Err(ConfigError::TooManyAxes { requested: n }),
        Some(n) => n,
        None => highest.map_or(0, |h| h + 1),
    };
    for (index, slot) in by_index.iter().enumerate() {
        if slot.is_some() && index >= n_axis {
            return Err(ConfigError::AxisOutOfRange {
                axis: axis_name(index),
                num_axes: n_axis,
            });
        }
    }

    let mut motor_mask: MotorMask = 0;
    let mut limit_mask: MotorMask = 0;
    let mut homing_mask: MotorMask = 0;
    let mut pos_limit_mask: MotorMask = 0;
    let mut neg_limit_mask: MotorMask = 0;
    let mut next_id: u16 = 1;

    let mut table: [Option<Axis>; MAX_AXES] = [const { None }; MAX_AXES];
    for (index, slot) in table.iter_mut().enumerate() {
        let axis_config = by_index[index];
        let settings = axis_config.map_or_else(AxisSettings::default, Into::into);

        if let Some(axis_config) = axis_config {
            if axis_config.motors.len() > MAX_GANGS {
                return Err(ConfigError::TooManyGangs {
                    axis: axis_name(index),
                    count: axis_config.motors.len(),
                    max: MAX_GANGS,
                });
            }
        }

        let mut build_gang = |gang: usize| -> Result<Gang, ConfigError> {
            let id = MotorId(next_id);
            next_id += 1;
            let slot_addr = SlotAddr { axis: index, gang };

            let Some(motor_config) =
                axis_config.and_then(|a| a.motors.get(gang))
            else {
                return Ok(Gang::new(id, NullMotor::build(slot_addr), None, None));
            };

            let ctx = MotorContext {
                slot: slot_addr,
                config: motor_config,
                pins,
            };
            let motor = motors.create(&motor_config.backend, &ctx)?;

            if motor.is_real() {
                set_motor(&mut motor_mask, index, gang);
                if motor_config.homing {
                    set_motor(&mut homing_mask, index, gang);
                }
            }

            let limit_neg =
                resolve_limit(pins, slot_addr, &motor_config.limit_neg_pin, "limit_neg")?;
            let limit_pos =
                resolve_limit(pins, slot_addr, &motor_config.limit_pos_pin, "limit_pos")?;
            if limit_neg.is_some() {
                set_motor(&mut neg_limit_mask, index, gang);
                set_motor(&mut limit_mask, index, gang);
            }
            if limit_pos.is_some() {
                set_motor(&mut pos_limit_mask, index, gang);
                set_motor(&mut limit_mask, index, gang);
            }

            debug!("resolved {slot_addr} as '{}'", motor.name());
            Ok(Gang::new(id, motor, limit_neg, limit_pos))
        };

        let gang0 = build_gang(0)?;
        let gang1 = build_gang(1)?;
        *slot = Some(Axis::new(axis_name(index), settings, [gang0, gang1]));
    }
    // Every slot was just filled; unwrap cannot fire.
    let axes = table.map(|a| a.unwrap());

    let shared_disable = match &config.shared_disable_pin {
        None => None,
        Some(spec) => Some(
            pins.resolve(spec)
                .map_err(|source| ConfigError::SharedDisable { source })?,
        ),
    };

    info!(
        "Topology resolved: {} axes, motor mask 0x{:08x}, homing mask 0x{:08x}",
        n_axis, motor_mask, homing_mask
    );

    Ok(Axes::from_parts(AxesParts {
        axes,
        n_axis,
        shared_disable,
        clock,
        motor_mask,
        limit_mask,
        homing_mask,
        pos_limit_mask,
        neg_limit_mask,
    }))
}

/// Resolve with the standard pin/motor backends and the spin clock.
///
/// Returns the hardware banks alongside the topology so diagnostics can
/// observe physical levels.
pub fn resolve_standard(config: &MachineConfig) -> Result<(Axes, PinBanks), ConfigError> {
    let banks = PinBanks::new(config.stepping.pulse_us);
    let pins = PinRegistry::with_standard_backends(&banks);
    let motors = MotorRegistry::with_standard_backends();
    let clock = Box::new(SpinClock::new(&config.stepping));
    let axes = resolve(config, &pins, &motors, clock)?;
    Ok((axes, banks))
}

fn resolve_limit(
    pins: &PinRegistry,
    slot: SlotAddr,
    spec: &Option<String>,
    role: &'static str,
) -> Result<Option<Pin>, ConfigError> {
    let Some(spec) = spec else {
        return Ok(None);
    };
    let mut pin = pins
        .resolve(spec)
        .map_err(|source| ConfigError::Pin { slot, role, source })?;
    pin.set_attr(PinAttributes::INPUT);
    Ok(Some(pin))
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use kerf_common::mask::motor_bit;

    fn parse(toml: &str) -> MachineConfig {
        MachineConfig::from_toml(toml).unwrap()
    }

    const DUAL_Y: &str = r#"
shared_disable_pin = "gpio.13"

[axes.x]
motors = [{ step_pin = "gpio.12", dir_pin = "gpio.14", limit_neg_pin = "gpio.34:pu" }]

[axes.y]
motors = [
    { step_pin = "gpio.26", dir_pin = "gpio.15", limit_neg_pin = "gpio.35:pu" },
    { step_pin = "gpio.25", dir_pin = "gpio.33", limit_pos_pin = "gpio.36", homing = false },
]
"#;

    #[test]
    fn resolves_dual_gang_topology() {
        let (axes, _banks) = resolve_standard(&parse(DUAL_Y)).unwrap();
        assert_eq!(axes.n_axis(), 2);
        assert_eq!(axes.axis(0).name(), 'x');
        assert!(axes.axis(0).has_any_motor());
        assert!(axes.axis(1).has_any_motor());

        let expected_motors =
            (1 << motor_bit(0, 0)) | (1 << motor_bit(1, 0)) | (1 << motor_bit(1, 1));
        assert_eq!(axes.motor_mask(), expected_motors);
        assert_eq!(
            axes.homing_mask(),
            (1 << motor_bit(0, 0)) | (1 << motor_bit(1, 0))
        );
        assert_eq!(
            axes.neg_limit_mask(),
            (1 << motor_bit(0, 0)) | (1 << motor_bit(1, 0))
        );
        assert_eq!(axes.pos_limit_mask(), 1 << motor_bit(1, 1));
        assert_eq!(axes.limit_mask(), expected_motors);
    }

    #[test]
    fn unconfigured_axis_is_inert_but_present() {
        let config = parse(
            r#"
[axes.x]
motors = [{ step_pin = "gpio.12", dir_pin = "gpio.14" }]

[axes.z]
motors = [{ step_pin = "gpio.26", dir_pin = "gpio.15" }]
"#,
        );
        let (axes, _banks) = resolve_standard(&config).unwrap();
        assert_eq!(axes.n_axis(), 3);
        assert!(!axes.axis(1).has_any_motor());
        assert_eq!(axes.axis(1).name(), 'y');
        assert_eq!(
            axes.motor_mask(),
            (1 << motor_bit(0, 0)) | (1 << motor_bit(2, 0))
        );
    }

    #[test]
    fn empty_gang_slot_is_null_motor() {
        let (axes, _banks) = resolve_standard(&parse(DUAL_Y)).unwrap();
        assert!(!axes.axis(0).gang(1).motor().is_real());
        assert_eq!(axes.axis(0).gang(1).motor().name(), "null");
    }

    #[test]
    fn rejects_unknown_axis_name() {
        let config = parse("[axes.w]\n");
        assert!(matches!(
            resolve_standard(&config),
            Err(ConfigError::UnknownAxis { .. })
        ));
    }

    #[test]
    fn rejects_three_gangs() {
        let config = parse(
            r#"
[axes.x]
motors = [
    { step_pin = "gpio.1", dir_pin = "gpio.2" },
    { step_pin = "gpio.3", dir_pin = "gpio.4" },
    { step_pin = "gpio.5", dir_pin = "gpio.6" },
]
"#,
        );
        assert!(matches!(
            resolve_standard(&config),
            Err(ConfigError::TooManyGangs { axis: 'x', count: 3, .. })
        ));
    }

    #[test]
    fn rejects_axis_beyond_declared_count() {
        let config = parse(
            r#"
num_axes = 2

[axes.z]
motors = [{ step_pin = "gpio.1", dir_pin = "gpio.2" }]
"#,
        );
        assert!(matches!(
            resolve_standard(&config),
            Err(ConfigError::AxisOutOfRange { axis: 'z', num_axes: 2 })
        ));
    }

    #[test]
    fn rejects_excessive_axis_count() {
        let config = parse("num_axes = 9\n");
        assert!(matches!(
            resolve_standard(&config),
            Err(ConfigError::TooManyAxes { requested: 9 })
        ));
    }

    #[test]
    fn rejects_unknown_motor_backend() {
        let config = parse(
            r#"
[axes.x]
motors = [{ backend = "servo", step_pin = "gpio.1", dir_pin = "gpio.2" }]
"#,
        );
        assert!(matches!(
            resolve_standard(&config),
            Err(ConfigError::UnknownMotorBackend { .. })
        ));
    }

    #[test]
    fn rejects_malformed_shared_disable() {
        let config = parse("shared_disable_pin = \"gpio.nope\"\n");
        assert!(matches!(
            resolve_standard(&config),
            Err(ConfigError::SharedDisable { .. })
        ));
    }

    #[test]
    fn rejects_double_claimed_pin() {
        let config = parse(
            r#"
[axes.x]
motors = [{ step_pin = "gpio.12", dir_pin = "gpio.12" }]
"#,
        );
        assert!(matches!(
            resolve_standard(&config),
            Err(ConfigError::Pin { role: "direction", .. })
        ));
    }

    #[test]
    fn explicit_trailing_axes_stay_inert() {
        let config = parse(
            r#"
num_axes = 3

[axes.x]
motors = [{ step_pin = "gpio.12", dir_pin = "gpio.14" }]
"#,
        );
        let (axes, _banks) = resolve_standard(&config).unwrap();
        assert_eq!(axes.n_axis(), 3);
        assert!(!axes.axis(2).has_any_motor());
    }

    #[test]
    fn empty_config_resolves_to_no_axes() {
        let (axes, _banks) = resolve_standard(&parse("")).unwrap();
        assert_eq!(axes.n_axis(), 0);
        assert_eq!(axes.motor_mask(), 0);
    }
}

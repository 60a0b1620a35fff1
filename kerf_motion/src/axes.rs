//! The Axes manager.
//!
//! Owns the full axis table, the global motor masks, the homing lockout
//! state and the real-time pulse-emission algorithm. The pulse driver
//! calls [`Axes::step`]/[`Axes::unstep`] once per scheduled interval; the
//! homing controller negotiates through [`Axes::set_homing_mode`] and the
//! lock/unlock primitives.
//!
//! Mask/lockout policy lives with the callers; this type supplies the
//! mechanism only.
//!
//! # Single-writer discipline
//!
//! No locks separate the cooperative and interrupt contexts. The lockout
//! mask is written only between motion segments by the homing controller;
//! the cached direction mask is written only inside `step()`. Both
//! contexts go through `&mut self` — the embedder owns the manager and
//! serializes access.

use tracing::info;

use kerf_common::mask::{
    AxisMask, MAX_AXES, MAX_GANGS, MotorMask, axis_is_set, axis_name, clear_bits, motor_is_set,
    set_bits, set_motor,
};
use kerf_common::pin::{Pin, PinAttributes};

use crate::axis::Axis;
use crate::motor::MotorId;
use crate::stepping::PulseClock;

/// Construction payload produced by topology resolution.
pub(crate) struct AxesParts {
    pub axes: [Axis; MAX_AXES],
    pub n_axis: usize,
    pub shared_disable: Option<Pin>,
    pub clock: Box<dyn PulseClock>,
    pub motor_mask: MotorMask,
    pub limit_mask: MotorMask,
    pub homing_mask: MotorMask,
    pub pos_limit_mask: MotorMask,
    pub neg_limit_mask: MotorMask,
}

/// Owner of the axis table and the pulse-emission state.
pub struct Axes {
    axes: [Axis; MAX_AXES],
    n_axis: usize,
    shared_disable: Option<Pin>,
    clock: Box<dyn PulseClock>,

    motor_mask: MotorMask,
    limit_mask: MotorMask,
    homing_mask: MotorMask,
    pos_limit_mask: MotorMask,
    neg_limit_mask: MotorMask,

    /// Motors excluded from step pulses during a homing cycle.
    lockout_mask: MotorMask,
    /// Direction mask issued by the previous `step()`. `None` until the
    /// first call, so the first interval always writes direction pins.
    prev_dir: Option<AxisMask>,
}

impl Axes {
    pub(crate) fn from_parts(parts: AxesParts) -> Self {
        Self {
            axes: parts.axes,
            n_axis: parts.n_axis,
            shared_disable: parts.shared_disable,
            clock: parts.clock,
            motor_mask: parts.motor_mask,
            limit_mask: parts.limit_mask,
            homing_mask: parts.homing_mask,
            pos_limit_mask: parts.pos_limit_mask,
            neg_limit_mask: parts.neg_limit_mask,
            lockout_mask: 0,
            prev_dir: None,
        }
    }

    /// Bring the topology to a runnable state: configure the shared
    /// disable line, clear lockouts, initialize every motor.
    pub fn init(&mut self) {
        info!("Axis count {}", self.n_axis);

        if let Some(pin) = &mut self.shared_disable {
            pin.set_attr(PinAttributes::OUTPUT);
            pin.report("Shared stepper disable");
        }

        self.unlock_all_motors();

        for axis in 0..self.n_axis {
            for gang in 0..MAX_GANGS {
                self.axes[axis].gang_mut(gang).motor.init();
            }
        }
    }

    // ─── Disable ────────────────────────────────────────────────────

    /// Drive the disable level to every motor of one axis and to the
    /// shared hardware line.
    ///
    /// Both paths are needed: some wiring ties every driver's enable to
    /// the shared line while software still tracks logical per-motor
    /// disable for lockout bookkeeping.
    pub fn set_disable(&mut self, axis: usize, disable: bool) {
        for gang in 0..MAX_GANGS {
            self.axes[axis].gang_mut(gang).motor.set_disable(disable);
        }
        if let Some(pin) = &self.shared_disable {
            pin.write(disable);
        }
    }

    /// Drive the disable level to every motor of every axis.
    pub fn set_disable_all(&mut self, disable: bool) {
        for axis in 0..self.n_axis {
            for gang in 0..MAX_GANGS {
                self.axes[axis].gang_mut(gang).motor.set_disable(disable);
            }
        }
        if let Some(pin) = &self.shared_disable {
            pin.write(disable);
        }
    }

    // ─── Settings ───────────────────────────────────────────────────

    /// Reload calibration into every configured motor.
    ///
    /// Sparse population is legal: a slot with no backing motor is
    /// logged and skipped, never fatal.
    pub fn read_settings(&mut self) {
        for axis in 0..self.n_axis {
            let name = axis_name(axis);
            if !self.axes[axis].has_any_motor() {
                info!("No motors configured for axis {name}");
                continue;
            }
            let settings = *self.axes[axis].settings();
            for gang in 0..MAX_GANGS {
                let slot = self.axes[axis].gang_mut(gang);
                if !slot.motor.is_real() {
                    info!("No motor for axis {name} gang {gang}");
                    continue;
                }
                slot.motor.read_settings(&settings);
            }
        }
    }

    // ─── Homing negotiation ─────────────────────────────────────────

    /// Put the motors of the masked axes into (or out of) homing mode.
    ///
    /// Returns the motor-level mask of every motor that confirmed it can
    /// participate; the homing controller uses it for staged cycles and
    /// dual-motor squaring.
    pub fn set_homing_mode(&mut self, axis_mask: AxisMask, is_homing: bool) -> MotorMask {
        // Any homing transition invalidates prior lockout state.
        self.unlock_all_motors();

        let mut motors_can_home: MotorMask = 0;
        for axis in 0..self.n_axis {
            if !axis_is_set(axis_mask, axis) {
                continue;
            }
            for gang in 0..MAX_GANGS {
                if self.axes[axis]
                    .gang_mut(gang)
                    .motor
                    .set_homing_mode(is_homing)
                {
                    set_motor(&mut motors_can_home, axis, gang);
                }
            }
        }
        motors_can_home
    }

    /// Exclude the masked motors from further step pulses.
    pub fn lock_motors(&mut self, mask: MotorMask) {
        set_bits(&mut self.lockout_mask, mask);
    }

    /// Re-admit the masked motors to step pulses.
    pub fn unlock_motors(&mut self, mask: MotorMask) {
        clear_bits(&mut self.lockout_mask, mask);
    }

    /// Clear every motor lockout.
    pub fn unlock_all_motors(&mut self) {
        self.lockout_mask = 0;
    }

    // ─── Pulse path ─────────────────────────────────────────────────

    /// Emit one pulse interval: latch directions if they changed, then
    /// issue step edges to every unlocked motor of the masked axes.
    ///
    /// Runs at pulse cadence in interrupt context: no blocking beyond
    /// the bounded spin waits, no allocation, no logging.
    pub fn step(&mut self, step_mask: AxisMask, dir_mask: AxisMask) {
        // Direction pins are rewritten only when the mask changed since
        // the previous interval.
        if self.prev_dir != Some(dir_mask) {
            self.prev_dir = Some(dir_mask);

            for axis in 0..self.n_axis {
                let forward = axis_is_set(dir_mask, axis);
                for gang in 0..MAX_GANGS {
                    self.axes[axis].gang_mut(gang).motor.set_direction(forward);
                }
            }
            self.clock.wait_direction();
        }

        self.clock.begin_pulse();

        for axis in 0..self.n_axis {
            if !axis_is_set(step_mask, axis) {
                continue;
            }
            for gang in 0..MAX_GANGS {
                // Lockout gates individual motors, not axes: a locked
                // gang sits still while its sibling keeps squaring.
                if !motor_is_set(self.lockout_mask, axis, gang) {
                    self.axes[axis].gang_mut(gang).motor.step();
                }
            }
        }
    }

    /// Close the pulse window: hold the minimum width, then return every
    /// step line to its inactive level.
    ///
    /// Lockout is not consulted — the inactive level must be restored
    /// regardless, or a locked motor would hold a stuck active pulse.
    pub fn unstep(&mut self) {
        self.clock.wait_pulse_width();

        for axis in 0..self.n_axis {
            for gang in 0..MAX_GANGS {
                self.axes[axis].gang_mut(gang).motor.unstep();
            }
        }

        self.clock.end_pulse();
    }

    // ─── Reverse lookups ────────────────────────────────────────────

    /// Axis index owning the given motor.
    ///
    /// # Panics
    /// Panics if no axis owns the motor — a broken ownership invariant
    /// is a lifecycle bug, not a recoverable condition.
    pub fn find_axis_index(&self, motor: MotorId) -> usize {
        for axis in 0..self.n_axis {
            if self.axes[axis].has_motor(motor).is_some() {
                return axis;
            }
        }
        panic!("no axis owns motor {motor}; topology is corrupt");
    }

    /// Gang index of the given motor within its axis.
    ///
    /// # Panics
    /// Panics if no axis owns the motor.
    pub fn find_axis_ganged(&self, motor: MotorId) -> usize {
        for axis in 0..self.n_axis {
            if let Some(gang) = self.axes[axis].has_motor(motor) {
                return gang;
            }
        }
        panic!("no axis owns motor {motor}; topology is corrupt");
    }

    // ─── Accessors ──────────────────────────────────────────────────

    /// Number of live axes.
    #[inline]
    pub fn n_axis(&self) -> usize {
        self.n_axis
    }

    /// Axis by index. Slots beyond `n_axis` are inert but present.
    #[inline]
    pub fn axis(&self, index: usize) -> &Axis {
        &self.axes[index]
    }

    /// Union of all configured real motors.
    #[inline]
    pub fn motor_mask(&self) -> MotorMask {
        self.motor_mask
    }

    /// Union of all motors with any limit switch.
    #[inline]
    pub fn limit_mask(&self) -> MotorMask {
        self.limit_mask
    }

    /// Union of all homing-participating motors.
    #[inline]
    pub fn homing_mask(&self) -> MotorMask {
        self.homing_mask
    }

    /// Motors with a positive-travel limit switch.
    #[inline]
    pub fn pos_limit_mask(&self) -> MotorMask {
        self.pos_limit_mask
    }

    /// Motors with a negative-travel limit switch.
    #[inline]
    pub fn neg_limit_mask(&self) -> MotorMask {
        self.neg_limit_mask
    }

    /// Motors currently excluded from step pulses.
    #[inline]
    pub fn lockout_mask(&self) -> MotorMask {
        self.lockout_mask
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

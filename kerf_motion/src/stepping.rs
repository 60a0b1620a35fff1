//! Pulse-window timing contract.
//!
//! The Axes manager signals the timing backend at four points of every
//! pulse interval:
//!
//! 1. `wait_direction` - after rewriting direction pins, before any step
//!    edge (direction-setup time of the driver hardware)
//! 2. `begin_pulse` - window start, unconditionally once per `step()`
//! 3. `wait_pulse_width` - before restoring inactive levels (minimum
//!    active width)
//! 4. `end_pulse` - window finished; the driver may schedule the next
//!    interval or an idle timeout
//!
//! # Timing Contracts
//!
//! | Operation          | Bound            | RT Constraint |
//! |--------------------|------------------|---------------|
//! | `wait_direction`   | dir_delay_us     | spin, no sleep|
//! | `begin_pulse`      | O(1)             | **HARD**      |
//! | `wait_pulse_width` | pulse_us         | spin, no sleep|
//! | `end_pulse`        | O(1)             | **HARD**      |

use std::time::{Duration, Instant};

use kerf_common::config::SteppingConfig;

/// Timing backend driven by the pulse path.
pub trait PulseClock: Send {
    /// Hold until direction pins have settled.
    fn wait_direction(&mut self);

    /// Mark the start of a pulse window.
    fn begin_pulse(&mut self);

    /// Hold until the minimum pulse width has elapsed since `begin_pulse`.
    fn wait_pulse_width(&mut self);

    /// Mark the end of a pulse window.
    fn end_pulse(&mut self);
}

/// Busy-wait clock over the monotonic system timer.
///
/// Waits spin rather than sleep: the delays are single-digit
/// microseconds and a scheduler round-trip would wreck the cadence.
pub struct SpinClock {
    dir_delay: Duration,
    pulse_width: Duration,
    pulse_started: Option<Instant>,
    windows: u64,
}

impl SpinClock {
    pub fn new(config: &SteppingConfig) -> Self {
        Self {
            dir_delay: Duration::from_micros(config.dir_delay_us as u64),
            pulse_width: Duration::from_micros(config.pulse_us as u64),
            pulse_started: None,
            windows: 0,
        }
    }

    /// Completed pulse windows since startup, for diagnostics.
    pub fn windows(&self) -> u64 {
        self.windows
    }

    fn spin_until(deadline: Instant) {
        while Instant::now() < deadline {
            core::hint::spin_loop();
        }
    }
}

impl PulseClock for SpinClock {
    fn wait_direction(&mut self) {
        if !self.dir_delay.is_zero() {
            Self::spin_until(Instant::now() + self.dir_delay);
        }
    }

    fn begin_pulse(&mut self) {
        self.pulse_started = Some(Instant::now());
        self.windows += 1;
    }

    fn wait_pulse_width(&mut self) {
        if let Some(started) = self.pulse_started {
            Self::spin_until(started + self.pulse_width);
        }
    }

    fn end_pulse(&mut self) {
        self.pulse_started = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pulse_us: u32, dir_delay_us: u32) -> SteppingConfig {
        SteppingConfig {
            pulse_us,
            dir_delay_us,
            ..SteppingConfig::default()
        }
    }

    #[test]
    fn counts_pulse_windows() {
        let mut clock = SpinClock::new(&config(0, 0));
        clock.begin_pulse();
        clock.wait_pulse_width();
        clock.end_pulse();
        clock.begin_pulse();
        clock.end_pulse();
        assert_eq!(clock.windows(), 2);
    }

    #[test]
    fn honors_minimum_pulse_width() {
        let mut clock = SpinClock::new(&config(200, 0));
        let before = Instant::now();
        clock.begin_pulse();
        clock.wait_pulse_width();
        assert!(before.elapsed() >= Duration::from_micros(200));
        clock.end_pulse();
    }

    #[test]
    fn wait_without_window_returns_immediately() {
        let mut clock = SpinClock::new(&config(1_000_000, 0));
        let before = Instant::now();
        clock.wait_pulse_width();
        assert!(before.elapsed() < Duration::from_millis(100));
    }
}

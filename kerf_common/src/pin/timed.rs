//! Hardware-timed pulse channel backend.
//!
//! Models a peripheral (RMT-style) that, once armed, emits a step pulse of
//! a fixed width and returns the line to its idle level on its own. The
//! arming write is a single atomic operation, safe at pulse cadence; the
//! channel keeps a pulse counter so diagnostics and tests can observe
//! emitted edges.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use super::backend::PinBackend;
use super::caps::{PinAttributes, PinCapabilities};

/// Number of pulse channels in the block.
pub const PULSE_CHANNELS: usize = 8;

#[derive(Debug, Default)]
struct Channel {
    pulses: AtomicU64,
}

/// Shared state of the timed-pulse peripheral block.
#[derive(Debug)]
pub struct PulseBlock {
    channels: [Channel; PULSE_CHANNELS],
    claims: AtomicU32,
    pulse_us: u32,
}

impl PulseBlock {
    /// Configure the block with the pulse width every channel will emit.
    pub fn new(pulse_us: u32) -> Arc<Self> {
        Arc::new(Self {
            channels: Default::default(),
            claims: AtomicU32::new(0),
            pulse_us,
        })
    }

    /// Claim exclusive ownership of a channel. Returns false if taken.
    pub(crate) fn claim(&self, channel: u8) -> bool {
        self.claims.fetch_or(1 << channel, Ordering::Relaxed) & (1 << channel) == 0
    }

    /// Pulses emitted by a channel so far.
    pub fn pulse_count(&self, channel: u8) -> u64 {
        self.channels[channel as usize].pulses.load(Ordering::Relaxed)
    }

    /// Configured pulse width in microseconds.
    pub fn pulse_us(&self) -> u32 {
        self.pulse_us
    }
}

/// One claimed timed-pulse channel.
pub struct TimedPulsePin {
    block: Arc<PulseBlock>,
    channel: u8,
    attrs: PinAttributes,
}

impl TimedPulsePin {
    pub(crate) fn new(block: Arc<PulseBlock>, channel: u8, attrs: PinAttributes) -> Self {
        Self {
            block,
            channel,
            attrs,
        }
    }
}

impl PinBackend for TimedPulsePin {
    fn capabilities(&self) -> PinCapabilities {
        PinCapabilities::OUTPUT | PinCapabilities::RT | PinCapabilities::PULSE
    }

    fn write(&self, high: bool) {
        // Rising logical edge arms the peripheral; the falling edge is
        // produced by hardware when the pulse width elapses.
        if high {
            self.block.channels[self.channel as usize]
                .pulses
                .fetch_add(1, Ordering::Relaxed);
        }
    }

    fn read(&self) -> bool {
        // The line idles low between pulses.
        false
    }

    fn set_attr(&mut self, attrs: PinAttributes) {
        self.attrs |= attrs;
    }

    fn get_attr(&self) -> PinAttributes {
        self.attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arming_counts_pulses() {
        let block = PulseBlock::new(4);
        block.claim(0);
        let pin = TimedPulsePin::new(block.clone(), 0, PinAttributes::empty());

        pin.write(true);
        pin.write(true);
        assert_eq!(block.pulse_count(0), 2);
        // The inactive write is absorbed by the self-resetting hardware.
        pin.write(false);
        assert_eq!(block.pulse_count(0), 2);
    }

    #[test]
    fn line_idles_inactive() {
        let block = PulseBlock::new(4);
        let pin = TimedPulsePin::new(block, 1, PinAttributes::empty());
        pin.write(true);
        assert!(!pin.read());
    }

    #[test]
    fn rt_and_pulse_capable() {
        let block = PulseBlock::new(2);
        let pin = TimedPulsePin::new(block, 2, PinAttributes::empty());
        assert!(pin.capabilities().contains(PinCapabilities::RT));
        assert!(pin.capabilities().contains(PinCapabilities::PULSE));
    }
}

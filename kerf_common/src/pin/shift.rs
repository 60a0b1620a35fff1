//! Serial shift-register chain output backend.
//!
//! Writes land in a staging image of the chain; nothing reaches hardware
//! until a non-real-time [`ShiftChain::flush`] shifts the image out and
//! latches it. The backend therefore never advertises
//! [`PinCapabilities::RT`], which keeps it out of the pulse path at
//! resolution time rather than by a check inside the interrupt handler.
//! Slow housekeeping lines (disable rails, coolant relays) are its job.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use super::backend::PinBackend;
use super::caps::{PinAttributes, PinCapabilities};

/// Number of output bits in the chain.
pub const SHIFT_BITS: usize = 32;

/// Shared state of one shift-register chain.
#[derive(Debug, Default)]
pub struct ShiftChain {
    staged: AtomicU32,
    latched: AtomicU32,
    claims: AtomicU32,
    flushes: AtomicU64,
}

impl ShiftChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Claim exclusive ownership of a chain bit. Returns false if taken.
    pub(crate) fn claim(&self, bit: u8) -> bool {
        self.claims.fetch_or(1 << bit, Ordering::Relaxed) & (1 << bit) == 0
    }

    /// Shift the staged image out and latch it. Not pulse-path safe.
    pub fn flush(&self) {
        let image = self.staged.load(Ordering::Relaxed);
        self.latched.store(image, Ordering::Relaxed);
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    /// Latched (hardware-visible) level of a chain bit.
    pub fn latched(&self, bit: u8) -> bool {
        self.latched.load(Ordering::Relaxed) & (1 << bit) != 0
    }

    /// Number of completed flushes, for diagnostics.
    pub fn flush_count(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }

    fn stage(&self, bit: u8, high: bool) {
        if high {
            self.staged.fetch_or(1 << bit, Ordering::Relaxed);
        } else {
            self.staged.fetch_and(!(1 << bit), Ordering::Relaxed);
        }
    }

    fn staged_bit(&self, bit: u8) -> bool {
        self.staged.load(Ordering::Relaxed) & (1 << bit) != 0
    }
}

/// One claimed bit of a shift-register chain.
pub struct ShiftRegisterPin {
    chain: Arc<ShiftChain>,
    bit: u8,
    attrs: PinAttributes,
}

impl ShiftRegisterPin {
    pub(crate) fn new(chain: Arc<ShiftChain>, bit: u8, attrs: PinAttributes) -> Self {
        Self { chain, bit, attrs }
    }

    #[inline]
    fn active_low(&self) -> bool {
        self.attrs.contains(PinAttributes::ACTIVE_LOW)
    }
}

impl PinBackend for ShiftRegisterPin {
    fn capabilities(&self) -> PinCapabilities {
        PinCapabilities::OUTPUT
    }

    fn write(&self, high: bool) {
        self.chain.stage(self.bit, high ^ self.active_low());
    }

    fn read(&self) -> bool {
        self.chain.staged_bit(self.bit) ^ self.active_low()
    }

    fn set_attr(&mut self, attrs: PinAttributes) {
        self.attrs |= attrs;
        if attrs.contains(PinAttributes::OUTPUT) {
            self.write(self.attrs.contains(PinAttributes::INITIAL_ON));
        }
    }

    fn get_attr(&self) -> PinAttributes {
        self.attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_stay_staged_until_flush() {
        let chain = ShiftChain::new();
        chain.claim(3);
        let pin = ShiftRegisterPin::new(chain.clone(), 3, PinAttributes::empty());

        pin.write(true);
        assert!(!chain.latched(3));

        chain.flush();
        assert!(chain.latched(3));
        assert_eq!(chain.flush_count(), 1);
    }

    #[test]
    fn not_rt_capable() {
        let chain = ShiftChain::new();
        let pin = ShiftRegisterPin::new(chain, 0, PinAttributes::empty());
        assert!(!pin.capabilities().contains(PinCapabilities::RT));
    }

    #[test]
    fn claim_is_exclusive() {
        let chain = ShiftChain::new();
        assert!(chain.claim(9));
        assert!(!chain.claim(9));
    }

    #[test]
    fn active_low_inverts_staged_image() {
        let chain = ShiftChain::new();
        chain.claim(1);
        let pin = ShiftRegisterPin::new(chain.clone(), 1, PinAttributes::ACTIVE_LOW);
        pin.write(false);
        chain.flush();
        assert!(chain.latched(1));
        assert!(!pin.read());
    }
}

//! Direct digital I/O backend.
//!
//! Lines live in a word-addressed port bank of atomics, one bit per line.
//! Reads and writes are single atomic bit operations, safe from interrupt
//! context. Each line is claimed exactly once at resolution time; the
//! resulting [`GpioPin`] is the line's sole owner, while the bank handle
//! lets diagnostics observe physical levels without taking ownership.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use super::backend::PinBackend;
use super::caps::{PinAttributes, PinCapabilities};

/// Number of addressable direct-I/O lines.
pub const GPIO_LINES: usize = 64;

const WORDS: usize = GPIO_LINES / 32;

/// Physical level state for all direct-I/O lines.
#[derive(Debug, Default)]
pub struct GpioBank {
    levels: [AtomicU32; WORDS],
    claims: [AtomicU32; WORDS],
}

impl GpioBank {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Claim exclusive ownership of a line. Returns false if already taken.
    pub(crate) fn claim(&self, line: u8) -> bool {
        let (word, bit) = Self::locate(line);
        self.claims[word].fetch_or(1 << bit, Ordering::Relaxed) & (1 << bit) == 0
    }

    /// Physical (post-inversion) level of a line.
    pub fn level(&self, line: u8) -> bool {
        let (word, bit) = Self::locate(line);
        self.levels[word].load(Ordering::Relaxed) & (1 << bit) != 0
    }

    /// Force a physical level from outside, e.g. a simulated input edge.
    pub fn drive(&self, line: u8, high: bool) {
        self.set_level(line, high);
    }

    fn set_level(&self, line: u8, high: bool) {
        let (word, bit) = Self::locate(line);
        if high {
            self.levels[word].fetch_or(1 << bit, Ordering::Relaxed);
        } else {
            self.levels[word].fetch_and(!(1 << bit), Ordering::Relaxed);
        }
    }

    #[inline]
    fn locate(line: u8) -> (usize, u32) {
        ((line as usize) / 32, (line as u32) % 32)
    }
}

/// One claimed direct-I/O line.
pub struct GpioPin {
    bank: Arc<GpioBank>,
    line: u8,
    attrs: PinAttributes,
}

impl GpioPin {
    /// Build on a claimed line with the attributes parsed from its spec.
    pub(crate) fn new(bank: Arc<GpioBank>, line: u8, attrs: PinAttributes) -> Self {
        Self { bank, line, attrs }
    }

    #[inline]
    fn active_low(&self) -> bool {
        self.attrs.contains(PinAttributes::ACTIVE_LOW)
    }
}

impl PinBackend for GpioPin {
    fn capabilities(&self) -> PinCapabilities {
        PinCapabilities::INPUT
            | PinCapabilities::OUTPUT
            | PinCapabilities::PULLUP
            | PinCapabilities::PULLDOWN
            | PinCapabilities::RT
    }

    fn write(&self, high: bool) {
        self.bank.set_level(self.line, high ^ self.active_low());
    }

    fn read(&self) -> bool {
        self.bank.level(self.line) ^ self.active_low()
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

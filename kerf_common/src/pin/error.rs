//! Fail-fast backend for missing or malformed pin specifications.
//!
//! Attribute configuration is accepted as a no-op so topology building can
//! proceed, but any attempt to actually read or write the line halts the
//! firmware: an unspecified motion pin must never yield a plausible level.

use super::backend::PinBackend;
use super::caps::{PinAttributes, PinCapabilities};

/// The error/null pin backend.
#[derive(Debug, Default)]
pub struct ErrorPin;

impl ErrorPin {
    pub fn new() -> Self {
        Self
    }
}

impl PinBackend for ErrorPin {
    fn capabilities(&self) -> PinCapabilities {
        PinCapabilities::ERROR
    }

    fn write(&self, _high: bool) {
        panic!("cannot write to an error pin");
    }

    fn read(&self) -> bool {
        panic!("cannot read from an error pin");
    }

    fn set_attr(&mut self, _attrs: PinAttributes) {
        // Accepted and dropped; only read/write fault.
    }

    fn get_attr(&self) -> PinAttributes {
        PinAttributes::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_are_accepted_and_empty() {
        let mut pin = ErrorPin::new();
        pin.set_attr(PinAttributes::OUTPUT | PinAttributes::ACTIVE_LOW);
        assert_eq!(pin.get_attr(), PinAttributes::empty());
        assert_eq!(pin.capabilities(), PinCapabilities::ERROR);
    }

    #[test]
    #[should_panic(expected = "cannot write to an error pin")]
    fn write_faults() {
        ErrorPin::new().write(true);
    }

    #[test]
    #[should_panic(expected = "cannot read from an error pin")]
    fn read_faults() {
        let _ = ErrorPin::new().read();
    }
}

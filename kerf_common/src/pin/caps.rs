//! Pin capability and attribute flag sets.

use bitflags::bitflags;

bitflags! {
    /// What a hardware line supports, reported by its backend.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PinCapabilities: u16 {
        /// Line can be read as a digital input.
        const INPUT = 1 << 0;
        /// Line can be driven as a digital output.
        const OUTPUT = 1 << 1;
        /// Internal pull-up available.
        const PULLUP = 1 << 2;
        /// Internal pull-down available.
        const PULLDOWN = 1 << 3;
        /// Hardware PWM available.
        const PWM = 1 << 4;
        /// Read/write are safe from interrupt context.
        const RT = 1 << 5;
        /// Arming the line emits a hardware-timed, self-resetting pulse.
        const PULSE = 1 << 6;
        /// Error backend: every read/write faults.
        const ERROR = 1 << 7;
    }
}

bitflags! {
    /// What has been configured onto a line.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PinAttributes: u16 {
        /// Configured as input.
        const INPUT = 1 << 0;
        /// Configured as output.
        const OUTPUT = 1 << 1;
        /// Pull-up enabled.
        const PULLUP = 1 << 2;
        /// Pull-down enabled.
        const PULLDOWN = 1 << 3;
        /// Logical true drives the physical line low.
        const ACTIVE_LOW = 1 << 4;
        /// Drive the active level immediately when configured as output.
        const INITIAL_ON = 1 << 5;
    }
}

impl PinAttributes {
    /// Whether a capability set can honor these attributes.
    pub fn supported_by(self, caps: PinCapabilities) -> bool {
        let mut required = PinCapabilities::empty();
        if self.contains(Self::INPUT) {
            required |= PinCapabilities::INPUT;
        }
        if self.contains(Self::OUTPUT) {
            required |= PinCapabilities::OUTPUT;
        }
        if self.contains(Self::PULLUP) {
            required |= PinCapabilities::PULLUP;
        }
        if self.contains(Self::PULLDOWN) {
            required |= PinCapabilities::PULLDOWN;
        }
        caps.contains(required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_supported_by_capabilities() {
        let caps = PinCapabilities::INPUT | PinCapabilities::OUTPUT | PinCapabilities::PULLUP;
        assert!(PinAttributes::OUTPUT.supported_by(caps));
        assert!((PinAttributes::INPUT | PinAttributes::PULLUP).supported_by(caps));
        assert!(!(PinAttributes::INPUT | PinAttributes::PULLDOWN).supported_by(caps));
    }

    #[test]
    fn inversion_needs_no_capability() {
        assert!(PinAttributes::ACTIVE_LOW.supported_by(PinCapabilities::empty()));
    }
}

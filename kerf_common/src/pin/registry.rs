//! Name-keyed pin backend registry and textual spec resolution.
//!
//! A pin spec is `backend.index[:option...]`, e.g. `gpio.14`,
//! `gpio.33:low:pu`, `shift.3`, `pulse.0`. Options: `low`/`high` for
//! active level, `pu`/`pd` for pulls. Specs are resolved exactly once,
//! during configuration resolution; the pulse path only ever sees the
//! resulting [`Pin`].

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use super::backend::{Pin, PinBackend};
use super::caps::PinAttributes;
use super::error::ErrorPin;
use super::gpio::{GPIO_LINES, GpioBank, GpioPin};
use super::shift::{SHIFT_BITS, ShiftChain, ShiftRegisterPin};
use super::timed::{PULSE_CHANNELS, PulseBlock, TimedPulsePin};

/// Pin spec parsing / resolution error.
#[derive(Debug, Clone, Error)]
pub enum PinSpecError {
    /// Spec string does not match `backend.index[:option...]`.
    #[error("malformed pin spec '{spec}': {reason}")]
    Malformed { spec: String, reason: String },

    /// No backend registered under this name.
    #[error("unknown pin backend '{name}'")]
    UnknownBackend { name: String },

    /// Spec option not recognized.
    #[error("unknown option '{option}' in pin spec '{spec}'")]
    UnknownOption { spec: String, option: String },

    /// Line index exceeds what the backend provides.
    #[error("pin spec '{spec}' addresses line beyond backend limit {max}")]
    LineOutOfRange { spec: String, max: usize },

    /// Line already resolved for another pin.
    #[error("line '{spec}' is already claimed")]
    LineClaimed { spec: String },
}

/// A parsed, not yet resolved, pin spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinSpec {
    /// Backend name (`gpio`, `shift`, `pulse`, `error`).
    pub backend: String,
    /// Line index within the backend.
    pub index: u8,
    /// Attributes implied by spec options.
    pub attrs: PinAttributes,
}

impl FromStr for PinSpec {
    type Err = PinSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| PinSpecError::Malformed {
            spec: s.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = s.split(':');
        let head = parts.next().ok_or_else(|| malformed("empty spec"))?;
        if head.is_empty() {
            return Err(malformed("empty spec"));
        }

        let (backend, index) = match head.split_once('.') {
            Some((name, idx)) => {
                let index: u8 = idx
                    .parse()
                    .map_err(|_| malformed("line index is not a number"))?;
                (name, index)
            }
            // Index-free form, used by the `error` backend.
            None => (head, 0),
        };
        if backend.is_empty() {
            return Err(malformed("missing backend name"));
        }

        let mut attrs = PinAttributes::empty();
        for option in parts {
            match option {
                "low" => attrs |= PinAttributes::ACTIVE_LOW,
                "high" => {}
                "pu" => attrs |= PinAttributes::PULLUP,
                "pd" => attrs |= PinAttributes::PULLDOWN,
                other => {
                    return Err(PinSpecError::UnknownOption {
                        spec: s.to_string(),
                        option: other.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            backend: backend.to_string(),
            index,
            attrs,
        })
    }
}

/// Factory producing a backend instance for a parsed spec.
pub type PinFactory = Box<dyn Fn(&PinSpec) -> Result<Box<dyn PinBackend>, PinSpecError> + Send + Sync>;

/// Shared hardware state behind the standard backends.
///
/// Held by the embedder so diagnostics and tests can observe physical
/// levels; the registry's factories claim individual lines out of it.
#[derive(Clone)]
pub struct PinBanks {
    pub gpio: Arc<GpioBank>,
    pub shift: Arc<ShiftChain>,
    pub pulse: Arc<PulseBlock>,
}

impl PinBanks {
    /// Create fresh hardware state; `pulse_us` configures the timed block.
    pub fn new(pulse_us: u32) -> Self {
        Self {
            gpio: GpioBank::new(),
            shift: ShiftChain::new(),
            pulse: PulseBlock::new(pulse_us),
        }
    }
}

/// Registry of available pin backends.
///
/// Constructed at startup, populated via `register()`, then used for
/// one-shot spec resolution. No global state.
pub struct PinRegistry {
    factories: HashMap<&'static str, PinFactory>,
}

impl PinRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the standard backends claiming lines from `banks`.
    pub fn with_standard_backends(banks: &PinBanks) -> Self {
        let mut registry = Self::new();

        let gpio = banks.gpio.clone();
        registry.register(
            "gpio",
            Box::new(move |spec| {
                if spec.index as usize >= GPIO_LINES {
                    return Err(PinSpecError::LineOutOfRange {
                        spec: spec.to_spec_string(),
                        max: GPIO_LINES - 1,
                    });
                }
                if !gpio.claim(spec.index) {
                    return Err(PinSpecError::LineClaimed {
                        spec: spec.to_spec_string(),
                    });
                }
                Ok(Box::new(GpioPin::new(gpio.clone(), spec.index, spec.attrs)))
            }),
        );

        let shift = banks.shift.clone();
        registry.register(
            "shift",
            Box::new(move |spec| {
                if spec.index as usize >= SHIFT_BITS {
                    return Err(PinSpecError::LineOutOfRange {
                        spec: spec.to_spec_string(),
                        max: SHIFT_BITS - 1,
                    });
                }
                if !shift.claim(spec.index) {
                    return Err(PinSpecError::LineClaimed {
                        spec: spec.to_spec_string(),
                    });
                }
                Ok(Box::new(ShiftRegisterPin::new(
                    shift.clone(),
                    spec.index,
                    spec.attrs,
                )))
            }),
        );

        let pulse = banks.pulse.clone();
        registry.register(
            "pulse",
            Box::new(move |spec| {
                if spec.index as usize >= PULSE_CHANNELS {
                    return Err(PinSpecError::LineOutOfRange {
                        spec: spec.to_spec_string(),
                        max: PULSE_CHANNELS - 1,
                    });
                }
                if !pulse.claim(spec.index) {
                    return Err(PinSpecError::LineClaimed {
                        spec: spec.to_spec_string(),
                    });
                }
                Ok(Box::new(TimedPulsePin::new(
                    pulse.clone(),
                    spec.index,
                    spec.attrs,
                )))
            }),
        );

        registry.register("error", Box::new(|_spec| Ok(Box::new(ErrorPin::new()))));

        registry
    }

    /// Register a backend factory.
    ///
    /// # Panics
    /// Panics if a backend with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: PinFactory) {
        if self.factories.contains_key(name) {
            panic!("pin backend '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    /// Whether a backend name is registered.
    pub fn has_backend(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Resolve a textual spec into an owned [`Pin`].
    pub fn resolve(&self, spec_str: &str) -> Result<Pin, PinSpecError> {
        let spec: PinSpec = spec_str.parse()?;
        let factory =
            self.factories
                .get(spec.backend.as_str())
                .ok_or_else(|| PinSpecError::UnknownBackend {
                    name: spec.backend.clone(),
                })?;
        let backend = factory(&spec)?;
        Ok(Pin::new(backend, spec_str))
    }
}

impl Default for PinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PinSpec {
    fn to_spec_string(&self) -> String {
        format!("{}.{}", self.backend, self.index)
    }
}

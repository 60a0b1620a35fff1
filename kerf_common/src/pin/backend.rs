//! The `PinBackend` trait and the owning `Pin` wrapper.
//!
//! A backend is the single owner of one hardware line's register state.
//! Higher layers hold a [`Pin`], which adds the original spec string for
//! diagnostics and a `Display` implementation.

use core::fmt;

use tracing::info;

use super::caps::{PinAttributes, PinCapabilities};
use super::error::ErrorPin;

/// Uniform contract over one addressable hardware line.
///
/// # Real-time constraints
///
/// `read`/`write` on backends advertising [`PinCapabilities::RT`] must be
/// callable from interrupt context: no locking, no allocation, no logging.
/// `set_attr` is configuration-time only and exempt from those rules.
pub trait PinBackend: Send + Sync {
    /// Supported operation set of this line.
    fn capabilities(&self) -> PinCapabilities;

    /// Drive the line to the given logical level.
    fn write(&self, high: bool);

    /// Read the line's logical level.
    fn read(&self) -> bool;

    /// Configure direction, pulls and inversion.
    fn set_attr(&mut self, attrs: PinAttributes);

    /// Currently configured attribute set.
    fn get_attr(&self) -> PinAttributes;
}

/// An owned, resolved hardware line.
pub struct Pin {
    backend: Box<dyn PinBackend>,
    spec: String,
}

impl Pin {
    /// Wrap a resolved backend, keeping the spec it was resolved from.
    pub fn new(backend: Box<dyn PinBackend>, spec: impl Into<String>) -> Self {
        Self {
            backend,
            spec: spec.into(),
        }
    }

    /// A fail-fast placeholder for a required pin that was never specified.
    pub fn unspecified() -> Self {
        Self::new(Box::new(ErrorPin::new()), "unspecified")
    }

    #[inline]
    pub fn capabilities(&self) -> PinCapabilities {
        self.backend.capabilities()
    }

    /// Whether this line may be touched from the pulse path.
    #[inline]
    pub fn rt_capable(&self) -> bool {
        let caps = self.backend.capabilities();
        caps.intersects(PinCapabilities::RT | PinCapabilities::ERROR)
    }

    #[inline]
    pub fn write(&self, high: bool) {
        self.backend.write(high);
    }

    #[inline]
    pub fn read(&self) -> bool {
        self.backend.read()
    }

    pub fn set_attr(&mut self, attrs: PinAttributes) {
        // Error pins accept any configuration; they fault on use instead.
        let caps = self.backend.capabilities();
        debug_assert!(
            caps.contains(PinCapabilities::ERROR) || attrs.supported_by(caps),
            "attributes {attrs:?} unsupported by pin {}",
            self.spec
        );
        self.backend.set_attr(attrs);
    }

    pub fn get_attr(&self) -> PinAttributes {
        self.backend.get_attr()
    }

    /// The textual spec this pin was resolved from.
    pub fn spec(&self) -> &str {
        &self.spec
    }

    /// Log a one-line description of this pin under the given tag.
    pub fn report(&self, tag: &str) {
        info!("{tag}: {self}");
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.spec)
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pin")
            .field("spec", &self.spec)
            .field("caps", &self.backend.capabilities())
            .finish()
    }
}

//! Offscreen OpenGL context creation and per-thread currency.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use log::{debug, trace};

use crate::backend::{Backend, RawContext};
use crate::config::{self, FramebufferConfig};
use crate::current;
use crate::error::{ErrorKind, Result};
use crate::extensions;

/// The OpenGL version a context must support at least.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// Major version of the Api.
    pub major: u8,
    /// Minor version of the Api.
    pub minor: u8,
}

impl Version {
    /// Create new version with the given `major` and `minor` values.
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

/// OpenGL 2.0 is requested when no version is given.
impl Default for Version {
    fn default() -> Self {
        Self::new(2, 0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// The OpenGL profile to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlProfile {
    /// Include all the future-compatible functions and definitions.
    Core,
    /// Include all the immediate mode functions and definitions.
    Compatibility,
}

bitflags! {
    /// Additional context creation flags.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ContextFlags: u8 {
        /// Request a debug context.
        const DEBUG              = 0b00000001;

        /// Remove the deprecated functionality. Only meaningful for 3.0+.
        const FORWARD_COMPATIBLE = 0b00000010;

        /// Request robust buffer access.
        const ROBUST_ACCESS      = 0b00000100;
    }
}

/// The attributes a context is created with.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ContextAttributes {
    pub(crate) version: Version,
    pub(crate) profile: Option<GlProfile>,
    pub(crate) flags: ContextFlags,
}

impl ContextAttributes {
    /// The minimum OpenGL version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// The requested profile, `None` leaves the choice to the backend.
    pub fn profile(&self) -> Option<GlProfile> {
        self.profile
    }

    /// The requested creation flags.
    pub fn flags(&self) -> ContextFlags {
        self.flags
    }
}

/// Builder for [`ContextAttributes`].
#[derive(Debug, Default, Clone)]
pub struct ContextAttributesBuilder {
    attributes: ContextAttributes,
}

impl ContextAttributesBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// The minimum OpenGL version the context must support.
    ///
    /// By default `2.0` is requested. The backend never hands out a lower
    /// version than asked for.
    pub fn with_version(mut self, version: Version) -> Self {
        self.attributes.version = version;
        self
    }

    /// The OpenGL profile.
    ///
    /// By default the profile isn't specified.
    pub fn with_profile(mut self, profile: GlProfile) -> Self {
        self.attributes.profile = Some(profile);
        self
    }

    /// Whether the context should be a debug one.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.attributes.flags.set(ContextFlags::DEBUG, debug);
        self
    }

    /// Whether deprecated functionality should be removed.
    pub fn with_forward_compatible(mut self, forward_compatible: bool) -> Self {
        self.attributes.flags.set(ContextFlags::FORWARD_COMPATIBLE, forward_compatible);
        self
    }

    /// Whether robust buffer access should be enabled.
    pub fn with_robust_access(mut self, robust_access: bool) -> Self {
        self.attributes.flags.set(ContextFlags::ROBUST_ACCESS, robust_access);
        self
    }

    /// Build the context attributes.
    #[must_use]
    pub fn build(self) -> ContextAttributes {
        self.attributes
    }
}

/// A cross-platform OpenGL context used for offscreen rendering.
///
/// The context is usually shared as an `Arc<OsGlContext>`. It may be current
/// on a single thread at a time and each thread has at most one current
/// context. Making the same context current on two threads at once is a usage
/// error that isn't detected.
///
/// The native context is destroyed when the last reference goes away. The
/// per-thread record of [`OsGlContext::make_current`] holds a reference, so
/// currency has to be cleared with `make_current(None)` before a context can be
/// released.
///
/// ```no_run
/// use std::sync::Arc;
///
/// use osgl::{ContextAttributesBuilder, FramebufferConfig, OsGlContext, Version};
///
/// let backend = osgl::default_backend().unwrap();
/// let attributes = ContextAttributesBuilder::new().with_version(Version::new(3, 3)).build();
/// let context =
///     Arc::new(OsGlContext::build(backend, &FramebufferConfig::default(), &attributes).unwrap());
///
/// OsGlContext::make_current(Some(&context)).unwrap();
/// assert!(context.is_current());
/// OsGlContext::make_current(None).unwrap();
/// ```
#[derive(Debug)]
pub struct OsGlContext {
    inner: ContextInner,
}

impl OsGlContext {
    /// Create a context supporting at least OpenGL `version` with `config`.
    ///
    /// `config` must be one of the configs enumerated by `backend`.
    pub fn new(
        backend: Arc<dyn Backend>,
        config: &FramebufferConfig,
        version: Version,
    ) -> Result<Self> {
        let attributes = ContextAttributesBuilder::new().with_version(version).build();
        Self::with_attributes(backend, config, &attributes)
    }

    /// Create a context with the full set of `attributes`.
    ///
    /// Failures of the backend are reported as
    /// [`ErrorKind::ContextCreationFailed`], keeping the backend's code and
    /// message.
    pub fn with_attributes(
        backend: Arc<dyn Backend>,
        config: &FramebufferConfig,
        attributes: &ContextAttributes,
    ) -> Result<Self> {
        let raw = backend
            .create_context(config, attributes)
            .map_err(|err| err.with_kind(ErrorKind::ContextCreationFailed))?;

        debug!(
            "created {} context {:#x} for OpenGL {} with config {:#x}",
            backend.name(),
            raw.0,
            attributes.version,
            config.handle
        );

        let inner = ContextInner { backend, raw, config: *config, attributes: attributes.clone() };
        Ok(Self { inner })
    }

    /// Enumerate the configs of `backend`, pick the one closest to `desired`
    /// and create a context with it.
    pub fn build(
        backend: Arc<dyn Backend>,
        desired: &FramebufferConfig,
        attributes: &ContextAttributes,
    ) -> Result<Self> {
        let configs = backend.enumerate_configs()?;
        let config = *config::choose_fb_config(desired, &configs)?;
        Self::with_attributes(backend, &config, attributes)
    }

    /// Make `context` current on the calling thread, or make nothing current
    /// when `None` is passed.
    ///
    /// Any context that was current on the thread stops being current. When
    /// the backend fails the error is returned and the thread's record is left
    /// as it was, unless the previous context was already released.
    ///
    /// Making a context current from a thread local destructor fails with
    /// [`ErrorKind::BadAccess`] once the thread's own record was cleaned up.
    pub fn make_current(context: Option<&Arc<OsGlContext>>) -> Result<()> {
        let previous = current::get();

        let context = match context {
            Some(context) => context,
            None => {
                if let Some(previous) = previous.as_ref() {
                    previous.inner.backend.make_current(None)?;
                    trace!("released context {:#x}", previous.inner.raw.0);
                }
                drop(current::clear());
                return Ok(());
            },
        };

        current::register_thread()?;

        let switches_backend = previous.as_ref().map_or(false, |previous| {
            !same_backend(&previous.inner.backend, &context.inner.backend)
        });
        if switches_backend {
            if let Some(previous) = previous.as_ref() {
                previous.inner.backend.make_current(None)?;
            }
        }

        if let Err(err) = context.inner.backend.make_current(Some(context.inner.raw)) {
            if switches_backend {
                drop(current::clear());
            }
            return Err(err);
        }

        trace!("made context {:#x} current", context.inner.raw.0);
        drop(current::set(Arc::clone(context)));
        Ok(())
    }

    /// The context current on the calling thread.
    ///
    /// This only reads the per-thread record and never calls into the backend.
    pub fn current() -> Option<Arc<OsGlContext>> {
        current::get()
    }

    /// Whether this context is current on the calling thread.
    pub fn is_current(&self) -> bool {
        current::get().map_or(false, |current| std::ptr::eq(Arc::as_ptr(&current), self))
    }

    /// Whether `extension` is a whole word of the space separated
    /// `extensions`.
    pub fn string_in_extension_string(extension: &str, extensions: &str) -> bool {
        extensions::string_in_extension_string(extension, extensions)
    }

    /// The config the context was created with.
    pub fn config(&self) -> &FramebufferConfig {
        &self.inner.config
    }

    /// The minimum OpenGL version the context was requested with.
    pub fn version(&self) -> Version {
        self.inner.attributes.version
    }

    /// The attributes the context was created with.
    pub fn attributes(&self) -> &ContextAttributes {
        &self.inner.attributes
    }

    /// The native handle of the context.
    pub fn raw_context(&self) -> RawContext {
        self.inner.raw
    }

    /// The backend that owns the native context.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.inner.backend
    }
}

fn same_backend(lhs: &Arc<dyn Backend>, rhs: &Arc<dyn Backend>) -> bool {
    Arc::as_ptr(lhs) as *const () == Arc::as_ptr(rhs) as *const ()
}

struct ContextInner {
    backend: Arc<dyn Backend>,
    raw: RawContext,
    config: FramebufferConfig,
    attributes: ContextAttributes,
}

impl Drop for ContextInner {
    fn drop(&mut self) {
        debug!("destroying {} context {:#x}", self.backend.name(), self.raw.0);
        self.backend.destroy_context(self.raw);
    }
}

impl fmt::Debug for ContextInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("backend", &self.backend.name())
            .field("raw", &self.raw)
            .field("version", &self.attributes.version)
            .field("config", &self.config.handle)
            .finish()
    }
}

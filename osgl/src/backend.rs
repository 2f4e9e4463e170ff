//! The interface to the native context providers.

use std::fmt;

use crate::config::FramebufferConfig;
use crate::context::ContextAttributes;
use crate::error::Result;

/// Native context handle as given out by a [`Backend`].
///
/// The value is only meaningful to the backend that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawContext(pub usize);

/// A native context provider, like EGL.
///
/// All the methods are called on the thread that performs the corresponding
/// [`OsGlContext`] operation, so `make_current` must act on the calling thread.
///
/// [`OsGlContext`]: crate::context::OsGlContext
pub trait Backend: fmt::Debug + Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// All the framebuffer configs the backend can create contexts with.
    ///
    /// Returned configs must be concrete and carry their native handle.
    fn enumerate_configs(&self) -> Result<Vec<FramebufferConfig>>;

    /// Create a context for `config`, which must come from
    /// [`Backend::enumerate_configs`].
    fn create_context(
        &self,
        config: &FramebufferConfig,
        attributes: &ContextAttributes,
    ) -> Result<RawContext>;

    /// Bind `context` to the calling thread, or release whatever is bound when
    /// `None` is passed.
    fn make_current(&self, context: Option<RawContext>) -> Result<()>;

    /// Destroy a context created by this backend.
    fn destroy_context(&self, context: RawContext);

    /// The space separated list of extensions the backend supports.
    fn extensions(&self) -> &str;

    /// Whether `extension` is in [`Backend::extensions`].
    fn supports_extension(&self, extension: &str) -> bool {
        crate::extensions::string_in_extension_string(extension, self.extensions())
    }
}

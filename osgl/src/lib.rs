//! The purpose of this library is to provide an offscreen OpenGL
//! [`OsGlContext`] on as many platforms as possible.
//!
//! Before creating a context you need to settle on a [`FramebufferConfig`].
//! Describe the config you'd like to have, let the [`Backend`] enumerate what
//! it can offer and pick the closest one with [`choose_fb_config`]. Every
//! integer field of the desired config may be left at
//! [`FramebufferConfig::DONT_CARE`].
//!
//! With the chosen config, create the context with [`OsGlContext::new`] and
//! make it current on a thread with [`OsGlContext::make_current`]. Each thread
//! has at most one current context, which can be queried back with
//! [`OsGlContext::current`].
//!
//! The native work is done by a [`Backend`]. [`default_backend`] returns the
//! EGL one when the `egl` feature is enabled.
//!
//! [`Backend`]: crate::backend::Backend

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(rust_2018_idioms)]
#![deny(missing_debug_implementations)]
#![deny(missing_docs)]
#![cfg_attr(clippy, deny(warnings))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

use std::sync::Arc;

pub mod api;
pub mod backend;
pub mod config;
pub mod context;
pub mod current;
pub mod error;
mod extensions;
#[cfg(egl_backend)]
mod lib_loading;

pub use backend::{Backend, RawContext};
pub use config::{choose_fb_config, FramebufferConfig, FramebufferConfigBuilder};
pub use context::{
    ContextAttributes, ContextAttributesBuilder, ContextFlags, GlProfile, OsGlContext, Version,
};
pub use error::{Error, ErrorKind, Result};
pub use extensions::string_in_extension_string;

/// The native backend available on this platform.
///
/// The backend is loaded once and shared by all the callers.
pub fn default_backend() -> Result<Arc<dyn Backend>> {
    #[cfg(egl_backend)]
    {
        api::egl::EglBackend::shared().map(|backend| backend as Arc<dyn Backend>)
    }

    #[cfg(not(egl_backend))]
    {
        Err(ErrorKind::NotSupported("no native backend is available on this platform").into())
    }
}

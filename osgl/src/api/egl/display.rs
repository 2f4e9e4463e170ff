//! Everything related to `EGLDisplay`.

use std::ffi::CStr;
use std::fmt;

use glutin_egl_sys::egl;
use glutin_egl_sys::egl::types::{EGLDisplay, EGLint};
use log::debug;

use crate::context::Version;
use crate::error::Result;
use crate::extensions::string_in_extension_string;

use super::{last_error, Egl};

/// A raw `EGLDisplay`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawDisplay(pub(crate) EGLDisplay);

// EGL display handles may be used from any thread.
unsafe impl Send for RawDisplay {}
unsafe impl Sync for RawDisplay {}

/// The initialized default display and what it supports.
pub(crate) struct Display {
    pub(crate) egl: &'static Egl,
    pub(crate) raw: RawDisplay,
    pub(crate) version: Version,
    pub(crate) extensions: String,
}

impl Display {
    pub(crate) fn new(egl: &'static Egl) -> Result<Self> {
        let raw = unsafe { egl.GetDisplay(egl::DEFAULT_DISPLAY as *const _) };
        if raw == egl::NO_DISPLAY {
            return Err(last_error(egl, "eglGetDisplay"));
        }

        let (mut major, mut minor): (EGLint, EGLint) = (0, 0);
        if unsafe { egl.Initialize(raw, &mut major, &mut minor) } == egl::FALSE {
            return Err(last_error(egl, "eglInitialize"));
        }

        let version = Version::new(major as u8, minor as u8);
        let extensions = unsafe {
            let extensions = egl.QueryString(raw, egl::EXTENSIONS as EGLint);
            if extensions.is_null() {
                String::new()
            } else {
                CStr::from_ptr(extensions).to_string_lossy().into_owned()
            }
        };

        debug!("initialized EGL {version} display");

        Ok(Self { egl, raw: RawDisplay(raw), version, extensions })
    }

    pub(crate) fn has_extension(&self, extension: &str) -> bool {
        string_in_extension_string(extension, &self.extensions)
    }

    /// Whether contexts can be made current without any surface.
    pub(crate) fn supports_surfaceless(&self) -> bool {
        self.has_extension("EGL_KHR_surfaceless_context")
    }

    /// Whether robust buffer access can be requested.
    pub(crate) fn supports_robustness(&self) -> bool {
        self.version >= Version::new(1, 5)
            || self.has_extension("EGL_EXT_create_context_robustness")
    }

    /// Whether the context version, profile and flags can be requested.
    pub(crate) fn supports_create_context(&self) -> bool {
        self.version >= Version::new(1, 5) || self.has_extension("EGL_KHR_create_context")
    }
}

impl fmt::Debug for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Display")
            .field("raw", &self.raw.0)
            .field("version", &self.version)
            .field("extensions", &self.extensions)
            .finish()
    }
}

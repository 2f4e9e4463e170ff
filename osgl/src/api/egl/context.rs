//! Everything related to `EGLContext` management.

use glutin_egl_sys::egl;
use glutin_egl_sys::egl::types::{EGLConfig, EGLContext, EGLSurface, EGLint};

use crate::backend::RawContext;
use crate::config::FramebufferConfig;
use crate::context::{ContextAttributes, ContextFlags, GlProfile};
use crate::error::{ErrorKind, Result};

use super::display::Display;
use super::last_error;

impl Display {
    /// Create a desktop OpenGL context, plus the pbuffer it renders to when the
    /// display can't go surfaceless.
    pub(crate) fn create_context(
        &self,
        config: &FramebufferConfig,
        attributes: &ContextAttributes,
    ) -> Result<(RawContext, Option<usize>)> {
        if !self.supports_create_context() {
            return Err(ErrorKind::NotSupported(
                "EGL_KHR_create_context is required to request an OpenGL version",
            )
            .into());
        }

        let attrs = context_attributes(attributes, self.supports_robustness())?;

        let raw_config = config.handle as EGLConfig;

        unsafe {
            self.bind_opengl_api()?;

            let context =
                self.egl.CreateContext(self.raw.0, raw_config, egl::NO_CONTEXT, attrs.as_ptr());
            if context == egl::NO_CONTEXT {
                return Err(last_error(self.egl, "eglCreateContext"));
            }

            if self.supports_surfaceless() {
                return Ok((RawContext(context as usize), None));
            }

            let pbuffer_attrs =
                [egl::WIDTH as EGLint, 1, egl::HEIGHT as EGLint, 1, egl::NONE as EGLint];
            let pbuffer =
                self.egl.CreatePbufferSurface(self.raw.0, raw_config, pbuffer_attrs.as_ptr());
            if pbuffer == egl::NO_SURFACE {
                let err = last_error(self.egl, "eglCreatePbufferSurface");
                self.egl.DestroyContext(self.raw.0, context);
                return Err(err);
            }

            Ok((RawContext(context as usize), Some(pbuffer as usize)))
        }
    }

    pub(crate) fn make_current(&self, context: RawContext, pbuffer: Option<usize>) -> Result<()> {
        let surface = pbuffer.map_or(egl::NO_SURFACE, |pbuffer| pbuffer as EGLSurface);

        unsafe {
            // The bound api is per thread state.
            self.bind_opengl_api()?;

            if self.egl.MakeCurrent(self.raw.0, surface, surface, context.0 as EGLContext)
                == egl::FALSE
            {
                return Err(last_error(self.egl, "eglMakeCurrent"));
            }
        }

        Ok(())
    }

    pub(crate) fn make_not_current(&self) -> Result<()> {
        unsafe {
            if self.egl.MakeCurrent(self.raw.0, egl::NO_SURFACE, egl::NO_SURFACE, egl::NO_CONTEXT)
                == egl::FALSE
            {
                return Err(last_error(self.egl, "eglMakeCurrent"));
            }
        }

        Ok(())
    }

    pub(crate) fn destroy_context(&self, context: RawContext, pbuffer: Option<usize>) {
        unsafe {
            if let Some(pbuffer) = pbuffer {
                self.egl.DestroySurface(self.raw.0, pbuffer as EGLSurface);
            }
            self.egl.DestroyContext(self.raw.0, context.0 as EGLContext);
        }
    }

    fn bind_opengl_api(&self) -> Result<()> {
        if unsafe { self.egl.BindAPI(egl::OPENGL_API) } == egl::FALSE {
            return Err(last_error(self.egl, "eglBindAPI"));
        }

        Ok(())
    }
}

/// The `eglCreateContext` attribute list for `attributes`.
fn context_attributes(
    attributes: &ContextAttributes,
    supports_robustness: bool,
) -> Result<Vec<EGLint>> {
    let mut attrs = Vec::<EGLint>::new();

    let version = attributes.version();
    attrs.push(egl::CONTEXT_MAJOR_VERSION as EGLint);
    attrs.push(version.major as EGLint);
    attrs.push(egl::CONTEXT_MINOR_VERSION as EGLint);
    attrs.push(version.minor as EGLint);

    if let Some(profile) = attributes.profile() {
        let profile = match profile {
            GlProfile::Core => egl::CONTEXT_OPENGL_CORE_PROFILE_BIT as EGLint,
            GlProfile::Compatibility => egl::CONTEXT_OPENGL_COMPATIBILITY_PROFILE_BIT as EGLint,
        };
        attrs.push(egl::CONTEXT_OPENGL_PROFILE_MASK as EGLint);
        attrs.push(profile);
    }

    let requested = attributes.flags();
    let mut flags: EGLint = 0;
    if requested.contains(ContextFlags::DEBUG) {
        flags |= egl::CONTEXT_OPENGL_DEBUG_BIT_KHR as EGLint;
    }
    if requested.contains(ContextFlags::FORWARD_COMPATIBLE) {
        flags |= egl::CONTEXT_OPENGL_FORWARD_COMPATIBLE_BIT_KHR as EGLint;
    }
    if requested.contains(ContextFlags::ROBUST_ACCESS) {
        if !supports_robustness {
            return Err(ErrorKind::NotSupported("context robustness is not supported").into());
        }
        flags |= egl::CONTEXT_OPENGL_ROBUST_ACCESS_BIT_KHR as EGLint;
    }
    if flags != 0 {
        attrs.push(egl::CONTEXT_FLAGS_KHR as EGLint);
        attrs.push(flags);
    }

    // Push `egl::NONE` to terminate the list.
    attrs.push(egl::NONE as EGLint);

    Ok(attrs)
}

//! Enumeration of `EGLConfig`s.

use glutin_egl_sys::egl;
use glutin_egl_sys::egl::types::{EGLConfig, EGLint};

use crate::config::FramebufferConfig;
use crate::error::Result;

use super::display::Display;
use super::last_error;

impl Display {
    /// All the RGB configs desktop OpenGL contexts can be created with.
    pub(crate) fn enumerate_configs(&self) -> Result<Vec<FramebufferConfig>> {
        let mut num_configs: EGLint = 0;
        if unsafe { self.egl.GetConfigs(self.raw.0, std::ptr::null_mut(), 0, &mut num_configs) }
            == egl::FALSE
        {
            return Err(last_error(self.egl, "eglGetConfigs"));
        }

        let mut raw_configs: Vec<EGLConfig> = vec![std::ptr::null(); num_configs.max(0) as usize];
        if unsafe {
            self.egl.GetConfigs(
                self.raw.0,
                raw_configs.as_mut_ptr(),
                raw_configs.len() as EGLint,
                &mut num_configs,
            )
        } == egl::FALSE
        {
            return Err(last_error(self.egl, "eglGetConfigs"));
        }
        raw_configs.truncate(num_configs.max(0) as usize);

        let needs_pbuffer = !self.supports_surfaceless();

        let configs = raw_configs
            .into_iter()
            .filter(|&raw| {
                let color_buffer_type = self.raw_attribute(raw, egl::COLOR_BUFFER_TYPE as EGLint);
                let renderable_type = self.raw_attribute(raw, egl::RENDERABLE_TYPE as EGLint);
                let surface_type = self.raw_attribute(raw, egl::SURFACE_TYPE as EGLint);

                color_buffer_type == egl::RGB_BUFFER as EGLint
                    && renderable_type & egl::OPENGL_BIT as EGLint != 0
                    && (!needs_pbuffer || surface_type & egl::PBUFFER_BIT as EGLint != 0)
            })
            .map(|raw| framebuffer_config(raw as usize, |attr| self.raw_attribute(raw, attr)))
            .collect();

        Ok(configs)
    }

    /// Query an attribute of `config`, zero when it can't be queried.
    fn raw_attribute(&self, config: EGLConfig, attribute: EGLint) -> EGLint {
        let mut value = 0;
        let ok = unsafe {
            self.egl.GetConfigAttrib(self.raw.0, config, attribute, &mut value)
        };

        if ok == egl::FALSE {
            0
        } else {
            value.max(0)
        }
    }
}

/// Describe the native config `handle` through its `attribute` values.
fn framebuffer_config(handle: usize, attribute: impl Fn(EGLint) -> EGLint) -> FramebufferConfig {
    FramebufferConfig {
        red_bits: attribute(egl::RED_SIZE as EGLint),
        green_bits: attribute(egl::GREEN_SIZE as EGLint),
        blue_bits: attribute(egl::BLUE_SIZE as EGLint),
        alpha_bits: attribute(egl::ALPHA_SIZE as EGLint),
        depth_bits: attribute(egl::DEPTH_SIZE as EGLint),
        stencil_bits: attribute(egl::STENCIL_SIZE as EGLint),
        // EGL has no accumulation or auxiliary buffers.
        accum_red_bits: 0,
        accum_green_bits: 0,
        accum_blue_bits: 0,
        accum_alpha_bits: 0,
        aux_buffers: 0,
        samples: attribute(egl::SAMPLES as EGLint),
        stereo: false,
        // The colorspace belongs to a surface. Neither surfaceless rendering nor
        // the private pbuffer request an sRGB one.
        srgb: false,
        // Surfaceless and pbuffer rendering go to a back buffer.
        doublebuffer: true,
        handle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_reports_what_contexts_get() {
        let config = framebuffer_config(0x42, |attr| match attr as egl::types::EGLenum {
            egl::RED_SIZE | egl::GREEN_SIZE | egl::BLUE_SIZE | egl::ALPHA_SIZE => 8,
            egl::DEPTH_SIZE => 24,
            egl::STENCIL_SIZE => 8,
            egl::SAMPLES => 4,
            _ => 0,
        });

        assert_eq!(
            config,
            FramebufferConfig { samples: 4, handle: 0x42, ..FramebufferConfig::default() }
        );
        assert!(!config.srgb);
        assert!(config.is_concrete());
    }
}

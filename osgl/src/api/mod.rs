//! The native backends.

#[cfg(egl_backend)]
pub mod egl;

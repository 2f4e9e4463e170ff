//! EGL backend.
//!
//! The library is loaded at runtime, so the crate works on systems without
//! EGL as long as this backend isn't used.

use std::collections::HashMap;
use std::ffi::{self, CString};
use std::ops::Deref;
use std::os::raw::c_char;
use std::sync::{Arc, Mutex, PoisonError};

use glutin_egl_sys::egl;
use libloading::Library;
use log::debug;
use once_cell::sync::{Lazy, OnceCell};

use crate::backend::{Backend, RawContext};
use crate::config::FramebufferConfig;
use crate::context::ContextAttributes;
use crate::error::{Error, ErrorKind, Result};
use crate::lib_loading::{SymLoading, SymWrapper};

mod config;
mod context;
mod display;

use self::display::Display;

#[cfg(windows)]
const EGL_PATHS: [&str; 2] = ["libEGL.dll", "atioglxx.dll"];

#[cfg(not(windows))]
const EGL_PATHS: [&str; 2] = ["libEGL.so.1", "libEGL.so"];

pub(crate) static EGL: Lazy<Option<Egl>> = Lazy::new(|| unsafe {
    let egl = SymWrapper::new(&EGL_PATHS).map(Egl);
    debug!("libEGL {}", if egl.is_some() { "loaded" } else { "not found" });
    egl
});

static SHARED_BACKEND: OnceCell<Arc<EglBackend>> = OnceCell::new();

type EglGetProcAddress = unsafe extern "C" fn(*const c_char) -> *const ffi::c_void;

/// The loaded EGL entry points.
pub(crate) struct Egl(SymWrapper<egl::Egl>);

// The function table only holds pointers to immutable code.
unsafe impl Sync for Egl {}
unsafe impl Send for Egl {}

impl Deref for Egl {
    type Target = egl::Egl;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl SymLoading for egl::Egl {
    unsafe fn load_with(lib: &Library) -> Self {
        let get_proc_address = unsafe { lib.get::<EglGetProcAddress>(b"eglGetProcAddress\0") }
            .ok()
            .map(|sym| *sym);

        let loader = move |sym_name: &'static str| -> *const ffi::c_void {
            let sym_name = match CString::new(sym_name.as_bytes()) {
                Ok(sym_name) => sym_name,
                Err(_) => return std::ptr::null(),
            };

            if let Ok(sym) = unsafe { lib.get::<*const ffi::c_void>(sym_name.as_bytes_with_nul()) }
            {
                return *sym;
            }

            // Prior to EGL 1.5 extension functions are only reachable through
            // `eglGetProcAddress`.
            match get_proc_address {
                Some(get_proc_address) => unsafe { get_proc_address(sym_name.as_ptr()) },
                None => std::ptr::null(),
            }
        };

        Self::load_with(loader)
    }
}

/// Offscreen contexts on the default EGL display.
///
/// Contexts are made current without a surface when the display supports
/// `EGL_KHR_surfaceless_context`. Otherwise every context gets its own 1x1
/// pbuffer.
pub struct EglBackend {
    display: Display,
    /// Pbuffers backing the contexts when surfaceless isn't supported.
    pbuffers: Mutex<HashMap<RawContext, usize>>,
}

impl EglBackend {
    /// Load EGL and initialize the default display.
    pub fn new() -> Result<Self> {
        let egl = EGL.as_ref().ok_or(ErrorKind::NotFound)?;
        let display = Display::new(egl)?;
        Ok(Self { display, pbuffers: Mutex::new(HashMap::new()) })
    }

    /// The backend shared by the whole process.
    pub fn shared() -> Result<Arc<Self>> {
        SHARED_BACKEND.get_or_try_init(|| Self::new().map(Arc::new)).cloned()
    }

    /// EGL version of the display.
    pub fn version(&self) -> crate::context::Version {
        self.display.version
    }
}

impl std::fmt::Debug for EglBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EglBackend")
            .field("display", &self.display)
            .field("pbuffers", &self.pbuffers.lock().map(|pbuffers| pbuffers.len()).ok())
            .finish()
    }
}

impl Backend for EglBackend {
    fn name(&self) -> &'static str {
        "EGL"
    }

    fn enumerate_configs(&self) -> Result<Vec<FramebufferConfig>> {
        self.display.enumerate_configs()
    }

    fn create_context(
        &self,
        config: &FramebufferConfig,
        attributes: &ContextAttributes,
    ) -> Result<RawContext> {
        let (context, pbuffer) = self.display.create_context(config, attributes)?;
        if let Some(pbuffer) = pbuffer {
            self.pbuffers.lock().unwrap_or_else(PoisonError::into_inner).insert(context, pbuffer);
        }
        Ok(context)
    }

    fn make_current(&self, context: Option<RawContext>) -> Result<()> {
        match context {
            Some(context) => {
                let pbuffer = self
                    .pbuffers
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .get(&context)
                    .copied();
                self.display.make_current(context, pbuffer)
            },
            None => self.display.make_not_current(),
        }
    }

    fn destroy_context(&self, context: RawContext) {
        let pbuffer =
            self.pbuffers.lock().unwrap_or_else(PoisonError::into_inner).remove(&context);
        self.display.destroy_context(context, pbuffer);
    }

    fn extensions(&self) -> &str {
        &self.display.extensions
    }
}

/// Turn the pending EGL error into a [`Result`].
///
/// `operation` names the EGL call that failed.
pub(crate) fn check_error(egl: &Egl, operation: &str) -> Result<()> {
    let raw_code = unsafe { egl.GetError() } as egl::types::EGLenum;
    let kind = match raw_code {
        egl::SUCCESS => return Ok(()),
        egl::NOT_INITIALIZED => ErrorKind::InitializationFailed,
        egl::BAD_ACCESS => ErrorKind::BadAccess,
        egl::BAD_ALLOC => ErrorKind::OutOfMemory,
        egl::BAD_ATTRIBUTE => ErrorKind::BadAttribute,
        egl::BAD_CONTEXT => ErrorKind::BadContext,
        egl::BAD_CONFIG => ErrorKind::BadConfig,
        egl::BAD_CURRENT_SURFACE => ErrorKind::BadCurrentSurface,
        egl::BAD_DISPLAY => ErrorKind::BadDisplay,
        egl::BAD_SURFACE | egl::BAD_NATIVE_PIXMAP | egl::BAD_NATIVE_WINDOW => {
            ErrorKind::BadSurface
        },
        egl::BAD_MATCH => ErrorKind::BadMatch,
        egl::BAD_PARAMETER => ErrorKind::BadParameter,
        egl::CONTEXT_LOST => ErrorKind::ContextLost,
        _ => ErrorKind::Misc,
    };

    Err(Error::new(Some(raw_code as i64), Some(format!("{operation} failed")), kind))
}

/// Like [`check_error`], but never reports success since the caller already
/// knows `operation` failed.
pub(crate) fn last_error(egl: &Egl, operation: &str) -> Error {
    match check_error(egl, operation) {
        Err(err) => err,
        Ok(()) => Error::new(None, Some(format!("{operation} failed")), ErrorKind::Misc),
    }
}

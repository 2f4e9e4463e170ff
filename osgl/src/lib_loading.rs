//! Library loading routines.

use std::ops::Deref;
use std::sync::Arc;

use libloading::Library;

#[cfg(windows)]
use libloading::os::windows::{Library as WinLibrary, LOAD_LIBRARY_SEARCH_DEFAULT_DIRS};

pub trait SymLoading {
    /// # Safety
    /// The library must be ensured to live long enough.
    unsafe fn load_with(lib: &Library) -> Self;
}

/// Loaded symbols together with the library keeping them valid.
#[derive(Clone)]
pub struct SymWrapper<T> {
    sym: T,
    _lib: Arc<Library>,
}

impl<T: SymLoading> SymWrapper<T> {
    /// Load the first library of `lib_paths` that can be opened.
    ///
    /// # Safety
    /// Loading a library runs its initialization routines.
    pub unsafe fn new(lib_paths: &[&str]) -> Option<Self> {
        for path in lib_paths {
            #[cfg(windows)]
            let lib = unsafe {
                WinLibrary::load_with_flags(path, LOAD_LIBRARY_SEARCH_DEFAULT_DIRS).map(From::from)
            };

            #[cfg(not(windows))]
            let lib = unsafe { Library::new(path) };

            if let Ok(lib) = lib {
                let sym = unsafe { T::load_with(&lib) };
                return Some(SymWrapper { sym, _lib: Arc::new(lib) });
            }
        }

        None
    }
}

impl<T> Deref for SymWrapper<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.sym
    }
}

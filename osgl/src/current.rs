//! Process wide record of the context current on each thread.
//!
//! Every thread only ever writes its own entry. Other threads may look at the
//! map for diagnostics through [`threads_holding`].

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread::{self, ThreadId};

use once_cell::sync::Lazy;

use crate::context::OsGlContext;
use crate::error::{Error, ErrorKind, Result};

type CurrentMap = HashMap<ThreadId, Arc<OsGlContext>>;

static CURRENT: Lazy<RwLock<CurrentMap>> = Lazy::new(Default::default);

thread_local! {
    static EXIT_GUARD: ExitGuard = ExitGuard(thread::current().id());
}

/// Drops the entry of a thread once the thread goes away, so the map doesn't
/// keep contexts of dead threads alive.
struct ExitGuard(ThreadId);

impl Drop for ExitGuard {
    fn drop(&mut self) {
        let stale = write().remove(&self.0);
        drop(stale);
    }
}

fn read() -> RwLockReadGuard<'static, CurrentMap> {
    CURRENT.read().unwrap_or_else(PoisonError::into_inner)
}

fn write() -> RwLockWriteGuard<'static, CurrentMap> {
    CURRENT.write().unwrap_or_else(PoisonError::into_inner)
}

/// The context recorded as current on the calling thread.
pub(crate) fn get() -> Option<Arc<OsGlContext>> {
    read().get(&thread::current().id()).cloned()
}

/// Make sure the calling thread's entry is removed when the thread exits.
///
/// Fails once the thread's locals are being torn down, since an entry
/// recorded from then on would never be removed.
pub(crate) fn register_thread() -> Result<()> {
    EXIT_GUARD.try_with(|_| ()).map_err(|_| {
        Error::new(
            None,
            Some("can't make a context current while the thread exits".into()),
            ErrorKind::BadAccess,
        )
    })
}

/// Record `context` as current on the calling thread, returning the evicted
/// entry.
///
/// [`register_thread`] must have succeeded on the calling thread.
pub(crate) fn set(context: Arc<OsGlContext>) -> Option<Arc<OsGlContext>> {
    write().insert(thread::current().id(), context)
}

/// Record that nothing is current on the calling thread.
pub(crate) fn clear() -> Option<Arc<OsGlContext>> {
    write().remove(&thread::current().id())
}

/// Threads on which `context` is currently recorded as current.
///
/// More than one thread in the result means the context was made current on
/// several threads at once, which is a usage error.
pub fn threads_holding(context: &OsGlContext) -> Vec<ThreadId> {
    read()
        .iter()
        .filter(|(_, current)| std::ptr::eq(Arc::as_ptr(current), context))
        .map(|(thread, _)| *thread)
        .collect()
}

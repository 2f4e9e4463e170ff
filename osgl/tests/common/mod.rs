#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

use osgl::{
    Backend, ContextAttributes, Error, ErrorKind, FramebufferConfig, RawContext, Result, Version,
};

/// A backend that only records what it was asked to do.
#[derive(Debug)]
pub struct RecordingBackend {
    configs: Vec<FramebufferConfig>,
    max_version: Version,
    next_context: AtomicUsize,
    fail_binds: AtomicBool,
    bound: Mutex<HashMap<ThreadId, RawContext>>,
    unbinds: AtomicUsize,
    destroyed: Mutex<Vec<RawContext>>,
}

impl RecordingBackend {
    pub fn new(configs: Vec<FramebufferConfig>) -> Arc<Self> {
        Arc::new(Self {
            configs,
            max_version: Version::new(4, 6),
            next_context: AtomicUsize::new(1),
            fail_binds: AtomicBool::new(false),
            bound: Mutex::new(HashMap::new()),
            unbinds: AtomicUsize::new(0),
            destroyed: Mutex::new(Vec::new()),
        })
    }

    /// A backend offering a single default config.
    pub fn simple() -> Arc<Self> {
        Self::new(vec![FramebufferConfig { handle: 0x10, ..Default::default() }])
    }

    pub fn fail_binds(&self, fail: bool) {
        self.fail_binds.store(fail, Ordering::SeqCst);
    }

    /// The context the backend bound on the calling thread.
    pub fn bound_here(&self) -> Option<RawContext> {
        self.bound.lock().unwrap().get(&thread::current().id()).copied()
    }

    pub fn unbinds(&self) -> usize {
        self.unbinds.load(Ordering::SeqCst)
    }

    pub fn destroyed(&self) -> Vec<RawContext> {
        self.destroyed.lock().unwrap().clone()
    }
}

impl Backend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn enumerate_configs(&self) -> Result<Vec<FramebufferConfig>> {
        Ok(self.configs.clone())
    }

    fn create_context(
        &self,
        config: &FramebufferConfig,
        attributes: &ContextAttributes,
    ) -> Result<RawContext> {
        if !self.configs.iter().any(|known| known.handle == config.handle) {
            let message = Some("unknown config".into());
            return Err(Error::new(Some(0x3005), message, ErrorKind::BadConfig));
        }

        if attributes.version() > self.max_version {
            return Err(Error::new(
                Some(0x3009),
                Some(format!("OpenGL {} is not available", attributes.version())),
                ErrorKind::BadMatch,
            ));
        }

        Ok(RawContext(self.next_context.fetch_add(1, Ordering::SeqCst)))
    }

    fn make_current(&self, context: Option<RawContext>) -> Result<()> {
        if self.fail_binds.load(Ordering::SeqCst) {
            return Err(Error::new(Some(0x3002), None, ErrorKind::BadAccess));
        }

        let mut bound = self.bound.lock().unwrap();
        match context {
            Some(context) => {
                bound.insert(thread::current().id(), context);
            },
            None => {
                bound.remove(&thread::current().id());
                self.unbinds.fetch_add(1, Ordering::SeqCst);
            },
        }

        Ok(())
    }

    fn destroy_context(&self, context: RawContext) {
        self.destroyed.lock().unwrap().push(context);
    }

    fn extensions(&self) -> &str {
        "OSGL_recording OSGL_recording_surfaceless"
    }
}

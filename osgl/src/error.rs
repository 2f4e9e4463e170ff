//! Osgl error handling.

use std::fmt;

/// A specialized [`Result`] type for offscreen context operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for all the context and config operations.
#[derive(Debug, Clone)]
pub struct Error {
    /// The raw code of the underlying error.
    raw_code: Option<i64>,

    /// The raw message from the backend in case it could be obtained.
    raw_os_message: Option<String>,

    /// The simplified error kind to handle matching.
    kind: ErrorKind,
}

impl Error {
    /// Build an error from the parts a backend reports.
    pub fn new(raw_code: Option<i64>, raw_os_message: Option<String>, kind: ErrorKind) -> Self {
        Self { raw_code, raw_os_message, kind }
    }

    /// Re-classify the error while keeping the backend diagnostics.
    pub(crate) fn with_kind(self, kind: ErrorKind) -> Self {
        Self { kind, ..self }
    }

    /// Helper to check that error is [`ErrorKind::NotSupported`].
    #[inline]
    pub fn not_supported(&self) -> bool {
        matches!(&self.kind, ErrorKind::NotSupported(_))
    }

    /// The underlying error kind.
    #[inline]
    pub fn error_kind(&self) -> ErrorKind {
        self.kind
    }

    /// The underlying raw code in case it's present.
    #[inline]
    pub fn raw_code(&self) -> Option<i64> {
        self.raw_code
    }

    /// The message reported by the backend in case it's present.
    #[inline]
    pub fn raw_os_message(&self) -> Option<&str> {
        self.raw_os_message.as_deref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(raw_code) = self.raw_code {
            write!(f, "[{raw_code:x}] ")?;
        }

        match self.raw_os_message.as_ref() {
            Some(raw_os_message) => write!(f, "{}: {raw_os_message}", self.kind.as_str()),
            None => f.write_str(self.kind.as_str()),
        }
    }
}

impl std::error::Error for Error {}

/// Build an error with just a kind.
impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error { raw_code: None, raw_os_message: None, kind }
    }
}

/// A list specifying general categories of offscreen context errors.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum ErrorKind {
    /// No framebuffer config satisfies the hard requirements of the desired
    /// one, or there was nothing to choose from.
    ConfigUnavailable,

    /// The backend refused to create a context for the requested version or
    /// config.
    ContextCreationFailed,

    /// The backend library wasn't found or some required symbol in it was
    /// missing.
    NotFound,

    /// Failed to perform resource initialization.
    InitializationFailed,

    /// Can't access a requested resource.
    ///
    /// For example when trying to make a context current while it's current on
    /// another thread.
    BadAccess,

    /// An operation could not be completed, because it failed to allocate
    /// enough memory.
    OutOfMemory,

    /// An unrecognized attribute or attribute value was passed.
    BadAttribute,

    /// The context is no longer valid.
    BadContext,

    /// Invalid config was passed.
    BadConfig,

    /// The current surface of the calling thread is no longer valid.
    BadCurrentSurface,

    /// The display is no longer valid.
    BadDisplay,

    /// The surface is invalid.
    BadSurface,

    /// Arguments are inconsistent.
    BadMatch,

    /// One or more argument values are invalid.
    BadParameter,

    /// The context was lost.
    ContextLost,

    /// The operation is not supported by the backend.
    NotSupported(&'static str),

    /// The misc error that can't be classified occurred.
    Misc,
}

impl ErrorKind {
    pub(crate) fn as_str(&self) -> &'static str {
        use ErrorKind::*;
        match *self {
            ConfigUnavailable => "no framebuffer config satisfies the requirements",
            ContextCreationFailed => "context creation failed",
            NotFound => "not found",
            InitializationFailed => "initialization failed",
            BadAccess => "access to the resource failed",
            OutOfMemory => "out of memory",
            BadAttribute => "an unrecognized attribute or attribute value was passed",
            BadContext => "argument does not name a valid context",
            BadConfig => "argument does not name a valid config",
            BadCurrentSurface => "the current surface of the calling thread is no longer valid",
            BadDisplay => "argument does not name a valid display",
            BadSurface => "argument does not name a valid surface",
            BadMatch => "arguments are inconsistent",
            BadParameter => "one or more argument values are invalid",
            ContextLost => "context loss",
            NotSupported(reason) => reason,
            Misc => "misc platform error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

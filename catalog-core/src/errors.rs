//! # Errors
//!
//! Every catalog operation returns a [`CatalogResult`]. The error carries a
//! coarse [`ErrorKind`] that callers branch on, a single human-readable
//! message, and optionally:
//! - `errors`: a structured per-field payload (validation failures)
//! - `source`: the underlying cause (HTTP client, backend, ...)
//!
//! `Display` renders one line suitable for a toast or log message.

use std::fmt;

use anyhow::Error as AnyError;
use serde_json::Value;

/// Result type for catalog operations.
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Error classes surfaced by the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation, // 422
    NotFound,   // 404
    Conflict,   // 409
    Upload,     // 502
    Store,      // 503
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::Validation => 422,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Upload => 502,
            ErrorKind::Store => 503,
        }
    }

    /// Stable error name (e.g. "ValidationError")
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "ValidationError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::Conflict => "ConflictError",
            ErrorKind::Upload => "UploadError",
            ErrorKind::Store => "StoreError",
        }
    }

    /// Kebab-cased class name
    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Upload => "upload",
            ErrorKind::Store => "store",
        }
    }
}

/// A structured catalog error.
#[derive(Debug)]
pub struct CatalogError {
    pub kind: ErrorKind,
    pub message: String,
    pub errors: Option<Value>,
    pub source: Option<AnyError>,
}

impl CatalogError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            errors: None,
            source: None,
        }
    }

    pub fn with_errors(mut self, errors: Value) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_source(mut self, source: impl Into<AnyError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// Turn any error into a CatalogError:
    /// - if it already is one, keep it
    /// - otherwise wrap as a Store error
    pub fn normalize(err: AnyError) -> CatalogError {
        match err.downcast::<CatalogError>() {
            Ok(catalog) => catalog,
            Err(other) => CatalogError::new(ErrorKind::Store, other.to_string()).with_source(other),
        }
    }

    /// Same error without the inner `source`, safe to hand to a UI.
    pub fn sanitize_for_client(&self) -> CatalogError {
        CatalogError {
            kind: self.kind,
            message: self.message.clone(),
            errors: self.errors.clone(),
            source: None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut base = serde_json::json!({
            "name": self.name(),
            "message": self.message,
            "code": self.code(),
            "className": self.class_name(),
        });

        if let Some(e) = &self.errors {
            base["errors"] = e.clone();
        }
        base
    }

    // ---- Constructors ----

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, msg)
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, msg)
    }
    pub fn upload(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Upload, msg)
    }
    pub fn store(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Store, msg)
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.message)
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::store(format!("Malformed document: {err}")).with_source(err)
    }
}

/// Return early with a CatalogError built by one of the kind constructors.
#[macro_export]
macro_rules! bail_catalog {
    ($ctor:ident, $msg:expr) => {
        return Err($crate::errors::CatalogError::$ctor($msg))
    };
    ($ctor:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::errors::CatalogError::$ctor(format!($fmt, $($arg)*)))
    };
}

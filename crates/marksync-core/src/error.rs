use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Not a stable API; intended for internal use and may change without notice.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a source-origin configuration-gap diagnostic.
    pub(crate) fn source_config_gap(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::ConfigGap, ErrorOrigin::Source, message)
    }

    /// Construct a source-origin external-failure error.
    pub(crate) fn source_external(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::External, ErrorOrigin::Source, message)
    }

    /// Construct a geocode-origin external-failure error.
    pub(crate) fn geocode_external(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::External, ErrorOrigin::Geocode, message)
    }

    /// Construct a drag-origin not-found error.
    pub(crate) fn drag_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::NotFound, ErrorOrigin::Drag, message)
    }

    /// Construct an engine-origin invariant violation.
    pub(crate) fn engine_invariant(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvariantViolation, ErrorOrigin::Engine, message)
    }

    #[must_use]
    pub const fn is_config_gap(&self) -> bool {
        matches!(self.class, ErrorClass::ConfigGap)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    ConfigGap,
    Geometry,
    External,
    NotFound,
    Internal,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ConfigGap => "config_gap",
            Self::Geometry => "geometry",
            Self::External => "external",
            Self::NotFound => "not_found",
            Self::Internal => "internal",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Schema,
    Mapper,
    Source,
    Reconcile,
    Drag,
    Geocode,
    Engine,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Schema => "schema",
            Self::Mapper => "mapper",
            Self::Source => "source",
            Self::Reconcile => "reconcile",
            Self::Drag => "drag",
            Self::Geocode => "geocode",
            Self::Engine => "engine",
        };
        write!(f, "{label}")
    }
}

//!
//! # Layout Result and Error Types
//!

// Local Imports
pub use crate::utils::{self, ErrorContext};

/// # [LayoutError] Result Type
pub type LayoutResult<T> = Result<T, LayoutError>;

///
/// # Layout Error Enumeration
///
pub enum LayoutError {
    /// Unresolved name or key, e.g. a layer, purpose, via id, or instance name
    NotFound { kind: &'static str, key: String },
    /// Undefined routing level, or an off-grid coordinate
    OutOfRange(String),
    /// Data which cannot be expressed in the requested representation,
    /// e.g. a general polygon added to a rectilinear geometry
    Representation(String),
    /// Violation of a cell-composition invariant, e.g. a duplicate instance name
    Composition(String),
    /// Error loading or validating technology or routing-grid rules
    Load {
        message: String,
        stack: Vec<ErrorContext>,
    },
    /// Boxed External Errors
    Boxed(Box<dyn std::error::Error + Send + Sync>),
    /// Uncategorized Error, with String Message
    Str(String),
}
impl LayoutError {
    /// Create a [LayoutError::Str] from anything String-convertible
    pub fn msg(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }
    /// Create an error-variant [Result] of our [LayoutError::Str] variant from anything String-convertible
    pub fn fail<T>(s: impl Into<String>) -> Result<T, Self> {
        Err(Self::msg(s))
    }
    /// Create a [LayoutError::NotFound] for `key`, of `kind` e.g. "layer"
    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }
    pub fn out_of_range(s: impl Into<String>) -> Self {
        Self::OutOfRange(s.into())
    }
    pub fn representation(s: impl Into<String>) -> Self {
        Self::Representation(s.into())
    }
    pub fn composition(s: impl Into<String>) -> Self {
        Self::Composition(s.into())
    }
}
impl std::fmt::Debug for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            LayoutError::NotFound { kind, key } => write!(f, "Cannot find {}: {}", kind, key),
            LayoutError::OutOfRange(s) => write!(f, "Out of Range: {}", s),
            LayoutError::Representation(s) => write!(f, "Representation Error: {}", s),
            LayoutError::Composition(s) => write!(f, "Composition Error: {}", s),
            LayoutError::Load { message, stack } => {
                write!(f, "Load Error: \n - {} \n - {:?}", message, stack)
            }
            LayoutError::Boxed(err) => err.fmt(f),
            LayoutError::Str(err) => err.fmt(f),
        }
    }
}
impl std::fmt::Display for LayoutError {
    /// Display a [LayoutError]
    /// Delegates to the [Debug] implementation
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}
impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Boxed(e) => Some(&**e),
            _ => None,
        }
    }
}
impl From<String> for LayoutError {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}
impl From<&str> for LayoutError {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}
impl From<std::num::TryFromIntError> for LayoutError {
    fn from(e: std::num::TryFromIntError) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<utils::ser::Error> for LayoutError {
    fn from(e: utils::ser::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}

//!
//! # Error-Helper Utilities
//!
//! Loaders for technology and routing-grid rules walk nested records,
//! and want every failure to report *where* in those records it happened.
//! [ErrorHelper] lets each loader attach that state in a single place,
//! and [Unwrapper] applies it post-fix to [Option]s and [Result]s.
//!
//! ```rust
//! use cbag21utils::error::{ErrorHelper, Unwrapper};
//!
//! /// Loader which tracks the layer-name it is working on.
//! struct LayerLoader {
//!     layer: String,
//! }
//! impl ErrorHelper for LayerLoader {
//!     type Error = String;
//!     fn err(&self, msg: impl Into<String>) -> Self::Error {
//!         format!("Layer {}: {}", self.layer, msg.into())
//!     }
//! }
//! impl LayerLoader {
//!     fn load(&self, width: Option<isize>) -> Result<isize, String> {
//!         let w = width.unwrapper(self, "Missing width")?;
//!         self.assert(w > 0, "Width must be positive")?;
//!         Ok(w)
//!     }
//! }
//! let loader = LayerLoader { layer: "M1".into() };
//! assert_eq!(loader.load(Some(5)), Ok(5));
//! assert_eq!(loader.load(None), Err("Layer M1: Missing width".into()));
//! ```
//!

///
/// # ErrorHelper
///
/// Shared failure-plumbing for the rule loaders.
/// Implementers provide `err`, which decorates a message with whatever internal state
/// is useful to report. The remaining methods route through it.
///
pub trait ErrorHelper {
    type Error;

    /// Create and return a [Self::Error] value.
    fn err(&self, msg: impl Into<String>) -> Self::Error;
    /// Return failure
    fn fail<T>(&self, msg: impl Into<String>) -> Result<T, Self::Error> {
        Err(self.err(msg))
    }
    /// Unwrap the [Option] `opt` if it is [Some], and return our error if not.
    fn unwrap<T>(&self, opt: Option<T>, msg: impl Into<String>) -> Result<T, Self::Error> {
        match opt {
            Some(val) => Ok(val),
            None => self.fail(msg),
        }
    }
    /// Assert a boolean condition. Returns through `self.fail` if it is not satisfied.
    fn assert(&self, b: bool, msg: impl Into<String>) -> Result<(), Self::Error> {
        match b {
            true => Ok(()),
            false => self.fail(msg),
        }
    }
}

///
/// # Unwrapper
///
/// Post-fix application of an [ErrorHelper] to [Option]s and [Result]s.
/// Failures are routed to the helper's `fail` rather than panicking.
/// For [Result]s the original error is discarded in favor of `msg`.
///
pub trait Unwrapper {
    type Ok;
    fn unwrapper<H>(self, helper: &H, msg: impl Into<String>) -> Result<Self::Ok, H::Error>
    where
        H: ErrorHelper;
}
impl<T> Unwrapper for Option<T> {
    type Ok = T;
    fn unwrapper<H>(self, helper: &H, msg: impl Into<String>) -> Result<Self::Ok, H::Error>
    where
        H: ErrorHelper,
    {
        match self {
            Some(t) => Ok(t),
            None => helper.fail(msg),
        }
    }
}
impl<T, E> Unwrapper for Result<T, E> {
    type Ok = T;
    fn unwrapper<H>(
        self,
        helper: &H,
        msg: impl Into<String>,
    ) -> Result<<Self as Unwrapper>::Ok, H::Error>
    where
        H: ErrorHelper,
    {
        match self {
            Ok(t) => Ok(t),
            Err(_) => helper.fail(msg),
        }
    }
}

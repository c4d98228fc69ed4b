//!
//! # cbag21 Internal Utilities Crate
//!
//! Shared plumbing for the `cbag21` layout core:
//! read-only shared pointers, serde-based file IO, error helpers,
//! enum-string mappings, and dependency ordering.
//!

pub mod ptr;
pub use ptr::*;

pub mod ser;
pub use ser::*;

pub mod error;
pub use error::*;

pub mod context;
pub use context::*;

pub mod dep_order;
pub use dep_order::*;

pub mod enumstr;
pub use enumstr::*;

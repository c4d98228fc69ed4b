//!
//! # Shared Read-Only Pointers
//!

// Std-lib
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

// Crates.io
use by_address::ByAddress;

///
/// # Ptr
///
/// Reference-counted, thread-safe pointer to *immutable* shared data.
///
/// Technology databases, routing grids, and finished cell masters are built once
/// and then read from any number of places, often concurrently.
/// None of them are mutated after being wrapped, so [Ptr] carries no lock;
/// its contents are reached directly through [Deref]:
///
/// ```text
/// let tech: Ptr<Tech> = Ptr::new(Tech::new(spec)?);
/// let id = tech.get_layer_id("M1")?;
/// ```
///
/// Comparison and hashing are *by address*, via [ByAddress].
/// Two [Ptr]s are equal only if they point to the same allocation,
/// which makes them usable as hash-keys while walking hierarchies
/// in which many nodes are shared.
///
#[derive(Debug)]
pub struct Ptr<T: ?Sized>(ByAddress<Arc<T>>);

impl<T> Ptr<T> {
    /// Pointer Constructor
    pub fn new(t: T) -> Self {
        Self(ByAddress(Arc::new(t)))
    }
}
impl<T: ?Sized> Ptr<T> {
    /// Boolean indication of whether `a` and `b` point to the same allocation
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
    /// Number of strong references to the shared data
    pub fn count(this: &Self) -> usize {
        Arc::strong_count(&this.0)
    }
}
impl<T> From<T> for Ptr<T> {
    fn from(t: T) -> Self {
        Self::new(t)
    }
}
impl<T: ?Sized> Deref for Ptr<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.0
    }
}
impl<T: ?Sized> AsRef<T> for Ptr<T> {
    fn as_ref(&self) -> &T {
        &self.0
    }
}
// [Deref] gets in the way of deriving these, and they're short.
impl<T: ?Sized> Clone for Ptr<T> {
    fn clone(&self) -> Self {
        Self(ByAddress(Arc::clone(&self.0)))
    }
}
impl<T: ?Sized> PartialEq for Ptr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}
impl<T: ?Sized> Eq for Ptr<T> {}
impl<T: ?Sized> Hash for Ptr<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

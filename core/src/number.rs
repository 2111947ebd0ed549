//! `FiniteF64`: a floating point number that is always finite
//!
//! JSON cannot carry NaN or ±Infinity, so [`JsonValue`](crate::JsonValue) and the
//! `NumberRange` bounds store doubles through this wrapper. Because NaN is excluded,
//! the type can implement `Eq`, `Ord` and `Hash`, which the matcher model needs for
//! structural equality and hashing.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A finite `f64`.
///
/// `-0.0` is normalized to `0.0` at construction so that equal values always
/// share a bit pattern (and therefore a hash).
///
/// # Example
///
/// ```
/// use jmatch::FiniteF64;
///
/// assert_eq!(FiniteF64::new(9.8).map(FiniteF64::get), Some(9.8));
/// assert!(FiniteF64::new(f64::NAN).is_none());
/// assert!(FiniteF64::new(f64::INFINITY).is_none());
/// ```
#[derive(Clone, Copy)]
pub struct FiniteF64(f64);

impl FiniteF64 {
    /// Wrap `value`, returning `None` for NaN and infinities.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() {
            // -0.0 == 0.0 but their bits differ
            Some(Self(if value == 0.0 { 0.0 } else { value }))
        } else {
            None
        }
    }

    /// The wrapped value.
    #[inline]
    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }

    /// Returns `true` if the value has no fractional part.
    #[must_use]
    pub fn is_integral(self) -> bool {
        self.0.fract() == 0.0
    }
}

impl PartialEq for FiniteF64 {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for FiniteF64 {}

impl PartialOrd for FiniteF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FiniteF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for FiniteF64 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Debug for FiniteF64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for FiniteF64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<FiniteF64> for f64 {
    fn from(value: FiniteF64) -> Self {
        value.0
    }
}

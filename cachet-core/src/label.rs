//! Store label type.
//!
//! `BackendLabel` is a newtype around `SmolStr` naming a store in log
//! records and metric labels.

use smol_str::SmolStr;
use std::fmt;

/// A label identifying a cache store.
///
/// # Example
/// ```
/// use cachet_core::BackendLabel;
///
/// let label = BackendLabel::new_static("moka");
/// assert_eq!(label.as_str(), "moka");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BackendLabel(SmolStr);

impl BackendLabel {
    /// Creates a new store label.
    #[inline]
    pub fn new(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }

    /// Creates a store label from a static string (no allocation).
    #[inline]
    pub const fn new_static(s: &'static str) -> Self {
        Self(SmolStr::new_static(s))
    }

    /// Returns the label as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for BackendLabel {
    #[inline]
    fn from(s: &str) -> Self {
        Self(SmolStr::new(s))
    }
}

impl From<String> for BackendLabel {
    #[inline]
    fn from(s: String) -> Self {
        Self(SmolStr::from(s))
    }
}

impl AsRef<str> for BackendLabel {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_static() {
        let label = BackendLabel::new_static("redis");
        assert_eq!(label.as_str(), "redis");
    }

    #[test]
    fn test_from_string() {
        let label: BackendLabel = String::from("sessions").into();
        assert_eq!(format!("{}", label), "sessions");
    }
}

//! Quality Type-Safe Wrapper
//!
//! 0-100 compression hint handed to the codec. Construction clamps, so a
//! `Quality` in hand is always in range and nothing downstream re-checks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest accepted quality.
pub const QUALITY_MIN: u8 = 0;
/// Highest accepted quality, also the default.
pub const QUALITY_MAX: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.min(QUALITY_MAX))
    }

    /// Clamps any integer into [0, 100].
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(QUALITY_MIN as i64, QUALITY_MAX as i64) as u8)
    }

    /// Returns true if `value` would be changed by [`Quality::clamped`].
    pub fn needs_clamp(value: i64) -> bool {
        !(QUALITY_MIN as i64..=QUALITY_MAX as i64).contains(&value)
    }

    #[inline]
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(QUALITY_MAX)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for Quality {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_max() {
        assert_eq!(Quality::default().value(), 100);
    }

    #[test]
    fn test_clamped_bounds() {
        assert_eq!(Quality::clamped(-5).value(), 0);
        assert_eq!(Quality::clamped(0).value(), 0);
        assert_eq!(Quality::clamped(80).value(), 80);
        assert_eq!(Quality::clamped(100).value(), 100);
        assert_eq!(Quality::clamped(250).value(), 100);
        assert_eq!(Quality::clamped(i64::MIN).value(), 0);
        assert_eq!(Quality::clamped(i64::MAX).value(), 100);
    }

    #[test]
    fn test_new_clamps_u8() {
        assert_eq!(Quality::new(255).value(), 100);
        assert_eq!(Quality::from(42).value(), 42);
    }

    #[test]
    fn test_needs_clamp() {
        assert!(Quality::needs_clamp(-1));
        assert!(Quality::needs_clamp(101));
        assert!(!Quality::needs_clamp(0));
        assert!(!Quality::needs_clamp(100));
    }

    #[test]
    fn test_serializes_as_integer() {
        let json = serde_json::to_string(&Quality::new(75)).unwrap();
        assert_eq!(json, "75");
    }
}

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Inclusive range `[lo, hi]` over a small game counter.
///
/// Construction always orders the bounds, so `lo <= hi` holds for every value
/// of this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(u8, u8)", into = "(u8, u8)")]
pub struct GuardRange {
    lo: u8,
    hi: u8,
}

impl GuardRange {
    /// Creates a range from two bounds given in any order.
    ///
    /// ```
    /// # use oxihana_policy::guard::GuardRange;
    /// let range = GuardRange::new(5, 2);
    /// assert_eq!((range.lo(), range.hi()), (2, 5));
    /// ```
    #[must_use]
    pub const fn new(a: u8, b: u8) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    #[must_use]
    pub const fn lo(&self) -> u8 {
        self.lo
    }

    #[must_use]
    pub const fn hi(&self) -> u8 {
        self.hi
    }

    /// Returns `true` if `value` lies within `[lo, hi]`.
    #[must_use]
    pub const fn contains(&self, value: u8) -> bool {
        self.lo <= value && value <= self.hi
    }
}

impl From<(u8, u8)> for GuardRange {
    fn from((a, b): (u8, u8)) -> Self {
        Self::new(a, b)
    }
}

impl From<GuardRange> for (u8, u8) {
    fn from(range: GuardRange) -> Self {
        (range.lo, range.hi)
    }
}

impl fmt::Display for GuardRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.lo, self.hi)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid guard range '{input}': expected '<lo>-<hi>'")]
pub struct ParseGuardRangeError {
    #[error(not(source))]
    input: String,
}

impl FromStr for GuardRange {
    type Err = ParseGuardRangeError;

    /// Parses `lo-hi`. Reversed bounds are accepted and reordered.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseGuardRangeError {
            input: s.to_owned(),
        };
        let (a, b) = s.trim().split_once('-').ok_or_else(err)?;
        let a = a.trim().parse().map_err(|_| err())?;
        let b = b.trim().parse().map_err(|_| err())?;
        Ok(Self::new(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_inclusive() {
        let range = GuardRange::new(1, 3);
        assert!(!range.contains(0));
        assert!(range.contains(1));
        assert!(range.contains(3));
        assert!(!range.contains(4));
    }

    #[test]
    fn test_parse_and_display() {
        let range: GuardRange = "0-8".parse().unwrap();
        assert_eq!(range, GuardRange::new(0, 8));
        assert_eq!(range.to_string(), "0-8");
    }

    #[test]
    fn test_parse_reorders_reversed_bounds() {
        let range: GuardRange = "3-1".parse().unwrap();
        assert_eq!((range.lo(), range.hi()), (1, 3));
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!("3".parse::<GuardRange>().is_err());
        assert!("a-2".parse::<GuardRange>().is_err());
        assert!("1-256".parse::<GuardRange>().is_err());
        assert!("-1-2".parse::<GuardRange>().is_err());
    }
}

use crate::descriptor::Shape;
use core::{fmt, str::FromStr};

/// The number of tokens an option or a positional parameter can consume, or the positions of the
/// argument stream a positional parameter claims.
///
/// Ranges are immutable; `with_min` and `with_max` return derived copies. Ranges compare by
/// `(min, max)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Hash)]
pub struct Range {
    min: usize,
    max: usize,
    variable: bool,
}

impl Range {
    pub const UNBOUNDED: usize = usize::MAX;

    pub const fn new(min: usize, max: usize) -> Self {
        Self {
            min,
            max,
            variable: false,
        }
    }

    pub const fn exact(count: usize) -> Self {
        Self::new(count, count)
    }

    pub const fn at_least(min: usize) -> Self {
        Self {
            min,
            max: Self::UNBOUNDED,
            variable: true,
        }
    }

    /// Parses a compact range text such as `"1"`, `"0..1"` or `"2..*"`.
    ///
    /// This never fails: a bound that is not a number falls back to `0` on the left and to unbounded
    /// on the right. Use [`str::parse`] to reject malformed text instead.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text.split_once("..") {
            Some((left, right)) => {
                let min = left.trim().parse().unwrap_or(0);
                match right.trim().parse::<usize>() {
                    Ok(max) => Self::new(min, max.max(min)),
                    Err(_) => Self::at_least(min),
                }
            }
            None => match text.parse() {
                Ok(count) => Self::exact(count),
                Err(_) => Self::at_least(0),
            },
        }
    }

    /// The arity used when a descriptor does not declare one.
    pub const fn default_arity(shape: &Shape, flag: bool, positional: bool) -> Self {
        match (positional, shape) {
            (false, Shape::Scalar) if flag => Self::exact(0),
            (false, _) => Self::exact(1),
            (true, Shape::Scalar) => Self::exact(1),
            (true, _) => Self::new(0, 1),
        }
    }

    #[inline]
    pub const fn min(self) -> usize {
        self.min
    }

    #[inline]
    pub const fn max(self) -> usize {
        self.max
    }

    #[inline]
    pub const fn is_variable(self) -> bool {
        self.variable
    }

    #[inline]
    pub const fn is_unbounded(self) -> bool {
        self.max == Self::UNBOUNDED
    }

    #[inline]
    pub const fn contains(self, value: usize) -> bool {
        self.min <= value && value <= self.max
    }

    pub const fn with_min(self, min: usize) -> Self {
        Self {
            min,
            max: if min > self.max { min } else { self.max },
            variable: self.variable,
        }
    }

    pub const fn with_max(self, max: usize) -> Self {
        Self {
            min: if max < self.min { max } else { self.min },
            max,
            variable: max == Self::UNBOUNDED,
        }
    }

    /// The total number of values a positional parameter spanning `index` positions can hold when
    /// each position accepts `self` values.
    pub const fn capacity(self, index: Range) -> Self {
        let positions = if index.is_unbounded() {
            Self::UNBOUNDED
        } else {
            index.max - index.min + 1
        };
        let max = if self.is_unbounded() || positions == Self::UNBOUNDED {
            if self.max == 0 {
                0
            } else {
                Self::UNBOUNDED
            }
        } else {
            self.max.saturating_mul(positions)
        };
        Self {
            min: self.min,
            max,
            variable: max == Self::UNBOUNDED,
        }
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::exact(1)
    }
}

impl FromStr for Range {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        fn bound(text: &str, whole: &str) -> Result<usize, String> {
            text.trim()
                .parse()
                .map_err(|_| format!("'{}' is not a valid bound in '{whole}'", text.trim()))
        }

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err("empty range".into());
        }
        match trimmed.split_once("..") {
            Some((left, right)) => {
                let min = bound(left, trimmed)?;
                if right.trim() == "*" {
                    return Ok(Self::at_least(min));
                }
                let max = bound(right, trimmed)?;
                if max < min {
                    Err(format!("minimum exceeds maximum in '{trimmed}'"))
                } else {
                    Ok(Self::new(min, max))
                }
            }
            None if trimmed == "*" => Ok(Self::at_least(0)),
            None => Ok(Self::exact(bound(trimmed, trimmed)?)),
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.is_unbounded()) {
            (min, true) => write!(f, "{min}..*"),
            (min, false) if min == self.max => write!(f, "{min}"),
            (min, false) => write!(f, "{min}..{}", self.max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_bounds() {
        assert_eq!(Range::parse("1"), Range::exact(1));
        assert_eq!(Range::parse(" 3 "), Range::exact(3));
        assert_eq!(Range::parse("*"), Range::at_least(0));
        assert!(Range::parse("*").is_variable());
    }

    #[test]
    fn parses_pairs() {
        let range = Range::parse("0..1");
        assert_eq!((range.min(), range.max(), range.is_variable()), (0, 1, false));
        let range = Range::parse("2..*");
        assert_eq!(range.min(), 2);
        assert!(range.is_unbounded());
        assert!(range.is_variable());
    }

    #[test]
    fn lenient_parse_falls_back() {
        assert_eq!(Range::parse("x..2"), Range::new(0, 2));
        assert_eq!(Range::parse("1..y"), Range::at_least(1));
        assert_eq!(Range::parse("boba"), Range::at_least(0));
    }

    #[test]
    fn strict_parse_rejects() {
        assert!("x..2".parse::<Range>().is_err());
        assert!("3..1".parse::<Range>().is_err());
        assert!("".parse::<Range>().is_err());
        assert_eq!("1..*".parse::<Range>(), Ok(Range::at_least(1)));
        assert_eq!("0..1".parse::<Range>(), Ok(Range::new(0, 1)));
    }

    #[test]
    fn contains() {
        let range = Range::parse("1..3");
        assert!(!range.contains(0));
        assert!(range.contains(1));
        assert!(range.contains(3));
        assert!(!range.contains(4));
        assert!(Range::parse("1..*").contains(usize::MAX - 1));
    }

    #[test]
    fn derived_ranges_do_not_mutate() {
        let range = Range::exact(0);
        let raised = range.with_min(1);
        assert_eq!(range, Range::exact(0));
        assert_eq!(raised, Range::exact(1));
        assert_eq!(Range::new(2, 4).with_max(1), Range::exact(1));
        assert!(Range::exact(1).with_max(Range::UNBOUNDED).is_variable());
    }

    #[test]
    fn orders_by_min_then_max() {
        assert!(Range::new(0, 5) < Range::new(1, 2));
        assert!(Range::new(1, 2) < Range::new(1, 3));
        assert!(Range::exact(2) > Range::new(1, 9));
    }

    #[test]
    fn accessors_work_through_references() {
        let ranges = [Range::parse("1..3"), Range::parse("2..*")];
        let bounds: Vec<_> = ranges.iter().map(|range| (range.min(), range.max())).collect();
        assert_eq!(bounds, [(1, 3), (2, Range::UNBOUNDED)]);
        let range = &ranges[0];
        assert!(range.contains(2) && !range.contains(4));
        assert_eq!(range.with_min(2).min(), 2);
        assert!(!range.is_unbounded() && ranges[1].is_variable());
    }

    #[test]
    fn capacity() {
        assert_eq!(Range::exact(1).capacity(Range::new(0, 2)), Range::new(1, 3));
        assert!(Range::new(0, 1).capacity(Range::at_least(0)).is_unbounded());
        assert_eq!(Range::exact(0).capacity(Range::at_least(0)).max(), 0);
    }

    #[test]
    fn displays_compactly() {
        assert_eq!(Range::exact(1).to_string(), "1");
        assert_eq!(Range::new(0, 1).to_string(), "0..1");
        assert_eq!(Range::at_least(2).to_string(), "2..*");
    }

    #[test]
    fn default_arities() {
        assert_eq!(Range::default_arity(&Shape::Scalar, true, false), Range::exact(0));
        assert_eq!(Range::default_arity(&Shape::Scalar, false, false), Range::exact(1));
        assert_eq!(Range::default_arity(&Shape::Collection, false, false), Range::exact(1));
        assert_eq!(Range::default_arity(&Shape::Scalar, true, true), Range::exact(1));
        assert_eq!(Range::default_arity(&Shape::Array, false, true), Range::new(0, 1));
    }
}

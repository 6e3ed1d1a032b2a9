//! A one-dimensional span.
//!
//! A span represents the closed interval `[start, stop]`.
use serde::{Deserialize, Serialize};

/// A closed interval of coordinates in one dimension.
///
/// Represents the range `[start, stop]`.
#[derive(
    Debug, Default, Clone, Copy, Hash, Ord, PartialOrd, Serialize, Deserialize, PartialEq, Eq,
)]
pub struct Span {
    start: i64,
    stop: i64,
}

impl Span {
    /// Creates a new [`Span`] between two integers.
    pub fn new(start: i64, stop: i64) -> Self {
        use std::cmp::{max, min};
        let lower = min(start, stop);
        let upper = max(start, stop);
        Self {
            start: lower,
            stop: upper,
        }
    }

    /// Creates a span of the given length starting from `start`.
    pub const fn with_start_and_length(start: i64, length: i64) -> Self {
        Self {
            stop: start + length,
            start,
        }
    }

    /// Creates a new [`Span`] with center `center` and length `span`.
    ///
    /// If `span` is odd, the extra unit goes on the positive side.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(Span::from_center_span(0, 40), Span::new(-20, 20));
    /// assert_eq!(Span::from_center_span(0, 25), Span::new(-12, 13));
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `span` is negative.
    pub fn from_center_span(center: i64, span: i64) -> Self {
        assert!(span >= 0);
        let start = center - span / 2;
        Self::new(start, start + span)
    }

    /// Gets the center of the span, rounded toward negative infinity.
    #[inline]
    pub const fn center(&self) -> i64 {
        (self.start + self.stop).div_euclid(2)
    }

    /// Gets the length of the span.
    #[inline]
    pub const fn length(&self) -> i64 {
        self.stop - self.start
    }

    /// Gets the start of the span.
    #[inline]
    pub const fn start(&self) -> i64 {
        self.start
    }

    /// Gets the stop of the span.
    #[inline]
    pub const fn stop(&self) -> i64 {
        self.stop
    }

    /// Returns `true` if `x` lies within the closed interval.
    #[inline]
    pub const fn contains(&self, x: i64) -> bool {
        self.start <= x && x <= self.stop
    }

    /// Calculates the smallest interval containing this span and `other`.
    pub fn union(self, other: Self) -> Self {
        use std::cmp::{max, min};
        Self {
            start: min(self.start, other.start),
            stop: max(self.stop, other.stop),
        }
    }

    /// Calculates the intersection of this span with `other`.
    pub fn intersection(self, other: Self) -> Option<Self> {
        let start = std::cmp::max(self.start(), other.start());
        let stop = std::cmp::min(self.stop(), other.stop());
        if start > stop {
            None
        } else {
            Some(Self::new(start, stop))
        }
    }

    /// Creates a new [`Span`] expanded by `amount` in both directions.
    pub const fn expand_all(mut self, amount: i64) -> Self {
        self.stop += amount;
        self.start -= amount;
        self
    }
}

//! Closed numeric intervals.
//!
//! Intervals bound the valid ray parameter during intersection testing and
//! clamp channel intensities in the pixel sinks.

/// A closed interval `[min, max]` on the reals.
///
/// An interval with `min > max` is empty; [`Interval::EMPTY`] is the
/// canonical empty value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
}

impl Interval {
    /// The interval containing nothing.
    pub const EMPTY: Interval = Interval {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    /// The interval containing every real.
    pub const UNIVERSE: Interval = Interval {
        min: f32::NEG_INFINITY,
        max: f32::INFINITY,
    };

    /// Create an interval from its bounds.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Width of the interval, `max - min`.
    pub fn size(&self) -> f32 {
        self.max - self.min
    }

    /// True if `x` lies within the interval, bounds included.
    pub fn contains(&self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    /// True if `x` lies strictly inside the interval, bounds excluded.
    ///
    /// This is the test used on intersection parameters: a hit exactly at a
    /// bound is rejected, which is what keeps scattered rays from re-hitting
    /// the surface they just left.
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }

    /// `x` forced into `[min, max]`.
    pub fn clamp(&self, x: f32) -> f32 {
        x.clamp(self.min, self.max)
    }
}

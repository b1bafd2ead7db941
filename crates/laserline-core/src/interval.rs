use serde::{Deserialize, Serialize};

/// Half-open integer interval `[start, end)` over columns or rows.
///
/// Coordinates are signed: search windows are derived from the previous
/// row and may extend past the image before they are clipped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: i32,
    pub end: i32,
}

impl Interval {
    pub const fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Intersection of two intervals.
    ///
    /// Disjoint inputs produce an interval with `start >= end`, which
    /// iterates as empty.
    #[inline]
    pub fn intersect(self, other: Interval) -> Interval {
        Interval {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.start >= self.end
    }

    #[inline]
    pub fn len(self) -> usize {
        (self.end - self.start).max(0) as usize
    }

    #[inline]
    pub fn contains(self, v: i32) -> bool {
        v >= self.start && v < self.end
    }
}

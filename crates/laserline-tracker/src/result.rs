use std::ops::RangeInclusive;

use laserline_core::GrayImageView;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Row value of a column without data.
pub const Y_INVALID: i32 = -1;
/// Intensity value of a column without data.
pub const I_INVALID: i32 = -1;

/// A located anchor: column, row and mean grey value of its start area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePosition {
    pub x: i32,
    pub y: i32,
    pub grey: i32,
}

impl LinePosition {
    pub const fn new(x: i32, y: i32, grey: i32) -> Self {
        Self { x, y, grey }
    }
}

/// Output buffers of one [`crate::LaserLineTracker`].
///
/// `rows` and `intensities` hold one entry per column and only ever grow:
/// a narrower ROI keeps the capacity and the columns past its width stay
/// at the invalid sentinel. Every tracking call resets all entries first.
///
/// Columns inside `first_valid_index..=last_valid_index` are the tracked
/// range; individual entries in it may still be invalid.
#[derive(Clone, Debug, Serialize)]
pub struct LaserLineResult {
    rows: Vec<i32>,
    intensities: Vec<i32>,
    width: usize,
    first_valid_index: i32,
    last_valid_index: i32,
    start_anchor: Option<LinePosition>,
    end_anchor: Option<LinePosition>,
    is_valid: bool,
    origin: [i32; 2],
}

impl Default for LaserLineResult {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            intensities: Vec::new(),
            width: 0,
            first_valid_index: -1,
            last_valid_index: -1,
            start_anchor: None,
            end_anchor: None,
            is_valid: false,
            origin: [0, 0],
        }
    }
}

impl LaserLineResult {
    /// Tracked row per allocated column, [`Y_INVALID`] where there is none.
    #[inline]
    pub fn rows(&self) -> &[i32] {
        &self.rows
    }

    /// Grey value at the tracked row per allocated column, or [`I_INVALID`].
    #[inline]
    pub fn intensities(&self) -> &[i32] {
        &self.intensities
    }

    /// Number of allocated columns (largest ROI width seen so far).
    #[inline]
    pub fn allocated(&self) -> usize {
        self.rows.len()
    }

    /// Width of the ROI of the last call.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Tracked row at column `x`, if any.
    pub fn row(&self, x: usize) -> Option<i32> {
        self.rows.get(x).copied().filter(|&y| y != Y_INVALID)
    }

    #[inline]
    pub fn first_valid_index(&self) -> i32 {
        self.first_valid_index
    }

    #[inline]
    pub fn last_valid_index(&self) -> i32 {
        self.last_valid_index
    }

    /// Inclusive tracked column range, `None` when nothing was tracked.
    pub fn valid_range(&self) -> Option<RangeInclusive<usize>> {
        if self.first_valid_index < 0 || self.last_valid_index < self.first_valid_index {
            return None;
        }
        Some(self.first_valid_index as usize..=self.last_valid_index as usize)
    }

    /// Left anchor of the last call.
    #[inline]
    pub fn start_anchor(&self) -> Option<LinePosition> {
        self.start_anchor
    }

    /// Right anchor of the last call.
    #[inline]
    pub fn end_anchor(&self) -> Option<LinePosition> {
        self.end_anchor
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// ROI origin in full-sensor coordinates.
    #[inline]
    pub fn origin(&self) -> [i32; 2] {
        self.origin
    }

    /// Tracked points of the valid range in full-sensor pixel coordinates.
    pub fn overlay_points(&self) -> Vec<Point2<f32>> {
        let Some(range) = self.valid_range() else {
            return Vec::new();
        };
        range
            .filter_map(|x| self.row(x).map(|y| self.to_sensor(x as i32, y)))
            .collect()
    }

    /// Located anchors in full-sensor pixel coordinates.
    pub fn anchor_points(&self) -> Vec<Point2<f32>> {
        [self.start_anchor, self.end_anchor]
            .into_iter()
            .flatten()
            .map(|p| self.to_sensor(p.x, p.y))
            .collect()
    }

    fn to_sensor(&self, x: i32, y: i32) -> Point2<f32> {
        Point2::new((x + self.origin[0]) as f32, (y + self.origin[1]) as f32)
    }

    pub(crate) fn reset(&mut self, width: usize, origin: [i32; 2]) {
        if width > self.rows.len() {
            self.rows.resize(width, Y_INVALID);
            self.intensities.resize(width, I_INVALID);
        }
        self.rows.fill(Y_INVALID);
        self.intensities.fill(I_INVALID);
        self.width = width;
        self.first_valid_index = -1;
        self.last_valid_index = -1;
        self.start_anchor = None;
        self.end_anchor = None;
        self.is_valid = false;
        self.origin = origin;
    }

    /// Drop everything a failed call may have produced.
    pub(crate) fn invalidate(&mut self) {
        self.first_valid_index = -1;
        self.last_valid_index = -1;
        self.start_anchor = None;
        self.end_anchor = None;
        self.is_valid = false;
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [i32] {
        &mut self.rows
    }

    pub(crate) fn set_anchors(&mut self, start: Option<LinePosition>, end: Option<LinePosition>) {
        self.start_anchor = start;
        self.end_anchor = end;
    }

    /// Widen the valid range to include `start..=end`, clipped to the ROI.
    pub(crate) fn extend_valid_range(&mut self, start: i32, end: i32) {
        let last = self.width as i32 - 1;
        let start = start.clamp(0, last.max(0));
        let end = end.clamp(0, last.max(0));
        if self.first_valid_index < 0 || start < self.first_valid_index {
            self.first_valid_index = start;
        }
        if self.last_valid_index < 0 || end > self.last_valid_index {
            self.last_valid_index = end;
        }
    }

    pub(crate) fn set_valid(&mut self, valid: bool) {
        self.is_valid = valid;
    }

    /// Sample the grey value under every tracked row of the valid range.
    pub(crate) fn fill_intensities(&mut self, image: &GrayImageView<'_>) {
        let Some(range) = self.valid_range() else {
            return;
        };
        for x in range.take_while(|&x| x < self.width) {
            let y = self.rows[x];
            self.intensities[x] = if y >= 0 {
                image
                    .get(x, y as usize)
                    .map_or(I_INVALID, i32::from)
            } else {
                I_INVALID
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laserline_core::GrayImage;

    #[test]
    fn buffers_grow_but_never_shrink() {
        let mut result = LaserLineResult::default();
        result.reset(40, [0, 0]);
        assert_eq!(result.allocated(), 40);
        result.rows_mut()[35] = 7;
        result.reset(20, [0, 0]);
        assert_eq!(result.allocated(), 40);
        assert_eq!(result.width(), 20);
        assert!(result.rows().iter().all(|&y| y == Y_INVALID));
    }

    #[test]
    fn valid_range_is_clipped_to_roi() {
        let mut result = LaserLineResult::default();
        result.reset(10, [0, 0]);
        result.extend_valid_range(-3, 4);
        result.extend_valid_range(6, 12);
        assert_eq!(result.valid_range(), Some(0..=9));
        result.invalidate();
        assert_eq!(result.valid_range(), None);
        assert_eq!(result.first_valid_index(), -1);
    }

    #[test]
    fn intensities_follow_rows() {
        let mut img = GrayImage::filled(4, 3, 10);
        img.put(1, 2, 200);
        let mut result = LaserLineResult::default();
        result.reset(4, [0, 0]);
        result.rows_mut().copy_from_slice(&[0, 2, 3, Y_INVALID]);
        result.extend_valid_range(0, 3);
        result.fill_intensities(&img.as_view());
        assert_eq!(result.intensities(), &[10, 200, I_INVALID, I_INVALID]);
    }

    #[test]
    fn overlay_points_are_shifted_by_origin() {
        let mut result = LaserLineResult::default();
        result.reset(3, [100, 20]);
        result.rows_mut().copy_from_slice(&[4, Y_INVALID, 6]);
        result.extend_valid_range(0, 2);
        result.set_anchors(Some(LinePosition::new(0, 4, 180)), None);
        assert_eq!(
            result.overlay_points(),
            vec![Point2::new(100.0, 24.0), Point2::new(102.0, 26.0)]
        );
        assert_eq!(result.anchor_points(), vec![Point2::new(100.0, 24.0)]);
    }
}

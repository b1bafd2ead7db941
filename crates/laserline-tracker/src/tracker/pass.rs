use laserline_core::{GrayImageView, Interval};
use serde::Serialize;

use super::column::{find_max_in_column, ColumnState};
use crate::error::TrackError;
use crate::integral::BoxSum;
use crate::params::TrackingParameters;
use crate::result::LinePosition;
use crate::smoothing::smooth_rows;

/// Direction of one tracking pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackDirection {
    LeftToRight,
    RightToLeft,
}

impl TrackDirection {
    /// Column increment.
    #[inline]
    pub fn step(self) -> i32 {
        match self {
            TrackDirection::LeftToRight => 1,
            TrackDirection::RightToLeft => -1,
        }
    }
}

/// Diagnostics of one directional pass.
///
/// `scan_start..=scan_end` is the column range the pass vouches for, before
/// clipping to the ROI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PassOutcome {
    pub direction: TrackDirection,
    pub scan_start: i32,
    pub scan_end: i32,
    pub stopped_by: Option<TrackError>,
}

/// ROI shrunk by the averaging radii, so every averaging box fits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ErodedRoi {
    pub columns: Interval,
    pub rows: Interval,
}

impl ErodedRoi {
    pub(crate) fn new(width: usize, height: usize, params: &TrackingParameters) -> Self {
        let (ax, ay) = (params.averaging_x, params.averaging_y);
        let dx = (width as i32 - 2 * ax).max(0);
        let dy = (height as i32 - 2 * ay).max(0);
        Self {
            columns: Interval::new(ax, ax + dx),
            rows: Interval::new(ay, ay + dy),
        }
    }
}

/// Everything a pass reads.
pub(crate) struct PassContext<'a, 'img, S: ?Sized> {
    pub image: &'a GrayImageView<'img>,
    pub sums: &'a S,
    pub params: &'a TrackingParameters,
    pub roi: ErodedRoi,
}

impl<'a, 'img, S: BoxSum + ?Sized> PassContext<'a, 'img, S> {
    pub(crate) fn new(
        image: &'a GrayImageView<'img>,
        sums: &'a S,
        params: &'a TrackingParameters,
    ) -> Self {
        Self {
            image,
            sums,
            params,
            roi: ErodedRoi::new(image.width(), image.height(), params),
        }
    }

    /// Track from `start` towards `end`, writing rows into `rows`.
    ///
    /// `rows` covers exactly the ROI width; no write leaves it. Without an
    /// opposite anchor the pass runs to the eroded ROI edge.
    pub(crate) fn run(
        &self,
        direction: TrackDirection,
        start: LinePosition,
        end: Option<LinePosition>,
        rows: &mut [i32],
    ) -> PassOutcome {
        let params = self.params;
        let step = direction.step();
        let avg_x = params.averaging_x;
        let (xs, xe) = (self.roi.columns.start, self.roi.columns.end);

        let (u_start, u_end) = match direction {
            TrackDirection::LeftToRight => {
                let u_end = end.map_or(xe, |e| xe.min(e.x + 1));
                (start.x.max(xs), u_end)
            }
            TrackDirection::RightToLeft => {
                let u_end = end.map_or(xs - 1, |e| (xs - 1).max(e.x - 1));
                (start.x.min(xe - 1), u_end)
            }
        };
        let before_end = |x: i32| match direction {
            TrackDirection::LeftToRight => x < u_end,
            TrackDirection::RightToLeft => x > u_end,
        };

        // The averaging band behind the start column cannot be tracked;
        // carry the anchor row into it.
        for i in 0..=avg_x {
            put(rows, u_start - i * step, start.y);
        }

        let upper = params.search_band_upper;
        let lower = params.lower_band();
        let mut state = ColumnState::default();
        let mut stopped_by = None;
        let mut x = u_start + step;
        while before_end(x) {
            let Some(previous) = at(rows, x - step) else {
                break;
            };
            let band = Interval::new(previous - upper, previous + lower + 1).intersect(self.roi.rows);
            let candidate = find_max_in_column(self.sums, x, band, params);
            let pixel = candidate.and_then(|y| self.image.get(x as usize, y as usize));
            match state.check(candidate, pixel, previous, params) {
                Ok(committed) => put(rows, x, committed.row()),
                Err(err) => {
                    if err == TrackError::GapTooLong {
                        x -= step * (params.max_gap_width + 1);
                    }
                    stopped_by = Some(err);
                    break;
                }
            }
            x += step;
        }

        let scan_end = match stopped_by {
            None => {
                if let Some(last) = at(rows, u_end - step) {
                    for i in 0..avg_x {
                        put(rows, u_end + i * step, last);
                    }
                }
                u_end + (avg_x - 1) * step
            }
            Some(err) => {
                log::debug!("{direction:?} pass stopped at column {x}: {err}");
                x - step
            }
        };
        // A start clamped to the eroded edge also vouches for the band
        // filled behind it.
        let edge = match direction {
            TrackDirection::LeftToRight => xs,
            TrackDirection::RightToLeft => xe - 1,
        };
        let scan_start = if u_start == edge {
            u_start - avg_x * step
        } else {
            u_start
        };

        let (lo, hi) = if scan_start > scan_end {
            (scan_end, scan_start)
        } else {
            (scan_start, scan_end)
        };
        let last_column = rows.len() as i32 - 1;
        if last_column >= 0 {
            smooth_rows(
                rows,
                lo.clamp(0, last_column) as usize,
                hi.clamp(0, last_column) as usize,
                params.smoothing,
            );
        }

        PassOutcome {
            direction,
            scan_start: lo,
            scan_end: hi,
            stopped_by,
        }
    }
}

#[inline]
fn at(rows: &[i32], x: i32) -> Option<i32> {
    usize::try_from(x).ok().and_then(|i| rows.get(i).copied())
}

#[inline]
fn put(rows: &mut [i32], x: i32, value: i32) {
    if let Some(slot) = usize::try_from(x).ok().and_then(|i| rows.get_mut(i)) {
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integral::{DirectSum, IntegralImage};
    use crate::result::Y_INVALID;
    use laserline_core::GrayImage;

    fn line_image(width: usize, height: usize, row_at: impl Fn(usize) -> Option<usize>) -> GrayImage {
        let mut img = GrayImage::filled(width, height, 30);
        for x in 0..width {
            if let Some(y) = row_at(x) {
                for yy in y - 1..=y + 1 {
                    img.put(x, yy, 200);
                }
            }
        }
        img
    }

    fn params() -> TrackingParameters {
        TrackingParameters {
            threshold: 100,
            averaging_x: 1,
            averaging_y: 1,
            ..TrackingParameters::default()
        }
    }

    #[test]
    fn eroded_roi_never_inverts() {
        let p = TrackingParameters {
            averaging_x: 4,
            averaging_y: 3,
            ..TrackingParameters::default()
        };
        let roi = ErodedRoi::new(5, 40, &p);
        assert_eq!(roi.columns, Interval::new(4, 4));
        assert_eq!(roi.rows, Interval::new(3, 37));
    }

    #[test]
    fn follows_a_step_within_the_jump_limit() {
        let img = line_image(40, 30, |x| Some(if x < 20 { 12 } else { 15 }));
        let view = img.as_view();
        let table = IntegralImage::build(&view);
        let p = params();
        let ctx = PassContext::new(&view, &table, &p);
        let mut rows = vec![Y_INVALID; 40];
        let outcome = ctx.run(
            TrackDirection::LeftToRight,
            LinePosition::new(0, 12, 200),
            None,
            &mut rows,
        );
        assert_eq!(outcome.stopped_by, None);
        assert_eq!((outcome.scan_start, outcome.scan_end), (0, 39));
        assert!(rows[..20].iter().all(|&y| y == 12));
        assert!(rows[20..].iter().all(|&y| y == 15));
    }

    #[test]
    fn long_gap_rewinds_the_stop_column() {
        // Line ends at column 14: columns 15..=17 are bridged, 18 is one too many.
        let img = line_image(40, 30, |x| (x < 15).then_some(12));
        let view = img.as_view();
        let table = IntegralImage::build(&view);
        let p = TrackingParameters {
            max_gap_width: 3,
            ..params()
        };
        let ctx = PassContext::new(&view, &table, &p);
        let mut rows = vec![Y_INVALID; 40];
        let outcome = ctx.run(
            TrackDirection::LeftToRight,
            LinePosition::new(5, 12, 200),
            None,
            &mut rows,
        );
        assert_eq!(outcome.stopped_by, Some(TrackError::GapTooLong));
        assert_eq!((outcome.scan_start, outcome.scan_end), (5, 13));
        assert_eq!(rows[4], 12);
        assert_eq!(rows[17], 12);
        assert_eq!(rows[18], Y_INVALID);
    }

    #[test]
    fn fully_dark_columns_are_jump_checked() {
        // Black frame, line at row 30 broken over columns 29..=33. From column
        // 31 the averaging box is all zero and the last band row (40) wins.
        let mut img = GrayImage::filled(60, 60, 0);
        for x in (0..60).filter(|x| !(29..=33).contains(x)) {
            for y in 29..=31 {
                img.put(x, y, 200);
            }
        }
        let view = img.as_view();
        let table = IntegralImage::build(&view);
        let p = TrackingParameters {
            threshold: 100,
            averaging_x: 2,
            averaging_y: 1,
            search_band_upper: 10,
            max_line_jump_y: 5,
            ..TrackingParameters::default()
        };
        let ctx = PassContext::new(&view, &table, &p);
        let mut rows = vec![Y_INVALID; 60];
        let outcome = ctx.run(
            TrackDirection::LeftToRight,
            LinePosition::new(2, 30, 200),
            None,
            &mut rows,
        );
        assert_eq!(outcome.stopped_by, Some(TrackError::JumpTooLarge));
        assert_eq!((outcome.scan_start, outcome.scan_end), (0, 30));
        assert_eq!(rows[30], 30);
        assert_eq!(rows[31], Y_INVALID);
    }

    #[test]
    fn right_to_left_stops_next_to_the_opposite_anchor() {
        let img = line_image(40, 30, |_| Some(12));
        let view = img.as_view();
        let direct = DirectSum::new(view, 1);
        let p = params();
        let ctx = PassContext::new(&view, &direct, &p);
        let mut rows = vec![Y_INVALID; 40];
        let outcome = ctx.run(
            TrackDirection::RightToLeft,
            LinePosition::new(39, 12, 200),
            Some(LinePosition::new(10, 12, 200)),
            &mut rows,
        );
        assert_eq!(outcome.stopped_by, None);
        assert_eq!((outcome.scan_start, outcome.scan_end), (9, 39));
        assert_eq!(rows[9], 12);
        assert_eq!(rows[8], Y_INVALID);
    }
}

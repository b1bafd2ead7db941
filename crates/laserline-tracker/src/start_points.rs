//! Anchor search near the left and right ROI borders.

use laserline_core::Interval;
use serde::Serialize;

use crate::error::TrackingFailure;
use crate::integral::BoxSum;
use crate::params::{TrackStart, TrackingParameters};
use crate::result::LinePosition;

/// Rows this close to the top or bottom ROI edge never become anchors.
const BORDER_MARGIN: i32 = 10;
/// How far into the ROI each side is searched, in percent of its width.
const SEARCH_WIDTH_PERCENT: f64 = 50.0;

/// Left and right anchors as accepted by the start policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AnchorPair {
    pub left: Option<LinePosition>,
    pub right: Option<LinePosition>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

struct ColumnHit {
    y: i32,
    max: i64,
}

/// Finds the columns and rows where tracking starts.
///
/// Each side is scanned column by column from the ROI border inward. In each
/// column a `start_area_y` high window slides down over per-row sums of a
/// `start_area_x` wide strip; the brightest window above the area-scaled
/// threshold marks the anchor row.
#[derive(Clone, Debug, Default)]
pub struct StartPointLocator {
    border: Vec<i64>,
}

impl StartPointLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locate both anchors and apply the start policy of `params`.
    pub fn locate<S: BoxSum + ?Sized>(
        &mut self,
        sums: &S,
        width: usize,
        height: usize,
        params: &TrackingParameters,
    ) -> Result<AnchorPair, TrackingFailure> {
        let cols = width as i32;
        let rows = height as i32;
        let too_small = TrackingFailure::RoiTooSmall { width, height };

        let area_x = params.start_area_x.min(cols - 1);
        let area_y = params.start_area_y.min(rows - 1);
        if area_x <= 0 || area_y <= 0 {
            return Err(too_small);
        }
        let band = Interval::new(area_y / 2 + 1, rows - area_y / 2 - 2);
        if band.is_empty() {
            return Err(too_small);
        }

        let area = i64::from(area_x) * i64::from(area_y);
        let geometry = WindowGeometry {
            cols,
            rows,
            area_x,
            area_y,
            band,
            threshold: i64::from(params.threshold) * area,
        };
        let search_limit = (f64::from(cols) / 100.0 * SEARCH_WIDTH_PERCENT) as i32;

        let left = self.search_side(sums, &geometry, Side::Left, search_limit, area);
        let right = self.search_side(sums, &geometry, Side::Right, search_limit, area);
        log::debug!("anchor candidates: left {left:?}, right {right:?}");

        let accepted = if params.double_tracking || params.track_start == TrackStart::Auto {
            matches!((left, right), (Some(l), Some(r)) if l.x <= r.x)
        } else {
            match params.track_start {
                TrackStart::FromLeft => left.is_some(),
                TrackStart::FromRight => right.is_some(),
                TrackStart::Auto => false,
            }
        };
        if !accepted {
            return Err(TrackingFailure::NoLine);
        }
        Ok(AnchorPair { left, right })
    }

    fn search_side<S: BoxSum + ?Sized>(
        &mut self,
        sums: &S,
        geometry: &WindowGeometry,
        side: Side,
        search_limit: i32,
        area: i64,
    ) -> Option<LinePosition> {
        let mut posx = match side {
            Side::Left => 0,
            Side::Right => geometry.cols - 1,
        };
        loop {
            let strip = match side {
                Side::Left => Interval::new(posx, posx + geometry.area_x),
                Side::Right => Interval::new(posx - geometry.area_x + 1, posx + 1),
            }
            .intersect(Interval::new(0, geometry.cols));

            if !strip.is_empty() {
                if let Some(hit) = self.scan_column(sums, geometry, strip) {
                    return Some(LinePosition::new(posx, hit.y, (hit.max / area) as i32));
                }
            }

            match side {
                Side::Left => {
                    posx += 1;
                    if posx >= search_limit {
                        return None;
                    }
                }
                Side::Right => {
                    posx -= 1;
                    if posx <= geometry.cols - search_limit {
                        return None;
                    }
                }
            }
        }
    }

    fn scan_column<S: BoxSum + ?Sized>(
        &mut self,
        sums: &S,
        geometry: &WindowGeometry,
        strip: Interval,
    ) -> Option<ColumnHit> {
        let area_y = geometry.area_y;
        self.border.clear();
        self.border
            .extend((0..geometry.rows).map(|r| sums.box_sum(strip, Interval::new(r, r + 1))));

        let mut value: i64 = self.border[..area_y as usize].iter().sum();
        let mut min = i64::MAX;
        let mut max = 0i64;
        let mut y_sum = 0i64;
        let mut y_count = 0i64;

        for y in geometry.band.start..geometry.band.end {
            value -= self.border[(y - area_y / 2 - 1) as usize];
            value += self.border[(y + (area_y + 1) / 2 - 1) as usize];
            min = min.min(value);
            if value <= geometry.threshold {
                continue;
            }
            let inside = y > BORDER_MARGIN && y < geometry.rows - BORDER_MARGIN;
            if !inside {
                continue;
            }
            // A strictly brighter window restarts the row average.
            if value > max {
                y_sum = 0;
                y_count = 0;
            }
            if value >= max {
                y_sum += i64::from(y);
                y_count += 1;
                max = value;
            }
        }

        log::trace!(
            "strip {}..{}: min {min}, max {max}, rows {y_count}",
            strip.start,
            strip.end
        );
        (y_count > 0).then(|| ColumnHit {
            y: (y_sum / y_count) as i32,
            max,
        })
    }
}

struct WindowGeometry {
    cols: i32,
    rows: i32,
    area_x: i32,
    area_y: i32,
    band: Interval,
    threshold: i64,
}

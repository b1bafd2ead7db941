use laserline_core::Interval;

use crate::error::TrackError;
use crate::integral::BoxSum;
use crate::params::TrackingParameters;

/// Row of the brightest averaging box in column `x`.
///
/// Candidate rows run over `rows` in steps of `resolution_y`. When several
/// rows share the maximum, the midpoint of the first and last of them is
/// returned. When no sum is positive every candidate ties at zero and the
/// last candidate row is returned. An empty interval yields `None`.
pub(crate) fn find_max_in_column<S: BoxSum + ?Sized>(
    sums: &S,
    x: i32,
    rows: Interval,
    params: &TrackingParameters,
) -> Option<i32> {
    let columns = Interval::new(x - params.averaging_x, x + params.averaging_x + 1);
    let mut max = 0i64;
    let mut first = None;
    let mut last = None;
    for y in (rows.start..rows.end).step_by(params.resolution_y as usize) {
        let sum = sums.box_sum(
            columns,
            Interval::new(y - params.averaging_y, y + params.averaging_y + 1),
        );
        if sum > max {
            max = sum;
            first = Some(y);
            last = Some(y);
        } else if sum == max {
            last = Some(y);
        }
    }
    let last = last?;
    Some((first.unwrap_or(last) + last) / 2)
}

/// Row written for an accepted column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CommittedRow {
    /// The candidate row passed every check.
    Tracked(i32),
    /// The column was too dark; the previous row is repeated.
    Bridged(i32),
}

impl CommittedRow {
    #[inline]
    pub(crate) fn row(self) -> i32 {
        match self {
            CommittedRow::Tracked(y) | CommittedRow::Bridged(y) => y,
        }
    }
}

/// Gap and lap-join bookkeeping of one directional pass.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ColumnState {
    gap_len: i32,
    gap_count: i32,
    lap_reference: Option<i32>,
}

impl ColumnState {
    /// Validate the candidate of one column against the previous row.
    ///
    /// `pixel` is the raw grey value at the candidate row. On
    /// [`TrackError::GapTooLong`] the gap length is reset and the caller
    /// rewinds its column by `max_gap_width + 1` steps.
    pub(crate) fn check(
        &mut self,
        candidate: Option<i32>,
        pixel: Option<u8>,
        previous: i32,
        params: &TrackingParameters,
    ) -> Result<CommittedRow, TrackError> {
        let bright = pixel.is_some_and(|px| i32::from(px) >= params.threshold);
        if bright {
            if self.gap_len > 0 {
                self.gap_count += 1;
            }
            if self.gap_count > params.max_gap_count {
                return Err(TrackError::TooManyGaps);
            }
            self.gap_len = 0;
        } else {
            self.gap_len += 1;
            if self.gap_len > params.max_gap_width {
                self.gap_len = 0;
                return Err(TrackError::GapTooLong);
            }
        }

        let Some(row) = candidate else {
            return Ok(CommittedRow::Bridged(previous));
        };
        if (row - previous).abs() > params.max_line_jump_y {
            return Err(TrackError::JumpTooLarge);
        }
        if !bright {
            return Ok(CommittedRow::Bridged(previous));
        }

        let lap = params.lap_join;
        if lap.enabled {
            let reference = *self.lap_reference.get_or_insert(row);
            let diff = row - reference;
            if (diff < 0 && -diff > lap.upper_max_diff) || (diff > 0 && diff > lap.lower_max_diff) {
                return Err(TrackError::LapJoinViolation);
            }
        }
        Ok(CommittedRow::Tracked(row))
    }
}

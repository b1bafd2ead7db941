use std::ops::Range;

use super::pass::{PassContext, PassOutcome, TrackDirection};
use crate::error::{TrackingFailure, TrackingStatus};
use crate::integral::BoxSum;
use crate::params::{LineSide, TrackStart};
use crate::result::{LaserLineResult, LinePosition};
use crate::start_points::AnchorPair;

/// Track from both anchors and merge the overlap of the two passes.
///
/// The left-to-right rows are kept in `snapshot` while the right-to-left
/// pass overwrites the result. Around the zone where the passes stopped the
/// row on the configured line side wins; outside it each column keeps the
/// last row written to it.
pub(crate) fn track_both<S: BoxSum + ?Sized>(
    ctx: &PassContext<'_, '_, S>,
    left: LinePosition,
    right: LinePosition,
    result: &mut LaserLineResult,
    snapshot: &mut Vec<i32>,
    passes: &mut Vec<PassOutcome>,
) -> TrackingStatus {
    let width = result.width();
    let mut stop_left = ctx.roi.columns.end;
    let mut stop_right = ctx.roi.columns.start;

    let forward = ctx.run(
        TrackDirection::LeftToRight,
        left,
        Some(right),
        &mut result.rows_mut()[..width],
    );
    result.extend_valid_range(forward.scan_start, forward.scan_end);
    if forward.stopped_by.is_some() {
        stop_left = forward.scan_end;
    }
    passes.push(forward);

    snapshot.clear();
    snapshot.extend_from_slice(&result.rows()[..width]);

    let backward = ctx.run(
        TrackDirection::RightToLeft,
        right,
        Some(left),
        &mut result.rows_mut()[..width],
    );
    result.extend_valid_range(backward.scan_start, backward.scan_end);
    if backward.stopped_by.is_some() {
        stop_right = backward.scan_start;
    }
    passes.push(backward);

    let gap = ctx.params.max_gap_width;
    let lo = (stop_right - gap - 1).max(result.first_valid_index());
    let hi = (stop_left + gap + 1).min(result.last_valid_index());
    log::debug!("merging passes over columns {lo}..{hi}");

    merge_window(result.rows_mut(), snapshot, lo..hi, ctx.params.line_side);
    TrackingStatus::Complete
}

/// Merge the first pass's `snapshot` into `rows` over `window`.
///
/// `Upper` keeps the larger row, `Lower` the smaller one. Snapshot rows
/// `<= 0` never replace anything.
fn merge_window(rows: &mut [i32], snapshot: &[i32], window: Range<i32>, side: LineSide) {
    let start = window.start.max(0) as usize;
    let end = window.end.max(0) as usize;
    for (row, &other) in rows.iter_mut().zip(snapshot).take(end).skip(start) {
        if other <= 0 {
            continue;
        }
        let replace = match side {
            LineSide::Upper => other > *row,
            LineSide::Lower => other < *row,
        };
        if replace {
            *row = other;
        }
    }
}

/// Track in one direction chosen by the start mode.
///
/// A pass that stops early leaves its partial range in place and reports
/// [`TrackingStatus::Degraded`].
pub(crate) fn track_one<S: BoxSum + ?Sized>(
    ctx: &PassContext<'_, '_, S>,
    anchors: AnchorPair,
    result: &mut LaserLineResult,
    passes: &mut Vec<PassOutcome>,
) -> Result<TrackingStatus, TrackingFailure> {
    let AnchorPair { left, right } = anchors;
    let from_left = |l: LinePosition| (TrackDirection::LeftToRight, l, right);
    let from_right = |r: LinePosition| (TrackDirection::RightToLeft, r, left);
    let plan = match ctx.params.track_start {
        TrackStart::FromLeft => left.map(from_left),
        TrackStart::FromRight => right.map(from_right),
        // The left anchor has to be strictly brighter to win.
        TrackStart::Auto => match (left, right) {
            (Some(l), Some(r)) if l.grey > r.grey => Some(from_left(l)),
            (_, Some(r)) => Some(from_right(r)),
            (Some(l), None) => Some(from_left(l)),
            (None, None) => None,
        },
    };
    let (direction, start, end) = plan.ok_or(TrackingFailure::NoLine)?;

    let width = result.width();
    let outcome = ctx.run(direction, start, end, &mut result.rows_mut()[..width]);
    result.extend_valid_range(outcome.scan_start, outcome.scan_end);
    passes.push(outcome);

    Ok(match outcome.stopped_by {
        None => TrackingStatus::Complete,
        Some(err) => TrackingStatus::Degraded(err),
    })
}

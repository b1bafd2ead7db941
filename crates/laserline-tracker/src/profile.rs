use serde::{Deserialize, Serialize};

use crate::result::LaserLineResult;

/// Rank of a column with a tracked row.
pub const RANK_VALID: i32 = 255;
/// Rank of a column without data.
pub const RANK_INVALID: i32 = 0;

/// Tracked line as the value/rank array consumed by downstream filters.
///
/// One entry per allocated column. Values are rows in ROI pixels, `-1.0`
/// where nothing was tracked.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LaserProfile {
    pub values: Vec<f64>,
    pub ranks: Vec<i32>,
    /// 1.0 when the tracker produced a valid range, else 0.0.
    pub global_rank: f64,
}

impl LaserProfile {
    pub fn from_result(result: &LaserLineResult) -> Self {
        let n = result.allocated();
        let mut values = vec![-1.0; n];
        let mut ranks = vec![RANK_INVALID; n];

        let first = result.first_valid_index();
        let last = result.last_valid_index();
        let in_image = |i: i32| i >= 0 && (i as usize) < result.width();
        if in_image(first) && in_image(last) {
            for x in first as usize..=last as usize {
                let y = result.rows()[x];
                values[x] = f64::from(y);
                ranks[x] = if y < 0 { RANK_INVALID } else { RANK_VALID };
            }
        }

        let global_rank = if first == -1 || last == -1 { 0.0 } else { 1.0 };
        Self {
            values,
            ranks,
            global_rank,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

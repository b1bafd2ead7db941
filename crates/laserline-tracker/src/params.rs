use serde::{Deserialize, Serialize};

/// Side from which a single-direction pass starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackStart {
    FromLeft,
    FromRight,
    /// Start from the brighter anchor. The left anchor wins only when it is
    /// strictly brighter than the right one.
    #[default]
    Auto,
}

/// Which edge of a reflective surface carries the laser line.
///
/// Governs how the two passes of double tracking are merged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineSide {
    /// Laser from below, reflections above the line: the larger row wins.
    #[default]
    Upper,
    /// Reflections below the line: the smaller row wins.
    Lower,
}

/// Optional 1-D filter applied to the rows of each directional pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum LineSmoothing {
    #[default]
    None,
    /// 3-tap running median.
    Median3,
    /// Box mean over `2 * half_width + 1` columns.
    Mean { half_width: i32 },
}

/// Lap-join constraint: bounds the drift of the tracked row from the first
/// committed row of a pass.
///
/// Upward drift (smaller rows) is limited by `upper_max_diff`, downward drift
/// by `lower_max_diff`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LapJoinParams {
    pub enabled: bool,
    pub upper_max_diff: i32,
    pub lower_max_diff: i32,
}

/// Parameters of one tracking call.
///
/// All values are in ROI pixels. Box sums are integer; thresholds are per
/// pixel and scaled by the box area where a box is summed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingParameters {
    /// Grey-value cutoff for anchors and tracked pixels.
    pub threshold: i32,
    /// Half-width of the averaging box around a candidate.
    pub averaging_x: i32,
    /// Half-height of the averaging box around a candidate.
    pub averaging_y: i32,
    /// Rows searched above the previous row.
    pub search_band_upper: i32,
    /// Rows searched below the previous row; negative means "same as
    /// `search_band_upper`".
    pub search_band_lower: i32,
    /// Column step inside the averaging box.
    pub resolution_x: i32,
    /// Row step between candidates.
    pub resolution_y: i32,
    /// Longest run of below-threshold columns bridged by repeating the row.
    pub max_gap_width: i32,
    /// Number of bridged gaps allowed per pass.
    pub max_gap_count: i32,
    /// Largest row change between adjacent columns.
    pub max_line_jump_y: i32,
    pub track_start: TrackStart,
    /// Track from both anchors and merge.
    pub double_tracking: bool,
    pub line_side: LineSide,
    /// Width of the anchor search box.
    pub start_area_x: i32,
    /// Height of the anchor search box.
    pub start_area_y: i32,
    pub lap_join: LapJoinParams,
    pub smoothing: LineSmoothing,
}

impl Default for TrackingParameters {
    fn default() -> Self {
        Self {
            threshold: 50,
            averaging_x: 2,
            averaging_y: 1,
            search_band_upper: 5,
            search_band_lower: -1,
            resolution_x: 1,
            resolution_y: 1,
            max_gap_width: 5,
            max_gap_count: 2,
            max_line_jump_y: 5,
            track_start: TrackStart::Auto,
            double_tracking: true,
            line_side: LineSide::Upper,
            start_area_x: 1,
            start_area_y: 1,
            lap_join: LapJoinParams::default(),
            smoothing: LineSmoothing::None,
        }
    }
}

impl TrackingParameters {
    /// Effective downward search band.
    #[inline]
    pub fn lower_band(&self) -> i32 {
        if self.search_band_lower < 0 {
            self.search_band_upper
        } else {
            self.search_band_lower
        }
    }

    /// True when box sums may be served from the integral image.
    #[inline]
    pub fn full_resolution(&self) -> bool {
        self.resolution_x == 1 && self.resolution_y == 1
    }

    /// Copy with non-positive resolution and averaging values replaced by 1.
    pub fn sanitized(&self) -> Self {
        let mut out = *self;
        for (name, value) in [
            ("resolution_x", &mut out.resolution_x),
            ("resolution_y", &mut out.resolution_y),
            ("averaging_x", &mut out.averaging_x),
            ("averaging_y", &mut out.averaging_y),
        ] {
            if *value <= 0 {
                log::debug!("{name} = {value} is not positive, using 1");
                *value = 1;
            }
        }
        out
    }
}

use serde::Serialize;

/// Failures that abort a whole tracking call.
///
/// After any of these the result is reset: `is_valid == false` and both
/// valid indices are `-1`.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingFailure {
    #[error("no frame supplied")]
    NoFrame,
    #[error("roi {width}x{height} is too small for the configured start area")]
    RoiTooSmall { width: usize, height: usize },
    #[error("laser line start points not found")]
    NoLine,
}

impl TrackingFailure {
    /// Integer status returned by the legacy filter interface.
    #[inline]
    pub fn legacy_code(&self) -> i32 {
        -1
    }
}

/// Reason a directional pass stopped before reaching its end column.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackError {
    #[error("gap wider than the allowed gap width")]
    GapTooLong,
    #[error("more gaps than allowed")]
    TooManyGaps,
    #[error("row jump between adjacent columns too large")]
    JumpTooLarge,
    #[error("lap-join deviation exceeded")]
    LapJoinViolation,
}

impl TrackError {
    /// Numeric track-error code reported by the legacy filter.
    pub fn code(&self) -> i32 {
        match self {
            TrackError::GapTooLong => 225,
            TrackError::TooManyGaps => 226,
            TrackError::JumpTooLarge => 227,
            TrackError::LapJoinViolation => 229,
        }
    }
}

/// Outcome of a tracking call that found its anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "stopped_by")]
pub enum TrackingStatus {
    /// The line was tracked; `is_valid` is set.
    Complete,
    /// The single pass stopped early. The valid range covers what was
    /// tracked, but `is_valid` stays `false`.
    Degraded(TrackError),
}

impl TrackingStatus {
    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self, TrackingStatus::Complete)
    }

    /// Integer status returned by the legacy filter interface.
    pub fn legacy_code(&self) -> i32 {
        match self {
            TrackingStatus::Complete => 0,
            TrackingStatus::Degraded(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_codes() {
        assert_eq!(TrackError::GapTooLong.code(), 225);
        assert_eq!(TrackError::TooManyGaps.code(), 226);
        assert_eq!(TrackError::JumpTooLarge.code(), 227);
        assert_eq!(TrackError::LapJoinViolation.code(), 229);
        assert_eq!(TrackingFailure::NoLine.legacy_code(), -1);
        assert_eq!(TrackingStatus::Complete.legacy_code(), 0);
        assert_eq!(
            TrackingStatus::Degraded(TrackError::JumpTooLarge).legacy_code(),
            1
        );
    }

    #[test]
    fn status_serializes_with_stop_reason() {
        let json = serde_json::to_string(&TrackingStatus::Degraded(TrackError::GapTooLong))
            .expect("serialize");
        assert_eq!(json, r#"{"status":"degraded","stopped_by":"gap_too_long"}"#);
    }
}

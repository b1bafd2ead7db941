use std::ops::RangeInclusive;

use laserline_core::{GrayImageView, ImageError, RoiFrame};
use laserline_tracker::{
    LaserLineTracker, LaserProfile, LinePosition, PassOutcome, TrackingFailure,
    TrackingParameters, TrackingStatus,
};
use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the high-level facade helpers.
#[derive(thiserror::Error, Debug)]
pub enum TrackImageError {
    #[error("invalid grayscale image buffer length (expected {expected} bytes, got {got})")]
    InvalidGrayBuffer { expected: usize, got: usize },

    #[error("invalid grayscale image dimensions (width={width}, height={height})")]
    InvalidGrayDimensions { width: u32, height: u32 },

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Tracking(#[from] TrackingFailure),
}

/// Serializable summary of one tracking call.
#[derive(Clone, Debug, Serialize)]
pub struct TrackingReport {
    pub status: TrackingStatus,
    /// Legacy integer status of the call (0 complete, 1 degraded).
    pub legacy_code: i32,
    pub is_valid: bool,
    pub valid_range: Option<RangeInclusive<usize>>,
    pub start_anchor: Option<LinePosition>,
    pub end_anchor: Option<LinePosition>,
    /// Tracked points of the valid range in full-image coordinates.
    pub overlay: Vec<[f32; 2]>,
    pub passes: Vec<PassOutcome>,
    pub profile: LaserProfile,
}

impl TrackingReport {
    fn from_tracker(tracker: &LaserLineTracker, status: TrackingStatus) -> Self {
        let result = tracker.result();
        Self {
            status,
            legacy_code: status.legacy_code(),
            is_valid: result.is_valid(),
            valid_range: result.valid_range(),
            start_anchor: result.start_anchor(),
            end_anchor: result.end_anchor(),
            overlay: result
                .overlay_points()
                .iter()
                .map(|p| [p.x, p.y])
                .collect(),
            passes: tracker.passes().to_vec(),
            profile: LaserProfile::from_result(result),
        }
    }
}

/// Rectangular region of interest in full-image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct Roi {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Convert an `image::GrayImage` into the stride-aware core view.
pub fn gray_view(img: &::image::GrayImage) -> Result<GrayImageView<'_>, ImageError> {
    GrayImageView::from_contiguous(img.width() as usize, img.height() as usize, img.as_raw())
}

/// Track the laser line over the whole image.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(img, params), fields(width = img.width(), height = img.height()))
)]
pub fn track_laser_line(
    img: &::image::GrayImage,
    params: TrackingParameters,
) -> Result<TrackingReport, TrackImageError> {
    let view = gray_view(img)?;
    let mut tracker = LaserLineTracker::new(params);
    let status = tracker.track(&view)?;
    Ok(TrackingReport::from_tracker(&tracker, status))
}

/// Track the laser line inside `roi`; report coordinates stay in image space.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(img, params), fields(width = img.width(), height = img.height()))
)]
pub fn track_laser_line_in_roi(
    img: &::image::GrayImage,
    roi: Roi,
    params: TrackingParameters,
) -> Result<TrackingReport, TrackImageError> {
    let view = gray_view(img)?;
    let sub = view.subview(
        roi.x as usize,
        roi.y as usize,
        roi.width as usize,
        roi.height as usize,
    )?;
    let frame = RoiFrame::new(sub, [roi.x as i32, roi.y as i32]);
    let mut tracker = LaserLineTracker::new(params);
    let status = tracker.process(Some(&frame))?;
    Ok(TrackingReport::from_tracker(&tracker, status))
}

/// Build an `image::GrayImage` from a raw grayscale buffer.
pub fn gray_image_from_slice(
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<::image::GrayImage, TrackImageError> {
    let Some(expected) = (width as usize).checked_mul(height as usize) else {
        return Err(TrackImageError::InvalidGrayDimensions { width, height });
    };
    if pixels.len() != expected {
        return Err(TrackImageError::InvalidGrayBuffer {
            expected,
            got: pixels.len(),
        });
    }
    ::image::GrayImage::from_raw(width, height, pixels.to_vec())
        .ok_or(TrackImageError::InvalidGrayDimensions { width, height })
}

pub fn track_laser_line_from_gray_u8(
    width: u32,
    height: u32,
    pixels: &[u8],
    params: TrackingParameters,
) -> Result<TrackingReport, TrackImageError> {
    let img = gray_image_from_slice(width, height, pixels)?;
    track_laser_line(&img, params)
}

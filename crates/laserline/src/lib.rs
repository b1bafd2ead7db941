//! High-level facade crate for the `laserline-*` workspace.
//!
//! This crate provides:
//! - re-exports of the image types (`laserline-core`) and the tracker
//!   (`laserline-tracker`)
//! - (feature-gated) end-to-end helpers that track a laser line in an
//!   `image::GrayImage` or a raw buffer and collect a serializable report.
//!
//! ## Quickstart
//!
//! ```no_run
//! use laserline::track;
//! use laserline::TrackingParameters;
//! use image::ImageReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = ImageReader::open("scanline.png")?.decode()?.to_luma8();
//! let report = track::track_laser_line(&img, TrackingParameters::default())?;
//! println!("tracked columns: {:?}", report.valid_range);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `laserline::core`: stride-aware image views, ROI frames, logging setup.
//! - `laserline::tracker`: anchor search, directional passes, merge, result
//!   buffers and profile conversion.
//! - `laserline::track` (feature `image`): end-to-end helpers from
//!   `image::GrayImage`.

pub use laserline_core as core;
pub use laserline_tracker as tracker;

pub use laserline_core::{GrayImage, GrayImageView, ImageError, RoiFrame};
pub use laserline_tracker::{
    LaserLineResult, LaserLineTracker, LaserProfile, LineSide, LinePosition, PassOutcome,
    TrackError, TrackStart, TrackingFailure, TrackingParameters, TrackingStatus,
};

#[cfg(feature = "image")]
pub mod track;

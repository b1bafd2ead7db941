//! Laser-line extraction for one scanline ROI.
//!
//! The tracker locates a start point near each ROI border, follows the
//! brightest row column by column from there and, with double tracking,
//! merges a left-to-right and a right-to-left pass. The output is one row
//! and one grey value per column plus the inclusive range of columns that
//! were tracked.
//!
//! ```no_run
//! use laserline_core::GrayImage;
//! use laserline_tracker::{LaserLineTracker, TrackingParameters};
//!
//! let img = GrayImage::filled(320, 64, 0);
//! let mut tracker = LaserLineTracker::new(TrackingParameters::default());
//! match tracker.track(&img.as_view()) {
//!     Ok(status) => println!("{status:?}: {:?}", tracker.result().valid_range()),
//!     Err(err) => println!("no line: {err}"),
//! }
//! ```
//!
//! ## Box sums
//! At full resolution all brightness queries go through a summed-area
//! table built once per call. With a resolution step other than 1 the sums
//! are taken directly from the image, sampling every `resolution_x`-th
//! column and every `resolution_y`-th candidate row.
//!
//! ## Failures
//! [`TrackingFailure`] aborts a call and leaves an invalid result. A pass
//! that stops on a [`TrackError`] keeps what it tracked; in single-direction
//! mode the call reports [`TrackingStatus::Degraded`].

mod error;
mod integral;
mod params;
mod profile;
mod result;
mod smoothing;
mod start_points;
mod tracker;

pub use error::{TrackError, TrackingFailure, TrackingStatus};
pub use integral::{BoxSum, DirectSum, IntegralImage, IntegralImageCache};
pub use params::{LapJoinParams, LineSide, LineSmoothing, TrackStart, TrackingParameters};
pub use profile::{LaserProfile, RANK_INVALID, RANK_VALID};
pub use result::{LaserLineResult, LinePosition, I_INVALID, Y_INVALID};
pub use smoothing::{mean, median3, smooth_rows};
pub use start_points::{AnchorPair, StartPointLocator};
pub use tracker::{LaserLineTracker, PassOutcome, TrackDirection};

pub use laserline_core::{GrayImage, GrayImageView, ImageError, Interval, RoiFrame};

//! Core types for laser-line tracking.
//!
//! This crate is intentionally small: a stride-aware greyscale view over
//! sensor buffers, the half-open [`Interval`] used for search windows, and
//! the logging bootstrap shared by the tracker and the demos.
//!
//! ## Image views and stride
//! Sensor frames are often padded, and a region of interest is a window into
//! a larger buffer. [`GrayImageView`] therefore always carries an explicit
//! row stride (in bytes, `stride >= width`); the stride is never derived from
//! the width.

mod image;
mod interval;
mod logger;

pub use image::{GrayImage, GrayImageView, ImageError, RoiFrame};
pub use interval::Interval;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;

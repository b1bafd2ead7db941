//! Directional tracking and the tracker that drives it.
//!
//! A call runs the anchor search, one or two directional passes and, with
//! double tracking, the merge of both passes.

mod column;
mod merge;
mod pass;
mod pipeline;

pub use pass::{PassOutcome, TrackDirection};
pub use pipeline::LaserLineTracker;

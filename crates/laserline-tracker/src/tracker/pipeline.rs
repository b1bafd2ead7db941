use laserline_core::{GrayImageView, RoiFrame};

#[cfg(feature = "tracing")]
use tracing::instrument;

use super::merge::{track_both, track_one};
use super::pass::{PassContext, PassOutcome};
use crate::error::{TrackingFailure, TrackingStatus};
use crate::integral::{BoxSum, DirectSum, IntegralImageCache};
use crate::params::TrackingParameters;
use crate::result::LaserLineResult;
use crate::start_points::StartPointLocator;

/// Laser-line tracker for one camera line.
///
/// Owns its result buffers and scratch space, so repeated calls do not
/// allocate once the largest ROI has been seen. One instance must not be
/// shared between threads; run one tracker per line instead.
pub struct LaserLineTracker {
    params: TrackingParameters,
    integral: IntegralImageCache,
    scratch: Scratch,
}

#[derive(Default)]
struct Scratch {
    result: LaserLineResult,
    locator: StartPointLocator,
    snapshot: Vec<i32>,
    passes: Vec<PassOutcome>,
}

impl LaserLineTracker {
    /// Create a tracker. Non-positive resolutions and averaging radii are
    /// replaced by 1.
    pub fn new(params: TrackingParameters) -> Self {
        Self {
            params: params.sanitized(),
            integral: IntegralImageCache::new(),
            scratch: Scratch::default(),
        }
    }

    /// Tracking parameters.
    #[inline]
    pub fn params(&self) -> &TrackingParameters {
        &self.params
    }

    /// Replace the parameters for subsequent calls.
    pub fn set_params(&mut self, params: TrackingParameters) {
        self.params = params.sanitized();
    }

    /// Result of the last call.
    #[inline]
    pub fn result(&self) -> &LaserLineResult {
        &self.scratch.result
    }

    /// Directional passes run by the last call, in execution order.
    #[inline]
    pub fn passes(&self) -> &[PassOutcome] {
        &self.scratch.passes
    }

    /// Track the laser line in a frame handed over by the pipeline.
    ///
    /// A missing frame resets the result and fails with
    /// [`TrackingFailure::NoFrame`].
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self, frame)))]
    pub fn process(
        &mut self,
        frame: Option<&RoiFrame<'_>>,
    ) -> Result<TrackingStatus, TrackingFailure> {
        match frame {
            Some(frame) => self.track_roi(&frame.image, frame.origin),
            None => {
                self.scratch.begin(0, [0, 0]);
                Err(TrackingFailure::NoFrame)
            }
        }
    }

    /// Track the laser line in an ROI image whose origin is the sensor
    /// origin.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, image),
            fields(width = image.width(), height = image.height())
        )
    )]
    pub fn track(&mut self, image: &GrayImageView<'_>) -> Result<TrackingStatus, TrackingFailure> {
        self.track_roi(image, [0, 0])
    }

    fn track_roi(
        &mut self,
        image: &GrayImageView<'_>,
        origin: [i32; 2],
    ) -> Result<TrackingStatus, TrackingFailure> {
        let (width, height) = (image.width(), image.height());
        self.integral.invalidate();
        self.scratch.begin(width, origin);
        if width == 0 || height < 2 {
            return Err(TrackingFailure::RoiTooSmall { width, height });
        }

        let params = &self.params;
        if params.full_resolution() {
            self.integral.build(image);
        }
        let outcome = match self.integral.get() {
            Some(table) => self.scratch.run(params, image, table, table),
            None => {
                let anchor_sums = DirectSum::new(*image, 1);
                let column_sums = DirectSum::new(*image, params.resolution_x as usize);
                self.scratch.run(params, image, &anchor_sums, &column_sums)
            }
        };

        match outcome {
            Ok(status) => {
                let result = &self.scratch.result;
                log::debug!(
                    "tracked columns {}..={} ({status:?})",
                    result.first_valid_index(),
                    result.last_valid_index()
                );
                Ok(status)
            }
            Err(err) => {
                log::debug!("tracking failed: {err}");
                self.scratch.result.invalidate();
                Err(err)
            }
        }
    }
}

impl Scratch {
    fn begin(&mut self, width: usize, origin: [i32; 2]) {
        self.result.reset(width, origin);
        self.passes.clear();
    }

    fn run<A, C>(
        &mut self,
        params: &TrackingParameters,
        image: &GrayImageView<'_>,
        anchor_sums: &A,
        column_sums: &C,
    ) -> Result<TrackingStatus, TrackingFailure>
    where
        A: BoxSum + ?Sized,
        C: BoxSum + ?Sized,
    {
        let anchors =
            self.locator
                .locate(anchor_sums, image.width(), image.height(), params)?;
        self.result.set_anchors(anchors.left, anchors.right);

        let ctx = PassContext::new(image, column_sums, params);
        let status = if params.double_tracking {
            let (Some(left), Some(right)) = (anchors.left, anchors.right) else {
                return Err(TrackingFailure::NoLine);
            };
            track_both(
                &ctx,
                left,
                right,
                &mut self.result,
                &mut self.snapshot,
                &mut self.passes,
            )
        } else {
            track_one(&ctx, anchors, &mut self.result, &mut self.passes)?
        };

        self.result.fill_intensities(image);
        self.result.set_valid(status.is_complete());
        Ok(status)
    }
}

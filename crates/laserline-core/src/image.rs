/// Errors raised when wrapping raw pixel buffers.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("row stride {stride} is smaller than width {width}")]
    InvalidStride { width: usize, stride: usize },
    #[error("pixel buffer too small (expected at least {expected} bytes, got {actual})")]
    BufferTooSmall { expected: usize, actual: usize },
    #[error("sub-view lies outside the parent view")]
    OutOfBounds,
}

/// Borrowed 8-bit greyscale raster.
///
/// `stride` is the distance in bytes between two row starts and may exceed
/// `width` (padded sensor buffers, ROI sub-views). All pixel reads go through
/// [`GrayImageView::get`] or [`GrayImageView::row`], which never address
/// memory outside the `width x height` window.
#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    width: usize,
    height: usize,
    stride: usize,
    data: &'a [u8],
}

impl<'a> GrayImageView<'a> {
    /// Wrap `data` as a `width x height` view with an explicit row stride.
    pub fn new(
        width: usize,
        height: usize,
        stride: usize,
        data: &'a [u8],
    ) -> Result<Self, ImageError> {
        if stride < width {
            return Err(ImageError::InvalidStride { width, stride });
        }
        let expected = min_required_len(width, height, stride).ok_or(ImageError::BufferTooSmall {
            expected: usize::MAX,
            actual: data.len(),
        })?;
        if data.len() < expected {
            return Err(ImageError::BufferTooSmall {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    /// Wrap a tightly packed buffer (`stride == width`).
    pub fn from_contiguous(width: usize, height: usize, data: &'a [u8]) -> Result<Self, ImageError> {
        Self::new(width, height, width, data)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Pixel at column `x`, row `y`, or `None` outside the view.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.stride + x).copied()
    }

    /// The `width` pixels of row `y`.
    #[inline]
    pub fn row(&self, y: usize) -> Option<&'a [u8]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.stride;
        self.data.get(start..start + self.width)
    }

    /// ROI sub-view sharing this view's stride.
    pub fn subview(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<GrayImageView<'a>, ImageError> {
        if x > self.width
            || y > self.height
            || width > self.width - x
            || height > self.height - y
        {
            return Err(ImageError::OutOfBounds);
        }
        if width == 0 || height == 0 {
            return Ok(GrayImageView {
                width,
                height,
                stride: self.stride,
                data: &[],
            });
        }
        let start = y * self.stride + x;
        let data = self.data.get(start..).ok_or(ImageError::OutOfBounds)?;
        GrayImageView::new(width, height, self.stride, data)
    }
}

fn min_required_len(width: usize, height: usize, stride: usize) -> Option<usize> {
    if width == 0 || height == 0 {
        return Some(0);
    }
    stride.checked_mul(height - 1)?.checked_add(width)
}

/// Owned, tightly packed greyscale image.
#[derive(Clone, Debug)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>, // row-major, len = w*h
}

impl GrayImage {
    /// Image filled with a constant grey value.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    pub fn as_view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            stride: self.width,
            data: &self.data,
        }
    }

    /// Set one pixel; writes outside the image are ignored.
    #[inline]
    pub fn put(&mut self, x: usize, y: usize, value: u8) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }
}

/// One camera frame handed over by the surrounding pipeline.
///
/// `image` covers the region of interest only; `origin` is the ROI's
/// top-left corner in full-sensor coordinates and only matters for overlay
/// output.
#[derive(Clone, Copy, Debug)]
pub struct RoiFrame<'a> {
    pub image: GrayImageView<'a>,
    pub origin: [i32; 2],
}

impl<'a> RoiFrame<'a> {
    pub fn new(image: GrayImageView<'a>, origin: [i32; 2]) -> Self {
        Self { image, origin }
    }
}

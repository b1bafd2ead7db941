//! Rectangular grey-value sums.
//!
//! Two interchangeable back ends implement [`BoxSum`]: a summed-area table
//! for full-resolution tracking and a direct summation that supports a
//! column step for downsampled tracking.

use laserline_core::{GrayImageView, Interval};

/// Sum of grey values over columns `xs` and rows `ys` (both half-open).
pub trait BoxSum {
    fn box_sum(&self, xs: Interval, ys: Interval) -> i64;
}

/// Summed-area table of one ROI.
///
/// The table has one more column and row than the ROI; its first row and
/// first column are zero, so `T[y][x]` is the sum of all pixels above and to
/// the left of `(x, y)`.
#[derive(Clone, Debug, Default)]
pub struct IntegralImage {
    width: usize,
    height: usize,
    table: Vec<i64>,
}

impl IntegralImage {
    /// Build the table for `image`.
    pub fn build(image: &GrayImageView<'_>) -> Self {
        let mut out = Self::default();
        out.rebuild(image);
        out
    }

    /// Rebuild in place, keeping the allocation.
    pub fn rebuild(&mut self, image: &GrayImageView<'_>) {
        self.width = image.width();
        self.height = image.height();
        let stride = self.width + 1;
        self.table.clear();
        self.table.resize(stride * (self.height + 1), 0);

        for y in 0..self.height {
            let Some(src) = image.row(y) else {
                continue;
            };
            let (above, current) = self.table.split_at_mut((y + 1) * stride);
            let above = &above[y * stride..];
            let current = &mut current[..stride];
            let mut row_sum = 0i64;
            for (x, &px) in src.iter().enumerate() {
                row_sum += i64::from(px);
                current[x + 1] = above[x + 1] + row_sum;
            }
        }
    }

    /// Width of the source ROI.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the source ROI.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn at(&self, x: usize, y: usize) -> i64 {
        self.table[y * (self.width + 1) + x]
    }

    /// Sum over columns `x1..x2` and rows `y1..y2`.
    ///
    /// Requires `x1 < x2 <= width` and `y1 < y2 <= height`.
    pub fn sum(&self, x1: usize, x2: usize, y1: usize, y2: usize) -> i64 {
        debug_assert!(x1 < x2 && x2 <= self.width, "columns {x1}..{x2} outside table");
        debug_assert!(y1 < y2 && y2 <= self.height, "rows {y1}..{y2} outside table");
        self.at(x2, y2) - self.at(x2, y1) - self.at(x1, y2) + self.at(x1, y1)
    }
}

impl BoxSum for IntegralImage {
    #[inline]
    fn box_sum(&self, xs: Interval, ys: Interval) -> i64 {
        self.sum(
            xs.start as usize,
            xs.end as usize,
            ys.start as usize,
            ys.end as usize,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CacheState {
    NotBuilt,
    Built,
}

/// Per-call integral image with an explicit built/not-built state.
///
/// The table is only handed out after [`IntegralImageCache::build`] in the
/// same call; [`IntegralImageCache::invalidate`] runs at the start of every
/// call because the ROI may have moved.
#[derive(Clone, Debug)]
pub struct IntegralImageCache {
    image: IntegralImage,
    state: CacheState,
}

impl Default for IntegralImageCache {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegralImageCache {
    pub fn new() -> Self {
        Self {
            image: IntegralImage::default(),
            state: CacheState::NotBuilt,
        }
    }

    pub fn invalidate(&mut self) {
        self.state = CacheState::NotBuilt;
    }

    pub fn build(&mut self, image: &GrayImageView<'_>) -> &IntegralImage {
        self.image.rebuild(image);
        self.state = CacheState::Built;
        &self.image
    }

    /// The table, if it was built since the last invalidation.
    pub fn get(&self) -> Option<&IntegralImage> {
        match self.state {
            CacheState::Built => Some(&self.image),
            CacheState::NotBuilt => None,
        }
    }

    #[inline]
    pub fn is_built(&self) -> bool {
        self.state == CacheState::Built
    }
}

/// Box sums read straight from the image, sampling every `step_x`-th column.
#[derive(Clone, Copy, Debug)]
pub struct DirectSum<'a> {
    view: GrayImageView<'a>,
    step_x: usize,
}

impl<'a> DirectSum<'a> {
    pub fn new(view: GrayImageView<'a>, step_x: usize) -> Self {
        Self {
            view,
            step_x: step_x.max(1),
        }
    }
}

impl BoxSum for DirectSum<'_> {
    fn box_sum(&self, xs: Interval, ys: Interval) -> i64 {
        let x0 = xs.start.max(0) as usize;
        let x1 = (xs.end.max(0) as usize).min(self.view.width());
        if x0 >= x1 {
            return 0;
        }
        (ys.start.max(0)..ys.end)
            .filter_map(|y| self.view.row(y as usize))
            .map(|row| {
                row[x0..x1]
                    .iter()
                    .step_by(self.step_x)
                    .map(|&px| i64::from(px))
                    .sum::<i64>()
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laserline_core::GrayImage;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn brute_force(img: &GrayImage, x1: usize, x2: usize, y1: usize, y2: usize) -> i64 {
        let mut sum = 0i64;
        for y in y1..y2 {
            for x in x1..x2 {
                sum += i64::from(img.data[y * img.width + x]);
            }
        }
        sum
    }

    fn random_image(rng: &mut StdRng, width: usize, height: usize) -> GrayImage {
        let mut img = GrayImage::filled(width, height, 0);
        for px in img.data.iter_mut() {
            *px = rng.gen();
        }
        img
    }

    #[test]
    fn uniform_image_sums_to_area() {
        let img = GrayImage::filled(17, 9, 3);
        let table = IntegralImage::build(&img.as_view());
        assert_eq!(table.sum(0, 17, 0, 9), 3 * 17 * 9);
        assert_eq!(table.sum(4, 7, 2, 3), 3 * 3);
    }

    #[test]
    fn random_rectangles_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        let img = random_image(&mut rng, 33, 21);
        let table = IntegralImage::build(&img.as_view());
        for _ in 0..500 {
            let x1 = rng.gen_range(0..img.width);
            let x2 = rng.gen_range(x1 + 1..=img.width);
            let y1 = rng.gen_range(0..img.height);
            let y2 = rng.gen_range(y1 + 1..=img.height);
            assert_eq!(
                table.sum(x1, x2, y1, y2),
                brute_force(&img, x1, x2, y1, y2),
                "rect {x1}..{x2} x {y1}..{y2}"
            );
        }
    }

    #[test]
    fn direct_sum_agrees_with_table_on_strided_roi() {
        let mut rng = StdRng::seed_from_u64(42);
        let full = random_image(&mut rng, 40, 30);
        let roi = full.as_view().subview(5, 3, 24, 18).expect("roi");
        let table = IntegralImage::build(&roi);
        let direct = DirectSum::new(roi, 1);
        for _ in 0..300 {
            let x1 = rng.gen_range(0..24);
            let x2 = rng.gen_range(x1 + 1..=24);
            let y1 = rng.gen_range(0..18);
            let y2 = rng.gen_range(y1 + 1..=18);
            let xs = Interval::new(x1, x2);
            let ys = Interval::new(y1, y2);
            assert_eq!(table.box_sum(xs, ys), direct.box_sum(xs, ys));
        }
    }

    #[test]
    fn direct_sum_steps_columns() {
        let mut img = GrayImage::filled(6, 2, 0);
        for x in 0..6 {
            img.put(x, 0, x as u8 + 1);
            img.put(x, 1, 10);
        }
        let direct = DirectSum::new(img.as_view(), 2);
        // columns 0, 2, 4 -> 1 + 3 + 5 and 3 * 10
        assert_eq!(direct.box_sum(Interval::new(0, 6), Interval::new(0, 2)), 9 + 30);
    }

    #[test]
    fn cache_hands_out_table_only_after_build() {
        let img = GrayImage::filled(5, 4, 1);
        let mut cache = IntegralImageCache::new();
        assert!(cache.get().is_none());
        cache.build(&img.as_view());
        assert_eq!(cache.get().map(|t| t.sum(0, 5, 0, 4)), Some(20));
        cache.invalidate();
        assert!(!cache.is_built());
        assert!(cache.get().is_none());
    }
}

use crate::params::LineSmoothing;

/// Smooth `rows[start..=end]` in place.
///
/// Ranges too short for the filter are left untouched.
pub fn smooth_rows(rows: &mut [i32], start: usize, end: usize, smoothing: LineSmoothing) {
    if end >= rows.len() || start > end {
        return;
    }
    match smoothing {
        LineSmoothing::None => {}
        LineSmoothing::Median3 => median3(&mut rows[start..=end]),
        LineSmoothing::Mean { half_width } => {
            if half_width > 0 {
                mean(&mut rows[start..=end], half_width as usize);
            }
        }
    }
}

#[inline]
fn median_of(a: i32, b: i32, c: i32) -> i32 {
    a.max(b).min(b.max(c)).min(a.max(c))
}

/// Running 3-tap median.
///
/// Works in place, so each output already sees the filtered left
/// neighbour. The first and last samples take the median of the three
/// samples at their end.
pub fn median3(values: &mut [i32]) {
    let n = values.len();
    if n < 3 {
        return;
    }
    values[0] = median_of(values[0], values[1], values[2]);
    for i in 1..n - 1 {
        values[i] = median_of(values[i - 1], values[i], values[i + 1]);
    }
    values[n - 1] = median_of(values[n - 3], values[n - 2], values[n - 1]);
}

/// Box mean over `2 * half_width + 1` samples with truncating division.
///
/// The `half_width` samples at each end keep their values.
pub fn mean(values: &mut [i32], half_width: usize) {
    let window = 2 * half_width + 1;
    if values.len() < window {
        return;
    }
    let means: Vec<i32> = values
        .windows(window)
        .map(|w| w.iter().sum::<i32>() / window as i32)
        .collect();
    values[half_width..half_width + means.len()].copy_from_slice(&means);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_removes_single_spikes() {
        let mut values = vec![10, 10, 30, 10, 11, 11];
        median3(&mut values);
        assert_eq!(values, vec![10, 10, 10, 10, 11, 11]);
    }

    #[test]
    fn median_ends_use_their_own_triple() {
        let mut values = vec![40, 10, 12, 13];
        median3(&mut values);
        assert_eq!(values[0], 12);
        assert_eq!(values[3], 12);
    }

    #[test]
    fn mean_keeps_the_edges() {
        let mut values = vec![1, 2, 9, 4, 5];
        mean(&mut values, 1);
        assert_eq!(values, vec![1, 4, 5, 6, 5]);
    }

    #[test]
    fn smooth_rows_only_touches_the_range() {
        let mut rows = vec![0, 10, 50, 10, 10, 0];
        smooth_rows(&mut rows, 1, 4, LineSmoothing::Median3);
        assert_eq!(rows, vec![0, 10, 10, 10, 10, 0]);
        smooth_rows(&mut rows, 2, 9, LineSmoothing::Mean { half_width: 1 });
        assert_eq!(rows, vec![0, 10, 10, 10, 10, 0]);
    }
}

use crate::kernel::Kernel;
use std::cell::RefCell;

#[cfg(feature = "threads")]
use rayon::prelude::*;
#[cfg(feature = "threads")]
use thread_local::ThreadLocal;

#[cfg(not(feature = "threads"))]
use crate::rayoff::*;

/// Largest radius for which a full-intensity neighborhood (`255 * kernel.sum()`) fits in the `u32` accumulator
pub const MAX_SAFE_RADIUS: u8 = max_safe_radius(u32::MAX as u64);

const fn max_safe_radius(accumulator_max: u64) -> u8 {
    let mut radius = 0u8;
    while radius < Kernel::MAX_RADIUS && (255u64 << (2 * (radius as u32 + 1))) <= accumulator_max {
        radius += 1;
    }
    radius
}

/// Direction of a 1-D pass
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Axis {
    /// Neighbors are `x-r..=x+r` in the same row
    Horizontal,
    /// Neighbors are `y-r..=y+r` in the same column
    Vertical,
}

/// Which 1-D pass runs first.
///
/// Both give the same blur, but each pass truncates, so the low bits differ.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum PassOrder {
    /// Columns first, then rows
    #[default]
    VerticalFirst,
    /// Rows first, then columns
    HorizontalFirst,
}

impl PassOrder {
    /// Axes in the order they're processed
    #[inline]
    #[must_use]
    pub fn axes(self) -> [Axis; 2] {
        match self {
            Self::VerticalFirst => [Axis::Vertical, Axis::Horizontal],
            Self::HorizontalFirst => [Axis::Horizontal, Axis::Vertical],
        }
    }
}

/// Weighted sum of `src` along one axis, divided by the kernel sum, written to `dst`.
///
/// Both are `width`×`height` planes. Pixels outside of the plane count as 0.
/// Rows of `dst` are computed independently, possibly on different threads.
pub(crate) fn convolve_axis(src: &[u8], dst: &mut [u8], width: usize, height: usize, axis: Axis, kernel: &Kernel) {
    debug_assert!(kernel.radius() <= MAX_SAFE_RADIUS);
    debug_assert_eq!(src.len(), width * height);
    debug_assert_eq!(dst.len(), width * height);
    if width == 0 || height == 0 {
        return;
    }
    match axis {
        Axis::Horizontal => convolve_rows(src, dst, width, kernel),
        Axis::Vertical => convolve_columns(src, dst, width, height, kernel),
    }
}

#[inline(never)]
fn convolve_rows(src: &[u8], dst: &mut [u8], width: usize, kernel: &Kernel) {
    let weights = kernel.weights();
    let radius = usize::from(kernel.radius());
    let sum = kernel.sum();

    dst.par_chunks_mut(width).enumerate().for_each(|(y, out_row)| {
        let row = &src[y * width..][..width];
        for (x, out) in out_row.iter_mut().enumerate() {
            // range of taps that land inside the row
            let first = radius.saturating_sub(x);
            let last = (width - 1 - x + radius).min(2 * radius);
            let acc: u32 = weights[first..=last].iter()
                .zip(&row[x + first - radius..])
                .map(|(&w, &px)| w * u32::from(px))
                .sum();
            *out = (acc / sum) as u8;
        }
    });
}

#[inline(never)]
fn convolve_columns(src: &[u8], dst: &mut [u8], width: usize, height: usize, kernel: &Kernel) {
    let weights = kernel.weights();
    let radius = usize::from(kernel.radius());
    let sum = kernel.sum();

    // whole rows are accumulated at once, so that src is read sequentially
    let tls = ThreadLocal::new();
    dst.par_chunks_mut(width).enumerate().for_each(|(y, out_row)| {
        let acc = tls.get_or(|| RefCell::new(Vec::<u32>::new()));
        let mut acc = acc.borrow_mut();
        acc.clear();
        acc.resize(width, 0);

        let first = radius.saturating_sub(y);
        let last = (height - 1 - y + radius).min(2 * radius);
        for (t, &w) in weights.iter().enumerate().take(last + 1).skip(first) {
            let src_row = &src[(y + t - radius) * width..][..width];
            for (a, &px) in acc.iter_mut().zip(src_row) {
                *a += w * u32::from(px);
            }
        }
        for (out, &a) in out_row.iter_mut().zip(acc.iter()) {
            *out = (a / sum) as u8;
        }
    });
}

/// Full 2-D blur of one plane, using `tmp` for the intermediate result.
///
/// `tmp` must be the same size as `plane`; its previous contents don't matter.
pub(crate) fn blur_plane(plane: &mut [u8], tmp: &mut [u8], width: usize, height: usize, kernel: &Kernel, order: PassOrder) {
    let [first, second] = order.axes();
    tmp.fill(0);
    convolve_axis(plane, tmp, width, height, first, kernel);
    convolve_axis(tmp, plane, width, height, second, kernel);
}

#[test]
fn safe_radius() {
    assert_eq!(12, MAX_SAFE_RADIUS);
    assert_eq!(11, max_safe_radius(i32::MAX as u64));
    assert_eq!(Kernel::MAX_RADIUS, max_safe_radius(u64::MAX));
}

#[test]
fn corner_scenario() {
    let k = Kernel::binomial(1).unwrap();
    let mut plane = vec![255u8; 25];
    let mut tmp = vec![0u8; 25];
    blur_plane(&mut plane, &mut tmp, 5, 5, &k, PassOrder::VerticalFirst);
    assert_eq!(&plane[..], &[
        143, 191, 191, 191, 143,
        191, 255, 255, 255, 191,
        191, 255, 255, 255, 191,
        191, 255, 255, 255, 191,
        143, 191, 191, 191, 143,
    ]);
    // intermediate is the vertical pass alone
    assert_eq!(&tmp[..5], &[191; 5]);
    assert_eq!(&tmp[5..10], &[255; 5]);
}

#[test]
fn order_changes_truncation() {
    let k = Kernel::binomial(1).unwrap();
    let mut tmp = [0u8; 3];

    let mut plane = [3u8, 3, 0];
    blur_plane(&mut plane, &mut tmp, 3, 1, &k, PassOrder::VerticalFirst);
    assert_eq!([0, 0, 0], plane);

    let mut plane = [3u8, 3, 0];
    blur_plane(&mut plane, &mut tmp, 3, 1, &k, PassOrder::HorizontalFirst);
    assert_eq!([1, 1, 0], plane);
}

#[test]
fn single_axis_zero_padding() {
    let k = Kernel::binomial(2).unwrap();
    let src = [16u8; 7];
    let mut dst = [0u8; 7];
    convolve_axis(&src, &mut dst, 7, 1, Axis::Horizontal, &k);
    // 1 4 6 4 1 / 16
    assert_eq!([11, 15, 16, 16, 16, 15, 11], dst);

    convolve_axis(&src, &mut dst, 1, 7, Axis::Vertical, &k);
    assert_eq!([11, 15, 16, 16, 16, 15, 11], dst);
}

#[test]
fn impulse_spreads_kernel() {
    let k = Kernel::binomial(2).unwrap();
    let mut src = [0u8; 9 * 9];
    src[4 * 9 + 4] = 255;
    let mut dst = [0u8; 9 * 9];
    convolve_axis(&src, &mut dst, 9, 9, Axis::Vertical, &k);
    let column: Vec<u8> = (0..9).map(|y| dst[y * 9 + 4]).collect();
    assert_eq!(vec![0, 0, 15, 63, 95, 63, 15, 0, 0], column);
    assert!(dst.iter().enumerate().all(|(i, &v)| i % 9 == 4 || v == 0));
}

#[test]
fn no_overflow_at_safe_radius() {
    let k = Kernel::binomial(MAX_SAFE_RADIUS).unwrap();
    let (w, h) = (30, 27);
    let mut plane = vec![255u8; w * h];
    let mut tmp = vec![0u8; w * h];
    blur_plane(&mut plane, &mut tmp, w, h, &k, PassOrder::VerticalFirst);
    let r = MAX_SAFE_RADIUS as usize;
    for y in r..h - r {
        for x in r..w - r {
            assert_eq!(255, plane[y * w + x], "{x},{y}");
        }
    }
    assert!(plane[0] < 255);
}

use crate::error::Error;
use arrayvec::ArrayVec;

/// Number of taps of the largest kernel, see [`Kernel::MAX_RADIUS`]
const MAX_TAPS: usize = 2 * Kernel::MAX_RADIUS as usize + 1;

/// One row of Pascal's triangle, used as 1-D convolution weights.
///
/// For radius `r` this is row `2r`: `2r+1` weights `C(2r, i)` that add up to exactly `2^(2r)`,
/// so normalization is a single integer division.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Kernel {
    weights: ArrayVec<u32, MAX_TAPS>,
    sum: u32,
    radius: u8,
}

impl Kernel {
    /// Largest radius whose weight sum still fits the `u32` sum
    pub const MAX_RADIUS: u8 = 15;

    /// Binomial weights for a kernel reaching `radius` pixels out from the center.
    ///
    /// Fails only if the sum doesn't fit in `u32` (radius above [`Kernel::MAX_RADIUS`]).
    /// Whether the kernel is safe to convolve with is the caller's concern.
    pub fn binomial(radius: u8) -> Result<Self, Error> {
        if radius > Self::MAX_RADIUS {
            return Err(Error::ValueOutOfRange);
        }
        let n = 2 * u32::from(radius);

        let mut weights = ArrayVec::new();
        for i in 0..=n {
            let c = binomial_coefficient(n, i).ok_or(Error::ValueOutOfRange)?;
            weights.push(u32::try_from(c).map_err(|_| Error::ValueOutOfRange)?);
        }

        let mut sum = 1u32;
        for _ in 0..n {
            sum = sum.checked_mul(2).ok_or(Error::ValueOutOfRange)?;
        }

        Ok(Self { weights, sum, radius })
    }

    /// Distance from the center tap to the edge tap
    #[inline(always)]
    #[must_use]
    pub fn radius(&self) -> u8 {
        self.radius
    }

    /// `C(2r, 0)`, `C(2r, 1)` … `C(2r, 2r)`
    #[inline(always)]
    #[must_use]
    pub fn weights(&self) -> &[u32] {
        &self.weights
    }

    /// Sum of all weights, always `2^(2*radius)`
    #[inline(always)]
    #[must_use]
    pub fn sum(&self) -> u32 {
        self.sum
    }

    /// Number of taps (`2*radius + 1`)
    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Never true, there's always the center tap
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// `C(n, k)` computed incrementally, which keeps intermediates much smaller than factorials would.
///
/// Returns `None` if the result doesn't fit in `u64` (e.g. `C(100, 50)`).
#[must_use]
pub fn binomial_coefficient(n: u32, k: u32) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut result = 1u64;
    for i in 0..k {
        // result * (n-i) is always divisible by (i+1). Partial results only grow up to n/2
        let next = u128::from(result) * u128::from(n - i) / u128::from(i + 1);
        result = u64::try_from(next).ok()?;
    }
    Some(result)
}

#[test]
fn known_rows() {
    assert_eq!(&[1], Kernel::binomial(0).unwrap().weights());
    assert_eq!(&[1, 2, 1], Kernel::binomial(1).unwrap().weights());
    assert_eq!(&[1, 4, 6, 4, 1], Kernel::binomial(2).unwrap().weights());
    assert_eq!(&[1, 6, 15, 20, 15, 6, 1], Kernel::binomial(3).unwrap().weights());
    assert_eq!(4, Kernel::binomial(1).unwrap().sum());
    assert_eq!(1, Kernel::binomial(0).unwrap().sum());
}

#[test]
fn palindromic_and_normalized() {
    for radius in 0..=8u8 {
        let k = Kernel::binomial(radius).unwrap();
        assert_eq!(2 * radius as usize + 1, k.len());
        assert_eq!(radius, k.radius());
        let w = k.weights();
        assert!(w.iter().eq(w.iter().rev()), "r={radius} {w:?}");
        assert_eq!(1u32 << (2 * radius), k.sum());
        assert_eq!(k.sum(), w.iter().sum::<u32>());
    }
}

#[test]
fn self_convolution_doubles_radius() {
    for radius in 1..=7u8 {
        let k = Kernel::binomial(radius).unwrap();
        let w = k.weights();
        let mut conv = vec![0u32; 2 * w.len() - 1];
        for (i, a) in w.iter().enumerate() {
            for (j, b) in w.iter().enumerate() {
                conv[i + j] += a * b;
            }
        }
        assert_eq!(Kernel::binomial(2 * radius).unwrap().weights(), &conv[..]);
    }
}

#[test]
fn largest() {
    let k = Kernel::binomial(Kernel::MAX_RADIUS).unwrap();
    assert_eq!(1 << 30, k.sum());
    assert_eq!(155_117_520, k.weights()[15]);
    assert_eq!(Err(Error::ValueOutOfRange), Kernel::binomial(Kernel::MAX_RADIUS + 1));
}

#[test]
fn coefficients() {
    assert_eq!(Some(1), binomial_coefficient(0, 0));
    assert_eq!(Some(252), binomial_coefficient(10, 5));
    assert_eq!(binomial_coefficient(40, 13), binomial_coefficient(40, 27));
    assert_eq!(Some(0), binomial_coefficient(3, 4));
}

#[test]
fn coefficients_near_u64_limit() {
    assert_eq!(Some(1_832_624_140_942_590_534), binomial_coefficient(64, 32));
    assert_eq!(Some(64), binomial_coefficient(64, 63));
    assert_eq!(Some(1), binomial_coefficient(u32::MAX, u32::MAX));
    assert_eq!(None, binomial_coefficient(68, 34));
    assert_eq!(None, binomial_coefficient(100, 50));
}

//! 6-bit fixed point used by the stretched wallpaper layout
//!
//! Horizontal stretching needs `x * image_width / canvas_width` for every
//! pixel. Computing the ratio once per scanline as a fixed-point step and
//! accumulating it keeps the inner loop to one add and one shift.

use std::ops::{Add, AddAssign, Mul};

/// Number of fractional bits
pub const FRACTION_BITS: u32 = 6;

/// `1.0` in fixed point
pub const ONE: usize = 1 << FRACTION_BITS;

/// A non-negative value whose low 6 bits are the fraction (1/64 steps)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct FixedP6(usize);

impl FixedP6 {
    pub const ZERO: FixedP6 = FixedP6(0);

    /// Convert a whole number to fixed point
    #[inline]
    pub const fn from_int(value: usize) -> Self {
        Self(value * ONE)
    }

    /// Truncate to the integer part
    #[inline]
    pub const fn to_int(self) -> usize {
        self.0 / ONE
    }

    #[inline]
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> usize {
        self.0
    }

    /// `numerator / denominator` as a fixed-point ratio, truncated.
    ///
    /// `denominator` must be non-zero.
    #[inline]
    pub const fn ratio(numerator: usize, denominator: usize) -> Self {
        Self(Self::from_int(numerator).0 / denominator)
    }
}

impl Add for FixedP6 {
    type Output = FixedP6;

    #[inline]
    fn add(self, rhs: FixedP6) -> FixedP6 {
        FixedP6(self.0 + rhs.0)
    }
}

impl AddAssign for FixedP6 {
    #[inline]
    fn add_assign(&mut self, rhs: FixedP6) {
        self.0 += rhs.0;
    }
}

/// Scaling a step by a whole count of steps
impl Mul<usize> for FixedP6 {
    type Output = FixedP6;

    #[inline]
    fn mul(self, rhs: usize) -> FixedP6 {
        FixedP6(self.0 * rhs)
    }
}

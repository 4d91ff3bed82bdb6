//! Margin vignette geometry
//!
//! The console text area sits inside a margin. Just inside the margin's outer
//! cut there is a band of `gradient` pixels where the theme background fades
//! from its own alpha towards fully transparent, so the wallpaper bleeds into
//! the console edge instead of stopping at a hard line.

use crate::color::{blend, Color};

/// Geometry of the margin around the console text area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarginBox {
    pub width: usize,
    pub height: usize,
    pub margin: usize,
    pub gradient: usize,
}

impl MarginBox {
    pub fn new(width: usize, height: usize, margin: usize, gradient: usize) -> Self {
        Self {
            width,
            height,
            margin,
            gradient,
        }
    }

    /// First column past the inner rectangle
    #[inline]
    pub fn stop_x(&self) -> usize {
        self.width.saturating_sub(self.margin)
    }

    /// First row past the inner rectangle
    #[inline]
    pub fn stop_y(&self) -> usize {
        self.height.saturating_sub(self.margin)
    }

    /// Distance of `(x, y)` from the inner rectangle.
    ///
    /// Along an edge this is the perpendicular distance; in a corner it is the
    /// Euclidean distance to the rectangle's corner. Pixels inside the inner
    /// rectangle are at distance 0.
    pub fn distance(&self, x: usize, y: usize) -> usize {
        let (stop_x, stop_y) = (self.stop_x(), self.stop_y());
        let x_inside = x >= self.margin && x < stop_x;
        let y_inside = y >= self.margin && y < stop_y;

        let x_distance = || {
            if x < self.margin {
                self.margin - x
            } else {
                x - stop_x
            }
        };
        let y_distance = || {
            if y < self.margin {
                self.margin - y
            } else {
                y - stop_y
            }
        };

        match (x_inside, y_inside) {
            (true, true) => 0,
            (true, false) => y_distance(),
            (false, true) => x_distance(),
            (false, false) => {
                let dx = x_distance() as u64;
                let dy = y_distance() as u64;
                isqrt(dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))) as usize
            },
        }
    }

    /// Blend `base` over `bottom` with the alpha the gradient assigns to `(x, y)`.
    ///
    /// Returns `bottom` untouched beyond the band. `self.gradient` must be
    /// non-zero; callers skip the band entirely when it is.
    #[inline]
    pub fn shade(&self, x: usize, y: usize, bottom: Color, base: Color) -> Color {
        debug_assert!(self.gradient != 0, "gradient band with zero width");

        let distance = self.distance(x, y);
        if distance > self.gradient {
            return bottom;
        }

        blend(base.with_alpha(band_alpha(base.a(), self.gradient, distance)), bottom)
    }
}

/// Alpha for a pixel `distance` steps into a band of width `gradient`.
///
/// Rises linearly from `base_alpha` towards 255 (fully transparent) in
/// `(255 - base_alpha) / gradient` steps.
#[inline]
pub fn band_alpha(base_alpha: u8, gradient: usize, distance: usize) -> u8 {
    let step = (255 - base_alpha as usize) / gradient;
    (base_alpha as usize + step * distance) as u8
}

/// Shade one pixel of a `canvas_w` x `canvas_h` canvas.
///
/// Free-function form of [`MarginBox::shade`].
pub fn gradient_alpha(
    x: usize,
    y: usize,
    canvas_w: usize,
    canvas_h: usize,
    margin: usize,
    margin_gradient: usize,
    base_color: Color,
    bottom: Color,
) -> Color {
    MarginBox::new(canvas_w, canvas_h, margin, margin_gradient).shade(x, y, bottom, base_color)
}

/// Integer square root, rounded down
pub fn isqrt(value: u64) -> u64 {
    if value < 2 {
        return value;
    }

    // Newton iteration from an estimate that is never below the root
    let mut x = 1u64 << ((64 - value.leading_zeros()).div_ceil(2));
    loop {
        let next = (x + value / x) / 2;
        if next >= x {
            return x;
        }
        x = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_box() -> MarginBox {
        MarginBox::new(800, 600, 64, 4)
    }

    #[test]
    fn test_isqrt_exact_and_floor() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(1), 1);
        assert_eq!(isqrt(15), 3);
        assert_eq!(isqrt(16), 4);
        assert_eq!(isqrt(u64::MAX), u32::MAX as u64);
    }

    #[test]
    fn test_edge_distances() {
        let b = sample_box();
        // Left band
        assert_eq!(b.distance(63, 300), 1);
        assert_eq!(b.distance(60, 300), 4);
        // Right band starts at width - margin
        assert_eq!(b.distance(736, 300), 0);
        assert_eq!(b.distance(739, 300), 3);
        // Top band
        assert_eq!(b.distance(400, 62), 2);
        // Bottom band
        assert_eq!(b.distance(400, 538), 2);
    }

    #[test]
    fn test_corner_distance_is_euclidean() {
        let b = sample_box();
        // 3 left and 4 above the inner rectangle's top-left corner
        assert_eq!(b.distance(61, 60), 5);
    }

    #[test]
    fn test_outside_band_returns_bottom() {
        let b = sample_box();
        let bottom = Color(0x12_34_56_78);
        assert_eq!(b.shade(50, 300, bottom, Color(0x80_00_00_00)), bottom);
    }

    #[test]
    fn test_band_alpha_steps() {
        assert_eq!(band_alpha(0x80, 4, 0), 0x80);
        // (255 - 128) / 4 = 31
        assert_eq!(band_alpha(0x80, 4, 1), 0x80 + 31);
        assert_eq!(band_alpha(0x80, 4, 4), 0x80 + 124);
    }

    #[test]
    fn test_free_function_matches_method() {
        let b = sample_box();
        let base = Color(0x40_20_20_20);
        let bottom = Color(0x00_ff_00_ff);
        assert_eq!(
            gradient_alpha(62, 200, 800, 600, 64, 4, base, bottom),
            b.shade(62, 200, bottom, base)
        );
    }

    #[test]
    fn test_huge_margin_distance_saturates() {
        let margin_box = MarginBox::new(100, 100, usize::MAX / 2, 4);
        assert_eq!(margin_box.distance(0, 0), isqrt(u64::MAX) as usize);
        assert_eq!(margin_box.shade(0, 0, Color(0x0012_3456), Color::BLACK), Color(0x0012_3456));
    }

    proptest! {
        #[test]
        fn band_alpha_never_decreases(base in any::<u8>(), gradient in 1usize..64) {
            let mut last = band_alpha(base, gradient, 0);
            for d in 1..=gradient {
                let a = band_alpha(base, gradient, d);
                prop_assert!(a >= last);
                last = a;
            }
        }

        #[test]
        fn isqrt_is_floor_root(v in any::<u32>()) {
            let v = v as u64;
            let r = isqrt(v);
            prop_assert!(r * r <= v);
            prop_assert!((r + 1) * (r + 1) > v);
        }
    }
}

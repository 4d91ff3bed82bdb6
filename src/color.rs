//! ARGB colors and the integer blend used for every composited pixel
//!
//! Colors are packed `0xAARRGGBB`. The alpha byte follows the boot console
//! convention: it is a *transparency* value for the top layer. Alpha 0 means
//! the top color covers the bottom, alpha 255 lets the bottom show through.

use serde::{Deserialize, Serialize};

/// A packed 32-bit ARGB color (alpha high byte, blue low byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0x0000_0000);

    #[inline]
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    #[inline]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb(0, r, g, b)
    }

    #[inline]
    pub const fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    /// Same color with the alpha byte replaced
    #[inline]
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self((self.0 & 0x00ff_ffff) | ((alpha as u32) << 24))
    }

    /// Same color with the alpha byte cleared (how the framebuffer sees it)
    #[inline]
    pub const fn opaque(self) -> Self {
        Self(self.0 & 0x00ff_ffff)
    }

    #[inline]
    pub const fn to_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for Color {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Color> for u32 {
    fn from(value: Color) -> Self {
        value.0
    }
}

impl std::fmt::LowerHex for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Composite `top` over `bottom`.
///
/// Each channel is `((255 - a) * top + (a + 1) * bottom) / 256` where `a` is
/// the top alpha. The divisor is 256 rather than 255 so the blend is a shift;
/// the result is off by at most one step per channel. The output alpha is
/// always 0 since composited pixels are drawn opaque.
#[inline]
pub fn blend(top: Color, bottom: Color) -> Color {
    let weight_top = 255 - top.a() as u32;
    let weight_bottom = top.a() as u32 + 1;

    let mix = |t: u8, b: u8| ((weight_top * t as u32 + weight_bottom * b as u32) / 256) as u8;

    Color::from_argb(
        0,
        mix(top.r(), bottom.r()),
        mix(top.g(), bottom.g()),
        mix(top.b(), bottom.b()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_channel_accessors() {
        let c = Color(0x80_aa_55_11);
        assert_eq!(c.a(), 0x80);
        assert_eq!(c.r(), 0xaa);
        assert_eq!(c.g(), 0x55);
        assert_eq!(c.b(), 0x11);
        assert_eq!(Color::from_argb(0x80, 0xaa, 0x55, 0x11), c);
    }

    #[test]
    fn test_with_alpha_keeps_rgb() {
        let c = Color(0x12_34_56_78).with_alpha(0xff);
        assert_eq!(c, Color(0xff_34_56_78));
        assert_eq!(c.opaque(), Color(0x00_34_56_78));
    }

    #[test]
    fn test_blend_half_transparent_black() {
        // The themed default when a wallpaper is present
        let out = blend(Color(0x80_00_00_00), Color(0x00_ff_ff_ff));
        // (127 * 0 + 129 * 255) / 256 = 128
        assert_eq!(out, Color(0x00_80_80_80));
    }

    #[test]
    fn test_blend_output_alpha_is_zero() {
        let out = blend(Color(0x40_10_20_30), Color(0xff_ff_ff_ff));
        assert_eq!(out.a(), 0);
    }

    proptest! {
        #[test]
        fn fully_transparent_top_leaves_bottom(top in any::<u32>(), bottom in any::<u32>()) {
            let top = Color(top).with_alpha(0xff);
            let bottom = Color(bottom);
            prop_assert_eq!(blend(top, bottom), bottom.opaque());
        }

        #[test]
        fn fully_covering_top_wins_within_one_step(top in any::<u32>(), bottom in any::<u32>()) {
            let top = Color(top).with_alpha(0);
            let out = blend(top, Color(bottom));
            for (o, t) in [(out.r(), top.r()), (out.g(), top.g()), (out.b(), top.b())] {
                prop_assert!(t.abs_diff(o) <= 1, "channel {} vs {}", o, t);
            }
        }
    }
}

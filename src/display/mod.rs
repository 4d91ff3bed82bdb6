//! Framebuffer mode description and validation
//!
//! The canvas is only ever generated for 32-bit xRGB8888 framebuffers. The
//! display collaborator reports the negotiated mode as [`DisplayParams`] and
//! [`DisplayParams::require_xrgb8888`] rejects anything else.

#[cfg(feature = "window")]
mod window;

#[cfg(feature = "window")]
pub use window::PreviewWindow;

use crate::error::{Error, Result};

/// The only bit depth the console supports
pub const REQUIRED_BPP: u8 = 32;

pub const DEFAULT_WIDTH: usize = 1024;
pub const DEFAULT_HEIGHT: usize = 768;

/// Position and width of one color channel inside a pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelMask {
    pub size: u8,
    pub shift: u8,
}

impl ChannelMask {
    pub const fn new(size: u8, shift: u8) -> Self {
        Self { size, shift }
    }
}

/// A negotiated framebuffer mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayParams {
    pub width: usize,
    pub height: usize,
    /// Bytes per framebuffer row
    pub pitch: usize,
    pub bpp: u8,
    pub red: ChannelMask,
    pub green: ChannelMask,
    pub blue: ChannelMask,
    /// The mode is the firmware's default rather than an explicit request
    pub default_res: bool,
}

impl DisplayParams {
    /// An xRGB8888 mode of the given size
    pub fn xrgb8888(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pitch: width * 4,
            bpp: REQUIRED_BPP,
            red: ChannelMask::new(8, 16),
            green: ChannelMask::new(8, 8),
            blue: ChannelMask::new(8, 0),
            default_res: false,
        }
    }

    pub fn is_xrgb8888(&self) -> bool {
        self.bpp == REQUIRED_BPP
            && self.red == ChannelMask::new(8, 16)
            && self.green == ChannelMask::new(8, 8)
            && self.blue == ChannelMask::new(8, 0)
    }

    /// Reject any channel layout other than 8-bit R/G/B at 16/8/0
    pub fn require_xrgb8888(&self) -> Result<()> {
        if self.is_xrgb8888() {
            return Ok(());
        }
        Err(Error::UnsupportedPixelFormat {
            red_size: self.red.size,
            red_shift: self.red.shift,
            green_size: self.green.size,
            green_shift: self.green.shift,
            blue_size: self.blue.size,
            blue_shift: self.blue.shift,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xrgb8888_accepted() {
        let params = DisplayParams::xrgb8888(800, 600);
        assert_eq!(params.pitch, 3200);
        assert!(params.require_xrgb8888().is_ok());
    }

    #[test]
    fn test_bgr_layout_rejected() {
        let mut params = DisplayParams::xrgb8888(800, 600);
        params.red = ChannelMask::new(8, 0);
        params.blue = ChannelMask::new(8, 16);
        assert!(matches!(
            params.require_xrgb8888(),
            Err(Error::UnsupportedPixelFormat { red_shift: 0, .. })
        ));
    }

    #[test]
    fn test_rgb565_rejected() {
        let mut params = DisplayParams::xrgb8888(800, 600);
        params.red = ChannelMask::new(5, 11);
        params.green = ChannelMask::new(6, 5);
        params.blue = ChannelMask::new(5, 0);
        assert!(params.require_xrgb8888().is_err());
    }
}

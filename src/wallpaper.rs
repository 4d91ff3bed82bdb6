//! Wallpaper images and the three layout strategies
//!
//! A decoded wallpaper is an immutable bitmap stored bottom row first, the
//! way boot image loaders hand it over. The [`Layout`] decides how canvas
//! pixels map back onto image pixels:
//!
//! - `Tiled` repeats the image from the canvas origin
//! - `Centered` places it once in the middle, with a backdrop color around it
//! - `Stretched` scales it (nearest neighbor) to cover the whole canvas
//!
//! The layout is matched once per scanline in [`Image::emit_scanline`]; the
//! per-pixel loops are specialized per layout.

use crate::color::Color;
use crate::fixed::FixedP6;

/// How the wallpaper style key maps onto a layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WallpaperStyle {
    Tiled,
    Centered,
    #[default]
    Stretched,
}

impl WallpaperStyle {
    /// Only the exact strings `centered` and `tiled` select those styles;
    /// anything else, including no value, stretches.
    pub fn from_config(value: Option<&str>) -> Self {
        match value {
            Some("centered") => Self::Centered,
            Some("tiled") => Self::Tiled,
            _ => Self::Stretched,
        }
    }
}

/// Placement of a centered image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Centered {
    /// Canvas column of image column 0 (negative when the image is wider)
    pub x_displacement: isize,
    /// Canvas row of image row 0 (negative when the image is taller)
    pub y_displacement: isize,
    pub visible_width: usize,
    pub visible_height: usize,
    /// Color for canvas pixels the image does not cover
    pub backdrop: Color,
}

/// Mapping from canvas pixels to image pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Tiled,
    Centered(Centered),
    Stretched {
        target_width: usize,
        target_height: usize,
    },
}

/// What a layout yields for one canvas pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Texel {
    Image(Color),
    Backdrop(Color),
}

impl Texel {
    #[inline]
    pub fn color(self) -> Color {
        match self {
            Texel::Image(c) | Texel::Backdrop(c) => c,
        }
    }
}

/// A decoded wallpaper bitmap
#[derive(Debug, Clone)]
pub struct Image {
    pixels: Vec<u8>,
    width: usize,
    height: usize,
    pitch: usize,
    bytes_per_pixel: usize,
    layout: Layout,
}

impl Image {
    /// Wrap a decoded buffer.
    ///
    /// Rows are `pitch` bytes apart and stored bottom to top; pixels are
    /// little-endian xRGB with 3 or 4 bytes each. Returns `None` when the
    /// buffer cannot hold the described bitmap. The layout starts as tiled.
    pub fn from_raw(
        pixels: Vec<u8>,
        width: usize,
        height: usize,
        pitch: usize,
        bytes_per_pixel: usize,
    ) -> Option<Self> {
        if width == 0 || height == 0 || !(3..=4).contains(&bytes_per_pixel) {
            return None;
        }
        let row_bytes = width.checked_mul(bytes_per_pixel)?;
        if pitch < row_bytes {
            return None;
        }
        let needed = pitch.checked_mul(height - 1)?.checked_add(row_bytes)?;
        if pixels.len() < needed {
            return None;
        }

        Some(Self {
            pixels,
            width,
            height,
            pitch,
            bytes_per_pixel,
            layout: Layout::Tiled,
        })
    }

    /// Build from top-down RGBA8 rows, as general purpose decoders produce them
    pub fn from_rgba8(width: usize, height: usize, rgba: &[u8]) -> Option<Self> {
        if rgba.len() != width.checked_mul(height)?.checked_mul(4)? {
            return None;
        }

        let pitch = width * 4;
        let mut pixels = vec![0u8; pitch * height];
        for (y, src_row) in rgba.chunks_exact(pitch).enumerate() {
            let dst_start = (height - 1 - y) * pitch;
            let dst_row = &mut pixels[dst_start..dst_start + pitch];
            for (dst, src) in dst_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
                let color = Color::from_rgb(src[0], src[1], src[2]);
                dst.copy_from_slice(&color.to_u32().to_le_bytes());
            }
        }

        Self::from_raw(pixels, width, height, pitch, 4)
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
    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = match layout {
            Layout::Centered(mut c) => {
                // Never sample past the bitmap, whatever size was declared
                c.visible_width = c.visible_width.min(self.width);
                c.visible_height = c.visible_height.min(self.height);
                Layout::Centered(c)
            },
            Layout::Stretched {
                target_width,
                target_height,
            } => Layout::Stretched {
                target_width: target_width.max(1),
                target_height: target_height.max(1),
            },
            Layout::Tiled => Layout::Tiled,
        };
    }

    /// Place the image once in the middle of a `frame_w` x `frame_h` canvas
    pub fn make_centered(&mut self, frame_w: usize, frame_h: usize, backdrop: Color) {
        self.set_layout(Layout::Centered(Centered {
            x_displacement: (frame_w / 2) as isize - (self.width / 2) as isize,
            y_displacement: (frame_h / 2) as isize - (self.height / 2) as isize,
            visible_width: self.width,
            visible_height: self.height,
            backdrop,
        }));
    }

    /// Scale the image to cover a `frame_w` x `frame_h` canvas
    pub fn make_stretched(&mut self, frame_w: usize, frame_h: usize) {
        self.set_layout(Layout::Stretched {
            target_width: frame_w,
            target_height: frame_h,
        });
    }

    pub fn make_tiled(&mut self) {
        self.set_layout(Layout::Tiled);
    }

    /// Apply a configured style for a canvas of the given size
    pub fn apply_style(
        &mut self,
        style: WallpaperStyle,
        frame_w: usize,
        frame_h: usize,
        backdrop: Color,
    ) {
        match style {
            WallpaperStyle::Tiled => self.make_tiled(),
            WallpaperStyle::Centered => self.make_centered(frame_w, frame_h, backdrop),
            WallpaperStyle::Stretched => self.make_stretched(frame_w, frame_h),
        }
    }

    /// Byte offset of image row `image_y` (counted from the top)
    #[inline]
    fn row_offset(&self, image_y: usize) -> usize {
        self.pitch * (self.height - 1 - image_y)
    }

    #[inline]
    fn texel(&self, image_x: usize, row_offset: usize) -> Color {
        let at = row_offset + image_x * self.bytes_per_pixel;
        if self.bytes_per_pixel == 4 {
            let bytes = [
                self.pixels[at],
                self.pixels[at + 1],
                self.pixels[at + 2],
                self.pixels[at + 3],
            ];
            Color(u32::from_le_bytes(bytes))
        } else {
            Color::from_rgb(self.pixels[at + 2], self.pixels[at + 1], self.pixels[at])
        }
    }

    /// Image pixel at `(image_x, image_y)`, counted from the top-left
    pub fn pixel(&self, image_x: usize, image_y: usize) -> Option<Color> {
        if image_x >= self.width || image_y >= self.height {
            return None;
        }
        Some(self.texel(image_x, self.row_offset(image_y)))
    }

    /// Source for a single canvas pixel.
    ///
    /// Reference form of [`Image::emit_scanline`]; canvas generation uses the
    /// scanline path.
    pub fn source_pixel(&self, x: usize, y: usize) -> Texel {
        match self.layout {
            Layout::Tiled => Texel::Image(
                self.texel(x % self.width, self.row_offset(y % self.height)),
            ),
            Layout::Centered(c) => {
                let image_x = x as isize - c.x_displacement;
                let image_y = y as isize - c.y_displacement;
                if image_x < 0
                    || image_y < 0
                    || image_x as usize >= c.visible_width
                    || image_y as usize >= c.visible_height
                {
                    Texel::Backdrop(c.backdrop)
                } else {
                    Texel::Image(self.texel(image_x as usize, self.row_offset(image_y as usize)))
                }
            },
            Layout::Stretched {
                target_width,
                target_height,
            } => {
                let image_y = self.stretched_row(y, target_height);
                let step = FixedP6::ratio(self.width, target_width);
                let image_x = (step * x).to_int().min(self.width - 1);
                Texel::Image(self.texel(image_x, self.row_offset(image_y)))
            },
        }
    }

    #[inline]
    fn stretched_row(&self, y: usize, target_height: usize) -> usize {
        (y * self.height / target_height).min(self.height - 1)
    }

    /// Write the source colors for canvas row `y`, columns
    /// `x_start..x_start + out.len()`, into `out`.
    pub fn emit_scanline(&self, y: usize, x_start: usize, out: &mut [Color]) {
        match self.layout {
            Layout::Tiled => self.scan_tiled(y, x_start, out),
            Layout::Centered(c) => self.scan_centered(&c, y, x_start, out),
            Layout::Stretched {
                target_width,
                target_height,
            } => self.scan_stretched(target_width, target_height, y, x_start, out),
        }
    }

    fn scan_tiled(&self, y: usize, x_start: usize, out: &mut [Color]) {
        let offset = self.row_offset(y % self.height);
        let mut image_x = x_start % self.width;
        for px in out.iter_mut() {
            *px = self.texel(image_x, offset);
            // Running index instead of a modulo per pixel
            image_x += 1;
            if image_x == self.width {
                image_x = 0;
            }
        }
    }

    fn scan_centered(&self, c: &Centered, y: usize, x_start: usize, out: &mut [Color]) {
        let image_y = y as isize - c.y_displacement;
        if image_y < 0 || image_y as usize >= c.visible_height {
            out.fill(c.backdrop);
            return;
        }

        let offset = self.row_offset(image_y as usize);
        let mut image_x = x_start as isize - c.x_displacement;
        for px in out.iter_mut() {
            *px = if image_x >= 0 && (image_x as usize) < c.visible_width {
                self.texel(image_x as usize, offset)
            } else {
                c.backdrop
            };
            image_x += 1;
        }
    }

    fn scan_stretched(
        &self,
        target_width: usize,
        target_height: usize,
        y: usize,
        x_start: usize,
        out: &mut [Color],
    ) {
        // Full precision for the row, once per scanline
        let offset = self.row_offset(self.stretched_row(y, target_height));

        let step = FixedP6::ratio(self.width, target_width);
        let last = self.width - 1;
        let mut image_x = step * x_start;
        for px in out.iter_mut() {
            *px = self.texel(image_x.to_int().min(last), offset);
            image_x += step;
        }
    }
}

// ============================================================================
// Procedural Wallpapers
// ============================================================================

impl Image {
    /// Generate a checkerboard of `tile` pixel squares, `c1` at the top-left
    pub fn checkerboard(size: usize, tile: usize, c1: Color, c2: Color) -> Self {
        let tile = tile.max(1);
        let size = size.max(1);
        let mut rgba = Vec::with_capacity(size * size * 4);
        for y in 0..size {
            for x in 0..size {
                let c = if ((x / tile) + (y / tile)) % 2 == 0 { c1 } else { c2 };
                rgba.extend_from_slice(&[c.r(), c.g(), c.b(), 255]);
            }
        }
        // Dimensions and buffer length agree by construction
        match Self::from_rgba8(size, size, &rgba) {
            Some(image) => image,
            None => unreachable!("checkerboard buffer matches its dimensions"),
        }
    }
}

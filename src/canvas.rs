//! The background canvas and its generation
//!
//! The canvas is split into up to nine rectangles by four cut lines per axis:
//!
//! ```text
//!  0   outer   band    inner_end  band_end  extent
//!  |-----|------|-----------|---------|-------|
//!   outer  band    inner       band    outer
//! ```
//!
//! Outer margin strips show the wallpaper unmodified, the gradient band fades
//! the theme background in over it, and the inner rectangle tints the
//! wallpaper with the theme background. Each region picks its blend once; the
//! pixel loop is monomorphized per blend so there is no indirect call per
//! pixel.

use crate::color::{blend, Color};
use crate::gradient::MarginBox;
use crate::wallpaper::Image;
use tracing::debug;

// ============================================================================
// Canvas
// ============================================================================

/// A full-screen background pixel buffer, row-major, top row first
#[derive(Clone, PartialEq, Eq)]
pub struct Canvas {
    pixels: Vec<Color>,
    width: usize,
    height: usize,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Canvas {
    /// Create a canvas with every pixel set to `color`
    pub fn filled(width: usize, height: usize, color: Color) -> Self {
        Self {
            pixels: vec![color; width * height],
            width,
            height,
        }
    }

    /// Create a zeroed canvas
    pub fn with_size(width: usize, height: usize) -> Self {
        Self::filled(width, height, Color::BLACK)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Read a pixel (bounds checked)
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// One full row of pixels
    pub fn row(&self, y: usize) -> &[Color] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Mutable slice of row `y`, columns `x0..x1`
    #[inline]
    fn span_mut(&mut self, y: usize, x0: usize, x1: usize) -> &mut [Color] {
        let start = y * self.width;
        &mut self.pixels[start + x0..start + x1]
    }

    /// Pixels as xRGB8888 little-endian bytes, the framebuffer's layout
    pub fn to_xrgb_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|c| c.opaque().to_u32().to_le_bytes())
            .collect()
    }

    /// Pixels as opaque RGBA8 bytes, for image encoders
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|c| [c.r(), c.g(), c.b(), 255])
            .collect()
    }
}

// ============================================================================
// Region Partition
// ============================================================================

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x0: usize,
    pub x1: usize,
    pub y0: usize,
    pub y1: usize,
}

impl Rect {
    pub const fn new(x0: usize, x1: usize, y0: usize, y1: usize) -> Self {
        Self { x0, x1, y0, y1 }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    #[inline]
    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.x1 - self.x0) * (self.y1 - self.y0)
        }
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }
}

/// Which blend a region uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// Wallpaper passes through unmodified
    Outer,
    /// Theme background faded over the wallpaper
    Gradient,
    /// Theme background blended over the wallpaper
    Inner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub kind: RegionKind,
    pub rect: Rect,
}

/// The four cut lines along one axis, always ordered
/// `outer <= band <= inner_end <= band_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cuts {
    pub outer: usize,
    pub band: usize,
    pub inner_end: usize,
    pub band_end: usize,
    pub extent: usize,
}

impl Cuts {
    pub fn new(extent: usize, margin: usize, gradient: usize) -> Self {
        // Margins wider than half the extent leave an empty inner span
        let band = margin.min(extent / 2);
        let outer = margin.saturating_sub(gradient).min(band);
        Self {
            outer,
            band,
            inner_end: extent - band,
            band_end: extent - outer,
            extent,
        }
    }
}

/// Split a `width` x `height` canvas into disjoint regions covering it once.
///
/// Empty rectangles are dropped; the gradient band is skipped entirely when
/// `gradient` is 0.
pub fn partition(width: usize, height: usize, margin: usize, gradient: usize) -> Vec<Region> {
    let h = Cuts::new(width, margin, gradient);
    let v = Cuts::new(height, margin, gradient);

    let mut regions = Vec::with_capacity(9);
    let mut push = |kind, rect: Rect| {
        if !rect.is_empty() {
            regions.push(Region { kind, rect });
        }
    };

    // Outer strips: top and bottom full width, left and right between them
    push(RegionKind::Outer, Rect::new(0, width, 0, v.outer));
    push(RegionKind::Outer, Rect::new(0, width, v.band_end, height));
    push(RegionKind::Outer, Rect::new(0, h.outer, v.outer, v.band_end));
    push(RegionKind::Outer, Rect::new(h.band_end, width, v.outer, v.band_end));

    if gradient != 0 {
        push(RegionKind::Gradient, Rect::new(h.outer, h.band_end, v.outer, v.band));
        push(RegionKind::Gradient, Rect::new(h.outer, h.band_end, v.inner_end, v.band_end));
        push(RegionKind::Gradient, Rect::new(h.outer, h.band, v.band, v.inner_end));
        push(RegionKind::Gradient, Rect::new(h.inner_end, h.band_end, v.band, v.inner_end));
    }

    push(RegionKind::Inner, Rect::new(h.band, h.inner_end, v.band, v.inner_end));

    regions
}

// ============================================================================
// Region Blends
// ============================================================================

/// Per-pixel blend applied after the wallpaper source has been sampled
trait RegionBlend {
    fn apply(&self, x: usize, y: usize, source: Color) -> Color;
}

struct PassThrough;

impl RegionBlend for PassThrough {
    #[inline(always)]
    fn apply(&self, _x: usize, _y: usize, source: Color) -> Color {
        source
    }
}

struct Vignette {
    margin_box: MarginBox,
    base: Color,
}

impl RegionBlend for Vignette {
    #[inline(always)]
    fn apply(&self, x: usize, y: usize, source: Color) -> Color {
        self.margin_box.shade(x, y, source, self.base)
    }
}

struct Tint {
    top: Color,
}

impl RegionBlend for Tint {
    #[inline(always)]
    fn apply(&self, _x: usize, _y: usize, source: Color) -> Color {
        blend(self.top, source)
    }
}

fn fill_region<B: RegionBlend>(canvas: &mut Canvas, image: &Image, rect: Rect, region_blend: &B) {
    for y in rect.y0..rect.y1 {
        let span = canvas.span_mut(y, rect.x0, rect.x1);
        image.emit_scanline(y, rect.x0, span);
        for (x, px) in (rect.x0..rect.x1).zip(span.iter_mut()) {
            *px = region_blend.apply(x, y, *px);
        }
    }
}

// ============================================================================
// Canvas Builder
// ============================================================================

/// Inputs for one canvas generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSpec {
    pub width: usize,
    pub height: usize,
    pub margin: usize,
    pub margin_gradient: usize,
    /// Theme background; its alpha is the tint's transparency
    pub background: Color,
}

/// Composite `image` into a fresh canvas.
///
/// Returns `None` without a wallpaper; the console then fills with the theme
/// background instead of keeping a canvas.
pub fn build_canvas(image: Option<&Image>, spec: &CanvasSpec) -> Option<Canvas> {
    let image = image?;
    let _span = tracing::debug_span!(
        "build_canvas",
        width = spec.width,
        height = spec.height,
        margin = spec.margin,
        gradient = spec.margin_gradient
    )
    .entered();

    let mut canvas = Canvas::with_size(spec.width, spec.height);
    let vignette = Vignette {
        margin_box: MarginBox::new(spec.width, spec.height, spec.margin, spec.margin_gradient),
        base: spec.background,
    };
    let tint = Tint {
        top: spec.background,
    };

    for region in partition(spec.width, spec.height, spec.margin, spec.margin_gradient) {
        debug!(kind = ?region.kind, rect = ?region.rect, "filling region");
        match region.kind {
            RegionKind::Outer => fill_region(&mut canvas, image, region.rect, &PassThrough),
            RegionKind::Gradient => fill_region(&mut canvas, image, region.rect, &vignette),
            RegionKind::Inner => fill_region(&mut canvas, image, region.rect, &tint),
        }
    }

    Some(canvas)
}

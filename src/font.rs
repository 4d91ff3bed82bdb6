//! Console font selection
//!
//! Glyph data lives in a fixed [`FONT_MAX`] byte buffer seeded with the
//! built-in font. A config can point at a replacement font file and give its
//! cell size; requests that would not fit the buffer are refused and the
//! built-in font stays.

use crate::config::{
    parse_dec, parse_resolution, ConfigSource, TERM_FONT, TERM_FONT_SCALE, TERM_FONT_SIZE,
    TERM_FONT_SPACING,
};
use crate::error::Degradation;
use crate::platform::{FileHandle, Platform};
use tracing::{debug, warn};

/// Size of the glyph buffer
pub const FONT_MAX: usize = 16384;
/// Glyphs in a console font
pub const FONT_GLYPHS: usize = 256;

pub const DEFAULT_FONT_WIDTH: usize = 8;
pub const DEFAULT_FONT_HEIGHT: usize = 16;
pub const DEFAULT_FONT_SPACING: usize = 1;
/// Largest accepted scale factor on either axis
pub const MAX_FONT_SCALE: usize = 8;

/// Bytes needed for a 1 bit per pixel font of `width` x `height` cells.
///
/// Saturates, so absurd cell sizes compare as larger than any buffer.
pub const fn font_bytes(width: usize, height: usize) -> usize {
    width.saturating_mul(height).saturating_mul(FONT_GLYPHS) / 8
}

#[derive(Clone, PartialEq, Eq)]
pub struct FontSettings {
    /// Always `FONT_MAX` bytes; only the first `font_bytes(width, height)` matter
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub spacing: usize,
    pub scale_x: usize,
    pub scale_y: usize,
}

impl std::fmt::Debug for FontSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSettings")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("spacing", &self.spacing)
            .field("scale", &(self.scale_x, self.scale_y))
            .finish_non_exhaustive()
    }
}

impl FontSettings {
    /// The built-in 8x16 font at scale 1
    pub fn builtin(builtin: &[u8]) -> Self {
        let mut data = vec![0u8; FONT_MAX];
        let n = builtin.len().min(FONT_MAX);
        data[..n].copy_from_slice(&builtin[..n]);
        Self {
            data,
            width: DEFAULT_FONT_WIDTH,
            height: DEFAULT_FONT_HEIGHT,
            spacing: DEFAULT_FONT_SPACING,
            scale_x: 1,
            scale_y: 1,
        }
    }

    /// Resolve font settings from config, loading a replacement font if one
    /// is configured. Recoverable problems are pushed onto `degradations`.
    pub fn load<P: Platform>(
        config: &dyn ConfigSource,
        builtin: &[u8],
        platform: &mut P,
        degradations: &mut Vec<Degradation>,
    ) -> Self {
        let mut font = Self::builtin(builtin);
        font.load_replacement(config, platform, degradations);

        if let Some(value) = config.get(TERM_FONT_SPACING) {
            font.spacing = parse_dec(value);
        }

        if let Some((sx, sy)) = config.get(TERM_FONT_SCALE).and_then(parse_resolution) {
            if sx > MAX_FONT_SCALE || sy > MAX_FONT_SCALE {
                debug!(sx, sy, "font scale out of range, using 1x1");
            } else {
                font.scale_x = sx;
                font.scale_y = sy;
            }
        }

        font
    }

    fn load_replacement<P: Platform>(
        &mut self,
        config: &dyn ConfigSource,
        platform: &mut P,
        degradations: &mut Vec<Degradation>,
    ) {
        let mut size = font_bytes(self.width, self.height);
        let mut cell = None;

        if let Some(value) = config.get(TERM_FONT_SIZE) {
            match parse_resolution(value) {
                Some((w, h)) => {
                    let requested = font_bytes(w, h);
                    if requested > FONT_MAX {
                        let degradation = Degradation::FontTooLarge {
                            requested,
                            allowed: FONT_MAX,
                        };
                        warn!("{}", degradation);
                        degradations.push(degradation);
                        return;
                    }
                    size = requested;
                    cell = Some((w, h));
                },
                None => debug!(value, "ignoring malformed TERM_FONT_SIZE"),
            }
        }

        let Some(uri) = config.get(TERM_FONT) else {
            return;
        };
        let Some(mut file) = platform.open_uri(uri) else {
            let degradation = Degradation::FontLoadFailed {
                uri: uri.to_string(),
            };
            warn!("{}", degradation);
            degradations.push(degradation);
            return;
        };

        let read = file.read_at(&mut self.data[..size], 0);
        debug!(uri, read, size, "loaded font");
        if let Some((w, h)) = cell {
            self.width = w;
            self.height = h;
        }
    }

    /// Glyph bytes for the current cell size
    pub fn glyphs(&self) -> &[u8] {
        &self.data[..font_bytes(self.width, self.height).min(FONT_MAX)]
    }
}

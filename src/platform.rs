//! Collaborators the console pipeline consumes
//!
//! The pipeline never touches files, decoders or the display hardware
//! directly. It goes through [`Platform`] for those and hands its results to
//! a [`TextConsole`]. Two platforms are provided: [`HostPlatform`] backed by
//! the local filesystem and the `image` crate, and [`MemoryPlatform`] for
//! embedding and tests.

use crate::canvas::Canvas;
use crate::display::{DisplayParams, DEFAULT_HEIGHT, DEFAULT_WIDTH, REQUIRED_BPP};
use crate::font::FontSettings;
use crate::theme::Theme;
use crate::wallpaper::Image;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;

// ============================================================================
// Traits
// ============================================================================

/// An open file
pub trait FileHandle {
    fn size(&self) -> usize;

    /// Read up to `buf.len()` bytes at `offset`, returning how many were read
    fn read_at(&mut self, buf: &mut [u8], offset: usize) -> usize;

    /// Whole file contents
    fn read_all(&mut self) -> Vec<u8> {
        let mut buf = vec![0; self.size()];
        let n = self.read_at(&mut buf, 0);
        buf.truncate(n);
        buf
    }
}

/// Files, decoding and display mode negotiation.
///
/// Files are closed when their handle is dropped.
pub trait Platform {
    type File: FileHandle;

    fn open_uri(&mut self, uri: &str) -> Option<Self::File>;

    fn decode_image(&mut self, file: &mut Self::File) -> Option<Image>;

    /// Set a mode; `0x0` asks for the firmware default
    fn negotiate_display(&mut self, width: usize, height: usize, bpp: u8)
        -> Option<DisplayParams>;

    /// Whether a graphical mode is currently set
    fn video_mode_active(&self) -> bool;
}

/// Everything the glyph renderer needs after a rebuild
#[derive(Debug, Clone, Copy)]
pub struct ConsoleHandoff<'a> {
    /// `None` when there is no wallpaper; fill with `theme.background`
    pub canvas: Option<&'a Canvas>,
    pub display: &'a DisplayParams,
    pub theme: &'a Theme,
    pub font: &'a FontSettings,
    /// Text is inset by this many pixels on every side
    pub margin: usize,
    /// Upper bound on columns and rows, set while mirroring to serial
    pub grid_limit: Option<(usize, usize)>,
}

impl ConsoleHandoff<'_> {
    /// Columns and rows of text that fit inside the margins
    pub fn grid_size(&self) -> (usize, usize) {
        let font = self.font;
        let cell_w = font.width.saturating_add(font.spacing).saturating_mul(font.scale_x).max(1);
        let cell_h = font.height.saturating_mul(font.scale_y).max(1);
        let inset = self.margin.saturating_mul(2);
        let mut cols = self.display.width.saturating_sub(inset) / cell_w;
        let mut rows = self.display.height.saturating_sub(inset) / cell_h;
        if let Some((max_cols, max_rows)) = self.grid_limit {
            cols = cols.min(max_cols);
            rows = rows.min(max_rows);
        }
        (cols, rows)
    }
}

/// The character-grid renderer that draws over the canvas
pub trait TextConsole {
    fn reinit(&mut self, handoff: &ConsoleHandoff<'_>);

    /// Clear the text, keeping the current background
    fn clear(&mut self);

    fn deinit(&mut self);
}

// ============================================================================
// Host Platform
// ============================================================================

/// Strip a boot URI down to a path: `boot():/a/b`, `tftp://a/b` or `/a/b`
pub fn uri_path(uri: &str) -> &str {
    let rest = if let Some((_, rest)) = uri.split_once("://") {
        rest
    } else if let Some((_, rest)) = uri.split_once("):") {
        rest
    } else {
        uri
    };
    rest.trim_start_matches('/')
}

pub struct HostFile {
    file: File,
    size: usize,
}

impl FileHandle for HostFile {
    fn size(&self) -> usize {
        self.size
    }

    fn read_at(&mut self, buf: &mut [u8], offset: usize) -> usize {
        if self.file.seek(SeekFrom::Start(offset as u64)).is_err() {
            return 0;
        }
        let mut filled = 0;
        while filled < buf.len() {
            match self.file.read(&mut buf[filled..]) {
                Ok(0) | Err(_) => break,
                Ok(n) => filled += n,
            }
        }
        filled
    }
}

/// Files under a root directory, `image` crate decoding, and an in-memory
/// xRGB8888 framebuffer
pub struct HostPlatform {
    root: PathBuf,
    default_size: (usize, usize),
    active: Option<DisplayParams>,
}

impl HostPlatform {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            default_size: (DEFAULT_WIDTH, DEFAULT_HEIGHT),
            active: None,
        }
    }

    /// Size reported when `0x0` is negotiated
    pub fn with_default_size(mut self, width: usize, height: usize) -> Self {
        self.default_size = (width, height);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Platform for HostPlatform {
    type File = HostFile;

    fn open_uri(&mut self, uri: &str) -> Option<HostFile> {
        let path = self.root.join(uri_path(uri));
        debug!(uri, path = %path.display(), "opening");
        let file = File::open(&path).ok()?;
        let size = file.metadata().ok()?.len() as usize;
        Some(HostFile { file, size })
    }

    fn decode_image(&mut self, file: &mut HostFile) -> Option<Image> {
        decode_with_image_crate(&file.read_all())
    }

    fn negotiate_display(
        &mut self,
        width: usize,
        height: usize,
        bpp: u8,
    ) -> Option<DisplayParams> {
        if bpp != REQUIRED_BPP {
            return None;
        }
        let params = negotiate_size(self.default_size, width, height);
        self.active = Some(params);
        Some(params)
    }

    fn video_mode_active(&self) -> bool {
        self.active.is_some()
    }
}

fn negotiate_size(default_size: (usize, usize), width: usize, height: usize) -> DisplayParams {
    if width == 0 || height == 0 {
        let mut params = DisplayParams::xrgb8888(default_size.0, default_size.1);
        params.default_res = true;
        params
    } else {
        DisplayParams::xrgb8888(width, height)
    }
}

/// Decode any format the `image` crate was built with
pub fn decode_with_image_crate(bytes: &[u8]) -> Option<Image> {
    match image::load_from_memory(bytes) {
        Ok(decoded) => {
            let rgba = decoded.to_rgba8();
            let (w, h) = rgba.dimensions();
            Image::from_rgba8(w as usize, h as usize, rgba.as_raw())
        },
        Err(err) => {
            debug!(%err, "image decode failed");
            None
        },
    }
}

// ============================================================================
// Memory Platform
// ============================================================================

pub struct MemoryFile {
    uri: String,
    bytes: Vec<u8>,
}

impl FileHandle for MemoryFile {
    fn size(&self) -> usize {
        self.bytes.len()
    }

    fn read_at(&mut self, buf: &mut [u8], offset: usize) -> usize {
        let Some(src) = self.bytes.get(offset..) else {
            return 0;
        };
        let n = src.len().min(buf.len());
        buf[..n].copy_from_slice(&src[..n]);
        n
    }
}

/// Files held in memory; images can be registered already decoded
#[derive(Default)]
pub struct MemoryPlatform {
    files: HashMap<String, Vec<u8>>,
    images: HashMap<String, Image>,
    default_size: Option<(usize, usize)>,
    mode: Option<DisplayParams>,
    /// Overrides what negotiation reports, e.g. a BGR layout
    forced_mode: Option<DisplayParams>,
    refuse_modes: bool,
    negotiations: usize,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self {
            default_size: Some((DEFAULT_WIDTH, DEFAULT_HEIGHT)),
            ..Self::default()
        }
    }

    pub fn with_default_size(mut self, width: usize, height: usize) -> Self {
        self.default_size = Some((width, height));
        self
    }

    pub fn add_file(&mut self, uri: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(uri.into(), bytes);
    }

    /// Register a file whose decode yields `image`
    pub fn add_image(&mut self, uri: impl Into<String>, image: Image) {
        let uri = uri.into();
        self.files.entry(uri.clone()).or_default();
        self.images.insert(uri, image);
    }

    pub fn force_mode(&mut self, params: DisplayParams) {
        self.forced_mode = Some(params);
    }

    pub fn refuse_modes(&mut self, refuse: bool) {
        self.refuse_modes = refuse;
    }

    /// Number of mode negotiations performed so far
    pub fn negotiations(&self) -> usize {
        self.negotiations
    }
}

impl Platform for MemoryPlatform {
    type File = MemoryFile;

    fn open_uri(&mut self, uri: &str) -> Option<MemoryFile> {
        let bytes = self.files.get(uri)?.clone();
        Some(MemoryFile {
            uri: uri.to_string(),
            bytes,
        })
    }

    fn decode_image(&mut self, file: &mut MemoryFile) -> Option<Image> {
        if let Some(image) = self.images.get(&file.uri) {
            return Some(image.clone());
        }
        decode_with_image_crate(&file.bytes)
    }

    fn negotiate_display(
        &mut self,
        width: usize,
        height: usize,
        bpp: u8,
    ) -> Option<DisplayParams> {
        self.negotiations += 1;
        if self.refuse_modes || bpp != REQUIRED_BPP {
            self.mode = None;
            return None;
        }
        let params = match self.forced_mode {
            Some(forced) => forced,
            None => negotiate_size(self.default_size?, width, height),
        };
        self.mode = Some(params);
        Some(params)
    }

    fn video_mode_active(&self) -> bool {
        self.mode.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn test_uri_path() {
        assert_eq!(uri_path("boot():/boot/bg.png"), "boot/bg.png");
        assert_eq!(uri_path("boot(2):/bg.png"), "bg.png");
        assert_eq!(uri_path("tftp://server/bg.png"), "server/bg.png");
        assert_eq!(uri_path("/plain/path"), "plain/path");
        assert_eq!(uri_path("relative"), "relative");
    }

    #[test]
    fn test_memory_file_read_at() {
        let mut platform = MemoryPlatform::new();
        platform.add_file("font", vec![1, 2, 3, 4, 5]);
        let mut file = platform.open_uri("font").unwrap();
        let mut buf = [0u8; 3];
        assert_eq!(file.read_at(&mut buf, 3), 2);
        assert_eq!(&buf[..2], &[4, 5]);
        assert_eq!(file.read_at(&mut buf, 9), 0);
        assert_eq!(file.read_all(), vec![1, 2, 3, 4, 5]);
        assert!(platform.open_uri("missing").is_none());
    }

    #[test]
    fn test_memory_negotiation_defaults() {
        let mut platform = MemoryPlatform::new().with_default_size(640, 480);
        assert!(!platform.video_mode_active());
        let params = platform.negotiate_display(0, 0, 32).unwrap();
        assert_eq!((params.width, params.height), (640, 480));
        assert!(params.default_res);
        let params = platform.negotiate_display(800, 600, 32).unwrap();
        assert!(!params.default_res);
        assert!(platform.negotiate_display(800, 600, 24).is_none());
        assert!(!platform.video_mode_active());
        assert_eq!(platform.negotiations(), 3);
    }

    #[test]
    fn test_registered_image_decodes() {
        let mut platform = MemoryPlatform::new();
        let image = Image::checkerboard(4, 2, Color(0x00ff_ffff), Color::BLACK);
        platform.add_image("bg", image);
        let mut file = platform.open_uri("bg").unwrap();
        let decoded = platform.decode_image(&mut file).unwrap();
        assert_eq!(decoded.width(), 4);
    }

    #[test]
    fn test_garbage_does_not_decode() {
        assert!(decode_with_image_crate(b"definitely not an image").is_none());
    }

    #[test]
    fn test_png_decodes_bottom_up() {
        let mut png = Vec::new();
        let mut top_red = image::RgbaImage::new(1, 2);
        top_red.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        top_red.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        top_red
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let decoded = decode_with_image_crate(&png).unwrap();
        assert_eq!(decoded.pixel(0, 0), Some(Color(0x00ff_0000)));
        assert_eq!(decoded.pixel(0, 1), Some(Color(0x0000_00ff)));
    }

    #[test]
    fn test_grid_size() {
        let display = DisplayParams::xrgb8888(1024, 768);
        let theme = Theme::default();
        let font = FontSettings::builtin(&[]);
        let mut handoff = ConsoleHandoff {
            canvas: None,
            display: &display,
            theme: &theme,
            font: &font,
            margin: 64,
            grid_limit: None,
        };
        // (1024 - 128) / 9 and (768 - 128) / 16
        assert_eq!(handoff.grid_size(), (99, 40));

        handoff.grid_limit = Some((80, 24));
        assert_eq!(handoff.grid_size(), (80, 24));

        handoff.margin = 0;
        handoff.grid_limit = None;
        assert_eq!(handoff.grid_size(), (113, 48));
    }

    #[test]
    fn test_grid_size_with_huge_settings() {
        let display = DisplayParams::xrgb8888(1024, 768);
        let theme = Theme::default();
        let mut font = FontSettings::builtin(&[]);
        font.spacing = usize::MAX;
        let handoff = ConsoleHandoff {
            canvas: None,
            display: &display,
            theme: &theme,
            font: &font,
            margin: usize::MAX,
            grid_limit: None,
        };
        assert_eq!(handoff.grid_size(), (0, 0));

        let handoff = ConsoleHandoff { margin: 0, ..handoff };
        assert_eq!(handoff.grid_size(), (0, 48));
    }

    #[test]
    fn test_host_platform_reads_files() {
        let dir = std::env::temp_dir().join(format!("bootcanvas-host-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("font.bin"), [7u8; 10]).unwrap();

        let mut platform = HostPlatform::new(&dir);
        let mut file = platform.open_uri("boot():/font.bin").unwrap();
        assert_eq!(file.size(), 10);
        let mut buf = [0u8; 4];
        assert_eq!(file.read_at(&mut buf, 8), 2);
        assert!(platform.open_uri("boot():/nope.bin").is_none());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}

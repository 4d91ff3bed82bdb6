//! Boot console background lifecycle
//!
//! [`ConsoleState`] owns everything one console init produces: the negotiated
//! mode, the resolved theme, the laid out wallpaper, the composited canvas and
//! the font. `init` either clears the text over the existing canvas or tears
//! it all down and rebuilds it.

use crate::canvas::{build_canvas, Canvas, CanvasSpec};
use crate::color::Color;
use crate::config::{
    parse_color, ConfigSource, TERM_BACKDROP, TERM_WALLPAPER, TERM_WALLPAPER_STYLE,
};
use crate::display::{DisplayParams, REQUIRED_BPP};
use crate::error::{Degradation, Error, Result};
use crate::font::FontSettings;
use crate::platform::{ConsoleHandoff, Platform, TextConsole};
use crate::reinit::{should_skip_rebuild, BuildStamp, RebuildRequest};
use crate::theme::Theme;
use crate::wallpaper::{Image, WallpaperStyle};
use std::borrow::Cow;
use tracing::{debug, info, warn};

/// Text grid cap (columns, rows) while output is mirrored to serial
pub const SERIAL_GRID_LIMIT: (usize, usize) = (80, 24);

/// What an init did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// Same mode and config as last time; only the text was cleared
    Cleared,
    /// Everything was negotiated, loaded and composited again
    Rebuilt,
}

pub struct ConsoleState {
    builtin_font: Vec<u8>,
    previous: Option<BuildStamp>,
    display: Option<DisplayParams>,
    theme: Theme,
    wallpaper: Option<Image>,
    canvas: Option<Canvas>,
    font: FontSettings,
    degradations: Vec<Degradation>,
}

impl std::fmt::Debug for ConsoleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleState")
            .field("previous", &self.previous)
            .field("display", &self.display)
            .field("theme", &self.theme)
            .field("canvas", &self.canvas)
            .field("font", &self.font)
            .field("degradations", &self.degradations)
            .finish_non_exhaustive()
    }
}

impl ConsoleState {
    /// `builtin_font` is the 8x16 font used whenever no replacement loads
    pub fn new(builtin_font: Vec<u8>) -> Self {
        let font = FontSettings::builtin(&builtin_font);
        Self {
            builtin_font,
            previous: None,
            display: None,
            theme: Theme::default(),
            wallpaper: None,
            canvas: None,
            font,
            degradations: Vec::new(),
        }
    }

    /// Bring the console up for a `width` x `height` mode (`0x0` keeps the
    /// firmware default).
    ///
    /// Fails if no 32-bit xRGB8888 mode can be set. The previous build is
    /// forgotten then and the text console is left deinitialized.
    pub fn init<P: Platform, T: TextConsole>(
        &mut self,
        config: &dyn ConfigSource,
        width: usize,
        height: usize,
        serial: bool,
        platform: &mut P,
        console: &mut T,
    ) -> Result<InitOutcome> {
        let request = RebuildRequest {
            width,
            height,
            serial,
            config: config.id(),
            video_mode_active: platform.video_mode_active(),
        };
        if should_skip_rebuild(&request, self.previous.as_ref()) {
            debug!(width, height, serial, "reinit gate: keeping canvas");
            console.clear();
            return Ok(InitOutcome::Cleared);
        }

        console.deinit();
        self.release();

        let mode = platform
            .negotiate_display(width, height, REQUIRED_BPP)
            .ok_or(Error::DisplayNegotiationFailed { width, height })?;
        mode.require_xrgb8888()?;
        debug!(
            width = mode.width,
            height = mode.height,
            default_res = mode.default_res,
            "negotiated display"
        );

        let mut degradations = Vec::new();
        let mut wallpaper = load_wallpaper(config, platform, &mut degradations);
        let theme = Theme::from_config(config, wallpaper.is_some());

        if let Some(image) = wallpaper.as_mut() {
            let style = WallpaperStyle::from_config(config.get(TERM_WALLPAPER_STYLE));
            let backdrop = config.get(TERM_BACKDROP).map_or(Color::BLACK, parse_color);
            image.apply_style(style, mode.width, mode.height, backdrop);
            debug!(?style, layout = ?image.layout(), "wallpaper laid out");
        }

        let font = FontSettings::load(config, &self.builtin_font, platform, &mut degradations);

        let canvas = build_canvas(
            wallpaper.as_ref(),
            &CanvasSpec {
                width: mode.width,
                height: mode.height,
                margin: theme.margin,
                margin_gradient: theme.margin_gradient,
                background: theme.background,
            },
        );

        console.reinit(&ConsoleHandoff {
            canvas: canvas.as_ref(),
            display: &mode,
            theme: &theme,
            font: &font,
            margin: theme.margin,
            grid_limit: serial.then_some(SERIAL_GRID_LIMIT),
        });

        info!(
            width = mode.width,
            height = mode.height,
            wallpaper = wallpaper.is_some(),
            degradations = degradations.len(),
            "console rebuilt"
        );

        self.previous = Some(BuildStamp::new(&mode, serial, config.id()));
        self.display = Some(mode);
        self.theme = theme;
        self.wallpaper = wallpaper;
        self.canvas = canvas;
        self.font = font;
        self.degradations = degradations;

        Ok(InitOutcome::Rebuilt)
    }

    /// Shut the console down; the next init always rebuilds
    pub fn teardown<T: TextConsole>(&mut self, console: &mut T) {
        console.deinit();
        self.release();
        debug!("console torn down");
    }

    fn release(&mut self) {
        self.previous = None;
        self.display = None;
        self.canvas = None;
        self.wallpaper = None;
        self.degradations.clear();
    }

    /// The background the text is drawn over.
    ///
    /// Without a wallpaper there is no stored canvas and a flat fill of the
    /// theme background (alpha cleared) is produced. `None` before the first
    /// successful init.
    pub fn background(&self) -> Option<Cow<'_, Canvas>> {
        if let Some(canvas) = &self.canvas {
            return Some(Cow::Borrowed(canvas));
        }
        let display = self.display.as_ref()?;
        Some(Cow::Owned(Canvas::filled(
            display.width,
            display.height,
            self.theme.background.opaque(),
        )))
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    pub fn wallpaper(&self) -> Option<&Image> {
        self.wallpaper.as_ref()
    }

    pub fn font(&self) -> &FontSettings {
        &self.font
    }

    pub fn display(&self) -> Option<&DisplayParams> {
        self.display.as_ref()
    }

    /// Recoverable problems hit by the last rebuild
    pub fn degradations(&self) -> &[Degradation] {
        &self.degradations
    }
}

fn load_wallpaper<P: Platform>(
    config: &dyn ConfigSource,
    platform: &mut P,
    degradations: &mut Vec<Degradation>,
) -> Option<Image> {
    let uri = config.get(TERM_WALLPAPER)?;
    let image = platform
        .open_uri(uri)
        .and_then(|mut file| platform.decode_image(&mut file));

    if image.is_none() {
        let degradation = Degradation::ImageLoadFailed {
            uri: uri.to_string(),
        };
        warn!("{}", degradation);
        degradations.push(degradation);
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyValueConfig;
    use crate::platform::MemoryPlatform;

    #[derive(Default)]
    struct CountingConsole {
        reinits: usize,
        clears: usize,
        deinits: usize,
        margin: Option<usize>,
    }

    impl TextConsole for CountingConsole {
        fn reinit(&mut self, handoff: &ConsoleHandoff<'_>) {
            self.reinits += 1;
            self.margin = Some(handoff.margin);
        }

        fn clear(&mut self) {
            self.clears += 1;
        }

        fn deinit(&mut self) {
            self.deinits += 1;
        }
    }

    fn state() -> ConsoleState {
        ConsoleState::new(vec![0; crate::font::font_bytes(8, 16)])
    }

    #[test]
    fn test_background_before_init() {
        assert!(state().background().is_none());
    }

    #[test]
    fn test_second_init_clears() {
        let config = KeyValueConfig::parse("TERM_BACKGROUND=202020");
        let mut platform = MemoryPlatform::new();
        let mut console = CountingConsole::default();
        let mut state = state();

        let first = state.init(&config, 640, 480, false, &mut platform, &mut console);
        assert_eq!(first.unwrap(), InitOutcome::Rebuilt);
        let second = state.init(&config, 640, 480, false, &mut platform, &mut console);
        assert_eq!(second.unwrap(), InitOutcome::Cleared);

        assert_eq!(console.reinits, 1);
        assert_eq!(console.clears, 1);
        assert_eq!(platform.negotiations(), 1);
        assert_eq!(console.margin, Some(0));
    }

    #[test]
    fn test_teardown_forces_rebuild() {
        let config = KeyValueConfig::parse("");
        let mut platform = MemoryPlatform::new();
        let mut console = CountingConsole::default();
        let mut state = state();

        state.init(&config, 0, 0, false, &mut platform, &mut console).unwrap();
        state.teardown(&mut console);
        assert!(state.background().is_none());

        let outcome = state.init(&config, 0, 0, false, &mut platform, &mut console);
        assert_eq!(outcome.unwrap(), InitOutcome::Rebuilt);
        assert_eq!(platform.negotiations(), 2);
    }

    #[test]
    fn test_flat_background_without_wallpaper() {
        let config = KeyValueConfig::parse("TERM_BACKGROUND=7f123456");
        let mut platform = MemoryPlatform::new();
        let mut state = state();
        state
            .init(&config, 8, 4, false, &mut platform, &mut CountingConsole::default())
            .unwrap();

        assert!(state.canvas().is_none());
        let background = state.background().unwrap();
        assert!(matches!(background, Cow::Owned(_)));
        assert_eq!(background.width(), 8);
        assert!(background.pixels().iter().all(|&p| p == Color(0x0012_3456)));
    }
}

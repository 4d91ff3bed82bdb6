//! Console theme: colors, palette and margins

use crate::color::Color;
use crate::config::{
    parse_color, parse_dec, parse_palette, ConfigSource, TERM_BACKGROUND, TERM_FOREGROUND,
    TERM_MARGIN, TERM_MARGIN_GRADIENT, TERM_PALETTE, TERM_PALETTE_BRIGHT,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_MARGIN: usize = 64;
pub const DEFAULT_MARGIN_GRADIENT: usize = 4;

/// Background without a wallpaper: opaque black
pub const DEFAULT_BACKGROUND: Color = Color(0x0000_0000);
/// Background over a wallpaper: black, half transparent
pub const DEFAULT_WALLPAPER_BACKGROUND: Color = Color(0x8000_0000);
pub const DEFAULT_FOREGROUND: Color = Color(0x00aa_aaaa);

/// Black, red, green, brown, blue, magenta, cyan, grey
pub const DEFAULT_ANSI: [Color; 8] = [
    Color(0x0000_0000),
    Color(0x00aa_0000),
    Color(0x0000_aa00),
    Color(0x00aa_5500),
    Color(0x0000_00aa),
    Color(0x00aa_00aa),
    Color(0x0000_aaaa),
    Color(0x00aa_aaaa),
];

pub const DEFAULT_ANSI_BRIGHT: [Color; 8] = [
    Color(0x0055_5555),
    Color(0x00ff_5555),
    Color(0x0055_ff55),
    Color(0x00ff_ff55),
    Color(0x0055_55ff),
    Color(0x00ff_55ff),
    Color(0x0055_ffff),
    Color(0x00ff_ffff),
];

/// The 16 indexed text colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub normal: [Color; 8],
    pub bright: [Color; 8],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            normal: DEFAULT_ANSI,
            bright: DEFAULT_ANSI_BRIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Also the tint over the wallpaper; its alpha is a transparency
    pub background: Color,
    pub foreground: Color,
    pub margin: usize,
    pub margin_gradient: usize,
    pub palette: Palette,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND,
            foreground: DEFAULT_FOREGROUND,
            margin: 0,
            margin_gradient: 0,
            palette: Palette::default(),
        }
    }
}

impl Theme {
    /// Resolve the theme from config.
    ///
    /// `has_wallpaper` changes the defaults: margins only exist around a
    /// wallpaper, and the background turns half transparent over one unless
    /// it is configured explicitly.
    pub fn from_config(config: &dyn ConfigSource, has_wallpaper: bool) -> Self {
        let mut palette = Palette::default();
        if let Some(list) = config.get(TERM_PALETTE) {
            let n = parse_palette(list, &mut palette.normal);
            debug!(entries = n, "parsed TERM_PALETTE");
        }
        if let Some(list) = config.get(TERM_PALETTE_BRIGHT) {
            let n = parse_palette(list, &mut palette.bright);
            debug!(entries = n, "parsed TERM_PALETTE_BRIGHT");
        }

        let background = match config.get(TERM_BACKGROUND) {
            Some(value) => parse_color(value),
            None if has_wallpaper => DEFAULT_WALLPAPER_BACKGROUND,
            None => DEFAULT_BACKGROUND,
        };
        let foreground = config
            .get(TERM_FOREGROUND)
            .map_or(DEFAULT_FOREGROUND, |v| parse_color(v).opaque());

        let (margin, margin_gradient) = if has_wallpaper {
            (
                config.get(TERM_MARGIN).map_or(DEFAULT_MARGIN, parse_dec),
                config
                    .get(TERM_MARGIN_GRADIENT)
                    .map_or(DEFAULT_MARGIN_GRADIENT, parse_dec),
            )
        } else {
            (0, 0)
        };

        Self {
            background,
            foreground,
            margin,
            margin_gradient,
            palette,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyValueConfig;

    #[test]
    fn test_defaults_without_wallpaper() {
        let config = KeyValueConfig::parse("");
        let theme = Theme::from_config(&config, false);
        assert_eq!(theme, Theme::default());
    }

    #[test]
    fn test_defaults_with_wallpaper() {
        let config = KeyValueConfig::parse("");
        let theme = Theme::from_config(&config, true);
        assert_eq!(theme.background, DEFAULT_WALLPAPER_BACKGROUND);
        assert_eq!(theme.margin, 64);
        assert_eq!(theme.margin_gradient, 4);
    }

    #[test]
    fn test_margins_collapse_without_wallpaper() {
        let config = KeyValueConfig::parse("TERM_MARGIN=32\nTERM_MARGIN_GRADIENT=8");
        let theme = Theme::from_config(&config, false);
        assert_eq!((theme.margin, theme.margin_gradient), (0, 0));

        let theme = Theme::from_config(&config, true);
        assert_eq!((theme.margin, theme.margin_gradient), (32, 8));
    }

    #[test]
    fn test_background_keeps_alpha_foreground_does_not() {
        let config = KeyValueConfig::parse("TERM_BACKGROUND=40102030\nTERM_FOREGROUND=ffc0c0c0");
        let theme = Theme::from_config(&config, true);
        assert_eq!(theme.background, Color(0x4010_2030));
        assert_eq!(theme.foreground, Color(0x00c0_c0c0));
    }

    #[test]
    fn test_partial_palettes() {
        let config = KeyValueConfig::parse("TERM_PALETTE=111111;222222\nTERM_PALETTE_BRIGHT=zz");
        let theme = Theme::from_config(&config, false);
        assert_eq!(theme.palette.normal[0], Color(0x0011_1111));
        assert_eq!(theme.palette.normal[1], Color(0x0022_2222));
        assert_eq!(theme.palette.normal[2], DEFAULT_ANSI[2]);
        assert_eq!(theme.palette.bright, DEFAULT_ANSI_BRIGHT);
    }

    #[test]
    fn test_theme_serializes_colors_as_numbers() {
        let json = serde_json::to_value(Theme::default()).unwrap();
        assert_eq!(json["foreground"], 0x00aa_aaaa);
        assert_eq!(json["palette"]["bright"][7], 0x00ff_ffff);
    }
}

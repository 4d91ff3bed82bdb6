//! Configuration sources and value parsers
//!
//! Console settings arrive as string values keyed by `TERM_*` names. Two
//! sources are provided: the boot-config style `KEY=VALUE` text format and a
//! flat JSON object. Values are parsed with the same lenient rules boot
//! configs have always used: leading digits are taken, trailing junk ignored.

use crate::color::Color;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

pub const TERM_PALETTE: &str = "TERM_PALETTE";
pub const TERM_PALETTE_BRIGHT: &str = "TERM_PALETTE_BRIGHT";
pub const TERM_BACKGROUND: &str = "TERM_BACKGROUND";
pub const TERM_FOREGROUND: &str = "TERM_FOREGROUND";
pub const TERM_WALLPAPER: &str = "TERM_WALLPAPER";
pub const TERM_WALLPAPER_STYLE: &str = "TERM_WALLPAPER_STYLE";
pub const TERM_BACKDROP: &str = "TERM_BACKDROP";
pub const TERM_MARGIN: &str = "TERM_MARGIN";
pub const TERM_MARGIN_GRADIENT: &str = "TERM_MARGIN_GRADIENT";
pub const TERM_FONT: &str = "TERM_FONT";
pub const TERM_FONT_SIZE: &str = "TERM_FONT_SIZE";
pub const TERM_FONT_SPACING: &str = "TERM_FONT_SPACING";
pub const TERM_FONT_SCALE: &str = "TERM_FONT_SCALE";

/// Identity of a loaded configuration.
///
/// Two inits with the same id are using the very same configuration, which
/// lets the console skip regenerating the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigId(u64);

impl ConfigId {
    /// A process-unique id
    pub fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Read access to console settings
pub trait ConfigSource {
    fn id(&self) -> ConfigId;
    fn get(&self, key: &str) -> Option<&str>;
}

// ============================================================================
// Key/Value Source
// ============================================================================

/// `KEY=VALUE` lines; `#` starts a comment line, the first occurrence wins
#[derive(Debug, Clone)]
pub struct KeyValueConfig {
    id: ConfigId,
    entries: BTreeMap<String, String>,
}

impl KeyValueConfig {
    pub fn parse(text: &str) -> Self {
        let mut entries = BTreeMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                entries
                    .entry(key.trim().to_string())
                    .or_insert_with(|| value.trim().to_string());
            }
        }
        Self {
            id: ConfigId::fresh(),
            entries,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ConfigSource for KeyValueConfig {
    fn id(&self) -> ConfigId {
        self.id
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

// ============================================================================
// JSON Source
// ============================================================================

/// A flat JSON object of string values, e.g. `{"TERM_MARGIN": "32"}`
#[derive(Debug, Clone)]
pub struct JsonConfig {
    id: ConfigId,
    entries: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(transparent)]
struct JsonEntries(BTreeMap<String, String>);

impl JsonConfig {
    pub fn parse(json: &str) -> Result<Self> {
        let JsonEntries(entries) = serde_json::from_str(json)?;
        Ok(Self {
            id: ConfigId::fresh(),
            entries,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::parse(&json)
    }
}

impl ConfigSource for JsonConfig {
    fn id(&self) -> ConfigId {
        self.id
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

/// Load a config file, choosing the format by extension
pub fn load_config(path: impl AsRef<Path>) -> Result<Box<dyn ConfigSource>> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(Box::new(JsonConfig::load(path)?)),
        Some(_) | None => {
            if !path.exists() {
                return Err(Error::Config(format!("{} does not exist", path.display())));
            }
            Ok(Box::new(KeyValueConfig::load(path)?))
        },
    }
}

// ============================================================================
// Value Parsers
// ============================================================================

/// Parse leading digits in `radix`.
///
/// Returns the value and the number of bytes consumed; 0 consumed means no
/// digits were found. Overflow wraps, as boot-config parsers always have.
pub fn parse_leading(s: &str, radix: u32) -> (u64, usize) {
    let mut value = 0u64;
    let mut consumed = 0;
    for c in s.chars() {
        let Some(digit) = c.to_digit(radix) else {
            break;
        };
        value = value.wrapping_mul(radix as u64).wrapping_add(digit as u64);
        consumed += c.len_utf8();
    }
    (value, consumed)
}

/// Leading hex number, 0 when there is none
pub fn parse_hex(s: &str) -> u32 {
    parse_leading(s, 16).0 as u32
}

/// Leading decimal number, 0 when there is none
pub fn parse_dec(s: &str) -> usize {
    parse_leading(s, 10).0 as usize
}

/// Hex color value
pub fn parse_color(s: &str) -> Color {
    Color(parse_hex(s))
}

/// Parse `WxH` (an optional trailing `xBPP` is ignored).
///
/// Returns `None` when either dimension is missing.
pub fn parse_resolution(s: &str) -> Option<(usize, usize)> {
    let (width, used) = parse_leading(s, 10);
    if used == 0 {
        return None;
    }
    let rest = s[used..].strip_prefix('x')?;
    let (height, used) = parse_leading(rest, 10);
    if used == 0 {
        return None;
    }
    Some((width as usize, height as usize))
}

/// Overwrite the start of `palette` with colors from a list like
/// `aa0000;00aa00;0000aa`.
///
/// Exactly one separator character is skipped between entries. Parsing stops
/// at the first entry with no hex digits; entries already parsed are kept and
/// the rest of `palette` is left alone. Colors are masked to 24 bits.
/// Returns how many entries were replaced.
pub fn parse_palette(list: &str, palette: &mut [Color]) -> usize {
    let mut rest = list;
    let mut parsed = 0;
    for slot in palette.iter_mut() {
        let (value, used) = parse_leading(rest, 16);
        if used == 0 {
            break;
        }
        *slot = Color(value as u32).opaque();
        parsed += 1;

        rest = &rest[used..];
        let mut chars = rest.chars();
        if chars.next().is_none() {
            break;
        }
        rest = chars.as_str();
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_value_parse() {
        let config = KeyValueConfig::parse(
            "# theme\nTERM_MARGIN = 32\n\nTERM_BACKGROUND=80102030\nTERM_MARGIN=99\nnot a pair\n",
        );
        assert_eq!(config.get(TERM_MARGIN), Some("32"));
        assert_eq!(config.get(TERM_BACKGROUND), Some("80102030"));
        assert_eq!(config.get(TERM_FONT), None);
        assert_eq!(config.len(), 2);
    }

    #[test]
    fn test_each_parse_gets_a_new_id() {
        let a = KeyValueConfig::parse("TERM_MARGIN=1");
        let b = KeyValueConfig::parse("TERM_MARGIN=1");
        assert_ne!(a.id(), b.id());
        let a2 = a.clone();
        assert_eq!(a.id(), a2.id());
    }

    #[test]
    fn test_json_config() {
        let config = JsonConfig::parse(r#"{"TERM_WALLPAPER": "boot():/bg.png"}"#).unwrap();
        assert_eq!(config.get(TERM_WALLPAPER), Some("boot():/bg.png"));
        assert!(JsonConfig::parse(r#"{"TERM_MARGIN": 3}"#).is_err());
    }

    #[test]
    fn test_parse_hex_and_dec() {
        assert_eq!(parse_hex("ff8000"), 0xff8000);
        assert_eq!(parse_hex("80102030zz"), 0x80102030);
        assert_eq!(parse_hex("zz"), 0);
        assert_eq!(parse_dec("64px"), 64);
        assert_eq!(parse_dec(""), 0);
    }

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution("8x16"), Some((8, 16)));
        assert_eq!(parse_resolution("1024x768x32"), Some((1024, 768)));
        assert_eq!(parse_resolution("8"), None);
        assert_eq!(parse_resolution("x16"), None);
        assert_eq!(parse_resolution("8x"), None);
    }

    #[test]
    fn test_parse_palette_full_and_masked() {
        let mut palette = [Color::BLACK; 8];
        let n = parse_palette("ff000000;1;2;3;4;5;6;7", &mut palette);
        assert_eq!(n, 8);
        assert_eq!(palette[0], Color(0));
        assert_eq!(palette[7], Color(7));
    }

    #[test]
    fn test_parse_palette_partial() {
        let mut palette = [Color(0x00aa_aaaa); 8];
        let n = parse_palette("112233,445566", &mut palette);
        assert_eq!(n, 2);
        assert_eq!(palette[1], Color(0x0044_5566));
        assert_eq!(palette[2], Color(0x00aa_aaaa));
    }

    #[test]
    fn test_parse_palette_stops_at_bad_token() {
        let mut palette = [Color(0x0012_3456); 8];
        let n = parse_palette("aa0000;zzz;00aa00", &mut palette);
        assert_eq!(n, 1);
        assert_eq!(palette[0], Color(0x00aa_0000));
        assert_eq!(palette[1], Color(0x0012_3456));
    }

    #[test]
    fn test_parse_palette_ignores_extra_entries() {
        let mut palette = [Color::BLACK; 2];
        assert_eq!(parse_palette("1;2;3;4", &mut palette), 2);
        assert_eq!(palette, [Color(1), Color(2)]);
    }
}

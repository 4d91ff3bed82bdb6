//! Error types for bootcanvas
//!
//! Only conditions that abort console initialization are errors. Anything the
//! pipeline can recover from (missing wallpaper, oversized or missing font) is
//! reported as a [`Degradation`] and the documented default is used instead.

use thiserror::Error;

/// Result type alias for bootcanvas operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors for the canvas pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// The display collaborator could not provide a 32-bit mode
    #[error("display negotiation failed for {width}x{height}")]
    DisplayNegotiationFailed { width: usize, height: usize },

    /// The negotiated mode is not xRGB8888
    #[error(
        "unsupported pixel format: red {red_size}@{red_shift}, green {green_size}@{green_shift}, blue {blue_size}@{blue_shift}"
    )]
    UnsupportedPixelFormat {
        red_size: u8,
        red_shift: u8,
        green_size: u8,
        green_shift: u8,
        blue_size: u8,
        blue_shift: u8,
    },

    /// Reading a config file or writing preview output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A config file could not be understood
    #[error("config error: {0}")]
    Config(String),

    /// Encoding the preview image failed
    #[error("encode error: {0}")]
    Encode(#[from] image::ImageError),

    /// The preview window could not be created
    #[error("window error: {0}")]
    Window(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Recoverable failures that degrade to a default instead of aborting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    /// Wallpaper missing or undecodable; flat theme fill is used
    ImageLoadFailed { uri: String },
    /// Requested font dimensions exceed the font buffer; built-in font kept
    FontTooLarge { requested: usize, allowed: usize },
    /// Custom font file missing; built-in font kept
    FontLoadFailed { uri: String },
}

impl std::fmt::Display for Degradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ImageLoadFailed { uri } => write!(f, "could not load wallpaper '{}'", uri),
            Self::FontTooLarge { requested, allowed } => write!(
                f,
                "font would be too large ({} bytes, {} bytes allowed), not loading",
                requested, allowed
            ),
            Self::FontLoadFailed { uri } => write!(f, "could not open font file '{}'", uri),
        }
    }
}

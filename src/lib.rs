//! Boot console background compositing
//!
//! Builds the full-screen canvas a boot-time text console draws over: a
//! wallpaper laid out tiled, centered or stretched, tinted by the theme
//! background inside the text area and faded in across a margin gradient.
//! [`ConsoleState`] drives the whole init/teardown lifecycle against a
//! [`Platform`] and a [`TextConsole`].

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod canvas;
pub mod color;
pub mod config;
pub mod console;
pub mod display;
pub mod error;
pub mod fixed;
pub mod font;
pub mod gradient;
pub mod platform;
pub mod reinit;
pub mod theme;
pub mod wallpaper;

pub use canvas::{build_canvas, Canvas, CanvasSpec};
pub use color::{blend, Color};
pub use config::{load_config, ConfigId, ConfigSource, JsonConfig, KeyValueConfig};
pub use console::{ConsoleState, InitOutcome};
pub use display::DisplayParams;
pub use error::{Degradation, Error, Result};
pub use font::FontSettings;
pub use platform::{ConsoleHandoff, HostPlatform, MemoryPlatform, Platform, TextConsole};
pub use reinit::should_skip_rebuild;
pub use theme::Theme;
pub use wallpaper::{Image, Layout, WallpaperStyle};

//! Deciding whether a console init can reuse the existing canvas
//!
//! Regenerating the canvas means renegotiating the display mode, reloading
//! the wallpaper and font, and compositing every pixel again. When the
//! requested mode and configuration are exactly what the previous build used,
//! clearing the text is enough.

use crate::config::ConfigId;
use crate::display::{DisplayParams, REQUIRED_BPP};

/// What the previous successful build was made from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildStamp {
    pub width: usize,
    pub height: usize,
    pub bpp: u8,
    /// The mode was the firmware default rather than an explicit size
    pub default_res: bool,
    pub serial: bool,
    pub config: ConfigId,
}

impl BuildStamp {
    pub fn new(display: &DisplayParams, serial: bool, config: ConfigId) -> Self {
        Self {
            width: display.width,
            height: display.height,
            bpp: display.bpp,
            default_res: display.default_res,
            serial,
            config,
        }
    }
}

/// An init request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildRequest {
    /// Requested size; `0x0` keeps whatever mode is active
    pub width: usize,
    pub height: usize,
    pub serial: bool,
    pub config: ConfigId,
    /// A graphical video mode is currently set
    pub video_mode_active: bool,
}

/// True when the previous build can be kept and only the text cleared.
///
/// Requires an active video mode, a 32-bit previous build with the same
/// serial flag and configuration, and either no explicit size (on a
/// default-resolution mode) or an explicit size equal to the current one.
pub fn should_skip_rebuild(request: &RebuildRequest, previous: Option<&BuildStamp>) -> bool {
    let Some(previous) = previous else {
        return false;
    };

    let same_setup = request.video_mode_active
        && previous.bpp == REQUIRED_BPP
        && request.serial == previous.serial
        && request.config == previous.config;
    if !same_setup {
        return false;
    }

    let keep_default = previous.default_res && request.width == 0 && request.height == 0;
    let same_size = request.width == previous.width && request.height == previous.height;

    keep_default || same_size
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp(config: ConfigId) -> BuildStamp {
        BuildStamp {
            width: 800,
            height: 600,
            bpp: 32,
            default_res: false,
            serial: false,
            config,
        }
    }

    fn request(config: ConfigId) -> RebuildRequest {
        RebuildRequest {
            width: 800,
            height: 600,
            serial: false,
            config,
            video_mode_active: true,
        }
    }

    #[test]
    fn test_identical_parameters_skip() {
        let config = ConfigId::fresh();
        assert!(should_skip_rebuild(&request(config), Some(&stamp(config))));
    }

    #[test]
    fn test_first_init_never_skips() {
        assert!(!should_skip_rebuild(&request(ConfigId::fresh()), None));
    }

    #[test]
    fn test_any_changed_field_rebuilds() {
        let config = ConfigId::fresh();
        let prev = stamp(config);

        let changes: [fn(&mut RebuildRequest); 5] = [
            |r| r.width = 1024,
            |r| r.height = 768,
            |r| r.serial = true,
            |r| r.config = ConfigId::fresh(),
            |r| r.video_mode_active = false,
        ];
        for change in changes {
            let mut req = request(config);
            change(&mut req);
            assert!(!should_skip_rebuild(&req, Some(&prev)), "{:?}", req);
        }

        let mut shallow = prev;
        shallow.bpp = 24;
        assert!(!should_skip_rebuild(&request(config), Some(&shallow)));
    }

    #[test]
    fn test_zero_size_keeps_default_mode() {
        let config = ConfigId::fresh();
        let mut prev = stamp(config);
        let mut req = request(config);
        req.width = 0;
        req.height = 0;

        assert!(!should_skip_rebuild(&req, Some(&prev)));
        prev.default_res = true;
        assert!(should_skip_rebuild(&req, Some(&prev)));
    }

    #[test]
    fn test_explicit_size_matching_default_mode_skips() {
        let config = ConfigId::fresh();
        let mut prev = stamp(config);
        prev.default_res = true;
        assert!(should_skip_rebuild(&request(config), Some(&prev)));
    }
}

// config.rs - Window constants and startup settings
use bitflags::bitflags;

use crate::color::Color;
use crate::error::{AppError, Result};
use crate::traits::SurfaceSize;

// === Constants ===

/// Base window width before resolution scaling
pub const DEFAULT_WIDTH: u32 = 800;
/// Base window height before resolution scaling
pub const DEFAULT_HEIGHT: u32 = 600;
/// Horizontal resolution multiplier applied to [`DEFAULT_WIDTH`]
pub const DEFAULT_RESX: f64 = 1.0;
/// Vertical resolution multiplier applied to [`DEFAULT_HEIGHT`]
pub const DEFAULT_RESY: f64 = 1.0;

/// Presentation rate ceiling in frames per second (0 = uncapped)
pub const FRAMERATE_LIMIT: u32 = 120;
/// Requested multisampling level; clamped to what the device supports
pub const ANTIALIASING_LEVEL: u32 = 10;
pub const WINDOW_TITLE: &str = "split-loop";
/// Color the surface is cleared to before and during rendering
pub const CLEAR_COLOR: Color = Color::CYAN;

bitflags! {
    /// Window decoration and behaviour flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WindowStyle: u32 {
        const TITLEBAR = 1;
        const RESIZE = 1 << 1;
        const CLOSE = 1 << 2;
        const FULLSCREEN = 1 << 3;
    }
}

/// Rendering context settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextSettings {
    /// Requested multisample count; 0 and 1 both mean none
    pub antialiasing_level: u32,
}

/// Everything needed to build the display surface and drive the loops
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSettings {
    pub title: String,
    pub size: SurfaceSize,
    pub style: WindowStyle,
    pub context: ContextSettings,
    pub framerate_limit: u32,
    pub clear_color: Color,
}

impl WindowSettings {
    /// Settings assembled from the module constants
    pub fn from_constants() -> Result<Self> {
        Ok(Self {
            title: WINDOW_TITLE.to_string(),
            size: surface_dimensions(DEFAULT_WIDTH, DEFAULT_HEIGHT, DEFAULT_RESX, DEFAULT_RESY)?,
            style: WindowStyle::TITLEBAR | WindowStyle::CLOSE,
            context: ContextSettings {
                antialiasing_level: ANTIALIASING_LEVEL,
            },
            framerate_limit: FRAMERATE_LIMIT,
            clear_color: CLEAR_COLOR,
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, size: SurfaceSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_style(mut self, style: WindowStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_antialiasing(mut self, level: u32) -> Self {
        self.context.antialiasing_level = level;
        self
    }

    pub fn with_framerate_limit(mut self, fps: u32) -> Self {
        self.framerate_limit = fps;
        self
    }

    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }
}

/// Scale base dimensions by resolution multipliers, flooring each axis.
///
/// Multipliers must be finite and positive, and each scaled axis must land
/// in `1..=u32::MAX`.
pub fn surface_dimensions(width: u32, height: u32, resx: f64, resy: f64) -> Result<SurfaceSize> {
    let invalid = || AppError::InvalidDimensions {
        width,
        height,
        resx,
        resy,
    };

    let w = scale_axis(width, resx).ok_or_else(invalid)?;
    let h = scale_axis(height, resy).ok_or_else(invalid)?;
    SurfaceSize::new(w, h).ok_or_else(invalid)
}

fn scale_axis(base: u32, factor: f64) -> Option<u32> {
    if !factor.is_finite() || factor <= 0.0 {
        return None;
    }

    let scaled = (base as f64 * factor).floor();
    if scaled < 1.0 || scaled > u32::MAX as f64 {
        return None;
    }
    Some(scaled as u32)
}

/// Largest power-of-two sample count not above `requested` that `supported` accepts
pub fn resolve_sample_count(requested: u32, supported: impl Fn(u32) -> bool) -> u32 {
    [16, 8, 4, 2]
        .into_iter()
        .find(|&count| count <= requested && supported(count))
        .unwrap_or(1)
}

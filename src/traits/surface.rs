use crate::color::Color;
use crate::error::Result;

/// Surface dimensions in physical pixels, both non-zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    width: u32,
    height: u32,
}

impl SurfaceSize {
    /// Returns `None` for a zero-area size (minimized window)
    pub fn new(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// On-screen drawing target shared by the control and display loops.
///
/// Only the display loop calls [`resize`](DisplaySurface::resize),
/// [`clear`](DisplaySurface::clear) and [`present`](DisplaySurface::present);
/// the control loop talks to it through display commands.
pub trait DisplaySurface: Send + Sync {
    /// Currently configured size
    fn size(&self) -> SurfaceSize;

    /// Reconfigure the swapchain for a new size
    fn resize(&self, size: SurfaceSize) -> Result<()>;

    /// Clear the back buffer to `color`
    fn clear(&self, color: Color) -> Result<()>;

    /// Present the back buffer.
    /// Returns `false` when there was no frame to present (skipped frame).
    fn present(&self) -> Result<bool>;
}

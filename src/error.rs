use thiserror::Error;

/// Errors raised while building, running or tearing down the window loops
#[derive(Debug, Error)]
pub enum AppError {
    /// A loop was started before `App::set_window`
    #[error("no display surface has been assigned to the window owner")]
    WindowNotSet,

    #[error("a display surface is already assigned to the window owner")]
    WindowAlreadySet,

    /// The owner's display loop has already been started, whether or not it
    /// is still running; each owner runs it once
    #[error("display loop was already started on this owner")]
    DisplayAlreadyStarted,

    #[error("invalid surface dimensions: {width}x{height} scaled by {resx}x{resy}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        resx: f64,
        resy: f64,
    },

    /// Window or rendering context could not be created (unsupported mode, no adapter, ...)
    #[error("failed to create display surface: {0}")]
    SurfaceCreation(String),

    #[error("failed to present frame: {0}")]
    Present(String),

    #[error("failed to initialise windowing threads: {0}")]
    ThreadInit(String),

    #[error("failed to spawn display thread")]
    ThreadSpawn(#[source] std::io::Error),

    #[error("display thread panicked")]
    DisplayThreadPanicked,

    #[error(transparent)]
    EventLoop(#[from] winit::error::EventLoopError),
}

pub type Result<T> = std::result::Result<T, AppError>;

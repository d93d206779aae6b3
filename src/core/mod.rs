pub mod app;
pub mod control;
pub mod frame_limiter;
pub mod gpu_surface;

pub use app::{App, DisplayReport, DISPLAY_THREAD_NAME};
pub use control::{drain_commands, ControlLoop, DisplayCommand, Inbox};
pub use frame_limiter::FrameLimiter;
pub use gpu_surface::GpuSurface;

pub mod cli;
pub mod color;
pub mod config;
pub mod core;
pub mod error;
pub mod platform;
pub mod traits;
pub mod window;

pub use crate::color::Color;
pub use crate::config::WindowSettings;
pub use crate::core::{App, DisplayReport};
pub use crate::error::{AppError, Result};

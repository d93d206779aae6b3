pub mod event_pump;
pub mod surface;

pub use event_pump::*;
pub use surface::*;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use winit::event_loop::EventLoop;

use split_loop::cli::Cli;
use split_loop::core::{App, GpuSurface};
use split_loop::platform;
use split_loop::traits::DisplaySurface;
use split_loop::window::{self, UserEvent, WinitPump};
use split_loop::WindowSettings;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let _cli = Cli::parse();

    // Before any window or GPU object exists
    platform::init_threads().context("failed to make the windowing system thread-safe")?;

    let settings = WindowSettings::from_constants().context("invalid window settings")?;
    log::info!(
        "opening \"{}\" at {}x{}, style {:?}, {} fps cap",
        settings.title,
        settings.size.width(),
        settings.size.height(),
        settings.style,
        settings.framerate_limit
    );

    let event_loop = EventLoop::<UserEvent>::with_user_event()
        .build()
        .context("failed to create event loop")?;
    let window = window::create_window(&event_loop, &settings)?;
    let surface = pollster::block_on(GpuSurface::new(window, &settings))
        .context("failed to create display surface")?;
    log::debug!("multisampling at {}x", surface.sample_count());
    surface.clear(settings.clear_color)?;

    let mut app = App::new(settings);
    app.set_window(Arc::new(surface))?;

    let report = app.start(WinitPump::new(event_loop))?;
    log::info!(
        "shut down after {} frames ({:.1} fps, cap {})",
        report.frames,
        report.average_fps(),
        app.settings().framerate_limit
    );

    Ok(())
}

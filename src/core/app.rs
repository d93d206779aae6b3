use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use super::control::{drain_commands, ControlLoop, DisplayCommand, Inbox};
use super::frame_limiter::FrameLimiter;
use crate::config::WindowSettings;
use crate::error::{AppError, Result};
use crate::traits::{DisplaySurface, EventPump, Wake};

pub const DISPLAY_THREAD_NAME: &str = "display";

/// Summary of a finished display loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayReport {
    /// Frames actually presented (skipped frames excluded)
    pub frames: u64,
    pub elapsed: Duration,
}

impl DisplayReport {
    pub fn average_fps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }
}

/// Window owner: coordinates one display surface between the control loop
/// (main thread) and the display loop (worker thread).
///
/// The surface is shared, but only the display loop draws on it. The control
/// loop reaches the display loop through a command channel.
pub struct App<S> {
    settings: WindowSettings,
    surface: Option<Arc<S>>,
    commands: Sender<DisplayCommand>,
    inbox: Mutex<Option<Receiver<DisplayCommand>>>,
}

impl<S: DisplaySurface> App<S> {
    pub fn new(settings: WindowSettings) -> Self {
        let (commands, inbox) = mpsc::channel();
        Self {
            settings,
            surface: None,
            commands,
            inbox: Mutex::new(Some(inbox)),
        }
    }

    pub fn settings(&self) -> &WindowSettings {
        &self.settings
    }

    /// Assign the display surface. Only one assignment is allowed.
    pub fn set_window(&mut self, surface: Arc<S>) -> Result<()> {
        if self.surface.is_some() {
            return Err(AppError::WindowAlreadySet);
        }
        self.surface = Some(surface);
        Ok(())
    }

    pub fn surface(&self) -> Result<&Arc<S>> {
        self.surface.as_ref().ok_or(AppError::WindowNotSet)
    }

    /// Run the display loop on a worker thread and the control loop on the
    /// calling thread, then join the worker.
    pub fn start<P: EventPump>(&self, pump: P) -> Result<DisplayReport> {
        self.surface()?;
        let waker = pump.waker();

        thread::scope(|scope| -> Result<DisplayReport> {
            let display = thread::Builder::new()
                .name(DISPLAY_THREAD_NAME.into())
                .spawn_scoped(scope, move || self.display(waker))
                .map_err(AppError::ThreadSpawn)?;

            let control = self.run(pump);
            let report = display
                .join()
                .map_err(|_| AppError::DisplayThreadPanicked)?;

            control?;
            report
        })
    }

    /// Control loop. Returns once the window is closed or the display loop
    /// has stopped; the display loop is always told to shut down on return.
    pub fn run<P: EventPump>(&self, pump: P) -> Result<()> {
        let surface = self.surface()?;
        let mut control = ControlLoop::new(Arc::clone(surface), self.commands.clone());

        log::info!("control loop started");
        let result = pump.pump(|event| control.handle(event));
        control.shutdown();
        log::info!("control loop finished");
        result
    }

    /// Display loop: drain commands, clear, present, wait for the next frame.
    /// Wakes the control loop when it exits for any reason.
    pub fn display<W: Wake>(&self, waker: W) -> Result<DisplayReport> {
        let _wake = WakeOnExit(&waker);
        let surface = self.surface()?;
        let inbox = self
            .inbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(AppError::DisplayAlreadyStarted)?;

        let mut limiter = FrameLimiter::new(self.settings.framerate_limit);
        let started = Instant::now();
        let mut frames = 0u64;

        log::info!(
            "display loop started at {}x{}, cap {} fps",
            surface.size().width(),
            surface.size().height(),
            self.settings.framerate_limit
        );

        loop {
            match drain_commands(&inbox) {
                Inbox::Stop => break,
                Inbox::Continue(Some(size)) => surface.resize(size)?,
                Inbox::Continue(None) => {}
            }

            surface.clear(self.settings.clear_color)?;
            if surface.present()? {
                frames += 1;
            }
            limiter.wait();
        }

        let report = DisplayReport {
            frames,
            elapsed: started.elapsed(),
        };
        log::info!(
            "display loop finished: {} frames, {:.1} fps average",
            report.frames,
            report.average_fps()
        );
        Ok(report)
    }
}

struct WakeOnExit<'a, W: Wake>(&'a W);

impl<W: Wake> Drop for WakeOnExit<'_, W> {
    fn drop(&mut self) {
        self.0.wake();
    }
}

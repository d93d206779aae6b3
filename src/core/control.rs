use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;

use crate::traits::{ControlEvent, Key, LoopAction, SurfaceSize};

/// Message from the control loop to the display loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCommand {
    Resize(SurfaceSize),
    Shutdown,
}

/// Result of draining the display inbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbox {
    /// Keep rendering; apply the latest resize if any
    Continue(Option<SurfaceSize>),
    Stop,
}

/// Take every pending command without blocking.
/// Only the most recent resize matters; shutdown or a closed channel wins.
pub fn drain_commands(inbox: &Receiver<DisplayCommand>) -> Inbox {
    let mut resize = None;
    loop {
        match inbox.try_recv() {
            Ok(DisplayCommand::Resize(size)) => resize = Some(size),
            Ok(DisplayCommand::Shutdown) | Err(TryRecvError::Disconnected) => return Inbox::Stop,
            Err(TryRecvError::Empty) => return Inbox::Continue(resize),
        }
    }
}

/// Main-thread side of the window owner: turns window events into display commands.
///
/// Dropping it tells the display loop to shut down, so an early return or a
/// panic on the main thread cannot leave the display thread running.
pub struct ControlLoop<S> {
    surface: Arc<S>,
    commands: Sender<DisplayCommand>,
    shutdown_sent: bool,
}

impl<S> ControlLoop<S> {
    pub fn new(surface: Arc<S>, commands: Sender<DisplayCommand>) -> Self {
        Self {
            surface,
            commands,
            shutdown_sent: false,
        }
    }

    /// Surface this loop controls
    pub fn surface(&self) -> &Arc<S> {
        &self.surface
    }

    pub fn handle(&mut self, event: ControlEvent) -> LoopAction {
        match event {
            ControlEvent::CloseRequested | ControlEvent::KeyPressed(Key::Escape) => {
                log::debug!("close requested");
                self.shutdown();
                LoopAction::Exit
            }
            ControlEvent::DisplayStopped => {
                log::debug!("display loop stopped");
                LoopAction::Exit
            }
            ControlEvent::Resized { width, height } => {
                let Some(size) = SurfaceSize::new(width, height) else {
                    // Minimized; keep the old swapchain
                    return LoopAction::Continue;
                };
                log::debug!("resize to {}x{}", width, height);
                if self.commands.send(DisplayCommand::Resize(size)).is_err() {
                    log::warn!("display loop is gone, leaving control loop");
                    return LoopAction::Exit;
                }
                LoopAction::Continue
            }
            ControlEvent::KeyPressed(Key::Other) => LoopAction::Continue,
        }
    }

    /// Ask the display loop to stop. Idempotent.
    pub fn shutdown(&mut self) {
        if !self.shutdown_sent {
            self.shutdown_sent = true;
            // The display loop may already be gone
            let _ = self.commands.send(DisplayCommand::Shutdown);
        }
    }
}

impl<S> Drop for ControlLoop<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use split_loop::traits::{ControlEvent, DisplaySurface, EventPump, LoopAction, SurfaceSize, Wake};
use split_loop::{AppError, Color, Result};

/// Surface double that records what the display loop did to it
pub struct MockSurface {
    size: Mutex<SurfaceSize>,
    clears: Mutex<Vec<Color>>,
    presents: AtomicUsize,
    resizes: AtomicUsize,
    fail_after: Option<usize>,
}

impl MockSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Mutex::new(SurfaceSize::new(width, height).unwrap()),
            clears: Mutex::new(Vec::new()),
            presents: AtomicUsize::new(0),
            resizes: AtomicUsize::new(0),
            fail_after: None,
        }
    }

    /// Presents `frames` frames, then reports a lost device
    pub fn failing_after(width: u32, height: u32, frames: usize) -> Self {
        Self {
            fail_after: Some(frames),
            ..Self::new(width, height)
        }
    }

    pub fn clears(&self) -> Vec<Color> {
        self.clears.lock().unwrap().clone()
    }

    pub fn present_count(&self) -> usize {
        self.presents.load(Ordering::SeqCst)
    }

    pub fn resize_count(&self) -> usize {
        self.resizes.load(Ordering::SeqCst)
    }
}

impl DisplaySurface for MockSurface {
    fn size(&self) -> SurfaceSize {
        *self.size.lock().unwrap()
    }

    fn resize(&self, size: SurfaceSize) -> Result<()> {
        *self.size.lock().unwrap() = size;
        self.resizes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self, color: Color) -> Result<()> {
        self.clears.lock().unwrap().push(color);
        Ok(())
    }

    fn present(&self) -> Result<bool> {
        if self.fail_after.is_some_and(|limit| self.present_count() >= limit) {
            return Err(AppError::Present("device lost".into()));
        }
        self.presents.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }
}

/// Event pump fed from a channel, standing in for the windowing event loop
pub struct ScriptedPump {
    events: Receiver<ControlEvent>,
    sender: Sender<ControlEvent>,
}

impl ScriptedPump {
    /// Returns the pump and a sender for injecting window events
    pub fn new() -> (Self, Sender<ControlEvent>) {
        let (sender, events) = mpsc::channel();
        (
            Self {
                events,
                sender: sender.clone(),
            },
            sender,
        )
    }
}

pub struct ChannelWaker(Sender<ControlEvent>);

impl Wake for ChannelWaker {
    fn wake(&self) {
        let _ = self.0.send(ControlEvent::DisplayStopped);
    }
}

impl EventPump for ScriptedPump {
    type Waker = ChannelWaker;

    fn waker(&self) -> ChannelWaker {
        ChannelWaker(self.sender.clone())
    }

    fn pump<F>(self, mut handler: F) -> Result<()>
    where
        F: FnMut(ControlEvent) -> LoopAction,
    {
        let Self { events, sender } = self;
        drop(sender);
        for event in events.iter() {
            if handler(event) == LoopAction::Exit {
                break;
            }
        }
        Ok(())
    }
}

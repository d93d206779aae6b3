use crate::error::Result;

/// Keys the control loop distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Other,
}

/// Window events as seen by the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    CloseRequested,
    /// Raw new inner size; may be zero while minimized
    Resized { width: u32, height: u32 },
    KeyPressed(Key),
    /// The display loop has exited on its own
    DisplayStopped,
}

/// What the pump should do after handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    Continue,
    Exit,
}

/// Wakes a blocked event pump from another thread
pub trait Wake {
    /// Deliver [`ControlEvent::DisplayStopped`] to the pump
    fn wake(&self);
}

/// Source of control events, driven on the thread that owns the event loop
pub trait EventPump {
    type Waker: Wake + Send + 'static;

    /// Handle the display thread uses to wake this pump
    fn waker(&self) -> Self::Waker;

    /// Feed events to `handler` until it returns [`LoopAction::Exit`]
    /// or the source runs dry.
    fn pump<F>(self, handler: F) -> Result<()>
    where
        F: FnMut(ControlEvent) -> LoopAction;
}

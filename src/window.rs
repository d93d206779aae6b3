use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowAttributes, WindowButtons, WindowId},
};

use crate::config::{WindowSettings, WindowStyle};
use crate::error::{AppError, Result};
use crate::traits::{ControlEvent, EventPump, Key, LoopAction, Wake};

/// Events the display thread posts to the winit loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserEvent {
    DisplayStopped,
}

/// Map window settings onto winit attributes
pub fn window_attributes(settings: &WindowSettings) -> WindowAttributes {
    let style = settings.style;
    let size = PhysicalSize::new(settings.size.width(), settings.size.height());

    // A close button implies a title bar to put it in
    let decorated = style.intersects(WindowStyle::TITLEBAR | WindowStyle::CLOSE);
    let resizable = style.contains(WindowStyle::RESIZE);

    let mut buttons = WindowButtons::empty();
    if style.contains(WindowStyle::CLOSE) {
        buttons |= WindowButtons::CLOSE;
    }
    if decorated {
        buttons |= WindowButtons::MINIMIZE;
    }
    if resizable {
        buttons |= WindowButtons::MAXIMIZE;
    }

    let attributes = Window::default_attributes()
        .with_title(settings.title.clone())
        .with_inner_size(size)
        .with_resizable(resizable)
        .with_decorations(decorated)
        .with_enabled_buttons(buttons);

    if style.contains(WindowStyle::FULLSCREEN) {
        attributes.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attributes
    }
}

/// Build the window before the event loop starts running
pub fn create_window(
    event_loop: &EventLoop<UserEvent>,
    settings: &WindowSettings,
) -> Result<Arc<Window>> {
    // The window has to exist before the display thread starts, which is
    // before `run_app` hands out an `ActiveEventLoop`.
    #[allow(deprecated)]
    let window = event_loop
        .create_window(window_attributes(settings))
        .map_err(|e| AppError::SurfaceCreation(format!("window: {}", e)))?;
    Ok(Arc::new(window))
}

/// Translate a winit window event into a control event
pub fn translate(event: &WindowEvent) -> Option<ControlEvent> {
    match event {
        WindowEvent::CloseRequested | WindowEvent::Destroyed => Some(ControlEvent::CloseRequested),
        WindowEvent::Resized(size) => Some(ControlEvent::Resized {
            width: size.width,
            height: size.height,
        }),
        WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    state: ElementState::Pressed,
                    physical_key,
                    ..
                },
            ..
        } => Some(ControlEvent::KeyPressed(match physical_key {
            PhysicalKey::Code(KeyCode::Escape) => Key::Escape,
            _ => Key::Other,
        })),
        _ => None,
    }
}

/// Wakes the winit loop from the display thread
pub struct ProxyWaker(EventLoopProxy<UserEvent>);

impl Wake for ProxyWaker {
    fn wake(&self) {
        // Fails only if the loop already exited
        let _ = self.0.send_event(UserEvent::DisplayStopped);
    }
}

/// Event pump backed by the winit event loop; must run on the main thread
pub struct WinitPump {
    event_loop: EventLoop<UserEvent>,
}

impl WinitPump {
    pub fn new(event_loop: EventLoop<UserEvent>) -> Self {
        Self { event_loop }
    }
}

impl EventPump for WinitPump {
    type Waker = ProxyWaker;

    fn waker(&self) -> ProxyWaker {
        ProxyWaker(self.event_loop.create_proxy())
    }

    fn pump<F>(self, handler: F) -> Result<()>
    where
        F: FnMut(ControlEvent) -> LoopAction,
    {
        let mut dispatcher = Dispatcher { handler };
        self.event_loop.run_app(&mut dispatcher)?;
        Ok(())
    }
}

struct Dispatcher<F> {
    handler: F,
}

impl<F> Dispatcher<F>
where
    F: FnMut(ControlEvent) -> LoopAction,
{
    fn dispatch(&mut self, event_loop: &ActiveEventLoop, event: ControlEvent) {
        if (self.handler)(event) == LoopAction::Exit {
            event_loop.exit();
        }
    }
}

impl<F> ApplicationHandler<UserEvent> for Dispatcher<F>
where
    F: FnMut(ControlEvent) -> LoopAction,
{
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {
        // Window is created up front
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if let Some(event) = translate(&event) {
            self.dispatch(event_loop, event);
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::DisplayStopped => self.dispatch(event_loop, ControlEvent::DisplayStopped),
        }
    }
}

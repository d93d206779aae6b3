mod common;

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::{MockSurface, ScriptedPump};
use split_loop::config::{surface_dimensions, DEFAULT_HEIGHT, DEFAULT_RESX, DEFAULT_RESY, DEFAULT_WIDTH};
use split_loop::traits::{ControlEvent, DisplaySurface, EventPump, Key, SurfaceSize};
use split_loop::{App, AppError, Color, DisplayReport, WindowSettings};

const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

fn settings() -> WindowSettings {
    WindowSettings::from_constants().unwrap()
}

/// Run `app.start` on a helper thread and wait for it with a deadline
fn start_with_timeout(
    app: Arc<App<MockSurface>>,
    pump: ScriptedPump,
) -> split_loop::Result<DisplayReport> {
    let (done_tx, done_rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = done_tx.send(app.start(pump));
    });
    done_rx
        .recv_timeout(JOIN_TIMEOUT)
        .expect("loops did not terminate and join in time")
}

fn wait_for_frames(surface: &MockSurface, frames: usize) {
    let deadline = std::time::Instant::now() + JOIN_TIMEOUT;
    while surface.present_count() < frames {
        assert!(std::time::Instant::now() < deadline, "display loop made no progress");
        thread::sleep(Duration::from_millis(1));
    }
}

// ============================================================================
// Preconditions
// ============================================================================

#[test]
fn test_run_before_set_window_fails() {
    let app: App<MockSurface> = App::new(settings());
    let (pump, _events) = ScriptedPump::new();

    let err = app.run(pump).unwrap_err();
    assert!(matches!(err, AppError::WindowNotSet));
}

#[test]
fn test_display_before_set_window_fails() {
    let app: App<MockSurface> = App::new(settings());
    let (pump, _events) = ScriptedPump::new();
    let waker = pump.waker();

    let err = app.display(waker).unwrap_err();
    assert!(matches!(err, AppError::WindowNotSet));
}

#[test]
fn test_start_before_set_window_fails() {
    let app: App<MockSurface> = App::new(settings());
    let (pump, _events) = ScriptedPump::new();

    let err = app.start(pump).unwrap_err();
    assert!(matches!(err, AppError::WindowNotSet));
}

// ============================================================================
// Shared surface identity
// ============================================================================

#[test]
fn test_loops_share_one_surface() {
    let surface = Arc::new(MockSurface::new(800, 600));
    let mut app = App::new(settings());
    app.set_window(Arc::clone(&surface)).unwrap();

    assert!(Arc::ptr_eq(app.surface().unwrap(), &surface));

    let (tx, _rx) = mpsc::channel();
    let control = split_loop::core::ControlLoop::new(Arc::clone(app.surface().unwrap()), tx);
    assert!(Arc::ptr_eq(control.surface(), &surface));

    let app = Arc::new(app);
    let (pump, events) = ScriptedPump::new();
    let runner = {
        let app = Arc::clone(&app);
        thread::spawn(move || app.start(pump))
    };

    // The display loop draws on the very object handed to set_window
    wait_for_frames(&surface, 2);
    events.send(ControlEvent::CloseRequested).unwrap();
    runner.join().unwrap().unwrap();

    assert!(!surface.clears().is_empty());
}

#[test]
fn test_resize_reaches_display_surface() {
    let surface = Arc::new(MockSurface::new(800, 600));
    let mut app = App::new(settings());
    app.set_window(Arc::clone(&surface)).unwrap();
    let app = Arc::new(app);

    let (pump, events) = ScriptedPump::new();
    events
        .send(ControlEvent::Resized {
            width: 1280,
            height: 720,
        })
        .unwrap();

    let runner = {
        let app = Arc::clone(&app);
        thread::spawn(move || app.start(pump))
    };

    let deadline = std::time::Instant::now() + JOIN_TIMEOUT;
    while surface.resize_count() == 0 {
        assert!(std::time::Instant::now() < deadline, "resize never applied");
        thread::sleep(Duration::from_millis(1));
    }
    events.send(ControlEvent::KeyPressed(Key::Escape)).unwrap();
    runner.join().unwrap().unwrap();

    assert_eq!(surface.size(), SurfaceSize::new(1280, 720).unwrap());
}

// ============================================================================
// Termination
// ============================================================================

#[test]
fn test_close_joins_display_thread() {
    let surface = Arc::new(MockSurface::new(800, 600));
    let mut app = App::new(settings());
    app.set_window(surface).unwrap();

    let (pump, events) = ScriptedPump::new();
    events.send(ControlEvent::KeyPressed(Key::Other)).unwrap();
    events.send(ControlEvent::CloseRequested).unwrap();

    let report = start_with_timeout(Arc::new(app), pump).unwrap();
    assert!(report.elapsed < JOIN_TIMEOUT);
}

#[test]
fn test_display_failure_stops_control_loop() {
    let mut app = App::new(settings());
    app.set_window(Arc::new(MockSurface::failing_after(800, 600, 3)))
        .unwrap();

    // No close request ever arrives: the failing display loop has to wake
    // the control loop itself.
    let (pump, _events) = ScriptedPump::new();

    let err = start_with_timeout(Arc::new(app), pump).unwrap_err();
    assert!(matches!(err, AppError::Present(_)));
}

#[test]
fn test_escape_terminates() {
    let mut app = App::new(settings().with_framerate_limit(0));
    app.set_window(Arc::new(MockSurface::new(320, 240))).unwrap();

    let (pump, events) = ScriptedPump::new();
    events.send(ControlEvent::KeyPressed(Key::Escape)).unwrap();

    assert!(start_with_timeout(Arc::new(app), pump).is_ok());
}

#[test]
fn test_second_start_rejected() {
    let mut app = App::new(settings().with_framerate_limit(0));
    app.set_window(Arc::new(MockSurface::new(320, 240))).unwrap();
    let app = Arc::new(app);

    let (pump, events) = ScriptedPump::new();
    events.send(ControlEvent::CloseRequested).unwrap();
    start_with_timeout(Arc::clone(&app), pump).unwrap();

    // Nothing is running any more, but the owner is spent; the refused
    // display loop still wakes the control loop so the call returns
    let (pump, _events) = ScriptedPump::new();
    let err = start_with_timeout(app, pump).unwrap_err();
    assert!(matches!(err, AppError::DisplayAlreadyStarted));
    assert_eq!(err.to_string(), "display loop was already started on this owner");
}

// ============================================================================
// End to end
// ============================================================================

#[test]
fn test_default_startup_scenario() {
    let size = surface_dimensions(800, 600, 1.0, 1.0).unwrap();
    assert_eq!((size.width(), size.height()), (800, 600));
    assert_eq!(
        surface_dimensions(DEFAULT_WIDTH, DEFAULT_HEIGHT, DEFAULT_RESX, DEFAULT_RESY).unwrap(),
        size
    );

    let settings = settings();
    assert_eq!(settings.size, size);
    assert_eq!(settings.framerate_limit, 120);
    assert_eq!(settings.clear_color, Color::CYAN);

    let surface = Arc::new(MockSurface::new(size.width(), size.height()));
    let mut app = App::new(settings);
    app.set_window(Arc::clone(&surface)).unwrap();
    assert_eq!(app.settings().title, split_loop::config::WINDOW_TITLE);
    let app = Arc::new(app);

    let (pump, events) = ScriptedPump::new();
    let runner = {
        let app = Arc::clone(&app);
        thread::spawn(move || app.start(pump))
    };

    wait_for_frames(&surface, 3);
    events.send(ControlEvent::CloseRequested).unwrap();
    let report = runner.join().unwrap().unwrap();

    assert!(report.frames >= 3);
    let clears = surface.clears();
    assert!(clears.iter().all(|&c| c == Color::CYAN));
    // 120 fps cap: frames presented can't outrun the elapsed time by much
    let ceiling = report.elapsed.as_secs_f64() * 120.0 + 2.0;
    assert!((report.frames as f64) <= ceiling);
}

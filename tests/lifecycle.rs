// tests/lifecycle.rs

//! End-to-end lifecycle tests over the headless backend: the real two-thread
//! wiring of `run`, with events injected through the pump and output captured
//! by the recording display.

use pixel_core::platform::headless::create_with_handles;
use pixel_core::platform::WindowEvent;
use pixel_core::{run, ButtonState, Engine, EngineConfig, Game, Key};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use test_log::test;

fn small_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.name = String::from("lifecycle");
    config.screen.width = 8;
    config.screen.height = 8;
    config.screen.pixel_width = 1;
    config.screen.pixel_height = 1;
    config
}

#[derive(Default)]
struct GameLog {
    creates: usize,
    updates: usize,
    destroys: usize,
}

struct ScriptedGame {
    log: Arc<Mutex<GameLog>>,
    create_ok: bool,
    update_limit: usize,
    destroy_vetoes: usize,
}

impl ScriptedGame {
    fn new(create_ok: bool, update_limit: usize, destroy_vetoes: usize) -> (Self, Arc<Mutex<GameLog>>) {
        let log = Arc::new(Mutex::new(GameLog::default()));
        (
            ScriptedGame {
                log: Arc::clone(&log),
                create_ok,
                update_limit,
                destroy_vetoes,
            },
            log,
        )
    }
}

impl Game for ScriptedGame {
    fn on_create(&mut self, _engine: &mut Engine) -> bool {
        self.log.lock().unwrap().creates += 1;
        self.create_ok
    }

    fn on_update(&mut self, _engine: &mut Engine, _elapsed: f32) -> bool {
        let mut log = self.log.lock().unwrap();
        log.updates += 1;
        log.updates < self.update_limit
    }

    fn on_destroy(&mut self, _engine: &mut Engine) -> bool {
        self.log.lock().unwrap().destroys += 1;
        if self.destroy_vetoes > 0 {
            self.destroy_vetoes -= 1;
            false
        } else {
            true
        }
    }
}

#[test]
fn session_ends_when_the_update_stops_it() {
    let (pump, display, handles) = create_with_handles();
    let (game, log) = ScriptedGame::new(true, 4, 0);

    run(&small_config(), pump, display, game).unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log.creates, 1);
    assert_eq!(log.updates, 4);
    assert_eq!(log.destroys, 1);

    let recording = handles.recording.lock().unwrap();
    assert_eq!(recording.presents, 4);
    assert_eq!(recording.frames.len(), 4);
    assert_eq!(recording.frame_size, (8, 8));
    assert_eq!(recording.frames[0].len(), 8 * 8 * 4);
}

#[test]
fn refused_creation_destroys_and_presents_nothing() {
    let (pump, display, handles) = create_with_handles();
    let (game, log) = ScriptedGame::new(false, 100, 0);

    run(&small_config(), pump, display, game).unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log.creates, 1);
    assert_eq!(log.updates, 0);
    assert_eq!(log.destroys, 1);
    assert_eq!(handles.recording.lock().unwrap().presents, 0);
}

#[test]
fn vetoed_destruction_keeps_the_session_alive() {
    let (pump, display, handles) = create_with_handles();
    let (game, log) = ScriptedGame::new(true, 2, 1);

    run(&small_config(), pump, display, game).unwrap();

    // Two updates, a vetoed destroy, one further update, then the accepted
    // destroy.
    let log = log.lock().unwrap();
    assert_eq!(log.updates, 3);
    assert_eq!(log.destroys, 2);
    assert_eq!(handles.recording.lock().unwrap().presents, 3);
}

#[test]
fn close_request_shuts_down_an_endless_game() {
    let (pump, display, handles) = create_with_handles();
    // Never stops on its own.
    let (game, log) = ScriptedGame::new(true, usize::MAX, 0);

    let recording = Arc::clone(&handles.recording);
    let events = handles.events;
    let injector = thread::spawn(move || {
        // Let a few frames through first to prove the session was live.
        for _ in 0..5000 {
            if recording.lock().unwrap().presents >= 3 {
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }
        let _ = events.send(WindowEvent::CloseRequested);
    });

    run(&small_config(), pump, display, game).unwrap();
    injector.join().unwrap();

    let log = log.lock().unwrap();
    assert!(log.updates >= 3);
    assert_eq!(log.destroys, 1);
    assert!(handles.recording.lock().unwrap().presents >= 3);
}

/// Burns enough wall time per update that the once-per-second retitle
/// fires while the session is still running.
struct SlowGame {
    updates: usize,
}

impl Game for SlowGame {
    fn on_create(&mut self, _engine: &mut Engine) -> bool {
        true
    }

    fn on_update(&mut self, _engine: &mut Engine, _elapsed: f32) -> bool {
        thread::sleep(Duration::from_millis(300));
        self.updates += 1;
        self.updates < 6
    }
}

#[test]
fn a_slow_session_reports_fps_in_the_title() {
    let (pump, display, handles) = create_with_handles();

    run(&small_config(), pump, display, SlowGame { updates: 0 }).unwrap();

    let recording = handles.recording.lock().unwrap();
    assert_eq!(recording.presents, 6);
    assert!(!recording.titles.is_empty());
    assert!(recording.titles[0].starts_with("lifecycle - FPS: "));
}

/// Watches one key through the full wiring: pump thread to shared state to
/// the per-frame latch.
struct KeyWatchGame {
    pressed_edges: Arc<Mutex<usize>>,
    held_frames: usize,
    total_frames: usize,
}

impl Game for KeyWatchGame {
    fn on_create(&mut self, _engine: &mut Engine) -> bool {
        true
    }

    fn on_update(&mut self, engine: &mut Engine, _elapsed: f32) -> bool {
        self.total_frames += 1;
        let a: ButtonState = engine.key(Key::A);
        if a.pressed {
            *self.pressed_edges.lock().unwrap() += 1;
        }
        if a.held {
            self.held_frames += 1;
        }
        self.held_frames < 3 && self.total_frames < 10_000
    }
}

#[test]
fn a_held_key_presses_exactly_once() {
    let (pump, display, handles) = create_with_handles();
    let pressed_edges = Arc::new(Mutex::new(0));
    let game = KeyWatchGame {
        pressed_edges: Arc::clone(&pressed_edges),
        held_frames: 0,
        total_frames: 0,
    };

    handles
        .events
        .send(WindowEvent::KeyDown { key: Key::A })
        .unwrap();

    run(&small_config(), pump, display, game).unwrap();

    // The game stops after three held frames, so the key was seen; across
    // all of them the press edge fired exactly once.
    assert_eq!(*pressed_edges.lock().unwrap(), 1);
}

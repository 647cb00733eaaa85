// src/engine.rs

//! The engine facade and frame loop. [`Engine`] is what user code sees inside
//! its callbacks: the renderer surface plus latched input. [`FrameLoop`] owns
//! the lifecycle state machine that drives a [`Game`] from creation through
//! destruction at frame cadence, publishing each finished frame to a
//! [`Display`]. [`run`] wires both onto their threads.

use crate::config::EngineConfig;
use crate::input::{ButtonState, EngineState, InputLatch};
use crate::keys::{Key, MOUSE_BUTTON_COUNT};
use crate::pixel::{BlendMode, Pixel};
use crate::platform::{Display, EventPump};
use crate::renderer::{BlendFn, Renderer};
use crate::sprite::Sprite;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The user-provided application. All callbacks run on the frame loop
/// thread.
pub trait Game {
    /// Runs once before the first frame. Returning `false` aborts startup;
    /// the loop then proceeds straight to destruction.
    fn on_create(&mut self, engine: &mut Engine) -> bool;

    /// Runs once per frame with the seconds elapsed since the previous
    /// update. Returning `false` requests shutdown after this frame has
    /// been presented.
    fn on_update(&mut self, engine: &mut Engine, elapsed: f32) -> bool;

    /// Runs when the loop is stopping. Returning `false` vetoes the
    /// shutdown and updates resume.
    fn on_destroy(&mut self, engine: &mut Engine) -> bool {
        true
    }
}

/// The drawing and input surface handed to [`Game`] callbacks.
pub struct Engine {
    renderer: Renderer,
    keys: InputLatch<{ Key::COUNT }>,
    mouse: InputLatch<MOUSE_BUTTON_COUNT>,
    mouse_x: i32,
    mouse_y: i32,
    focused: bool,
}

impl Engine {
    fn new(width: i32, height: i32) -> Self {
        Engine {
            renderer: Renderer::new(width, height),
            keys: InputLatch::new(),
            mouse: InputLatch::new(),
            mouse_x: 0,
            mouse_y: 0,
            focused: true,
        }
    }

    // --- Screen and draw targets ---

    pub fn screen_width(&self) -> i32 {
        self.renderer.screen_width()
    }

    pub fn screen_height(&self) -> i32 {
        self.renderer.screen_height()
    }

    pub fn draw_target_width(&self) -> i32 {
        self.renderer.draw_target_width()
    }

    pub fn draw_target_height(&self) -> i32 {
        self.renderer.draw_target_height()
    }

    /// Binds a sprite as the draw target, or rebinds the screen with `None`.
    /// Returns the previously bound sprite, if any.
    pub fn set_draw_target(&mut self, target: Option<Sprite>) -> Option<Sprite> {
        self.renderer.set_draw_target(target)
    }

    /// The buffer draws currently land in.
    pub fn draw_target(&mut self) -> &mut Sprite {
        self.renderer.draw_target()
    }

    // --- Blending ---

    pub fn blend_mode(&self) -> BlendMode {
        self.renderer.blend_mode()
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.renderer.set_blend_mode(mode);
    }

    /// Installs a custom pixel combiner and switches to
    /// [`BlendMode::Custom`].
    pub fn set_blend_fn(&mut self, f: BlendFn) {
        self.renderer.set_blend_fn(f);
    }

    // --- Input ---

    /// The latched state of one keyboard key for this frame.
    pub fn key(&self, key: Key) -> ButtonState {
        self.keys.state(key as usize)
    }

    /// The latched state of one mouse button; 0 is left, 1 is right, 2 is
    /// middle.
    pub fn mouse(&self, button: usize) -> ButtonState {
        self.mouse.state(button)
    }

    /// Cursor x in screen pixel coordinates.
    pub fn mouse_x(&self) -> i32 {
        self.mouse_x
    }

    /// Cursor y in screen pixel coordinates.
    pub fn mouse_y(&self) -> i32 {
        self.mouse_y
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    // --- Drawing ---

    pub fn draw(&mut self, x: i32, y: i32, p: Pixel) {
        self.renderer.draw(x, y, p);
    }

    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, p: Pixel) {
        self.renderer.draw_line(x1, y1, x2, y2, p);
    }

    pub fn draw_circle(&mut self, x: i32, y: i32, radius: i32, p: Pixel) {
        self.renderer.draw_circle(x, y, radius, p);
    }

    pub fn fill_circle(&mut self, x: i32, y: i32, radius: i32, p: Pixel) {
        self.renderer.fill_circle(x, y, radius, p);
    }

    pub fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, p: Pixel) {
        self.renderer.draw_rect(x, y, w, h, p);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, p: Pixel) {
        self.renderer.fill_rect(x, y, w, h, p);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_triangle(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, x3: i32, y3: i32, p: Pixel) {
        self.renderer.draw_triangle(x1, y1, x2, y2, x3, y3, p);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn fill_triangle(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, x3: i32, y3: i32, p: Pixel) {
        self.renderer.fill_triangle(x1, y1, x2, y2, x3, y3, p);
    }

    pub fn draw_sprite(&mut self, x: i32, y: i32, sprite: &Sprite) {
        self.renderer.draw_sprite(x, y, sprite);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_partial_sprite(
        &mut self,
        x: i32,
        y: i32,
        sprite: &Sprite,
        ox: i32,
        oy: i32,
        w: i32,
        h: i32,
    ) {
        self.renderer.draw_partial_sprite(x, y, sprite, ox, oy, w, h);
    }

    /// Folds the shared raw input into this frame's latched states.
    fn latch_input(&mut self, state: &EngineState) {
        self.keys.update(&state.key_snapshot());
        self.mouse.update(&state.mouse_snapshot());
        let (x, y) = state.cursor();
        self.mouse_x = x;
        self.mouse_y = y;
        self.focused = state.focused();
    }

    fn screen_bytes(&self) -> &[u8] {
        self.renderer.screen().raw_bytes()
    }
}

/// Lifecycle phase of a [`FrameLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Nothing has run yet.
    NotStarted,
    /// The next tick runs the game's creation hook.
    Creating,
    /// Frames are being produced.
    Running,
    /// The next tick runs the game's destruction hook.
    Stopping,
    /// The loop is finished; further ticks do nothing.
    Terminated,
}

/// Reports the measured frame rate roughly once per second of accumulated
/// frame time.
struct FpsCounter {
    frames: u32,
    elapsed: f32,
}

impl FpsCounter {
    fn new() -> Self {
        FpsCounter {
            frames: 0,
            elapsed: 0.0,
        }
    }

    fn note_frame(&mut self, elapsed: f32) -> Option<f32> {
        self.frames += 1;
        self.elapsed += elapsed;
        if self.elapsed >= 1.0 {
            let fps = self.frames as f32 / self.elapsed;
            self.frames = 0;
            self.elapsed = 0.0;
            Some(fps)
        } else {
            None
        }
    }
}

/// Drives one [`Game`] through its lifecycle, producing a frame per tick
/// while running.
///
/// The loop advances [`LoopState`] one step per [`FrameLoop::tick`]:
/// creation, then updates until the game or the shared active flag calls a
/// halt, then destruction. A destruction hook returning `false` puts the
/// loop straight back into the running state.
pub struct FrameLoop<D: Display, G: Game> {
    engine: Engine,
    game: G,
    display: D,
    shared: Arc<EngineState>,
    state: LoopState,
    name: String,
    frame_budget: Option<Duration>,
    last_instant: Instant,
    fps: FpsCounter,
}

impl<D: Display, G: Game> FrameLoop<D, G> {
    pub fn new(config: &EngineConfig, shared: Arc<EngineState>, display: D, game: G) -> Self {
        FrameLoop {
            engine: Engine::new(config.screen.width, config.screen.height),
            game,
            display,
            shared,
            state: LoopState::NotStarted,
            name: config.name.clone(),
            frame_budget: config.max_fps.map(|fps| Duration::from_secs(1) / fps),
            last_instant: Instant::now(),
            fps: FpsCounter::new(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Advances the lifecycle by one step.
    ///
    /// # Errors
    ///
    /// Fails when the display rejects an upload or present, which ends the
    /// session regardless of lifecycle phase.
    pub fn tick(&mut self) -> Result<()> {
        match self.state {
            LoopState::NotStarted => {
                self.state = LoopState::Creating;
            }
            LoopState::Creating => {
                if self.game.on_create(&mut self.engine) {
                    info!("FrameLoop: created, entering update loop");
                    self.last_instant = Instant::now();
                    self.state = LoopState::Running;
                } else {
                    // A refused creation still gets its destruction hook.
                    warn!("FrameLoop: creation refused, stopping");
                    self.shared.set_active(false);
                    self.state = LoopState::Stopping;
                }
            }
            LoopState::Running => {
                if !self.shared.active() {
                    debug!("FrameLoop: deactivated externally, stopping");
                    self.state = LoopState::Stopping;
                    return Ok(());
                }

                let now = Instant::now();
                let elapsed = now.duration_since(self.last_instant).as_secs_f32();
                self.last_instant = now;

                self.engine.latch_input(&self.shared);
                let keep_running = self.game.on_update(&mut self.engine, elapsed);

                // The frame is published even when this update asked to
                // stop, so the last thing drawn is the last thing shown.
                let width = self.engine.screen_width();
                let height = self.engine.screen_height();
                self.display
                    .upload_frame(self.engine.screen_bytes(), width, height)?;
                self.display.present()?;

                if let Some(fps) = self.fps.note_frame(elapsed) {
                    self.display
                        .set_title(&format!("{} - FPS: {:.2}", self.name, fps));
                }

                if !keep_running {
                    debug!("FrameLoop: update requested stop");
                    self.shared.set_active(false);
                    self.state = LoopState::Stopping;
                }
            }
            LoopState::Stopping => {
                if self.game.on_destroy(&mut self.engine) {
                    info!("FrameLoop: destroyed, terminating");
                    self.state = LoopState::Terminated;
                } else {
                    info!("FrameLoop: destruction vetoed, resuming");
                    self.shared.set_active(true);
                    self.last_instant = Instant::now();
                    self.state = LoopState::Running;
                }
            }
            LoopState::Terminated => {}
        }
        Ok(())
    }

    /// Drives the lifecycle to completion, sleeping off any unused frame
    /// budget when a rate cap is configured.
    ///
    /// # Errors
    ///
    /// Fails when any tick fails.
    pub fn run(&mut self) -> Result<()> {
        while self.state != LoopState::Terminated {
            let frame_started = Instant::now();
            self.tick()?;
            if self.state == LoopState::Running {
                if let Some(budget) = self.frame_budget {
                    let spent = frame_started.elapsed();
                    if spent < budget {
                        std::thread::sleep(budget - spent);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Runs a game against an already-created backend.
///
/// The event pump keeps the calling thread; frames are produced on a
/// dedicated thread that owns the display. The pump decides when its loop is
/// over (the bundled backends exit once the display is dropped at the end of
/// the frame loop), after which the frame thread's verdict is returned.
///
/// # Errors
///
/// Fails when the configuration is invalid, the frame thread cannot be
/// spawned or panics, or the frame loop itself fails.
pub fn run<P, D, G>(config: &EngineConfig, pump: P, display: D, game: G) -> Result<()>
where
    P: EventPump,
    D: Display + 'static,
    G: Game + Send + 'static,
{
    config.validate()?;
    info!(
        "Engine: starting '{}' at {}x{}",
        config.name, config.screen.width, config.screen.height
    );

    let shared = Arc::new(EngineState::new());
    let loop_shared = Arc::clone(&shared);
    let loop_config = config.clone();

    let frame_thread = std::thread::Builder::new()
        .name(String::from("frame-loop"))
        .spawn(move || {
            let mut frame_loop = FrameLoop::new(&loop_config, loop_shared, display, game);
            frame_loop.run()
        })
        .context("Failed to spawn frame loop thread")?;

    let mut on_event = |event| shared.apply(event);
    pump.run(&mut on_event);

    let result = frame_thread
        .join()
        .map_err(|_| anyhow::anyhow!("frame loop thread panicked"))?;
    info!("Engine: '{}' shut down", config.name);
    result
}

/// Creates the default window backend for `config` and runs a game in it.
///
/// # Errors
///
/// Fails when the window cannot be created, plus everything [`run`] can
/// fail with.
#[cfg(feature = "minifb")]
pub fn run_windowed<G>(config: &EngineConfig, game: G) -> Result<()>
where
    G: Game + Send + 'static,
{
    use crate::platform::minifb::MinifbBackend;
    use crate::platform::Backend;

    config.validate()?;
    let (pump, display) = MinifbBackend::create(config)?;
    run(config, pump, display, game)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::WindowEvent;
    use std::sync::Mutex;
    use test_log::test; // For logging within tests

    fn test_config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.name = String::from("harness");
        config.screen.width = 8;
        config.screen.height = 8;
        config.screen.pixel_width = 1;
        config.screen.pixel_height = 1;
        config
    }

    #[derive(Default)]
    struct DisplayLog {
        uploads: usize,
        presents: usize,
        titles: Vec<String>,
    }

    struct MockDisplay {
        log: Arc<Mutex<DisplayLog>>,
    }

    fn mock_display() -> (MockDisplay, Arc<Mutex<DisplayLog>>) {
        let log = Arc::new(Mutex::new(DisplayLog::default()));
        (
            MockDisplay {
                log: Arc::clone(&log),
            },
            log,
        )
    }

    impl Display for MockDisplay {
        fn upload_frame(&mut self, bytes: &[u8], width: i32, height: i32) -> Result<()> {
            assert_eq!(bytes.len(), (width * height * 4) as usize);
            self.log.lock().unwrap().uploads += 1;
            Ok(())
        }

        fn present(&mut self) -> Result<()> {
            self.log.lock().unwrap().presents += 1;
            Ok(())
        }

        fn set_title(&mut self, title: &str) {
            self.log.lock().unwrap().titles.push(title.to_string());
        }
    }

    #[derive(Default)]
    struct GameLog {
        creates: usize,
        updates: usize,
        destroys: usize,
    }

    /// Returns `true` from updates until `update_limit` is reached, and
    /// `false` from the first `destroy_vetoes` destruction calls.
    struct ScriptedGame {
        log: Arc<Mutex<GameLog>>,
        create_ok: bool,
        update_limit: usize,
        destroy_vetoes: usize,
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
    fn loop_walks_create_update_destroy() {
        let (display, display_log) = mock_display();
        let game_log = Arc::new(Mutex::new(GameLog::default()));
        let game = ScriptedGame {
            log: Arc::clone(&game_log),
            create_ok: true,
            update_limit: 3,
            destroy_vetoes: 0,
        };
        let shared = Arc::new(EngineState::new());
        let mut frame_loop = FrameLoop::new(&test_config(), shared, display, game);

        assert_eq!(frame_loop.state(), LoopState::NotStarted);
        frame_loop.run().unwrap();
        assert_eq!(frame_loop.state(), LoopState::Terminated);

        let game_log = game_log.lock().unwrap();
        assert_eq!(game_log.creates, 1);
        assert_eq!(game_log.updates, 3);
        assert_eq!(game_log.destroys, 1);

        // Every update's frame reached the display, including the final one
        // whose update asked to stop.
        let display_log = display_log.lock().unwrap();
        assert_eq!(display_log.uploads, 3);
        assert_eq!(display_log.presents, 3);
    }

    #[test]
    fn refused_creation_still_runs_destruction() {
        let (display, display_log) = mock_display();
        let game_log = Arc::new(Mutex::new(GameLog::default()));
        let game = ScriptedGame {
            log: Arc::clone(&game_log),
            create_ok: false,
            update_limit: 100,
            destroy_vetoes: 0,
        };
        let shared = Arc::new(EngineState::new());
        let mut frame_loop = FrameLoop::new(&test_config(), Arc::clone(&shared), display, game);

        frame_loop.run().unwrap();

        let game_log = game_log.lock().unwrap();
        assert_eq!(game_log.creates, 1);
        assert_eq!(game_log.updates, 0);
        assert_eq!(game_log.destroys, 1);
        assert!(!shared.active());
        assert_eq!(display_log.lock().unwrap().presents, 0);
    }

    #[test]
    fn external_deactivation_stops_without_an_update() {
        let (display, display_log) = mock_display();
        let game_log = Arc::new(Mutex::new(GameLog::default()));
        let game = ScriptedGame {
            log: Arc::clone(&game_log),
            create_ok: true,
            update_limit: 100,
            destroy_vetoes: 0,
        };
        let shared = Arc::new(EngineState::new());
        let mut frame_loop = FrameLoop::new(&test_config(), Arc::clone(&shared), display, game);

        frame_loop.tick().unwrap();
        assert_eq!(frame_loop.state(), LoopState::Creating);
        frame_loop.tick().unwrap();
        assert_eq!(frame_loop.state(), LoopState::Running);

        shared.set_active(false);
        frame_loop.tick().unwrap();
        assert_eq!(frame_loop.state(), LoopState::Stopping);
        frame_loop.tick().unwrap();
        assert_eq!(frame_loop.state(), LoopState::Terminated);

        let game_log = game_log.lock().unwrap();
        assert_eq!(game_log.updates, 0);
        assert_eq!(game_log.destroys, 1);
        assert_eq!(display_log.lock().unwrap().presents, 0);
    }

    #[test]
    fn vetoed_destruction_resumes_updates() {
        let (display, display_log) = mock_display();
        let game_log = Arc::new(Mutex::new(GameLog::default()));
        let game = ScriptedGame {
            log: Arc::clone(&game_log),
            create_ok: true,
            update_limit: 2,
            destroy_vetoes: 1,
        };
        let shared = Arc::new(EngineState::new());
        let mut frame_loop = FrameLoop::new(&test_config(), Arc::clone(&shared), display, game);

        frame_loop.run().unwrap();
        assert_eq!(frame_loop.state(), LoopState::Terminated);

        // Two updates, one vetoed destroy, one more update, then the real
        // destroy.
        let game_log = game_log.lock().unwrap();
        assert_eq!(game_log.updates, 3);
        assert_eq!(game_log.destroys, 2);
        assert_eq!(display_log.lock().unwrap().presents, 3);
        assert!(!shared.active());
    }

    /// Records the latched state of one key on every update.
    struct KeyProbeGame {
        states: Arc<Mutex<Vec<ButtonState>>>,
        update_limit: usize,
        seen: usize,
    }

    impl Game for KeyProbeGame {
        fn on_create(&mut self, _engine: &mut Engine) -> bool {
            true
        }

        fn on_update(&mut self, engine: &mut Engine, _elapsed: f32) -> bool {
            self.states.lock().unwrap().push(engine.key(Key::A));
            self.seen += 1;
            self.seen < self.update_limit
        }
    }

    #[test]
    fn key_edges_latch_once_per_frame() {
        let (display, _display_log) = mock_display();
        let states = Arc::new(Mutex::new(Vec::new()));
        let game = KeyProbeGame {
            states: Arc::clone(&states),
            update_limit: 3,
            seen: 0,
        };
        let shared = Arc::new(EngineState::new());
        shared.apply(WindowEvent::KeyDown { key: Key::A });

        let mut frame_loop = FrameLoop::new(&test_config(), shared, display, game);
        frame_loop.run().unwrap();

        let states = states.lock().unwrap();
        assert_eq!(states.len(), 3);
        assert!(states[0].pressed && states[0].held);
        assert!(!states[1].pressed && states[1].held);
        assert!(!states[2].pressed && states[2].held);
    }

    #[test]
    fn engine_latches_cursor_focus_and_buttons() {
        let state = EngineState::new();
        state.apply(WindowEvent::PointerMoved { x: 5, y: 7 });
        state.apply(WindowEvent::FocusLost);
        state.apply(WindowEvent::MouseDown { button: 1 });

        let mut engine = Engine::new(8, 8);
        engine.latch_input(&state);

        assert_eq!((engine.mouse_x(), engine.mouse_y()), (5, 7));
        assert!(!engine.is_focused());
        assert!(engine.mouse(1).pressed && engine.mouse(1).held);
        assert!(!engine.mouse(0).held);
    }

    #[test]
    fn engine_surface_reaches_the_renderer() {
        let mut engine = Engine::new(8, 8);
        engine.fill_rect(0, 0, 3, 3, Pixel::RED);
        assert_eq!(engine.draw_target().pixel(1, 1), Pixel::RED);
        assert_eq!(engine.screen_bytes().len(), 8 * 8 * 4);

        engine.set_blend_mode(BlendMode::Mask);
        assert_eq!(engine.blend_mode(), BlendMode::Mask);
    }

    #[test]
    fn fps_counter_reports_once_per_second() {
        let mut counter = FpsCounter::new();
        assert_eq!(counter.note_frame(0.5), None);
        assert_eq!(counter.note_frame(0.5), Some(2.0));
        assert_eq!(counter.note_frame(0.25), None);
    }
}

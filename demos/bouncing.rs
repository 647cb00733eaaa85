// demos/bouncing.rs

//! A ball bouncing around a walled arena, with an alpha-blended motion
//! trail. Space pauses, escape quits.

use anyhow::Result;
use env_logger::Env;
use log::info;
use pixel_core::{run_windowed, BlendMode, Engine, EngineConfig, Game, Key, Pixel};

const RADIUS: i32 = 5;

struct Bouncing {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    paused: bool,
}

impl Bouncing {
    fn new() -> Self {
        Bouncing {
            x: 40.0,
            y: 30.0,
            vx: 55.0,
            vy: 38.0,
            paused: false,
        }
    }
}

impl Game for Bouncing {
    fn on_create(&mut self, engine: &mut Engine) -> bool {
        info!(
            "Bouncing: arena is {}x{}",
            engine.screen_width(),
            engine.screen_height()
        );
        engine.fill_rect(
            0,
            0,
            engine.screen_width(),
            engine.screen_height(),
            Pixel::VERY_DARK_BLUE,
        );
        true
    }

    fn on_update(&mut self, engine: &mut Engine, elapsed: f32) -> bool {
        if engine.key(Key::Escape).pressed {
            return false;
        }
        if engine.key(Key::Space).pressed {
            self.paused = !self.paused;
            info!("Bouncing: {}", if self.paused { "paused" } else { "resumed" });
        }

        let width = engine.screen_width();
        let height = engine.screen_height();

        if !self.paused {
            self.x += self.vx * elapsed;
            self.y += self.vy * elapsed;

            let min = (1 + RADIUS) as f32;
            if self.x < min || self.x > (width - 2 - RADIUS) as f32 {
                self.vx = -self.vx;
                self.x = self.x.clamp(min, (width - 2 - RADIUS) as f32);
            }
            if self.y < min || self.y > (height - 2 - RADIUS) as f32 {
                self.vy = -self.vy;
                self.y = self.y.clamp(min, (height - 2 - RADIUS) as f32);
            }
        }

        // Fade the previous frame instead of clearing it, leaving a trail.
        engine.set_blend_mode(BlendMode::Alpha);
        engine.fill_rect(0, 0, width, height, Pixel::rgba(0, 0, 32, 48));
        engine.set_blend_mode(BlendMode::Normal);

        engine.draw_rect(0, 0, width - 1, height - 1, Pixel::GREY);
        engine.fill_circle(self.x as i32, self.y as i32, RADIUS, Pixel::YELLOW);
        engine.draw_circle(self.x as i32, self.y as i32, RADIUS, Pixel::DARK_YELLOW);

        true
    }

    fn on_destroy(&mut self, _engine: &mut Engine) -> bool {
        info!("Bouncing: goodbye");
        true
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let mut config = EngineConfig::default();
    config.name = String::from("bouncing");
    config.screen.width = 160;
    config.screen.height = 120;
    config.screen.pixel_width = 4;
    config.screen.pixel_height = 4;
    config.max_fps = Some(120);

    run_windowed(&config, Bouncing::new())
}

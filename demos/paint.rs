// demos/paint.rs

//! A small painting program. Draw with the left button, erase with the
//! right, pick colors with the number keys or by clicking the palette bar,
//! clear with C, quit with escape.
//!
//! Strokes land on an off-screen canvas bound as the draw target, which is
//! then blitted under the UI every frame.

use anyhow::Result;
use env_logger::Env;
use log::info;
use pixel_core::{run_windowed, Engine, EngineConfig, Game, Key, Pixel, Sprite};

const PALETTE: [Pixel; 8] = [
    Pixel::BLACK,
    Pixel::RED,
    Pixel::YELLOW,
    Pixel::GREEN,
    Pixel::CYAN,
    Pixel::BLUE,
    Pixel::MAGENTA,
    Pixel::DARK_GREY,
];

const PALETTE_KEYS: [Key; 8] = [
    Key::Num1,
    Key::Num2,
    Key::Num3,
    Key::Num4,
    Key::Num5,
    Key::Num6,
    Key::Num7,
    Key::Num8,
];

const SWATCH: i32 = 12;
const BAR_HEIGHT: i32 = 10;

struct Paint {
    canvas: Option<Sprite>,
    color: usize,
    last_cursor: (i32, i32),
}

impl Paint {
    fn new() -> Self {
        Paint {
            canvas: None,
            color: 0,
            last_cursor: (0, 0),
        }
    }

    fn blank_canvas(width: i32, height: i32) -> Sprite {
        let mut canvas = Sprite::new(width, height);
        for y in 0..height {
            for x in 0..width {
                canvas.set_pixel(x, y, Pixel::WHITE);
            }
        }
        canvas
    }

    /// One brush dab: a filled circle with a line back to the previous
    /// cursor position so fast strokes stay connected.
    fn stroke(engine: &mut Engine, from: (i32, i32), to: (i32, i32), color: Pixel) {
        engine.draw_line(from.0, from.1, to.0, to.1, color);
        engine.fill_circle(to.0, to.1, 1, color);
    }
}

impl Game for Paint {
    fn on_create(&mut self, engine: &mut Engine) -> bool {
        info!(
            "Paint: canvas is {}x{}",
            engine.screen_width(),
            engine.screen_height()
        );
        self.canvas = Some(Self::blank_canvas(
            engine.screen_width(),
            engine.screen_height(),
        ));
        true
    }

    fn on_update(&mut self, engine: &mut Engine, _elapsed: f32) -> bool {
        if engine.key(Key::Escape).pressed {
            return false;
        }

        let width = engine.screen_width();
        let height = engine.screen_height();
        let cursor = (engine.mouse_x(), engine.mouse_y());
        let in_bar = cursor.1 >= height - BAR_HEIGHT;

        for (i, &key) in PALETTE_KEYS.iter().enumerate() {
            if engine.key(key).pressed {
                self.color = i;
            }
        }
        if engine.mouse(0).pressed && in_bar {
            let index = (cursor.0 / SWATCH) as usize;
            if index < PALETTE.len() {
                self.color = index;
            }
        }

        let mut canvas = match self.canvas.take() {
            Some(canvas) => canvas,
            None => return false,
        };

        if engine.key(Key::C).pressed {
            info!("Paint: canvas cleared");
            canvas = Self::blank_canvas(width, height);
        }

        // Paint onto the canvas, not the screen, so the UI never smears
        // into the drawing.
        engine.set_draw_target(Some(canvas));
        if !in_bar {
            if engine.mouse(0).held {
                Self::stroke(engine, self.last_cursor, cursor, PALETTE[self.color]);
            }
            if engine.mouse(1).held {
                Self::stroke(engine, self.last_cursor, cursor, Pixel::WHITE);
            }
        }
        let canvas = match engine.set_draw_target(None) {
            Some(canvas) => canvas,
            None => return false,
        };

        engine.draw_sprite(0, 0, &canvas);
        self.canvas = Some(canvas);
        self.last_cursor = cursor;

        // Palette bar with a marker over the selected swatch.
        engine.fill_rect(0, height - BAR_HEIGHT, width, BAR_HEIGHT, Pixel::GREY);
        for (i, &color) in PALETTE.iter().enumerate() {
            let x = i as i32 * SWATCH;
            engine.fill_rect(x + 1, height - BAR_HEIGHT + 1, SWATCH - 2, BAR_HEIGHT - 2, color);
        }
        let marker_x = self.color as i32 * SWATCH + SWATCH / 2;
        engine.fill_triangle(
            marker_x - 3,
            height - BAR_HEIGHT - 1,
            marker_x + 3,
            height - BAR_HEIGHT - 1,
            marker_x,
            height - BAR_HEIGHT + 2,
            Pixel::BLACK,
        );

        // Crosshair cursor.
        engine.draw_line(cursor.0 - 3, cursor.1, cursor.0 + 3, cursor.1, Pixel::DARK_GREY);
        engine.draw_line(cursor.0, cursor.1 - 3, cursor.0, cursor.1 + 3, Pixel::DARK_GREY);

        true
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let mut config = EngineConfig::default();
    config.name = String::from("paint");
    config.screen.width = 240;
    config.screen.height = 160;
    config.screen.pixel_width = 4;
    config.screen.pixel_height = 4;
    config.max_fps = Some(120);

    run_windowed(&config, Paint::new())
}

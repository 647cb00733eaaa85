// src/renderer.rs

//! The compositor and rasterizer. A `Renderer` owns the primary screen buffer
//! and an optional secondary draw target, applies the active blend policy
//! through a single write path, and rasterizes every primitive with integer
//! incremental algorithms on top of that path.

use crate::pixel::{BlendMode, Pixel};
use crate::sprite::Sprite;
use log::trace;

/// A user-installed pixel combiner for `BlendMode::Custom`. Called with the
/// target coordinates, the incoming pixel, and the pixel currently stored.
pub type BlendFn = Box<dyn FnMut(i32, i32, Pixel, Pixel) -> Pixel>;

/// Owns the pixel buffers and draw state for one engine instance.
///
/// The primary screen buffer exists for the renderer's whole life, so there is
/// always a bound draw target. A secondary target is moved in and out with
/// [`Renderer::set_draw_target`], which transfers ownership instead of
/// aliasing the buffer between caller and renderer.
pub struct Renderer {
    screen: Sprite,
    target: Option<Sprite>,
    blend_mode: BlendMode,
    blend_fn: Option<BlendFn>,
}

impl Renderer {
    /// Creates a renderer with a cleared screen buffer of the given size.
    pub fn new(screen_width: i32, screen_height: i32) -> Self {
        Renderer {
            screen: Sprite::new(screen_width, screen_height),
            target: None,
            blend_mode: BlendMode::Normal,
            blend_fn: None,
        }
    }

    /// The primary screen buffer, regardless of the bound draw target.
    pub fn screen(&self) -> &Sprite {
        &self.screen
    }

    pub fn screen_width(&self) -> i32 {
        self.screen.width()
    }

    pub fn screen_height(&self) -> i32 {
        self.screen.height()
    }

    /// Binds `target` as the active draw buffer, or rebinds the primary
    /// screen when given `None`. Returns the previously bound secondary
    /// target so the caller can recover a sprite it moved in earlier.
    pub fn set_draw_target(&mut self, target: Option<Sprite>) -> Option<Sprite> {
        trace!(
            "Renderer: draw target {}",
            if target.is_some() { "bound" } else { "reset to screen" }
        );
        std::mem::replace(&mut self.target, target)
    }

    /// The buffer draws currently land in.
    pub fn draw_target(&mut self) -> &mut Sprite {
        self.active_mut()
    }

    pub fn draw_target_width(&self) -> i32 {
        self.active().width()
    }

    pub fn draw_target_height(&self) -> i32 {
        self.active().height()
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend_mode = mode;
    }

    /// Installs a custom pixel combiner and switches to `BlendMode::Custom`.
    /// Switch the mode back explicitly to stop using it.
    pub fn set_blend_fn(&mut self, f: BlendFn) {
        self.blend_fn = Some(f);
        self.blend_mode = BlendMode::Custom;
    }

    fn active(&self) -> &Sprite {
        self.target.as_ref().unwrap_or(&self.screen)
    }

    fn active_mut(&mut self) -> &mut Sprite {
        self.target.as_mut().unwrap_or(&mut self.screen)
    }

    /// Writes one pixel through the active blend mode.
    ///
    /// Exactly one target write happens per call; bounds enforcement is left
    /// to the buffer itself, so out-of-range coordinates are safe no-ops.
    pub fn draw(&mut self, x: i32, y: i32, p: Pixel) {
        match self.blend_mode {
            BlendMode::Normal => self.active_mut().set_pixel(x, y, p),
            BlendMode::Mask => {
                // Opaque sources are discarded under Mask; see BlendMode docs.
                if p.a != 255 {
                    self.active_mut().set_pixel(x, y, p);
                }
            }
            BlendMode::Alpha => {
                let d = self.active().pixel(x, y);
                let a = f32::from(p.a) / 255.0;
                let c = 1.0 - a;
                let r = a * f32::from(p.r) + c * f32::from(d.r);
                let g = a * f32::from(p.g) + c * f32::from(d.g);
                let b = a * f32::from(p.b) + c * f32::from(d.b);
                // The blended pixel is written opaque; destination alpha is
                // not propagated.
                self.active_mut()
                    .set_pixel(x, y, Pixel::new(r as u8, g as u8, b as u8));
            }
            BlendMode::Custom => {
                let d = self.active().pixel(x, y);
                let out = match self.blend_fn.as_mut() {
                    Some(f) => f(x, y, p, d),
                    None => p,
                };
                self.active_mut().set_pixel(x, y, out);
            }
        }
    }

    /// Draws a line between two points, both endpoints included.
    ///
    /// Integer incremental stepping: shallow lines walk x and accumulate y
    /// error, steep lines walk y and accumulate x error, so swapping the
    /// endpoints yields the identical pixel set.
    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, p: Pixel) {
        let dx = x2 - x1;
        let dy = y2 - y1;
        let dx1 = dx.abs();
        let dy1 = dy.abs();
        let mut px = 2 * dy1 - dx1;
        let mut py = 2 * dx1 - dy1;

        if dy1 <= dx1 {
            // Shallow: step along x from the leftmost endpoint.
            let (mut x, mut y, xe) = if dx >= 0 { (x1, y1, x2) } else { (x2, y2, x1) };
            self.draw(x, y, p);
            while x < xe {
                x += 1;
                if px < 0 {
                    px += 2 * dy1;
                } else {
                    if (dx < 0 && dy < 0) || (dx > 0 && dy > 0) {
                        y += 1;
                    } else {
                        y -= 1;
                    }
                    px += 2 * (dy1 - dx1);
                }
                self.draw(x, y, p);
            }
        } else {
            // Steep: step along y from the topmost endpoint.
            let (mut x, mut y, ye) = if dy >= 0 { (x1, y1, y2) } else { (x2, y2, y1) };
            self.draw(x, y, p);
            while y < ye {
                y += 1;
                if py <= 0 {
                    py += 2 * dx1;
                } else {
                    if (dx < 0 && dy < 0) || (dx > 0 && dy > 0) {
                        x += 1;
                    } else {
                        x -= 1;
                    }
                    py += 2 * (dx1 - dy1);
                }
                self.draw(x, y, p);
            }
        }
    }

    /// Draws a circle outline with the midpoint algorithm, plotting eight
    /// reflected points per step. A non-positive radius draws nothing.
    pub fn draw_circle(&mut self, x: i32, y: i32, radius: i32, p: Pixel) {
        if radius == 0 {
            return;
        }
        let mut x0 = 0;
        let mut y0 = radius;
        let mut d = 3 - 2 * radius;

        while y0 >= x0 {
            self.draw(x - x0, y - y0, p);
            self.draw(x - y0, y - x0, p);
            self.draw(x + y0, y - x0, p);
            self.draw(x + x0, y - y0, p);
            self.draw(x - x0, y + y0, p);
            self.draw(x - y0, y + x0, p);
            self.draw(x + y0, y + x0, p);
            self.draw(x + x0, y + y0, p);
            if d < 0 {
                d += 4 * x0 + 6;
                x0 += 1;
            } else {
                d += 4 * (x0 - y0) + 10;
                x0 += 1;
                y0 -= 1;
            }
        }
    }

    /// Fills a circle with the same midpoint stepping as the outline, writing
    /// four inclusive horizontal spans per step. The result covers every
    /// pixel the outline would plot.
    pub fn fill_circle(&mut self, x: i32, y: i32, radius: i32, p: Pixel) {
        if radius == 0 {
            return;
        }
        let mut x0 = 0;
        let mut y0 = radius;
        let mut d = 3 - 2 * radius;

        while y0 >= x0 {
            self.scanline(x - x0, x + x0, y - y0, p);
            self.scanline(x - y0, x + y0, y - x0, p);
            self.scanline(x - x0, x + x0, y + y0, p);
            self.scanline(x - y0, x + y0, y + x0, p);
            if d < 0 {
                d += 4 * x0 + 6;
                x0 += 1;
            } else {
                d += 4 * (x0 - y0) + 10;
                x0 += 1;
                y0 -= 1;
            }
        }
    }

    /// Draws a rectangle outline as four lines around the perimeter.
    pub fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, p: Pixel) {
        self.draw_line(x, y, x + w, y, p);
        self.draw_line(x + w, y, x + w, y + h, p);
        self.draw_line(x + w, y + h, x, y + h, p);
        self.draw_line(x, y + h, x, y, p);
    }

    /// Fills the rectangle spanning `(x, y)` to `(x + w, y + h)` exclusive.
    ///
    /// Both corners are clamped against the *primary screen's* dimensions,
    /// not the bound target's. With a secondary target larger than the screen
    /// the fill truncates at the screen extents; smaller targets are already
    /// protected by the buffer's own bounds checks. The coupling is
    /// intentional.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, p: Pixel) {
        let sw = self.screen.width();
        let sh = self.screen.height();

        let x2 = (x + w).clamp(0, sw);
        let y2 = (y + h).clamp(0, sh);
        let x1 = x.clamp(0, sw);
        let y1 = y.clamp(0, sh);

        for i in x1..x2 {
            for j in y1..y2 {
                self.draw(i, j, p);
            }
        }
    }

    /// Draws a triangle outline as three lines between the vertex pairs.
    pub fn draw_triangle(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        x3: i32,
        y3: i32,
        p: Pixel,
    ) {
        self.draw_line(x1, y1, x2, y2, p);
        self.draw_line(x2, y2, x3, y3, p);
        self.draw_line(x3, y3, x1, y1, p);
    }

    /// Fills a triangle with scanline rasterization.
    ///
    /// The vertices are sorted ascending by y, then two edge walkers track
    /// the left and right bounds with integer error accumulation, swapping
    /// axes for edges steeper than 45 degrees. Each scanline paints one
    /// inclusive span between the walker extremes; a flat top skips straight
    /// to the lower half. Collinear or zero-area input stays within the
    /// bounding line and never faults.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_triangle(
        &mut self,
        mut x1: i32,
        mut y1: i32,
        mut x2: i32,
        mut y2: i32,
        mut x3: i32,
        mut y3: i32,
        p: Pixel,
    ) {
        // Sort vertices ascending by y.
        if y1 > y2 {
            std::mem::swap(&mut y1, &mut y2);
            std::mem::swap(&mut x1, &mut x2);
        }
        if y1 > y3 {
            std::mem::swap(&mut y1, &mut y3);
            std::mem::swap(&mut x1, &mut x3);
        }
        if y2 > y3 {
            std::mem::swap(&mut y2, &mut y3);
            std::mem::swap(&mut x2, &mut x3);
        }

        let mut t1x = x1;
        let mut t2x = x1;
        let mut y = y1;

        let mut dx1 = x2 - x1;
        let mut signx1 = if dx1 < 0 {
            dx1 = -dx1;
            -1
        } else {
            1
        };
        let mut dy1 = y2 - y1;

        let mut dx2 = x3 - x1;
        let signx2 = if dx2 < 0 {
            dx2 = -dx2;
            -1
        } else {
            1
        };
        let mut dy2 = y3 - y1;

        let mut changed1 = false;
        let mut changed2 = false;

        // An edge steeper than 45 degrees swaps axes and walks y per step.
        if dy1 > dx1 {
            std::mem::swap(&mut dx1, &mut dy1);
            changed1 = true;
        }
        if dy2 > dx2 {
            std::mem::swap(&mut dy2, &mut dx2);
            changed2 = true;
        }

        let mut e2 = dx2 >> 1;
        let mut e1;

        let mut minx;
        let mut maxx;
        let mut t1xp;
        let mut t2xp;

        // Upper half, between the first and middle vertices. A flat top has
        // no upper half at all.
        if y1 != y2 {
            e1 = dx1 >> 1;
            let mut i = 0;
            while i < dx1 {
                t1xp = 0;
                t2xp = 0;
                if t1x < t2x {
                    minx = t1x;
                    maxx = t2x;
                } else {
                    minx = t2x;
                    maxx = t1x;
                }
                // Advance the first edge until its scanline changes.
                'left: while i < dx1 {
                    i += 1;
                    e1 += dy1;
                    while e1 >= dx1 {
                        e1 -= dx1;
                        if changed1 {
                            t1xp = signx1;
                        } else {
                            break 'left;
                        }
                    }
                    if changed1 {
                        break;
                    }
                    t1x += signx1;
                }
                // Advance the second edge likewise.
                'right: loop {
                    e2 += dy2;
                    while e2 >= dx2 {
                        e2 -= dx2;
                        if changed2 {
                            t2xp = signx2;
                        } else {
                            break 'right;
                        }
                    }
                    if changed2 {
                        break;
                    }
                    t2x += signx2;
                }
                minx = minx.min(t1x).min(t2x);
                maxx = maxx.max(t1x).max(t2x);
                self.scanline(minx, maxx, y, p);
                if !changed1 {
                    t1x += signx1;
                }
                t1x += t1xp;
                if !changed2 {
                    t2x += signx2;
                }
                t2x += t2xp;
                y += 1;
                if y == y2 {
                    break;
                }
            }
        }

        // Lower half, between the middle and last vertices. The second edge
        // walker carries over from the upper half.
        dx1 = x3 - x2;
        signx1 = if dx1 < 0 {
            dx1 = -dx1;
            -1
        } else {
            1
        };
        dy1 = y3 - y2;
        t1x = x2;

        if dy1 > dx1 {
            std::mem::swap(&mut dy1, &mut dx1);
            changed1 = true;
        } else {
            changed1 = false;
        }

        e1 = dx1 >> 1;

        let mut i = 0;
        while i <= dx1 {
            t1xp = 0;
            t2xp = 0;
            if t1x < t2x {
                minx = t1x;
                maxx = t2x;
            } else {
                minx = t2x;
                maxx = t1x;
            }
            'left: while i < dx1 {
                e1 += dy1;
                while e1 >= dx1 {
                    e1 -= dx1;
                    if changed1 {
                        t1xp = signx1;
                        break;
                    } else {
                        break 'left;
                    }
                }
                if changed1 {
                    break;
                }
                t1x += signx1;
                if i < dx1 {
                    i += 1;
                }
            }
            'right: while t2x != x3 {
                e2 += dy2;
                while e2 >= dx2 {
                    e2 -= dx2;
                    if changed2 {
                        t2xp = signx2;
                    } else {
                        break 'right;
                    }
                }
                if changed2 {
                    break;
                }
                t2x += signx2;
            }
            minx = minx.min(t1x).min(t2x);
            maxx = maxx.max(t1x).max(t2x);
            self.scanline(minx, maxx, y, p);
            if !changed1 {
                t1x += signx1;
            }
            t1x += t1xp;
            if !changed2 {
                t2x += signx2;
            }
            t2x += t2xp;
            y += 1;
            if y > y3 {
                return;
            }
            i += 1;
        }
    }

    /// Copies every pixel of `sprite` to the target at the given offset,
    /// writing through the active blend mode.
    pub fn draw_sprite(&mut self, x: i32, y: i32, sprite: &Sprite) {
        for i in 0..sprite.width() {
            for j in 0..sprite.height() {
                self.draw(x + i, y + j, sprite.pixel(i, j));
            }
        }
    }

    /// Copies a `w` by `h` region of `sprite` starting at `(ox, oy)`.
    ///
    /// Source reads past the sprite's own bounds resolve to the default
    /// pixel; there is no extra validation beyond that guard.
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
        for i in 0..w {
            for j in 0..h {
                self.draw(x + i, y + j, sprite.pixel(i + ox, j + oy));
            }
        }
    }

    /// Writes one inclusive horizontal span through `draw`.
    fn scanline(&mut self, sx: i32, ex: i32, y: i32, p: Pixel) {
        for i in sx..=ex {
            self.draw(i, y, p);
        }
    }
}

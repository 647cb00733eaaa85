// src/platform/minifb.rs

//! Windowed backend on top of `minifb`. The window handle is not `Send`, so
//! the pump owns it outright and the display half talks to it through a
//! command channel: uploads are converted and upscaled on the frame loop
//! thread, then handed over for the pump to push out between event polls.

use crate::config::EngineConfig;
use crate::keys::Key;
use crate::platform::{Backend, Display, EventPump, WindowEvent};
use anyhow::{anyhow, ensure, Context, Result};
use log::{debug, info, warn};
use minifb::{Key as NativeKey, MouseButton, MouseMode, Window, WindowOptions};
use once_cell::sync::Lazy;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

enum DisplayCommand {
    Frame {
        buffer: Vec<u32>,
        width: usize,
        height: usize,
    },
    Title(String),
}

/// Keys the window reports, paired with their engine names. Polled by
/// identity diffing each pass, so order only matters for stability.
static KEY_TABLE: Lazy<Vec<(NativeKey, Key)>> = Lazy::new(|| {
    use NativeKey as N;
    vec![
        (N::A, Key::A),
        (N::B, Key::B),
        (N::C, Key::C),
        (N::D, Key::D),
        (N::E, Key::E),
        (N::F, Key::F),
        (N::G, Key::G),
        (N::H, Key::H),
        (N::I, Key::I),
        (N::J, Key::J),
        (N::K, Key::K),
        (N::L, Key::L),
        (N::M, Key::M),
        (N::N, Key::N),
        (N::O, Key::O),
        (N::P, Key::P),
        (N::Q, Key::Q),
        (N::R, Key::R),
        (N::S, Key::S),
        (N::T, Key::T),
        (N::U, Key::U),
        (N::V, Key::V),
        (N::W, Key::W),
        (N::X, Key::X),
        (N::Y, Key::Y),
        (N::Z, Key::Z),
        (N::Key0, Key::Num0),
        (N::Key1, Key::Num1),
        (N::Key2, Key::Num2),
        (N::Key3, Key::Num3),
        (N::Key4, Key::Num4),
        (N::Key5, Key::Num5),
        (N::Key6, Key::Num6),
        (N::Key7, Key::Num7),
        (N::Key8, Key::Num8),
        (N::Key9, Key::Num9),
        (N::F1, Key::F1),
        (N::F2, Key::F2),
        (N::F3, Key::F3),
        (N::F4, Key::F4),
        (N::F5, Key::F5),
        (N::F6, Key::F6),
        (N::F7, Key::F7),
        (N::F8, Key::F8),
        (N::F9, Key::F9),
        (N::F10, Key::F10),
        (N::F11, Key::F11),
        (N::F12, Key::F12),
        (N::Up, Key::Up),
        (N::Down, Key::Down),
        (N::Left, Key::Left),
        (N::Right, Key::Right),
        (N::Space, Key::Space),
        (N::Tab, Key::Tab),
        (N::Enter, Key::Enter),
        (N::Escape, Key::Escape),
        (N::Backspace, Key::Backspace),
        (N::LeftShift, Key::LeftShift),
        (N::RightShift, Key::RightShift),
        (N::LeftCtrl, Key::LeftControl),
        (N::RightCtrl, Key::RightControl),
        (N::LeftAlt, Key::LeftAlt),
        (N::RightAlt, Key::RightAlt),
        (N::Insert, Key::Insert),
        (N::Delete, Key::Delete),
        (N::Home, Key::Home),
        (N::End, Key::End),
        (N::PageUp, Key::PageUp),
        (N::PageDown, Key::PageDown),
        (N::Pause, Key::Pause),
        (N::ScrollLock, Key::ScrollLock),
        (N::Comma, Key::Comma),
        (N::Period, Key::Period),
        (N::Minus, Key::Minus),
        (N::Equal, Key::Equals),
        (N::Semicolon, Key::Semicolon),
        (N::Slash, Key::Slash),
        (N::Backslash, Key::Backslash),
        (N::Apostrophe, Key::Apostrophe),
        (N::LeftBracket, Key::LeftBracket),
        (N::RightBracket, Key::RightBracket),
        (N::Backquote, Key::Backquote),
    ]
});

const BUTTON_TABLE: [(MouseButton, usize); 3] = [
    (MouseButton::Left, 0),
    (MouseButton::Right, 1),
    (MouseButton::Middle, 2),
];

pub struct MinifbPump {
    window: Window,
    commands: Receiver<DisplayCommand>,
    keys_down: Vec<bool>,
    buttons_down: [bool; 3],
    focused: bool,
    cursor: (i32, i32),
    pixel_width: i32,
    pixel_height: i32,
}

impl MinifbPump {
    /// Diffs the window's device state against the last poll and emits one
    /// event per observed transition.
    fn poll_input(&mut self, on_event: &mut dyn FnMut(WindowEvent)) {
        let focused = self.window.is_active();
        if focused != self.focused {
            self.focused = focused;
            on_event(if focused {
                WindowEvent::FocusGained
            } else {
                WindowEvent::FocusLost
            });
        }

        for (index, &(native, key)) in KEY_TABLE.iter().enumerate() {
            let down = self.window.is_key_down(native);
            if down != self.keys_down[index] {
                self.keys_down[index] = down;
                on_event(if down {
                    WindowEvent::KeyDown { key }
                } else {
                    WindowEvent::KeyUp { key }
                });
            }
        }

        for (native, button) in BUTTON_TABLE {
            let down = self.window.get_mouse_down(native);
            if down != self.buttons_down[button] {
                self.buttons_down[button] = down;
                on_event(if down {
                    WindowEvent::MouseDown { button }
                } else {
                    WindowEvent::MouseUp { button }
                });
            }
        }

        if let Some((x, y)) = self.window.get_mouse_pos(MouseMode::Clamp) {
            let x = x as i32 / self.pixel_width;
            let y = y as i32 / self.pixel_height;
            if (x, y) != self.cursor {
                self.cursor = (x, y);
                on_event(WindowEvent::PointerMoved { x, y });
            }
        }
    }
}

impl EventPump for MinifbPump {
    fn run(mut self, on_event: &mut dyn FnMut(WindowEvent)) {
        let mut close_sent = false;
        'session: loop {
            // Drain pending display commands. Only the newest frame is worth
            // presenting; stale ones are dropped on the floor.
            let mut frame: Option<(Vec<u32>, usize, usize)> = None;
            loop {
                match self.commands.try_recv() {
                    Ok(DisplayCommand::Frame {
                        buffer,
                        width,
                        height,
                    }) => frame = Some((buffer, width, height)),
                    Ok(DisplayCommand::Title(title)) => self.window.set_title(&title),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        debug!("MinifbPump: display dropped, exiting");
                        break 'session;
                    }
                }
            }

            if self.window.is_open() {
                let result = match frame {
                    Some((buffer, width, height)) => {
                        self.window.update_with_buffer(&buffer, width, height)
                    }
                    None => {
                        self.window.update();
                        Ok(())
                    }
                };
                if let Err(e) = result {
                    warn!("MinifbPump: window update failed: {}", e);
                }
                self.poll_input(on_event);
            } else {
                // The window is gone but the engine may still be winding
                // down, so keep draining commands until it hangs up.
                if !close_sent {
                    debug!("MinifbPump: window closed by user");
                    on_event(WindowEvent::CloseRequested);
                    close_sent = true;
                }
                thread::sleep(Duration::from_millis(1));
            }
        }
    }
}

pub struct MinifbDisplay {
    commands: Sender<DisplayCommand>,
    pixel_width: i32,
    pixel_height: i32,
    pending: Option<(Vec<u32>, usize, usize)>,
}

impl Display for MinifbDisplay {
    fn upload_frame(&mut self, bytes: &[u8], width: i32, height: i32) -> Result<()> {
        ensure!(
            bytes.len() == (width as usize) * (height as usize) * 4,
            "frame byte length {} does not match {}x{}",
            bytes.len(),
            width,
            height
        );
        let width = width as usize;
        let height = height as usize;
        let pixel_width = self.pixel_width as usize;
        let pixel_height = self.pixel_height as usize;
        self.pending = Some((
            scale_frame(bytes, width, height, pixel_width, pixel_height),
            width * pixel_width,
            height * pixel_height,
        ));
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        if let Some((buffer, width, height)) = self.pending.take() {
            self.commands
                .send(DisplayCommand::Frame {
                    buffer,
                    width,
                    height,
                })
                .map_err(|_| anyhow!("window loop has exited"))?;
        }
        Ok(())
    }

    fn set_title(&mut self, title: &str) {
        // Title updates after the window loop exits are harmless to lose.
        let _ = self.commands.send(DisplayCommand::Title(title.to_string()));
    }
}

/// Converts tightly packed RGBA bytes into the window's `0RGB` words while
/// replicating each logical pixel to its physical footprint. Alpha is
/// dropped; the output surface is opaque.
fn scale_frame(
    bytes: &[u8],
    width: usize,
    height: usize,
    pixel_width: usize,
    pixel_height: usize,
) -> Vec<u32> {
    let out_width = width * pixel_width;
    let out_height = height * pixel_height;
    let mut out = vec![0u32; out_width * out_height];
    for oy in 0..out_height {
        let src_row = (oy / pixel_height) * width * 4;
        let dst_row = oy * out_width;
        for ox in 0..out_width {
            let i = src_row + (ox / pixel_width) * 4;
            let r = u32::from(bytes[i]);
            let g = u32::from(bytes[i + 1]);
            let b = u32::from(bytes[i + 2]);
            out[dst_row + ox] = (r << 16) | (g << 8) | b;
        }
    }
    out
}

/// The interactive backend: one `minifb` window scaled up from the logical
/// screen by the configured pixel size.
pub struct MinifbBackend;

impl Backend for MinifbBackend {
    type Pump = MinifbPump;
    type Display = MinifbDisplay;

    fn create(config: &EngineConfig) -> Result<(Self::Pump, Self::Display)> {
        let (window_width, window_height) = config.window_size();
        let window = Window::new(
            &config.name,
            window_width as usize,
            window_height as usize,
            WindowOptions::default(),
        )
        .context("Failed to create window")?;
        info!(
            "MinifbBackend: window created at {}x{} ({}x{} logical)",
            window_width, window_height, config.screen.width, config.screen.height
        );

        let (command_tx, command_rx) = mpsc::channel();
        let pump = MinifbPump {
            window,
            commands: command_rx,
            keys_down: vec![false; KEY_TABLE.len()],
            buttons_down: [false; 3],
            focused: true,
            cursor: (0, 0),
            pixel_width: config.screen.pixel_width,
            pixel_height: config.screen.pixel_height,
        };
        let display = MinifbDisplay {
            commands: command_tx,
            pixel_width: config.screen.pixel_width,
            pixel_height: config.screen.pixel_height,
            pending: None,
        };
        Ok((pump, display))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_frame_packs_rgba_into_0rgb() {
        let bytes = [10, 20, 30, 77];
        let out = scale_frame(&bytes, 1, 1, 1, 1);
        assert_eq!(out, vec![0x000A141E]);
    }

    #[test]
    fn scale_frame_replicates_each_logical_pixel() {
        // One red and one green pixel side by side, scaled 2x2.
        let bytes = [255, 0, 0, 255, 0, 255, 0, 255];
        let out = scale_frame(&bytes, 2, 1, 2, 2);
        assert_eq!(out.len(), 8);
        let red = 0x00FF0000;
        let green = 0x0000FF00;
        assert_eq!(out, vec![red, red, green, green, red, red, green, green]);
    }

    #[test]
    fn key_table_has_no_duplicate_engine_keys() {
        let mut seen = std::collections::HashSet::new();
        for &(_, key) in KEY_TABLE.iter() {
            assert!(seen.insert(key), "{key:?} mapped twice");
        }
    }
}

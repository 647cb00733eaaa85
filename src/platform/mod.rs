// src/platform/mod.rs

//! Platform abstraction. The engine core never talks to a window system
//! directly; it drives a [`Display`] for output and receives [`WindowEvent`]s
//! through an [`EventPump`]. A [`Backend`] bundles the two halves behind one
//! constructor so the run loop stays platform-agnostic.

use crate::config::EngineConfig;
use crate::keys::Key;
use anyhow::Result;

pub mod headless;
#[cfg(feature = "minifb")]
pub mod minifb;

/// One input or lifecycle notification from the window system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// The user asked the window to close.
    CloseRequested,
    FocusGained,
    FocusLost,
    /// Cursor movement. Backends divide physical window coordinates down by
    /// the pixel scale before emitting this, so the values are already in
    /// logical screen pixels.
    PointerMoved { x: i32, y: i32 },
    KeyDown { key: Key },
    KeyUp { key: Key },
    /// Mouse button pressed; 0 is left, 1 is right, 2 is middle.
    MouseDown { button: usize },
    /// Mouse button released, same numbering as [`WindowEvent::MouseDown`].
    MouseUp { button: usize },
}

/// The event-producing half of a backend.
///
/// `run` blocks the calling thread until the backend decides the session is
/// over, forwarding each event to the supplied callback as it arrives.
/// Windowing libraries that pin their handles to the creating thread live
/// happily behind this shape.
pub trait EventPump {
    fn run(self, on_event: &mut dyn FnMut(WindowEvent));
}

/// The output half of a backend. Owned by the frame loop thread, hence the
/// `Send` bound.
pub trait Display: Send {
    /// Uploads one finished frame of tightly packed RGBA bytes.
    ///
    /// # Errors
    ///
    /// Fails when the output surface is gone, which the frame loop treats
    /// as fatal.
    fn upload_frame(&mut self, bytes: &[u8], width: i32, height: i32) -> Result<()>;

    /// Pushes the most recently uploaded frame to the output surface.
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`Display::upload_frame`].
    fn present(&mut self) -> Result<()>;

    /// Replaces the window title.
    fn set_title(&mut self, title: &str);
}

/// Ties an event pump and a display together under one constructor.
pub trait Backend {
    type Pump: EventPump;
    type Display: Display + 'static;

    /// Builds both halves for the given configuration.
    ///
    /// # Errors
    ///
    /// Fails when the underlying window or surface cannot be created.
    fn create(config: &EngineConfig) -> Result<(Self::Pump, Self::Display)>;
}

// src/lib.rs

//! A CPU-side 2D raster engine: a logical pixel buffer, blend-aware drawing
//! primitives, edge-latched input, and a fixed-cadence game loop that drives
//! user callbacks and publishes every finished frame to a pluggable display
//! backend.
//!
//! The typical entry point is [`run_windowed`] with a [`Game`]
//! implementation; [`run`] accepts any [`platform::EventPump`] and
//! [`platform::Display`] pair for embedding or testing.

pub mod config;
pub mod engine;
pub mod input;
pub mod keys;
pub mod pixel;
pub mod platform;
pub mod renderer;
pub mod sprite;

pub use config::{EngineConfig, ScreenConfig};
#[cfg(feature = "minifb")]
pub use engine::run_windowed;
pub use engine::{run, Engine, FrameLoop, Game, LoopState};
pub use input::{ButtonState, EngineState};
pub use keys::{Key, MouseButtons};
pub use pixel::{BlendMode, Pixel};
pub use renderer::{BlendFn, Renderer};
pub use sprite::Sprite;

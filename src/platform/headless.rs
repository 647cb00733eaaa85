// src/platform/headless.rs

//! A windowless backend for tests and automation. The display half records
//! every upload, present, and title change; the pump half replays events
//! injected through [`HeadlessHandles`] and exits once the display is
//! dropped, matching how a real window loop outlives its last frame.

use crate::config::EngineConfig;
use crate::platform::{Backend, Display, EventPump, WindowEvent};
use anyhow::Result;
use log::debug;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

/// Everything the headless display has been asked to do, in order.
#[derive(Debug, Default)]
pub struct Recording {
    /// Raw bytes of every uploaded frame.
    pub frames: Vec<Vec<u8>>,
    /// Dimensions of the most recent upload.
    pub frame_size: (i32, i32),
    /// Titles in the order they were set.
    pub titles: Vec<String>,
    /// Number of completed present calls.
    pub presents: usize,
}

/// Injection and inspection handles for a headless session.
pub struct HeadlessHandles {
    /// Feeds events into the pump as if a window had produced them.
    pub events: Sender<WindowEvent>,
    /// Shared view of everything the display recorded.
    pub recording: Arc<Mutex<Recording>>,
}

pub struct HeadlessPump {
    events: Receiver<WindowEvent>,
    done: Receiver<()>,
}

pub struct HeadlessDisplay {
    recording: Arc<Mutex<Recording>>,
    // Held only so the pump can observe this half going away.
    _alive: Sender<()>,
}

/// Builds a connected pump and display plus the test-side handles.
pub fn create_with_handles() -> (HeadlessPump, HeadlessDisplay, HeadlessHandles) {
    let (event_tx, event_rx) = mpsc::channel();
    let (alive_tx, alive_rx) = mpsc::channel();
    let recording = Arc::new(Mutex::new(Recording::default()));

    let pump = HeadlessPump {
        events: event_rx,
        done: alive_rx,
    };
    let display = HeadlessDisplay {
        recording: Arc::clone(&recording),
        _alive: alive_tx,
    };
    let handles = HeadlessHandles {
        events: event_tx,
        recording,
    };
    (pump, display, handles)
}

impl EventPump for HeadlessPump {
    fn run(self, on_event: &mut dyn FnMut(WindowEvent)) {
        loop {
            while let Ok(event) = self.events.try_recv() {
                on_event(event);
            }
            if let Err(TryRecvError::Disconnected) = self.done.try_recv() {
                debug!("HeadlessPump: display dropped, exiting");
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }
}

impl HeadlessDisplay {
    fn recording(&self) -> MutexGuard<'_, Recording> {
        // A panicked recorder thread must not hide what was recorded first.
        self.recording.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Display for HeadlessDisplay {
    fn upload_frame(&mut self, bytes: &[u8], width: i32, height: i32) -> Result<()> {
        let mut recording = self.recording();
        recording.frames.push(bytes.to_vec());
        recording.frame_size = (width, height);
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.recording().presents += 1;
        Ok(())
    }

    fn set_title(&mut self, title: &str) {
        self.recording().titles.push(title.to_string());
    }
}

/// A backend that renders nowhere and receives no events. Useful when only
/// the plumbing is under test; use [`create_with_handles`] to keep the
/// injection side.
pub struct HeadlessBackend;

impl Backend for HeadlessBackend {
    type Pump = HeadlessPump;
    type Display = HeadlessDisplay;

    fn create(_config: &EngineConfig) -> Result<(Self::Pump, Self::Display)> {
        let (pump, display, _handles) = create_with_handles();
        Ok((pump, display))
    }
}

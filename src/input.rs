// src/input.rs

//! Edge-triggered input state. Raw device booleans arrive asynchronously from
//! the event pump; the frame loop latches them once per update into
//! [`ButtonState`] values so user code sees stable per-frame edges.

use crate::keys::{Key, MouseButtons, MOUSE_BUTTON_COUNT};
use crate::platform::WindowEvent;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU8, Ordering};

/// Per-frame state of one key or button.
///
/// `pressed` and `released` are true for exactly the one update cycle in
/// which the transition was observed; `held` spans the whole time the
/// control is down, including the pressed cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ButtonState {
    pub pressed: bool,
    pub released: bool,
    pub held: bool,
}

/// Latches `N` raw booleans into edge-triggered [`ButtonState`]s.
///
/// One `update` call is one frame. Transitions are detected against the
/// previous frame's raw values, so a press spanning many frames yields a
/// single `pressed` edge no matter how long it is held.
#[derive(Debug, Clone)]
pub struct InputLatch<const N: usize> {
    states: [ButtonState; N],
    old: [bool; N],
}

impl<const N: usize> InputLatch<N> {
    pub fn new() -> Self {
        InputLatch {
            states: [ButtonState::default(); N],
            old: [false; N],
        }
    }

    /// Folds the current raw values into the latched states.
    pub fn update(&mut self, new: &[bool; N]) {
        for i in 0..N {
            self.states[i].pressed = false;
            self.states[i].released = false;
            if new[i] != self.old[i] {
                if new[i] {
                    self.states[i].pressed = !self.states[i].held;
                    self.states[i].held = true;
                } else {
                    self.states[i].released = true;
                    self.states[i].held = false;
                }
            }
            self.old[i] = new[i];
        }
    }

    /// The latched state at `index`. Out-of-range indices resolve to the
    /// default (all false) state.
    pub fn state(&self, index: usize) -> ButtonState {
        self.states.get(index).copied().unwrap_or_default()
    }
}

impl<const N: usize> Default for InputLatch<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// State shared between the event pump task and the frame loop task.
///
/// The pump writes on every window event; the frame loop reads a snapshot
/// once per update. Every field is an independent flag or coordinate, so
/// all accesses use `Ordering::Relaxed`.
pub struct EngineState {
    active: AtomicBool,
    keys: [AtomicBool; Key::COUNT],
    mouse: AtomicU8,
    mouse_x: AtomicI32,
    mouse_y: AtomicI32,
    focused: AtomicBool,
}

impl EngineState {
    pub fn new() -> Self {
        EngineState {
            active: AtomicBool::new(true),
            keys: std::array::from_fn(|_| AtomicBool::new(false)),
            mouse: AtomicU8::new(0),
            mouse_x: AtomicI32::new(0),
            mouse_y: AtomicI32::new(0),
            focused: AtomicBool::new(true),
        }
    }

    /// Whether the engine should keep running. Cleared by a close request or
    /// a stopping frame loop; restored when a destroy handler vetoes
    /// shutdown.
    pub fn active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    pub fn set_active(&self, value: bool) {
        self.active.store(value, Ordering::Relaxed);
    }

    /// Folds one window event into the shared state.
    pub fn apply(&self, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                debug!("EngineState: close requested");
                self.active.store(false, Ordering::Relaxed);
            }
            WindowEvent::FocusGained => self.focused.store(true, Ordering::Relaxed),
            WindowEvent::FocusLost => self.focused.store(false, Ordering::Relaxed),
            WindowEvent::PointerMoved { x, y } => {
                self.mouse_x.store(x, Ordering::Relaxed);
                self.mouse_y.store(y, Ordering::Relaxed);
            }
            WindowEvent::KeyDown { key } => {
                self.keys[key as usize].store(true, Ordering::Relaxed);
            }
            WindowEvent::KeyUp { key } => {
                self.keys[key as usize].store(false, Ordering::Relaxed);
            }
            WindowEvent::MouseDown { button } => {
                let bits = MouseButtons::from_index(button).bits();
                self.mouse.fetch_or(bits, Ordering::Relaxed);
            }
            WindowEvent::MouseUp { button } => {
                let bits = MouseButtons::from_index(button).bits();
                self.mouse.fetch_and(!bits, Ordering::Relaxed);
            }
        }
    }

    /// A copy of the raw key map, indexed by `Key as usize`.
    pub fn key_snapshot(&self) -> [bool; Key::COUNT] {
        std::array::from_fn(|i| self.keys[i].load(Ordering::Relaxed))
    }

    /// A copy of the raw mouse button map, indexed by button number.
    pub fn mouse_snapshot(&self) -> [bool; MOUSE_BUTTON_COUNT] {
        let held = MouseButtons::from_bits_truncate(self.mouse.load(Ordering::Relaxed));
        std::array::from_fn(|i| held.contains(MouseButtons::from_index(i)))
    }

    /// The cursor position in screen pixel coordinates.
    pub fn cursor(&self) -> (i32, i32) {
        (
            self.mouse_x.load(Ordering::Relaxed),
            self.mouse_y.load(Ordering::Relaxed),
        )
    }

    pub fn focused(&self) -> bool {
        self.focused.load(Ordering::Relaxed)
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latch_reports_each_edge_exactly_once() {
        let mut latch = InputLatch::<1>::new();

        latch.update(&[false]);
        assert_eq!(latch.state(0), ButtonState::default());

        // Press: one pressed edge, held from this cycle on.
        latch.update(&[true]);
        let s = latch.state(0);
        assert!(s.pressed && s.held && !s.released);

        // Still down: held only.
        latch.update(&[true]);
        let s = latch.state(0);
        assert!(!s.pressed && s.held && !s.released);

        // Release: one released edge, held cleared.
        latch.update(&[false]);
        let s = latch.state(0);
        assert!(!s.pressed && !s.held && s.released);

        latch.update(&[false]);
        assert_eq!(latch.state(0), ButtonState::default());
    }

    #[test]
    fn latch_handles_independent_slots() {
        let mut latch = InputLatch::<3>::new();
        latch.update(&[true, false, true]);
        assert!(latch.state(0).pressed);
        assert!(!latch.state(1).pressed);
        assert!(latch.state(2).pressed);

        latch.update(&[true, true, false]);
        assert!(latch.state(0).held && !latch.state(0).pressed);
        assert!(latch.state(1).pressed);
        assert!(latch.state(2).released);
    }

    #[test]
    fn out_of_range_index_reads_default() {
        let mut latch = InputLatch::<2>::new();
        latch.update(&[true, true]);
        assert_eq!(latch.state(99), ButtonState::default());
    }

    #[test]
    fn state_applies_key_and_button_events() {
        let state = EngineState::new();
        assert!(!state.key_snapshot()[Key::A as usize]);

        state.apply(WindowEvent::KeyDown { key: Key::A });
        assert!(state.key_snapshot()[Key::A as usize]);
        state.apply(WindowEvent::KeyUp { key: Key::A });
        assert!(!state.key_snapshot()[Key::A as usize]);

        state.apply(WindowEvent::MouseDown { button: 0 });
        state.apply(WindowEvent::MouseDown { button: 2 });
        let buttons = state.mouse_snapshot();
        assert!(buttons[0] && !buttons[1] && buttons[2]);
        state.apply(WindowEvent::MouseUp { button: 0 });
        assert!(!state.mouse_snapshot()[0]);
        assert!(state.mouse_snapshot()[2]);
    }

    #[test]
    fn state_tracks_cursor_focus_and_close() {
        let state = EngineState::new();
        assert!(state.active());
        assert!(state.focused());

        state.apply(WindowEvent::PointerMoved { x: 17, y: 23 });
        assert_eq!(state.cursor(), (17, 23));

        state.apply(WindowEvent::FocusLost);
        assert!(!state.focused());
        state.apply(WindowEvent::FocusGained);
        assert!(state.focused());

        state.apply(WindowEvent::CloseRequested);
        assert!(!state.active());
    }

    #[test]
    fn out_of_range_mouse_button_is_ignored() {
        let state = EngineState::new();
        state.apply(WindowEvent::MouseDown { button: 9 });
        assert_eq!(state.mouse_snapshot(), [false; MOUSE_BUTTON_COUNT]);
    }
}

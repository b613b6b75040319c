//! Keyboard Module - Keyboard event types
//!
//! The event shape consumed by [`Navigable::handle_keyboard`] and
//! [`Navigable::handle_key_match`]. Key names follow the DOM convention
//! (`"ArrowUp"`, `"Enter"`, `"a"`), so events from any backend can be mapped
//! onto them (see [`input`](super::input) for crossterm).
//!
//! [`Navigable::handle_keyboard`]: crate::Navigable::handle_keyboard
//! [`Navigable::handle_key_match`]: crate::Navigable::handle_key_match

use std::cell::Cell;

// =============================================================================
// TYPES
// =============================================================================

bitflags::bitflags! {
    /// Keyboard modifier state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const CTRL = 1 << 0;
        const ALT = 1 << 1;
        const SHIFT = 1 << 2;
        const META = 1 << 3;
    }
}

/// Key event state (press, repeat, release)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

/// Keyboard event
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardEvent {
    /// The key that was pressed (e.g., "a", "Enter", "ArrowUp")
    pub key: String,
    /// Modifier keys state
    pub modifiers: Modifiers,
    /// Press/repeat/release state
    pub state: KeyState,
    default_prevented: Cell<bool>,
}

impl KeyboardEvent {
    /// Create a simple key press event
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_modifiers(key, Modifiers::empty())
    }

    /// Create a key press with modifiers
    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            state: KeyState::Press,
            default_prevented: Cell::new(false),
        }
    }

    /// Same event with a different press/repeat/release state
    pub fn with_state(mut self, state: KeyState) -> Self {
        self.state = state;
        self
    }

    /// Whether the control key was held
    pub fn ctrl_key(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if this is a press or auto-repeat event
    pub fn is_down(&self) -> bool {
        self.state != KeyState::Release
    }

    /// Mark the event as handled so the host skips its default action.
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

// =============================================================================
// TESTS
// =============================================================================

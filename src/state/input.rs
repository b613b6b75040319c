//! Input Module - crossterm event conversion
//!
//! Maps crossterm key events onto [`KeyboardEvent`] so a terminal event loop
//! can drive a [`Navigable`](crate::Navigable) directly.
//!
//! # Example
//!
//! ```ignore
//! use crossterm::event::{read, Event};
//! use spark_navigable::state::input::convert_key_event;
//!
//! if let Event::Key(key) = read()? {
//!     let event = convert_key_event(key);
//!     nav.handle_keyboard(&event);
//!     if !event.default_prevented() {
//!         nav.handle_key_match(&event);
//!     }
//! }
//! ```

use crossterm::event::{KeyCode, KeyEvent as CrosstermKeyEvent, KeyEventKind, KeyModifiers};

use super::keyboard::{KeyState, KeyboardEvent, Modifiers};

// =============================================================================
// KEY EVENT CONVERSION
// =============================================================================

/// Convert a crossterm key event into a [`KeyboardEvent`].
///
/// Printable characters keep their text for type-ahead; navigation keys get
/// their DOM names. Anything else converts to an empty key.
pub fn convert_key_event(event: CrosstermKeyEvent) -> KeyboardEvent {
    let key = match event.code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Up => "ArrowUp".into(),
        KeyCode::Down => "ArrowDown".into(),
        KeyCode::Left => "ArrowLeft".into(),
        KeyCode::Right => "ArrowRight".into(),
        KeyCode::Home => "Home".into(),
        KeyCode::End => "End".into(),
        KeyCode::Enter => "Enter".into(),
        KeyCode::Esc => "Escape".into(),
        KeyCode::Tab => "Tab".into(),
        _ => String::new(),
    };

    let state = match event.kind {
        KeyEventKind::Press => KeyState::Press,
        KeyEventKind::Repeat => KeyState::Repeat,
        KeyEventKind::Release => KeyState::Release,
    };

    KeyboardEvent::with_modifiers(key, convert_modifiers(event.modifiers)).with_state(state)
}

fn convert_modifiers(mods: KeyModifiers) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::CTRL, mods.contains(KeyModifiers::CONTROL));
    modifiers.set(Modifiers::ALT, mods.contains(KeyModifiers::ALT));
    modifiers.set(Modifiers::SHIFT, mods.contains(KeyModifiers::SHIFT));
    modifiers.set(Modifiers::META, mods.contains(KeyModifiers::META) || mods.contains(KeyModifiers::SUPER));
    modifiers
}

// =============================================================================
// TESTS
// =============================================================================

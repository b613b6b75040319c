//! State Module - Input types that drive navigation
//!
//! - **Keyboard** - Event type, modifiers, default prevention
//! - **Input** - crossterm event conversion

pub mod input;
mod keyboard;

pub use keyboard::*;

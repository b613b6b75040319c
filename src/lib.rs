//! # spark-navigable
//!
//! Reactive keyboard navigation for composite, list-like widgets (menus,
//! comboboxes, toolbars, tab strips).
//!
//! ## Architecture
//!
//! A [`Registry`] assigns slots to items and exposes them as an observable
//! collection. A [`Navigable`] engine reads that collection and keeps two
//! cursors over it: the auto cursor drives the *selected* item, the manual
//! cursor the *active* one. Arrow keys, explicit selection and type-ahead
//! write the cursors; watchers push every write into focus calls and user
//! callbacks synchronously.
//!
//! ```text
//! Registry → items → Navigable cursors → watch_navigation → focus() / callbacks
//! ```
//!
//! All state lives in [`store`] cells owned by the engine instance, so any
//! number of engines can run side by side. Configuration values may be
//! static, crate cells, or [spark-signals](https://crates.io/crates/spark-signals)
//! signals (see [`Setting`]).
//!
//! ## Modules
//!
//! - [`engine`] - Navigation engine, registries, direction
//! - [`state`] - Keyboard event types and crossterm conversion
//! - [`store`] - Observable cells
//! - [`types`] - Settings, item contract, callback types
//! - [`error`] - Error types

pub mod engine;
pub mod error;
pub mod state;
pub mod store;
pub mod types;

// Re-export commonly used items
pub use engine::{
    Cursors, Direction, Navigable, NavigableSettings, NavigationCallbacks, Registrable, Registry,
    Selection, StaticRegistry,
};
pub use error::{NavigationError, RegistryError};
pub use state::{KeyState, KeyboardEvent, Modifiers};
pub use store::{derived, Readable, Trigger, Writable};
pub use types::{Cleanup, Focusable, IndexCallback, Setting};

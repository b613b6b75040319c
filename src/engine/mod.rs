//! Engine Module - Navigation state machine and item registries
//!
//! - [`Navigable`] - cursors, gates, key mapping, type-ahead, watchers
//! - [`Registry`] / [`StaticRegistry`] - slot assignment for items
//! - [`Direction`] - move direction and wrap-around test

mod direction;
mod navigable;
mod registry;

pub use direction::Direction;
pub use navigable::{Cursors, Navigable, NavigableSettings, NavigationCallbacks, Selection};
pub use registry::{Registrable, Registry, StaticRegistry};

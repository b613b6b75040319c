//! Error types for the navigation engine and item registries.

use thiserror::Error;

/// Errors raised by the navigation engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// A direction literal other than `ASCENDING` / `DESCENDING`.
    #[error("invalid direction: {direction:?}")]
    InvalidDirection { direction: String },
}

/// Errors raised by [`Registry`](crate::Registry) and
/// [`StaticRegistry`](crate::StaticRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The explicit value is already registered.
    #[error("duplicate value")]
    DuplicateValue,

    /// Placeholder registration over a collection that holds explicit values,
    /// or over an item type that has no placeholder form.
    #[error("invalid value")]
    InvalidValue,
}

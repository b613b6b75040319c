//! Core types shared by the engine and registries.

use std::borrow::Cow;
use std::rc::Rc;

use spark_signals::{effect, Signal};

use crate::store::{Readable, Writable};

// =============================================================================
// Cleanup Function
// =============================================================================

/// Cleanup function returned by every subscription.
///
/// Call it to unsubscribe. Dropping it without calling leaves the
/// subscription alive.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Callback Types
// =============================================================================

/// Index change callback (`on_change`, `index_cb`, `manual_index_cb`).
pub type IndexCallback = Rc<dyn Fn(usize)>;

// =============================================================================
// Focusable - Item contract
// =============================================================================

/// An item the engine can move focus to.
pub trait Focusable {
    /// Move input focus to this item. Called as a side effect of navigation,
    /// possibly while the item already has focus.
    fn focus(&self);

    /// Plain-text label used for type-ahead matching.
    fn label(&self) -> Cow<'_, str>;
}

impl<T: Focusable + ?Sized> Focusable for Rc<T> {
    fn focus(&self) {
        (**self).focus()
    }

    fn label(&self) -> Cow<'_, str> {
        (**self).label()
    }
}

// =============================================================================
// Setting - Static or observable configuration value
// =============================================================================

/// A configuration value that can be static or observable.
///
/// The engine normalizes every setting into a [`Readable`] once, at
/// construction, and only ever reads through that.
#[derive(Clone)]
pub enum Setting<T: Clone + PartialEq + 'static> {
    /// Static value (never changes).
    Static(T),
    /// Observable crate cell.
    Store(Readable<T>),
    /// spark-signals signal, forwarded into a cell by an effect.
    Signal(Signal<T>),
}

impl<T: Clone + PartialEq + 'static> Setting<T> {
    /// Get the current value (for immediate reads).
    pub fn get(&self) -> T {
        match self {
            Setting::Static(v) => v.clone(),
            Setting::Store(r) => r.get(),
            Setting::Signal(s) => s.get(),
        }
    }

    /// Normalize into a readable.
    ///
    /// For `Signal`, the returned cleanup stops the forwarding effect.
    pub fn into_readable(self) -> (Readable<T>, Option<Cleanup>) {
        match self {
            Setting::Static(v) => (Readable::constant(v), None),
            Setting::Store(r) => (r, None),
            Setting::Signal(s) => {
                let cell = Writable::new(s.get());
                let forward = cell.clone();
                let stop = effect(move || {
                    forward.set(s.get());
                });
                (cell.readable(), Some(Box::new(stop)))
            }
        }
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for Setting<T> {
    fn default() -> Self {
        Setting::Static(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> From<T> for Setting<T> {
    fn from(value: T) -> Self {
        Setting::Static(value)
    }
}

impl<T: Clone + PartialEq + 'static> From<Readable<T>> for Setting<T> {
    fn from(readable: Readable<T>) -> Self {
        Setting::Store(readable)
    }
}

impl<T: Clone + PartialEq + 'static> From<Writable<T>> for Setting<T> {
    fn from(cell: Writable<T>) -> Self {
        Setting::Store(cell.readable())
    }
}

impl<T: Clone + PartialEq + 'static> From<Signal<T>> for Setting<T> {
    fn from(signal: Signal<T>) -> Self {
        Setting::Signal(signal)
    }
}

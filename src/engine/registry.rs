//! Item Registry - Slot assignment for navigable items.
//!
//! Two variants share the same registration rules:
//! - [`Registry`] keeps its items in an observable cell, so a [`Navigable`]
//!   can consume it directly, and unregisters by value.
//! - [`StaticRegistry`] owns a plain `Vec` and unregisters by truncating from
//!   an index.
//!
//! A slot is either an explicit value (deduplicated) or, when no value is
//! given, an integer placeholder equal to its own position. Placeholders are
//! only allowed while the collection holds nothing but placeholders.
//!
//! [`Navigable`]: crate::Navigable

use std::rc::Rc;

use crate::error::RegistryError;
use crate::store::{Readable, Writable};
use crate::types::Cleanup;

// =============================================================================
// Registrable
// =============================================================================

/// Values that can occupy a registry slot.
///
/// Integer types have a placeholder form (the slot's position); other types
/// use the defaults and must always be registered explicitly.
pub trait Registrable: Clone + PartialEq + 'static {
    /// Placeholder for an auto-assigned slot, if this type has one.
    fn placeholder(_slot: usize) -> Option<Self> {
        None
    }

    /// Whether this value is an auto-assigned placeholder.
    fn is_placeholder(&self) -> bool {
        false
    }
}

macro_rules! integer_registrable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Registrable for $ty {
                fn placeholder(slot: usize) -> Option<Self> {
                    <$ty>::try_from(slot).ok()
                }

                fn is_placeholder(&self) -> bool {
                    true
                }
            }
        )*
    };
}

integer_registrable!(u8, u16, u32, u64, usize, i32, i64);

impl Registrable for String {}
impl Registrable for &'static str {}
impl<T: PartialEq + ?Sized + 'static> Registrable for Rc<T> {}

/// Validate a registration against `items` and produce the value to append.
fn admit<T: Registrable>(items: &[T], value: Option<T>) -> Result<(T, bool), RegistryError> {
    match value {
        Some(value) => {
            if items.contains(&value) {
                return Err(RegistryError::DuplicateValue);
            }
            Ok((value, true))
        }
        None => {
            if !items.iter().all(T::is_placeholder) {
                return Err(RegistryError::InvalidValue);
            }
            let placeholder = T::placeholder(items.len()).ok_or(RegistryError::InvalidValue)?;
            Ok((placeholder, false))
        }
    }
}

// =============================================================================
// Registry - Observable, unregister by value
// =============================================================================

/// Observable item registry.
pub struct Registry<T> {
    registered: Writable<Vec<T>>,
    new_item: Writable<Option<T>>,
}

impl<T> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            registered: self.registered.clone(),
            new_item: self.new_item.clone(),
        }
    }
}

impl<T: Registrable> Registry<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            registered: Writable::new(items),
            new_item: Writable::new(None),
        }
    }

    /// The item collection, for [`NavigableSettings::new`](crate::NavigableSettings::new).
    pub fn items(&self) -> Readable<Vec<T>> {
        self.registered.readable()
    }

    /// Snapshot of the current items.
    pub fn get(&self) -> Vec<T> {
        self.registered.get()
    }

    pub fn len(&self) -> usize {
        self.registered.with(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Subscribe to the item collection (immediate call, then every change).
    pub fn subscribe(&self, subscriber: impl Fn(&Vec<T>) + 'static) -> Cleanup {
        self.registered.subscribe(subscriber)
    }

    /// Register `value`, or the next integer placeholder when `None`.
    ///
    /// Returns the zero-based position of the new slot.
    pub fn register(&self, value: Option<T>) -> Result<usize, RegistryError> {
        self.register_with(value, |_| {})
    }

    /// [`register`](Self::register), calling `on_register` with the admitted
    /// value just before it is appended.
    pub fn register_with(
        &self,
        value: Option<T>,
        on_register: impl FnOnce(&T),
    ) -> Result<usize, RegistryError> {
        let (value, explicit) = self.registered.with(|items| admit(items, value))?;
        let position = self.len();

        on_register(&value);

        let mut items = self.registered.get();
        items.push(value.clone());
        self.registered.set(items);

        tracing::debug!(message = "registry.register", position, explicit);

        if explicit {
            self.new_item.set(Some(value));
        }
        Ok(position)
    }

    /// Remove the first entry equal to `value`. Returns its former position.
    pub fn unregister(&self, value: &T) -> Option<usize> {
        let position = self.registered.with(|items| items.iter().position(|item| item == value))?;

        let mut items = self.registered.get();
        items.remove(position);
        self.registered.set(items);

        tracing::debug!(message = "registry.unregister", position);
        Some(position)
    }

    /// Call `callback` once per current item, in order.
    pub fn use_items(&self, mut callback: impl FnMut(&T)) {
        for item in self.registered.get().iter() {
            callback(item);
        }
    }

    /// Subscribe to explicitly registered values.
    ///
    /// A new subscriber is immediately handed the most recent explicit value,
    /// if any has been registered.
    pub fn watch_new_item(&self, callback: impl Fn(&T) + 'static) -> Cleanup {
        self.new_item.subscribe(move |value| {
            if let Some(value) = value {
                callback(value);
            }
        })
    }
}

impl<T: Registrable> Default for Registry<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

// =============================================================================
// StaticRegistry - Plain Vec, unregister by truncation
// =============================================================================

/// Non-observable item registry over an owned `Vec`.
pub struct StaticRegistry<T> {
    items: Vec<T>,
    new_item: Writable<Option<T>>,
}

impl<T: Registrable> StaticRegistry<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            new_item: Writable::new(None),
        }
    }

    pub fn value(&self) -> &[T] {
        &self.items
    }

    pub fn into_inner(self) -> Vec<T> {
        self.items
    }

    /// Register `value`, or the next integer placeholder when `None`.
    pub fn register(&mut self, value: Option<T>) -> Result<usize, RegistryError> {
        self.register_with(value, |_| {})
    }

    pub fn register_with(
        &mut self,
        value: Option<T>,
        on_register: impl FnOnce(&T),
    ) -> Result<usize, RegistryError> {
        let (value, explicit) = admit(&self.items, value)?;
        let position = self.items.len();

        on_register(&value);
        self.items.push(value.clone());

        tracing::debug!(message = "static_registry.register", position, explicit);

        if explicit {
            self.new_item.set(Some(value));
        }
        Ok(position)
    }

    /// Drop the slot at `index` and every slot after it.
    pub fn unregister(&mut self, index: usize) {
        tracing::debug!(message = "static_registry.truncate", index, len = self.items.len());
        self.items.truncate(index);
    }

    /// Call `callback` once per current item, in order.
    pub fn use_items(&self, mut callback: impl FnMut(&T)) {
        for item in &self.items {
            callback(item);
        }
    }

    /// Subscribe to explicitly registered values.
    pub fn listen_new_item(&self, callback: impl Fn(&T) + 'static) -> Cleanup {
        self.new_item.subscribe(move |value| {
            if let Some(value) = value {
                callback(value);
            }
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

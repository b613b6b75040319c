//! Store Module - Observable cells with synchronous push notification
//!
//! The navigation engine keeps all of its state in these cells:
//!
//! - [`Writable`] - a value plus an ordered list of subscribers
//! - [`Readable`] - a read-only view (cell, constant, or derived)
//! - [`derived`] - a readable recomputed from other cells
//!
//! Every write notifies every current subscriber before `set` returns, in
//! subscription order. Writing an equal value notifies again; there is no
//! deduplication. Subscribers always read the *current* value, so a write made
//! from inside a subscriber is visible to the subscribers that run after it.
//!
//! # Example
//!
//! ```
//! use spark_navigable::store::{derived, Writable};
//!
//! let count = Writable::new(1);
//! let source = count.clone();
//! let doubled = derived(vec![Box::new(count.clone())], move || source.get() * 2);
//!
//! let stop = doubled.subscribe(|value| println!("doubled = {value}"));
//! count.set(4); // prints "doubled = 8"
//! stop();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::types::Cleanup;

type Subscriber<T> = Rc<dyn Fn(&T)>;

// =============================================================================
// TRIGGER
// =============================================================================

/// Anything that can announce "I changed".
///
/// Used as the dependency list of [`derived`], where the dependencies have
/// different value types.
pub trait Trigger {
    /// Call `notify` after every future write. Does not call it immediately.
    fn on_change(&self, notify: Rc<dyn Fn()>) -> Cleanup;
}

trait Source<T>: Trigger {
    fn current(&self) -> T;
}

// =============================================================================
// WRITABLE
// =============================================================================

struct StoreInner<T> {
    value: RefCell<T>,
    subscribers: RefCell<Vec<(usize, Subscriber<T>)>>,
    next_id: Cell<usize>,
}

/// A mutable observable cell.
///
/// Cloning a `Writable` yields another handle to the same cell.
pub struct Writable<T> {
    inner: Rc<StoreInner<T>>,
}

impl<T> Clone for Writable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> Writable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                value: RefCell::new(value),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Current value (cloned).
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Borrow the current value without cloning.
    ///
    /// `f` must not write to this same cell.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replace the value and notify every subscriber.
    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = value;
        self.notify();
    }

    /// Compute the next value from the current one, then [`set`](Self::set) it.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = self.with(f);
        self.set(next);
    }

    /// Subscribe to this cell. The subscriber is called once immediately with
    /// the current value, then after every write.
    ///
    /// Returns the unsubscribe function.
    pub fn subscribe(&self, subscriber: impl Fn(&T) + 'static) -> Cleanup {
        let subscriber: Subscriber<T> = Rc::new(subscriber);
        let cleanup = self.attach(Rc::clone(&subscriber));
        let value = self.get();
        subscriber(&value);
        cleanup
    }

    /// Like [`subscribe`](Self::subscribe), without the immediate call.
    pub fn listen(&self, subscriber: impl Fn(&T) + 'static) -> Cleanup {
        self.attach(Rc::new(subscriber))
    }

    /// Read-only view of this cell.
    pub fn readable(&self) -> Readable<T> {
        Readable {
            source: Rc::new(self.clone()),
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    fn attach(&self, subscriber: Subscriber<T>) -> Cleanup {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.subscribers.borrow_mut().push((id, subscriber));

        let weak: Weak<StoreInner<T>> = Rc::downgrade(&self.inner);
        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner
                    .subscribers
                    .borrow_mut()
                    .retain(|(subscriber_id, _)| *subscriber_id != id);
            }
        })
    }

    fn notify(&self) {
        // Snapshot so subscribers may (un)subscribe while being notified
        let subscribers: Vec<Subscriber<T>> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|(_, subscriber)| Rc::clone(subscriber))
            .collect();

        for subscriber in subscribers {
            let value = self.get();
            subscriber(&value);
        }
    }
}

impl<T: Clone + 'static> Trigger for Writable<T> {
    fn on_change(&self, notify: Rc<dyn Fn()>) -> Cleanup {
        self.listen(move |_| notify())
    }
}

impl<T: Clone + 'static> Source<T> for Writable<T> {
    fn current(&self) -> T {
        self.get()
    }
}

// =============================================================================
// READABLE
// =============================================================================

/// A read-only observable value: a cell view, a constant, or a derived value.
pub struct Readable<T> {
    source: Rc<dyn Source<T>>,
}

impl<T> Clone for Readable<T> {
    fn clone(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
        }
    }
}

impl<T: Clone + 'static> Readable<T> {
    /// A readable that never changes.
    pub fn constant(value: T) -> Self {
        Self {
            source: Rc::new(Constant(value)),
        }
    }

    pub fn get(&self) -> T {
        self.source.current()
    }

    /// Subscribe with an immediate call, then one call per upstream write.
    ///
    /// The subscription keeps its sources alive until the returned cleanup runs.
    pub fn subscribe(&self, subscriber: impl Fn(&T) + 'static) -> Cleanup {
        let subscriber: Subscriber<T> = Rc::new(subscriber);
        let source = Rc::clone(&self.source);
        let on_write = Rc::clone(&subscriber);
        let cleanup = self.source.on_change(Rc::new(move || {
            let value = source.current();
            on_write(&value);
        }));

        let value = self.get();
        subscriber(&value);
        cleanup
    }
}

impl<T: Clone + 'static> Trigger for Readable<T> {
    fn on_change(&self, notify: Rc<dyn Fn()>) -> Cleanup {
        self.source.on_change(notify)
    }
}

impl<T: Clone + 'static> From<Writable<T>> for Readable<T> {
    fn from(cell: Writable<T>) -> Self {
        cell.readable()
    }
}

struct Constant<T>(T);

impl<T> Trigger for Constant<T> {
    fn on_change(&self, _notify: Rc<dyn Fn()>) -> Cleanup {
        Box::new(|| {})
    }
}

impl<T: Clone> Source<T> for Constant<T> {
    fn current(&self) -> T {
        self.0.clone()
    }
}

// =============================================================================
// DERIVED
// =============================================================================

struct Derived<T> {
    deps: Vec<Box<dyn Trigger>>,
    compute: Box<dyn Fn() -> T>,
}

impl<T> Trigger for Derived<T> {
    fn on_change(&self, notify: Rc<dyn Fn()>) -> Cleanup {
        let cleanups: Vec<Cleanup> = self
            .deps
            .iter()
            .map(|dep| dep.on_change(Rc::clone(&notify)))
            .collect();

        Box::new(move || {
            for cleanup in cleanups {
                cleanup();
            }
        })
    }
}

impl<T> Source<T> for Derived<T> {
    fn current(&self) -> T {
        (self.compute)()
    }
}

/// Create a readable computed from other cells.
///
/// `compute` runs on every read; subscribers are notified once per write to
/// any of `deps`. Nothing is cached, so a derived value is never stale.
pub fn derived<T: Clone + 'static>(
    deps: Vec<Box<dyn Trigger>>,
    compute: impl Fn() -> T + 'static,
) -> Readable<T> {
    Readable {
        source: Rc::new(Derived {
            deps,
            compute: Box::new(compute),
        }),
    }
}

// =============================================================================
// TESTS
// =============================================================================

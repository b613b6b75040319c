//! Navigable - Keyboard navigation engine for list-like widgets
//!
//! Tracks two cursors over an observable item collection:
//! - the auto cursor (`index`), whose item is *selected* unless waiting
//! - the manual cursor (`manual_index`), whose item is *active*
//!
//! and two gates (`waiting`, `vertical_waiting`) set by the host and consumed
//! by the engine. Arrow keys move whichever cursor the `manual` setting
//! targets; changes are pushed to focus and to callbacks through
//! [`Navigable::watch_navigation`].
//!
//! # Example
//!
//! ```ignore
//! use spark_navigable::{Navigable, NavigableSettings, NavigationCallbacks, Registry};
//!
//! let registry = Registry::new(menu_items);
//! let nav = Navigable::new(
//!     NavigableSettings::new(registry.items())
//!         .with_vertical(true)
//!         .with_on_change(|index| println!("selected {index}")),
//! );
//! let stop = nav.watch_navigation(NavigationCallbacks::default());
//!
//! nav.handle_keyboard(&KeyboardEvent::new("ArrowDown"));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::engine::direction::Direction;
use crate::state::KeyboardEvent;
use crate::store::{derived, Readable, Trigger, Writable};
use crate::types::{Cleanup, Focusable, IndexCallback, Setting};

// =============================================================================
// SETTINGS
// =============================================================================

/// Construction settings for [`Navigable`].
pub struct NavigableSettings<T> {
    /// Ordered item collection. Read-only to the engine.
    pub items: Readable<Vec<T>>,
    /// Auto cursor cell. Supply one to restore or drive the selection
    /// from outside; defaults to a fresh cell at 0.
    pub index: Option<Writable<usize>>,
    /// Arrow keys move the manual cursor instead of the auto cursor.
    pub manual: Setting<bool>,
    /// Up/Down bindings instead of Left/Right.
    pub vertical: Setting<bool>,
    /// Initial (and, if observable, forwarded) value of the `waiting` gate.
    pub wait: Setting<bool>,
    /// Initial (and, if observable, forwarded) value of `vertical_waiting`.
    pub vertical_wait: Setting<bool>,
    /// Called after `index_cb` on every reported auto cursor change.
    pub on_change: Option<IndexCallback>,
}

impl<T: Clone + 'static> NavigableSettings<T> {
    pub fn new(items: impl Into<Readable<Vec<T>>>) -> Self {
        Self {
            items: items.into(),
            index: None,
            manual: Setting::default(),
            vertical: Setting::default(),
            wait: Setting::default(),
            vertical_wait: Setting::default(),
            on_change: None,
        }
    }

    pub fn with_index(mut self, index: Writable<usize>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_manual(mut self, manual: impl Into<Setting<bool>>) -> Self {
        self.manual = manual.into();
        self
    }

    pub fn with_vertical(mut self, vertical: impl Into<Setting<bool>>) -> Self {
        self.vertical = vertical.into();
        self
    }

    pub fn with_wait(mut self, wait: impl Into<Setting<bool>>) -> Self {
        self.wait = wait.into();
        self
    }

    pub fn with_vertical_wait(mut self, vertical_wait: impl Into<Setting<bool>>) -> Self {
        self.vertical_wait = vertical_wait.into();
        self
    }

    pub fn with_on_change(mut self, on_change: impl Fn(usize) + 'static) -> Self {
        self.on_change = Some(Rc::new(on_change));
        self
    }
}

// =============================================================================
// CURSORS
// =============================================================================

/// The four state cells of one engine instance.
#[derive(Clone)]
pub struct Cursors {
    pub index: Writable<usize>,
    pub manual_index: Writable<usize>,
    pub waiting: Writable<bool>,
    pub vertical_waiting: Writable<bool>,
}

impl Cursors {
    /// Point both cursors at `index` and open both gates.
    fn select(&self, index: usize) {
        self.index.set(index);
        self.manual_index.set(index);
        clear_gate(&self.waiting);
        clear_gate(&self.vertical_waiting);
    }
}

/// Gates are only ever cleared by the engine; skip the write when already open
/// so streams observing the gate do not re-fire for an unchanged value.
fn clear_gate(gate: &Writable<bool>) {
    if gate.get() {
        gate.set(false);
    }
}

// =============================================================================
// SELECTION COMMAND
// =============================================================================

/// A prepared explicit selection, returned by [`Navigable::handle_selection`].
///
/// Nothing changes until [`run`](Selection::run) is called, typically from a
/// click or choice handler.
#[derive(Clone)]
pub struct Selection {
    cursors: Cursors,
    index: usize,
}

impl Selection {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn run(&self) {
        tracing::debug!(message = "navigable.select", index = self.index);
        self.cursors.select(self.index);
    }

    /// Convert into a plain callback for event binding.
    pub fn into_callback(self) -> impl Fn() + 'static {
        move || self.run()
    }
}

// =============================================================================
// CALLBACKS
// =============================================================================

/// Callbacks for [`Navigable::watch_navigation`].
#[derive(Clone, Default)]
pub struct NavigationCallbacks {
    /// Auto cursor changes, reported only while not waiting.
    pub index_cb: Option<IndexCallback>,
    /// Manual cursor changes, reported only while not waiting.
    pub manual_index_cb: Option<IndexCallback>,
}

impl NavigationCallbacks {
    pub fn with_index_cb(mut self, index_cb: impl Fn(usize) + 'static) -> Self {
        self.index_cb = Some(Rc::new(index_cb));
        self
    }

    pub fn with_manual_index_cb(mut self, manual_index_cb: impl Fn(usize) + 'static) -> Self {
        self.manual_index_cb = Some(Rc::new(manual_index_cb));
        self
    }
}

/// Snapshot handed to a move policy.
#[derive(Clone, Copy, Debug)]
struct Step {
    index: usize,
    length: usize,
    overflowed: bool,
    waiting: bool,
    vertical_waiting: bool,
}

impl Step {
    fn last(&self) -> usize {
        self.length - 1
    }
}

// =============================================================================
// NAVIGABLE
// =============================================================================

/// Keyboard navigation engine.
pub struct Navigable<T> {
    items: Readable<Vec<T>>,
    cursors: Cursors,
    manual: Readable<bool>,
    vertical: Readable<bool>,
    selected: Readable<Option<T>>,
    active: Readable<Option<T>>,
    on_change: Option<IndexCallback>,
    bridges: Vec<Cleanup>,
}

impl<T: Focusable + Clone + 'static> Navigable<T> {
    pub fn new(settings: NavigableSettings<T>) -> Self {
        let NavigableSettings {
            items,
            index,
            manual,
            vertical,
            wait,
            vertical_wait,
            on_change,
        } = settings;

        let mut bridges = Vec::new();
        let manual = normalize(manual, &mut bridges);
        let vertical = normalize(vertical, &mut bridges);
        let wait = normalize(wait, &mut bridges);
        let vertical_wait = normalize(vertical_wait, &mut bridges);

        let index = index.unwrap_or_else(|| Writable::new(0));
        let cursors = Cursors {
            manual_index: Writable::new(index.get()),
            waiting: Writable::new(wait.get()),
            vertical_waiting: Writable::new(vertical_wait.get()),
            index,
        };
        bridges.push(forward(&wait, &cursors.waiting));
        bridges.push(forward(&vertical_wait, &cursors.vertical_waiting));

        let selected = {
            let (items, index, waiting) = (items.clone(), cursors.index.clone(), cursors.waiting.clone());
            derived(
                vec![
                    Box::new(items.clone()),
                    Box::new(index.clone()),
                    Box::new(waiting.clone()),
                ],
                move || {
                    if waiting.get() {
                        None
                    } else {
                        items.get().get(index.get()).cloned()
                    }
                },
            )
        };

        let active = {
            let (items, manual_index) = (items.clone(), cursors.manual_index.clone());
            derived(
                vec![Box::new(items.clone()), Box::new(manual_index.clone())],
                move || items.get().get(manual_index.get()).cloned(),
            )
        };

        Self {
            items,
            cursors,
            manual,
            vertical,
            selected,
            active,
            on_change,
            bridges,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn items(&self) -> &Readable<Vec<T>> {
        &self.items
    }

    /// The auto cursor cell. Settable from outside.
    pub fn index(&self) -> &Writable<usize> {
        &self.cursors.index
    }

    pub fn manual_index(&self) -> &Writable<usize> {
        &self.cursors.manual_index
    }

    pub fn waiting(&self) -> &Writable<bool> {
        &self.cursors.waiting
    }

    pub fn vertical_waiting(&self) -> &Writable<bool> {
        &self.cursors.vertical_waiting
    }

    pub fn cursors(&self) -> &Cursors {
        &self.cursors
    }

    /// Item under the auto cursor, or `None` while waiting.
    pub fn selected(&self) -> &Readable<Option<T>> {
        &self.selected
    }

    /// Item under the manual cursor.
    pub fn active(&self) -> &Readable<Option<T>> {
        &self.active
    }

    pub fn is_manual(&self) -> bool {
        self.manual.get()
    }

    pub fn is_vertical(&self) -> bool {
        self.vertical.get()
    }

    /// Toggle the general wait gate (external gating condition).
    pub fn set_waiting(&self, waiting: bool) {
        self.cursors.waiting.set(waiting);
    }

    /// Toggle the vertical wait gate (external gating condition).
    pub fn set_vertical_waiting(&self, vertical_waiting: bool) {
        self.cursors.vertical_waiting.set(vertical_waiting);
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    fn navigate(&self, direction: Direction, policy: impl FnOnce(Step) -> usize) {
        let manual = self.manual.get();
        let target = if manual {
            &self.cursors.manual_index
        } else {
            &self.cursors.index
        };

        let length = self.items.get().len();
        if length == 0 {
            tracing::trace!(message = "navigable.move.empty", %direction);
            return;
        }

        let index = target.get();
        let step = Step {
            index,
            length,
            overflowed: direction.is_overflowed(index, length),
            waiting: self.cursors.waiting.get(),
            vertical_waiting: self.cursors.vertical_waiting.get(),
        };

        let next = policy(step);
        tracing::debug!(message = "navigable.move", %direction, from = index, to = next, manual);
        target.set(next);

        // Manual moves leave the general gate alone
        if !manual {
            clear_gate(&self.cursors.waiting);
        }
    }

    /// Move to the previous item, wrapping to the last.
    ///
    /// With `ctrl_key`, jump to the first item. While both gates are closed,
    /// open the vertical gate and jump to the last item instead.
    pub fn go_prev(&self, ctrl_key: bool) {
        let vertical_waiting = &self.cursors.vertical_waiting;
        self.navigate(Direction::Descending, |step| {
            if ctrl_key {
                return 0;
            }
            if step.waiting && step.vertical_waiting {
                vertical_waiting.set(false);
                return step.last();
            }
            if step.overflowed {
                step.last()
            } else {
                (step.index - 1).min(step.last())
            }
        });
    }

    /// Move to the next item, wrapping to the first.
    ///
    /// With `ctrl_key`, jump to the last item. While both gates are closed,
    /// open the vertical gate and jump to the first item instead.
    pub fn go_next(&self, ctrl_key: bool) {
        let vertical_waiting = &self.cursors.vertical_waiting;
        self.navigate(Direction::Ascending, |step| {
            if ctrl_key {
                return step.last();
            }
            if step.waiting && step.vertical_waiting {
                vertical_waiting.set(false);
                return 0;
            }
            if step.overflowed { 0 } else { step.index + 1 }
        });
    }

    // -------------------------------------------------------------------------
    // Handlers
    // -------------------------------------------------------------------------

    /// Map an arrow key to a move for the current orientation.
    ///
    /// Mapped keys have their default prevented and return `true`. Anything
    /// else, including key releases, is left untouched.
    pub fn handle_keyboard(&self, event: &KeyboardEvent) -> bool {
        if !event.is_down() {
            return false;
        }

        let action: Option<fn(&Self, bool)> = match (self.vertical.get(), event.key.as_str()) {
            (true, "ArrowUp") => Some(Self::go_prev),
            (true, "ArrowDown") => Some(Self::go_next),
            (false, "ArrowRight") => Some(Self::go_next),
            (false, "ArrowLeft") => Some(Self::go_prev),
            _ => None,
        };

        match action {
            Some(action) => {
                event.prevent_default();
                action(self, event.ctrl_key());
                true
            }
            None => {
                tracing::trace!(message = "navigable.key.ignored", key = %event.key);
                false
            }
        }
    }

    /// Prepare an explicit selection of `index`.
    pub fn handle_selection(&self, index: usize) -> Selection {
        Selection {
            cursors: self.cursors.clone(),
            index,
        }
    }

    /// Type-ahead: select the first item whose label starts with the typed
    /// key, ignoring case. Returns the matched position.
    ///
    /// An empty key never matches. Keys without a text form (function keys,
    /// modifiers alone) arrive as `""` and would otherwise select the first
    /// item on every press.
    pub fn handle_key_match(&self, event: &KeyboardEvent) -> Option<usize> {
        if !event.is_down() || event.key.is_empty() {
            return None;
        }

        let key = event.key.to_lowercase();
        let position = self
            .items
            .get()
            .iter()
            .position(|item| item.label().to_lowercase().starts_with(&key))?;

        tracing::debug!(message = "navigable.key_match", key = %event.key, position);
        self.cursors.select(position);
        Some(position)
    }

    // -------------------------------------------------------------------------
    // Watchers
    // -------------------------------------------------------------------------

    /// Push cursor changes into focus and callbacks.
    ///
    /// Two streams, both run once immediately:
    /// - auto: while not waiting, focus the selected item, then call
    ///   `index_cb` followed by the `on_change` setting
    /// - manual: focus the active item unless waiting in auto mode; while not
    ///   waiting, call `manual_index_cb`
    pub fn watch_navigation(&self, callbacks: NavigationCallbacks) -> Cleanup {
        let NavigationCallbacks {
            index_cb,
            manual_index_cb,
        } = callbacks;

        let auto_stream = {
            let (index, selected, waiting) = (
                self.cursors.index.clone(),
                self.selected.clone(),
                self.cursors.waiting.clone(),
            );
            derived(
                vec![
                    Box::new(self.items.clone()),
                    Box::new(index.clone()),
                    Box::new(waiting.clone()),
                ],
                move || (index.get(), selected.get(), waiting.get()),
            )
        };

        let manual_stream = {
            let (manual_index, waiting, manual, active) = (
                self.cursors.manual_index.clone(),
                self.cursors.waiting.clone(),
                self.manual.clone(),
                self.active.clone(),
            );
            derived(
                vec![
                    Box::new(self.items.clone()),
                    Box::new(manual_index.clone()),
                    Box::new(waiting.clone()),
                    Box::new(manual.clone()),
                ],
                move || (manual_index.get(), waiting.get(), manual.get(), active.get()),
            )
        };

        let on_change = self.on_change.clone();
        let stop_auto = auto_stream.subscribe(move |(index, selected, waiting)| {
            if *waiting {
                return;
            }
            tracing::trace!(message = "navigable.stream.auto", index = *index);
            if let Some(selected) = selected {
                selected.focus();
            }
            if let Some(index_cb) = &index_cb {
                index_cb(*index);
                if let Some(on_change) = &on_change {
                    on_change(*index);
                }
            }
        });

        let stop_manual = manual_stream.subscribe(move |(index, waiting, manual, active)| {
            tracing::trace!(message = "navigable.stream.manual", index = *index);
            if let Some(active) = active {
                if !*waiting || *manual {
                    active.focus();
                }
            }
            if !*waiting {
                if let Some(manual_index_cb) = &manual_index_cb {
                    manual_index_cb(*index);
                }
            }
        });

        Box::new(move || {
            stop_auto();
            stop_manual();
        })
    }

    /// Observe the active item as `(current, previous)`.
    pub fn watch_active(&self, callback: impl Fn(Option<&T>, Option<&T>) + 'static) -> Cleanup {
        let previous: RefCell<Option<T>> = RefCell::new(None);
        self.active.subscribe(move |active| {
            let prior = previous.replace(active.clone());
            callback(active.as_ref(), prior.as_ref());
        })
    }

    /// Observe the selected item as `(current, previous)`.
    ///
    /// Only called while an item is selected; `previous` is whatever the last
    /// observed value was, including `None`.
    pub fn watch_selected(&self, callback: impl Fn(&T, Option<&T>) + 'static) -> Cleanup {
        let previous: RefCell<Option<T>> = RefCell::new(None);
        self.selected.subscribe(move |selected| {
            let prior = previous.replace(selected.clone());
            if let Some(selected) = selected {
                callback(selected, prior.as_ref());
            }
        })
    }

    // -------------------------------------------------------------------------
    // Status & lifecycle
    // -------------------------------------------------------------------------

    /// Observable `index == auto cursor`.
    pub fn is_selected(&self, index: usize) -> Readable<bool> {
        let cursor = self.cursors.index.clone();
        derived(vec![Box::new(cursor.clone())], move || cursor.get() == index)
    }

    /// Hand the state cells to `callback` for caller-managed teardown.
    pub fn on_destroy(&self, callback: impl FnOnce(&Cursors)) {
        callback(&self.cursors);
    }
}

impl<T> Drop for Navigable<T> {
    fn drop(&mut self) {
        for stop in self.bridges.drain(..) {
            stop();
        }
    }
}

fn normalize(setting: Setting<bool>, bridges: &mut Vec<Cleanup>) -> Readable<bool> {
    let (readable, stop) = setting.into_readable();
    bridges.extend(stop);
    readable
}

/// Forward later changes of an observable setting into a gate.
fn forward(source: &Readable<bool>, gate: &Writable<bool>) -> Cleanup {
    let (reader, gate) = (source.clone(), gate.clone());
    source.on_change(Rc::new(move || gate.set(reader.get())))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Modifiers;
    use std::borrow::Cow;
    use std::cell::Cell;

    type Log = Rc<RefCell<Vec<String>>>;

    #[derive(Clone, Debug, PartialEq)]
    struct Item {
        label: String,
        log: Log,
    }

    impl Focusable for Item {
        fn focus(&self) {
            self.log.borrow_mut().push(format!("focus:{}", self.label));
        }

        fn label(&self) -> Cow<'_, str> {
            Cow::Borrowed(&self.label)
        }
    }

    fn items(labels: &[&str], log: &Log) -> Writable<Vec<Item>> {
        Writable::new(
            labels
                .iter()
                .map(|label| Item {
                    label: label.to_string(),
                    log: log.clone(),
                })
                .collect(),
        )
    }

    fn setup(labels: &[&str]) -> (Navigable<Item>, Writable<Vec<Item>>, Log) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let items = items(labels, &log);
        let nav = Navigable::new(NavigableSettings::new(items.clone()));
        (nav, items, log)
    }

    fn labels_of(item: Option<Item>) -> Option<String> {
        item.map(|item| item.label)
    }

    // -------------------------------------------------------------------------
    // Moves
    // -------------------------------------------------------------------------

    #[test]
    fn test_go_next_wraps() {
        let (nav, _items, _log) = setup(&["a", "b", "c"]);

        nav.go_next(false);
        assert_eq!(nav.index().get(), 1);
        nav.go_next(false);
        assert_eq!(nav.index().get(), 2);
        nav.go_next(false);
        assert_eq!(nav.index().get(), 0);
    }

    #[test]
    fn test_go_prev_wraps() {
        let (nav, _items, _log) = setup(&["a", "b", "c"]);

        nav.go_prev(false);
        assert_eq!(nav.index().get(), 2);
        nav.go_prev(false);
        assert_eq!(nav.index().get(), 1);
    }

    #[test]
    fn test_ctrl_jumps_to_ends() {
        let (nav, _items, _log) = setup(&["a", "b", "c", "d"]);
        nav.index().set(1);

        nav.go_next(true);
        assert_eq!(nav.index().get(), 3);
        nav.go_prev(true);
        assert_eq!(nav.index().get(), 0);
    }

    #[test]
    fn test_vertical_waiting_jumps_and_clears() {
        let (nav, _items, _log) = setup(&["a", "b", "c"]);
        nav.index().set(1);
        nav.set_waiting(true);
        nav.set_vertical_waiting(true);

        nav.go_next(false);
        assert_eq!(nav.index().get(), 0);
        assert!(!nav.vertical_waiting().get());
        // Auto cursor move opens the general gate afterwards
        assert!(!nav.waiting().get());

        nav.set_waiting(true);
        nav.set_vertical_waiting(true);
        nav.go_prev(false);
        assert_eq!(nav.index().get(), 2);
        assert!(!nav.vertical_waiting().get());
    }

    #[test]
    fn test_vertical_waiting_jump_keeps_waiting_in_manual_mode() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let nav = Navigable::new(
            NavigableSettings::new(items(&["a", "b", "c"], &log))
                .with_manual(true)
                .with_wait(true)
                .with_vertical_wait(true),
        );
        nav.manual_index().set(1);

        nav.go_next(false);
        assert_eq!(nav.manual_index().get(), 0);
        assert!(!nav.vertical_waiting().get());
        assert!(nav.waiting().get());

        nav.manual_index().set(1);
        nav.set_vertical_waiting(true);
        nav.go_prev(false);
        assert_eq!(nav.manual_index().get(), 2);
        assert!(!nav.vertical_waiting().get());
        assert!(nav.waiting().get());
        assert_eq!(nav.index().get(), 0);
    }

    #[test]
    fn test_go_next_from_max_index_wraps() {
        let (nav, _items, _log) = setup(&["a", "b"]);
        nav.index().set(usize::MAX);

        nav.go_next(false);
        assert_eq!(nav.index().get(), 0);
    }

    #[test]
    fn test_vertical_waiting_alone_moves_normally() {
        let (nav, _items, _log) = setup(&["a", "b", "c"]);
        nav.set_vertical_waiting(true);

        nav.go_next(false);
        assert_eq!(nav.index().get(), 1);
        assert!(nav.vertical_waiting().get());
    }

    #[test]
    fn test_auto_move_clears_waiting() {
        let (nav, _items, _log) = setup(&["a", "b"]);
        nav.set_waiting(true);
        assert_eq!(labels_of(nav.selected().get()), None);

        nav.go_next(false);
        assert!(!nav.waiting().get());
        assert_eq!(labels_of(nav.selected().get()), Some("b".to_string()));
    }

    #[test]
    fn test_manual_move_keeps_waiting() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let items = items(&["a", "b", "c"], &log);
        let nav = Navigable::new(
            NavigableSettings::new(items)
                .with_manual(true)
                .with_wait(true),
        );

        nav.go_next(false);
        assert_eq!(nav.manual_index().get(), 1);
        assert_eq!(nav.index().get(), 0);
        assert!(nav.waiting().get());
        assert_eq!(labels_of(nav.active().get()), Some("b".to_string()));
    }

    #[test]
    fn test_manual_setting_switches_at_runtime() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let manual = Writable::new(false);
        let nav = Navigable::new(NavigableSettings::new(items(&["a", "b"], &log)).with_manual(manual.clone()));

        nav.go_next(false);
        assert_eq!((nav.index().get(), nav.manual_index().get()), (1, 0));

        manual.set(true);
        nav.go_next(false);
        assert_eq!((nav.index().get(), nav.manual_index().get()), (1, 1));
    }

    #[test]
    fn test_empty_collection_is_noop() {
        let (nav, _items, _log) = setup(&[]);
        nav.set_waiting(true);

        nav.go_next(false);
        nav.go_prev(true);
        assert_eq!(nav.index().get(), 0);
        assert!(nav.waiting().get());
    }

    #[test]
    fn test_shrunk_collection_wraps_back_in_range() {
        let (nav, items, _log) = setup(&["a", "b", "c", "d"]);
        nav.index().set(3);
        items.update(|current| current[..2].to_vec());

        nav.go_next(false);
        assert_eq!(nav.index().get(), 0);

        nav.index().set(3);
        nav.go_prev(false);
        assert_eq!(nav.index().get(), 1);
    }

    // -------------------------------------------------------------------------
    // Keyboard
    // -------------------------------------------------------------------------

    #[test]
    fn test_horizontal_bindings() {
        let (nav, _items, _log) = setup(&["a", "b", "c"]);

        let right = KeyboardEvent::new("ArrowRight");
        assert!(nav.handle_keyboard(&right));
        assert!(right.default_prevented());
        assert_eq!(nav.index().get(), 1);

        assert!(nav.handle_keyboard(&KeyboardEvent::new("ArrowLeft")));
        assert_eq!(nav.index().get(), 0);

        let down = KeyboardEvent::new("ArrowDown");
        assert!(!nav.handle_keyboard(&down));
        assert!(!down.default_prevented());
        assert_eq!(nav.index().get(), 0);
    }

    #[test]
    fn test_vertical_bindings() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let nav = Navigable::new(NavigableSettings::new(items(&["a", "b", "c"], &log)).with_vertical(true));

        assert!(nav.handle_keyboard(&KeyboardEvent::new("ArrowDown")));
        assert_eq!(nav.index().get(), 1);
        assert!(nav.handle_keyboard(&KeyboardEvent::new("ArrowUp")));
        assert_eq!(nav.index().get(), 0);

        let right = KeyboardEvent::new("ArrowRight");
        assert!(!nav.handle_keyboard(&right));
        assert!(!right.default_prevented());
    }

    #[test]
    fn test_ctrl_arrow() {
        let (nav, _items, _log) = setup(&["a", "b", "c"]);
        nav.handle_keyboard(&KeyboardEvent::with_modifiers("ArrowRight", Modifiers::CTRL));
        assert_eq!(nav.index().get(), 2);
    }

    #[test]
    fn test_release_ignored() {
        let (nav, _items, _log) = setup(&["a", "b"]);
        let event = KeyboardEvent::new("ArrowRight").with_state(crate::state::KeyState::Release);
        assert!(!nav.handle_keyboard(&event));
        assert_eq!(nav.index().get(), 0);
    }

    #[test]
    fn test_unmapped_key_leaves_state() {
        let (nav, _items, _log) = setup(&["a", "b"]);
        nav.set_waiting(true);
        let event = KeyboardEvent::new("Enter");

        assert!(!nav.handle_keyboard(&event));
        assert!(!event.default_prevented());
        assert!(nav.waiting().get());
    }

    // -------------------------------------------------------------------------
    // Selection & type-ahead
    // -------------------------------------------------------------------------

    #[test]
    fn test_selection_is_late_bound() {
        let (nav, _items, _log) = setup(&["a", "b", "c"]);
        nav.set_waiting(true);
        nav.set_vertical_waiting(true);

        let selection = nav.handle_selection(2);
        assert_eq!(selection.index(), 2);
        assert_eq!(nav.index().get(), 0);

        let callback = selection.into_callback();
        callback();
        assert_eq!(nav.index().get(), 2);
        assert_eq!(nav.manual_index().get(), 2);
        assert!(!nav.waiting().get());
        assert!(!nav.vertical_waiting().get());
    }

    #[test]
    fn test_key_match_first_prefix() {
        let (nav, _items, _log) = setup(&["Apple", "Banana", "Berry"]);

        assert_eq!(nav.handle_key_match(&KeyboardEvent::new("b")), Some(1));
        assert_eq!(nav.index().get(), 1);
        assert_eq!(nav.manual_index().get(), 1);

        assert_eq!(nav.handle_key_match(&KeyboardEvent::new("A")), Some(0));
        assert_eq!(nav.index().get(), 0);
    }

    #[test]
    fn test_key_match_miss_leaves_state() {
        let (nav, _items, _log) = setup(&["Apple", "Banana"]);
        nav.index().set(1);
        nav.set_waiting(true);

        assert_eq!(nav.handle_key_match(&KeyboardEvent::new("z")), None);
        assert_eq!(nav.index().get(), 1);
        assert!(nav.waiting().get());
    }

    #[test]
    fn test_key_match_ignores_empty_key() {
        let (nav, _items, _log) = setup(&["Apple", "Banana"]);
        nav.index().set(1);

        assert_eq!(nav.handle_key_match(&KeyboardEvent::new("")), None);
        assert_eq!(nav.index().get(), 1);
    }

    #[test]
    fn test_key_match_clears_gates() {
        let (nav, _items, _log) = setup(&["Apple", "Banana"]);
        nav.set_waiting(true);
        nav.set_vertical_waiting(true);

        nav.handle_key_match(&KeyboardEvent::new("b"));
        assert!(!nav.waiting().get());
        assert!(!nav.vertical_waiting().get());
    }

    // -------------------------------------------------------------------------
    // Watchers
    // -------------------------------------------------------------------------

    #[test]
    fn test_watch_navigation_initial_run() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let change_log = log.clone();
        let nav = Navigable::new(
            NavigableSettings::new(items(&["a", "b"], &log))
                .with_on_change(move |index| change_log.borrow_mut().push(format!("change:{index}"))),
        );

        let (index_log, manual_log) = (log.clone(), log.clone());
        let _stop = nav.watch_navigation(
            NavigationCallbacks::default()
                .with_index_cb(move |index| index_log.borrow_mut().push(format!("index:{index}")))
                .with_manual_index_cb(move |index| manual_log.borrow_mut().push(format!("manual:{index}"))),
        );

        assert_eq!(
            *log.borrow(),
            vec!["focus:a", "index:0", "change:0", "focus:a", "manual:0"]
        );
    }

    #[test]
    fn test_watch_navigation_follows_moves() {
        let (nav, _items, log) = setup(&["a", "b", "c"]);
        let index_log = log.clone();
        let _stop = nav.watch_navigation(
            NavigationCallbacks::default().with_index_cb(move |index| index_log.borrow_mut().push(format!("index:{index}"))),
        );
        log.borrow_mut().clear();

        nav.go_next(false);
        assert_eq!(*log.borrow(), vec!["focus:b", "index:1"]);
    }

    #[test]
    fn test_on_change_needs_index_cb() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        let nav = Navigable::new(
            NavigableSettings::new(items(&["a", "b"], &log)).with_on_change(move |_| count_clone.set(count_clone.get() + 1)),
        );

        let _stop = nav.watch_navigation(NavigationCallbacks::default());
        nav.go_next(false);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_waiting_suppresses_auto_focus() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let nav = Navigable::new(NavigableSettings::new(items(&["a", "b"], &log)).with_wait(true));
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();

        let _stop = nav.watch_navigation(
            NavigationCallbacks::default()
                .with_index_cb(move |_| calls_clone.set(calls_clone.get() + 1)),
        );

        assert!(log.borrow().is_empty());
        assert_eq!(calls.get(), 0);

        // Opening the gate lets both streams through
        nav.set_waiting(false);
        assert_eq!(calls.get(), 1);
        assert_eq!(*log.borrow(), vec!["focus:a", "focus:a"]);
    }

    #[test]
    fn test_manual_mode_focuses_active_while_waiting() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let nav = Navigable::new(
            NavigableSettings::new(items(&["a", "b", "c"], &log))
                .with_manual(true)
                .with_wait(true),
        );
        let manual_calls = Rc::new(Cell::new(0));
        let manual_calls_clone = manual_calls.clone();
        let _stop = nav.watch_navigation(
            NavigationCallbacks::default()
                .with_manual_index_cb(move |_| manual_calls_clone.set(manual_calls_clone.get() + 1)),
        );
        log.borrow_mut().clear();

        nav.go_next(false);
        assert_eq!(*log.borrow(), vec!["focus:b"]);
        // Still waiting, so no manual callback
        assert_eq!(manual_calls.get(), 0);
    }

    #[test]
    fn test_watch_navigation_cleanup() {
        let (nav, _items, log) = setup(&["a", "b"]);
        let stop = nav.watch_navigation(NavigationCallbacks::default());
        stop();
        log.borrow_mut().clear();

        nav.go_next(false);
        assert!(log.borrow().is_empty());
        assert_eq!(nav.index().subscriber_count(), 0);
    }

    #[test]
    fn test_watch_selected_tracks_previous() {
        let (nav, _items, _log) = setup(&["a", "b", "c"]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        let _stop = nav.watch_selected(move |current, previous| {
            seen_clone
                .borrow_mut()
                .push((current.label.clone(), previous.map(|item| item.label.clone())));
        });

        nav.set_waiting(true);
        nav.go_next(false);

        assert_eq!(
            *seen.borrow(),
            vec![
                ("a".to_string(), None),
                // go_next writes the cursor while still waiting, then opens the gate
                ("b".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_watch_active_reports_every_change() {
        let (nav, _items, _log) = setup(&["a", "b"]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        let _stop = nav.watch_active(move |current, previous| {
            seen_clone.borrow_mut().push((
                current.map(|item| item.label.clone()),
                previous.map(|item| item.label.clone()),
            ));
        });

        nav.manual_index().set(1);
        nav.manual_index().set(5);

        assert_eq!(
            *seen.borrow(),
            vec![
                (Some("a".to_string()), None),
                (Some("b".to_string()), Some("a".to_string())),
                (None, Some("b".to_string())),
            ]
        );
    }

    // -------------------------------------------------------------------------
    // Status, settings, lifecycle
    // -------------------------------------------------------------------------

    #[test]
    fn test_is_selected() {
        let (nav, _items, _log) = setup(&["a", "b", "c"]);
        let first = nav.is_selected(0);
        let second = nav.is_selected(1);
        let changes = Rc::new(RefCell::new(Vec::new()));
        let changes_clone = changes.clone();
        let _stop = second.subscribe(move |value| changes_clone.borrow_mut().push(*value));

        assert!(first.get());
        assert!(!second.get());

        nav.go_next(false);
        assert!(!first.get());
        assert!(second.get());
        assert_eq!(*changes.borrow(), vec![false, true]);
    }

    #[test]
    fn test_external_index_restores_selection() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let index = Writable::new(2);
        let nav = Navigable::new(NavigableSettings::new(items(&["a", "b", "c"], &log)).with_index(index.clone()));

        assert_eq!(nav.manual_index().get(), 2);
        assert_eq!(labels_of(nav.selected().get()), Some("c".to_string()));

        index.set(0);
        assert_eq!(labels_of(nav.selected().get()), Some("a".to_string()));
    }

    #[test]
    fn test_observable_wait_forwards_into_gate() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let wait = Writable::new(true);
        let vertical_wait = Writable::new(false);
        let nav = Navigable::new(
            NavigableSettings::new(items(&["a"], &log))
                .with_wait(wait.clone())
                .with_vertical_wait(vertical_wait.clone()),
        );
        assert!(nav.waiting().get());

        wait.set(false);
        vertical_wait.set(true);
        assert!(!nav.waiting().get());
        assert!(nav.vertical_waiting().get());
    }

    #[test]
    fn test_vertical_setting_toggles_bindings() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let vertical = Writable::new(false);
        let nav = Navigable::new(NavigableSettings::new(items(&["a", "b"], &log)).with_vertical(vertical.clone()));

        assert!(!nav.is_vertical());
        vertical.set(true);
        assert!(nav.is_vertical());
        assert!(nav.handle_keyboard(&KeyboardEvent::new("ArrowDown")));
        assert_eq!(nav.index().get(), 1);
    }

    #[test]
    fn test_on_destroy_hands_out_cells() {
        let (nav, _items, _log) = setup(&["a", "b"]);
        let captured: RefCell<Option<Cursors>> = RefCell::new(None);

        nav.on_destroy(|cursors| {
            *captured.borrow_mut() = Some(cursors.clone());
        });

        let cursors = captured.into_inner().unwrap();
        cursors.index.set(1);
        assert_eq!(nav.index().get(), 1);
        assert!(!cursors.waiting.get());
    }

    #[test]
    fn test_instances_are_independent() {
        let (first, _a, _la) = setup(&["a", "b", "c"]);
        let (second, _b, _lb) = setup(&["a", "b", "c"]);

        first.go_next(false);
        assert_eq!(first.index().get(), 1);
        assert_eq!(second.index().get(), 0);
    }
}

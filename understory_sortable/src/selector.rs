// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selected slices of container state that report only real changes.
//!
//! A render layer rarely needs the whole [`ContainerState`]. A [`Selector`] projects
//! a slice and remembers the last value; [`Selector::check`] returns `true` only when
//! the newly selected slice differs from it. A [`Watch`] runs a selector as a store
//! listener so the host can ask "did my slice change since I last looked?" after
//! any number of dispatches.
//!
//! ```
//! use understory_sortable::selector::Watch;
//! use understory_sortable::store::{Action, ContainerState, Store};
//! use understory_sortable::{ContainerId, Item};
//!
//! let mut store = Store::new(ContainerState::new(
//!     ContainerId::root("s1"),
//!     vec![Item::new("a"), Item::new("b")],
//! ));
//! let watch = Watch::attach(&mut store, |s: &ContainerState<Item>| s.items().len());
//! store.dispatch(Action::Moving(true));
//! assert!(!watch.take_changed()); // item count unchanged
//! store.dispatch(Action::Remove { id: "a".into() });
//! assert!(watch.take_changed());
//! assert_eq!(watch.get(), 1);
//! ```

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use crate::store::{ContainerState, Store};
use crate::types::{ListenerId, SortableItem};

type SelectFn<T, S> = Box<dyn Fn(&ContainerState<T>) -> S>;

/// Projects a slice of state and detects when it changes.
pub struct Selector<T, S> {
    select: SelectFn<T, S>,
    equal: fn(&S, &S) -> bool,
    last: Option<S>,
}

impl<T, S: fmt::Debug> fmt::Debug for Selector<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

impl<T: SortableItem, S: PartialEq> Selector<T, S> {
    /// A selector compared with `PartialEq`.
    pub fn new(select: impl Fn(&ContainerState<T>) -> S + 'static) -> Self {
        Self::with_equality(select, |a, b| a == b)
    }
}

impl<T: SortableItem, S> Selector<T, S> {
    /// A selector compared with a custom equality.
    pub fn with_equality(
        select: impl Fn(&ContainerState<T>) -> S + 'static,
        equal: fn(&S, &S) -> bool,
    ) -> Self {
        Self {
            select: Box::new(select),
            equal,
            last: None,
        }
    }

    /// Re-select from `state`; returns `true` if the slice changed.
    ///
    /// The first check always reports a change.
    pub fn check(&mut self, state: &ContainerState<T>) -> bool {
        let next = (self.select)(state);
        let changed = self.last.as_ref().is_none_or(|last| !(self.equal)(last, &next));
        if changed {
            self.last = Some(next);
        }
        changed
    }

    /// The last selected slice.
    pub fn last(&self) -> Option<&S> {
        self.last.as_ref()
    }
}

struct WatchState<S> {
    value: S,
    changed: bool,
}

/// A selector running as a store listener.
pub struct Watch<S> {
    listener: ListenerId,
    state: Rc<RefCell<WatchState<S>>>,
}

impl<S: fmt::Debug> fmt::Debug for Watch<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Watch")
            .field("listener", &self.listener)
            .field("value", &state.value)
            .field("changed", &state.changed)
            .finish()
    }
}

impl<S: PartialEq + 'static> Watch<S> {
    /// Select from `store` now and on every effective dispatch.
    pub fn attach<T: SortableItem + 'static>(
        store: &mut Store<T>,
        select: impl Fn(&ContainerState<T>) -> S + 'static,
    ) -> Self {
        let state = Rc::new(RefCell::new(WatchState {
            value: select(store.state()),
            changed: false,
        }));
        let shared = state.clone();
        let listener = store.subscribe(move |s| {
            let next = select(s);
            let mut watch = shared.borrow_mut();
            if watch.value != next {
                watch.value = next;
                watch.changed = true;
            }
        });
        Self { listener, state }
    }
}

impl<S> Watch<S> {
    /// Returns `true` once per change of the selected slice.
    pub fn take_changed(&self) -> bool {
        core::mem::take(&mut self.state.borrow_mut().changed)
    }

    /// Run `f` on the current slice.
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.state.borrow().value)
    }

    /// Stop watching.
    pub fn detach<T: SortableItem>(self, store: &mut Store<T>) -> bool {
        store.unsubscribe(self.listener)
    }
}

impl<S: Clone> Watch<S> {
    /// A copy of the current slice.
    pub fn get(&self) -> S {
        self.state.borrow().value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Action;
    use crate::types::{ContainerId, Item, Relation};
    use alloc::string::String;
    use alloc::vec::Vec;

    fn store() -> Store<Item> {
        Store::new(ContainerState::new(
            ContainerId::root("s1"),
            ["a", "b", "c"].map(Item::new).to_vec(),
        ))
    }

    fn order(s: &ContainerState<Item>) -> Vec<String> {
        s.ids().into_iter().map(String::from).collect()
    }

    #[test]
    fn selector_reports_first_and_changed_values_only() {
        let mut store = store();
        let mut sel = Selector::new(order);
        assert!(sel.check(store.state()));
        assert!(!sel.check(store.state()));
        store.dispatch(Action::Move {
            source: "a".into(),
            target: "b".into(),
            relation: Relation::After,
        });
        assert!(sel.check(store.state()));
        assert_eq!(sel.last().map(Vec::len), Some(3));
    }

    #[test]
    fn custom_equality_can_ignore_order() {
        let mut store = store();
        let mut sel =
            Selector::with_equality(order, |a: &Vec<String>, b: &Vec<String>| a.len() == b.len());
        sel.check(store.state());
        store.dispatch(Action::Move {
            source: "c".into(),
            target: "a".into(),
            relation: Relation::Before,
        });
        assert!(!sel.check(store.state()));
    }

    #[test]
    fn watch_tracks_dispatches_until_detached() {
        let mut store = store();
        let watch = Watch::attach(&mut store, |s: &ContainerState<Item>| s.moving());
        assert!(!watch.take_changed());
        store.dispatch(Action::Moving(true));
        assert!(watch.take_changed());
        assert!(!watch.take_changed());
        assert!(watch.with(|m| *m));
        assert!(watch.detach(&mut store));
        assert_eq!(store.listener_count(), 0);
    }
}

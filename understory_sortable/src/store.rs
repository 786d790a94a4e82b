// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-container state and its reducer.
//!
//! ## State
//!
//! [`ContainerState`] holds the ordered items of one container, the pre-drag backup,
//! the move log of the current gesture, the animation flag and the visible set.
//! Item order is authoritative; indices are derived by lookup and never stored.
//!
//! ## Actions
//!
//! Every transition is one [`Action`] variant, matched exhaustively by
//! [`ContainerState::apply`], which returns whether the state changed. Actions that
//! reference ids no longer present are silent no-ops: drag gestures race with host
//! updates and stale input is expected.
//!
//! ## Move rejection
//!
//! [`ContainerState::check_move`] is the single source of truth for whether a move
//! commits; the hover resolver consults it before staging and the reducer consults
//! it again when applying. A move is rejected when:
//!
//! - either id is unknown, or both resolve to the same index;
//! - the relation is [`Relation::None`];
//! - the relation is already satisfied (`Before` with source ahead of target, or
//!   `After` with source behind target);
//! - an animation is in flight and the target index lies within the span of the
//!   last committed move.
//!
//! ```
//! use understory_sortable::store::{Action, ContainerState};
//! use understory_sortable::{ContainerId, Item, Relation};
//!
//! let items = ["a", "b", "c"].map(Item::new).to_vec();
//! let mut state = ContainerState::new(ContainerId::root("s1"), items);
//! let mv = || Action::Move { source: "a".into(), target: "c".into(), relation: Relation::After };
//! assert!(state.apply(mv()));
//! assert_eq!(state.ids(), ["b", "c", "a"]);
//! // Repeating the move is a no-op.
//! assert!(!state.apply(mv()));
//! ```

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashSet;

use crate::entry::{Entry, LiveRect};
use crate::types::{ContainerId, ListenerId, Relation, SortLog, SortableItem};

/// A state transition for one container.
#[derive(Clone, Debug)]
pub enum Action<T> {
    /// Replace the items with a host-supplied collection.
    ///
    /// Ignored when the data is unchanged. Internal fields of items present before
    /// and after (matched by id) are preserved.
    Init(Vec<T>),
    /// Attach a live rectangle accessor to an item.
    Register {
        /// Item id.
        id: String,
        /// Accessor measuring the item's element.
        rect: LiveRect,
    },
    /// Move `source` next to `target`.
    Move {
        /// Id of the dragged item.
        source: String,
        /// Id of the sibling it lands next to.
        target: String,
        /// Which side of `target` it lands on.
        relation: Relation,
    },
    /// Insert an item arriving from another container.
    MoveIn {
        /// Insertion index; `None` appends.
        index: Option<usize>,
        /// The arriving item.
        item: Entry<T>,
    },
    /// Take out an item leaving for another container.
    MoveOut {
        /// Item id.
        id: String,
    },
    /// Delete an item.
    Remove {
        /// Item id.
        id: String,
    },
    /// Replace an item's data in place.
    Update(T),
    /// A drag began: snapshot the items and remember the dragged item.
    Dragging(Entry<T>),
    /// The gesture committed: drop the snapshot and the move log.
    Drop,
    /// The gesture was cancelled: restore the snapshot.
    Reset,
    /// A reorder animation started (`true`) or finished (`false`).
    Moving(bool),
    /// Set the ids currently within the viewport.
    Observed(Vec<String>),
}

/// Why a move was not committed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MoveRejection {
    /// The source or the target id is not in this container.
    #[error("source or target is not in this container")]
    Unresolved,
    /// Source and target are the same slot.
    #[error("source and target resolve to the same index")]
    SameIndex,
    /// No directional relation was given.
    #[error("no relation")]
    NoRelation,
    /// The ordering the move asks for already holds.
    #[error("ordering already satisfied")]
    AlreadySatisfied,
    /// The target is still animating from the previous move.
    #[error("target is inside the span of an in-flight move")]
    InFlight,
}

/// State of one container.
#[derive(Clone, Debug)]
pub struct ContainerState<T> {
    id: ContainerId,
    items: Vec<Entry<T>>,
    backup: Vec<Entry<T>>,
    logs: Vec<SortLog>,
    moving: bool,
    active: Option<HashSet<String>>,
    dragging: Option<Entry<T>>,
}

impl<T: SortableItem> ContainerState<T> {
    /// Fresh state holding `items` in order.
    pub fn new(id: ContainerId, items: Vec<T>) -> Self {
        Self {
            id,
            items: items.into_iter().map(Entry::new).collect(),
            backup: Vec::new(),
            logs: Vec::new(),
            moving: false,
            active: None,
            dragging: None,
        }
    }

    /// The container id.
    pub fn id(&self) -> &ContainerId {
        &self.id
    }

    /// Items in display order.
    pub fn items(&self) -> &[Entry<T>] {
        &self.items
    }

    /// Item ids in display order.
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(Entry::id).collect()
    }

    /// Host data in display order, internal fields stripped.
    pub fn data(&self) -> Vec<T> {
        self.items.iter().map(|e| e.data.clone()).collect()
    }

    /// Pre-drag snapshot; empty outside a gesture.
    pub fn backup(&self) -> &[Entry<T>] {
        &self.backup
    }

    /// Moves committed during the current gesture.
    pub fn logs(&self) -> &[SortLog] {
        &self.logs
    }

    /// The most recent committed move.
    pub fn last_log(&self) -> Option<&SortLog> {
        self.logs.last()
    }

    /// Whether a reorder animation is in flight.
    pub fn moving(&self) -> bool {
        self.moving
    }

    /// The item being dragged, if a gesture is in progress.
    pub fn dragging(&self) -> Option<&Entry<T>> {
        self.dragging.as_ref()
    }

    /// Whether a gesture affecting this container is in progress.
    pub fn in_gesture(&self) -> bool {
        self.dragging.is_some() || !self.backup.is_empty()
    }

    /// Index of the item with `id`.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|e| e.id() == id)
    }

    /// The item with `id`.
    pub fn get(&self, id: &str) -> Option<&Entry<T>> {
        self.items.iter().find(|e| e.id() == id)
    }

    /// Whether `id` is visible. Everything is visible until visibility is reported.
    pub fn is_active(&self, id: &str) -> bool {
        self.active.as_ref().is_none_or(|set| set.contains(id))
    }

    /// Visible items in display order.
    pub fn active_items(&self) -> impl Iterator<Item = &Entry<T>> + '_ {
        self.items.iter().filter(|e| self.is_active(e.id()))
    }

    /// Decide whether a move would commit; returns `(source_index, target_index)`.
    pub fn check_move(
        &self,
        source: &str,
        target: &str,
        relation: Relation,
    ) -> Result<(usize, usize), MoveRejection> {
        let (Some(si), Some(ti)) = (self.index_of(source), self.index_of(target)) else {
            return Err(MoveRejection::Unresolved);
        };
        if si == ti {
            return Err(MoveRejection::SameIndex);
        }
        match relation {
            Relation::None => return Err(MoveRejection::NoRelation),
            Relation::Before if si < ti => return Err(MoveRejection::AlreadySatisfied),
            Relation::After if si > ti => return Err(MoveRejection::AlreadySatisfied),
            Relation::Before | Relation::After => {}
        }
        if self.moving
            && let Some(last) = self.logs.last()
            && last.span().contains(&ti)
        {
            return Err(MoveRejection::InFlight);
        }
        Ok((si, ti))
    }

    /// Apply one action; returns `true` if the state changed.
    pub fn apply(&mut self, action: Action<T>) -> bool {
        match action {
            Action::Init(items) => self.init(items),
            Action::Register { id, rect } => match self.items.iter_mut().find(|e| e.id() == id) {
                Some(entry) => {
                    entry.set_rect(Some(rect));
                    true
                }
                None => false,
            },
            Action::Move {
                source,
                target,
                relation,
            } => match self.check_move(&source, &target, relation) {
                Ok((si, ti)) => {
                    let entry = self.items.remove(si);
                    self.items.insert(ti, entry);
                    tracing::debug!(container = %self.id, %source, %target, si, ti, "move");
                    self.logs.push(SortLog {
                        source,
                        target,
                        source_index: si,
                        target_index: ti,
                    });
                    true
                }
                Err(reason) => {
                    tracing::trace!(container = %self.id, %source, %target, %reason, "move rejected");
                    false
                }
            },
            Action::MoveIn { index, mut item } => {
                item.set_rect(None);
                match index {
                    Some(i) if i <= self.items.len() => self.items.insert(i, item),
                    _ => self.items.push(item),
                }
                true
            }
            Action::MoveOut { id } | Action::Remove { id } => match self.index_of(&id) {
                Some(i) => {
                    self.items.remove(i);
                    true
                }
                None => false,
            },
            Action::Update(data) => match self.items.iter_mut().find(|e| e.id() == data.id()) {
                Some(entry) => {
                    entry.data = data;
                    true
                }
                None => false,
            },
            Action::Dragging(item) => {
                self.backup = self.items.clone();
                self.dragging = Some(item);
                true
            }
            Action::Drop => {
                let changed = self.in_gesture() || !self.logs.is_empty();
                self.clear_gesture();
                changed
            }
            Action::Reset => {
                if !self.in_gesture() {
                    return false;
                }
                let backup = core::mem::take(&mut self.backup);
                let live = core::mem::take(&mut self.items);
                self.items = backup
                    .into_iter()
                    .map(|frozen| match live.iter().find(|e| e.id() == frozen.id()) {
                        Some(current) => current.clone(),
                        None => frozen,
                    })
                    .collect();
                self.clear_gesture();
                tracing::debug!(container = %self.id, "reset to backup");
                true
            }
            Action::Moving(moving) => {
                let changed = self.moving != moving;
                self.moving = moving;
                changed
            }
            Action::Observed(ids) => {
                self.active = Some(ids.into_iter().collect());
                true
            }
        }
    }

    fn init(&mut self, items: Vec<T>) -> bool {
        if self.items.iter().map(|e| &e.data).eq(items.iter()) {
            return false;
        }
        let previous = core::mem::take(&mut self.items);
        self.items = items
            .into_iter()
            .map(|data| match previous.iter().find(|e| e.id() == data.id()) {
                Some(existing) => existing.with_data(data),
                None => Entry::new(data),
            })
            .collect();
        self.backup.clear();
        self.logs.clear();
        self.moving = false;
        self.dragging = None;
        true
    }

    fn clear_gesture(&mut self) {
        self.backup.clear();
        self.logs.clear();
        self.dragging = None;
    }
}

type Listener<T> = Box<dyn FnMut(&ContainerState<T>)>;

/// A [`ContainerState`] plus change listeners.
///
/// Listeners run after every dispatch that changed the state.
pub struct Store<T> {
    state: ContainerState<T>,
    version: u64,
    next_listener: u64,
    listeners: Vec<(ListenerId, Listener<T>)>,
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("version", &self.version)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl<T: SortableItem> Store<T> {
    /// Wrap an initial state.
    pub fn new(state: ContainerState<T>) -> Self {
        Self {
            state,
            version: 0,
            next_listener: 0,
            listeners: Vec::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> &ContainerState<T> {
        &self.state
    }

    /// Number of dispatches that changed the state.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Apply an action and notify listeners if the state changed.
    pub fn dispatch(&mut self, action: Action<T>) -> bool {
        if !self.state.apply(action) {
            return false;
        }
        self.version += 1;
        for (_, listener) in &mut self.listeners {
            listener(&self.state);
        }
        true
    }

    /// Register a listener called after each effective dispatch.
    pub fn subscribe(&mut self, listener: impl FnMut(&ContainerState<T>) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Item;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::Cell;
    use kurbo::Rect;

    fn state(ids: &[&str]) -> ContainerState<Item> {
        ContainerState::new(
            ContainerId::root("s1"),
            ids.iter().map(|id| Item::new(*id)).collect(),
        )
    }

    fn mv(source: &str, target: &str, relation: Relation) -> Action<Item> {
        Action::Move {
            source: source.into(),
            target: target.into(),
            relation,
        }
    }

    #[test]
    fn move_after_then_repeat_is_idempotent() {
        let mut s = state(&["A", "B", "C"]);
        assert!(s.apply(mv("A", "C", Relation::After)));
        assert_eq!(s.ids(), ["B", "C", "A"]);
        assert!(!s.apply(mv("A", "C", Relation::After)));
        assert_eq!(s.ids(), ["B", "C", "A"]);
        assert_eq!(s.logs().len(), 1);
    }

    #[test]
    fn move_before_when_already_ahead_is_rejected() {
        let s = state(&["A", "B", "C"]);
        assert_eq!(
            s.check_move("A", "C", Relation::Before),
            Err(MoveRejection::AlreadySatisfied)
        );
        assert_eq!(
            s.check_move("C", "A", Relation::After),
            Err(MoveRejection::AlreadySatisfied)
        );
        assert_eq!(s.check_move("C", "A", Relation::Before), Ok((2, 0)));
    }

    #[test]
    fn unresolved_and_same_index_moves_are_rejected() {
        let s = state(&["A", "B"]);
        assert_eq!(
            s.check_move("A", "Z", Relation::After),
            Err(MoveRejection::Unresolved)
        );
        assert_eq!(
            s.check_move("A", "A", Relation::After),
            Err(MoveRejection::SameIndex)
        );
        assert_eq!(
            s.check_move("A", "B", Relation::None),
            Err(MoveRejection::NoRelation)
        );
    }

    #[test]
    fn in_flight_guard_blocks_targets_inside_last_span() {
        let mut s = state(&["A", "B", "C", "D", "E"]);
        assert!(s.apply(mv("A", "C", Relation::After)));
        // [B, C, A, D, E], last span 0..=2.
        assert!(s.apply(Action::Moving(true)));
        assert_eq!(
            s.check_move("A", "B", Relation::Before),
            Err(MoveRejection::InFlight)
        );
        // Outside the span is fine.
        assert_eq!(s.check_move("A", "D", Relation::After), Ok((2, 3)));
        assert!(s.apply(Action::Moving(false)));
        assert_eq!(s.check_move("A", "B", Relation::Before), Ok((2, 0)));
    }

    #[test]
    fn dragging_then_reset_restores_order_with_live_copies() {
        let mut s = state(&["A", "B", "C"]);
        assert!(s.apply(Action::Dragging(Entry::new(Item::new("A")))));
        assert_eq!(s.backup().len(), 3);
        assert!(s.apply(mv("A", "C", Relation::After)));
        assert!(s.apply(Action::Update(Item::new("B").with_kind("edited"))));
        assert!(s.apply(Action::Reset));
        assert_eq!(s.ids(), ["A", "B", "C"]);
        assert_eq!(s.items()[1].data.kind(), "edited");
        assert!(s.backup().is_empty());
        assert!(s.logs().is_empty());
        assert!(s.dragging().is_none());
    }

    #[test]
    fn reset_outside_a_gesture_is_a_no_op() {
        let mut s = state(&["A", "B"]);
        assert!(!s.apply(Action::Reset));
        assert_eq!(s.ids(), ["A", "B"]);
    }

    #[test]
    fn reset_drops_items_that_arrived_during_the_gesture() {
        let mut s = state(&["A"]);
        s.apply(Action::Dragging(Entry::new(Item::new("X"))));
        s.apply(Action::MoveIn {
            index: Some(0),
            item: Entry::new(Item::new("X")),
        });
        assert_eq!(s.ids(), ["X", "A"]);
        s.apply(Action::Reset);
        assert_eq!(s.ids(), ["A"]);
    }

    #[test]
    fn drop_clears_transient_state() {
        let mut s = state(&["A", "B"]);
        s.apply(Action::Dragging(Entry::new(Item::new("A"))));
        s.apply(mv("A", "B", Relation::After));
        assert!(s.apply(Action::Drop));
        assert_eq!(s.ids(), ["B", "A"]);
        assert!(!s.in_gesture());
        assert!(s.logs().is_empty());
        assert!(!s.apply(Action::Drop));
    }

    #[test]
    fn move_in_appends_or_inserts_and_strips_geometry() {
        let mut s = state(&["A", "B"]);
        let arriving = Entry::new(Item::new("X")).with_rect(LiveRect::fixed(Rect::ZERO));
        s.apply(Action::MoveIn {
            index: Some(1),
            item: arriving,
        });
        assert_eq!(s.ids(), ["A", "X", "B"]);
        assert!(s.get("X").and_then(Entry::rect_accessor).is_none());
        s.apply(Action::MoveIn {
            index: None,
            item: Entry::new(Item::new("Y")),
        });
        assert_eq!(s.ids(), ["A", "X", "B", "Y"]);
    }

    #[test]
    fn stale_removals_are_no_ops() {
        let mut s = state(&["A"]);
        assert!(!s.apply(Action::Remove { id: "Z".into() }));
        assert!(!s.apply(Action::MoveOut { id: "Z".into() }));
        assert!(s.apply(Action::MoveOut { id: "A".into() }));
        assert!(s.items().is_empty());
    }

    #[test]
    fn init_preserves_internal_fields_and_skips_equal_data() {
        let mut s = state(&["A", "B"]);
        s.apply(Action::Register {
            id: "B".into(),
            rect: LiveRect::fixed(Rect::new(0.0, 0.0, 1.0, 1.0)),
        });
        assert!(!s.apply(Action::Init(vec![Item::new("A"), Item::new("B")])));
        s.apply(Action::Dragging(Entry::new(Item::new("A"))));
        assert!(s.apply(Action::Init(vec![Item::new("B"), Item::new("C")])));
        assert_eq!(s.ids(), ["B", "C"]);
        assert!(s.get("B").and_then(Entry::live_rect).is_some());
        assert!(!s.in_gesture());
    }

    #[test]
    fn observed_limits_active_items() {
        let mut s = state(&["A", "B", "C"]);
        assert_eq!(s.active_items().count(), 3);
        s.apply(Action::Observed(vec!["C".into(), "A".into()]));
        let active: Vec<&str> = s.active_items().map(Entry::id).collect();
        assert_eq!(active, ["A", "C"]);
    }

    #[test]
    fn store_notifies_only_on_change() {
        let mut store = Store::new(state(&["A", "B"]));
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let id = store.subscribe(move |_| seen.set(seen.get() + 1));
        assert!(store.dispatch(mv("A", "B", Relation::After)));
        assert!(!store.dispatch(mv("A", "B", Relation::After)));
        assert_eq!(calls.get(), 1);
        assert_eq!(store.version(), 1);
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.dispatch(Action::Moving(true));
        assert_eq!(calls.get(), 1);
    }
}

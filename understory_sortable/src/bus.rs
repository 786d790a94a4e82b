// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event bus shared by the containers of one tree.
//!
//! A root container creates an [`EventBus`] and every nested container receives a
//! clone of it at construction time. Containers never touch each other's stores;
//! every cross-container effect travels as a [`BusEvent`].
//!
//! Delivery is queued: [`EventBus::emit`] appends the event to the inbox of every
//! live [`Subscription`] (the emitter's own included) and returns. Each container
//! drains its inbox when the host pumps it, so handlers never re-enter one another.
//!
//! Dropping a [`Subscription`] unsubscribes it. [`Subscription::unsubscribe`] may be
//! called any number of times.
//!
//! ```
//! use understory_sortable::bus::{BusEvent, EventBus};
//! use understory_sortable::Item;
//!
//! let bus = EventBus::<Item>::new();
//! let mut a = bus.subscribe();
//! let b = bus.subscribe();
//! bus.emit(BusEvent::Reset { item: None });
//! assert!(matches!(a.try_recv(), Some(BusEvent::Reset { item: None })));
//! assert!(!bus.is_idle());
//! drop(b);
//! assert!(bus.is_idle());
//! a.unsubscribe();
//! assert_eq!(bus.listener_count(), 0);
//! ```

use alloc::collections::VecDeque;
use alloc::format;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::entry::DragItem;
use crate::types::{ContainerId, Relation};

/// Message exchanged between containers.
#[derive(Clone, Debug)]
pub enum BusEvent<T> {
    /// A drag began in some container.
    Dragging(DragItem<T>),
    /// `target` claims `item`, inserting it at `insert_index` (`None` appends).
    MoveIn {
        /// Where to insert in the target container.
        insert_index: Option<usize>,
        /// The dragged payload.
        item: DragItem<T>,
        /// Container claiming the item.
        target: ContainerId,
        /// Container that held the item before the claim, if any.
        source: Option<ContainerId>,
    },
    /// The provisional owner of `item` gives it up.
    MoveOut {
        /// The dragged payload.
        item: DragItem<T>,
    },
    /// The gesture committed.
    Drop {
        /// The dragged payload.
        item: DragItem<T>,
        /// Container the item landed in; `None` when it left every container.
        target: Option<ContainerId>,
        /// Container the drag started from.
        source: Option<ContainerId>,
    },
    /// The gesture was cancelled.
    Reset {
        /// The dragged payload, if known.
        item: Option<DragItem<T>>,
    },
    /// The item was dropped on a remove target.
    Remove {
        /// The dragged payload.
        item: DragItem<T>,
    },
    /// An item's data is to be patched in place.
    Update {
        /// Id of the item to patch.
        id: String,
        /// Edit applied to the holder's current copy of the data.
        patch: Patch<T>,
    },
    /// Indicator-mode hint: which node, which side.
    Indicator(Indicator),
}

/// A shareable in-place edit of item data.
///
/// The edit runs against whatever the holding container has when it handles the
/// event, so successive patches accumulate. It must not change the item's id.
pub struct Patch<T>(Rc<dyn Fn(&mut T)>);

impl<T> Patch<T> {
    /// Wrap an edit.
    pub fn new(edit: impl Fn(&mut T) + 'static) -> Self {
        Self(Rc::new(edit))
    }

    /// Run the edit on `data`.
    pub fn apply(&self, data: &mut T) {
        (self.0)(data);
    }
}

impl<T> Clone for Patch<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> fmt::Debug for Patch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Patch")
    }
}

/// Insertion hint shown in indicator mode.
#[derive(Clone, Debug, PartialEq)]
pub struct Indicator {
    /// Id of the item the hint is attached to.
    pub id: String,
    /// Signed comparator offset; `NaN` clears the hint.
    pub offset: f64,
}

impl Indicator {
    /// A hint that clears any indicator on `id`.
    #[must_use]
    pub fn clear(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            offset: f64::NAN,
        }
    }

    /// Side the hint points at.
    #[must_use]
    pub fn relation(&self) -> Relation {
        Relation::from_offset(self.offset)
    }
}

struct BusInner<T> {
    next_subscriber: u64,
    next_container: u64,
    inboxes: Vec<(u64, VecDeque<BusEvent<T>>)>,
}

/// Queued broadcast channel for [`BusEvent`]s. Clones share one bus.
pub struct EventBus<T> {
    inner: Rc<RefCell<BusInner<T>>>,
}

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("EventBus")
            .field("listeners", &inner.inboxes.len())
            .field(
                "pending",
                &inner.inboxes.iter().map(|(_, q)| q.len()).sum::<usize>(),
            )
            .finish_non_exhaustive()
    }
}

impl<T> EventBus<T> {
    /// A bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(BusInner {
                next_subscriber: 0,
                next_container: 0,
                inboxes: Vec::new(),
            })),
        }
    }

    /// Open a new inbox.
    pub fn subscribe(&self) -> Subscription<T> {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_subscriber;
        inner.next_subscriber += 1;
        inner.inboxes.push((id, VecDeque::new()));
        Subscription {
            id,
            bus: Rc::downgrade(&self.inner),
            active: true,
        }
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().inboxes.len()
    }

    /// Total number of undelivered events across all inboxes.
    pub fn pending(&self) -> usize {
        self.inner.borrow().inboxes.iter().map(|(_, q)| q.len()).sum()
    }

    /// Returns `true` when every inbox is empty.
    pub fn is_idle(&self) -> bool {
        self.inner.borrow().inboxes.iter().all(|(_, q)| q.is_empty())
    }

    /// Fresh id segment for a container joining this bus (`s1`, `s2`, ...).
    pub(crate) fn next_container_segment(&self) -> String {
        let mut inner = self.inner.borrow_mut();
        inner.next_container += 1;
        format!("s{}", inner.next_container)
    }
}

impl<T: Clone> EventBus<T> {
    /// Queue `event` for every live subscription.
    pub fn emit(&self, event: BusEvent<T>) {
        let mut inner = self.inner.borrow_mut();
        for (_, inbox) in &mut inner.inboxes {
            inbox.push_back(event.clone());
        }
    }
}

/// One inbox on an [`EventBus`].
pub struct Subscription<T> {
    id: u64,
    bus: Weak<RefCell<BusInner<T>>>,
    active: bool,
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl<T> Subscription<T> {
    /// Pop the oldest undelivered event.
    pub fn try_recv(&mut self) -> Option<BusEvent<T>> {
        if !self.active {
            return None;
        }
        let bus = self.bus.upgrade()?;
        let mut inner = bus.borrow_mut();
        let (_, inbox) = inner.inboxes.iter_mut().find(|(id, _)| *id == self.id)?;
        inbox.pop_front()
    }

    /// Whether this subscription still receives events.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Close the inbox, discarding undelivered events.
    pub fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(bus) = self.bus.upgrade() {
            bus.borrow_mut().inboxes.retain(|(id, _)| *id != self.id);
        }
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Internal items: host data plus the ownership tags and live geometry the engine needs.
//!
//! An [`Entry`] wraps one host item while it lives in a container. Ownership tags are
//! attached when a drag begins and stripped (by handing back only `data`) before the
//! host sees the collection again.
//!
//! Geometry is never cached. An entry holds a [`LiveRect`] accessor that the host
//! registers once the item is laid out; every geometry check calls
//! [`Entry::live_rect`] and so always reads current layout.

use alloc::rc::Rc;
use alloc::string::String;
use core::cell::RefCell;
use core::fmt;

use kurbo::Rect;

use crate::types::{ContainerId, SortableItem};

/// Accessor for a rectangle that is measured on demand.
///
/// Returns `None` while the element is not measurable (not mounted, off screen).
#[derive(Clone)]
pub struct LiveRect(Rc<dyn Fn() -> Option<Rect>>);

impl LiveRect {
    /// Wrap a measuring closure.
    pub fn new(measure: impl Fn() -> Option<Rect> + 'static) -> Self {
        Self(Rc::new(measure))
    }

    /// An accessor that always reports the same rectangle.
    #[must_use]
    pub fn fixed(rect: Rect) -> Self {
        Self::new(move || Some(rect))
    }

    /// Measure now.
    #[must_use]
    pub fn read(&self) -> Option<Rect> {
        (self.0)()
    }
}

impl fmt::Debug for LiveRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LiveRect").field(&self.read()).finish()
    }
}

/// An item as held by a container.
#[derive(Clone, Debug)]
pub struct Entry<T> {
    /// Host data, handed back untouched in change callbacks.
    pub data: T,
    /// Container that started the current drag of this item.
    pub origin: Option<ContainerId>,
    /// Container currently claiming the item.
    pub owner: Option<ContainerId>,
    /// Container that first claimed an item dragged in from outside any container.
    pub registered: Option<ContainerId>,
    rect: Option<LiveRect>,
}

impl<T: SortableItem> Entry<T> {
    /// A fresh entry with no ownership tags and no geometry.
    pub fn new(data: T) -> Self {
        Self {
            data,
            origin: None,
            owner: None,
            registered: None,
            rect: None,
        }
    }

    /// The item id.
    pub fn id(&self) -> &str {
        self.data.id()
    }

    /// Measure the item now, if it has a registered accessor.
    pub fn live_rect(&self) -> Option<Rect> {
        self.rect.as_ref().and_then(LiveRect::read)
    }

    /// The registered accessor, if any.
    pub fn rect_accessor(&self) -> Option<&LiveRect> {
        self.rect.as_ref()
    }

    /// Attach (or detach) the live rectangle accessor.
    pub fn set_rect(&mut self, rect: Option<LiveRect>) {
        self.rect = rect;
    }

    /// Same entry with `rect` attached.
    #[must_use]
    pub fn with_rect(mut self, rect: LiveRect) -> Self {
        self.rect = Some(rect);
        self
    }

    /// Replace the host data, keeping every internal field.
    #[must_use]
    pub fn with_data(&self, data: T) -> Self {
        Self {
            data,
            origin: self.origin.clone(),
            owner: self.owner.clone(),
            registered: self.registered.clone(),
            rect: self.rect.clone(),
        }
    }
}

/// The payload carried by the external drag toolkit for one gesture.
///
/// Cloning shares the payload: ownership tags updated by one container are seen by
/// every holder, including the toolkit when it reports the end of the drag.
#[derive(Clone)]
pub struct DragItem<T>(Rc<RefCell<Entry<T>>>);

impl<T: SortableItem> DragItem<T> {
    /// Wrap an entry for dragging.
    pub fn new(entry: Entry<T>) -> Self {
        Self(Rc::new(RefCell::new(entry)))
    }

    /// A payload that does not come from any container (for example a palette).
    pub fn external(data: T, rect: Option<LiveRect>) -> Self {
        let mut entry = Entry::new(data);
        entry.set_rect(rect);
        Self::new(entry)
    }

    /// The item id.
    pub fn id(&self) -> String {
        String::from(self.0.borrow().id())
    }

    /// The item's type tag.
    pub fn kind(&self) -> String {
        String::from(self.0.borrow().data.kind())
    }

    /// A copy of the host data.
    pub fn data(&self) -> T {
        self.0.borrow().data.clone()
    }

    /// Whether the item may be dropped on a remove target (defaults to `true`).
    pub fn deleteable(&self) -> bool {
        self.0.borrow().data.deleteable().unwrap_or(true)
    }

    /// Container that started the drag.
    pub fn origin(&self) -> Option<ContainerId> {
        self.0.borrow().origin.clone()
    }

    /// Container currently claiming the item.
    pub fn owner(&self) -> Option<ContainerId> {
        self.0.borrow().owner.clone()
    }

    /// Container that first claimed an external item.
    pub fn registered(&self) -> Option<ContainerId> {
        self.0.borrow().registered.clone()
    }

    pub(crate) fn set_owner(&self, owner: Option<ContainerId>) {
        self.0.borrow_mut().owner = owner;
    }

    pub(crate) fn set_registered(&self, registered: Option<ContainerId>) {
        self.0.borrow_mut().registered = registered;
    }

    /// Measure the dragged element now.
    pub fn live_rect(&self) -> Option<Rect> {
        self.0.borrow().live_rect()
    }

    /// A detached copy of the entry.
    pub fn snapshot(&self) -> Entry<T> {
        self.0.borrow().clone()
    }

    /// Returns `true` if both handles share one payload.
    pub fn same_payload(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: fmt::Debug> fmt::Debug for DragItem<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DragItem").field(&*self.0.borrow()).finish()
    }
}

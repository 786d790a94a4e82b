// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Container coordinator: one drop target, driven by the drag toolkit.
//!
//! ## Toolkit signals
//!
//! A [`Container`] is a headless drop target and drag source. The host forwards the
//! toolkit's signals to it:
//!
//! - drag source: [`Container::can_drag`], [`Container::begin_drag`],
//!   [`Container::end_drag`];
//! - drop target: [`Container::update_over`] whenever the collected
//!   [`DropFlags`] change, [`Container::hover`] on pointer moves,
//!   [`Container::accept_drop`] on drop;
//! - timing: [`Container::poll`] on each tick (trailing throttled hover) and
//!   [`Container::animation_frame`] when a requested frame runs.
//!
//! ## Cross-container traffic
//!
//! Containers of one tree share an [`EventBus`]. Signals are turned into
//! [`BusEvent`]s; each container reacts to bus events only in
//! [`Container::process_events`]. [`pump`] drains a set of containers until the bus is
//! idle. Every bus event is handled by every container, which decides by comparing ids
//! whether the event concerns it:
//!
//! | Event | Handler |
//! |---|---|
//! | `Dragging` | snapshot items into the backup |
//! | `MoveIn` | the target inserts the item, the previous owner takes it out |
//! | `MoveOut` | the current owner hands the item back to its origin |
//! | `Drop` | classify as sort, drag or drop; notify; clear gesture state |
//! | `Reset` | restore the backup |
//! | `Remove` | the origin deletes and notifies; a transient owner resets |
//! | `Update` | the holder patches its copy of the item's data and notifies |
//! | `Indicator` | remember the hint for the item, if it is ours |
//!
//! ## Example
//!
//! ```
//! use kurbo::{Point, Rect};
//! use understory_sortable::bus::EventBus;
//! use understory_sortable::config::{ItemSource, SortableConfig};
//! use understory_sortable::container::{Container, DropFlags, pump};
//! use understory_sortable::entry::LiveRect;
//! use understory_sortable::Item;
//!
//! let bus = EventBus::new();
//! let items = ["a", "b", "c"].map(Item::new).to_vec();
//! let mut list = Container::new(bus, SortableConfig::default(), ItemSource::Items(items)).unwrap();
//! list.set_bounds(LiveRect::fixed(Rect::new(0.0, 0.0, 100.0, 120.0)));
//! for (i, id) in ["a", "b", "c"].into_iter().enumerate() {
//!     let y = 40.0 * i as f64;
//!     list.register(id, LiveRect::fixed(Rect::new(0.0, y, 100.0, y + 40.0)));
//! }
//!
//! let item = list.begin_drag("a").unwrap();
//! pump(&mut [&mut list]);
//! list.update_over(DropFlags::all(), Some(&item), Some(Point::ZERO));
//! // Drag "a" down past the middle of "b".
//! let frame = list.hover(&item, Point::new(0.0, 50.0), 0).unwrap();
//! assert!(list.animation_frame(frame));
//! let result = list.accept_drop(&item);
//! list.end_drag(&item, result.as_ref());
//! pump(&mut [&mut list]);
//! assert_eq!(list.state().ids(), ["b", "a", "c"]);
//! ```

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use kurbo::{Point, Rect};

use crate::bus::{BusEvent, EventBus, Indicator, Patch, Subscription};
use crate::config::{ConfigError, ItemSource, SortableConfig};
use crate::entry::{DragItem, Entry, LiveRect};
use crate::geometry;
use crate::hover::{AllowDrop, HoverResolver, project};
use crate::schedule::FrameToken;
use crate::selector::Watch;
use crate::store::{Action, ContainerState, Store};
use crate::types::{ChangeEvent, ChangeKind, ContainerId, Mode, Relation, SortableItem};

bitflags::bitflags! {
    /// Drop-target state collected from the drag toolkit.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DropFlags: u8 {
        /// The pointer is over this container or one of its descendants.
        const OVER         = 0b0000_0001;
        /// The pointer is over this container and not over a nested one.
        const OVER_SHALLOW = 0b0000_0010;
        /// The dragged item's type is accepted here.
        const CAN_DROP     = 0b0000_0100;
    }
}

/// Result a drop target hands back to the drag source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropResult {
    /// Landed in a sortable container; the containers already reconciled.
    Sort {
        /// The container that accepted the drop.
        container: ContainerId,
        /// The dropped item.
        id: String,
    },
    /// Landed on a remove target.
    Remove,
    /// Landed on some other target; the gesture is cancelled.
    Other,
}

/// Opacity of an item while it is being dragged.
pub const DRAGGING_OPACITY: f64 = 0.6;

/// Visual hints for one item.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ItemStyle {
    /// `0.6` while dragging, `1.0` otherwise.
    pub opacity: f64,
}

/// What the host needs to connect an item to the toolkit's drag source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragHandle {
    /// Container the item is rendered in.
    pub container: ContainerId,
    /// Item id; pass it to [`Container::begin_drag`].
    pub id: String,
    /// Type tag for the drag source.
    pub kind: String,
    /// Whether the drag source should be enabled.
    pub enabled: bool,
}

/// Per-item operations, usable after rendering returns.
///
/// Both operations travel through the bus; pump the containers to apply them.
pub struct ItemActions<T> {
    bus: EventBus<T>,
    container: ContainerId,
    data: T,
}

impl<T: fmt::Debug> fmt::Debug for ItemActions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemActions")
            .field("container", &self.container)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

impl<T: SortableItem + 'static> ItemActions<T> {
    /// Remove the item from the container it is rendered in.
    pub fn remove(&self) {
        let mut entry = Entry::new(self.data.clone());
        entry.origin = Some(self.container.clone());
        entry.owner = Some(self.container.clone());
        self.bus.emit(BusEvent::Remove {
            item: DragItem::new(entry),
        });
    }

    /// Patch the item's data in place.
    ///
    /// The patch runs on the holding container's current data when it processes the
    /// bus, so patches issued from one render build on each other.
    pub fn update(&self, patch: impl Fn(&mut T) + 'static) {
        self.bus.emit(BusEvent::Update {
            id: String::from(self.data.id()),
            patch: Patch::new(patch),
        });
    }
}

/// Everything the host needs to render one item.
#[derive(Debug)]
pub struct ItemProps<'a, T> {
    /// The host data.
    pub data: &'a T,
    /// Position in the container.
    pub index: usize,
    /// Whether this item is the one being dragged.
    pub dragging: bool,
    /// Indicator-mode hint on this item.
    pub indicator: Relation,
    /// `sortable-item`, plus `sortable-item-dragging` while dragging.
    pub class_name: &'static str,
    /// Style hints.
    pub style: ItemStyle,
    /// Remove and update.
    pub actions: ItemActions<T>,
    /// Drag source wiring.
    pub drag: DragHandle,
}

type ChangeFn<T> = Box<dyn FnMut(&[T], &ChangeEvent<T>)>;
type AllowDropFn<T> = Box<dyn Fn(&AllowDrop<'_, T>) -> bool>;
type DragConditionFn<T> = Box<dyn Fn(&T) -> bool>;
type DropFn<T> = Box<dyn FnMut(&AllowDrop<'_, T>)>;
type ItemFn<T> = Box<dyn FnMut(&T)>;

struct Hooks<T> {
    on_change: Option<ChangeFn<T>>,
    allow_drop: Option<AllowDropFn<T>>,
    drag_condition: Option<DragConditionFn<T>>,
    on_drop: Option<DropFn<T>>,
    on_drag_start: Option<ItemFn<T>>,
    on_drag_over: Option<ItemFn<T>>,
    on_drag_out: Option<ItemFn<T>>,
}

impl<T> Default for Hooks<T> {
    fn default() -> Self {
        Self {
            on_change: None,
            allow_drop: None,
            drag_condition: None,
            on_drop: None,
            on_drag_start: None,
            on_drag_over: None,
            on_drag_out: None,
        }
    }
}

impl<T> fmt::Debug for Hooks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_change", &self.on_change.is_some())
            .field("allow_drop", &self.allow_drop.is_some())
            .field("drag_condition", &self.drag_condition.is_some())
            .field("on_drop", &self.on_drop.is_some())
            .field("on_drag_start", &self.on_drag_start.is_some())
            .field("on_drag_over", &self.on_drag_over.is_some())
            .field("on_drag_out", &self.on_drag_out.is_some())
            .finish()
    }
}

/// One sortable container.
pub struct Container<T: SortableItem> {
    store: Store<T>,
    bus: EventBus<T>,
    inbox: Subscription<T>,
    config: SortableConfig,
    resolver: HoverResolver,
    bounds: Option<LiveRect>,
    over: DropFlags,
    trailing: Option<(DragItem<T>, Point)>,
    indicators: HashMap<String, f64>,
    hooks: Hooks<T>,
}

impl<T: SortableItem + fmt::Debug> fmt::Debug for Container<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("state", self.store.state())
            .field("config", &self.config)
            .field("over", &self.over)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

impl<T: SortableItem + 'static> Container<T> {
    /// A top-level container on `bus`.
    pub fn new(
        bus: EventBus<T>,
        config: SortableConfig,
        source: ItemSource<T>,
    ) -> Result<Self, ConfigError> {
        let id = ContainerId::root(&bus.next_container_segment());
        Self::with_id(bus, id, config, source)
    }

    /// A container nested inside `self`, sharing its bus.
    pub fn new_child(
        &self,
        config: SortableConfig,
        source: ItemSource<T>,
    ) -> Result<Self, ConfigError> {
        let id = self.id().child(&self.bus.next_container_segment());
        Self::with_id(self.bus.clone(), id, config, source)
    }

    fn with_id(
        bus: EventBus<T>,
        id: ContainerId,
        config: SortableConfig,
        source: ItemSource<T>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let items = source.into_items()?;
        let resolver = HoverResolver::new(
            config.layout,
            config.direction(),
            config.mode,
            config.throttle_ms,
            config.proximity,
        );
        tracing::debug!(container = %id, items = items.len(), "container created");
        Ok(Self {
            store: Store::new(ContainerState::new(id, items)),
            inbox: bus.subscribe(),
            bus,
            config,
            resolver,
            bounds: None,
            over: DropFlags::empty(),
            trailing: None,
            indicators: HashMap::new(),
            hooks: Hooks::default(),
        })
    }

    /// Set the change callback.
    #[must_use]
    pub fn with_on_change(mut self, f: impl FnMut(&[T], &ChangeEvent<T>) + 'static) -> Self {
        self.hooks.on_change = Some(Box::new(f));
        self
    }

    /// Set the allow-drop predicate consulted for each hover candidate.
    #[must_use]
    pub fn with_allow_drop(mut self, f: impl Fn(&AllowDrop<'_, T>) -> bool + 'static) -> Self {
        self.hooks.allow_drop = Some(Box::new(f));
        self
    }

    /// Set the predicate deciding whether an item may be picked up.
    #[must_use]
    pub fn with_drag_condition(mut self, f: impl Fn(&T) -> bool + 'static) -> Self {
        self.hooks.drag_condition = Some(Box::new(f));
        self
    }

    /// Set the indicator-mode drop callback.
    #[must_use]
    pub fn with_on_drop(mut self, f: impl FnMut(&AllowDrop<'_, T>) + 'static) -> Self {
        self.hooks.on_drop = Some(Box::new(f));
        self
    }

    /// Set the callback run when a drag starts from this container.
    #[must_use]
    pub fn with_on_drag_start(mut self, f: impl FnMut(&T) + 'static) -> Self {
        self.hooks.on_drag_start = Some(Box::new(f));
        self
    }

    /// Set the callback run when a foreign item is claimed by this container.
    #[must_use]
    pub fn with_on_drag_over(mut self, f: impl FnMut(&T) + 'static) -> Self {
        self.hooks.on_drag_over = Some(Box::new(f));
        self
    }

    /// Set the callback run when a claimed item leaves this container.
    #[must_use]
    pub fn with_on_drag_out(mut self, f: impl FnMut(&T) + 'static) -> Self {
        self.hooks.on_drag_out = Some(Box::new(f));
        self
    }

    /// This container's id.
    pub fn id(&self) -> &ContainerId {
        self.store.state().id()
    }

    /// Current state.
    pub fn state(&self) -> &ContainerState<T> {
        self.store.state()
    }

    /// The underlying store.
    pub fn store(&self) -> &Store<T> {
        &self.store
    }

    /// The configuration.
    pub fn config(&self) -> &SortableConfig {
        &self.config
    }

    /// The bus this container is on.
    pub fn bus(&self) -> &EventBus<T> {
        &self.bus
    }

    /// Watch a slice of this container's state.
    pub fn watch<S: PartialEq + 'static>(
        &mut self,
        select: impl Fn(&ContainerState<T>) -> S + 'static,
    ) -> Watch<S> {
        Watch::attach(&mut self.store, select)
    }

    /// Stop a watch created by [`watch`](Self::watch).
    pub fn unwatch<S>(&mut self, watch: Watch<S>) -> bool {
        watch.detach(&mut self.store)
    }

    /// `sortable-container sortable-{layout}-{direction}`.
    pub fn class_name(&self) -> String {
        format!(
            "sortable-container sortable-{}-{}",
            self.config.layout.as_str(),
            self.config.direction().as_str()
        )
    }

    // --- Host and layout inputs ---

    /// Attach the accessor measuring this container's element.
    pub fn set_bounds(&mut self, bounds: LiveRect) {
        self.bounds = Some(bounds);
    }

    /// Measure this container now.
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds.as_ref().and_then(LiveRect::read)
    }

    /// Attach the accessor measuring item `id`.
    pub fn register(&mut self, id: &str, rect: LiveRect) -> bool {
        self.store.dispatch(Action::Register {
            id: String::from(id),
            rect,
        })
    }

    /// Report which items are in the viewport.
    pub fn observe(&mut self, ids: impl IntoIterator<Item = String>) -> bool {
        self.store
            .dispatch(Action::Observed(ids.into_iter().collect()))
    }

    /// Report that a reorder transition started or finished.
    pub fn set_moving(&mut self, moving: bool) -> bool {
        self.store.dispatch(Action::Moving(moving))
    }

    /// Replace the items with the host's collection.
    pub fn sync_items(&mut self, items: Vec<T>) -> bool {
        self.store.dispatch(Action::Init(items))
    }

    // --- Drag source ---

    /// Whether item `id` may be picked up.
    pub fn can_drag(&self, id: &str) -> bool {
        let Some(entry) = self.state().get(id) else {
            return false;
        };
        entry.data.sortable()
            && self
                .hooks
                .drag_condition
                .as_ref()
                .is_none_or(|f| f(&entry.data))
    }

    /// Start dragging item `id`; returns the payload for the toolkit.
    pub fn begin_drag(&mut self, id: &str) -> Option<DragItem<T>> {
        if !self.can_drag(id) {
            return None;
        }
        let mut entry = self.state().get(id)?.clone();
        entry.origin = Some(self.id().clone());
        entry.owner = Some(self.id().clone());
        let item = DragItem::new(entry);
        tracing::debug!(container = %self.id(), id, "drag started");
        if let Some(f) = self.hooks.on_drag_start.as_mut() {
            f(&item.data());
        }
        self.bus.emit(BusEvent::Dragging(item.clone()));
        Some(item)
    }

    /// The toolkit reports the end of a drag that started here.
    pub fn end_drag(&mut self, item: &DragItem<T>, result: Option<&DropResult>) {
        match result {
            Some(DropResult::Sort { .. }) => {}
            Some(DropResult::Remove) => {
                self.bus.emit(BusEvent::Remove { item: item.clone() });
                self.bus.emit(BusEvent::Drop {
                    item: item.clone(),
                    target: None,
                    source: item.origin(),
                });
            }
            Some(DropResult::Other) | None => {
                self.bus.emit(BusEvent::Reset {
                    item: Some(item.clone()),
                });
            }
        }
    }

    // --- Drop target ---

    /// Whether items tagged `kind` may be dropped here.
    pub fn accepts(&self, kind: &str) -> bool {
        self.config.accepts(kind)
    }

    /// The toolkit's collected drop-target flags.
    pub fn over(&self) -> DropFlags {
        self.over
    }

    /// Update the drop-target flags.
    ///
    /// When the shallow hover state flips in direct mode, a foreign item is claimed
    /// (pointer entered) or handed back (pointer left).
    pub fn update_over(
        &mut self,
        flags: DropFlags,
        item: Option<&DragItem<T>>,
        source_offset: Option<Point>,
    ) {
        let was_shallow = self.over.contains(DropFlags::OVER_SHALLOW);
        self.over = flags;
        let shallow = flags.contains(DropFlags::OVER_SHALLOW);
        if !shallow {
            self.trailing = None;
        }
        if shallow == was_shallow || self.config.mode != Mode::Direct {
            return;
        }
        let Some(item) = item else {
            return;
        };
        if !flags.contains(DropFlags::CAN_DROP) {
            return;
        }
        let id = self.id().clone();
        let owner = item.owner();
        // An item handed back to its origin root is owned but no longer held there.
        if shallow && self.state().get(&item.id()).is_some() {
            return;
        }
        let origin = item.origin();
        if shallow {
            let insert_index = self.insert_index(item, source_offset);
            if origin.is_none() {
                item.set_registered(Some(id.clone()));
            }
            tracing::debug!(container = %id, item = %item.id(), ?insert_index, "move in");
            self.bus.emit(BusEvent::MoveIn {
                insert_index,
                item: item.clone(),
                target: id,
                source: owner,
            });
            self.resolver.forget();
            if let Some(f) = self.hooks.on_drag_over.as_mut() {
                f(&item.data());
            }
            return;
        }
        let registered_here = origin.is_none() && item.registered().as_ref() == Some(&id);
        let root = ContainerId::root(id.root_segment());
        let foreign_at_root = !origin.as_ref().is_some_and(|o| o.is_within(&root))
            && owner.as_ref() == Some(&id)
            && id.is_root();
        if registered_here || foreign_at_root {
            tracing::debug!(container = %id, item = %item.id(), "move out");
            self.bus.emit(BusEvent::MoveOut { item: item.clone() });
            self.resolver.forget();
            if let Some(f) = self.hooks.on_drag_out.as_mut() {
                f(&item.data());
            }
        }
    }

    fn insert_index(&self, item: &DragItem<T>, source_offset: Option<Point>) -> Option<usize> {
        let offset = source_offset?;
        let bounds = self.bounds()?;
        let rect = item.live_rect().unwrap_or(Rect::ZERO);
        let moving = project(rect, bounds, offset);
        let origin = bounds.origin().to_vec2();
        let candidates = self
            .state()
            .items()
            .iter()
            .map(|e| e.live_rect().map(|r| r - origin));
        geometry::insert_index(
            candidates,
            &moving,
            self.config.layout,
            self.config.direction(),
        )
    }

    /// A pointer move while hovering this container.
    ///
    /// Returns a token when the host must request an animation frame and then call
    /// [`animation_frame`](Self::animation_frame) with it.
    pub fn hover(
        &mut self,
        item: &DragItem<T>,
        source_offset: Point,
        now: u64,
    ) -> Option<FrameToken> {
        if !self.resolver.admit(now) {
            self.trailing = Some((item.clone(), source_offset));
            return None;
        }
        self.trailing = None;
        self.evaluate(item, source_offset)
    }

    /// Run a throttled trailing hover once its window has closed.
    pub fn poll(&mut self, now: u64) -> Option<FrameToken> {
        if self.trailing.is_none() || !self.resolver.due(now) {
            return None;
        }
        let (item, offset) = self.trailing.take()?;
        self.evaluate(&item, offset)
    }

    fn evaluate(&mut self, item: &DragItem<T>, source_offset: Point) -> Option<FrameToken> {
        if !self.over.contains(DropFlags::OVER_SHALLOW) || !self.accepts(&item.kind()) {
            return None;
        }
        let bounds = self.bounds()?;
        let state = self.store.state();
        let moving = self.resolver.probe(state, item, bounds, source_offset)?;
        let data = item.data();
        let hook = &self.hooks.allow_drop;
        match self.resolver.mode() {
            Mode::Direct => {
                let proposal = self.resolver.scan(state, &data, bounds, &moving, |a| {
                    permits(hook, a)
                })?;
                self.resolver.propose(state, proposal)
            }
            Mode::Indicator => {
                let hints =
                    self.resolver
                        .indicate(state, &data, bounds, &moving, |a| permits(hook, a));
                for hint in hints {
                    self.bus.emit(BusEvent::Indicator(hint));
                }
                None
            }
        }
    }

    /// Apply the move staged for `token`; returns `true` if the order changed.
    pub fn animation_frame(&mut self, token: FrameToken) -> bool {
        match self.resolver.take_frame(token) {
            Some(proposal) => self.store.dispatch(proposal.into_action()),
            None => false,
        }
    }

    /// The toolkit reports a drop on this container.
    ///
    /// Returns `None` if the pointer is over a nested container instead.
    pub fn accept_drop(&mut self, item: &DragItem<T>) -> Option<DropResult> {
        if !self.over.contains(DropFlags::OVER_SHALLOW) {
            return None;
        }
        let id = self.id().clone();
        self.bus.emit(BusEvent::Drop {
            item: item.clone(),
            target: Some(id.clone()),
            source: item.origin(),
        });
        if let Some((node_id, position)) = self.resolver.take_indicated() {
            if let Some(on_drop) = self.hooks.on_drop.as_mut()
                && let Some(node) = self.store.state().get(&node_id)
            {
                let drag_node = item.data();
                on_drop(&AllowDrop {
                    node: &node.data,
                    drag_node: &drag_node,
                    position,
                });
            }
            self.bus.emit(BusEvent::Indicator(Indicator::clear(node_id)));
        }
        Some(DropResult::Sort {
            container: id,
            id: item.id(),
        })
    }

    // --- Bus ---

    /// Handle every queued bus event; returns how many were handled.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.inbox.try_recv() {
            self.handle(event);
            handled += 1;
        }
        handled
    }

    fn handle(&mut self, event: BusEvent<T>) {
        let id = self.id().clone();
        match event {
            BusEvent::Dragging(item) => {
                if self.state().dragging().is_none() {
                    self.store.dispatch(Action::Dragging(item.snapshot()));
                }
            }
            BusEvent::MoveIn {
                insert_index,
                item,
                target,
                source,
            } => {
                if target == id {
                    item.set_owner(Some(id));
                    self.store.dispatch(Action::MoveIn {
                        index: insert_index,
                        item: item.snapshot(),
                    });
                } else if source.as_ref() == Some(&id) {
                    self.store.dispatch(Action::MoveOut { id: item.id() });
                }
            }
            BusEvent::MoveOut { item } => {
                if item.owner().as_ref() == Some(&id) {
                    item.set_owner(item.origin());
                    self.store.dispatch(Action::MoveOut { id: item.id() });
                }
            }
            BusEvent::Drop {
                item,
                target,
                source,
            } => {
                let here = Some(&id);
                let kind = if source.as_ref() == here && target.as_ref() == here {
                    Some(ChangeKind::Sort)
                } else if source.as_ref() == here && target.is_some() {
                    Some(ChangeKind::Drag)
                } else if target.as_ref() == here {
                    Some(ChangeKind::Drop)
                } else {
                    None
                };
                if let Some(kind) = kind {
                    tracing::debug!(container = %id, item = %item.id(), ?kind, "drop");
                    self.notify(kind, item.data());
                }
                self.store.dispatch(Action::Drop);
                self.end_gesture();
            }
            BusEvent::Reset { .. } => {
                if self.store.dispatch(Action::Reset) {
                    tracing::debug!(container = %id, "gesture reset");
                }
                self.end_gesture();
            }
            BusEvent::Remove { item } => {
                let origin = item.origin();
                let owner = item.owner();
                // The origin reports the removal even if the item already moved out.
                if origin.as_ref() == Some(&id) {
                    self.store.dispatch(Action::Remove { id: item.id() });
                    self.notify(ChangeKind::Remove, item.data());
                }
                if owner.as_ref() == Some(&id) && origin != owner {
                    self.store.dispatch(Action::Reset);
                    self.end_gesture();
                }
            }
            BusEvent::Update { id: item_id, patch } => {
                if let Some(entry) = self.state().get(&item_id) {
                    let mut data = entry.data.clone();
                    patch.apply(&mut data);
                    self.store.dispatch(Action::Update(data.clone()));
                    self.notify(ChangeKind::Update, data);
                }
            }
            BusEvent::Indicator(hint) => {
                if self.state().get(&hint.id).is_some() {
                    if hint.relation().is_some() {
                        self.indicators.insert(hint.id, hint.offset);
                    } else {
                        self.indicators.remove(&hint.id);
                    }
                }
            }
        }
    }

    fn notify(&mut self, kind: ChangeKind, item: T) {
        let Some(on_change) = self.hooks.on_change.as_mut() else {
            return;
        };
        let items = self.store.state().data();
        on_change(&items, &ChangeEvent { kind, item });
    }

    fn end_gesture(&mut self) {
        self.resolver.end_gesture();
        self.trailing = None;
    }

    // --- Rendering ---

    /// Indicator-mode hint currently shown on item `id`.
    pub fn indicator(&self, id: &str) -> Relation {
        self.indicators
            .get(id)
            .map_or(Relation::None, |offset| Relation::from_offset(*offset))
    }

    /// Build render props for every item, in order.
    pub fn render_items<R>(&self, mut render: impl FnMut(ItemProps<'_, T>) -> R) -> Vec<R> {
        let state = self.state();
        let dragged = state.dragging().map(Entry::id);
        state
            .items()
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let dragging = dragged == Some(entry.id());
                render(ItemProps {
                    data: &entry.data,
                    index,
                    dragging,
                    indicator: self.indicator(entry.id()),
                    class_name: if dragging {
                        "sortable-item sortable-item-dragging"
                    } else {
                        "sortable-item"
                    },
                    style: ItemStyle {
                        opacity: if dragging { DRAGGING_OPACITY } else { 1.0 },
                    },
                    actions: ItemActions {
                        bus: self.bus.clone(),
                        container: self.id().clone(),
                        data: entry.data.clone(),
                    },
                    drag: DragHandle {
                        container: self.id().clone(),
                        id: String::from(entry.id()),
                        kind: String::from(entry.data.kind()),
                        enabled: self.can_drag(entry.id()),
                    },
                })
            })
            .collect()
    }
}

fn permits<T>(hook: &Option<AllowDropFn<T>>, args: &AllowDrop<'_, T>) -> bool {
    hook.as_ref().is_none_or(|f| f(args))
}

/// Process bus events on `containers` until none are left; returns the number handled.
pub fn pump<T: SortableItem + 'static>(containers: &mut [&mut Container<T>]) -> usize {
    let mut total = 0;
    loop {
        let mut handled = 0;
        for container in containers.iter_mut() {
            handled += container.process_events();
        }
        if handled == 0 {
            return total;
        }
        total += handled;
    }
}

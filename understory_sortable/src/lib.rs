// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Sortable: a headless drag-and-drop reordering engine.
//!
//! This crate reconciles drag gestures against ordered collections held by a tree of
//! nested drop containers. It does not render anything and does not recognize
//! pointer input; an external drag toolkit reports "a drag started", "the pointer is
//! over this container", "dropped here", and the host forwards those signals.
//!
//! The engine is built in layers:
//!
//! - [`geometry`]: pure comparator deciding whether a dragged item lands before or
//!   after a sibling, one strategy per layout and axis.
//! - [`store`]: per-container reducer over a closed set of [`store::Action`]s, with
//!   the move rejection rules and a pre-drag backup for cancellation.
//! - [`hover`]: throttled, memoized hover evaluation that stages at most one move per
//!   animation frame ([`schedule`] supplies the throttle and frame slot).
//! - [`bus`]: queued message passing shared by the containers of one tree; no
//!   container ever touches another container's store.
//! - [`container`]: the coordinator turning toolkit signals into store actions and
//!   bus events, and building render props.
//! - [`selector`]: slices of container state that report only real changes.
//!
//! ## Minimal example
//!
//! Reorder inside one list:
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use understory_sortable::bus::EventBus;
//! use understory_sortable::config::{ItemSource, SortableConfig};
//! use understory_sortable::container::{Container, DropFlags, pump};
//! use understory_sortable::entry::LiveRect;
//! use understory_sortable::{ChangeKind, Item};
//!
//! let bus = EventBus::new();
//! let items = ["a", "b", "c"].map(Item::new).to_vec();
//! let mut list = Container::new(bus, SortableConfig::default(), ItemSource::Items(items))
//!     .unwrap()
//!     .with_on_change(|items, event| {
//!         assert_eq!(event.kind, ChangeKind::Sort);
//!         assert_eq!(items[0].id, "b");
//!     });
//! list.set_bounds(LiveRect::fixed(Rect::new(0.0, 0.0, 100.0, 120.0)));
//! for (i, id) in ["a", "b", "c"].into_iter().enumerate() {
//!     let y = 40.0 * i as f64;
//!     list.register(id, LiveRect::fixed(Rect::new(0.0, y, 100.0, y + 40.0)));
//! }
//!
//! // The toolkit picks up "a"...
//! let item = list.begin_drag("a").unwrap();
//! pump(&mut [&mut list]);
//! // ...reports it over the list...
//! list.update_over(DropFlags::all(), Some(&item), Some(Point::ZERO));
//! // ...and moves it below the middle of "b".
//! if let Some(frame) = list.hover(&item, Point::new(0.0, 50.0), 0) {
//!     list.animation_frame(frame);
//! }
//! let result = list.accept_drop(&item);
//! list.end_drag(&item, result.as_ref());
//! pump(&mut [&mut list]);
//! assert_eq!(list.state().ids(), ["b", "a", "c"]);
//! ```
//!
//! ## Nesting
//!
//! [`container::Container::new_child`] creates a container whose id extends its
//! parent's (`s1/s2`), so ancestry is a prefix test on [`ContainerId`]. Moving an item
//! between containers is a `MoveIn` event: the target inserts the item and the
//! previous owner takes it out, both when they process the bus.
//!
//! ## Features
//!
//! - `std` (default): forwards to `kurbo/std`.
//! - `libm`: `no_std` float support through `kurbo/libm`.
//!
//! This crate is `no_std` and uses `alloc`. Diagnostics are emitted with `tracing`;
//! no subscriber is installed.

#![no_std]

extern crate alloc;

pub mod bus;
pub mod config;
pub mod container;
pub mod entry;
pub mod geometry;
pub mod hover;
pub mod preview;
pub mod schedule;
pub mod selector;
pub mod store;
mod types;

pub use types::{
    ChangeEvent, ChangeKind, ContainerId, DEFAULT_ITEM_TYPE, Direction, Item, Layout,
    ListenerId, Mode, Relation, SortLog, SortableItem,
};

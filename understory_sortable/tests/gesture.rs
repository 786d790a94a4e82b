// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Whole gestures across containers sharing one bus.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kurbo::{Point, Rect};
use understory_sortable::bus::EventBus;
use understory_sortable::config::{ItemSource, SortableConfig};
use understory_sortable::container::{Container, DropFlags, DropResult, pump};
use understory_sortable::entry::{DragItem, LiveRect};
use understory_sortable::{ChangeKind, Item};

type Log = Rc<RefCell<Vec<(ChangeKind, Vec<String>)>>>;

fn strings(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| String::from(*id)).collect()
}

/// A container at `bounds` whose items are stacked 40px rows from its top-left corner.
fn stacked(
    make: impl FnOnce(SortableConfig, ItemSource<Item>) -> Container<Item>,
    ids: &[&str],
    bounds: Rect,
) -> (Container<Item>, Log) {
    let log: Log = Rc::default();
    let sink = log.clone();
    let items = ids.iter().map(|id| Item::new(*id)).collect();
    let mut c = make(SortableConfig::default(), ItemSource::Items(items)).with_on_change(
        move |items, event| {
            let ids = items.iter().map(|i| i.id.clone()).collect();
            sink.borrow_mut().push((event.kind, ids));
        },
    );
    c.set_bounds(LiveRect::fixed(bounds));
    for (i, id) in ids.iter().enumerate() {
        let y = bounds.y0 + 40.0 * i as f64;
        c.register(id, LiveRect::fixed(Rect::new(bounds.x0, y, bounds.x0 + 100.0, y + 40.0)));
    }
    (c, log)
}

struct Tree {
    bus: EventBus<Item>,
    p: Container<Item>,
    p_log: Log,
    q: Container<Item>,
    q_log: Log,
}

impl Tree {
    /// P at the left holding A, B, X; Q nested inside P at the right holding C, D.
    fn new() -> Self {
        let bus = EventBus::new();
        let root_bus = bus.clone();
        let (p, p_log) = stacked(
            |cfg, src| Container::new(root_bus, cfg, src).unwrap(),
            &["A", "B", "X"],
            Rect::new(0.0, 0.0, 200.0, 400.0),
        );
        let (q, q_log) = stacked(
            |cfg, src| p.new_child(cfg, src).unwrap(),
            &["C", "D"],
            Rect::new(100.0, 0.0, 200.0, 200.0),
        );
        Self {
            bus,
            p,
            p_log,
            q,
            q_log,
        }
    }

    fn pump(&mut self) {
        pump(&mut [&mut self.p, &mut self.q]);
    }

    /// Start dragging X out of P and carry it into Q between C and D.
    fn carry_x_into_q(&mut self) -> DragItem<Item> {
        let item = self.p.begin_drag("X").unwrap();
        self.pump();
        self.p
            .update_over(DropFlags::OVER | DropFlags::CAN_DROP, Some(&item), None);
        self.q
            .update_over(DropFlags::all(), Some(&item), Some(Point::new(100.0, 30.0)));
        self.pump();
        item
    }
}

#[test]
fn cross_container_transfer_fires_one_drop_on_target() {
    let mut t = Tree::new();
    assert_eq!(t.q.id().as_str(), "s1/s2");
    let item = t.carry_x_into_q();

    assert_eq!(t.p.state().ids(), ["A", "B"]);
    assert_eq!(t.q.state().ids(), ["C", "X", "D"]);
    assert_eq!(item.owner(), Some(t.q.id().clone()));
    assert_eq!(item.origin(), Some(t.p.id().clone()));

    let result = t.q.accept_drop(&item);
    assert!(matches!(result, Some(DropResult::Sort { .. })));
    t.p.end_drag(&item, result.as_ref());
    t.pump();

    assert_eq!(
        *t.q_log.borrow(),
        [(ChangeKind::Drop, strings(&["C", "X", "D"]))]
    );
    assert_eq!(*t.p_log.borrow(), [(ChangeKind::Drag, strings(&["A", "B"]))]);
    assert!(!t.p.state().in_gesture());
    assert!(!t.q.state().in_gesture());
    assert!(t.bus.is_idle());
}

#[test]
fn cancelled_transfer_restores_both_containers() {
    let mut t = Tree::new();
    let item = t.carry_x_into_q();
    t.p.end_drag(&item, Some(&DropResult::Other));
    t.pump();
    assert_eq!(t.p.state().ids(), ["A", "B", "X"]);
    assert_eq!(t.q.state().ids(), ["C", "D"]);
    assert!(t.p_log.borrow().is_empty());
    assert!(t.q_log.borrow().is_empty());
}

#[test]
fn removal_through_transient_owner_snaps_back() {
    let mut t = Tree::new();
    let item = t.carry_x_into_q();
    t.p.end_drag(&item, Some(&DropResult::Remove));
    t.pump();
    // The origin reports the removal; Q, which only held X in passing, resets.
    assert_eq!(t.p.state().ids(), ["A", "B"]);
    assert_eq!(t.q.state().ids(), ["C", "D"]);
    assert_eq!(*t.p_log.borrow(), [(ChangeKind::Remove, strings(&["A", "B"]))]);
    assert!(t.q_log.borrow().is_empty());
}

#[test]
fn external_item_is_claimed_and_released() {
    let overs = Rc::new(Cell::new(0));
    let outs = Rc::new(Cell::new(0));
    let (o, u) = (overs.clone(), outs.clone());
    let bus = EventBus::new();
    let (mut p, _) = stacked(
        |cfg, src| Container::new(bus, cfg, src).unwrap(),
        &["A", "B"],
        Rect::new(0.0, 0.0, 200.0, 400.0),
    );
    let (mut q, q_log) = stacked(
        |cfg, src| {
            p.new_child(cfg, src)
                .unwrap()
                .with_on_drag_over(move |_| o.set(o.get() + 1))
                .with_on_drag_out(move |_| u.set(u.get() + 1))
        },
        &["C", "D"],
        Rect::new(100.0, 0.0, 200.0, 200.0),
    );

    let palette = DragItem::external(
        Item::new("N"),
        Some(LiveRect::fixed(Rect::new(500.0, 0.0, 600.0, 40.0))),
    );
    q.update_over(DropFlags::all(), Some(&palette), Some(Point::new(100.0, 5.0)));
    pump(&mut [&mut p, &mut q]);
    assert_eq!(palette.registered(), Some(q.id().clone()));
    assert_eq!(palette.owner(), Some(q.id().clone()));
    // Just below C's midline.
    assert_eq!(q.state().ids(), ["C", "N", "D"]);
    assert_eq!(p.state().ids(), ["A", "B"]);

    q.update_over(DropFlags::OVER | DropFlags::CAN_DROP, Some(&palette), None);
    pump(&mut [&mut p, &mut q]);
    assert_eq!(q.state().ids(), ["C", "D"]);
    assert_eq!(palette.owner(), None);
    assert_eq!((overs.get(), outs.get()), (1, 1));
    assert!(q_log.borrow().is_empty());
}

#[test]
fn item_handed_back_to_its_root_can_be_reclaimed() {
    let bus = EventBus::new();
    let second = bus.clone();
    let (mut p, p_log) = stacked(
        |cfg, src| Container::new(bus, cfg, src).unwrap(),
        &["A", "B", "X"],
        Rect::new(0.0, 0.0, 100.0, 400.0),
    );
    let (mut r, r_log) = stacked(
        |cfg, src| Container::new(second, cfg, src).unwrap(),
        &["C", "D"],
        Rect::new(200.0, 0.0, 300.0, 400.0),
    );
    assert!(r.id().is_root());

    let item = p.begin_drag("X").unwrap();
    p.update_over(DropFlags::all(), Some(&item), Some(Point::new(0.0, 80.0)));
    pump(&mut [&mut p, &mut r]);

    // Into R, between C and D.
    p.update_over(DropFlags::CAN_DROP, Some(&item), None);
    r.update_over(DropFlags::all(), Some(&item), Some(Point::new(200.0, 30.0)));
    pump(&mut [&mut p, &mut r]);
    assert_eq!(p.state().ids(), ["A", "B"]);
    assert_eq!(r.state().ids(), ["C", "X", "D"]);

    // Out of R: the foreign item goes back to P's ownership, but P no longer holds it.
    r.update_over(DropFlags::CAN_DROP, Some(&item), None);
    pump(&mut [&mut p, &mut r]);
    assert_eq!(r.state().ids(), ["C", "D"]);
    assert_eq!(item.owner(), Some(p.id().clone()));

    // Back over P, below B: P claims it again.
    p.update_over(DropFlags::all(), Some(&item), Some(Point::new(0.0, 90.0)));
    pump(&mut [&mut p, &mut r]);
    assert_eq!(p.state().ids(), ["A", "B", "X"]);

    let result = p.accept_drop(&item);
    p.end_drag(&item, result.as_ref());
    pump(&mut [&mut p, &mut r]);
    assert_eq!(*p_log.borrow(), [(ChangeKind::Sort, strings(&["A", "B", "X"]))]);
    assert!(r_log.borrow().is_empty());
    assert_eq!(r.state().ids(), ["C", "D"]);
}

fn list(ids: &[&str]) -> (Container<Item>, Log) {
    let bus = EventBus::new();
    stacked(
        |cfg, src| Container::new(bus, cfg, src).unwrap(),
        ids,
        Rect::new(0.0, 0.0, 100.0, 400.0),
    )
}

#[test]
fn throttled_samples_collapse_into_one_mutation() {
    let (mut c, _) = list(&["A", "B", "C", "D"]);
    let item = c.begin_drag("A").unwrap();
    pump(&mut [&mut c]);
    c.update_over(DropFlags::all(), Some(&item), Some(Point::ZERO));
    let version = c.store().version();

    // Three samples inside one window: nothing, after B, after C.
    assert!(c.hover(&item, Point::new(0.0, 5.0), 0).is_none());
    assert!(c.hover(&item, Point::new(0.0, 50.0), 10).is_none());
    assert!(c.hover(&item, Point::new(0.0, 90.0), 20).is_none());
    let frame = c.poll(60).unwrap();
    assert!(c.animation_frame(frame));

    assert_eq!(c.store().version(), version + 1);
    assert_eq!(c.state().ids(), ["B", "C", "A", "D"]);
}

#[test]
fn proposals_within_one_frame_keep_only_the_last() {
    let (mut c, _) = list(&["A", "B", "C", "D"]);
    let item = c.begin_drag("A").unwrap();
    pump(&mut [&mut c]);
    c.update_over(DropFlags::all(), Some(&item), Some(Point::ZERO));
    let version = c.store().version();

    let frame = c.hover(&item, Point::new(0.0, 50.0), 0).unwrap();
    // The frame has not run yet; this proposal replaces the staged one.
    assert!(c.hover(&item, Point::new(0.0, 90.0), 100).is_none());
    assert!(c.animation_frame(frame));
    assert_eq!(c.store().version(), version + 1);
    assert_eq!(c.state().ids(), ["B", "C", "A", "D"]);
}

#[test]
fn stale_frame_after_reset_is_harmless() {
    let (mut c, log) = list(&["A", "B", "C"]);
    let item = c.begin_drag("A").unwrap();
    pump(&mut [&mut c]);
    c.update_over(DropFlags::all(), Some(&item), Some(Point::ZERO));
    let frame = c.hover(&item, Point::new(0.0, 50.0), 0).unwrap();
    c.end_drag(&item, None);
    pump(&mut [&mut c]);
    assert!(!c.animation_frame(frame));
    assert_eq!(c.state().ids(), ["A", "B", "C"]);
    assert!(log.borrow().is_empty());
}

#[test]
fn in_flight_animation_blocks_retargeting() {
    let (mut c, _) = list(&["A", "B", "C", "D"]);
    let item = c.begin_drag("A").unwrap();
    pump(&mut [&mut c]);
    c.update_over(DropFlags::all(), Some(&item), Some(Point::ZERO));
    let frame = c.hover(&item, Point::new(0.0, 50.0), 0).unwrap();
    assert!(c.animation_frame(frame));
    assert_eq!(c.state().ids(), ["B", "A", "C", "D"]);

    // The host lays out the new order and starts the transition.
    c.register("B", LiveRect::fixed(Rect::new(0.0, 0.0, 100.0, 40.0)));
    c.register("A", LiveRect::fixed(Rect::new(0.0, 40.0, 100.0, 80.0)));
    c.set_moving(true);
    // Back above B, which sits inside the span of the move still animating.
    assert!(c.hover(&item, Point::new(0.0, -5.0), 100).is_none());
    assert_eq!(c.state().ids(), ["B", "A", "C", "D"]);

    c.set_moving(false);
    let frame = c.hover(&item, Point::new(0.0, -5.0), 200).unwrap();
    assert!(c.animation_frame(frame));
    assert_eq!(c.state().ids(), ["A", "B", "C", "D"]);
}

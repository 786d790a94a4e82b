// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reordering one vertical list with a simulated pointer.
//!
//! This example shows how to:
//! - implement `SortableItem` for host data,
//! - feed live item measurements that follow the current order,
//! - drive hover with a throttle clock and animation frames,
//! - watch a slice of container state.
//!
//! Run:
//! - `cargo run -p understory_demos --example sortable_list`

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Point, Rect};
use understory_sortable::bus::EventBus;
use understory_sortable::config::{ItemSource, SortableConfig};
use understory_sortable::container::{Container, DropFlags, pump};
use understory_sortable::entry::LiveRect;
use understory_sortable::preview::{PreviewOptions, item_offset};
use understory_sortable::{Direction, SortableItem};

const ROW: f64 = 40.0;

/// Host data: a to-do card.
#[derive(Clone, Debug, PartialEq)]
struct Card {
    id: String,
    title: &'static str,
    pinned: bool,
}

impl SortableItem for Card {
    fn id(&self) -> &str {
        &self.id
    }

    fn sortable(&self) -> bool {
        !self.pinned
    }
}

fn card(id: &str, title: &'static str) -> Card {
    Card {
        id: id.into(),
        title,
        pinned: false,
    }
}

fn main() {
    let cards = vec![
        card("c1", "Write parser"),
        card("c2", "Fix layout"),
        card("c3", "Review docs"),
        Card {
            pinned: true,
            ..card("c4", "Release")
        },
    ];

    // The "laid out" order: each card's rectangle follows its current slot.
    let laid_out: Rc<RefCell<Vec<String>>> =
        Rc::new(RefCell::new(cards.iter().map(|c| c.id.clone()).collect()));

    let bus = EventBus::new();
    let config = SortableConfig::default()
        .with_throttle_ms(50)
        .with_preview(PreviewOptions::default().with_lock_axis(true));
    let mut list = Container::new(bus, config, ItemSource::Items(cards.clone()))
        .expect("valid configuration")
        .with_on_change(|items: &[Card], event| {
            let titles: Vec<_> = items.iter().map(|c| c.title).collect();
            println!("{:?} {:?} -> {titles:?}", event.kind, event.item.id);
        });
    list.set_bounds(LiveRect::fixed(Rect::new(20.0, 20.0, 220.0, 220.0)));
    for c in &cards {
        let order = laid_out.clone();
        let id = c.id.clone();
        list.register(
            &c.id,
            LiveRect::new(move || {
                let slot = order.borrow().iter().position(|o| *o == id)?;
                let y = 20.0 + ROW * slot as f64;
                Some(Rect::new(20.0, y, 220.0, y + ROW))
            }),
        );
    }
    let order = list.watch(|s| {
        s.ids().into_iter().map(String::from).collect::<Vec<_>>()
    });

    println!("class: {}", list.class_name());
    println!("c4 draggable: {}", list.can_drag("c4"));

    let item = list.begin_drag("c1").expect("c1 is draggable");
    pump(&mut [&mut list]);
    list.update_over(DropFlags::all(), Some(&item), Some(Point::new(20.0, 20.0)));

    // Drag the card's top-left corner down, one sample every 16ms, with a little
    // horizontal wobble the axis lock removes.
    let start = Point::new(20.0, 20.0);
    let options = list.config().preview.unwrap_or_default();
    let mut now = 0;
    for step in 0..=8 {
        let pointer = Point::new(20.0 + f64::from(step % 3), 20.0 + 12.0 * f64::from(step));
        let at = item_offset(Some(start), Some(pointer), &options, list.config().direction())
            .unwrap_or(pointer);
        let mut frame = list.hover(&item, at, now);
        if frame.is_none() {
            frame = list.poll(now);
        }
        if let Some(frame) = frame
            && list.animation_frame(frame)
        {
            // The host renders the new order; measurements follow.
            *laid_out.borrow_mut() = list.state().ids().into_iter().map(String::from).collect();
        }
        if order.take_changed() {
            println!("t={now:>3}ms preview at {at:?}: {:?}", order.get());
        }
        now += 16;
    }
    if let Some(frame) = list.poll(now + 100)
        && list.animation_frame(frame)
    {
        println!("trailing sample: {:?}", order.get());
    }

    let result = list.accept_drop(&item);
    list.end_drag(&item, result.as_ref());
    pump(&mut [&mut list]);

    let rows = list.render_items(|props| {
        format!(
            "{} {} [{}] drag={}",
            props.index, props.data.title, props.class_name, props.drag.enabled
        )
    });
    for row in rows {
        println!("{row}");
    }
    assert_eq!(list.config().direction(), Direction::Vertical);
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Moving items between nested containers that share one bus.
//!
//! This example shows how to:
//! - build a root container and a nested child (`s1`, `s1/s2`),
//! - carry an item into the child when the pointer enters it,
//! - drop it there and see which container reports what,
//! - remove an item through its render-time actions.
//!
//! Run:
//! - `cargo run -p understory_demos --example sortable_nested`

use kurbo::{Point, Rect};
use understory_sortable::bus::EventBus;
use understory_sortable::config::{ItemSource, SortableConfig};
use understory_sortable::container::{Container, DropFlags, pump};
use understory_sortable::entry::LiveRect;
use understory_sortable::{Item, SortableItem};

fn column(container: &mut Container<Item>, ids: &[&str], bounds: Rect) {
    container.set_bounds(LiveRect::fixed(bounds));
    for (i, id) in ids.iter().enumerate() {
        let y = bounds.y0 + 40.0 * i as f64;
        container.register(
            id,
            LiveRect::fixed(Rect::new(bounds.x0, y, bounds.x0 + 100.0, y + 40.0)),
        );
    }
}

fn report(name: &'static str) -> impl FnMut(&[Item], &understory_sortable::ChangeEvent<Item>) {
    move |items, event| {
        let ids: Vec<_> = items.iter().map(SortableItem::id).collect();
        println!("[{name}] {:?} of {}: {ids:?}", event.kind, event.item.id);
    }
}

fn main() {
    let bus = EventBus::new();
    let inbox_ids = ["mail", "chat", "docs"];
    let archive_ids = ["old", "older"];

    let mut inbox = Container::new(
        bus.clone(),
        SortableConfig::default(),
        ItemSource::Items(inbox_ids.map(Item::new).to_vec()),
    )
    .expect("items supplied")
    .with_on_change(report("inbox"));
    let mut archive = inbox
        .new_child(
            SortableConfig::default(),
            ItemSource::Items(archive_ids.map(Item::new).to_vec()),
        )
        .expect("items supplied")
        .with_on_change(report("archive"))
        .with_on_drag_over(|item: &Item| println!("archive claims {}", item.id));

    column(&mut inbox, &inbox_ids, Rect::new(0.0, 0.0, 240.0, 300.0));
    column(&mut archive, &archive_ids, Rect::new(120.0, 0.0, 240.0, 120.0));
    println!("{} contains {}", inbox.id(), archive.id());

    // Pick up "chat" and carry it over the archive, just under "old".
    let item = inbox.begin_drag("chat").expect("chat is draggable");
    pump(&mut [&mut inbox, &mut archive]);
    inbox.update_over(DropFlags::OVER | DropFlags::CAN_DROP, Some(&item), None);
    archive.update_over(DropFlags::all(), Some(&item), Some(Point::new(120.0, 25.0)));
    let handled = pump(&mut [&mut inbox, &mut archive]);
    println!(
        "after {handled} events: inbox {:?}, archive {:?}",
        inbox.state().ids(),
        archive.state().ids()
    );

    // Drop on the archive; the inbox sees a drag, the archive a drop.
    let result = archive.accept_drop(&item);
    inbox.end_drag(&item, result.as_ref());
    pump(&mut [&mut inbox, &mut archive]);

    // Delete "older" from its row's actions.
    let actions = archive.render_items(|props| (props.data.id.clone(), props.actions));
    if let Some((_, remove)) = actions.iter().find(|(id, _)| id == "older") {
        remove.remove();
    }
    pump(&mut [&mut inbox, &mut archive]);
    println!("archive now {:?}", archive.state().ids());
    debug_assert!(bus.is_idle());
}

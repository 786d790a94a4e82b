// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry comparator: where does a dragged item land relative to a sibling?
//!
//! ## Inputs
//!
//! All rectangles are in the drop container's local coordinate frame.
//!
//! - The *candidate* is a sibling's current rectangle.
//! - The dragged item is described by [`Moving`]: its `projected` rectangle (where the
//!   pointer currently holds it) and its `home` rectangle (the slot it occupies in
//!   layout right now).
//!
//! ## Strategies
//!
//! One pure function per `Layout × Direction`, selected by [`strategy`]:
//!
//! | Layout | Direction | Rule |
//! |---|---|---|
//! | list | vertical | projected midline vs candidate midline on `y` |
//! | list | horizontal | projected midline vs candidate midline on `x` |
//! | grid | horizontal | row-major order of `home` vs candidate |
//! | grid | vertical | column-major order of `home` vs candidate |
//!
//! Every strategy first requires the projected rectangle to overlap the candidate.
//! Lists additionally require the smaller rectangle's center to fall inside the larger
//! one; grids require the candidate's center to fall inside the projected rectangle.
//! Overlap is strict: touching edges do not overlap.
//!
//! A strategy returns a signed offset. `NaN` means no relation, positive means the
//! dragged item goes after the candidate, and zero or negative means before. List
//! strategies return the midline distance, so magnitude grows with overlap depth;
//! grid strategies return `±1`. [`compare`] folds the offset into a [`Relation`].
//!
//! ```
//! use kurbo::Rect;
//! use understory_sortable::geometry::{Moving, compare};
//! use understory_sortable::{Direction, Layout, Relation};
//!
//! let candidate = Rect::new(0.0, 40.0, 100.0, 80.0);
//! // Dragged 10px into the candidate's top half.
//! let moving = Moving::at(Rect::new(0.0, 30.0, 100.0, 70.0));
//! assert_eq!(compare(&candidate, &moving, Layout::List, Direction::Vertical), Relation::Before);
//! // Past the candidate's midline.
//! let moving = Moving::at(Rect::new(0.0, 50.0, 100.0, 90.0));
//! assert_eq!(compare(&candidate, &moving, Layout::List, Direction::Vertical), Relation::After);
//! ```

use kurbo::{Point, Rect};

use crate::types::{Direction, Layout, Relation};

/// The dragged item's geometry for one comparison.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Moving {
    /// Where the pointer currently holds the item.
    pub projected: Rect,
    /// The slot the item occupies in layout.
    pub home: Rect,
}

impl Moving {
    /// Geometry from an explicit projection and home slot.
    #[must_use]
    pub const fn new(projected: Rect, home: Rect) -> Self {
        Self { projected, home }
    }

    /// Geometry for an item whose home slot is where it is projected.
    #[must_use]
    pub const fn at(rect: Rect) -> Self {
        Self {
            projected: rect,
            home: rect,
        }
    }
}

/// A comparison strategy; see the [module docs](self).
pub type Strategy = fn(&Rect, &Moving) -> f64;

/// Pick the comparison strategy for a layout and direction.
#[must_use]
pub fn strategy(layout: Layout, direction: Direction) -> Strategy {
    match (layout, direction) {
        (Layout::List, Direction::Vertical) => list_vertical,
        (Layout::List, Direction::Horizontal) => list_horizontal,
        (Layout::Grid, Direction::Horizontal) => grid_rows,
        (Layout::Grid, Direction::Vertical) => grid_columns,
    }
}

/// Signed comparator result (`NaN` for no relation).
#[must_use]
pub fn offset(candidate: &Rect, moving: &Moving, layout: Layout, direction: Direction) -> f64 {
    strategy(layout, direction)(candidate, moving)
}

/// Directional relation of `moving` against `candidate`.
#[must_use]
pub fn compare(
    candidate: &Rect,
    moving: &Moving,
    layout: Layout,
    direction: Direction,
) -> Relation {
    Relation::from_offset(offset(candidate, moving, layout, direction))
}

/// Index at which a foreign item entering a container should be inserted.
///
/// Scans `candidates` (the container's item rectangles in order, `None` for unmeasured
/// items) and stops at the first one the moving item relates to; returns that index,
/// plus one if the relation is `After`. Returns `None` (append) when nothing relates.
pub fn insert_index<I>(
    candidates: I,
    moving: &Moving,
    layout: Layout,
    direction: Direction,
) -> Option<usize>
where
    I: IntoIterator<Item = Option<Rect>>,
{
    let compare = strategy(layout, direction);
    for (index, rect) in candidates.into_iter().enumerate() {
        let Some(rect) = rect else {
            continue;
        };
        let offset = compare(&rect, moving);
        if offset.is_nan() {
            continue;
        }
        return Some(if offset > 0.0 { index + 1 } else { index });
    }
    None
}

/// Strict overlap on both axes; touching edges do not count.
#[must_use]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    spans_overlap(a.x0, a.x1, b.x0, b.x1) && spans_overlap(a.y0, a.y1, b.y0, b.y1)
}

fn spans_overlap(a0: f64, a1: f64, b0: f64, b1: f64) -> bool {
    !(a1 <= b0 || b1 <= a0)
}

fn contains_strict(rect: &Rect, p: Point) -> bool {
    overlaps(rect, &Rect::from_points(p, p))
}

fn list_vertical(candidate: &Rect, moving: &Moving) -> f64 {
    let projected = &moving.projected;
    if !overlaps(projected, candidate) {
        return f64::NAN;
    }
    let cc = candidate.center();
    let pc = projected.center();
    let engaged = if projected.height() > candidate.height() {
        contains_strict(projected, cc)
    } else {
        contains_strict(candidate, pc)
    };
    if !engaged {
        return f64::NAN;
    }
    pc.y - cc.y
}

fn list_horizontal(candidate: &Rect, moving: &Moving) -> f64 {
    let projected = &moving.projected;
    if !overlaps(projected, candidate) {
        return f64::NAN;
    }
    let cc = candidate.center();
    let pc = projected.center();
    let engaged = if projected.width() > candidate.width() {
        contains_strict(projected, cc)
    } else {
        contains_strict(candidate, pc)
    };
    if !engaged {
        return f64::NAN;
    }
    pc.x - cc.x
}

fn grid_engaged(candidate: &Rect, moving: &Moving) -> bool {
    overlaps(&moving.projected, candidate) && contains_strict(&moving.projected, candidate.center())
}

// Home slot ahead of the candidate in reading order means the item travels forward
// and lands after it. Edges that touch count as "ahead".
fn grid_rows(candidate: &Rect, moving: &Moving) -> f64 {
    if !grid_engaged(candidate, moving) {
        return f64::NAN;
    }
    let home = &moving.home;
    let ahead = home.y1 <= candidate.y0
        || (spans_overlap(home.y0, home.y1, candidate.y0, candidate.y1) && home.x1 <= candidate.x0);
    if ahead { 1.0 } else { -1.0 }
}

fn grid_columns(candidate: &Rect, moving: &Moving) -> f64 {
    if !grid_engaged(candidate, moving) {
        return f64::NAN;
    }
    let home = &moving.home;
    let ahead = home.x1 <= candidate.x0
        || (spans_overlap(home.x0, home.x1, candidate.x0, candidate.x1) && home.y1 <= candidate.y0);
    if ahead { 1.0 } else { -1.0 }
}

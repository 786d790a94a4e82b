// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover resolution: which sibling should the dragged item trade places with?
//!
//! ## Flow
//!
//! While the drag toolkit reports the pointer directly over a container, the
//! container feeds pointer samples through the resolver:
//!
//! 1. [`HoverResolver::admit`] throttles samples to one per window. A rejected sample
//!    arms a trailing evaluation the host polls with [`HoverResolver::due`].
//! 2. [`HoverResolver::probe`] projects the dragged item at the current source offset
//!    into the container's local frame.
//! 3. [`HoverResolver::scan`] walks the visible siblings in order and returns the
//!    first [`Proposal`] the comparator and the host's allow-drop predicate agree on.
//!    In indicator mode [`HoverResolver::indicate`] produces hints instead.
//! 4. [`HoverResolver::propose`] drops a repeat of the previous proposal and any move
//!    the store would reject, then stages the rest in a single-slot frame buffer.
//! 5. On the next animation frame, [`HoverResolver::take_frame`] yields the staged
//!    proposal, if the frame token is still current.
//!
//! ## Candidate window
//!
//! With a proximity factor `f`, candidates must intersect the projected rectangle
//! inflated by `f` times its own size. Every comparator strategy requires overlap with
//! the projected rectangle itself, so the window never hides a candidate that could
//! relate; it only saves measuring and comparing distant siblings. A factor of `None`
//! scans every visible sibling.

use alloc::string::String;

use kurbo::{Point, Rect};
use smallvec::SmallVec;

use crate::bus::Indicator;
use crate::entry::{DragItem, Entry};
use crate::geometry::{self, Moving};
use crate::schedule::{FrameSlot, FrameToken, Throttle};
use crate::store::{Action, ContainerState};
use crate::types::{Direction, Layout, Mode, Relation, SortableItem};

/// A move the resolver wants committed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proposal {
    /// Id of the dragged item.
    pub source: String,
    /// Id of the sibling it should land next to.
    pub target: String,
    /// Which side of `target`.
    pub relation: Relation,
}

impl Proposal {
    /// The store action committing this proposal.
    pub fn into_action<T>(self) -> Action<T> {
        Action::Move {
            source: self.source,
            target: self.target,
            relation: self.relation,
        }
    }
}

/// Arguments handed to the host's allow-drop predicate.
#[derive(Debug)]
pub struct AllowDrop<'a, T> {
    /// The candidate sibling.
    pub node: &'a T,
    /// The dragged item.
    pub drag_node: &'a T,
    /// Where the dragged item would land relative to `node`.
    pub position: Relation,
}

/// Throttled, memoized hover evaluation for one container.
#[derive(Clone, Debug)]
pub struct HoverResolver {
    layout: Layout,
    direction: Direction,
    mode: Mode,
    proximity: Option<f64>,
    throttle: Throttle,
    last: Option<Proposal>,
    frame: FrameSlot<Proposal>,
    node: Option<(String, f64)>,
}

impl HoverResolver {
    /// A resolver for the given layout.
    #[must_use]
    pub fn new(
        layout: Layout,
        direction: Direction,
        mode: Mode,
        throttle_ms: u64,
        proximity: Option<f64>,
    ) -> Self {
        Self {
            layout,
            direction,
            mode,
            proximity,
            throttle: Throttle::new(throttle_ms),
            last: None,
            frame: FrameSlot::new(),
            node: None,
        }
    }

    /// The hover mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns `true` if a sample at `now` should be evaluated.
    pub fn admit(&mut self, now: u64) -> bool {
        self.throttle.admit(now)
    }

    /// Returns `true` once when a throttled trailing sample is ready to evaluate.
    pub fn due(&mut self, now: u64) -> bool {
        self.throttle.due(now)
    }

    /// Project the dragged item at `source_offset` into `bounds`' local frame.
    ///
    /// The item's size comes from its visible entry in this container when there is
    /// one, otherwise from the payload. Returns `None` while the payload is unmeasured.
    pub fn probe<T: SortableItem>(
        &self,
        state: &ContainerState<T>,
        item: &DragItem<T>,
        bounds: Rect,
        source_offset: Point,
    ) -> Option<Moving> {
        let own = item.live_rect()?;
        let id = item.id();
        let rect = state
            .get(&id)
            .filter(|e| state.is_active(e.id()))
            .and_then(Entry::live_rect)
            .unwrap_or(own);
        Some(project(rect, bounds, source_offset))
    }

    /// Visible, measured siblings inside the candidate window, in order, with their
    /// rectangles in local coordinates.
    pub fn candidates<'a, T: SortableItem>(
        &'a self,
        state: &'a ContainerState<T>,
        bounds: Rect,
        moving: &'a Moving,
    ) -> impl Iterator<Item = (&'a Entry<T>, Rect)> + 'a {
        let origin = bounds.origin().to_vec2();
        let window = self.proximity.map(|f| {
            let p = moving.projected;
            p.inflate(p.width() * f, p.height() * f)
        });
        state.active_items().filter_map(move |entry| {
            let rect = entry.live_rect()? - origin;
            match window {
                Some(w) if !geometry::overlaps(&w, &rect) => None,
                _ => Some((entry, rect)),
            }
        })
    }

    /// Direct mode: the first sibling the dragged item relates to and the host allows.
    pub fn scan<T: SortableItem>(
        &self,
        state: &ContainerState<T>,
        item: &T,
        bounds: Rect,
        moving: &Moving,
        mut allow: impl FnMut(&AllowDrop<'_, T>) -> bool,
    ) -> Option<Proposal> {
        let compare = geometry::strategy(self.layout, self.direction);
        for (entry, rect) in self.candidates(state, bounds, moving) {
            let relation = Relation::from_offset(compare(&rect, moving));
            if !relation.is_some() || entry.id() == item.id() {
                continue;
            }
            let args = AllowDrop {
                node: &entry.data,
                drag_node: item,
                position: relation,
            };
            if !allow(&args) {
                tracing::trace!(target_id = entry.id(), "allow-drop vetoed candidate");
                continue;
            }
            return Some(Proposal {
                source: String::from(item.id()),
                target: String::from(entry.id()),
                relation,
            });
        }
        None
    }

    /// Indicator mode: hints for every related sibling, without reordering.
    ///
    /// The last allowed sibling becomes the indicated node; the dragged item itself and
    /// vetoed siblings get their hint cleared.
    pub fn indicate<T: SortableItem>(
        &mut self,
        state: &ContainerState<T>,
        item: &T,
        bounds: Rect,
        moving: &Moving,
        mut allow: impl FnMut(&AllowDrop<'_, T>) -> bool,
    ) -> SmallVec<[Indicator; 4]> {
        let compare = geometry::strategy(self.layout, self.direction);
        let previous = self.node.take();
        let mut hints = SmallVec::new();
        let mut node = None;
        for (entry, rect) in self.candidates(state, bounds, moving) {
            let offset = compare(&rect, moving);
            let relation = Relation::from_offset(offset);
            if !relation.is_some() {
                continue;
            }
            let args = AllowDrop {
                node: &entry.data,
                drag_node: item,
                position: relation,
            };
            if entry.id() == item.id() || !allow(&args) {
                hints.push(Indicator::clear(entry.id()));
                node = None;
                continue;
            }
            hints.push(Indicator {
                id: String::from(entry.id()),
                offset,
            });
            node = Some((String::from(entry.id()), offset));
        }
        if let Some((prev, _)) = previous
            && node.as_ref().is_none_or(|(id, _)| *id != prev)
            && !hints.iter().any(|h: &Indicator| h.id == prev)
        {
            hints.push(Indicator::clear(prev));
        }
        self.node = node;
        hints
    }

    /// The indicated node and side, in indicator mode.
    pub fn indicated(&self) -> Option<(&str, Relation)> {
        self.node
            .as_ref()
            .map(|(id, offset)| (id.as_str(), Relation::from_offset(*offset)))
    }

    /// Clear the indicated node, returning its id.
    pub fn take_indicated(&mut self) -> Option<(String, Relation)> {
        self.node
            .take()
            .map(|(id, offset)| (id, Relation::from_offset(offset)))
    }

    /// Stage `proposal` for the next frame unless it repeats the previous one or the
    /// store would reject it.
    ///
    /// Returns a token when the host must request an animation frame.
    pub fn propose<T: SortableItem>(
        &mut self,
        state: &ContainerState<T>,
        proposal: Proposal,
    ) -> Option<FrameToken> {
        if self.last.as_ref() == Some(&proposal) {
            tracing::trace!(source = %proposal.source, target = %proposal.target, "repeat proposal");
            return None;
        }
        if let Err(reason) = state.check_move(&proposal.source, &proposal.target, proposal.relation)
        {
            tracing::trace!(source = %proposal.source, target = %proposal.target, %reason, "proposal rejected");
            return None;
        }
        self.last = Some(proposal.clone());
        self.frame.schedule(proposal)
    }

    /// The proposal staged for the frame identified by `token`.
    pub fn take_frame(&mut self, token: FrameToken) -> Option<Proposal> {
        self.frame.take(token)
    }

    /// Whether a staged proposal is waiting for a frame.
    #[must_use]
    pub fn frame_pending(&self) -> bool {
        self.frame.is_requested()
    }

    /// Forget the previous proposal so an identical one is accepted again.
    pub fn forget(&mut self) {
        self.last = None;
    }

    /// Clear all per-gesture state; outstanding frame tokens become stale.
    pub fn end_gesture(&mut self) {
        self.frame.cancel();
        self.throttle.reset();
        self.last = None;
        self.node = None;
    }
}

/// Geometry of an item of `rect` whose source is held at `source_offset`, relative
/// to a container at `bounds`. All inputs are client coordinates.
#[must_use]
pub fn project(rect: Rect, bounds: Rect, source_offset: Point) -> Moving {
    let origin = bounds.origin().to_vec2();
    Moving::new(
        Rect::from_origin_size(source_offset - origin, rect.size()),
        rect - origin,
    )
}

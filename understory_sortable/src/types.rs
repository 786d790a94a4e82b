// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public vocabulary types: layout, direction, relations, change events and container ids.

use alloc::rc::Rc;
use alloc::string::String;
use core::fmt;
use core::ops::RangeInclusive;

/// Type tag used when an item does not declare one.
pub const DEFAULT_ITEM_TYPE: &str = "sortable-card";

/// How the items of a container are laid out.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Layout {
    /// A single row or column; see [`Direction`].
    #[default]
    List,
    /// Items wrap onto several rows (or columns).
    Grid,
}

impl Layout {
    /// Direction used when the host does not pick one.
    ///
    /// Grids scan row by row (horizontal), lists stack vertically.
    #[must_use]
    pub const fn default_direction(self) -> Direction {
        match self {
            Self::List => Direction::Vertical,
            Self::Grid => Direction::Horizontal,
        }
    }

    /// Lowercase name, as used in class names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Grid => "grid",
        }
    }
}

/// Main axis of a list, or scan order of a grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    Vertical,
}

impl Direction {
    /// Lowercase name, as used in class names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

/// Where a dragged item should land relative to a candidate sibling.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Land in front of the candidate.
    Before,
    /// Land behind the candidate.
    After,
    /// The dragged item does not interact with the candidate.
    None,
}

impl Relation {
    /// Convert a signed comparator offset into a relation.
    ///
    /// `NaN` means "no relation"; positive values are [`Relation::After`]; zero and
    /// negative values are [`Relation::Before`], so exact midline ties resolve to
    /// `Before`.
    #[must_use]
    pub fn from_offset(offset: f64) -> Self {
        if offset.is_nan() {
            Self::None
        } else if offset > 0.0 {
            Self::After
        } else {
            Self::Before
        }
    }

    /// Unit signed value of this relation (`NaN` for [`Relation::None`]).
    #[must_use]
    pub const fn signum(self) -> f64 {
        match self {
            Self::Before => -1.0,
            Self::After => 1.0,
            Self::None => f64::NAN,
        }
    }

    /// Returns `true` unless this is [`Relation::None`].
    #[must_use]
    pub const fn is_some(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Hover interaction style.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Reorder live while hovering ("what you see is what you get").
    #[default]
    Direct,
    /// Only show an insertion indicator; the host commits on drop.
    Indicator,
}

/// Kind of change reported to the host's change callback.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Reordered within the same container.
    Sort,
    /// An item left this container for another one.
    Drag,
    /// An item from another container was dropped here.
    Drop,
    /// An item was removed.
    Remove,
    /// An item's data was updated in place.
    Update,
}

/// Change notification handed to the host.
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeEvent<T> {
    /// What happened.
    pub kind: ChangeKind,
    /// The item that triggered the change.
    pub item: T,
}

/// One committed move within a gesture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortLog {
    /// Id of the moved item.
    pub source: String,
    /// Id of the sibling it was moved next to.
    pub target: String,
    /// Index of `source` before the move.
    pub source_index: usize,
    /// Index of `target` before the move (and of `source` after it).
    pub target_index: usize,
}

impl SortLog {
    /// Inclusive index span touched by this move.
    #[must_use]
    pub fn span(&self) -> RangeInclusive<usize> {
        let lo = self.source_index.min(self.target_index);
        let hi = self.source_index.max(self.target_index);
        lo..=hi
    }
}

/// Handle returned when registering a listener; pass it back to unregister.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

/// Host-owned record participating in ordering.
///
/// Only the id is required. Ids must be unique across every container that
/// shares an [`EventBus`](crate::bus::EventBus).
pub trait SortableItem: Clone + PartialEq {
    /// Stable identifier.
    fn id(&self) -> &str;

    /// Type tag matched against a container's accept list.
    fn kind(&self) -> &str {
        DEFAULT_ITEM_TYPE
    }

    /// Whether the item may be picked up.
    fn sortable(&self) -> bool {
        true
    }

    /// Whether the item may be dropped on a remove target. `None` means "default" (yes).
    fn deleteable(&self) -> Option<bool> {
        None
    }
}

/// Minimal item record for hosts that have nothing richer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Item {
    /// Stable identifier.
    pub id: String,
    /// Optional type tag; [`DEFAULT_ITEM_TYPE`] when absent.
    pub kind: Option<String>,
    /// Optional drag switch; draggable when absent.
    pub sortable: Option<bool>,
    /// Optional remove switch.
    pub deleteable: Option<bool>,
}

impl Item {
    /// An item with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the type tag.
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Set whether the item may be dragged.
    #[must_use]
    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = Some(sortable);
        self
    }

    /// Set whether the item may be dropped on a remove target.
    #[must_use]
    pub fn with_deleteable(mut self, deleteable: bool) -> Self {
        self.deleteable = Some(deleteable);
        self
    }
}

impl SortableItem for Item {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or(DEFAULT_ITEM_TYPE)
    }

    fn sortable(&self) -> bool {
        self.sortable.unwrap_or(true)
    }

    fn deleteable(&self) -> Option<bool> {
        self.deleteable
    }
}

/// Hierarchical container identifier: `root/child/grandchild`.
///
/// Assigned once when a container is created and never changed. A child's id is
/// always its parent's id plus `/` plus its own segment, so ancestry is a prefix test.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(Rc<str>);

impl ContainerId {
    /// A top-level id.
    #[must_use]
    pub fn root(segment: &str) -> Self {
        Self(Rc::from(segment))
    }

    /// The id of a container nested directly under `self`.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        let mut s = String::with_capacity(self.0.len() + 1 + segment.len());
        s.push_str(&self.0);
        s.push('/');
        s.push_str(segment);
        Self(Rc::from(s))
    }

    /// The full id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First segment, shared by every container of one tree.
    #[must_use]
    pub fn root_segment(&self) -> &str {
        self.0.split('/').next().unwrap_or(&self.0)
    }

    /// Returns `true` for a top-level container.
    #[must_use]
    pub fn is_root(&self) -> bool {
        !self.0.contains('/')
    }

    /// The id of the enclosing container, if any.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0.rfind('/').map(|at| Self(Rc::from(&self.0[..at])))
    }

    /// Returns `true` if `self` equals `ancestor` or is nested (at any depth) inside it.
    #[must_use]
    pub fn is_within(&self, ancestor: &Self) -> bool {
        match self.0.strip_prefix(&*ancestor.0) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

impl fmt::Debug for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContainerId({})", self.0)
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_from_offset_ties_to_before() {
        assert_eq!(Relation::from_offset(0.0), Relation::Before);
        assert_eq!(Relation::from_offset(-3.5), Relation::Before);
        assert_eq!(Relation::from_offset(0.1), Relation::After);
        assert_eq!(Relation::from_offset(f64::NAN), Relation::None);
    }

    #[test]
    fn item_builders_fill_the_trait_flags() {
        let item = Item::new("a")
            .with_kind("photo")
            .with_sortable(false)
            .with_deleteable(false);
        assert_eq!(item.kind(), "photo");
        assert!(!item.sortable());
        assert_eq!(item.deleteable(), Some(false));
        assert_eq!(Item::new("b").deleteable(), None);
    }

    #[test]
    fn container_ids_are_prefix_hierarchies() {
        let root = ContainerId::root("s1");
        let child = root.child("s2");
        let grandchild = child.child("s3");
        assert_eq!(grandchild.as_str(), "s1/s2/s3");
        assert_eq!(grandchild.root_segment(), "s1");
        assert_eq!(grandchild.parent(), Some(child.clone()));
        assert!(grandchild.is_within(&root));
        assert!(child.is_within(&child));
        assert!(!root.is_within(&child));
        assert!(root.is_root());
        assert!(!child.is_root());
        // Segment boundaries matter: "s1" is not an ancestor of "s10".
        assert!(!ContainerId::root("s10").is_within(&root));
    }

    #[test]
    fn log_span_is_ordered() {
        let log = SortLog {
            source: "a".into(),
            target: "c".into(),
            source_index: 3,
            target_index: 1,
        };
        assert_eq!(log.span(), 1..=3);
    }

    #[test]
    fn default_directions_follow_layout() {
        assert_eq!(Layout::List.default_direction(), Direction::Vertical);
        assert_eq!(Layout::Grid.default_direction(), Direction::Horizontal);
    }
}

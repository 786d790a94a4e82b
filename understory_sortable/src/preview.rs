// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry for a custom drag preview layer.
//!
//! The host draws the preview; this module only decides where. Offsets are in the
//! same client coordinates the drag toolkit reports.

use kurbo::{Point, Size, Vec2};

use crate::types::Direction;

/// Grid pitch used by [`snap_to_grid`].
pub const GRID_PITCH: f64 = 32.0;

/// How the preview follows the pointer.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PreviewOptions {
    /// Move in [`GRID_PITCH`] steps from the drag start.
    pub snap_to_grid: bool,
    /// Keep the preview on the container's main axis.
    pub lock_axis: bool,
    /// Scale factor for the preview; `None` draws at natural size.
    pub scale: Option<f64>,
    /// Extra translation applied to scaled previews.
    pub offset: Vec2,
}

impl PreviewOptions {
    /// Set grid snapping.
    #[must_use]
    pub fn with_snap_to_grid(mut self, snap: bool) -> Self {
        self.snap_to_grid = snap;
        self
    }

    /// Set axis locking.
    #[must_use]
    pub fn with_lock_axis(mut self, lock: bool) -> Self {
        self.lock_axis = lock;
        self
    }

    /// Set the scale factor and its extra offset.
    #[must_use]
    pub fn with_scale(mut self, scale: f64, offset: Vec2) -> Self {
        self.scale = Some(scale);
        self.offset = offset;
        self
    }
}

/// Round each component of `delta` to the nearest multiple of [`GRID_PITCH`].
#[must_use]
pub fn snap_to_grid(delta: Vec2) -> Vec2 {
    (delta / GRID_PITCH).round() * GRID_PITCH
}

/// Where to draw the preview, or `None` while either offset is unknown.
///
/// `initial` is the source's offset at drag start, `current` its offset now.
/// With `lock_axis`, the cross axis of `direction` stays at its initial value.
#[must_use]
pub fn item_offset(
    initial: Option<Point>,
    current: Option<Point>,
    options: &PreviewOptions,
    direction: Direction,
) -> Option<Point> {
    let (initial, current) = (initial?, current?);
    let mut at = current;
    if options.snap_to_grid {
        at = initial + snap_to_grid(current - initial);
    }
    if options.lock_axis {
        match direction {
            Direction::Vertical => at.x = initial.x,
            Direction::Horizontal => at.y = initial.y,
        }
    }
    Some(at)
}

/// Layout of a scaled preview box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScaledPreview {
    /// Translation applied before scaling.
    pub translate: Vec2,
    /// Scale factor.
    pub scale: f64,
    /// Size of the box before scaling.
    pub size: Size,
}

/// Fit a preview of natural `size` drawn at `scale`.
///
/// Shrinking previews (`scale < 1`) are laid out in an enlarged box so the content
/// reflows at its natural size, then translated back over the source.
#[must_use]
pub fn scaled(size: Size, scale: f64, offset: Vec2) -> ScaledPreview {
    if scale >= 1.0 {
        return ScaledPreview {
            translate: Vec2::ZERO,
            scale,
            size,
        };
    }
    let enlarged = size / scale;
    let shrink = 1.0 - scale;
    ScaledPreview {
        translate: Vec2::new(
            -(enlarged.width * shrink) / 2.0,
            -(enlarged.height * shrink) / 2.0,
        ) + offset,
        scale,
        size: enlarged,
    }
}

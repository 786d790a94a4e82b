// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Container configuration and the construction error.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::preview::PreviewOptions;
use crate::types::{DEFAULT_ITEM_TYPE, Direction, Layout, Mode};

/// Default hover throttle window in milliseconds.
pub const DEFAULT_THROTTLE_MS: u64 = 60;

/// Default proximity inflation factor for hover candidates.
pub const DEFAULT_PROXIMITY: f64 = 2.0;

/// Why a container could not be constructed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Neither an item collection nor declarative children were supplied.
    #[error("a sortable container needs an item collection or declarative children")]
    MissingItems,
    /// Hover evaluation must be throttled.
    #[error("throttle window must be non-zero")]
    ZeroThrottle,
}

/// Where a container's initial items come from.
#[derive(Clone, Debug)]
pub enum ItemSource<T> {
    /// An explicit item collection. May be empty.
    Items(Vec<T>),
    /// Items derived from declarative child elements. Must not be empty.
    Children(Vec<T>),
    /// Nothing supplied.
    None,
}

impl<T> ItemSource<T> {
    /// The initial items.
    pub fn into_items(self) -> Result<Vec<T>, ConfigError> {
        match self {
            Self::Items(items) => Ok(items),
            Self::Children(children) if !children.is_empty() => Ok(children),
            Self::Children(_) | Self::None => Err(ConfigError::MissingItems),
        }
    }
}

impl<T> From<Vec<T>> for ItemSource<T> {
    fn from(items: Vec<T>) -> Self {
        Self::Items(items)
    }
}

/// Static options of one container.
#[derive(Clone, Debug, PartialEq)]
pub struct SortableConfig {
    /// List or grid.
    pub layout: Layout,
    /// Main axis; defaults from `layout` when `None`.
    pub direction: Option<Direction>,
    /// Item type tags this container accepts.
    pub accept: Vec<String>,
    /// Reorder while hovering, or only indicate.
    pub mode: Mode,
    /// Hover throttle window in milliseconds.
    pub throttle_ms: u64,
    /// Candidate window inflation factor; `None` scans every item.
    pub proximity: Option<f64>,
    /// Drag preview layer, if the host draws one.
    pub preview: Option<PreviewOptions>,
}

impl Default for SortableConfig {
    fn default() -> Self {
        Self {
            layout: Layout::List,
            direction: None,
            accept: vec![String::from(DEFAULT_ITEM_TYPE)],
            mode: Mode::Direct,
            throttle_ms: DEFAULT_THROTTLE_MS,
            proximity: Some(DEFAULT_PROXIMITY),
            preview: None,
        }
    }
}

impl SortableConfig {
    /// Set the layout.
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the main axis explicitly.
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Replace the accepted type tags.
    #[must_use]
    pub fn with_accept<I, S>(mut self, accept: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accept = accept.into_iter().map(Into::into).collect();
        self
    }

    /// Set the hover mode.
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the hover throttle window.
    #[must_use]
    pub fn with_throttle_ms(mut self, ms: u64) -> Self {
        self.throttle_ms = ms;
        self
    }

    /// Set the proximity factor; `None` disables the candidate window.
    #[must_use]
    pub fn with_proximity(mut self, factor: Option<f64>) -> Self {
        self.proximity = factor;
        self
    }

    /// Enable a drag preview layer.
    #[must_use]
    pub fn with_preview(mut self, preview: PreviewOptions) -> Self {
        self.preview = Some(preview);
        self
    }

    /// The effective main axis.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
            .unwrap_or_else(|| self.layout.default_direction())
    }

    /// Whether items tagged `kind` may be dropped here.
    #[must_use]
    pub fn accepts(&self, kind: &str) -> bool {
        self.accept.iter().any(|a| a == kind)
    }

    /// Check the options that can be wrong.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.throttle_ms == 0 {
            return Err(ConfigError::ZeroThrottle);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Item;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = SortableConfig::default();
        assert_eq!(cfg.direction(), Direction::Vertical);
        assert!(cfg.accepts(DEFAULT_ITEM_TYPE));
        assert_eq!(cfg.throttle_ms, 60);
        assert_eq!(cfg.proximity, Some(2.0));
        assert_eq!(
            cfg.with_layout(Layout::Grid).direction(),
            Direction::Horizontal
        );
    }

    #[test]
    fn explicit_direction_wins() {
        let cfg = SortableConfig::default()
            .with_layout(Layout::Grid)
            .with_direction(Direction::Vertical);
        assert_eq!(cfg.direction(), Direction::Vertical);
    }

    #[test]
    fn missing_items_is_fatal() {
        assert_eq!(
            ItemSource::<Item>::None.into_items(),
            Err(ConfigError::MissingItems)
        );
        assert_eq!(
            ItemSource::<Item>::Children(Vec::new()).into_items(),
            Err(ConfigError::MissingItems)
        );
        assert_eq!(ItemSource::<Item>::Items(Vec::new()).into_items(), Ok(Vec::new()));
    }

    #[test]
    fn zero_throttle_is_rejected() {
        let cfg = SortableConfig::default().with_throttle_ms(0);
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroThrottle));
        assert!(SortableConfig::default().validate().is_ok());
    }

    #[test]
    fn accept_list_is_replaceable() {
        let cfg = SortableConfig::default().with_accept(["a", "b"]);
        assert!(cfg.accepts("b"));
        assert!(!cfg.accepts(DEFAULT_ITEM_TYPE));
    }
}

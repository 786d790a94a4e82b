// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time-based pacing for hover evaluation.
//!
//! Two primitives, both driven by the host's clock and frame loop:
//!
//! - [`Throttle`]: admits at most one call per window. A call rejected inside the
//!   window arms a trailing slot; the host polls [`Throttle::due`] so the final
//!   pointer position of a burst is still evaluated once the window closes.
//! - [`FrameSlot`]: a single pending-action buffer flushed once per animation frame.
//!   Scheduling while an action is pending overwrites it. Every schedule returns a
//!   [`FrameToken`]; cancelling bumps the epoch so tokens issued before the cancel
//!   flush nothing.
//!
//! Timestamps are plain `u64` milliseconds supplied by the caller.
//!
//! ```
//! use understory_sortable::schedule::FrameSlot;
//!
//! let mut slot = FrameSlot::new();
//! let first = slot.schedule("a").unwrap();
//! assert!(slot.schedule("b").is_none()); // same frame, overwrites
//! assert_eq!(slot.take(first), Some("b"));
//! ```

/// Leading-edge throttle with an optional trailing call.
#[derive(Clone, Debug)]
pub struct Throttle {
    window_ms: u64,
    last_run: Option<u64>,
    trailing: bool,
}

impl Throttle {
    /// A throttle admitting one call per `window_ms`.
    #[must_use]
    pub const fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            last_run: None,
            trailing: false,
        }
    }

    /// Window length in milliseconds.
    #[must_use]
    pub const fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Returns `true` if a call at `now` may run. Otherwise arms the trailing call.
    pub fn admit(&mut self, now: u64) -> bool {
        match self.last_run {
            Some(last) if now.saturating_sub(last) < self.window_ms => {
                self.trailing = true;
                false
            }
            _ => {
                self.last_run = Some(now);
                self.trailing = false;
                true
            }
        }
    }

    /// Returns `true` once if a trailing call is armed and the window has closed.
    pub fn due(&mut self, now: u64) -> bool {
        if !self.trailing {
            return false;
        }
        match self.last_run {
            Some(last) if now.saturating_sub(last) < self.window_ms => false,
            _ => {
                self.last_run = Some(now);
                self.trailing = false;
                true
            }
        }
    }

    /// Whether a trailing call is armed.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.trailing
    }

    /// Drop the trailing call, keeping the window.
    pub fn cancel(&mut self) {
        self.trailing = false;
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        self.last_run = None;
        self.trailing = false;
    }
}

/// Identifies one requested animation frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameToken {
    epoch: u64,
}

/// Single-slot buffer of an action waiting for the next animation frame.
#[derive(Clone, Debug)]
pub struct FrameSlot<A> {
    pending: Option<A>,
    requested: bool,
    epoch: u64,
}

impl<A> Default for FrameSlot<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> FrameSlot<A> {
    /// An empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: None,
            requested: false,
            epoch: 0,
        }
    }

    /// Stage `action` for the next frame.
    ///
    /// Returns a token when the caller must request a frame; `None` when a frame is
    /// already requested (the staged action is replaced).
    pub fn schedule(&mut self, action: A) -> Option<FrameToken> {
        self.pending = Some(action);
        if self.requested {
            return None;
        }
        self.requested = true;
        Some(FrameToken { epoch: self.epoch })
    }

    /// Take the staged action for the frame identified by `token`.
    ///
    /// Tokens from before the last [`cancel`](Self::cancel) yield `None`.
    pub fn take(&mut self, token: FrameToken) -> Option<A> {
        if token.epoch != self.epoch {
            return None;
        }
        self.requested = false;
        self.pending.take()
    }

    /// The staged action, if any.
    pub fn peek(&self) -> Option<&A> {
        self.pending.as_ref()
    }

    /// Whether a frame has been requested and not yet run.
    #[must_use]
    pub const fn is_requested(&self) -> bool {
        self.requested
    }

    /// Discard the staged action and invalidate outstanding tokens.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.requested = false;
        self.epoch = self.epoch.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_admits_once_per_window() {
        let mut t = Throttle::new(60);
        assert!(t.admit(0));
        assert!(!t.admit(10));
        assert!(!t.admit(59));
        assert!(t.is_pending());
        assert!(t.admit(60));
        assert!(!t.is_pending());
    }

    #[test]
    fn trailing_call_fires_once_after_window() {
        let mut t = Throttle::new(60);
        assert!(t.admit(100));
        assert!(!t.admit(120));
        assert!(!t.due(150));
        assert!(t.due(160));
        assert!(!t.due(400));
    }

    #[test]
    fn cancel_drops_trailing_call() {
        let mut t = Throttle::new(60);
        t.admit(0);
        t.admit(1);
        t.cancel();
        assert!(!t.due(1000));
        t.reset();
        assert!(t.admit(1));
    }

    #[test]
    fn later_schedule_overwrites_pending_action() {
        let mut slot = FrameSlot::new();
        let token = slot.schedule(1).unwrap();
        assert!(slot.schedule(2).is_none());
        assert!(slot.schedule(3).is_none());
        assert_eq!(slot.peek(), Some(&3));
        assert_eq!(slot.take(token), Some(3));
        assert!(!slot.is_requested());
        assert_eq!(slot.take(token), None);
    }

    #[test]
    fn stale_token_is_harmless_after_cancel() {
        let mut slot = FrameSlot::new();
        let stale = slot.schedule("old").unwrap();
        slot.cancel();
        let fresh = slot.schedule("new").unwrap();
        assert_ne!(stale, fresh);
        assert_eq!(slot.take(stale), None);
        assert_eq!(slot.take(fresh), Some("new"));
    }
}

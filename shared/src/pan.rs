//! Pan Session - direct-manipulation scrubbing of the strip
//!
//! `Idle -> Dragging -> Idle`. Dragging the pointer right reveals earlier
//! times. The session never touches clock or zoom state itself; each pointer
//! event yields a [`PanStep`] that the engine commits in one go.

use std::time::{Duration, Instant};

use crate::mapper::focus_for_offset;
use crate::wall_time::WallTime;
use crate::zoom::ZoomLevel;

/// What the pointer went down on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// Empty strip surface
    Strip,
    /// An item owned by the external drag-and-drop system
    DraggableItem,
}

/// Live state of one pan gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanState {
    pub pointer_start_x: f64,
    pub offset_at_start: f64,
    pub offset_current: f64,
    /// Live `now` the starting offset was measured against
    pub anchor_now: WallTime,
    pub started_at: Instant,
    pub last_event_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanPhase {
    Idle,
    Dragging(PanState),
}

/// Result of a pointer-down on the strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanStart {
    Started,
    /// The external drag-and-drop system owns the pointer
    RefusedExternalDrag,
    /// The pointer went down on a draggable item
    RefusedDraggableTarget,
    /// A drop hover is live over the strip
    RefusedHoverActive,
    AlreadyDragging,
}

/// Why a pan was forced back to idle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanAbortReason {
    ExternalDragActive,
    /// The gesture outlived the watchdog threshold without a pointer-up
    GestureTimeout,
    /// No pointer event arrived for too long
    PointerIdle,
    Cancelled,
}

/// New strip position produced by one pointer move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanStep {
    pub pan_offset: f64,
    pub focused: WallTime,
}

/// Bounds after which a gesture is presumed stuck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanTimeouts {
    pub max_gesture: Duration,
    pub pointer_idle: Duration,
}

impl Default for PanTimeouts {
    fn default() -> Self {
        Self {
            max_gesture: Duration::from_secs(8),
            pointer_idle: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PanSession {
    phase: PanPhase,
    timeouts: PanTimeouts,
}

impl PanSession {
    pub fn new(timeouts: PanTimeouts) -> Self {
        Self {
            phase: PanPhase::Idle,
            timeouts,
        }
    }

    pub fn phase(&self) -> &PanPhase {
        &self.phase
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, PanPhase::Dragging(_))
    }

    /// Pointer-down on the strip
    pub fn begin(
        &mut self,
        pointer_x: f64,
        target: PointerTarget,
        external_drag_active: bool,
        hover_active: bool,
        current_offset: f64,
        anchor_now: WallTime,
        at: Instant,
    ) -> PanStart {
        if self.is_dragging() {
            return PanStart::AlreadyDragging;
        }
        if external_drag_active {
            return PanStart::RefusedExternalDrag;
        }
        if target == PointerTarget::DraggableItem {
            return PanStart::RefusedDraggableTarget;
        }
        if hover_active {
            return PanStart::RefusedHoverActive;
        }

        self.phase = PanPhase::Dragging(PanState {
            pointer_start_x: pointer_x,
            offset_at_start: current_offset,
            offset_current: current_offset,
            anchor_now,
            started_at: at,
            last_event_at: at,
        });
        tracing::debug!(pointer_x, current_offset, "pan started");
        PanStart::Started
    }

    /// Pointer-move while dragging. The offset is measured from the `now`
    /// captured at pointer-down, so a clock tick mid-gesture cannot shift
    /// the focus under the pointer.
    pub fn pointer_move(&mut self, pointer_x: f64, at: Instant, zoom: ZoomLevel) -> Option<PanStep> {
        let PanPhase::Dragging(state) = &mut self.phase else {
            return None;
        };

        let pan_offset = state.offset_at_start + (pointer_x - state.pointer_start_x);
        let focused = focus_for_offset(state.anchor_now, pan_offset, zoom);

        state.offset_current = pan_offset;
        state.last_event_at = at;
        Some(PanStep {
            pan_offset,
            focused,
        })
    }

    /// Pointer-up; returns the finished gesture
    pub fn end(&mut self) -> Option<PanState> {
        match std::mem::replace(&mut self.phase, PanPhase::Idle) {
            PanPhase::Dragging(state) => {
                tracing::debug!(offset = state.offset_current, "pan finished");
                Some(state)
            }
            PanPhase::Idle => None,
        }
    }

    /// Force the session back to idle
    pub fn abort(&mut self, reason: PanAbortReason) -> Option<PanState> {
        let state = self.end()?;
        tracing::warn!(?reason, "pan aborted");
        Some(state)
    }

    /// Decide whether a live gesture must be torn down
    pub fn check_watchdog(&self, at: Instant, external_drag_active: bool) -> Option<PanAbortReason> {
        let PanPhase::Dragging(state) = &self.phase else {
            return None;
        };
        if external_drag_active {
            Some(PanAbortReason::ExternalDragActive)
        } else if at.saturating_duration_since(state.started_at) > self.timeouts.max_gesture {
            Some(PanAbortReason::GestureTimeout)
        } else if at.saturating_duration_since(state.last_event_at) > self.timeouts.pointer_idle {
            Some(PanAbortReason::PointerIdle)
        } else {
            None
        }
    }
}

impl Default for PanSession {
    fn default() -> Self {
        Self::new(PanTimeouts::default())
    }
}

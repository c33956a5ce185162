//! Zoom - integer pixels-per-minute and the pan offset that keeps focus anchored
//!
//! The strip is laid out relative to the live `now`. When a frozen focus is
//! set, `pan_offset` carries the displacement that puts it back under the
//! center line, so a zoom change only has to rescale that displacement.

use serde::{Deserialize, Serialize};

use crate::clock::ClockState;
use crate::wall_time::minutes_difference;

/// Integer zoom level in [1, 8]; equal to pixels per minute
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct ZoomLevel(u8);

impl ZoomLevel {
    pub const MIN: ZoomLevel = ZoomLevel(1);
    pub const MAX: ZoomLevel = ZoomLevel(8);

    /// Clamp any integer into [1, 8]
    pub fn new(level: i64) -> Self {
        ZoomLevel(level.clamp(Self::MIN.0 as i64, Self::MAX.0 as i64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn pixels_per_minute(self) -> f64 {
        f64::from(self.0)
    }

    /// Every selectable level, for zoom buttons
    pub fn all() -> impl Iterator<Item = ZoomLevel> {
        (Self::MIN.0..=Self::MAX.0).map(ZoomLevel)
    }
}

impl Default for ZoomLevel {
    fn default() -> Self {
        ZoomLevel(4)
    }
}

impl From<i64> for ZoomLevel {
    fn from(level: i64) -> Self {
        ZoomLevel::new(level)
    }
}

impl From<ZoomLevel> for i64 {
    fn from(level: ZoomLevel) -> Self {
        i64::from(level.0)
    }
}

/// What a zoom request changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoomChange {
    pub level_changed: bool,
    pub offset_changed: bool,
}

impl ZoomChange {
    pub fn any(self) -> bool {
        self.level_changed || self.offset_changed
    }
}

/// Owns the zoom level and the strip's pan offset
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomController {
    level: ZoomLevel,
    pan_offset: f64,
}

impl ZoomController {
    pub fn new(level: ZoomLevel) -> Self {
        Self {
            level,
            pan_offset: 0.0,
        }
    }

    pub fn level(&self) -> ZoomLevel {
        self.level
    }

    pub fn pan_offset(&self) -> f64 {
        self.pan_offset
    }

    /// Offset that renders the frozen focus under the center line at `level`.
    /// Zero when nothing is frozen; `now` recenters on its own.
    pub fn anchored_offset(clock: &ClockState, level: ZoomLevel) -> f64 {
        match clock.frozen {
            Some(frozen) => {
                -(minutes_difference(frozen, clock.now) as f64 * level.pixels_per_minute())
            }
            None => 0.0,
        }
    }

    /// Change zoom without moving the focused time on screen
    pub fn set_level(&mut self, level: ZoomLevel, clock: &ClockState) -> ZoomChange {
        let level_changed = level != self.level;
        self.level = level;
        ZoomChange {
            level_changed,
            offset_changed: self.reanchor(clock),
        }
    }

    pub fn zoom_in(&mut self, clock: &ClockState) -> ZoomChange {
        let next = ZoomLevel::new(i64::from(self.level) + 1);
        self.set_level(next, clock)
    }

    pub fn zoom_out(&mut self, clock: &ClockState) -> ZoomChange {
        let next = ZoomLevel::new(i64::from(self.level) - 1);
        self.set_level(next, clock)
    }

    /// Recompute the offset for the current clock and level
    pub fn reanchor(&mut self, clock: &ClockState) -> bool {
        self.commit_offset(Self::anchored_offset(clock, self.level))
    }

    /// Store a new offset; returns false and leaves state alone when it
    /// equals the current one
    pub fn commit_offset(&mut self, offset: f64) -> bool {
        if (offset - self.pan_offset).abs() < f64::EPSILON {
            return false;
        }
        self.pan_offset = offset;
        true
    }

    pub fn reset_offset(&mut self) -> bool {
        self.commit_offset(0.0)
    }
}

impl Default for ZoomController {
    fn default() -> Self {
        Self::new(ZoomLevel::default())
    }
}

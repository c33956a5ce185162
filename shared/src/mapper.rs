//! Coordinate Mapper - conversion between wall time and strip pixels
//!
//! Pixels are measured from the left edge of the strip container. The focused
//! time sits on the center line; every other minute is laid out around it the
//! short way round the ring, so the strip reads continuously across midnight.

use crate::clock::ClockState;
use crate::wall_time::{minutes_difference, WallTime, MINUTES_PER_DAY};
use crate::zoom::{ZoomController, ZoomLevel};

/// Default snapping granularity in minutes
pub const DEFAULT_SNAP_STEP: u32 = 5;

/// A snapshot of everything needed to map between time and pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripView {
    /// Time under the center line
    pub focused: WallTime,
    pub zoom: ZoomLevel,
    /// Width of the strip container in pixels
    pub container_width: f64,
    /// Sub-minute part of a live pan offset, in pixels
    pub residual: f64,
}

impl StripView {
    /// View of a strip with no live drag displacement
    pub fn at_rest(focused: WallTime, zoom: ZoomLevel, container_width: f64) -> Self {
        Self {
            focused,
            zoom,
            container_width,
            residual: 0.0,
        }
    }

    /// View derived from engine state. The whole-minute part of the pan
    /// offset is already folded into the frozen focus; only the remainder
    /// shifts the strip.
    pub fn new(clock: &ClockState, zoom: &ZoomController, container_width: f64) -> Self {
        Self {
            focused: clock.focused(),
            zoom: zoom.level(),
            container_width,
            residual: residual_offset(zoom.pan_offset(), zoom.level()),
        }
    }

    pub fn center_x(&self) -> f64 {
        self.container_width / 2.0
    }

    pub fn pixels_per_minute(&self) -> f64 {
        self.zoom.pixels_per_minute()
    }

    /// Screen x of a wall time
    pub fn time_to_pixel(&self, time: WallTime) -> f64 {
        let delta = minutes_difference(time, self.focused) as f64;
        self.center_x() + self.residual + delta * self.pixels_per_minute()
    }

    /// Wall time under a screen x, wrapped into [0, 1440)
    pub fn pixel_to_time(&self, x: f64) -> WallTime {
        let minutes_offset = (x - self.center_x() - self.residual) / self.pixels_per_minute();
        let raw = self.focused.minutes() as f64 + minutes_offset;
        WallTime::wrapping(raw.round() as i64)
    }

    /// Signed minutes (relative to the focus, unwrapped) at the left and
    /// right container edges
    pub fn visible_range(&self) -> (f64, f64) {
        let ppm = self.pixels_per_minute();
        let left = (0.0 - self.center_x() - self.residual) / ppm;
        let right = (self.container_width - self.center_x() - self.residual) / ppm;
        (left, right)
    }

    /// Whether a span starting at `time` and lasting `duration_minutes`
    /// overlaps the container
    pub fn is_visible(&self, time: WallTime, duration_minutes: u32) -> bool {
        let start = self.time_to_pixel(time);
        let end = start + f64::from(duration_minutes) * self.pixels_per_minute();
        end >= 0.0 && start <= self.container_width
    }

    /// Translation of a full-day strip whose minute 0 sits at its left edge
    pub fn strip_origin_x(&self) -> f64 {
        -(self.focused.minutes() as f64 * self.pixels_per_minute()) + self.center_x() + self.residual
    }

    /// Width of a full-day strip at this zoom
    pub fn day_width(&self) -> f64 {
        MINUTES_PER_DAY as f64 * self.pixels_per_minute()
    }
}

/// The part of a pan offset smaller than one minute at this zoom
pub fn residual_offset(pan_offset: f64, zoom: ZoomLevel) -> f64 {
    let ppm = zoom.pixels_per_minute();
    pan_offset - (pan_offset / ppm).round() * ppm
}

/// Time brought under the center line by a pan offset measured from `now`.
/// Rounds the same way as [`residual_offset`] so the two always agree.
pub fn focus_for_offset(now: WallTime, pan_offset: f64, zoom: ZoomLevel) -> WallTime {
    let whole_minutes = (pan_offset / zoom.pixels_per_minute()).round() as i64;
    now.add_minutes(-whole_minutes)
}

/// Screen x of `time` for the given engine state
pub fn time_to_pixel(
    time: WallTime,
    clock: &ClockState,
    zoom: &ZoomController,
    container_width: f64,
) -> f64 {
    StripView::new(clock, zoom, container_width).time_to_pixel(time)
}

/// Wall time under screen x for the given engine state
pub fn pixel_to_time(
    x: f64,
    clock: &ClockState,
    zoom: &ZoomController,
    container_width: f64,
) -> WallTime {
    StripView::new(clock, zoom, container_width).pixel_to_time(x)
}

/// Round to the nearest multiple of `step_minutes`, wrapping at midnight
pub fn snap_to_grid(time: WallTime, step_minutes: u32) -> WallTime {
    let step = i64::from(step_minutes.max(1));
    let snapped = ((time.minutes() as f64 / step as f64).round() as i64) * step;
    WallTime::wrapping(snapped)
}

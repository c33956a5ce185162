//! Tick generation for the strip ruler
//!
//! Density follows pixels-per-minute: the closer the zoom, the finer the
//! ticks. Positions are computed along the unwrapped minute axis so ticks
//! keep flowing past midnight.

use crate::mapper::StripView;
use crate::wall_time::{format_compact, WallTime};

/// Visual weight of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    /// Day boundary
    Midnight,
    Hour,
    HalfHour,
    QuarterHour,
    FiveMinute,
}

/// A tick mark to render on the strip
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub time: WallTime,
    /// X position in container pixels
    pub x: f64,
    pub kind: TickKind,
    pub label: Option<String>,
}

/// Finest tick spacing shown at a given pixels-per-minute
fn finest_step(ppm: f64) -> i64 {
    if ppm >= 4.0 {
        5
    } else if ppm >= 2.0 {
        15
    } else {
        30
    }
}

/// Hours between labelled hour ticks
fn label_every_hours(ppm: f64) -> i64 {
    if ppm >= 2.0 {
        1
    } else {
        2
    }
}

fn classify(minute_of_day: i64) -> TickKind {
    if minute_of_day == 0 {
        TickKind::Midnight
    } else if minute_of_day % 60 == 0 {
        TickKind::Hour
    } else if minute_of_day % 30 == 0 {
        TickKind::HalfHour
    } else if minute_of_day % 15 == 0 {
        TickKind::QuarterHour
    } else {
        TickKind::FiveMinute
    }
}

/// Generate all ticks that fall inside the container
pub fn generate_ticks(view: &StripView) -> Vec<Tick> {
    let ppm = view.pixels_per_minute();
    let step = finest_step(ppm);
    let label_hours = label_every_hours(ppm);
    let (left, right) = view.visible_range();

    let focus = view.focused.minutes();
    let first = ((focus as f64 + left) / step as f64).ceil() as i64 * step;
    let last = ((focus as f64 + right) / step as f64).floor() as i64 * step;

    let mut ticks = Vec::new();
    let mut minute = first;
    while minute <= last {
        let time = WallTime::wrapping(minute);
        let kind = classify(time.minutes());
        let x = view.center_x() + view.residual + (minute - focus) as f64 * ppm;

        let label = match kind {
            TickKind::Midnight => Some(format_compact(time)),
            TickKind::Hour if i64::from(time.hour24()) % label_hours == 0 => {
                Some(format_compact(time))
            }
            TickKind::HalfHour if ppm >= 6.0 => Some(format_compact(time)),
            _ => None,
        };

        ticks.push(Tick {
            time,
            x,
            kind,
            label,
        });
        minute += step;
    }

    ticks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zoom::ZoomLevel;

    #[test]
    fn test_ticks_positions_match_mapper() {
        let view = StripView::at_rest(WallTime::from_hm(9, 7), ZoomLevel::new(4), 800.0);
        let ticks = generate_ticks(&view);
        assert!(!ticks.is_empty());
        for tick in &ticks {
            assert!((tick.x - view.time_to_pixel(tick.time)).abs() < 1e-9);
            assert!(tick.x >= 0.0 && tick.x <= 800.0);
            assert_eq!(tick.time.minutes() % 5, 0);
        }
    }

    #[test]
    fn test_density_follows_zoom() {
        let close = StripView::at_rest(WallTime::NOON, ZoomLevel::MAX, 800.0);
        let far = StripView::at_rest(WallTime::NOON, ZoomLevel::MIN, 800.0);
        let close_ticks = generate_ticks(&close);
        let far_ticks = generate_ticks(&far);

        assert!(close_ticks.iter().any(|t| t.kind == TickKind::FiveMinute));
        assert!(far_ticks.iter().all(|t| t.time.minutes() % 30 == 0));
    }

    #[test]
    fn test_midnight_is_labelled_across_the_seam() {
        let view = StripView::at_rest(WallTime::from_hm(23, 40), ZoomLevel::new(2), 800.0);
        let ticks = generate_ticks(&view);
        let midnight = ticks
            .iter()
            .find(|t| t.kind == TickKind::Midnight)
            .expect("midnight should be visible");
        assert_eq!(midnight.label.as_deref(), Some("12:00a"));
        assert_eq!(midnight.x, 440.0);
        // Ticks stay in ascending screen order after the wrap
        assert!(ticks.windows(2).all(|w| w[0].x < w[1].x));
    }
}

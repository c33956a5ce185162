//! Drawing module - strip, ruler, placed activities and the activity tray
//!
//! Everything the engine reports is in container pixels measured from the
//! left edge of the window; this module converts to nannou's centered
//! coordinates at the last moment.

use nannou::prelude::*;
use shared::{DropHoverState, PlacementId, StripView, Tick, TickKind, VisibleActivity};

use crate::planner::Planner;

/// Color palette - cool slate with a mint accent
pub mod colors {
    use nannou::prelude::*;

    pub const BACKGROUND: Srgb<u8> = Srgb {
        red: 18,
        green: 22,
        blue: 28,
        standard: std::marker::PhantomData,
    };

    pub const STRIP: Srgb<u8> = Srgb {
        red: 28,
        green: 34,
        blue: 44,
        standard: std::marker::PhantomData,
    };

    /// Focus cursor while following the live clock
    pub const FOCUS_LIVE: Srgb<u8> = Srgb {
        red: 110,
        green: 231,
        blue: 183,
        standard: std::marker::PhantomData,
    };

    /// Focus cursor while frozen on another time
    pub const FOCUS_FROZEN: Srgb<u8> = Srgb {
        red: 125,
        green: 170,
        blue: 255,
        standard: std::marker::PhantomData,
    };

    pub const TEXT_PRIMARY: Srgb<u8> = Srgb {
        red: 232,
        green: 238,
        blue: 245,
        standard: std::marker::PhantomData,
    };

    pub const TEXT_SECONDARY: Srgb<u8> = Srgb {
        red: 140,
        green: 152,
        blue: 168,
        standard: std::marker::PhantomData,
    };

    pub const TICK_HOUR: Srgb<u8> = Srgb {
        red: 176,
        green: 190,
        blue: 206,
        standard: std::marker::PhantomData,
    };

    pub const TICK_HALF: Srgb<u8> = Srgb {
        red: 112,
        green: 124,
        blue: 140,
        standard: std::marker::PhantomData,
    };

    pub const TICK_FINE: Srgb<u8> = Srgb {
        red: 70,
        green: 80,
        blue: 94,
        standard: std::marker::PhantomData,
    };

    /// Day boundary
    pub const MIDNIGHT: Srgb<u8> = Srgb {
        red: 196,
        green: 160,
        blue: 255,
        standard: std::marker::PhantomData,
    };

    pub const ITEM: Srgb<u8> = Srgb {
        red: 56,
        green: 96,
        blue: 120,
        standard: std::marker::PhantomData,
    };

    pub const ITEM_MOVED: Srgb<u8> = Srgb {
        red: 84,
        green: 88,
        blue: 130,
        standard: std::marker::PhantomData,
    };

    /// Drop candidate marker
    pub const CANDIDATE: Srgb<u8> = Srgb {
        red: 255,
        green: 196,
        blue: 92,
        standard: std::marker::PhantomData,
    };

    pub const TRAY: Srgb<u8> = Srgb {
        red: 24,
        green: 29,
        blue: 37,
        standard: std::marker::PhantomData,
    };

    pub const TRAY_ITEM: Srgb<u8> = Srgb {
        red: 40,
        green: 48,
        blue: 60,
        standard: std::marker::PhantomData,
    };
}

/// Screen layout, recomputed from the window every frame
pub struct StripLayout {
    pub strip_center_y: f32,
    pub strip_height: f32,
    /// Height of a placed activity block
    pub item_height: f32,
    pub tick_height_hour: f32,
    pub tick_height_half: f32,
    pub tick_height_fine: f32,
    pub tray_center_y: f32,
    pub tray_height: f32,
    pub tray_item_width: f32,
    pub tray_item_height: f32,
    pub tray_gap: f32,
    left: f32,
}

impl StripLayout {
    pub fn calculate(window_rect: Rect) -> Self {
        let strip_height = (window_rect.h() * 0.22).clamp(90.0, 160.0);
        let tray_height = 90.0;
        Self {
            strip_center_y: 0.0,
            strip_height,
            item_height: strip_height * 0.45,
            tick_height_hour: strip_height * 0.5,
            tick_height_half: strip_height * 0.32,
            tick_height_fine: strip_height * 0.18,
            tray_center_y: window_rect.bottom() + tray_height / 2.0 + 40.0,
            tray_height,
            tray_item_width: 120.0,
            tray_item_height: 54.0,
            tray_gap: 14.0,
            left: window_rect.left(),
        }
    }

    /// Container x (from the left window edge) of a world x
    pub fn container_x(&self, world_x: f32) -> f64 {
        <f64 as From<f32>>::from(world_x - self.left)
    }

    pub fn world_x(&self, container_x: f64) -> f32 {
        self.left + container_x as f32
    }

    pub fn strip_contains(&self, pos: Point2) -> bool {
        (pos.y - self.strip_center_y).abs() <= self.strip_height / 2.0
    }

    /// Whether `pos` is on the band where placed activities sit
    pub fn item_band_contains(&self, pos: Point2) -> bool {
        (pos.y - self.strip_center_y).abs() <= self.item_height / 2.0
    }

    pub fn tray_contains(&self, pos: Point2) -> bool {
        (pos.y - self.tray_center_y).abs() <= self.tray_height / 2.0
    }

    pub fn tray_slot_center(&self, index: usize) -> Point2 {
        let x = self.left
            + self.tray_gap
            + self.tray_item_width / 2.0
            + index as f32 * (self.tray_item_width + self.tray_gap);
        pt2(x, self.tray_center_y)
    }

    pub fn tray_slot_at(&self, pos: Point2, count: usize) -> Option<usize> {
        (0..count).find(|&i| {
            let center = self.tray_slot_center(i);
            (pos.x - center.x).abs() <= self.tray_item_width / 2.0
                && (pos.y - center.y).abs() <= self.tray_item_height / 2.0
        })
    }
}

/// Strip background, ruler and focus cursor
pub fn draw_strip(draw: &Draw, view: &StripView, ticks: &[Tick], layout: &StripLayout, is_frozen: bool) {
    let width = view.container_width as f32;
    draw.rect()
        .x_y(layout.world_x(view.center_x()), layout.strip_center_y)
        .w_h(width, layout.strip_height)
        .color(colors::STRIP);

    let edge_y = layout.strip_height / 2.0;
    for y in [layout.strip_center_y + edge_y, layout.strip_center_y - edge_y] {
        draw.line()
            .start(pt2(layout.world_x(0.0), y))
            .end(pt2(layout.world_x(view.container_width), y))
            .color(colors::TICK_FINE)
            .weight(1.0);
    }

    for tick in ticks {
        draw_tick(draw, tick, layout);
    }

    draw_focus_cursor(draw, layout.world_x(view.center_x()), layout, is_frozen);
}

fn draw_tick(draw: &Draw, tick: &Tick, layout: &StripLayout) {
    let (height, color, weight) = match tick.kind {
        TickKind::Midnight => (layout.strip_height, colors::MIDNIGHT, 3.0),
        TickKind::Hour => (layout.tick_height_hour, colors::TICK_HOUR, 2.0),
        TickKind::HalfHour => (layout.tick_height_half, colors::TICK_HALF, 1.5),
        TickKind::QuarterHour | TickKind::FiveMinute => {
            (layout.tick_height_fine, colors::TICK_FINE, 1.0)
        }
    };

    // Ticks hang from the top edge so they never hide placed items
    let x = layout.world_x(tick.x);
    let top = layout.strip_center_y + layout.strip_height / 2.0;
    draw.line()
        .start(pt2(x, top))
        .end(pt2(x, top - height / 2.0))
        .color(color)
        .weight(weight);

    if let Some(ref label) = tick.label {
        let color = match tick.kind {
            TickKind::Midnight => colors::MIDNIGHT,
            _ => colors::TEXT_SECONDARY,
        };
        draw.text(label)
            .x_y(x, top + 14.0)
            .color(color)
            .font_size(12)
            .w(80.0);
    }
}

fn draw_focus_cursor(draw: &Draw, x: f32, layout: &StripLayout, is_frozen: bool) {
    let color = if is_frozen {
        colors::FOCUS_FROZEN
    } else {
        colors::FOCUS_LIVE
    };
    let half = layout.strip_height * 0.6;
    draw.line()
        .start(pt2(x, layout.strip_center_y + half))
        .end(pt2(x, layout.strip_center_y - half))
        .color(color)
        .weight(2.0);

    let head = 8.0;
    let base = layout.strip_center_y - half;
    draw.polygon()
        .points(vec![pt2(x, base), pt2(x - head, base - head), pt2(x + head, base - head)])
        .color(color);
}

/// Placed activities with their post-drop highlight
pub fn draw_placements<F>(draw: &Draw, visible: &[VisibleActivity], fade_alpha: F, layout: &StripLayout)
where
    F: Fn(PlacementId) -> f32,
{
    for item in visible {
        let w = (item.width as f32).max(4.0);
        let cx = layout.world_x(item.x) + w / 2.0;
        let cy = layout.strip_center_y;

        draw.rect()
            .x_y(cx, cy)
            .w_h(w, layout.item_height)
            .color(colors::ITEM);

        let alpha = fade_alpha(item.placement_id);
        if alpha > 0.0 {
            draw.rect()
                .x_y(cx, cy)
                .w_h(w + 6.0, layout.item_height + 6.0)
                .color(srgba(255u8, 196u8, 92u8, (alpha * 140.0) as u8));
        }

        // Start marker
        draw.line()
            .start(pt2(cx - w / 2.0, cy + layout.item_height / 2.0))
            .end(pt2(cx - w / 2.0, cy - layout.item_height / 2.0))
            .color(colors::TEXT_PRIMARY)
            .weight(1.5);

        if w >= 40.0 {
            draw.text(&format!("{} {}", item.icon, item.title))
                .x_y(cx, cy + 6.0)
                .color(colors::TEXT_PRIMARY)
                .font_size(12)
                .w(w - 6.0);
            draw.text(&item.scheduled_time.to_string())
                .x_y(cx, cy - 12.0)
                .color(colors::TEXT_SECONDARY)
                .font_size(10)
                .w(w - 6.0);
        } else {
            draw.text(&item.icon)
                .x_y(cx, cy)
                .color(colors::TEXT_PRIMARY)
                .font_size(12)
                .w(40.0);
        }
    }
}

/// Snapped drop candidate under a hovering drag
pub fn draw_hover_marker(draw: &Draw, view: &StripView, hover: &DropHoverState, layout: &StripLayout) {
    let x = layout.world_x(view.time_to_pixel(hover.candidate));
    let half = layout.strip_height / 2.0;
    draw.line()
        .start(pt2(x, layout.strip_center_y + half))
        .end(pt2(x, layout.strip_center_y - half))
        .color(colors::CANDIDATE)
        .weight(2.0);
    draw.text(&hover.label)
        .x_y(x, layout.strip_center_y - half - 16.0)
        .color(colors::CANDIDATE)
        .font_size(16)
        .w(100.0);
}

/// Large focus readout above the strip
pub fn draw_time_display(
    draw: &Draw,
    live_text: &str,
    focus_text: Option<&str>,
    date_text: &str,
    layout: &StripLayout,
) {
    let time_y = layout.strip_center_y + layout.strip_height / 2.0 + 110.0;

    draw.text(date_text)
        .x_y(0.0, time_y + 44.0)
        .color(colors::TEXT_SECONDARY)
        .font_size(18)
        .w(400.0);

    draw.text(live_text)
        .x_y(0.0, time_y)
        .color(colors::TEXT_PRIMARY)
        .font_size(44)
        .w(400.0);

    if let Some(focus) = focus_text {
        draw.text(&format!("viewing {}", focus))
            .x_y(0.0, time_y - 40.0)
            .color(colors::FOCUS_FROZEN)
            .font_size(16)
            .w(300.0);
    }
}

/// Catalog tray along the bottom; also the drop target that unschedules
pub fn draw_tray(draw: &Draw, planner: &Planner, layout: &StripLayout, window_rect: Rect) {
    draw.rect()
        .x_y(0.0, layout.tray_center_y)
        .w_h(window_rect.w(), layout.tray_height)
        .color(colors::TRAY);

    for (i, activity) in planner.activities().iter().enumerate() {
        let center = layout.tray_slot_center(i);
        draw.rect()
            .xy(center)
            .w_h(layout.tray_item_width, layout.tray_item_height)
            .color(colors::TRAY_ITEM);
        draw.text(&format!("{} {}", activity.icon, activity.title))
            .xy(center + vec2(0.0, 8.0))
            .color(colors::TEXT_PRIMARY)
            .font_size(13)
            .w(layout.tray_item_width - 8.0);
        draw.text(&format!("{} min · {} pt", activity.duration_minutes, activity.points))
            .xy(center - vec2(0.0, 12.0))
            .color(colors::TEXT_SECONDARY)
            .font_size(10)
            .w(layout.tray_item_width - 8.0);
    }

    draw.text("drag here to unschedule")
        .x_y(window_rect.right() - 110.0, layout.tray_center_y)
        .color(colors::TEXT_SECONDARY)
        .font_size(11)
        .w(200.0);
}

/// Label that follows the pointer during an external drag
pub fn draw_drag_ghost(draw: &Draw, label: &str, pos: Point2, is_reschedule: bool) {
    let color = if is_reschedule {
        colors::ITEM_MOVED
    } else {
        colors::ITEM
    };
    draw.rect().xy(pos).w_h(110.0, 30.0).color(color);
    draw.text(label)
        .xy(pos)
        .color(colors::TEXT_PRIMARY)
        .font_size(12)
        .w(104.0);
}

pub fn draw_help_text(draw: &Draw, window_rect: Rect) {
    let text = "Drag strip: pan · ←/→: nudge · N: now · Ctrl +/-: zoom · Esc: cancel";
    draw.text(text)
        .x_y(0.0, window_rect.bottom() + 14.0)
        .color(colors::TEXT_SECONDARY)
        .font_size(11)
        .w(window_rect.w());
}

//! Day Planner
//!
//! A day as a horizontal strip: the focused time sits under the center
//! cursor and the strip follows the live clock until it is panned. Habits
//! dragged in from the tray snap to five-minute slots when dropped.

mod drawing;
mod planner;
mod ui;

use std::time::Instant;

use chrono::Local;
use nannou::prelude::*;
use nannou_egui::{self, Egui};
use shared::{
    generate_ticks, DragItem, DropOutcome, PanStart, PointerTarget, StripConfig, TimelineEngine,
};
use tracing_subscriber::EnvFilter;

use crate::drawing::{
    colors, draw_drag_ghost, draw_help_text, draw_hover_marker, draw_placements, draw_strip,
    draw_time_display, draw_tray, StripLayout,
};
use crate::planner::{default_activities, Planner};
use crate::ui::{draw_controls, draw_schedule};

const PLANNER_NAME: &str = "day_planner";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    nannou::app(model).update(update).run();
}

/// A drag owned by the tray/strip-item drag system, not by the strip's pan
struct ExternalDrag {
    item: DragItem,
    label: String,
    pos: Point2,
}

/// Application state
struct Model {
    engine: TimelineEngine,
    planner: Planner,
    /// Drag in flight, if any
    drag: Option<ExternalDrag>,
    /// egui integration
    egui: Egui,
}

impl Model {
    fn start_drag(&mut self, item: DragItem, label: String, pos: Point2) {
        self.engine
            .set_external_drag_active(true, Instant::now(), &mut self.planner);
        self.drag = Some(ExternalDrag { item, label, pos });
    }

    /// Drop the current drag without committing anything
    fn cancel_drag(&mut self) {
        if self.drag.take().is_some() {
            self.engine.drag_leave();
            self.engine
                .set_external_drag_active(false, Instant::now(), &mut self.planner);
        }
    }
}

fn save_config(model: &Model) {
    let mut config = model.engine.config().clone();
    config.default_zoom = model.engine.zoom_level();
    if let Err(e) = shared::save_config(PLANNER_NAME, &config) {
        tracing::warn!("failed to save config: {e}");
    }
}

fn load_config() -> StripConfig {
    match shared::load_config(PLANNER_NAME) {
        Ok(Some(config)) => config,
        Ok(None) => StripConfig::default(),
        Err(e) => {
            tracing::warn!("ignoring unreadable config: {e}");
            StripConfig::default()
        }
    }
}

fn model(app: &App) -> Model {
    let window_id = app
        .new_window()
        .title("Day Planner")
        .size(1100, 640)
        .min_size(800, 520)
        .view(view)
        .key_pressed(key_pressed)
        .mouse_pressed(mouse_pressed)
        .mouse_released(mouse_released)
        .mouse_moved(mouse_moved)
        .raw_event(raw_window_event)
        .build()
        .unwrap();

    let window = app.window(window_id).unwrap();
    let egui = Egui::from_window(&window);
    let width = <f64 as From<f32>>::from(window.rect().w());

    let config = load_config();
    tracing::info!(zoom = config.default_zoom.get(), "starting day planner");

    let mut planner = Planner::new(default_activities());
    let mut engine = TimelineEngine::with_local_clock(config, width);
    engine.mount(Instant::now(), &mut planner);

    Model {
        engine,
        planner,
        drag: None,
        egui,
    }
}

fn update(app: &App, model: &mut Model, update: Update) {
    let now = Instant::now();
    let width = <f64 as From<f32>>::from(app.window_rect().w());
    model.engine.set_container_width(width, &mut model.planner);

    let report = model.engine.tick(now, &mut model.planner);
    if let Some(reason) = report.pan_aborted {
        tracing::debug!(?reason, "pan recovered by watchdog");
    }

    // Begin egui frame
    model.egui.set_elapsed_time(update.since_start);
    let ctx = model.egui.begin_frame();

    let is_frozen = model.engine.clock_state().is_paused;
    let controls = draw_controls(
        &ctx,
        model.engine.zoom_level(),
        model.engine.display_time(),
        is_frozen,
    );
    let removed = draw_schedule(&ctx, &model.planner);

    drop(ctx);

    if let Some(level) = controls.set_zoom {
        if model.engine.set_zoom(level, &mut model.planner).level_changed {
            save_config(model);
        }
    }
    if controls.jump_to_now {
        model.engine.jump_to_now(now, &mut model.planner);
    }
    if let Some(delta) = controls.nudge {
        model.engine.nudge_focus(delta, now, &mut model.planner);
    }
    if let Some(id) = removed {
        model.engine.remove_placement(id, now, &mut model.planner);
    }
}

fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    let window_rect = app.window_rect();
    let now = Instant::now();

    draw.background().color(colors::BACKGROUND);

    let layout = StripLayout::calculate(window_rect);
    let strip = model.engine.view();
    let ticks = generate_ticks(&strip);
    let state = model.engine.clock_state();

    draw_strip(&draw, &strip, &ticks, &layout, state.is_paused);
    draw_placements(
        &draw,
        &model.planner.visible,
        |id| model.engine.fade_alpha(id, now),
        &layout,
    );
    if let Some(hover) = model.engine.hover() {
        draw_hover_marker(&draw, &strip, hover, &layout);
    }

    let focus_text = state.frozen.map(|t| t.to_string());
    let date_text = Local::now().format("%A, %B %-d").to_string();
    draw_time_display(
        &draw,
        model.engine.display_time(),
        focus_text.as_deref(),
        &date_text,
        &layout,
    );

    draw_tray(&draw, &model.planner, &layout, window_rect);
    if let Some(drag) = &model.drag {
        let is_reschedule = matches!(drag.item, DragItem::Placement { .. });
        draw_drag_ghost(&draw, &drag.label, drag.pos, is_reschedule);
    }
    draw_help_text(&draw, window_rect);

    draw.to_frame(app, &frame).unwrap();

    // Render egui on top
    model.egui.draw_to_frame(&frame).unwrap();
}

fn key_pressed(app: &App, model: &mut Model, key: Key) {
    let mods = app.keys.mods;
    let step = if mods.shift() { 60 } else { 5 };
    let now = Instant::now();

    match key {
        Key::Escape => {
            model.cancel_drag();
            model.engine.abort_interaction(&mut model.planner);
        }
        Key::N => {
            model.engine.jump_to_now(now, &mut model.planner);
        }
        Key::Left => {
            model.engine.nudge_focus(-step, now, &mut model.planner);
        }
        Key::Right => {
            model.engine.nudge_focus(step, now, &mut model.planner);
        }
        Key::Equals | Key::Plus => {
            if (mods.ctrl() || mods.logo()) && model.engine.zoom_in(&mut model.planner).level_changed {
                save_config(model);
            }
        }
        Key::Minus => {
            if (mods.ctrl() || mods.logo()) && model.engine.zoom_out(&mut model.planner).level_changed {
                save_config(model);
            }
        }
        _ => {}
    }
}

fn mouse_pressed(app: &App, model: &mut Model, button: MouseButton) {
    if button != MouseButton::Left {
        return;
    }
    let pos = app.mouse.position();
    let layout = StripLayout::calculate(app.window_rect());

    let tray_hit = layout
        .tray_slot_at(pos, model.planner.activities().len())
        .map(|i| &model.planner.activities()[i]);
    if let Some(activity) = tray_hit {
        let item = DragItem::Activity(activity.id.clone());
        let label = format!("{} {}", activity.icon, activity.title);
        model.start_drag(item, label, pos);
        return;
    }

    if !layout.strip_contains(pos) {
        return;
    }
    let x = layout.container_x(pos.x);
    let placed = if layout.item_band_contains(pos) {
        model.planner.placement_at(x).cloned()
    } else {
        None
    };
    let target = if placed.is_some() {
        PointerTarget::DraggableItem
    } else {
        PointerTarget::Strip
    };

    match (model.engine.pointer_down(x, target, Instant::now()), placed) {
        (PanStart::Started, _) => {}
        (PanStart::RefusedDraggableTarget, Some(item)) => {
            let label = format!("{} {}", item.icon, item.title);
            let drag = DragItem::Placement {
                placement_id: item.placement_id,
                activity_id: item.activity_id,
            };
            model.start_drag(drag, label, pos);
        }
        (refused, _) => tracing::debug!(?refused, "pan not started"),
    }
}

fn mouse_moved(app: &App, model: &mut Model, pos: Point2) {
    let layout = StripLayout::calculate(app.window_rect());
    let x = layout.container_x(pos.x);
    let now = Instant::now();

    if let Some(drag) = model.drag.as_mut() {
        drag.pos = pos;
        if layout.strip_contains(pos) {
            model
                .engine
                .drag_hover(x, drag.item.clone(), now, &mut model.planner);
        } else if model.engine.hover().is_some() {
            model.engine.drag_leave();
        }
        return;
    }

    model.engine.pointer_move(x, now, &mut model.planner);
}

fn mouse_released(app: &App, model: &mut Model, button: MouseButton) {
    if button != MouseButton::Left {
        return;
    }
    let now = Instant::now();

    if let Some(drag) = model.drag.take() {
        let pos = app.mouse.position();
        let layout = StripLayout::calculate(app.window_rect());
        let config = model.engine.config();
        let target = if layout.strip_contains(pos) {
            config.strip_target_id.clone()
        } else if layout.tray_contains(pos) {
            config.remove_target_id.clone()
        } else {
            String::new()
        };

        let outcome = model
            .engine
            .drag_drop(&drag.item, &target, now, &mut model.planner);
        if let DropOutcome::Ignored(reason) = outcome {
            tracing::debug!(?reason, label = %drag.label, "drop had no effect");
        }
        model
            .engine
            .set_external_drag_active(false, now, &mut model.planner);
    }

    model.engine.pointer_up(&mut model.planner);
}

fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);

    // A release outside the window may never reach us
    if let nannou::winit::event::WindowEvent::Focused(false) = event {
        model.cancel_drag();
        model.engine.abort_interaction(&mut model.planner);
    }
}

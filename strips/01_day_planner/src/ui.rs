//! UI module - egui zoom controls and the schedule list

use nannou_egui::egui;
use shared::{PlacementId, ZoomLevel};

use crate::planner::Planner;

/// Result of control panel interactions
#[derive(Default)]
pub struct ControlResult {
    pub set_zoom: Option<ZoomLevel>,
    pub jump_to_now: bool,
    /// Move the focus by this many minutes
    pub nudge: Option<i64>,
}

/// Draw the zoom and navigation panel
pub fn draw_controls(
    ctx: &egui::Context,
    zoom: ZoomLevel,
    live_time: &str,
    is_frozen: bool,
) -> ControlResult {
    let mut result = ControlResult::default();

    egui::Window::new("Controls")
        .collapsible(true)
        .resizable(false)
        .default_width(260.0)
        .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Now:");
                ui.monospace(live_time);
            });

            if is_frozen
                && ui
                    .add(
                        egui::Button::new(
                            egui::RichText::new("⏱ Jump to Now")
                                .color(egui::Color32::from_rgb(18, 22, 28)),
                        )
                        .fill(egui::Color32::from_rgb(110, 231, 183)),
                    )
                    .clicked()
            {
                result.jump_to_now = true;
            }

            ui.separator();

            ui.label("Zoom (px/min):");
            ui.horizontal(|ui| {
                for level in ZoomLevel::all() {
                    if ui
                        .selectable_label(level == zoom, level.get().to_string())
                        .clicked()
                    {
                        result.set_zoom = Some(level);
                    }
                }
            });

            ui.separator();

            ui.label("Move focus:");
            ui.horizontal(|ui| {
                for (label, delta) in [("−1h", -60), ("−15m", -15), ("+15m", 15), ("+1h", 60)] {
                    if ui.button(label).clicked() {
                        result.nudge = Some(delta);
                    }
                }
            });
        });

    result
}

/// Draw the day's schedule; returns a placement the user asked to remove
pub fn draw_schedule(ctx: &egui::Context, planner: &Planner) -> Option<PlacementId> {
    let mut removed = None;

    egui::Window::new("Today")
        .collapsible(true)
        .resizable(true)
        .default_width(240.0)
        .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
        .show(ctx, |ui| {
            let schedule = planner.schedule();
            if schedule.is_empty() {
                ui.label("Nothing scheduled yet.");
                ui.label("Drag an activity from the tray onto the strip.");
                return;
            }

            egui::ScrollArea::vertical().max_height(260.0).show(ui, |ui| {
                for placement in schedule {
                    ui.horizontal(|ui| {
                        ui.monospace(format!("{:>6}", placement.scheduled_time.to_string()));
                        ui.label(format!(
                            "{} {} ({} min)",
                            placement.activity.icon,
                            placement.activity.title,
                            placement.activity.duration_minutes
                        ));
                        if placement.is_reschedule {
                            ui.weak("moved");
                        }
                        if ui.small_button("✕").clicked() {
                            removed = Some(placement.id);
                        }
                    });
                }
            });

            ui.separator();
            ui.label(format!("{} points planned", planner.total_points()));
        });

    removed
}

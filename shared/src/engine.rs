//! Timeline Engine - one strip's clock, zoom, pan and drop handling
//!
//! The strip has two pointer interactions that never merge: its own pan
//! session and an external drag-and-drop system it does not control. They are
//! kept apart by the host's "external drag active" flag, with watchdogs as a
//! backstop for gestures whose terminal event never arrives.
//!
//! Everything is single-threaded. The host forwards input events as they
//! happen and calls [`TimelineEngine::tick`] from its update loop.

use std::time::Instant;

use crate::clock::{ClockState, LocalTimeSource, TimeClock, TimeSource};
use crate::config::StripConfig;
use crate::mapper::StripView;
use crate::pan::{PanAbortReason, PanSession, PanStart, PanStep, PointerTarget};
use crate::placement::{PlacementId, ScheduleIntent, StripHost, VisibleActivity};
use crate::scheduler::{DragItem, DropHoverState, DropOutcome, DropScheduler};
use crate::wall_time::{format_compact, minutes_difference, WallTime};
use crate::zoom::{ZoomChange, ZoomController, ZoomLevel};

/// What one call to [`TimelineEngine::tick`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The live readout changed
    pub display_changed: bool,
    /// `now` advanced and the strip recentered
    pub recentered: bool,
    /// A stuck pan was torn down
    pub pan_aborted: Option<PanAbortReason>,
    /// A stale drop hover was cleared
    pub hover_expired: bool,
}

/// A timeline strip: coordinate mapping plus both pointer interactions
#[derive(Debug)]
pub struct TimelineEngine<S: TimeSource = LocalTimeSource> {
    config: StripConfig,
    clock: TimeClock<S>,
    zoom: ZoomController,
    pan: PanSession,
    drops: DropScheduler,
    container_width: f64,
    external_drag_active: bool,
    /// Placements recently created or moved, with when that happened
    fades: Vec<(PlacementId, Instant)>,
    visible: Vec<VisibleActivity>,
    reported_time: Option<(WallTime, Option<WallTime>)>,
}

impl TimelineEngine<LocalTimeSource> {
    /// Engine driven by the system's local clock
    pub fn with_local_clock(config: StripConfig, container_width: f64) -> Self {
        Self::new(config, LocalTimeSource, container_width)
    }
}

impl<S: TimeSource> TimelineEngine<S> {
    pub fn new(config: StripConfig, source: S, container_width: f64) -> Self {
        let clock = TimeClock::new(source, config.coarse_tick(), config.fine_tick());
        let zoom = ZoomController::new(config.default_zoom);
        let pan = PanSession::new(config.pan_timeouts());
        let drops = DropScheduler::new(
            config.snap_step_minutes,
            config.hover_timeout(),
            config.strip_target_id.clone(),
            config.remove_target_id.clone(),
        );
        Self {
            config,
            clock,
            zoom,
            pan,
            drops,
            container_width: container_width.max(1.0),
            external_drag_active: false,
            fades: Vec::new(),
            visible: Vec::new(),
            reported_time: None,
        }
    }

    pub fn config(&self) -> &StripConfig {
        &self.config
    }

    pub fn clock_state(&self) -> ClockState {
        self.clock.state()
    }

    pub fn time_source(&self) -> &S {
        self.clock.source()
    }

    /// Live readout refreshed by the fine tick
    pub fn display_time(&self) -> &str {
        self.clock.display()
    }

    pub fn zoom_level(&self) -> ZoomLevel {
        self.zoom.level()
    }

    pub fn pan_offset(&self) -> f64 {
        self.zoom.pan_offset()
    }

    pub fn container_width(&self) -> f64 {
        self.container_width
    }

    /// Current mapping between time and pixels
    pub fn view(&self) -> StripView {
        StripView::new(&self.clock.state(), &self.zoom, self.container_width)
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_dragging()
    }

    pub fn hover(&self) -> Option<&DropHoverState> {
        self.drops.hover()
    }

    pub fn external_drag_active(&self) -> bool {
        self.external_drag_active
    }

    pub fn visible_activities(&self) -> &[VisibleActivity] {
        &self.visible
    }

    /// Start both tick sources and publish the initial state
    pub fn mount<H: StripHost>(&mut self, at: Instant, host: &mut H) {
        self.clock.start(at);
        self.notify_time(host);
        self.refresh_visible(host);
    }

    /// Cancel every timer and drop any live interaction
    pub fn teardown(&mut self) {
        self.clock.stop();
        self.fades.clear();
        self.pan.end();
        self.drops.clear();
        self.zoom.reanchor(&self.clock.state());
        tracing::debug!("timeline torn down");
    }

    pub fn is_mounted(&self) -> bool {
        self.clock.is_running()
    }

    pub fn set_container_width<H: StripHost>(&mut self, width: f64, host: &mut H) {
        let width = width.max(1.0);
        if (width - self.container_width).abs() < f64::EPSILON {
            return;
        }
        self.container_width = width;
        self.refresh_visible(host);
    }

    pub fn set_zoom<H: StripHost>(&mut self, level: ZoomLevel, host: &mut H) -> ZoomChange {
        self.cancel_pan(PanAbortReason::Cancelled);
        let change = self.zoom.set_level(level, &self.clock.state());
        self.after_zoom(change, host)
    }

    pub fn zoom_in<H: StripHost>(&mut self, host: &mut H) -> ZoomChange {
        self.cancel_pan(PanAbortReason::Cancelled);
        let change = self.zoom.zoom_in(&self.clock.state());
        self.after_zoom(change, host)
    }

    pub fn zoom_out<H: StripHost>(&mut self, host: &mut H) -> ZoomChange {
        self.cancel_pan(PanAbortReason::Cancelled);
        let change = self.zoom.zoom_out(&self.clock.state());
        self.after_zoom(change, host)
    }

    /// Leave any frozen or panned state and follow the live clock again
    pub fn jump_to_now<H: StripHost>(&mut self, at: Instant, host: &mut H) {
        self.cancel_pan(PanAbortReason::Cancelled);
        self.clock.jump_to_now(at);
        self.zoom.reset_offset();
        self.notify_time(host);
        self.refresh_visible(host);
    }

    /// Step the focus by a signed number of minutes, as a pan of exactly
    /// one pointer step from the strip center. Refused whenever a real pan
    /// would be.
    pub fn nudge_focus<H: StripHost>(&mut self, delta_minutes: i64, at: Instant, host: &mut H) -> bool {
        let state = self.clock.state();
        let focused = state.focused();
        let delta = minutes_difference(focused.add_minutes(delta_minutes), focused);
        if delta == 0 {
            return false;
        }

        let center = self.container_width / 2.0;
        let started = self.pan.begin(
            center,
            PointerTarget::Strip,
            self.external_drag_active,
            self.drops.is_hovering(),
            self.zoom.pan_offset(),
            state.now,
            at,
        );
        if started != PanStart::Started {
            tracing::debug!(?started, delta, "nudge refused");
            return false;
        }

        // Later times sit to the right, so the strip moves left
        let ppm = self.zoom.level().pixels_per_minute();
        let target_x = center - delta as f64 * ppm;
        if let Some(step) = self.pan.pointer_move(target_x, at, self.zoom.level()) {
            self.commit_pan_step(step, host);
        }
        self.pointer_up(host);
        true
    }

    /// The host saw the external drag system start or finish a gesture
    /// anywhere in the window
    pub fn set_external_drag_active<H: StripHost>(&mut self, active: bool, at: Instant, host: &mut H) {
        if active == self.external_drag_active {
            return;
        }
        self.external_drag_active = active;
        tracing::debug!(active, "external drag flag changed");
        if active {
            if self.cancel_pan(PanAbortReason::ExternalDragActive) {
                self.refresh_visible(host);
            }
        } else {
            // A hover may outlive the drag by one late drop; its timeout
            // only starts counting now
            self.drops.touch(at);
        }
    }

    pub fn pointer_down(&mut self, x: f64, target: PointerTarget, at: Instant) -> PanStart {
        self.pan.begin(
            x,
            target,
            self.external_drag_active,
            self.drops.is_hovering(),
            self.zoom.pan_offset(),
            self.clock.state().now,
            at,
        )
    }

    /// Pointer moved over the strip; only matters while panning
    pub fn pointer_move<H: StripHost>(&mut self, x: f64, at: Instant, host: &mut H) {
        if self.external_drag_active {
            if self.cancel_pan(PanAbortReason::ExternalDragActive) {
                self.refresh_visible(host);
            }
            return;
        }
        if let Some(step) = self.pan.pointer_move(x, at, self.zoom.level()) {
            self.commit_pan_step(step, host);
        }
    }

    pub fn pointer_up<H: StripHost>(&mut self, host: &mut H) {
        if self.pan.end().is_some() {
            self.zoom.reanchor(&self.clock.state());
            self.refresh_visible(host);
        }
    }

    /// External drag is hovering over the strip at `x`
    pub fn drag_hover<H: StripHost>(
        &mut self,
        x: f64,
        item: DragItem,
        at: Instant,
        host: &mut H,
    ) -> &DropHoverState {
        if self.cancel_pan(PanAbortReason::ExternalDragActive) {
            tracing::warn!("drag hover arrived during a pan");
            self.refresh_visible(host);
        }
        let view = self.view();
        self.drops.on_hover(x, item, &view, at)
    }

    /// External drag left the strip without dropping
    pub fn drag_leave(&mut self) {
        if self.drops.on_leave().is_some() {
            tracing::debug!("drag left the strip");
        }
    }

    /// External drag completed over `target`
    pub fn drag_drop<H: StripHost>(
        &mut self,
        item: &DragItem,
        target: &str,
        at: Instant,
        host: &mut H,
    ) -> DropOutcome {
        let outcome = self
            .drops
            .on_drop(item, target, &*host, &self.config.placeholder);
        match &outcome {
            DropOutcome::Scheduled(intent) => self.dispatch(intent, at, host),
            DropOutcome::Ignored(reason) => {
                tracing::debug!(?reason, target, "drop ignored");
            }
        }
        outcome
    }

    /// Unschedule a placement directly
    pub fn remove_placement<H: StripHost>(&mut self, placement_id: PlacementId, at: Instant, host: &mut H) {
        self.dispatch(&ScheduleIntent::Remove { placement_id }, at, host);
    }

    /// Clear any pan or hover in one step
    pub fn abort_interaction<H: StripHost>(&mut self, host: &mut H) {
        let had_pan = self.cancel_pan(PanAbortReason::Cancelled);
        let had_hover = self.drops.clear();
        if had_pan || had_hover {
            self.refresh_visible(host);
        }
    }

    /// Drive timers and watchdogs; call from the host's update loop
    pub fn tick<H: StripHost>(&mut self, at: Instant, host: &mut H) -> TickReport {
        let mut report = TickReport::default();

        let clock_tick = self.clock.tick(at);
        report.display_changed = clock_tick.display_changed;
        if clock_tick.now_changed {
            self.zoom.reanchor(&self.clock.state());
            report.recentered = true;
            self.notify_time(host);
        }

        if let Some(reason) = self.pan.check_watchdog(at, self.external_drag_active) {
            self.cancel_pan(reason);
            report.pan_aborted = Some(reason);
        }

        // While the drag is live the hover is held, however long it rests
        if !self.external_drag_active && self.drops.is_stale(at) {
            tracing::warn!("clearing stale drop hover");
            self.drops.clear();
            report.hover_expired = true;
        }

        let fade = self.config.fade();
        self.fades
            .retain(|(_, started)| at.saturating_duration_since(*started) < fade);

        if report.recentered || report.pan_aborted.is_some() {
            self.refresh_visible(host);
        }
        report
    }

    /// Highlight strength of a freshly placed item, 1.0 fading to 0.0
    pub fn fade_alpha(&self, placement_id: PlacementId, at: Instant) -> f32 {
        let fade = self.config.fade().as_secs_f32();
        self.fades
            .iter()
            .find(|(id, _)| *id == placement_id)
            .map(|(_, started)| {
                if fade <= 0.0 {
                    return 0.0;
                }
                let elapsed = at.saturating_duration_since(*started).as_secs_f32();
                (1.0 - elapsed / fade).clamp(0.0, 1.0)
            })
            .unwrap_or(0.0)
    }

    /// Offset and focus change together or not at all
    fn commit_pan_step<H: StripHost>(&mut self, step: PanStep, host: &mut H) {
        self.clock.freeze(step.focused);
        self.zoom.commit_offset(step.pan_offset);
        self.notify_time(host);
        self.refresh_visible(host);
    }

    fn cancel_pan(&mut self, reason: PanAbortReason) -> bool {
        if self.pan.abort(reason).is_none() {
            return false;
        }
        // Keep the last committed focus; drop the sub-minute drift
        self.zoom.reanchor(&self.clock.state());
        true
    }

    fn dispatch<H: StripHost>(&mut self, intent: &ScheduleIntent, at: Instant, host: &mut H) {
        match intent {
            ScheduleIntent::Create {
                activity,
                scheduled_time,
            } => {
                let time = format_compact(*scheduled_time);
                match host.add_activity(activity, &time) {
                    Some(id) => {
                        tracing::info!(%id, title = %activity.title, %time, "activity scheduled");
                        self.start_fade(id, at);
                        self.recenter_after_drop(*scheduled_time, host);
                    }
                    None => tracing::warn!(title = %activity.title, %time, "store refused placement"),
                }
            }
            ScheduleIntent::Reschedule {
                placement_id,
                new_scheduled_time,
                ..
            } => {
                let time = format_compact(*new_scheduled_time);
                if host.reschedule_activity(*placement_id, &time) {
                    tracing::info!(id = %placement_id, %time, "activity rescheduled");
                    self.start_fade(*placement_id, at);
                    self.recenter_after_drop(*new_scheduled_time, host);
                } else {
                    tracing::warn!(id = %placement_id, %time, "store refused reschedule");
                }
            }
            ScheduleIntent::Remove { placement_id } => {
                if host.remove_activity(*placement_id) {
                    tracing::info!(id = %placement_id, "activity removed");
                }
                self.fades.retain(|(id, _)| id != placement_id);
            }
        }
        self.refresh_visible(host);
    }

    fn after_zoom<H: StripHost>(&mut self, change: ZoomChange, host: &mut H) -> ZoomChange {
        if change.any() {
            tracing::debug!(
                level = self.zoom.level().get(),
                offset = self.zoom.pan_offset(),
                "zoom changed"
            );
        }
        // An aborted pan may have moved the strip even when the zoom did not
        self.refresh_visible(host);
        change
    }

    fn start_fade(&mut self, placement_id: PlacementId, at: Instant) {
        self.fades.retain(|(id, _)| *id != placement_id);
        self.fades.push((placement_id, at));
    }

    fn recenter_after_drop<H: StripHost>(&mut self, time: WallTime, host: &mut H) {
        if !self.config.recenter_on_drop {
            return;
        }
        self.clock.freeze(time);
        self.zoom.reanchor(&self.clock.state());
        self.notify_time(host);
    }

    fn notify_time<H: StripHost>(&mut self, host: &mut H) {
        let state = self.clock.state();
        let current = (state.now, state.frozen);
        if self.reported_time == Some(current) {
            return;
        }
        self.reported_time = Some(current);
        host.on_time_change(state.now, state.frozen);
    }

    fn refresh_visible<H: StripHost>(&mut self, host: &mut H) {
        let view = self.view();
        let ppm = view.pixels_per_minute();
        let mut visible: Vec<VisibleActivity> = host
            .placements()
            .into_iter()
            .filter(|p| view.is_visible(p.scheduled_time, p.activity.duration_minutes))
            .map(|p| VisibleActivity {
                x: view.time_to_pixel(p.scheduled_time),
                width: f64::from(p.activity.duration_minutes) * ppm,
                placement_id: p.id,
                activity_id: p.source_activity_id,
                title: p.activity.title,
                icon: p.activity.icon,
                scheduled_time: p.scheduled_time,
            })
            .collect();
        visible.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.placement_id.cmp(&b.placement_id)));

        if visible != self.visible {
            self.visible = visible;
            host.on_visible_activities_change(&self.visible);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualTimeSource;
    use crate::placement::{Activity, ActivityId, MemoryCatalog, MemoryHost, PlacementStore};
    use std::time::Duration;

    fn host() -> MemoryHost {
        MemoryHost::new(MemoryCatalog::new(vec![
            Activity::new("read", "Read", "📚", 30, 2),
            Activity::new("walk", "Walk", "🚶", 20, 1),
        ]))
    }

    fn engine_at(h: u32, m: u32) -> TimelineEngine<ManualTimeSource> {
        TimelineEngine::new(
            StripConfig::default(),
            ManualTimeSource::at(WallTime::from_hm(h, m)),
            800.0,
        )
    }

    #[test]
    fn test_mount_reports_initial_time() {
        let mut host = host();
        let mut engine = engine_at(9, 0);
        engine.mount(Instant::now(), &mut host);
        assert!(engine.is_mounted());
        assert_eq!(host.time_changes, vec![(WallTime::from_hm(9, 0), None)]);
    }

    #[test]
    fn test_pan_freezes_and_pointer_up_reanchors() {
        let t0 = Instant::now();
        let mut host = host();
        let mut engine = engine_at(12, 0);
        engine.mount(t0, &mut host);

        assert_eq!(engine.pointer_down(300.0, PointerTarget::Strip, t0), PanStart::Started);
        engine.pointer_move(402.0, t0, &mut host);
        let state = engine.clock_state();
        assert!(state.is_paused);
        // 102px right at 4px/min, rounded to the nearest minute
        assert_eq!(state.frozen, Some(WallTime::wrapping(694)));
        assert_eq!(engine.pan_offset(), 102.0);
        assert_eq!(engine.view().residual, -2.0);

        engine.pointer_up(&mut host);
        assert!(!engine.is_panning());
        assert_eq!(engine.clock_state().frozen, Some(WallTime::wrapping(694)));
        assert_eq!(engine.pan_offset(), 104.0);
        assert_eq!(engine.view().residual, 0.0);
    }

    #[test]
    fn test_external_drag_aborts_pan() {
        let t0 = Instant::now();
        let mut host = host();
        let mut engine = engine_at(12, 0);
        engine.mount(t0, &mut host);

        engine.pointer_down(300.0, PointerTarget::Strip, t0);
        engine.pointer_move(340.0, t0, &mut host);
        engine.set_external_drag_active(true, t0, &mut host);
        assert!(!engine.is_panning());
        assert_eq!(engine.clock_state().frozen, Some(WallTime::wrapping(710)));

        // Refused while the flag is up
        assert_eq!(
            engine.pointer_down(300.0, PointerTarget::Strip, t0),
            PanStart::RefusedExternalDrag
        );
    }

    #[test]
    fn test_tick_watchdog_recovers_stuck_pan() {
        let t0 = Instant::now();
        let mut host = host();
        let mut engine = engine_at(12, 0);
        engine.mount(t0, &mut host);

        engine.pointer_down(300.0, PointerTarget::Strip, t0);
        engine.pointer_move(310.0, t0, &mut host);
        let report = engine.tick(t0 + Duration::from_secs(4), &mut host);
        assert_eq!(report.pan_aborted, Some(PanAbortReason::PointerIdle));
        assert!(!engine.is_panning());
        assert_eq!(engine.view().residual, 0.0);
    }

    #[test]
    fn test_zoom_keeps_frozen_focus_centered() {
        let t0 = Instant::now();
        let mut host = host();
        let mut engine = engine_at(12, 0);
        engine.mount(t0, &mut host);
        assert!(engine.nudge_focus(-95, t0, &mut host));
        let focus = engine.clock_state().focused();
        assert_eq!(engine.view().time_to_pixel(focus), 400.0);

        for level in ZoomLevel::all() {
            engine.set_zoom(level, &mut host);
            assert!((engine.view().time_to_pixel(focus) - 400.0).abs() <= 1.0);
        }
    }

    #[test]
    fn test_jump_to_now_clears_everything() {
        let t0 = Instant::now();
        let mut host = host();
        let mut engine = engine_at(12, 0);
        engine.mount(t0, &mut host);
        assert!(engine.nudge_focus(30, t0, &mut host));
        engine.time_source().set_wall(WallTime::from_hm(12, 7));

        engine.jump_to_now(t0 + Duration::from_secs(1), &mut host);
        let state = engine.clock_state();
        assert_eq!(state.frozen, None);
        assert!(!state.is_paused);
        assert_eq!(state.now, WallTime::from_hm(12, 7));
        assert_eq!(engine.pan_offset(), 0.0);
        assert_eq!(host.time_changes.last(), Some(&(WallTime::from_hm(12, 7), None)));
    }

    #[test]
    fn test_hover_and_drop_create_then_fade() {
        let t0 = Instant::now();
        let mut host = host();
        let mut engine = engine_at(12, 0);
        engine.mount(t0, &mut host);

        let item = DragItem::Activity(ActivityId::new("read"));
        engine.set_external_drag_active(true, t0, &mut host);
        assert_eq!(engine.drag_hover(500.0, item.clone(), t0, &mut host).label, "12:25p");
        let outcome = engine.drag_drop(&item, "timeline", t0, &mut host);
        engine.set_external_drag_active(false, t0, &mut host);

        assert!(matches!(outcome, DropOutcome::Scheduled(ScheduleIntent::Create { .. })));
        assert_eq!(host.book.len(), 1);
        let placed = host.book.iter().next().unwrap().clone();
        assert_eq!(placed.scheduled_time, WallTime::wrapping(745));
        assert!(engine.hover().is_none());

        assert_eq!(engine.fade_alpha(placed.id, t0), 1.0);
        assert!(engine.fade_alpha(placed.id, t0 + Duration::from_millis(500)) < 1.0);
        engine.tick(t0 + Duration::from_secs(2), &mut host);
        assert_eq!(engine.fade_alpha(placed.id, t0 + Duration::from_secs(2)), 0.0);

        // Recentered on the drop
        assert_eq!(engine.clock_state().frozen, Some(WallTime::wrapping(745)));
        assert_eq!(host.visible.len(), 1);
        assert_eq!(host.visible[0].x, 400.0);
    }

    #[test]
    fn test_stale_hover_is_cleared_by_tick() {
        let t0 = Instant::now();
        let mut host = host();
        let mut engine = engine_at(12, 0);
        engine.mount(t0, &mut host);

        engine.drag_hover(420.0, DragItem::Activity(ActivityId::new("walk")), t0, &mut host);
        assert_eq!(
            engine.pointer_down(100.0, PointerTarget::Strip, t0),
            PanStart::RefusedHoverActive
        );
        let report = engine.tick(t0 + Duration::from_secs(5), &mut host);
        assert!(report.hover_expired);
        assert!(engine.hover().is_none());
    }

    #[test]
    fn test_held_hover_survives_while_drag_is_active() {
        let t0 = Instant::now();
        let mut host = host();
        let mut engine = engine_at(12, 0);
        engine.mount(t0, &mut host);

        let item = DragItem::Activity(ActivityId::new("read"));
        engine.set_external_drag_active(true, t0, &mut host);
        assert_eq!(engine.drag_hover(500.0, item.clone(), t0, &mut host).label, "12:25p");

        // The pointer rests on the strip well past the hover timeout
        let report = engine.tick(t0 + Duration::from_secs(5), &mut host);
        assert!(!report.hover_expired);
        assert!(engine.hover().is_some());

        let outcome = engine.drag_drop(&item, "timeline", t0 + Duration::from_secs(5), &mut host);
        let DropOutcome::Scheduled(intent @ ScheduleIntent::Create { .. }) = &outcome else {
            panic!("expected a create intent, got {outcome:?}");
        };
        assert_eq!(intent.time_string().as_deref(), Some("12:25p"));
        assert_eq!(host.book.len(), 1);
    }

    #[test]
    fn test_hover_expires_only_after_flag_falls() {
        let t0 = Instant::now();
        let mut host = host();
        let mut engine = engine_at(12, 0);
        engine.mount(t0, &mut host);

        engine.set_external_drag_active(true, t0, &mut host);
        engine.drag_hover(420.0, DragItem::Activity(ActivityId::new("walk")), t0, &mut host);
        let lowered = t0 + Duration::from_secs(10);
        engine.set_external_drag_active(false, lowered, &mut host);

        assert!(!engine.tick(lowered + Duration::from_secs(1), &mut host).hover_expired);
        assert!(engine.hover().is_some());
        assert!(engine.tick(lowered + Duration::from_secs(5), &mut host).hover_expired);
        assert!(engine.hover().is_none());
    }

    #[test]
    fn test_nudge_runs_through_the_pan_session() {
        let t0 = Instant::now();
        let mut host = host();
        let mut engine = engine_at(12, 0);
        engine.mount(t0, &mut host);

        assert!(engine.nudge_focus(15, t0, &mut host));
        assert!(!engine.is_panning());
        assert_eq!(engine.clock_state().frozen, Some(WallTime::from_hm(12, 15)));
        assert_eq!(engine.pan_offset(), -60.0);
        assert_eq!(engine.view().residual, 0.0);

        // Whole turns of the ring go nowhere
        assert!(!engine.nudge_focus(1440, t0, &mut host));

        // Refused exactly where a pan is refused
        engine.pointer_down(300.0, PointerTarget::Strip, t0);
        assert!(!engine.nudge_focus(60, t0, &mut host));
        engine.pointer_up(&mut host);
        engine.drag_hover(420.0, DragItem::Activity(ActivityId::new("walk")), t0, &mut host);
        assert!(!engine.nudge_focus(60, t0, &mut host));
        engine.drag_leave();
        engine.set_external_drag_active(true, t0, &mut host);
        assert!(!engine.nudge_focus(60, t0, &mut host));
        assert_eq!(engine.clock_state().frozen, Some(WallTime::from_hm(12, 15)));
    }

    #[test]
    fn test_coarse_tick_before_first_move_keeps_pan_anchor() {
        let t0 = Instant::now();
        let mut host = host();
        let mut engine = engine_at(12, 0);
        engine.mount(t0, &mut host);

        let down = t0 + Duration::from_secs(59);
        assert_eq!(engine.pointer_down(300.0, PointerTarget::Strip, down), PanStart::Started);
        engine.time_source().set_wall(WallTime::from_hm(12, 1));
        let tick = t0 + Duration::from_secs(60);
        assert!(engine.tick(tick, &mut host).recentered);
        assert_eq!(engine.clock_state().now, WallTime::from_hm(12, 1));

        // 40px right is ten minutes before the focus at pointer-down
        engine.pointer_move(340.0, tick, &mut host);
        assert_eq!(engine.clock_state().frozen, Some(WallTime::from_hm(11, 50)));

        engine.pointer_up(&mut host);
        assert_eq!(engine.view().time_to_pixel(WallTime::from_hm(11, 50)), 400.0);
    }

    #[test]
    fn test_hover_cancelling_pan_refreshes_visible() {
        let t0 = Instant::now();
        let mut host = host();
        let read = host.catalog.activities()[0].clone();
        host.add_activity(&read, "12:00p");
        let mut engine = engine_at(12, 0);
        engine.mount(t0, &mut host);
        assert_eq!(host.visible[0].x, 400.0);

        engine.pointer_down(300.0, PointerTarget::Strip, t0);
        engine.pointer_move(342.0, t0, &mut host);
        assert_eq!(host.visible[0].x, 442.0);

        engine.drag_hover(420.0, DragItem::Activity(ActivityId::new("walk")), t0, &mut host);
        assert!(!engine.is_panning());
        assert_eq!(host.visible[0].x, 444.0);
        assert_eq!(engine.visible_activities()[0].x, 444.0);
    }

    #[test]
    fn test_teardown_cancels_timers() {
        let t0 = Instant::now();
        let mut host = host();
        let mut engine = engine_at(12, 0);
        engine.mount(t0, &mut host);
        engine.pointer_down(300.0, PointerTarget::Strip, t0);

        engine.teardown();
        assert!(!engine.is_mounted());
        assert!(!engine.is_panning());
        let report = engine.tick(t0 + Duration::from_secs(120), &mut host);
        assert_eq!(report, TickReport::default());
    }
}

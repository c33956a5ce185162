//! Drop Scheduler - turns external drag-and-drop events into scheduling intents
//!
//! Hover and drop events come from a drag system the strip does not own, in
//! no guaranteed order relative to the strip's own pointer handling. The time
//! committed on drop is always the last candidate shown during hover; it is
//! never recomputed from the drop position.

use std::time::{Duration, Instant};

use crate::config::PlaceholderActivity;
use crate::mapper::{snap_to_grid, StripView};
use crate::placement::{Activity, ActivityCatalog, ActivityId, PlacementId, ScheduleIntent};
use crate::wall_time::{format_compact, WallTime};

/// Payload of an external drag, delivered with every hover and drop call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragItem {
    /// A catalog entry dragged in from the inventory
    Activity(ActivityId),
    /// An activity already placed on the strip
    Placement {
        placement_id: PlacementId,
        activity_id: ActivityId,
    },
}

impl DragItem {
    pub fn activity_id(&self) -> &ActivityId {
        match self {
            DragItem::Activity(id) => id,
            DragItem::Placement { activity_id, .. } => activity_id,
        }
    }
}

/// What the user currently sees while hovering over the strip
#[derive(Debug, Clone, PartialEq)]
pub struct DropHoverState {
    pub pointer_x: f64,
    /// Snapped time that a drop would commit
    pub candidate: WallTime,
    /// Compact rendering of `candidate`
    pub label: String,
    pub item: DragItem,
    pub updated_at: Instant,
}

/// Why a drop produced no intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropIgnored {
    /// Nothing was hovered over the strip before the drop
    NoHover,
    /// The drop landed on a target this strip does not handle
    OtherTarget,
    /// The dropped item is not the one that was hovering
    ItemMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Scheduled(ScheduleIntent),
    Ignored(DropIgnored),
}

#[derive(Debug, Clone)]
pub struct DropScheduler {
    hover: Option<DropHoverState>,
    snap_step: u32,
    hover_timeout: Duration,
    strip_target: String,
    remove_target: String,
}

impl DropScheduler {
    pub fn new(
        snap_step: u32,
        hover_timeout: Duration,
        strip_target: impl Into<String>,
        remove_target: impl Into<String>,
    ) -> Self {
        Self {
            hover: None,
            snap_step,
            hover_timeout,
            strip_target: strip_target.into(),
            remove_target: remove_target.into(),
        }
    }

    pub fn hover(&self) -> Option<&DropHoverState> {
        self.hover.as_ref()
    }

    pub fn is_hovering(&self) -> bool {
        self.hover.is_some()
    }

    pub fn strip_target(&self) -> &str {
        &self.strip_target
    }

    /// Record the candidate time under the pointer
    pub fn on_hover(
        &mut self,
        pointer_x: f64,
        item: DragItem,
        view: &StripView,
        at: Instant,
    ) -> &DropHoverState {
        let candidate = snap_to_grid(view.pixel_to_time(pointer_x), self.snap_step);
        let state = DropHoverState {
            pointer_x,
            candidate,
            label: format_compact(candidate),
            item,
            updated_at: at,
        };
        self.hover.insert(state)
    }

    /// Pointer left the strip before dropping
    pub fn on_leave(&mut self) -> Option<DropHoverState> {
        self.hover.take()
    }

    /// Resolve a completed drop. Hover state is cleared whatever happens.
    pub fn on_drop(
        &mut self,
        item: &DragItem,
        target: &str,
        catalog: &dyn ActivityCatalog,
        placeholder: &PlaceholderActivity,
    ) -> DropOutcome {
        let hover = self.hover.take();

        if target == self.remove_target {
            return match item {
                DragItem::Placement { placement_id, .. } => {
                    DropOutcome::Scheduled(ScheduleIntent::Remove {
                        placement_id: *placement_id,
                    })
                }
                DragItem::Activity(_) => DropOutcome::Ignored(DropIgnored::OtherTarget),
            };
        }
        if target != self.strip_target {
            return DropOutcome::Ignored(DropIgnored::OtherTarget);
        }
        let Some(hover) = hover else {
            return DropOutcome::Ignored(DropIgnored::NoHover);
        };
        if &hover.item != item {
            tracing::warn!(hovered = ?hover.item, dropped = ?item, "drop does not match hover");
            return DropOutcome::Ignored(DropIgnored::ItemMismatch);
        }

        let activity = resolve_activity(item.activity_id(), catalog, placeholder);
        let intent = match item {
            DragItem::Activity(_) => ScheduleIntent::Create {
                activity,
                scheduled_time: hover.candidate,
            },
            DragItem::Placement { placement_id, .. } => {
                tracing::debug!(title = %activity.title, "rescheduling");
                ScheduleIntent::Reschedule {
                    placement_id: *placement_id,
                    new_scheduled_time: hover.candidate,
                    remove_old: true,
                }
            }
        };
        DropOutcome::Scheduled(intent)
    }

    /// Whether the hover has gone without an update for too long
    pub fn is_stale(&self, at: Instant) -> bool {
        self.hover
            .as_ref()
            .is_some_and(|h| at.saturating_duration_since(h.updated_at) > self.hover_timeout)
    }

    /// Restart the staleness clock of a live hover
    pub fn touch(&mut self, at: Instant) {
        if let Some(hover) = self.hover.as_mut() {
            hover.updated_at = at;
        }
    }

    pub fn clear(&mut self) -> bool {
        self.hover.take().is_some()
    }
}

/// Look up a dragged activity, falling back to a generic placeholder
pub fn resolve_activity(
    id: &ActivityId,
    catalog: &dyn ActivityCatalog,
    placeholder: &PlaceholderActivity,
) -> Activity {
    catalog.lookup_activity(id).unwrap_or_else(|| {
        tracing::warn!(%id, "activity not in catalog, using placeholder");
        placeholder.activity_for(id)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::MemoryCatalog;
    use crate::zoom::ZoomLevel;

    fn scheduler() -> DropScheduler {
        DropScheduler::new(5, Duration::from_secs(4), "timeline", "inventory")
    }

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new(vec![Activity::new("run", "Run", "🏃", 30, 2)])
    }

    fn noon_view() -> StripView {
        StripView::at_rest(WallTime::NOON, ZoomLevel::new(4), 800.0)
    }

    #[test]
    fn test_hover_snaps_and_labels() {
        let mut drops = scheduler();
        let hover = drops.on_hover(
            502.0,
            DragItem::Activity(ActivityId::new("run")),
            &noon_view(),
            Instant::now(),
        );
        assert_eq!(hover.candidate, WallTime::wrapping(745));
        assert_eq!(hover.label, "12:25p");
    }

    #[test]
    fn test_drop_commits_last_hover_not_drop_position() {
        let t0 = Instant::now();
        let mut drops = scheduler();
        let item = DragItem::Activity(ActivityId::new("run"));
        drops.on_hover(500.0, item.clone(), &noon_view(), t0);
        drops.on_hover(540.0, item.clone(), &noon_view(), t0);

        let outcome = drops.on_drop(&item, "timeline", &catalog(), &PlaceholderActivity::default());
        match outcome {
            DropOutcome::Scheduled(ScheduleIntent::Create {
                activity,
                scheduled_time,
            }) => {
                assert_eq!(activity.title, "Run");
                assert_eq!(scheduled_time, WallTime::wrapping(755));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(!drops.is_hovering());
    }

    #[test]
    fn test_unknown_activity_uses_placeholder() {
        let mut drops = scheduler();
        let item = DragItem::Activity(ActivityId::new("mystery"));
        drops.on_hover(400.0, item.clone(), &noon_view(), Instant::now());

        let outcome = drops.on_drop(&item, "timeline", &catalog(), &PlaceholderActivity::default());
        let DropOutcome::Scheduled(ScheduleIntent::Create { activity, .. }) = outcome else {
            panic!("placeholder drop should still schedule");
        };
        assert_eq!(activity.id, ActivityId::new("mystery"));
        assert_eq!(activity.duration_minutes, PlaceholderActivity::default().duration_minutes);
    }

    #[test]
    fn test_placement_drop_reschedules() {
        let mut drops = scheduler();
        let item = DragItem::Placement {
            placement_id: PlacementId(7),
            activity_id: ActivityId::new("run"),
        };
        drops.on_hover(360.0, item.clone(), &noon_view(), Instant::now());
        let outcome = drops.on_drop(&item, "timeline", &catalog(), &PlaceholderActivity::default());
        assert_eq!(
            outcome,
            DropOutcome::Scheduled(ScheduleIntent::Reschedule {
                placement_id: PlacementId(7),
                new_scheduled_time: WallTime::from_hm(11, 50),
                remove_old: true,
            })
        );
    }

    #[test]
    fn test_placement_drop_on_inventory_removes() {
        let mut drops = scheduler();
        let item = DragItem::Placement {
            placement_id: PlacementId(3),
            activity_id: ActivityId::new("run"),
        };
        let outcome = drops.on_drop(&item, "inventory", &catalog(), &PlaceholderActivity::default());
        assert_eq!(
            outcome,
            DropOutcome::Scheduled(ScheduleIntent::Remove {
                placement_id: PlacementId(3)
            })
        );
    }

    #[test]
    fn test_ignored_drops_clear_hover() {
        let mut drops = scheduler();
        let run = DragItem::Activity(ActivityId::new("run"));
        let placeholder = PlaceholderActivity::default();

        assert_eq!(
            drops.on_drop(&run, "timeline", &catalog(), &placeholder),
            DropOutcome::Ignored(DropIgnored::NoHover)
        );

        drops.on_hover(400.0, run.clone(), &noon_view(), Instant::now());
        assert_eq!(
            drops.on_drop(&run, "sidebar", &catalog(), &placeholder),
            DropOutcome::Ignored(DropIgnored::OtherTarget)
        );
        assert!(!drops.is_hovering());

        drops.on_hover(400.0, run, &noon_view(), Instant::now());
        let other = DragItem::Activity(ActivityId::new("swim"));
        assert_eq!(
            drops.on_drop(&other, "timeline", &catalog(), &placeholder),
            DropOutcome::Ignored(DropIgnored::ItemMismatch)
        );
        assert!(!drops.is_hovering());
    }

    #[test]
    fn test_leave_and_staleness() {
        let t0 = Instant::now();
        let mut drops = scheduler();
        drops.on_hover(400.0, DragItem::Activity(ActivityId::new("run")), &noon_view(), t0);
        assert!(!drops.is_stale(t0 + Duration::from_secs(1)));
        assert!(drops.is_stale(t0 + Duration::from_secs(5)));

        drops.touch(t0 + Duration::from_secs(3));
        assert!(!drops.is_stale(t0 + Duration::from_secs(5)));
        assert!(drops.is_stale(t0 + Duration::from_secs(8)));

        assert!(drops.on_leave().is_some());
        assert!(drops.on_leave().is_none());
        assert!(!drops.is_stale(t0 + Duration::from_secs(5)));
    }
}

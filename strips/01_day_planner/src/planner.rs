//! Planner - the app's activity catalog and schedule book
//!
//! Implements the host callbacks the timeline engine talks to and keeps the
//! latest notifications around for rendering.

use shared::{
    Activity, ActivityCatalog, ActivityId, MemoryCatalog, Placement, PlacementBook, PlacementId,
    PlacementStore, StripListener, VisibleActivity, WallTime,
};

/// Habits offered in the tray on first launch
pub fn default_activities() -> Vec<Activity> {
    vec![
        Activity::new("meditate", "Meditate", "🧘", 15, 2),
        Activity::new("read", "Read", "📚", 30, 2),
        Activity::new("walk", "Walk", "🚶", 45, 3),
        Activity::new("journal", "Journal", "✍", 20, 1),
        Activity::new("workout", "Workout", "🏋", 60, 4),
        Activity::new("tea", "Tea Break", "🍵", 10, 1),
    ]
}

pub struct Planner {
    catalog: MemoryCatalog,
    book: PlacementBook,
    /// Placements currently inside the strip, left to right
    pub visible: Vec<VisibleActivity>,
}

impl Planner {
    pub fn new(activities: Vec<Activity>) -> Self {
        Self {
            catalog: MemoryCatalog::new(activities),
            book: PlacementBook::new(),
            visible: Vec::new(),
        }
    }

    pub fn activities(&self) -> &[Activity] {
        self.catalog.activities()
    }

    /// Schedule in time-of-day order
    pub fn schedule(&self) -> Vec<&Placement> {
        self.book.sorted()
    }

    /// Sum of points across the day's schedule
    pub fn total_points(&self) -> u32 {
        self.book.iter().map(|p| p.activity.points).sum()
    }

    /// Topmost visible placement under a container x
    pub fn placement_at(&self, x: f64) -> Option<&VisibleActivity> {
        self.visible
            .iter()
            .rev()
            .find(|v| x >= v.x && x <= v.x + v.width)
    }
}

impl ActivityCatalog for Planner {
    fn lookup_activity(&self, id: &ActivityId) -> Option<Activity> {
        self.catalog.lookup_activity(id)
    }
}

impl PlacementStore for Planner {
    fn add_activity(&mut self, activity: &Activity, time: &str) -> Option<PlacementId> {
        self.book.add_activity(activity, time)
    }

    fn reschedule_activity(&mut self, placement: PlacementId, time: &str) -> bool {
        self.book.reschedule_activity(placement, time)
    }

    fn remove_activity(&mut self, placement: PlacementId) -> bool {
        self.book.remove_activity(placement)
    }

    fn placements(&self) -> Vec<Placement> {
        self.book.placements()
    }
}

impl StripListener for Planner {
    fn on_time_change(&mut self, now: WallTime, frozen: Option<WallTime>) {
        tracing::debug!(%now, frozen = ?frozen.map(|t| t.to_string()), "strip time changed");
    }

    fn on_visible_activities_change(&mut self, visible: &[VisibleActivity]) {
        self.visible = visible.to_vec();
    }
}

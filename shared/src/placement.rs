//! Placements - scheduled activities and the host-facing callback surface
//!
//! The engine never keeps placements itself. It emits [`ScheduleIntent`]s and
//! hands them to a [`PlacementStore`], which is the system of record.

use serde::{Deserialize, Serialize};

use crate::wall_time::{format_compact, parse_time_string, WallTime};

/// Identifier of an activity in the external catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActivityId(pub String);

impl ActivityId {
    pub fn new(id: impl Into<String>) -> Self {
        ActivityId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActivityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a placed activity, assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlacementId(pub u64);

impl std::fmt::Display for PlacementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Catalog data for a schedulable activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub title: String,
    pub icon: String,
    pub duration_minutes: u32,
    pub points: u32,
}

impl Activity {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        icon: impl Into<String>,
        duration_minutes: u32,
        points: u32,
    ) -> Self {
        Self {
            id: ActivityId::new(id),
            title: title.into(),
            icon: icon.into(),
            duration_minutes,
            points,
        }
    }
}

/// An activity placed on the strip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub id: PlacementId,
    pub scheduled_time: WallTime,
    pub source_activity_id: ActivityId,
    /// Set once the placement has been moved at least once
    pub is_reschedule: bool,
    /// Catalog data captured when the placement was created
    pub activity: Activity,
}

/// A scheduling change produced by a drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleIntent {
    /// Place a brand-new activity
    Create {
        activity: Activity,
        scheduled_time: WallTime,
    },
    /// Move an existing placement; the old slot is vacated in the same step
    Reschedule {
        placement_id: PlacementId,
        new_scheduled_time: WallTime,
        remove_old: bool,
    },
    /// Take a placement off the strip
    Remove { placement_id: PlacementId },
}

impl ScheduleIntent {
    /// Compact time string carried to the store, if the intent has one
    pub fn time_string(&self) -> Option<String> {
        match self {
            ScheduleIntent::Create { scheduled_time, .. } => Some(format_compact(*scheduled_time)),
            ScheduleIntent::Reschedule {
                new_scheduled_time, ..
            } => Some(format_compact(*new_scheduled_time)),
            ScheduleIntent::Remove { .. } => None,
        }
    }
}

/// A placement currently inside the strip container
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleActivity {
    pub placement_id: PlacementId,
    pub activity_id: ActivityId,
    pub title: String,
    pub icon: String,
    pub scheduled_time: WallTime,
    /// Left edge in container pixels
    pub x: f64,
    /// Width in pixels at the current zoom
    pub width: f64,
}

/// Resolves dragged item ids to full activity data
pub trait ActivityCatalog {
    fn lookup_activity(&self, id: &ActivityId) -> Option<Activity>;
}

/// The system of record for placements. Times arrive in compact form.
pub trait PlacementStore {
    fn add_activity(&mut self, activity: &Activity, time: &str) -> Option<PlacementId>;

    /// Move a placement in a single step; never observable as both or neither
    fn reschedule_activity(&mut self, placement: PlacementId, time: &str) -> bool;

    fn remove_activity(&mut self, placement: PlacementId) -> bool;

    fn placements(&self) -> Vec<Placement>;
}

/// Notifications the strip raises for its host
pub trait StripListener {
    fn on_time_change(&mut self, _now: WallTime, _frozen: Option<WallTime>) {}

    fn on_visible_activities_change(&mut self, _visible: &[VisibleActivity]) {}
}

/// Everything the engine needs from its host
pub trait StripHost: ActivityCatalog + PlacementStore + StripListener {}

impl<T: ActivityCatalog + PlacementStore + StripListener> StripHost for T {}

/// An activity catalog held in memory, in display order
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    activities: Vec<Activity>,
}

impl MemoryCatalog {
    pub fn new(activities: Vec<Activity>) -> Self {
        Self { activities }
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn insert(&mut self, activity: Activity) {
        match self.activities.iter_mut().find(|a| a.id == activity.id) {
            Some(existing) => *existing = activity,
            None => self.activities.push(activity),
        }
    }
}

impl ActivityCatalog for MemoryCatalog {
    fn lookup_activity(&self, id: &ActivityId) -> Option<Activity> {
        self.activities.iter().find(|a| &a.id == id).cloned()
    }
}

/// A placement store held in memory
#[derive(Debug, Clone, Default)]
pub struct PlacementBook {
    placements: Vec<Placement>,
    next_id: u64,
}

impl PlacementBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: PlacementId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Placement> {
        self.placements.iter()
    }

    /// Placements sorted by time of day
    pub fn sorted(&self) -> Vec<&Placement> {
        let mut sorted: Vec<&Placement> = self.placements.iter().collect();
        sorted.sort_by_key(|p| (p.scheduled_time, p.id));
        sorted
    }
}

impl PlacementStore for PlacementBook {
    fn add_activity(&mut self, activity: &Activity, time: &str) -> Option<PlacementId> {
        let scheduled_time = match parse_time_string(time) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("not placing {}: {e}", activity.id);
                return None;
            }
        };
        self.next_id += 1;
        let id = PlacementId(self.next_id);
        self.placements.push(Placement {
            id,
            scheduled_time,
            source_activity_id: activity.id.clone(),
            is_reschedule: false,
            activity: activity.clone(),
        });
        Some(id)
    }

    fn reschedule_activity(&mut self, placement: PlacementId, time: &str) -> bool {
        let scheduled_time = match parse_time_string(time) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("not moving {placement}: {e}");
                return false;
            }
        };
        // Updated in place so the entry is never duplicated or dropped
        match self.placements.iter_mut().find(|p| p.id == placement) {
            Some(entry) => {
                entry.scheduled_time = scheduled_time;
                entry.is_reschedule = true;
                true
            }
            None => false,
        }
    }

    fn remove_activity(&mut self, placement: PlacementId) -> bool {
        let before = self.placements.len();
        self.placements.retain(|p| p.id != placement);
        self.placements.len() != before
    }

    fn placements(&self) -> Vec<Placement> {
        self.placements.clone()
    }
}

/// A complete in-memory host: catalog, placement book, and the last
/// notifications the strip raised
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    pub catalog: MemoryCatalog,
    pub book: PlacementBook,
    /// Every (now, frozen) pair reported, oldest first
    pub time_changes: Vec<(WallTime, Option<WallTime>)>,
    /// Latest visible list
    pub visible: Vec<VisibleActivity>,
    pub visible_updates: usize,
}

impl MemoryHost {
    pub fn new(catalog: MemoryCatalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }
}

impl ActivityCatalog for MemoryHost {
    fn lookup_activity(&self, id: &ActivityId) -> Option<Activity> {
        self.catalog.lookup_activity(id)
    }
}

impl PlacementStore for MemoryHost {
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

impl StripListener for MemoryHost {
    fn on_time_change(&mut self, now: WallTime, frozen: Option<WallTime>) {
        self.time_changes.push((now, frozen));
    }

    fn on_visible_activities_change(&mut self, visible: &[VisibleActivity]) {
        self.visible = visible.to_vec();
        self.visible_updates += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yoga() -> Activity {
        Activity::new("yoga", "Yoga", "🧘", 45, 3)
    }

    #[test]
    fn test_book_add_parses_compact_time() {
        let mut book = PlacementBook::new();
        let id = book.add_activity(&yoga(), "7:30a").unwrap();
        let placed = book.get(id).unwrap();
        assert_eq!(placed.scheduled_time, WallTime::from_hm(7, 30));
        assert_eq!(placed.source_activity_id, ActivityId::new("yoga"));
        assert!(!placed.is_reschedule);
    }

    #[test]
    fn test_book_rejects_malformed_time() {
        let mut book = PlacementBook::new();
        assert_eq!(book.add_activity(&yoga(), "whenever"), None);
        assert!(book.is_empty());
    }

    #[test]
    fn test_reschedule_moves_single_entry() {
        let mut book = PlacementBook::new();
        let id = book.add_activity(&yoga(), "7:30a").unwrap();

        assert!(book.reschedule_activity(id, "6:15p"));
        assert_eq!(book.len(), 1);
        let moved = book.get(id).unwrap();
        assert_eq!(moved.scheduled_time, WallTime::from_hm(18, 15));
        assert!(moved.is_reschedule);

        assert!(!book.reschedule_activity(PlacementId(99), "6:15p"));
        assert!(!book.reschedule_activity(id, "later"));
        assert_eq!(book.get(id).unwrap().scheduled_time, WallTime::from_hm(18, 15));
    }

    #[test]
    fn test_overlapping_placements_are_allowed() {
        let mut book = PlacementBook::new();
        book.add_activity(&yoga(), "7:30a");
        book.add_activity(&yoga(), "7:30a");
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn test_remove_and_sorted() {
        let mut book = PlacementBook::new();
        let late = book.add_activity(&yoga(), "9:00p").unwrap();
        let early = book.add_activity(&yoga(), "6:00a").unwrap();
        let order: Vec<PlacementId> = book.sorted().iter().map(|p| p.id).collect();
        assert_eq!(order, vec![early, late]);

        assert!(book.remove_activity(late));
        assert!(!book.remove_activity(late));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_catalog_lookup_and_replace() {
        let mut catalog = MemoryCatalog::new(vec![yoga()]);
        assert_eq!(catalog.lookup_activity(&ActivityId::new("yoga")), Some(yoga()));
        assert_eq!(catalog.lookup_activity(&ActivityId::new("run")), None);

        catalog.insert(Activity::new("yoga", "Hot Yoga", "🔥", 60, 5));
        assert_eq!(catalog.activities().len(), 1);
        assert_eq!(catalog.activities()[0].title, "Hot Yoga");
    }

    #[test]
    fn test_intent_time_strings() {
        let create = ScheduleIntent::Create {
            activity: yoga(),
            scheduled_time: WallTime::wrapping(745),
        };
        assert_eq!(create.time_string().as_deref(), Some("12:25p"));
        let remove = ScheduleIntent::Remove {
            placement_id: PlacementId(1),
        };
        assert_eq!(remove.time_string(), None);
    }
}

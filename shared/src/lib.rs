//! Shared - timeline strip engine used by every planner
//!
//! Wall-clock time on a single 24-hour ring, a zoomable and pannable strip
//! layout, and drag-and-drop scheduling onto it.

pub mod clock;
pub mod config;
pub mod engine;
pub mod mapper;
pub mod pan;
pub mod placement;
pub mod scheduler;
pub mod ticks;
pub mod wall_time;
pub mod zoom;

pub use clock::{ClockState, LocalTimeSource, ManualTimeSource, TimeClock, TimeSource};
pub use config::{
    config_dir, config_path, delete_config, load_config, load_config_from, save_config,
    save_config_to, ConfigError, PlaceholderActivity, StripConfig,
};
pub use engine::{TickReport, TimelineEngine};
pub use mapper::{pixel_to_time, snap_to_grid, time_to_pixel, StripView};
pub use pan::{PanAbortReason, PanStart, PointerTarget};
pub use placement::{
    Activity, ActivityCatalog, ActivityId, MemoryCatalog, MemoryHost, Placement, PlacementBook,
    PlacementId, PlacementStore, ScheduleIntent, StripHost, StripListener, VisibleActivity,
};
pub use scheduler::{DragItem, DropHoverState, DropIgnored, DropOutcome};
pub use ticks::{generate_ticks, Tick, TickKind};
pub use wall_time::{
    format_compact, minutes_difference, parse_time_string, to_24_hour_string,
    to_compact_time_string, Meridiem, TimeParseError, WallTime, MINUTES_PER_DAY,
};
pub use zoom::{ZoomChange, ZoomLevel};

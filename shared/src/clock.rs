//! Time Clock - "now", the frozen focus, and the two tick sources
//!
//! The coarse tick advances `now` and drives strip recentring. The fine tick
//! only refreshes the live time readout; positioning never follows it, so the
//! strip does not jitter every second.

use std::cell::Cell;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::wall_time::{format_compact_with_seconds, WallTime};

/// Source of local wall-clock time
pub trait TimeSource {
    /// Current local time of day
    fn current_time(&self) -> NaiveTime;
}

/// The system's local clock
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTimeSource;

impl TimeSource for LocalTimeSource {
    fn current_time(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// A clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualTimeSource {
    time: Cell<NaiveTime>,
}

impl ManualTimeSource {
    pub fn new(time: NaiveTime) -> Self {
        Self {
            time: Cell::new(time),
        }
    }

    /// Start at an exact minute of the day
    pub fn at(time: WallTime) -> Self {
        Self::new(naive_from_wall(time))
    }

    pub fn set(&self, time: NaiveTime) {
        self.time.set(time);
    }

    pub fn set_wall(&self, time: WallTime) {
        self.set(naive_from_wall(time));
    }
}

impl TimeSource for ManualTimeSource {
    fn current_time(&self) -> NaiveTime {
        self.time.get()
    }
}

fn naive_from_wall(time: WallTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour24(), time.minute(), 0).unwrap_or(NaiveTime::MIN)
}

/// A cancellable periodic deadline polled from the host's update loop
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            next_due: None,
        }
    }

    /// Arm the ticker; the first firing is one interval after `at`
    pub fn start(&mut self, at: Instant) {
        self.next_due = Some(at + self.interval);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true at most once per call when a deadline has passed.
    /// Missed periods collapse into a single firing.
    pub fn poll(&mut self, at: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if at < due {
            return false;
        }
        let mut next = due + self.interval;
        while next <= at {
            next += self.interval;
        }
        self.next_due = Some(next);
        true
    }
}

/// Clock state shared with the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockState {
    /// Live wall time, advanced by the coarse tick
    pub now: WallTime,
    /// Manually selected focus; authoritative over `now` when present
    pub frozen: Option<WallTime>,
    /// While set, `now` stops advancing for positioning
    pub is_paused: bool,
}

impl ClockState {
    pub fn live(now: WallTime) -> Self {
        Self {
            now,
            frozen: None,
            is_paused: false,
        }
    }

    /// The time currently centered on the strip
    pub fn focused(&self) -> WallTime {
        self.frozen.unwrap_or(self.now)
    }
}

/// What a call to [`TimeClock::tick`] changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockTick {
    /// The coarse tick fired (positioning may need recentring)
    pub coarse: bool,
    /// `now` actually moved
    pub now_changed: bool,
    /// The live readout text changed
    pub display_changed: bool,
}

/// Owns "now", the frozen focus, and both tick sources
#[derive(Debug, Clone)]
pub struct TimeClock<S: TimeSource = LocalTimeSource> {
    source: S,
    state: ClockState,
    coarse: Ticker,
    fine: Ticker,
    display: String,
}

impl<S: TimeSource> TimeClock<S> {
    pub fn new(source: S, coarse_interval: Duration, fine_interval: Duration) -> Self {
        let current = source.current_time();
        Self {
            state: ClockState::live(WallTime::from(current)),
            display: format_compact_with_seconds(current),
            source,
            coarse: Ticker::new(coarse_interval),
            fine: Ticker::new(fine_interval),
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Live time readout, refreshed by the fine tick
    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn is_running(&self) -> bool {
        self.coarse.is_running() || self.fine.is_running()
    }

    /// Arm both tick sources
    pub fn start(&mut self, at: Instant) {
        self.coarse.start(at);
        self.fine.start(at);
    }

    /// Cancel both tick sources
    pub fn stop(&mut self) {
        self.coarse.cancel();
        self.fine.cancel();
    }

    pub fn tick(&mut self, at: Instant) -> ClockTick {
        let mut result = ClockTick::default();

        if self.coarse.poll(at) {
            result.coarse = true;
            if !self.state.is_paused {
                let now = WallTime::from(self.source.current_time());
                if now != self.state.now {
                    self.state.now = now;
                    result.now_changed = true;
                }
            }
        }

        if self.fine.poll(at) {
            let display = format_compact_with_seconds(self.source.current_time());
            if display != self.display {
                self.display = display;
                result.display_changed = true;
            }
        }

        result
    }

    /// Set the frozen focus and pause positioning
    pub fn freeze(&mut self, focus: WallTime) {
        self.state.frozen = Some(focus);
        self.state.is_paused = true;
    }

    /// Clear the frozen focus, resync `now`, and restart the coarse tick
    pub fn jump_to_now(&mut self, at: Instant) {
        self.state = ClockState::live(WallTime::from(self.source.current_time()));
        self.coarse.start(at);
        if !self.fine.is_running() {
            self.fine.start(at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock_at(h: u32, m: u32) -> TimeClock<ManualTimeSource> {
        TimeClock::new(
            ManualTimeSource::at(WallTime::from_hm(h, m)),
            Duration::from_secs(60),
            Duration::from_secs(1),
        )
    }

    #[test]
    fn test_ticker_fires_once_per_deadline() {
        let t0 = Instant::now();
        let mut ticker = Ticker::new(Duration::from_secs(1));
        assert!(!ticker.poll(t0 + Duration::from_secs(5)));

        ticker.start(t0);
        assert!(!ticker.poll(t0 + Duration::from_millis(500)));
        assert!(ticker.poll(t0 + Duration::from_millis(1000)));
        assert!(!ticker.poll(t0 + Duration::from_millis(1500)));
        // Missed periods collapse
        assert!(ticker.poll(t0 + Duration::from_secs(10)));
        assert!(!ticker.poll(t0 + Duration::from_millis(10_500)));

        ticker.cancel();
        assert!(!ticker.poll(t0 + Duration::from_secs(60)));
    }

    #[test]
    fn test_coarse_tick_advances_now() {
        let t0 = Instant::now();
        let mut clock = clock_at(9, 0);
        clock.start(t0);
        clock.source().set_wall(WallTime::from_hm(9, 1));

        let tick = clock.tick(t0 + Duration::from_secs(30));
        assert!(!tick.coarse);
        assert_eq!(clock.state().now, WallTime::from_hm(9, 0));

        let tick = clock.tick(t0 + Duration::from_secs(60));
        assert!(tick.coarse && tick.now_changed);
        assert_eq!(clock.state().now, WallTime::from_hm(9, 1));
    }

    #[test]
    fn test_paused_clock_keeps_display_moving() {
        let t0 = Instant::now();
        let mut clock = clock_at(9, 0);
        clock.start(t0);
        clock.freeze(WallTime::from_hm(7, 30));

        clock
            .source()
            .set(NaiveTime::from_hms_opt(9, 5, 12).unwrap());
        let tick = clock.tick(t0 + Duration::from_secs(60));
        assert!(tick.coarse);
        assert!(!tick.now_changed);
        assert!(tick.display_changed);
        assert_eq!(clock.state().now, WallTime::from_hm(9, 0));
        assert_eq!(clock.display(), "9:05:12a");
        assert_eq!(clock.state().focused(), WallTime::from_hm(7, 30));
    }

    #[test]
    fn test_jump_to_now_clears_frozen() {
        let t0 = Instant::now();
        let mut clock = clock_at(9, 0);
        clock.start(t0);
        clock.freeze(WallTime::from_hm(7, 30));
        clock.source().set_wall(WallTime::from_hm(9, 20));

        clock.jump_to_now(t0 + Duration::from_secs(5));
        let state = clock.state();
        assert_eq!(state.frozen, None);
        assert!(!state.is_paused);
        assert_eq!(state.focused(), WallTime::from_hm(9, 20));
    }

    #[test]
    fn test_stop_cancels_timers() {
        let t0 = Instant::now();
        let mut clock = clock_at(9, 0);
        clock.start(t0);
        assert!(clock.is_running());
        clock.stop();
        assert!(!clock.is_running());
        assert_eq!(clock.tick(t0 + Duration::from_secs(600)), ClockTick::default());
    }
}

use crate::values::minutes_to_seconds;

// state model //
// A `TimerSnapshot` is the canonical timer state. It is only ever replaced
// (every transition returns a fresh snapshot), never mutated in place.

/// The three interchangeable timer modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    /// Focus/break interval cycle (pomodoro).
    Interval,
    /// Free-running elapsed-time counter.
    Stopwatch,
    /// User-entered duration; no wall-clock component at all.
    Manual,
}

impl TimerMode {
    pub fn tag(&self) -> &'static str {
        match self {
            TimerMode::Interval => "interval",
            TimerMode::Stopwatch => "stopwatch",
            TimerMode::Manual => "manual",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "interval" => Some(TimerMode::Interval),
            "stopwatch" => Some(TimerMode::Stopwatch),
            "manual" => Some(TimerMode::Manual),
            _ => None,
        }
    }
}

/// Which half of the interval cycle is current. Only meaningful while
/// `mode == Interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    Rest,
}

impl Phase {
    /// The opposite phase.
    pub fn next(&self) -> Self {
        match self {
            Phase::Active => Phase::Rest,
            Phase::Rest => Phase::Active,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Phase::Active => "active",
            Phase::Rest => "rest",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "active" => Some(Phase::Active),
            "rest" => Some(Phase::Rest),
            _ => None,
        }
    }
}

/// An inclusive `[min, max]` bound for one configurable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: u32,
    pub max: u32,
}

impl Bounds {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: u32) -> u32 {
        value.max(self.min).min(self.max)
    }

    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Caller-supplied starting configuration. Never mutated by the engine.
#[derive(Debug, Clone, Copy)]
pub struct TimerDefaults {
    pub mode: TimerMode,
    pub active_minutes: u32,
    pub rest_minutes: u32,
    pub total_sets: u32,
}

impl Default for TimerDefaults {
    fn default() -> Self {
        Self {
            mode: TimerMode::Interval,
            active_minutes: 25,
            rest_minutes: 5,
            total_sets: 2,
        }
    }
}

/// Caller-supplied validation bounds. Never mutated by the engine.
#[derive(Debug, Clone, Copy)]
pub struct TimerRanges {
    pub sets: Bounds,
    pub active_minutes: Bounds,
    pub rest_minutes: Bounds,
    pub manual_hours: Bounds,
    pub manual_minutes: Bounds,
}

impl Default for TimerRanges {
    fn default() -> Self {
        Self {
            sets: Bounds::new(1, 12),
            active_minutes: Bounds::new(1, 180),
            rest_minutes: Bounds::new(1, 60),
            manual_hours: Bounds::new(0, 23),
            manual_minutes: Bounds::new(0, 59),
        }
    }
}

/// The full timer state at one point in time.
///
/// Exactly one of `remaining_seconds` / `elapsed_seconds` / the `manual_*`
/// pair is live depending on `mode`; the others are retained but inert.
/// `anchor_epoch_ms` is `Some` iff `is_running`: it holds the wall-clock
/// instant the current running period began, pulled backward to account for
/// time already on the clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSnapshot {
    pub mode: TimerMode,
    pub is_running: bool,
    /// Opaque study-subject label; carried through untouched.
    pub selected_subject: String,
    pub phase: Phase,
    pub active_minutes: u32,
    pub rest_minutes: u32,
    pub total_sets: u32,
    pub current_set: u32,
    /// Countdown remainder for the current interval phase.
    pub remaining_seconds: u32,
    /// Stopwatch accumulation.
    pub elapsed_seconds: u32,
    pub manual_hours: u32,
    pub manual_minutes: u32,
    pub anchor_epoch_ms: Option<i64>,
}

impl TimerSnapshot {
    /// Build the initial, stopped snapshot from caller configuration.
    pub fn initial(defaults: &TimerDefaults, ranges: &TimerRanges) -> Self {
        let active_minutes = defaults.active_minutes;
        Self {
            mode: defaults.mode,
            is_running: false,
            selected_subject: String::new(),
            phase: Phase::Active,
            active_minutes,
            rest_minutes: defaults.rest_minutes,
            total_sets: ranges.sets.clamp(defaults.total_sets),
            current_set: 1,
            remaining_seconds: minutes_to_seconds(f64::from(active_minutes)),
            elapsed_seconds: 0,
            manual_hours: 0,
            manual_minutes: 0,
            anchor_epoch_ms: None,
        }
    }
}

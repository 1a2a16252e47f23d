//! Core engine for a study-session timer with three interchangeable modes:
//! a focus/break interval cycle (pomodoro), a free-running stopwatch, and
//! manual time entry.
//!
//! Every transition is a pure function over a [`TimerSnapshot`] plus a
//! caller-supplied wall-clock time, so the engine is deterministic and does
//! no I/O of its own. The [`codec`] module defines the storage projection
//! and the rehydration path that reconstructs correct elapsed/remaining time
//! after the process was suspended for an arbitrary real-world duration.

pub mod codec;
mod engine;
mod phase;
mod snapshot;
pub mod store;
pub mod values;

pub use phase::{adjust_minutes_by_step, clamp_to_step};
pub use snapshot::{Bounds, Phase, TimerDefaults, TimerMode, TimerRanges, TimerSnapshot};

use crate::snapshot::{Bounds, Phase, TimerMode, TimerSnapshot};
use crate::values::minutes_to_seconds;

// phase-duration helpers //
// Read-only derivations over a snapshot; nothing here changes state.

impl TimerSnapshot {
    /// Total length in seconds of the phase the snapshot is currently in.
    pub fn phase_total_seconds(&self) -> u32 {
        let minutes = match self.phase {
            Phase::Rest => self.rest_minutes,
            Phase::Active => self.active_minutes,
        };
        minutes_to_seconds(f64::from(minutes))
    }

    /// Seconds of focus time already spent in the current set.
    ///
    /// Once the rest phase begins the active phase is by definition complete,
    /// so resting reports the full active duration.
    pub fn elapsed_active_seconds(&self) -> u32 {
        if self.mode != TimerMode::Interval {
            return 0;
        }
        let active_total = minutes_to_seconds(f64::from(self.active_minutes));
        match self.phase {
            Phase::Rest => active_total,
            Phase::Active => active_total.saturating_sub(self.remaining_seconds),
        }
    }

    /// Has the interval cycle actually begun?
    ///
    /// True once any active time has been consumed, once resting, or once
    /// past set 1. Single source of truth for configuration-edit gating.
    pub fn has_interval_started(&self) -> bool {
        if self.phase == Phase::Rest {
            return true;
        }
        let active_total = minutes_to_seconds(f64::from(self.active_minutes));
        self.remaining_seconds < active_total || self.current_set > 1
    }

    /// May the user still edit the configured phase lengths?
    pub fn can_edit_config(&self) -> bool {
        self.mode == TimerMode::Interval
            && !self.is_running
            && !self.has_interval_started()
            && self.current_set == 1
    }

    /// Remaining fraction of the current phase, in `[0, 1]`. Returns 0 for
    /// non-interval modes and for a zero-length phase.
    pub fn remaining_ratio(&self) -> f64 {
        if self.mode != TimerMode::Interval {
            return 0.0;
        }
        let total = self.phase_total_seconds();
        if total == 0 {
            return 0.0;
        }
        (f64::from(self.remaining_seconds) / f64::from(total)).clamp(0.0, 1.0)
    }
}

/// Round `minutes` to the nearest multiple of `step`, then clamp into bounds.
pub fn clamp_to_step(minutes: f64, step: u32, bounds: Bounds) -> u32 {
    let step = step.max(1);
    if !minutes.is_finite() {
        return bounds.clamp(if minutes == f64::INFINITY { bounds.max } else { bounds.min });
    }
    let steps = (minutes / f64::from(step)).round();
    let snapped = if steps <= 0.0 {
        0
    } else {
        // saturates well above any sane minute bound
        (steps as u32).saturating_mul(step)
    };
    bounds.clamp(snapped)
}

/// Move a minute value by `delta_steps` multiples of `step`, then clamp.
///
/// The current step index rounds toward the direction of travel (floor when
/// decreasing, ceil when increasing) so a value sitting between steps still
/// moves on the next adjustment instead of snapping in place.
pub fn adjust_minutes_by_step(current: u32, delta_steps: i64, step: u32, bounds: Bounds) -> u32 {
    let step = step.max(1);
    let exact = f64::from(current) / f64::from(step);
    let rounded = if delta_steps < 0 { exact.floor() } else { exact.ceil() };
    let index = rounded as i64;
    let target = (index.saturating_add(delta_steps)).max(0) as u64;
    let snapped = target.saturating_mul(u64::from(step)).min(u64::from(u32::MAX)) as u32;
    bounds.clamp(snapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{TimerDefaults, TimerRanges};

    fn interval() -> TimerSnapshot {
        TimerSnapshot::initial(&TimerDefaults::default(), &TimerRanges::default())
    }

    #[test]
    fn phase_total_follows_phase() {
        let mut s = interval();
        assert_eq!(s.phase_total_seconds(), 1500);
        s.phase = Phase::Rest;
        assert_eq!(s.phase_total_seconds(), 300);
    }

    #[test]
    fn elapsed_active_counts_consumed_focus_time() {
        let mut s = interval();
        assert_eq!(s.elapsed_active_seconds(), 0);
        s.remaining_seconds = 1100;
        assert_eq!(s.elapsed_active_seconds(), 400);
        s.phase = Phase::Rest;
        assert_eq!(s.elapsed_active_seconds(), 1500);
        s.mode = TimerMode::Stopwatch;
        assert_eq!(s.elapsed_active_seconds(), 0);
    }

    #[test]
    fn elapsed_active_floors_at_zero_for_overfull_remainder() {
        let mut s = interval();
        s.remaining_seconds = 9999;
        assert_eq!(s.elapsed_active_seconds(), 0);
    }

    #[test]
    fn interval_started_once_any_focus_time_spent() {
        let mut s = interval();
        assert!(!s.has_interval_started());
        s.remaining_seconds = 1499;
        assert!(s.has_interval_started());
    }

    #[test]
    fn interval_started_when_resting_or_past_set_one() {
        let mut s = interval();
        s.phase = Phase::Rest;
        assert!(s.has_interval_started());

        let mut s = interval();
        s.current_set = 2;
        assert!(s.has_interval_started());
    }

    #[test]
    fn config_editable_only_before_the_cycle_begins() {
        let mut s = interval();
        assert!(s.can_edit_config());
        s.is_running = true;
        assert!(!s.can_edit_config());
        s.is_running = false;
        s.remaining_seconds = 1499;
        assert!(!s.can_edit_config());

        let mut s = interval();
        s.mode = TimerMode::Stopwatch;
        assert!(!s.can_edit_config());
    }

    #[test]
    fn remaining_ratio_guards_and_clamps() {
        let mut s = interval();
        assert_eq!(s.remaining_ratio(), 1.0);
        s.remaining_seconds = 750;
        assert_eq!(s.remaining_ratio(), 0.5);
        s.active_minutes = 0;
        assert_eq!(s.remaining_ratio(), 0.0);
        s.mode = TimerMode::Manual;
        assert_eq!(s.remaining_ratio(), 0.0);
    }

    #[test]
    fn clamp_to_step_rounds_then_clamps() {
        let bounds = Bounds::new(5, 60);
        assert_eq!(clamp_to_step(27.0, 5, bounds), 25);
        assert_eq!(clamp_to_step(28.0, 5, bounds), 30);
        assert_eq!(clamp_to_step(2.0, 5, bounds), 5);
        assert_eq!(clamp_to_step(200.0, 5, bounds), 60);
        assert_eq!(clamp_to_step(f64::NAN, 5, bounds), 5);
    }

    #[test]
    fn step_adjust_moves_off_grid_values() {
        let bounds = Bounds::new(5, 60);
        // 27 sits between steps: one step down lands on 20, one step up on 35
        assert_eq!(adjust_minutes_by_step(27, -1, 5, bounds), 20);
        assert_eq!(adjust_minutes_by_step(27, 1, 5, bounds), 35);
        // on-grid values move a full step
        assert_eq!(adjust_minutes_by_step(25, -1, 5, bounds), 20);
        assert_eq!(adjust_minutes_by_step(25, 1, 5, bounds), 30);
        // clamped at the edges
        assert_eq!(adjust_minutes_by_step(5, -3, 5, bounds), 5);
        assert_eq!(adjust_minutes_by_step(60, 2, 5, bounds), 60);
    }
}

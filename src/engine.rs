use crate::snapshot::{Phase, TimerMode, TimerRanges, TimerSnapshot};
use crate::values::{floor_non_negative, minutes_to_seconds};

// transition engine //
// Every transition is pure: it takes the current snapshot (plus the caller's
// wall-clock time where relevant) and returns a replacement snapshot. The
// host supplies `now_ms`, so there is no clock to mock in tests.

/// Seconds of wall-clock time between an anchor and now, floored, never
/// negative (a clock that moved backwards reads as zero elapsed).
fn wall_seconds_since(anchor_ms: i64, now_ms: i64) -> u32 {
    let diff_ms = now_ms.saturating_sub(anchor_ms).max(0);
    u32::try_from(diff_ms / 1000).unwrap_or(u32::MAX)
}

impl TimerSnapshot {
    /// Begin (or resume) running at `now_ms`.
    ///
    /// The anchor is pulled backward by any time already on the clock, so a
    /// later tick computes elapsed time from the anchor alone. No-op while
    /// already running and in manual mode, which has no running concept.
    pub fn start(&self, now_ms: i64) -> Self {
        if self.is_running || self.mode == TimerMode::Manual {
            return self.clone();
        }
        let mut next = self.clone();
        let already_elapsed = match self.mode {
            TimerMode::Stopwatch => self.elapsed_seconds,
            // guard at 0 in case the stored remainder is stale and over-full
            TimerMode::Interval => self
                .phase_total_seconds()
                .saturating_sub(self.remaining_seconds.min(self.phase_total_seconds())),
            TimerMode::Manual => unreachable!(),
        };
        next.anchor_epoch_ms = Some(now_ms.saturating_sub(i64::from(already_elapsed) * 1000));
        next.is_running = true;
        next
    }

    /// Stop the clock. Idempotent; counters keep their last ticked values.
    pub fn stop(&self) -> Self {
        if !self.is_running {
            return self.clone();
        }
        let mut next = self.clone();
        next.is_running = false;
        next.anchor_epoch_ms = None;
        next
    }

    /// Stop and zero the live counters for the current mode.
    pub fn reset(&self) -> Self {
        let mut next = self.stop();
        match next.mode {
            TimerMode::Stopwatch => next.elapsed_seconds = 0,
            TimerMode::Interval => {
                next.phase = Phase::Active;
                next.current_set = 1;
                next.remaining_seconds = minutes_to_seconds(f64::from(next.active_minutes));
            }
            TimerMode::Manual => {
                next.manual_hours = 0;
                next.manual_minutes = 0;
            }
        }
        next
    }

    /// Switch mode. Always stops; the interval cycle and stopwatch both go
    /// back to their starting positions.
    pub fn set_mode(&self, mode: TimerMode) -> Self {
        let mut next = self.stop();
        next.mode = mode;
        next.elapsed_seconds = 0;
        next.phase = Phase::Active;
        next.current_set = 1;
        if mode == TimerMode::Interval {
            next.remaining_seconds = minutes_to_seconds(f64::from(next.active_minutes));
        }
        next
    }

    /// Change the focus-phase length. Stops and rewinds the cycle; the
    /// remainder is refilled from the new length.
    pub fn set_active_minutes(&self, minutes: f64) -> Self {
        let mut next = self.stop();
        next.active_minutes = floor_non_negative(minutes);
        next.phase = Phase::Active;
        next.current_set = 1;
        next.remaining_seconds = minutes_to_seconds(f64::from(next.active_minutes));
        next
    }

    /// Change the break-phase length. Stops and rewinds the cycle; the
    /// visible remainder still comes from the active length.
    pub fn set_rest_minutes(&self, minutes: f64) -> Self {
        let mut next = self.stop();
        next.rest_minutes = floor_non_negative(minutes);
        next.phase = Phase::Active;
        next.current_set = 1;
        next.remaining_seconds = minutes_to_seconds(f64::from(next.active_minutes));
        next
    }

    /// Change the number of sets, keeping `current_set` in `[1, n]`.
    pub fn set_total_sets(&self, sets: u32, ranges: &TimerRanges) -> Self {
        let mut next = self.clone();
        next.total_sets = ranges.sets.clamp(sets);
        next.current_set = next.current_set.max(1).min(next.total_sets);
        next
    }

    pub fn set_manual_hours(&self, hours: u32, ranges: &TimerRanges) -> Self {
        let mut next = self.clone();
        next.manual_hours = ranges.manual_hours.clamp(hours);
        next
    }

    pub fn set_manual_minutes(&self, minutes: u32, ranges: &TimerRanges) -> Self {
        let mut next = self.clone();
        next.manual_minutes = ranges.manual_minutes.clamp(minutes);
        next
    }

    /// Replace the opaque subject label. Not interpreted by the engine.
    pub fn set_subject(&self, subject: &str) -> Self {
        let mut next = self.clone();
        next.selected_subject = subject.to_string();
        next
    }

    /// Periodic re-evaluation against the wall clock.
    ///
    /// A stopwatch recomputes its elapsed total from the anchor. An interval
    /// timer recomputes its remainder; at a phase boundary it stops itself,
    /// swaps phase, and refills the new phase's duration — phase transitions
    /// never auto-chain, a fresh `start` is required. Completing a rest
    /// advances the set counter (clamped at the total); completing an active
    /// phase does not, the set only advances after its paired rest.
    pub fn tick(&self, now_ms: i64) -> Self {
        let anchor = match self.anchor_epoch_ms {
            Some(anchor) if self.is_running => anchor,
            _ => return self.clone(),
        };
        let mut next = self.clone();
        match self.mode {
            TimerMode::Manual => {}
            TimerMode::Stopwatch => {
                next.elapsed_seconds = wall_seconds_since(anchor, now_ms);
            }
            TimerMode::Interval => {
                let total = self.phase_total_seconds();
                let remaining = total.saturating_sub(wall_seconds_since(anchor, now_ms));
                if remaining > 0 {
                    next.remaining_seconds = remaining;
                } else {
                    let finished = next.phase;
                    next.is_running = false;
                    next.anchor_epoch_ms = None;
                    next.phase = finished.next();
                    next.remaining_seconds = next.phase_total_seconds();
                    if finished == Phase::Rest {
                        next.current_set = (next.current_set + 1).min(next.total_sets);
                    }
                }
            }
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{TimerDefaults, TimerRanges};

    fn initial() -> TimerSnapshot {
        TimerSnapshot::initial(&TimerDefaults::default(), &TimerRanges::default())
    }

    fn stopwatch() -> TimerSnapshot {
        initial().set_mode(TimerMode::Stopwatch)
    }

    #[test]
    fn stop_is_idempotent() {
        let running = initial().start(1_000);
        let once = running.stop();
        assert_eq!(once.stop(), once);
        assert!(!once.is_running);
        assert_eq!(once.anchor_epoch_ms, None);
    }

    #[test]
    fn start_is_a_noop_while_running_or_in_manual_mode() {
        let running = initial().start(5_000);
        assert_eq!(running.start(9_000), running);

        let manual = initial().set_mode(TimerMode::Manual).start(5_000);
        assert!(!manual.is_running);
        assert_eq!(manual.anchor_epoch_ms, None);
    }

    #[test]
    fn stopwatch_elapsed_survives_a_stop_start_cycle() {
        let s = stopwatch().start(0).tick(30_000).stop();
        assert_eq!(s.elapsed_seconds, 30);
        // resume much later; accumulation continues seamlessly
        let s = s.start(1_000_000).tick(1_045_000);
        assert_eq!(s.elapsed_seconds, 75);
        assert!(s.is_running);
    }

    #[test]
    fn tick_without_running_is_a_noop() {
        let s = initial();
        assert_eq!(s.tick(123_456), s);
    }

    #[test]
    fn interval_phase_boundary_stops_and_swaps() {
        let defaults = TimerDefaults {
            active_minutes: 1,
            ..TimerDefaults::default()
        };
        let s = TimerSnapshot::initial(&defaults, &TimerRanges::default());
        let s = s.start(0).tick(60_000);
        assert!(!s.is_running);
        assert_eq!(s.anchor_epoch_ms, None);
        assert_eq!(s.phase, Phase::Rest);
        assert_eq!(s.remaining_seconds, 300);
        assert_eq!(s.current_set, 1);
    }

    #[test]
    fn set_advances_only_after_rest_completes() {
        // full 25/5 two-set walkthrough at exact boundaries
        let s = initial();
        assert_eq!(s.remaining_seconds, 1500);

        let s = s.start(0).tick(1_500_000);
        assert!(!s.is_running);
        assert_eq!(s.phase, Phase::Rest);
        assert_eq!(s.remaining_seconds, 300);
        assert_eq!(s.current_set, 1);

        let s = s.start(1_500_000).tick(1_800_000);
        assert!(!s.is_running);
        assert_eq!(s.phase, Phase::Active);
        assert_eq!(s.remaining_seconds, 1500);
        assert_eq!(s.current_set, 2);
    }

    #[test]
    fn set_counter_clamps_at_total() {
        let mut s = initial();
        s.current_set = 2;
        s.phase = Phase::Rest;
        s.remaining_seconds = 300;
        let s = s.start(0).tick(300_000);
        assert_eq!(s.current_set, 2);
        assert_eq!(s.phase, Phase::Active);
    }

    #[test]
    fn mid_phase_tick_keeps_running() {
        let s = initial().start(0).tick(90_000);
        assert!(s.is_running);
        assert_eq!(s.remaining_seconds, 1410);
        assert_eq!(s.phase, Phase::Active);
    }

    #[test]
    fn resuming_a_partial_phase_anchors_backward() {
        let s = initial().start(0).tick(600_000).stop();
        assert_eq!(s.remaining_seconds, 900);
        // restart 1h later: ten minutes are already spent
        let s = s.start(4_200_000);
        assert_eq!(s.anchor_epoch_ms, Some(4_200_000 - 600_000));
        let s = s.tick(4_260_000);
        assert_eq!(s.remaining_seconds, 840);
    }

    #[test]
    fn backwards_clock_reads_as_zero_elapsed() {
        let s = stopwatch().start(100_000).tick(40_000);
        assert_eq!(s.elapsed_seconds, 0);
        assert!(s.is_running);
    }

    #[test]
    fn reset_zeroes_the_live_counters() {
        let s = stopwatch().start(0).tick(42_000).reset();
        assert_eq!(s.elapsed_seconds, 0);
        assert!(!s.is_running);

        let s = initial().start(0).tick(60_000).reset();
        assert_eq!(s.remaining_seconds, 1500);
        assert_eq!(s.phase, Phase::Active);
        assert_eq!(s.current_set, 1);

        let ranges = TimerRanges::default();
        let s = initial()
            .set_mode(TimerMode::Manual)
            .set_manual_hours(2, &ranges)
            .set_manual_minutes(30, &ranges)
            .reset();
        assert_eq!((s.manual_hours, s.manual_minutes), (0, 0));
    }

    #[test]
    fn mode_change_stops_and_rewinds() {
        let s = initial().start(0).tick(90_000).set_mode(TimerMode::Stopwatch);
        assert!(!s.is_running);
        assert_eq!(s.elapsed_seconds, 0);
        assert_eq!(s.current_set, 1);

        let back = s.set_mode(TimerMode::Interval);
        assert_eq!(back.remaining_seconds, 1500);
        assert_eq!(back.phase, Phase::Active);
    }

    #[test]
    fn changing_phase_lengths_rewinds_the_cycle() {
        let s = initial().start(0).tick(90_000).set_active_minutes(30.0);
        assert!(!s.is_running);
        assert_eq!(s.active_minutes, 30);
        assert_eq!(s.remaining_seconds, 1800);
        assert_eq!(s.current_set, 1);

        let s = s.set_rest_minutes(10.5);
        assert_eq!(s.rest_minutes, 10);
        // the visible remainder still reflects the active length
        assert_eq!(s.remaining_seconds, 1800);
    }

    #[test]
    fn shrinking_total_sets_pulls_current_set_back() {
        let ranges = TimerRanges::default();
        let mut s = initial().set_total_sets(6, &ranges);
        s.current_set = 5;
        let s = s.set_total_sets(3, &ranges);
        assert_eq!(s.total_sets, 3);
        assert_eq!(s.current_set, 3);
    }

    #[test]
    fn manual_setters_clamp_into_range() {
        let ranges = TimerRanges::default();
        let s = initial().set_mode(TimerMode::Manual);
        assert_eq!(s.set_manual_hours(99, &ranges).manual_hours, 23);
        assert_eq!(s.set_manual_minutes(75, &ranges).manual_minutes, 59);
    }

    #[test]
    fn config_edit_gate_closes_after_start_and_after_progress() {
        let s = initial();
        assert!(s.can_edit_config());
        let running = s.start(0);
        assert!(!running.can_edit_config());
        let progressed = running.tick(1_000).stop();
        assert!(!progressed.can_edit_config());
    }
}

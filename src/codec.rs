use serde::Serialize;
use serde_json::Value;

use crate::snapshot::{Bounds, Phase, TimerDefaults, TimerMode, TimerRanges, TimerSnapshot};
use crate::values::clamp_int;

// persistence codec //
// `serialize` produces the storage-shaped projection; `rehydrate` turns a
// possibly-stale, possibly-malformed stored value back into a valid,
// time-corrected snapshot. Rehydration is total: any invalid field silently
// falls back to its initial-snapshot value, so old or corrupted storage can
// never surface an error.

/// The storage projection of a snapshot. Field names match what the web
/// client historically wrote to local storage.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredTimer {
    pub mode: &'static str,
    pub is_running: bool,
    pub selected_subject: String,
    pub phase: &'static str,
    pub active_minutes: u32,
    pub rest_minutes: u32,
    pub total_sets: u32,
    pub current_set: u32,
    pub remaining_seconds: u32,
    pub elapsed_seconds: u32,
    pub manual_hours: u32,
    pub manual_minutes: u32,
    pub anchor_epoch_ms: Option<i64>,
}

/// Project a snapshot into its storage shape. A stopped timer never persists
/// an anchor, stale or otherwise.
pub fn serialize(snapshot: &TimerSnapshot) -> StoredTimer {
    StoredTimer {
        mode: snapshot.mode.tag(),
        is_running: snapshot.is_running,
        selected_subject: snapshot.selected_subject.clone(),
        phase: snapshot.phase.tag(),
        active_minutes: snapshot.active_minutes,
        rest_minutes: snapshot.rest_minutes,
        total_sets: snapshot.total_sets,
        current_set: snapshot.current_set,
        remaining_seconds: snapshot.remaining_seconds,
        elapsed_seconds: snapshot.elapsed_seconds,
        manual_hours: snapshot.manual_hours,
        manual_minutes: snapshot.manual_minutes,
        anchor_epoch_ms: if snapshot.is_running {
            snapshot.anchor_epoch_ms
        } else {
            None
        },
    }
}

fn number(raw: &serde_json::Map<String, Value>, key: &str) -> Option<f64> {
    raw.get(key).and_then(Value::as_f64).filter(|n| n.is_finite())
}

/// A stored numeric field: floored, accepted only inside `bounds`, otherwise
/// the fallback.
fn bounded(raw: &serde_json::Map<String, Value>, key: &str, bounds: Bounds, fallback: u32) -> u32 {
    match number(raw, key) {
        Some(n) => {
            let floored = clamp_int(n.floor(), 0, i64::from(u32::MAX)) as u32;
            if bounds.contains(floored) {
                floored
            } else {
                fallback
            }
        }
        None => fallback,
    }
}

/// Rebuild a valid snapshot from untrusted stored data.
///
/// Field-by-field validation with fallback to `TimerSnapshot::initial`; no
/// version tag, which keeps the codec forward-compatible with older stored
/// shapes. If the stored state was running with a usable anchor, the live
/// counter is recomputed from the wall clock rather than trusted as stored.
pub fn rehydrate(
    raw: Option<&Value>,
    now_ms: i64,
    defaults: &TimerDefaults,
    ranges: &TimerRanges,
) -> TimerSnapshot {
    let base = TimerSnapshot::initial(defaults, ranges);
    let raw = match raw.and_then(Value::as_object) {
        Some(map) => map,
        None => return base,
    };

    let mut snapshot = base.clone();

    snapshot.mode = raw
        .get("mode")
        .and_then(Value::as_str)
        .and_then(TimerMode::from_tag)
        .unwrap_or(defaults.mode);
    snapshot.phase = raw
        .get("phase")
        .and_then(Value::as_str)
        .and_then(Phase::from_tag)
        .unwrap_or(Phase::Active);
    if let Some(Value::String(subject)) = raw.get("selectedSubject") {
        snapshot.selected_subject = subject.clone();
    }

    snapshot.active_minutes = bounded(raw, "activeMinutes", ranges.active_minutes, base.active_minutes);
    snapshot.rest_minutes = bounded(raw, "restMinutes", ranges.rest_minutes, base.rest_minutes);
    snapshot.total_sets = bounded(raw, "totalSets", ranges.sets, base.total_sets);
    snapshot.current_set = match number(raw, "currentSet") {
        Some(n) => clamp_int(n.floor(), 1, i64::from(snapshot.total_sets)) as u32,
        None => 1,
    };
    snapshot.manual_hours = bounded(raw, "manualHours", ranges.manual_hours, 0);
    snapshot.manual_minutes = bounded(raw, "manualMinutes", ranges.manual_minutes, 0);

    // the remainder may never exceed the phase it belongs to
    let phase_total = snapshot.phase_total_seconds();
    snapshot.remaining_seconds = match number(raw, "remainingSeconds") {
        Some(n) if n >= 0.0 => (clamp_int(n.floor(), 0, i64::from(u32::MAX)) as u32).min(phase_total),
        _ => phase_total,
    };
    snapshot.elapsed_seconds = match number(raw, "elapsedSeconds") {
        Some(n) if n >= 0.0 => clamp_int(n.floor(), 0, i64::from(u32::MAX)) as u32,
        _ => 0,
    };

    // only the literal boolean true counts as running
    let was_running = matches!(raw.get("isRunning"), Some(Value::Bool(true)));
    let anchor = number(raw, "anchorEpochMs")
        .filter(|n| *n >= 0.0)
        .map(|n| n as i64);

    snapshot.is_running = false;
    snapshot.anchor_epoch_ms = None;

    let anchor_ms = match anchor {
        Some(anchor_ms) if was_running => anchor_ms,
        _ => return snapshot,
    };

    match snapshot.mode {
        // manual entry has no running concept; drop the stale run state
        TimerMode::Manual => snapshot,
        TimerMode::Stopwatch => {
            let diff_ms = now_ms.saturating_sub(anchor_ms).max(0);
            snapshot.elapsed_seconds = u32::try_from(diff_ms / 1000).unwrap_or(u32::MAX);
            // re-anchor and keep running
            snapshot.start(now_ms)
        }
        TimerMode::Interval => {
            // The stored remainder is the baseline for this resumption: the
            // phase was already partway through when last persisted, so its
            // effective total here is the stored value, not the configured
            // phase length.
            let baseline = snapshot.remaining_seconds;
            let elapsed = u32::try_from(now_ms.saturating_sub(anchor_ms).max(0) / 1000)
                .unwrap_or(u32::MAX);
            let recomputed = baseline.saturating_sub(elapsed);
            if recomputed > 0 && recomputed <= baseline {
                snapshot.remaining_seconds = recomputed;
                snapshot.start(now_ms)
            } else {
                // The phase expired during the suspension, possibly several
                // times over; advance exactly one boundary and await resume.
                let finished = snapshot.phase;
                snapshot.phase = finished.next();
                snapshot.remaining_seconds = snapshot.phase_total_seconds();
                if finished == Phase::Rest {
                    snapshot.current_set = (snapshot.current_set + 1).min(snapshot.total_sets);
                }
                snapshot
            }
        }
    }
}

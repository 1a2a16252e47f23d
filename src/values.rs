// pure numeric helpers //
// Everything here is total: no input, including NaN or the infinities,
// can produce a panic or a non-finite result.

/// Truncate `value` toward zero and clamp it into `[min, max]`.
/// `+Infinity` maps to `max`; `NaN` and `-Infinity` map to `min`.
pub fn clamp_int(value: f64, min: i64, max: i64) -> i64 {
    let truncated = if value.is_finite() {
        // `as` saturates at the i64 range, which the clamp below absorbs
        value.trunc() as i64
    } else if value == f64::INFINITY {
        max
    } else {
        min
    };
    truncated.max(min).min(max)
}

/// Move `current` by `delta_steps` whole units, staying inside `[min, max]`.
pub fn adjust_by_step(current: i64, delta_steps: i64, min: i64, max: i64) -> i64 {
    current.saturating_add(delta_steps).max(min).min(max)
}

/// Floor a possibly-fractional, possibly-garbage value to a non-negative
/// whole number. Negative and non-finite inputs map to 0.
pub fn floor_non_negative(value: f64) -> u32 {
    if !value.is_finite() || value < 0.0 {
        return 0;
    }
    // saturates at u32::MAX for absurdly large inputs
    value.floor() as u32
}

/// Convert a minute count to seconds, flooring fractional minutes.
pub fn minutes_to_seconds(minutes: f64) -> u32 {
    floor_non_negative(minutes).saturating_mul(60)
}

//! Percentage and averaging helpers.
//!
//! Every report percentage goes through [`percentage`], so the rounding and
//! zero-division policy lives in one place.

/// Integer percentage of `part` in `whole`, rounded half away from zero.
///
/// Returns 0 when `whole` is not positive and clamps the result to `[0, 100]`.
pub fn percentage(part: i64, whole: i64) -> i32 {
    if whole <= 0 || part <= 0 {
        return 0;
    }

    let value = (part as f64 / whole as f64 * 100.0).round();
    value.clamp(0.0, 100.0) as i32
}

/// Mean of `total` over `count` rounded to the nearest integer, 0 when `count` is 0.
pub fn rounded_mean(total: f64, count: usize) -> i64 {
    if count == 0 {
        return 0;
    }

    (total / count as f64).round() as i64
}

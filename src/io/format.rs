//! Fixed-column numeric formatting for geometry files.

use std::fmt::Write;

#[cfg(test)]
#[path = "format_tests.rs"]
mod format_tests;

/// Rounds a value to nine decimal places and normalizes the sign of zero.
///
/// Geometry files are compared byte-for-byte downstream, so `-0.0` must never
/// reach the formatter: rounding first and adding `0.0` afterwards folds both
/// signed zeros onto `0.0`.
#[must_use]
pub(crate) fn round_9dp(value: f64) -> f64 {
    (value * 1.0e9).round() / 1.0e9 + 0.0
}

/// Formats a value like C's `%17.9E`: nine fractional digits, an explicit
/// exponent sign, at least two exponent digits, right-justified to a width of
/// seventeen.
///
/// Rust's `{:E}` formatter pads neither the exponent nor the field, so the
/// exponent is re-rendered here.
#[must_use]
pub(crate) fn scientific_17_9(value: f64) -> String {
    let value = round_9dp(value);
    let rendered = format!("{value:.9e}");
    let (mantissa, exponent) = rendered
        .split_once('e')
        .expect("Unable to locate the exponent in a `{:e}`-formatted float.");
    let exponent = exponent
        .parse::<i32>()
        .expect("Unable to parse the exponent of a `{:e}`-formatted float.");
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{:>17}", format!("{mantissa}E{sign}{:02}", exponent.abs()))
}

/// Formats a coordinate triple as three space-separated `%17.9E` fields.
#[must_use]
pub(crate) fn triplet_17_9(triplet: &[f64; 3]) -> String {
    let mut line = String::with_capacity(3 * 18);
    for (index, value) in triplet.iter().enumerate() {
        if index > 0 {
            line.push(' ');
        }
        write!(line, "{}", scientific_17_9(*value))
            .expect("Unable to write a formatted float into a string.");
    }
    line
}

//! Pure numeric utilities used by the scoring pipeline.

/// Errors raised by the numeric helpers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HelperError {
    /// The normalization denominator was zero, negative, or not finite.
    #[error("normalization cap must be a positive finite number, got {max}")]
    InvalidCap {
        /// The rejected denominator.
        max: f64,
    },
}

/// Scale `value` by `max`, capping the result at 1.
///
/// Values below zero are passed through unchanged; readings are validated
/// for sign before they reach the scorer.
///
/// # Errors
///
/// Returns [`HelperError::InvalidCap`] when `max` is not a positive
/// finite number.
pub fn normalize(value: f64, max: f64) -> Result<f64, HelperError> {
    if !max.is_finite() || max <= 0.0 {
        return Err(HelperError::InvalidCap { max });
    }
    Ok((value / max).min(1.0))
}

/// Relative drop from `old` to `new`, in percent, rounded to 2 decimals.
///
/// A positive result means `new` is lower than `old`. Returns `0` when
/// `old` is zero, since the ratio is undefined there.
pub fn percentage_change(old: f64, new: f64) -> f64 {
    if old == 0.0 {
        return 0.0;
    }
    round2(((old - new) / old) * 100.0)
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

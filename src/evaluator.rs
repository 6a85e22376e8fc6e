//! Result evaluation: classify a measured value against its declared
//! normal range and compute where it sits within that range for display.
//!
//! Pure functions, no I/O. The range is taken literally — an inverted
//! range (`normal_min > normal_max`) is not reinterpreted, the raw
//! comparisons decide.

use serde::Serialize;

/// Classification of a measured value against its normal range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultFlag {
    Low,
    Normal,
    High,
    /// Some input was non-finite (NaN or infinity); no classification possible.
    Undetermined,
}

impl ResultFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Undetermined => "undetermined",
        }
    }

    pub fn is_outside_range(&self) -> bool {
        matches!(self, Self::Low | Self::High)
    }
}

/// Classify `value` against `[normal_min, normal_max]` (inclusive).
pub fn classify(value: f64, normal_min: f64, normal_max: f64) -> ResultFlag {
    if !value.is_finite() || !normal_min.is_finite() || !normal_max.is_finite() {
        return ResultFlag::Undetermined;
    }
    if value < normal_min {
        return ResultFlag::Low;
    }
    if value > normal_max {
        return ResultFlag::High;
    }
    ResultFlag::Normal
}

/// Linear position of `value` inside the range, clamped to `[0, 1]`.
///
/// `normal_min` maps to 0.0 and `normal_max` to 1.0. A degenerate range
/// (`normal_min == normal_max`) or any non-finite input pins to 0.5.
pub fn position_fraction(value: f64, normal_min: f64, normal_max: f64) -> f64 {
    if !value.is_finite()
        || !normal_min.is_finite()
        || !normal_max.is_finite()
        || normal_min == normal_max
    {
        return 0.5;
    }
    ((value - normal_min) / (normal_max - normal_min)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_partitions_the_number_line() {
        // lo <= hi: Low iff v < lo, High iff v > hi, Normal otherwise
        assert_eq!(classify(12.0, 13.5, 17.5), ResultFlag::Low);
        assert_eq!(classify(13.5, 13.5, 17.5), ResultFlag::Normal);
        assert_eq!(classify(15.0, 13.5, 17.5), ResultFlag::Normal);
        assert_eq!(classify(17.5, 13.5, 17.5), ResultFlag::Normal);
        assert_eq!(classify(17.6, 13.5, 17.5), ResultFlag::High);
    }

    #[test]
    fn classify_bounds_are_inclusive() {
        assert_eq!(classify(4.0, 4.0, 11.0), ResultFlag::Normal);
        assert_eq!(classify(11.0, 4.0, 11.0), ResultFlag::Normal);
    }

    #[test]
    fn classify_non_finite_inputs_are_undetermined() {
        assert_eq!(classify(f64::NAN, 1.0, 2.0), ResultFlag::Undetermined);
        assert_eq!(classify(1.5, f64::NAN, 2.0), ResultFlag::Undetermined);
        assert_eq!(classify(1.5, 1.0, f64::NAN), ResultFlag::Undetermined);
        assert_eq!(classify(f64::INFINITY, 1.0, 2.0), ResultFlag::Undetermined);
        assert_eq!(
            classify(1.5, f64::NEG_INFINITY, 2.0),
            ResultFlag::Undetermined
        );
    }

    #[test]
    fn classify_inverted_range_applies_literal_comparisons() {
        // min > max: every value is below min, above max, or both;
        // the first matching comparison wins, exactly as written.
        assert_eq!(classify(5.0, 10.0, 2.0), ResultFlag::Low);
        assert_eq!(classify(11.0, 10.0, 2.0), ResultFlag::High);
        assert_eq!(classify(1.0, 10.0, 2.0), ResultFlag::Low);
    }

    #[test]
    fn position_endpoints() {
        assert_eq!(position_fraction(13.5, 13.5, 17.5), 0.0);
        assert_eq!(position_fraction(17.5, 13.5, 17.5), 1.0);
    }

    #[test]
    fn position_interpolates_linearly() {
        let pos = position_fraction(15.5, 13.5, 17.5);
        assert!((pos - 0.5).abs() < 1e-9);
    }

    #[test]
    fn position_clamps_out_of_range_values() {
        assert_eq!(position_fraction(1.0, 13.5, 17.5), 0.0);
        assert_eq!(position_fraction(99.0, 13.5, 17.5), 1.0);
    }

    #[test]
    fn position_degenerate_range_pins_to_half() {
        assert_eq!(position_fraction(0.0, 5.0, 5.0), 0.5);
        assert_eq!(position_fraction(5.0, 5.0, 5.0), 0.5);
        assert_eq!(position_fraction(100.0, 5.0, 5.0), 0.5);
    }

    #[test]
    fn position_non_finite_pins_to_half() {
        assert_eq!(position_fraction(f64::NAN, 1.0, 2.0), 0.5);
        assert_eq!(position_fraction(1.5, f64::INFINITY, 2.0), 0.5);
    }

    #[test]
    fn classify_and_position_are_deterministic() {
        for _ in 0..3 {
            assert_eq!(classify(12.0, 13.5, 17.5), ResultFlag::Low);
            assert_eq!(position_fraction(12.0, 13.5, 17.5), 0.0);
        }
    }
}

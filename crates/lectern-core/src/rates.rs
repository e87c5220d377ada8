//! Percentage helpers for dashboards.
//!
//! A zero denominator yields `0.0` rather than an error or `NaN`.

/// `part / total * 100`, or `0.0` when `total` is zero.
pub fn percentage(part: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

/// Mean of the values, or `0.0` for an empty set.
pub fn mean<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Rounds to two decimal places for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_zero_total() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(5, 0), 0.0);
    }

    #[test]
    fn test_percentage_values() {
        assert_eq!(percentage(1, 4), 25.0);
        assert_eq!(percentage(3, 3), 100.0);
        assert!((percentage(1, 3) - 33.333).abs() < 0.01);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(Vec::<f64>::new()), 0.0);
        assert_eq!(mean([80.0, 90.0, 100.0]), 90.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(33.33333), 33.33);
        assert_eq!(round2(66.666), 66.67);
    }
}

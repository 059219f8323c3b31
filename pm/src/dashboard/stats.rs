//! Robust statistics for flagging unusual readings

/// Scale factor relating MAD to the standard deviation of a normal distribution
const MAD_SCALE: f64 = 0.6745;

/// Median of the values; `None` when empty
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Linear-interpolated percentile, `p` in [0, 100]
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Flag values whose modified z-score exceeds `threshold`.
///
/// With zero median absolute deviation nothing is flagged.
pub fn mad_outliers(values: &[f64], threshold: f64) -> Vec<bool> {
    let Some(center) = median(values) else {
        return Vec::new();
    };
    let deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    let mad = median(&deviations).unwrap_or(0.0);
    if mad == 0.0 {
        return vec![false; values.len()];
    }
    values
        .iter()
        .map(|v| (MAD_SCALE * (v - center) / mad).abs() > threshold)
        .collect()
}

/// Flag values at or beyond the `tail` and `100 - tail` percentiles of the non-outliers.
///
/// Outliers themselves can still be flagged. Fewer than two non-outliers flags nothing.
pub fn extremes(values: &[f64], outliers: &[bool], tail: f64) -> Vec<bool> {
    let inliers: Vec<f64> = values
        .iter()
        .zip(outliers)
        .filter(|(_, outlier)| !**outlier)
        .map(|(v, _)| *v)
        .collect();
    if inliers.len() < 2 {
        return vec![false; values.len()];
    }
    let (Some(low), Some(high)) = (percentile(&inliers, tail), percentile(&inliers, 100.0 - tail)) else {
        return vec![false; values.len()];
    };
    values.iter().map(|v| *v <= low || *v >= high).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 50.0), Some(3.0));
        assert_eq!(percentile(&values, 100.0), Some(5.0));
        // rank 0.2 between 1 and 2
        assert!((percentile(&values, 5.0).unwrap() - 1.2).abs() < 1e-9);
        assert!((percentile(&values, 95.0).unwrap() - 4.8).abs() < 1e-9);
    }

    #[test]
    fn test_mad_flags_spike() {
        let values = [10.0, 10.5, 11.0, 10.2, 10.8, 40.0];
        // median 10.65, MAD 0.4, z(40) = 0.6745 * 29.35 / 0.4 ≈ 49.5
        assert_eq!(mad_outliers(&values, 3.5), vec![false, false, false, false, false, true]);
    }

    #[test]
    fn test_zero_mad_flags_nothing() {
        assert_eq!(mad_outliers(&[5.0, 5.0, 5.0, 9.0], 3.5), vec![false; 4]);
        assert!(mad_outliers(&[], 3.5).is_empty());
    }

    #[test]
    fn test_extremes_among_inliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let outliers = [false, false, false, false, false, true];
        // P5 = 1.2, P95 = 4.8 over the inliers
        assert_eq!(extremes(&values, &outliers, 5.0), vec![true, false, false, false, true, true]);
    }

    #[test]
    fn test_extremes_need_two_inliers() {
        assert_eq!(extremes(&[1.0, 50.0], &[false, true], 5.0), vec![false, false]);
    }
}

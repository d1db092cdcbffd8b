//! Z-score based outlier detection.

use arrow::array::{Array, BooleanArray, Float64Array};
use tracing::debug;

use super::reduce::numeric_slots;
use super::stats::population_variance;
use crate::error::{KernelError, Result};

/// Per-element z-scores and the mask of elements at or beyond the threshold.
#[derive(Debug, Clone)]
pub struct AnomalyResult {
    /// True where `|z| >= threshold`; null where the input is null.
    pub mask: BooleanArray,
    /// `(x - mean) / stddev` using the population standard deviation.
    pub z_scores: Float64Array,
}

impl AnomalyResult {
    /// Number of flagged elements.
    #[must_use]
    pub fn anomaly_count(&self) -> usize {
        self.mask.true_count()
    }
}

/// Flags elements whose absolute z-score is at least `threshold`.
///
/// A column without spread gets a z-score of 0 everywhere.
///
/// # Errors
///
/// Returns [`KernelError::InvalidArgument`] for a NaN threshold and
/// [`KernelError::NotImplemented`] for non-numeric columns.
pub fn detect_anomalies(column: &dyn Array, threshold: f64) -> Result<AnomalyResult> {
    if threshold.is_nan() {
        return Err(KernelError::InvalidArgument(
            "anomaly threshold must be a number".into(),
        ));
    }
    let slots = numeric_slots(column, "detect_anomalies")?;
    let present: Vec<f64> = slots.iter().flatten().copied().collect();

    let (mean, std_dev) = if present.is_empty() {
        (0.0, 0.0)
    } else {
        let mean = present.iter().sum::<f64>() / present.len() as f64;
        (mean, population_variance(&present).sqrt())
    };

    let z_scores: Float64Array = slots
        .iter()
        .map(|slot| slot.map(|x| if std_dev == 0.0 { 0.0 } else { (x - mean) / std_dev }))
        .collect();
    let mask: BooleanArray = z_scores
        .iter()
        .map(|z| z.map(|z| z.abs() >= threshold))
        .collect();

    let result = AnomalyResult { mask, z_scores };
    debug!(
        rows = column.len(),
        mean,
        std_dev,
        threshold,
        anomalies = result.anomaly_count(),
        "detect_anomalies"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int64Array, StringArray};

    #[test]
    fn test_detects_outlier() {
        let values = Float64Array::from(vec![10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 50.0]);
        let result = detect_anomalies(&values, 2.0).unwrap();
        assert_eq!(result.anomaly_count(), 1);
        assert!(result.mask.value(7));
        assert!(result.z_scores.value(7) > 2.0);
    }

    #[test]
    fn test_nulls_propagate() {
        let values = Int64Array::from(vec![Some(1), None, Some(3)]);
        let result = detect_anomalies(&values, 0.5).unwrap();
        assert!(result.mask.is_null(1));
        assert!(result.z_scores.is_null(1));
        assert!((result.z_scores.value(0) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_column_has_zero_scores() {
        let values = Float64Array::from(vec![4.0, 4.0, 4.0]);
        let result = detect_anomalies(&values, 1.0).unwrap();
        assert_eq!(result.anomaly_count(), 0);
        assert_eq!(result.z_scores.values().to_vec(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_rejects_non_numeric() {
        let values = StringArray::from(vec!["x"]);
        assert!(matches!(
            detect_anomalies(&values, 1.0).unwrap_err(),
            KernelError::NotImplemented { .. }
        ));
    }
}

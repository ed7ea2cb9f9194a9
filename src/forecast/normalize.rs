use crate::forecast::errors::{ForecastError, ForecastResult};

/// A series min-max scaled into [0, 1], together with the bounds needed to
/// reverse the mapping. Owned by a single training/forecast session.
#[derive(Debug, Clone)]
pub struct NormalizedSeries {
    pub values: Vec<f64>,
    pub min: f64,
    pub max: f64,
}

impl NormalizedSeries {
    /// Scale `values` to [0, 1] via `x -> (x - min) / (max - min)`.
    ///
    /// Fails with [`ForecastError::DegenerateSeries`] when every value is
    /// identical (the mapping is undefined for a constant price).
    pub fn fit(values: &[f64]) -> ForecastResult<Self> {
        if values.is_empty() {
            return Err(ForecastError::InsufficientData {
                required: 2,
                actual: 0,
            });
        }

        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if max == min {
            return Err(ForecastError::DegenerateSeries {
                len: values.len(),
                value: min,
            });
        }

        let range = max - min;
        let normalized = values.iter().map(|&x| (x - min) / range).collect();

        Ok(Self {
            values: normalized,
            min,
            max,
        })
    }

    pub fn denormalize(&self, value: f64) -> f64 {
        denormalize(value, self.min, self.max)
    }
}

/// Exact algebraic inverse of the min-max mapping: `v -> v * (max - min) + min`.
pub fn denormalize(value: f64, min: f64, max: f64) -> f64 {
    value * (max - min) + min
}

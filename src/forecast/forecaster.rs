use chrono::NaiveDate;

use crate::data::models::ForecastPoint;
use crate::forecast::errors::{ForecastError, ForecastResult};
use crate::forecast::model::TrainedModel;
use crate::forecast::normalize::denormalize;

/// One-step-ahead predictor over a fixed-length window.
///
/// The seam between the sliding-window mechanics below and the underlying
/// network, so the mechanics can be exercised with a model double.
pub trait NextStepModel {
    /// Window length the model expects
    fn lookback(&self) -> usize;

    /// Predict the next normalized value from a window of `lookback()` values
    fn predict_next(&self, window: &[f64]) -> f64;
}

impl NextStepModel for TrainedModel {
    fn lookback(&self) -> usize {
        TrainedModel::lookback(self)
    }

    fn predict_next(&self, window: &[f64]) -> f64 {
        self.predict_window(window)
    }
}

/// Autoregressive multi-step forecast.
///
/// Seeds a sliding window with the last `lookback` values of the normalized
/// `seed` series, then for each of `horizon` steps predicts one value,
/// denormalizes it into a [`ForecastPoint`] dated one day after the previous
/// point, and slides the window by dropping its oldest element and appending
/// the normalized prediction, so every step is conditioned on prior
/// predictions rather than ground truth. Deterministic for fixed model
/// parameters.
pub fn forecast<M: NextStepModel>(
    model: &M,
    seed: &[f64],
    min: f64,
    max: f64,
    last_date: NaiveDate,
    horizon: usize,
) -> ForecastResult<Vec<ForecastPoint>> {
    let lookback = model.lookback();
    if seed.len() < lookback {
        return Err(ForecastError::EmptySeed {
            required: lookback,
            actual: seed.len(),
        });
    }

    let mut window: Vec<f64> = seed[seed.len() - lookback..].to_vec();
    let mut points = Vec::with_capacity(horizon);
    let mut date = last_date;

    for _ in 0..horizon {
        let predicted = model.predict_next(&window);
        date = date + chrono::Duration::days(1);
        points.push(ForecastPoint {
            date,
            value: denormalize(predicted, min, max),
        });

        window.remove(0);
        window.push(predicted);
    }

    tracing::debug!(
        "Forecast of {} points from {} seed values",
        points.len(),
        seed.len()
    );

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Double that predicts the mean of its window
    struct MeanModel {
        lookback: usize,
    }

    impl NextStepModel for MeanModel {
        fn lookback(&self) -> usize {
            self.lookback
        }

        fn predict_next(&self, window: &[f64]) -> f64 {
            window.iter().sum::<f64>() / window.len() as f64
        }
    }

    /// Double that always predicts the same normalized value
    struct ConstModel(f64);

    impl NextStepModel for ConstModel {
        fn lookback(&self) -> usize {
            2
        }

        fn predict_next(&self, _window: &[f64]) -> f64 {
            self.0
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn test_sliding_window_feeds_predictions_back() {
        let model = MeanModel { lookback: 3 };
        let seed = [10.0, 12.0, 11.0, 13.0, 12.0];

        // Identity normalization so the raw mechanics are visible:
        // window [11,13,12] -> 12, slide to [13,12,12] -> 12.333...
        let points = forecast(&model, &seed, 0.0, 1.0, day(1), 2).unwrap();

        assert_eq!(points.len(), 2);
        assert!((points[0].value - 12.0).abs() < 1e-9);
        assert!(
            (points[1].value - 37.0 / 3.0).abs() < 1e-9,
            "Second step should condition on the first prediction, got {}",
            points[1].value
        );
    }

    #[test]
    fn test_horizon_length_and_derived_dates() {
        let model = MeanModel { lookback: 2 };
        let points = forecast(&model, &[0.2, 0.4, 0.6], 0.0, 1.0, day(10), 5).unwrap();

        assert_eq!(points.len(), 5);
        assert_eq!(points[0].date, day(11));
        for pair in points.windows(2) {
            assert_eq!(
                pair[1].date,
                pair[0].date + chrono::Duration::days(1),
                "Dates must increase by exactly one day"
            );
        }
    }

    #[test]
    fn test_predictions_are_denormalized() {
        let model = ConstModel(0.5);
        let points = forecast(&model, &[0.0, 1.0], 100.0, 200.0, day(1), 3).unwrap();
        for p in &points {
            assert_eq!(p.value, 150.0);
        }
    }

    #[test]
    fn test_short_seed_rejected() {
        let model = MeanModel { lookback: 3 };
        match forecast(&model, &[0.1, 0.2], 0.0, 1.0, day(1), 2) {
            Err(ForecastError::EmptySeed { required, actual }) => {
                assert_eq!(required, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("Expected EmptySeed, got {:?}", other),
        }
    }
}

pub mod dataset;
pub mod errors;
pub mod forecaster;
pub mod model;
pub mod normalize;
pub mod training;

use burn::backend::{Autodiff, NdArray};

use crate::config::ForecastConfig;
use crate::data::models::{close_prices, ForecastOutcome, PricePoint};
use crate::forecast::errors::ForecastResult;
use crate::forecast::normalize::NormalizedSeries;
use crate::forecast::training::{TrainingSession, TrainingUpdate};

/// Training backend: CPU NdArray with autodiff
pub type TrainBackend = Autodiff<NdArray>;

/// Inference backend used by trained models
pub type InferenceBackend = NdArray;

/// Train on `history` and forecast `prediction_days` steps past its end.
///
/// Runs one full session: fit on the last `training_days` points (reporting
/// progress through `on_progress`), seed the forecaster with the normalized
/// training tail, and join the predictions with the original series for
/// display. For cancellation support, drive a
/// [`TrainingSession`] directly instead.
pub fn train_and_forecast(
    history: &[PricePoint],
    config: &ForecastConfig,
    on_progress: impl FnMut(TrainingUpdate),
) -> ForecastResult<ForecastOutcome> {
    let session = TrainingSession::new(config.clone())?;
    let model = session.train(history, on_progress)?;

    // train() verified there are at least training_days points
    let tail = &history[history.len() - config.training_days..];
    let seed = NormalizedSeries::fit(&close_prices(tail))?;
    let last_date = tail[tail.len() - 1].date;

    let predicted = forecaster::forecast(
        &model,
        &seed.values,
        seed.min,
        seed.max,
        last_date,
        config.prediction_days,
    )?;

    Ok(ForecastOutcome {
        history: history.to_vec(),
        predicted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_train_and_forecast_end_to_end() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let history: Vec<PricePoint> = (0..40)
            .map(|i| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                close: 50.0 + 5.0 * (i as f64 * 0.4).sin() + 0.2 * i as f64,
            })
            .collect();
        let config = ForecastConfig {
            epochs: 2,
            training_days: 35,
            prediction_days: 7,
            lookback_window: 5,
        };

        let mut updates = 0;
        let outcome = train_and_forecast(&history, &config, |_| updates += 1).unwrap();

        assert_eq!(updates, 2);
        assert_eq!(outcome.history.len(), 40);
        assert_eq!(outcome.predicted.len(), 7);
        assert_eq!(
            outcome.predicted[0].date,
            history.last().unwrap().date + chrono::Duration::days(1),
            "Forecast must start the day after the last historical point"
        );
        for p in &outcome.predicted {
            assert!(p.value.is_finite());
        }
    }
}

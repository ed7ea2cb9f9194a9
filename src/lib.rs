//! Price forecasting engine: trains a stacked-LSTM model on a close-price
//! history and produces an autoregressive multi-day forecast with live
//! progress reporting.

pub mod config;
pub mod data;
pub mod forecast;

pub use config::ForecastConfig;
pub use data::models::{ForecastOutcome, ForecastPoint, PricePoint};
pub use forecast::errors::{ForecastError, ForecastResult};
pub use forecast::forecaster::{forecast, NextStepModel};
pub use forecast::model::TrainedModel;
pub use forecast::normalize::{denormalize, NormalizedSeries};
pub use forecast::train_and_forecast;
pub use forecast::training::{CancellationToken, TrainingSession, TrainingUpdate};

use serde::{Deserialize, Serialize};

use crate::forecast::errors::{ForecastError, ForecastResult};

/// Recurrent layer width (two stacked layers of this size)
pub const HIDDEN_SIZE: usize = 50;
/// Dropout rate applied after each recurrent layer
pub const DROPOUT_RATE: f64 = 0.2;
/// Adam learning rate
pub const LEARNING_RATE: f64 = 1e-3;
/// Mini-batch size for the fit loop
pub const BATCH_SIZE: usize = 32;
/// Fraction of windows (the chronologically last ones) held out for validation
pub const VALIDATION_SPLIT: f64 = 0.1;
/// Shuffle seed for the training dataloader
pub const SHUFFLE_SEED: u64 = 42;

/// Accepted bounds for the user-editable settings
pub const EPOCHS_RANGE: (usize, usize) = (1, 50);
pub const TRAINING_DAYS_RANGE: (usize, usize) = (10, 500);
pub const PREDICTION_DAYS_RANGE: (usize, usize) = (1, 365);
pub const LOOKBACK_RANGE: (usize, usize) = (1, 50);

/// User-tunable forecast settings, typically sourced from a settings surface.
///
/// Must pass [`validate`](ForecastConfig::validate) before a training session
/// starts; [`TrainingSession::new`](crate::forecast::training::TrainingSession::new)
/// enforces this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Number of full passes over the training windows
    pub epochs: usize,
    /// How many trailing points of the supplied history to train on
    pub training_days: usize,
    /// Forecast horizon in days
    pub prediction_days: usize,
    /// Consecutive past points used as input to predict the next point
    pub lookback_window: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            training_days: 180,
            prediction_days: 30,
            lookback_window: 10,
        }
    }
}

impl ForecastConfig {
    /// Check every field against its accepted bounds and reject combinations
    /// that cannot yield a single training window.
    pub fn validate(&self) -> ForecastResult<()> {
        check_range("epochs", self.epochs, EPOCHS_RANGE)?;
        check_range("training_days", self.training_days, TRAINING_DAYS_RANGE)?;
        check_range("prediction_days", self.prediction_days, PREDICTION_DAYS_RANGE)?;
        check_range("lookback_window", self.lookback_window, LOOKBACK_RANGE)?;

        if self.training_days <= self.lookback_window {
            return Err(ForecastError::InvalidConfig {
                field: "training_days",
                reason: format!(
                    "must exceed lookback_window ({}), got {}",
                    self.lookback_window, self.training_days
                ),
            });
        }

        Ok(())
    }
}

fn check_range(field: &'static str, value: usize, (min, max): (usize, usize)) -> ForecastResult<()> {
    if value < min || value > max {
        return Err(ForecastError::InvalidConfig {
            field,
            reason: format!("must be in {min}..={max}, got {value}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ForecastConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_epochs_rejected() {
        let config = ForecastConfig {
            epochs: 0,
            ..ForecastConfig::default()
        };
        match config.validate() {
            Err(ForecastError::InvalidConfig { field, .. }) => assert_eq!(field, "epochs"),
            other => panic!("Expected InvalidConfig for epochs, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_horizon_rejected() {
        let config = ForecastConfig {
            prediction_days: 366,
            ..ForecastConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_training_days_must_exceed_lookback() {
        let config = ForecastConfig {
            training_days: 20,
            lookback_window: 20,
            ..ForecastConfig::default()
        };
        match config.validate() {
            Err(ForecastError::InvalidConfig { field, .. }) => {
                assert_eq!(field, "training_days");
            }
            other => panic!("Expected InvalidConfig, got {:?}", other),
        }
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use burn::{
    data::dataloader::{batcher::Batcher, DataLoader, DataLoaderBuilder},
    module::{AutodiffModule, Module},
    optim::{AdamConfig, GradientsParams, Optimizer},
    tensor::{backend::Backend, Tensor},
};

use crate::config::{self, ForecastConfig};
use crate::data::models::{close_prices, PricePoint};
use crate::forecast::dataset::{make_windows, WindowBatcher, WindowDataset};
use crate::forecast::errors::{ForecastError, ForecastResult};
use crate::forecast::model::{PricePredictionModelConfig, TrainedModel};
use crate::forecast::normalize::NormalizedSeries;
use crate::forecast::{InferenceBackend, TrainBackend};

/// Cooperative cancellation handle, honored at each epoch boundary.
///
/// Clones share one flag, so a token handed to another thread can stop a
/// running session; the session aborts with [`ForecastError::Cancelled`] and
/// releases everything it holds.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Progress snapshot emitted after each completed epoch.
#[derive(Debug, Clone)]
pub struct TrainingUpdate {
    pub epochs_completed: usize,
    pub total_epochs: usize,
    /// `100 * epochs_completed / total_epochs`; reaches exactly 100 on the
    /// final epoch
    pub percent_complete: f64,
    /// Estimated seconds remaining; `None` until the first epoch completes
    pub eta_seconds: Option<f64>,
    pub train_loss: f64,
    /// MSE over the held-out windows; `None` when the series is too short to
    /// carve out a validation split
    pub val_loss: Option<f64>,
}

/// One training run over one price series.
///
/// A session validates its settings up front, exclusively owns the model and
/// all transient buffers while `train` runs, and is consumed by it: starting
/// another run requires a new session.
pub struct TrainingSession {
    config: ForecastConfig,
    cancel: CancellationToken,
}

impl TrainingSession {
    pub fn new(config: ForecastConfig) -> ForecastResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cancel: CancellationToken::new(),
        })
    }

    /// Handle for requesting cancellation, e.g. when the consuming view is
    /// torn down mid-training.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Fit the model on the last `training_days` points of `series`.
    ///
    /// Runs `epochs` passes of Adam on MSE loss over batched sliding windows,
    /// invoking `on_progress` after every epoch with percent complete and an
    /// ETA estimate. Returns the fitted model on the inference backend; the
    /// windowed training tensors and the autodiff graph are released before
    /// returning, on the error paths too.
    pub fn train(
        self,
        series: &[PricePoint],
        mut on_progress: impl FnMut(TrainingUpdate),
    ) -> ForecastResult<TrainedModel> {
        let cfg = &self.config;
        if series.len() < cfg.training_days {
            return Err(ForecastError::InsufficientData {
                required: cfg.training_days,
                actual: series.len(),
            });
        }

        let tail = &series[series.len() - cfg.training_days..];
        let closes = close_prices(tail);
        let normalized = NormalizedSeries::fit(&closes)?;
        let windows = make_windows(&normalized.values, cfg.lookback_window)?;

        // Hold out the chronologically last 10% of windows for validation
        let val_count = (windows.len() as f64 * config::VALIDATION_SPLIT) as usize;
        let train_count = windows.len() - val_count;
        let train_windows = windows[..train_count].to_vec();
        let val_windows = &windows[train_count..];

        tracing::info!(
            "Starting training: {} windows ({} train / {} validation), {} epochs",
            windows.len(),
            train_count,
            val_count,
            cfg.epochs
        );

        let device = <TrainBackend as Backend>::Device::default();
        let batcher = WindowBatcher::<TrainBackend>::new(device.clone());
        let dataloader = DataLoaderBuilder::new(batcher)
            .batch_size(config::BATCH_SIZE)
            .shuffle(config::SHUFFLE_SEED)
            .build(WindowDataset {
                windows: train_windows,
            });

        // Validation tensors are built once, on the inference backend
        let val_device = <InferenceBackend as Backend>::Device::default();
        let val_batch = if val_windows.is_empty() {
            None
        } else {
            let val_batcher = WindowBatcher::<InferenceBackend>::new(val_device);
            Some(val_batcher.batch(val_windows.to_vec()))
        };

        let model_config = PricePredictionModelConfig {
            hidden_size: config::HIDDEN_SIZE,
            dropout: config::DROPOUT_RATE,
        };
        let mut model = model_config.init::<TrainBackend>(&device);
        tracing::debug!("Model initialized with {} parameters", model.num_params());

        let mut optim = AdamConfig::new().init();

        let start = Instant::now();
        for epoch in 0..cfg.epochs {
            if self.cancel.is_cancelled() {
                tracing::warn!("Training cancelled at epoch boundary {}", epoch);
                return Err(ForecastError::Cancelled { epoch });
            }

            let mut epoch_loss = 0.0;
            let mut batch_count = 0;

            for batch in dataloader.iter() {
                let output = model.forward(batch.inputs);
                let loss = mse_loss(output, batch.targets);

                let loss_values = loss.clone().into_data().to_vec::<f32>().unwrap_or_default();
                let loss_scalar = loss_values.first().copied().unwrap_or(f32::NAN) as f64;
                if !loss_scalar.is_finite() {
                    tracing::warn!("Non-finite batch loss at epoch {}, aborting", epoch);
                    return Err(ForecastError::TrainingDiverged { epoch });
                }

                let grads = loss.backward();
                let grads = GradientsParams::from_grads(grads, &model);
                model = optim.step(config::LEARNING_RATE, model, grads);

                epoch_loss += loss_scalar;
                batch_count += 1;
            }

            let train_loss = if batch_count > 0 {
                epoch_loss / batch_count as f64
            } else {
                f64::NAN
            };
            if !train_loss.is_finite() {
                tracing::warn!("Non-finite epoch loss at epoch {}, aborting", epoch);
                return Err(ForecastError::TrainingDiverged { epoch });
            }

            let val_loss = val_batch.as_ref().map(|batch| {
                let valid_model = model.valid();
                let output = valid_model.forward(batch.inputs.clone());
                let loss = mse_loss(output, batch.targets.clone());
                let values = loss.into_data().to_vec::<f32>().unwrap_or_default();
                values.first().copied().unwrap_or(f32::NAN) as f64
            });

            let epochs_completed = epoch + 1;
            let percent_complete = 100.0 * epochs_completed as f64 / cfg.epochs as f64;
            let elapsed = start.elapsed().as_secs_f64();
            let eta_seconds = (percent_complete > 0.0)
                .then(|| elapsed / percent_complete * (100.0 - percent_complete));

            tracing::debug!(
                "Epoch {}/{}: train loss {:.6}, val loss {:?}",
                epochs_completed,
                cfg.epochs,
                train_loss,
                val_loss
            );

            on_progress(TrainingUpdate {
                epochs_completed,
                total_epochs: cfg.epochs,
                percent_complete,
                eta_seconds,
                train_loss,
                val_loss,
            });
        }

        tracing::info!(
            "Training complete in {:.1}s",
            start.elapsed().as_secs_f64()
        );

        // Move the fitted parameters to the inference backend; the autodiff
        // graph and windowed tensors drop here.
        Ok(TrainedModel::new(model.valid(), cfg.lookback_window))
    }
}

/// Mean squared error loss
fn mse_loss<B: Backend>(predictions: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
    let diff = predictions - targets;
    let sq = diff.clone() * diff;
    sq.mean()
}

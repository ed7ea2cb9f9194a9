use burn::{
    data::{dataloader::batcher::Batcher, dataset::Dataset},
    tensor::{backend::Backend, Tensor},
};

use crate::forecast::errors::{ForecastError, ForecastResult};

/// A single supervised sample: `lookback` consecutive normalized closes and
/// the close that immediately follows them.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingWindow {
    pub input: Vec<f64>,
    pub target: f64,
}

/// Slice `values` into sliding windows ordered by target index.
///
/// Window `i` covers `values[i..i + lookback]` with target
/// `values[i + lookback]`, so a series of length N yields exactly
/// `N - lookback` windows. Chronological order is preserved; shuffling, if
/// any, happens at fit time.
pub fn make_windows(values: &[f64], lookback: usize) -> ForecastResult<Vec<TrainingWindow>> {
    if values.len() <= lookback {
        return Err(ForecastError::InsufficientData {
            required: lookback + 1,
            actual: values.len(),
        });
    }

    let mut windows = Vec::with_capacity(values.len() - lookback);
    for i in 0..values.len() - lookback {
        windows.push(TrainingWindow {
            input: values[i..i + lookback].to_vec(),
            target: values[i + lookback],
        });
    }

    Ok(windows)
}

/// Dataset of windowed training samples
#[derive(Debug, Clone)]
pub struct WindowDataset {
    pub windows: Vec<TrainingWindow>,
}

impl Dataset<TrainingWindow> for WindowDataset {
    fn get(&self, index: usize) -> Option<TrainingWindow> {
        self.windows.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.windows.len()
    }
}

/// Batcher that converts window slices into tensors for training
#[derive(Clone, Debug)]
pub struct WindowBatcher<B: Backend> {
    device: B::Device,
}

impl<B: Backend> WindowBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

/// Batched data for one fit step
#[derive(Debug, Clone)]
pub struct WindowBatch<B: Backend> {
    pub inputs: Tensor<B, 3>,  // [batch_size, lookback, 1]
    pub targets: Tensor<B, 2>, // [batch_size, 1]
}

impl<B: Backend> Batcher<TrainingWindow, WindowBatch<B>> for WindowBatcher<B> {
    fn batch(&self, items: Vec<TrainingWindow>) -> WindowBatch<B> {
        let batch_size = items.len();
        let lookback = items.first().map(|w| w.input.len()).unwrap_or(0);

        let mut input_data = Vec::with_capacity(batch_size * lookback);
        let mut target_data = Vec::with_capacity(batch_size);

        for window in &items {
            for &v in &window.input {
                input_data.push(v as f32);
            }
            target_data.push(window.target as f32);
        }

        let inputs = Tensor::<B, 1>::from_floats(input_data.as_slice(), &self.device)
            .reshape([batch_size, lookback, 1]);

        let targets = Tensor::<B, 1>::from_floats(target_data.as_slice(), &self.device)
            .reshape([batch_size, 1]);

        WindowBatch { inputs, targets }
    }
}

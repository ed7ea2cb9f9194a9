use burn::{
    module::Module,
    nn::{Dropout, DropoutConfig, Linear, LinearConfig, Lstm, LstmConfig},
    tensor::{backend::Backend, Tensor},
};

use crate::forecast::InferenceBackend;

/// Number of input features per time step (univariate close price)
pub const INPUT_SIZE: usize = 1;
/// Output size: one-step-ahead close
pub const OUTPUT_SIZE: usize = 1;

/// Stacked-LSTM price prediction model
///
/// Architecture: LSTM -> Dropout -> LSTM -> take last hidden state -> Dropout -> Linear
#[derive(Module, Debug)]
pub struct PricePredictionModel<B: Backend> {
    lstm1: Lstm<B>,
    dropout1: Dropout,
    lstm2: Lstm<B>,
    dropout2: Dropout,
    output_layer: Linear<B>,
}

/// Configuration for the model
#[derive(burn::config::Config)]
pub struct PricePredictionModelConfig {
    pub hidden_size: usize,
    pub dropout: f64,
}

impl PricePredictionModelConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> PricePredictionModel<B> {
        let lstm1 = LstmConfig::new(INPUT_SIZE, self.hidden_size, true).init(device);
        let lstm2 = LstmConfig::new(self.hidden_size, self.hidden_size, true).init(device);
        let dropout = DropoutConfig::new(self.dropout);
        let output_layer = LinearConfig::new(self.hidden_size, OUTPUT_SIZE).init(device);

        PricePredictionModel {
            lstm1,
            dropout1: dropout.init(),
            lstm2,
            dropout2: dropout.init(),
            output_layer,
        }
    }
}

impl<B: Backend> PricePredictionModel<B> {
    /// Forward pass
    ///
    /// Input shape: [batch_size, lookback, 1]
    /// Output shape: [batch_size, 1]
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
        // First recurrent layer keeps the full sequence: [batch_size, lookback, hidden]
        let (seq, _state) = self.lstm1.forward(input, None);
        let seq = self.dropout1.forward(seq);
        let (seq, _state) = self.lstm2.forward(seq, None);

        // Get the last time step: [batch_size, hidden]
        let dims = seq.dims();
        let batch_size = dims[0];
        let seq_len = dims[1];
        let hidden_size = dims[2];
        let last_step = seq.slice([0..batch_size, (seq_len - 1)..seq_len, 0..hidden_size]);
        let last_step = last_step.squeeze::<2>(1);

        let last_step = self.dropout2.forward(last_step);

        // Linear projection: [batch_size, 1]
        self.output_layer.forward(last_step)
    }
}

/// A fitted model on the inference backend, ready for autoregressive
/// forecasting.
///
/// Exclusively owns its parameter buffers; they are released when the value
/// drops, on every exit path. Obtained from a completed
/// [`TrainingSession`](crate::forecast::training::TrainingSession).
#[derive(Debug)]
pub struct TrainedModel {
    network: PricePredictionModel<InferenceBackend>,
    lookback: usize,
}

impl TrainedModel {
    pub(crate) fn new(network: PricePredictionModel<InferenceBackend>, lookback: usize) -> Self {
        Self { network, lookback }
    }

    /// Window length the model was trained with
    pub fn lookback(&self) -> usize {
        self.lookback
    }

    /// One-step-ahead prediction for a single normalized window of
    /// `lookback` values.
    pub fn predict_window(&self, window: &[f64]) -> f64 {
        let device = <InferenceBackend as Backend>::Device::default();

        let input_data: Vec<f32> = window.iter().map(|&v| v as f32).collect();
        let input = Tensor::<InferenceBackend, 1>::from_floats(input_data.as_slice(), &device)
            .reshape([1, window.len(), 1]);

        let prediction = self.network.forward(input);
        let values = prediction.into_data().to_vec::<f32>().unwrap_or_default();
        values.first().copied().unwrap_or(f32::NAN) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;

    #[test]
    fn test_untrained_model_predicts_a_finite_value() {
        let device = <InferenceBackend as Backend>::Device::default();
        let network = PricePredictionModelConfig {
            hidden_size: config::HIDDEN_SIZE,
            dropout: config::DROPOUT_RATE,
        }
        .init::<InferenceBackend>(&device);

        let model = TrainedModel::new(network, 5);
        let prediction = model.predict_window(&[0.1, 0.4, 0.2, 0.8, 0.5]);
        assert!(
            prediction.is_finite(),
            "Fresh parameters should still produce a finite value, got {}",
            prediction
        );
    }
}

use thiserror::Error;

/// Crate-wide result alias for forecasting operations.
pub type ForecastResult<T> = Result<T, ForecastError>;

/// Errors surfaced by the forecasting engine.
///
/// All variants are raised synchronously at the point of detection and are
/// never downgraded to a default forecast; a failed session must be restarted
/// by the caller with corrected inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    /// Every input price is identical; min-max normalization is undefined.
    #[error("degenerate series: all {len} values equal {value}")]
    DegenerateSeries { len: usize, value: f64 },

    /// Fewer points than the operation needs.
    #[error("insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// A settings field is out of bounds or inconsistent with another.
    #[error("invalid config field '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// Loss became non-finite during fit; carries the last epoch index.
    #[error("training diverged at epoch {epoch}: loss is not finite")]
    TrainingDiverged { epoch: usize },

    /// Cancellation was observed at an epoch boundary.
    #[error("training cancelled at epoch boundary {epoch}")]
    Cancelled { epoch: usize },

    /// Forecast seed is shorter than the model's lookback window.
    #[error("seed series too short: need {required} normalized values, got {actual}")]
    EmptySeed { required: usize, actual: usize },
}

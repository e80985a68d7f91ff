pub mod client;

use crate::{error::Result, models::ModelInput};
use async_trait::async_trait;

pub use client::{Prediction, PredictionStatus, ReplicateClient};

/// Narrow seam over the hosted image model.
///
/// Returns the model's output references in order. An empty list is a valid
/// return value; callers decide whether that counts as a failure.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, model_id: &str, input: &ModelInput) -> Result<Vec<String>>;
}

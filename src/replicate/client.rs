use crate::{
    config::ReplicateConfig,
    error::{HairgenError, Result},
    models::ModelInput,
    replicate::ModelInvoker,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::Instant;

const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl PredictionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PredictionStatus::Succeeded
                | PredictionStatus::Failed
                | PredictionStatus::Canceled
                | PredictionStatus::Unknown
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionStatus::Starting => "starting",
            PredictionStatus::Processing => "processing",
            PredictionStatus::Succeeded => "succeeded",
            PredictionStatus::Failed => "failed",
            PredictionStatus::Canceled => "canceled",
            PredictionStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionUrls {
    pub get: Option<String>,
    pub cancel: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub id: String,
    pub status: PredictionStatus,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub urls: Option<PredictionUrls>,
}

impl Prediction {
    fn poll_url(&self) -> Option<&str> {
        self.urls
            .as_ref()
            .and_then(|urls| urls.get.as_deref())
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Output references in model order. Accepts a single string or a list of strings.
    pub fn output_urls(&self) -> Vec<String> {
        let mut urls = Vec::new();
        if let Some(output) = &self.output {
            collect_urls(output, &mut urls);
        }
        urls
    }

    fn failure_detail(&self) -> String {
        match &self.error {
            Some(Value::String(message)) => message.clone(),
            Some(Value::Null) | None => "no error detail".to_string(),
            Some(other) => other.to_string(),
        }
    }
}

fn collect_urls(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(url) => {
            let trimmed = url.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_urls(item, out);
            }
        }
        _ => {}
    }
}

/// Where a model id is sent: `owner/name:version` goes to the generic predictions
/// endpoint, a bare `owner/name` to the model's own endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef<'a> {
    pub name: &'a str,
    pub version: Option<&'a str>,
}

impl<'a> ModelRef<'a> {
    pub fn parse(model_id: &'a str) -> Result<Self> {
        let (name, version) = match model_id.split_once(':') {
            Some((name, version)) => (name, Some(version)),
            None => (model_id, None),
        };

        let valid_name = matches!(
            name.split_once('/'),
            Some((owner, model)) if !owner.is_empty() && !model.is_empty() && !model.contains('/')
        );
        if !valid_name || version.is_some_and(str::is_empty) {
            return Err(HairgenError::ConfigError(format!(
                "Invalid Replicate model id '{}', expected owner/name[:version]",
                model_id
            )));
        }

        Ok(Self { name, version })
    }
}

#[derive(Clone)]
pub struct ReplicateClient {
    http: reqwest::Client,
    api_base: String,
    api_token: String,
    timeout: Duration,
    poll_interval: Duration,
}

impl ReplicateClient {
    pub fn new(config: &ReplicateConfig) -> Result<Self> {
        let api_token = config.require_token()?.to_string();
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| HairgenError::ConfigError(e.to_string()))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_token,
            timeout: config.timeout,
            poll_interval: config.poll_interval,
        })
    }

    /// Endpoint and JSON body for creating a prediction.
    pub fn prediction_request(&self, model_id: &str, input: &ModelInput) -> Result<(String, Value)> {
        let model = ModelRef::parse(model_id)?;
        let input = serde_json::to_value(input)?;

        Ok(match model.version {
            Some(version) => (
                format!("{}/predictions", self.api_base),
                json!({ "version": version, "input": input }),
            ),
            None => (
                format!("{}/models/{}/predictions", self.api_base, model.name),
                json!({ "input": input }),
            ),
        })
    }

    async fn read_prediction(response: reqwest::Response) -> Result<Prediction> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            return Err(HairgenError::ResponseError(format!(
                "Replicate returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| HairgenError::ResponseError(e.to_string()))
    }

    async fn wait_for(&self, mut prediction: Prediction, deadline: Instant) -> Result<Prediction> {
        while !prediction.status.is_terminal() {
            if Instant::now() >= deadline {
                return Err(HairgenError::Timeout(self.timeout));
            }

            let poll_url = prediction
                .poll_url()
                .ok_or_else(|| {
                    HairgenError::ResponseError(format!(
                        "Prediction {} is {} but has no poll URL",
                        prediction.id,
                        prediction.status.as_str()
                    ))
                })?
                .to_string();

            tokio::time::sleep(self.poll_interval).await;

            log::debug!(
                "Polling prediction {} ({})",
                prediction.id,
                prediction.status.as_str()
            );
            let response = self
                .http
                .get(&poll_url)
                .bearer_auth(&self.api_token)
                .send()
                .await?;
            prediction = Self::read_prediction(response).await?;
        }

        Ok(prediction)
    }

    async fn run_prediction(
        &self,
        model_id: &str,
        input: &ModelInput,
        deadline: Instant,
    ) -> Result<Vec<String>> {
        let (endpoint, payload) = self.prediction_request(model_id, input)?;

        log::info!("Creating prediction with model: {}", model_id);

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.api_token)
            .header("Prefer", "wait")
            .json(&payload)
            .send()
            .await?;
        let prediction = Self::read_prediction(response).await?;
        let prediction = self.wait_for(prediction, deadline).await?;

        if prediction.status != PredictionStatus::Succeeded {
            return Err(HairgenError::PredictionFailed {
                detail: prediction.failure_detail(),
                status: prediction.status.as_str().to_string(),
                id: prediction.id,
            });
        }

        let urls = prediction.output_urls();
        log::debug!(
            "Prediction {} succeeded with {} output(s)",
            prediction.id,
            urls.len()
        );
        Ok(urls)
    }
}

#[async_trait]
impl ModelInvoker for ReplicateClient {
    /// The configured timeout bounds the whole call: creation, every poll and every wait.
    async fn invoke(&self, model_id: &str, input: &ModelInput) -> Result<Vec<String>> {
        let deadline = Instant::now() + self.timeout;
        match tokio::time::timeout_at(deadline, self.run_prediction(model_id, input, deadline)).await
        {
            Ok(result) => result,
            Err(_) => Err(HairgenError::Timeout(self.timeout)),
        }
    }
}

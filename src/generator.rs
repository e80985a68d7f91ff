use crate::{
    logger,
    models::{FailureKind, GenerationParams, GenerationRequest, GenerationResult, ModelInput, PromptRegistry},
    replicate::ModelInvoker,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;
use uuid::Uuid;

const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Embeds raw image bytes as a JPEG-tagged base64 data URI.
pub fn encode_data_uri(bytes: &[u8]) -> String {
    let mut uri = String::with_capacity(DATA_URI_PREFIX.len() + bytes.len() * 4 / 3 + 4);
    uri.push_str(DATA_URI_PREFIX);
    STANDARD.encode_string(bytes, &mut uri);
    uri
}

/// The validate → encode → invoke → map pipeline behind `POST /generate`.
#[derive(Clone)]
pub struct HairstyleGenerator {
    registry: Arc<PromptRegistry>,
    invoker: Arc<dyn ModelInvoker>,
    model_id: String,
    params: GenerationParams,
}

impl HairstyleGenerator {
    pub fn new(
        registry: PromptRegistry,
        invoker: Arc<dyn ModelInvoker>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            invoker,
            model_id: model_id.into(),
            params: GenerationParams::default(),
        }
    }

    pub fn registry(&self) -> &PromptRegistry {
        &self.registry
    }

    pub async fn generate(&self, request: GenerationRequest) -> GenerationResult {
        let request_id = Uuid::new_v4().to_string();

        let Some((style, prompt)) = self.registry.lookup(&request.hairstyle) else {
            log::warn!(
                "⚠️  [req:{}] Rejected unknown hairstyle '{}'",
                request_id,
                request.hairstyle
            );
            return GenerationResult::failure(FailureKind::UnknownStyle);
        };

        log::info!(
            "🎨 [req:{}] Generating hairstyle: {} ({} bytes)",
            request_id,
            style,
            request.image.len()
        );

        let input = ModelInput::new(encode_data_uri(&request.image), prompt, &self.params);

        let outcome = {
            let _timer = logger::timer(&format!("prediction {}", request_id));
            self.invoker.invoke(&self.model_id, &input).await
        };

        match outcome {
            Ok(urls) => match urls.into_iter().next() {
                Some(image_url) => {
                    log::info!("✅ [req:{}] Generated image: {}", request_id, image_url);
                    GenerationResult::success(image_url)
                }
                None => {
                    log::error!("❌ [req:{}] Model returned no output", request_id);
                    GenerationResult::failure(FailureKind::GenerationFailed)
                }
            },
            Err(e) => {
                log::error!("❌ [req:{}] Generation failed: {}", request_id, e);
                GenerationResult::failure(FailureKind::GenerationFailed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HairgenError, Result};
    use crate::models::StyleKey;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubInvoker {
        reply: Mutex<Option<Result<Vec<String>>>>,
        calls: Mutex<Vec<(String, ModelInput)>>,
    }

    impl StubInvoker {
        fn replying(reply: Result<Vec<String>>) -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(Some(reply)),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, ModelInput)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelInvoker for StubInvoker {
        async fn invoke(&self, model_id: &str, input: &ModelInput) -> Result<Vec<String>> {
            self.calls
                .lock()
                .unwrap()
                .push((model_id.to_string(), input.clone()));
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn generator(stub: Arc<StubInvoker>) -> HairstyleGenerator {
        HairstyleGenerator::new(PromptRegistry::builtin(), stub, "owner/model:v1")
    }

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0xFF, 0xD9];

    #[test]
    fn test_data_uri_round_trip() {
        let uri = encode_data_uri(JPEG);
        let encoded = uri.strip_prefix("data:image/jpeg;base64,").unwrap();
        assert_eq!(STANDARD.decode(encoded).unwrap(), JPEG);
    }

    #[test]
    fn test_data_uri_of_empty_input() {
        assert_eq!(encode_data_uri(&[]), "data:image/jpeg;base64,");
    }

    #[tokio::test]
    async fn test_unknown_style_never_calls_model() {
        for key in ["unknown_key", "", "MEN_WOLF_CUT", "men_wolf_cut "] {
            let stub = StubInvoker::replying(Ok(vec!["https://x/out.png".into()]));
            let result = generator(stub.clone())
                .generate(GenerationRequest::new(JPEG, key))
                .await;
            assert_eq!(result, GenerationResult::failure(FailureKind::UnknownStyle));
            assert_eq!(result.status_code(), 400);
            assert!(stub.calls().is_empty(), "model called for '{key}'");
        }
    }

    #[tokio::test]
    async fn test_every_style_sends_its_registry_prompt() {
        let registry = PromptRegistry::builtin();
        for key in StyleKey::ALL {
            let stub = StubInvoker::replying(Ok(vec!["https://x/out.png".into()]));
            generator(stub.clone())
                .generate(GenerationRequest::new(JPEG, key.as_str()))
                .await;

            let calls = stub.calls();
            assert_eq!(calls.len(), 1);
            let (model_id, input) = &calls[0];
            assert_eq!(model_id, "owner/model:v1");
            assert_eq!(input.prompt, registry.get(key).unwrap());
            assert_eq!(input.image, encode_data_uri(JPEG));
            assert_eq!(input.style_strength, 20);
            assert_eq!(input.num_inference_steps, 30);
        }
    }

    #[tokio::test]
    async fn test_first_output_wins() {
        let stub = StubInvoker::replying(Ok(vec![
            "https://x/first.png".into(),
            "https://x/second.png".into(),
        ]));
        let result = generator(stub)
            .generate(GenerationRequest::new(JPEG, "women_layered"))
            .await;
        assert_eq!(result, GenerationResult::success("https://x/first.png"));
    }

    #[tokio::test]
    async fn test_empty_output_is_failure() {
        let stub = StubInvoker::replying(Ok(Vec::new()));
        let result = generator(stub)
            .generate(GenerationRequest::new(JPEG, "men_texture_crop"))
            .await;
        assert_eq!(result, GenerationResult::failure(FailureKind::GenerationFailed));
        assert_eq!(result.status_code(), 500);
    }

    #[tokio::test]
    async fn test_model_error_detail_is_not_exposed() {
        let stub = StubInvoker::replying(Err(HairgenError::RequestError(
            "connection reset by peer: secret-host".into(),
        )));
        let result = generator(stub)
            .generate(GenerationRequest::new(JPEG, "women_french_perm"))
            .await;
        match result {
            GenerationResult::Failure { kind, message } => {
                assert_eq!(kind, FailureKind::GenerationFailed);
                assert!(!message.contains("secret-host"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }
}

use serde::{Deserialize, Serialize};

pub const UNKNOWN_STYLE_MESSAGE: &str = "未知的发型选择";
pub const GENERATION_FAILED_MESSAGE: &str = "生成失败，请检查后端日志";

const DEFAULT_NEGATIVE_PROMPT: &str =
    "bad quality, distorted face, low resolution, blurry, ugly, extra ears";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlnetSelection {
    Depth,
}

/// Fixed sampling parameters sent with every generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub negative_prompt: String,
    pub style_strength: u32,
    /// Face similarity weight, 0..=1.
    pub ip_adapter_scale: f32,
    pub num_inference_steps: u32,
    pub controlnet_selection: ControlnetSelection,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            negative_prompt: DEFAULT_NEGATIVE_PROMPT.to_string(),
            style_strength: 20,
            ip_adapter_scale: 0.8,
            num_inference_steps: 30,
            controlnet_selection: ControlnetSelection::Depth,
        }
    }
}

/// Input object of the InstantID prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInput {
    pub image: String,
    pub prompt: String,
    pub negative_prompt: String,
    pub style_strength: u32,
    pub ip_adapter_scale: f32,
    pub num_inference_steps: u32,
    pub controlnet_selection: ControlnetSelection,
}

impl ModelInput {
    pub fn new(image: String, prompt: impl Into<String>, params: &GenerationParams) -> Self {
        Self {
            image,
            prompt: prompt.into(),
            negative_prompt: params.negative_prompt.clone(),
            style_strength: params.style_strength,
            ip_adapter_scale: params.ip_adapter_scale,
            num_inference_steps: params.num_inference_steps,
            controlnet_selection: params.controlnet_selection,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub image: Vec<u8>,
    pub hairstyle: String,
}

impl GenerationRequest {
    pub fn new(image: impl Into<Vec<u8>>, hairstyle: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            hairstyle: hairstyle.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    UnknownStyle,
    GenerationFailed,
}

impl FailureKind {
    pub fn status_code(&self) -> u16 {
        match self {
            FailureKind::UnknownStyle => 400,
            FailureKind::GenerationFailed => 500,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            FailureKind::UnknownStyle => UNKNOWN_STYLE_MESSAGE,
            FailureKind::GenerationFailed => GENERATION_FAILED_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    Success { image_url: String },
    Failure { kind: FailureKind, message: String },
}

impl GenerationResult {
    pub fn success(image_url: impl Into<String>) -> Self {
        GenerationResult::Success {
            image_url: image_url.into(),
        }
    }

    pub fn failure(kind: FailureKind) -> Self {
        GenerationResult::Failure {
            kind,
            message: kind.message().to_string(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            GenerationResult::Success { .. } => 200,
            GenerationResult::Failure { kind, .. } => kind.status_code(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GenerationResult::Success { .. })
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SuccessBody {
    pub status: String,
    pub image_url: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

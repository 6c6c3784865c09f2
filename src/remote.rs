//! Remote transform client: hand an image plus an instruction to a
//! generative edit service and get an edited image back.
//!
//! The studio only sees the [`RemoteTransform`] trait, so the production
//! [`GeminiClient`] and test stubs are interchangeable. One request, one
//! response: no retry and no streaming.
//!
//! The service does not say what format it answered in. The returned payload
//! is sniffed ([`sniff_format`]) and anything that is not JPEG is labelled PNG.

use crate::codec::{CodecError, ImageAsset, MimeType, sniff_format};
use crate::config::RemoteConfig;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Failed to process image: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Failed to process image: service responded {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Failed to process image: No image data found in the API response.")]
    NoImage,
    #[error("Failed to process image: {0}")]
    InvalidPayload(#[from] CodecError),
    #[error("{env} environment variable not set")]
    MissingApiKey { env: String },
}

/// What the studio sends: the uploaded image and the mode's instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRequest {
    pub image: Bytes,
    pub mime: MimeType,
    pub instruction: String,
}

impl TransformRequest {
    pub fn new(asset: &ImageAsset, instruction: impl Into<String>) -> Self {
        Self {
            image: asset.bytes().clone(),
            mime: asset.mime(),
            instruction: instruction.into(),
        }
    }
}

/// Base64 image payload as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    pub payload: String,
}

impl TransformResult {
    /// Sniffed MIME of the payload; PNG unless it carries a JPEG marker.
    pub fn mime(&self) -> MimeType {
        sniff_format(&self.payload)
    }

    pub fn into_asset(self) -> Result<ImageAsset, RemoteError> {
        let mime = self.mime();
        let bytes = STANDARD.decode(self.payload.trim()).map_err(CodecError::from)?;
        Ok(ImageAsset::from_encoded(bytes, mime)?)
    }
}

#[async_trait]
pub trait RemoteTransform: Send + Sync {
    async fn submit(&self, request: TransformRequest) -> Result<TransformResult, RemoteError>;
}

// ============================================================================
// Gemini wire format
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: Option<String>,
    data: String,
}

#[derive(Deserialize, Debug)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Image data of the first candidate's first non-empty inline part.
    fn into_image_payload(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|part| part.inline_data.filter(|inline| !inline.data.is_empty()))
            .map(|inline| inline.data)
    }
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http_client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(config: &RemoteConfig, api_key: impl Into<String>) -> Result<Self, RemoteError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            http_client: builder.build()?,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
        })
    }

    /// Read the key from the environment variable named in the config.
    pub fn from_env(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| RemoteError::MissingApiKey {
                env: config.api_key_env.clone(),
            })?;
        Self::new(config, api_key)
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

/// Pull `error.message` out of a JSON error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")?
                .get("message")?
                .as_str()
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl RemoteTransform for GeminiClient {
    async fn submit(&self, request: TransformRequest) -> Result<TransformResult, RemoteError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            mime_type: Some(request.mime.as_str().to_string()),
                            data: STANDARD.encode(&request.image),
                        }),
                        text: None,
                    },
                    Part {
                        inline_data: None,
                        text: Some(request.instruction),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE"],
            },
        };

        tracing::debug!(
            model = %self.model,
            image_size = request.image.len(),
            "sending edit request"
        );

        let response = self
            .http_client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let payload = parsed.into_image_payload().ok_or(RemoteError::NoImage)?;
        tracing::debug!(payload_len = payload.len(), "edit response received");
        Ok(TransformResult { payload })
    }
}

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{ImagePayload, PresetAngle, TransformationState},
    error::{ServiceError, ServiceException},
    protocol::{GenerateViewRequest, GenerateViewResponse},
};
use thiserror::Error;
use tracing::debug;

const MAX_ERROR_DETAIL_CHARS: usize = 240;

/// Produces a new view of `source` under `transformation`.
///
/// Implementations own transport, authentication and timeouts. Callers treat
/// every `Err` the same way.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(
        &self,
        source: &ImagePayload,
        transformation: TransformationState,
        preset: Option<PresetAngle>,
    ) -> Result<ImagePayload>;
}

pub struct MissingGenerationClient;

#[async_trait]
impl GenerationClient for MissingGenerationClient {
    async fn generate(
        &self,
        _source: &ImagePayload,
        _transformation: TransformationState,
        _preset: Option<PresetAngle>,
    ) -> Result<ImagePayload> {
        Err(anyhow!("generation service is unavailable"))
    }
}

#[derive(Debug, Error)]
pub enum GenerationClientError {
    #[error("generation request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("generation service returned {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("generation service returned an empty image")]
    EmptyImage,
}

pub struct HttpGenerationClient {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpGenerationClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GenerationClientError::Transport)?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(
        &self,
        request: &GenerateViewRequest,
    ) -> std::result::Result<ImagePayload, GenerationClientError> {
        let mut builder = self.http.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let res = builder.send().await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(GenerationClientError::Status {
                status: status.as_u16(),
                detail: describe_error_body(&body),
            });
        }

        let body: GenerateViewResponse = res.json().await?;
        if body.image.is_empty() {
            return Err(GenerationClientError::EmptyImage);
        }
        Ok(body.image)
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn generate(
        &self,
        source: &ImagePayload,
        transformation: TransformationState,
        preset: Option<PresetAngle>,
    ) -> Result<ImagePayload> {
        let request = GenerateViewRequest::new(source, transformation, preset);
        debug!(
            endpoint = %self.endpoint,
            preset = ?request.preset,
            "generation: posting view request"
        );
        Ok(self.send(&request).await?)
    }
}

fn describe_error_body(body: &str) -> String {
    if let Ok(err) = serde_json::from_str::<ServiceError>(body) {
        return ServiceException::from(err).to_string();
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(MAX_ERROR_DETAIL_CHARS).collect()
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

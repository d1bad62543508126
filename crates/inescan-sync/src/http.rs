//! HTTP client for the OCR backend's extraction and health endpoints.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{ExtractResponse, HealthResponse, ImageUpload, UploadError};

/// Upper bound on the liveness probe.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum OcrError {
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("extraction rejected: {0}")]
    Rejected(String),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no response within {0:?}")]
    Timeout(Duration),
}

impl OcrError {
    /// Text to show the person scanning, in the wording of the intake UI.
    pub fn user_message(&self, base_url: &str) -> String {
        match self {
            OcrError::Http(e) if e.is_connect() || e.is_timeout() => format!(
                "No se pudo conectar al servidor.\nVerifica: {}/health",
                base_url.trim_end_matches('/')
            ),
            OcrError::Timeout(_) => format!(
                "No se pudo conectar al servidor.\nVerifica: {}/health",
                base_url.trim_end_matches('/')
            ),
            OcrError::Server { status: 404, .. } => "Endpoint no encontrado (404).".to_string(),
            OcrError::Server { body, .. } | OcrError::Rejected(body)
                if body.contains("API Key no configurada") =>
            {
                "Google Vision API Key no configurada.".to_string()
            }
            OcrError::Server { status: 500, .. } => {
                "Error interno del servidor (500).".to_string()
            }
            OcrError::Upload(e) => e.to_string(),
            other => format!("Error: {other}"),
        }
    }
}

/// Client for the extraction backend.
pub struct OcrClient {
    client: reqwest::Client,
    base_url: String,
    health_timeout: Duration,
}

impl OcrClient {
    /// Create a client for the given backend base URL.
    ///
    /// Trailing slashes are trimmed.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            health_timeout: HEALTH_TIMEOUT,
        }
    }

    /// Like [`new`](Self::new) with explicit connect and whole-request timeouts.
    pub fn with_timeouts(
        base_url: &str,
        connect: Duration,
        request: Duration,
    ) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect)
            .timeout(request)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            health_timeout: HEALTH_TIMEOUT,
        })
    }

    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload an ID photo and return the backend's extraction.
    ///
    /// A non-2xx status is [`OcrError::Server`]; a 2xx body with
    /// `success: false` is [`OcrError::Rejected`].
    pub async fn extract(&self, upload: ImageUpload) -> Result<ExtractResponse, OcrError> {
        let url = format!("{}/api/extract-ine-prd", self.base_url);
        let mime = upload.mime_type();
        let (file_name, bytes) = upload.into_parts();
        let size = bytes.len();

        let part = Part::bytes(bytes).file_name(file_name.clone()).mime_str(mime)?;
        let form = Form::new().part("imagen", part);

        info!(url = %url, file = %file_name, bytes = size, "uploading image for extraction");
        let resp = self.client.post(&url).multipart(form).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        debug!(status = status.as_u16(), bytes = text.len(), "extraction response");

        if !status.is_success() {
            return Err(OcrError::Server {
                status: status.as_u16(),
                body: text,
            });
        }

        let result: ExtractResponse = serde_json::from_str(&text)?;
        if !result.success {
            let reason = result
                .error
                .unwrap_or_else(|| "Error desconocido".to_string());
            warn!(reason = %reason, "backend rejected extraction");
            return Err(OcrError::Rejected(reason));
        }

        info!(
            detected = result.detected_count(),
            quality = result.quality().unwrap_or("-"),
            "extraction complete"
        );
        Ok(result)
    }

    /// Probe the backend, giving up after the health timeout.
    pub async fn health(&self) -> Result<HealthResponse, OcrError> {
        let url = format!("{}/api/health", self.base_url);
        debug!(url = %url, "probing backend");

        let probe = async {
            let resp = self.client.get(&url).send().await?;
            let status = resp.status();
            let text = resp.text().await?;
            if !status.is_success() {
                return Err(OcrError::Server {
                    status: status.as_u16(),
                    body: text,
                });
            }
            Ok(serde_json::from_str::<HealthResponse>(&text)?)
        };

        let health = tokio::time::timeout(self.health_timeout, probe)
            .await
            .map_err(|_| OcrError::Timeout(self.health_timeout))??;
        info!(
            service = health.service.as_deref().unwrap_or("-"),
            version = health.version.as_deref().unwrap_or("-"),
            "backend reachable"
        );
        Ok(health)
    }
}

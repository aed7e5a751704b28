use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::aligner::{Aligner, AlignerOutcome, AlignerParams, AlignmentGroup};
use crate::errors::AlignerError;

/// Client for a remote sentence-alignment inference service.
///
/// The service loads its embedding model once at startup and exposes a single
/// JSON alignment endpoint; this client is the only place that knows its wire
/// format.
#[derive(Debug)]
pub struct RemoteAligner {
    /// HTTP client for API requests
    client: Client,
    /// Service base URL, e.g. "http://localhost:8080"
    endpoint: String,
}

/// Alignment request wire format
#[derive(Debug, Serialize)]
struct AlignRequest<'a> {
    source_text: &'a str,
    target_text: &'a str,
    source_language: &'a str,
    target_language: &'a str,
    max_align: u32,
    top_k: u32,
    win: u32,
    skip: f32,
    margin: bool,
    len_penalty: bool,
    is_split: bool,
}

/// Alignment response wire format
#[derive(Debug, Deserialize)]
struct AlignResponse {
    alignments: Vec<AlignmentGroup>,
    total_source_sentences: usize,
    total_target_sentences: usize,
}

/// Error payload the service returns on failed requests
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl RemoteAligner {
    /// Create a new client for the given service endpoint
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
        }
    }

    fn align_url(&self) -> String {
        format!("{}/align", self.endpoint.trim_end_matches('/'))
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl Aligner for RemoteAligner {
    async fn align(
        &self,
        source_text: &str,
        target_text: &str,
        source_lang: &str,
        target_lang: &str,
        params: &AlignerParams,
    ) -> Result<AlignerOutcome, AlignerError> {
        params.validate()?;

        let request = AlignRequest {
            source_text,
            target_text,
            source_language: source_lang,
            target_language: target_lang,
            max_align: params.max_align,
            top_k: params.top_k,
            win: params.window,
            skip: params.skip_penalty,
            margin: params.use_margin,
            len_penalty: params.use_length_penalty,
            is_split: params.pre_split,
        };

        debug!(
            "Requesting alignment {} -> {} ({} source chars, {} target chars)",
            source_lang,
            target_lang,
            source_text.len(),
            target_text.len()
        );

        let response = self
            .client
            .post(self.align_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    AlignerError::ConnectionError(e.to_string())
                } else {
                    AlignerError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail.or(body.error))
                .unwrap_or_else(|| "no error detail provided".to_string());
            error!("Aligner service error ({}): {}", status, message);

            // The service reports unsupported languages as a client error
            if status.as_u16() == 400 && message.to_lowercase().contains("language") {
                return Err(AlignerError::UnsupportedLanguage(message));
            }
            if status.is_server_error() {
                return Err(AlignerError::AlignmentFailed(message));
            }
            return Err(AlignerError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let parsed = response
            .json::<AlignResponse>()
            .await
            .map_err(|e| AlignerError::ParseError(e.to_string()))?;

        debug!(
            "Aligner returned {} groups ({} source sentences, {} target sentences)",
            parsed.alignments.len(),
            parsed.total_source_sentences,
            parsed.total_target_sentences
        );

        Ok(AlignerOutcome {
            groups: parsed.alignments,
            source_sentence_count: parsed.total_source_sentences,
            target_sentence_count: parsed.total_target_sentences,
        })
    }

    async fn test_connection(&self) -> Result<(), AlignerError> {
        let response = self
            .client
            .get(self.health_url())
            .send()
            .await
            .map_err(|e| AlignerError::ConnectionError(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AlignerError::ApiError {
                status_code: response.status().as_u16(),
                message: "health check failed".to_string(),
            })
        }
    }
}

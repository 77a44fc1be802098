use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, warn};

use super::interface::TranslateRequest;
use crate::config::TranslationConfig;

/// Sentinel returned when an upstream answers 2xx without the expected
/// translation field. Callers classify it as a failure by inspecting the text.
pub const DEGRADED_TEXT: &str = "Translation failed";

const LIBRETRANSLATE: &str = "LibreTranslate";
const LINGVA: &str = "Lingva translation";

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("{service} failed: HTTP {status}")]
    UpstreamStatus { service: &'static str, status: u16 },
    #[error("{service} error: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// Forwards text to LibreTranslate and falls back to Lingva when the first
/// attempt fails. One attempt per service, no retries.
pub struct TranslationService {
    client: Client,
    libretranslate_url: String,
    lingva_url: String,
    timeout: Duration,
}

impl TranslationService {
    pub fn new(config: &TranslationConfig) -> Self {
        Self {
            client: Client::new(),
            libretranslate_url: config.libretranslate_url.clone(),
            lingva_url: config.lingva_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Translate `request.text`, trying LibreTranslate first and Lingva second.
    ///
    /// A primary failure is logged and swallowed; only the fallback's outcome
    /// surfaces as the error when both services fail.
    pub async fn translate(&self, request: &TranslateRequest) -> Result<String, TranslationError> {
        match self.libretranslate(request).await {
            Ok(translated) => return Ok(translated),
            Err(e @ TranslationError::UpstreamStatus { .. }) => warn!("{}", e),
            Err(e) => error!("{}", e),
        }

        self.lingva(request).await
    }

    async fn libretranslate(&self, request: &TranslateRequest) -> Result<String, TranslationError> {
        let body = json!({
            "q": request.text,
            "source": request.source_lang,
            "target": request.target_lang,
            "format": "text",
        });

        let response = self
            .client
            .post(&self.libretranslate_url)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| TranslationError::Transport {
                service: LIBRETRANSLATE,
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::UpstreamStatus {
                service: LIBRETRANSLATE,
                status: status.as_u16(),
            });
        }

        let result: Value = response.json().await.map_err(|e| TranslationError::Transport {
            service: LIBRETRANSLATE,
            source: e,
        })?;
        Ok(extract_field(&result, "translatedText"))
    }

    async fn lingva(&self, request: &TranslateRequest) -> Result<String, TranslationError> {
        // Text goes into the path, so it must be percent-encoded.
        let url = format!(
            "{}/{}/{}/{}",
            self.lingva_url,
            request.source_lang,
            request.target_lang,
            urlencoding::encode(&request.text)
        );

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| TranslationError::Transport {
                service: LINGVA,
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::UpstreamStatus {
                service: LINGVA,
                status: status.as_u16(),
            });
        }

        let result: Value = response.json().await.map_err(|e| TranslationError::Transport {
            service: LINGVA,
            source: e,
        })?;
        Ok(extract_field(&result, "translation"))
    }
}

fn extract_field(body: &Value, field: &str) -> String {
    body.get(field)
        .and_then(Value::as_str)
        .unwrap_or(DEGRADED_TEXT)
        .to_string()
}

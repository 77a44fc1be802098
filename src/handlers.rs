use axum::extract::State;
use axum::http::StatusCode;
use axum::{Form, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::state::AppState;
use crate::translate::{TranslateRequest, TranslateResponse};

#[derive(Debug, Deserialize)]
pub struct TranslateForm {
    #[serde(default)]
    text: Option<String>,
    #[serde(default = "default_source_lang")]
    source_lang: String,
    #[serde(default = "default_target_lang")]
    target_lang: String,
}

fn default_source_lang() -> String {
    "auto".to_string()
}

fn default_target_lang() -> String {
    "es".to_string()
}

pub async fn translate(
    State(state): State<AppState>,
    Form(form): Form<TranslateForm>,
) -> Result<Json<TranslateResponse>, (StatusCode, Json<Value>)> {
    let text = match form.text {
        Some(text) if !text.is_empty() => text,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Please enter text to translate"})),
            ))
        }
    };

    let request = TranslateRequest {
        text,
        source_lang: form.source_lang,
        target_lang: form.target_lang,
    };

    match state.translator.translate(&request).await {
        Ok(translated) if !looks_like_failure(&translated) => {
            info!(
                "Translation successful: '{}' from {} to {}",
                request.text, request.source_lang, request.target_lang
            );
            Ok(Json(TranslateResponse {
                original_text: request.text,
                translated_text: translated,
                source_lang: request.source_lang,
                target_lang: request.target_lang,
            }))
        }
        Ok(translated) => {
            // Upstream answered 200 but with placeholder text instead of a
            // real translation.
            error!("Translation failed: {}", translated);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": translated})),
            ))
        }
        Err(e) => {
            error!("Translation failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            ))
        }
    }
}

/// Classifies a translated string that mentions an error as a failed attempt.
/// This conflates sentinel placeholder text with translations that genuinely
/// contain these words; kept for compatibility with the upstream sentinels.
fn looks_like_failure(translated: &str) -> bool {
    let lower = translated.to_lowercase();
    lower.contains("error") || lower.contains("failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, TranslationConfig};
    use axum::extract::Path;
    use axum::routing::{get, post};
    use axum::Router;

    #[test]
    fn failure_text_classification() {
        assert!(looks_like_failure("Translation failed"));
        assert!(looks_like_failure("Internal Server ERROR"));
        assert!(!looks_like_failure("hola"));
        assert!(!looks_like_failure(""));
    }

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn spawn_app(primary_base: &str, fallback_base: &str) -> String {
        let config = Config {
            translation_config: TranslationConfig {
                libretranslate_url: format!("{}/translate", primary_base),
                lingva_url: format!("{}/api/v1", fallback_base),
                timeout_secs: 5,
            },
            ..Config::default()
        };
        let state = AppState::new(config);
        spawn(crate::routes::create_routes().with_state(state)).await
    }

    fn primary_replying(reply: Value) -> Router {
        Router::new().route(
            "/translate",
            post(move || {
                let reply = reply.clone();
                async move { Json(reply) }
            }),
        )
    }

    fn primary_failing(status: StatusCode) -> Router {
        Router::new().route("/translate", post(move || async move { status }))
    }

    fn fallback_failing(status: StatusCode) -> Router {
        Router::new().route(
            "/api/v1/:source/:target/:text",
            get(move |_path: Path<(String, String, String)>| async move { status }),
        )
    }

    #[tokio::test]
    async fn missing_text_returns_400_with_error_key() {
        // No upstream should be contacted, so dead endpoints are fine.
        let app = spawn_app("http://127.0.0.1:9", "http://127.0.0.1:9").await;

        let response = reqwest::Client::new()
            .post(format!("{}/translate", app))
            .form(&[("source_lang", "auto"), ("target_lang", "es")])
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Please enter text to translate");
    }

    #[tokio::test]
    async fn primary_success_returns_full_envelope() {
        let primary = spawn(primary_replying(json!({"translatedText": "hola"}))).await;
        let fallback = spawn(fallback_failing(StatusCode::SERVICE_UNAVAILABLE)).await;
        let app = spawn_app(&primary, &fallback).await;

        let response = reqwest::Client::new()
            .post(format!("{}/translate", app))
            .form(&[("text", "hello"), ("source_lang", "auto"), ("target_lang", "es")])
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["original_text"], "hello");
        assert_eq!(body["translated_text"], "hola");
        assert_eq!(body["source_lang"], "auto");
        assert_eq!(body["target_lang"], "es");
    }

    #[tokio::test]
    async fn form_defaults_apply_when_languages_omitted() {
        let primary = spawn(primary_replying(json!({"translatedText": "hola"}))).await;
        let fallback = spawn(fallback_failing(StatusCode::SERVICE_UNAVAILABLE)).await;
        let app = spawn_app(&primary, &fallback).await;

        let response = reqwest::Client::new()
            .post(format!("{}/translate", app))
            .form(&[("text", "hello")])
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["source_lang"], "auto");
        assert_eq!(body["target_lang"], "es");
    }

    #[tokio::test]
    async fn both_upstreams_failing_returns_500_with_fallback_message() {
        let primary = spawn(primary_failing(StatusCode::INTERNAL_SERVER_ERROR)).await;
        let fallback = spawn(fallback_failing(StatusCode::SERVICE_UNAVAILABLE)).await;
        let app = spawn_app(&primary, &fallback).await;

        let response = reqwest::Client::new()
            .post(format!("{}/translate", app))
            .form(&[("text", "hello")])
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 500);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Lingva translation failed: HTTP 503");
    }

    #[tokio::test]
    async fn degraded_primary_success_is_classified_as_failure() {
        let primary = spawn(primary_replying(json!({"unexpected": "shape"}))).await;
        let fallback = spawn(fallback_failing(StatusCode::SERVICE_UNAVAILABLE)).await;
        let app = spawn_app(&primary, &fallback).await;

        let response = reqwest::Client::new()
            .post(format!("{}/translate", app))
            .form(&[("text", "hello")])
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 500);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Translation failed");
    }
}

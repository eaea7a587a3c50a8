//! HTTP translate function.
//!
//! `POST /functions/v1/translate` takes `{ sourceData, targetLang }` and
//! answers with the translated flat map, produced key by key against the
//! provider. Errors are JSON bodies of the form `{ "error": "..." }`.

use crate::client::DEEPL_KEY_HEADER;
use crate::config::Config;
use crate::error::LocaleError;
use crate::locale::{FlatLocaleMap, SupportedLanguage};
use crate::provider::{translate_entries, DeepLProvider, EngineSettings};
use crate::security::bearer_matches;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderName, Method, StatusCode},
    routing::post,
    Json, Router,
};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

pub const TRANSLATE_PATH: &str = "/functions/v1/translate";

type ApiError = (StatusCode, Json<Value>);

pub struct AppState {
    pub config: Config,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateRequest {
    source_data: Option<IndexMap<String, Value>>,
    target_lang: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(TRANSLATE_PATH, post(translate))
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
            HeaderName::from_static("x-deepl-api-key"),
        ])
}

async fn translate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<FlatLocaleMap>, ApiError> {
    if let Some(expected) = &state.config.service_bearer_token {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        if !bearer_matches(authorization, expected) {
            warn!("Rejected translate request with invalid credentials");
            return Err(error_response(StatusCode::UNAUTHORIZED, "Unauthorized"));
        }
    }

    let (source, target_code) = parse_request(&body)?;

    let api_key = headers
        .get(DEEPL_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .or_else(|| state.config.deepl_api_key.clone())
        .ok_or_else(|| {
            failure(LocaleError::Configuration(
                "DEEPL_API_KEY is not set and no X-DeepL-API-Key header was sent".to_string(),
            ))
        })?;

    let language = SupportedLanguage::from_code(&target_code).map_err(failure)?;
    let provider_code = language
        .provider_code()
        .ok_or_else(|| failure(LocaleError::UnsupportedLanguage(target_code.clone())))?;

    info!(
        "Translating {} keys to {} ({})",
        source.len(),
        language.display_name(),
        provider_code
    );

    let provider = DeepLProvider::new(
        state.http.clone(),
        state.config.deepl_api_url.clone(),
        api_key,
        state.config.request_timeout,
    );
    let settings = EngineSettings::from_config(&state.config);

    let translated = translate_entries(&provider, &source, provider_code, &settings)
        .await
        .map_err(|e| {
            error!("Translation to {} failed: {}", language.code(), e);
            failure(e)
        })?;

    Ok(Json(translated))
}

/// Decode the body into a flat map of string values and the target code.
/// Non-string values are dropped.
fn parse_request(body: &[u8]) -> Result<(FlatLocaleMap, String), ApiError> {
    let missing = || error_response(StatusCode::BAD_REQUEST, "Missing required fields");

    let request: TranslateRequest = serde_json::from_slice(body).map_err(|_| missing())?;
    let source_data = request.source_data.ok_or_else(missing)?;
    let target_lang = request
        .target_lang
        .filter(|lang| !lang.is_empty())
        .ok_or_else(missing)?;

    let source = source_data
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(text) => Some((key, text)),
            _ => None,
        })
        .collect();

    Ok((source, target_lang))
}

fn failure(error: LocaleError) -> ApiError {
    let status = match &error {
        LocaleError::UnsupportedLanguage(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, &error.to_string())
}

fn error_response(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({ "error": message })))
}

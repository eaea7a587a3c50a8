use crate::config::Config;
use crate::error::{LocaleError, CONFIGURATION_PREFIX};
use crate::locale::{FlatLocaleMap, ProtectedText, SkipList, SupportedLanguage};
use crate::pipeline::Translator;
use crate::provider::http_error;
use crate::retry::{with_retry_classified, RetryConfig};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Header carrying the caller's provider key to the translate function
pub const DEEPL_KEY_HEADER: &str = "X-DeepL-API-Key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateRequest<'a> {
    source_data: &'a IndexMap<String, String>,
    target_lang: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for the remote translate function.
///
/// One call translates a whole flattened document into one language with a
/// single request, retried with backoff.
#[derive(Debug, Clone)]
pub struct TranslationClient {
    client: reqwest::Client,
    url: String,
    bearer_token: String,
    deepl_api_key: Option<String>,
    timeout: Duration,
    retry: RetryConfig,
    skip_list: SkipList,
}

impl TranslationClient {
    pub fn new(config: &Config) -> Result<Self, LocaleError> {
        let bearer_token = config.require_translate_bearer_token()?.to_string();
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LocaleError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.translate_function_url.clone(),
            bearer_token,
            deepl_api_key: config.deepl_api_key.clone(),
            timeout: config.request_timeout,
            retry: config.retry_config(),
            skip_list: SkipList::default(),
        })
    }

    /// Translate `source` into `language`.
    ///
    /// Skip-list values are kept as they are and never sent. Keys the service
    /// leaves out of its answer are missing from the result.
    pub async fn translate(
        &self,
        source: &FlatLocaleMap,
        language: SupportedLanguage,
    ) -> Result<FlatLocaleMap, LocaleError> {
        let mut guarded: IndexMap<String, ProtectedText> = IndexMap::new();
        for (key, value) in source {
            if !self.skip_list.contains(value) {
                guarded.insert(key.clone(), ProtectedText::protect(value));
            }
        }

        let payload: IndexMap<String, String> = guarded
            .iter()
            .map(|(key, protected)| (key.clone(), protected.text.clone()))
            .collect();

        info!(
            "Requesting {} translation for {} keys ({} skipped)",
            language.display_name(),
            payload.len(),
            source.len() - payload.len()
        );

        let response = if payload.is_empty() {
            IndexMap::new()
        } else {
            let operation_name = format!("Translate to {}", language.code());
            with_retry_classified(
                &self.retry,
                &operation_name,
                || self.send(&payload, language),
                LocaleError::retry_decision,
            )
            .await
            .map_err(|e| e.for_language(language))?
        };

        let mut translated = FlatLocaleMap::with_capacity(source.len());
        for (key, value) in source {
            match guarded.get(key) {
                None => {
                    translated.insert(key.clone(), value.clone());
                }
                Some(protected) => match response.get(key) {
                    Some(text) => {
                        let missing = protected.missing_markers(text);
                        if !missing.is_empty() {
                            warn!("Placeholder markers {:?} lost in '{}' ({})", missing, key, language);
                        }
                        translated.insert(key.clone(), protected.restore(text));
                    }
                    None => warn!("Translation for '{}' ({}) missing from response", key, language),
                },
            }
        }

        Ok(translated)
    }

    async fn send(
        &self,
        payload: &IndexMap<String, String>,
        language: SupportedLanguage,
    ) -> Result<IndexMap<String, String>, LocaleError> {
        let mut request = self
            .client
            .post(&self.url)
            .bearer_auth(&self.bearer_token)
            .json(&TranslateRequest {
                source_data: payload,
                target_lang: language.code(),
            });
        if let Some(key) = &self.deepl_api_key {
            request = request.header(DEEPL_KEY_HEADER, key);
        }

        let response = request.send().await.map_err(|e| http_error(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            debug!("Translate function returned {}: {}", status, body);
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| "Translation failed".to_string());
            // Missing credential on the function side
            if let Some(detail) = message.strip_prefix(CONFIGURATION_PREFIX) {
                return Err(LocaleError::Configuration(format!("translate function: {}", detail)));
            }
            return Err(LocaleError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<IndexMap<String, serde_json::Value>>()
            .await
            .map_err(|e| http_error(e, self.timeout))
            .map(|map| {
                map.into_iter()
                    .filter_map(|(key, value)| match value {
                        serde_json::Value::String(text) => Some((key, text)),
                        _ => None,
                    })
                    .collect()
            })
    }
}

impl Translator for TranslationClient {
    async fn translate(
        &self,
        source: &FlatLocaleMap,
        language: SupportedLanguage,
    ) -> Result<FlatLocaleMap, LocaleError> {
        TranslationClient::translate(self, source, language).await
    }
}

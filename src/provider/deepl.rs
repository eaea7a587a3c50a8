use crate::error::LocaleError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Tone requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Formality {
    Default,
    PreferMore,
    PreferLess,
}

/// Per-call provider options
#[derive(Debug, Clone)]
pub struct TranslateOptions {
    pub formality: Formality,
    pub preserve_formatting: bool,
}

impl Default for TranslateOptions {
    /// Storefront copy is addressed to customers: formal, formatting untouched
    fn default() -> Self {
        Self {
            formality: Formality::PreferMore,
            preserve_formatting: true,
        }
    }
}

/// A remote capability that translates one string at a time.
pub trait TextTranslator {
    /// Translate `text` into the provider language code `target_lang`.
    ///
    /// `source_lang` of `None` lets the provider detect the source language.
    fn translate_text(
        &self,
        text: &str,
        source_lang: Option<&str>,
        target_lang: &str,
        options: &TranslateOptions,
    ) -> impl Future<Output = Result<String, LocaleError>> + Send;
}

/// DeepL translate request body
#[derive(Debug, Serialize)]
struct DeepLRequest<'a> {
    text: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<&'a str>,
    target_lang: &'a str,
    formality: Formality,
    preserve_formatting: bool,
}

#[derive(Debug, Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
}

#[derive(Debug, Deserialize)]
struct DeepLErrorBody {
    message: String,
}

/// DeepL HTTP API client
#[derive(Debug, Clone)]
pub struct DeepLProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    timeout: Duration,
}

impl DeepLProvider {
    /// Every call is aborted once `timeout` elapses.
    pub fn new(
        client: reqwest::Client,
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
            timeout,
        }
    }
}

impl TextTranslator for DeepLProvider {
    async fn translate_text(
        &self,
        text: &str,
        source_lang: Option<&str>,
        target_lang: &str,
        options: &TranslateOptions,
    ) -> Result<String, LocaleError> {
        let request = DeepLRequest {
            text: vec![text],
            source_lang,
            target_lang,
            formality: options.formality,
            preserve_formatting: options.preserve_formatting,
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| http_error(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            let message = serde_json::from_str::<DeepLErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or(body);
            return Err(LocaleError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: DeepLResponse = response
            .json()
            .await
            .map_err(|e| LocaleError::Http(format!("Failed to parse DeepL response: {}", e)))?;

        parsed
            .translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| LocaleError::Http("DeepL response contained no translations".to_string()))
    }
}

/// Map a transport error, keeping timeouts distinguishable
pub(crate) fn http_error(error: reqwest::Error, timeout: Duration) -> LocaleError {
    if error.is_timeout() {
        LocaleError::Timeout(timeout)
    } else {
        LocaleError::from(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn provider(server: &MockServer) -> DeepLProvider {
        DeepLProvider::new(
            reqwest::Client::new(),
            format!("{}/v2/translate", server.uri()),
            "test-deepl-key",
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_request_serialization() {
        let request = DeepLRequest {
            text: vec!["Hello __VAR0__"],
            source_lang: Some("EN"),
            target_lang: "DE",
            formality: Formality::PreferMore,
            preserve_formatting: true,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "text": ["Hello __VAR0__"],
                "source_lang": "EN",
                "target_lang": "DE",
                "formality": "prefer_more",
                "preserve_formatting": true
            })
        );
    }

    #[test]
    fn test_request_omits_missing_source_lang() {
        let request = DeepLRequest {
            text: vec!["Hi"],
            source_lang: None,
            target_lang: "IT",
            formality: Formality::Default,
            preserve_formatting: false,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("source_lang"));
        assert!(json.contains("\"default\""));
    }

    #[tokio::test]
    async fn test_translate_text_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/translate"))
            .and(header("Authorization", "DeepL-Auth-Key test-deepl-key"))
            .and(body_json(serde_json::json!({
                "text": ["Hello __VAR0__"],
                "source_lang": "EN",
                "target_lang": "DE",
                "formality": "prefer_more",
                "preserve_formatting": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "translations": [{"detected_source_language": "EN", "text": "Hallo __VAR0__"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let translated = provider(&server)
            .translate_text("Hello __VAR0__", Some("EN"), "DE", &TranslateOptions::default())
            .await
            .expect("Should succeed");

        assert_eq!(translated, "Hallo __VAR0__");
    }

    #[tokio::test]
    async fn test_translate_text_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429).set_body_json(serde_json::json!({"message": "Too many requests"})),
            )
            .mount(&server)
            .await;

        let error = provider(&server)
            .translate_text("Hello", Some("EN"), "DE", &TranslateOptions::default())
            .await
            .unwrap_err();

        assert_eq!(error.status(), Some(429));
        assert!(error.is_rate_limited());
        assert!(error.to_string().contains("Too many requests"));
    }

    #[tokio::test]
    async fn test_translate_text_plain_error_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let error = provider(&server)
            .translate_text("Hello", None, "ES", &TranslateOptions::default())
            .await
            .unwrap_err();

        match error {
            LocaleError::Remote { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_translate_text_empty_translations() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"translations": []})))
            .mount(&server)
            .await;

        let error = provider(&server)
            .translate_text("Hello", Some("EN"), "PL", &TranslateOptions::default())
            .await
            .unwrap_err();

        assert!(error.to_string().contains("no translations"));
    }

    #[tokio::test]
    async fn test_translate_text_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(500))
                    .set_body_json(serde_json::json!({"translations": [{"text": "late"}]})),
            )
            .mount(&server)
            .await;

        let slow = DeepLProvider::new(
            reqwest::Client::new(),
            format!("{}/v2/translate", server.uri()),
            "key",
            Duration::from_millis(50),
        );

        let error = slow
            .translate_text("Hello", Some("EN"), "DE", &TranslateOptions::default())
            .await
            .unwrap_err();

        assert!(error.is_timeout(), "expected timeout, got {:?}", error);
    }
}

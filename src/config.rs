use crate::error::LocaleError;
use crate::locale::LanguagePolicy;
use crate::retry::RetryConfig;
use anyhow::{bail, Context, Result};
use std::time::Duration;

pub const DEFAULT_DEEPL_API_URL: &str = "https://api-free.deepl.com/v2/translate";
pub const DEFAULT_TRANSLATE_FUNCTION_URL: &str = "http://localhost:8080/functions/v1/translate";

#[derive(Debug, Clone)]
pub struct Config {
    // Translate function (client side)
    pub translate_function_url: String,
    pub translate_bearer_token: Option<String>,

    // DeepL
    pub deepl_api_key: Option<String>,
    pub deepl_api_url: String,

    // Translate function (server side)
    pub service_bearer_token: Option<String>,
    pub port: u16,

    // Request policy
    pub request_timeout: Duration,
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub throttle_after: u32,
    pub throttle_pause: Duration,

    // Languages copied from the source instead of translated
    pub copy_source_languages: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            // Translate function
            translate_function_url: std::env::var("TRANSLATE_FUNCTION_URL")
                .unwrap_or_else(|_| DEFAULT_TRANSLATE_FUNCTION_URL.to_string()),
            translate_bearer_token: non_empty_var("TRANSLATE_BEARER_TOKEN"),

            // DeepL
            deepl_api_key: non_empty_var("DEEPL_API_KEY"),
            deepl_api_url: std::env::var("DEEPL_API_URL")
                .unwrap_or_else(|_| DEFAULT_DEEPL_API_URL.to_string()),

            // Server
            service_bearer_token: non_empty_var("SERVICE_BEARER_TOKEN"),
            port: parse_var("PORT", 8080)?,

            // Request policy
            request_timeout: Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 30)?),
            max_attempts: parse_var("TRANSLATE_MAX_ATTEMPTS", 3)?,
            initial_backoff: Duration::from_millis(parse_var("TRANSLATE_BACKOFF_MS", 1000)?),
            throttle_after: parse_var("THROTTLE_AFTER", 5)?,
            throttle_pause: Duration::from_millis(parse_var("THROTTLE_PAUSE_MS", 1000)?),

            copy_source_languages: std::env::var("COPY_SOURCE_LANGUAGES")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| vec!["uk".to_string()]),
        };

        if config.max_attempts == 0 {
            bail!("TRANSLATE_MAX_ATTEMPTS must be at least 1");
        }
        config
            .language_policy()
            .context("COPY_SOURCE_LANGUAGES contains an unknown language code")?;

        Ok(config)
    }

    /// Retry policy for whole-document requests to the translate function
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::translate_request()
            .with_max_attempts(self.max_attempts)
            .with_initial_delay(self.initial_backoff)
    }

    /// Retry policy for single-string provider calls
    pub fn provider_retry_config(&self) -> RetryConfig {
        RetryConfig::provider_call()
            .with_max_attempts(self.max_attempts)
            .with_initial_delay(self.initial_backoff * 2)
    }

    pub fn language_policy(&self) -> Result<LanguagePolicy, LocaleError> {
        LanguagePolicy::copy_source_for(self.copy_source_languages.as_slice())
    }

    /// Bearer credential for the translate function, required by the client
    pub fn require_translate_bearer_token(&self) -> Result<&str, LocaleError> {
        self.translate_bearer_token.as_deref().ok_or_else(|| {
            LocaleError::Configuration("TRANSLATE_BEARER_TOKEN is not set".to_string())
        })
    }

    /// DeepL credential, required wherever the provider is called
    pub fn require_deepl_api_key(&self) -> Result<&str, LocaleError> {
        self.deepl_api_key
            .as_deref()
            .ok_or_else(|| LocaleError::Configuration("DEEPL_API_KEY is not set".to_string()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            translate_function_url: DEFAULT_TRANSLATE_FUNCTION_URL.to_string(),
            translate_bearer_token: None,
            deepl_api_key: None,
            deepl_api_url: DEFAULT_DEEPL_API_URL.to_string(),
            service_bearer_token: None,
            port: 8080,
            request_timeout: Duration::from_secs(30),
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            throttle_after: 5,
            throttle_pause: Duration::from_secs(1),
            copy_source_languages: vec!["uk".to_string()],
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", name, value)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::{SupportedLanguage, TargetMode};
    use serial_test::serial;

    const VARS: [&str; 12] = [
        "TRANSLATE_FUNCTION_URL",
        "TRANSLATE_BEARER_TOKEN",
        "DEEPL_API_KEY",
        "DEEPL_API_URL",
        "SERVICE_BEARER_TOKEN",
        "PORT",
        "REQUEST_TIMEOUT_SECS",
        "TRANSLATE_MAX_ATTEMPTS",
        "TRANSLATE_BACKOFF_MS",
        "THROTTLE_AFTER",
        "THROTTLE_PAUSE_MS",
        "COPY_SOURCE_LANGUAGES",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = Config::from_env().expect("defaults should load");

        assert_eq!(config.translate_function_url, DEFAULT_TRANSLATE_FUNCTION_URL);
        assert_eq!(config.deepl_api_url, DEFAULT_DEEPL_API_URL);
        assert!(config.translate_bearer_token.is_none());
        assert!(config.deepl_api_key.is_none());
        assert_eq!(config.port, 8080);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.initial_backoff, Duration::from_secs(1));
        assert_eq!(config.throttle_after, 5);
        assert_eq!(config.throttle_pause, Duration::from_secs(1));
        assert_eq!(config.copy_source_languages, vec!["uk"]);
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("TRANSLATE_BEARER_TOKEN", "anon-key");
        std::env::set_var("DEEPL_API_KEY", "deepl-key");
        std::env::set_var("REQUEST_TIMEOUT_SECS", "5");
        std::env::set_var("TRANSLATE_MAX_ATTEMPTS", "5");
        std::env::set_var("TRANSLATE_BACKOFF_MS", "2000");
        std::env::set_var("COPY_SOURCE_LANGUAGES", "uk, pl");

        let config = Config::from_env().expect("should load");
        clear_env();

        assert_eq!(config.translate_bearer_token.as_deref(), Some("anon-key"));
        assert_eq!(config.deepl_api_key.as_deref(), Some("deepl-key"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.retry_config().max_attempts, 5);
        assert_eq!(config.retry_config().initial_delay, Duration::from_secs(2));

        let policy = config.language_policy().unwrap();
        assert_eq!(policy.mode_for(SupportedLanguage::Pl), TargetMode::CopySource);
        assert_eq!(policy.mode_for(SupportedLanguage::Uk), TargetMode::CopySource);
    }

    #[test]
    #[serial]
    fn test_from_env_empty_credential_is_missing() {
        clear_env();
        std::env::set_var("DEEPL_API_KEY", "  ");
        let config = Config::from_env().expect("should load");
        clear_env();

        assert!(config.deepl_api_key.is_none());
        assert!(matches!(
            config.require_deepl_api_key(),
            Err(LocaleError::Configuration(_))
        ));
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_number() {
        clear_env();
        std::env::set_var("PORT", "eighty");
        let result = Config::from_env();
        clear_env();

        let err = result.unwrap_err().to_string();
        assert!(err.contains("PORT"), "got: {}", err);
    }

    #[test]
    #[serial]
    fn test_from_env_zero_attempts_rejected() {
        clear_env();
        std::env::set_var("TRANSLATE_MAX_ATTEMPTS", "0");
        let result = Config::from_env();
        clear_env();
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_unknown_copy_language_rejected() {
        clear_env();
        std::env::set_var("COPY_SOURCE_LANGUAGES", "uk,xx");
        let result = Config::from_env();
        clear_env();
        assert!(result.is_err());
    }

    #[test]
    fn test_require_translate_bearer_token() {
        let mut config = Config::default();
        assert!(matches!(
            config.require_translate_bearer_token(),
            Err(LocaleError::Configuration(_))
        ));

        config.translate_bearer_token = Some("token".to_string());
        assert_eq!(config.require_translate_bearer_token().unwrap(), "token");
    }

    #[test]
    fn test_provider_retry_starts_at_double_backoff() {
        let config = Config::default();
        let retry = config.provider_retry_config();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.initial_delay, Duration::from_secs(2));
    }
}

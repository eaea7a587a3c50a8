//! Direct access to the machine-translation provider.
//!
//! `deepl` speaks the provider's HTTP API one string at a time; `keywise`
//! walks a flattened document through it. [`DirectTranslator`] plugs that
//! engine into the pipeline so a run can bypass the translate function.

mod deepl;
pub mod keywise;

pub use deepl::{DeepLProvider, Formality, TextTranslator, TranslateOptions};
pub(crate) use deepl::http_error;
pub use keywise::{translate_entries, EngineSettings};

use crate::config::Config;
use crate::error::LocaleError;
use crate::locale::{FlatLocaleMap, SupportedLanguage};
use crate::pipeline::Translator;
use tracing::info;

/// Translates whole documents by calling the provider key by key.
pub struct DirectTranslator<P = DeepLProvider> {
    provider: P,
    settings: EngineSettings,
}

impl DirectTranslator<DeepLProvider> {
    pub fn from_config(config: &Config) -> Result<Self, LocaleError> {
        let api_key = config.require_deepl_api_key()?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| LocaleError::Configuration(format!("Failed to build HTTP client: {}", e)))?;
        let provider = DeepLProvider::new(
            client,
            config.deepl_api_url.clone(),
            api_key,
            config.request_timeout,
        );
        Ok(Self::new(provider, EngineSettings::from_config(config)))
    }
}

impl<P: TextTranslator> DirectTranslator<P> {
    pub fn new(provider: P, settings: EngineSettings) -> Self {
        Self { provider, settings }
    }
}

impl<P: TextTranslator + Sync> Translator for DirectTranslator<P> {
    async fn translate(
        &self,
        source: &FlatLocaleMap,
        language: SupportedLanguage,
    ) -> Result<FlatLocaleMap, LocaleError> {
        let target = language
            .provider_code()
            .ok_or_else(|| LocaleError::UnsupportedLanguage(language.code().to_string()))
            .map_err(|e| e.for_language(language))?;

        info!("Translating {} keys directly to {} ({})", source.len(), language.display_name(), target);

        translate_entries(&self.provider, source, target, &self.settings)
            .await
            .map_err(|e| e.for_language(language))
    }
}

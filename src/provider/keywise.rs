//! Key-by-key translation of a flattened document against a single-string
//! provider.
//!
//! Keys are processed in document order. Skip-list values are copied without
//! a call; everything else is throttled, placeholder-guarded, sent with
//! retries, and restored. The first key that exhausts its retries fails the
//! whole document.

use crate::config::Config;
use crate::error::LocaleError;
use crate::locale::{FlatLocaleMap, ProtectedText, SkipList};
use crate::provider::{TextTranslator, TranslateOptions};
use crate::retry::{with_retry_classified, RetryConfig};
use crate::throttle::Throttle;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Provider code of the language uploaded files are written in
pub const SOURCE_PROVIDER_LANG: &str = "EN";

/// Knobs for one key-by-key translation.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub retry: RetryConfig,
    pub throttle_after: u32,
    pub throttle_pause: Duration,
    pub source_lang: Option<String>,
    pub options: TranslateOptions,
    pub skip_list: SkipList,
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            retry: config.provider_retry_config(),
            throttle_after: config.throttle_after,
            throttle_pause: config.throttle_pause,
            source_lang: Some(SOURCE_PROVIDER_LANG.to_string()),
            options: TranslateOptions::default(),
            skip_list: SkipList::default(),
        }
    }
}

/// Translate every value of `source` into the provider language `target_lang`.
pub async fn translate_entries<P: TextTranslator>(
    provider: &P,
    source: &FlatLocaleMap,
    target_lang: &str,
    settings: &EngineSettings,
) -> Result<FlatLocaleMap, LocaleError> {
    let mut throttle = Throttle::new(settings.throttle_after, settings.throttle_pause);
    let mut translated = FlatLocaleMap::with_capacity(source.len());
    let mut skipped = 0;

    for (key, value) in source {
        if settings.skip_list.contains(value) {
            translated.insert(key.clone(), value.clone());
            skipped += 1;
            continue;
        }

        throttle.acquire().await;

        let protected = ProtectedText::protect(value);
        let operation_name = format!("Translating '{}' to {}", key, target_lang);
        let text = with_retry_classified(
            &settings.retry,
            &operation_name,
            || {
                provider.translate_text(
                    &protected.text,
                    settings.source_lang.as_deref(),
                    target_lang,
                    &settings.options,
                )
            },
            LocaleError::retry_decision,
        )
        .await?;

        let missing = protected.missing_markers(&text);
        if !missing.is_empty() {
            warn!(
                "Placeholder markers {:?} missing from translation of '{}' ({})",
                missing, key, target_lang
            );
        }

        translated.insert(key.clone(), protected.restore(&text));
    }

    debug!("{} of {} keys matched the skip list", skipped, source.len());
    info!(
        "Translated {} keys to {} with {} provider requests",
        translated.len(),
        target_lang,
        throttle.sent()
    );

    Ok(translated)
}

//! Run orchestration: parse the upload once, then produce one translated
//! map per supported language.
//!
//! Languages are handled sequentially in enumeration order. A failure for
//! one language is recorded and the run moves on. Parse and key errors stop a
//! run before any remote call is made, and a configuration error stops it at
//! the first language that reports one.

use crate::error::LocaleError;
use crate::input::parse_locale_file;
use crate::locale::{flatten, FlatLocaleMap, LanguagePolicy, SupportedLanguage, TargetMode};
use std::collections::BTreeMap;
use std::future::Future;
use tracing::{error, info};

/// Something that turns a source map into its translation for one language.
pub trait Translator {
    fn translate(
        &self,
        source: &FlatLocaleMap,
        language: SupportedLanguage,
    ) -> impl Future<Output = Result<FlatLocaleMap, LocaleError>> + Send;
}

/// How far a run has progressed. `completed` never exceeds `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressState {
    pub total: usize,
    pub completed: usize,
}

impl ProgressState {
    pub fn is_done(&self) -> bool {
        self.completed == self.total
    }
}

/// Translated maps keyed by language; always contains the source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationSet {
    entries: BTreeMap<SupportedLanguage, FlatLocaleMap>,
}

impl TranslationSet {
    pub fn with_source(source: FlatLocaleMap) -> Self {
        let mut set = Self::default();
        set.insert(SupportedLanguage::SOURCE, source);
        set
    }

    pub fn source(&self) -> Option<&FlatLocaleMap> {
        self.get(SupportedLanguage::SOURCE)
    }

    pub fn get(&self, language: SupportedLanguage) -> Option<&FlatLocaleMap> {
        self.entries.get(&language)
    }

    pub fn insert(&mut self, language: SupportedLanguage, map: FlatLocaleMap) {
        self.entries.insert(language, map);
    }

    pub fn contains(&self, language: SupportedLanguage) -> bool {
        self.entries.contains_key(&language)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SupportedLanguage, &FlatLocaleMap)> {
        self.entries.iter().map(|(language, map)| (*language, map))
    }
}

/// Per-language failure messages
pub type LanguageErrorSet = BTreeMap<SupportedLanguage, String>;

/// Outcome of a run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub translations: TranslationSet,
    pub errors: LanguageErrorSet,
    pub progress: ProgressState,
}

impl RunReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Status line for the user, present only when some language failed
    pub fn summary(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        let failed: Vec<&str> = self.errors.keys().map(|l| l.display_name()).collect();
        Some(format!(
            "Translation completed with errors for: {}. Download will include successful translations only.",
            failed.join(", ")
        ))
    }
}

pub struct Pipeline<T> {
    translator: T,
    policy: LanguagePolicy,
}

impl<T: Translator> Pipeline<T> {
    pub fn new(translator: T) -> Self {
        Self::with_policy(translator, LanguagePolicy::default())
    }

    pub fn with_policy(translator: T, policy: LanguagePolicy) -> Self {
        Self { translator, policy }
    }

    pub async fn run(&self, content: &str) -> Result<RunReport, LocaleError> {
        self.run_with_progress(content, |_| {}).await
    }

    /// Translate `content` into every target language, reporting progress
    /// after each language finishes (successfully or not).
    pub async fn run_with_progress<F>(&self, content: &str, mut on_progress: F) -> Result<RunReport, LocaleError>
    where
        F: FnMut(&ProgressState),
    {
        let document = parse_locale_file(content)?;
        let source = flatten(&document)?;
        info!("Loaded {} keys from source file", source.len());

        let targets: Vec<SupportedLanguage> = SupportedLanguage::targets().collect();
        let mut progress = ProgressState {
            total: targets.len(),
            completed: 0,
        };
        let mut translations = TranslationSet::with_source(source.clone());
        let mut errors = LanguageErrorSet::new();

        on_progress(&progress);

        for language in targets {
            match self.translate_one(&source, language).await {
                Ok(map) => {
                    info!("✓ {} ready ({} keys)", language.display_name(), map.len());
                    translations.insert(language, map);
                }
                Err(e) if e.is_configuration() => {
                    error!("Stopping run, {} failed: {}", language.display_name(), e);
                    return Err(e.into_cause());
                }
                Err(e) => {
                    let e = e.for_language(language);
                    error!("{}", e);
                    errors.insert(language, e.to_string());
                }
            }

            progress.completed += 1;
            on_progress(&progress);
        }

        info!(
            "Run finished: {} of {} languages translated",
            progress.total - errors.len(),
            progress.total
        );

        Ok(RunReport {
            translations,
            errors,
            progress,
        })
    }

    async fn translate_one(
        &self,
        source: &FlatLocaleMap,
        language: SupportedLanguage,
    ) -> Result<FlatLocaleMap, LocaleError> {
        match self.policy.mode_for(language) {
            TargetMode::Translate => self.translator.translate(source, language).await,
            TargetMode::CopySource => {
                info!("Copying source for {}", language.display_name());
                Ok(source.clone())
            }
            TargetMode::Skip => Err(LocaleError::UnsupportedLanguage(language.code().to_string())),
        }
    }
}

//! Per-language special cases.
//!
//! Some targets cannot be translated by the provider in use. Rather than
//! branching on language codes inside the pipeline, the pipeline asks this
//! table what to do with each target.

use crate::error::LocaleError;
use crate::locale::SupportedLanguage;
use std::collections::HashMap;

/// What the pipeline does with one target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMode {
    /// Send the document to the translator
    Translate,
    /// Copy the source document verbatim
    CopySource,
    /// Record the language as unsupported without calling anything
    Skip,
}

/// Lookup table of special-cased target languages.
#[derive(Debug, Clone)]
pub struct LanguagePolicy {
    overrides: HashMap<SupportedLanguage, TargetMode>,
}

impl LanguagePolicy {
    /// A policy that translates every target.
    pub fn translate_all() -> Self {
        Self {
            overrides: HashMap::new(),
        }
    }

    /// Build a policy that copies the source for the given language codes.
    pub fn copy_source_for<S: AsRef<str>>(codes: &[S]) -> Result<Self, LocaleError> {
        let mut policy = Self::translate_all();
        for code in codes {
            let language = SupportedLanguage::from_code(code.as_ref().trim())?;
            policy = policy.with_mode(language, TargetMode::CopySource);
        }
        Ok(policy)
    }

    pub fn with_mode(mut self, language: SupportedLanguage, mode: TargetMode) -> Self {
        self.overrides.insert(language, mode);
        self
    }

    pub fn mode_for(&self, language: SupportedLanguage) -> TargetMode {
        self.overrides
            .get(&language)
            .copied()
            .unwrap_or(TargetMode::Translate)
    }
}

impl Default for LanguagePolicy {
    /// Ukrainian is copied from the source: the provider version in use
    /// has no target code for it.
    fn default() -> Self {
        Self::translate_all().with_mode(SupportedLanguage::Uk, TargetMode::CopySource)
    }
}

//! SupportedLanguage: the closed set of languages a locale file is exported in.
//!
//! Each language carries its internal code (used for file names and the
//! outbound request), an English display name (used in status messages),
//! and the code the translation provider expects, which may differ.

use crate::error::LocaleError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A language this tool exports.
///
/// Variant order is the enumeration order used by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SupportedLanguage {
    Pl,
    Uk,
    De,
    It,
    Es,
    EnUk,
}

impl SupportedLanguage {
    /// Every supported language, in enumeration order
    pub const ALL: [SupportedLanguage; 6] = [
        SupportedLanguage::Pl,
        SupportedLanguage::Uk,
        SupportedLanguage::De,
        SupportedLanguage::It,
        SupportedLanguage::Es,
        SupportedLanguage::EnUk,
    ];

    /// The language uploaded files are written in.
    pub const SOURCE: SupportedLanguage = SupportedLanguage::EnUk;

    /// Internal language code (e.g. "pl", "en-UK")
    pub fn code(&self) -> &'static str {
        match self {
            SupportedLanguage::Pl => "pl",
            SupportedLanguage::Uk => "uk",
            SupportedLanguage::De => "de",
            SupportedLanguage::It => "it",
            SupportedLanguage::Es => "es",
            SupportedLanguage::EnUk => "en-UK",
        }
    }

    /// English display name (e.g. "Polish")
    pub fn display_name(&self) -> &'static str {
        match self {
            SupportedLanguage::Pl => "Polish",
            SupportedLanguage::Uk => "Ukrainian",
            SupportedLanguage::De => "German",
            SupportedLanguage::It => "Italian",
            SupportedLanguage::Es => "Spanish",
            SupportedLanguage::EnUk => "British English",
        }
    }

    /// Target language code understood by the provider.
    ///
    /// `None` means the provider version in use cannot translate into it.
    pub fn provider_code(&self) -> Option<&'static str> {
        match self {
            SupportedLanguage::Pl => Some("PL"),
            SupportedLanguage::Uk => None,
            SupportedLanguage::De => Some("DE"),
            SupportedLanguage::It => Some("IT"),
            SupportedLanguage::Es => Some("ES"),
            SupportedLanguage::EnUk => Some("EN-GB"),
        }
    }

    /// Look up a language by its internal code (exact match).
    pub fn from_code(code: &str) -> Result<SupportedLanguage, LocaleError> {
        Self::ALL
            .into_iter()
            .find(|language| language.code() == code)
            .ok_or_else(|| LocaleError::UnsupportedLanguage(code.to_string()))
    }

    pub fn is_source(&self) -> bool {
        *self == Self::SOURCE
    }

    /// All languages except the source, in enumeration order
    pub fn targets() -> impl Iterator<Item = SupportedLanguage> {
        Self::ALL.into_iter().filter(|language| !language.is_source())
    }
}

impl fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SupportedLanguage {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl Serialize for SupportedLanguage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for SupportedLanguage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Self::from_code(&code).map_err(serde::de::Error::custom)
    }
}

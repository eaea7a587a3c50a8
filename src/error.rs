use crate::locale::SupportedLanguage;
use crate::retry::RetryDecision;
use std::time::Duration;
use thiserror::Error;

/// Display prefix of [`LocaleError::Configuration`]; the translate function
/// sends it back verbatim in its error body
pub const CONFIGURATION_PREFIX: &str = "Configuration error: ";

/// Errors produced by the translation pipeline and its collaborators.
#[derive(Debug, Error)]
pub enum LocaleError {
    /// The uploaded file is not valid JSON after comment and trailing-comma stripping
    #[error("Error processing the file. Please make sure it's a valid JSON file: {0}")]
    Parse(String),

    /// A key cannot be represented as a dotted path
    #[error("Invalid locale key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// One target language could not be translated
    #[error("Failed to translate to {}: {cause}", .language.display_name())]
    Translation {
        language: SupportedLanguage,
        #[source]
        cause: Box<LocaleError>,
    },

    /// An outbound request did not complete in time
    #[error("Translation request timed out after {0:?}")]
    Timeout(Duration),

    /// The remote side answered with a non-2xx status
    #[error("Translation service error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// Transport-level failure (connection refused, malformed body, ...)
    #[error("Translation request failed: {0}")]
    Http(String),

    /// A required credential or setting is missing
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The language code is unknown or the provider cannot handle it
    #[error("Language '{0}' is not supported by the translation provider")]
    UnsupportedLanguage(String),

    /// Archive assembly or writing failed
    #[error("Failed to export translations: {0}")]
    Export(String),
}

impl LocaleError {
    /// HTTP status of a remote failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            LocaleError::Remote { status, .. } => Some(*status),
            LocaleError::Translation { cause, .. } => cause.status(),
            _ => None,
        }
    }

    /// Whether this error (or the cause it wraps) is a timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            LocaleError::Timeout(_) => true,
            LocaleError::Translation { cause, .. } => cause.is_timeout(),
            _ => false,
        }
    }

    /// Whether this error (or the cause it wraps) is a missing credential or
    /// setting. Such errors end the whole run.
    pub fn is_configuration(&self) -> bool {
        match self {
            LocaleError::Configuration(_) => true,
            LocaleError::Translation { cause, .. } => cause.is_configuration(),
            _ => false,
        }
    }

    /// Strip the per-language wrapper, if any
    pub fn into_cause(self) -> LocaleError {
        match self {
            LocaleError::Translation { cause, .. } => cause.into_cause(),
            other => other,
        }
    }

    /// Whether the failure signals that the remote side is rate-limiting us
    pub fn is_rate_limited(&self) -> bool {
        match self {
            LocaleError::Remote { status, message } => {
                *status == 429 || message.to_lowercase().contains("too many requests")
            }
            LocaleError::Http(message) => message.to_lowercase().contains("too many requests"),
            LocaleError::Translation { cause, .. } => cause.is_rate_limited(),
            _ => false,
        }
    }

    /// Retry policy for outbound calls: rate limits escalate the backoff,
    /// client errors (other than 408/429) and local misconfiguration abort,
    /// everything else (5xx, transport, timeouts) is retried.
    pub fn retry_decision(&self) -> RetryDecision {
        if self.is_rate_limited() {
            return RetryDecision::RateLimited;
        }
        match self {
            LocaleError::Remote { status, .. } if (400..500).contains(status) && *status != 408 => {
                RetryDecision::Abort
            }
            LocaleError::Configuration(_)
            | LocaleError::UnsupportedLanguage(_)
            | LocaleError::Parse(_)
            | LocaleError::InvalidKey { .. }
            | LocaleError::Export(_) => RetryDecision::Abort,
            LocaleError::Translation { cause, .. } => cause.retry_decision(),
            _ => RetryDecision::Retry,
        }
    }

    /// Wrap an error as the failure of one target language
    pub fn for_language(self, language: SupportedLanguage) -> LocaleError {
        match self {
            already @ LocaleError::Translation { .. } => already,
            cause => LocaleError::Translation {
                language,
                cause: Box::new(cause),
            },
        }
    }
}

impl From<reqwest::Error> for LocaleError {
    fn from(error: reqwest::Error) -> Self {
        LocaleError::Http(error.to_string())
    }
}

impl From<zip::result::ZipError> for LocaleError {
    fn from(error: zip::result::ZipError) -> Self {
        LocaleError::Export(error.to_string())
    }
}

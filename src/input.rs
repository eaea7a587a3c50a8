//! Inbound locale file parsing.
//!
//! Locale files are often hand-edited and carry `//` or `/* */` comments and
//! trailing commas. They are accepted here and turned into a plain JSON value.

use crate::error::LocaleError;
use jsonc_parser::ParseOptions;
use serde_json::Value;

/// Parse locale file contents, tolerating comments and trailing commas.
pub fn parse_locale_file(content: &str) -> Result<Value, LocaleError> {
    let value = jsonc_parser::parse_to_serde_value(content, &ParseOptions::default())
        .map_err(|e| LocaleError::Parse(e.to_string()))?;

    match value {
        Some(value @ Value::Object(_)) => Ok(value),
        Some(_) => Err(LocaleError::Parse(
            "expected a JSON object at the top level".to_string(),
        )),
        None => Err(LocaleError::Parse("file is empty".to_string())),
    }
}

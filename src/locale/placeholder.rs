//! Placeholder guard.
//!
//! Template variables such as `{{ count }}` must come back from translation
//! byte-for-byte. Before a string is sent out, every variable is swapped for a
//! numbered marker (`__VAR0__`, `__VAR1__`, ...) that translation engines leave
//! alone; afterwards each marker is swapped back. Numbering starts past any
//! marker-shaped text already present in the input.

use regex::Regex;
use std::sync::OnceLock;

static VARIABLE_REGEX: OnceLock<Regex> = OnceLock::new();
static MARKER_REGEX: OnceLock<Regex> = OnceLock::new();

fn variable_regex() -> &'static Regex {
    VARIABLE_REGEX.get_or_init(|| Regex::new(r"\{\{[^{}]+\}\}").expect("Invalid variable regex"))
}

fn marker_regex() -> &'static Regex {
    MARKER_REGEX.get_or_init(|| Regex::new(r"__VAR(\d+)__").expect("Invalid marker regex"))
}

/// First marker number not already used literally in `input`
fn first_free_index(input: &str) -> usize {
    marker_regex()
        .captures_iter(input)
        .filter_map(|caps| caps[1].parse::<usize>().ok())
        .filter_map(|index| index.checked_add(1))
        .max()
        .unwrap_or(0)
}

/// Marker text for the variable at `index`
pub fn marker(index: usize) -> String {
    format!("__VAR{}__", index)
}

/// A string with its template variables replaced by markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedText {
    /// Text to send for translation
    pub text: String,
    /// Original variable text; `variables[i]` sits behind `marker(first_index + i)`
    pub variables: Vec<String>,
    /// Number of the first marker
    pub first_index: usize,
}

impl ProtectedText {
    /// Replace every `{{...}}` match, left to right, with its marker.
    pub fn protect(input: &str) -> Self {
        let first_index = first_free_index(input);
        let mut variables = Vec::new();
        let text = variable_regex()
            .replace_all(input, |caps: &regex::Captures<'_>| {
                variables.push(caps[0].to_string());
                marker(first_index + variables.len() - 1)
            })
            .into_owned();

        Self {
            text,
            variables,
            first_index,
        }
    }

    fn markers(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.variables.len()).map(move |i| marker(self.first_index + i))
    }

    /// Put the original variables back into `translated`.
    ///
    /// Markers are restored in index order, first occurrence each. A marker the
    /// translation dropped is simply skipped; a duplicated one stays as-is.
    pub fn restore(&self, translated: &str) -> String {
        let mut restored = translated.to_string();
        for (m, variable) in self.markers().zip(&self.variables) {
            restored = restored.replacen(&m, variable, 1);
        }
        restored
    }

    /// Markers that do not appear in `translated`.
    pub fn missing_markers(&self, translated: &str) -> Vec<String> {
        self.markers()
            .filter(|m| !translated.contains(m.as_str()))
            .collect()
    }
}

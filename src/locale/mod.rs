//! Locale data model and the text-level transformations applied around
//! translation.
//!
//! # Architecture
//!
//! - `language`: the closed set of supported languages and their codes
//! - `policy`: per-language special cases (copy source, skip)
//! - `flatten`: nested document <-> dotted-path map
//! - `placeholder`: `{{var}}` protection around remote calls
//! - `skip_list`: literal strings that are never translated

mod flatten;
mod language;
mod placeholder;
mod policy;
mod skip_list;

pub use flatten::{flatten, unflatten, FlatLocaleMap};
pub use language::SupportedLanguage;
pub use placeholder::{marker, ProtectedText};
pub use policy::{LanguagePolicy, TargetMode};
pub use skip_list::SkipList;

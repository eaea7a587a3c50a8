//! Translate nested JSON locale files into every supported language.
//!
//! A run parses the upload, flattens it to dotted keys, asks a
//! [`pipeline::Translator`] for each target language and collects the
//! results (and per-language failures) into a [`pipeline::RunReport`],
//! which [`export`] turns into a zip of `<code>.json` files.

pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod input;
pub mod locale;
pub mod pipeline;
pub mod provider;
pub mod retry;
pub mod security;
pub mod service;
pub mod throttle;

pub use error::LocaleError;

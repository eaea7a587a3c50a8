//! Zip export of a translation set: one `<code>.json` per language.

use crate::error::LocaleError;
use crate::locale::unflatten;
use crate::pipeline::TranslationSet;
use std::io::{Cursor, Write};
use std::path::Path;
use tracing::info;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

pub const DEFAULT_ARCHIVE_NAME: &str = "shopify-translations.zip";

/// Build the archive in memory
pub fn build_archive(translations: &TranslationSet) -> Result<Vec<u8>, LocaleError> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for (language, map) in translations.iter() {
        let document = unflatten(map)
            .map_err(|e| LocaleError::Export(format!("Cannot rebuild {}.json: {}", language, e)))?;
        let content = serde_json::to_string_pretty(&document)
            .map_err(|e| LocaleError::Export(format!("Failed to serialize {}: {}", language, e)))?;

        zip.start_file(format!("{}.json", language.code()), options)?;
        zip.write_all(content.as_bytes())
            .map_err(|e| LocaleError::Export(format!("Failed to write {}.json: {}", language, e)))?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Build the archive and write it to `path`
pub fn write_archive(translations: &TranslationSet, path: &Path) -> Result<(), LocaleError> {
    let bytes = build_archive(translations)?;
    std::fs::write(path, &bytes)
        .map_err(|e| LocaleError::Export(format!("Failed to write {}: {}", path.display(), e)))?;
    info!(
        "Wrote {} languages to {} ({} bytes)",
        translations.len(),
        path.display(),
        bytes.len()
    );
    Ok(())
}

//! Document emitter: writes the dashboard's JSON documents.
//!
//! Documents are pretty-printed with two-space indentation and no trailing
//! newline. Identical summaries always produce identical bytes.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::types::{CountryDocument, DetailedCarbonSummary};

/// File name of Document A (every country's summary).
pub const COUNTRY_DOCUMENT: &str = "european-data.json";

/// File name of Document B (the half-hourly carbon summary).
pub const DETAILED_DOCUMENT: &str = "uk-carbon.json";

/// Paths written by [`emit_documents`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmittedDocuments {
    pub country_document: PathBuf,
    pub detailed_document: Option<PathBuf>,
    pub compressed: Vec<PathBuf>,
}

/// Serializes a document the way it is written to disk.
pub fn to_document_bytes(value: &impl Serialize) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(value)?)
}

/// Logs `value` as pretty JSON at info level.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes `value` as pretty JSON to `path`, returning the bytes written.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<Vec<u8>> {
    let bytes = to_document_bytes(value)?;
    fs::write(path, &bytes).with_context(|| format!("failed to write '{}'", path.display()))?;
    debug!(path = %path.display(), bytes = bytes.len(), "Document written");
    Ok(bytes)
}

/// Writes a gzip-compressed copy of `bytes` next to `path` (`<path>.gz`).
pub fn write_gzip_copy(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    let mut gz_path = path.as_os_str().to_owned();
    gz_path.push(".gz");
    let gz_path = PathBuf::from(gz_path);

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    let compressed = encoder.finish()?;

    fs::write(&gz_path, &compressed)
        .with_context(|| format!("failed to write '{}'", gz_path.display()))?;
    debug!(
        path = %gz_path.display(),
        original = bytes.len(),
        compressed = compressed.len(),
        "Compressed copy written"
    );
    Ok(gz_path)
}

/// Writes Document A and, when present, Document B into `output_dir`.
#[tracing::instrument(skip(document, detailed), fields(output_dir = %output_dir.display()))]
pub fn emit_documents(
    output_dir: &Path,
    document: &CountryDocument,
    detailed: Option<&DetailedCarbonSummary>,
    gzip: bool,
) -> Result<EmittedDocuments> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory '{}'", output_dir.display()))?;

    let mut emitted = EmittedDocuments {
        country_document: output_dir.join(COUNTRY_DOCUMENT),
        ..Default::default()
    };

    let bytes = write_json(&emitted.country_document, document)?;
    if gzip {
        emitted
            .compressed
            .push(write_gzip_copy(&emitted.country_document, &bytes)?);
    }

    if let Some(summary) = detailed {
        let path = output_dir.join(DETAILED_DOCUMENT);
        let bytes = write_json(&path, summary)?;
        if gzip {
            emitted.compressed.push(write_gzip_copy(&path, &bytes)?);
        }
        emitted.detailed_document = Some(path);
    }

    info!(
        countries = document.len(),
        detailed = emitted.detailed_document.is_some(),
        compressed = emitted.compressed.len(),
        "Documents emitted"
    );
    Ok(emitted)
}

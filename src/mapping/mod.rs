//! Mapping store module
//!
//! Loads the endpoint mapping file and folds it into a lookup table of
//! normalized path -> (query, column projection). The file is re-read on
//! every request so edits take effect without a restart.

mod types;

pub use types::{MappingEntry, MappingTable};

use thiserror::Error;
use types::MappingFile;

/// Failure to produce a mapping table from the configured source
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("mapping source unavailable: {0}")]
    SourceUnavailable(#[source] std::io::Error),
    #[error("malformed mapping source: {0}")]
    ParseFailure(#[source] serde_yaml::Error),
}

/// Read and parse the mapping file at `path`
pub async fn load(path: &str) -> Result<MappingTable, ConfigError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(ConfigError::SourceUnavailable)?;
    parse(&raw)
}

/// Parse mapping file contents into a lookup table
///
/// Pure function of the source bytes. Later entries overwrite earlier ones
/// with the same normalized endpoint (last write wins, in file order).
pub fn parse(raw: &str) -> Result<MappingTable, ConfigError> {
    // An empty or all-comments document parses as null; treat it as no mappings.
    let file: Option<MappingFile> = serde_yaml::from_str(raw).map_err(ConfigError::ParseFailure)?;
    let mappings = file
        .unwrap_or_default()
        .mappings
        .unwrap_or_default();

    let mut table = MappingTable::new();
    for raw_entry in mappings {
        let endpoint = normalize_path(raw_entry.api_endpoint.as_deref().unwrap_or(""));
        let entry = MappingEntry {
            endpoint: endpoint.clone(),
            query: raw_entry.query.unwrap_or_default().trim().to_string(),
            columns: raw_entry.columns.unwrap_or_default(),
        };
        table.insert(endpoint, entry);
    }
    Ok(table)
}

/// Canonicalize a path so configured endpoints and request paths compare equal
///
/// Trims whitespace, ensures a leading `/`, and strips trailing slashes
/// (except for the root). The same function is applied to both sides of the
/// lookup; resolution depends on that symmetry.
pub fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim();
    let path = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    };
    let stripped = path.trim_end_matches('/');
    if stripped.is_empty() {
        "/".to_string()
    } else {
        stripped.to_string()
    }
}

// Mapping table types
// Defines the in-memory shape of the endpoint mapping file

use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;

/// One declared binding of an HTTP path to a query and a column projection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    /// Canonicalized endpoint path (starts with `/`, no trailing `/` unless root)
    pub endpoint: String,
    /// SQL statement, trusted verbatim; may be empty (rejected at lookup time)
    pub query: String,
    /// Source column name -> output field name, in file order
    pub columns: IndexMap<String, String>,
}

/// Lookup table keyed by canonical endpoint path
pub type MappingTable = HashMap<String, MappingEntry>;

/// On-disk mapping file schema
///
/// All fields tolerate being absent or explicitly null, matching the
/// permissive reading the deployment format has always had.
#[derive(Debug, Deserialize, Default)]
pub(crate) struct MappingFile {
    #[serde(default)]
    pub mappings: Option<Vec<RawMapping>>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct RawMapping {
    #[serde(default)]
    pub api_endpoint: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub columns: Option<IndexMap<String, String>>,
}

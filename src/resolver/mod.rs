//! Request resolution module
//!
//! Resolves one inbound request to a query result: normalize the path,
//! look it up in the current mapping table, execute the bound query, and
//! project the rows into the response shape.

use crate::config::DatabaseConfig;
use crate::db::{self, ResultRow, SqlValue};
use crate::mapping::{self, MappingTable};
use indexmap::IndexMap;
use thiserror::Error;

/// Output object: output field name -> value, in projection order
pub type ProjectedObject = IndexMap<String, SqlValue>;

/// Failure to resolve a request to a query result
///
/// Each variant maps deterministically to one HTTP status: `NoMapping` is
/// the client's problem (404), the other two are configuration or store
/// defects (500).
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no mapping for endpoint '{0}'")]
    NoMapping(String),
    #[error("empty query in mapping")]
    EmptyQuery,
    #[error("{0}")]
    ExecutionFailure(String),
}

/// Resolve a raw request path against the mapping table
pub async fn resolve(
    raw_path: &str,
    table: &MappingTable,
    db_config: &DatabaseConfig,
) -> Result<Vec<ProjectedObject>, ResolveError> {
    // Same normalization as the table keys; lookup is by equality.
    let path = mapping::normalize_path(raw_path);

    let entry = table
        .get(&path)
        .ok_or_else(|| ResolveError::NoMapping(path.clone()))?;

    // Checked before touching the database: an empty query is a
    // configuration defect, not a query to run.
    if entry.query.trim().is_empty() {
        return Err(ResolveError::EmptyQuery);
    }

    let rows = db::execute(db_config, &entry.query)
        .await
        .map_err(|e| ResolveError::ExecutionFailure(e.to_string()))?;

    Ok(rows
        .iter()
        .map(|row| project_row(row, &entry.columns))
        .collect())
}

/// Reshape one row according to the entry's column projection
///
/// Each `(db_col, api_field)` pair copies the row's `db_col` value under
/// `api_field`; a column missing from the row projects as null. An empty
/// projection returns the row unchanged.
pub fn project_row(row: &ResultRow, columns: &IndexMap<String, String>) -> ProjectedObject {
    if columns.is_empty() {
        return row.clone();
    }

    let mut out = ProjectedObject::new();
    for (db_col, api_field) in columns {
        let value = row.get(db_col).cloned().unwrap_or(SqlValue::Null);
        out.insert(api_field.clone(), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::MappingEntry;

    fn sample_row() -> ResultRow {
        let mut row = ResultRow::new();
        row.insert("id".to_string(), SqlValue::Int(5));
        row.insert("name".to_string(), SqlValue::Text("x".to_string()));
        row
    }

    fn columns(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    /// Database config pointing nowhere; resolution errors that precede
    /// execution must never reach it.
    fn unroutable_db() -> DatabaseConfig {
        DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            user: "nobody".to_string(),
            password: String::new(),
            name: "none".to_string(),
            connect_timeout: 1,
            query_timeout: 1,
        }
    }

    fn table_with(endpoint: &str, query: &str) -> MappingTable {
        let mut table = MappingTable::new();
        table.insert(
            endpoint.to_string(),
            MappingEntry {
                endpoint: endpoint.to_string(),
                query: query.to_string(),
                columns: IndexMap::new(),
            },
        );
        table
    }

    #[test]
    fn test_project_renames_and_drops() {
        let out = project_row(&sample_row(), &columns(&[("id", "identifier")]));
        assert_eq!(out.len(), 1);
        assert_eq!(out.get("identifier"), Some(&SqlValue::Int(5)));
        assert!(!out.contains_key("name"));
    }

    #[test]
    fn test_project_identity_fallback() {
        let row = sample_row();
        let out = project_row(&row, &IndexMap::new());
        assert_eq!(out, row);
    }

    #[test]
    fn test_project_missing_column_is_null() {
        let out = project_row(&sample_row(), &columns(&[("missing", "f")]));
        assert_eq!(out.get("f"), Some(&SqlValue::Null));
    }

    #[test]
    fn test_project_preserves_projection_order() {
        let out = project_row(&sample_row(), &columns(&[("name", "n"), ("id", "i")]));
        let keys: Vec<&String> = out.keys().collect();
        assert_eq!(keys, ["n", "i"]);
    }

    #[tokio::test]
    async fn test_resolve_unmapped_endpoint() {
        let table = MappingTable::new();
        let err = resolve("/nope", &table, &unroutable_db()).await.unwrap_err();
        assert!(matches!(err, ResolveError::NoMapping(ref p) if p == "/nope"));
        assert_eq!(err.to_string(), "no mapping for endpoint '/nope'");
    }

    #[tokio::test]
    async fn test_resolve_normalizes_before_lookup() {
        let table = table_with("/users", "");
        // Trailing slash resolves to the same entry; failure mode is
        // EmptyQuery, not NoMapping, proving the lookup matched.
        let err = resolve("/users/", &table, &unroutable_db()).await.unwrap_err();
        assert!(matches!(err, ResolveError::EmptyQuery));
    }

    #[tokio::test]
    async fn test_resolve_empty_query_skips_database() {
        let table = table_with("/users", "");
        // The unroutable database config would produce ExecutionFailure if
        // a connection were attempted.
        let err = resolve("/users", &table, &unroutable_db()).await.unwrap_err();
        assert!(matches!(err, ResolveError::EmptyQuery));
        assert_eq!(err.to_string(), "empty query in mapping");
    }

    #[tokio::test]
    async fn test_resolve_whitespace_query_is_empty() {
        let table = table_with("/users", "   ");
        let err = resolve("/users", &table, &unroutable_db()).await.unwrap_err();
        assert!(matches!(err, ResolveError::EmptyQuery));
    }

    #[tokio::test]
    async fn test_resolve_unreachable_store_is_execution_failure() {
        let table = table_with("/users", "SELECT 1");
        let err = resolve("/users", &table, &unroutable_db()).await.unwrap_err();
        assert!(matches!(err, ResolveError::ExecutionFailure(_)));
    }
}

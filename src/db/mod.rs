//! Query execution module
//!
//! Opens a fresh connection to the relational store per call, executes the
//! configured query with no parameters, and decodes the rows. No pooling:
//! connection lifetime is scoped to the single query, released on every
//! exit path.

mod value;

pub use value::{ResultRow, SqlValue};

use crate::config::DatabaseConfig;
use crate::logger;
use std::time::Duration;
use thiserror::Error;
use tokio_postgres::NoTls;

/// Failure while executing a query against the store
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("database connection failed: {0}")]
    Connect(#[source] tokio_postgres::Error),
    #[error("query execution failed: {0}")]
    Execute(#[source] tokio_postgres::Error),
    #[error("query timed out after {0}s")]
    Timeout(u64),
}

/// Execute `sql` verbatim and return the decoded rows in store order
///
/// The statement is never interpolated with request data and carries no
/// bind parameters. Failed executions are surfaced immediately, never
/// retried: the query is opaque and may not be idempotent.
pub async fn execute(db: &DatabaseConfig, sql: &str) -> Result<Vec<ResultRow>, QueryError> {
    let mut pg_config = tokio_postgres::Config::new();
    pg_config
        .host(&db.host)
        .port(db.port)
        .user(&db.user)
        .password(&db.password)
        .dbname(&db.name)
        .connect_timeout(Duration::from_secs(db.connect_timeout));

    let (client, connection) = pg_config
        .connect(NoTls)
        .await
        .map_err(QueryError::Connect)?;

    // The connection object drives the socket; it must be polled for the
    // client to make progress.
    let driver = tokio::spawn(async move {
        if let Err(e) = connection.await {
            logger::log_warning(&format!("database connection task ended: {e}"));
        }
    });

    let result = match tokio::time::timeout(
        Duration::from_secs(db.query_timeout),
        client.query(sql, &[]),
    )
    .await
    {
        Ok(Ok(rows)) => Ok(rows.iter().map(value::row_to_record).collect()),
        Ok(Err(e)) => Err(QueryError::Execute(e)),
        Err(_) => Err(QueryError::Timeout(db.query_timeout)),
    };

    // Release the connection regardless of outcome.
    drop(client);
    driver.abort();

    result
}

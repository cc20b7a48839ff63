//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DocumentStore` port from the `core` crate. Documents live as JSONB rows
//! in a single PostgreSQL table, keyed by collection, and are accessed with `sqlx`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use slate_core::filter::Filter;
use slate_core::ports::{
    DocumentStore, PortError, PortResult, QueryOutcome, RawDocument, STORE_ID_FIELD,
};
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tokio::sync::OnceCell;
use tracing::{info, warn};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A document store adapter that implements the `DocumentStore` port.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    timeout: Duration,
    /// Set once the migrations have been applied; shared between clones.
    schema: Arc<OnceCell<()>>,
}

impl PgDocumentStore {
    /// Creates a new `PgDocumentStore` over an existing pool.
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self {
            pool,
            timeout,
            schema: Arc::new(OnceCell::new()),
        }
    }

    /// Opens a lazily-connecting pool, so startup succeeds while the database is down.
    pub fn open(
        database_url: &str,
        max_connections: u32,
        timeout: Duration,
    ) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(timeout)
            .connect_lazy(database_url)?;
        Ok(Self::new(pool, timeout))
    }

    /// Applies the migrations unless a previous call already did.
    ///
    /// A failure is not remembered, so the first call after the database comes
    /// back applies the schema.
    pub async fn ensure_schema(&self) -> PortResult<()> {
        self.schema
            .get_or_try_init(|| async {
                match tokio::time::timeout(self.timeout, sqlx::migrate!("./migrations").run(&self.pool)).await {
                    Ok(Ok(())) => {
                        info!("Database migrations complete.");
                        Ok(())
                    }
                    Ok(Err(e)) => {
                        warn!(error = %e, "Database migrations failed");
                        Err(map_migrate_error(e))
                    }
                    Err(_) => {
                        warn!("Database migrations timed out");
                        Err(PortError::StoreUnavailable)
                    }
                }
            })
            .await
            .map(|_| ())
    }

    pub fn schema_applied(&self) -> bool {
        self.schema.initialized()
    }

    /// Runs one database call under the store timeout.
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> PortResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>> + Send,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(operation, error = %e, "Document store call failed");
                Err(map_sqlx_error(e))
            }
            Err(_) => {
                warn!(operation, timeout_ms = self.timeout.as_millis() as u64, "Document store call timed out");
                Err(PortError::StoreUnavailable)
            }
        }
    }
}

/// SQLSTATE `undefined_table`: the schema is gone or was never applied.
const UNDEFINED_TABLE: &str = "42P01";

fn is_missing_schema(code: Option<&str>) -> bool {
    code == Some(UNDEFINED_TABLE)
}

fn map_sqlx_error(e: sqlx::Error) -> PortError {
    match e {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => PortError::StoreUnavailable,
        sqlx::Error::Database(ref db) if is_missing_schema(db.code().as_deref()) => {
            PortError::StoreUnavailable
        }
        other => PortError::Unexpected(other.to_string()),
    }
}

fn map_migrate_error(e: MigrateError) -> PortError {
    match e {
        MigrateError::Execute(e) => map_sqlx_error(e),
        other => PortError::Unexpected(other.to_string()),
    }
}

/// The body written for an insert. The row key is the only identity, so a
/// caller-supplied store id is dropped.
fn stored_body(mut document: RawDocument) -> Value {
    document.remove(STORE_ID_FIELD);
    Value::Object(document)
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct DocumentRecord {
    id: Uuid,
    body: Json<Value>,
}
impl DocumentRecord {
    /// The stored body with the row key exposed as the store id field.
    fn to_raw(self) -> Option<RawDocument> {
        match self.body.0 {
            Value::Object(mut doc) => {
                doc.insert(STORE_ID_FIELD.to_string(), Value::String(self.id.to_string()));
                Some(doc)
            }
            _ => {
                warn!(id = %self.id, "Skipping stored document whose body is not a JSON object");
                None
            }
        }
    }
}

//=========================================================================================
// `DocumentStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn is_available(&self) -> bool {
        self.bounded("ping", sqlx::query("SELECT 1").execute(&self.pool))
            .await
            .is_ok()
            && self.ensure_schema().await.is_ok()
    }

    async fn list_collections(&self) -> Vec<String> {
        if self.ensure_schema().await.is_err() {
            return Vec::new();
        }
        self.bounded(
            "list_collections",
            sqlx::query_scalar::<_, String>(
                "SELECT DISTINCT collection FROM documents ORDER BY collection",
            )
            .fetch_all(&self.pool),
        )
        .await
        .unwrap_or_default()
    }

    async fn fetch(&self, collection: &str, filter: &Filter, limit: usize) -> QueryOutcome {
        if self.ensure_schema().await.is_err() {
            return QueryOutcome::Unavailable;
        }
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = self
            .bounded(
                "fetch",
                sqlx::query_as::<_, DocumentRecord>(
                    "SELECT id, body FROM documents \
                     WHERE collection = $1 AND body @> $2 \
                     ORDER BY created_at ASC, id ASC \
                     LIMIT $3",
                )
                .bind(collection)
                .bind(Json(filter.to_json()))
                .bind(limit)
                .fetch_all(&self.pool),
            )
            .await;

        match records {
            Ok(records) => QueryOutcome::from_documents(
                records.into_iter().filter_map(DocumentRecord::to_raw).collect(),
            ),
            Err(_) => QueryOutcome::Unavailable,
        }
    }

    async fn insert(&self, collection: &str, document: RawDocument) -> PortResult<String> {
        self.ensure_schema().await?;
        let id = Uuid::new_v4();
        self.bounded(
            "insert",
            sqlx::query(
                "INSERT INTO documents (id, collection, body, created_at) VALUES ($1, $2, $3, $4)",
            )
            .bind(id)
            .bind(collection)
            .bind(Json(stored_body(document)))
            .bind(Utc::now())
            .execute(&self.pool),
        )
        .await?;
        Ok(id.to_string())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

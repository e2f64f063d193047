//! PostgreSQL-backed `DocumentStore` implementation using Diesel ORM.
//!
//! Every collection shares the `documents` table, keyed by
//! `(collection, id)`. Field filters use JSONB containment so the GIN index
//! on `body` serves them.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::ports::{
    CollectionPath, DocumentStore, DocumentStoreError, FieldFilter, StoredDocument,
    generate_document_id, with_mirrored_id,
};

use super::models::{DocumentRow, NewDocumentRow};
use super::pool::{DbPool, PoolError};
use super::schema::documents;

/// Diesel-backed implementation of the `DocumentStore` port.
#[derive(Clone)]
pub struct DieselDocumentStore {
    pool: DbPool,
}

impl DieselDocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DocumentStoreError {
    DocumentStoreError::connection(error.message())
}

fn map_diesel_error(error: diesel::result::Error) -> DocumentStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(%error, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DocumentStoreError::connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            DocumentStoreError::query("duplicate document id")
        }
        DieselError::QueryBuilderError(_) => DocumentStoreError::query("database query error"),
        _ => DocumentStoreError::query("database error"),
    }
}

fn containment_probe(filter: &FieldFilter) -> Value {
    let mut probe = Map::new();
    probe.insert(filter.field.clone(), filter.value.clone());
    Value::Object(probe)
}

async fn upsert(
    conn: &mut AsyncPgConnection,
    row: &NewDocumentRow<'_>,
) -> Result<(), diesel::result::Error> {
    diesel::insert_into(documents::table)
        .values(row)
        .on_conflict((documents::collection, documents::id))
        .do_update()
        .set((
            documents::body.eq(excluded(documents::body)),
            documents::updated_at.eq(excluded(documents::updated_at)),
        ))
        .execute(conn)
        .await
        .map(|_| ())
}

#[async_trait]
impl DocumentStore for DieselDocumentStore {
    async fn get(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<StoredDocument, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<DocumentRow> = documents::table
            .filter(documents::collection.eq(collection.as_str()))
            .filter(documents::id.eq(id))
            .select(DocumentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| StoredDocument::new(row.id, row.body))
            .ok_or_else(|| DocumentStoreError::not_found(collection.as_str(), id))
    }

    async fn add(
        &self,
        collection: &CollectionPath,
        fields: Value,
    ) -> Result<String, DocumentStoreError> {
        let id = generate_document_id();
        let body = with_mirrored_id(fields, &id);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(documents::table)
            .values(&NewDocumentRow {
                collection: collection.as_str(),
                id: &id,
                body: &body,
                updated_at: Utc::now(),
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(id)
    }

    async fn set(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: Value,
    ) -> Result<(), DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewDocumentRow {
            collection: collection.as_str(),
            id,
            body: &fields,
            updated_at: Utc::now(),
        };
        upsert(&mut conn, &row).await.map_err(map_diesel_error)
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            documents::table
                .filter(documents::collection.eq(collection.as_str()))
                .filter(documents::id.eq(id)),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        if deleted == 0 {
            return Err(DocumentStoreError::not_found(collection.as_str(), id));
        }
        Ok(())
    }

    async fn list(
        &self,
        collection: &CollectionPath,
        filter: Option<FieldFilter>,
    ) -> Result<Vec<StoredDocument>, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = documents::table
            .filter(documents::collection.eq(collection.as_str()))
            .into_boxed();
        if let Some(filter) = &filter {
            query = query.filter(documents::body.contains(containment_probe(filter)));
        }

        let rows: Vec<DocumentRow> = query
            .order(documents::id.asc())
            .select(DocumentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|row| StoredDocument::new(row.id, row.body))
            .collect())
    }

    async fn set_all(
        &self,
        collection: &CollectionPath,
        documents: Vec<StoredDocument>,
    ) -> Result<(), DocumentStoreError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let now = Utc::now();
        conn.transaction(|conn| {
            async move {
                for document in &documents {
                    let row = NewDocumentRow {
                        collection: collection.as_str(),
                        id: &document.id,
                        body: &document.fields,
                        updated_at: now,
                    };
                    upsert(conn, &row).await?;
                }
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}

//! PostgreSQL document store. Maps to the `documents` table created by the
//! workspace migrations.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::document::id::{slug_for, DocumentRef};
use crate::document::model::{DocumentRecord, NewDocumentRecord};
use crate::error::StoreError;
use crate::mutation::RecordPatch;
use crate::ports::{DocumentStore, ListFilter, OrderBy};

const COLUMNS: &str = "id, kind, slug, title, authors, content, last_updated, creator_id, \
                       status, visibility, image_url, view_count, created_at, updated_at";

const LIST_LIMIT: i64 = 200;

#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn decode_text<T>(row: &PgRow, column: &str) -> Result<T, StoreError>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>()
        .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))
}

fn record_from_row(row: &PgRow) -> Result<DocumentRecord, StoreError> {
    Ok(DocumentRecord {
        id: row.try_get("id")?,
        kind: decode_text(row, "kind")?,
        slug: row.try_get("slug")?,
        title: row.try_get("title")?,
        authors: row.try_get("authors")?,
        content: row.try_get("content")?,
        last_updated: row.try_get("last_updated")?,
        creator_id: row.try_get("creator_id")?,
        status: decode_text(row, "status")?,
        visibility: decode_text(row, "visibility")?,
        image_url: row.try_get("image_url")?,
        view_count: row.try_get("view_count")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    #[tracing::instrument(skip(self))]
    async fn get(&self, reference: &DocumentRef) -> Result<Option<DocumentRecord>, StoreError> {
        let row = match reference {
            DocumentRef::Id(id) => {
                sqlx::query(&format!("SELECT {COLUMNS} FROM documents WHERE id = $1"))
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            DocumentRef::Slug(slug) => {
                sqlx::query(&format!("SELECT {COLUMNS} FROM documents WHERE slug = $1"))
                    .bind(slug)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        row.as_ref().map(record_from_row).transpose()
    }

    async fn list(
        &self,
        filter: &ListFilter,
        order: OrderBy,
    ) -> Result<Vec<DocumentRecord>, StoreError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM documents WHERE TRUE"));
        if let Some(kind) = filter.kind {
            qb.push(" AND kind = ").push_bind(kind.as_str());
        }
        if let Some(creator_id) = filter.creator_id {
            qb.push(" AND creator_id = ").push_bind(creator_id);
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(visibility) = filter.visibility {
            qb.push(" AND visibility = ").push_bind(visibility.as_str());
        }
        if filter.listed_only {
            qb.push(" AND status = 'published' AND visibility = 'public'");
        }
        if filter.exclude_deleted {
            qb.push(" AND status <> 'deleted'");
        }
        qb.push(" ORDER BY ")
            .push(order.sql())
            .push(", id LIMIT ")
            .push_bind(LIST_LIMIT);

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(record_from_row).collect()
    }

    #[tracing::instrument(skip(self, record), fields(kind = %record.kind))]
    async fn insert(&self, record: NewDocumentRecord) -> Result<DocumentRecord, StoreError> {
        let id = Uuid::new_v4();
        let row = sqlx::query(&format!(
            "INSERT INTO documents \
               (id, kind, slug, title, authors, content, last_updated, creator_id, status, visibility, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(record.kind.as_str())
        .bind(slug_for(&record.title, id))
        .bind(&record.title)
        .bind(&record.authors)
        .bind(&record.content)
        .bind(record.last_updated)
        .bind(record.creator_id)
        .bind(record.status.as_str())
        .bind(record.visibility.as_str())
        .bind(&record.image_url)
        .fetch_one(&self.pool)
        .await?;
        record_from_row(&row)
    }

    #[tracing::instrument(skip(self, patch), fields(fields = ?patch.fields()))]
    async fn update(&self, id: Uuid, patch: &RecordPatch) -> Result<DocumentRecord, StoreError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE documents SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(title) = &patch.title {
                set.push("title = ").push_bind_unseparated(title.clone());
            }
            if let Some(authors) = &patch.authors {
                set.push("authors = ").push_bind_unseparated(authors.clone());
            }
            if let Some(content) = &patch.content {
                set.push("content = ").push_bind_unseparated(content.clone());
            }
            if let Some(last_updated) = patch.last_updated {
                set.push("last_updated = ").push_bind_unseparated(last_updated);
            }
            if let Some(status) = patch.status {
                set.push("status = ").push_bind_unseparated(status.as_str());
            }
            if let Some(visibility) = patch.visibility {
                set.push("visibility = ").push_bind_unseparated(visibility.as_str());
            }
            if let Some(image_url) = &patch.image_url {
                set.push("image_url = ").push_bind_unseparated(image_url.clone());
            }
            set.push("updated_at = now()");
        }
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {COLUMNS}"));

        let row = qb
            .build()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record_from_row(&row)
    }

    async fn increment_views(&self, id: Uuid) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE documents SET view_count = view_count + 1 WHERE id = $1 RETURNING view_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

//! SQLite-backed [`ChunkStore`] implementation.
//!
//! Embedding vectors are stored as little-endian f32 BLOBs (see
//! `recall_core::embedding::vec_to_blob`); a NULL column means the
//! chunk has no embedding and will be skipped at index build time.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use recall_core::embedding::{blob_to_vec, vec_to_blob};
use recall_core::models::{Chunk, Document, Modality};
use recall_core::store::{ChunkFilter, ChunkStore};

/// SQLite implementation of the [`ChunkStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_document(row: &sqlx::sqlite::SqliteRow) -> Result<Document> {
    let modality: String = row.get("modality");
    Ok(Document {
        id: row.get("id"),
        title: row.get("title"),
        modality: modality.parse::<Modality>()?,
        source: row.get("source"),
        metadata_json: row.get("metadata_json"),
        created_at: row.get("created_at"),
    })
}

fn row_to_chunk(row: &sqlx::sqlite::SqliteRow) -> Chunk {
    let blob: Option<Vec<u8>> = row.get("embedding");
    Chunk {
        id: row.get("id"),
        document_id: row.get("document_id"),
        chunk_index: row.get("chunk_index"),
        text: row.get("text"),
        tokens: row.get("tokens"),
        embedding: blob.map(|b| blob_to_vec(&b)),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl ChunkStore for SqliteStore {
    async fn insert_document(&self, doc: &Document) -> Result<String> {
        sqlx::query(
            r#"
            INSERT INTO documents (id, title, modality, source, metadata_json, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&doc.id)
        .bind(&doc.title)
        .bind(doc.modality.as_str())
        .bind(&doc.source)
        .bind(&doc.metadata_json)
        .bind(doc.created_at)
        .execute(&self.pool)
        .await?;

        Ok(doc.id.clone())
    }

    async fn append_chunks(&self, doc_id: &str, chunks: &[Chunk]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for chunk in chunks {
            debug_assert_eq!(chunk.document_id, doc_id);
            sqlx::query(
                r#"
                INSERT INTO chunks (id, document_id, chunk_index, text, tokens, embedding, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&chunk.id)
            .bind(&chunk.document_id)
            .bind(chunk.chunk_index)
            .bind(&chunk.text)
            .bind(chunk.tokens)
            .bind(chunk.embedding.as_deref().map(vec_to_blob))
            .bind(chunk.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>> {
        let row = sqlx::query(
            "SELECT id, title, modality, source, metadata_json, created_at FROM documents WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_document).transpose()
    }

    async fn list_documents(&self) -> Result<Vec<Document>> {
        let rows = sqlx::query(
            "SELECT id, title, modality, source, metadata_json, created_at
             FROM documents ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_document).collect()
    }

    async fn delete_document(&self, id: &str) -> Result<bool> {
        // ON DELETE CASCADE removes the chunks.
        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn fetch_chunks(&self, filter: &ChunkFilter) -> Result<Vec<Chunk>> {
        // An explicit empty document list selects nothing.
        if matches!(&filter.document_ids, Some(ids) if ids.is_empty()) {
            return Ok(Vec::new());
        }

        let mut sql = String::from(
            r#"
            SELECT c.id, c.document_id, c.chunk_index, c.text, c.tokens, c.embedding, c.created_at
            FROM chunks c
            JOIN documents d ON d.id = c.document_id
            WHERE 1 = 1
            "#,
        );

        if let Some(ids) = &filter.document_ids {
            let placeholders = vec!["?"; ids.len()].join(", ");
            sql.push_str(&format!(" AND c.document_id IN ({})", placeholders));
        }
        if filter.modality.is_some() {
            sql.push_str(" AND d.modality = ?");
        }
        if filter.created_since.is_some() {
            sql.push_str(" AND d.created_at >= ?");
        }
        if filter.created_until.is_some() {
            sql.push_str(" AND d.created_at <= ?");
        }
        sql.push_str(" ORDER BY d.created_at, c.document_id, c.chunk_index");

        let mut query = sqlx::query(&sql);
        if let Some(ids) = &filter.document_ids {
            for id in ids {
                query = query.bind(id);
            }
        }
        if let Some(modality) = filter.modality {
            query = query.bind(modality.as_str());
        }
        if let Some(since) = filter.created_since {
            query = query.bind(since);
        }
        if let Some(until) = filter.created_until {
            query = query.bind(until);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_chunk).collect())
    }
}

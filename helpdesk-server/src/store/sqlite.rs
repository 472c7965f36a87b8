//! SQLite document store
//!
//! Every document is one row of the `documents` table, body stored as JSON
//! text. Patches use `json_patch`, conditional updates fold the expected
//! fields into the `WHERE` clause so check and write are one statement.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

use super::{Direction, DocumentStore, Fields, Record, StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database file with WAL mode and run migrations
    pub async fn open(db_path: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .optimize_on_close(true, None);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        // busy_timeout: wait up to 5s on write contention
        sqlx::query("PRAGMA busy_timeout = 5000;")
            .execute(&pool)
            .await?;

        tracing::info!(path = %db_path, "Database connection established (SQLite WAL)");
        Self::with_pool(pool).await
    }

    /// Wrap an existing pool and run migrations
    pub async fn with_pool(pool: SqlitePool) -> StoreResult<Self> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to apply migrations: {e}")))?;
        tracing::debug!("Database migrations applied");
        Ok(Self { pool })
    }

    /// Private in-memory database, one connection so every query sees it
    pub async fn in_memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(pool).await
    }

    async fn exists(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM documents WHERE collection = ?1 AND id = ?2")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }
}

fn json_path(field: &str) -> String {
    format!("$.\"{}\"", field.replace('"', ""))
}

fn decode(id: String, body: &str) -> StoreResult<Record> {
    let fields: Fields = serde_json::from_str(body)?;
    Ok(Record { id, fields })
}

fn decode_rows(rows: Vec<(String, String)>) -> StoreResult<Vec<Record>> {
    rows.into_iter()
        .map(|(id, body)| decode(id, &body))
        .collect()
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn create(&self, collection: &str, fields: Fields) -> StoreResult<String> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let body = serde_json::to_string(&fields)?;
        sqlx::query("INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3)")
            .bind(collection)
            .bind(&id)
            .bind(body)
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn put(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()> {
        let body = serde_json::to_string(&fields)?;
        sqlx::query(
            "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3) \
             ON CONFLICT (collection, id) DO UPDATE SET body = excluded.body",
        )
        .bind(collection)
        .bind(id)
        .bind(body)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_all(&self, collection: &str) -> StoreResult<Vec<Record>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT id, body FROM documents WHERE collection = ?1 ORDER BY seq")
                .bind(collection)
                .fetch_all(&self.pool)
                .await?;
        decode_rows(rows)
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> StoreResult<Record> {
        let body: Option<String> =
            sqlx::query_scalar("SELECT body FROM documents WHERE collection = ?1 AND id = ?2")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        match body {
            Some(body) => decode(id.to_string(), &body),
            None => Err(StoreError::not_found(collection, id)),
        }
    }

    async fn update_fields(&self, collection: &str, id: &str, patch: Fields) -> StoreResult<()> {
        let patch = serde_json::to_string(&patch)?;
        let result = sqlx::query(
            "UPDATE documents SET body = json_patch(body, ?1) WHERE collection = ?2 AND id = ?3",
        )
        .bind(patch)
        .bind(collection)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(collection, id));
        }
        Ok(())
    }

    async fn update_fields_if(
        &self,
        collection: &str,
        id: &str,
        expected: &Fields,
        patch: Fields,
    ) -> StoreResult<()> {
        let patch = serde_json::to_string(&patch)?;

        let mut sql = String::from(
            "UPDATE documents SET body = json_patch(body, ?) WHERE collection = ? AND id = ?",
        );
        for value in expected.values() {
            if value.is_null() {
                sql.push_str(" AND json_extract(body, ?) IS NULL");
            } else {
                // stored scalar rendered back to JSON text, compared with the
                // serialized expectation
                sql.push_str(" AND json_quote(json_extract(body, ?)) = json(?)");
            }
        }

        let mut query = sqlx::query(&sql).bind(patch).bind(collection).bind(id);
        for (field, value) in expected {
            query = query.bind(json_path(field));
            if !value.is_null() {
                query = query.bind(value.to_string());
            }
        }

        let result = query.execute(&self.pool).await?;
        if result.rows_affected() > 0 {
            return Ok(());
        }

        if self.exists(collection, id).await? {
            Err(StoreError::conflict(collection, id))
        } else {
            Err(StoreError::not_found(collection, id))
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ?1 AND id = ?2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(collection, id));
        }
        Ok(())
    }

    async fn query_ordered(
        &self,
        collection: &str,
        field: &str,
        direction: Direction,
    ) -> StoreResult<Vec<Record>> {
        let dir = match direction {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        };
        // `IS NULL` is 0 for present fields, so missing ones sort last
        let sql = format!(
            "SELECT id, body FROM documents WHERE collection = ?1 \
             ORDER BY json_extract(body, ?2) IS NULL, json_extract(body, ?2) {dir}, seq"
        );
        let rows: Vec<(String, String)> = sqlx::query_as(&sql)
            .bind(collection)
            .bind(json_path(field))
            .fetch_all(&self.pool)
            .await?;
        decode_rows(rows)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn test_create_get_update() {
        let store = SqliteStore::in_memory().await.unwrap();
        let id = store
            .create("tickets", fields(json!({"status": "open", "name": "A"})))
            .await
            .unwrap();

        store
            .update_fields("tickets", &id, fields(json!({"status": "resolved"})))
            .await
            .unwrap();

        let record = store.get_by_id("tickets", &id).await.unwrap();
        assert_eq!(
            Value::Object(record.fields),
            json!({"status": "resolved", "name": "A"})
        );
    }

    #[tokio::test]
    async fn test_put_replaces_document() {
        let store = SqliteStore::in_memory().await.unwrap();
        store
            .put("users", "uid-1", fields(json!({"role": "user"})))
            .await
            .unwrap();
        store
            .put("users", "uid-1", fields(json!({"role": "ict", "name": "Chime"})))
            .await
            .unwrap();

        let all = store.get_all("users").await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].fields.get("role"), Some(&json!("ict")));
    }

    #[tokio::test]
    async fn test_missing_documents() {
        let store = SqliteStore::in_memory().await.unwrap();
        assert!(matches!(
            store.get_by_id("tickets", "x").await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.update_fields("tickets", "x", Fields::new()).await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete("tickets", "x").await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store
                .update_fields_if("tickets", "x", &Fields::new(), Fields::new())
                .await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_conditional_update_on_absent_field() {
        let store = SqliteStore::in_memory().await.unwrap();
        let id = store
            .create("tickets", fields(json!({"status": "open"})))
            .await
            .unwrap();

        let expected = fields(json!({"assignedTo": null, "status": "open"}));
        store
            .update_fields_if(
                "tickets",
                &id,
                &expected,
                fields(json!({"assignedTo": "mazy", "status": "assigned"})),
            )
            .await
            .unwrap();

        let again = store
            .update_fields_if(
                "tickets",
                &id,
                &expected,
                fields(json!({"assignedTo": "agg", "status": "assigned"})),
            )
            .await;
        assert!(matches!(again, Err(StoreError::Conflict { .. })));

        let record = store.get_by_id("tickets", &id).await.unwrap();
        assert_eq!(record.fields.get("assignedTo"), Some(&json!("mazy")));
    }

    #[tokio::test]
    async fn test_conditional_update_on_status() {
        let store = SqliteStore::in_memory().await.unwrap();
        let id = store
            .create("tickets", fields(json!({"status": "assigned", "assignedTo": "agg"})))
            .await
            .unwrap();

        let stale = fields(json!({"status": "open"}));
        let result = store
            .update_fields_if("tickets", &id, &stale, fields(json!({"status": "resolved"})))
            .await;
        assert!(matches!(result, Err(StoreError::Conflict { .. })));

        let current = fields(json!({"status": "assigned"}));
        store
            .update_fields_if("tickets", &id, &current, fields(json!({"status": "resolved"})))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_query_ordered() {
        let store = SqliteStore::in_memory().await.unwrap();
        let march = store
            .create("tickets", fields(json!({"createdAt": "2025-03-01T00:00:00.000Z"})))
            .await
            .unwrap();
        let none = store.create("tickets", fields(json!({}))).await.unwrap();
        let july = store
            .create("tickets", fields(json!({"createdAt": "2025-07-01T00:00:00.000Z"})))
            .await
            .unwrap();

        let desc: Vec<String> = store
            .query_ordered("tickets", "createdAt", Direction::Desc)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(desc, vec![july.clone(), march.clone(), none.clone()]);

        let asc: Vec<String> = store
            .query_ordered("tickets", "createdAt", Direction::Asc)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(asc, vec![march, july, none]);
    }
}

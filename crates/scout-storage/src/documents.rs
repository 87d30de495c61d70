// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the `DocumentStore` trait.

use async_trait::async_trait;
use rusqlite::OptionalExtension;
use tracing::debug;

use scout_config::model::StorageConfig;
use scout_core::{DocumentStore, HealthStatus, PluginAdapter, ScoutError, VersionedDocument};

use crate::database::{Database, map_tr_err};

/// SQLite-backed versioned document store.
pub struct SqliteDocumentStore {
    db: Database,
}

impl SqliteDocumentStore {
    /// Opens the store at the configured database path.
    pub async fn open(config: &StorageConfig) -> Result<Self, ScoutError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        Ok(Self { db })
    }

    /// Opens a store backed by a private in-memory database.
    pub async fn in_memory() -> Result<Self, ScoutError> {
        Ok(Self {
            db: Database::open_in_memory().await?,
        })
    }

    /// Checkpoints the WAL before shutdown.
    pub async fn close(&self) -> Result<(), ScoutError> {
        self.db.checkpoint().await
    }
}

#[async_trait]
impl PluginAdapter for SqliteDocumentStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn health_check(&self) -> Result<HealthStatus, ScoutError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn get(&self, key: &str) -> Result<Option<VersionedDocument>, ScoutError> {
        let key = key.to_string();
        let row = self
            .db
            .connection()
            .call(move |conn| -> Result<Option<(String, i64)>, rusqlite::Error> {
                conn.query_row(
                    "SELECT value, version FROM documents WHERE key = ?1",
                    rusqlite::params![key],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)?;

        match row {
            Some((raw, version)) => {
                let value = serde_json::from_str(&raw).map_err(ScoutError::storage)?;
                Ok(Some(VersionedDocument {
                    value,
                    version: version as u64,
                }))
            }
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        key: &str,
        value: serde_json::Value,
        expected_version: Option<u64>,
    ) -> Result<u64, ScoutError> {
        let raw = serde_json::to_string(&value).map_err(ScoutError::storage)?;
        let owned_key = key.to_string();
        let now = chrono::Utc::now().to_rfc3339();

        // Inner Err carries the version actually found on conflict.
        let outcome = self
            .db
            .connection()
            .call(
                move |conn| -> Result<Result<u64, Option<u64>>, rusqlite::Error> {
                    let tx = conn.transaction()?;
                    let current: Option<i64> = tx
                        .query_row(
                            "SELECT version FROM documents WHERE key = ?1",
                            rusqlite::params![owned_key],
                            |row| row.get(0),
                        )
                        .optional()?;
                    let current = current.map(|v| v as u64);
                    if current != expected_version {
                        return Ok(Err(current));
                    }

                    let next = current.map_or(1, |v| v + 1);
                    tx.execute(
                        "INSERT INTO documents (key, value, version, updated_at)
                         VALUES (?1, ?2, ?3, ?4)
                         ON CONFLICT(key) DO UPDATE SET
                             value = excluded.value,
                             version = excluded.version,
                             updated_at = excluded.updated_at",
                        rusqlite::params![owned_key, raw, next as i64, now],
                    )?;
                    tx.commit()?;
                    Ok(Ok(next))
                },
            )
            .await
            .map_err(map_tr_err)?;

        match outcome {
            Ok(version) => {
                debug!(key, version, "document written");
                Ok(version)
            }
            Err(found) => Err(ScoutError::VersionConflict {
                key: key.to_string(),
                expected: expected_version,
                found,
            }),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, ScoutError> {
        let key = key.to_string();
        let removed = self
            .db
            .connection()
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                conn.execute("DELETE FROM documents WHERE key = ?1", rusqlite::params![key])
            })
            .await
            .map_err(map_tr_err)?;
        Ok(removed > 0)
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, ScoutError> {
        let prefix = prefix.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt =
                    conn.prepare("SELECT key FROM documents WHERE substr(key, 1, ?2) = ?1 ORDER BY key")?;
                let keys = stmt
                    .query_map(
                        rusqlite::params![prefix, prefix.chars().count() as i64],
                        |row| row.get(0),
                    )?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(map_tr_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn get_missing_key_returns_none() {
        let store = SqliteDocumentStore::in_memory().await.unwrap();
        assert!(store.get("memory").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn first_write_requires_absent_key() {
        let store = SqliteDocumentStore::in_memory().await.unwrap();
        let v1 = store.put("memory", json!({"a": 1}), None).await.unwrap();
        assert_eq!(v1, 1);

        let doc = store.get("memory").await.unwrap().unwrap();
        assert_eq!(doc.version, 1);
        assert_eq!(doc.value, json!({"a": 1}));

        let err = store.put("memory", json!({"a": 2}), None).await.unwrap_err();
        assert!(matches!(
            err,
            ScoutError::VersionConflict {
                expected: None,
                found: Some(1),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn stale_version_is_rejected_and_value_kept() {
        let store = SqliteDocumentStore::in_memory().await.unwrap();
        store.put("k", json!(1), None).await.unwrap();
        let v2 = store.put("k", json!(2), Some(1)).await.unwrap();
        assert_eq!(v2, 2);

        let err = store.put("k", json!(3), Some(1)).await.unwrap_err();
        assert!(matches!(err, ScoutError::VersionConflict { found: Some(2), .. }));
        assert_eq!(store.get("k").await.unwrap().unwrap().value, json!(2));
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let store = SqliteDocumentStore::in_memory().await.unwrap();
        store.put("k", json!("x"), None).await.unwrap();
        assert!(store.delete("k").await.unwrap());
        assert!(!store.delete("k").await.unwrap());
        assert!(store.get("k").await.unwrap().is_none());
        // Recreating after delete starts from an absent key again.
        assert_eq!(store.put("k", json!("y"), None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn list_keys_filters_by_prefix() {
        let store = SqliteDocumentStore::in_memory().await.unwrap();
        for key in ["session:b", "memory", "session:a", "sessions_other"] {
            store.put(key, json!({}), None).await.unwrap();
        }
        let keys = store.list_keys("session:").await.unwrap();
        assert_eq!(keys, vec!["session:a", "session:b"]);
    }

    #[tokio::test]
    async fn file_backed_store_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("scout.db");
        let config = StorageConfig {
            database_path: path.to_str().unwrap().to_string(),
            wal_mode: true,
        };

        {
            let store = SqliteDocumentStore::open(&config).await.unwrap();
            store.put("memory", json!({"nextId": 4}), None).await.unwrap();
            assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
            store.close().await.unwrap();
        }

        let store = SqliteDocumentStore::open(&config).await.unwrap();
        let doc = store.get("memory").await.unwrap().unwrap();
        assert_eq!(doc.value["nextId"], 4);
        assert_eq!(doc.version, 1);
    }
}

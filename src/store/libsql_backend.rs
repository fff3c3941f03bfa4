//! libSQL backend — async `ModerationStore` implementation.
//!
//! Supports local file and in-memory databases. The two operations with a
//! concurrency contract are expressed as single SQL statements so the
//! database serializes them: warning increments are an upsert with
//! `RETURNING`, and pending-approval consumption is a `DELETE … RETURNING`.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database, params};
use tracing::info;

use crate::error::StoreError;
use crate::store::migrations;
use crate::store::traits::{ModerationStore, PendingApproval};
use crate::transport::{ChatId, MessageId, UserId};

/// libSQL store.
///
/// Holds a single connection reused for all operations;
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<Database>,
    conn: Connection,
}

impl LibSqlStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Connection(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to open database: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        info!(path = %path.display(), "Database opened");

        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to create in-memory db: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;

        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

#[async_trait]
impl ModerationStore for LibSqlStore {
    async fn record_user(&self, user: UserId, username: &str) -> Result<(), StoreError> {
        // Refreshes the username so later lookups resolve current handles;
        // the warning count of an existing row is left alone.
        self.conn()
            .execute(
                "INSERT INTO users (id, username, warnings, created_at) VALUES (?1, ?2, 0, ?3) \
                 ON CONFLICT(id) DO UPDATE SET username = excluded.username",
                params![user, username, Utc::now().to_rfc3339()],
            )
            .await
            .map_err(|e| StoreError::Query(format!("record_user: {e}")))?;
        Ok(())
    }

    async fn increment_warnings(&self, user: UserId) -> Result<u32, StoreError> {
        let mut rows = self
            .conn()
            .query(
                "INSERT INTO users (id, username, warnings, created_at) VALUES (?1, '', 1, ?2) \
                 ON CONFLICT(id) DO UPDATE SET warnings = warnings + 1 \
                 RETURNING warnings",
                params![user, Utc::now().to_rfc3339()],
            )
            .await
            .map_err(|e| StoreError::Query(format!("increment_warnings: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let count: i64 = row
                    .get(0)
                    .map_err(|e| StoreError::Query(format!("increment_warnings row: {e}")))?;
                Ok(count.max(0) as u32)
            }
            Ok(None) => Err(StoreError::Query(
                "increment_warnings: no row returned".into(),
            )),
            Err(e) => Err(StoreError::Query(format!("increment_warnings: {e}"))),
        }
    }

    async fn reset_warnings(&self, user: UserId) -> Result<(), StoreError> {
        self.conn()
            .execute(
                "UPDATE users SET warnings = 0 WHERE id = ?1",
                params![user],
            )
            .await
            .map_err(|e| StoreError::Query(format!("reset_warnings: {e}")))?;
        Ok(())
    }

    async fn warning_count(&self, user: UserId) -> Result<u32, StoreError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT warnings FROM users WHERE id = ?1",
                params![user],
            )
            .await
            .map_err(|e| StoreError::Query(format!("warning_count: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let count: i64 = row
                    .get(0)
                    .map_err(|e| StoreError::Query(format!("warning_count row: {e}")))?;
                Ok(count.max(0) as u32)
            }
            Ok(None) => Ok(0),
            Err(e) => Err(StoreError::Query(format!("warning_count: {e}"))),
        }
    }

    async fn user_id_by_username(&self, username: &str) -> Result<Option<UserId>, StoreError> {
        let handle = username.trim_start_matches('@');
        let mut rows = self
            .conn()
            .query(
                "SELECT id FROM users WHERE username = ?1 COLLATE NOCASE LIMIT 1",
                params![handle],
            )
            .await
            .map_err(|e| StoreError::Query(format!("user_id_by_username: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let id: i64 = row
                    .get(0)
                    .map_err(|e| StoreError::Query(format!("user_id_by_username row: {e}")))?;
                Ok(Some(id))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(StoreError::Query(format!("user_id_by_username: {e}"))),
        }
    }

    async fn banned_words(&self) -> Result<Vec<String>, StoreError> {
        let mut rows = self
            .conn()
            .query("SELECT word FROM banned_words ORDER BY word", ())
            .await
            .map_err(|e| StoreError::Query(format!("banned_words: {e}")))?;

        let mut words = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let word: String = row
                .get(0)
                .map_err(|e| StoreError::Query(format!("banned_words row: {e}")))?;
            words.push(word);
        }
        Ok(words)
    }

    async fn add_banned_word(&self, word: &str) -> Result<bool, StoreError> {
        // Stored lowercased; the matcher lowercases inputs, so case variants
        // are the same word.
        let affected = self
            .conn()
            .execute(
                "INSERT INTO banned_words (word) VALUES (?1) ON CONFLICT(word) DO NOTHING",
                params![word.to_lowercase()],
            )
            .await
            .map_err(|e| StoreError::Query(format!("add_banned_word: {e}")))?;
        Ok(affected > 0)
    }

    async fn is_chat_licensed(&self, chat: ChatId) -> Result<bool, StoreError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT 1 FROM licensed_chats WHERE chat_id = ?1",
                params![chat],
            )
            .await
            .map_err(|e| StoreError::Query(format!("is_chat_licensed: {e}")))?;

        match rows.next().await {
            Ok(Some(_)) => Ok(true),
            Ok(None) => Ok(false),
            Err(e) => Err(StoreError::Query(format!("is_chat_licensed: {e}"))),
        }
    }

    async fn license_chat(&self, chat: ChatId, title: &str) -> Result<bool, StoreError> {
        let affected = self
            .conn()
            .execute(
                "INSERT INTO licensed_chats (chat_id, title, licensed_at) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(chat_id) DO NOTHING",
                params![chat, title, Utc::now().to_rfc3339()],
            )
            .await
            .map_err(|e| StoreError::Query(format!("license_chat: {e}")))?;
        Ok(affected > 0)
    }

    async fn insert_pending_approval(
        &self,
        forwarded: MessageId,
        origin_chat: ChatId,
        origin_sender: UserId,
    ) -> Result<(), StoreError> {
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO pending_approvals \
                 (forwarded_id, origin_chat_id, origin_sender_id, created_at) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![forwarded, origin_chat, origin_sender, Utc::now().to_rfc3339()],
            )
            .await
            .map_err(|e| StoreError::Query(format!("insert_pending_approval: {e}")))?;
        Ok(())
    }

    async fn take_pending_approval(
        &self,
        forwarded: MessageId,
    ) -> Result<Option<PendingApproval>, StoreError> {
        // Single-statement consume: present-or-absent, never half-resolved.
        let mut rows = self
            .conn()
            .query(
                "DELETE FROM pending_approvals WHERE forwarded_id = ?1 \
                 RETURNING origin_chat_id, origin_sender_id",
                params![forwarded],
            )
            .await
            .map_err(|e| StoreError::Query(format!("take_pending_approval: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let origin_chat: i64 = row
                    .get(0)
                    .map_err(|e| StoreError::Query(format!("take_pending_approval row: {e}")))?;
                let origin_sender: i64 = row
                    .get(1)
                    .map_err(|e| StoreError::Query(format!("take_pending_approval row: {e}")))?;
                Ok(Some(PendingApproval {
                    origin_chat,
                    origin_sender,
                }))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(StoreError::Query(format!("take_pending_approval: {e}"))),
        }
    }
}

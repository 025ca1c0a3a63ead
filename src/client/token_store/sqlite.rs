//! # SQLite-backed preferences
//!
//! Durable storage for [`Preferences`]. Every value lives in a single
//! `preferences` table keyed by `(namespace, key)`.
//!
//! Reads come from an in-memory copy loaded at open time. `apply` updates
//! that copy and queues the edit for a single background writer task, so
//! edits reach disk in the order they were made. `flush` waits for every
//! edit queued so far and reports the first one that failed to persist.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tokio::sync::{mpsc, oneshot};

use super::memory::apply_changes;
use super::{PreferenceChange, Preferences, AUTH_PREFERENCES};
use crate::client::config::Config;
use crate::client::error::StoreError;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS preferences (
    namespace TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (namespace, key)
)";

const UPSERT: &str = "INSERT INTO preferences (namespace, key, value, updated_at)
    VALUES (?, ?, ?, ?)
    ON CONFLICT(namespace, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";

const DELETE: &str = "DELETE FROM preferences WHERE namespace = ? AND key = ?";

enum WriterCommand {
    Apply(Vec<PreferenceChange>),
    Flush(oneshot::Sender<Result<(), StoreError>>),
}

/// Durable preferences stored in a SQLite file
#[derive(Debug)]
pub struct SqlitePreferences {
    namespace: String,
    cache: RwLock<HashMap<String, String>>,
    writer: mpsc::UnboundedSender<WriterCommand>,
}

impl SqlitePreferences {
    /// Open the token namespace in the configured preferences file
    pub async fn open_auth(config: &Config) -> Result<Self, StoreError> {
        Self::open(config.preferences_path(), AUTH_PREFERENCES).await
    }

    /// Open (creating if needed) the database at `path` and load `namespace`
    ///
    /// Must be called inside a tokio runtime; the writer task is spawned on it.
    pub async fn open(path: impl AsRef<Path>, namespace: &str) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(CREATE_TABLE).execute(&pool).await?;

        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM preferences WHERE namespace = ?")
                .bind(namespace)
                .fetch_all(&pool)
                .await?;

        tracing::info!(
            "[STORE] Opened preferences '{}' at {} ({} key(s))",
            namespace,
            path.display(),
            rows.len()
        );

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(pool, namespace.to_string(), rx));

        Ok(Self {
            namespace: namespace.to_string(),
            cache: RwLock::new(rows.into_iter().collect()),
            writer: tx,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Wait until every edit applied so far has been written
    ///
    /// Fails with [`StoreError::WriteFailed`] if any edit since the previous
    /// flush did not reach disk. The in-memory copy still holds it.
    pub async fn flush(&self) -> Result<(), StoreError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.writer
            .send(WriterCommand::Flush(ack_tx))
            .map_err(|_| StoreError::WriterClosed)?;
        ack_rx.await.map_err(|_| StoreError::WriterClosed)?
    }
}

impl Preferences for SqlitePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.cache.read().ok()?.get(key).cloned()
    }

    fn apply(&self, changes: Vec<PreferenceChange>) {
        // Queue while holding the lock so disk order matches cache order.
        let Ok(mut cache) = self.cache.write() else {
            tracing::error!("[STORE] Preferences cache lock poisoned, edit dropped");
            return;
        };
        apply_changes(&mut cache, &changes);
        if self.writer.send(WriterCommand::Apply(changes)).is_err() {
            tracing::warn!("[STORE] Preference writer stopped; edit kept in memory only");
        }
    }
}

async fn run_writer(
    pool: SqlitePool,
    namespace: String,
    mut commands: mpsc::UnboundedReceiver<WriterCommand>,
) {
    // First failure since the last flush
    let mut failed: Option<String> = None;

    while let Some(command) = commands.recv().await {
        match command {
            WriterCommand::Apply(changes) => {
                if let Err(e) = write_changes(&pool, &namespace, &changes).await {
                    tracing::error!(
                        "[STORE] Failed to persist {} preference change(s): {}",
                        changes.len(),
                        e
                    );
                    failed.get_or_insert_with(|| e.to_string());
                }
            }
            WriterCommand::Flush(ack) => {
                let result = match failed.take() {
                    Some(message) => Err(StoreError::WriteFailed(message)),
                    None => Ok(()),
                };
                let _ = ack.send(result);
            }
        }
    }
    tracing::debug!("[STORE] Preference writer for '{}' shutting down", namespace);
    pool.close().await;
}

async fn write_changes(
    pool: &SqlitePool,
    namespace: &str,
    changes: &[PreferenceChange],
) -> Result<(), sqlx::Error> {
    let now = chrono::Utc::now().to_rfc3339();
    let mut tx = pool.begin().await?;
    for change in changes {
        match change {
            PreferenceChange::Put { key, value } => {
                sqlx::query(UPSERT)
                    .bind(namespace)
                    .bind(key)
                    .bind(value)
                    .bind(&now)
                    .execute(&mut *tx)
                    .await?;
            }
            PreferenceChange::Remove { key } => {
                sqlx::query(DELETE)
                    .bind(namespace)
                    .bind(key)
                    .execute(&mut *tx)
                    .await?;
            }
        }
    }
    tx.commit().await
}

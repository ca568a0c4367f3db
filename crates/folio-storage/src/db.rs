//! Configuration store backed by SQLite

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use folio_core::{
    CoreError, PortfolioConfiguration, Version, VersionSummary, validate_configuration,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use time::OffsetDateTime;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::Result;
use crate::models::{CurrentConfiguration, CurrentRow, VersionRow, VersionSummaryRow};

pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://127.0.0.1:17380/p";

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS versions (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        owner_id TEXT NOT NULL,
        name TEXT NOT NULL,
        config_json TEXT NOT NULL,
        content_hash TEXT NOT NULL,
        created_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_versions_owner ON versions (owner_id, seq)",
    "CREATE TABLE IF NOT EXISTS current_configs (
        owner_id TEXT PRIMARY KEY,
        config_json TEXT NOT NULL,
        version_id TEXT NOT NULL REFERENCES versions (id),
        content_hash TEXT NOT NULL,
        published_json TEXT,
        published_at INTEGER,
        updated_at INTEGER NOT NULL
    )",
];

/// Characters left unescaped in the owner segment of a public URL
const OWNER_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const CURRENT_COLUMNS: &str = "config_json, version_id, content_hash, published_json, updated_at";
const VERSION_COLUMNS: &str = "id, owner_id, name, config_json, content_hash, created_at";

/// Per-owner configuration store.
///
/// Cheap to clone; clones share the pool and the owner locks.
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    public_base_url: String,
}

impl Storage {
    /// Open (or create) the database. `None` uses the default data directory.
    pub async fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(path) => path,
            None => Self::default_db_path(),
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let storage = Self {
            pool,
            locks: Arc::new(DashMap::new()),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
        };
        storage.migrate().await?;

        debug!(path = %path.display(), "Opened configuration store");
        Ok(storage)
    }

    /// Base URL published pages are served under
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = url.into();
        self
    }

    pub fn default_db_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "folio", "folio") {
            dirs.data_dir().join("folio.db")
        } else {
            PathBuf::from("folio.db")
        }
    }

    async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Serialize writes for `owner_id` until the returned guard is dropped
    async fn lock_owner(&self, owner_id: &str) -> OwnerGuard {
        let lock = self
            .locks
            .entry(owner_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        OwnerGuard {
            guard: Some(lock.lock_owned().await),
            locks: Arc::clone(&self.locks),
            owner_id: owner_id.to_string(),
        }
    }

    async fn current_row(&self, owner_id: &str) -> Result<Option<CurrentRow>> {
        let query = format!("SELECT {CURRENT_COLUMNS} FROM current_configs WHERE owner_id = ?");
        Ok(sqlx::query_as::<_, CurrentRow>(&query)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Current configuration, or the default configuration if nothing was saved
    pub async fn get_current_configuration(&self, owner_id: &str) -> Result<CurrentConfiguration> {
        match self.current_row(owner_id).await? {
            Some(row) => row.into_current(),
            None => Ok(CurrentConfiguration::empty()),
        }
    }

    /// Validate `config`, store it as a new version and make it current
    pub async fn save_configuration(
        &self,
        owner_id: &str,
        config: &PortfolioConfiguration,
        label: Option<String>,
    ) -> Result<VersionSummary> {
        let _guard = self.lock_owner(owner_id).await;

        let previous = match self.current_row(owner_id).await? {
            Some(row) => Some(row.config()?),
            None => None,
        };
        validate_configuration(config, previous.as_ref())?;

        let version = Version::new(owner_id, config.clone(), label)?;
        let config_json = serde_json::to_string(&version.config)?;
        let created_at = version.created_at.unix_timestamp();

        // Both writes land together or not at all
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO versions (id, owner_id, name, config_json, content_hash, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&version.id)
        .bind(owner_id)
        .bind(&version.name)
        .bind(&config_json)
        .bind(&version.content_hash)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO current_configs (owner_id, config_json, version_id, content_hash, updated_at) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT (owner_id) DO UPDATE SET \
                config_json = excluded.config_json, \
                version_id = excluded.version_id, \
                content_hash = excluded.content_hash, \
                updated_at = excluded.updated_at",
        )
        .bind(owner_id)
        .bind(&config_json)
        .bind(&version.id)
        .bind(&version.content_hash)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(
            owner_id,
            version_id = %version.id,
            sections = version.config.sections.len(),
            "Saved portfolio configuration"
        );
        Ok(version.summary())
    }

    /// Versions for `owner_id`, newest first
    pub async fn list_versions(&self, owner_id: &str) -> Result<Vec<VersionSummary>> {
        let rows = sqlx::query_as::<_, VersionSummaryRow>(
            "SELECT id, name, content_hash, created_at FROM versions \
             WHERE owner_id = ? ORDER BY seq DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(VersionSummaryRow::into_summary).collect()
    }

    /// A single version including its configuration
    pub async fn get_version(&self, owner_id: &str, version_id: &str) -> Result<Version> {
        let query = format!("SELECT {VERSION_COLUMNS} FROM versions WHERE id = ? AND owner_id = ?");
        let row = sqlx::query_as::<_, VersionRow>(&query)
            .bind(version_id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CoreError::version_not_found(version_id))?;

        row.into_version()
    }

    /// Make a stored version current again without creating a new version
    pub async fn restore_version(
        &self,
        owner_id: &str,
        version_id: &str,
    ) -> Result<PortfolioConfiguration> {
        let _guard = self.lock_owner(owner_id).await;

        let version = self.get_version(owner_id, version_id).await?;
        let config_json = serde_json::to_string(&version.config)?;
        let now = OffsetDateTime::now_utc().unix_timestamp();

        sqlx::query(
            "INSERT INTO current_configs (owner_id, config_json, version_id, content_hash, updated_at) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT (owner_id) DO UPDATE SET \
                config_json = excluded.config_json, \
                version_id = excluded.version_id, \
                content_hash = excluded.content_hash, \
                updated_at = excluded.updated_at",
        )
        .bind(owner_id)
        .bind(&config_json)
        .bind(&version.id)
        .bind(&version.content_hash)
        .bind(now)
        .execute(&self.pool)
        .await?;

        info!(owner_id, version_id, "Restored portfolio configuration");
        Ok(version.config)
    }

    /// Serve the current configuration publicly and return its URL
    pub async fn publish(&self, owner_id: &str) -> Result<String> {
        let _guard = self.lock_owner(owner_id).await;

        let now = OffsetDateTime::now_utc().unix_timestamp();
        let result = sqlx::query(
            "UPDATE current_configs SET published_json = config_json, published_at = ? \
             WHERE owner_id = ?",
        )
        .bind(now)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::Precondition(format!(
                "owner '{}' has no saved configuration to publish",
                owner_id
            ))
            .into());
        }

        let url = self.public_url(owner_id);
        info!(owner_id, %url, "Published portfolio");
        Ok(url)
    }

    /// The configuration pinned by the last publish
    pub async fn get_published_configuration(
        &self,
        owner_id: &str,
    ) -> Result<PortfolioConfiguration> {
        let published: Option<Option<String>> = sqlx::query_scalar(
            "SELECT published_json FROM current_configs WHERE owner_id = ?",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        match published.flatten() {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Err(CoreError::NotFound {
                entity: "Published portfolio",
                id: owner_id.to_string(),
            }
            .into()),
        }
    }

    pub fn public_url(&self, owner_id: &str) -> String {
        format!(
            "{}/{}",
            self.public_base_url.trim_end_matches('/'),
            utf8_percent_encode(owner_id, OWNER_SEGMENT)
        )
    }
}

/// Held for the duration of one owner's write. The owner's entry is dropped
/// from the lock map once nobody else holds or waits on it.
struct OwnerGuard {
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    owner_id: String,
}

impl Drop for OwnerGuard {
    fn drop(&mut self) {
        // Release the mutex (and its Arc) before checking for other holders
        self.guard.take();
        self.locks
            .remove_if(&self.owner_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

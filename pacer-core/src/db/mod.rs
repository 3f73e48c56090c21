pub mod models;
pub mod operations;

use crate::db::models::{Database, Patch, WorkoutEntry};
use crate::plan::Plan;
use crate::progress::achievements::Achievement;
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, FixedOffset};
use log::{debug, info};
use std::collections::HashMap;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::sync::{Mutex, OnceCell};

pub const DEFAULT_DB_FILE: &str = "pacer.json";

static DB_PATH: OnceCell<String> = OnceCell::const_new();

/// One write lock per document path, shared by every `DocumentStore` opened
/// on it in this process.
static PATH_LOCKS: LazyLock<std::sync::Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    LazyLock::new(Default::default);

fn lock_for(path: &Path) -> Result<Arc<Mutex<()>>> {
    let mut locks = PATH_LOCKS
        .lock()
        .map_err(|_| anyhow!("Document lock registry poisoned"))?;
    Ok(locks.entry(path.to_path_buf()).or_default().clone())
}

/// Database path: whatever `set_db_path` chose, else `PACER_DB_PATH`, else
/// `pacer.json` in the working directory.
pub async fn get_db_path() -> &'static String {
    DB_PATH
        .get_or_init(async || {
            env::var("PACER_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_FILE.to_string())
        })
        .await
}

pub async fn set_db_path(path: &str) -> Result<()> {
    DB_PATH
        .set(path.to_string())
        .map_err(|e| anyhow!(format!("Failed to set DB_PATH: {:?}", e)))
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document changed underneath you: expected version {expected}, found {actual}")]
    VersionConflict { expected: u64, actual: u64 },
    #[error("no plan named {0}")]
    UnknownPlan(String),
    #[error("no challenge named {0}")]
    UnknownChallenge(String),
    #[error("plan {plan} has no exercise {id}")]
    UnknownExercise { plan: String, id: String },
}

/// Read-only source of workout plans.
#[allow(async_fn_in_trait)]
pub trait PlanStore {
    async fn get_plan(&self, plan_key: &str) -> Result<Plan>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub plan_key: String,
    pub minutes: u32,
    pub completed_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone)]
pub struct RecordOutcome {
    pub entry: WorkoutEntry,
    pub streak: u32,
    pub unlocked: Vec<&'static Achievement>,
}

/// Where finished sessions go. Best effort; callers decide about retries.
#[allow(async_fn_in_trait)]
pub trait PersistenceGateway {
    async fn record_session(&self, record: SessionRecord) -> Result<RecordOutcome>;
}

/// The JSON document on disk.
///
/// All writes go through the path's mutex and read the current file inside
/// it, so concurrent updates from one process never lose each other, however
/// many stores are open on the same file. Writers from elsewhere are caught
/// by the `version` token in `apply_patch`.
pub struct DocumentStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl DocumentStore {
    /// Open the document, seeding a fresh one when the file does not exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = std::path::absolute(path.as_ref())
            .with_context(|| format!("Bad document path {}", path.as_ref().display()))?;
        let lock = lock_for(&path)?;
        {
            let _guard = lock.lock().await;
            if !tokio::fs::try_exists(&path).await? {
                info!("No document at {}, writing seed data", path.display());
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                write_document(&path, &Database::seed()).await?;
            }
        }
        Ok(Self { path, lock })
    }

    /// Open whatever `get_db_path` resolves to.
    pub async fn open_default() -> Result<Self> {
        Self::open(get_db_path().await.as_str()).await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Database> {
        let _guard = self.lock.lock().await;
        read_document(&self.path).await
    }

    /// Read-modify-write under the store lock. Nothing is written when `f`
    /// fails.
    pub async fn update<T>(&self, f: impl FnOnce(&mut Database) -> Result<T>) -> Result<T> {
        let _guard = self.lock.lock().await;
        let mut db = read_document(&self.path).await?;
        let out = f(&mut db)?;
        db.version += 1;
        write_document(&self.path, &db).await?;
        debug!("DocumentStore wrote version {}", db.version);
        Ok(out)
    }

    /// Replace the keys present in `patch`. With `expected_version`, refuse
    /// when the document moved on since the caller read it.
    pub async fn apply_patch(&self, patch: Patch, expected_version: Option<u64>) -> Result<Database> {
        self.update(move |db| {
            if let Some(expected) = expected_version {
                if db.version != expected {
                    return Err(StoreError::VersionConflict {
                        expected,
                        actual: db.version,
                    }
                    .into());
                }
            }
            patch.apply_to(db);
            Ok(db.clone())
        })
        .await
        .map(|mut db| {
            db.version += 1;
            db
        })
    }

    /// Put the seed document back.
    pub async fn reset(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        let version = match read_document(&self.path).await {
            Ok(db) => db.version + 1,
            Err(_) => 0,
        };
        let mut seed = Database::seed();
        seed.version = version;
        write_document(&self.path, &seed).await
    }
}

impl PlanStore for DocumentStore {
    async fn get_plan(&self, plan_key: &str) -> Result<Plan> {
        let db = self.load().await?;
        operations::resolve_plan(&db, plan_key)
    }
}

impl PersistenceGateway for DocumentStore {
    async fn record_session(&self, record: SessionRecord) -> Result<RecordOutcome> {
        operations::record_session(self, record).await
    }
}

async fn read_document(path: &Path) -> Result<Database> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Malformed document {}", path.display()))
}

/// Write to a fresh temp file next to `path`, then rename it over `path`.
async fn write_document(path: &Path, db: &Database) -> Result<()> {
    let json = serde_json::to_string_pretty(db)?;
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| anyhow!("{} has no parent directory", path.display()))?;
        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    })
    .await?
}

//! Periodic ledger backups to an S3-compatible bucket.
//!
//! Each run exports both trees, zips them as `db/tickets.txt` and
//! `db/account.txt`, and uploads the archive as `<unix-seconds>_backup.zip`.
//! A failed run is logged and the schedule continues.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use secrecy::ExposeSecret;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::ledger::{Ledger, LedgerError, LedgerTree};
use crate::state::S3Config;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(4 * 60 * 60);

/// Archive directory holding the exported trees.
const ARCHIVE_DIR: &str = "db/";

pub fn object_key(at: DateTime<Utc>) -> String {
    format!("{}_backup.zip", at.timestamp())
}

/// Zip both exported trees into memory.
pub fn archive(ledger: &Ledger) -> Result<Vec<u8>, BackupError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.add_directory(ARCHIVE_DIR, FileOptions::default())?;

    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    for tree in LedgerTree::ALL {
        zip.start_file(format!("{ARCHIVE_DIR}{}.txt", tree.name()), options)?;
        ledger.export(tree, &mut zip)?;
    }

    Ok(zip.finish()?.into_inner())
}

/// Object store for the configured bucket.
pub fn s3_store(config: &S3Config) -> Result<Arc<dyn ObjectStore>, BackupError> {
    let store = AmazonS3Builder::new()
        .with_access_key_id(config.access_key.expose_secret())
        .with_secret_access_key(config.secret_key.expose_secret())
        .with_region(&config.region)
        .with_endpoint(&config.endpoint)
        .with_bucket_name(&config.bucket)
        .build()
        .map_err(|e| BackupError::Store { source: e })?;
    Ok(Arc::new(store))
}

pub struct BackupTask {
    ledger: Ledger,
    store: Arc<dyn ObjectStore>,
    interval: Duration,
}

impl BackupTask {
    pub fn new(ledger: Ledger, store: Arc<dyn ObjectStore>, interval: Duration) -> Self {
        Self {
            ledger,
            store,
            interval,
        }
    }

    /// Export, zip, and upload once. Returns the uploaded key.
    pub async fn run_once(&self, at: DateTime<Utc>) -> Result<Path, BackupError> {
        tracing::debug!("backup: exporting ledger");
        let bytes = archive(&self.ledger)?;
        let size = bytes.len();

        let key = Path::from(object_key(at));
        self.store
            .put(&key, PutPayload::from(bytes))
            .await
            .map_err(|e| BackupError::Upload {
                key: key.to_string(),
                source: e,
            })?;

        tracing::info!(%key, bytes = size, "backup uploaded");
        Ok(key)
    }

    /// Run forever, first backup one interval after start.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            tracing::info!("backup: running task");
            // arch-lint: allow(no-error-swallowing) reason="a failed backup is retried on the next tick"
            if let Err(e) = self.run_once(Utc::now()).await {
                tracing::error!(error = %e, "backup failed");
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("failed to export ledger")]
    Export(#[from] LedgerError),

    #[error("failed to build backup archive")]
    Archive(#[from] zip::result::ZipError),

    #[error("failed to configure object store")]
    Store { source: object_store::Error },

    #[error("failed to upload {key}")]
    Upload {
        key: String,
        source: object_store::Error,
    },
}

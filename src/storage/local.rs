//! Local filesystem archive.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::TableInformation;
use crate::storage::{PlanArchive, file_stem, fingerprint};

/// Archive rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalArchive {
    root_dir: PathBuf,
}

impl LocalArchive {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(path)
    }

    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<PathBuf> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if the file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl PlanArchive for LocalArchive {
    async fn store(&self, document: &[u8], plan: &TableInformation) -> Result<PathBuf> {
        let stem = file_stem(&plan.time_info);
        let pdf_key = format!("{stem}.pdf");
        let digest = fingerprint(document);

        let unchanged = self
            .read_bytes(&pdf_key)
            .await?
            .is_some_and(|existing| fingerprint(&existing) == digest);

        let pdf_path = if unchanged {
            log::debug!("{pdf_key} is unchanged, not rewriting");
            self.path(&pdf_key)
        } else {
            let path = self.write_bytes(&pdf_key, document).await?;
            log::info!("Archived plan document to {}", path.display());
            path
        };

        let mut record = plan.clone();
        record.pdf_path = Some(pdf_path.clone());
        self.write_json(&format!("{stem}.json"), &record).await?;

        Ok(pdf_path)
    }
}

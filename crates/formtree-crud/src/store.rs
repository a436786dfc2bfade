//! JSON file storage

use crate::collab::{CrudHandler, SaveRequest};
use anyhow::Context;
use formtree_node::{strip_tag, DataMode, DataValue};
use std::path::{Path, PathBuf};

/// [`CrudHandler`] keeping one record as a JSON document on disk
///
/// A missing file loads as `Null` (no record). Inserting over an existing
/// file and updating a missing one are both refused. The stored document
/// never carries the mode tag.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create store backed by `path`
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl CrudHandler for FileStore {
    async fn load(&self) -> anyhow::Result<DataValue> {
        if !tokio::fs::try_exists(&self.path).await? {
            tracing::debug!(path = %self.path.display(), "no stored record");
            return Ok(DataValue::Null);
        }
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", self.path.display()))
    }

    async fn save(&self, request: &SaveRequest) -> anyhow::Result<DataValue> {
        let exists = tokio::fs::try_exists(&self.path).await?;
        match request.mode {
            DataMode::Insert if exists => {
                anyhow::bail!("record already exists at {}", self.path.display())
            }
            DataMode::Update if !exists => {
                anyhow::bail!("no record to update at {}", self.path.display())
            }
            DataMode::Unspecified => anyhow::bail!("save requested outside an edit session"),
            _ => {}
        }

        let record = strip_tag(request.value.clone());
        let text = serde_json::to_string_pretty(&record)?;
        tokio::fs::write(&self.path, text)
            .await
            .with_context(|| format!("writing {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), mode = %request.mode, "stored record");
        Ok(record)
    }
}

//! JSON file registry backend
//!
//! The registry is stored as a JSON array of service identifiers. Writes go
//! to a sibling `<file>.tmp` first and are then renamed over the target, so a
//! crash mid-write leaves either the old or the new array on disk, never a
//! truncated one.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::backend::RegistryBackend;
use super::error::RegistryResult;

/// File-backed registry storage
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl RegistryBackend for JsonFileBackend {
    async fn load(&self) -> RegistryResult<BTreeSet<String>> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no registry file at {}, starting empty", self.path.display());
                return Ok(BTreeSet::new());
            }
            Err(e) => return Err(e.into()),
        };

        let services: Vec<String> = serde_json::from_slice(&content)?;
        debug!(
            "loaded {} services from {}",
            services.len(),
            self.path.display()
        );
        Ok(services.into_iter().collect())
    }

    async fn save(&self, services: &BTreeSet<String>) -> RegistryResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        // BTreeSet serializes as a sorted array
        let content = serde_json::to_vec_pretty(services)?;
        let temp_path = self.temp_path();

        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&content).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!(
            "persisted {} services to {}",
            services.len(),
            self.path.display()
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json file {}", self.path.display())
    }
}

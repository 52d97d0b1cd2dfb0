use crate::domain::CatalogDocument;
use crate::error::Result;
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

/// Storage seam for the catalog document. The catalog is a full snapshot:
/// written wholesale, read wholesale, never patched in place.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn save_catalog(&self, catalog: &CatalogDocument) -> Result<()>;
    async fn load_catalog(&self) -> Result<Option<CatalogDocument>>;
}

/// JSON-file storage at a fixed path.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn save_catalog(&self, catalog: &CatalogDocument) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json_content = serde_json::to_string_pretty(catalog)?;
        fs::write(&self.path, json_content)?;

        debug!("Saved catalog to {}", self.path.display());
        Ok(())
    }

    async fn load_catalog(&self) -> Result<Option<CatalogDocument>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

/// In-memory storage implementation for development/testing.
#[derive(Default)]
pub struct InMemoryStorage {
    catalog: Mutex<Option<CatalogDocument>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn save_catalog(&self, catalog: &CatalogDocument) -> Result<()> {
        *self.catalog.lock().unwrap() = Some(catalog.clone());
        debug!("Saved catalog in memory");
        Ok(())
    }

    async fn load_catalog(&self) -> Result<Option<CatalogDocument>> {
        Ok(self.catalog.lock().unwrap().clone())
    }
}

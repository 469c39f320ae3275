//! In-memory catalog backed by a JSON document

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ChapterCatalog;
use super::error::CatalogError;
use super::model::LearningModule;

/// Demo catalog shipped with the binary
const BUILTIN_CATALOG: &str = include_str!("builtin.json");

/// Catalog holding all modules in memory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryCatalog {
    modules: Vec<LearningModule>,
}

impl InMemoryCatalog {
    /// Build a catalog, rejecting duplicate module or chapter ids
    pub fn new(modules: Vec<LearningModule>) -> Result<Self, CatalogError> {
        let mut module_ids = HashSet::new();
        for module in &modules {
            if !module_ids.insert(module.id) {
                return Err(CatalogError::DuplicateModule(module.id));
            }
            let mut chapter_ids = HashSet::new();
            for chapter in &module.chapters {
                if !chapter_ids.insert(chapter.id()) {
                    return Err(CatalogError::DuplicateChapter {
                        module: module.id,
                        chapter: chapter.id(),
                    });
                }
            }
        }
        Ok(Self { modules })
    }

    /// A fresh copy of the demo catalog
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parse a catalog document (`{"modules": [...]}`)
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let parsed: InMemoryCatalog = serde_json::from_str(json)?;
        Self::new(parsed.modules)
    }

    /// Load a catalog document from disk
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|source| CatalogError::Io { path: path.to_path_buf(), source })?;
        let catalog = Self::from_json(&contents)?;
        tracing::debug!("Loaded {} modules from {:?}", catalog.modules.len(), path);
        Ok(catalog)
    }
}

impl ChapterCatalog for InMemoryCatalog {
    fn modules(&self) -> &[LearningModule] {
        &self.modules
    }
}

//! Learning content catalog
//!
//! The host views never read content from a global. They are handed a
//! `ChapterCatalog`, and `InMemoryCatalog` is the implementation used by the
//! binary and by tests.

pub mod error;
pub mod memory;
pub mod model;

pub use error::CatalogError;
pub use memory::InMemoryCatalog;
pub use model::{Chapter, LearningModule, Level, Quiz, Slide};

/// Source of learning modules and their chapters
pub trait ChapterCatalog {
    /// All modules in display order
    fn modules(&self) -> &[LearningModule];

    /// Find a module by id
    fn module(&self, module_id: u32) -> Option<&LearningModule> {
        self.modules().iter().find(|m| m.id == module_id)
    }

    /// Find a chapter within a module
    fn chapter(&self, module_id: u32, chapter_id: u32) -> Option<&Chapter> {
        self.module(module_id).and_then(|m| m.chapter(chapter_id))
    }

    /// First module that has at least one chapter, with that chapter
    fn first_playable(&self) -> Option<(&LearningModule, &Chapter)> {
        self.modules().iter().find_map(|m| m.chapters.first().map(|c| (m, c)))
    }
}

//! Content model for learning modules
//!
//! Chapters are immutable once built. Every constructor and the serde path go
//! through the same validation, so a `Chapter` in hand always has at least one
//! slide and a quiz whose correct index points at a real option.

use serde::{Deserialize, Deserializer, Serialize};

use super::error::CatalogError;

/// Shown in place of the image for modules that ship without one
pub const PLACEHOLDER_IMAGE: &str = "(no image)";

/// Difficulty level of a learning module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

/// A single content slide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    /// Slide heading
    pub title: String,
    /// Body text
    pub content: String,
    /// Optional illustration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Slide {
    /// Create a slide without an image
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self { title: title.into(), content: content.into(), image: None }
    }
}

/// The multiple-choice question that closes a chapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    /// Question text
    pub question: String,
    /// Answer options in display order
    pub options: Vec<String>,
    /// Index of the correct option
    pub correct_index: usize,
}

impl Quiz {
    /// Create a quiz, checking that the correct index is in range
    pub fn new(
        question: impl Into<String>,
        options: Vec<String>,
        correct_index: usize,
    ) -> Result<Self, CatalogError> {
        let quiz = Self { question: question.into(), options, correct_index };
        quiz.validate()?;
        Ok(quiz)
    }

    /// Whether `index` is the correct answer
    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct_index
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.options.len() < 2 {
            return Err(CatalogError::TooFewOptions { found: self.options.len() });
        }
        if self.correct_index >= self.options.len() {
            return Err(CatalogError::CorrectIndexOutOfRange {
                index: self.correct_index,
                options: self.options.len(),
            });
        }
        Ok(())
    }
}

/// Unvalidated wire form of a chapter
#[derive(Deserialize)]
struct RawChapter {
    id: u32,
    title: String,
    #[serde(default)]
    duration: Option<String>,
    slides: Vec<Slide>,
    quiz: Quiz,
}

/// A chapter: ordered slides followed by exactly one quiz
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chapter {
    id: u32,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<String>,
    slides: Vec<Slide>,
    quiz: Quiz,
}

impl<'de> Deserialize<'de> for Chapter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawChapter::deserialize(deserializer)?;
        let mut chapter = Chapter::new(raw.id, raw.title, raw.slides, raw.quiz)
            .map_err(serde::de::Error::custom)?;
        chapter.duration = raw.duration;
        Ok(chapter)
    }
}

impl Chapter {
    /// Build a chapter, rejecting empty slide lists and invalid quizzes
    pub fn new(
        id: u32,
        title: impl Into<String>,
        slides: Vec<Slide>,
        quiz: Quiz,
    ) -> Result<Self, CatalogError> {
        if slides.is_empty() {
            return Err(CatalogError::NoSlides { chapter: id });
        }
        quiz.validate()
            .map_err(|e| CatalogError::InvalidQuiz { chapter: id, source: Box::new(e) })?;
        Ok(Self { id, title: title.into(), duration: None, slides, quiz })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn duration(&self) -> Option<&str> {
        self.duration.as_deref()
    }

    /// Slides in order; never empty
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }
}

/// A learning module grouping related chapters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningModule {
    /// Unique identifier
    pub id: u32,
    /// Display title
    pub title: String,
    /// Short summary
    pub description: String,
    /// Difficulty level
    pub level: Level,
    /// Cover image, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Chapters in order (may be empty for modules still in preparation)
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

impl LearningModule {
    /// Cover image, falling back to the shared placeholder
    pub fn image_or_placeholder(&self) -> &str {
        self.image.as_deref().unwrap_or(PLACEHOLDER_IMAGE)
    }

    /// Find a chapter by id
    pub fn chapter(&self, chapter_id: u32) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == chapter_id)
    }

    /// Whether any chapter is available yet
    pub fn has_chapters(&self) -> bool {
        !self.chapters.is_empty()
    }
}

//! Console host for the chat and chapter views

pub mod chat;
pub mod command;
pub mod console;
pub mod learn;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::catalog::{ChapterCatalog, InMemoryCatalog};
use crate::chat::ChatSession;
use crate::config::Config;
use crate::gemini::{ApiKeyManager, GeminiClient};
use crate::learning::{ChapterPlayer, Notice, Notifier};
use chat::ChatView;
use console::{ConsoleNotifier, wrap};
use learn::{LearnExit, LearnView};

/// The console application
pub struct App {
    /// Application configuration
    config: Config,

    /// Learning content
    catalog: InMemoryCatalog,
}

impl App {
    /// Create an application, loading the catalog from `catalog_path`,
    /// the configured path, or the built-in demo catalog
    pub fn new(config: Config, catalog_path: Option<PathBuf>) -> Result<Self> {
        let catalog = match catalog_path.or_else(|| config.catalog_path.clone()) {
            Some(path) => InMemoryCatalog::from_json_file(&path)
                .with_context(|| format!("Failed to load catalog {:?}", path))?,
            None => InMemoryCatalog::builtin().context("Built-in catalog is invalid")?,
        };
        Ok(Self { config, catalog })
    }

    pub fn catalog(&self) -> &InMemoryCatalog {
        &self.catalog
    }

    /// Gemini client using whatever key is available; a missing key only
    /// surfaces when a reply is requested
    fn gemini_client(&self) -> Result<GeminiClient> {
        let api_key = ApiKeyManager::resolve().map(|(key, source)| {
            tracing::debug!("Using Gemini API key from {:?}", source);
            key
        });
        if api_key.is_none() {
            tracing::warn!("No Gemini API key configured; chat replies will use the fallback");
        }
        Ok(GeminiClient::new(self.config.gemini_settings(), api_key)?)
    }

    /// Run the interactive support chat
    pub async fn run_chat(&self) -> Result<()> {
        let client = self.gemini_client()?;
        tracing::info!("Chat using {}", client.settings().model);
        let session = ChatSession::new(client);
        let mut view = ChatView::new(session, self.config.wrap_width);
        view.run(&mut stdin_lines()).await
    }

    /// Play a chapter; defaults to the first playable chapter
    pub async fn run_learn(&self, module_id: Option<u32>, chapter_id: Option<u32>) -> Result<()> {
        let chapter = match (module_id, chapter_id) {
            (Some(m), Some(c)) => self.catalog.chapter(m, c),
            (Some(m), None) => self.catalog.module(m).and_then(|module| module.chapters.first()),
            (None, Some(c)) => {
                self.catalog.modules().iter().find_map(|module| module.chapter(c))
            }
            (None, None) => self.catalog.first_playable().map(|(_, chapter)| chapter),
        };
        let Some(chapter) = chapter else {
            bail!("No matching chapter. Run `peacenet modules` to see what is available");
        };

        let notifier = ConsoleNotifier::new(self.config.wrap_width);
        let completed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&completed);
        let player = ChapterPlayer::open(chapter, notifier, move || {
            flag.store(true, Ordering::SeqCst);
        })
        .with_completion_delay(self.config.completion_delay());

        let exit = LearnView::new(player, self.config.wrap_width).run(&mut stdin_lines()).await?;
        match exit {
            LearnExit::Completed if completed.load(Ordering::SeqCst) => {
                notifier.notify(Notice::success("Chapter completed!"));
            }
            LearnExit::Completed => {}
            LearnExit::Closed => {
                notifier.notify(Notice::info("Chapter closed. Progress is not saved."));
            }
        }
        Ok(())
    }

    /// Print the catalog
    pub fn list_modules(&self) {
        let width = self.config.wrap_width;
        for module in self.catalog.modules() {
            println!("[{}] {} ({})", module.id, module.title, module.level.label());
            println!("{}", wrap(&module.description, width));
            println!("    Image: {}", module.image_or_placeholder());
            if !module.has_chapters() {
                println!("    Chapters coming soon.");
            }
            for chapter in &module.chapters {
                let duration = chapter.duration().map(|d| format!("{} \u{2022} ", d));
                println!(
                    "    [{}] {}  {}Quiz included",
                    chapter.id(),
                    chapter.title(),
                    duration.unwrap_or_default()
                );
            }
            println!();
        }
    }

    /// Print the Gemini models visible to the configured key
    pub async fn list_models(&self) -> Result<()> {
        let models = match self.gemini_client()?.list_models().await {
            Ok(models) => models,
            Err(e) if e.requires_reauth() => {
                return Err(e).context("Set a valid key with `peacenet auth set-key <KEY>`");
            }
            Err(e) if e.is_recoverable() => {
                return Err(e).context("Gemini is unavailable right now; try again shortly");
            }
            Err(e) => return Err(e.into()),
        };
        for model in models {
            let marker = if model.supports_generate_content() { "*" } else { " " };
            let name = model.display_name.as_deref().unwrap_or("");
            println!("{} {:<40} {}", marker, model.name, name);
        }
        println!("\n* supports generateContent (usable for chat)");
        Ok(())
    }
}

fn stdin_lines() -> Lines<BufReader<Stdin>> {
    BufReader::new(tokio::io::stdin()).lines()
}

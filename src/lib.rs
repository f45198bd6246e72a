//! MicroFavola - very short stories with a twist
//!
//! This library turns a few words into a micro-story (title, body, twist
//! ending) in one of six narrative themes, using a generative language
//! model, and keeps a bounded history of recent stories.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `themes`: The fixed catalog of narrative themes
//! - `story`: The story result type and its strict response schema
//! - `generation`: The story generator seam and the Gemini client
//! - `history`: Bounded history and its snapshot persistence
//! - `controller`: The application state machine
//! - `render`: Terminal rendering and the copy confirmation
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line interface and handlers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use microfavola::{AppController, Config, GeminiClient, ThemeId};
//! use microfavola::history::{HistoryStore, SledSnapshotStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let generator = Arc::new(GeminiClient::new(config.generation.clone())?);
//!     let history = HistoryStore::load(Arc::new(SledSnapshotStore::open_default()?));
//!     let mut app = AppController::new(generator, history, ThemeId::Noir, config.generation.timeout());
//!
//!     app.set_input("un orologio rotto");
//!     let state = app.submit().await?;
//!     println!("{:?}", state);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod generation;
pub mod history;
pub mod render;
pub mod story;
pub mod themes;

// Re-export commonly used types
pub use config::Config;
pub use controller::{AppController, AppState, PendingRequest};
pub use error::{MicrofavolaError, Result};
pub use generation::{GeminiClient, StoryGenerator};
pub use history::{HistoryEntry, HistoryList, HistoryStore};
pub use story::StoryResult;
pub use themes::{Theme, ThemeId};

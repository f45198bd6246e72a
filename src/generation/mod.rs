//! Story generation
//!
//! This module contains the [`StoryGenerator`] abstraction used by the
//! controller, the prompt builder, and the Gemini-compatible HTTP client.

pub mod gemini;
pub mod prompt;

pub use gemini::GeminiClient;

use crate::error::Result;
use crate::story::StoryResult;
use async_trait::async_trait;

/// A source of generated stories
///
/// One call is one request to the generation service. Implementations
/// validate the response against the story schema and fail with
/// `MicrofavolaError::Generation` on anything else. They never touch
/// history or UI state.
#[async_trait]
pub trait StoryGenerator: Send + Sync {
    /// Generate a story from the user's words in the given tone
    ///
    /// # Arguments
    ///
    /// * `input_text` - The user's free text
    /// * `theme_id` - Theme identifier, forwarded verbatim
    /// * `style_instruction` - The theme's style instruction (may be empty)
    ///
    /// # Errors
    ///
    /// Returns `MicrofavolaError::Generation` on transport failure, timeout,
    /// non-success status, or a body that does not match the schema
    async fn generate(
        &self,
        input_text: &str,
        theme_id: &str,
        style_instruction: &str,
    ) -> Result<StoryResult>;
}

//! Story model and structured output schema
//!
//! [`StoryResult`] is the only shape the generation API is allowed to
//! answer with. Raw bodies are validated here, at the client boundary, so a
//! malformed object never travels further into the application.

use crate::error::{MicrofavolaError, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Field order enforced on the generation API
pub const STORY_FIELDS: [&str; 3] = ["title", "content", "twist"];

/// A generated micro-story
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoryResult {
    /// Short, catchy title
    pub title: String,
    /// Story body, excluding the twist
    pub content: String,
    /// Final sentence or paragraph carrying the twist
    pub twist: String,
}

impl StoryResult {
    /// Create a story from its three parts
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        twist: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            twist: twist.into(),
        }
    }

    /// Parse a raw response body against the declared schema
    ///
    /// # Errors
    ///
    /// Returns `MicrofavolaError::Generation` when the body is empty, is not
    /// JSON, or does not carry exactly the three required string fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use microfavola::story::StoryResult;
    ///
    /// let body = r#"{"title":"T","content":"C","twist":"X"}"#;
    /// let story = StoryResult::from_response_body(body).unwrap();
    /// assert_eq!(story.twist, "X");
    ///
    /// assert!(StoryResult::from_response_body("").is_err());
    /// ```
    pub fn from_response_body(body: &str) -> Result<Self> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Err(MicrofavolaError::Generation("No response from AI".to_string()).into());
        }

        let value: serde_json::Value = serde_json::from_str(trimmed).map_err(|e| {
            tracing::error!("Error parsing AI response: {}", e);
            MicrofavolaError::Generation(format!("Response is not valid JSON: {}", e))
        })?;

        // derived Deserialize also accepts a sequence
        if !value.is_object() {
            tracing::error!("AI response is not a JSON object");
            return Err(
                MicrofavolaError::Generation("Response is not a JSON object".to_string()).into(),
            );
        }

        serde_json::from_value::<StoryResult>(value).map_err(|e| {
            tracing::error!("Error parsing AI response: {}", e);
            MicrofavolaError::Generation(format!("Response does not match story schema: {}", e))
                .into()
        })
    }
}

/// Structured output schema sent with every generation request
///
/// Three required string properties with a fixed ordering, so the response
/// can be parsed without heuristic extraction.
pub fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {
                "type": "STRING",
                "description": "Un titolo breve e accattivante."
            },
            "content": {
                "type": "STRING",
                "description": "Il corpo della storia (escluso il colpo di scena finale)."
            },
            "twist": {
                "type": "STRING",
                "description": "La frase o il paragrafo finale che contiene il colpo di scena."
            }
        },
        "required": STORY_FIELDS,
        "propertyOrdering": STORY_FIELDS
    })
}

//! Gemini generation client for MicroFavola
//!
//! Implements [`StoryGenerator`] against the `generateContent` REST
//! endpoint, declaring the story schema as structured output. Transient
//! transport failures are retried a bounded number of times with
//! exponential backoff; schema failures never are.

use crate::config::GenerationConfig;
use crate::error::{MicrofavolaError, Result};
use crate::generation::{prompt, StoryGenerator};
use crate::story::{response_schema, StoryResult};

use async_trait::async_trait;
use metrics::{histogram, increment_counter};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// HTTP client for the generation API
///
/// # Examples
///
/// ```no_run
/// use microfavola::config::GenerationConfig;
/// use microfavola::generation::{GeminiClient, StoryGenerator};
///
/// # async fn example() -> microfavola::error::Result<()> {
/// let client = GeminiClient::new(GenerationConfig::default())?;
/// let story = client
///     .generate("un orologio rotto", "poetico", "Linguaggio lirico, delicato e sognante.")
///     .await?;
/// println!("{}", story.title);
/// # Ok(())
/// # }
/// ```
pub struct GeminiClient {
    client: Client,
    config: GenerationConfig,
}

/// Request body for `generateContent`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationParams,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationParams {
    response_mime_type: String,
    response_schema: serde_json::Value,
    temperature: f32,
}

/// Response envelope from `generateContent`
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, empty when there is none
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Outcome of a failed attempt
#[derive(Debug)]
enum AttemptError {
    /// Worth another try (connect error, timeout, 429, 5xx)
    Transient(String),
    /// Retrying would not help
    Fatal(String),
}

impl GeminiClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: GenerationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("microfavola/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                tracing::error!("Failed to create HTTP client: {}", e);
                MicrofavolaError::Http(e)
            })?;

        tracing::info!(
            "Initialized generation client: api_base={}, model={}",
            config.api_base,
            config.model
        );

        Ok(Self { client, config })
    }

    /// The configured model identifier
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request(
        &self,
        input_text: &str,
        theme_id: &str,
        style_instruction: &str,
    ) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: prompt::system_instruction(style_instruction, &self.config.language),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt::user_content(input_text, theme_id),
                }],
            }],
            generation_config: GenerationParams {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
                temperature: self.config.temperature,
            },
        }
    }

    /// One request; returns the raw text of the first candidate
    async fn send_once(
        &self,
        request: &GenerateContentRequest,
    ) -> std::result::Result<String, AttemptError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Generation request failed: {}", e);
                if e.is_timeout() || e.is_connect() || e.is_request() {
                    AttemptError::Transient(format!("Generation request failed: {}", e))
                } else {
                    AttemptError::Fatal(format!("Generation request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Generation API returned error {}: {}", status, error_text);
            let message = format!("Generation API returned error {}", status);
            return Err(if is_transient_status(status) {
                AttemptError::Transient(message)
            } else {
                AttemptError::Fatal(message)
            });
        }

        let envelope: GenerateContentResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse generation response: {}", e);
            if e.is_timeout() {
                AttemptError::Transient(format!("Timed out reading response: {}", e))
            } else {
                AttemptError::Fatal(format!("Failed to parse generation response: {}", e))
            }
        })?;

        Ok(envelope.text())
    }
}

/// Delay before retry number `attempt + 1`: `base * 2^attempt`, saturating
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.checked_mul(2u32.saturating_pow(attempt))
        .unwrap_or(Duration::MAX)
}

fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait]
impl StoryGenerator for GeminiClient {
    async fn generate(
        &self,
        input_text: &str,
        theme_id: &str,
        style_instruction: &str,
    ) -> Result<StoryResult> {
        let request = self.build_request(input_text, theme_id, style_instruction);
        let started = Instant::now();
        increment_counter!("story_generations_total", "theme" => theme_id.to_string());

        tracing::debug!(
            theme = %theme_id,
            model = %self.config.model,
            "Sending generation request"
        );

        let mut attempt: u32 = 0;
        let text = loop {
            match self.send_once(&request).await {
                Ok(text) => break text,
                Err(AttemptError::Transient(message)) if attempt < self.config.max_retries => {
                    let delay = backoff_delay(self.config.retry_backoff(), attempt);
                    attempt += 1;
                    tracing::warn!(
                        "Transient generation failure (attempt {}/{}): {}; retrying in {:?}",
                        attempt,
                        self.config.max_retries + 1,
                        message,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(AttemptError::Transient(message)) | Err(AttemptError::Fatal(message)) => {
                    increment_counter!("story_generation_failures_total");
                    return Err(MicrofavolaError::Generation(message).into());
                }
            }
        };

        let story = StoryResult::from_response_body(&text).map_err(|e| {
            increment_counter!("story_generation_failures_total");
            e
        })?;

        let elapsed: Duration = started.elapsed();
        histogram!("story_generation_duration_seconds", elapsed.as_secs_f64());
        tracing::info!(
            "Generated story \"{}\" in {} ms",
            story.title,
            elapsed.as_millis()
        );

        Ok(story)
    }
}

//! Application controller
//!
//! Owns the input state, the selected theme, the displayed result and the
//! history store, and drives the generation lifecycle:
//!
//! ```text
//! Idle ──submit──▶ Generating ──ok──▶ ResultReady
//!                       │
//!                       └──err──▶ Failed
//! ResultReady / Failed ──submit──▶ Generating
//! any state ──select history entry──▶ ResultReady (no network call)
//! ```
//!
//! Submission is split into [`AppController::begin_submit`] and
//! [`AppController::complete`] so a host can keep handling history
//! selections while the request is outstanding. Every request carries a
//! sequence number; completions for anything but the latest outstanding
//! request are discarded.

use crate::error::{MicrofavolaError, Result};
use crate::generation::StoryGenerator;
use crate::history::{HistoryEntry, HistoryStore};
use crate::render::{self, CopyFeedback};
use crate::story::StoryResult;
use crate::themes::{self, ThemeId};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Generic notice shown for any generation failure
pub const GENERIC_ERROR_NOTICE: &str = "Ops! Qualcosa è andato storto. Riprova.";

/// Notice shown when the user cancels an outstanding request
pub const CANCELLED_NOTICE: &str = "Richiesta annullata.";

/// Controller state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Nothing displayed, nothing outstanding
    Idle,
    /// One request outstanding
    Generating,
    /// A story is displayed
    ResultReady(StoryResult),
    /// The last request failed; carries the user-facing notice
    Failed(String),
}

/// Ticket for an outstanding generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    /// Monotonically increasing sequence number
    pub seq: u64,
    /// Trimmed input text
    pub input: String,
    /// Theme at submission time
    pub theme: ThemeId,
    /// The theme's style instruction
    pub style_instruction: String,
}

/// The application state machine
pub struct AppController {
    generator: Arc<dyn StoryGenerator>,
    history: HistoryStore,
    state: AppState,
    input: String,
    theme: ThemeId,
    last_seq: u64,
    in_flight: Option<PendingRequest>,
    request_timeout: Duration,
    copy_feedback: CopyFeedback,
}

impl AppController {
    /// Create a controller in the `Idle` state
    ///
    /// # Arguments
    ///
    /// * `generator` - Story source used for every submission
    /// * `history` - Loaded history store
    /// * `theme` - Initially selected theme
    /// * `request_timeout` - Upper bound on a single generation
    pub fn new(
        generator: Arc<dyn StoryGenerator>,
        history: HistoryStore,
        theme: ThemeId,
        request_timeout: Duration,
    ) -> Self {
        Self {
            generator,
            history,
            state: AppState::Idle,
            input: String::new(),
            theme,
            last_seq: 0,
            in_flight: None,
            request_timeout,
            copy_feedback: CopyFeedback::default(),
        }
    }

    /// Current state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Whether a request is outstanding
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The displayed story, if any
    pub fn current_result(&self) -> Option<&StoryResult> {
        match &self.state {
            AppState::ResultReady(story) => Some(story),
            _ => None,
        }
    }

    /// Current input text
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the input text
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Selected theme
    pub fn theme(&self) -> ThemeId {
        self.theme
    }

    /// Select a theme for the next submission
    pub fn select_theme(&mut self, theme: ThemeId) {
        tracing::debug!(theme = %theme, "Theme selected");
        self.theme = theme;
    }

    /// The history store
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// The copy confirmation signal
    pub fn copy_feedback(&self) -> &CopyFeedback {
        &self.copy_feedback
    }

    /// Start a submission
    ///
    /// Clears the displayed result, enters `Generating` and returns the
    /// ticket to pass back to [`AppController::complete`].
    ///
    /// # Errors
    ///
    /// * `MicrofavolaError::EmptyInput` - input is blank
    /// * `MicrofavolaError::AlreadyInFlight` - a request is outstanding
    pub fn begin_submit(&mut self) -> std::result::Result<PendingRequest, MicrofavolaError> {
        let input = self.input.trim();
        if input.is_empty() {
            tracing::debug!("Ignoring submission with empty input");
            return Err(MicrofavolaError::EmptyInput);
        }
        if self.in_flight.is_some() {
            tracing::debug!("Ignoring submission while a request is in flight");
            return Err(MicrofavolaError::AlreadyInFlight);
        }

        self.last_seq += 1;
        let request = PendingRequest {
            seq: self.last_seq,
            input: input.to_string(),
            theme: self.theme,
            style_instruction: themes::style_instruction(self.theme.as_str()).to_string(),
        };

        self.in_flight = Some(request.clone());
        self.state = AppState::Generating;
        tracing::info!(seq = request.seq, theme = %request.theme, "Generation started");

        Ok(request)
    }

    /// Future that performs the request, bounded by the configured timeout
    ///
    /// The future owns everything it needs, so the controller stays free
    /// for history selections while it runs.
    pub fn dispatch(
        &self,
        request: &PendingRequest,
    ) -> impl Future<Output = Result<StoryResult>> + Send + 'static {
        let generator = Arc::clone(&self.generator);
        let request = request.clone();
        let timeout = self.request_timeout;

        async move {
            match tokio::time::timeout(
                timeout,
                generator.generate(
                    &request.input,
                    request.theme.as_str(),
                    &request.style_instruction,
                ),
            )
            .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(MicrofavolaError::Generation(format!(
                    "Generation timed out after {:?}",
                    timeout
                ))
                .into()),
            }
        }
    }

    /// Apply the outcome of request `seq`
    ///
    /// Returns `false` (and changes nothing) when `seq` is not the latest
    /// outstanding request. A success is recorded with the input and theme
    /// captured by [`AppController::begin_submit`], not the current ones.
    pub fn complete(&mut self, seq: u64, outcome: Result<StoryResult>) -> bool {
        let request = match self.in_flight.take() {
            Some(request) if request.seq == seq => request,
            other => {
                self.in_flight = other;
                tracing::debug!(seq, "Discarding completion of superseded request");
                return false;
            }
        };

        match outcome {
            Ok(story) => {
                tracing::info!(seq, title = %story.title, "Generation succeeded");
                let list = self
                    .history
                    .record(story.clone(), &request.input, request.theme);
                tracing::debug!(entries = list.len(), "History updated");
                self.state = AppState::ResultReady(story);
            }
            Err(e) => {
                tracing::error!(seq, "Generation failed: {:#}", e);
                self.state = AppState::Failed(GENERIC_ERROR_NOTICE.to_string());
            }
        }

        true
    }

    /// Submit the current input and wait for the outcome
    ///
    /// # Errors
    ///
    /// Returns the rejection when the submission is suppressed (empty input
    /// or a request already in flight). Generation failures are not errors
    /// here; they leave the controller in `Failed`.
    pub async fn submit(&mut self) -> std::result::Result<&AppState, MicrofavolaError> {
        let request = self.begin_submit()?;
        let outcome = self.dispatch(&request).await;
        self.complete(request.seq, outcome);
        Ok(&self.state)
    }

    /// Abandon the outstanding request, if any
    pub fn cancel(&mut self) -> bool {
        match self.in_flight.take() {
            Some(request) => {
                tracing::info!(seq = request.seq, "Generation cancelled");
                self.state = AppState::Failed(CANCELLED_NOTICE.to_string());
                true
            }
            None => false,
        }
    }

    /// Display a history entry without any network call
    ///
    /// Restores the entry's input and theme. An outstanding request is
    /// superseded and its completion will be discarded.
    pub fn select_history(&mut self, id: &str) -> bool {
        match self.history.get(id).cloned() {
            Some(entry) => {
                self.show_entry(entry);
                true
            }
            None => false,
        }
    }

    /// Display the history entry at `index` (0 is the newest)
    pub fn select_history_index(&mut self, index: usize) -> bool {
        match self.history.get_index(index).cloned() {
            Some(entry) => {
                self.show_entry(entry);
                true
            }
            None => false,
        }
    }

    fn show_entry(&mut self, entry: HistoryEntry) {
        if let Some(request) = self.in_flight.take() {
            tracing::info!(
                seq = request.seq,
                "History selection supersedes in-flight request"
            );
        }

        match entry.theme_id() {
            Some(theme) => self.theme = theme,
            None => tracing::warn!("History entry has unknown theme {}", entry.theme),
        }
        self.input = entry.input;
        self.state = AppState::ResultReady(entry.story);
    }

    /// Empty the history and its persisted snapshot
    pub fn clear_history(&mut self) {
        self.history.clear();
        tracing::info!("History cleared");
    }

    /// Copy text for the displayed story, starting the confirmation signal
    pub fn copy_result(&mut self) -> Option<String> {
        let text = self.current_result().map(render::clipboard_text)?;
        self.copy_feedback.trigger();
        Some(text)
    }
}

/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `write`       - One-shot story generation
- `interactive` - Interactive writing session
- `themes`      - Theme catalog listing
- `history`     - History listing, reopening and clearing

Handlers wire the library components together: configuration, the
generation client, the history store and the controller.
*/

use crate::config::Config;
use crate::controller::{AppController, AppState};
use crate::error::{MicrofavolaError, Result};
use crate::generation::{GeminiClient, StoryGenerator};
use crate::history::{HistoryStore, MemorySnapshotStore, SledSnapshotStore, SnapshotStore};
use crate::render;
use crate::themes::ThemeId;
use colored::Colorize;
use std::sync::Arc;

// Special commands parser for the interactive session
pub mod special_commands;

// History management commands
pub mod history;

/// Open the history store described by `config`
///
/// Ephemeral sessions keep history in memory only.
///
/// # Errors
///
/// Returns `MicrofavolaError::Storage` if the database cannot be opened
pub fn open_history(config: &Config, ephemeral: bool) -> Result<HistoryStore> {
    let backend: Arc<dyn SnapshotStore> = if ephemeral {
        tracing::info!("Using in-memory history for this session");
        Arc::new(MemorySnapshotStore::new())
    } else {
        match &config.history.path {
            Some(path) => Arc::new(SledSnapshotStore::open(path)?),
            None => Arc::new(SledSnapshotStore::open_default()?),
        }
    };

    Ok(HistoryStore::load(backend))
}

/// Resolve a theme given on the command line, falling back to `default`
///
/// # Errors
///
/// Returns `MicrofavolaError::UnknownTheme` for an id not in the catalog
pub fn resolve_theme(theme: Option<&str>, default: ThemeId) -> Result<ThemeId> {
    match theme {
        Some(id) => Ok(id.parse::<ThemeId>()?),
        None => Ok(default),
    }
}

fn build_controller(config: &Config, theme: ThemeId, ephemeral: bool) -> Result<AppController> {
    let generator: Arc<dyn StoryGenerator> =
        Arc::new(GeminiClient::new(config.generation.clone())?);
    let history = open_history(config, ephemeral)?;

    Ok(AppController::new(
        generator,
        history,
        theme,
        config.generation.timeout(),
    ))
}

// One-shot write command handler
pub mod write {
    //! One-shot generation.
    //!
    //! Submits a single prompt, prints the story and records it in history.

    use super::*;

    /// Generate one story and print it
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `prompt` - Keywords, phrase or thought
    /// * `theme` - Optional theme override
    /// * `json` - Print the story as JSON
    ///
    /// # Errors
    ///
    /// Returns error on blank input, unknown theme or failed generation
    pub async fn run_write(
        config: Config,
        prompt: String,
        theme: Option<String>,
        json: bool,
    ) -> Result<()> {
        let theme = resolve_theme(theme.as_deref(), config.default_theme)?;
        let mut app = build_controller(&config, theme, false)?;
        app.set_input(prompt);

        if !json {
            eprintln!("{}", render::render_loading(theme.theme()));
        }

        match app.submit().await? {
            AppState::ResultReady(story) => {
                if json {
                    let body =
                        serde_json::to_string_pretty(story).map_err(MicrofavolaError::Serialization)?;
                    println!("{}", body);
                } else {
                    println!();
                    println!("{}", render::render_story(story, Some(theme.theme())));
                    println!();
                }
                Ok(())
            }
            AppState::Failed(notice) => {
                eprintln!("{}", notice.red());
                Err(MicrofavolaError::Generation(notice.clone()).into())
            }
            state => {
                tracing::error!("Unexpected state after submit: {:?}", state);
                Err(MicrofavolaError::Generation("Generation did not complete".to_string()).into())
            }
        }
    }
}

// Interactive session handler
pub mod interactive {
    //! Interactive writing session.
    //!
    //! Runs a readline-based loop: free text becomes a story prompt, lines
    //! starting with `/` are special commands. Ctrl-C while a story is being
    //! written cancels the request.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start the interactive session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `theme` - Optional initial theme override
    /// * `ephemeral` - Keep history in memory only
    pub async fn run_interactive(
        config: Config,
        theme: Option<String>,
        ephemeral: bool,
    ) -> Result<()> {
        let theme = resolve_theme(theme.as_deref(), config.default_theme)?;
        let mut app = build_controller(&config, theme, ephemeral)?;

        let mut rl = DefaultEditor::new().map_err(|e| {
            tracing::error!("Failed to initialize line editor: {}", e);
            MicrofavolaError::Config(format!("Failed to initialize line editor: {}", e))
        })?;

        print_welcome_banner(&app);

        loop {
            let prompt = format!("{} › ", app.theme().theme().icon);
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    remember_line(&mut rl, trimmed);

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::None) => {
                            app.set_input(trimmed);
                            generate(&mut app).await;
                        }
                        Ok(SpecialCommand::Exit) => break,
                        Ok(command) => handle_special_command(&mut app, command, &config),
                        Err(e) => println!("{}", e.to_string().red()),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }

        tracing::info!("Interactive session ended");
        Ok(())
    }

    /// Add a line to the editor's recall history; failures are logged, not fatal
    pub(crate) fn remember_line(rl: &mut DefaultEditor, line: &str) -> bool {
        match rl.add_history_entry(line) {
            Ok(added) => added,
            Err(e) => {
                tracing::warn!("Failed to add line to editor history: {}", e);
                false
            }
        }
    }

    async fn generate(app: &mut AppController) {
        let request = match app.begin_submit() {
            Ok(request) => request,
            Err(e) => {
                println!("{}", e.to_string().yellow());
                return;
            }
        };

        println!("{}", render::render_loading(request.theme.theme()));

        let outcome = tokio::select! {
            outcome = app.dispatch(&request) => Some(outcome),
            _ = tokio::signal::ctrl_c() => None,
        };

        match outcome {
            Some(outcome) => {
                app.complete(request.seq, outcome);
            }
            None => {
                app.cancel();
            }
        }

        print_state(app);
    }

    fn handle_special_command(app: &mut AppController, command: SpecialCommand, config: &Config) {
        match command {
            SpecialCommand::SelectTheme(theme) => {
                app.select_theme(theme);
                let t = theme.theme();
                println!("Tema: {} {}\n", t.icon, t.label.cyan());
            }
            SpecialCommand::ListThemes => super::themes::print_catalog(app.theme()),
            SpecialCommand::ShowHistory => super::history::print_history(app.history()),
            SpecialCommand::ShowEntry(n) => {
                if app.select_history_index(n - 1) {
                    print_state(app);
                } else {
                    println!(
                        "{}",
                        format!("No story at position {} (history has {})", n, app.history().len())
                            .yellow()
                    );
                }
            }
            SpecialCommand::Copy => match app.copy_result() {
                Some(text) => {
                    println!("\n{}\n", text);
                    if let Some(message) = app.copy_feedback().message() {
                        println!("{}\n", message.green());
                    }
                }
                None => println!("{}", "No story to copy yet.".yellow()),
            },
            SpecialCommand::ClearHistory => {
                app.clear_history();
                println!("{}", "History cleared.".green());
            }
            SpecialCommand::ShowStatus => print_status_display(app, config),
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit | SpecialCommand::None => {}
        }
    }

    fn print_state(app: &AppController) {
        match app.state() {
            AppState::ResultReady(story) => {
                println!();
                println!("{}", render::render_story(story, Some(app.theme().theme())));
                println!();
            }
            AppState::Failed(notice) => println!("{}\n", notice.red()),
            AppState::Idle | AppState::Generating => {}
        }
    }

    fn print_welcome_banner(app: &AppController) {
        let theme = app.theme().theme();

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                 MicroFavola - Interactive Mode               ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Theme:   {} {}", theme.icon, theme.label.cyan());
        println!("History: {} stories\n", app.history().len());
        println!("Write a few words to get a story. Type '/help' for commands, 'exit' to quit\n");
    }

    fn print_status_display(app: &AppController, config: &Config) {
        let theme = app.theme().theme();
        let state = match app.state() {
            AppState::Idle => "idle".normal(),
            AppState::Generating => "generating".cyan(),
            AppState::ResultReady(_) => "story ready".green(),
            AppState::Failed(_) => "failed".red(),
        };

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                   MicroFavola Session Status                 ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Theme:    {} {} ({})", theme.icon, theme.label.cyan(), theme.style);
        println!("State:    {}", state);
        println!("Model:    {}", config.generation.model);
        println!("Language: {}", config.generation.language);
        println!("History:  {} stories", app.history().len());
        println!();
    }
}

// Theme catalog handler
pub mod themes {
    //! Theme catalog listing.

    use super::*;
    use prettytable::{format, Table};

    /// Print the catalog, marking `selected`
    pub fn print_catalog(selected: ThemeId) {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

        table.add_row(prettytable::row![
            "Id".bold(),
            "".bold(),
            "Label".bold(),
            "Style".bold()
        ]);

        for theme in crate::themes::catalog() {
            let marker = if theme.id == selected { "*" } else { "" };
            table.add_row(prettytable::row![
                format!("{}{}", theme.id, marker).cyan(),
                theme.icon,
                theme.label,
                theme.style
            ]);
        }

        println!("\nAvailable themes:");
        table.printstd();
        println!();
    }

    /// List the available themes
    pub fn list_themes(config: &Config) {
        print_catalog(config.default_theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::StoryResult;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_theme_default_and_override() {
        assert_eq!(resolve_theme(None, ThemeId::Noir).unwrap(), ThemeId::Noir);
        assert_eq!(
            resolve_theme(Some("Horror"), ThemeId::Noir).unwrap(),
            ThemeId::Horror
        );
    }

    #[test]
    fn test_resolve_theme_rejects_unknown() {
        let err = resolve_theme(Some("western"), ThemeId::Poetico).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MicrofavolaError>(),
            Some(MicrofavolaError::UnknownTheme(_))
        ));
    }

    #[test]
    fn test_open_history_ephemeral_starts_empty() {
        let store = open_history(&Config::default(), true).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_remember_line_adds_to_editor_history() {
        use rustyline::history::History;

        let mut rl = rustyline::DefaultEditor::new().unwrap();
        assert!(interactive::remember_line(&mut rl, "un faro spento"));
        assert_eq!(rl.history().len(), 1);
    }

    #[test]
    fn test_open_history_uses_configured_path() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.history.path = Some(tmp.path().join("history"));

        let mut store = open_history(&config, false).unwrap();
        store.record(StoryResult::new("T", "C", "X"), "input", ThemeId::Noir);

        assert_eq!(store.len(), 1);
        assert!(tmp.path().join("history").exists());
    }
}

use crate::cli::HistoryCommand;
use crate::commands::open_history;
use crate::config::Config;
use crate::error::{MicrofavolaError, Result};
use crate::history::HistoryStore;
use crate::render;
use crate::themes;
use colored::Colorize;

/// Handle history commands
pub fn handle_history(config: &Config, command: HistoryCommand) -> Result<()> {
    let mut store = open_history(config, false)?;

    match command {
        HistoryCommand::List => print_history(&store),
        HistoryCommand::Show { index } => {
            let entry = index
                .checked_sub(1)
                .and_then(|i| store.get_index(i))
                .ok_or_else(|| {
                    MicrofavolaError::Storage(format!(
                        "No story at position {} (history has {})",
                        index,
                        store.len()
                    ))
                })?;

            println!();
            println!(
                "{}",
                render::render_story(&entry.story, themes::find(&entry.theme))
            );
            println!();
            println!(
                "{} \"{}\" · {}",
                "Da:".dimmed(),
                entry.input,
                render::format_date(entry.timestamp)
            );
            println!();
        }
        HistoryCommand::Clear => {
            let count = store.len();
            store.clear();
            println!("{}", format!("Deleted {} stories from history", count).green());
        }
    }

    Ok(())
}

/// Print the history table, or a notice when empty
pub fn print_history(store: &HistoryStore) {
    if store.is_empty() {
        println!("{}", "No stories in history yet.".yellow());
        return;
    }

    println!("\nRecent stories:");
    render::render_history_table(store.entries()).printstd();
    println!();
}

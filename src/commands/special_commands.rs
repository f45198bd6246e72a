//! Special commands parser for the interactive session
//!
//! Lines starting with `/` drive the session instead of being sent as a
//! story prompt. They allow users to:
//! - Switch theme or list the catalog
//! - Browse and reopen past stories
//! - Copy the displayed story
//! - Clear history, show status or help, and exit
//!
//! Commands are case-insensitive.

use crate::themes::ThemeId;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during the interactive session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Select the theme for the next story
    SelectTheme(ThemeId),

    /// Print the theme catalog
    ListThemes,

    /// Print the history list
    ShowHistory,

    /// Reopen a history entry by 1-based position
    ShowEntry(usize),

    /// Print the displayed story as a plain text block
    Copy,

    /// Delete all history
    ClearHistory,

    /// Display theme, state and history size
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be submitted as a story prompt.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` if input starts with "/" but is not
/// a valid command, `CommandError::UnsupportedArgument` for a bad argument and
/// `CommandError::MissingArgument` when an argument is required.
///
/// # Examples
///
/// ```
/// use microfavola::commands::special_commands::{parse_special_command, SpecialCommand};
/// use microfavola::themes::ThemeId;
///
/// let cmd = parse_special_command("/theme noir").unwrap();
/// assert_eq!(cmd, SpecialCommand::SelectTheme(ThemeId::Noir));
///
/// let cmd = parse_special_command("un gatto sul tetto").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/theme" => Err(CommandError::MissingArgument {
            command: "/theme".to_string(),
            usage: "/theme <id>".to_string(),
        }),
        input if input.starts_with("/theme ") => {
            let arg = input[7..].trim();
            arg.parse::<ThemeId>()
                .map(SpecialCommand::SelectTheme)
                .map_err(|_| CommandError::UnsupportedArgument {
                    command: "/theme".to_string(),
                    arg: arg.to_string(),
                })
        }
        "/themes" => Ok(SpecialCommand::ListThemes),

        "/history" => Ok(SpecialCommand::ShowHistory),
        "/show" => Err(CommandError::MissingArgument {
            command: "/show".to_string(),
            usage: "/show <n>".to_string(),
        }),
        input if input.starts_with("/show ") => {
            let arg = input[6..].trim();
            match arg.parse::<usize>() {
                Ok(n) if n > 0 => Ok(SpecialCommand::ShowEntry(n)),
                _ => Err(CommandError::UnsupportedArgument {
                    command: "/show".to_string(),
                    arg: arg.to_string(),
                }),
            }
        }

        "/copy" => Ok(SpecialCommand::Copy),
        "/clear" => Ok(SpecialCommand::ClearHistory),
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),

        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        input if input.starts_with('/') => {
            let cmd = input.split_whitespace().next().unwrap_or(input);
            Err(CommandError::UnknownCommand(cmd.to_string()))
        }

        _ => Ok(SpecialCommand::None),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Mode
=====================================

THEMES:
  /theme <id>     - Select the theme for the next story
  /themes         - List available themes

HISTORY:
  /history        - List the last stories, newest first
  /show <n>       - Reopen story n from the list
  /clear          - Delete all history

STORY:
  /copy           - Print the displayed story as plain text

SESSION:
  /status         - Show theme, state and history size
  /help           - Show this help message
  /?              - Same as /help
  exit            - Exit interactive mode
  quit            - Same as exit

NOTES:
  - Commands are case-insensitive
  - Any other text is turned into a story
  - Ctrl-C while a story is being written cancels it
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_select_theme() {
        assert_eq!(
            parse_special_command("/theme fantascienza").unwrap(),
            SpecialCommand::SelectTheme(ThemeId::Fantascienza)
        );
    }

    #[test]
    fn test_parse_select_theme_case_insensitive() {
        assert_eq!(
            parse_special_command("/THEME Noir").unwrap(),
            SpecialCommand::SelectTheme(ThemeId::Noir)
        );
    }

    #[test]
    fn test_parse_theme_missing_argument() {
        assert!(matches!(
            parse_special_command("/theme"),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_parse_theme_unknown_argument() {
        assert_eq!(
            parse_special_command("/theme western"),
            Err(CommandError::UnsupportedArgument {
                command: "/theme".to_string(),
                arg: "western".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_list_themes() {
        assert_eq!(
            parse_special_command("/themes").unwrap(),
            SpecialCommand::ListThemes
        );
    }

    #[test]
    fn test_parse_history_commands() {
        assert_eq!(
            parse_special_command("/history").unwrap(),
            SpecialCommand::ShowHistory
        );
        assert_eq!(
            parse_special_command("/show 2").unwrap(),
            SpecialCommand::ShowEntry(2)
        );
        assert_eq!(
            parse_special_command("/clear").unwrap(),
            SpecialCommand::ClearHistory
        );
    }

    #[test]
    fn test_parse_show_rejects_zero_and_text() {
        assert!(parse_special_command("/show 0").is_err());
        assert!(parse_special_command("/show due").is_err());
        assert!(matches!(
            parse_special_command("/show"),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_parse_session_commands() {
        assert_eq!(parse_special_command("/copy").unwrap(), SpecialCommand::Copy);
        assert_eq!(
            parse_special_command("/status").unwrap(),
            SpecialCommand::ShowStatus
        );
        assert_eq!(parse_special_command("/help").unwrap(), SpecialCommand::Help);
        assert_eq!(parse_special_command("/?").unwrap(), SpecialCommand::Help);
    }

    #[test]
    fn test_parse_exit_aliases() {
        for input in ["exit", "quit", "/exit", "/quit", "  EXIT  "] {
            assert_eq!(parse_special_command(input).unwrap(), SpecialCommand::Exit);
        }
    }

    #[test]
    fn test_parse_regular_text_returns_none() {
        assert_eq!(
            parse_special_command("una chiave arrugginita").unwrap(),
            SpecialCommand::None
        );
        assert_eq!(parse_special_command("").unwrap(), SpecialCommand::None);
        assert_eq!(
            parse_special_command("exit strategy").unwrap(),
            SpecialCommand::None
        );
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            parse_special_command("/foo bar"),
            Err(CommandError::UnknownCommand("/foo".to_string()))
        );
    }
}

//! MicroFavola - very short stories with a twist
//!
#![doc = "MicroFavola - very short stories with a twist"]
#![doc = "Main entry point for the MicroFavola application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use microfavola::cli::{Cli, Commands};
use microfavola::commands;
use microfavola::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;
    config.validate()?;

    match cli.command {
        Commands::Write {
            prompt,
            theme,
            json,
        } => {
            tracing::info!("Starting one-shot generation");
            if let Some(t) = &theme {
                tracing::debug!("Using theme override: {}", t);
            }
            commands::write::run_write(config, prompt, theme, json).await?;
            Ok(())
        }
        Commands::Interactive { theme, ephemeral } => {
            tracing::info!("Starting interactive mode");
            if ephemeral {
                tracing::debug!("History will not be persisted");
            }
            commands::interactive::run_interactive(config, theme, ephemeral).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            commands::history::handle_history(&config, command)?;
            Ok(())
        }
        Commands::Themes => {
            commands::themes::list_themes(&config);
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "microfavola=debug"
    } else {
        "microfavola=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

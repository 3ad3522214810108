//! Parley CLI: the main entry point.
//!
//! Commands:
//! - `chat`: Interactive tutoring session or a single message
//! - `analyze`: Grammar and vocabulary feedback on a piece of text
//! - `models`: Show the model tiers and the current selection
//! - `init`: Write a default config file

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "parley",
    about = "Parley — a conversational English tutor",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the tutor
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Conversation mode: direct or agent
        #[arg(long)]
        mode: Option<String>,

        /// Model tier: fast, balanced, smart or coding
        #[arg(long)]
        tier: Option<String>,

        /// Learner level: beginner, intermediate or advanced
        #[arg(long)]
        level: Option<String>,
    },

    /// Analyze a piece of English text
    Analyze {
        /// The text to analyze
        text: String,
    },

    /// Show available models
    Models,

    /// Create the configuration file
    Init,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Chat {
            message,
            mode,
            tier,
            level,
        } => {
            let overrides = commands::chat::Overrides { mode, tier, level };
            commands::chat::run(message, overrides).await?
        }
        Commands::Analyze { text } => commands::analyze::run(&text).await?,
        Commands::Models => commands::models::run()?,
        Commands::Init => commands::init::run()?,
    }

    Ok(())
}

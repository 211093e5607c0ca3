use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "memodict-cli", version, about = "Memodict CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Word management
    Word {
        #[command(subcommand)]
        action: commands::word::WordAction,
    },
    /// Grade one review (0=wrong, 1=hard, 2=good, 3=easy)
    Review {
        /// Word ID
        id: String,
        /// Recall grade, 0..=3
        grade: i64,
    },
    /// Drill due words in random order
    Quiz {
        /// Cap the number of words in this session
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Export the collection as a JSON envelope
    Export {
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Import a JSON envelope into the collection
    Import {
        /// Envelope file
        file: PathBuf,
    },
    /// Remote synchronization
    Sync {
        #[command(subcommand)]
        action: commands::sync::SyncAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Word { action } => commands::word::run(action),
        Commands::Review { id, grade } => commands::review::run(&id, grade),
        Commands::Quiz { limit } => commands::quiz::run(limit),
        Commands::Export { out } => commands::transfer::run_export(out),
        Commands::Import { file } => commands::transfer::run_import(&file),
        Commands::Sync { action } => commands::sync::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

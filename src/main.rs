use accessibility_advisor::Result;
use accessibility_advisor::commands::{ask, build_index, chat, show_status};
use accessibility_advisor::config::{
    default_project_root, load_dotenv, run_interactive_config, show_config,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "accessibility-advisor")]
#[command(about = "Answers questions about Canadian accessibility laws with cited sources")]
#[command(version)]
struct Cli {
    /// Project directory holding docs/, data/ and advisor.toml (defaults to the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat with the advisor
    Chat,
    /// Answer a single question and exit
    Ask {
        /// The question to answer
        question: String,
    },
    /// Build the similarity index from the docs directory
    Index {
        /// Replace an existing index instead of reusing it
        #[arg(long)]
        rebuild: bool,
    },
    /// Show the state of the persisted index
    Status,
    /// Configure the model provider and settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let root = match cli.root {
        Some(root) => root,
        None => default_project_root()?,
    };
    load_dotenv(&root);

    match cli.command {
        Commands::Chat => {
            chat(&root).await?;
        }
        Commands::Ask { question } => {
            ask(&root, &question).await?;
        }
        Commands::Index { rebuild } => {
            build_index(&root, rebuild).await?;
        }
        Commands::Status => {
            show_status(&root)?;
        }
        Commands::Config { show } => {
            if show {
                show_config(&root)?;
            } else {
                run_interactive_config(&root)?;
            }
        }
    }

    Ok(())
}

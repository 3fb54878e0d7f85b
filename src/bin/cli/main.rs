mod app;
mod commands;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "flashcards", about = "Flash card study server and CLI", version)]
struct Cli {
    /// Configuration file (default: <data dir>/config.toml)
    #[arg(long, global = true, env = "FLASHCARDS_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding spreadsheets and user properties
    #[arg(long, global = true, env = "FLASHCARDS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Act as this user (default: the configured user)
    #[arg(long, global = true, env = "FLASHCARDS_USER")]
    user: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the card viewer over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, env = "FLASHCARDS_LISTEN")]
        listen: Option<SocketAddr>,
        /// Base URL used in spreadsheet links
        #[arg(long, env = "FLASHCARDS_PUBLIC_URL")]
        public_url: Option<String>,
    },

    /// Print the current user's cards
    Cards,

    /// Append a card to the current user's spreadsheet
    Add {
        chapter: String,
        section: String,
        front: String,
        back: String,
    },

    /// Show where the current user's spreadsheet lives
    Where,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut app = app::App::new(cli.config.as_deref(), cli.data_dir, cli.user)?;

    match cli.command {
        Command::Serve { listen, public_url } => {
            if let Some(listen) = listen {
                app.config.listen = listen;
            }
            if public_url.is_some() {
                app.config.public_url = public_url;
            }
            commands::serve::run(&app)?;
        }
        Command::Cards => {
            commands::cards::run(&app, &cli.format)?;
        }
        Command::Add { chapter, section, front, back } => {
            commands::add::run(&app, chapter, section, front, back, &cli.format)?;
        }
        Command::Where => {
            commands::location::run(&app, &cli.format)?;
        }
    }

    Ok(())
}

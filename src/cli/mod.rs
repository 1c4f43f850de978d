pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "invoices")]
#[command(about = "Invoice dashboard administration")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create the customers and invoices tables")]
    Migrate,

    #[command(about = "Issue a session token for a user")]
    Token {
        #[arg(long, help = "User the session belongs to")]
        user: String,
    },

    #[command(about = "Show the access gate decision for a request path")]
    Gate {
        #[arg(help = "Request path, e.g. /dashboard/invoices")]
        path: String,
        #[arg(long, help = "Evaluate as a signed-in visitor")]
        authenticated: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = crate::config::config();

    match cli.command {
        Commands::Migrate => commands::migrate::handle(&config.database, output_format).await,
        Commands::Token { user } => commands::token::handle(&config.auth, &user, output_format),
        Commands::Gate { path, authenticated } => {
            commands::gate::handle(&config.auth, &path, authenticated, output_format)
        }
    }
}

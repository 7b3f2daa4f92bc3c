pub mod client;
pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use client::ApiClient;

#[derive(Parser)]
#[command(name = "customizer")]
#[command(about = "Customizer CLI - manage products, designs and line items on a customizer server")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Server URL (overrides CUSTOMIZER_URL and the saved server)")]
    pub url: Option<String>,

    #[arg(long, global = true, help = "Bearer token (overrides CUSTOMIZER_TOKEN and the saved login)")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Server selection and health")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },

    #[command(about = "OTP login and token management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Product records and settings")]
    Products {
        #[command(subcommand)]
        cmd: commands::products::ProductCommands,
    },

    #[command(about = "Named designs of a product")]
    Designs {
        #[command(subcommand)]
        cmd: commands::designs::DesignCommands,
    },

    #[command(about = "Line items within a design")]
    Items {
        #[command(subcommand)]
        cmd: commands::items::ItemCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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

/// Where to connect and with which token, resolved flag > env > saved session
pub struct Connection {
    pub url: String,
    pub token: Option<String>,
}

impl Connection {
    pub fn resolve(url: Option<String>, token: Option<String>) -> anyhow::Result<Self> {
        let session = config::load_session_config()?;
        let url = url
            .or_else(|| std::env::var("CUSTOMIZER_URL").ok())
            .unwrap_or_else(|| session.server_url().to_string());
        let token = token
            .or_else(|| std::env::var("CUSTOMIZER_TOKEN").ok())
            .or(session.token);
        Ok(Self { url, token })
    }

    pub fn client(&self) -> anyhow::Result<ApiClient> {
        ApiClient::new(&self.url, self.token.clone())
    }

    /// Client for protected routes; fails early when nobody is logged in
    pub fn authed_client(&self) -> anyhow::Result<ApiClient> {
        if self.token.is_none() {
            anyhow::bail!("Not logged in. Run `customizer auth request-otp` then `customizer auth verify-otp`");
        }
        self.client()
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let connection = Connection::resolve(cli.url, cli.token)?;

    match cli.command {
        Commands::Server { cmd } => commands::server::handle(cmd, &connection, output_format).await,
        Commands::Auth { cmd } => commands::auth::handle(cmd, &connection, output_format).await,
        Commands::Products { cmd } => {
            commands::products::handle(cmd, &connection, output_format).await
        }
        Commands::Designs { cmd } => commands::designs::handle(cmd, &connection, output_format).await,
        Commands::Items { cmd } => commands::items::handle(cmd, &connection, output_format).await,
    }
}

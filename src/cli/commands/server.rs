use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{load_session_config, save_session_config};
use crate::cli::utils::{output_error, output_success};
use crate::cli::{Connection, OutputFormat};

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Save the server URL used by later commands")]
    Use {
        #[arg(value_name = "URL", help = "Server URL, e.g. http://localhost:5000")]
        server_url: String,
    },

    #[command(about = "Show the server commands will talk to")]
    Current,

    #[command(about = "Check server health via /health")]
    Health,

    #[command(about = "Show server information from the API root endpoint")]
    Info,
}

pub async fn handle(
    cmd: ServerCommands,
    connection: &Connection,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Use { server_url } => {
            url::Url::parse(&server_url)
                .map_err(|e| anyhow::anyhow!("Invalid server URL '{}': {}", server_url, e))?;
            let mut session = load_session_config()?;
            if session.server_url.as_deref() != Some(server_url.as_str()) {
                // The saved token belongs to the previous server
                session.clear_login();
            }
            session.server_url = Some(server_url.clone());
            save_session_config(&session)?;
            output_success(
                &output_format,
                &format!("Using server {}", server_url),
                Some(json!({ "url": server_url })),
            )
        }
        ServerCommands::Current => output_success(
            &output_format,
            &format!("Server: {}", connection.url),
            Some(json!({ "url": connection.url, "authenticated": connection.token.is_some() })),
        ),
        ServerCommands::Health => {
            let client = connection.client()?;
            if client.ping().await {
                output_success(
                    &output_format,
                    &format!("{} is up", client.base_url()),
                    Some(json!({ "url": client.base_url(), "status": "up" })),
                )
            } else {
                output_error(&output_format, &format!("{} is down", client.base_url()))?;
                anyhow::bail!("server health check failed")
            }
        }
        ServerCommands::Info => {
            let info = connection.client()?.get("/").await?;
            let name = info.get("name").and_then(|v| v.as_str()).unwrap_or("customizer-api");
            let version = info.get("version").and_then(|v| v.as_str()).unwrap_or("unknown");
            output_success(&output_format, &format!("{} {}", name, version), Some(info.clone()))
        }
    }
}

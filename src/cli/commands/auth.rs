use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::config::{load_session_config, save_session_config};
use crate::cli::utils::output_success;
use crate::cli::{Connection, OutputFormat};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Check credentials and have a one-time code emailed")]
    RequestOtp {
        #[arg(help = "Account email")]
        email: String,
        #[arg(long, help = "Password (falls back to CUSTOMIZER_PASSWORD)")]
        password: Option<String>,
    },

    #[command(about = "Exchange the emailed code for a session token and save it")]
    VerifyOtp {
        #[arg(help = "Account email")]
        email: String,
        #[arg(help = "Six-digit code from the email")]
        otp: String,
    },

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Print the saved token")]
    Token,

    #[command(about = "Forget the saved token")]
    Logout,
}

pub async fn handle(
    cmd: AuthCommands,
    connection: &Connection,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::RequestOtp { email, password } => {
            let password = password
                .or_else(|| std::env::var("CUSTOMIZER_PASSWORD").ok())
                .ok_or_else(|| anyhow::anyhow!("--password or CUSTOMIZER_PASSWORD is required"))?;

            let data = connection
                .client()?
                .post("/api/request-otp", &json!({ "email": email, "password": password }))
                .await?;
            output_success(
                &output_format,
                &format!("OTP sent to {}", email),
                Some(data),
            )
        }
        AuthCommands::VerifyOtp { email, otp } => {
            let data = connection
                .client()?
                .post("/api/verify-otp", &json!({ "email": email, "otp": otp }))
                .await?;
            let token = data
                .get("token")
                .and_then(Value::as_str)
                .ok_or_else(|| anyhow::anyhow!("server response did not include a token"))?;

            let mut session = load_session_config()?;
            session.server_url = Some(connection.url.clone());
            session.store_login(&email, token.to_string());
            save_session_config(&session)?;

            let name = data
                .pointer("/user/name")
                .and_then(Value::as_str)
                .unwrap_or(email.as_str());
            output_success(&output_format, &format!("Logged in as {}", name), Some(data.clone()))
        }
        AuthCommands::Status => {
            let session = load_session_config()?;
            let message = match (&session.email, &session.logged_in_at) {
                (Some(email), Some(at)) => format!("Logged in as {} since {}", email, at),
                _ if connection.token.is_some() => "Using a token from flags or environment".to_string(),
                _ => "Not logged in".to_string(),
            };
            output_success(
                &output_format,
                &message,
                Some(json!({
                    "url": connection.url,
                    "email": session.email,
                    "authenticated": connection.token.is_some(),
                })),
            )
        }
        AuthCommands::Token => match &connection.token {
            Some(token) => {
                match output_format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json!({ "token": token }))?),
                    OutputFormat::Text => println!("{}", token),
                }
                Ok(())
            }
            None => anyhow::bail!("No token saved"),
        },
        AuthCommands::Logout => {
            let mut session = load_session_config()?;
            session.clear_login();
            save_session_config(&session)?;
            output_success(&output_format, "Logged out", None)
        }
    }
}

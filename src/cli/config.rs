use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// Persisted CLI session: which server to talk to and the token from the last login
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    pub server_url: Option<String>,
    pub token: Option<String>,
    pub email: Option<String>,
    pub logged_in_at: Option<DateTime<Utc>>,
}

impl SessionConfig {
    pub fn server_url(&self) -> &str {
        self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    pub fn store_login(&mut self, email: &str, token: String) {
        self.email = Some(email.to_string());
        self.token = Some(token);
        self.logged_in_at = Some(Utc::now());
    }

    pub fn clear_login(&mut self) {
        self.email = None;
        self.token = None;
        self.logged_in_at = None;
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("CUSTOMIZER_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME")
            .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("customizer").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_session_config() -> anyhow::Result<SessionConfig> {
    let session_file = get_config_dir()?.join("session.json");

    if !session_file.exists() {
        return Ok(SessionConfig::default());
    }

    let content = fs::read_to_string(session_file)?;
    let config: SessionConfig = serde_json::from_str(&content)?;
    Ok(config)
}

pub fn save_session_config(config: &SessionConfig) -> anyhow::Result<()> {
    let session_file = get_config_dir()?.join("session.json");

    let content = serde_json::to_string_pretty(config)?;
    fs::write(session_file, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_points_at_local_server() {
        let session = SessionConfig::default();
        assert_eq!(session.server_url(), DEFAULT_SERVER_URL);
        assert!(session.token.is_none());
    }

    #[test]
    fn login_can_be_cleared() {
        let mut session = SessionConfig::default();
        session.store_login("owner@example.com", "abc".to_string());
        assert_eq!(session.token.as_deref(), Some("abc"));
        assert!(session.logged_in_at.is_some());

        session.clear_login();
        assert!(session.token.is_none());
        assert!(session.email.is_none());
    }
}

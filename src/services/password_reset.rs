use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::otp_service::normalize_email;
use crate::auth::{self, hex_digest};
use crate::database::{DatabaseError, UserDirectory};
use crate::otp::{MailError, OtpMailer, TtlStore};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum ResetError {
    #[error("{0}")]
    MissingFields(&'static str),

    #[error("No account found with this email address")]
    UnknownEmail,

    #[error("Reset link expired or not found.")]
    NotFound,

    #[error("Invalid reset link.")]
    InvalidToken,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least 6 characters long")]
    PasswordTooShort,

    #[error("User not found")]
    UserNotFound,

    #[error("Failed to send reset email. Please try again.")]
    Delivery(#[from] MailError),

    #[error("Failed to hash password: {0}")]
    Hash(String),

    #[error("Failed to store reset token: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Stored per email while a reset link is outstanding
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetTicket {
    token_digest: String,
    user_id: i64,
}

/// Emailed reset tokens that let a user set a new password
#[derive(Clone)]
pub struct PasswordResetService {
    users: Arc<dyn UserDirectory>,
    store: Arc<dyn TtlStore>,
    mailer: Arc<dyn OtpMailer>,
    ttl: Duration,
    bcrypt_cost: u32,
}

impl PasswordResetService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        store: Arc<dyn TtlStore>,
        mailer: Arc<dyn OtpMailer>,
        ttl: Duration,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            store,
            mailer,
            ttl,
            bcrypt_cost,
        }
    }

    /// Issue a reset token and mail it. A new request replaces the old token.
    pub async fn request(&self, email: &str) -> Result<(), ResetError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(ResetError::MissingFields("Email is required"));
        }

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(ResetError::UnknownEmail)?;

        let token = generate_token();
        let ticket = ResetTicket {
            token_digest: hex_digest(token.as_bytes()),
            user_id: user.id,
        };
        self.store
            .put(&reset_key(&email), serde_json::to_string(&ticket)?, self.ttl)
            .await;

        self.mailer.send_password_reset(&email, &token).await?;
        info!(user_id = user.id, "Password reset requested");
        Ok(())
    }

    /// Check a token without consuming it
    pub async fn verify(&self, email: &str, token: &str) -> Result<(), ResetError> {
        self.ticket(email, token).await.map(|_| ())
    }

    /// Set a new password and consume the token
    pub async fn reset(
        &self,
        email: &str,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), ResetError> {
        if new_password != confirm_password {
            return Err(ResetError::PasswordMismatch);
        }
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ResetError::PasswordTooShort);
        }

        let (key, ticket) = self.ticket(email, token).await?;

        let password = new_password.to_string();
        let cost = self.bcrypt_cost;
        let hash = tokio::task::spawn_blocking(move || auth::hash_password(&password, cost))
            .await
            .map_err(|e| ResetError::Hash(e.to_string()))?
            .map_err(|e| ResetError::Hash(e.to_string()))?;

        if self.users.update_password(ticket.user_id, &hash).await? == 0 {
            return Err(ResetError::UserNotFound);
        }
        self.store.delete(&key).await;
        info!(user_id = ticket.user_id, "Password reset");
        Ok(())
    }

    async fn ticket(&self, email: &str, token: &str) -> Result<(String, ResetTicket), ResetError> {
        let email = normalize_email(email);
        let token = token.trim();
        if email.is_empty() || token.is_empty() {
            return Err(ResetError::MissingFields("Email and token are required"));
        }

        let key = reset_key(&email);
        let raw = self.store.get(&key).await.ok_or(ResetError::NotFound)?;
        let ticket: ResetTicket = match serde_json::from_str(&raw) {
            Ok(ticket) => ticket,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable reset ticket");
                self.store.delete(&key).await;
                return Err(ResetError::NotFound);
            }
        };

        if ticket.token_digest != hex_digest(token.as_bytes()) {
            return Err(ResetError::InvalidToken);
        }
        Ok((key, ticket))
    }
}

fn reset_key(email: &str) -> String {
    format!("reset:{}", email)
}

/// 256 bits from two v4 UUIDs, hex encoded
fn generate_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

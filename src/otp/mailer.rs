use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail delivery failed: {0}")]
    Delivery(String),
}

/// Delivers one-time codes and password reset tokens to users
#[async_trait]
pub trait OtpMailer: Send + Sync {
    async fn send_otp(&self, email: &str, code: &str) -> Result<(), MailError>;

    async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), MailError>;
}

/// Writes codes to the log instead of sending mail
#[derive(Debug, Default, Clone)]
pub struct TracingMailer;

#[async_trait]
impl OtpMailer for TracingMailer {
    async fn send_otp(&self, email: &str, code: &str) -> Result<(), MailError> {
        info!(email, "OTP issued");
        debug!(email, code, "OTP code");
        Ok(())
    }

    async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), MailError> {
        info!(email, "Password reset link issued");
        debug!(email, token, "Password reset token");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MailKind {
    Otp,
    PasswordReset,
}

/// Keeps every message it is asked to send. Used by tests.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(MailKind, String, String)>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose deliveries always fail
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub async fn last_code_for(&self, email: &str) -> Option<String> {
        self.last(MailKind::Otp, email).await
    }

    pub async fn last_reset_token_for(&self, email: &str) -> Option<String> {
        self.last(MailKind::PasswordReset, email).await
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    async fn last(&self, kind: MailKind, email: &str) -> Option<String> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|(k, to, _)| *k == kind && to == email)
            .map(|(_, _, secret)| secret.clone())
    }

    async fn record(&self, kind: MailKind, email: &str, secret: &str) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Delivery("mailer unavailable".to_string()));
        }
        self.sent
            .lock()
            .await
            .push((kind, email.to_string(), secret.to_string()));
        Ok(())
    }
}

#[async_trait]
impl OtpMailer for RecordingMailer {
    async fn send_otp(&self, email: &str, code: &str) -> Result<(), MailError> {
        self.record(MailKind::Otp, email, code).await
    }

    async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), MailError> {
        self.record(MailKind::PasswordReset, email, token).await
    }
}

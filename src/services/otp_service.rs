use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{self, hex_digest, Claims, JwtError};
use crate::database::models::LoginUser;
use crate::database::{DatabaseError, UserDirectory};
use crate::otp::{MailError, OtpMailer, TtlStore};

#[derive(Debug, Error)]
pub enum OtpError {
    #[error("{0} are required")]
    MissingFields(&'static str),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("OTP expired or not found. Please request a new OTP.")]
    NotFound,

    #[error("Invalid OTP. Please try again.")]
    InvalidCode,

    #[error("Too many invalid attempts. Please request a new OTP.")]
    TooManyAttempts,

    #[error("User not found")]
    UserNotFound,

    #[error("Your subscription is inactive. Please contact administrator to activate your account.")]
    SubscriptionInactive,

    #[error("Failed to send OTP. Please try again.")]
    Delivery(#[from] MailError),

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error("Failed to store OTP challenge: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Wrong codes accepted before a challenge is discarded
pub const MAX_CODE_ATTEMPTS: u32 = 5;

/// Stored per email while a code is outstanding
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Challenge {
    code_digest: String,
    user_id: i64,
    #[serde(default)]
    failed_attempts: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
}

impl From<&LoginUser> for SessionUser {
    fn from(user: &LoginUser) -> Self {
        Self {
            id: user.id,
            name: user.display_name().to_string(),
            email: user.email.clone(),
            phone: user.phone.clone().unwrap_or_default(),
            role: user.role().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginSession {
    pub message: &'static str,
    pub token: String,
    pub user: SessionUser,
}

/// Two-step login: password check issues an emailed code, the code buys a JWT
#[derive(Clone)]
pub struct OtpService {
    users: Arc<dyn UserDirectory>,
    store: Arc<dyn TtlStore>,
    mailer: Arc<dyn OtpMailer>,
    ttl: Duration,
}

impl OtpService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        store: Arc<dyn TtlStore>,
        mailer: Arc<dyn OtpMailer>,
        ttl: Duration,
    ) -> Self {
        Self {
            users,
            store,
            mailer,
            ttl,
        }
    }

    pub async fn request(&self, email: &str, password: &str) -> Result<(), OtpError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(OtpError::MissingFields("Email and password"));
        }

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(OtpError::InvalidCredentials)?;
        let stored = user.password_hash.clone().ok_or(OtpError::InvalidCredentials)?;
        if !password_matches(password, stored).await {
            return Err(OtpError::InvalidCredentials);
        }

        let code = generate_code();
        let challenge = Challenge {
            code_digest: code_digest(&email, &code),
            user_id: user.id,
            failed_attempts: 0,
        };
        let value = serde_json::to_string(&challenge)?;
        self.store.put(&challenge_key(&email), value, self.ttl).await;

        self.mailer.send_otp(&email, &code).await?;
        info!(user_id = user.id, "OTP requested");
        Ok(())
    }

    /// Consume a code and issue a session token
    pub async fn verify(&self, email: &str, code: &str) -> Result<LoginSession, OtpError> {
        let email = normalize_email(email);
        let code = code.trim();
        if email.is_empty() || code.is_empty() {
            return Err(OtpError::MissingFields("Email and OTP"));
        }

        let key = challenge_key(&email);
        let raw = self.store.get(&key).await.ok_or(OtpError::NotFound)?;
        let challenge: Challenge = match serde_json::from_str(&raw) {
            Ok(challenge) => challenge,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable OTP challenge");
                self.store.delete(&key).await;
                return Err(OtpError::NotFound);
            }
        };

        if challenge.code_digest != code_digest(&email, code) {
            return Err(self.record_failure(&key, challenge).await);
        }

        let user = self
            .users
            .find_by_id(challenge.user_id)
            .await?
            .ok_or(OtpError::UserNotFound)?;
        if !user.subscription_active {
            return Err(OtpError::SubscriptionInactive);
        }

        let token = auth::generate_jwt(&Claims::for_user(&user))?;
        self.store.delete(&key).await;
        info!(user_id = user.id, "OTP verified, session issued");

        Ok(LoginSession {
            message: "Login successful",
            token,
            user: SessionUser::from(&user),
        })
    }

    /// Count a wrong code; the last allowed miss discards the challenge
    async fn record_failure(&self, key: &str, challenge: Challenge) -> OtpError {
        let failed_attempts = challenge.failed_attempts + 1;
        if failed_attempts >= MAX_CODE_ATTEMPTS {
            self.store.delete(key).await;
            warn!(
                user_id = challenge.user_id,
                failed_attempts,
                "OTP challenge discarded after repeated misses"
            );
            return OtpError::TooManyAttempts;
        }

        let updated = Challenge {
            failed_attempts,
            ..challenge
        };
        match serde_json::to_string(&updated) {
            Ok(value) => {
                self.store.replace(key, value).await;
                OtpError::InvalidCode
            }
            Err(e) => e.into(),
        }
    }
}

/// bcrypt check on the blocking pool
pub(crate) async fn password_matches(password: &str, stored_hash: String) -> bool {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || auth::verify_password(&password, &stored_hash))
        .await
        .unwrap_or(false)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn challenge_key(email: &str) -> String {
    format!("otp:{}", email)
}

fn code_digest(email: &str, code: &str) -> String {
    hex_digest(format!("{}:{}", email, code).as_bytes())
}

/// Six decimal digits, never starting with zero
fn generate_code() -> String {
    let n = Uuid::new_v4().as_u128() % 900_000 + 100_000;
    n.to_string()
}

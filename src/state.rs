use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::database::{ProductStore, UserDirectory};
use crate::otp::{OtpMailer, TtlStore};
use crate::services::{DesignService, OtpService, PasswordResetService, ProductService};

/// Shared handler state; every field is cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProductStore>,
    pub products: ProductService,
    pub designs: DesignService,
    pub otp: OtpService,
    pub password_reset: PasswordResetService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ProductStore>,
        users: Arc<dyn UserDirectory>,
        challenges: Arc<dyn TtlStore>,
        mailer: Arc<dyn OtpMailer>,
        config: &AppConfig,
    ) -> Self {
        Self {
            products: ProductService::new(store.clone()),
            designs: DesignService::new(store.clone(), config.documents.max_write_attempts),
            otp: OtpService::new(
                users.clone(),
                challenges.clone(),
                mailer.clone(),
                Duration::from_secs(config.otp.ttl_secs),
            ),
            password_reset: PasswordResetService::new(
                users,
                challenges,
                mailer,
                Duration::from_secs(config.otp.reset_ttl_secs),
                config.security.bcrypt_cost,
            ),
            store,
        }
    }
}

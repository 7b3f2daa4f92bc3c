use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_ROLE: &str = "superadmin";

/// Login account from `login_master`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoginUser {
    pub id: i64,
    pub email: String,
    pub user_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub store_hash: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub subscription_active: bool,
}

impl LoginUser {
    pub fn role(&self) -> &str {
        self.role.as_deref().unwrap_or(DEFAULT_ROLE)
    }

    pub fn display_name(&self) -> &str {
        self.user_name.as_deref().unwrap_or(&self.email)
    }
}

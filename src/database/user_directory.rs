use async_trait::async_trait;
use sqlx::PgPool;

use super::manager::DatabaseError;
use super::models::LoginUser;

/// Login accounts for the OTP and password reset flows
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<LoginUser>, DatabaseError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<LoginUser>, DatabaseError>;

    /// Store a new bcrypt hash; returns the affected row count
    async fn update_password(&self, id: i64, password_hash: &str) -> Result<u64, DatabaseError>;
}

const USER_COLUMNS: &str =
    "id, email, user_name, phone, role, store_hash, password_hash, subscription_active";

#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<LoginUser>, DatabaseError> {
        let sql = format!("SELECT {} FROM login_master WHERE LOWER(email) = LOWER($1)", USER_COLUMNS);
        let user = sqlx::query_as::<_, LoginUser>(&sql)
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<LoginUser>, DatabaseError> {
        let sql = format!("SELECT {} FROM login_master WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, LoginUser>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "UPDATE login_master SET password_hash = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(password_hash)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

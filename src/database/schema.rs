use sqlx::PgPool;
use tracing::info;

use super::manager::DatabaseError;

const CREATE_PRODUCTS: &str = r#"
    CREATE TABLE IF NOT EXISTS products (
        id BIGSERIAL PRIMARY KEY,
        product_sku TEXT NOT NULL,
        store_hash TEXT,
        product_name TEXT,
        product_image TEXT,
        customizer_image TEXT,
        model_file TEXT,
        design_name TEXT,
        product_type TEXT NOT NULL DEFAULT '2d',
        visible BOOLEAN NOT NULL DEFAULT FALSE,
        tab_settings TEXT,
        customizable_data TEXT,
        layer_design TEXT,
        version BIGINT NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const CREATE_PRODUCTS_SKU_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS products_sku_store_idx ON products (product_sku, store_hash)";

const CREATE_LOGIN_MASTER: &str = r#"
    CREATE TABLE IF NOT EXISTS login_master (
        id BIGSERIAL PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        user_name TEXT,
        phone TEXT,
        role TEXT DEFAULT 'superadmin',
        store_hash TEXT,
        password_hash TEXT,
        subscription_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

/// Create the tables this service reads and writes, if they are missing.
///
/// Document columns are TEXT rather than JSONB: legacy rows hold values
/// wrapped in literal quotes that JSONB would reject.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    for statement in [CREATE_PRODUCTS, CREATE_PRODUCTS_SKU_INDEX, CREATE_LOGIN_MASTER] {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema verified");
    Ok(())
}

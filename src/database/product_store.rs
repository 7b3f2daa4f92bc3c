use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::debug;

use super::manager::DatabaseError;
use super::models::product::DEFAULT_PRODUCT_TYPE;
use super::models::{
    ColumnSnapshot, MediaColumn, NewProduct, ProductKey, ProductRow, SettingsUpdate,
};
use crate::document::{DesignDocument, DocumentColumn, TabSettings};

/// Persistence collaborator for products and their document columns.
///
/// `write_column` is a compare-and-set on the row version: it writes only if
/// the stored version still equals `expected_version`, bumps the version, and
/// returns the affected row count (0 when the product is gone or the version
/// moved on).
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;

    /// All products, newest first
    async fn list_products(&self) -> Result<Vec<ProductRow>, DatabaseError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<ProductRow>, DatabaseError>;

    async fn find_by_sku(&self, sku: &str) -> Result<Option<ProductRow>, DatabaseError>;

    async fn find_for_store(
        &self,
        key: ProductKey<'_>,
        store_hash: &str,
    ) -> Result<Option<ProductRow>, DatabaseError>;

    async fn insert_product(&self, product: &NewProduct) -> Result<ProductRow, DatabaseError>;

    async fn update_settings(&self, id: i64, update: &SettingsUpdate) -> Result<u64, DatabaseError>;

    /// Set or clear (`None`) a media URL column
    async fn set_media_url(
        &self,
        id: i64,
        column: MediaColumn,
        url: Option<&str>,
    ) -> Result<u64, DatabaseError>;

    /// Ids of every product with this SKU, optionally limited to one store
    async fn find_ids_by_sku(
        &self,
        sku: &str,
        store_hash: Option<&str>,
    ) -> Result<Vec<i64>, DatabaseError>;

    /// Move every matching product from `old_sku` to `new_sku`
    async fn rename_sku(
        &self,
        old_sku: &str,
        new_sku: &str,
        store_hash: Option<&str>,
    ) -> Result<u64, DatabaseError>;

    async fn read_column(
        &self,
        id: i64,
        column: DocumentColumn,
    ) -> Result<Option<ColumnSnapshot>, DatabaseError>;

    async fn write_column(
        &self,
        id: i64,
        column: DocumentColumn,
        serialized: &str,
        expected_version: i64,
    ) -> Result<u64, DatabaseError>;
}

const PRODUCT_COLUMNS: &str = "id, product_sku, store_hash, product_name, product_image, \
    customizer_image, model_file, design_name, product_type, visible, tab_settings, \
    customizable_data, layer_design, version, created_at, updated_at";

/// PostgreSQL-backed product store
#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<ProductRow>, DatabaseError> {
        let sql = format!("SELECT {} FROM products ORDER BY created_at DESC, id DESC", PRODUCT_COLUMNS);
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ProductRow>, DatabaseError> {
        let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_sku(&self, sku: &str) -> Result<Option<ProductRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM products WHERE product_sku = $1 ORDER BY id LIMIT 1",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_for_store(
        &self,
        key: ProductKey<'_>,
        store_hash: &str,
    ) -> Result<Option<ProductRow>, DatabaseError> {
        let row = match key {
            ProductKey::Id(id) => {
                let sql = format!(
                    "SELECT {} FROM products WHERE id = $1 AND store_hash = $2",
                    PRODUCT_COLUMNS
                );
                sqlx::query_as::<_, ProductRow>(&sql)
                    .bind(id)
                    .bind(store_hash)
                    .fetch_optional(&self.pool)
                    .await?
            }
            ProductKey::Sku(sku) => {
                let sql = format!(
                    "SELECT {} FROM products WHERE product_sku = $1 AND store_hash = $2 ORDER BY id LIMIT 1",
                    PRODUCT_COLUMNS
                );
                sqlx::query_as::<_, ProductRow>(&sql)
                    .bind(sku)
                    .bind(store_hash)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        Ok(row)
    }

    async fn insert_product(&self, product: &NewProduct) -> Result<ProductRow, DatabaseError> {
        let layer_design = serde_json::to_string(&DesignDocument::new())
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        let tab_settings = serde_json::to_string(&TabSettings::default())
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        let sql = format!(
            "INSERT INTO products \
                (product_sku, store_hash, product_name, product_image, product_type, visible, \
                 tab_settings, customizable_data, layer_design) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, '[]', $8) \
             RETURNING {}",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&product.product_sku)
            .bind(&product.store_hash)
            .bind(&product.product_name)
            .bind(&product.product_image)
            .bind(product.product_type.as_deref().unwrap_or(DEFAULT_PRODUCT_TYPE))
            .bind(product.visible)
            .bind(tab_settings)
            .bind(layer_design)
            .fetch_one(&self.pool)
            .await?;

        debug!(product_id = row.id, sku = %row.product_sku, "Inserted product");
        Ok(row)
    }

    async fn update_settings(&self, id: i64, update: &SettingsUpdate) -> Result<u64, DatabaseError> {
        if update.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE products SET ");
        let mut sets = builder.separated(", ");
        if let Some(tab_settings) = &update.tab_settings {
            let text = serde_json::to_string(tab_settings)
                .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
            sets.push("tab_settings = ").push_bind_unseparated(text);
        }
        if let Some(product_type) = &update.product_type {
            sets.push("product_type = ").push_bind_unseparated(product_type.clone());
        }
        if let Some(visible) = update.visible {
            sets.push("visible = ").push_bind_unseparated(visible);
        }
        sets.push("updated_at = NOW()");
        builder.push(" WHERE id = ").push_bind(id);

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn set_media_url(
        &self,
        id: i64,
        column: MediaColumn,
        url: Option<&str>,
    ) -> Result<u64, DatabaseError> {
        let sql = format!(
            "UPDATE products SET {} = $1, updated_at = NOW() WHERE id = $2",
            column.column_name()
        );
        let result = sqlx::query(&sql)
            .bind(url)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn find_ids_by_sku(
        &self,
        sku: &str,
        store_hash: Option<&str>,
    ) -> Result<Vec<i64>, DatabaseError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT id FROM products WHERE product_sku = ");
        builder.push_bind(sku);
        if let Some(store_hash) = store_hash {
            builder.push(" AND store_hash = ").push_bind(store_hash);
        }
        builder.push(" ORDER BY id");

        let ids = builder
            .build_query_scalar::<i64>()
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn rename_sku(
        &self,
        old_sku: &str,
        new_sku: &str,
        store_hash: Option<&str>,
    ) -> Result<u64, DatabaseError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE products SET updated_at = NOW(), product_sku = ");
        builder.push_bind(new_sku);
        builder.push(" WHERE product_sku = ").push_bind(old_sku);
        if let Some(store_hash) = store_hash {
            builder.push(" AND store_hash = ").push_bind(store_hash);
        }

        let result = builder.build().execute(&self.pool).await?;
        debug!(old_sku, new_sku, rows = result.rows_affected(), "Renamed SKU");
        Ok(result.rows_affected())
    }

    async fn read_column(
        &self,
        id: i64,
        column: DocumentColumn,
    ) -> Result<Option<ColumnSnapshot>, DatabaseError> {
        let sql = format!(
            "SELECT {} AS raw, version FROM products WHERE id = $1",
            column.column_name()
        );
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        row.map(|row| {
            Ok(ColumnSnapshot {
                raw: row.try_get("raw")?,
                version: row.try_get("version")?,
            })
        })
        .transpose()
    }

    async fn write_column(
        &self,
        id: i64,
        column: DocumentColumn,
        serialized: &str,
        expected_version: i64,
    ) -> Result<u64, DatabaseError> {
        let sql = format!(
            "UPDATE products SET {} = $1, version = version + 1, updated_at = NOW() \
             WHERE id = $2 AND version = $3",
            column.column_name()
        );
        let result = sqlx::query(&sql)
            .bind(serialized)
            .bind(id)
            .bind(expected_version)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::manager::DatabaseError;
use super::models::product::DEFAULT_PRODUCT_TYPE;
use super::models::{
    ColumnSnapshot, LoginUser, MediaColumn, NewProduct, ProductKey, ProductRow, SettingsUpdate,
};
use super::product_store::ProductStore;
use super::user_directory::UserDirectory;
use crate::document::{DesignDocument, DocumentColumn, TabSettings};

/// A write that lands between another caller's read and its write
#[derive(Debug, Clone)]
struct Interference {
    product_id: i64,
    column: DocumentColumn,
    raw: String,
}

/// In-process product store with the same versioning rules as the
/// PostgreSQL store. Used by tests and local tooling.
#[derive(Default)]
pub struct MemoryProductStore {
    rows: RwLock<BTreeMap<i64, ProductRow>>,
    interference: RwLock<VecDeque<Interference>>,
    writes: AtomicU64,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a document column with arbitrary text, bypassing versioning
    pub async fn set_raw_column(&self, id: i64, column: DocumentColumn, raw: Option<&str>) {
        if let Some(row) = self.rows.write().await.get_mut(&id) {
            set_column(row, column, raw.map(str::to_string));
        }
    }

    pub async fn raw_column(&self, id: i64, column: DocumentColumn) -> Option<String> {
        self.rows
            .read()
            .await
            .get(&id)
            .and_then(|row| row.column(column).map(str::to_string))
    }

    /// Queue a concurrent write that is applied just before the next
    /// `write_column` on the same product, moving its version forward
    pub async fn interfere(&self, id: i64, column: DocumentColumn, raw: impl Into<String>) {
        self.interference.write().await.push_back(Interference {
            product_id: id,
            column,
            raw: raw.into(),
        });
    }

    pub async fn remove(&self, id: i64) -> Option<ProductRow> {
        self.rows.write().await.remove(&id)
    }

    /// Number of successful column writes
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    async fn take_interference(&self, id: i64) -> Option<Interference> {
        let mut queue = self.interference.write().await;
        let position = queue.iter().position(|i| i.product_id == id)?;
        queue.remove(position)
    }
}

fn set_column(row: &mut ProductRow, column: DocumentColumn, raw: Option<String>) {
    match column {
        DocumentColumn::LayerDesign => row.layer_design = raw,
        DocumentColumn::TabSettings => row.tab_settings = raw,
        DocumentColumn::CustomizableData => row.customizable_data = raw,
    }
}

fn store_matches(row: &ProductRow, store_hash: &str) -> bool {
    row.store_hash.as_deref() == Some(store_hash)
}

fn sku_matches(row: &ProductRow, sku: &str, store_hash: Option<&str>) -> bool {
    row.product_sku == sku && store_hash.map_or(true, |hash| store_matches(row, hash))
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<ProductRow>, DatabaseError> {
        let mut rows: Vec<ProductRow> = self.rows.read().await.values().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ProductRow>, DatabaseError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_by_sku(&self, sku: &str) -> Result<Option<ProductRow>, DatabaseError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|row| row.product_sku == sku)
            .cloned())
    }

    async fn find_for_store(
        &self,
        key: ProductKey<'_>,
        store_hash: &str,
    ) -> Result<Option<ProductRow>, DatabaseError> {
        let rows = self.rows.read().await;
        let found = match key {
            ProductKey::Id(id) => rows.get(&id).filter(|row| store_matches(row, store_hash)),
            ProductKey::Sku(sku) => rows
                .values()
                .find(|row| row.product_sku == sku && store_matches(row, store_hash)),
        };
        Ok(found.cloned())
    }

    async fn insert_product(&self, product: &NewProduct) -> Result<ProductRow, DatabaseError> {
        let layer_design = serde_json::to_string(&DesignDocument::new())
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        let tab_settings = serde_json::to_string(&TabSettings::default())
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        let mut rows = self.rows.write().await;
        let id = rows.keys().next_back().copied().unwrap_or(0) + 1;
        let now = Utc::now();
        let row = ProductRow {
            id,
            product_sku: product.product_sku.clone(),
            store_hash: product.store_hash.clone(),
            product_name: product.product_name.clone(),
            product_image: product.product_image.clone(),
            customizer_image: None,
            model_file: None,
            design_name: None,
            product_type: Some(
                product
                    .product_type
                    .clone()
                    .unwrap_or_else(|| DEFAULT_PRODUCT_TYPE.to_string()),
            ),
            visible: product.visible,
            tab_settings: Some(tab_settings),
            customizable_data: Some("[]".to_string()),
            layer_design: Some(layer_design),
            version: 0,
            created_at: now,
            updated_at: now,
        };
        rows.insert(id, row.clone());
        Ok(row)
    }

    async fn update_settings(&self, id: i64, update: &SettingsUpdate) -> Result<u64, DatabaseError> {
        if update.is_empty() {
            return Ok(0);
        }
        let mut rows = self.rows.write().await;
        let Some(row) = rows.get_mut(&id) else {
            return Ok(0);
        };
        if let Some(tab_settings) = &update.tab_settings {
            let text = serde_json::to_string(tab_settings)
                .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
            row.tab_settings = Some(text);
        }
        if let Some(product_type) = &update.product_type {
            row.product_type = Some(product_type.clone());
        }
        if let Some(visible) = update.visible {
            row.visible = visible;
        }
        row.updated_at = Utc::now();
        Ok(1)
    }

    async fn set_media_url(
        &self,
        id: i64,
        column: MediaColumn,
        url: Option<&str>,
    ) -> Result<u64, DatabaseError> {
        let mut rows = self.rows.write().await;
        let Some(row) = rows.get_mut(&id) else {
            return Ok(0);
        };
        let url = url.map(str::to_string);
        match column {
            MediaColumn::CustomizerImage => row.customizer_image = url,
            MediaColumn::ModelFile => row.model_file = url,
        }
        row.updated_at = Utc::now();
        Ok(1)
    }

    async fn find_ids_by_sku(
        &self,
        sku: &str,
        store_hash: Option<&str>,
    ) -> Result<Vec<i64>, DatabaseError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|row| sku_matches(row, sku, store_hash))
            .map(|row| row.id)
            .collect())
    }

    async fn rename_sku(
        &self,
        old_sku: &str,
        new_sku: &str,
        store_hash: Option<&str>,
    ) -> Result<u64, DatabaseError> {
        let mut renamed = 0;
        let now = Utc::now();
        for row in self.rows.write().await.values_mut() {
            if sku_matches(row, old_sku, store_hash) {
                row.product_sku = new_sku.to_string();
                row.updated_at = now;
                renamed += 1;
            }
        }
        Ok(renamed)
    }

    async fn read_column(
        &self,
        id: i64,
        column: DocumentColumn,
    ) -> Result<Option<ColumnSnapshot>, DatabaseError> {
        Ok(self.rows.read().await.get(&id).map(|row| ColumnSnapshot {
            raw: row.column(column).map(str::to_string),
            version: row.version,
        }))
    }

    async fn write_column(
        &self,
        id: i64,
        column: DocumentColumn,
        serialized: &str,
        expected_version: i64,
    ) -> Result<u64, DatabaseError> {
        let interference = self.take_interference(id).await;

        let mut rows = self.rows.write().await;
        let Some(row) = rows.get_mut(&id) else {
            return Ok(0);
        };

        if let Some(other) = interference {
            set_column(row, other.column, Some(other.raw));
            row.version += 1;
        }

        if row.version != expected_version {
            return Ok(0);
        }

        set_column(row, column, Some(serialized.to_string()));
        row.version += 1;
        row.updated_at = Utc::now();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(1)
    }
}

/// In-process login directory
#[derive(Default)]
pub struct MemoryUserDirectory {
    users: RwLock<Vec<LoginUser>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, user: LoginUser) {
        self.users.write().await.push(user);
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<LoginUser>, DatabaseError> {
        let email = email.trim();
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<LoginUser>, DatabaseError> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<u64, DatabaseError> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.password_hash = Some(password_hash.to_string());
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(sku: &str, store: &str) -> NewProduct {
        NewProduct {
            product_sku: sku.to_string(),
            store_hash: Some(store.to_string()),
            visible: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn insert_starts_with_normalized_documents() {
        let store = MemoryProductStore::new();
        let row = store.insert_product(&product("MUG", "abc")).await.unwrap();

        assert_eq!(row.id, 1);
        assert_eq!(row.layer_design.as_deref(), Some("{}"));
        assert_eq!(row.customizable_data.as_deref(), Some("[]"));
        assert_eq!(row.tab_settings(), TabSettings::default());
        assert_eq!(row.product_type(), "2d");
    }

    #[tokio::test]
    async fn write_column_is_compare_and_set() {
        let store = MemoryProductStore::new();
        let row = store.insert_product(&product("MUG", "abc")).await.unwrap();

        let stale = store
            .write_column(row.id, DocumentColumn::LayerDesign, "{\"a\":[]}", row.version + 1)
            .await
            .unwrap();
        assert_eq!(stale, 0);

        let fresh = store
            .write_column(row.id, DocumentColumn::LayerDesign, "{\"a\":[]}", row.version)
            .await
            .unwrap();
        assert_eq!(fresh, 1);

        let snapshot = store
            .read_column(row.id, DocumentColumn::LayerDesign)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.raw.as_deref(), Some("{\"a\":[]}"));
        assert_eq!(snapshot.version, row.version + 1);
    }

    #[tokio::test]
    async fn interference_moves_version_before_write() {
        let store = MemoryProductStore::new();
        let row = store.insert_product(&product("MUG", "abc")).await.unwrap();
        store
            .interfere(row.id, DocumentColumn::LayerDesign, "{\"other\":[]}")
            .await;

        let affected = store
            .write_column(row.id, DocumentColumn::LayerDesign, "{\"mine\":[]}", row.version)
            .await
            .unwrap();
        assert_eq!(affected, 0);
        assert_eq!(
            store.raw_column(row.id, DocumentColumn::LayerDesign).await.as_deref(),
            Some("{\"other\":[]}")
        );
    }

    #[tokio::test]
    async fn find_for_store_requires_matching_hash() {
        let store = MemoryProductStore::new();
        let row = store.insert_product(&product("MUG", "abc")).await.unwrap();

        assert!(store.find_for_store(ProductKey::Id(row.id), "abc").await.unwrap().is_some());
        assert!(store.find_for_store(ProductKey::Id(row.id), "xyz").await.unwrap().is_none());
        assert!(store.find_for_store(ProductKey::Sku("MUG"), "abc").await.unwrap().is_some());
        assert!(store.find_for_store(ProductKey::Sku("CUP"), "abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sku_rename_can_be_limited_to_one_store() {
        let store = MemoryProductStore::new();
        store.insert_product(&product("MUG", "abc")).await.unwrap();
        store.insert_product(&product("MUG", "xyz")).await.unwrap();
        store.insert_product(&product("CUP", "abc")).await.unwrap();

        assert_eq!(store.find_ids_by_sku("MUG", None).await.unwrap(), vec![1, 2]);
        assert_eq!(store.rename_sku("MUG", "BIG-MUG", Some("abc")).await.unwrap(), 1);
        assert_eq!(store.find_ids_by_sku("MUG", None).await.unwrap(), vec![2]);
        assert_eq!(store.find_ids_by_sku("BIG-MUG", Some("abc")).await.unwrap(), vec![1]);
        assert_eq!(store.rename_sku("MUG", "BIG-MUG", None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn media_urls_can_be_cleared() {
        let store = MemoryProductStore::new();
        let row = store.insert_product(&product("MUG", "abc")).await.unwrap();

        store
            .set_media_url(row.id, MediaColumn::ModelFile, Some("https://cdn/mug.glb"))
            .await
            .unwrap();
        let found = store.find_by_id(row.id).await.unwrap().unwrap();
        assert_eq!(found.model_file.as_deref(), Some("https://cdn/mug.glb"));
        assert_eq!(found.customizer_image, None);

        store.set_media_url(row.id, MediaColumn::ModelFile, None).await.unwrap();
        let found = store.find_by_id(row.id).await.unwrap().unwrap();
        assert_eq!(found.model_file, None);
        assert_eq!(store.set_media_url(99, MediaColumn::ModelFile, None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_settings_update_touches_nothing() {
        let store = MemoryProductStore::new();
        let row = store.insert_product(&product("MUG", "abc")).await.unwrap();
        let affected = store.update_settings(row.id, &SettingsUpdate::default()).await.unwrap();
        assert_eq!(affected, 0);
    }
}

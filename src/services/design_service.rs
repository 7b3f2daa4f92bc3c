use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::database::ProductStore;
use crate::document::{
    parse_document, ColumnContext, DesignDocument, DocumentColumn, DocumentError, LineItem,
    RawColumn,
};

/// Outcome of a successful mutation: the document as written plus whatever
/// the operation reported.
#[derive(Debug, Clone)]
pub struct Mutation<R> {
    pub document: DesignDocument,
    pub output: R,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedDesign {
    pub product_id: i64,
    pub design_name: String,
    pub layer_design: DesignDocument,
}

/// Read-modify-write cycles on the `layer_design` column.
///
/// Each write is conditional on the version read; a lost race re-reads and
/// reapplies the operation up to `max_attempts` times.
#[derive(Clone)]
pub struct DesignService {
    store: Arc<dyn ProductStore>,
    max_attempts: u32,
}

impl DesignService {
    pub fn new(store: Arc<dyn ProductStore>, max_attempts: u32) -> Self {
        Self {
            store,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Current design document of a product
    pub async fn load(&self, product_id: i64) -> Result<DesignDocument, DocumentError> {
        let (document, _) = self.read(product_id).await?;
        Ok(document)
    }

    /// Create a design on the product identified by SKU
    pub async fn create_design(
        &self,
        sku: &str,
        design_name: &str,
        initial_items: Option<Vec<LineItem>>,
    ) -> Result<CreatedDesign, DocumentError> {
        let product = self
            .store
            .find_by_sku(sku)
            .await?
            .ok_or_else(|| DocumentError::ProductNotFound(sku.to_string()))?;

        let mutation = self
            .mutate(product.id, |doc| doc.create_design(design_name, initial_items.clone()))
            .await?;

        Ok(CreatedDesign {
            product_id: product.id,
            design_name: mutation.output,
            layer_design: mutation.document,
        })
    }

    pub async fn rename_design(
        &self,
        product_id: i64,
        old_name: &str,
        new_name: &str,
    ) -> Result<DesignDocument, DocumentError> {
        let mutation = self
            .mutate(product_id, |doc| doc.rename_design(old_name, new_name))
            .await?;
        Ok(mutation.document)
    }

    pub async fn delete_design(
        &self,
        product_id: i64,
        design_name: &str,
    ) -> Result<DesignDocument, DocumentError> {
        let mutation = self
            .mutate(product_id, |doc| doc.delete_design(design_name).map(|_| ()))
            .await?;
        Ok(mutation.document)
    }

    /// Append or replace a line item; the output is the design's items
    pub async fn upsert_line_item(
        &self,
        product_id: i64,
        design_name: Option<&str>,
        item: LineItem,
        edit_index: Option<i64>,
    ) -> Result<Mutation<Vec<LineItem>>, DocumentError> {
        self.mutate(product_id, |doc| {
            doc.upsert_line_item(design_name, item.clone(), edit_index)
                .map(<[LineItem]>::to_vec)
        })
        .await
    }

    /// Remove a line item; the output is the number of items left
    pub async fn delete_line_item(
        &self,
        product_id: i64,
        design_name: Option<&str>,
        index: i64,
    ) -> Result<Mutation<usize>, DocumentError> {
        self.mutate(product_id, |doc| doc.delete_line_item(design_name, index))
            .await
    }

    /// Remove every design from one product; the output is how many went
    pub async fn clear_designs(&self, product_id: i64) -> Result<usize, DocumentError> {
        let mutation = self.mutate(product_id, |doc| Ok(doc.clear())).await?;
        Ok(mutation.output)
    }

    /// Clear the designs of every product with this SKU, optionally within
    /// one store. Products deleted along the way are skipped.
    pub async fn clear_by_sku(
        &self,
        sku: &str,
        store_hash: Option<&str>,
    ) -> Result<usize, DocumentError> {
        let mut removed = 0;
        for product_id in self.store.find_ids_by_sku(sku, store_hash).await? {
            match self.clear_designs(product_id).await {
                Ok(count) => removed += count,
                Err(DocumentError::ProductNotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(removed)
    }

    async fn read(&self, product_id: i64) -> Result<(DesignDocument, i64), DocumentError> {
        let snapshot = self
            .store
            .read_column(product_id, DocumentColumn::LayerDesign)
            .await?
            .ok_or_else(|| DocumentError::ProductNotFound(product_id.to_string()))?;

        let document = parse_document(
            snapshot.raw.as_ref().map(RawColumn::from),
            DesignDocument::new(),
            ColumnContext::new(product_id, DocumentColumn::LayerDesign),
        );
        Ok((document, snapshot.version))
    }

    async fn mutate<R, F>(&self, product_id: i64, mut op: F) -> Result<Mutation<R>, DocumentError>
    where
        F: FnMut(&mut DesignDocument) -> Result<R, DocumentError> + Send,
        R: Send,
    {
        for attempt in 1..=self.max_attempts {
            let (mut document, version) = self.read(product_id).await?;
            let output = op(&mut document)?;
            let serialized = serde_json::to_string(&document)?;

            let affected = self
                .store
                .write_column(product_id, DocumentColumn::LayerDesign, &serialized, version)
                .await?;

            if affected > 0 {
                debug!(product_id, version = version + 1, "Wrote layer design");
                return Ok(Mutation { document, output });
            }

            if self
                .store
                .read_column(product_id, DocumentColumn::LayerDesign)
                .await?
                .is_none()
            {
                return Err(DocumentError::ProductNotFound(product_id.to_string()));
            }

            warn!(product_id, attempt, version, "Layer design changed during write, retrying");
        }

        Err(DocumentError::WriteConflict {
            product_id,
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewProduct;
    use crate::database::MemoryProductStore;

    async fn setup(max_attempts: u32) -> (Arc<MemoryProductStore>, DesignService, i64) {
        let store = Arc::new(MemoryProductStore::new());
        let product = store
            .insert_product(&NewProduct {
                product_sku: "TSHIRT-01".to_string(),
                store_hash: Some("store1".to_string()),
                visible: true,
                ..Default::default()
            })
            .await
            .unwrap();
        let service = DesignService::new(store.clone(), max_attempts);
        (store, service, product.id)
    }

    fn item(title: &str) -> LineItem {
        LineItem::new(title, "", 10.0, vec![])
    }

    #[tokio::test]
    async fn create_design_by_sku() {
        let (_, service, id) = setup(3).await;

        let created = service.create_design("TSHIRT-01", "  Summer ", None).await.unwrap();
        assert_eq!(created.product_id, id);
        assert_eq!(created.design_name, "Summer");
        assert_eq!(created.layer_design.get("Summer"), Some(&[][..]));

        let err = service.create_design("TSHIRT-01", "Summer", None).await.unwrap_err();
        assert!(matches!(err, DocumentError::DuplicateDesign(_)));
    }

    #[tokio::test]
    async fn unknown_sku_is_product_not_found() {
        let (_, service, _) = setup(3).await;
        let err = service.create_design("NOPE", "Summer", None).await.unwrap_err();
        assert!(matches!(err, DocumentError::ProductNotFound(_)));
    }

    #[tokio::test]
    async fn failed_operation_writes_nothing() {
        let (store, service, id) = setup(3).await;
        let before = store.write_count();

        let err = service.delete_design(id, "missing").await.unwrap_err();
        assert!(matches!(err, DocumentError::DesignNotFound(_)));
        assert_eq!(store.write_count(), before);
    }

    #[tokio::test]
    async fn line_item_cycle_on_default_design() {
        let (_, service, id) = setup(3).await;

        let added = service.upsert_line_item(id, None, item("T"), None).await.unwrap();
        assert_eq!(added.output.len(), 1);

        let edited = service
            .upsert_line_item(id, Some("default"), item("T2"), Some(0))
            .await
            .unwrap();
        assert_eq!(edited.output[0].title, "T2");

        let deleted = service.delete_line_item(id, None, 0).await.unwrap();
        assert_eq!(deleted.output, 0);
        assert_eq!(deleted.document.get("default"), Some(&[][..]));
    }

    #[tokio::test]
    async fn stale_write_is_retried_without_losing_either_change() {
        let (store, service, id) = setup(3).await;
        service.create_design("TSHIRT-01", "A", None).await.unwrap();

        // Another writer adds "B" between our read and our write
        store
            .interfere(id, DocumentColumn::LayerDesign, r#"{"A":[],"B":[]}"#)
            .await;

        let doc = service.rename_design(id, "A", "C").await.unwrap();
        let names: Vec<&str> = doc.names().collect();
        assert_eq!(names, vec!["B", "C"]);

        let stored = service.load(id).await.unwrap();
        assert!(stored.contains("B"));
        assert!(stored.contains("C"));
        assert!(!stored.contains("A"));
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let (store, service, id) = setup(2).await;
        for _ in 0..2 {
            store.interfere(id, DocumentColumn::LayerDesign, "{}").await;
        }

        let err = service.upsert_line_item(id, None, item("T"), None).await.unwrap_err();
        assert!(matches!(
            err,
            DocumentError::WriteConflict { attempts: 2, .. }
        ));
    }

    #[tokio::test]
    async fn missing_product_is_reported() {
        let (store, service, id) = setup(3).await;
        store.remove(id).await;

        let err = service.upsert_line_item(id, None, item("T"), None).await.unwrap_err();
        assert!(matches!(err, DocumentError::ProductNotFound(_)));
    }

    #[tokio::test]
    async fn corrupt_column_is_treated_as_empty() {
        let (store, service, id) = setup(3).await;
        store
            .set_raw_column(id, DocumentColumn::LayerDesign, Some("[1,2,3]"))
            .await;

        let mutation = service
            .upsert_line_item(id, Some("Front"), item("T"), None)
            .await
            .unwrap();
        assert_eq!(mutation.document.len(), 1);
        let raw = store.raw_column(id, DocumentColumn::LayerDesign).await.unwrap();
        let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            stored,
            serde_json::json!({"Front": [{"title": "T", "shortDescription": "", "price": 10.0, "files": []}]})
        );
    }

    #[tokio::test]
    async fn clear_by_sku_stays_inside_the_store() {
        let (store, service, id) = setup(3).await;
        service.create_design("TSHIRT-01", "A", None).await.unwrap();
        service.create_design("TSHIRT-01", "B", None).await.unwrap();
        let other = store
            .insert_product(&NewProduct {
                product_sku: "TSHIRT-01".to_string(),
                store_hash: Some("store2".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        service.upsert_line_item(other.id, None, item("T"), None).await.unwrap();

        assert_eq!(service.clear_by_sku("TSHIRT-01", Some("store1")).await.unwrap(), 2);
        assert!(service.load(id).await.unwrap().is_empty());
        assert_eq!(service.load(other.id).await.unwrap().len(), 1);

        assert_eq!(service.clear_by_sku("TSHIRT-01", None).await.unwrap(), 1);
        assert!(service.load(other.id).await.unwrap().is_empty());
        assert_eq!(service.clear_by_sku("NOPE", None).await.unwrap(), 0);
    }
}

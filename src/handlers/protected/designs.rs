// handlers/protected/designs.rs - named designs inside a product's layerDesign
//
// GET    /api/layerdesigns            product list
// GET    /api/layerdesigns/sqs        distinct SKUs
// GET    /api/layerdesigns/by-sq/:sq  product by SKU, with designs
// POST   /api/layerdesigns            { sq, designName, customizableData? }
// GET    /api/layerdesigns/:id        product by id, with designs
// PUT    /api/layerdesigns/:id        { designName, newDesignName }
// DELETE /api/layerdesigns/:id        { designName }
// PUT    /api/layerdesigns/bulk-update-sq  { oldSq, newSq }
// DELETE /api/layerdesigns/by-sq/:sq   clear every design of the SKU
//
// The two bulk routes need a superadmin (own store) or mastersuperadmin (all stores).

use std::collections::BTreeSet;

use axum::extract::{
    rejection::{JsonRejection, PathRejection},
    Path, State,
};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::format::{ProductDetail, ProductSummary};
use crate::document::{DesignDocument, LineItem};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDesignBody {
    #[serde(default)]
    pub sq: String,
    #[serde(default)]
    pub design_name: String,
    pub customizable_data: Option<Vec<LineItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameDesignBody {
    #[serde(default)]
    pub design_name: String,
    #[serde(default)]
    pub new_design_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDesignBody {
    #[serde(default)]
    pub design_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSkuBody {
    #[serde(default)]
    pub old_sq: String,
    #[serde(default)]
    pub new_sq: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuUpdated {
    pub message: &'static str,
    pub modified_count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuDesignsCleared {
    pub message: &'static str,
    pub deleted_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignCreated {
    pub message: &'static str,
    pub design_name: String,
    pub product_id: i64,
    pub layer_design: DesignDocument,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignRenamed {
    pub message: &'static str,
    pub old_design_name: String,
    pub new_design_name: String,
    pub layer_design: DesignDocument,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignDeleted {
    pub message: &'static str,
    pub deleted_design_name: String,
    pub layer_design: DesignDocument,
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<ProductSummary>> {
    let rows = state.products.list().await?;
    Ok(ApiResponse::success(rows.iter().map(ProductSummary::from).collect()))
}

pub async fn skus(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let rows = state.products.list().await?;
    let skus: BTreeSet<String> = rows.into_iter().map(|row| row.product_sku).collect();
    Ok(ApiResponse::success(skus.into_iter().collect()))
}

pub async fn get_by_sq(
    State(state): State<AppState>,
    sq: Result<Path<String>, PathRejection>,
) -> ApiResult<ProductDetail> {
    let Path(sq) = sq?;
    let row = state.products.get_by_sku(&sq).await?;
    Ok(ApiResponse::success(ProductDetail::from(&row)))
}

pub async fn get(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<ProductDetail> {
    let Path(id) = id?;
    let row = state.products.get(id).await?;
    Ok(ApiResponse::success(ProductDetail::from(&row)))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateDesignBody>, JsonRejection>,
) -> ApiResult<DesignCreated> {
    let Json(body) = payload?;
    if body.sq.trim().is_empty() {
        return Err(ApiError::bad_request("sq is required"));
    }

    let created = state
        .designs
        .create_design(body.sq.trim(), &body.design_name, body.customizable_data)
        .await?;
    info!(
        product_id = created.product_id,
        design = %created.design_name,
        "Design created"
    );

    Ok(ApiResponse::created(DesignCreated {
        message: "Design created successfully",
        design_name: created.design_name,
        product_id: created.product_id,
        layer_design: created.layer_design,
    }))
}

pub async fn rename(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RenameDesignBody>, JsonRejection>,
) -> ApiResult<DesignRenamed> {
    let Path(id) = id?;
    let Json(body) = payload?;

    let layer_design = state
        .designs
        .rename_design(id, &body.design_name, &body.new_design_name)
        .await?;
    info!(product_id = id, from = %body.design_name, to = %body.new_design_name.trim(), "Design renamed");

    Ok(ApiResponse::success(DesignRenamed {
        message: "Design updated successfully",
        old_design_name: body.design_name,
        new_design_name: body.new_design_name.trim().to_string(),
        layer_design,
    }))
}

pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<DeleteDesignBody>, JsonRejection>,
) -> ApiResult<DesignDeleted> {
    let Path(id) = id?;
    let Json(body) = payload?;
    if body.design_name.is_empty() {
        return Err(ApiError::bad_request("Design name is required for deletion"));
    }

    let layer_design = state.designs.delete_design(id, &body.design_name).await?;
    info!(product_id = id, design = %body.design_name, "Design deleted");

    Ok(ApiResponse::success(DesignDeleted {
        message: "Design deleted successfully",
        deleted_design_name: body.design_name,
        layer_design,
    }))
}

pub async fn bulk_update_sq(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<BulkSkuBody>, JsonRejection>,
) -> ApiResult<SkuUpdated> {
    let scope = user.bulk_scope()?;
    let Json(body) = payload?;

    let modified_count = state
        .products
        .rename_sku(&body.old_sq, &body.new_sq, scope)
        .await?;

    Ok(ApiResponse::success(SkuUpdated {
        message: "SQ updated",
        modified_count,
    }))
}

pub async fn delete_by_sq(
    State(state): State<AppState>,
    user: AuthUser,
    sq: Result<Path<String>, PathRejection>,
) -> ApiResult<SkuDesignsCleared> {
    let scope = user.bulk_scope()?;
    let Path(sq) = sq?;
    if sq.trim().is_empty() {
        return Err(ApiError::bad_request("sq is required"));
    }

    let deleted_count = state.designs.clear_by_sku(sq.trim(), scope).await?;
    info!(sku = %sq.trim(), deleted_count, "Designs cleared by SKU");

    Ok(ApiResponse::success(SkuDesignsCleared {
        message: "LayerDesigns deleted",
        deleted_count,
    }))
}

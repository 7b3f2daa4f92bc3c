// handlers/public/developer.rs - storefront read API
//
// GET /api/developer/product?productId=&storeHash=
// GET /api/developer/product-by-sq?sq=&storeHash=
//
// Only visible products are served; a hidden product answers 404.

use axum::extract::{rejection::QueryRejection, Query, State};
use serde::Deserialize;

use crate::api::format::DeveloperProduct;
use crate::database::models::ProductKey;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub product_id: Option<String>,
    pub store_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuQuery {
    pub sq: Option<String>,
    pub store_hash: Option<String>,
}

fn required(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub async fn product(
    State(state): State<AppState>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> ApiResult<DeveloperProduct> {
    let Query(query) = query?;
    let (Some(product_id), Some(store_hash)) =
        (required(query.product_id), required(query.store_hash))
    else {
        return Err(ApiError::bad_request("productId and storeHash are required"));
    };
    let product_id: i64 = product_id
        .parse()
        .map_err(|_| ApiError::bad_request("productId must be an integer"))?;

    let row = state
        .products
        .find_visible(ProductKey::Id(product_id), &store_hash)
        .await?;
    Ok(ApiResponse::success(DeveloperProduct::from(&row)))
}

pub async fn product_by_sq(
    State(state): State<AppState>,
    query: Result<Query<SkuQuery>, QueryRejection>,
) -> ApiResult<DeveloperProduct> {
    let Query(query) = query?;
    let (Some(sq), Some(store_hash)) = (required(query.sq), required(query.store_hash)) else {
        return Err(ApiError::bad_request("sq and storeHash are required"));
    };

    let row = state
        .products
        .find_visible(ProductKey::Sku(&sq), &store_hash)
        .await?;
    Ok(ApiResponse::success(DeveloperProduct::from(&row)))
}

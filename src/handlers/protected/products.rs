// handlers/protected/products.rs - product records, their settings and media URLs

use axum::extract::{
    rejection::{JsonRejection, PathRejection},
    Path, State,
};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::format::{ProductDetail, ProductSummary};
use crate::database::models::{MediaColumn, NewProduct};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::SettingsPatch;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductBody {
    #[serde(default)]
    pub sq: String,
    pub store_hash: Option<String>,
    pub product_name: Option<String>,
    pub product_image: Option<String>,
    pub product_type: Option<String>,
    #[serde(default)]
    pub visible: bool,
}

/// `tabSettings` may be an object or a string holding one
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsBody {
    pub tab_settings: Option<Value>,
    pub product_type: Option<String>,
    pub visible: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomizerImageBody {
    pub customizer_image: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelFileBody {
    pub model_file: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomizerImageUpdated {
    pub message: &'static str,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelUpdated {
    pub message: &'static str,
    pub model_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductUpdated {
    pub message: &'static str,
    pub product: ProductSummary,
}

/// GET /api/products - newest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<ProductSummary>> {
    let rows = state.products.list().await?;
    Ok(ApiResponse::success(rows.iter().map(ProductSummary::from).collect()))
}

/// GET /api/products/:id
pub async fn get(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<ProductDetail> {
    let Path(id) = id?;
    let row = state.products.get(id).await?;
    Ok(ApiResponse::success(ProductDetail::from(&row)))
}

/// POST /api/products - starts with an empty design document and default tabs.
/// The caller's store is used when the body names none.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateProductBody>, JsonRejection>,
) -> ApiResult<ProductDetail> {
    let Json(body) = payload?;
    let product = NewProduct {
        product_sku: body.sq,
        store_hash: body.store_hash.or(user.store_hash),
        product_name: body.product_name,
        product_image: body.product_image,
        product_type: body.product_type,
        visible: body.visible,
    };

    let row = state.products.create(product).await?;
    Ok(ApiResponse::created(ProductDetail::from(&row)))
}

/// PUT /api/products/:id - tabSettings, productType and visible only
pub async fn update_settings(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateSettingsBody>, JsonRejection>,
) -> ApiResult<ProductUpdated> {
    let Path(id) = id?;
    let Json(body) = payload?;
    let patch = SettingsPatch {
        tab_settings: body.tab_settings,
        product_type: body.product_type,
        visible: body.visible,
    };

    let row = state.products.update_settings(id, patch).await?;
    Ok(ApiResponse::success(ProductUpdated {
        message: "Product updated successfully",
        product: ProductSummary::from(&row),
    }))
}

/// PUT /api/products/:id/customizer-image - a blank URL removes the image
pub async fn update_customizer_image(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CustomizerImageBody>, JsonRejection>,
) -> ApiResult<CustomizerImageUpdated> {
    let Path(id) = id?;
    let Json(body) = payload?;

    let image_url = state
        .products
        .set_media_url(id, MediaColumn::CustomizerImage, body.customizer_image.as_deref())
        .await?;
    let message = match image_url {
        Some(_) => "Customizer image updated successfully",
        None => "Customizer image removed successfully",
    };
    Ok(ApiResponse::success(CustomizerImageUpdated { message, image_url }))
}

/// PUT /api/products/:id/3d-model - a blank URL removes the model
pub async fn update_model_file(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ModelFileBody>, JsonRejection>,
) -> ApiResult<ModelUpdated> {
    let Path(id) = id?;
    let Json(body) = payload?;

    let model_url = state
        .products
        .set_media_url(id, MediaColumn::ModelFile, body.model_file.as_deref())
        .await?;
    let message = match model_url {
        Some(_) => "3D model updated successfully",
        None => "3D model removed successfully",
    };
    Ok(ApiResponse::success(ModelUpdated { message, model_url }))
}

// handlers/protected/line_items.rs - line items of one design
//
// POST   /api/layerdesigns/:id/customize  append, or replace at editIndex
// DELETE /api/layerdesigns/:id/customize  remove at deleteIndex
//
// designName defaults to "default" in both.

use axum::extract::{
    rejection::{JsonRejection, PathRejection},
    Path, State,
};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::types::lenient;
use crate::document::{DesignDocument, LineItem, DEFAULT_DESIGN};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// Line item fields sit at the top level next to `designName`/`editIndex`.
/// Only the four item fields are stored; other body keys are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertItemBody {
    pub design_name: Option<String>,
    pub edit_index: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub short_description: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub files: Vec<String>,
}

impl UpsertItemBody {
    fn line_item(&self) -> LineItem {
        LineItem::new(
            self.title.as_str(),
            self.short_description.as_str(),
            self.price,
            self.files.clone(),
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteItemBody {
    pub design_name: Option<String>,
    pub delete_index: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSaved {
    pub message: &'static str,
    pub product_id: i64,
    pub design_name: String,
    pub items: Vec<LineItem>,
    pub layer_design: DesignDocument,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDeleted {
    pub message: &'static str,
    pub remaining_items: usize,
    pub layer_design: DesignDocument,
}

fn design_label(design_name: Option<&str>) -> String {
    design_name
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_DESIGN)
        .to_string()
}

pub async fn upsert(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpsertItemBody>, JsonRejection>,
) -> ApiResult<ItemSaved> {
    let Path(id) = id?;
    let Json(body) = payload?;
    let design_name = body.design_name.as_deref();

    let mutation = state
        .designs
        .upsert_line_item(id, design_name, body.line_item(), body.edit_index)
        .await?;
    let design = design_label(design_name);
    info!(product_id = id, design = %design, edit_index = ?body.edit_index, "Line item saved");

    let message = if body.edit_index.is_some() {
        "Customizable data updated successfully"
    } else {
        "Customizable data added successfully"
    };
    Ok(ApiResponse::success(ItemSaved {
        message,
        product_id: id,
        design_name: design,
        items: mutation.output,
        layer_design: mutation.document,
    }))
}

pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<DeleteItemBody>, JsonRejection>,
) -> ApiResult<ItemDeleted> {
    let Path(id) = id?;
    let Json(body) = payload?;
    let index = body
        .delete_index
        .ok_or_else(|| ApiError::bad_request("deleteIndex is required"))?;

    let mutation = state
        .designs
        .delete_line_item(id, body.design_name.as_deref(), index)
        .await?;
    info!(
        product_id = id,
        design = %design_label(body.design_name.as_deref()),
        index,
        "Line item deleted"
    );

    Ok(ApiResponse::success(ItemDeleted {
        message: "Customizable data deleted successfully",
        remaining_items: mutation.output,
        layer_design: mutation.document,
    }))
}

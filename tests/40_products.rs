mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{TestApp, STORE_HASH};
use serde_json::{json, Value};

#[tokio::test]
async fn create_product_defaults() -> Result<()> {
    let app = TestApp::spawn().await;

    let res = app
        .post("/api/products", json!({"sq": " MUG-1 ", "productName": "Mug"}))
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    let product = res.data();
    assert_eq!(product["sq"], "MUG-1");
    assert_eq!(product["productType"], "2d");
    assert_eq!(product["storeHash"], STORE_HASH);
    assert_eq!(product["visible"], false);
    assert_eq!(product["layerDesign"], json!({}));
    assert_eq!(product["tabSettings"]["aiEditor"], true);
    assert_eq!(product["tabSettings"]["clipart"], true);
    Ok(())
}

#[tokio::test]
async fn create_product_validation() -> Result<()> {
    let app = TestApp::spawn().await;

    let res = app.post("/api/products", json!({"productName": "Mug"})).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), "sq is required");

    let res = app
        .post("/api/products", json!({"sq": "MUG-1", "productType": "4d"}))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn list_is_newest_first() -> Result<()> {
    let app = TestApp::spawn().await;
    let first = app.product("A-1", true).await;
    let second = app.product("B-2", true).await;

    let res = app.get("/api/products").await?;
    assert_eq!(res.status, StatusCode::OK);
    let ids: Vec<i64> = res
        .data()
        .as_array()
        .map(|rows| rows.iter().filter_map(|r| r["id"].as_i64()).collect())
        .unwrap_or_default();
    assert_eq!(ids, vec![second.id, first.id]);
    Ok(())
}

#[tokio::test]
async fn update_settings() -> Result<()> {
    let app = TestApp::spawn().await;
    let product = app.product("MUG-1", false).await;
    let uri = format!("/api/products/{}", product.id);

    let res = app
        .put(
            &uri,
            json!({"tabSettings": {"aiEditor": false, "imageEdit": true}, "productType": "3d", "visible": true}),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["message"], "Product updated successfully");
    let updated = &res.data()["product"];
    assert_eq!(updated["productType"], "3d");
    assert_eq!(updated["visible"], true);
    assert_eq!(updated["tabSettings"], json!({"aiEditor": false, "imageEdit": true}));

    // Partial update leaves the other columns alone
    let res = app.put(&uri, json!({"visible": false})).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["product"]["productType"], "3d");
    assert_eq!(res.data()["product"]["visible"], false);
    Ok(())
}

#[tokio::test]
async fn update_settings_errors() -> Result<()> {
    let app = TestApp::spawn().await;
    let product = app.product("MUG-1", false).await;
    let uri = format!("/api/products/{}", product.id);

    let res = app.put(&uri, json!({})).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), "No valid fields to update");

    let res = app.put(&uri, json!({"tabSettings": [1, 2]})).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.put("/api/products/9999", json!({"visible": true})).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn get_product_includes_design_document() -> Result<()> {
    let app = TestApp::spawn().await;
    let product = app.product("MUG-1", true).await;
    app.post("/api/layerdesigns", json!({"sq": "MUG-1", "designName": "Wrap"}))
        .await?;

    let res = app.get(&format!("/api/products/{}", product.id)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["layerDesign"], json!({"Wrap": []}));
    assert!(res.data()["version"].as_i64().unwrap_or_default() > product.version);

    let res = app.get("/api/products/9999").await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error(), "Product not found");
    Ok(())
}

#[tokio::test]
async fn media_urls_are_set_and_removed() -> Result<()> {
    let app = TestApp::spawn().await;
    let product = app.product("CAP-1", true).await;

    let res = app
        .put(
            &format!("/api/products/{}/customizer-image", product.id),
            json!({"customizerImage": "https://cdn.example.com/cap.png"}),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["message"], "Customizer image updated successfully");
    assert_eq!(res.data()["imageUrl"], "https://cdn.example.com/cap.png");

    let res = app
        .put(
            &format!("/api/products/{}/3d-model", product.id),
            json!({"modelFile": "https://cdn.example.com/cap.glb"}),
        )
        .await?;
    assert_eq!(res.data()["message"], "3D model updated successfully");

    let res = app.get(&format!("/api/products/{}", product.id)).await?;
    assert_eq!(res.data()["customizerImage"], "https://cdn.example.com/cap.png");
    assert_eq!(res.data()["modelFile"], "https://cdn.example.com/cap.glb");

    let res = app
        .put(
            &format!("/api/products/{}/customizer-image", product.id),
            json!({"customizerImage": ""}),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["message"], "Customizer image removed successfully");
    assert_eq!(res.data()["imageUrl"], Value::Null);

    let res = app
        .put("/api/products/999/3d-model", json!({"modelFile": "x.glb"}))
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error(), "Product not found");
    Ok(())
}

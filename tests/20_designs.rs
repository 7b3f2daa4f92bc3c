mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use common::{TestApp, STORE_HASH};
use customizer_api::database::models::NewProduct;
use customizer_api::database::ProductStore;
use customizer_api::document::DocumentColumn;
use serde_json::json;

#[tokio::test]
async fn create_design_by_sku() -> Result<()> {
    let app = TestApp::spawn().await;
    let product = app.product("TEE-1", true).await;

    let res = app
        .post(
            "/api/layerdesigns",
            json!({"sq": "TEE-1", "designName": "  Front  "}),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["designName"], "Front");
    assert_eq!(res.data()["productId"], product.id);
    assert_eq!(res.data()["layerDesign"], json!({"Front": []}));

    let res = app.get(&format!("/api/layerdesigns/{}", product.id)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["layerDesign"], json!({"Front": []}));
    Ok(())
}

#[tokio::test]
async fn create_design_with_initial_items() -> Result<()> {
    let app = TestApp::spawn().await;
    app.product("TEE-1", true).await;

    let res = app
        .post(
            "/api/layerdesigns",
            json!({
                "sq": "TEE-1",
                "designName": "Front",
                "customizableData": [{"title": "Logo", "price": "4.50", "files": ["logo.png"]}]
            }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    let items = &res.data()["layerDesign"]["Front"];
    assert_eq!(items[0]["title"], "Logo");
    assert_eq!(items[0]["price"], 4.5);
    assert_eq!(items[0]["shortDescription"], "");
    Ok(())
}

#[tokio::test]
async fn duplicate_design_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await;
    app.product("TEE-1", true).await;
    app.post("/api/layerdesigns", json!({"sq": "TEE-1", "designName": "Front"}))
        .await?;

    let res = app
        .post("/api/layerdesigns", json!({"sq": "TEE-1", "designName": "Front"}))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.error().contains("already exists"));
    Ok(())
}

#[tokio::test]
async fn create_design_requires_sku_and_name() -> Result<()> {
    let app = TestApp::spawn().await;
    app.product("TEE-1", true).await;

    let res = app
        .post("/api/layerdesigns", json!({"designName": "Front"}))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), "sq is required");

    let res = app
        .post("/api/layerdesigns", json!({"sq": "TEE-1", "designName": "   "}))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), "Design name is required");

    let res = app
        .post("/api/layerdesigns", json!({"sq": "NOPE", "designName": "Front"}))
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn rename_keeps_items() -> Result<()> {
    let app = TestApp::spawn().await;
    let product = app.product("TEE-1", true).await;
    app.store
        .set_raw_column(
            product.id,
            DocumentColumn::LayerDesign,
            Some(r#"{"Front":[{"title":"Logo","shortDescription":"","price":1,"files":[]}],"Back":[]}"#),
        )
        .await;

    let res = app
        .put(
            &format!("/api/layerdesigns/{}", product.id),
            json!({"designName": "Front", "newDesignName": " Chest "}),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["oldDesignName"], "Front");
    assert_eq!(res.data()["newDesignName"], "Chest");
    let doc = &res.data()["layerDesign"];
    assert!(doc.get("Front").is_none());
    assert_eq!(doc["Chest"][0]["title"], "Logo");
    assert_eq!(doc["Back"], json!([]));
    Ok(())
}

#[tokio::test]
async fn rename_errors() -> Result<()> {
    let app = TestApp::spawn().await;
    let product = app.product("TEE-1", true).await;
    app.store
        .set_raw_column(product.id, DocumentColumn::LayerDesign, Some(r#"{"A":[],"B":[]}"#))
        .await;
    let uri = format!("/api/layerdesigns/{}", product.id);

    let res = app.put(&uri, json!({"designName": "A", "newDesignName": "B"})).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.put(&uri, json!({"designName": "A", "newDesignName": "A"})).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.put(&uri, json!({"designName": "Z", "newDesignName": "Y"})).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app
        .put("/api/layerdesigns/9999", json!({"designName": "A", "newDesignName": "C"}))
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    // Nothing was written by the failed calls
    assert_eq!(
        app.store.raw_column(product.id, DocumentColumn::LayerDesign).await.as_deref(),
        Some(r#"{"A":[],"B":[]}"#)
    );
    Ok(())
}

#[tokio::test]
async fn delete_design() -> Result<()> {
    let app = TestApp::spawn().await;
    let product = app.product("TEE-1", true).await;
    app.store
        .set_raw_column(product.id, DocumentColumn::LayerDesign, Some(r#"{"A":[],"B":[]}"#))
        .await;
    let uri = format!("/api/layerdesigns/{}", product.id);

    let res = app.delete(&uri, json!({"designName": "A"})).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["deletedDesignName"], "A");
    assert_eq!(res.data()["layerDesign"], json!({"B": []}));

    let res = app.delete(&uri, json!({"designName": "A"})).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.delete(&uri, json!({})).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), "Design name is required for deletion");
    Ok(())
}

#[tokio::test]
async fn corrupt_document_reads_as_empty_and_is_repaired_on_write() -> Result<()> {
    let app = TestApp::spawn().await;
    let product = app.product("TEE-1", true).await;
    app.store
        .set_raw_column(product.id, DocumentColumn::LayerDesign, Some("{not json"))
        .await;

    let res = app.get(&format!("/api/layerdesigns/{}", product.id)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["layerDesign"], json!({}));

    let res = app
        .post("/api/layerdesigns", json!({"sq": "TEE-1", "designName": "Front"}))
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);

    let raw = app
        .store
        .raw_column(product.id, DocumentColumn::LayerDesign)
        .await
        .unwrap_or_default();
    let stored: serde_json::Value = serde_json::from_str(&raw)?;
    assert_eq!(stored, json!({"Front": []}));
    Ok(())
}

#[tokio::test]
async fn designs_of_other_shapes_survive_a_mutation() -> Result<()> {
    let app = TestApp::spawn().await;
    let product = app.product("TEE-1", true).await;
    let uri = format!("/api/layerdesigns/{}/customize", product.id);

    app.store
        .set_raw_column(
            product.id,
            DocumentColumn::LayerDesign,
            Some(r#"{"Keep":[{"title":"precious"}],"Legacy":{"canvas":1}}"#),
        )
        .await;
    let res = app.post(&uri, json!({"designName": "New", "title": "T"})).await?;
    assert_eq!(res.status, StatusCode::OK);
    let raw = app
        .store
        .raw_column(product.id, DocumentColumn::LayerDesign)
        .await
        .unwrap_or_default();
    let stored: serde_json::Value = serde_json::from_str(&raw)?;
    assert_eq!(stored["Keep"][0]["title"], "precious");
    assert_eq!(stored["Legacy"], json!({"canvas": 1}));
    assert_eq!(stored["New"][0]["title"], "T");

    app.store
        .set_raw_column(
            product.id,
            DocumentColumn::LayerDesign,
            Some(r#"{"Keep":[{"title":"a"},{"title":"b"}],"Other":["x"]}"#),
        )
        .await;
    let res = app.post(&uri, json!({"designName": "Keep", "title": "c"})).await?;
    assert_eq!(res.status, StatusCode::OK);
    let titles: Vec<&str> = res.data()["layerDesign"]["Keep"]
        .as_array()
        .map(|items| items.iter().filter_map(|i| i["title"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(titles, ["a", "b", "c"]);
    assert_eq!(res.data()["layerDesign"]["Other"], json!(["x"]));
    Ok(())
}

#[tokio::test]
async fn lookup_by_sku_and_sku_listing() -> Result<()> {
    let app = TestApp::spawn().await;
    app.product("MUG-2", true).await;
    app.product("CAP-1", false).await;

    let res = app.get("/api/layerdesigns/sqs").await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data(), &json!(["CAP-1", "MUG-2"]));

    let res = app.get("/api/layerdesigns/by-sq/MUG-2").await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["sq"], "MUG-2");

    let res = app.get("/api/layerdesigns/by-sq/NOPE").await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn non_numeric_product_id_is_bad_request() -> Result<()> {
    let app = TestApp::spawn().await;

    let res = app.get("/api/layerdesigns/abc").await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["success"], false);
    Ok(())
}

async fn product_in_other_store(app: &TestApp, sku: &str) -> Result<i64> {
    let row = app
        .store
        .insert_product(&NewProduct {
            product_sku: sku.to_string(),
            store_hash: Some("store2".to_string()),
            visible: true,
            ..Default::default()
        })
        .await?;
    Ok(row.id)
}

#[tokio::test]
async fn bulk_sku_rename_is_limited_to_the_callers_store() -> Result<()> {
    let app = TestApp::spawn().await;
    let mine = app.product("TEE-1", true).await;
    let theirs = product_in_other_store(&app, "TEE-1").await?;

    let res = app
        .put(
            "/api/layerdesigns/bulk-update-sq",
            json!({"oldSq": "TEE-1", "newSq": "TEE-2"}),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["message"], "SQ updated");
    assert_eq!(res.data()["modifiedCount"], 1);
    assert_eq!(app.get(&format!("/api/products/{}", mine.id)).await?.data()["sq"], "TEE-2");
    assert_eq!(app.get(&format!("/api/products/{}", theirs)).await?.data()["sq"], "TEE-1");

    let master = app.token_for("mastersuperadmin", None);
    let res = app
        .send(
            Method::PUT,
            "/api/layerdesigns/bulk-update-sq",
            Some(json!({"oldSq": "TEE-1", "newSq": "TEE-3"})),
            Some(&master),
        )
        .await?;
    assert_eq!(res.data()["modifiedCount"], 1);
    assert_eq!(app.get(&format!("/api/products/{}", theirs)).await?.data()["sq"], "TEE-3");

    let res = app
        .put("/api/layerdesigns/bulk-update-sq", json!({"oldSq": "TEE-2"}))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), "newSq is required");
    Ok(())
}

#[tokio::test]
async fn bulk_sku_routes_need_an_admin_role() -> Result<()> {
    let app = TestApp::spawn().await;
    let product = app.product("TEE-1", true).await;
    let staff = app.token_for("admin", Some(STORE_HASH));

    let res = app
        .send(
            Method::PUT,
            "/api/layerdesigns/bulk-update-sq",
            Some(json!({"oldSq": "TEE-1", "newSq": "TEE-2"})),
            Some(&staff),
        )
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(
        res.error(),
        "Only superadmin or mastersuperadmin can perform this action"
    );

    let res = app
        .send(Method::DELETE, "/api/layerdesigns/by-sq/TEE-1", None, Some(&staff))
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let storeless = app.token_for("superadmin", None);
    let res = app
        .send(Method::DELETE, "/api/layerdesigns/by-sq/TEE-1", None, Some(&storeless))
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.get(&format!("/api/products/{}", product.id)).await?;
    assert_eq!(res.data()["sq"], "TEE-1");
    Ok(())
}

#[tokio::test]
async fn designs_are_cleared_by_sku() -> Result<()> {
    let app = TestApp::spawn().await;
    let mine = app.product("TEE-1", true).await;
    let theirs = product_in_other_store(&app, "TEE-1").await?;
    for (id, raw) in [
        (mine.id, r#"{"Front":[{"title":"a"}],"Back":[],"Legacy":{"canvas":1}}"#),
        (theirs, r#"{"Front":[]}"#),
    ] {
        app.store
            .set_raw_column(id, DocumentColumn::LayerDesign, Some(raw))
            .await;
    }

    let res = app
        .send(Method::DELETE, "/api/layerdesigns/by-sq/TEE-1", None, Some(&app.token))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["message"], "LayerDesigns deleted");
    assert_eq!(res.data()["deletedCount"], 3);

    let res = app.get(&format!("/api/layerdesigns/{}", mine.id)).await?;
    assert_eq!(res.data()["layerDesign"], json!({}));
    let res = app.get(&format!("/api/layerdesigns/{}", theirs)).await?;
    assert_eq!(res.data()["layerDesign"], json!({"Front": []}));
    Ok(())
}

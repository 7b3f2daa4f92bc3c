use clap::Subcommand;
use serde_json::{json, Map, Value};

use crate::cli::utils::{output_empty_collection, output_success};
use crate::cli::{Connection, OutputFormat};

#[derive(Subcommand)]
pub enum ProductCommands {
    #[command(about = "List products, newest first")]
    List,

    #[command(about = "Show one product with its design document")]
    Get {
        #[arg(help = "Product id")]
        id: i64,
    },

    #[command(about = "Register a product")]
    Create {
        #[arg(help = "Product SKU")]
        sq: String,
        #[arg(long, help = "Display name")]
        name: Option<String>,
        #[arg(long, help = "Image URL")]
        image: Option<String>,
        #[arg(long = "type", help = "Product type: 2d or 3d")]
        product_type: Option<String>,
        #[arg(long, help = "Storefront hash (defaults to the logged-in store)")]
        store_hash: Option<String>,
        #[arg(long, help = "Show the product on the storefront")]
        visible: bool,
    },

    #[command(about = "Update tab settings, type or visibility")]
    Update {
        #[arg(help = "Product id")]
        id: i64,
        #[arg(long, help = "Tab settings as a JSON object")]
        tab_settings: Option<String>,
        #[arg(long = "type", help = "Product type: 2d or 3d")]
        product_type: Option<String>,
        #[arg(long, help = "Storefront visibility")]
        visible: Option<bool>,
    },

    #[command(about = "List SKUs that have products")]
    Skus,
}

pub async fn handle(
    cmd: ProductCommands,
    connection: &Connection,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let client = connection.authed_client()?;

    match cmd {
        ProductCommands::List => {
            let products = client.get("/api/products").await?;
            let rows = products.as_array().map(Vec::as_slice).unwrap_or_default();
            if rows.is_empty() {
                return output_empty_collection(&output_format, "products", "No products found");
            }
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&products)?),
                OutputFormat::Text => {
                    for row in rows {
                        println!("{}", product_line(row));
                    }
                }
            }
            Ok(())
        }
        ProductCommands::Get { id } => {
            let product = client.get(&format!("/api/products/{}", id)).await?;
            output_success(&output_format, &product_line(&product), Some(product.clone()))
        }
        ProductCommands::Create {
            sq,
            name,
            image,
            product_type,
            store_hash,
            visible,
        } => {
            let body = json!({
                "sq": sq,
                "productName": name,
                "productImage": image,
                "productType": product_type,
                "storeHash": store_hash,
                "visible": visible,
            });
            let product = client.post("/api/products", &body).await?;
            output_success(
                &output_format,
                &format!("Created {}", product_line(&product)),
                Some(product.clone()),
            )
        }
        ProductCommands::Update {
            id,
            tab_settings,
            product_type,
            visible,
        } => {
            let body = settings_body(tab_settings.as_deref(), product_type, visible)?;
            let data = client.put(&format!("/api/products/{}", id), &body).await?;
            output_success(&output_format, &format!("Product {} updated", id), Some(data))
        }
        ProductCommands::Skus => {
            let skus = client.get("/api/layerdesigns/sqs").await?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&skus)?),
                OutputFormat::Text => {
                    for sku in skus.as_array().map(Vec::as_slice).unwrap_or_default() {
                        println!("{}", sku.as_str().unwrap_or_default());
                    }
                }
            }
            Ok(())
        }
    }
}

fn settings_body(
    tab_settings: Option<&str>,
    product_type: Option<String>,
    visible: Option<bool>,
) -> anyhow::Result<Value> {
    let mut body = Map::new();
    if let Some(raw) = tab_settings {
        let parsed: Value = serde_json::from_str(raw)
            .map_err(|e| anyhow::anyhow!("--tab-settings is not valid JSON: {}", e))?;
        body.insert("tabSettings".to_string(), parsed);
    }
    if let Some(product_type) = product_type {
        body.insert("productType".to_string(), Value::String(product_type));
    }
    if let Some(visible) = visible {
        body.insert("visible".to_string(), Value::Bool(visible));
    }
    if body.is_empty() {
        anyhow::bail!("Nothing to update: pass --tab-settings, --type or --visible");
    }
    Ok(Value::Object(body))
}

fn product_line(product: &Value) -> String {
    let id = product.get("id").and_then(Value::as_i64).unwrap_or_default();
    let sq = product.get("sq").and_then(Value::as_str).unwrap_or("");
    let name = product.get("productName").and_then(Value::as_str).unwrap_or("-");
    let product_type = product.get("productType").and_then(Value::as_str).unwrap_or("");
    let visible = product.get("visible").and_then(Value::as_bool).unwrap_or(false);
    format!(
        "#{} {} {} [{}]{}",
        id,
        sq,
        name,
        product_type,
        if visible { "" } else { " hidden" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_body_only_includes_given_fields() {
        let body = settings_body(Some(r#"{"colors":true}"#), None, Some(false)).unwrap();
        assert_eq!(body, json!({"tabSettings": {"colors": true}, "visible": false}));
    }

    #[test]
    fn settings_body_rejects_empty_update() {
        assert!(settings_body(None, None, None).is_err());
        assert!(settings_body(Some("{oops"), None, None).is_err());
    }

    #[test]
    fn product_line_marks_hidden_products() {
        let product = json!({"id": 4, "sq": "MUG-1", "productName": "Mug", "productType": "2d", "visible": false});
        assert_eq!(product_line(&product), "#4 MUG-1 Mug [2d] hidden");
    }
}

use clap::{Args, Subcommand};
use serde_json::{json, Map, Value};

use crate::cli::utils::{output_items, output_success};
use crate::cli::{Connection, OutputFormat};

#[derive(Args)]
pub struct ItemFields {
    #[arg(long, help = "Item title")]
    pub title: String,
    #[arg(long, default_value = "", help = "Short description")]
    pub description: String,
    #[arg(long, default_value_t = 0.0, help = "Price")]
    pub price: f64,
    #[arg(long = "file", help = "Attached file URL (repeatable)")]
    pub files: Vec<String>,
}

#[derive(Subcommand)]
pub enum ItemCommands {
    #[command(about = "Show the line items of a design")]
    List {
        #[arg(help = "Product id")]
        product_id: i64,
        #[arg(long, help = "Design name (defaults to \"default\")")]
        design: Option<String>,
    },

    #[command(about = "Append a line item, creating the design if needed")]
    Add {
        #[arg(help = "Product id")]
        product_id: i64,
        #[arg(long, help = "Design name (defaults to \"default\")")]
        design: Option<String>,
        #[command(flatten)]
        fields: ItemFields,
    },

    #[command(about = "Replace the line item at an index")]
    Edit {
        #[arg(help = "Product id")]
        product_id: i64,
        #[arg(help = "Zero-based item index")]
        index: i64,
        #[arg(long, help = "Design name (defaults to \"default\")")]
        design: Option<String>,
        #[command(flatten)]
        fields: ItemFields,
    },

    #[command(about = "Remove the line item at an index")]
    Delete {
        #[arg(help = "Product id")]
        product_id: i64,
        #[arg(help = "Zero-based item index")]
        index: i64,
        #[arg(long, help = "Design name (defaults to \"default\")")]
        design: Option<String>,
    },
}

pub async fn handle(
    cmd: ItemCommands,
    connection: &Connection,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let client = connection.authed_client()?;

    match cmd {
        ItemCommands::List { product_id, design } => {
            let product = client.get(&format!("/api/layerdesigns/{}", product_id)).await?;
            let design = design.unwrap_or_else(|| "default".to_string());
            match product["layerDesign"].get(&design) {
                Some(items) => output_items(&output_format, items),
                None => anyhow::bail!("Design '{}' not found on product {}", design, product_id),
            }
        }
        ItemCommands::Add {
            product_id,
            design,
            fields,
        } => {
            let body = upsert_body(design, None, fields);
            let data = client
                .post(&format!("/api/layerdesigns/{}/customize", product_id), &body)
                .await?;
            let label = data["designName"].as_str().unwrap_or("default").to_string();
            output_success(&output_format, &format!("Item added to '{}'", label), Some(data))
        }
        ItemCommands::Edit {
            product_id,
            index,
            design,
            fields,
        } => {
            let body = upsert_body(design, Some(index), fields);
            let data = client
                .post(&format!("/api/layerdesigns/{}/customize", product_id), &body)
                .await?;
            output_success(&output_format, &format!("Item {} updated", index), Some(data))
        }
        ItemCommands::Delete {
            product_id,
            index,
            design,
        } => {
            let body = json!({ "designName": design, "deleteIndex": index });
            let data = client
                .delete(&format!("/api/layerdesigns/{}/customize", product_id), &body)
                .await?;
            let remaining = data["remainingItems"].as_u64().unwrap_or_default();
            output_success(
                &output_format,
                &format!("Item {} deleted, {} remaining", index, remaining),
                Some(data),
            )
        }
    }
}

fn upsert_body(design: Option<String>, edit_index: Option<i64>, fields: ItemFields) -> Value {
    let mut body = Map::new();
    if let Some(design) = design {
        body.insert("designName".to_string(), Value::String(design));
    }
    if let Some(index) = edit_index {
        body.insert("editIndex".to_string(), json!(index));
    }
    body.insert("title".to_string(), Value::String(fields.title));
    body.insert("shortDescription".to_string(), Value::String(fields.description));
    body.insert("price".to_string(), json!(fields.price));
    body.insert("files".to_string(), json!(fields.files));
    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> ItemFields {
        ItemFields {
            title: "Logo".to_string(),
            description: "Front print".to_string(),
            price: 4.5,
            files: vec!["logo.png".to_string()],
        }
    }

    #[test]
    fn add_body_omits_index_and_default_design() {
        let body = upsert_body(None, None, fields());
        assert!(body.get("editIndex").is_none());
        assert!(body.get("designName").is_none());
        assert_eq!(body["shortDescription"], "Front print");
        assert_eq!(body["files"], json!(["logo.png"]));
    }

    #[test]
    fn edit_body_carries_index() {
        let body = upsert_body(Some("Back".to_string()), Some(2), fields());
        assert_eq!(body["editIndex"], 2);
        assert_eq!(body["designName"], "Back");
    }
}

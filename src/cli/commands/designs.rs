use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::utils::{output_layer_design, output_success};
use crate::cli::{Connection, OutputFormat};

#[derive(Subcommand)]
pub enum DesignCommands {
    #[command(about = "Show the designs of a product")]
    List {
        #[arg(help = "Product id")]
        product_id: i64,
    },

    #[command(about = "Show the designs of the product with a SKU")]
    BySku {
        #[arg(help = "Product SKU")]
        sq: String,
    },

    #[command(about = "Add a design to the product with a SKU")]
    Create {
        #[arg(help = "Product SKU")]
        sq: String,
        #[arg(help = "Design name")]
        name: String,
        #[arg(long, help = "Initial line items as a JSON array")]
        items: Option<String>,
    },

    #[command(about = "Rename a design, keeping its line items")]
    Rename {
        #[arg(help = "Product id")]
        product_id: i64,
        #[arg(help = "Current design name")]
        from: String,
        #[arg(help = "New design name")]
        to: String,
    },

    #[command(about = "Delete a design and its line items")]
    Delete {
        #[arg(help = "Product id")]
        product_id: i64,
        #[arg(help = "Design name")]
        name: String,
    },
}

pub async fn handle(
    cmd: DesignCommands,
    connection: &Connection,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let client = connection.authed_client()?;

    match cmd {
        DesignCommands::List { product_id } => {
            let product = client.get(&format!("/api/layerdesigns/{}", product_id)).await?;
            output_layer_design(&output_format, &product["layerDesign"])
        }
        DesignCommands::BySku { sq } => {
            let product = client.get(&format!("/api/layerdesigns/by-sq/{}", sq)).await?;
            output_layer_design(&output_format, &product["layerDesign"])
        }
        DesignCommands::Create { sq, name, items } => {
            let customizable_data = match items {
                Some(raw) => Some(parse_items(&raw)?),
                None => None,
            };
            let body = json!({
                "sq": sq,
                "designName": name,
                "customizableData": customizable_data,
            });
            let data = client.post("/api/layerdesigns", &body).await?;
            let created = data["designName"].as_str().unwrap_or(name.as_str()).to_string();
            output_success(
                &output_format,
                &format!("Design '{}' created on {}", created, sq),
                Some(data),
            )
        }
        DesignCommands::Rename {
            product_id,
            from,
            to,
        } => {
            let body = json!({ "designName": from, "newDesignName": to });
            let data = client
                .put(&format!("/api/layerdesigns/{}", product_id), &body)
                .await?;
            output_success(
                &output_format,
                &format!("Design '{}' renamed to '{}'", from, to.trim()),
                Some(data),
            )
        }
        DesignCommands::Delete { product_id, name } => {
            let body = json!({ "designName": name });
            let data = client
                .delete(&format!("/api/layerdesigns/{}", product_id), &body)
                .await?;
            output_success(&output_format, &format!("Design '{}' deleted", name), Some(data))
        }
    }
}

fn parse_items(raw: &str) -> anyhow::Result<Value> {
    let parsed: Value = serde_json::from_str(raw)
        .map_err(|e| anyhow::anyhow!("--items is not valid JSON: {}", e))?;
    if !parsed.is_array() {
        anyhow::bail!("--items must be a JSON array of line items");
    }
    Ok(parsed)
}

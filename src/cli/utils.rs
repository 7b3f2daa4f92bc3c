use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(data_value) = data {
                response["data"] = data_value;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let response = json!({
                "success": false,
                "error": message
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ collection_name: [] }))?
            );
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Print a design document as `name: N item(s)` lines, or raw JSON
pub fn output_layer_design(output_format: &OutputFormat, layer_design: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(layer_design)?);
        }
        OutputFormat::Text => {
            for line in design_lines(layer_design) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

/// Print a line item list with its positions
pub fn output_items(output_format: &OutputFormat, items: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items)?);
        }
        OutputFormat::Text => {
            let items = items.as_array().map(Vec::as_slice).unwrap_or_default();
            if items.is_empty() {
                println!("(no items)");
            }
            for (index, item) in items.iter().enumerate() {
                println!("[{}] {}", index, item_line(item));
            }
        }
    }
    Ok(())
}

fn design_lines(layer_design: &Value) -> Vec<String> {
    let Some(designs) = layer_design.as_object() else {
        return vec!["(no designs)".to_string()];
    };
    if designs.is_empty() {
        return vec!["(no designs)".to_string()];
    }
    designs
        .iter()
        .map(|(name, items)| {
            let count = items.as_array().map(Vec::len).unwrap_or(0);
            let noun = if count == 1 { "item" } else { "items" };
            format!("{}: {} {}", name, count, noun)
        })
        .collect()
}

fn item_line(item: &Value) -> String {
    let title = item.get("title").and_then(Value::as_str).unwrap_or("");
    let price = item.get("price").and_then(Value::as_f64).unwrap_or(0.0);
    let files = item
        .get("files")
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0);
    format!("{} ({:.2}, {} file(s))", title, price, files)
}

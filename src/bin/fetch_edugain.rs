// src/bin/fetch_edugain.rs
// Downloads the eduGAIN entity list and converts it to CSV for the matcher.

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};
use serde_json::Value;
use std::path::PathBuf;

const EDUGAIN_API_URL: &str = "https://technical.edugain.org/api.php";

#[derive(Parser, Debug)]
#[command(
    name = "fetch_edugain",
    about = "Convert JSON data from the eduGAIN API to CSV format"
)]
struct Args {
    /// Output CSV file path
    #[arg(short, long, default_value = "edugain_data.csv")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let payload = fetch_entity_list().await?;
    let records = flatten_entity_list(payload)?;
    write_csv(&records, &args.output)?;

    info!("CSV data saved to {}", args.output.display());
    info!("Conversion completed successfully");
    Ok(())
}

async fn fetch_entity_list() -> Result<Value> {
    let response = reqwest::Client::new()
        .get(EDUGAIN_API_URL)
        .query(&[
            ("action", "list_entities"),
            ("type", "idp"),
            ("format", "json"),
        ])
        .send()
        .await
        .with_context(|| format!("error fetching data from {}", EDUGAIN_API_URL))?;

    let status = response.status();
    if !status.is_success() {
        bail!("eduGAIN API returned status {}", status);
    }
    response
        .json::<Value>()
        .await
        .context("failed to parse eduGAIN API response")
}

/// The API returns a list of per-federation lists of entity objects; flatten
/// it into one record list.
fn flatten_entity_list(payload: Value) -> Result<Vec<serde_json::Map<String, Value>>> {
    let outer = match payload {
        Value::Array(outer) => outer,
        _ => bail!("unexpected JSON structure: expected a top-level list"),
    };

    let mut records = Vec::new();
    for sublist in outer {
        let inner = match sublist {
            Value::Array(inner) => inner,
            _ => bail!("unexpected JSON structure: expected a list of lists"),
        };
        for item in inner {
            match item {
                Value::Object(record) => records.push(record),
                _ => bail!("unexpected JSON structure: expected entity objects"),
            }
        }
    }
    Ok(records)
}

fn write_csv(records: &[serde_json::Map<String, Value>], path: &PathBuf) -> Result<()> {
    if records.is_empty() {
        warn!("No data to convert to CSV");
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("error saving CSV data to {}", path.display()))?;

    // Column set comes from the first record
    let columns: Vec<String> = records
        .first()
        .map(|record| record.keys().cloned().collect())
        .unwrap_or_default();
    writer
        .write_record(&columns)
        .context("failed to write CSV header")?;

    for record in records {
        let row: Vec<String> = columns
            .iter()
            .map(|column| cell_text(record.get(column)))
            .collect();
        writer.write_record(&row).context("failed to write CSV row")?;
    }
    writer.flush().context("failed to flush CSV output")?;
    Ok(())
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

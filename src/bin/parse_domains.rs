// src/bin/parse_domains.rs
// Extracts website domains for matched ROR ids from a ROR data dump.

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::path::PathBuf;
use url::Url;

// Leading www host label, with an optional digit (www2.example.edu etc.)
static WWW_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^www\d?\.").unwrap());

#[derive(Parser, Debug)]
#[command(
    name = "parse_domains",
    about = "Extract website domains from ROR records"
)]
struct Args {
    /// Path to the input CSV file (needs a ror_id column)
    #[arg(short, long)]
    input_file: PathBuf,

    /// Path to the ROR data dump JSON file
    #[arg(short, long)]
    data_dump: PathBuf,

    /// Path to the output CSV file
    #[arg(short, long, default_value = "parsed_domains.csv")]
    output_file: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let ror_ids = read_matched_ids(&args.input_file)?;
    let dump = read_data_dump(&args.data_dump)?;
    let rows = extract_domains(&ror_ids, &dump);
    write_output(&rows, &args.output_file)?;

    info!(
        "Processing complete. Results written to {}",
        args.output_file.display()
    );
    Ok(())
}

fn read_matched_ids(path: &PathBuf) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("error reading CSV file {}", path.display()))?;
    let headers = reader.headers().context("failed to read CSV header")?;
    let idx = match headers.iter().position(|h| h == "ror_id") {
        Some(idx) => idx,
        None => bail!("input file {} is missing a 'ror_id' column", path.display()),
    };

    let mut ids = Vec::new();
    for record in reader.records() {
        let record = record.context("failed to read CSV row")?;
        if let Some(id) = record.get(idx) {
            ids.push(id.to_string());
        }
    }
    Ok(ids)
}

fn read_data_dump(path: &PathBuf) -> Result<HashMap<String, Value>> {
    let file = File::open(path)
        .with_context(|| format!("error reading JSON file {}", path.display()))?;
    let records: Vec<Value> =
        serde_json::from_reader(file).context("failed to parse ROR data dump")?;

    Ok(records
        .into_iter()
        .filter_map(|record| {
            record
                .get("id")
                .and_then(Value::as_str)
                .map(|id| (id.to_string(), record.clone()))
        })
        .collect())
}

struct DomainRow {
    ror_id: String,
    website: String,
    extracted_domain: String,
}

fn extract_domains(ror_ids: &[String], dump: &HashMap<String, Value>) -> Vec<DomainRow> {
    let mut rows = Vec::new();
    for ror_id in ror_ids {
        let record = match dump.get(ror_id) {
            Some(record) => record,
            None => {
                warn!("No matching record found for ROR ID: {}", ror_id);
                continue;
            }
        };
        let website = match extract_website(record) {
            Some(website) => website,
            None => {
                warn!("No website found for ROR ID: {}", ror_id);
                continue;
            }
        };
        match reduce_to_domain(&website) {
            Some(domain) => rows.push(DomainRow {
                ror_id: ror_id.clone(),
                website,
                extracted_domain: domain,
            }),
            None => warn!("No domain found in URL: {}", website),
        }
    }
    rows
}

/// First website-typed link of a dump record.
fn extract_website(record: &Value) -> Option<String> {
    record
        .get("links")?
        .as_array()?
        .iter()
        .find(|link| link.get("type").and_then(Value::as_str) == Some("website"))
        .and_then(|link| link.get("value").and_then(Value::as_str))
        .map(str::to_string)
}

/// Reduce a URL to its bare domain, dropping a leading www-style label.
fn reduce_to_domain(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    let host = parsed.host_str()?;
    Some(WWW_PREFIX.replace(host, "").into_owned())
}

fn write_output(rows: &[DomainRow], path: &PathBuf) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("error writing CSV file {}", path.display()))?;
    writer
        .write_record(["ror_id", "website", "extracted_domain"])
        .context("failed to write CSV header")?;
    for row in rows {
        writer
            .write_record([&row.ror_id, &row.website, &row.extracted_domain])
            .context("failed to write CSV row")?;
    }
    writer.flush().context("failed to flush CSV output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reduce_to_domain_strips_www() {
        assert_eq!(
            reduce_to_domain("https://www.example.edu/about").as_deref(),
            Some("example.edu")
        );
        assert_eq!(
            reduce_to_domain("https://www2.example.edu").as_deref(),
            Some("example.edu")
        );
        assert_eq!(
            reduce_to_domain("https://sub.example.edu").as_deref(),
            Some("sub.example.edu")
        );
    }

    #[test]
    fn test_reduce_to_domain_rejects_invalid() {
        assert!(reduce_to_domain("not a url").is_none());
    }

    #[test]
    fn test_extract_website_prefers_website_links() {
        let record = json!({
            "id": "https://ror.org/013cjyk83",
            "links": [
                {"type": "wikipedia", "value": "https://en.wikipedia.org/wiki/Example"},
                {"type": "website", "value": "https://www.example.edu"}
            ]
        });
        assert_eq!(
            extract_website(&record).as_deref(),
            Some("https://www.example.edu")
        );
    }

    #[test]
    fn test_extract_website_missing() {
        let record = json!({"id": "https://ror.org/013cjyk83", "links": []});
        assert!(extract_website(&record).is_none());
    }
}

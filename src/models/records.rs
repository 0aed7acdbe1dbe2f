//! Input/output row shapes and the parsing of the eduGAIN display-name and
//! scope fields into matchable variants.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;

use super::matching::MatchMap;

pub const DISPLAY_NAME_FIELD: &str = "e_displayname";
pub const SCOPES_FIELD: &str = "scopes";

/// Columns appended to every output row.
pub const MATCH_OUTPUT_FIELDS: [&str; 4] =
    ["matched_ror_id", "matched_name", "match_type", "match_ratio"];

// Two-letter locale suffix on a display-name variant, e.g. "Université==fr".
static LANG_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"==[a-z]{2}").unwrap());

/// Validated view over the input header: which columns hold the display names
/// and the URL scopes.
#[derive(Debug, Clone)]
pub struct RowSchema {
    headers: Vec<String>,
    display_name_idx: usize,
    scopes_idx: usize,
}

impl RowSchema {
    /// Build from the CSV header row. Missing required columns are a fatal
    /// input error: nothing is dispatched for a file we cannot interpret.
    pub fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let headers: Vec<String> = headers.iter().map(str::to_string).collect();
        let position = |name: &str| headers.iter().position(|h| h == name);

        let display_name_idx = match position(DISPLAY_NAME_FIELD) {
            Some(idx) => idx,
            None => bail!("input file is missing required column '{}'", DISPLAY_NAME_FIELD),
        };
        let scopes_idx = match position(SCOPES_FIELD) {
            Some(idx) => idx,
            None => bail!("input file is missing required column '{}'", SCOPES_FIELD),
        };

        Ok(Self {
            headers,
            display_name_idx,
            scopes_idx,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Input header plus the four match columns.
    pub fn output_headers(&self) -> Vec<String> {
        let mut headers = self.headers.clone();
        headers.extend(MATCH_OUTPUT_FIELDS.iter().map(|f| f.to_string()));
        headers
    }
}

/// One input row, field values aligned with the schema's header. Immutable
/// for the duration of matching.
#[derive(Debug, Clone)]
pub struct InputRecord {
    fields: Vec<String>,
}

impl InputRecord {
    pub fn from_record(record: &csv::StringRecord) -> Self {
        Self {
            fields: record.iter().map(str::to_string).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    fn field(&self, idx: usize) -> &str {
        self.fields.get(idx).map(String::as_str).unwrap_or("")
    }

    /// Name variants to try, language suffixes stripped.
    pub fn name_variants(&self, schema: &RowSchema) -> Vec<String> {
        parse_name_variants(self.field(schema.display_name_idx))
    }

    /// URL/domain variants to try.
    pub fn url_variants(&self, schema: &RowSchema) -> Vec<String> {
        parse_url_variants(self.field(schema.scopes_idx))
    }
}

/// One output row: the original input fields plus the match columns (empty
/// on an unmatched echo row).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub fields: Vec<String>,
    pub matched_ror_id: String,
    pub matched_name: String,
    pub match_type: String,
    pub match_ratio: String,
}

impl OutputRecord {
    /// Echo the input row with empty match fields.
    pub fn echo(row: &InputRecord) -> Self {
        Self {
            fields: row.fields.clone(),
            matched_ror_id: String::new(),
            matched_name: String::new(),
            match_type: String::new(),
            match_ratio: String::new(),
        }
    }

    /// All columns in output order.
    pub fn to_field_vec(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.fields.iter().map(String::as_str).collect();
        out.push(&self.matched_ror_id);
        out.push(&self.matched_name);
        out.push(&self.match_type);
        out.push(&self.match_ratio);
        out
    }
}

/// Flatten a row's surviving candidates into output rows. Every input row
/// yields at least one output row.
pub fn output_rows_for(row: &InputRecord, matches: &MatchMap) -> Vec<OutputRecord> {
    if matches.is_empty() {
        return vec![OutputRecord::echo(row)];
    }
    matches
        .values()
        .map(|candidate| OutputRecord {
            fields: row.fields.clone(),
            matched_ror_id: candidate.ror_id.clone(),
            matched_name: candidate.ror_name.clone(),
            match_type: candidate.info.match_type(),
            match_ratio: candidate.info.highest_ratio().to_string(),
        })
        .collect()
}

/// Split a `;`-joined display-name list into variants. Segments of raw length
/// ≤ 2 are dropped before the `==xx` locale suffix is stripped.
pub fn parse_name_variants(raw: &str) -> Vec<String> {
    raw.split(';')
        .filter(|segment| segment.len() > 2)
        .map(|segment| LANG_TAG.replace_all(segment, "").into_owned())
        .collect()
}

/// Split a `==`-joined scope list into URL variants. A single-value scope is
/// one variant; empty variants are dropped so an empty field triggers no
/// registry calls.
pub fn parse_url_variants(raw: &str) -> Vec<String> {
    let variants: Vec<String> = if raw.contains("==") {
        raw.split("==").map(str::to_string).collect()
    } else {
        vec![raw.to_string()]
    };
    variants.into_iter().filter(|v| !v.is_empty()).collect()
}

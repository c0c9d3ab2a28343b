//! Metadata normalisation: turn a `pdfinfo` dump into a [`Metadata`] map.
//!
//! Parsing is line-oriented. Each line is split at its first colon; both
//! halves are trimmed. Lines without a colon are ignored and a repeated key
//! keeps its last value.
//!
//! Two derived fields are added when their source dates parse:
//!
//! | Source         | Derived        |
//! |----------------|----------------|
//! | `CreationDate` | `CreatedDate`  |
//! | `ModDate`      | `ModifiedDate` |
//!
//! Derived values are Unix epoch seconds as decimal strings. A date that does
//! not match the fixed `Mon Jan  2 15:04:05 2006` layout simply produces no
//! derived field.

use crate::error::Pdf2HtmlError;
use crate::output::Metadata;
use crate::pipeline::tools::MetadataExtractor;
use chrono::NaiveDateTime;
use std::path::Path;
use tracing::debug;

pub const CREATION_DATE: &str = "CreationDate";
pub const MOD_DATE: &str = "ModDate";
pub const CREATED_DATE: &str = "CreatedDate";
pub const MODIFIED_DATE: &str = "ModifiedDate";

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Run the extractor on `source` and normalise its output.
pub async fn extract_metadata(
    extractor: &dyn MetadataExtractor,
    source: &Path,
) -> Result<Metadata, Pdf2HtmlError> {
    let raw = extractor.extract(source).await?;
    let metadata = normalize_metadata(&raw);
    debug!("Parsed {} metadata fields", metadata.len());
    Ok(metadata)
}

/// Parse `key: value` lines and add the derived date fields.
pub fn normalize_metadata(raw: &str) -> Metadata {
    let mut meta = parse_fields(raw);

    for (source, derived) in [(MOD_DATE, MODIFIED_DATE), (CREATION_DATE, CREATED_DATE)] {
        let Some(value) = meta.get(source).cloned() else {
            continue;
        };
        match parse_timestamp(&value) {
            Some(epoch) => {
                meta.insert(derived.to_string(), epoch.to_string());
            }
            None => debug!("Ignoring unparsable {}: {:?}", source, value),
        }
    }

    meta
}

/// Split each line at its first colon. Later keys overwrite earlier ones.
pub fn parse_fields(raw: &str) -> Metadata {
    raw.lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Parse a `Mon Jan  2 15:04:05 2006` timestamp (UTC) into epoch seconds.
///
/// The weekday is checked for shape only; it is not required to agree with
/// the date. Fields are separated by spaces only; runs of spaces are allowed.
pub fn parse_timestamp(value: &str) -> Option<i64> {
    if value.chars().any(|c| c.is_whitespace() && c != ' ') {
        return None;
    }
    let (weekday, rest) = value.split_once(' ')?;
    if !WEEKDAYS.contains(&weekday) {
        return None;
    }
    NaiveDateTime::parse_from_str(rest.trim_start_matches(' '), "%b %e %H:%M:%S %Y")
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}

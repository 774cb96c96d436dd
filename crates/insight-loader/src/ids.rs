use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

pub const ID_COLUMN: &str = "company_id";

/// Read company ids from a CSV file with a `company_id` header.
pub fn read_company_ids(path: &Path) -> Result<Vec<String>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open company list {}", path.display()))?;
    read_company_ids_from(file).with_context(|| format!("Failed to read company list {}", path.display()))
}

pub fn read_company_ids_from<R: Read>(source: R) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);

    let column = reader
        .headers()?
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(ID_COLUMN))
        .ok_or_else(|| anyhow!("missing '{}' column", ID_COLUMN))?;

    let mut ids = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(id) = record.get(column) {
            ids.push(id.to_string());
        }
    }

    Ok(dedup_ids(ids))
}

/// Trim ids, drop blanks and keep only the first occurrence of each.
pub fn dedup_ids<I>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    ids.into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect()
}

use thiserror::Error;

/// Widest header the manual loader reads (`A`..`Z`).
pub const MANUAL_MAX_COLUMNS: usize = 26;

/// Why the header row cannot be used as-is by the structured loader.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("header row is empty")]
    Empty,
    #[error("duplicate header \"{0}\"")]
    Duplicate(String),
}

/// Validate row 1 the way a structured row API does: every non-empty header
/// must be unique and at least one must exist. Empty cells keep an empty name.
pub fn strict_headers(raw: &[String]) -> Result<Vec<String>, HeaderError> {
    let headers: Vec<String> = raw.iter().map(|h| h.trim().to_string()).collect();
    if headers.iter().all(String::is_empty) {
        return Err(HeaderError::Empty);
    }
    for (i, header) in headers.iter().enumerate() {
        if !header.is_empty() && headers[..i].contains(header) {
            return Err(HeaderError::Duplicate(header.clone()));
        }
    }
    Ok(headers)
}

/// Build usable header names from raw row-1 cells.
///
/// Empty cells become `col_{index}`, repeated names get `_2`, `_3`, ... (the
/// first suffix not already taken). At most `column_count` columns and never
/// more than [`MANUAL_MAX_COLUMNS`] are produced.
pub fn dedupe_headers(raw: &[String], column_count: usize) -> Vec<String> {
    let width = column_count.min(MANUAL_MAX_COLUMNS);
    let mut seen: Vec<String> = Vec::with_capacity(width);
    let mut headers = Vec::with_capacity(width);

    for col in 0..width {
        let value = raw.get(col).map(|v| v.trim()).unwrap_or_default();
        if value.is_empty() {
            headers.push(format!("col_{col}"));
            continue;
        }

        let mut name = value.to_string();
        if seen.contains(&name) {
            let mut counter = 2;
            loop {
                let candidate = format!("{value}_{counter}");
                if !seen.contains(&candidate) {
                    name = candidate;
                    break;
                }
                counter += 1;
            }
        }
        seen.push(name.clone());
        headers.push(name);
    }

    headers
}

//! Google Sheets v4 REST backend.
//!
//! - Base URL: `https://sheets.googleapis.com/v4/spreadsheets`
//! - Authentication: `Authorization: Bearer <token>` from a [`TokenSource`]
//! - Values are read unformatted so numbers arrive as numbers; dates keep
//!   their displayed string form.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::{CellRange, SheetBackend, SheetError, SheetInfo};

const BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Supplies the bearer token attached to every Sheets request.
#[async_trait]
pub trait TokenSource: Send + Sync + 'static {
    async fn token(&self) -> Result<SecretString, SheetError>;
}

/// Bearer token obtained outside the process (e.g. minted for the service
/// account by the deployment).
pub struct StaticToken(SecretString);

impl StaticToken {
    pub fn new(token: SecretString) -> Self {
        Self(token)
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<SecretString, SheetError> {
        Ok(self.0.clone())
    }
}

/// Sheets API client bound to one spreadsheet document.
#[derive(Clone)]
pub struct GoogleSheets {
    inner: Arc<GoogleSheetsInner>,
}

struct GoogleSheetsInner {
    client: reqwest::Client,
    spreadsheet_id: String,
    tokens: Arc<dyn TokenSource>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
    #[serde(default)]
    index: usize,
    #[serde(default)]
    grid_properties: GridProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridProperties {
    #[serde(default)]
    row_count: usize,
    #[serde(default)]
    column_count: usize,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl GoogleSheets {
    /// Create a client for `spreadsheet_id`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(spreadsheet_id: &str, tokens: Arc<dyn TokenSource>) -> Result<Self, SheetError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("linh-nga-crm/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(GoogleSheetsInner {
                client,
                spreadsheet_id: spreadsheet_id.to_string(),
                tokens,
            }),
        })
    }

    /// Document URL with extra path segments appended.
    fn url(&self, document_suffix: &str, segments: &[&str]) -> Result<Url, SheetError> {
        let mut url = Url::parse(BASE_URL).map_err(|e| SheetError::Parse(e.to_string()))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| SheetError::Parse("base URL cannot hold a path".to_string()))?;
            path.push(&format!("{}{document_suffix}", self.inner.spreadsheet_id));
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn authorized(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, SheetError> {
        let token = self.inner.tokens.token().await?;
        Ok(builder.bearer_auth(token.expose_secret()))
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, SheetError> {
        let response = self.authorized(builder).await?.send().await?;
        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| SheetError::Parse(format!("Failed to parse response: {e}")));
        }
        Err(Self::parse_error(response).await)
    }

    async fn parse_error(response: reqwest::Response) -> SheetError {
        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return SheetError::RateLimited(retry_after);
        }

        if status == 401 || status == 403 {
            return SheetError::Unauthorized;
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if status == 404 {
            return SheetError::NotFound(message);
        }

        SheetError::Api { status, message }
    }
}

/// Render an unformatted cell value the way it reads in the sheet.
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetBackend for GoogleSheets {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn sheets(&self) -> Result<Vec<SheetInfo>, SheetError> {
        let mut url = self.url("", &[])?;
        url.query_pairs_mut().append_pair(
            "fields",
            "sheets.properties(sheetId,title,index,gridProperties(rowCount,columnCount))",
        );
        let meta: SpreadsheetMeta = self.send(self.inner.client.get(url)).await?;

        Ok(meta
            .sheets
            .into_iter()
            .map(|entry| {
                let p = entry.properties;
                SheetInfo {
                    sheet_id: p.sheet_id,
                    title: p.title,
                    index: p.index,
                    row_count: p.grid_properties.row_count,
                    column_count: p.grid_properties.column_count,
                }
            })
            .collect())
    }

    async fn read_range(
        &self,
        _sheet: &SheetInfo,
        range: CellRange,
    ) -> Result<Vec<Vec<String>>, SheetError> {
        let a1 = range.to_string();
        let mut url = self.url("", &["values", a1.as_str()])?;
        url.query_pairs_mut()
            .append_pair("majorDimension", "ROWS")
            .append_pair("valueRenderOption", "UNFORMATTED_VALUE")
            .append_pair("dateTimeRenderOption", "FORMATTED_STRING");

        tracing::debug!(range = %range, "Reading sheet range");
        let body: ValueRange = self.send(self.inner.client.get(url)).await?;

        Ok(body
            .values
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect())
    }

    async fn append_row(&self, sheet: &SheetInfo, cells: Vec<String>) -> Result<(), SheetError> {
        let range = CellRange::row(&sheet.title, 1, cells.len().max(1));
        let target = format!("{range}:append");
        let mut url = self.url("", &["values", target.as_str()])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let body = json!({ "majorDimension": "ROWS", "values": [cells] });
        let _: Value = self.send(self.inner.client.post(url).json(&body)).await?;
        Ok(())
    }

    async fn write_row(
        &self,
        sheet: &SheetInfo,
        row_number: usize,
        cells: Vec<String>,
    ) -> Result<(), SheetError> {
        let range = CellRange::row(&sheet.title, row_number, cells.len().max(1));
        let a1 = range.to_string();
        let mut url = self.url("", &["values", a1.as_str()])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");

        let body = json!({
            "range": a1,
            "majorDimension": "ROWS",
            "values": [cells],
        });
        let _: Value = self.send(self.inner.client.put(url).json(&body)).await?;
        Ok(())
    }

    async fn delete_row(&self, sheet: &SheetInfo, row_number: usize) -> Result<(), SheetError> {
        if row_number == 0 {
            return Err(SheetError::NotFound("row 0".to_string()));
        }
        let url = self.url(":batchUpdate", &[])?;
        let body = json!({
            "requests": [{
                "deleteDimension": {
                    "range": {
                        "sheetId": sheet.sheet_id,
                        "dimension": "ROWS",
                        "startIndex": row_number - 1,
                        "endIndex": row_number,
                    }
                }
            }]
        });
        let _: Value = self.send(self.inner.client.post(url).json(&body)).await?;
        Ok(())
    }
}

impl std::fmt::Debug for GoogleSheets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSheets")
            .field("spreadsheet_id", &self.inner.spreadsheet_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleSheets {
        GoogleSheets::new("doc123", Arc::new(StaticToken::new(SecretString::from("t".to_string())))).unwrap()
    }

    #[test]
    fn test_document_urls() {
        let sheets = client();
        assert_eq!(
            sheets.url("", &[]).unwrap().as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/doc123"
        );
        assert_eq!(
            sheets.url(":batchUpdate", &[]).unwrap().as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/doc123:batchUpdate"
        );

        let range = CellRange::rows("dress", 1, 1, 25).to_string();
        let url = sheets.url("", &["values", range.as_str()]).unwrap();
        assert!(url.as_str().starts_with(
            "https://sheets.googleapis.com/v4/spreadsheets/doc123/values/"
        ));
        assert!(url.as_str().ends_with("A1:Z1"));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!(null)), "");
        assert_eq!(cell_text(&json!("Váy")), "Váy");
        assert_eq!(cell_text(&json!(15000)), "15000");
        assert_eq!(cell_text(&json!(15000.0)), "15000");
        assert_eq!(cell_text(&json!(12.5)), "12.5");
        assert_eq!(cell_text(&json!(true)), "TRUE");
    }

    #[test]
    fn test_metadata_deserializes() {
        let meta: SpreadsheetMeta = serde_json::from_value(json!({
            "sheets": [
                {"properties": {"sheetId": 0, "title": "users", "index": 0,
                    "gridProperties": {"rowCount": 1000, "columnCount": 26}}},
                {"properties": {"sheetId": 728077449, "title": "dress", "index": 2}}
            ]
        }))
        .unwrap();
        assert_eq!(meta.sheets.len(), 2);
        assert_eq!(meta.sheets[0].properties.grid_properties.row_count, 1000);
        assert_eq!(meta.sheets[1].properties.sheet_id, 728_077_449);
        assert_eq!(meta.sheets[1].properties.grid_properties.column_count, 0);
    }
}

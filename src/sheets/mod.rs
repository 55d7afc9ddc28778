//! Spreadsheet document access.
//!
//! The CRM treats a spreadsheet document as its database. [`SheetBackend`]
//! is the narrow surface the record layer needs: sheet metadata, rectangular
//! reads, and whole-row writes. Two implementations ship:
//!
//! - [`GoogleSheets`] talks to the Sheets v4 REST API.
//! - [`MemoryWorkbook`] keeps the workbook in process, optionally mirrored to
//!   a JSON file. Used for local development and tests.

mod google;
mod memory;
mod range;

pub use google::{GoogleSheets, StaticToken, TokenSource};
pub use memory::{MemorySheet, MemoryWorkbook};
pub use range::{column_letters, CellRange};

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a spreadsheet backend.
#[derive(Debug, Error)]
pub enum SheetError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Credentials were rejected.
    #[error("Unauthorized: credentials rejected by the spreadsheet API")]
    Unauthorized,

    /// Document, sheet or row does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// A response or file could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Workbook file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Metadata of one sheet (tab) inside the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetInfo {
    /// Numeric sheet identifier (the `gid` in sheet URLs).
    pub sheet_id: i64,
    pub title: String,
    /// Position of the tab in the document.
    pub index: usize,
    pub row_count: usize,
    pub column_count: usize,
}

/// Minimal spreadsheet document API used by the record layer.
///
/// Row numbers are 1-based sheet rows, so row 1 is the header row. Cell values
/// are returned as strings; rows may be ragged since trailing empty cells are
/// not guaranteed to be present.
#[async_trait]
pub trait SheetBackend: Send + Sync + 'static {
    /// Short backend name for logs and the health endpoint.
    fn name(&self) -> &'static str;

    /// List the sheets of the document in tab order.
    async fn sheets(&self) -> Result<Vec<SheetInfo>, SheetError>;

    /// Read a rectangular range of formatted cell values.
    async fn read_range(
        &self,
        sheet: &SheetInfo,
        range: CellRange,
    ) -> Result<Vec<Vec<String>>, SheetError>;

    /// Append a row after the last non-empty row.
    async fn append_row(&self, sheet: &SheetInfo, cells: Vec<String>) -> Result<(), SheetError>;

    /// Overwrite the cells of an existing row, starting at column A.
    async fn write_row(
        &self,
        sheet: &SheetInfo,
        row_number: usize,
        cells: Vec<String>,
    ) -> Result<(), SheetError>;

    /// Remove a row, shifting the rows below it up.
    async fn delete_row(&self, sheet: &SheetInfo, row_number: usize) -> Result<(), SheetError>;
}

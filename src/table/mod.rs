//! Spreadsheet tabs used as tables of typed records.
//!
//! A [`SheetTable`] resolves its tab through a [`SheetSelector`], reads the
//! header row (falling back to a bounded manual read when the header row is
//! unusable), maps rows to records through alias tables, and performs
//! create/update/delete by linear scan over the loaded rows.

pub mod dates;
mod headers;
mod paging;
mod row;
mod selector;

pub use headers::{dedupe_headers, strict_headers, HeaderError, MANUAL_MAX_COLUMNS};
pub use paging::{paginate, single_page, PageMeta, PageRequest};
pub use row::{parse_float, parse_int, Columns, FieldSpec, RowView, ID_ALIASES};
pub use selector::SheetSelector;

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::sheets::{CellRange, SheetBackend, SheetError, SheetInfo};

/// Errors from table operations.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("{0} sheet not found")]
    SheetNotFound(&'static str),

    #[error("{kind} with ID {id} not found")]
    RecordNotFound { kind: &'static str, id: i64 },

    #[error(transparent)]
    Backend(#[from] SheetError),
}

/// A record kind stored one-per-row in a sheet.
pub trait Record: Clone + Serialize + Send + Sync + 'static {
    /// Display name used in messages, e.g. `Dress`.
    const KIND: &'static str;

    /// Writable fields and their header aliases. The id column is handled by
    /// the table and is not listed here.
    fn fields() -> &'static [FieldSpec];

    /// Build a record from a row; `id` is already synthesized.
    fn from_row(id: i64, row: &RowView<'_>) -> Self;

    /// Cell value for a field name from [`Record::fields`].
    fn cell(&self, field: &str) -> String;

    fn id(&self) -> i64;

    fn set_id(&mut self, id: i64);

    /// Rows mapping to a blank record are not listed.
    fn is_blank(&self) -> bool;

    /// Sample data served when the sheet cannot be read.
    fn fallback() -> Vec<Self>;
}

/// Bounds for the manual cell-range loader.
#[derive(Debug, Clone, Copy)]
pub struct ManualLimits {
    /// Last sheet row read (inclusive), also capped by the sheet's row count.
    pub max_sheet_row: usize,
    /// Maximum number of data rows scanned, if any.
    pub max_data_rows: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadPurpose {
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderMode {
    Structured,
    Manual,
}

/// One data row together with its 1-based sheet row number.
#[derive(Debug, Clone)]
struct SheetRow {
    row_number: usize,
    cells: Vec<String>,
}

struct LoadedSheet {
    info: SheetInfo,
    columns: Columns,
    rows: Vec<SheetRow>,
}

impl LoadedSheet {
    /// Explicit id when present, else position among data rows plus one.
    fn synthesized_id(&self, position: usize) -> i64 {
        let row = &self.rows[position];
        self.columns
            .view(&row.cells)
            .explicit_id()
            .unwrap_or(position as i64 + 1)
    }

    fn position_of(&self, id: i64) -> Option<usize> {
        (0..self.rows.len()).find(|&i| self.synthesized_id(i) == id)
    }

    fn max_id(&self) -> i64 {
        (0..self.rows.len())
            .map(|i| self.synthesized_id(i))
            .max()
            .unwrap_or(0)
    }
}

/// Result of a list read.
#[derive(Debug, Clone)]
pub struct Listing<R> {
    pub items: Vec<R>,
    pub meta: PageMeta,
    /// Served from sample data because the sheet could not be read.
    pub fallback: bool,
}

/// Typed view over one tab of the document.
pub struct SheetTable<R> {
    backend: Arc<dyn SheetBackend>,
    selector: SheetSelector,
    limits: ManualLimits,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for SheetTable<R> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            selector: self.selector.clone(),
            limits: self.limits,
            _record: PhantomData,
        }
    }
}

impl<R: Record> SheetTable<R> {
    pub fn new(backend: Arc<dyn SheetBackend>, selector: SheetSelector, limits: ManualLimits) -> Self {
        Self {
            backend,
            selector,
            limits,
            _record: PhantomData,
        }
    }

    async fn select_sheet(&self) -> Result<SheetInfo, TableError> {
        let sheets = self.backend.sheets().await?;
        for sheet in &sheets {
            tracing::debug!(title = %sheet.title, gid = sheet.sheet_id, index = sheet.index, "Sheet available");
        }
        let info = self
            .selector
            .select(&sheets)
            .cloned()
            .ok_or(TableError::SheetNotFound(R::KIND))?;
        tracing::debug!(
            kind = R::KIND,
            title = %info.title,
            gid = info.sheet_id,
            rows = info.row_count,
            columns = info.column_count,
            "Selected sheet"
        );
        Ok(info)
    }

    /// Whole-sheet read with a strict header row.
    async fn load_structured(&self, info: &SheetInfo) -> Result<(Columns, Vec<SheetRow>), TableError> {
        let mut grid = self
            .backend
            .read_range(info, CellRange::whole(&info.title))
            .await?;
        if grid.is_empty() {
            return Err(SheetError::Parse(HeaderError::Empty.to_string()).into());
        }
        let header = grid.remove(0);
        let headers = strict_headers(&header).map_err(|e| SheetError::Parse(e.to_string()))?;
        let rows = grid
            .into_iter()
            .enumerate()
            .map(|(i, cells)| SheetRow {
                row_number: i + 2,
                cells,
            })
            .collect();
        Ok((Columns::new(headers), rows))
    }

    /// Header from `A1:Z1`, data from a bounded range (reads) or the whole
    /// sheet (writes, which need every row to locate targets and ids).
    async fn load_manual(
        &self,
        info: &SheetInfo,
        purpose: LoadPurpose,
    ) -> Result<(Columns, Vec<SheetRow>), TableError> {
        let width = if info.column_count == 0 {
            MANUAL_MAX_COLUMNS
        } else {
            info.column_count.min(MANUAL_MAX_COLUMNS)
        };
        let raw = self
            .backend
            .read_range(info, CellRange::rows(&info.title, 1, 1, width - 1))
            .await?;
        let headers = dedupe_headers(raw.first().map(Vec::as_slice).unwrap_or_default(), width);
        tracing::info!(kind = R::KIND, headers = ?headers, "Manual headers");

        let grid = match purpose {
            LoadPurpose::Read => {
                let last = info.row_count.min(self.limits.max_sheet_row);
                if last < 2 {
                    Vec::new()
                } else {
                    tracing::info!(kind = R::KIND, range = %format!("A2:Z{last}"), "Loading manual data");
                    self.backend
                        .read_range(info, CellRange::rows(&info.title, 2, last, width - 1))
                        .await?
                }
            }
            LoadPurpose::Write => {
                let mut all = self
                    .backend
                    .read_range(info, CellRange::whole(&info.title))
                    .await?;
                if !all.is_empty() {
                    all.remove(0);
                }
                all
            }
        };

        let mut rows: Vec<SheetRow> = grid
            .into_iter()
            .enumerate()
            .map(|(i, mut cells)| {
                cells.truncate(width);
                SheetRow {
                    row_number: i + 2,
                    cells,
                }
            })
            .collect();
        if purpose == LoadPurpose::Read {
            if let Some(max) = self.limits.max_data_rows {
                rows.truncate(max);
            }
        }
        Ok((Columns::new(headers), rows))
    }

    async fn load(&self, purpose: LoadPurpose) -> Result<LoadedSheet, TableError> {
        let info = self.select_sheet().await?;

        let (mode, (columns, rows)) = match self.load_structured(&info).await {
            Ok(loaded) => (HeaderMode::Structured, loaded),
            Err(e) => {
                tracing::warn!(kind = R::KIND, error = %e, "Header loading failed, using manual cell range");
                (HeaderMode::Manual, self.load_manual(&info, purpose).await?)
            }
        };

        tracing::debug!(
            kind = R::KIND,
            mode = ?mode,
            headers = ?columns.headers(),
            rows = rows.len(),
            "Loaded sheet"
        );
        Ok(LoadedSheet { info, columns, rows })
    }

    fn records(sheet: &LoadedSheet) -> Vec<R> {
        sheet
            .rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| {
                let view = sheet.columns.view(&row.cells);
                if !view.has_data() {
                    return None;
                }
                let record = R::from_row(sheet.synthesized_id(i), &view);
                (!record.is_blank()).then_some(record)
            })
            .collect()
    }

    /// Every non-blank record in sheet order.
    pub async fn load_all(&self) -> Result<Vec<R>, TableError> {
        let sheet = self.load(LoadPurpose::Read).await?;
        let records = Self::records(&sheet);
        tracing::info!(kind = R::KIND, count = records.len(), "Loaded records");
        Ok(records)
    }

    /// Every record, or the sample set when the sheet cannot be read.
    pub async fn load_or_fallback(&self) -> (Vec<R>, bool) {
        match self.load_all().await {
            Ok(records) => (records, false),
            Err(e) => {
                tracing::error!(kind = R::KIND, error = %e, "Sheet read failed, returning fallback sample data");
                (R::fallback(), true)
            }
        }
    }

    /// Filter and paginate. Read failures are masked with the sample set,
    /// served unfiltered as the only page.
    pub async fn list<F>(&self, keep: F, page: PageRequest) -> Listing<R>
    where
        F: Fn(&R) -> bool,
    {
        match self.load_all().await {
            Ok(records) => {
                let filtered: Vec<R> = records.into_iter().filter(|r| keep(r)).collect();
                let (items, meta) = paginate(filtered, page);
                tracing::info!(
                    kind = R::KIND,
                    page = meta.page,
                    total_pages = meta.total_pages,
                    shown = items.len(),
                    total = meta.total,
                    "Listed records"
                );
                Listing {
                    items,
                    meta,
                    fallback: false,
                }
            }
            Err(e) => {
                tracing::error!(kind = R::KIND, error = %e, "Sheet read failed, returning fallback sample data");
                let items = R::fallback();
                let meta = single_page(items.len(), page.limit);
                Listing {
                    items,
                    meta,
                    fallback: true,
                }
            }
        }
    }

    /// Cells for a new row holding `record` in every mapped column.
    fn new_row_cells(columns: &Columns, record: &R) -> Vec<String> {
        let mut cells = vec![String::new(); columns.len()];
        if let Some(col) = columns.write_position(ID_ALIASES) {
            cells[col] = record.id().to_string();
        }
        for spec in R::fields() {
            if let Some(col) = columns.write_position(spec.aliases) {
                cells[col] = record.cell(spec.field);
            }
        }
        cells
    }

    /// `base` with only the `changed` fields of `record` written over it.
    fn changed_cells(columns: &Columns, record: &R, base: &[String], changed: &[&str]) -> Vec<String> {
        let mut cells = base.to_vec();
        if cells.len() < columns.len() {
            cells.resize(columns.len(), String::new());
        }
        for spec in R::fields().iter().filter(|spec| changed.contains(&spec.field)) {
            if let Some(col) = columns.write_position(spec.aliases) {
                cells[col] = record.cell(spec.field);
            }
        }
        cells
    }

    /// Append `record` with id `max(existing ids) + 1`.
    pub async fn create(&self, mut record: R) -> Result<R, TableError> {
        let sheet = self.load(LoadPurpose::Write).await?;
        let max_id = sheet.max_id();
        record.set_id(max_id + 1);
        tracing::info!(kind = R::KIND, max_id, new_id = record.id(), rows = sheet.rows.len(), "Adding record");

        let cells = Self::new_row_cells(&sheet.columns, &record);
        self.backend.append_row(&sheet.info, cells).await?;

        tracing::info!(kind = R::KIND, id = record.id(), "Record added");
        Ok(record)
    }

    /// Apply `change` to the record with `id` and write back the fields it
    /// reports as changed. Every other cell of the row is left as stored.
    pub async fn update<F>(&self, id: i64, change: F) -> Result<R, TableError>
    where
        F: FnOnce(&mut R) -> Vec<&'static str>,
    {
        let sheet = self.load(LoadPurpose::Write).await?;
        let Some(position) = sheet.position_of(id) else {
            tracing::warn!(kind = R::KIND, id, rows = sheet.rows.len(), "Record to update not found");
            return Err(TableError::RecordNotFound { kind: R::KIND, id });
        };
        let row = &sheet.rows[position];

        let mut record = R::from_row(id, &sheet.columns.view(&row.cells));
        let changed = change(&mut record);
        record.set_id(id);

        let cells = Self::changed_cells(&sheet.columns, &record, &row.cells, &changed);
        self.backend.write_row(&sheet.info, row.row_number, cells).await?;

        tracing::info!(kind = R::KIND, id, row = row.row_number, changed = ?changed, "Record updated");
        Ok(record)
    }

    /// Remove the row holding the record with `id`.
    pub async fn delete(&self, id: i64) -> Result<(), TableError> {
        let sheet = self.load(LoadPurpose::Write).await?;
        let Some(position) = sheet.position_of(id) else {
            tracing::warn!(kind = R::KIND, id, rows = sheet.rows.len(), "Record to delete not found");
            return Err(TableError::RecordNotFound { kind: R::KIND, id });
        };
        let row_number = sheet.rows[position].row_number;
        self.backend.delete_row(&sheet.info, row_number).await?;

        tracing::info!(kind = R::KIND, id, row = row_number, "Record deleted");
        Ok(())
    }
}

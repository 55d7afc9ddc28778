use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{CellRange, SheetBackend, SheetError, SheetInfo};

/// One tab of the in-memory workbook. `rows[0]` is the header row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorySheet {
    pub sheet_id: i64,
    pub title: String,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WorkbookFile {
    sheets: Vec<MemorySheet>,
}

/// Workbook held in process memory.
///
/// When built with [`MemoryWorkbook::open`], the workbook is read from a JSON
/// file and written back after every mutation.
pub struct MemoryWorkbook {
    sheets: RwLock<Vec<MemorySheet>>,
    path: Option<PathBuf>,
}

impl MemoryWorkbook {
    pub fn new(sheets: Vec<MemorySheet>) -> Self {
        Self {
            sheets: RwLock::new(sheets),
            path: None,
        }
    }

    /// Empty users / products / dress tabs with English headers.
    pub fn with_default_sheets() -> Self {
        Self::new(default_sheets())
    }

    /// Load the workbook from `path`, creating it with the default tabs when
    /// the file does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SheetError> {
        let path = path.as_ref().to_path_buf();
        let sheets = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let file: WorkbookFile = serde_json::from_slice(&bytes)
                    .map_err(|e| SheetError::Parse(format!("{}: {e}", path.display())))?;
                file.sheets
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "Workbook file missing, starting with default sheets");
                default_sheets()
            }
            Err(e) => return Err(e.into()),
        };

        let workbook = Self {
            sheets: RwLock::new(sheets),
            path: Some(path),
        };
        workbook.persist(&*workbook.sheets.read().await).await?;
        Ok(workbook)
    }

    async fn persist(&self, sheets: &[MemorySheet]) -> Result<(), SheetError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let file = WorkbookFile {
            sheets: sheets.to_vec(),
        };
        let bytes = serde_json::to_vec_pretty(&file)
            .map_err(|e| SheetError::Parse(e.to_string()))?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    /// Apply `edit` to a copy of the workbook, persist the copy, then make it
    /// current. A failed edit or file write leaves the workbook unchanged.
    async fn mutate<F>(&self, edit: F) -> Result<(), SheetError>
    where
        F: FnOnce(&mut Vec<MemorySheet>) -> Result<(), SheetError>,
    {
        let mut sheets = self.sheets.write().await;
        let mut next = sheets.clone();
        edit(&mut next)?;
        self.persist(&next).await?;
        *sheets = next;
        Ok(())
    }

    fn find<'a>(sheets: &'a mut [MemorySheet], info: &SheetInfo) -> Result<&'a mut MemorySheet, SheetError> {
        sheets
            .iter_mut()
            .find(|s| s.sheet_id == info.sheet_id)
            .ok_or_else(|| SheetError::NotFound(format!("sheet {}", info.title)))
    }
}

fn default_sheets() -> Vec<MemorySheet> {
    fn header(names: &[&str]) -> Vec<Vec<String>> {
        vec![names.iter().map(|s| (*s).to_string()).collect()]
    }

    vec![
        MemorySheet {
            sheet_id: 0,
            title: "users".to_string(),
            rows: header(&[
                "id", "name", "email", "phone", "company", "position", "status", "created_at",
            ]),
        },
        MemorySheet {
            sheet_id: 544_808_463,
            title: "products".to_string(),
            rows: header(&[
                "id",
                "product_code",
                "product_name",
                "category",
                "cost_price",
                "stock_quantity",
                "unit",
                "image_url",
                "supplier",
                "order_link",
                "created_at",
            ]),
        },
        MemorySheet {
            sheet_id: 728_077_449,
            title: "dress".to_string(),
            rows: header(&[
                "id",
                "date",
                "dress_code",
                "dress_description",
                "branch",
                "dress_type",
                "designer30",
                "designer100",
                "designer60",
                "designer20",
                "designer20_2",
                "time_dap",
                "status",
                "time_dinh",
                "team_dinh",
                "created_at",
            ]),
        },
    ]
}

#[async_trait]
impl SheetBackend for MemoryWorkbook {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn sheets(&self) -> Result<Vec<SheetInfo>, SheetError> {
        let sheets = self.sheets.read().await;
        Ok(sheets
            .iter()
            .enumerate()
            .map(|(index, sheet)| SheetInfo {
                sheet_id: sheet.sheet_id,
                title: sheet.title.clone(),
                index,
                row_count: sheet.rows.len(),
                column_count: sheet.rows.iter().map(Vec::len).max().unwrap_or(0),
            })
            .collect())
    }

    async fn read_range(
        &self,
        sheet: &SheetInfo,
        range: CellRange,
    ) -> Result<Vec<Vec<String>>, SheetError> {
        let sheets = self.sheets.read().await;
        let data = sheets
            .iter()
            .find(|s| s.sheet_id == sheet.sheet_id)
            .ok_or_else(|| SheetError::NotFound(format!("sheet {}", sheet.title)))?;

        let mut out = Vec::new();
        for (i, row) in data.rows.iter().enumerate() {
            let row_number = i + 1;
            if !range.contains(row_number, range.start_col) {
                continue;
            }
            out.push(
                row.iter()
                    .enumerate()
                    .filter(|(col, _)| range.contains(row_number, *col))
                    .map(|(_, v)| v.clone())
                    .collect(),
            );
        }
        Ok(out)
    }

    async fn append_row(&self, sheet: &SheetInfo, cells: Vec<String>) -> Result<(), SheetError> {
        self.mutate(|sheets| {
            let data = Self::find(sheets, sheet)?;
            // Appending lands after the last row that has any content.
            while data
                .rows
                .last()
                .is_some_and(|r| r.iter().all(|c| c.trim().is_empty()))
                && data.rows.len() > 1
            {
                data.rows.pop();
            }
            data.rows.push(cells);
            Ok(())
        })
        .await
    }

    async fn write_row(
        &self,
        sheet: &SheetInfo,
        row_number: usize,
        cells: Vec<String>,
    ) -> Result<(), SheetError> {
        if row_number == 0 {
            return Err(SheetError::NotFound("row 0".to_string()));
        }
        self.mutate(|sheets| {
            let data = Self::find(sheets, sheet)?;
            if data.rows.len() < row_number {
                data.rows.resize(row_number, Vec::new());
            }
            let row = &mut data.rows[row_number - 1];
            if row.len() < cells.len() {
                row.resize(cells.len(), String::new());
            }
            for (i, value) in cells.into_iter().enumerate() {
                row[i] = value;
            }
            Ok(())
        })
        .await
    }

    async fn delete_row(&self, sheet: &SheetInfo, row_number: usize) -> Result<(), SheetError> {
        self.mutate(|sheets| {
            let data = Self::find(sheets, sheet)?;
            if row_number == 0 || row_number > data.rows.len() {
                return Err(SheetError::NotFound(format!("row {row_number} in {}", sheet.title)));
            }
            data.rows.remove(row_number - 1);
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: &[&[&str]]) -> MemorySheet {
        MemorySheet {
            sheet_id: 7,
            title: "t".to_string(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| (*c).to_string()).collect())
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_read_range_clips_rows_and_columns() {
        let wb = MemoryWorkbook::new(vec![sheet(&[&["a", "b", "c"], &["1", "2", "3"], &["4", "5", "6"]])]);
        let info = wb.sheets().await.unwrap().remove(0);
        assert_eq!(info.row_count, 3);
        assert_eq!(info.column_count, 3);

        let header = wb.read_range(&info, CellRange::rows("t", 1, 1, 1)).await.unwrap();
        assert_eq!(header, vec![vec!["a".to_string(), "b".to_string()]]);

        let body = wb.read_range(&info, CellRange::rows("t", 2, 100, 25)).await.unwrap();
        assert_eq!(body.len(), 2);
        assert_eq!(body[1][2], "6");
    }

    #[tokio::test]
    async fn test_write_append_delete() {
        let wb = MemoryWorkbook::new(vec![sheet(&[&["a", "b"], &["1", "2"]])]);
        let info = wb.sheets().await.unwrap().remove(0);

        wb.append_row(&info, vec!["3".into(), "4".into()]).await.unwrap();
        wb.write_row(&info, 2, vec!["x".into()]).await.unwrap();
        let all = wb.read_range(&info, CellRange::whole("t")).await.unwrap();
        assert_eq!(all[1], vec!["x".to_string(), "2".to_string()]);
        assert_eq!(all[2], vec!["3".to_string(), "4".to_string()]);

        wb.delete_row(&info, 2).await.unwrap();
        let all = wb.read_range(&info, CellRange::whole("t")).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1][0], "3");

        assert!(matches!(wb.delete_row(&info, 9).await, Err(SheetError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_open_persists_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workbook.json");

        let wb = MemoryWorkbook::open(&path).await.unwrap();
        let users = wb.sheets().await.unwrap().remove(0);
        assert_eq!(users.title, "users");
        wb.append_row(&users, vec!["1".into(), "Lan".into()]).await.unwrap();

        let reopened = MemoryWorkbook::open(&path).await.unwrap();
        let users = reopened.sheets().await.unwrap().remove(0);
        let rows = reopened.read_range(&users, CellRange::whole("users")).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][1], "Lan");
    }

    #[tokio::test]
    async fn test_failed_persist_keeps_previous_rows() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be written as a file.
        let wb = MemoryWorkbook {
            sheets: RwLock::new(vec![sheet(&[&["a"], &["1"]])]),
            path: Some(dir.path().to_path_buf()),
        };
        let info = wb.sheets().await.unwrap().remove(0);

        assert!(matches!(wb.append_row(&info, vec!["2".into()]).await, Err(SheetError::Io(_))));
        assert!(wb.write_row(&info, 2, vec!["x".into()]).await.is_err());
        assert!(wb.delete_row(&info, 2).await.is_err());

        let all = wb.read_range(&info, CellRange::whole("t")).await.unwrap();
        assert_eq!(all, vec![vec!["a".to_string()], vec!["1".to_string()]]);
    }
}

use std::fmt;

/// A cell range in A1 notation, scoped to one sheet.
///
/// Rows and columns are stored 1-based / 0-based respectively, matching how
/// people read a sheet (`A1`) and how rows are indexed in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRange {
    pub sheet_title: String,
    /// First row, 1-based. `None` selects the whole sheet.
    pub start_row: Option<usize>,
    /// Last row, 1-based and inclusive. `None` means open ended.
    pub end_row: Option<usize>,
    /// First column, 0-based.
    pub start_col: usize,
    /// Last column, 0-based and inclusive. `None` means open ended.
    pub end_col: Option<usize>,
}

impl CellRange {
    /// Every populated cell of the sheet.
    pub fn whole(sheet_title: &str) -> Self {
        Self {
            sheet_title: sheet_title.to_string(),
            start_row: None,
            end_row: None,
            start_col: 0,
            end_col: None,
        }
    }

    /// Rows `first..=last` across columns `0..=last_col`.
    pub fn rows(sheet_title: &str, first: usize, last: usize, last_col: usize) -> Self {
        Self {
            sheet_title: sheet_title.to_string(),
            start_row: Some(first.max(1)),
            end_row: Some(last.max(first.max(1))),
            start_col: 0,
            end_col: Some(last_col),
        }
    }

    /// A single row, starting at column A and spanning `width` columns.
    pub fn row(sheet_title: &str, row_number: usize, width: usize) -> Self {
        Self::rows(sheet_title, row_number, row_number, width.saturating_sub(1))
    }

    /// Does the range include the given 1-based row and 0-based column?
    pub fn contains(&self, row_number: usize, col: usize) -> bool {
        let row_ok = match (self.start_row, self.end_row) {
            (None, _) => true,
            (Some(start), None) => row_number >= start,
            (Some(start), Some(end)) => row_number >= start && row_number <= end,
        };
        let col_ok = col >= self.start_col && self.end_col.map_or(true, |end| col <= end);
        row_ok && col_ok
    }

    fn quoted_title(&self) -> String {
        format!("'{}'", self.sheet_title.replace('\'', "''"))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = self.quoted_title();
        let Some(start) = self.start_row else {
            return write!(f, "{title}");
        };
        let first = format!("{}{}", column_letters(self.start_col), start);
        match (self.end_col, self.end_row) {
            (Some(col), Some(end)) => write!(f, "{title}!{first}:{}{}", column_letters(col), end),
            (Some(col), None) => write!(f, "{title}!{first}:{}", column_letters(col)),
            (None, Some(end)) => write!(f, "{title}!{first}:{end}"),
            (None, None) => write!(f, "{title}!{first}"),
        }
    }
}

/// Spreadsheet column name for a 0-based index: 0 → `A`, 25 → `Z`, 26 → `AA`.
pub fn column_letters(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

use crate::sheets::SheetInfo;

/// How to find an entity's tab inside the document: by title, then by gid,
/// then by position.
#[derive(Debug, Clone)]
pub struct SheetSelector {
    pub titles: Vec<String>,
    pub gid: Option<i64>,
    pub indices: Vec<usize>,
}

impl SheetSelector {
    pub fn new(titles: &[&str], gid: Option<i64>, indices: &[usize]) -> Self {
        Self {
            titles: titles.iter().map(|t| (*t).to_string()).collect(),
            gid,
            indices: indices.to_vec(),
        }
    }

    pub fn select<'a>(&self, sheets: &'a [SheetInfo]) -> Option<&'a SheetInfo> {
        self.titles
            .iter()
            .find_map(|title| sheets.iter().find(|s| &s.title == title))
            .or_else(|| {
                self.gid
                    .and_then(|gid| sheets.iter().find(|s| s.sheet_id == gid))
            })
            .or_else(|| {
                self.indices
                    .iter()
                    .find_map(|i| sheets.iter().find(|s| s.index == *i))
            })
    }
}

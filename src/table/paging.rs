use serde::Serialize;

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 1000;

/// Requested window over a filtered record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl PageRequest {
    /// Clamp raw query values: page ≥ 1, limit in `1..=MAX_LIMIT`.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.filter(|p| *p >= 1).map_or(1, |p| p as usize);
        let limit = limit
            .map_or(DEFAULT_LIMIT as i64, |l| l.clamp(1, MAX_LIMIT as i64))
            as usize;
        Self { page, limit }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Pagination fields reported next to every list payload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

/// Slice one page out of `items`, which must already be filtered.
pub fn paginate<T>(items: Vec<T>, req: PageRequest) -> (Vec<T>, PageMeta) {
    let total = items.len();
    let start = (req.page - 1).saturating_mul(req.limit);
    let page: Vec<T> = items.into_iter().skip(start).take(req.limit).collect();

    let meta = PageMeta {
        total,
        page: req.page,
        limit: req.limit,
        total_pages: total.div_ceil(req.limit),
        has_next_page: req.page.saturating_mul(req.limit) < total,
        has_prev_page: req.page > 1,
    };
    (page, meta)
}

/// Meta for a fallback set served as the only page.
pub fn single_page(total: usize, limit: usize) -> PageMeta {
    PageMeta {
        total,
        page: 1,
        limit,
        total_pages: 1,
        has_next_page: false,
        has_prev_page: false,
    }
}

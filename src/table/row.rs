//! Reading typed fields out of a header-addressed row.

/// A record field and the column names it may appear under, in priority
/// order. The first alias is the canonical English name.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: &'static str,
    pub aliases: &'static [&'static str],
}

impl FieldSpec {
    pub const fn new(field: &'static str, aliases: &'static [&'static str]) -> Self {
        Self { field, aliases }
    }
}

/// Column names that may hold an explicit row identifier.
pub const ID_ALIASES: &[&str] = &["id", "STT", "ID"];

/// Resolved header row of a sheet.
#[derive(Debug, Clone, Default)]
pub struct Columns {
    headers: Vec<String>,
}

impl Columns {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Column of one alias: exact match first, then case-insensitive.
    pub fn position(&self, alias: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h == alias)
            .or_else(|| {
                let lower = alias.to_lowercase();
                self.headers.iter().position(|h| h.to_lowercase() == lower)
            })
    }

    /// Column a field is written to: the first alias present in the header.
    pub fn write_position(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|alias| self.position(alias))
    }

    pub fn view<'a>(&'a self, cells: &'a [String]) -> RowView<'a> {
        RowView { columns: self, cells }
    }
}

/// One data row addressed by header name.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    columns: &'a Columns,
    cells: &'a [String],
}

impl<'a> RowView<'a> {
    /// First non-empty trimmed value among the aliases' columns.
    pub fn get(&self, aliases: &[&str]) -> Option<&'a str> {
        aliases.iter().find_map(|alias| {
            let col = self.columns.position(alias)?;
            let value = self.cells.get(col)?.trim();
            (!value.is_empty()).then_some(value)
        })
    }

    pub fn text(&self, spec: &FieldSpec) -> String {
        self.get(spec.aliases).unwrap_or_default().to_string()
    }

    pub fn text_or(&self, spec: &FieldSpec, default: &str) -> String {
        self.get(spec.aliases).unwrap_or(default).to_string()
    }

    pub fn int(&self, spec: &FieldSpec) -> i64 {
        self.get(spec.aliases).and_then(parse_int).unwrap_or(0)
    }

    pub fn float(&self, spec: &FieldSpec) -> f64 {
        self.get(spec.aliases).and_then(parse_float).unwrap_or(0.0)
    }

    /// Explicit identifier, when an id column holds a number.
    pub fn explicit_id(&self) -> Option<i64> {
        self.get(ID_ALIASES).and_then(parse_int)
    }

    /// Does any cell hold content?
    pub fn has_data(&self) -> bool {
        self.cells.iter().any(|c| !c.trim().is_empty())
    }
}

/// Leading-integer parse: optional sign then digits, rest ignored.
/// `"12 cái"` → 12, `"1,5"` → 1, `"abc"` → `None`.
pub fn parse_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Leading-decimal parse: sign, digits, optional fraction and exponent.
/// `"15000"` → 15000.0, `"12.5kg"` → 12.5, `".5"` → 0.5.
pub fn parse_float(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'-' | b'+')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start || has_digits {
            has_digits |= frac_end > frac_start;
            end = frac_end;
        }
    }
    if !has_digits {
        return None;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'-' | b'+') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }
    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: FieldSpec = FieldSpec::new("name", &["name", "Họ và tên", "Name", "Tên"]);
    const STOCK: FieldSpec = FieldSpec::new("stock_quantity", &["stock_quantity", "Tồn kho"]);

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_alias_priority_skips_empty_cells() {
        let columns = Columns::new(strings(&["STT", "name", "Họ và tên"]));
        let cells = strings(&["4", "  ", "Nguyễn Thị Lan"]);
        let row = columns.view(&cells);
        assert_eq!(row.text(&NAME), "Nguyễn Thị Lan");
        assert_eq!(row.explicit_id(), Some(4));
    }

    #[test]
    fn test_case_insensitive_fallback() {
        let columns = Columns::new(strings(&["NAME", "TỒN KHO"]));
        let cells = strings(&["Lan", "12"]);
        let row = columns.view(&cells);
        assert_eq!(row.text(&NAME), "Lan");
        assert_eq!(row.int(&STOCK), 12);
        assert_eq!(columns.write_position(NAME.aliases), Some(0));
    }

    #[test]
    fn test_missing_columns_default() {
        let columns = Columns::new(strings(&["email"]));
        let cells = strings(&["a@b.c"]);
        let row = columns.view(&cells);
        assert_eq!(row.text(&NAME), "");
        assert_eq!(row.text_or(&NAME, "active"), "active");
        assert_eq!(row.int(&STOCK), 0);
        assert_eq!(row.explicit_id(), None);
    }

    #[test]
    fn test_short_row_is_tolerated() {
        let columns = Columns::new(strings(&["id", "name", "email"]));
        let cells = strings(&["9"]);
        let row = columns.view(&cells);
        assert_eq!(row.text(&NAME), "");
        assert!(row.has_data());
    }

    #[test]
    fn test_parse_int_leading_digits() {
        assert_eq!(parse_int("12"), Some(12));
        assert_eq!(parse_int(" 12 cái"), Some(12));
        assert_eq!(parse_int("1,5"), Some(1));
        assert_eq!(parse_int("-3"), Some(-3));
        assert_eq!(parse_int("7.9"), Some(7));
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("-"), None);
    }

    #[test]
    fn test_parse_float_leading_number() {
        assert_eq!(parse_float("15000"), Some(15000.0));
        assert_eq!(parse_float("12.5kg"), Some(12.5));
        assert_eq!(parse_float(".5"), Some(0.5));
        assert_eq!(parse_float("3."), Some(3.0));
        assert_eq!(parse_float("1e3"), Some(1000.0));
        assert_eq!(parse_float("2e"), Some(2.0));
        assert_eq!(parse_float("-0.25"), Some(-0.25));
        assert_eq!(parse_float("."), None);
        assert_eq!(parse_float("giá"), None);
    }
}

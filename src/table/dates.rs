use chrono::{DateTime, NaiveDate};

use super::row::parse_int;

/// Parse a date cell. Sheets hold either `dd/mm/yyyy` or ISO `yyyy-mm-dd`,
/// sometimes with a trailing time.
pub fn parse_sheet_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.contains('/') {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 3 {
            return None;
        }
        let day = parse_int(parts[0])?;
        let month = parse_int(parts[1])?;
        let year = parse_int(parts[2])?;
        return NaiveDate::from_ymd_opt(
            i32::try_from(year).ok()?,
            u32::try_from(month).ok()?,
            u32::try_from(day).ok()?,
        );
    }
    if s.contains('-') {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.date_naive());
        }
        let head = s.get(..10).unwrap_or(s);
        return NaiveDate::parse_from_str(head, "%Y-%m-%d").ok();
    }
    None
}

/// `YYYY-MM` of a date cell, if it parses.
pub fn month_key(raw: &str) -> Option<String> {
    parse_sheet_date(raw).map(|d| d.format("%Y-%m").to_string())
}

/// Normalise user-entered dates to `YYYY-MM-DD`.
pub fn normalize_date(raw: &str) -> Option<String> {
    parse_sheet_date(raw).map(|d| d.format("%Y-%m-%d").to_string())
}

/// The server's current date as `YYYY-MM-DD`.
pub fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slash_dates() {
        assert_eq!(parse_sheet_date("15/06/2025"), NaiveDate::from_ymd_opt(2025, 6, 15));
        assert_eq!(parse_sheet_date("1/7/2025"), NaiveDate::from_ymd_opt(2025, 7, 1));
        assert_eq!(parse_sheet_date("1/7/2025 10:30"), NaiveDate::from_ymd_opt(2025, 7, 1));
        assert_eq!(parse_sheet_date("31/02/2025"), None);
        assert_eq!(parse_sheet_date("06/2025"), None);
    }

    #[test]
    fn test_parse_iso_dates() {
        assert_eq!(parse_sheet_date("2025-06-15"), NaiveDate::from_ymd_opt(2025, 6, 15));
        assert_eq!(parse_sheet_date("2025-06-15 08:00:00"), NaiveDate::from_ymd_opt(2025, 6, 15));
        assert_eq!(
            parse_sheet_date("2025-06-15T23:00:00+07:00"),
            NaiveDate::from_ymd_opt(2025, 6, 15)
        );
        assert_eq!(parse_sheet_date("15.06.2025"), None);
        assert_eq!(parse_sheet_date(""), None);
    }

    #[test]
    fn test_month_key_and_normalize() {
        assert_eq!(month_key("03/11/2024").as_deref(), Some("2024-11"));
        assert_eq!(month_key("2025-01-09").as_deref(), Some("2025-01"));
        assert_eq!(month_key("sometime"), None);
        assert_eq!(normalize_date("9/1/2025").as_deref(), Some("2025-01-09"));
    }

    #[test]
    fn test_today_shape() {
        let t = today();
        assert_eq!(t.len(), 10);
        assert!(NaiveDate::parse_from_str(&t, "%Y-%m-%d").is_ok());
    }
}

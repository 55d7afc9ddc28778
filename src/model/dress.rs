//! Custom dress jobs: who designed which part, how long fitting and pinning
//! took, which branch ordered it.

use serde::{Deserialize, Serialize};

use super::{assign, contains_ci, loose_int, loose_text, query_int, required, search_term, InputError};
use crate::table::{dates, FieldSpec, Record, RowView};

pub const BRANCHES: [&str; 6] = [
    "LINH NGA Hà Nội",
    "LINH NGA HCM",
    "KHÁCH SỈ TQ",
    "SHILA HVH",
    "SHILA NTMK",
    "KHÁC SỈ TQ",
];

pub const DRESS_TYPES: [&str; 18] = [
    "LUXURY - LÊN MỚI",
    "LUXURY - LÊN LẠI",
    "LIMITED - LÊN MỚI",
    "LIMITED - LÊN LẠI",
    "ĐI BÀN - LÊN MỚI",
    "ĐI BÀN - LÊN LẠI",
    "ÁO DÀI - LÊN MỚI",
    "ÁO DÀI - LÊN LẠI",
    "EM BÉ",
    "2IN1 - LÊN MỚI",
    "2IN1 - LÊN LẠI",
    "VÁY SỈ",
    "PHỤ KIỆN",
    "TRUNG BÌNH - LỄ LÊN MỚI",
    "TRUNG BÌNH - LỄ LÊN LẠI",
    "TRUNG BÌNH - BÀN LÊN MỚI",
    "TRUNG BÌNH - BÀN LÊN LẠI",
    "HAUTE COUTURE",
];

pub const DEFAULT_BRANCH: &str = BRANCHES[0];
pub const DEFAULT_DRESS_TYPE: &str = DRESS_TYPES[0];

const DATE: FieldSpec = FieldSpec::new("date", &["date", "Date", "Ngày"]);
const DRESS_CODE: FieldSpec = FieldSpec::new("dress_code", &["dress_code", "Mã váy"]);
const DRESS_DESCRIPTION: FieldSpec = FieldSpec::new("dress_description", &["dress_description", "Mô tả váy"]);
const BRANCH: FieldSpec = FieldSpec::new("branch", &["branch", "Chi nhánh"]);
const DRESS_TYPE: FieldSpec = FieldSpec::new("dress_type", &["dress_type", "Loại váy"]);
const DESIGNER30: FieldSpec = FieldSpec::new("designer30", &["designer30", "Designer30"]);
const DESIGNER100: FieldSpec = FieldSpec::new("designer100", &["designer100", "Designer100"]);
const DESIGNER60: FieldSpec = FieldSpec::new("designer60", &["designer60", "Designer60"]);
const DESIGNER20: FieldSpec = FieldSpec::new("designer20", &["designer20", "Designer20"]);
const DESIGNER20_2: FieldSpec = FieldSpec::new("designer20_2", &["designer20_2", "Designer20_2"]);
const TIME_DAP: FieldSpec = FieldSpec::new("time_dap", &["time_dap", "TimeDap"]);
const STATUS: FieldSpec = FieldSpec::new("status", &["status", "Status", "Trạng thái"]);
const TIME_DINH: FieldSpec = FieldSpec::new("time_dinh", &["time_dinh", "TimeDinh"]);
const TEAM_DINH: FieldSpec = FieldSpec::new("team_dinh", &["team_dinh", "TeamDinh"]);
const CREATED_AT: FieldSpec = FieldSpec::new("created_at", &["created_at", "CREATED_AT", "Ngày tạo"]);

static FIELDS: [FieldSpec; 15] = [
    DATE,
    DRESS_CODE,
    DRESS_DESCRIPTION,
    BRANCH,
    DRESS_TYPE,
    DESIGNER30,
    DESIGNER100,
    DESIGNER60,
    DESIGNER20,
    DESIGNER20_2,
    TIME_DAP,
    STATUS,
    TIME_DINH,
    TEAM_DINH,
    CREATED_AT,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dress {
    pub id: i64,
    pub date: String,
    pub dress_code: String,
    pub dress_description: String,
    pub branch: String,
    pub dress_type: String,
    pub designer30: String,
    pub designer100: String,
    pub designer60: String,
    pub designer20: String,
    pub designer20_2: String,
    pub time_dap: i64,
    pub status: String,
    pub time_dinh: i64,
    pub team_dinh: String,
    pub created_at: String,
}

impl Dress {
    pub fn designers(&self) -> [&str; 5] {
        [
            &self.designer30,
            &self.designer100,
            &self.designer60,
            &self.designer20,
            &self.designer20_2,
        ]
    }

    /// `YYYY-MM` of the job date, when the date cell parses.
    pub fn month(&self) -> Option<String> {
        dates::month_key(&self.date)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateDressRequest {
    #[serde(default, deserialize_with = "loose_text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub dress_code: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub dress_description: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub branch: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub dress_type: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub designer30: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub designer100: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub designer60: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub designer20: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub designer20_2: Option<String>,
    #[serde(default, deserialize_with = "loose_int")]
    pub time_dap: Option<i64>,
    #[serde(default, deserialize_with = "loose_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "loose_int")]
    pub time_dinh: Option<i64>,
    #[serde(default, deserialize_with = "loose_text")]
    pub team_dinh: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateDressRequest {
    #[serde(default, deserialize_with = "loose_text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub dress_code: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub dress_description: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub branch: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub dress_type: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub designer30: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub designer100: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub designer60: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub designer20: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub designer20_2: Option<String>,
    #[serde(default, deserialize_with = "loose_int")]
    pub time_dap: Option<i64>,
    #[serde(default, deserialize_with = "loose_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "loose_int")]
    pub time_dinh: Option<i64>,
    #[serde(default, deserialize_with = "loose_text")]
    pub team_dinh: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub created_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DressQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub month: Option<String>,
    pub designer: Option<String>,
    pub time_dap: Option<String>,
    pub time_dinh: Option<String>,
}

/// List filters for dresses. Every set filter must match.
#[derive(Debug, Default, Clone)]
pub struct DressFilter {
    pub search: Option<String>,
    pub month: Option<String>,
    pub designer: Option<String>,
    pub time_dap: Option<i64>,
    pub time_dinh: Option<i64>,
}

/// Blank date stays blank; anything else must parse.
fn job_date(raw: Option<String>) -> Result<String, InputError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(String::new()),
        Some(s) => dates::normalize_date(s).ok_or_else(|| InputError::Invalid {
            field: "date",
            reason: format!("\"{s}\" is not a date"),
        }),
    }
}

fn listed_or_warn(value: &str, known: &[&str], field: &'static str) {
    if !known.contains(&value) {
        tracing::warn!(field, value, "Value outside the known list");
    }
}

fn text_or(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

impl CreateDressRequest {
    pub fn into_dress(self, today: &str) -> Result<Dress, InputError> {
        let dress_code = required(self.dress_code, "dress_code")?;
        let date = job_date(self.date)?;
        let branch = text_or(self.branch, DEFAULT_BRANCH);
        let dress_type = text_or(self.dress_type, DEFAULT_DRESS_TYPE);
        listed_or_warn(&branch, &BRANCHES, "branch");
        listed_or_warn(&dress_type, &DRESS_TYPES, "dress_type");

        Ok(Dress {
            id: 0,
            date,
            dress_code,
            dress_description: self.dress_description.unwrap_or_default(),
            branch,
            dress_type,
            designer30: self.designer30.unwrap_or_default(),
            designer100: self.designer100.unwrap_or_default(),
            designer60: self.designer60.unwrap_or_default(),
            designer20: self.designer20.unwrap_or_default(),
            designer20_2: self.designer20_2.unwrap_or_default(),
            time_dap: self.time_dap.unwrap_or(0),
            status: text_or(self.status, "active"),
            time_dinh: self.time_dinh.unwrap_or(0),
            team_dinh: self.team_dinh.unwrap_or_default(),
            created_at: today.to_string(),
        })
    }
}

impl UpdateDressRequest {
    fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.dress_code.is_none()
            && self.dress_description.is_none()
            && self.branch.is_none()
            && self.dress_type.is_none()
            && self.designer30.is_none()
            && self.designer100.is_none()
            && self.designer60.is_none()
            && self.designer20.is_none()
            && self.designer20_2.is_none()
            && self.time_dap.is_none()
            && self.status.is_none()
            && self.time_dinh.is_none()
            && self.team_dinh.is_none()
            && self.created_at.is_none()
    }

    pub fn into_change(self) -> Result<impl FnOnce(&mut Dress) -> Vec<&'static str>, InputError> {
        if self.is_empty() {
            return Err(InputError::EmptyUpdate);
        }
        let date = self.date.map(|d| job_date(Some(d))).transpose()?;
        if let Some(branch) = &self.branch {
            listed_or_warn(branch, &BRANCHES, "branch");
        }
        if let Some(dress_type) = &self.dress_type {
            listed_or_warn(dress_type, &DRESS_TYPES, "dress_type");
        }

        Ok(move |d: &mut Dress| {
            let mut changed = Vec::new();
            assign(&mut d.date, date, "date", &mut changed);
            assign(&mut d.dress_code, self.dress_code, "dress_code", &mut changed);
            assign(&mut d.dress_description, self.dress_description, "dress_description", &mut changed);
            assign(&mut d.branch, self.branch, "branch", &mut changed);
            assign(&mut d.dress_type, self.dress_type, "dress_type", &mut changed);
            assign(&mut d.designer30, self.designer30, "designer30", &mut changed);
            assign(&mut d.designer100, self.designer100, "designer100", &mut changed);
            assign(&mut d.designer60, self.designer60, "designer60", &mut changed);
            assign(&mut d.designer20, self.designer20, "designer20", &mut changed);
            assign(&mut d.designer20_2, self.designer20_2, "designer20_2", &mut changed);
            assign(&mut d.time_dap, self.time_dap, "time_dap", &mut changed);
            assign(&mut d.status, self.status, "status", &mut changed);
            assign(&mut d.time_dinh, self.time_dinh, "time_dinh", &mut changed);
            assign(&mut d.team_dinh, self.team_dinh, "team_dinh", &mut changed);
            assign(&mut d.created_at, self.created_at, "created_at", &mut changed);
            changed
        })
    }
}

impl DressFilter {
    pub fn from_query(query: &DressQuery) -> Result<Self, InputError> {
        let month = query
            .month
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string);
        Ok(Self {
            search: search_term(query.search.as_deref()),
            month,
            designer: search_term(query.designer.as_deref()),
            time_dap: query_int(query.time_dap.as_deref(), "time_dap")?,
            time_dinh: query_int(query.time_dinh.as_deref(), "time_dinh")?,
        })
    }

    pub fn matches(&self, dress: &Dress) -> bool {
        if let Some(term) = &self.search {
            let hit = [
                &dress.dress_code,
                &dress.dress_description,
                &dress.branch,
                &dress.dress_type,
            ]
            .iter()
            .any(|field| contains_ci(field, term));
            if !hit {
                return false;
            }
        }
        if let Some(month) = &self.month {
            if dress.month().as_deref() != Some(month.as_str()) {
                return false;
            }
        }
        if let Some(designer) = &self.designer {
            if !dress.designers().iter().any(|name| contains_ci(name, designer)) {
                return false;
            }
        }
        if self.time_dap.is_some_and(|t| dress.time_dap != t) {
            return false;
        }
        if self.time_dinh.is_some_and(|t| dress.time_dinh != t) {
            return false;
        }
        true
    }
}

impl Record for Dress {
    const KIND: &'static str = "Dress";

    fn fields() -> &'static [FieldSpec] {
        &FIELDS
    }

    fn from_row(id: i64, row: &RowView<'_>) -> Self {
        Self {
            id,
            date: row.text(&DATE),
            dress_code: row.text(&DRESS_CODE),
            dress_description: row.text(&DRESS_DESCRIPTION),
            branch: row.text(&BRANCH),
            dress_type: row.text(&DRESS_TYPE),
            designer30: row.text(&DESIGNER30),
            designer100: row.text(&DESIGNER100),
            designer60: row.text(&DESIGNER60),
            designer20: row.text(&DESIGNER20),
            designer20_2: row.text(&DESIGNER20_2),
            time_dap: row.int(&TIME_DAP),
            status: row.text_or(&STATUS, "active"),
            time_dinh: row.int(&TIME_DINH),
            team_dinh: row.text(&TEAM_DINH),
            created_at: row
                .get(CREATED_AT.aliases)
                .map_or_else(dates::today, str::to_string),
        }
    }

    fn cell(&self, field: &str) -> String {
        match field {
            "date" => self.date.clone(),
            "dress_code" => self.dress_code.clone(),
            "dress_description" => self.dress_description.clone(),
            "branch" => self.branch.clone(),
            "dress_type" => self.dress_type.clone(),
            "designer30" => self.designer30.clone(),
            "designer100" => self.designer100.clone(),
            "designer60" => self.designer60.clone(),
            "designer20" => self.designer20.clone(),
            "designer20_2" => self.designer20_2.clone(),
            "time_dap" => self.time_dap.to_string(),
            "status" => self.status.clone(),
            "time_dinh" => self.time_dinh.to_string(),
            "team_dinh" => self.team_dinh.clone(),
            "created_at" => self.created_at.clone(),
            _ => String::new(),
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn is_blank(&self) -> bool {
        self.dress_code.trim().is_empty()
    }

    fn fallback() -> Vec<Self> {
        vec![Dress {
            id: 1,
            date: "2025-06-15".to_string(),
            dress_code: "DR001".to_string(),
            dress_description: "Váy cưới luxury".to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            dress_type: DEFAULT_DRESS_TYPE.to_string(),
            designer30: "John Doe".to_string(),
            designer100: "Jane Smith".to_string(),
            designer60: "Mike Johnson".to_string(),
            designer20: "Sarah Wilson".to_string(),
            designer20_2: "Tom Brown".to_string(),
            time_dap: 0,
            status: "active".to_string(),
            time_dinh: 0,
            team_dinh: "Team A".to_string(),
            created_at: "2025-06-15".to_string(),
        }]
    }
}

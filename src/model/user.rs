use serde::{Deserialize, Serialize};

use super::{assign, contains_ci, loose_text, required, search_term, InputError};
use crate::table::{FieldSpec, Record, RowView};

pub const STATUSES: [&str; 3] = ["active", "inactive", "pending"];

const NAME: FieldSpec = FieldSpec::new("name", &["name", "Họ và tên", "Name", "Tên"]);
const EMAIL: FieldSpec = FieldSpec::new("email", &["email", "Email"]);
const PHONE: FieldSpec = FieldSpec::new("phone", &["phone", "Số điện thoại", "Phone", "SĐT"]);
const COMPANY: FieldSpec = FieldSpec::new("company", &["company", "Công ty", "Company"]);
const POSITION: FieldSpec = FieldSpec::new("position", &["position", "Chức vụ", "Position", "Vị trí"]);
const STATUS: FieldSpec = FieldSpec::new("status", &["status", "Trạng thái", "Status"]);
const CREATED_AT: FieldSpec = FieldSpec::new("created_at", &["created_at", "Ngày tạo", "Created", "Date"]);

static FIELDS: [FieldSpec; 7] = [NAME, EMAIL, PHONE, COMPANY, POSITION, STATUS, CREATED_AT];

/// Staff member row from the users sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub position: String,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default, deserialize_with = "loose_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "loose_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub created_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
}

/// List filters for users.
#[derive(Debug, Default, Clone)]
pub struct UserFilter {
    pub search: Option<String>,
    pub status: Option<String>,
}

fn check_status(status: &str) -> Result<String, InputError> {
    let status = status.trim().to_lowercase();
    if STATUSES.contains(&status.as_str()) {
        Ok(status)
    } else {
        Err(InputError::Invalid {
            field: "status",
            reason: format!("expected one of {}", STATUSES.join(", ")),
        })
    }
}

impl CreateUserRequest {
    pub fn into_user(self, today: &str) -> Result<User, InputError> {
        let name = required(self.name, "name")?;
        let email = required(self.email, "email")?;
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => "active".to_string(),
            Some(s) => check_status(s)?,
        };

        Ok(User {
            id: 0,
            name,
            email,
            phone: self.phone.unwrap_or_default(),
            company: self.company.unwrap_or_default(),
            position: self.position.unwrap_or_default(),
            status,
            created_at: today.to_string(),
        })
    }
}

impl UpdateUserRequest {
    /// Validate, then produce a closure applying the change to a user.
    pub fn into_change(self) -> Result<impl FnOnce(&mut User) -> Vec<&'static str>, InputError> {
        if self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.company.is_none()
            && self.position.is_none()
            && self.status.is_none()
            && self.created_at.is_none()
        {
            return Err(InputError::EmptyUpdate);
        }
        let status = self.status.as_deref().map(check_status).transpose()?;

        Ok(move |user: &mut User| {
            let mut changed = Vec::new();
            assign(&mut user.name, self.name, "name", &mut changed);
            assign(&mut user.email, self.email, "email", &mut changed);
            assign(&mut user.phone, self.phone, "phone", &mut changed);
            assign(&mut user.company, self.company, "company", &mut changed);
            assign(&mut user.position, self.position, "position", &mut changed);
            assign(&mut user.status, status, "status", &mut changed);
            assign(&mut user.created_at, self.created_at, "created_at", &mut changed);
            changed
        })
    }
}

impl UserFilter {
    pub fn from_query(query: &UserQuery) -> Self {
        Self {
            search: search_term(query.search.as_deref()),
            status: query
                .status
                .as_deref()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty()),
        }
    }

    pub fn matches(&self, user: &User) -> bool {
        if let Some(term) = &self.search {
            let hit = [&user.name, &user.email, &user.company, &user.position]
                .iter()
                .any(|field| contains_ci(field, term));
            if !hit {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if !user.status.eq_ignore_ascii_case(status) {
                return false;
            }
        }
        true
    }
}

impl Record for User {
    const KIND: &'static str = "User";

    fn fields() -> &'static [FieldSpec] {
        &FIELDS
    }

    fn from_row(id: i64, row: &RowView<'_>) -> Self {
        Self {
            id,
            name: row.text(&NAME),
            email: row.text(&EMAIL),
            phone: row.text(&PHONE),
            company: row.text(&COMPANY),
            position: row.text(&POSITION),
            status: row.text_or(&STATUS, "active"),
            created_at: row
                .get(CREATED_AT.aliases)
                .map_or_else(crate::table::dates::today, str::to_string),
        }
    }

    fn cell(&self, field: &str) -> String {
        match field {
            "name" => self.name.clone(),
            "email" => self.email.clone(),
            "phone" => self.phone.clone(),
            "company" => self.company.clone(),
            "position" => self.position.clone(),
            "status" => self.status.clone(),
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
        self.name.trim().is_empty()
    }

    fn fallback() -> Vec<Self> {
        let user = |id, name: &str, email: &str, phone: &str, company: &str, position: &str, status: &str, created_at: &str| User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            company: company.to_string(),
            position: position.to_string(),
            status: status.to_string(),
            created_at: created_at.to_string(),
        };
        vec![
            user(1, "Nguyễn Văn An", "an.nguyen@company.com", "0901234567", "Công ty ABC", "Giám đốc", "active", "2024-01-15"),
            user(2, "Trần Thị Bình", "binh.tran@company.com", "0902345678", "Công ty XYZ", "Trưởng phòng", "active", "2024-01-16"),
            user(3, "Lê Văn Cường", "cuong.le@company.com", "0903456789", "Công ty DEF", "Nhân viên", "inactive", "2024-01-17"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Columns;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_from_vietnamese_headers() {
        let columns = Columns::new(strings(&["STT", "Họ và tên", "Email", "SĐT", "Công ty", "Chức vụ", "Trạng thái", "Ngày tạo"]));
        let cells = strings(&["5", "Phạm Thu Hà", "ha@linhnga.vn", "0911", "Linh Nga", "Thiết kế", "", "2024-03-01"]);
        let user = User::from_row(5, &columns.view(&cells));
        assert_eq!(user.name, "Phạm Thu Hà");
        assert_eq!(user.phone, "0911");
        assert_eq!(user.position, "Thiết kế");
        assert_eq!(user.status, "active");
        assert_eq!(user.created_at, "2024-03-01");
    }

    #[test]
    fn test_create_requires_name_and_email() {
        let err = CreateUserRequest::default().into_user("2025-01-01").unwrap_err();
        assert_eq!(err, InputError::Missing("name"));

        let req = CreateUserRequest {
            name: Some("Lan".into()),
            ..Default::default()
        };
        assert_eq!(req.into_user("2025-01-01").unwrap_err(), InputError::Missing("email"));
    }

    #[test]
    fn test_create_defaults_and_status_check() {
        let req = CreateUserRequest {
            name: Some("Lan".into()),
            email: Some("lan@x.vn".into()),
            ..Default::default()
        };
        let user = req.into_user("2025-01-01").unwrap();
        assert_eq!(user.status, "active");
        assert_eq!(user.created_at, "2025-01-01");

        let req = CreateUserRequest {
            name: Some("Lan".into()),
            email: Some("lan@x.vn".into()),
            status: Some("archived".into()),
            ..Default::default()
        };
        assert!(matches!(req.into_user("2025-01-01"), Err(InputError::Invalid { field: "status", .. })));
    }

    #[test]
    fn test_update_rules() {
        assert!(matches!(UpdateUserRequest::default().into_change(), Err(InputError::EmptyUpdate)));

        let mut user = User::fallback().remove(0);
        let change = UpdateUserRequest {
            status: Some("Pending".into()),
            phone: Some("0999".into()),
            ..Default::default()
        }
        .into_change()
        .unwrap();
        assert_eq!(change(&mut user), vec!["phone", "status"]);
        assert_eq!(user.status, "pending");
        assert_eq!(user.phone, "0999");
        assert_eq!(user.name, "Nguyễn Văn An");
    }

    #[test]
    fn test_filter_search_and_status() {
        let users = User::fallback();
        let filter = UserFilter::from_query(&UserQuery {
            search: Some("CÔNG TY x".into()),
            ..Default::default()
        });
        let hits: Vec<i64> = users.iter().filter(|u| filter.matches(u)).map(|u| u.id).collect();
        assert_eq!(hits, vec![2]);

        let filter = UserFilter::from_query(&UserQuery {
            status: Some("inactive".into()),
            ..Default::default()
        });
        let hits: Vec<i64> = users.iter().filter(|u| filter.matches(u)).map(|u| u.id).collect();
        assert_eq!(hits, vec![3]);
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Calendar date format accepted for `start_date` / `end_date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Builds a course that has not been persisted yet; id and timestamps
    /// are assigned by the repository on insert.
    pub fn new(name: String, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            name,
            start_date,
            end_date,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCourseRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

/// Partial update body. An absent (or `null`) field leaves the stored value unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCourseRequest {
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Column changes applied by a partial update, with dates already parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseChanges {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Query string of `GET /courses`.
///
/// `limit` and `page` stay raw so a non-numeric value behaves like an omitted one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListCoursesParams {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

impl ListCoursesParams {
    pub fn limit(&self) -> i64 {
        parse_lenient(self.limit.as_deref())
    }

    pub fn page(&self) -> i64 {
        parse_lenient(self.page.as_deref())
    }
}

fn parse_lenient(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

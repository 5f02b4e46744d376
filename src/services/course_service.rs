use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::db::CourseRepository;
use crate::error::{AppError, ValidationError};
use crate::models::{Course, CourseChanges, DATE_FORMAT};
use crate::pagination::CourseFilters;

/// Business rules above the repository: date parsing, date-range checks
/// and existence checks before destructive calls.
#[derive(Clone)]
pub struct CourseService {
    repo: Arc<dyn CourseRepository>,
}

impl CourseService {
    pub fn new(repo: Arc<dyn CourseRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, name: &str, start_date: &str, end_date: &str) -> Result<Course, AppError> {
        let start_date = parse_date(start_date, ValidationError::InvalidStartDate)?;
        let end_date = parse_date(end_date, ValidationError::InvalidEndDate)?;
        check_range(start_date, end_date)?;

        let course = self
            .repo
            .create(Course::new(name.to_string(), start_date, end_date))
            .await?;

        info!("created course {} ({})", course.id, course.name);
        Ok(course)
    }

    pub async fn get(&self, id: &str) -> Result<Course, AppError> {
        debug!("fetching course {}", id);
        self.repo.get(id).await
    }

    pub async fn get_all(&self, filters: &CourseFilters, offset: i64, limit: i64) -> Result<Vec<Course>, AppError> {
        self.repo.get_all(filters, offset, limit).await
    }

    pub async fn count(&self, filters: &CourseFilters) -> Result<i64, AppError> {
        self.repo.count(filters).await
    }

    /// Parses whichever dates are present before touching storage. When only
    /// one date is supplied the range is checked against the stored other one.
    pub async fn update(
        &self,
        id: &str,
        name: Option<String>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<(), AppError> {
        let start_date = start_date
            .map(|s| parse_date(s, ValidationError::InvalidStartDate))
            .transpose()?;
        let end_date = end_date
            .map(|s| parse_date(s, ValidationError::InvalidEndDate))
            .transpose()?;

        match (start_date, end_date) {
            (Some(start), Some(end)) => check_range(start, end)?,
            (Some(start), None) => check_range(start, self.repo.get(id).await?.end_date)?,
            (None, Some(end)) => check_range(self.repo.get(id).await?.start_date, end)?,
            (None, None) => {}
        }

        let changes = CourseChanges {
            name,
            start_date,
            end_date,
        };

        self.repo.update(id, changes).await
    }

    /// Checks existence first so a missing course is reported before the delete runs.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.repo.get(id).await?;
        self.repo.delete_by_id(id).await
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.repo.ping().await
    }
}

fn parse_date(raw: &str, on_error: ValidationError) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|err| {
        warn!("invalid {} {:?}: {}", on_error.field(), raw, err);
        on_error
    })
}

fn check_range(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), ValidationError> {
    if end_date < start_date {
        warn!("end date {} is before start date {}", end_date, start_date);
        return Err(ValidationError::EndBeforeStart);
    }
    Ok(())
}

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{AppError, PersistenceError};
use crate::models::{Course, CourseChanges};
use crate::pagination::{CourseFilters, search_key};

const COURSE_COLUMNS: &str = "SELECT id, name, start_date, end_date, created_at, updated_at FROM courses";

/// Storage boundary for courses. The service layer only sees this trait.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Persists a new course, assigning its id and timestamps.
    async fn create(&self, course: Course) -> Result<Course, AppError>;
    async fn get(&self, id: &str) -> Result<Course, AppError>;
    /// Courses matching `filters`, newest first, windowed by `offset`/`limit`.
    async fn get_all(&self, filters: &CourseFilters, offset: i64, limit: i64) -> Result<Vec<Course>, AppError>;
    /// Number of courses matching `filters`, ignoring pagination.
    async fn count(&self, filters: &CourseFilters) -> Result<i64, AppError>;
    /// Applies only the fields present in `changes`.
    async fn update(&self, id: &str, changes: CourseChanges) -> Result<(), AppError>;
    async fn delete_by_id(&self, id: &str) -> Result<(), AppError>;
    async fn ping(&self) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct SqliteCourseRepository {
    db: SqlitePool,
    query_timeout: Duration,
}

impl SqliteCourseRepository {
    pub fn new(db: SqlitePool, query_timeout: Duration) -> Self {
        Self { db, query_timeout }
    }

    /// Runs a storage call under the configured deadline.
    async fn timed<T, F>(&self, op: &'static str, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, sqlx::Error>> + Send,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                error!(op, "database error: {}", err);
                Err(err.into())
            }
            Err(_) => {
                error!(op, "storage call timed out after {:?}", self.query_timeout);
                Err(PersistenceError::Timeout(self.query_timeout).into())
            }
        }
    }
}

/// Single predicate builder shared by `count` and `get_all`, so the reported
/// total and the returned page always agree.
fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filters: &CourseFilters) {
    if let Some(pattern) = filters.name_pattern() {
        qb.push(" WHERE name_search LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\'");
    }
}

/// Fixed-width UTC timestamp so `created_at` sorts correctly as text.
fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

#[async_trait]
impl CourseRepository for SqliteCourseRepository {
    async fn create(&self, course: Course) -> Result<Course, AppError> {
        let now = Utc::now().trunc_subsecs(6);
        let course = Course {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            ..course
        };

        let query = sqlx::query(
            "INSERT INTO courses (id, name, name_search, start_date, end_date, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&course.id)
        .bind(&course.name)
        .bind(search_key(&course.name))
        .bind(course.start_date)
        .bind(course.end_date)
        .bind(timestamp(course.created_at))
        .bind(timestamp(course.updated_at));

        self.timed("create", query.execute(&self.db)).await?;

        info!("course created with id: {}", course.id);
        Ok(course)
    }

    async fn get(&self, id: &str) -> Result<Course, AppError> {
        let sql = format!("{COURSE_COLUMNS} WHERE id = ?");
        let query = sqlx::query_as::<_, Course>(&sql).bind(id);

        match self.timed("get", query.fetch_optional(&self.db)).await? {
            Some(course) => Ok(course),
            None => {
                warn!("course {} doesn't exist", id);
                Err(AppError::not_found(id))
            }
        }
    }

    async fn get_all(&self, filters: &CourseFilters, offset: i64, limit: i64) -> Result<Vec<Course>, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new(COURSE_COLUMNS);
        push_filters(&mut qb, filters);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let courses = self
            .timed("get_all", qb.build_query_as::<Course>().fetch_all(&self.db))
            .await?;

        debug!(offset, limit, returned = courses.len(), "listed courses");
        Ok(courses)
    }

    async fn count(&self, filters: &CourseFilters) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM courses");
        push_filters(&mut qb, filters);

        self.timed("count", qb.build_query_scalar::<i64>().fetch_one(&self.db))
            .await
    }

    async fn update(&self, id: &str, changes: CourseChanges) -> Result<(), AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE courses SET updated_at = ");
        qb.push_bind(timestamp(Utc::now().trunc_subsecs(6)));

        if let Some(name) = changes.name {
            qb.push(", name_search = ").push_bind(search_key(&name));
            qb.push(", name = ").push_bind(name);
        }
        if let Some(start_date) = changes.start_date {
            qb.push(", start_date = ").push_bind(start_date);
        }
        if let Some(end_date) = changes.end_date {
            qb.push(", end_date = ").push_bind(end_date);
        }
        qb.push(" WHERE id = ").push_bind(id.to_string());

        let result = self.timed("update", qb.build().execute(&self.db)).await?;

        if result.rows_affected() == 0 {
            warn!("course {} doesn't exist", id);
            return Err(AppError::not_found(id));
        }

        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), AppError> {
        let query = sqlx::query("DELETE FROM courses WHERE id = ?").bind(id);
        let result = self.timed("delete", query.execute(&self.db)).await?;

        if result.rows_affected() == 0 {
            warn!("course {} doesn't exist", id);
            return Err(AppError::not_found(id));
        }

        info!("course {} deleted", id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.timed("ping", sqlx::query("select 1").execute(&self.db))
            .await
            .map(|_| ())
    }
}

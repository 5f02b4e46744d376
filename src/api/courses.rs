use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use tracing::warn;

use crate::api::auth::Authorized;
use crate::api::response::Envelope;
use crate::error::{AppError, ValidationError};
use crate::models::{Course, CreateCourseRequest, ListCoursesParams, UpdateCourseRequest};
use crate::pagination::{CourseFilters, Meta};
use crate::state::AppState;

fn invalid_body(rejection: JsonRejection) -> AppError {
    warn!("undecodable request body: {}", rejection.body_text());
    AppError::BadRequest(format!("invalid request format: {}", rejection.body_text()))
}

/// Present-but-blank counts as missing.
fn require(value: &str, missing: ValidationError) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        warn!("{}", missing);
        return Err(missing);
    }
    Ok(())
}

pub async fn create_course(
    _: Authorized,
    State(state): State<AppState>,
    body: Result<Json<CreateCourseRequest>, JsonRejection>,
) -> Result<Envelope<Course>, AppError> {
    let Json(req) = body.map_err(invalid_body)?;

    require(&req.name, ValidationError::NameRequired)?;
    require(&req.start_date, ValidationError::StartDateRequired)?;
    require(&req.end_date, ValidationError::EndDateRequired)?;

    let course = state
        .service
        .create(&req.name, &req.start_date, &req.end_date)
        .await?;

    Ok(Envelope::created(course))
}

pub async fn list_courses(
    _: Authorized,
    State(state): State<AppState>,
    params: Result<Query<ListCoursesParams>, QueryRejection>,
) -> Result<Envelope<Vec<Course>>, AppError> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let filters = CourseFilters {
        name: params.name.clone(),
    };

    let total = state.service.count(&filters).await?;
    let meta = Meta::new(params.page(), params.limit(), total, &state.config.page);

    let courses = state
        .service
        .get_all(&filters, meta.offset(), meta.limit())
        .await?;

    Ok(Envelope::ok(courses).with_meta(meta))
}

pub async fn get_course(
    _: Authorized,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope<Course>, AppError> {
    let course = state.service.get(&id).await?;
    Ok(Envelope::ok(course))
}

pub async fn update_course(
    _: Authorized,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateCourseRequest>, JsonRejection>,
) -> Result<Envelope<Course>, AppError> {
    let Json(req) = body.map_err(invalid_body)?;

    if let Some(name) = &req.name {
        require(name, ValidationError::NameRequired)?;
    }
    if let Some(start_date) = &req.start_date {
        require(start_date, ValidationError::StartDateRequired)?;
    }
    if let Some(end_date) = &req.end_date {
        require(end_date, ValidationError::EndDateRequired)?;
    }

    state
        .service
        .update(
            &id,
            req.name,
            req.start_date.as_deref(),
            req.end_date.as_deref(),
        )
        .await?;

    let course = state.service.get(&id).await?;
    Ok(Envelope::ok(course))
}

pub async fn delete_course(
    _: Authorized,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope<()>, AppError> {
    state.service.delete(&id).await?;
    Ok(Envelope::empty())
}

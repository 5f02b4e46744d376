use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;

use crate::pagination::Meta;

/// `{status, data?, error?, meta?}` body shared by every course endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self::with_status(StatusCode::OK, Some(data))
    }

    pub fn created(data: T) -> Self {
        Self::with_status(StatusCode::CREATED, Some(data))
    }

    pub fn empty() -> Self {
        Self::with_status(StatusCode::OK, None)
    }

    pub fn error(status: StatusCode, message: String) -> Self {
        Self {
            status: status.as_u16(),
            data: None,
            error: Some(message),
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    fn with_status(status: StatusCode, data: Option<T>) -> Self {
        Self {
            status: status.as_u16(),
            data,
            error: None,
            meta: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tandem_core::ErrorBody;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("room not found")]
    RoomNotFound,
    #[error("room is full")]
    RoomFull,
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RoomNotFound => StatusCode::NOT_FOUND,
            Self::RoomFull => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

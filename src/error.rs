//! Errors surfaced by the store and by the HTTP handlers.
//!
//! Every [`ApiError`] is rendered as `{"erro": <message>}`. Store failures are
//! logged with their full detail and answered with a fixed message, so the
//! client never sees what went wrong inside the database.
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
    #[error("failed to encode document: {0}")]
    Encode(#[from] bson::ser::Error),
    #[error("store returned an unexpected document: {0}")]
    InvalidDocument(String),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{message}")]
    Store {
        message: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    /// Wraps a store failure with the message the client gets back.
    pub fn store(message: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store { message, source }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    erro: &'a str,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ApiError::Validation(message) | ApiError::NotFound(message) => *message,
            ApiError::Store { message, source } => {
                tracing::error!("{message}: {source}");
                *message
            }
        };
        HttpResponse::build(self.status_code()).json(ErrorBody { erro: message })
    }
}

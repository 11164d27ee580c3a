//! JSON request body extractor
//!
//! `axum::Json` rejects malformed bodies with a plain-text 4xx response.
//! [`AppJson`] turns the rejection into an [`AppError`] so every failure
//! carries the same `{code, message}` body.

use axum::extract::{FromRequest, Request};
use axum::extract::rejection::JsonRejection;
use serde::de::DeserializeOwned;

use super::{AppError, ErrorCode};

/// JSON body extractor with unified error responses
#[derive(Debug, Clone)]
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(rejection_to_error(rejection)),
        }
    }
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    let code = match &rejection {
        JsonRejection::MissingJsonContentType(_) => ErrorCode::InvalidRequest,
        _ => ErrorCode::InvalidFormat,
    };
    AppError::with_message(code, rejection.body_text())
}

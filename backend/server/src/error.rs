use axum::{
    Json,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{codec::CodecError, store::StoreError, validation::Violations};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("record does not exist")]
    NotExists,

    #[error("record already exists")]
    AlreadyExists,

    /// The detail is for logs only and never reaches a response body.
    #[error("storage failure: {0}")]
    StorageFailure(String),

    #[error("authentication failed")]
    AuthFailure,

    #[error("invalid input: {0:?}")]
    InvalidInput(Violations),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::StorageFailure(err.to_string())
    }
}

impl From<CodecError> for AppError {
    fn from(err: CodecError) -> Self {
        AppError::StorageFailure(err.to_string())
    }
}

impl AppError {
    /// Status for this error on a request made with `method`.
    ///
    /// | Kind           | GET | POST | PUT | DELETE |
    /// |----------------|-----|------|-----|--------|
    /// | AuthFailure    | 401 | 401  | 401 | 401    |
    /// | StorageFailure | 500 | 500  | 500 | 500    |
    /// | NotExists      | 404 | 404  | 204 | 404    |
    /// | AlreadyExists  |     | 409  |     |        |
    /// | InvalidInput   |     | 400  | 400 |        |
    ///
    /// Blank cells and any other method are 500.
    pub fn status_for(&self, method: &Method) -> StatusCode {
        match self {
            AppError::AuthFailure => StatusCode::UNAUTHORIZED,
            AppError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotExists => {
                if *method == Method::PUT {
                    StatusCode::NO_CONTENT
                } else if [Method::GET, Method::POST, Method::DELETE].contains(method) {
                    StatusCode::NOT_FOUND
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
            AppError::AlreadyExists => {
                if *method == Method::POST {
                    StatusCode::CONFLICT
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
            AppError::InvalidInput(_) => {
                if *method == Method::POST || *method == Method::PUT {
                    StatusCode::BAD_REQUEST
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        }
    }

    pub fn respond(self, method: Method) -> ErrorResponse {
        ErrorResponse {
            method,
            error: self,
        }
    }
}

/// An [`AppError`] bound to the method of the request it answers.
#[derive(Debug)]
pub struct ErrorResponse {
    method: Method,
    error: AppError,
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = self.error.status_for(&self.method);

        match self.error {
            AppError::InvalidInput(violations) if status == StatusCode::BAD_REQUEST => {
                (status, Json(violations)).into_response()
            }
            _ => status.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;
    use crate::validation::{DIFFICULTY, Violation};

    fn invalid() -> AppError {
        let mut violations = Violations::new();
        violations.insert(DIFFICULTY, Violation::OutOfRange);

        AppError::InvalidInput(violations)
    }

    async fn body_of(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), 1024).await.unwrap();

        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_status_table() {
        use Method as M;
        use StatusCode as S;

        let cases = [
            (AppError::AuthFailure, M::GET, S::UNAUTHORIZED),
            (AppError::AuthFailure, M::DELETE, S::UNAUTHORIZED),
            (AppError::StorageFailure("x".into()), M::PUT, S::INTERNAL_SERVER_ERROR),
            (AppError::NotExists, M::GET, S::NOT_FOUND),
            (AppError::NotExists, M::POST, S::NOT_FOUND),
            (AppError::NotExists, M::PUT, S::NO_CONTENT),
            (AppError::NotExists, M::DELETE, S::NOT_FOUND),
            (AppError::NotExists, M::PATCH, S::INTERNAL_SERVER_ERROR),
            (AppError::AlreadyExists, M::POST, S::CONFLICT),
            (AppError::AlreadyExists, M::PUT, S::INTERNAL_SERVER_ERROR),
            (invalid(), M::POST, S::BAD_REQUEST),
            (invalid(), M::PUT, S::BAD_REQUEST),
            (invalid(), M::GET, S::INTERNAL_SERVER_ERROR),
            (invalid(), M::DELETE, S::INTERNAL_SERVER_ERROR),
        ];

        for (error, method, status) in cases {
            assert_eq!(error.status_for(&method), status, "{error:?} on {method}");
        }
    }

    #[tokio::test]
    async fn test_invalid_input_body() {
        let response = invalid().respond(Method::POST).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_of(response).await, r#"{"difficulty":"out-of-range"}"#);
    }

    #[tokio::test]
    async fn test_unmapped_invalid_input_has_no_body() {
        let response = invalid().respond(Method::DELETE).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await, "");
    }

    #[tokio::test]
    async fn test_storage_detail_stays_private() {
        let response = AppError::StorageFailure("connection refused at 10.0.0.3".into())
            .respond(Method::GET)
            .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await, "");
    }

    #[test]
    fn test_store_errors_become_storage_failures() {
        let err: AppError = StoreError::Backend("boom".into()).into();

        assert!(matches!(err, AppError::StorageFailure(detail) if detail == "boom"));
    }
}

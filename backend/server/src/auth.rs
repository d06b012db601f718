//! # Basic Auth
//!
//! Mutating recipe routes require `Authorization: Basic <token>` where `<token>` is the
//! base64 `user:password` credential. The token itself is never stored: Redis holds
//! `TOKEN_<sha256 hex of token>` for every provisioned credential and a request passes
//! when that key exists.
//!
//! Header problems (missing, repeated, wrong scheme, extra parts) are answered with 401
//! before any service code runs.
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use crate::{error::AppError, logging::Logger, proxy::StorageProxy, state::AppState};

pub const SCHEME: &str = "Basic";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum HeaderError {
    #[error("missing authorization header")]
    Missing,

    #[error("more than one authorization header")]
    Repeated,

    #[error("authorization header is not `Basic <token>`")]
    Malformed,
}

pub fn basic_token(headers: &HeaderMap) -> Result<&str, HeaderError> {
    let mut values = headers.get_all(AUTHORIZATION).iter();

    let value = values.next().ok_or(HeaderError::Missing)?;
    if values.next().is_some() {
        return Err(HeaderError::Repeated);
    }

    let value = value.to_str().map_err(|_| HeaderError::Malformed)?;
    let mut parts = value.split_whitespace();

    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case(SCHEME) => Ok(token),
        _ => Err(HeaderError::Malformed),
    }
}

pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[derive(Clone)]
pub struct Authenticator {
    proxy: StorageProxy,
    log: Logger,
}

impl Authenticator {
    pub fn new(proxy: StorageProxy, log: Logger) -> Self {
        Self { proxy, log }
    }

    pub async fn validate(&self, token: &str) -> Result<(), AppError> {
        self.proxy
            .check_auth_token(&hash_token(token))
            .await
            .inspect_err(|err| self.log.observe("authenticate", err))
    }
}

pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();

    let token = match basic_token(request.headers()) {
        Ok(token) => token.to_string(),
        Err(err) => {
            state.logger.scope(|| debug!(%err, "rejected authorization header"));
            return StatusCode::UNAUTHORIZED.into_response();
        }
    };

    if let Err(err) = state.auth.validate(&token).await {
        return err.respond(method).into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;
    use crate::store::{FieldWriter, MemoryStore};

    fn headers(values: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for value in values {
            headers.append(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn test_basic_token() {
        assert_eq!(
            basic_token(&headers(&["Basic dXNlcm5hbWU6cGFzc3dvcmQ="])),
            Ok("dXNlcm5hbWU6cGFzc3dvcmQ=")
        );
        assert_eq!(basic_token(&headers(&["basic abc"])), Ok("abc"));
    }

    #[test]
    fn test_bad_headers() {
        assert_eq!(basic_token(&headers(&[])), Err(HeaderError::Missing));
        assert_eq!(
            basic_token(&headers(&["Basic a", "Basic b"])),
            Err(HeaderError::Repeated)
        );
        assert_eq!(basic_token(&headers(&["Bearer abc"])), Err(HeaderError::Malformed));
        assert_eq!(basic_token(&headers(&["notValidAuth123"])), Err(HeaderError::Malformed));
        assert_eq!(basic_token(&headers(&["Basic a b"])), Err(HeaderError::Malformed));
    }

    #[test]
    fn test_hash_token() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_validate() {
        let store = Arc::new(MemoryStore::new());
        let key = format!("TOKEN_{}", hash_token("dXNlcm5hbWU6cGFzc3dvcmQ="));
        store
            .set_fields(&key, &[("user".to_string(), "username".to_string())])
            .await
            .unwrap();

        let auth = Authenticator::new(
            StorageProxy::new(store, Logger::disabled()),
            Logger::disabled(),
        );

        assert!(auth.validate("dXNlcm5hbWU6cGFzc3dvcmQ=").await.is_ok());
        assert!(matches!(
            auth.validate("c29tZW9uZTplbHNl").await,
            Err(AppError::AuthFailure)
        ));
    }
}

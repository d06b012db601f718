//! # Token Provisioning
//!
//! Creates the `TOKEN_<hash>` records the server checks basic auth against.
//!
//! For every `user:password` pair:
//! - the client token is the standard base64 of `user:password`
//! - the stored hash is the SHA-256 hex of that token, as computed by the server
//! - the record holds a single `user` field, only its existence is checked
use std::str::FromStr;

use base64::{Engine, engine::general_purpose::STANDARD};
use server::{
    auth::hash_token,
    codec::token_key,
    store::{FieldWriter, StoreError},
};

pub const USER_FIELD: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub user: String,
    pub token: String,
    pub hash: String,
}

impl FromStr for Credential {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((user, password)) if !user.is_empty() && !password.is_empty() => {
                let token = STANDARD.encode(s);

                Ok(Self {
                    user: user.to_string(),
                    hash: hash_token(&token),
                    token,
                })
            }
            _ => Err(format!("expected `user:password`, got `{s}`")),
        }
    }
}

pub async fn provision(
    store: &impl FieldWriter,
    credentials: &[Credential],
) -> Result<(), StoreError> {
    for credential in credentials {
        store
            .set_fields(
                &token_key(&credential.hash),
                &[(USER_FIELD.to_string(), credential.user.clone())],
            )
            .await?;
    }

    Ok(())
}

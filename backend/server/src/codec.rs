//! # Field Codec
//!
//! Maps entities to the flat string hashes stored in Redis and back.
//!
//! - Keys are namespaced: `RECIPE_`, `RATE_`, `TOKEN_`
//! - Integers are decimal text, booleans are `"True"` / `"False"`
//! - The recipe id lives in the key, decoding never reads the `id` field
//! - A field missing from the hash decodes to its zero value
use std::num::ParseIntError;

use thiserror::Error;

use crate::{models::Recipe, store::Fields};

pub const RECIPE_NAMESPACE: &str = "RECIPE_";
pub const RATE_NAMESPACE: &str = "RATE_";
pub const TOKEN_NAMESPACE: &str = "TOKEN_";

pub const FIELD_ID: &str = "id";
pub const FIELD_NAME: &str = "name";
pub const FIELD_PREP_TIME: &str = "preptime";
pub const FIELD_DIFFICULTY: &str = "difficulty";
pub const FIELD_VEGETARIAN: &str = "vegetarian";

const TRUE: &str = "True";
const FALSE: &str = "False";

#[derive(Error, Debug, PartialEq)]
pub enum CodecError {
    #[error("key {0} is outside the recipe namespace")]
    Namespace(String),

    #[error("field {field} of {key}: {source}")]
    Integer {
        key: String,
        field: &'static str,
        source: ParseIntError,
    },
}

pub fn recipe_key(id: &str) -> String {
    format!("{RECIPE_NAMESPACE}{id}")
}

pub fn rate_key(id: &str) -> String {
    format!("{RATE_NAMESPACE}{id}")
}

pub fn token_key(hash: &str) -> String {
    format!("{TOKEN_NAMESPACE}{hash}")
}

pub fn encode_recipe(recipe: &Recipe) -> Vec<(String, String)> {
    let vegetarian = if recipe.vegetarian { TRUE } else { FALSE };

    vec![
        (FIELD_ID.to_string(), recipe.id.clone()),
        (FIELD_NAME.to_string(), recipe.name.clone()),
        (FIELD_PREP_TIME.to_string(), recipe.prep_time.to_string()),
        (FIELD_DIFFICULTY.to_string(), recipe.difficulty.to_string()),
        (FIELD_VEGETARIAN.to_string(), vegetarian.to_string()),
    ]
}

pub fn decode_recipe(key: &str, fields: &Fields) -> Result<Recipe, CodecError> {
    let id = key
        .strip_prefix(RECIPE_NAMESPACE)
        .ok_or_else(|| CodecError::Namespace(key.to_string()))?;

    Ok(Recipe {
        id: id.to_string(),
        name: fields.get(FIELD_NAME).cloned().unwrap_or_default(),
        prep_time: integer(key, fields, FIELD_PREP_TIME)?,
        difficulty: integer(key, fields, FIELD_DIFFICULTY)?,
        vegetarian: fields.get(FIELD_VEGETARIAN).is_some_and(|v| v == TRUE),
    })
}

pub fn encode_rating(note: i64) -> String {
    note.to_string()
}

fn integer(key: &str, fields: &Fields, field: &'static str) -> Result<i64, CodecError> {
    match fields.get(field) {
        None => Ok(0),
        Some(value) => value.parse().map_err(|source| CodecError::Integer {
            key: key.to_string(),
            field,
            source,
        }),
    }
}

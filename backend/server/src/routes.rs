use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::{
    models::{Rate, Recipe},
    state::AppState,
};

type HandlerResult<T> = Result<T, Response>;

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> HandlerResult<T> {
    serde_json::from_slice(body).map_err(|_| StatusCode::BAD_REQUEST.into_response())
}

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn get_recipe_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> HandlerResult<Json<Recipe>> {
    state
        .recipes
        .get(&id)
        .await
        .map(Json)
        .map_err(|e| e.respond(Method::GET).into_response())
}

pub async fn list_recipes_handler(
    State(state): State<Arc<AppState>>,
) -> HandlerResult<Json<Vec<Recipe>>> {
    state
        .recipes
        .list()
        .await
        .map(Json)
        .map_err(|e| e.respond(Method::GET).into_response())
}

pub async fn create_recipe_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> HandlerResult<impl IntoResponse> {
    let recipe: Recipe = parse_body(&body)?;

    state
        .recipes
        .create(recipe)
        .await
        .map(|recipe| (StatusCode::CREATED, Json(recipe)))
        .map_err(|e| e.respond(Method::POST).into_response())
}

pub async fn update_recipe_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> HandlerResult<Json<Recipe>> {
    let recipe: Recipe = parse_body(&body)?;

    state
        .recipes
        .update(&id, recipe)
        .await
        .map(Json)
        .map_err(|e| e.respond(Method::PUT).into_response())
}

pub async fn delete_recipe_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> HandlerResult<StatusCode> {
    state
        .recipes
        .delete(&id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|e| e.respond(Method::DELETE).into_response())
}

pub async fn rate_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> HandlerResult<StatusCode> {
    let rate: Rate = parse_body(&body)?;

    state
        .rates
        .rate(&id, rate)
        .await
        .map(|_| StatusCode::OK)
        .map_err(|e| e.respond(Method::POST).into_response())
}

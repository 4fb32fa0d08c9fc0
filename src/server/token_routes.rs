use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::{error, info};

use crate::error::Error;
use crate::server::server::AppState;

pub const ACCESS_TOKEN_PATH: &str = "/token";
pub const ID_TOKEN_PATH: &str = "/id-token";

/// Access token as handed to HTTP callers; `expires_in` counts down.
#[derive(Debug, Serialize)]
pub struct AccessTokenBody {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct IdTokenBody {
    pub id_token: String,
}

pub fn router() -> Router<AppState> {
    info!("served paths: {}, {}", ACCESS_TOKEN_PATH, ID_TOKEN_PATH);
    Router::new()
        .route(ACCESS_TOKEN_PATH, get(handle_access_token))
        .route(ID_TOKEN_PATH, get(handle_id_token))
}

async fn handle_access_token(State(state): State<AppState>) -> Response {
    match state.provider.get_access_token().await {
        Ok(token) => {
            let expires_in = state.provider.time_to_expiry(&token).num_seconds();
            Json(AccessTokenBody {
                access_token: token.access_token,
                token_type: token.token_type,
                expires_in,
            })
            .into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn handle_id_token(State(state): State<AppState>) -> Response {
    match state.provider.get_id_token().await {
        Ok(token) => Json(IdTokenBody {
            id_token: token.id_token,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(e: Error) -> Response {
    error!("token request failed: {}", e);
    (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
}

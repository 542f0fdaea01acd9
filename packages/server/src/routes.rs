use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::engine::{visibility::mask_for_viewer, GameError};
use crate::state::AppState;
use crate::utils::{identity::identity_middleware, websocket};

mod game;
mod user;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .nest("/api/games", game::routes(state.clone()))
        .nest("/api/users", user::routes(state.clone()))
        .nest(
            "/api/lobby",
            Router::new()
                .route("/ws", get(websocket::lobby_handler))
                .with_state(state),
        )
        .layer(middleware::from_fn(identity_middleware))
}

impl GameError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GameError::NotFound => StatusCode::NOT_FOUND,
            GameError::Forbidden(_) => StatusCode::FORBIDDEN,
            GameError::InvalidState(_)
            | GameError::AlreadyJoined(_)
            | GameError::Full(_)
            | GameError::AlreadyHosting(_)
            | GameError::GameEnded => StatusCode::CONFLICT,
            GameError::InvalidArgument(_) | GameError::NotAMember | GameError::InvalidTarget => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

// エラーハンドリング
impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "success": false,
            "error": self.kind(),
            "message": self.to_string(),
        });
        if let Some(game) = self.game() {
            body["game"] = json!(mask_for_viewer(game, None));
        }
        (self.status_code(), Json(body)).into_response()
    }
}

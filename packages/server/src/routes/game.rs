use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::engine::{visibility::mask_for_viewer, GameError};
use crate::models::game::GameStatus;
use crate::state::AppState;
use crate::utils::{identity::UserId, websocket};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub name: String,
    pub max_players: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub target_user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentsQuery {
    pub limit: Option<usize>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_games).post(create_game))
        .route("/mine", get(my_games))
        .nest(
            "/:game_id",
            Router::new()
                .route("/", get(get_game).delete(delete_game))
                // 参加・退出
                .route("/join", post(join_game))
                .route("/leave", post(leave_game))
                // ホスト操作
                .route("/start", post(start_game))
                .route("/cancel", post(cancel_game))
                .route("/end", post(end_game))
                // ゲームアクション
                .route("/vote", post(cast_vote))
                .route("/comments", get(list_comments).post(add_comment))
                .route("/ws", get(websocket::handler)),
        )
        .with_state(state)
}

async fn list_games(
    State(state): State<AppState>,
    user: UserId,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, GameError> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(raw.parse::<GameStatus>().map_err(GameError::InvalidArgument)?),
        None => None,
    };
    let games: Vec<_> = state
        .games
        .list_games(status)
        .await
        .iter()
        .map(|g| mask_for_viewer(g, Some(user.as_str())))
        .collect();

    Ok(Json(json!({ "success": true, "count": games.len(), "games": games })))
}

async fn my_games(State(state): State<AppState>, user: UserId) -> impl IntoResponse {
    let games: Vec<_> = state
        .games
        .games_for_user(user.as_str())
        .await
        .iter()
        .map(|g| mask_for_viewer(g, Some(user.as_str())))
        .collect();

    Json(json!({ "success": true, "count": games.len(), "games": games }))
}

async fn create_game(
    State(state): State<AppState>,
    user: UserId,
    Json(req): Json<CreateGameRequest>,
) -> Result<impl IntoResponse, GameError> {
    let game = state
        .games
        .create_game(user.as_str(), &req.name, req.max_players)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "game": game }))))
}

async fn get_game(
    State(state): State<AppState>,
    user: UserId,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, GameError> {
    let game = state.games.get_game(&game_id).await?;
    Ok(Json(json!({
        "success": true,
        "game": mask_for_viewer(&game, Some(user.as_str())),
    })))
}

async fn delete_game(
    State(state): State<AppState>,
    user: UserId,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, GameError> {
    let game = state.games.get_game(&game_id).await?;
    if !game.is_host(user.as_str()) {
        return Err(GameError::Forbidden(
            "Only host can delete the game".to_string(),
        ));
    }
    state.games.delete_game(&game_id).await;
    Ok(Json(json!({ "success": true, "message": "Game deleted" })))
}

async fn join_game(
    State(state): State<AppState>,
    user: UserId,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, GameError> {
    let game = state.games.join_game(&game_id, user.as_str()).await?;
    Ok(Json(json!({ "success": true, "game": game })))
}

async fn leave_game(
    State(state): State<AppState>,
    user: UserId,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, GameError> {
    let (game, outcome) = state.games.leave_game(&game_id, user.as_str()).await?;
    Ok(Json(json!({
        "success": true,
        "gameCancelled": outcome.game_cancelled,
        "game": mask_for_viewer(&game, Some(user.as_str())),
    })))
}

async fn start_game(
    State(state): State<AppState>,
    user: UserId,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, GameError> {
    let game = state.games.start_game(&game_id, user.as_str()).await?;
    Ok(Json(json!({
        "success": true,
        "game": mask_for_viewer(&game, Some(user.as_str())),
    })))
}

async fn cancel_game(
    State(state): State<AppState>,
    user: UserId,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, GameError> {
    state.games.cancel_game(&game_id, user.as_str()).await?;
    Ok(Json(json!({ "success": true, "message": "Game cancelled" })))
}

async fn end_game(
    State(state): State<AppState>,
    user: UserId,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, GameError> {
    state.games.end_game(&game_id, user.as_str()).await?;
    Ok(Json(json!({ "success": true, "message": "Game ended" })))
}

async fn cast_vote(
    State(state): State<AppState>,
    user: UserId,
    Path(game_id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> Result<impl IntoResponse, GameError> {
    let game = state
        .games
        .cast_vote(&game_id, user.as_str(), req.target_user_id.as_deref())
        .await?;
    Ok(Json(json!({
        "success": true,
        "game": mask_for_viewer(&game, Some(user.as_str())),
    })))
}

async fn list_comments(
    State(state): State<AppState>,
    user: UserId,
    Path(game_id): Path<String>,
    Query(query): Query<CommentsQuery>,
) -> Result<impl IntoResponse, GameError> {
    let game = mask_for_viewer(&state.games.get_game(&game_id).await?, Some(user.as_str()));
    let limit = query.limit.unwrap_or(game.comments.len());
    let comments: Vec<_> = game.comments.into_iter().take(limit).collect();

    Ok(Json(json!({ "success": true, "count": comments.len(), "comments": comments })))
}

async fn add_comment(
    State(state): State<AppState>,
    user: UserId,
    Path(game_id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> Result<impl IntoResponse, GameError> {
    let comment = state
        .games
        .add_comment(&game_id, user.as_str(), &req.message)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "comment": comment })),
    ))
}

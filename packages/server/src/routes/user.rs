use axum::{
    extract::State,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::engine::GameError;
use crate::state::AppState;
use crate::utils::identity::UserId;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NicknameRequest {
    pub nickname: Option<String>,
    pub avatar_seed: Option<String>,
}

// ユーザールートの設定
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/me", get(me))
        .route("/nickname", get(get_nickname).post(set_nickname))
        .route("/online-players", get(online_players))
        .with_state(state)
}

pub async fn me(State(state): State<AppState>, user: UserId) -> impl IntoResponse {
    let profile = state.profiles.profile(user.as_str());
    Json(json!({
        "success": true,
        "user": {
            "id": user.as_str(),
            "nickname": profile.as_ref().map(|p| p.nickname.clone()),
            "avatarSeed": profile.map(|p| p.avatar_seed),
        },
    }))
}

pub async fn get_nickname(State(state): State<AppState>, user: UserId) -> impl IntoResponse {
    let profile = state.profiles.profile(user.as_str());
    Json(json!({
        "success": true,
        "userId": user.as_str(),
        "nickname": profile.as_ref().map(|p| p.nickname.clone()),
        "avatarSeed": profile.map(|p| p.avatar_seed),
    }))
}

pub async fn set_nickname(
    State(state): State<AppState>,
    user: UserId,
    Json(req): Json<NicknameRequest>,
) -> Result<impl IntoResponse, GameError> {
    // アバターだけの変更も受け付ける
    let profile = match (req.nickname.as_deref(), req.avatar_seed.as_deref()) {
        (Some(nickname), seed) => state.profiles.set_nickname(user.as_str(), nickname, seed)?,
        (None, Some(seed)) => state.profiles.set_avatar_seed(user.as_str(), seed)?,
        (None, None) => {
            return Err(GameError::InvalidArgument(
                "Nickname or avatarSeed is required".to_string(),
            ))
        }
    };
    Ok(Json(json!({
        "success": true,
        "userId": user.as_str(),
        "nickname": profile.nickname,
        "avatarSeed": profile.avatar_seed,
    })))
}

pub async fn online_players(State(state): State<AppState>) -> impl IntoResponse {
    let players: Vec<_> = state
        .presence
        .online_users()
        .into_iter()
        .map(|user_id| {
            let profile = state.profiles.profile_or_unknown(&user_id);
            json!({
                "userId": user_id,
                "nickname": profile.nickname,
                "avatarSeed": profile.avatar_seed,
            })
        })
        .collect();

    Json(json!({ "success": true, "count": players.len(), "players": players }))
}

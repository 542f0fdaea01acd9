use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tracing::{info, warn};

use crate::engine::visibility::mask_for_viewer;
use crate::models::game::GameStatus;
use crate::services::broadcaster::GameEvent;
use crate::state::AppState;
use crate::utils::identity::UserId;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    Vote { target_user_id: Option<String> },
    Comment { message: String },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ServerNotice<'a> {
    #[serde(rename = "error")]
    Error { error: &'a str, message: String },
}

pub async fn handler(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    user: UserId,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_game_socket(socket, state, game_id, user.0))
}

pub async fn lobby_handler(
    State(state): State<AppState>,
    user: UserId,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_lobby_socket(socket, state, user.0))
}

pub fn personalize(event: GameEvent, viewer: &str) -> GameEvent {
    match event {
        GameEvent::GameUpdated(game) => GameEvent::GameUpdated(mask_for_viewer(&game, Some(viewer))),
        GameEvent::GameCreated(game) => GameEvent::GameCreated(mask_for_viewer(&game, Some(viewer))),
        GameEvent::GameComment {
            game_id,
            mut comment,
        } => {
            if comment.user_id != viewer {
                comment.role = None;
            }
            GameEvent::GameComment { game_id, comment }
        }
        other => other,
    }
}

fn encode<T: Serialize>(value: &T) -> Option<Message> {
    match serde_json::to_string(value) {
        Ok(text) => Some(Message::Text(text)),
        Err(e) => {
            warn!("Failed to encode websocket message: {}", e);
            None
        }
    }
}

async fn initial_messages(state: &AppState, game_id: &str, user_id: &str) -> Vec<Message> {
    let game = match state.games.get_game(game_id).await {
        Ok(game) => mask_for_viewer(&game, Some(user_id)),
        Err(e) => {
            return encode(&ServerNotice::Error {
                error: e.kind(),
                message: e.to_string(),
            })
            .into_iter()
            .collect();
        }
    };

    let mut messages = Vec::new();
    // 古い順に送る
    for log in game.logs.iter().rev() {
        messages.extend(encode(&GameEvent::GameLog {
            game_id: game_id.to_string(),
            log: log.clone(),
        }));
    }
    for comment in game.comments.iter().rev() {
        messages.extend(encode(&GameEvent::GameComment {
            game_id: game_id.to_string(),
            comment: comment.clone(),
        }));
    }
    messages.extend(encode(&GameEvent::updated(&game)));
    messages
}

async fn handle_client_message(state: &AppState, game_id: &str, user_id: &str, text: &str) -> Option<Message> {
    let request = match serde_json::from_str::<ClientMessage>(text) {
        Ok(request) => request,
        Err(e) => {
            return encode(&ServerNotice::Error {
                error: "InvalidArgument",
                message: format!("Malformed message: {}", e),
            })
        }
    };

    let result = match request {
        ClientMessage::Vote { target_user_id } => state
            .games
            .cast_vote(game_id, user_id, target_user_id.as_deref())
            .await
            .map(|_| ()),
        ClientMessage::Comment { message } => state
            .games
            .add_comment(game_id, user_id, &message)
            .await
            .map(|_| ()),
    };

    match result {
        Ok(()) => None,
        Err(e) => encode(&ServerNotice::Error {
            error: e.kind(),
            message: e.to_string(),
        }),
    }
}

async fn handle_game_socket(mut ws: WebSocket, state: AppState, game_id: String, user_id: String) {
    // 存在しないゲームにはチャンネルを作らずに切断する
    if let Err(e) = state.games.get_game(&game_id).await {
        info!("WebSocket rejected: user {} on game {}: {}", user_id, game_id, e);
        if let Some(notice) = encode(&ServerNotice::Error {
            error: e.kind(),
            message: e.to_string(),
        }) {
            let _ = ws.send(notice).await;
        }
        let _ = ws.send(Message::Close(None)).await;
        return;
    }

    info!("WebSocket connected: user {} on game {}", user_id, game_id);
    state.presence.connect(&user_id);

    let rx = state.broadcaster.subscribe(&game_id);
    let (direct_tx, direct_rx) = mpsc::unbounded_channel();
    for message in initial_messages(&state, &game_id, &user_id).await {
        let _ = direct_tx.send(message);
    }

    let (sender, mut receiver) = ws.split();
    let send_task = tokio::spawn(forward_events(rx, direct_rx, sender, user_id.clone()));

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => {
                if let Some(reply) = handle_client_message(&state, &game_id, &user_id, &text).await {
                    if direct_tx.send(reply).is_err() {
                        break;
                    }
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    send_task.abort();
    // 受信側が破棄されるのを待ってから解放する
    let _ = send_task.await;
    state.broadcaster.release(&game_id);
    disconnect(&state, &user_id).await;
    info!("WebSocket closed: user {} on game {}", user_id, game_id);
}

async fn handle_lobby_socket(ws: WebSocket, state: AppState, user_id: String) {
    info!("Lobby WebSocket connected: user {}", user_id);
    state.presence.connect(&user_id);

    let rx = state.broadcaster.subscribe_lobby();
    // ロビーでは個別返信はないが、送信側を生かしておく
    let (_direct_tx, direct_rx) = mpsc::unbounded_channel();
    let (sender, mut receiver) = ws.split();
    let send_task = tokio::spawn(forward_events(rx, direct_rx, sender, user_id.clone()));

    while let Some(Ok(msg)) = receiver.next().await {
        if let Message::Close(_) = msg {
            break;
        }
    }

    send_task.abort();
    disconnect(&state, &user_id).await;
}

async fn forward_events<S>(
    mut events: broadcast::Receiver<GameEvent>,
    mut direct: mpsc::UnboundedReceiver<Message>,
    mut sender: S,
    viewer: String,
) where
    S: SinkExt<Message> + Unpin,
{
    loop {
        let message = tokio::select! {
            // 個別返信を優先する
            biased;
            Some(message) = direct.recv() => message,
            event = events.recv() => match event {
                Ok(event) => match encode(&personalize(event, &viewer)) {
                    Some(message) => message,
                    None => continue,
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!("WebSocket for {} lagged; {} events skipped", viewer, skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            },
        };
        if sender.send(message).await.is_err() {
            break;
        }
    }
}

/// Drops one connection. A user with no connection left leaves every game
/// that has not started yet; running games keep them.
async fn disconnect(state: &AppState, user_id: &str) {
    if state.presence.disconnect(user_id) > 0 {
        return;
    }

    for game in state.games.games_for_user(user_id).await {
        if game.status != GameStatus::Waiting {
            continue;
        }
        match state.games.leave_game(&game.id, user_id).await {
            Ok(_) => info!("User {} left waiting game {} on disconnect", user_id, game.id),
            Err(e) => warn!("Could not remove {} from game {}: {}", user_id, game.id, e),
        }
    }
}

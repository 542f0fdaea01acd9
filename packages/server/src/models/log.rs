use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    Join,
    Leave,
    Kill,
    Vote,
    System,
    Phase,
    Heal,
}

/// Write-once game log record. `message` is the English rendering;
/// `log_key` + `log_params` let clients localize it themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameLog {
    pub id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub log_type: LogType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_key: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub log_params: BTreeMap<String, Value>,
}

impl GameLog {
    pub fn new(log_type: LogType, log_key: impl Into<String>, message: impl Into<String>) -> Self {
        GameLog {
            id: uuid::Uuid::new_v4().to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            log_type,
            log_key: Some(log_key.into()),
            log_params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.log_params.insert(name.to_string(), value.into());
        self
    }

    pub fn join(nickname: &str) -> Self {
        GameLog::new(LogType::Join, "join", format!("\"{}\" joined the game", nickname))
            .with_param("nickname", nickname)
    }

    pub fn leave(nickname: &str) -> Self {
        GameLog::new(LogType::Leave, "leave", format!("\"{}\" left the game", nickname))
            .with_param("nickname", nickname)
    }

    pub fn host_cancelled(nickname: &str) -> Self {
        GameLog::new(
            LogType::Leave,
            "leaveHostCancel",
            format!("\"{}\" (host) left the game. Game cancelled.", nickname),
        )
        .with_param("nickname", nickname)
    }

    pub fn key(&self) -> Option<&str> {
        self.log_key.as_deref()
    }
}

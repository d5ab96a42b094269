//! Chat history storage
//!
//! Per-session record of questions and answers shown on the chat page.
//! In-memory only; cleared on request and lost on restart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{AgentKind, OrchestrationResult};

/// One question/answer pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub turn_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub response: String,
    pub routed_to: AgentKind,
    pub success: bool,
}

impl ChatTurn {
    pub fn from_result(result: &OrchestrationResult) -> Self {
        Self {
            turn_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            query: result.query.text.clone(),
            response: result.response.clone(),
            routed_to: result.routed_to,
            success: result.success,
        }
    }
}

/// Chat histories keyed by session id
pub struct ChatHistoryStore {
    sessions: Arc<RwLock<HashMap<Uuid, VecDeque<ChatTurn>>>>,
    limit: usize,
}

impl ChatHistoryStore {
    /// `limit` turns are kept per session; older ones are dropped first
    pub fn new(limit: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            limit: limit.max(1),
        }
    }

    pub async fn append(&self, session_id: Uuid, turn: ChatTurn) {
        let mut sessions = self.sessions.write().await;
        let turns = sessions.entry(session_id).or_default();

        turns.push_back(turn);
        while turns.len() > self.limit {
            turns.pop_front();
        }
    }

    /// Turns for a session, oldest first
    pub async fn turns(&self, session_id: Uuid) -> Vec<ChatTurn> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&session_id)
            .map(|turns| turns.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn clear(&self, session_id: Uuid) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(&session_id);
    }
}

impl Default for ChatHistoryStore {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_HISTORY_LIMIT)
    }
}

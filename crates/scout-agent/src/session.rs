// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session conversation transcripts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use scout_core::{ChatMessage, DocumentStore, ScoutError};

const KEY_PREFIX: &str = "session:";
const MAX_WRITE_ATTEMPTS: usize = 3;
const MAX_SESSION_ID_LEN: usize = 128;

/// One user/assistant exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptTurn {
    pub user: String,
    pub assistant: String,
    pub timestamp: DateTime<Utc>,
}

/// The persisted transcript of one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    #[serde(default)]
    pub turns: Vec<TranscriptTurn>,
}

impl Transcript {
    /// The last `turns` exchanges as alternating chat messages.
    pub fn recent_messages(&self, turns: usize) -> Vec<ChatMessage> {
        let start = self.turns.len().saturating_sub(turns);
        self.turns[start..]
            .iter()
            .flat_map(|t| {
                [
                    ChatMessage::user(t.user.clone()),
                    ChatMessage::assistant(t.assistant.clone()),
                ]
            })
            .collect()
    }
}

/// Accepts ids of ASCII letters, digits, `-` and `_`.
pub fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn key(session_id: &str) -> String {
    format!("{KEY_PREFIX}{session_id}")
}

/// Transcript storage on top of a [`DocumentStore`].
#[derive(Clone)]
pub struct SessionStore {
    docs: Arc<dyn DocumentStore>,
}

impl SessionStore {
    pub fn new(docs: Arc<dyn DocumentStore>) -> Self {
        Self { docs }
    }

    async fn load_versioned(
        &self,
        session_id: &str,
    ) -> Result<(Transcript, Option<u64>), ScoutError> {
        match self.docs.get(&key(session_id)).await? {
            Some(doc) => {
                let transcript = serde_json::from_value(doc.value).map_err(|e| {
                    ScoutError::Parse(format!("corrupt transcript for {session_id}: {e}"))
                })?;
                Ok((transcript, Some(doc.version)))
            }
            None => Ok((Transcript::default(), None)),
        }
    }

    /// Loads a transcript. Unknown sessions have an empty one.
    pub async fn load(&self, session_id: &str) -> Result<Transcript, ScoutError> {
        Ok(self.load_versioned(session_id).await?.0)
    }

    /// Appends one exchange, retrying when another writer got there first.
    pub async fn append(
        &self,
        session_id: &str,
        user: &str,
        assistant: &str,
    ) -> Result<(), ScoutError> {
        let turn = TranscriptTurn {
            user: user.to_string(),
            assistant: assistant.to_string(),
            timestamp: Utc::now(),
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            let (mut transcript, version) = self.load_versioned(session_id).await?;
            transcript.turns.push(turn.clone());
            let value = serde_json::to_value(&transcript)
                .map_err(|e| ScoutError::Internal(format!("transcript serialization: {e}")))?;

            match self.docs.put(&key(session_id), value, version).await {
                Ok(_) => {
                    debug!(session_id, turns = transcript.turns.len(), "transcript updated");
                    return Ok(());
                }
                Err(ScoutError::VersionConflict { .. }) if attempt < MAX_WRITE_ATTEMPTS => {
                    debug!(session_id, attempt, "transcript write conflicted, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Lists the ids of every stored session.
    pub async fn list(&self) -> Result<Vec<String>, ScoutError> {
        Ok(self
            .docs
            .list_keys(KEY_PREFIX)
            .await?
            .into_iter()
            .filter_map(|k| k.strip_prefix(KEY_PREFIX).map(str::to_string))
            .collect())
    }

    pub async fn delete(&self, session_id: &str) -> Result<bool, ScoutError> {
        self.docs.delete(&key(session_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::Role;
    use scout_storage::SqliteDocumentStore;

    async fn store() -> SessionStore {
        SessionStore::new(Arc::new(SqliteDocumentStore::in_memory().await.unwrap()))
    }

    #[tokio::test]
    async fn append_and_load() {
        let sessions = store().await;
        assert!(sessions.load("abc").await.unwrap().turns.is_empty());

        sessions.append("abc", "hi", "hello").await.unwrap();
        sessions.append("abc", "how are you", "fine").await.unwrap();

        let transcript = sessions.load("abc").await.unwrap();
        assert_eq!(transcript.turns.len(), 2);
        assert_eq!(transcript.turns[1].assistant, "fine");
        assert_eq!(sessions.list().await.unwrap(), vec!["abc"]);
    }

    #[tokio::test]
    async fn recent_messages_keep_the_tail() {
        let sessions = store().await;
        for i in 0..4 {
            sessions
                .append("s", &format!("q{i}"), &format!("a{i}"))
                .await
                .unwrap();
        }
        let messages = sessions.load("s").await.unwrap().recent_messages(2);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "q2");
        assert_eq!(messages[3].content, "a3");
        assert!(Transcript::default().recent_messages(5).is_empty());
    }

    #[tokio::test]
    async fn concurrent_appends_are_not_lost() {
        let sessions = store().await;
        let (a, b) = tokio::join!(
            sessions.append("race", "one", "1"),
            sessions.append("race", "two", "2"),
        );
        a.unwrap();
        b.unwrap();
        assert_eq!(sessions.load("race").await.unwrap().turns.len(), 2);
    }

    #[test]
    fn session_id_validation() {
        assert!(is_valid_session_id("a1-b2_c3"));
        assert!(!is_valid_session_id(""));
        assert!(!is_valid_session_id("../etc"));
        assert!(!is_valid_session_id(&"x".repeat(129)));
    }
}

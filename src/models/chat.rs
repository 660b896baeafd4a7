use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{Seed, ValidationError};
use crate::kv::SharedKv;
use crate::lock::{InMemoryLockManager, LockManager};
use crate::store::{unique_ids, BulkDeleteTally, EntityStore, Page, StoreError};
use crate::Entity;

/// A chat board with its messages embedded in append order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Entity)]
#[entity(prefix = "chat")]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    #[entity(non_empty)]
    pub title: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// One message in a chat. Only created through [`ChatStore::send_message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub chat_id: String,
    pub user_id: String,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub ts: i64,
}

impl Seed for Chat {
    fn seed() -> Vec<Self> {
        vec![Chat {
            id: "c1".into(),
            title: "General".into(),
            messages: vec![ChatMessage {
                id: "m1".into(),
                chat_id: "c1".into(),
                user_id: "u1".into(),
                text: "Hello".into(),
                ts: Utc::now().timestamp_millis(),
            }],
        }]
    }
}

/// Chat store: the generic entity operations plus message append.
///
/// Operations that touch a single chat record (`send_message`, `delete`,
/// `delete_many`) hold that chat's lock, so concurrent appends on one chat
/// are never lost within a process. Several processes sharing a backend
/// can still race; that needs a backend-native atomic append.
///
/// The underlying `EntityStore<Chat>` is not handed out: its `save` and
/// `delete` would skip the chat lock.
#[derive(Clone)]
pub struct ChatStore {
    chats: EntityStore<Chat>,
    locks: Arc<dyn LockManager>,
}

impl ChatStore {
    pub fn new(kv: SharedKv) -> Self {
        Self::with_locks(kv, Arc::new(InMemoryLockManager::new()))
    }

    pub fn with_locks(kv: SharedKv, locks: Arc<dyn LockManager>) -> Self {
        ChatStore {
            chats: EntityStore::new(kv),
            locks,
        }
    }

    /// Write the default chats once; see [`EntityStore::ensure_seed`].
    pub async fn ensure_seed(&self) -> Result<(), StoreError> {
        self.chats.ensure_seed().await
    }

    /// Cursor-paginated chats; see [`EntityStore::list`].
    pub async fn list(
        &self,
        cursor: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Page<Chat>, StoreError> {
        self.chats.list(cursor, limit).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Chat>, StoreError> {
        self.chats.get(id).await
    }

    /// Create an empty chat with a fresh id.
    pub async fn create_chat(&self, title: &str) -> Result<Chat, StoreError> {
        self.chats
            .create(Chat {
                id: Uuid::new_v4().to_string(),
                title: title.trim().to_string(),
                messages: Vec::new(),
            })
            .await
    }

    pub async fn exists(&self, id: &str) -> Result<bool, StoreError> {
        self.chats.exists(id).await
    }

    /// Messages of a chat in append order. A missing chat is `NotFound`,
    /// never an empty list.
    pub async fn list_messages(&self, chat_id: &str) -> Result<Vec<ChatMessage>, StoreError> {
        Ok(self.chats.require(chat_id).await?.messages)
    }

    /// Append a message to a chat and return it.
    ///
    /// `user_id` and `text` are trimmed and must be non-empty. The timestamp is
    /// the current time, raised to the previous message's timestamp if the
    /// clock went backwards.
    pub async fn send_message(
        &self,
        chat_id: &str,
        user_id: &str,
        text: &str,
    ) -> Result<ChatMessage, StoreError> {
        let user_id = user_id.trim();
        let text = text.trim();
        if user_id.is_empty() {
            return Err(ValidationError::MissingInput { field: "userId" }.into());
        }
        if text.is_empty() {
            return Err(ValidationError::MissingInput { field: "text" }.into());
        }

        let _guard = self.locks.acquire(&EntityStore::<Chat>::key(chat_id)).await?;

        let mut chat = self.chats.require(chat_id).await?;

        let now = Utc::now().timestamp_millis();
        let ts = chat.messages.last().map_or(now, |last| now.max(last.ts));
        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            chat_id: chat.id.clone(),
            user_id: user_id.to_string(),
            text: text.to_string(),
            ts,
        };

        chat.messages.push(message.clone());
        self.chats.save(&chat).await?;

        tracing::debug!(chat_id, message_id = %message.id, "message appended");
        Ok(message)
    }

    /// Delete a chat, waiting for any in-flight append on it.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.locks.acquire(&EntityStore::<Chat>::key(id)).await?;
        self.chats.delete(id).await
    }

    /// Bulk delete; see [`EntityStore::delete_many`]. Each chat is deleted
    /// under its own lock, and a lock failure is recorded like any other.
    pub async fn delete_many<I, S>(&self, ids: I) -> Result<usize, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids = unique_ids(ids);
        let mut tally = BulkDeleteTally::new(Chat::PREFIX, ids.len());
        for id in ids {
            let result = self.delete(&id).await;
            tally.record(id, result);
        }
        tally.finish()
    }
}

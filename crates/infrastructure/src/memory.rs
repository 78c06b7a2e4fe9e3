//! 内存存储实现
//!
//! 用于开发环境和测试。每个方法在一次写锁内完成，单条记录操作天然原子。

use std::collections::HashMap;

use async_trait::async_trait;
use domain::{
    Message, MessageId, MessageRepository, Participant, ParticipantName, ParticipantRepository,
    RepositoryError, RepositoryResult, Timestamp,
};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryParticipantRepository {
    participants: RwLock<HashMap<ParticipantName, Participant>>,
}

impl MemoryParticipantRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ParticipantRepository for MemoryParticipantRepository {
    async fn create(&self, participant: Participant) -> RepositoryResult<Participant> {
        let mut participants = self.participants.write().await;
        if participants.contains_key(&participant.name) {
            return Err(RepositoryError::Conflict);
        }
        participants.insert(participant.name.clone(), participant.clone());
        Ok(participant)
    }

    async fn find_by_name(
        &self,
        name: &ParticipantName,
    ) -> RepositoryResult<Option<Participant>> {
        Ok(self.participants.read().await.get(name).cloned())
    }

    async fn touch(&self, name: &ParticipantName, at: Timestamp) -> RepositoryResult<bool> {
        let mut participants = self.participants.write().await;
        match participants.get_mut(name) {
            Some(participant) => {
                participant.heartbeat(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, name: &ParticipantName) -> RepositoryResult<bool> {
        Ok(self.participants.write().await.remove(name).is_some())
    }

    async fn delete_if_seen_before(
        &self,
        name: &ParticipantName,
        cutoff: Timestamp,
    ) -> RepositoryResult<bool> {
        let mut participants = self.participants.write().await;
        match participants.get(name) {
            Some(participant) if participant.last_seen < cutoff => {
                participants.remove(name);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list(&self) -> RepositoryResult<Vec<Participant>> {
        Ok(self.participants.read().await.values().cloned().collect())
    }
}

/// 消息按插入顺序保存
#[derive(Default)]
pub struct MemoryMessageRepository {
    messages: RwLock<Vec<Message>>,
}

impl MemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for MemoryMessageRepository {
    async fn append(&self, message: Message) -> RepositoryResult<Message> {
        let mut messages = self.messages.write().await;
        if messages.iter().any(|m| m.id == message.id) {
            return Err(RepositoryError::Conflict);
        }
        messages.push(message.clone());
        Ok(message)
    }

    async fn find_by_id(&self, id: MessageId) -> RepositoryResult<Option<Message>> {
        Ok(self
            .messages
            .read()
            .await
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn update(&self, message: Message) -> RepositoryResult<Message> {
        let mut messages = self.messages.write().await;
        let slot = messages
            .iter_mut()
            .find(|m| m.id == message.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = message.clone();
        Ok(message)
    }

    async fn delete(&self, id: MessageId) -> RepositoryResult<bool> {
        let mut messages = self.messages.write().await;
        let before = messages.len();
        messages.retain(|m| m.id != id);
        Ok(messages.len() != before)
    }

    async fn list(&self) -> RepositoryResult<Vec<Message>> {
        Ok(self.messages.read().await.clone())
    }
}

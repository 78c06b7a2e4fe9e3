//! 存储接口定义
//!
//! 内层定义接口，外层（infrastructure）实现。每个方法只触及单条记录或做一次全量扫描，
//! 单条记录操作的原子性由实现保证，上层不额外加锁。

use async_trait::async_trait;

use crate::entities::{Message, Participant};
use crate::errors::RepositoryError;
use crate::value_objects::{MessageId, ParticipantName, Timestamp};

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// 条件插入：同名记录已存在时返回 `RepositoryError::Conflict`。
    async fn create(&self, participant: Participant) -> RepositoryResult<Participant>;

    async fn find_by_name(&self, name: &ParticipantName)
        -> RepositoryResult<Option<Participant>>;

    /// 刷新 last_seen，记录不存在时返回 false。
    async fn touch(&self, name: &ParticipantName, at: Timestamp) -> RepositoryResult<bool>;

    async fn delete(&self, name: &ParticipantName) -> RepositoryResult<bool>;

    /// 仅当 last_seen 早于 cutoff 时删除，返回是否删除。
    async fn delete_if_seen_before(
        &self,
        name: &ParticipantName,
        cutoff: Timestamp,
    ) -> RepositoryResult<bool>;

    /// 全量扫描，顺序由存储决定。
    async fn list(&self) -> RepositoryResult<Vec<Participant>>;
}

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn append(&self, message: Message) -> RepositoryResult<Message>;

    async fn find_by_id(&self, id: MessageId) -> RepositoryResult<Option<Message>>;

    /// 按 id 覆盖，记录不存在时返回 `RepositoryError::NotFound`。
    async fn update(&self, message: Message) -> RepositoryResult<Message>;

    async fn delete(&self, id: MessageId) -> RepositoryResult<bool>;

    /// 按插入顺序返回所有消息。
    async fn list(&self) -> RepositoryResult<Vec<Message>>;
}

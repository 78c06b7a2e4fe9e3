//! 在线参与者注册表
//!
//! 负责加入、心跳和清理，并在状态变化时通过消息账本写入进出房间的状态消息。

use std::sync::Arc;
use std::time::Duration;

use domain::{
    DomainError, Message, Participant, ParticipantName, ParticipantRepository, RepositoryError,
    Timestamp,
};

use crate::{
    clock::{to_time_duration, Clock},
    error::ApplicationError,
    ledger::MessageLedger,
};

/// 在线参与者查询接口，供消息账本校验发送者。
#[async_trait::async_trait]
pub trait ParticipantDirectory: Send + Sync {
    async fn is_active(&self, name: &str) -> Result<bool, ApplicationError>;
}

/// 基于存储的在线参与者视图
#[derive(Clone)]
pub struct ActiveParticipants {
    repository: Arc<dyn ParticipantRepository>,
}

impl ActiveParticipants {
    pub fn new(repository: Arc<dyn ParticipantRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait::async_trait]
impl ParticipantDirectory for ActiveParticipants {
    async fn is_active(&self, name: &str) -> Result<bool, ApplicationError> {
        let Ok(name) = ParticipantName::parse(name) else {
            return Ok(false);
        };
        Ok(self.repository.find_by_name(&name).await?.is_some())
    }
}

#[derive(Debug, Clone)]
pub struct PresenceSettings {
    /// 超过该时长没有心跳即视为过期
    pub inactivity_threshold: Duration,
    /// 清理任务的执行间隔，与阈值相互独立
    pub sweep_interval: Duration,
}

impl From<&config::PresenceConfig> for PresenceSettings {
    fn from(value: &config::PresenceConfig) -> Self {
        Self {
            inactivity_threshold: value.inactivity_threshold(),
            sweep_interval: value.sweep_interval(),
        }
    }
}

impl Default for PresenceSettings {
    fn default() -> Self {
        Self {
            inactivity_threshold: Duration::from_secs(10),
            sweep_interval: Duration::from_secs(15),
        }
    }
}

pub struct PresenceDependencies {
    pub participant_repository: Arc<dyn ParticipantRepository>,
    pub ledger: Arc<MessageLedger>,
    pub clock: Arc<dyn Clock>,
    pub settings: PresenceSettings,
}

pub struct PresenceRegistry {
    deps: PresenceDependencies,
    directory: ActiveParticipants,
}

impl PresenceRegistry {
    pub fn new(deps: PresenceDependencies) -> Self {
        let directory = ActiveParticipants::new(deps.participant_repository.clone());
        Self { deps, directory }
    }

    pub fn settings(&self) -> &PresenceSettings {
        &self.deps.settings
    }

    /// 加入聊天。存在性检查与插入是两次存储调用；并发同名加入由存储的条件插入兜底，
    /// 失败方同样得到 Conflict。
    pub async fn join(&self, name: &str) -> Result<Participant, ApplicationError> {
        let name = ParticipantName::parse(name).map_err(ApplicationError::InvalidInput)?;

        if self
            .deps
            .participant_repository
            .find_by_name(&name)
            .await?
            .is_some()
        {
            return Err(ApplicationError::Conflict(
                DomainError::participant_already_exists(name.as_str()),
            ));
        }

        let now = self.deps.clock.now();
        let participant = match self
            .deps
            .participant_repository
            .create(Participant::join(name.clone(), now))
            .await
        {
            Ok(participant) => participant,
            Err(RepositoryError::Conflict) => {
                return Err(ApplicationError::Conflict(
                    DomainError::participant_already_exists(name.as_str()),
                ))
            }
            Err(err) => return Err(err.into()),
        };

        let status = Message::joined(name, self.deps.ledger.broadcast_tag(), now);
        self.deps.ledger.record_status(status).await?;

        tracing::info!(participant = %participant.name, "参与者加入");
        Ok(participant)
    }

    pub async fn heartbeat(&self, name: &str) -> Result<(), ApplicationError> {
        let not_found = || ApplicationError::NotFound(DomainError::participant_not_found(name));
        let parsed = ParticipantName::parse(name).map_err(|_| not_found())?;

        let now = self.deps.clock.now();
        if !self.deps.participant_repository.touch(&parsed, now).await? {
            return Err(not_found());
        }

        tracing::debug!(participant = %parsed, "心跳");
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Participant>, ApplicationError> {
        Ok(self.deps.participant_repository.list().await?)
    }

    pub async fn is_active(&self, name: &str) -> Result<bool, ApplicationError> {
        self.directory.is_active(name).await
    }

    /// 无条件移除参与者并写入离开消息。返回是否真的移除了记录。
    pub async fn evict(&self, name: &ParticipantName) -> Result<bool, ApplicationError> {
        let removed = self.deps.participant_repository.delete(name).await?;
        if removed {
            self.record_leave(name).await?;
        }
        Ok(removed)
    }

    /// 清理任务使用：仅当参与者在 `now` 时刻仍然过期才移除。
    /// 快照之后到达的心跳会让删除条件失效，参与者保持在线。
    pub async fn evict_if_stale(
        &self,
        name: &ParticipantName,
        now: Timestamp,
    ) -> Result<bool, ApplicationError> {
        let cutoff = now - to_time_duration(self.deps.settings.inactivity_threshold);
        let removed = self
            .deps
            .participant_repository
            .delete_if_seen_before(name, cutoff)
            .await?;
        if removed {
            self.record_leave(name).await?;
        }
        Ok(removed)
    }

    async fn record_leave(&self, name: &ParticipantName) -> Result<(), ApplicationError> {
        let now = self.deps.clock.now();
        let status = Message::left(name.clone(), self.deps.ledger.broadcast_tag(), now);
        self.deps.ledger.record_status(status).await?;
        tracing::info!(participant = %name, "参与者离开");
        Ok(())
    }
}

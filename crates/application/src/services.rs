//! 服务装配
//!
//! 把存储、时钟和配置组装成注册表、消息账本和清理任务。

use std::sync::Arc;

use domain::{MessageRepository, ParticipantRepository};

use crate::{
    clock::Clock,
    ledger::{LedgerDependencies, LedgerSettings, MessageLedger},
    presence::{ActiveParticipants, PresenceDependencies, PresenceRegistry, PresenceSettings},
    sweeper::EvictionSweeper,
};

pub struct ChatServiceDependencies {
    pub participant_repository: Arc<dyn ParticipantRepository>,
    pub message_repository: Arc<dyn MessageRepository>,
    pub clock: Arc<dyn Clock>,
    pub presence: PresenceSettings,
    pub ledger: LedgerSettings,
}

#[derive(Clone)]
pub struct ChatServices {
    pub registry: Arc<PresenceRegistry>,
    pub ledger: Arc<MessageLedger>,
    clock: Arc<dyn Clock>,
}

impl ChatServices {
    pub fn new(deps: ChatServiceDependencies) -> Self {
        let directory = ActiveParticipants::new(deps.participant_repository.clone());
        let ledger = Arc::new(MessageLedger::new(LedgerDependencies {
            message_repository: deps.message_repository,
            directory: Arc::new(directory),
            clock: deps.clock.clone(),
            settings: deps.ledger,
        }));
        let registry = Arc::new(PresenceRegistry::new(PresenceDependencies {
            participant_repository: deps.participant_repository,
            ledger: ledger.clone(),
            clock: deps.clock.clone(),
            settings: deps.presence,
        }));
        Self {
            registry,
            ledger,
            clock: deps.clock,
        }
    }

    /// 创建清理任务；调用方负责 spawn 并在关闭时发送信号。
    pub fn sweeper(&self) -> EvictionSweeper {
        EvictionSweeper::new(self.registry.clone(), self.clock.clone())
    }
}

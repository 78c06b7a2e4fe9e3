//! 应用层实现。
//!
//! 在线状态注册表、消息账本与超时清理任务。存储与时钟通过 trait 注入，
//! 请求处理与清理任务之间只通过共享存储交互。

pub mod clock;
pub mod error;
pub mod ledger;
pub mod presence;
pub mod services;
pub mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::DeletePolicy;
pub use error::{ApplicationError, ApplicationResult, ErrorKind};
pub use ledger::{
    EditMessageRequest, LedgerDependencies, LedgerSettings, MessageLedger, PostMessageRequest,
};
pub use presence::{
    ActiveParticipants, ParticipantDirectory, PresenceDependencies, PresenceRegistry,
    PresenceSettings,
};
pub use services::{ChatServiceDependencies, ChatServices};
pub use sweeper::{EvictionSweeper, SweepReport};

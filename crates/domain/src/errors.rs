//! 领域模型错误定义
//!
//! 定义了系统中所有可能的错误类型，提供清晰的错误上下文。

use thiserror::Error;

use crate::value_objects::MessageId;

/// 领域模型错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 参数校验失败
    #[error("验证失败: {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    /// 同名参与者已在线
    #[error("参与者已存在: {name}")]
    ParticipantAlreadyExists { name: String },

    /// 参与者不存在（或已被清理）
    #[error("参与者不存在: {name}")]
    ParticipantNotFound { name: String },

    /// 发送者不是当前在线的参与者
    #[error("未知的发送者: {name}")]
    UnknownSender { name: String },

    /// 消息不存在
    #[error("消息不存在: {id}")]
    MessageNotFound { id: MessageId },

    /// 只有原发送者可以修改消息
    #[error("{editor} 不是消息 {id} 的发送者")]
    NotMessageOwner { id: MessageId, editor: String },

    /// 系统生成的状态消息不可修改
    #[error("状态消息不可修改: {id}")]
    StatusMessageImmutable { id: MessageId },
}

impl DomainError {
    /// 创建验证错误
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn participant_already_exists(name: impl Into<String>) -> Self {
        Self::ParticipantAlreadyExists { name: name.into() }
    }

    pub fn participant_not_found(name: impl Into<String>) -> Self {
        Self::ParticipantNotFound { name: name.into() }
    }

    pub fn unknown_sender(name: impl Into<String>) -> Self {
        Self::UnknownSender { name: name.into() }
    }

    pub fn not_message_owner(id: MessageId, editor: impl Into<String>) -> Self {
        Self::NotMessageOwner {
            id,
            editor: editor.into(),
        }
    }
}

/// 存储层错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("record already exists")]
    Conflict,
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl RepositoryError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

use serde::{Deserialize, Serialize};
use time::macros::format_description;

use crate::errors::DomainError;
use crate::value_objects::{
    MessageId, MessageKind, MessageText, ParticipantName, Recipient, Timestamp,
};

/// 进入房间的状态消息文本
pub const JOIN_STATUS_TEXT: &str = "entra na sala...";
/// 离开房间的状态消息文本
pub const LEAVE_STATUS_TEXT: &str = "sai da sala...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub from: ParticipantName,
    pub to: Recipient,
    pub text: MessageText,
    pub kind: MessageKind,
    pub created_at: Timestamp,
}

impl Message {
    /// 用户发送的普通消息或私聊消息。
    pub fn post(
        id: MessageId,
        from: ParticipantName,
        to: Recipient,
        text: MessageText,
        kind: MessageKind,
        created_at: Timestamp,
    ) -> Result<Self, DomainError> {
        if kind == MessageKind::Status {
            return Err(DomainError::invalid_argument(
                "type",
                "status messages are generated by the system",
            ));
        }
        Ok(Self {
            id,
            from,
            to,
            text,
            kind,
            created_at,
        })
    }

    pub fn joined(from: ParticipantName, broadcast_tag: &str, created_at: Timestamp) -> Self {
        Self::status(from, broadcast_tag, JOIN_STATUS_TEXT, created_at)
    }

    pub fn left(from: ParticipantName, broadcast_tag: &str, created_at: Timestamp) -> Self {
        Self::status(from, broadcast_tag, LEAVE_STATUS_TEXT, created_at)
    }

    fn status(
        from: ParticipantName,
        broadcast_tag: &str,
        text: &'static str,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: MessageId::generate(),
            from,
            to: Recipient::broadcast(broadcast_tag),
            text: MessageText::system(text),
            kind: MessageKind::Status,
            created_at,
        }
    }

    /// 原地替换接收方、正文和类型；发送者与时间保持不变。
    pub fn edit(
        &mut self,
        to: Recipient,
        text: MessageText,
        kind: MessageKind,
    ) -> Result<(), DomainError> {
        if self.kind == MessageKind::Status {
            return Err(DomainError::StatusMessageImmutable { id: self.id });
        }
        if kind == MessageKind::Status {
            return Err(DomainError::invalid_argument(
                "type",
                "status messages are generated by the system",
            ));
        }
        self.to = to;
        self.text = text;
        self.kind = kind;
        Ok(())
    }

    pub fn is_sent_by(&self, name: &str) -> bool {
        self.from.as_str() == name
    }

    /// 可见性规则：广播所有人可见；其余只对发送者和接收者可见。
    /// viewer 为空时只返回广播消息。
    pub fn is_visible_to(&self, viewer: Option<&str>, broadcast_tag: &str) -> bool {
        if self.to.is(broadcast_tag) {
            return true;
        }
        match viewer {
            Some(viewer) => self.to.is(viewer) || self.is_sent_by(viewer),
            None => false,
        }
    }

    /// 展示用时间，格式 HH:MM:SS。
    pub fn display_time(&self) -> String {
        self.created_at
            .format(format_description!("[hour]:[minute]:[second]"))
            .unwrap_or_default()
    }
}

//! 消息账本
//!
//! 负责消息的创建、按查看者过滤、以及带所有权校验的编辑与删除。

use std::sync::Arc;

use config::DeletePolicy;
use domain::{
    DomainError, Message, MessageId, MessageKind, MessageRepository, MessageText,
    ParticipantName, Recipient, RepositoryError, DEFAULT_BROADCAST_TAG,
};

use crate::{clock::Clock, error::ApplicationError, presence::ParticipantDirectory};

#[derive(Debug, Clone)]
pub struct PostMessageRequest {
    pub from: String, // 发送者（来自请求头）
    pub to: String,
    pub text: String,
    pub kind: String,
}

#[derive(Debug, Clone)]
pub struct EditMessageRequest {
    pub id: String,
    pub editor: String, // 编辑者（来自请求头）
    pub to: String,
    pub text: String,
    pub kind: String,
}

#[derive(Debug, Clone)]
pub struct LedgerSettings {
    pub broadcast_tag: String,
    pub delete_policy: DeletePolicy,
}

impl From<&config::MessagesConfig> for LedgerSettings {
    fn from(value: &config::MessagesConfig) -> Self {
        Self {
            broadcast_tag: value.broadcast_tag.clone(),
            delete_policy: value.delete_policy,
        }
    }
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            broadcast_tag: DEFAULT_BROADCAST_TAG.to_owned(),
            delete_policy: DeletePolicy::AnyParticipant,
        }
    }
}

pub struct LedgerDependencies {
    pub message_repository: Arc<dyn MessageRepository>,
    pub directory: Arc<dyn ParticipantDirectory>,
    pub clock: Arc<dyn Clock>,
    pub settings: LedgerSettings,
}

pub struct MessageLedger {
    deps: LedgerDependencies,
}

/// 通过校验的消息字段
struct Draft {
    to: Recipient,
    text: MessageText,
    kind: MessageKind,
}

fn validate(to: &str, text: &str, kind: &str) -> Result<Draft, ApplicationError> {
    let to = Recipient::parse(to).map_err(ApplicationError::Unprocessable)?;
    let text = MessageText::new(text).map_err(ApplicationError::Unprocessable)?;
    let kind = MessageKind::parse_user_kind(kind).map_err(ApplicationError::Unprocessable)?;
    Ok(Draft { to, text, kind })
}

fn parse_id(id: &str) -> Result<MessageId, ApplicationError> {
    id.parse().map_err(ApplicationError::Unprocessable)
}

impl MessageLedger {
    pub fn new(deps: LedgerDependencies) -> Self {
        Self { deps }
    }

    pub fn broadcast_tag(&self) -> &str {
        &self.deps.settings.broadcast_tag
    }

    async fn require_active(&self, name: &str) -> Result<ParticipantName, ApplicationError> {
        let unknown = || ApplicationError::Unprocessable(DomainError::unknown_sender(name));
        let parsed = ParticipantName::parse(name).map_err(|_| unknown())?;
        if !self.deps.directory.is_active(name).await? {
            return Err(unknown());
        }
        Ok(parsed)
    }

    /// 状态消息只由注册表在加入/离开时写入
    pub(crate) async fn record_status(&self, message: Message) -> Result<Message, ApplicationError> {
        debug_assert_eq!(message.kind, MessageKind::Status);
        Ok(self.deps.message_repository.append(message).await?)
    }

    pub async fn post(&self, request: PostMessageRequest) -> Result<Message, ApplicationError> {
        let draft = validate(&request.to, &request.text, &request.kind)?;
        let from = self.require_active(&request.from).await?;

        let message = Message::post(
            MessageId::generate(),
            from,
            draft.to,
            draft.text,
            draft.kind,
            self.deps.clock.now(),
        )
        .map_err(ApplicationError::Unprocessable)?;

        let saved = self.deps.message_repository.append(message).await?;
        tracing::debug!(message_id = %saved.id, from = %saved.from, to = %saved.to, "消息已保存");
        Ok(saved)
    }

    /// 查看者可见的全部消息（按插入顺序）。查看者为空时只返回广播消息。
    pub async fn list_visible(&self, viewer: Option<&str>) -> Result<Vec<Message>, ApplicationError> {
        let viewer = viewer.filter(|v| !v.is_empty());
        let tag = self.broadcast_tag();
        let messages = self.deps.message_repository.list().await?;
        Ok(messages
            .into_iter()
            .filter(|m| m.is_visible_to(viewer, tag))
            .collect())
    }

    /// 同 `list_visible`，limit 为正数时只保留最后 limit 条。
    pub async fn list_visible_tail(
        &self,
        viewer: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Message>, ApplicationError> {
        let mut visible = self.list_visible(viewer).await?;
        if let Some(limit) = limit.filter(|l| *l > 0) {
            let skip = visible.len().saturating_sub(limit);
            visible.drain(..skip);
        }
        Ok(visible)
    }

    /// 只有原发送者可以编辑；所有权校验先于字段校验。
    pub async fn edit(&self, request: EditMessageRequest) -> Result<Message, ApplicationError> {
        let id = parse_id(&request.id)?;
        let mut message = self
            .deps
            .message_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::Unprocessable(DomainError::MessageNotFound { id }))?;

        if !message.is_sent_by(&request.editor) {
            return Err(ApplicationError::Forbidden(DomainError::not_message_owner(
                id,
                request.editor,
            )));
        }

        let draft = validate(&request.to, &request.text, &request.kind)?;
        self.require_active(&request.editor).await?;

        message
            .edit(draft.to, draft.text, draft.kind)
            .map_err(ApplicationError::Unprocessable)?;

        match self.deps.message_repository.update(message).await {
            Ok(updated) => {
                tracing::debug!(message_id = %updated.id, "消息已编辑");
                Ok(updated)
            }
            Err(RepositoryError::NotFound) => Err(ApplicationError::Unprocessable(
                DomainError::MessageNotFound { id },
            )),
            Err(err) => Err(err.into()),
        }
    }

    /// 按 id 删除，不存在时视为成功。默认策略下不校验请求者身份
    /// （与编辑不同），`OwnerOnly` 策略下要求请求者是发送者。
    pub async fn delete(&self, id: &str, requester: Option<&str>) -> Result<bool, ApplicationError> {
        let id = parse_id(id)?;

        if self.deps.settings.delete_policy == DeletePolicy::OwnerOnly {
            let Some(message) = self.deps.message_repository.find_by_id(id).await? else {
                return Ok(false);
            };
            let requester = requester.unwrap_or_default();
            if !message.is_sent_by(requester) {
                return Err(ApplicationError::Forbidden(DomainError::not_message_owner(
                    id, requester,
                )));
            }
        }

        let removed = self.deps.message_repository.delete(id).await?;
        if removed {
            tracing::debug!(message_id = %id, requester = ?requester, "消息已删除");
        }
        Ok(removed)
    }
}

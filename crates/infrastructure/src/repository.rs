//! PostgreSQL 存储实现

use async_trait::async_trait;
use domain::{
    Message, MessageId, MessageKind, MessageRepository, MessageText, Participant,
    ParticipantName, ParticipantRepository, Recipient, RepositoryError, RepositoryResult,
    Timestamp,
};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

pub(crate) fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::Conflict,
        sqlx::Error::RowNotFound => RepositoryError::NotFound,
        _ => {
            tracing::error!(error = %err, "数据库操作失败");
            RepositoryError::storage(err.to_string())
        }
    }
}

fn invalid_data(message: impl Into<String>) -> RepositoryError {
    RepositoryError::storage(message)
}

#[derive(Debug, FromRow)]
struct ParticipantRecord {
    name: String,
    last_seen: OffsetDateTime,
}

impl TryFrom<ParticipantRecord> for Participant {
    type Error = RepositoryError;

    fn try_from(value: ParticipantRecord) -> Result<Self, Self::Error> {
        let name =
            ParticipantName::parse(value.name).map_err(|err| invalid_data(err.to_string()))?;
        Ok(Participant {
            name,
            last_seen: value.last_seen,
        })
    }
}

#[derive(Debug, FromRow)]
struct MessageRecord {
    id: Uuid,
    sender: String,
    recipient: String,
    body: String,
    kind: String,
    created_at: OffsetDateTime,
}

impl TryFrom<MessageRecord> for Message {
    type Error = RepositoryError;

    fn try_from(value: MessageRecord) -> Result<Self, Self::Error> {
        let invalid = |err: domain::DomainError| invalid_data(err.to_string());
        Ok(Message {
            id: MessageId::from(value.id),
            from: ParticipantName::parse(value.sender).map_err(invalid)?,
            to: Recipient::parse(value.recipient).map_err(invalid)?,
            text: MessageText::new(value.body).map_err(invalid)?,
            kind: value.kind.parse::<MessageKind>().map_err(invalid)?,
            created_at: value.created_at,
        })
    }
}

#[derive(Clone)]
pub struct PgParticipantRepository {
    pool: PgPool,
}

impl PgParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipantRepository for PgParticipantRepository {
    async fn create(&self, participant: Participant) -> RepositoryResult<Participant> {
        // 主键冲突时不插入，由 RETURNING 是否有行判断
        let record = sqlx::query_as::<_, ParticipantRecord>(
            r#"
            INSERT INTO participants (name, last_seen)
            VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING
            RETURNING name, last_seen
            "#,
        )
        .bind(participant.name.as_str())
        .bind(participant.last_seen)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record
            .ok_or(RepositoryError::Conflict)
            .and_then(Participant::try_from)
    }

    async fn find_by_name(
        &self,
        name: &ParticipantName,
    ) -> RepositoryResult<Option<Participant>> {
        let record = sqlx::query_as::<_, ParticipantRecord>(
            r#"SELECT name, last_seen FROM participants WHERE name = $1"#,
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(Participant::try_from).transpose()
    }

    async fn touch(&self, name: &ParticipantName, at: Timestamp) -> RepositoryResult<bool> {
        let result = sqlx::query(r#"UPDATE participants SET last_seen = $2 WHERE name = $1"#)
            .bind(name.as_str())
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, name: &ParticipantName) -> RepositoryResult<bool> {
        let result = sqlx::query(r#"DELETE FROM participants WHERE name = $1"#)
            .bind(name.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_if_seen_before(
        &self,
        name: &ParticipantName,
        cutoff: Timestamp,
    ) -> RepositoryResult<bool> {
        let result =
            sqlx::query(r#"DELETE FROM participants WHERE name = $1 AND last_seen < $2"#)
                .bind(name.as_str())
                .bind(cutoff)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> RepositoryResult<Vec<Participant>> {
        let records =
            sqlx::query_as::<_, ParticipantRecord>(r#"SELECT name, last_seen FROM participants"#)
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_err)?;

        records.into_iter().map(Participant::try_from).collect()
    }
}

#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn append(&self, message: Message) -> RepositoryResult<Message> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            INSERT INTO messages (id, sender, recipient, body, kind, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, sender, recipient, body, kind, created_at
            "#,
        )
        .bind(Uuid::from(message.id))
        .bind(message.from.as_str())
        .bind(message.to.as_str())
        .bind(message.text.as_str())
        .bind(message.kind.as_str())
        .bind(message.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Message::try_from(record)
    }

    async fn find_by_id(&self, id: MessageId) -> RepositoryResult<Option<Message>> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"SELECT id, sender, recipient, body, kind, created_at FROM messages WHERE id = $1"#,
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(Message::try_from).transpose()
    }

    async fn update(&self, message: Message) -> RepositoryResult<Message> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            UPDATE messages
            SET recipient = $2, body = $3, kind = $4
            WHERE id = $1
            RETURNING id, sender, recipient, body, kind, created_at
            "#,
        )
        .bind(Uuid::from(message.id))
        .bind(message.to.as_str())
        .bind(message.text.as_str())
        .bind(message.kind.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record
            .ok_or(RepositoryError::NotFound)
            .and_then(Message::try_from)
    }

    async fn delete(&self, id: MessageId) -> RepositoryResult<bool> {
        let result = sqlx::query(r#"DELETE FROM messages WHERE id = $1"#)
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> RepositoryResult<Vec<Message>> {
        let records = sqlx::query_as::<_, MessageRecord>(
            r#"SELECT id, sender, recipient, body, kind, created_at FROM messages ORDER BY seq"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        records.into_iter().map(Message::try_from).collect()
    }
}

pub async fn create_pg_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

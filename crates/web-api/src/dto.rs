use domain::{Message, Participant};
use serde::{Deserialize, Serialize};

/// `GET /participants` 的元素，`lastStatus` 为 Unix 毫秒时间戳。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub name: String,
    pub last_status: i64,
}

impl From<Participant> for ParticipantDto {
    fn from(value: Participant) -> Self {
        Self {
            name: value.name.as_str().to_owned(),
            last_status: (value.last_seen.unix_timestamp_nanos() / 1_000_000) as i64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: String,
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub time: String,
}

impl From<Message> for MessageDto {
    fn from(value: Message) -> Self {
        Self {
            time: value.display_time(),
            id: value.id.to_string(),
            from: value.from.as_str().to_owned(),
            to: value.to.as_str().to_owned(),
            text: value.text.as_str().to_owned(),
            kind: value.kind.as_str().to_owned(),
        }
    }
}

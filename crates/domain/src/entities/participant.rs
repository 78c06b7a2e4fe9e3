use serde::{Deserialize, Serialize};
use time::Duration;

use crate::value_objects::{ParticipantName, Timestamp};

/// 当前在线的聊天身份。同一名称同时最多存在一个。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: ParticipantName,
    pub last_seen: Timestamp,
}

impl Participant {
    pub fn join(name: ParticipantName, now: Timestamp) -> Self {
        Self {
            name,
            last_seen: now,
        }
    }

    pub fn heartbeat(&mut self, now: Timestamp) {
        self.last_seen = now;
    }

    /// 距上次心跳严格超过阈值才算过期。
    pub fn is_stale(&self, now: Timestamp, threshold: Duration) -> bool {
        now - self.last_seen > threshold
    }
}

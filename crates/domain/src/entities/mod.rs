//! 领域实体定义
//!
//! 在线参与者与消息。

pub mod message;
pub mod participant;

pub use message::{Message, JOIN_STATUS_TEXT, LEAVE_STATUS_TEXT};
pub use participant::Participant;

//! Web API 层。
//!
//! 提供 Axum 路由，将 HTTP 请求委托给在线状态注册表与消息账本。

mod dto;
mod error;
mod routes;
mod state;

pub use dto::{MessageDto, ParticipantDto};
pub use error::{ApiError, ErrorBody};
pub use routes::{cors_layer, router, UserHeader, USER_HEADER};
pub use state::AppState;

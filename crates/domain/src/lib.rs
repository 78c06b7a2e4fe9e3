//! 聊天室系统核心领域模型
//!
//! 包含在线参与者、消息等核心实体，以及存储接口。

pub mod entities;
pub mod errors;
pub mod repository;
pub mod value_objects;

// 重新导出常用类型
pub use entities::*;
pub use errors::*;
pub use repository::*;
pub use value_objects::*;

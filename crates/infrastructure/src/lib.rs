//! 基础设施层实现。
//!
//! 提供存储适配器（内存与 PostgreSQL），实现领域层定义的存储接口。

pub mod memory;
pub mod migrations;
pub mod repository;

pub use memory::{MemoryMessageRepository, MemoryParticipantRepository};
pub use migrations::MIGRATOR;
pub use repository::{create_pg_pool, PgMessageRepository, PgParticipantRepository};

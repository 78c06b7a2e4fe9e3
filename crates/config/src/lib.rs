//! 统一配置中心
//!
//! 提供应用的全局配置管理，包括：
//! - 服务监听地址
//! - 可选的数据库连接（未配置时使用内存存储）
//! - 在线状态心跳与清理节奏
//! - 消息广播标识与删除策略
//!
//! 加载顺序：默认值 -> 可选配置文件（`APP_CONFIG_FILE`）-> 环境变量（`APP_*`，`__` 分隔层级）。

use std::time::Duration;

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    /// 服务配置
    #[validate(nested)]
    pub server: ServerConfig,
    /// 数据库配置
    #[validate(nested)]
    pub database: DatabaseConfig,
    /// 在线状态配置
    #[validate(nested)]
    pub presence: PresenceConfig,
    /// 消息配置
    #[validate(nested)]
    pub messages: MessagesConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    #[validate(length(min = 1))]
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// 数据库配置，`url` 为空时使用内存存储
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    #[serde(default)]
    #[validate(url)]
    pub url: Option<String>,
    #[validate(range(min = 1))]
    pub max_connections: u32,
}

/// 心跳超时与清理任务节奏，两者相互独立
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PresenceConfig {
    #[validate(range(min = 1))]
    pub inactivity_threshold_secs: u64,
    #[validate(range(min = 1))]
    pub sweep_interval_secs: u64,
}

impl PresenceConfig {
    pub fn inactivity_threshold(&self) -> Duration {
        Duration::from_secs(self.inactivity_threshold_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// 消息删除策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// 任何请求者都可以按 id 删除（与编辑的所有权校验不对称）
    #[default]
    AnyParticipant,
    /// 只有发送者本人可以删除
    OwnerOnly,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MessagesConfig {
    #[validate(length(min = 1))]
    pub broadcast_tag: String,
    #[serde(default)]
    pub delete_policy: DeletePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 5000,
                cors_origins: vec!["*".into()],
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
            },
            presence: PresenceConfig {
                inactivity_threshold_secs: 10,
                sweep_interval_secs: 15,
            },
            messages: MessagesConfig {
                broadcast_tag: "Todos".into(),
                delete_policy: DeletePolicy::AnyParticipant,
            },
        }
    }
}

impl AppConfig {
    /// 从默认值、可选配置文件与环境变量加载
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// 组装配置来源，方便测试时替换
    pub fn figment() -> Figment {
        let mut fig = Figment::new().merge(Serialized::defaults(AppConfig::default()));
        if let Ok(path) = std::env::var("APP_CONFIG_FILE") {
            if path.ends_with(".yml") || path.ends_with(".yaml") {
                fig = fig.merge(Yaml::file(path));
            } else if path.ends_with(".json") {
                fig = fig.merge(Json::file(path));
            } else {
                fig = fig.merge(Toml::file(path));
            }
        }
        fig.merge(Env::prefixed("APP_").split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let cfg: AppConfig = figment.extract().map_err(Box::new)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// 监听地址
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 日志用的脱敏表示，隐藏数据库凭据
    pub fn sanitize(&self) -> String {
        let database = match &self.database.url {
            Some(url) => url.rsplit('@').next().unwrap_or("unknown").to_owned(),
            None => "memory".to_owned(),
        };
        format!(
            "bind={} database={} threshold={}s sweep={}s broadcast_tag={} delete_policy={:?}",
            self.bind_address(),
            database,
            self.presence.inactivity_threshold_secs,
            self.presence.sweep_interval_secs,
            self.messages.broadcast_tag,
            self.messages.delete_policy,
        )
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.presence.inactivity_threshold(), Duration::from_secs(10));
        assert_eq!(config.presence.sweep_interval(), Duration::from_secs(15));
        assert_eq!(config.messages.broadcast_tag, "Todos");
        assert!(config.database.url.is_none());
    }

    #[test]
    fn env_overrides_nested_keys() {
        Jail::expect_with(|jail| {
            jail.set_env("APP_SERVER__PORT", "8081");
            jail.set_env("APP_PRESENCE__INACTIVITY_THRESHOLD_SECS", "30");
            jail.set_env("APP_MESSAGES__DELETE_POLICY", "owner_only");

            let config = AppConfig::load().expect("config");
            assert_eq!(config.server.port, 8081);
            assert_eq!(config.presence.inactivity_threshold_secs, 30);
            assert_eq!(config.presence.sweep_interval_secs, 15);
            assert_eq!(config.messages.delete_policy, DeletePolicy::OwnerOnly);
            Ok(())
        });
    }

    #[test]
    fn config_file_is_merged() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "chat.toml",
                r#"
                [messages]
                broadcast_tag = "everyone"
                "#,
            )?;
            jail.set_env("APP_CONFIG_FILE", "chat.toml");

            let config = AppConfig::load().expect("config");
            assert_eq!(config.messages.broadcast_tag, "everyone");
            Ok(())
        });
    }

    #[test]
    fn zero_sweep_interval_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("APP_PRESENCE__SWEEP_INTERVAL_SECS", "0");
            assert!(matches!(AppConfig::load(), Err(ConfigError::Invalid(_))));
            Ok(())
        });
    }

    #[test]
    fn empty_broadcast_tag_is_rejected() {
        let mut config = AppConfig::default();
        config.messages.broadcast_tag.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn sanitize_hides_credentials() {
        let mut config = AppConfig::default();
        config.database.url = Some("postgres://user:secret@db:5432/chat".into());
        let text = config.sanitize();
        assert!(!text.contains("secret"));
        assert!(text.contains("db:5432/chat"));
    }
}

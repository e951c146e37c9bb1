//! 统一配置中心
//!
//! 提供应用的全局配置管理，包括：
//! - 运行层级与日志
//! - JWT认证
//! - 队列存储后端
//! - 聊天分发与事件推送的节奏参数
//!
//! 加载顺序：内置默认值 -> 可选配置文件（`APP_CONFIG_FILE`）-> `APP_*` 环境变量。

use std::time::Duration;

use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_ENV: &str = "APP_CONFIG_FILE";
pub const ENV_PREFIX: &str = "APP_";

const MIN_SECRET_LEN: usize = 32;

/// 运行层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Dev,
    Rc,
    Prod,
    Test,
}

impl Tier {
    /// 预发与生产层级需要严格的安全配置
    pub fn is_production(self) -> bool {
        matches!(self, Tier::Rc | Tier::Prod)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Redis,
}

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tier: Tier,
    pub server: ServerConfig,
    pub log: LogConfig,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub chat: ChatConfig,
    pub notifier: NotifierConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
    /// 打开后默认日志级别从 info 降到 debug
    pub debug: bool,
}

/// JWT配置
///
/// 服务只校验外部签发的 token，过期时间由 token 自身的 `exp` 决定。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub redis_url: String,
}

/// 聊天分发配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub tick_interval_ms: u64,
    pub idle_deadline_ms: u64,
    /// 每个会话出站通道的容量
    pub channel_capacity: usize,
    /// 业务失败模拟的触发文本，为空或缺省时关闭
    pub simulated_failure_text: Option<String>,
}

/// 事件推送配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    pub poll_interval_ms: u64,
    pub tries_limit: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tier: Tier::Dev,
            server: ServerConfig::default(),
            log: LogConfig::default(),
            jwt: JwtConfig::default(),
            storage: StorageConfig::default(),
            chat: ChatConfig::default(),
            notifier: NotifierConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            debug: false,
        }
    }
}

impl Default for JwtConfig {
    /// 开发用密钥，生产层级下会被 [`AppConfig::validate`] 拒绝
    fn default() -> Self {
        Self {
            secret: "dev-secret-key-not-for-production-use-minimum-32-chars".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            idle_deadline_ms: 4000,
            channel_capacity: 32,
            simulated_failure_text: Some("error".to_string()),
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            tries_limit: 10,
        }
    }
}

impl ChatConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn idle_deadline(&self) -> Duration {
        Duration::from_millis(self.idle_deadline_ms)
    }
}

impl NotifierConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl AppConfig {
    /// 按优先级组装配置来源，不做校验
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));
        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            figment = if path.ends_with(".yml") || path.ends_with(".yaml") {
                figment.merge(Yaml::file(path))
            } else if path.ends_with(".json") {
                figment.merge(Json::file(path))
            } else {
                figment.merge(Toml::file(path))
            };
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// 加载并校验配置
    pub fn load() -> Result<Self, ConfigError> {
        let config: AppConfig = Self::figment().extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.is_empty() {
            return Err(ConfigError::InvalidServerConfig(
                "host cannot be empty".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::InvalidServerConfig(
                "port must be greater than 0".to_string(),
            ));
        }

        // 生产层级：密钥长度至少256位，且不允许开发密钥
        if self.tier.is_production() {
            if self.jwt.secret.len() < MIN_SECRET_LEN {
                return Err(ConfigError::InvalidJwtSecret(format!(
                    "JWT secret must be at least {MIN_SECRET_LEN} characters long"
                )));
            }
            if self.jwt.secret.contains("dev-secret")
                || self.jwt.secret.contains("not-for-production")
            {
                return Err(ConfigError::InvalidJwtSecret(
                    "Cannot use development JWT secret in production".to_string(),
                ));
            }
        } else if self.jwt.secret.is_empty() {
            return Err(ConfigError::InvalidJwtSecret(
                "JWT secret cannot be empty".to_string(),
            ));
        }

        if self.storage.backend == StorageBackend::Redis && self.storage.redis_url.is_empty() {
            return Err(ConfigError::InvalidStorage(
                "redis backend requires redis_url".to_string(),
            ));
        }

        if self.chat.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroValue("chat.tick_interval_ms"));
        }
        if self.chat.idle_deadline_ms == 0 {
            return Err(ConfigError::ZeroValue("chat.idle_deadline_ms"));
        }
        if self.chat.channel_capacity == 0 {
            return Err(ConfigError::ZeroValue("chat.channel_capacity"));
        }
        if self.notifier.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroValue("notifier.poll_interval_ms"));
        }
        if self.notifier.tries_limit == 0 {
            return Err(ConfigError::ZeroValue("notifier.tries_limit"));
        }

        Ok(())
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("Invalid JWT secret: {0}")]
    InvalidJwtSecret(String),
    #[error("Invalid server configuration: {0}")]
    InvalidServerConfig(String),
    #[error("Invalid storage configuration: {0}")]
    InvalidStorage(String),
    #[error("{0} must be greater than 0")]
    ZeroValue(&'static str),
}

use serde::{Deserialize, Serialize};

/// 应用配置（从 TOML 加载，启动时使用）
///
/// 优先级：ENV > config.toml > 默认值
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub codes: CodeConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub redirect: RedirectConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Environment variable prefix, e.g. `SNAPLINK__SERVER__PORT=9999`.
pub const ENV_PREFIX: &str = "SNAPLINK";

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

impl AppConfig {
    /// Load configuration from a TOML file and the environment.
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load(path: Option<&str>) -> crate::errors::Result<Self> {
        use config::{Config, Environment, File};

        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

        let settings = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖，前缀 SNAPLINK，分隔符 __
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;

        if std::path::Path::new(path).exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path);
        }
        Ok(config)
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> crate::errors::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::errors::SnaplinkError::serialization(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `memory` keeps links in-process; anything else is inferred from `database_url`.
    #[serde(default = "default_database_backend")]
    pub backend: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
}

/// Short code generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeConfig {
    #[serde(default = "default_code_length")]
    pub length: usize,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// JSON API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_prefix")]
    pub prefix: String,
}

/// Redirect endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectConfig {
    /// One of 301, 302, 307, 308.
    #[serde(default = "default_redirect_status")]
    pub status: u16,
    /// Per client IP; 0 disables the limiter.
    #[serde(default = "default_redirect_rate_limit")]
    pub rate_limit_per_minute: u32,
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_cors_max_age")]
    pub max_age: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default)]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_backend() -> String {
    "sqlite".to_string()
}

fn default_database_url() -> String {
    "sqlite://snaplink.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_code_length() -> usize {
    crate::utils::code_generator::DEFAULT_CODE_LENGTH
}

fn default_max_attempts() -> u32 {
    crate::services::DEFAULT_MAX_ATTEMPTS
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

fn default_redirect_status() -> u16 {
    307
}

fn default_redirect_rate_limit() -> u32 {
    10
}

fn default_cors_max_age() -> usize {
    3600
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: default_database_backend(),
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
        }
    }
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            length: default_code_length(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            prefix: default_api_prefix(),
        }
    }
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            status: default_redirect_status(),
            rate_limit_per_minute: default_redirect_rate_limit(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allowed_origins: Vec::new(),
            max_age: default_cors_max_age(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: false,
        }
    }
}

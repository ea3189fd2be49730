use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnaplinkError {
    InvalidUrl(String),
    NotFound(String),
    AlreadyExists(String),
    CapacityExhausted(String),
    Validation(String),
    Config(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Serialization(String),
    FileOperation(String),
}

impl SnaplinkError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            SnaplinkError::InvalidUrl(_) => "E001",
            SnaplinkError::NotFound(_) => "E002",
            SnaplinkError::AlreadyExists(_) => "E003",
            SnaplinkError::CapacityExhausted(_) => "E004",
            SnaplinkError::Validation(_) => "E005",
            SnaplinkError::Config(_) => "E006",
            SnaplinkError::DatabaseConfig(_) => "E007",
            SnaplinkError::DatabaseConnection(_) => "E008",
            SnaplinkError::DatabaseOperation(_) => "E009",
            SnaplinkError::Serialization(_) => "E010",
            SnaplinkError::FileOperation(_) => "E011",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            SnaplinkError::InvalidUrl(_) => "Invalid URL",
            SnaplinkError::NotFound(_) => "Resource Not Found",
            SnaplinkError::AlreadyExists(_) => "Resource Already Exists",
            SnaplinkError::CapacityExhausted(_) => "Capacity Exhausted",
            SnaplinkError::Validation(_) => "Validation Error",
            SnaplinkError::Config(_) => "Configuration Error",
            SnaplinkError::DatabaseConfig(_) => "Database Configuration Error",
            SnaplinkError::DatabaseConnection(_) => "Database Connection Error",
            SnaplinkError::DatabaseOperation(_) => "Database Operation Error",
            SnaplinkError::Serialization(_) => "Serialization Error",
            SnaplinkError::FileOperation(_) => "File Operation Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            SnaplinkError::InvalidUrl(msg)
            | SnaplinkError::NotFound(msg)
            | SnaplinkError::AlreadyExists(msg)
            | SnaplinkError::CapacityExhausted(msg)
            | SnaplinkError::Validation(msg)
            | SnaplinkError::Config(msg)
            | SnaplinkError::DatabaseConfig(msg)
            | SnaplinkError::DatabaseConnection(msg)
            | SnaplinkError::DatabaseOperation(msg)
            | SnaplinkError::Serialization(msg)
            | SnaplinkError::FileOperation(msg) => msg,
        }
    }

    /// HTTP status the API layer answers with for this error.
    ///
    /// `AlreadyExists` is consumed by the create flow and should never reach
    /// a handler; it still maps to 409 so a leak is visible rather than a 500.
    pub fn http_status(&self) -> StatusCode {
        match self {
            SnaplinkError::InvalidUrl(_) | SnaplinkError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            SnaplinkError::NotFound(_) => StatusCode::NOT_FOUND,
            SnaplinkError::AlreadyExists(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for SnaplinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for SnaplinkError {}

// 便捷的构造函数
impl SnaplinkError {
    pub fn invalid_url<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::InvalidUrl(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::NotFound(msg.into())
    }

    pub fn already_exists<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::AlreadyExists(msg.into())
    }

    pub fn capacity_exhausted<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::CapacityExhausted(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::Validation(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::Config(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::DatabaseOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::Serialization(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::FileOperation(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SnaplinkError::NotFound(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, SnaplinkError::AlreadyExists(_))
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for SnaplinkError {
    fn from(err: sea_orm::DbErr) -> Self {
        SnaplinkError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for SnaplinkError {
    fn from(err: std::io::Error) -> Self {
        SnaplinkError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for SnaplinkError {
    fn from(err: serde_json::Error) -> Self {
        SnaplinkError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for SnaplinkError {
    fn from(err: config::ConfigError) -> Self {
        SnaplinkError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SnaplinkError>;

//! URL 验证模块
//!
//! Destinations must be absolute `http`/`https` URLs with a host. Script-like
//! schemes are reported separately so logs show what was attempted.

use url::Url;

/// URL 验证错误
#[derive(Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    EmptyUrl,
    InvalidProtocol(String),
    DangerousProtocol(String),
    MissingHost,
    InvalidFormat(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::InvalidProtocol(proto) => write!(
                f,
                "Invalid protocol: {}. Only http:// and https:// are allowed",
                proto
            ),
            Self::DangerousProtocol(proto) => {
                write!(f, "Dangerous protocol blocked: {}", proto)
            }
            Self::MissingHost => write!(f, "URL must include a host"),
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
        }
    }
}

impl std::error::Error for UrlValidationError {}

/// 危险协议列表
const DANGEROUS_PROTOCOLS: &[&str] = &[
    "javascript:",
    "data:",
    "file:",
    "vbscript:",
    "about:",
    "blob:",
];

/// Validate a destination URL and return its normalized serialization.
///
/// The parser drops tab and newline characters and percent-encodes non-ASCII
/// path bytes, so the returned string is always a valid `Location` value.
///
/// 检查项目：
/// 1. URL 不为空
/// 2. 不是危险协议（javascript:, data:, file: 等）
/// 3. 必须是 http:// 或 https://
/// 4. URL 格式有效且包含 host
pub fn validate_url(url: &str) -> Result<String, UrlValidationError> {
    let url = url.trim();

    if url.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    let url_lower = url.to_lowercase();

    if let Some(proto) = DANGEROUS_PROTOCOLS
        .iter()
        .find(|proto| url_lower.starts_with(**proto))
    {
        return Err(UrlValidationError::DangerousProtocol(proto.to_string()));
    }

    if !url_lower.starts_with("http://") && !url_lower.starts_with("https://") {
        let proto = match url_lower.split_once(':') {
            Some((scheme, _)) => format!("{}:", scheme),
            None => "none".to_string(),
        };
        return Err(UrlValidationError::InvalidProtocol(proto));
    }

    let parsed = Url::parse(url).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;
    if parsed.host_str().is_none_or(|h| h.is_empty()) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(parsed.into())
}

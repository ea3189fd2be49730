//! 配置值验证模块
//!
//! Startup-time checks for values that would otherwise only fail at request time.

use super::AppConfig;
use crate::errors::{Result, SnaplinkError};
use crate::utils::code_generator::{MAX_CODE_LENGTH, MIN_CODE_LENGTH};

/// Redirect statuses the redirect endpoint is allowed to answer with.
pub const ALLOWED_REDIRECT_STATUSES: &[u16] = &[301, 302, 307, 308];

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&self.codes.length) {
            return Err(SnaplinkError::config(format!(
                "codes.length must be between {} and {}, got {}",
                MIN_CODE_LENGTH, MAX_CODE_LENGTH, self.codes.length
            )));
        }

        if self.codes.max_attempts == 0 {
            return Err(SnaplinkError::config(
                "codes.max_attempts must be at least 1",
            ));
        }

        if !ALLOWED_REDIRECT_STATUSES.contains(&self.redirect.status) {
            return Err(SnaplinkError::config(format!(
                "redirect.status must be one of {:?}, got {}",
                ALLOWED_REDIRECT_STATUSES, self.redirect.status
            )));
        }

        validate_api_prefix(&self.api.prefix)?;

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(SnaplinkError::config(format!(
                "logging.format must be 'text' or 'json', got '{}'",
                self.logging.format
            )));
        }

        Ok(())
    }
}

/// The API prefix must be a non-root absolute path so it never shadows redirects.
fn validate_api_prefix(prefix: &str) -> Result<()> {
    let trimmed = prefix.trim_end_matches('/');
    if !trimmed.starts_with('/') || trimmed.len() < 2 {
        return Err(SnaplinkError::config(format!(
            "api.prefix must be an absolute, non-root path like '/api/v1', got '{}'",
            prefix
        )));
    }
    Ok(())
}

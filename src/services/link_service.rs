//! Link management service
//!
//! Validates destinations, runs the generate → insert → retry loop, and
//! otherwise delegates to the [`LinkStore`]. Holds no state between calls.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::CodeConfig;
use crate::errors::{Result, SnaplinkError};
use crate::storage::{LinkRecord, LinkStore};
use crate::utils::{CodeGenerator, validate_url};

/// Default bound on generate/insert attempts per create.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Service for link management operations
#[derive(Clone)]
pub struct LinkService {
    store: Arc<dyn LinkStore>,
    generator: CodeGenerator,
    max_attempts: u32,
}

impl LinkService {
    pub fn new(store: Arc<dyn LinkStore>, generator: CodeGenerator, max_attempts: u32) -> Self {
        Self {
            store,
            generator,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn from_config(store: Arc<dyn LinkStore>, config: &CodeConfig) -> Self {
        Self::new(store, CodeGenerator::new(config.length), config.max_attempts)
    }

    pub fn store(&self) -> &Arc<dyn LinkStore> {
        &self.store
    }

    fn checked_destination(destination: &str) -> Result<String> {
        validate_url(destination).map_err(|e| {
            warn!("LinkService: rejected destination: {}", e);
            SnaplinkError::invalid_url(e.to_string())
        })
    }

    /// Create a new short link with a generated code.
    pub async fn create(&self, destination: &str) -> Result<LinkRecord> {
        let destination = Self::checked_destination(destination)?;

        for attempt in 1..=self.max_attempts {
            let code = self.generator.generate();
            match self.store.insert(&code, &destination).await {
                Ok(record) => {
                    info!(
                        "LinkService: created link '{}' -> '{}'",
                        record.code, record.destination
                    );
                    return Ok(record);
                }
                Err(e) if e.is_already_exists() => {
                    warn!(
                        "LinkService: code collision on '{}' (attempt {}/{})",
                        code, attempt, self.max_attempts
                    );
                }
                Err(e) => return Err(e),
            }
        }

        error!(
            "LinkService: no free code after {} attempts",
            self.max_attempts
        );
        Err(SnaplinkError::capacity_exhausted(format!(
            "Could not generate a unique code after {} attempts",
            self.max_attempts
        )))
    }

    /// Look up the destination and count the click.
    pub async fn resolve(&self, code: &str) -> Result<LinkRecord> {
        self.store.resolve_and_increment(code).await
    }

    pub async fn stats(&self, code: &str) -> Result<LinkRecord> {
        self.store.get(code).await
    }

    pub async fn update(&self, code: &str, destination: &str) -> Result<LinkRecord> {
        let destination = Self::checked_destination(destination)?;
        let record = self.store.update(code, &destination).await?;
        info!(
            "LinkService: updated '{}' -> '{}'",
            record.code, record.destination
        );
        Ok(record)
    }

    pub async fn remove(&self, code: &str) -> Result<()> {
        self.store.delete(code).await?;
        info!("LinkService: deleted '{}'", code);
        Ok(())
    }
}

use serde::Deserialize;

use crate::error::DispatchError;

/// Dispatch tuning loaded from environment variables.
///
/// `batch_size` is how many messages the backend accepts per physical batch;
/// `wave_width` is how many batches may be in flight at once. Both default
/// to 1 when unset, which degenerates to single-message batches dispatched
/// fully serially.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Maximum messages per batch (default: 1)
    pub batch_size: usize,

    /// Maximum batches dispatched concurrently (default: 1)
    pub wave_width: usize,
}

impl DispatchConfig {
    pub fn new(batch_size: usize, wave_width: usize) -> Result<Self, DispatchError> {
        let config = Self {
            batch_size,
            wave_width,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            batch_size: std::env::var("HERALD_BATCH_SIZE")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("HERALD_BATCH_SIZE must be a valid usize"))?,
            wave_width: std::env::var("HERALD_WAVE_WIDTH")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("HERALD_WAVE_WIDTH must be a valid usize"))?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject zero sizes before any dispatch work begins.
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.batch_size == 0 {
            return Err(DispatchError::Config(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.wave_width == 0 {
            return Err(DispatchError::Config(
                "wave_width must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1,
            wave_width: 1,
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::{LipSyncError, Result};

/// Configuration for the lip sync engine.
///
/// `window_size` is the length of the time-domain analysis window; the
/// frequency buffer holds `window_size / 2` dB-scale bins. Both are
/// fixed for the lifetime of an `init`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Default sample rate assumed before a source is bound.
    pub sample_rate: u32,
    /// Analysis window length in samples. Must be a power of two.
    pub window_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            window_size: 2048,
        }
    }
}

impl EngineConfig {
    /// Checks that the configured buffer geometry is usable. Called at
    /// the `init` boundary; malformed geometry is a contract violation,
    /// not a per-frame recoverable condition.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate < 8_000 {
            return Err(LipSyncError::InvalidInput(
                "sample rate must be at least 8000 Hz",
            ));
        }
        if !self.window_size.is_power_of_two() || self.window_size < 256 {
            return Err(LipSyncError::InvalidInput(
                "analysis window must be a power of two of at least 256 samples",
            ));
        }
        Ok(())
    }
}

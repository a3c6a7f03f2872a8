//! Configuration for delorean-wal
//!
//! Centralized configuration with sensible defaults.

/// Default maximum envelope payload size (16 MB)
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Default number of dedup keys remembered by a consumer
pub const DEFAULT_DEDUP_WINDOW: usize = 1024;

/// Main configuration for encoding and consuming replicated writes
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Decode Limits
    // -------------------------------------------------------------------------
    /// Largest `ReplicatedWrite` payload accepted when decoding (in bytes)
    pub max_payload_size: usize,

    // -------------------------------------------------------------------------
    // Replication
    // -------------------------------------------------------------------------
    /// How many recent `(writer, sequence, checksum)` keys a consumer keeps
    pub dedup_window: usize,

    /// First sequence number handed out by a freshly started writer
    pub sequence_start: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            dedup_window: DEFAULT_DEDUP_WINDOW,
            sequence_start: 1,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the maximum payload size (in bytes)
    pub fn max_payload_size(mut self, size: usize) -> Self {
        self.config.max_payload_size = size;
        self
    }

    /// Set the dedup window (number of keys)
    pub fn dedup_window(mut self, count: usize) -> Self {
        self.config.dedup_window = count;
        self
    }

    /// Set the first sequence number of a writer
    pub fn sequence_start(mut self, start: u64) -> Self {
        self.config.sequence_start = start;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_payload_size, 16 * 1024 * 1024);
        assert_eq!(config.dedup_window, 1024);
        assert_eq!(config.sequence_start, 1);
    }

    #[test]
    fn test_builder_overrides() {
        let config = Config::builder()
            .max_payload_size(64)
            .dedup_window(8)
            .sequence_start(0)
            .build();

        assert_eq!(config.max_payload_size, 64);
        assert_eq!(config.dedup_window, 8);
        assert_eq!(config.sequence_start, 0);
    }
}

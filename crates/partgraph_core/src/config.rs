//! Loader and persistence configuration.

/// Configuration for loading and persisting graphs.
#[derive(Debug, Clone)]
pub struct Config {
    /// Largest single read request issued to storage while loading a region.
    pub max_read_chunk: usize,

    /// Whether to check the file header against each load request.
    pub validate_header: bool,

    /// Initial capacity of write frames used to persist graphs and metadata.
    pub frame_reserve: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_read_chunk: 64 * 1024 * 1024, // 64 MB
            validate_header: true,
            frame_reserve: 1024 * 1024, // 1 MB
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the largest single read request. Zero is treated as one byte.
    #[must_use]
    pub const fn max_read_chunk(mut self, bytes: usize) -> Self {
        self.max_read_chunk = if bytes == 0 { 1 } else { bytes };
        self
    }

    /// Sets whether to validate the file header on load.
    #[must_use]
    pub const fn validate_header(mut self, value: bool) -> Self {
        self.validate_header = value;
        self
    }

    /// Sets the initial write-frame capacity.
    #[must_use]
    pub const fn frame_reserve(mut self, bytes: usize) -> Self {
        self.frame_reserve = bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.validate_header);
        assert_eq!(config.max_read_chunk, 64 * 1024 * 1024);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .max_read_chunk(0)
            .validate_header(false)
            .frame_reserve(16);

        assert_eq!(config.max_read_chunk, 1);
        assert!(!config.validate_header);
        assert_eq!(config.frame_reserve, 16);
    }
}

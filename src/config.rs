//! Configuration handling for tabkit

/// How CSV field values are typed on ingestion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IngestMode {
    /// Type each column as a whole (int, float, bool, or string)
    #[default]
    Typed,
    /// Keep every non-null value as a string
    TextOnly,
}

/// Configuration shared by all operations
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of rows returned as preview data
    pub preview_rows: usize,
    /// Excess-null fraction below which a coercion is accepted
    pub numeric_null_threshold: f64,
    /// Rows per INSERT when the request omits a batch size
    pub default_batch_size: i64,
    /// Lines per chunk when the request omits a maximum
    pub default_max_chunk_lines: usize,
    /// Address the HTTP server binds to
    pub host: String,
    /// Port the HTTP server binds to
    pub port: u16,
    /// Largest accepted request body in bytes
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            numeric_null_threshold: 0.1,
            default_batch_size: 1,
            default_max_chunk_lines: 1000,
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_upload_bytes: 64 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Create a new Config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of preview rows
    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }

    /// Set the excess-null threshold used by type inference
    pub fn with_numeric_null_threshold(mut self, threshold: f64) -> Self {
        self.numeric_null_threshold = threshold;
        self
    }

    /// Set the default INSERT batch size
    pub fn with_default_batch_size(mut self, batch_size: i64) -> Self {
        self.default_batch_size = batch_size;
        self
    }

    /// Set the default maximum chunk size in lines
    pub fn with_default_max_chunk_lines(mut self, lines: usize) -> Self {
        self.default_max_chunk_lines = lines;
        self
    }

    /// Set the bind host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the bind port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the request body limit
    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }
}

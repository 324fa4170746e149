//! Application configuration.

/// Default request body limit, in bytes.
pub const DEFAULT_BODY_LIMIT: usize = 2_000_000;

/// [`App`][crate::App] configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum request body size buffered before dispatch.
    ///
    /// Larger bodies are rejected with `413 Payload Too Large`.
    pub body_limit: usize,
}

impl Config {
    /// Set [`Config::body_limit`].
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self { body_limit: DEFAULT_BODY_LIMIT }
    }
}

//! Error types for shici-core

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Resource unreachable or answered with a non-success status.
    /// Never retried; the caller decides what to do.
    #[error("failed to fetch '{url}': {reason}")]
    Fetch { url: String, reason: String },

    /// Resource fetched but its JSON did not parse into the expected shape.
    #[error("malformed data in '{resource}': {source}")]
    Malformed {
        resource: String,
        #[source]
        source: serde_json::Error,
    },

    /// Durable storage I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("invalid config: {0}")]
    Config(String),
}

impl Error {
    /// Create a fetch error for a resolved URL or path
    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Error::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a malformed-data error for a resource locator
    pub fn malformed(resource: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Malformed {
            resource: resource.into(),
            source,
        }
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Whether this error came from the transport rather than the data.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Error::Fetch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_carries_url() {
        let err = Error::fetch("https://example.org/data/index.json", "HTTP 404 Not Found");
        assert!(err.is_fetch());
        let msg = err.to_string();
        assert!(msg.contains("https://example.org/data/index.json"));
        assert!(msg.contains("404"));
    }

    #[test]
    fn malformed_error_names_resource() {
        let source = serde_json::from_str::<Vec<u32>>("{").unwrap_err();
        let err = Error::malformed("/data/poems-tang-0.json", source);
        assert!(!err.is_fetch());
        assert!(err.to_string().contains("/data/poems-tang-0.json"));
    }
}

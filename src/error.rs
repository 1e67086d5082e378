#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error! status: {status} ({endpoint})")]
    Http { status: u16, endpoint: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid file type: {0}. Please upload a JSON file.")]
    InvalidFileType(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Create a new HTTP status error for the given endpoint
    pub fn http<T: Into<String>>(status: u16, endpoint: T) -> Self {
        Self::Http {
            status,
            endpoint: endpoint.into(),
        }
    }

    /// Create a new not found error
    pub fn not_found<T: Into<String>>(key: T) -> Self {
        Self::NotFound(key.into())
    }

    /// Create a new invalid file type error
    pub fn invalid_file_type<T: Into<String>>(file_name: T) -> Self {
        Self::InvalidFileType(file_name.into())
    }

    /// Create a new malformed response error
    pub fn malformed<T: Into<String>>(msg: T) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create a new validation error
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new timeout error
    pub fn timeout<T: Into<String>>(msg: T) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a new internal error
    pub fn internal<T: Into<String>>(msg: T) -> Self {
        Self::Internal(msg.into())
    }

    /// True for failures raised by the request itself rather than by decoding or validation
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Http { .. } | ApiError::Network(_))
    }
}

/// Result type alias for client operations
pub type ApiResult<T> = Result<T, ApiError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuietusError {
    #[error("Invalid argument '{field}': {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Malformed registry line {line} ('{content}'): {reason}")]
    Parse {
        line: usize,
        content: String,
        reason: String,
    },

    #[error("Failed to fetch feed {url}: {source}")]
    FeedFetch {
        url: String,
        #[source]
        source: FetchFailure,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Underlying cause of a failed feed fetch.
#[derive(Error, Debug)]
pub enum FetchFailure {
    #[error("invalid feed URL: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("server responded with HTTP {0}")]
    Status(u16),

    #[error("malformed feed document: {0}")]
    Body(#[from] feed_rs::parser::ParseFeedError),

    #[error("entity expansion exceeded {limit} characters")]
    EntityExpansion { limit: usize },

    #[error("entity '{name}' references itself or nests too deeply")]
    EntityReference { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl QuietusError {
    pub fn feed_fetch(url: impl Into<String>, source: impl Into<FetchFailure>) -> Self {
        Self::FeedFetch {
            url: url.into(),
            source: source.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidArgument { .. } | Self::NotFound { .. } | Self::Parse { .. } => {
                ErrorCategory::Input
            }
            Self::FeedFetch { .. } => ErrorCategory::Network,
            Self::Config { .. } => ErrorCategory::Configuration,
            Self::Io(_) | Self::Serialization(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::FeedFetch { .. } => ErrorSeverity::Medium,
            Self::InvalidArgument { .. }
            | Self::NotFound { .. }
            | Self::Parse { .. }
            | Self::Config { .. } => ErrorSeverity::High,
            Self::Io(_) | Self::Serialization(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::InvalidArgument { field, .. } => {
                format!("Provide a non-empty value for '{}'", field)
            }
            Self::NotFound { path } => {
                format!("Check that the registry file '{}' exists", path)
            }
            Self::Parse { line, .. } => format!(
                "Fix line {} of the registry; each line must read 'Name,FeedUrl'",
                line
            ),
            Self::FeedFetch { url, .. } => {
                format!("Check that {} is reachable and serves an RSS or Atom feed", url)
            }
            Self::Config { .. } => "Review the configuration file and command-line options".to_string(),
            Self::Io(_) => "Check file permissions and available disk space".to_string(),
            Self::Serialization(_) => "Re-run with --format text".to_string(),
        }
    }

    /// The single message shown to the user when a run fails.
    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("Unable to read the organization registry: {}", self),
            ErrorCategory::Network => format!("Unable to check feeds: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("Unable to produce the inactivity report: {}", self),
        }
    }

    /// Process exit code for a failed run.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, QuietusError>;

//! # Error Handling
//!
//! Hierarchical error types for the upcycle impact library. Every variant
//! carries an [`ErrorContext`] with a timestamp, free-form context, a
//! recovery suggestion and a severity.
//!
//! ## Error Kinds
//!
//! | Kind | Severity | Recoverable | Typical cause |
//! |------|----------|-------------|---------------|
//! | `Configuration` | Fatal | no | `API_KEY` missing |
//! | `ClassificationUnknown` | Error | yes | model answered `"unknown"` |
//! | `Transport` | Error | yes | network failure, bad status, unparsable reply |
//! | `Geolocation` | Info | yes | lookup refused or unreachable |
//! | `ShareUnsupported` | Info | yes | platform has no share sheet |
//! | `Image` | Error | yes | file is not a decodable image |
//! | `Io`, `Validation`, `State` | Error | varies | local failures |
//!
//! The library never retries on its own. "Recoverable" means the user can
//! repeat the same action from the state the controller was left in.
//!
//! ## Usage
//!
//! ```rust
//! use upcycle_impact::error::{UpcycleError, Recoverable, HasRecoverySuggestion};
//!
//! let error = UpcycleError::transport("generate_content", "connection reset")
//!     .with_context("classifying uploaded photo");
//!
//! assert!(error.is_recoverable());
//! assert!(error.recovery_suggestion().is_some());
//! ```

use std::{collections::HashMap, error::Error as StdError, fmt, time::SystemTime};

/// Message shown when the model cannot identify the furniture.
pub const UNKNOWN_FURNITURE_MESSAGE: &str =
    "Sorry, the AI could not identify the furniture. Try again with a different photo.";

/// Message shown for any other failed analysis.
pub const GENERIC_FAILURE_MESSAGE: &str = "Sorry, the analysis failed. Please try again.";

/// Severity levels for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational errors; the flow continues
    Info,
    /// Errors that abort the current action but can be retried
    Error,
    /// Fatal errors that block all use until fixed externally
    Fatal,
}

/// Core error context containing metadata about when and where an error occurred
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// When the error occurred
    pub timestamp: SystemTime,
    /// Additional context about the error
    pub context: Option<String>,
    /// Suggested recovery action
    pub recovery_suggestion: Option<String>,
    /// Error severity level
    pub severity: ErrorSeverity,
    /// Whether the user can retry the same action
    pub recoverable: bool,
    /// Additional metadata as key-value pairs
    pub metadata: HashMap<String, String>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            timestamp: SystemTime::now(),
            context: None,
            recovery_suggestion: None,
            severity: ErrorSeverity::Error,
            recoverable: false,
            metadata: HashMap::new(),
        }
    }
}

impl ErrorContext {
    /// Create a new error context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set recovery suggestion
    pub fn with_recovery_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.recovery_suggestion = Some(suggestion.into());
        self
    }

    /// Set severity level
    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Mark as recoverable
    pub fn recoverable(mut self) -> Self {
        self.recoverable = true;
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Base error type for the upcycle impact library
#[derive(Debug)]
pub enum UpcycleError {
    /// Missing or invalid configuration (credential, limits)
    Configuration {
        field: String,
        reason: String,
        context: ErrorContext,
    },
    /// The model could not identify the furniture (`"unknown"` sentinel)
    ClassificationUnknown {
        field: String,
        context: ErrorContext,
    },
    /// Network or reply-parsing failure while calling the external model
    Transport {
        operation: String,
        reason: String,
        status: Option<u16>,
        source: Option<Box<dyn StdError + Send + Sync>>,
        context: ErrorContext,
    },
    /// Location could not be determined
    Geolocation {
        reason: String,
        context: ErrorContext,
    },
    /// The platform offers no share capability
    ShareUnsupported {
        platform: String,
        context: ErrorContext,
    },
    /// Decoding, scaling or encoding an image failed
    Image {
        operation: String,
        reason: String,
        context: ErrorContext,
    },
    /// I/O errors
    Io {
        operation: String,
        path: Option<String>,
        source: std::io::Error,
        context: ErrorContext,
    },
    /// Validation errors
    Validation {
        field: String,
        constraint: String,
        value: String,
        context: ErrorContext,
    },
    /// Invalid state transitions in the analysis controller
    State {
        current_state: String,
        attempted_operation: String,
        reason: String,
        context: ErrorContext,
    },
}

impl UpcycleError {
    /// Create a configuration error
    pub fn configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            reason: reason.into(),
            context: ErrorContext::new()
                .with_severity(ErrorSeverity::Fatal)
                .with_recovery_suggestion(
                    "Set the missing configuration value and restart the application",
                ),
        }
    }

    /// Create an "unknown furniture" classification error
    pub fn classification_unknown(field: impl Into<String>) -> Self {
        Self::ClassificationUnknown {
            field: field.into(),
            context: ErrorContext::new()
                .recoverable()
                .with_recovery_suggestion("Try again with a different photo"),
        }
    }

    /// Create a transport error
    pub fn transport(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            operation: operation.into(),
            reason: reason.into(),
            status: None,
            source: None,
            context: ErrorContext::new()
                .recoverable()
                .with_recovery_suggestion("Check the network connection and try again"),
        }
    }

    /// Create a transport error carrying the HTTP status of the reply
    pub fn transport_status(
        operation: impl Into<String>,
        status: u16,
        reason: impl Into<String>,
    ) -> Self {
        match Self::transport(operation, reason) {
            Self::Transport {
                operation,
                reason,
                source,
                context,
                ..
            } => Self::Transport {
                operation,
                reason,
                status: Some(status),
                source,
                context: context.with_metadata("status", status.to_string()),
            },
            other => other,
        }
    }

    /// Create a geolocation error
    pub fn geolocation(reason: impl Into<String>) -> Self {
        Self::Geolocation {
            reason: reason.into(),
            context: ErrorContext::new()
                .with_severity(ErrorSeverity::Info)
                .recoverable()
                .with_recovery_suggestion("Enter the location manually or continue without it"),
        }
    }

    /// Create a share-unsupported error
    pub fn share_unsupported(platform: impl Into<String>) -> Self {
        Self::ShareUnsupported {
            platform: platform.into(),
            context: ErrorContext::new()
                .with_severity(ErrorSeverity::Info)
                .recoverable()
                .with_recovery_suggestion("Download the result card and share the file instead"),
        }
    }

    /// Create an image processing error
    pub fn image(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Image {
            operation: operation.into(),
            reason: reason.into(),
            context: ErrorContext::new()
                .recoverable()
                .with_recovery_suggestion("Please provide an image file"),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: None,
            source,
            context: ErrorContext::new(),
        }
    }

    /// Attach the path involved in an I/O error
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        if let Self::Io { path: slot, .. } = &mut self {
            *slot = Some(path.into());
        }
        self
    }

    /// Create a validation error
    pub fn validation(
        field: impl Into<String>,
        constraint: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Validation {
            field: field.into(),
            constraint: constraint.into(),
            value: value.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a state error
    pub fn state(
        current_state: impl Into<String>,
        attempted_operation: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::State {
            current_state: current_state.into(),
            attempted_operation: attempted_operation.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context_mut().context = Some(context.into());
        self
    }

    /// Add recovery suggestion
    pub fn with_recovery_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context_mut().recovery_suggestion = Some(suggestion.into());
        self
    }

    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Configuration { context, .. } => context,
            Self::ClassificationUnknown { context, .. } => context,
            Self::Transport { context, .. } => context,
            Self::Geolocation { context, .. } => context,
            Self::ShareUnsupported { context, .. } => context,
            Self::Image { context, .. } => context,
            Self::Io { context, .. } => context,
            Self::Validation { context, .. } => context,
            Self::State { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Configuration { context, .. } => context,
            Self::ClassificationUnknown { context, .. } => context,
            Self::Transport { context, .. } => context,
            Self::Geolocation { context, .. } => context,
            Self::ShareUnsupported { context, .. } => context,
            Self::Image { context, .. } => context,
            Self::Io { context, .. } => context,
            Self::Validation { context, .. } => context,
            Self::State { context, .. } => context,
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::ClassificationUnknown { .. } => "classification_unknown",
            Self::Transport { .. } => "transport",
            Self::Geolocation { .. } => "geolocation",
            Self::ShareUnsupported { .. } => "share_unsupported",
            Self::Image { .. } => "image",
            Self::Io { .. } => "io",
            Self::Validation { .. } => "validation",
            Self::State { .. } => "state",
        }
    }

    /// Human-readable message for the error screen.
    ///
    /// Technical detail stays in `Display`; this is what a user reads.
    pub fn user_message(&self) -> String {
        match self {
            Self::ClassificationUnknown { .. } => UNKNOWN_FURNITURE_MESSAGE.to_string(),
            Self::Configuration { field, .. } => format!(
                "The application is not configured: {} is missing. Set it and redeploy.",
                field
            ),
            Self::Geolocation { reason, .. } => {
                format!("Could not get your position: {}", reason)
            }
            Self::ShareUnsupported { .. } => {
                "Sharing is not supported here. Try downloading the image instead.".to_string()
            }
            Self::Image { .. } => "Please provide an image file.".to_string(),
            Self::Io {
                path: Some(path),
                source,
                ..
            } => format!("Could not access {}: {}", path, source),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl fmt::Display for UpcycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpcycleError::Configuration { field, reason, .. } => {
                write!(f, "Configuration error in '{}': {}", field, reason)
            }
            UpcycleError::ClassificationUnknown { field, .. } => {
                write!(f, "Classifier returned \"unknown\" for '{}'", field)
            }
            UpcycleError::Transport {
                operation,
                reason,
                status,
                ..
            } => {
                if let Some(status) = status {
                    write!(
                        f,
                        "Transport error during {} (HTTP {}): {}",
                        operation, status, reason
                    )
                } else {
                    write!(f, "Transport error during {}: {}", operation, reason)
                }
            }
            UpcycleError::Geolocation { reason, .. } => {
                write!(f, "Geolocation failed: {}", reason)
            }
            UpcycleError::ShareUnsupported { platform, .. } => {
                write!(f, "Sharing is not supported on {}", platform)
            }
            UpcycleError::Image {
                operation, reason, ..
            } => {
                write!(f, "Image {} failed: {}", operation, reason)
            }
            UpcycleError::Io {
                operation,
                path,
                source,
                ..
            } => {
                if let Some(path) = path {
                    write!(f, "I/O error during {} on '{}': {}", operation, path, source)
                } else {
                    write!(f, "I/O error during {}: {}", operation, source)
                }
            }
            UpcycleError::Validation {
                field,
                constraint,
                value,
                ..
            } => {
                write!(
                    f,
                    "Validation failed for '{}': {} (value: {})",
                    field, constraint, value
                )
            }
            UpcycleError::State {
                current_state,
                attempted_operation,
                reason,
                ..
            } => {
                write!(
                    f,
                    "Invalid state transition from '{}' when attempting '{}': {}",
                    current_state, attempted_operation, reason
                )
            }
        }
    }
}

impl StdError for UpcycleError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Transport {
                source: Some(source),
                ..
            } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Result type alias using our custom error type
pub type UpcycleResult<T> = Result<T, UpcycleError>;

/// Trait for errors that can be recovered from
pub trait Recoverable {
    /// Check if the user can retry after this error
    fn is_recoverable(&self) -> bool;
}

impl Recoverable for UpcycleError {
    fn is_recoverable(&self) -> bool {
        self.context().recoverable
    }
}

/// Trait for errors with severity levels
pub trait HasSeverity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}

impl HasSeverity for UpcycleError {
    fn severity(&self) -> ErrorSeverity {
        self.context().severity
    }
}

/// Trait for errors that provide recovery suggestions
pub trait HasRecoverySuggestion {
    /// Get recovery suggestion for this error
    fn recovery_suggestion(&self) -> Option<&str>;
}

impl HasRecoverySuggestion for UpcycleError {
    fn recovery_suggestion(&self) -> Option<&str> {
        self.context().recovery_suggestion.as_deref()
    }
}

/// Error classification utilities
pub mod classify {
    use super::*;

    /// Check if an error blocks all use of the application
    pub fn is_fatal(error: &UpcycleError) -> bool {
        matches!(error, UpcycleError::Configuration { .. })
            || error.severity() == ErrorSeverity::Fatal
    }

    /// Check if an error is only informational (the flow continues)
    pub fn is_informational(error: &UpcycleError) -> bool {
        error.severity() <= ErrorSeverity::Info
    }
}

/// Error conversion implementations
impl From<std::io::Error> for UpcycleError {
    fn from(error: std::io::Error) -> Self {
        Self::io("unknown", error)
    }
}

impl From<serde_json::Error> for UpcycleError {
    fn from(error: serde_json::Error) -> Self {
        match Self::transport("decode_reply", error.to_string()) {
            Self::Transport {
                operation,
                reason,
                status,
                context,
                ..
            } => Self::Transport {
                operation,
                reason,
                status,
                source: Some(Box::new(error)),
                context,
            },
            other => other,
        }
    }
}

impl From<reqwest::Error> for UpcycleError {
    fn from(error: reqwest::Error) -> Self {
        let status = error.status().map(|s| s.as_u16());
        let address = error.url().map(|u| u.host_str().unwrap_or_default().to_string());
        let mut converted = Self::transport("http_request", error.to_string());
        if let Self::Transport {
            status: slot,
            source,
            context,
            ..
        } = &mut converted
        {
            *slot = status;
            if let Some(address) = address {
                context.metadata.insert("host".to_string(), address);
            }
            *source = Some(Box::new(error));
        }
        converted
    }
}

impl From<image::ImageError> for UpcycleError {
    fn from(error: image::ImageError) -> Self {
        let error = match error {
            image::ImageError::IoError(source) => return Self::io("image_io", source),
            other => other,
        };
        let operation = match &error {
            image::ImageError::Decoding(_) | image::ImageError::Unsupported(_) => "decode",
            image::ImageError::Encoding(_) => "encode",
            _ => "processing",
        };
        Self::image(operation, error.to_string())
    }
}

impl From<upcycle_scale::cpu::ScaleError> for UpcycleError {
    fn from(error: upcycle_scale::cpu::ScaleError) -> Self {
        Self::image("scale", error.to_string())
    }
}

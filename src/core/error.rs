//! Error handling for the navigator
//!
//! Two layers, mirroring each other:
//! 1. [`NavigatorError`] - one strongly-typed variant per failure mode, returned
//!    from every fallible operation in the crate
//! 2. [`ErrorContext`] - presentation wrapper adding a suggestion and details
//!    for people reading the error in a terminal
//!
//! # Propagation policy
//!
//! - URI validation at construction time always fails immediately.
//! - Body parse failures during a fetch only fail when the caller opts in with
//!   `raise_on_error`; otherwise the navigator is populated with empty state.
//! - Verb-restriction violations always fail. They indicate programmer error.
//! - Nothing is retried.
//!
//! # Examples
//!
//! ```rust,no_run
//! use hal_navigator::core::{NavigatorError, user_friendly_error};
//!
//! let error = NavigatorError::AmbiguousScheme {
//!     url: "http://a://b".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::http::HttpResponse;
use crate::navigator::Navigator;

/// The main error type for navigator operations
///
/// # Error Categories
///
/// ## URI handling
/// - [`BadScheme`] - scheme present but not http/https
/// - [`AmbiguousScheme`] - more than one `://` delimiter
/// - [`InvalidUri`] - URI could not be parsed or resolved
/// - [`Template`] - malformed URI template
///
/// ## Navigation
/// - [`AmbiguousNavigation`] - dereference or verb on an unexpanded template
/// - [`NotTemplated`] - expansion of a navigator that has no template
/// - [`RelationNotFound`] - unknown relation name
/// - [`AmbiguousSelection`] - chained through a relation with several entries
/// - [`IndexOutOfRange`] - list index past the end of a relation
/// - [`SelectorSyntax`] - malformed selector combination
/// - [`InvalidOperation`] - verb-restriction guard violation
///
/// ## Responses
/// - [`NotJson`] - body was not JSON where JSON was required
/// - [`Remote`] - HTTP failure status with `raise_on_error`
/// - [`UnexpectedStatus`] - a traversal step produced no resource
/// - [`Transport`] - the request never produced an HTTP response
///
/// [`BadScheme`]: NavigatorError::BadScheme
/// [`AmbiguousScheme`]: NavigatorError::AmbiguousScheme
/// [`InvalidUri`]: NavigatorError::InvalidUri
/// [`Template`]: NavigatorError::Template
/// [`AmbiguousNavigation`]: NavigatorError::AmbiguousNavigation
/// [`NotTemplated`]: NavigatorError::NotTemplated
/// [`RelationNotFound`]: NavigatorError::RelationNotFound
/// [`AmbiguousSelection`]: NavigatorError::AmbiguousSelection
/// [`IndexOutOfRange`]: NavigatorError::IndexOutOfRange
/// [`SelectorSyntax`]: NavigatorError::SelectorSyntax
/// [`InvalidOperation`]: NavigatorError::InvalidOperation
/// [`NotJson`]: NavigatorError::NotJson
/// [`Remote`]: NavigatorError::Remote
/// [`UnexpectedStatus`]: NavigatorError::UnexpectedStatus
/// [`Transport`]: NavigatorError::Transport
#[derive(Error, Debug)]
pub enum NavigatorError {
    /// URI scheme present but unsupported
    #[error("Unsupported scheme '{scheme}' in '{url}': only http and https are allowed")]
    BadScheme {
        /// The offending URL
        url: String,
        /// The scheme that was found
        scheme: String,
    },

    /// URI contains more than one scheme delimiter
    #[error("Ambiguous scheme in '{url}': more than one '://' delimiter")]
    AmbiguousScheme {
        /// The offending URL
        url: String,
    },

    /// URI could not be parsed or resolved against its base
    #[error("Invalid URI '{uri}': {reason}")]
    InvalidUri {
        /// The URI that failed
        uri: String,
        /// Parser message
        reason: String,
    },

    /// URI template syntax error
    #[error("Malformed URI template '{template}': {reason}")]
    Template {
        /// The template text
        template: String,
        /// What was wrong with it
        reason: String,
    },

    /// Dereference or verb attempted on a templated navigator
    ///
    /// Templated navigators have no concrete URI. Expand them first, or
    /// expand with no arguments to null every variable out.
    #[error(
        "Cannot {operation} the templated navigator '{template_uri}': provide values for the template parameters first"
    )]
    AmbiguousNavigation {
        /// The operation that was attempted
        operation: String,
        /// The unexpanded template
        template_uri: String,
    },

    /// Expansion requested on a navigator that is not templated
    #[error("Navigator '{uri}' isn't templated and cannot be expanded")]
    NotTemplated {
        /// The navigator's URI
        uri: String,
    },

    /// Verb-restriction guard violation
    #[error("{message}")]
    InvalidOperation {
        /// Names the operation, the allowed methods and the current URI
        message: String,
    },

    /// Response body was not valid JSON
    #[error("The resource at {uri} wasn't valid JSON")]
    NotJson {
        /// The URI that was fetched (or the root for documents given inline)
        uri: String,
        /// The offending response, kept for inspection
        response: Box<HttpResponse>,
    },

    /// HTTP failure status while `raise_on_error` was requested
    #[error("{status} {reason} from {uri}")]
    Remote {
        /// The navigator the request was issued from
        navigator: Navigator,
        /// Request URI
        uri: String,
        /// HTTP status code
        status: u16,
        /// Reason phrase
        reason: String,
        /// The full response so the error body can be inspected
        response: Box<HttpResponse>,
    },

    /// A traversal step answered with a status instead of a resource
    #[error("{method} {uri} answered {status} {reason} without a resource to follow")]
    UnexpectedStatus {
        /// HTTP method of the step
        method: String,
        /// Request URI
        uri: String,
        /// HTTP status code
        status: u16,
        /// Reason phrase
        reason: String,
    },

    /// The transport failed before an HTTP response was received
    #[error("{method} {uri} failed: {message}")]
    Transport {
        /// HTTP method
        method: String,
        /// Request URI
        uri: String,
        /// Transport message
        message: String,
        /// Underlying cause
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Relation name absent from links and embedded resources
    #[error("Relation '{rel}' not found")]
    RelationNotFound {
        /// The requested relation
        rel: String,
        /// Closest known relation, if any is close
        suggestion: Option<String>,
    },

    /// Chained dereference through a relation holding several entries
    #[error("Relation '{rel}' has {count} entries; select one by index before continuing")]
    AmbiguousSelection {
        /// The multi-valued relation
        rel: String,
        /// Number of entries it holds
        count: usize,
    },

    /// Index past the end of a relation's entries
    #[error("Index {index} out of range for relation '{rel}' with {len} entries")]
    IndexOutOfRange {
        /// The relation being indexed
        rel: String,
        /// Requested index
        index: usize,
        /// Number of entries
        len: usize,
    },

    /// Malformed selector argument combination
    #[error("Invalid selector: {message}")]
    SelectorSyntax {
        /// What was combined incorrectly
        message: String,
    },

    /// Request body could not be serialized
    #[error("Failed to serialize request body: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration could not be applied
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },
}

impl NavigatorError {
    /// The HTTP response carried by this error, if any.
    #[must_use]
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Self::NotJson {
                response,
                ..
            }
            | Self::Remote {
                response,
                ..
            } => Some(response),
            _ => None,
        }
    }

    /// The HTTP status carried by this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote {
                status,
                ..
            } => Some(*status),
            Self::NotJson {
                response,
                ..
            } => Some(response.status),
            Self::UnexpectedStatus {
                status,
                ..
            } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error signals a programming mistake rather than a
    /// condition of the remote API.
    #[must_use]
    pub const fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousNavigation { .. }
                | Self::NotTemplated { .. }
                | Self::InvalidOperation { .. }
                | Self::SelectorSyntax { .. }
        )
    }
}

/// Crate result alias.
pub type Result<T, E = NavigatorError> = std::result::Result<T, E>;

/// Error wrapper with a suggestion and details for terminal display
///
/// # Examples
///
/// ```rust,no_run
/// use hal_navigator::core::{ErrorContext, NavigatorError};
///
/// let ctx = ErrorContext::new(NavigatorError::NotTemplated {
///     uri: "http://example.com/".to_string(),
/// })
/// .with_suggestion("Only navigators built from templated links can be expanded");
///
/// eprintln!("{ctx}");
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: NavigatorError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: NavigatorError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add an actionable suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr: error in red, details in yellow and the
    /// suggestion in green.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with suggestions
///
/// Recognizes [`NavigatorError`], [`toml::de::Error`] (configuration files)
/// and [`std::io::Error`]; anything else is wrapped as a configuration error
/// carrying the original message.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let error = match error.downcast::<NavigatorError>() {
        Ok(nav_error) => return create_error_context(nav_error),
        Err(other) => other,
    };

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(NavigatorError::Config {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax of the navigator configuration file")
        .with_details("Headers and auth are tables; api_name, curie and user_agent are strings");
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        return ErrorContext::new(NavigatorError::Config {
            message: io_error.to_string(),
        })
        .with_suggestion("Check that the configuration file exists and is readable");
    }

    ErrorContext::new(NavigatorError::Config {
        message: format!("{error:#}"),
    })
}

fn create_error_context(error: NavigatorError) -> ErrorContext {
    let (suggestion, details): (Option<String>, Option<&str>) = match &error {
        NavigatorError::BadScheme {
            ..
        } => (
            Some("Use an http:// or https:// URL, or omit the scheme to default to http".into()),
            None,
        ),
        NavigatorError::AmbiguousScheme {
            ..
        } => (Some("Remove the duplicated '://' from the URL".into()), None),
        NavigatorError::AmbiguousNavigation {
            ..
        } => (
            Some("Call expand() with the template variables before using the navigator".into()),
            Some("Templated links have no concrete URI until every variable is bound or nulled out"),
        ),
        NavigatorError::NotTemplated {
            ..
        } => (Some("Only navigators built from templated links can be expanded".into()), None),
        NavigatorError::InvalidOperation {
            ..
        } => (
            None,
            Some("Links advertise the HTTP method they accept; non-idempotent responses cannot be fetched again"),
        ),
        NavigatorError::RelationNotFound {
            suggestion,
            ..
        } => (
            Some(match suggestion {
                Some(s) => format!("Did you mean '{s}'?"),
                None => "Inspect links() and embedded() for available relations".to_string(),
            }),
            None,
        ),
        NavigatorError::AmbiguousSelection {
            ..
        } => (Some("Add an index step to pick one entry".into()), None),
        NavigatorError::NotJson {
            ..
        } => (
            Some("Fetch with raise_on_error disabled to get a degraded, empty navigator".into()),
            Some("The server answered with a body that is not JSON"),
        ),
        NavigatorError::Remote {
            ..
        } => (Some("Inspect the error's response body for details".into()), None),
        NavigatorError::Transport {
            ..
        } => (Some("Check network connectivity and the API root URL".into()), None),
        _ => (None, None),
    };

    let mut ctx = ErrorContext::new(error);
    if let Some(suggestion) = suggestion {
        ctx = ctx.with_suggestion(suggestion);
    }
    if let Some(details) = details {
        ctx = ctx.with_details(details);
    }
    ctx
}

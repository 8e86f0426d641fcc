//! Error taxonomies for fetching and parsing status sources
//!
//! Both taxonomies are fully contained within a resolver: the only
//! externally visible effect of any of these errors is a `StatusRecord`
//! with status `Unknown` and a `detail` describing the failure class.

use std::fmt;

/// Result type alias for fetch backend operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors raised by the fetch backends (plain HTTP and browser rendering)
#[derive(Debug)]
pub enum FetchError {
    /// The request exceeded its hard timeout
    Timeout(String),

    /// Connection-level failure (DNS, TLS, refused, reset)
    Connection(String),

    /// The source answered with a non-success status code
    HttpStatus(u16),

    /// The rendered page never produced the awaited element in time
    RenderTimeout(String),

    /// No browser session could be spawned, or the manager is shut down
    BrowserUnavailable(String),
}

impl FetchError {
    /// Whether a retry has any chance of succeeding.
    ///
    /// 4xx responses are treated as permanent; everything network-shaped
    /// plus 5xx is worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout(_) | FetchError::Connection(_) => true,
            FetchError::HttpStatus(code) => *code >= 500,
            FetchError::RenderTimeout(_) | FetchError::BrowserUnavailable(_) => false,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Timeout(msg) => write!(f, "request timed out: {}", msg),
            FetchError::Connection(msg) => write!(f, "connection failed: {}", msg),
            FetchError::HttpStatus(code) => write!(f, "unexpected HTTP status {}", code),
            FetchError::RenderTimeout(msg) => write!(f, "page render timed out: {}", msg),
            FetchError::BrowserUnavailable(msg) => write!(f, "browser unavailable: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::HttpStatus(status.as_u16())
        } else {
            FetchError::Connection(err.to_string())
        }
    }
}

/// Errors raised while interpreting fetched content against a rule
#[derive(Debug)]
pub enum ParseError {
    /// The feed parsed but contains no entries (only an error for rules
    /// that need a latest entry; presence-inverted treats it as healthy)
    EmptyFeed,

    /// The content is not a parsable feed/document, or the configured
    /// selector is not valid CSS
    Malformed(String),

    /// The structural selector matched nothing in the document
    SelectorNotFound(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::EmptyFeed => write!(f, "feed contains no entries"),
            ParseError::Malformed(msg) => write!(f, "malformed content: {}", msg),
            ParseError::SelectorNotFound(sel) => {
                write!(f, "selector `{}` matched no elements", sel)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Everything that can go wrong inside a single resolver
#[derive(Debug)]
pub enum ResolveError {
    Fetch(FetchError),
    Parse(ParseError),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Fetch(err) => write!(f, "fetch failed: {}", err),
            ResolveError::Parse(err) => write!(f, "parse failed: {}", err),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Fetch(err) => Some(err),
            ResolveError::Parse(err) => Some(err),
        }
    }
}

impl From<FetchError> for ResolveError {
    fn from(err: FetchError) -> Self {
        ResolveError::Fetch(err)
    }
}

impl From<ParseError> for ResolveError {
    fn from(err: ParseError) -> Self {
        ResolveError::Parse(err)
    }
}

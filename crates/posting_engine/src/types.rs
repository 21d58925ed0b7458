use std::fmt;

use posting_core::{NormalizeReport, PostingLink};
use thiserror::Error;

/// A DOM lookup that came back empty or could not be performed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no element matches {0}")]
    Missing(String),
    #[error("lookup unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("invalid selector {selector:?}: {message}")]
    InvalidSelector { selector: String, message: String },
    #[error("invalid search url template {0:?}")]
    InvalidSearchUrl(String),
    #[error("request failed: {0}")]
    Request(#[from] FetchError),
    #[error("login rejected: {0}")]
    LoginRejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Decode,
    MissingElement { selector: String },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Decode => write!(f, "undecodable body"),
            FailureKind::MissingElement { selector } => {
                write!(f, "missing element {selector}")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Why harvesting a search term ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// `max_pages` pages were read.
    PageLimit,
    /// The next-page control was not there.
    NoMorePages,
    /// Advancing failed for another reason; the pages read so far stand.
    PaginationFailed(String),
    /// The search could not be opened at all.
    SearchUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestOutcome {
    pub search_term: String,
    /// Unique links in first-seen order.
    pub links: Vec<PostingLink>,
    pub pages_read: usize,
    /// List items whose link could not be extracted.
    pub skipped_items: usize,
    pub stop: StopReason,
}

/// Everything the batch pipeline learned about one search term.
#[derive(Debug, Clone, PartialEq)]
pub struct TermReport {
    pub harvest: HarvestOutcome,
    pub raw_postings: Vec<posting_core::RawPosting>,
    pub fetch_failures: Vec<(PostingLink, FetchError)>,
    pub normalized: NormalizeReport,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HarvestEvent {
    SearchOpened {
        search_term: String,
    },
    PageHarvested {
        search_term: String,
        page: usize,
        new_links: Vec<PostingLink>,
        skipped_items: usize,
    },
    PostingFetched {
        search_term: String,
        url: PostingLink,
    },
    PostingFailed {
        search_term: String,
        url: PostingLink,
        error: FetchError,
    },
    TermCompleted {
        search_term: String,
        links: usize,
        postings: usize,
        rejected: usize,
    },
}

/// Receives harvest progress as it happens, so partial results survive an abort.
pub trait HarvestSink {
    fn emit(&self, event: HarvestEvent);
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl HarvestSink for NullSink {
    fn emit(&self, _event: HarvestEvent) {}
}

/// Terminal outcomes of a traversal branch
///
/// Every candidate URL handed to the crawler ends in exactly one of these.
use std::fmt;

/// How a single traversal branch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BranchOutcome {
    // ===== Filtered before admission =====
    /// Candidate's hostname differs from the seed's
    ForeignHost,

    /// Candidate could not be parsed or normalized
    InvalidUrl,

    // ===== Admission decisions =====
    /// Key was already admitted by another branch
    AlreadyVisited,

    /// Page budget was exhausted when this branch asked for admission
    BudgetExhausted,

    /// Admitted, but the crawl was stopped before the fetch started
    Stopped,

    // ===== Fetch failures =====
    /// Network or protocol failure during the fetch
    TransportFailed,

    /// Fetch aborted by the crawl's cancellation signal
    Cancelled,

    /// Server answered with a status code >= 400
    UnsupportedStatus,

    /// Server answered with a non-HTML content type
    ContentMismatch,

    // ===== Completed =====
    /// Page fetched and its markup extracted
    Extracted,

    /// Page fetched but its body was not usable markup
    Degraded,
}

impl BranchOutcome {
    /// Returns true if this branch fetched a body and ran extraction
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Extracted | Self::Degraded)
    }

    /// Returns true if this branch was admitted and its fetch failed
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::TransportFailed | Self::Cancelled | Self::UnsupportedStatus | Self::ContentMismatch
        )
    }

    /// Returns true if the branch never reached the fetch step
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            Self::ForeignHost
                | Self::InvalidUrl
                | Self::AlreadyVisited
                | Self::BudgetExhausted
                | Self::Stopped
        )
    }

    /// Short snake_case label used in logs and statistics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ForeignHost => "foreign_host",
            Self::InvalidUrl => "invalid_url",
            Self::AlreadyVisited => "already_visited",
            Self::BudgetExhausted => "budget_exhausted",
            Self::Stopped => "stopped",
            Self::TransportFailed => "transport_failed",
            Self::Cancelled => "cancelled",
            Self::UnsupportedStatus => "unsupported_status",
            Self::ContentMismatch => "content_mismatch",
            Self::Extracted => "extracted",
            Self::Degraded => "degraded",
        }
    }

    /// Returns all possible outcomes
    pub fn all() -> [Self; 11] {
        [
            Self::ForeignHost,
            Self::InvalidUrl,
            Self::AlreadyVisited,
            Self::BudgetExhausted,
            Self::Stopped,
            Self::TransportFailed,
            Self::Cancelled,
            Self::UnsupportedStatus,
            Self::ContentMismatch,
            Self::Extracted,
            Self::Degraded,
        ]
    }
}

impl fmt::Display for BranchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

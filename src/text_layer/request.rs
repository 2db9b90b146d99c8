//! Materialization request and response types

use std::sync::Arc;

use super::page::PageText;
use crate::provider::SourceFault;

/// Unique identifier for materialization requests
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

impl RequestId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Request sent to text workers
#[derive(Debug)]
pub enum TextRequest {
    /// Materialize one page's text
    Materialize { id: RequestId, page: usize },

    /// Cancel a pending request (advisory; the worker acknowledges, it
    /// does not abort work already underway)
    Cancel(RequestId),

    /// Shutdown the worker
    Shutdown,
}

/// Response from text workers
#[derive(Debug)]
pub enum TextResponse {
    /// Page text assembled
    Ready {
        id: RequestId,
        page: usize,
        text: Arc<PageText>,
    },

    /// Request was cancelled before a worker picked it up
    Cancelled(RequestId),

    /// Source failed to produce the page
    Failed {
        id: RequestId,
        page: usize,
        fault: SourceFault,
    },
}

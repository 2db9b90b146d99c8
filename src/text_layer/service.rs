//! Text layer service - worker pool, request coalescing, cancellation

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use flume::{Receiver, Sender};
use log::{debug, warn};

use super::arena::TextArena;
use super::page::PageText;
use super::request::{RequestId, TextRequest, TextResponse};
use super::worker::text_worker;
use crate::config::EngineConfig;
use crate::provider::{DocumentSource, SourceFault};

/// Completion event surfaced to the host loop by [`TextLayerService::poll_events`].
#[derive(Debug)]
pub enum TextLayerEvent {
    /// Page text materialized and inserted into the arena. Forward to the
    /// engine as its text-ready signal.
    Ready { page: usize, text: Arc<PageText> },

    /// The source failed to produce this page. The engine is not involved;
    /// hosts may re-request.
    Failed { page: usize, fault: SourceFault },
}

/// Manages page text materialization on worker threads.
///
/// Requests are coalesced by page number: a page already in flight returns
/// the same pending id instead of new work, and the table entry is cleared
/// when the response is drained. Cancellation is advisory, so a cancelled
/// request's result is swallowed at drain time, never stored.
pub struct TextLayerService {
    request_tx: Sender<TextRequest>,
    response_rx: Receiver<TextResponse>,
    next_request_id: u64,
    in_flight: HashMap<usize, RequestId>,
    cancelled: HashSet<RequestId>,
    arena: TextArena,
    num_workers: usize,
}

impl TextLayerService {
    /// Spawn `config.text_workers` threads over the shared request queue.
    #[must_use]
    pub fn new(source: Arc<dyn DocumentSource>, arena: TextArena, config: &EngineConfig) -> Self {
        let workers = config.text_workers.max(1);

        // flume for MPMC: multiple workers pull from one shared request
        // queue, which std::sync::mpsc receivers cannot do.
        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();

        for _ in 0..workers {
            let src = Arc::clone(&source);
            let rx = request_rx.clone();
            let tx = response_tx.clone();

            std::thread::spawn(move || {
                text_worker(src, rx, tx);
            });
        }

        Self {
            request_tx,
            response_rx,
            next_request_id: 1,
            in_flight: HashMap::new(),
            cancelled: HashSet::new(),
            arena,
            num_workers: workers,
        }
    }

    /// Make sure a page's text is materialized or on its way.
    ///
    /// Returns `None` when the arena already holds the page, the coalesced
    /// pending id when a request for it is in flight, and a fresh id
    /// otherwise.
    pub fn ensure_page(&mut self, page: usize) -> Option<RequestId> {
        if self.arena.contains(page) {
            return None;
        }

        if let Some(pending) = self.in_flight.get(&page) {
            return Some(*pending);
        }

        Some(self.send_request(page))
    }

    /// Cancel any in-flight request for the page, evict its arena entry
    /// and request it fresh. Used when the page's content must be rebuilt
    /// (rapid rescale re-requests, document reload).
    pub fn refresh_page(&mut self, page: usize) -> RequestId {
        self.cancel_pending(page);
        self.arena.remove(page);
        self.send_request(page)
    }

    /// Cancel and evict a page that left the window.
    pub fn release_page(&mut self, page: usize) {
        self.cancel_pending(page);
        self.arena.remove(page);
    }

    fn cancel_pending(&mut self, page: usize) {
        if let Some(id) = self.in_flight.remove(&page) {
            debug!("cancelling in-flight text request {id:?} for page {page}");
            self.cancelled.insert(id);
            let _ = self.request_tx.send(TextRequest::Cancel(id));
        }
    }

    fn send_request(&mut self, page: usize) -> RequestId {
        let id = self.next_id();
        let _ = self.request_tx.send(TextRequest::Materialize { id, page });
        self.in_flight.insert(page, id);
        id
    }

    /// Drain completed responses without blocking. Successful pages enter
    /// the arena here, so results of cancelled work never touch it.
    pub fn poll_events(&mut self) -> Vec<TextLayerEvent> {
        let mut events = vec![];

        while let Ok(response) = self.response_rx.try_recv() {
            match response {
                TextResponse::Ready { id, page, text } => {
                    if self.cancelled.remove(&id) {
                        debug!("swallowing cancelled text result for page {page}");
                        continue;
                    }
                    if self.in_flight.get(&page) == Some(&id) {
                        self.in_flight.remove(&page);
                    }
                    self.arena.insert(Arc::clone(&text));
                    events.push(TextLayerEvent::Ready { page, text });
                }

                TextResponse::Cancelled(id) => {
                    // Ack only. The swallow marker stays armed until the
                    // request's own Ready/Failed drains; with several
                    // workers the ack can arrive ahead of the real result.
                    debug!("cancel acknowledged for text request {id:?}");
                }

                TextResponse::Failed { id, page, fault } => {
                    if self.cancelled.remove(&id) {
                        continue;
                    }
                    if self.in_flight.get(&page) == Some(&id) {
                        self.in_flight.remove(&page);
                    }
                    warn!("text materialization failed for page {page}: {fault}");
                    events.push(TextLayerEvent::Failed { page, fault });
                }
            }
        }

        events
    }

    /// Whether a request for the page is pending.
    #[must_use]
    pub fn is_in_flight(&self, page: usize) -> bool {
        self.in_flight.contains_key(&page)
    }

    /// Number of pending requests.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Shared arena handle.
    #[must_use]
    pub fn arena(&self) -> &TextArena {
        &self.arena
    }

    /// Shutdown all workers.
    pub fn shutdown(&self) {
        for _ in 0..self.num_workers {
            let _ = self.request_tx.send(TextRequest::Shutdown);
        }
    }

    fn next_id(&mut self) -> RequestId {
        let id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;
        id
    }
}

impl Drop for TextLayerService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

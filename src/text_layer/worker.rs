//! Text materialization worker - runs in separate thread(s)

use std::sync::Arc;

use flume::{Receiver, Sender};

use super::page::PageText;
use super::request::{TextRequest, TextResponse};
use crate::provider::DocumentSource;

/// Main worker function, one per thread. Pulls from the shared request
/// queue until shutdown. Assembly happens here; insertion into the shared
/// arena is the service's job so cancelled results never touch it.
pub(crate) fn text_worker(
    source: Arc<dyn DocumentSource>,
    requests: Receiver<TextRequest>,
    responses: Sender<TextResponse>,
) {
    for request in requests {
        match request {
            TextRequest::Materialize { id, page } => match source.page_runs(page) {
                Ok(runs) => {
                    let text = Arc::new(PageText::assemble(page, runs));
                    let _ = responses.send(TextResponse::Ready { id, page, text });
                }
                Err(fault) => {
                    let _ = responses.send(TextResponse::Failed { id, page, fault });
                }
            },

            TextRequest::Cancel(id) => {
                let _ = responses.send(TextResponse::Cancelled(id));
            }

            TextRequest::Shutdown => break,
        }
    }
}

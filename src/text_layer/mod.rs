//! Page text materialization infrastructure

mod arena;
mod page;
mod request;
mod service;
mod worker;

pub use arena::TextArena;
pub use page::{PageText, RunId, TextRun, byte_for_char};
pub use request::{RequestId, TextRequest, TextResponse};
pub use service::{TextLayerEvent, TextLayerService};

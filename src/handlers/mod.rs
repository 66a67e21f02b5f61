//! Request handlers.
//!
//! # Data Flow
//! ```text
//! HandlerRegistry::select
//!     → handler.filter(req)      (who may reach it: interface, subnet, ...)
//!     → handler.can_handle(req)  (what it serves: uri, method, file exists)
//!     → bound to the request
//! Transport
//!     → handler.process(req) / process_upload / process_body
//! ```
//!
//! # Design Decisions
//! - A single capability trait; variants compose a filter instead of
//!   inheriting one
//! - The catch-all is a plain `CallbackHandler` owned outside the registry

use std::sync::Arc;

use crate::http::Request;

pub mod callback;
pub mod filters;
pub mod fs;
pub mod static_files;

pub use callback::CallbackHandler;
pub use fs::{DiskFs, FileSystem, MemoryFs};
pub use static_files::StaticHandler;

/// Predicate deciding whether a request may reach a handler or rewrite.
pub type RequestFilter = Arc<dyn Fn(&Request) -> bool + Send + Sync>;

/// A chunk of a multipart file upload.
#[derive(Debug, Clone, Copy)]
pub struct UploadChunk<'a> {
    pub filename: &'a str,
    /// Byte offset of `data` within the file.
    pub index: usize,
    pub data: &'a [u8],
    pub is_final: bool,
}

/// A chunk of a raw request body.
#[derive(Debug, Clone, Copy)]
pub struct BodyChunk<'a> {
    pub data: &'a [u8],
    /// Byte offset of `data` within the body.
    pub index: usize,
    pub total: usize,
}

/// Capability set every handler implements to take part in selection.
pub trait WebHandler: Send + Sync {
    /// Access check evaluated before `can_handle`.
    fn filter(&self, _req: &Request) -> bool {
        true
    }

    /// Returns true if this handler serves the request.
    fn can_handle(&self, req: &Request) -> bool;

    /// Produce the response for a bound request.
    fn process(&self, req: &mut Request);

    fn process_upload(&self, _req: &mut Request, _chunk: &UploadChunk<'_>) {}

    fn process_body(&self, _req: &mut Request, _chunk: &BodyChunk<'_>) {}

    /// Short label for logs and metrics.
    fn kind(&self) -> &'static str;
}

/// Identity comparison that ignores vtable pointers.
pub(crate) fn same_handler<A: ?Sized, B: ?Sized>(a: &Arc<A>, b: &Arc<B>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

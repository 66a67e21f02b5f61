//! Handler delegating to user-supplied callbacks.
//!
//! # Responsibilities
//! - Match a uri pattern and a method set
//! - Forward request, upload and body events to callbacks
//! - Answer 404 when no request callback is installed (catch-all role)
//!
//! # Uri patterns
//! - `""`            every url
//! - `"/*.ext"`      urls ending in `.ext`
//! - `"/prefix*"`    urls starting with `/prefix`
//! - `"/path"`       `/path` itself and anything below `/path/`
//!
//! # Design Decisions
//! - Callbacks live behind a `RwLock` so the catch-all can be reconfigured
//!   while shared; they are cloned out before being invoked, so a callback
//!   may replace itself

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::handlers::{BodyChunk, RequestFilter, UploadChunk, WebHandler};
use crate::http::{MethodSet, Request, Response};

pub type RequestCallback = Arc<dyn Fn(&mut Request) + Send + Sync>;
pub type UploadCallback = Arc<dyn Fn(&mut Request, &UploadChunk<'_>) + Send + Sync>;
pub type BodyCallback = Arc<dyn Fn(&mut Request, &BodyChunk<'_>) + Send + Sync>;

#[derive(Default, Clone)]
struct Callbacks {
    on_request: Option<RequestCallback>,
    on_upload: Option<UploadCallback>,
    on_body: Option<BodyCallback>,
}

/// Handler backed by closures.
pub struct CallbackHandler {
    uri: String,
    methods: MethodSet,
    filter: Option<RequestFilter>,
    callbacks: RwLock<Callbacks>,
    kind: &'static str,
}

impl CallbackHandler {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            methods: MethodSet::ANY,
            filter: None,
            callbacks: RwLock::new(Callbacks::default()),
            kind: "callback",
        }
    }

    /// The catch-all: every url, every method.
    pub(crate) fn catch_all() -> Self {
        Self {
            kind: "catch_all",
            ..Self::new("")
        }
    }

    pub fn with_methods(mut self, methods: MethodSet) -> Self {
        self.methods = methods;
        self
    }

    pub fn with_filter(mut self, filter: RequestFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn methods(&self) -> MethodSet {
        self.methods
    }

    pub fn on_request<F>(&self, f: F) -> &Self
    where
        F: Fn(&mut Request) + Send + Sync + 'static,
    {
        self.callbacks.write().on_request = Some(Arc::new(f));
        self
    }

    pub fn on_upload<F>(&self, f: F) -> &Self
    where
        F: Fn(&mut Request, &UploadChunk<'_>) + Send + Sync + 'static,
    {
        self.callbacks.write().on_upload = Some(Arc::new(f));
        self
    }

    pub fn on_body<F>(&self, f: F) -> &Self
    where
        F: Fn(&mut Request, &BodyChunk<'_>) + Send + Sync + 'static,
    {
        self.callbacks.write().on_body = Some(Arc::new(f));
        self
    }

    pub fn clear_callbacks(&self) {
        *self.callbacks.write() = Callbacks::default();
    }

    pub fn has_request_callback(&self) -> bool {
        self.callbacks.read().on_request.is_some()
    }

    pub fn has_upload_callback(&self) -> bool {
        self.callbacks.read().on_upload.is_some()
    }

    pub fn has_body_callback(&self) -> bool {
        self.callbacks.read().on_body.is_some()
    }

    fn matches_uri(&self, url: &str) -> bool {
        let uri = self.uri.as_str();
        if uri.is_empty() {
            return true;
        }
        if uri.starts_with("/*.") {
            // Only the last extension counts: `/*.tar.gz` matches any `.gz`.
            let ext = uri.rfind('.').map_or(uri, |i| &uri[i..]);
            return url.ends_with(ext);
        }
        if let Some(prefix) = uri.strip_suffix('*') {
            return url.starts_with(prefix);
        }
        url == uri
            || url
                .strip_prefix(uri)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl WebHandler for CallbackHandler {
    fn filter(&self, req: &Request) -> bool {
        self.filter.as_ref().map_or(true, |f| f(req))
    }

    fn can_handle(&self, req: &Request) -> bool {
        self.has_request_callback()
            && self.methods.contains(req.method())
            && self.matches_uri(req.url())
    }

    fn process(&self, req: &mut Request) {
        let callback = self.callbacks.read().on_request.clone();
        match callback {
            Some(f) => f(req),
            None => {
                req.send(Response::text(404, "text/plain", "Not found"));
            }
        }
    }

    fn process_upload(&self, req: &mut Request, chunk: &UploadChunk<'_>) {
        let callback = self.callbacks.read().on_upload.clone();
        if let Some(f) = callback {
            f(req, chunk);
        }
    }

    fn process_body(&self, req: &mut Request, chunk: &BodyChunk<'_>) {
        let callback = self.callbacks.read().on_body.clone();
        if let Some(f) = callback {
            f(req, chunk);
        }
    }

    fn kind(&self) -> &'static str {
        self.kind
    }
}

impl fmt::Debug for CallbackHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackHandler")
            .field("uri", &self.uri)
            .field("methods", &self.methods)
            .field("kind", &self.kind)
            .field("has_filter", &self.filter.is_some())
            .field("has_request_callback", &self.has_request_callback())
            .finish()
    }
}

//! Request metadata handed to the routing core.
//!
//! # Responsibilities
//! - Carry the pre-parsed method, URL, query parameters, headers and
//!   connection addresses
//! - Track the per-request dispatch state
//! - Hold the write-once handler binding and response slot
//!
//! # Design Decisions
//! - Request ID (UUID v4) assigned at construction for log correlation
//! - Construction reserves its storage fallibly; failure means the transport
//!   aborts the connection instead of routing a half-built request
//! - Parameters are a multi-map (ordered `Vec`), lookups return the first value

use std::collections::TryReserveError;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use http::Method;
use uuid::Uuid;

use crate::handlers::WebHandler;
use crate::http::response::Response;
use crate::observability::metrics;
use crate::routing::DispatchError;

/// Progress of a request through the dispatch pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    AwaitingRewrite,
    AwaitingHandler,
    Bound,
}

/// An in-flight request as seen by rewrites and handlers.
pub struct Request {
    id: Uuid,
    method: Method,
    url: String,
    params: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    local_addr: Option<SocketAddr>,
    remote_addr: Option<SocketAddr>,
    state: DispatchState,
    handler: Option<Arc<dyn WebHandler>>,
    response: Option<Response>,
}

impl Request {
    pub fn builder(method: Method, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder {
            method,
            url: url.into(),
            headers: Vec::new(),
            local_addr: None,
            remote_addr: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Current URL path (without query string).
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// First value stored under `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.param(name).is_some()
    }

    pub fn add_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.push((name.into(), value.into()));
    }

    /// Merge `params` into the request. A merged key replaces every earlier
    /// value of that key; keys not mentioned are kept.
    pub fn merge_params(&mut self, params: &[(String, String)]) {
        for (name, _) in params {
            self.params.retain(|(k, _)| k != name);
        }
        self.params.extend(params.iter().cloned());
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    /// Address of the local interface the connection arrived on.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn local_ip(&self) -> Option<IpAddr> {
        self.local_addr.map(|a| a.ip())
    }

    /// Address of the client.
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    pub fn remote_ip(&self) -> Option<IpAddr> {
        self.remote_addr.map(|a| a.ip())
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub(crate) fn advance(&mut self, state: DispatchState) {
        self.state = state;
    }

    /// The handler bound by dispatch, if any.
    pub fn handler(&self) -> Option<Arc<dyn WebHandler>> {
        self.handler.clone()
    }

    /// Bind the handler. Only the first call has an effect.
    pub(crate) fn bind_handler(&mut self, handler: Arc<dyn WebHandler>) -> bool {
        if self.handler.is_some() {
            return false;
        }
        self.handler = Some(handler);
        self.state = DispatchState::Bound;
        true
    }

    /// Record the response. Returns false if one was already sent.
    pub fn send(&mut self, response: Response) -> bool {
        if self.response.is_some() {
            tracing::warn!(request_id = %self.id, "Response already sent, ignoring");
            return false;
        }
        self.response = Some(response);
        true
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    pub fn take_response(&mut self) -> Option<Response> {
        self.response.take()
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("id", &self.id)
            .field("method", &self.method)
            .field("url", &self.url)
            .field("params", &self.params)
            .field("local_addr", &self.local_addr)
            .field("remote_addr", &self.remote_addr)
            .field("state", &self.state)
            .field("handler", &self.handler.as_ref().map(|h| h.kind()))
            .finish()
    }
}

/// Builder for [`Request`], used by the transport layer.
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    local_addr: Option<SocketAddr>,
    remote_addr: Option<SocketAddr>,
}

impl RequestBuilder {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn local_addr(mut self, addr: SocketAddr) -> Self {
        self.local_addr = Some(addr);
        self
    }

    pub fn remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    /// Build the request, splitting and decoding the query string.
    pub fn build(self) -> Result<Request, DispatchError> {
        let (path, query) = match self.url.split_once('?') {
            Some((path, query)) => (path, query),
            None => (self.url.as_str(), ""),
        };

        let decoded = url::form_urlencoded::parse(query.as_bytes());
        let (mut url, mut params) = reserve_storage(path.len(), decoded.clone().count())?;
        url.push_str(path);
        params.extend(decoded.map(|(k, v)| (k.into_owned(), v.into_owned())));

        Ok(Request {
            id: Uuid::new_v4(),
            method: self.method,
            url,
            params,
            headers: self.headers,
            local_addr: self.local_addr,
            remote_addr: self.remote_addr,
            state: DispatchState::AwaitingRewrite,
            handler: None,
            response: None,
        })
    }
}

type Params = Vec<(String, String)>;

/// Reserve the url and parameter storage of a request up front.
fn reserve_storage(url_len: usize, param_count: usize) -> Result<(String, Params), DispatchError> {
    let mut url = String::new();
    url.try_reserve(url_len).map_err(allocation_failed)?;
    let mut params = Params::new();
    params.try_reserve(param_count).map_err(allocation_failed)?;
    Ok((url, params))
}

fn allocation_failed(err: TryReserveError) -> DispatchError {
    tracing::warn!(error = %err, "Request allocation failed, aborting connection");
    metrics::record_aborted("allocation");
    DispatchError::AllocationFailure(err)
}

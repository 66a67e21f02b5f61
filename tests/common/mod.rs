//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use http::Method;
use request_dispatch::config::ObservabilityConfig;
use request_dispatch::observability;
use request_dispatch::{Request, Response, WebHandler};

/// Install the test subscriber once per binary.
pub fn init_logging() {
    let _ = observability::init(&ObservabilityConfig {
        log_level: "request_dispatch=debug".to_string(),
        metrics_enabled: false,
    });
}

pub fn get(url: &str) -> Request {
    Request::builder(Method::GET, url).build().unwrap()
}

/// A request that arrived on `local` from `remote`.
pub fn request_via(method: Method, url: &str, local: &str, remote: &str) -> Request {
    let local: SocketAddr = local.parse().unwrap();
    let remote: SocketAddr = remote.parse().unwrap();
    Request::builder(method, url)
        .local_addr(local)
        .remote_addr(remote)
        .build()
        .unwrap()
}

/// Handler with fixed answers that counts how often it runs.
pub struct Probe {
    pub name: &'static str,
    pub filter: bool,
    pub can_handle: bool,
    pub processed: AtomicUsize,
}

impl Probe {
    pub fn new(name: &'static str, filter: bool, can_handle: bool) -> Self {
        Self {
            name,
            filter,
            can_handle,
            processed: AtomicUsize::new(0),
        }
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }
}

impl WebHandler for Probe {
    fn filter(&self, _req: &Request) -> bool {
        self.filter
    }

    fn can_handle(&self, _req: &Request) -> bool {
        self.can_handle
    }

    fn process(&self, req: &mut Request) {
        self.processed.fetch_add(1, Ordering::SeqCst);
        req.send(Response::text(200, "text/plain", self.name));
    }

    fn kind(&self) -> &'static str {
        "probe"
    }
}

/// Data-pointer identity for handlers of any static type.
pub fn same<A: ?Sized, B: ?Sized>(a: &Arc<A>, b: &Arc<B>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

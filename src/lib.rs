//! Concurrent request-routing core for an embedded asynchronous web server.
//!
//! For every request the [`routing::Dispatcher`] applies the matching URL
//! rewrites (last match wins), then binds the first handler whose filter and
//! capability check accept it, falling back to a permanent catch-all.
//! Rewrite and handler registries may be changed from any thread while
//! requests are being dispatched.
//!
//! ```text
//!   transport ──▶ RequestBuilder::build ──▶ Dispatcher::dispatch
//!                                             │
//!                       ┌─────────────────────┴─────────────────────┐
//!                       ▼                                           ▼
//!              RewriteRegistry::resolve                 HandlerRegistry::select
//!              (rewrite lock)                           (handler lock)
//!                       │                                           │
//!                       └──────────▶ handler bound ◀────────────────┘
//!                                        │
//!   transport ◀── Response ◀── handler.process(req)
//! ```

pub mod collections;
pub mod config;
pub mod handlers;
pub mod http;
pub mod observability;
pub mod routing;

pub use config::RouterConfig;
pub use handlers::{CallbackHandler, StaticHandler, WebHandler};
pub use http::{MethodSet, Request, Response};
pub use routing::{DispatchError, Dispatcher, RewriteRule};

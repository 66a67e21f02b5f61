//! Request/response model shared with the transport layer.
//!
//! # Data Flow
//! ```text
//! Transport (parsed method, url, headers, addresses)
//!     → request.rs (RequestBuilder::build, query decoding)
//!     → routing::Dispatcher (rewrite, select, bind)
//!     → handler.process() writes a response.rs record
//!     → Transport serializes and sends it
//! ```

pub mod method;
pub mod request;
pub mod response;

pub use method::MethodSet;
pub use request::{DispatchState, Request, RequestBuilder};
pub use response::{Response, ResponseBody};

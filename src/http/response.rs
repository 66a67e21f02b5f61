//! Response record produced by handlers.
//!
//! The transport layer owns serialization; handlers only describe what to
//! send.

/// Body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Empty,
    Text(String),
    /// A file to stream from the handler's filesystem.
    File {
        path: String,
        gzip: bool,
    },
}

/// A response chosen by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: ResponseBody,
}

impl Response {
    /// A response with only a status code.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            headers: Vec::new(),
            body: ResponseBody::Empty,
        }
    }

    pub fn text(status: u16, content_type: &str, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some(content_type.to_string()),
            headers: Vec::new(),
            body: ResponseBody::Text(body.into()),
        }
    }

    pub fn file(path: impl Into<String>, content_type: &str, gzip: bool) -> Self {
        let mut response = Self {
            status: 200,
            content_type: Some(content_type.to_string()),
            headers: Vec::new(),
            body: ResponseBody::File {
                path: path.into(),
                gzip,
            },
        };
        if gzip {
            response = response.with_header("Content-Encoding", "gzip");
        }
        response
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

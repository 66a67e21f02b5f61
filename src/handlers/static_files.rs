//! Static content handler.
//!
//! # Responsibilities
//! - Map a uri prefix onto a directory (or single file) of a `FileSystem`
//! - Prefer the pre-compressed `.gz` sibling of a file
//! - Fall back to a default file for directory urls
//! - Answer `304 Not Modified` when `If-None-Match` matches the gzip ETag
//!
//! # Design Decisions
//! - The ETag is the CRC32 stored in the gzip trailer, so it costs one
//!   4-byte read instead of hashing the file
//! - Lookup runs in `can_handle` and again in `process`; nothing is cached on
//!   the request, so a file removed in between yields 404
//! - `can_handle` queries the filesystem while the handler lock is held; keep
//!   `FileSystem::exists` to a metadata lookup

use std::fmt;
use std::sync::Arc;

use http::Method;

use crate::handlers::{FileSystem, RequestFilter, WebHandler};
use crate::http::{Request, Response};

/// Smallest valid gzip member: 10 byte header + 8 byte trailer.
const GZIP_MIN_SIZE: u64 = 18;

/// Serves files below a mount point.
pub struct StaticHandler {
    uri: String,
    path: String,
    is_dir: bool,
    fs: Arc<dyn FileSystem>,
    cache_control: Option<String>,
    default_file: String,
    filter: Option<RequestFilter>,
}

impl StaticHandler {
    /// Mount `path` of `fs` at `uri`. A `path` ending in `/` is a directory.
    pub fn new(uri: &str, fs: Arc<dyn FileSystem>, path: &str, cache_control: Option<&str>) -> Self {
        let uri = with_leading_slash(uri);
        let path = with_leading_slash(path);
        let is_dir = path.ends_with('/');

        Self {
            uri: uri.trim_end_matches('/').to_string(),
            path: path.trim_end_matches('/').to_string(),
            is_dir,
            fs,
            cache_control: cache_control.map(str::to_string),
            default_file: "index.htm".to_string(),
            filter: None,
        }
    }

    /// File served for directory urls; empty disables the fallback.
    pub fn with_default_file(mut self, file: impl Into<String>) -> Self {
        self.default_file = file.into();
        self
    }

    pub fn with_cache_control(mut self, value: impl Into<String>) -> Self {
        self.cache_control = Some(value.into());
        self
    }

    pub fn with_filter(mut self, filter: RequestFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Resolve the request to `(fs path, gzip)`.
    fn find_file(&self, req: &Request) -> Option<(String, bool)> {
        let rest = req.url().strip_prefix(self.uri.as_str())?;
        let can_skip_file_check = (self.is_dir && rest.is_empty()) || rest.ends_with('/');
        let mut path = format!("{}{}", self.path, rest);

        if !can_skip_file_check {
            if let Some(found) = self.search(&path) {
                return Some(found);
            }
        }

        if self.default_file.is_empty() {
            return None;
        }
        if !path.ends_with('/') {
            path.push('/');
        }
        path.push_str(&self.default_file);
        self.search(&path)
    }

    fn search(&self, path: &str) -> Option<(String, bool)> {
        let gz = format!("{path}.gz");
        if self.fs.exists(&gz) {
            return Some((gz, true));
        }
        if self.fs.exists(path) {
            return Some((path.to_string(), false));
        }
        None
    }
}

impl WebHandler for StaticHandler {
    fn filter(&self, req: &Request) -> bool {
        self.filter.as_ref().map_or(true, |f| f(req))
    }

    fn can_handle(&self, req: &Request) -> bool {
        (req.method() == Method::GET || req.method() == Method::HEAD)
            && req.url().starts_with(self.uri.as_str())
            && self.find_file(req).is_some()
    }

    fn process(&self, req: &mut Request) {
        let Some((path, gzip)) = self.find_file(req) else {
            tracing::debug!(request_id = %req.id(), url = %req.url(), "Static file vanished");
            req.send(Response::text(404, "text/plain", "Not found"));
            return;
        };

        let etag = if gzip { gzip_etag(self.fs.as_ref(), &path) } else { None };
        if let (Some(tag), Some(inm)) = (etag.as_deref(), req.header("If-None-Match")) {
            if inm == tag {
                req.send(Response::status(304));
                return;
            }
        }

        let logical = path.strip_suffix(".gz").filter(|_| gzip).unwrap_or(&path);
        let mut response = Response::file(path.clone(), content_type(logical), gzip);
        if let Some(cache_control) = &self.cache_control {
            response = response.with_header("Cache-Control", cache_control.clone());
        }
        if let Some(tag) = etag {
            response = response.with_header("ETag", tag);
        }
        req.send(response);
    }

    fn kind(&self) -> &'static str {
        "static"
    }
}

impl fmt::Debug for StaticHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticHandler")
            .field("uri", &self.uri)
            .field("path", &self.path)
            .field("is_dir", &self.is_dir)
            .field("cache_control", &self.cache_control)
            .field("default_file", &self.default_file)
            .finish()
    }
}

fn with_leading_slash(s: &str) -> String {
    if s.starts_with('/') {
        s.to_string()
    } else {
        format!("/{s}")
    }
}

/// ETag from the CRC32 in the gzip trailer (bytes 8..4 from the end), as
/// uppercase hex in file byte order.
pub fn gzip_etag(fs: &dyn FileSystem, path: &str) -> Option<String> {
    let size = fs.size(path).ok()?;
    if size < GZIP_MIN_SIZE {
        return None;
    }
    let mut crc = [0u8; 4];
    match fs.read_at(path, size - 8, &mut crc) {
        Ok(4) => Some(crc.iter().map(|b| format!("{b:02X}")).collect()),
        _ => None,
    }
}

/// Content type by file extension.
pub fn content_type(path: &str) -> &'static str {
    let ext = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
    match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "txt" => "text/plain",
        "xml" => "text/xml",
        "csv" => "text/csv",
        "png" => "image/png",
        "gif" => "image/gif",
        "jpg" | "jpeg" => "image/jpeg",
        "ico" => "image/x-icon",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/x-gzip",
        _ => "application/octet-stream",
    }
}

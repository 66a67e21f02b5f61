//! Two-phase request dispatch.
//!
//! # Responsibilities
//! - Own the rewrite registry, the handler registry and the catch-all
//! - Drive each request through rewrite resolution, then handler selection
//! - Expose the configuration surface (add/remove rewrites and handlers)
//! - Reset or reload both registries under both locks
//!
//! # Design Decisions
//! - Rewrites complete before selection starts
//! - Dispatch holds the rewrite lock through selection, so a handler that
//!   adds a rewrite from `filter`/`can_handle` re-enters it instead of taking
//!   it after the handler lock
//! - Every two-lock path takes the rewrite lock first, then the handler lock
//! - A request is dispatched at most once

use std::sync::Arc;

use thiserror::Error;

use crate::config::{RouterConfig, StaticMountConfig};
use crate::handlers::{CallbackHandler, DiskFs, FileSystem, StaticHandler, WebHandler};
use crate::handlers::{BodyChunk, UploadChunk};
use crate::http::{DispatchState, MethodSet, Request};
use crate::observability::metrics;
use crate::routing::handler_registry::HandlerRegistry;
use crate::routing::rewrite::{RewriteRegistry, RewriteRule};

/// Errors surfaced to the transport layer.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Request storage could not be allocated; drop the connection.
    #[error("allocation failed while building request: {0}")]
    AllocationFailure(#[from] std::collections::TryReserveError),

    /// The request already went through dispatch.
    #[error("request already dispatched (state {0:?})")]
    AlreadyDispatched(DispatchState),
}

/// Routes requests through rewrites to a handler.
#[derive(Default)]
pub struct Dispatcher {
    rewrites: RewriteRegistry,
    handlers: HandlerRegistry,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dispatcher populated from configuration.
    pub fn from_config(config: &RouterConfig) -> Self {
        let dispatcher = Self::new();
        dispatcher.apply_config(config);
        dispatcher
    }

    // --- Rewrites ---

    pub fn add_rewrite(&self, rule: RewriteRule) -> Arc<RewriteRule> {
        self.rewrites.add(rule)
    }

    /// Shorthand for an exact-path rewrite.
    pub fn rewrite(&self, from: &str, to: &str) -> Arc<RewriteRule> {
        self.rewrites.add(RewriteRule::new(from, to))
    }

    pub fn remove_rewrite(&self, from: &str, to: &str) -> bool {
        self.rewrites.remove(from, to)
    }

    pub fn remove_rewrite_rule(&self, rule: &Arc<RewriteRule>) -> bool {
        self.rewrites.remove_rule(rule)
    }

    pub fn rewrites(&self) -> &RewriteRegistry {
        &self.rewrites
    }

    // --- Handlers ---

    pub fn add_handler<H: WebHandler + 'static>(&self, handler: H) -> Arc<H> {
        self.handlers.add(Arc::new(handler))
    }

    pub fn add_shared_handler(&self, handler: Arc<dyn WebHandler>) -> Arc<dyn WebHandler> {
        self.handlers.add_dyn(handler)
    }

    pub fn remove_handler<H: WebHandler + ?Sized>(&self, handler: &Arc<H>) -> bool {
        self.handlers.remove(handler)
    }

    /// Register a callback for `uri` and `methods`.
    pub fn on<F>(&self, uri: &str, methods: MethodSet, on_request: F) -> Arc<CallbackHandler>
    where
        F: Fn(&mut Request) + Send + Sync + 'static,
    {
        let handler = CallbackHandler::new(uri).with_methods(methods);
        handler.on_request(on_request);
        self.add_handler(handler)
    }

    /// Serve `path` of `fs` under `uri`.
    pub fn serve_static(
        &self,
        uri: &str,
        fs: Arc<dyn FileSystem>,
        path: &str,
        cache_control: Option<&str>,
    ) -> Arc<StaticHandler> {
        self.add_handler(StaticHandler::new(uri, fs, path, cache_control))
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    // --- Catch-all ---

    pub fn on_not_found<F>(&self, f: F)
    where
        F: Fn(&mut Request) + Send + Sync + 'static,
    {
        self.handlers.catch_all().on_request(f);
    }

    pub fn on_file_upload<F>(&self, f: F)
    where
        F: Fn(&mut Request, &UploadChunk<'_>) + Send + Sync + 'static,
    {
        self.handlers.catch_all().on_upload(f);
    }

    pub fn on_request_body<F>(&self, f: F)
    where
        F: Fn(&mut Request, &BodyChunk<'_>) + Send + Sync + 'static,
    {
        self.handlers.catch_all().on_body(f);
    }

    pub fn catch_all_handler(&self) -> Arc<CallbackHandler> {
        self.handlers.catch_all()
    }

    // --- Dispatch ---

    /// Apply rewrites, select a handler and bind it to the request.
    pub fn dispatch(&self, req: &mut Request) -> Result<Arc<dyn WebHandler>, DispatchError> {
        if req.state() != DispatchState::AwaitingRewrite {
            return Err(DispatchError::AlreadyDispatched(req.state()));
        }

        let requested_url = req.url().to_string();
        let handler = {
            let _rewrites = self.rewrites.lock();
            self.rewrites.resolve(req);
            req.advance(DispatchState::AwaitingHandler);
            self.handlers.select(req)
        };
        req.bind_handler(handler.clone());

        let catch_all = self.handlers.is_catch_all(&handler);
        tracing::debug!(
            request_id = %req.id(),
            method = %req.method(),
            url = %requested_url,
            rewritten = %req.url(),
            handler = handler.kind(),
            "Request dispatched"
        );
        metrics::record_dispatch(handler.kind(), catch_all);
        Ok(handler)
    }

    /// Dispatch and run the selected handler.
    pub fn handle(&self, req: &mut Request) -> Result<(), DispatchError> {
        let handler = self.dispatch(req)?;
        handler.process(req);
        Ok(())
    }

    // --- Lifecycle ---

    /// Clear both registries and the catch-all callbacks.
    pub fn reset(&self) {
        let _rewrites = self.rewrites.lock();
        let _handlers = self.handlers.lock();
        self.rewrites.clear();
        self.handlers.clear();
        self.handlers.catch_all().clear_callbacks();
        tracing::info!("Dispatcher reset");
    }

    /// Replace both registries with the contents of `config`. Catch-all
    /// callbacks are kept.
    pub fn reload(&self, config: &RouterConfig) {
        let _rewrites = self.rewrites.lock();
        let _handlers = self.handlers.lock();
        self.rewrites.clear();
        self.handlers.clear();
        self.apply_config(config);
    }

    /// Register the rewrites and static mounts of `config`.
    pub fn apply_config(&self, config: &RouterConfig) {
        let _rewrites = self.rewrites.lock();
        let _handlers = self.handlers.lock();
        for rewrite in &config.rewrites {
            self.rewrite(&rewrite.from, &rewrite.to);
        }
        for mount in &config.static_mounts {
            self.add_handler(static_handler(mount));
        }
        tracing::info!(
            rewrites = config.rewrites.len(),
            static_mounts = config.static_mounts.len(),
            "Configuration applied"
        );
    }
}

fn static_handler(mount: &StaticMountConfig) -> StaticHandler {
    let fs: Arc<dyn FileSystem> = Arc::new(DiskFs::new(&mount.path));
    StaticHandler::new(&mount.uri, fs, "/", mount.cache_control.as_deref())
        .with_default_file(mount.default_file.clone())
}

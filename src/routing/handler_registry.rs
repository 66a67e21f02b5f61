//! Handler registry and selection.
//!
//! # Responsibilities
//! - Keep registered handlers in registration order
//! - Select the first handler whose filter and capability check both pass
//! - Fall back to the catch-all handler
//!
//! # Design Decisions
//! - First match wins (selection is exclusive, unlike rewrites)
//! - The catch-all is a separate field: never stored in the list, never
//!   removed, never skipped by a filter
//! - Own re-entrant lock, independent of the rewrite lock; the list is read
//!   one entry at a time so `filter`/`can_handle` may register handlers

use std::sync::Arc;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

use crate::collections::SyncList;
use crate::handlers::{same_handler, CallbackHandler, WebHandler};
use crate::http::Request;

/// Ordered handlers plus the permanent catch-all.
pub struct HandlerRegistry {
    lock: ReentrantMutex<()>,
    handlers: SyncList<Arc<dyn WebHandler>>,
    catch_all: Arc<CallbackHandler>,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            lock: ReentrantMutex::new(()),
            handlers: SyncList::new(),
            catch_all: Arc::new(CallbackHandler::catch_all()),
        }
    }

    /// Take the registry lock. Re-entrant for the calling thread.
    pub fn lock(&self) -> ReentrantMutexGuard<'_, ()> {
        self.lock.lock()
    }

    /// Append a handler and return it.
    pub fn add<H: WebHandler + 'static>(&self, handler: Arc<H>) -> Arc<H> {
        let _guard = self.lock();
        self.handlers.push_back(handler.clone());
        tracing::debug!(kind = handler.kind(), "Handler added");
        handler
    }

    /// Append a handler already erased to a trait object.
    pub fn add_dyn(&self, handler: Arc<dyn WebHandler>) -> Arc<dyn WebHandler> {
        let _guard = self.lock();
        self.handlers.push_back(handler.clone());
        tracing::debug!(kind = handler.kind(), "Handler added");
        handler
    }

    /// Remove a handler by identity.
    pub fn remove<H: WebHandler + ?Sized>(&self, handler: &Arc<H>) -> bool {
        let _guard = self.lock();
        let removed = self.handlers.remove_first_if(|h| same_handler(h, handler));
        tracing::debug!(kind = handler.kind(), removed, "Handler remove");
        removed
    }

    /// First handler accepting the request, or the catch-all.
    pub fn select(&self, req: &Request) -> Arc<dyn WebHandler> {
        let _guard = self.lock();
        let mut index = 0;
        while let Some(handler) = self.handlers.get(index) {
            index += 1;
            if handler.filter(req) && handler.can_handle(req) {
                return handler;
            }
        }
        self.catch_all.clone()
    }

    pub fn catch_all(&self) -> Arc<CallbackHandler> {
        self.catch_all.clone()
    }

    /// Returns true if `handler` is the catch-all.
    pub fn is_catch_all<H: ?Sized>(&self, handler: &Arc<H>) -> bool {
        same_handler(&self.catch_all, handler)
    }

    /// Drop every registered handler. The catch-all is unaffected.
    pub fn clear(&self) {
        let _guard = self.lock();
        self.handlers.clear();
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn handlers(&self) -> Vec<Arc<dyn WebHandler>> {
        self.handlers.snapshot()
    }
}

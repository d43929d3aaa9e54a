use std::collections::BTreeMap;

use tracing::debug;

use super::errors::CleanupError;
use super::handler::CleanupHandler;

/// Registry mapping category keys to their handlers.
///
/// Built explicitly at startup; nothing registers itself.
#[derive(Default)]
pub struct CleanupTypeRegistry {
    handlers: BTreeMap<&'static str, Box<dyn CleanupHandler>>,
}

impl CleanupTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `category`.
    ///
    /// The key must equal the handler's own `items_type()`, and each key may
    /// be registered once.
    pub fn register(
        &mut self,
        category: &'static str,
        handler: Box<dyn CleanupHandler>,
    ) -> Result<(), CleanupError> {
        if handler.items_type() != category {
            return Err(CleanupError::CategoryMismatch {
                category: category.to_string(),
                handler: handler.items_type().to_string(),
            });
        }
        if self.handlers.contains_key(category) {
            return Err(CleanupError::DuplicateCategory {
                category: category.to_string(),
            });
        }

        debug!(event = "core.cleanup.handler_registered", category = category);
        self.handlers.insert(category, handler);
        Ok(())
    }

    pub fn get(&self, category: &str) -> Result<&dyn CleanupHandler, CleanupError> {
        self.handlers
            .get(category)
            .map(|h| h.as_ref())
            .ok_or_else(|| CleanupError::UnknownCategory {
                category: category.to_string(),
            })
    }

    /// Registered category keys, sorted.
    pub fn categories(&self) -> Vec<&'static str> {
        self.handlers.keys().copied().collect()
    }

    pub fn handlers(&self) -> impl Iterator<Item = &dyn CleanupHandler> {
        self.handlers.values().map(|h| h.as_ref())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

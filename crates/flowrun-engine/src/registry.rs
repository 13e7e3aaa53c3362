use std::collections::HashMap;
use std::sync::Arc;

use flowrun_core::traits::{NodeHandler, TemperatureLookup};

use crate::handlers::{
    ConditionHandler, EmailHandler, EndHandler, FormHandler, IntegrationHandler, StartHandler,
};

/// Maps a node type tag to the handler that executes it.
///
/// Read-only once built; share it behind an `Arc` across runs.
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn NodeHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler under its own type tag, replacing any previous one.
    pub fn register(&mut self, handler: impl NodeHandler) {
        let node_type = handler.node_type().to_string();
        self.handlers.insert(node_type, Arc::new(handler));
    }

    /// Get the handler for a type tag. A miss is not an error here; the
    /// engine decides what to do with it.
    pub fn get(&self, node_type: &str) -> Option<Arc<dyn NodeHandler>> {
        self.handlers.get(node_type).cloned()
    }

    /// List all registered type tags, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(|s| s.as_str()).collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Create a registry with all built-in handlers registered.
    pub fn with_builtins(lookup: Arc<dyn TemperatureLookup>) -> Self {
        let mut registry = Self::new();

        registry.register(StartHandler);
        registry.register(FormHandler);
        registry.register(IntegrationHandler::new(lookup));
        registry.register(ConditionHandler);
        registry.register(EmailHandler);
        registry.register(EndHandler);

        registry
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

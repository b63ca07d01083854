use std::collections::BTreeMap;
use std::sync::Arc;

use crate::operation::{
    Addition, Division, Multiplication, Operation, OperationError, Power, Root, Subtraction,
};

/// Maps operation names to operation implementations.
///
/// Keys are lowercase command names ("add"). Lookups also accept an
/// operation's display name ("Addition") so persisted calculations resolve
/// back to their implementation.
#[derive(Debug, Clone, Default)]
pub struct OperationRegistry {
    operations: BTreeMap<String, Arc<dyn Operation>>,
}

impl OperationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with the six built-in operations.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let builtins: [(&str, Arc<dyn Operation>); 6] = [
            ("add", Arc::new(Addition)),
            ("subtract", Arc::new(Subtraction)),
            ("multiply", Arc::new(Multiplication)),
            ("divide", Arc::new(Division)),
            ("power", Arc::new(Power)),
            ("root", Arc::new(Root)),
        ];
        for (name, operation) in builtins {
            registry.operations.insert(name.to_string(), operation);
        }
        registry
    }

    /// Register an operation under `name`. An existing entry is replaced.
    pub fn register(
        &mut self,
        name: &str,
        operation: impl Operation + 'static,
    ) -> Result<(), OperationError> {
        let key = normalize(name);
        if key.is_empty() || !key.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(OperationError::InvalidName(name.to_string()));
        }
        if self.operations.insert(key.clone(), Arc::new(operation)).is_some() {
            tracing::debug!(name = %key, "replaced registered operation");
        } else {
            tracing::debug!(name = %key, "registered operation");
        }
        Ok(())
    }

    /// Look up an operation by command name or display name.
    pub fn create(&self, name: &str) -> Result<Arc<dyn Operation>, OperationError> {
        let key = normalize(name);
        if let Some(operation) = self.operations.get(&key) {
            return Ok(Arc::clone(operation));
        }
        self.operations
            .values()
            .find(|op| op.name().to_lowercase() == key)
            .cloned()
            .ok_or_else(|| OperationError::Unknown(name.trim().to_string()))
    }

    /// Whether `name` resolves to a registered operation.
    pub fn contains(&self, name: &str) -> bool {
        self.create(name).is_ok()
    }

    /// Registered command names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

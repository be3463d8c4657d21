use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;

use crate::interpreter::value::Value;

/// A lexically scoped mapping from names to values.
///
/// Tables chain upward: a lookup that misses the local frame continues in
/// the parent, while writes always land in the local frame so that child
/// frames shadow without mutating their ancestors. Closure contexts share
/// one table by reference, which is how sibling forms observe each other's
/// writes.
pub struct SymbolTable {
    parent:  Option<Arc<SymbolTable>>,
    entries: RwLock<HashMap<String, Value>>,
}

impl SymbolTable {
    /// Creates a frame chained to the given parent.
    #[must_use]
    pub fn new(parent: Option<Arc<SymbolTable>>) -> Arc<Self> {
        Arc::new(Self { parent,
                        entries: RwLock::new(HashMap::new()) })
    }

    /// Binds a name in this frame, shadowing any binding up the chain.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.entries.write().insert(name.into(), value);
    }

    /// Looks a name up, walking parent frames on a local miss.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.entries.read().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.get(name))
    }
}

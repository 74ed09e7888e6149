//! [`battle_core::ItemOracle`] backed by an in-memory map.
use std::collections::HashMap;

use battle_core::{ItemDefinition, ItemOracle};

/// ItemOracle implementation with static item definitions
#[derive(Clone, Debug, Default)]
pub struct ItemOracleImpl {
    definitions: HashMap<String, ItemDefinition>,
}

impl ItemOracleImpl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = ItemDefinition>) -> Self {
        let mut oracle = Self::new();
        for definition in definitions {
            oracle.add_definition(definition);
        }
        oracle
    }

    /// Add an item definition
    pub fn add_definition(&mut self, def: ItemDefinition) {
        self.definitions.insert(def.id.clone(), def);
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl ItemOracle for ItemOracleImpl {
    fn definition(&self, item_id: &str) -> Option<ItemDefinition> {
        self.definitions.get(item_id).cloned()
    }
}

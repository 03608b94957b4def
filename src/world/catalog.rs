//! Read-only item catalog shared by every inventory.
//!
//! Inventories never alias item instances: adding an item materializes a
//! fresh copy from the catalog, re-resolved by name, so mutation in one
//! character's inventory can never leak into another's.

use std::collections::HashMap;

use crate::world::errors::WorldError;
use crate::world::types::{Item, ItemRecord};

/// Name of the item treated as the fungible settlement currency.
///
/// This is a naming convention, not a type distinction; the currency item
/// lives in the catalog and in inventories like any other item.
pub const GOLD_COIN: &str = "Gold Coin";

/// Registry of item definitions, keyed by case-insensitive name.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    records: HashMap<String, ItemRecord>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record, replacing and returning any previous entry with the
    /// same (case-insensitive) name.
    pub fn insert(&mut self, record: ItemRecord) -> Option<ItemRecord> {
        self.records.insert(record.name.to_lowercase(), record)
    }

    /// Look up a record by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&ItemRecord> {
        self.records.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Produce a fresh inventory entry for `name` with the given quantity.
    pub fn materialize(&self, name: &str, quantity: u32) -> Result<Item, WorldError> {
        let record = self
            .get(name)
            .ok_or_else(|| WorldError::UnknownItem(name.to_string()))?;
        Ok(Item::from_record(record, quantity))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Canonical names of every registered item, unordered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.values().map(|r| r.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;

    fn record(name: &str, price: i64) -> ItemRecord {
        ItemRecord {
            id: 1,
            name: name.to_string(),
            item_type: "Misc".to_string(),
            description: format!("A {}", name),
            icon_pos: (0, 0),
            tradable: true,
            price,
            effect: Map::new(),
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut catalog = ItemCatalog::new();
        catalog.insert(record("Health Potion", 10));

        assert!(catalog.contains("health potion"));
        assert!(catalog.contains("HEALTH POTION"));
        assert_eq!(catalog.get("Health potion").unwrap().price, 10);
    }

    #[test]
    fn materialize_yields_independent_copies() {
        let mut catalog = ItemCatalog::new();
        catalog.insert(record("Wood Shield", 25));

        let mut first = catalog.materialize("wood shield", 2).unwrap();
        let second = catalog.materialize("Wood Shield", 5).unwrap();

        first.quantity = 99;
        assert_eq!(second.quantity, 5);
        assert_eq!(catalog.get("wood shield").unwrap().price, 25);
    }

    #[test]
    fn materialize_unknown_name_fails() {
        let catalog = ItemCatalog::new();
        let err = catalog.materialize("Phoenix Down", 1).unwrap_err();
        assert!(matches!(err, WorldError::UnknownItem(name) if name == "Phoenix Down"));
    }
}

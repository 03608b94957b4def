//! Inventory management for world characters.
//!
//! An inventory is an ordered collection of items, unique by name. Quantities
//! are tracked per entry and an entry whose quantity reaches zero is removed
//! outright, never kept as a placeholder.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::world::catalog::{ItemCatalog, GOLD_COIN};
use crate::world::errors::WorldError;
use crate::world::types::Item;

/// A character's owned item collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    items: Vec<Item>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` of the named item.
    ///
    /// If an entry with the same name already exists its quantity is
    /// incremented; otherwise a fresh copy is materialized from the catalog,
    /// so inventories never alias each other's instances. A zero amount is a
    /// contract violation and fails with [`WorldError::InvalidQuantity`].
    pub fn add_item(
        &mut self,
        catalog: &ItemCatalog,
        name: &str,
        quantity: u32,
    ) -> Result<(), WorldError> {
        if quantity == 0 {
            return Err(WorldError::InvalidQuantity {
                item: name.to_string(),
            });
        }

        if let Some(existing) = self.find_item_by_name_mut(name) {
            existing.quantity += quantity;
            return Ok(());
        }

        let item = catalog.materialize(name, quantity)?;
        self.items.push(item);
        Ok(())
    }

    /// Remove `quantity` of the named item.
    ///
    /// Returns `false` (and leaves the inventory unchanged) when the item is
    /// absent, the held quantity is insufficient, or the amount is zero.
    /// This deliberately never fails hard so callers can use it as a
    /// precondition check during a transaction.
    pub fn remove_item(&mut self, name: &str, quantity: u32) -> bool {
        if quantity == 0 {
            debug!("ignoring zero-quantity removal of '{}'", name);
            return false;
        }

        let Some(index) = self
            .items
            .iter()
            .position(|item| item.name.eq_ignore_ascii_case(name))
        else {
            return false;
        };

        let held = self.items[index].quantity;
        if held < quantity {
            return false;
        }

        if held == quantity {
            self.items.remove(index);
        } else {
            self.items[index].quantity = held - quantity;
        }
        true
    }

    /// Case-insensitive lookup of an inventory entry.
    pub fn find_item_by_name(&self, name: &str) -> Option<&Item> {
        self.items
            .iter()
            .find(|item| item.name.eq_ignore_ascii_case(name))
    }

    fn find_item_by_name_mut(&mut self, name: &str) -> Option<&mut Item> {
        self.items
            .iter_mut()
            .find(|item| item.name.eq_ignore_ascii_case(name))
    }

    /// Held quantity of the named item; zero when absent.
    pub fn quantity_of(&self, name: &str) -> u32 {
        self.find_item_by_name(name).map_or(0, |item| item.quantity)
    }

    /// Entries in insertion order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Entries a merchant would put on the shelf: tradable items, excluding
    /// the settlement currency itself.
    pub fn tradable_items(&self) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| item.tradable && !item.name.eq_ignore_ascii_case(GOLD_COIN))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::types::ItemRecord;
    use std::collections::HashMap;

    fn catalog() -> ItemCatalog {
        let mut catalog = ItemCatalog::new();
        for (id, name, price, tradable) in [
            (1, "Health Potion", 10, true),
            (2, "Wood Shield", 25, true),
            (3, GOLD_COIN, 1, true),
            (4, "Rusty Key", 0, false),
        ] {
            catalog.insert(ItemRecord {
                id,
                name: name.to_string(),
                item_type: "Misc".to_string(),
                description: format!("A {}", name),
                icon_pos: (0, 0),
                tradable,
                price,
                effect: HashMap::new(),
            });
        }
        catalog
    }

    #[test]
    fn add_new_item_materializes_catalog_copy() {
        let catalog = catalog();
        let mut inv = Inventory::new();

        inv.add_item(&catalog, "Health Potion", 3).unwrap();
        assert_eq!(inv.len(), 1);
        assert_eq!(inv.quantity_of("health potion"), 3);
        assert_eq!(inv.find_item_by_name("HEALTH POTION").unwrap().price, 10);
    }

    #[test]
    fn add_existing_item_increments_quantity() {
        let catalog = catalog();
        let mut inv = Inventory::new();

        inv.add_item(&catalog, "Wood Shield", 1).unwrap();
        inv.add_item(&catalog, "wood shield", 2).unwrap();
        assert_eq!(inv.len(), 1);
        assert_eq!(inv.quantity_of("Wood Shield"), 3);
    }

    #[test]
    fn add_zero_quantity_is_rejected() {
        let catalog = catalog();
        let mut inv = Inventory::new();

        let err = inv.add_item(&catalog, "Health Potion", 0).unwrap_err();
        assert!(matches!(err, WorldError::InvalidQuantity { .. }));
        assert!(inv.is_empty());
    }

    #[test]
    fn add_unknown_item_is_rejected() {
        let catalog = catalog();
        let mut inv = Inventory::new();

        let err = inv.add_item(&catalog, "Elixir", 1).unwrap_err();
        assert!(matches!(err, WorldError::UnknownItem(_)));
    }

    #[test]
    fn remove_missing_or_insufficient_returns_false_unchanged() {
        let catalog = catalog();
        let mut inv = Inventory::new();
        inv.add_item(&catalog, "Health Potion", 2).unwrap();

        assert!(!inv.remove_item("Wood Shield", 1));
        assert!(!inv.remove_item("Health Potion", 3));
        assert!(!inv.remove_item("Health Potion", 0));
        assert_eq!(inv.quantity_of("Health Potion"), 2);
    }

    #[test]
    fn remove_to_zero_deletes_entry() {
        let catalog = catalog();
        let mut inv = Inventory::new();
        inv.add_item(&catalog, "Health Potion", 2).unwrap();

        assert!(inv.remove_item("health potion", 2));
        assert!(inv.find_item_by_name("Health Potion").is_none());
        assert!(inv.is_empty());
    }

    #[test]
    fn quantity_is_conserved_across_add_remove_sequences() {
        let catalog = catalog();
        let mut inv = Inventory::new();

        inv.add_item(&catalog, "Health Potion", 5).unwrap();
        inv.add_item(&catalog, "Health Potion", 4).unwrap();
        assert!(inv.remove_item("Health Potion", 3));
        assert!(!inv.remove_item("Health Potion", 100)); // no-op
        assert!(inv.remove_item("Health Potion", 2));

        // 5 + 4 - 3 - 2
        assert_eq!(inv.quantity_of("Health Potion"), 4);
    }

    #[test]
    fn tradable_items_excludes_currency_and_untradables() {
        let catalog = catalog();
        let mut inv = Inventory::new();
        inv.add_item(&catalog, "Health Potion", 1).unwrap();
        inv.add_item(&catalog, GOLD_COIN, 100).unwrap();
        inv.add_item(&catalog, "Rusty Key", 1).unwrap();

        let shelf = inv.tradable_items();
        assert_eq!(shelf.len(), 1);
        assert_eq!(shelf[0].name, "Health Potion");
    }
}

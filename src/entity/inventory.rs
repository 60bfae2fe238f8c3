//! Item storage

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Currency item name; never counted as sellable
pub const CURRENCY: &str = "gold";

/// A named stack of items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub quantity: u32,
}

impl Item {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }
}

/// Item name -> quantity, with zero-quantity entries removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    items: BTreeMap<String, u32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, name: &str, quantity: u32) -> Self {
        self.add(name, quantity);
        self
    }

    pub fn add(&mut self, name: &str, quantity: u32) {
        if quantity == 0 {
            return;
        }
        *self.items.entry(name.to_string()).or_insert(0) += quantity;
    }

    /// Remove up to `quantity` and return the amount actually removed
    pub fn remove(&mut self, name: &str, quantity: u32) -> u32 {
        let Some(current) = self.items.get_mut(name) else {
            return 0;
        };
        let removed = quantity.min(*current);
        *current -= removed;
        if *current == 0 {
            self.items.remove(name);
        }
        removed
    }

    pub fn quantity(&self, name: &str) -> u32 {
        self.items.get(name).copied().unwrap_or(0)
    }

    pub fn has(&self, name: &str, quantity: u32) -> bool {
        self.quantity(name) >= quantity
    }

    /// Every stack in name order
    pub fn items(&self) -> Vec<Item> {
        self.items
            .iter()
            .map(|(name, qty)| Item::new(name.clone(), *qty))
            .collect()
    }

    /// Every stack except the currency
    pub fn non_currency_items(&self) -> Vec<Item> {
        self.items
            .iter()
            .filter(|(name, _)| name.as_str() != CURRENCY)
            .map(|(name, qty)| Item::new(name.clone(), *qty))
            .collect()
    }

    /// Stacks that can be offered for sale
    pub fn sellable_items(&self) -> Vec<Item> {
        self.non_currency_items()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_returns_actual_amount() {
        let mut inv = Inventory::new().with_item("kekwood", 3);
        assert_eq!(inv.remove("kekwood", 2), 2);
        assert_eq!(inv.remove("kekwood", 5), 1);
        assert_eq!(inv.remove("kekwood", 1), 0);
        assert!(inv.is_empty());
    }

    #[test]
    fn test_zero_quantity_entries_are_dropped() {
        let mut inv = Inventory::new();
        inv.add("alphaslate", 0);
        assert!(inv.is_empty());
        inv.add("alphaslate", 1);
        inv.remove("alphaslate", 1);
        assert!(inv.items().is_empty());
    }

    #[test]
    fn test_sellable_items_exclude_currency() {
        let inv = Inventory::new()
            .with_item(CURRENCY, 100)
            .with_item("fomoberry", 4);
        assert_eq!(inv.sellable_items(), vec![Item::new("fomoberry", 4)]);
        assert_eq!(inv.items().len(), 2);
    }
}

//! Price targets and buy/sell offer negotiation
//!
//! Currency is held as the [`CURRENCY`] item in the trader's inventory, so a
//! trade is a pair of inventory transfers once both sides agree on an offer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entity::inventory::{Inventory, Item, CURRENCY};

/// Per-item prices in currency units
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceTargets {
    /// What this trader is willing to pay per unit
    pub buy: BTreeMap<String, u32>,
    /// What this trader asks per unit
    pub sell: BTreeMap<String, u32>,
}

/// Items offered in exchange for a currency amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub gold: u32,
    pub items: Vec<Item>,
}

impl Offer {
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trader {
    pub prices: PriceTargets,
    /// Asking price for items missing from the sell table
    pub default_price: u32,
}

impl Trader {
    pub fn new(default_price: u32) -> Self {
        Self {
            prices: PriceTargets::default(),
            default_price,
        }
    }

    pub fn buying(mut self, item: &str, price: u32) -> Self {
        self.prices.buy.insert(item.to_string(), price);
        self
    }

    pub fn selling(mut self, item: &str, price: u32) -> Self {
        self.prices.sell.insert(item.to_string(), price);
        self
    }

    fn ask(&self, item: &str) -> u32 {
        self.prices.sell.get(item).copied().unwrap_or(self.default_price)
    }

    /// Offer every sellable stack at this trader's asking prices
    pub fn create_sell_offer(&self, own: &Inventory) -> Option<Offer> {
        let items = own.sellable_items();
        if items.is_empty() {
            return None;
        }
        let gold = items.iter().map(|i| i.quantity * self.ask(&i.name)).sum();
        Some(Offer { gold, items })
    }

    /// Counter a sell offer as the buyer
    ///
    /// Keeps only items this trader has a buy price for, priced at that
    /// price, and trims quantities to what `own` can afford.
    pub fn counter_sell_offer(&self, own: &Inventory, offer: &Offer) -> Option<Offer> {
        let mut budget = own.quantity(CURRENCY);
        let mut gold = 0;
        let mut items = Vec::new();
        for item in &offer.items {
            let Some(&price) = self.prices.buy.get(&item.name) else {
                continue;
            };
            let affordable = if price == 0 {
                item.quantity
            } else {
                item.quantity.min(budget / price)
            };
            if affordable == 0 {
                continue;
            }
            budget -= affordable * price;
            gold += affordable * price;
            items.push(Item::new(item.name.clone(), affordable));
        }
        if items.is_empty() {
            return None;
        }
        Some(Offer { gold, items })
    }

    /// Ask `seller` for everything on this trader's buy table that it stocks
    pub fn create_buy_offer(&self, own: &Inventory, seller: &Inventory) -> Option<Offer> {
        let mut budget = own.quantity(CURRENCY);
        let mut gold = 0;
        let mut items = Vec::new();
        for (name, &price) in &self.prices.buy {
            let stocked = seller.quantity(name);
            let wanted = if price == 0 { stocked } else { stocked.min(budget / price) };
            if wanted == 0 {
                continue;
            }
            budget -= wanted * price;
            gold += wanted * price;
            items.push(Item::new(name.clone(), wanted));
        }
        if items.is_empty() {
            return None;
        }
        Some(Offer { gold, items })
    }

    /// Counter a buy offer as the seller, re-pricing at this trader's asks
    pub fn counter_buy_offer(&self, own: &Inventory, offer: &Offer) -> Option<Offer> {
        let items: Vec<Item> = offer
            .items
            .iter()
            .filter_map(|item| {
                let available = item.quantity.min(own.quantity(&item.name));
                (available > 0).then(|| Item::new(item.name.clone(), available))
            })
            .collect();
        if items.is_empty() {
            return None;
        }
        let gold = items.iter().map(|i| i.quantity * self.ask(&i.name)).sum();
        Some(Offer { gold, items })
    }
}

/// Move the offer's items from `seller` to `buyer` and its gold the other way
///
/// Returns false and changes nothing if either side cannot cover its half.
pub fn settle(offer: &Offer, seller: &mut Inventory, buyer: &mut Inventory) -> bool {
    if !buyer.has(CURRENCY, offer.gold) {
        return false;
    }
    if offer.items.iter().any(|i| !seller.has(&i.name, i.quantity)) {
        return false;
    }
    for item in &offer.items {
        seller.remove(&item.name, item.quantity);
        buyer.add(&item.name, item.quantity);
    }
    buyer.remove(CURRENCY, offer.gold);
    seller.add(CURRENCY, offer.gold);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop() -> (Trader, Inventory) {
        let trader = Trader::new(1).buying("fomoberry", 2).buying("kekwood", 3);
        (trader, Inventory::new().with_item(CURRENCY, 100))
    }

    #[test]
    fn test_sell_offer_prices_every_sellable_stack() {
        let seller = Trader::new(4).selling("kekwood", 10);
        let inv = Inventory::new()
            .with_item("kekwood", 2)
            .with_item("fomoberry", 3)
            .with_item(CURRENCY, 50);
        let offer = seller.create_sell_offer(&inv).unwrap();
        assert_eq!(offer.gold, 2 * 10 + 3 * 4);
        assert_eq!(offer.item_count(), 5);
    }

    #[test]
    fn test_counter_sell_offer_uses_buyer_prices() {
        let (buyer, buyer_inv) = shop();
        let offer = Offer {
            gold: 999,
            items: vec![Item::new("fomoberry", 5), Item::new("mystery", 1)],
        };
        let counter = buyer.counter_sell_offer(&buyer_inv, &offer).unwrap();
        assert_eq!(counter.items, vec![Item::new("fomoberry", 5)]);
        assert_eq!(counter.gold, 10);
    }

    #[test]
    fn test_counter_sell_offer_respects_budget() {
        let buyer = Trader::new(1).buying("kekwood", 30);
        let buyer_inv = Inventory::new().with_item(CURRENCY, 70);
        let offer = Offer {
            gold: 0,
            items: vec![Item::new("kekwood", 5)],
        };
        let counter = buyer.counter_sell_offer(&buyer_inv, &offer).unwrap();
        assert_eq!(counter.items, vec![Item::new("kekwood", 2)]);
        assert_eq!(counter.gold, 60);
    }

    #[test]
    fn test_buy_offer_and_counter() {
        let (buyer, buyer_inv) = shop();
        let seller = Trader::new(5);
        let seller_inv = Inventory::new().with_item("kekwood", 4);

        let offer = buyer.create_buy_offer(&buyer_inv, &seller_inv).unwrap();
        assert_eq!(offer.items, vec![Item::new("kekwood", 4)]);
        assert_eq!(offer.gold, 12);

        let counter = seller.counter_buy_offer(&seller_inv, &offer).unwrap();
        assert_eq!(counter.gold, 20);
    }

    #[test]
    fn test_settle_transfers_both_ways() {
        let mut seller = Inventory::new().with_item("fomoberry", 5);
        let mut buyer = Inventory::new().with_item(CURRENCY, 10);
        let offer = Offer {
            gold: 10,
            items: vec![Item::new("fomoberry", 5)],
        };
        assert!(settle(&offer, &mut seller, &mut buyer));
        assert_eq!(seller.quantity(CURRENCY), 10);
        assert_eq!(buyer.quantity("fomoberry"), 5);
        assert_eq!(buyer.quantity(CURRENCY), 0);
        assert_eq!(seller.quantity("fomoberry"), 0);
    }

    #[test]
    fn test_settle_rejects_unaffordable() {
        let mut seller = Inventory::new().with_item("fomoberry", 5);
        let mut buyer = Inventory::new().with_item(CURRENCY, 1);
        let offer = Offer {
            gold: 10,
            items: vec![Item::new("fomoberry", 5)],
        };
        assert!(!settle(&offer, &mut seller, &mut buyer));
        assert_eq!(seller.quantity("fomoberry"), 5);
    }
}

//! Harvestable resource nodes (bushes, trees, boulders)

use serde::{Deserialize, Serialize};

/// Which gather action a node answers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Forage,
    Chop,
    Mine,
}

/// How a node restocks after harvesting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RegrowRule {
    Never,
    /// Add `amount` every `every_s` simulated seconds up to the max stock
    Interval { every_s: f64, amount: u32 },
    /// Stay depleted for `duration_s`, then refill completely
    AfterDepletion { duration_s: f64 },
}

/// Emitted when regrowth makes an empty node harvestable again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegrowEvent {
    Restocked,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceNode {
    pub kind: ResourceKind,
    pub item: String,
    pub yield_per_harvest: u32,
    /// None = inexhaustible
    pub stock: Option<u32>,
    pub max_stock: u32,
    pub regrow: RegrowRule,
    regrow_timer_s: f64,
    regrowing: bool,
}

impl ResourceNode {
    pub fn new(kind: ResourceKind, item: &str, yield_per_harvest: u32, stock: u32) -> Self {
        Self {
            kind,
            item: item.to_string(),
            yield_per_harvest,
            stock: Some(stock),
            max_stock: stock,
            regrow: RegrowRule::Never,
            regrow_timer_s: 0.0,
            regrowing: false,
        }
    }

    /// A node that never runs out
    pub fn inexhaustible(kind: ResourceKind, item: &str, yield_per_harvest: u32) -> Self {
        Self {
            stock: None,
            max_stock: 0,
            ..Self::new(kind, item, yield_per_harvest, 0)
        }
    }

    pub fn with_regrow(mut self, rule: RegrowRule) -> Self {
        self.regrow = rule;
        self
    }

    /// Amount the next harvest would yield, without taking it
    pub fn peek_yield(&self) -> u32 {
        if self.regrowing {
            return 0;
        }
        match self.stock {
            Some(stock) => self.yield_per_harvest.min(stock),
            None => self.yield_per_harvest,
        }
    }

    pub fn can_be_harvested(&self) -> bool {
        self.peek_yield() > 0
    }

    pub fn is_regrowing(&self) -> bool {
        self.regrowing
    }

    /// Take one harvest's worth; returns the amount taken
    pub fn harvest(&mut self) -> u32 {
        let amount = self.peek_yield();
        if let Some(stock) = self.stock.as_mut() {
            *stock -= amount;
            if *stock == 0 {
                if let RegrowRule::AfterDepletion { .. } = self.regrow {
                    self.regrowing = true;
                    self.regrow_timer_s = 0.0;
                }
            }
        }
        amount
    }

    /// Advance regrowth by `dt` simulated seconds
    pub fn regrow(&mut self, dt: f64) -> Option<RegrowEvent> {
        if dt <= 0.0 {
            return None;
        }
        let stock = self.stock.as_mut()?;
        match self.regrow {
            RegrowRule::Never => None,
            RegrowRule::Interval { every_s, amount } => {
                if *stock >= self.max_stock || every_s <= 0.0 {
                    self.regrow_timer_s = 0.0;
                    return None;
                }
                let was_empty = *stock == 0;
                self.regrow_timer_s += dt;
                while self.regrow_timer_s >= every_s && *stock < self.max_stock {
                    self.regrow_timer_s -= every_s;
                    *stock = (*stock + amount).min(self.max_stock);
                }
                (was_empty && *stock > 0).then_some(RegrowEvent::Restocked)
            }
            RegrowRule::AfterDepletion { duration_s } => {
                if !self.regrowing {
                    return None;
                }
                self.regrow_timer_s += dt;
                if self.regrow_timer_s >= duration_s {
                    *stock = self.max_stock;
                    self.regrowing = false;
                    self.regrow_timer_s = 0.0;
                    return Some(RegrowEvent::Restocked);
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harvest_caps_at_stock() {
        let mut node = ResourceNode::new(ResourceKind::Forage, "fomoberry", 5, 7);
        assert_eq!(node.harvest(), 5);
        assert_eq!(node.peek_yield(), 2);
        assert_eq!(node.harvest(), 2);
        assert!(!node.can_be_harvested());
        assert_eq!(node.harvest(), 0);
    }

    #[test]
    fn test_inexhaustible_node() {
        let mut node = ResourceNode::inexhaustible(ResourceKind::Mine, "alphaslate", 1);
        for _ in 0..100 {
            assert_eq!(node.harvest(), 1);
        }
        assert!(node.can_be_harvested());
    }

    #[test]
    fn test_interval_regrow_caps_at_max() {
        let mut node = ResourceNode::new(ResourceKind::Forage, "fomoberry", 5, 50)
            .with_regrow(RegrowRule::Interval { every_s: 20.0, amount: 10 });
        for _ in 0..10 {
            node.harvest();
        }
        assert_eq!(node.stock, Some(0));

        assert_eq!(node.regrow(19.0), None);
        assert_eq!(node.regrow(1.0), Some(RegrowEvent::Restocked));
        assert_eq!(node.stock, Some(10));

        node.regrow(1000.0);
        assert_eq!(node.stock, Some(50));
    }

    #[test]
    fn test_after_depletion_blocks_until_restocked() {
        let mut node = ResourceNode::new(ResourceKind::Chop, "kekwood", 5, 10)
            .with_regrow(RegrowRule::AfterDepletion { duration_s: 60.0 });
        node.harvest();
        node.harvest();
        assert!(node.is_regrowing());
        assert!(!node.can_be_harvested());

        assert_eq!(node.regrow(59.0), None);
        assert!(!node.can_be_harvested());
        assert_eq!(node.regrow(1.0), Some(RegrowEvent::Restocked));
        assert_eq!(node.peek_yield(), 5);
        assert_eq!(node.stock, Some(10));
    }

    #[test]
    fn test_zero_dt_regrow_is_noop() {
        let mut node = ResourceNode::new(ResourceKind::Forage, "fomoberry", 5, 5)
            .with_regrow(RegrowRule::Interval { every_s: 1.0, amount: 1 });
        node.harvest();
        assert_eq!(node.regrow(0.0), None);
        assert_eq!(node.stock, Some(0));
    }
}

//! Selling goods to a trader (shops)

use tracing::debug;

use crate::actions::action::{Action, ActionContext};
use crate::actions::catalog::ActionKind;
use crate::actions::target::TargetSpec;
use crate::actions::timed::{TimedAction, TimedEffect};
use crate::core::types::EntityId;
use crate::entity::trader::settle;
use crate::entity::Entity;

/// Negotiation time in simulated seconds
pub const SELL_S: f64 = 10.0;

const REJECTED: &str = "Trade rejected: No deal was made.";

#[derive(Debug, Clone, Default)]
pub struct SellEffect;

impl TimedEffect for SellEffect {
    fn kind(&self) -> ActionKind {
        ActionKind::Sell
    }

    fn is_valid_actor(&self, actor: &Entity) -> bool {
        actor.trader.is_some()
            && actor
                .inventory
                .as_ref()
                .map_or(false, |inv| !inv.sellable_items().is_empty())
    }

    fn is_valid_target(&self, target: &Entity) -> bool {
        target.inventory.is_some() && target.trader.is_some()
    }

    fn has_capabilities(&self, actor: &Entity, target: &Entity) -> bool {
        actor.inventory.is_some()
            && actor.trader.is_some()
            && target.inventory.is_some()
            && target.trader.is_some()
    }

    fn duration_s(&self, _actor: &Entity) -> f64 {
        SELL_S
    }

    fn apply(
        &mut self,
        ctx: &mut ActionContext<'_>,
        actor_id: EntityId,
        target_id: EntityId,
    ) -> Option<String> {
        let offer = {
            let seller = ctx.zone.entity(actor_id)?;
            seller.trader.as_ref()?.create_sell_offer(seller.inventory.as_ref()?)
        };
        let Some(offer) = offer else {
            return Some(REJECTED.to_string());
        };

        let counter = {
            let buyer = ctx.zone.entity(target_id)?;
            buyer
                .trader
                .as_ref()?
                .counter_sell_offer(buyer.inventory.as_ref()?, &offer)
        };
        let Some(counter) = counter else {
            debug!(seller = %actor_id, buyer = %target_id, "Sell offer countered with nothing");
            return Some(REJECTED.to_string());
        };

        // Two entities' inventories are needed at once: lift the seller's out
        let mut seller_inventory = ctx.zone.entity_mut(actor_id)?.inventory.take()?;
        let accepted = match ctx
            .zone
            .entity_mut(target_id)
            .and_then(|buyer| buyer.inventory.as_mut())
        {
            Some(buyer_inventory) => settle(&counter, &mut seller_inventory, buyer_inventory),
            None => false,
        };
        if let Some(seller) = ctx.zone.entity_mut(actor_id) {
            seller.inventory = Some(seller_inventory);
        }

        if accepted {
            Some(format!(
                "Trade accepted: Sold {} items for {} gold",
                counter.item_count(),
                counter.gold
            ))
        } else {
            Some(REJECTED.to_string())
        }
    }
}

pub type SellAction = TimedAction<SellEffect>;

pub fn sell_action(
    actor: EntityId,
    target: Option<EntityId>,
    weighting: f64,
    target_spec: Option<TargetSpec>,
) -> Box<dyn Action> {
    Box::new(SellAction::new(SellEffect, actor, target, weighting, target_spec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::types::{SimRng, TilePos, ZoneId};
    use crate::entity::{Inventory, Trader, CURRENCY};
    use crate::world::zone::Zone;
    use rand::SeedableRng;
    use std::time::Duration;

    fn setup(shop_gold: u32) -> (Zone, EntityId, EntityId) {
        let mut zone = Zone::new(ZoneId(0), TilePos::new(0, 0), 16, 16, 4);
        let seller = zone.add_entity(
            Entity::new("gotchi", TilePos::new(2, 2))
                .with_inventory(Inventory::new().with_item("fomoberry", 10))
                .with_trader(Trader::new(1))
                .with_activity_log(3),
        )
        .unwrap();
        let shop = zone.add_entity(
            Entity::new("shop", TilePos::new(8, 8))
                .with_inventory(Inventory::new().with_item(CURRENCY, shop_gold))
                .with_trader(Trader::new(1).buying("fomoberry", 3)),
        )
        .unwrap();
        (zone, seller, shop)
    }

    fn run_to_completion(zone: &mut Zone, seller: EntityId, shop: EntityId) {
        let mut rng = SimRng::seed_from_u64(8);
        let config = SimulationConfig::default();
        let mut ctx = ActionContext {
            zone,
            rng: &mut rng,
            now: Duration::from_secs(42),
            config: &config,
        };
        let mut action = SellAction::new(SellEffect, seller, Some(shop), 1.0, None);
        assert!(action.can_execute(ctx.zone));
        action.start(&mut ctx);
        for _ in 0..9 {
            assert!(!action.update(&mut ctx, 1.0));
        }
        assert!(action.update(&mut ctx, 1.0));
    }

    #[test]
    fn test_sell_transfers_goods_for_gold() {
        let (mut zone, seller, shop) = setup(1000);
        run_to_completion(&mut zone, seller, shop);

        let s = zone.entity(seller).unwrap();
        assert_eq!(s.item_quantity("fomoberry"), 0);
        assert_eq!(s.item_quantity(CURRENCY), 30);
        assert_eq!(zone.entity(shop).unwrap().item_quantity("fomoberry"), 10);
        let entry = s.activity_log.as_ref().unwrap().latest().unwrap();
        assert_eq!(entry.description, "Trade accepted: Sold 10 items for 30 gold");
        assert_eq!(entry.time_s, 42.0);
    }

    #[test]
    fn test_broke_shop_rejects() {
        let (mut zone, seller, shop) = setup(2);
        run_to_completion(&mut zone, seller, shop);

        let s = zone.entity(seller).unwrap();
        assert_eq!(s.item_quantity("fomoberry"), 10);
        assert_eq!(
            s.activity_log.as_ref().unwrap().latest().unwrap().description,
            REJECTED
        );
    }

    #[test]
    fn test_nothing_to_sell_is_invalid_actor() {
        let mut zone = Zone::new(ZoneId(0), TilePos::new(0, 0), 16, 16, 4);
        let broke = zone.add_entity(
            Entity::new("gotchi", TilePos::new(2, 2))
                .with_inventory(Inventory::new().with_item(CURRENCY, 5))
                .with_trader(Trader::new(1)),
        )
        .unwrap();
        let action = SellAction::new(SellEffect, broke, None, 1.0, None);
        assert!(!action.can_execute(&zone));
    }
}

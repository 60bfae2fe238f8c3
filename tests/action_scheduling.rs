//! Weighted selection, validity and zero-dt behavior of action plans

use rand::SeedableRng;
use std::time::Duration;

use realm_sim::actions::gather::gather_action;
use realm_sim::actions::roam::RoamAction;
use realm_sim::actions::{Action, ActionContext, ActionKind, ActionPlan};
use realm_sim::core::config::SimulationConfig;
use realm_sim::core::types::{EntityId, SimRng, TilePos, ZoneId};
use realm_sim::entity::{Entity, Inventory, ResourceKind, ResourceNode, Stat, Stats};
use realm_sim::world::population::populate;
use realm_sim::world::snapshot::EntitySnapshot;
use realm_sim::world::Zone;

fn agent_at(zone: &mut Zone, pos: TilePos) -> EntityId {
    zone.add_entity(
        Entity::new("gotchi", pos)
            .with_stats(
                Stats::new()
                    .with(Stat::Ecto, 500.0)
                    .with(Stat::Spark, 500.0)
                    .with(Stat::Pulse, 1_000_000.0),
            )
            .with_inventory(Inventory::new()),
    )
    .unwrap()
}

/// Run `trials` independent selections and count picks per candidate index
fn selection_counts(zone: &mut Zone, actor: EntityId, trials: usize, seed: u64) -> Vec<usize> {
    let mut plan = zone.entity_mut(actor).unwrap().plan.take().unwrap();
    let mut counts = vec![0; plan.len()];
    let mut rng = SimRng::seed_from_u64(seed);
    let config = SimulationConfig::default();
    let mut ctx = ActionContext {
        zone,
        rng: &mut rng,
        now: Duration::ZERO,
        config: &config,
    };
    for _ in 0..trials {
        let chosen = plan.select_next_action(&mut ctx).unwrap();
        counts[chosen] += 1;
    }
    counts
}

#[test]
fn test_weighted_selection_converges() {
    let mut zone = Zone::new(ZoneId(0), TilePos::new(0, 0), 48, 48, 8);
    let actor = agent_at(&mut zone, TilePos::new(24, 24));
    let weights = [1.0, 2.0, 3.0, 4.0];
    let mut plan = ActionPlan::new();
    for w in weights {
        plan.add_action_to_plan(RoamAction::boxed(actor, w));
    }
    zone.entity_mut(actor).unwrap().plan = Some(plan);

    let trials = 10_000;
    let counts = selection_counts(&mut zone, actor, trials, 1234);
    let total: f64 = weights.iter().sum();
    let chi_squared: f64 = counts
        .iter()
        .zip(weights)
        .map(|(&observed, w)| {
            let expected = trials as f64 * w / total;
            (observed as f64 - expected).powi(2) / expected
        })
        .sum();
    // 3 degrees of freedom, p = 0.001
    assert!(chi_squared < 16.27, "chi^2 = {chi_squared}, counts = {counts:?}");
}

#[test]
fn test_scenario_a_forage_vs_roam() {
    let mut zone = Zone::new(ZoneId(0), TilePos::new(0, 0), 48, 48, 8);
    let actor = agent_at(&mut zone, TilePos::new(20, 20));
    let bush = zone.add_entity(
        Entity::new("fomoberrybush", TilePos::new(24, 24))
            .with_resource(ResourceNode::inexhaustible(ResourceKind::Forage, "fomoberry", 5)),
    )
    .unwrap();
    let plan = ActionPlan::new()
        .with_action(gather_action(ActionKind::Forage, actor, Some(bush), 0.8, None))
        .with_action(RoamAction::boxed(actor, 0.2));
    zone.entity_mut(actor).unwrap().plan = Some(plan);

    let trials = 2_000;
    let counts = selection_counts(&mut zone, actor, trials, 99);
    let forage_share = counts[0] as f64 / trials as f64;
    assert!(
        (0.74..=0.86).contains(&forage_share),
        "forage chosen {} of {trials}",
        counts[0]
    );
}

#[test]
fn test_selected_action_is_always_valid() {
    let config = SimulationConfig::default();
    let mut zone = Zone::new(ZoneId(0), TilePos::new(0, 0), 40, 40, 8);
    let mut rng = SimRng::seed_from_u64(21);
    populate(&mut zone, &config, &mut rng);

    let mut checked = 0;
    for round in 0..40 {
        let agents: Vec<EntityId> = zone
            .entities()
            .filter(|e| e.plan.is_some() && !e.is_dead())
            .map(|e| e.id)
            .collect();
        for id in agents {
            let Some(mut plan) = zone.entity_mut(id).and_then(|e| e.plan.take()) else {
                continue;
            };
            let selected = {
                let mut ctx = ActionContext {
                    zone: &mut zone,
                    rng: &mut rng,
                    now: Duration::from_secs(round),
                    config: &config,
                };
                plan.select_next_action(&mut ctx)
            };
            if selected.is_some() {
                let action = plan.current_action().unwrap();
                let actor = zone.entity(action.actor()).unwrap();
                assert!(action.is_valid_actor(&zone, actor), "{:?}", action.kind());
                match action.target() {
                    Some(target) => {
                        let target = zone.entity(target).unwrap();
                        assert!(action.is_valid_target(&zone, target), "{:?}", action.kind());
                    }
                    None => assert!(!action.requires_target()),
                }
                checked += 1;
            }
            if let Some(entity) = zone.entity_mut(id) {
                entity.plan = Some(plan);
            }
        }
        zone.update(1.0, Duration::from_secs(round), &mut rng, &config);
    }
    assert!(checked > 0);
}

#[test]
fn test_zero_dt_tick_changes_nothing() {
    let config = SimulationConfig::default();
    let mut zone = Zone::new(ZoneId(0), TilePos::new(0, 0), 40, 40, 8);
    let mut rng = SimRng::seed_from_u64(5);
    populate(&mut zone, &config, &mut rng);
    for second in 0..15 {
        zone.update(1.0, Duration::from_secs(second), &mut rng, &config);
    }

    let before: Vec<EntitySnapshot> = zone
        .entities()
        .map(|e| EntitySnapshot::capture(e, &zone))
        .collect();
    for _ in 0..5 {
        zone.update(0.0, Duration::from_secs(15), &mut rng, &config);
    }

    for snapshot in before {
        let entity = zone.entity(snapshot.id).unwrap();
        let after = EntitySnapshot::capture(entity, &zone);
        assert_eq!(after.stats, snapshot.stats);
        assert_eq!(after.items, snapshot.items);
        assert_eq!(after.state, snapshot.state);
        assert_eq!(after.action_plan, snapshot.action_plan);
    }
}

#[test]
fn test_zero_dt_never_completes_actions() {
    let mut zone = Zone::new(ZoneId(0), TilePos::new(0, 0), 16, 16, 4);
    let actor = agent_at(&mut zone, TilePos::new(2, 2));
    let bush = zone.add_entity(
        Entity::new("fomoberrybush", TilePos::new(3, 2))
            .with_resource(ResourceNode::new(ResourceKind::Forage, "fomoberry", 5, 50)),
    )
    .unwrap();
    let mut rng = SimRng::seed_from_u64(0);
    let config = SimulationConfig::default();
    let mut ctx = ActionContext {
        zone: &mut zone,
        rng: &mut rng,
        now: Duration::ZERO,
        config: &config,
    };

    let mut actions: Vec<Box<dyn Action>> = vec![
        gather_action(ActionKind::Forage, actor, Some(bush), 1.0, None),
        RoamAction::boxed(actor, 1.0),
    ];
    for action in actions.iter_mut() {
        for _ in 0..100 {
            assert!(!action.update(&mut ctx, 0.0));
        }
    }
    let actor = ctx.zone.entity(actor).unwrap();
    assert_eq!(actor.item_quantity("fomoberry"), 0);
    assert_eq!(actor.stat(Stat::Spark), 500.0);
}

//! End-to-end scenarios: combat, resource depletion, parallel zones and the
//! action plan report shape

use rand::SeedableRng;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::time::Duration;

use realm_sim::actions::combat::AttackAction;
use realm_sim::actions::gather::gather_action;
use realm_sim::actions::roam::RoamAction;
use realm_sim::actions::{
    Action, ActionContext, ActionCore, ActionKind, ActionPlan, TargetSpec,
};
use realm_sim::core::config::SimulationConfig;
use realm_sim::core::types::{EntityId, SimRng, TilePos, ZoneId};
use realm_sim::entity::{
    Entity, EntityState, Inventory, RegrowRule, ResourceKind, ResourceNode, Stat, Stats,
};
use realm_sim::world::{WorldManager, Zone};

fn fighter(pos: TilePos, pulse: f64) -> Entity {
    Entity::new("gotchi", pos)
        .with_stats(
            Stats::new()
                .with(Stat::Ecto, 1000.0)
                .with(Stat::Spark, 0.0)
                .with(Stat::Pulse, pulse),
        )
        .with_state(EntityState::Active)
        .with_inventory(Inventory::new())
        .with_activity_log(3)
}

#[test]
fn test_scenario_b_attack_until_vanquished() {
    let config = SimulationConfig::default();
    let mut zone = Zone::new(ZoneId(0), TilePos::new(0, 0), 16, 16, 4);
    let mut rng = SimRng::seed_from_u64(7);

    let actor = zone.add_entity(fighter(TilePos::new(4, 4), 1000.0)).unwrap();
    let target = zone.add_entity(fighter(TilePos::new(5, 4), 50.0)).unwrap();
    zone.entity_mut(target).unwrap().kind = "lickquidator".to_string();
    let plan = ActionPlan::new().with_action(AttackAction::boxed(
        actor,
        None,
        1.0,
        Some(TargetSpec::nearest("lickquidator")),
    ));
    zone.entity_mut(actor).unwrap().plan = Some(plan);

    // Tick 1 selects and starts; the next 50 ticks each land one hit
    zone.update(1.0, Duration::from_secs(0), &mut rng, &config);
    assert_eq!(zone.action_plan_report(actor).unwrap().current_action.unwrap().target_id, Some(target));

    for second in 1..50 {
        zone.update(1.0, Duration::from_secs(second), &mut rng, &config);
        let vital = zone.entity(target).unwrap().vital().unwrap();
        assert!((vital - (50.0 - second as f64)).abs() < 1e-9);
        assert!(zone.entity(actor).unwrap().plan.as_ref().unwrap().current_action().is_some());
    }

    zone.update(1.0, Duration::from_secs(50), &mut rng, &config);
    let victim = zone.entity(target).unwrap();
    assert_eq!(victim.vital(), Some(0.0));
    assert_eq!(victim.state, Some(EntityState::Dead));
    let attacker = zone.entity(actor).unwrap();
    assert!(attacker.plan.as_ref().unwrap().is_idle());
    assert_eq!(
        attacker.activity_log.as_ref().unwrap().latest().unwrap().description,
        "Vanquished lickquidator"
    );
}

#[test]
fn test_scenario_c_node_depletes_after_twenty_cycles() {
    let config = SimulationConfig::default();
    let mut zone = Zone::new(ZoneId(0), TilePos::new(0, 0), 16, 16, 4);
    let mut rng = SimRng::seed_from_u64(3);

    // The tree updates before the actor, so the depletion tick adds no regrowth
    let tree = zone.add_entity(
        Entity::new("kekwoodtree", TilePos::new(8, 8))
            .with_state(EntityState::Active)
            .with_resource(
                ResourceNode::new(ResourceKind::Chop, "kekwood", 5, 100)
                    .with_regrow(RegrowRule::AfterDepletion { duration_s: 30.0 }),
            ),
    )
    .unwrap();
    let actor = zone.add_entity(fighter(TilePos::new(2, 2), 1000.0)).unwrap();
    let plan = ActionPlan::new().with_action(gather_action(
        ActionKind::Chop,
        actor,
        None,
        1.0,
        Some(TargetSpec::nearest("kekwoodtree")),
    ));
    zone.entity_mut(actor).unwrap().plan = Some(plan);

    let mut now = 0;
    let mut cycles = 0;
    let mut last = 0;
    while cycles < 20 {
        assert!(now < 1_000, "gathering stalled after {cycles} cycles");
        zone.update(1.0, Duration::from_secs(now), &mut rng, &config);
        now += 1;
        let held = zone.entity(actor).unwrap().item_quantity("kekwood");
        if held != last {
            assert_eq!(held, last + 5);
            cycles += 1;
            last = held;
        }
    }

    let node = zone.entity(tree).unwrap();
    assert_eq!(node.resource.as_ref().unwrap().stock, Some(0));
    assert!(!node.can_be_harvested(ResourceKind::Chop));
    assert_eq!(node.state, Some(EntityState::Regrowing));

    for _ in 0..29 {
        zone.update(1.0, Duration::from_secs(now), &mut rng, &config);
        now += 1;
        assert!(!zone.entity(tree).unwrap().can_be_harvested(ResourceKind::Chop));
    }
    assert_eq!(zone.entity(actor).unwrap().item_quantity("kekwood"), 100);

    zone.update(1.0, Duration::from_secs(now), &mut rng, &config);
    let node = zone.entity(tree).unwrap();
    assert!(node.can_be_harvested(ResourceKind::Chop));
    assert_eq!(node.state, Some(EntityState::Active));
}

/// Records which thread touched which entity at which simulated time
#[derive(Debug)]
struct ProbeAction {
    core: ActionCore,
    log: Arc<Mutex<Vec<(EntityId, Duration, ThreadId)>>>,
}

impl ProbeAction {
    fn record(&self, now: Duration) {
        self.log
            .lock()
            .unwrap()
            .push((self.core.actor, now, thread::current().id()));
    }
}

impl Action for ProbeAction {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActionCore {
        &mut self.core
    }

    fn is_valid_actor(&self, _zone: &Zone, _actor: &Entity) -> bool {
        true
    }

    fn is_valid_target(&self, _zone: &Zone, _candidate: &Entity) -> bool {
        false
    }

    fn start(&mut self, ctx: &mut ActionContext<'_>) {
        self.record(ctx.now);
    }

    fn update(&mut self, ctx: &mut ActionContext<'_>, _dt: f64) -> bool {
        self.record(ctx.now);
        false
    }
}

#[test]
fn test_scenario_d_zones_update_on_one_worker_each() {
    fn assert_send<T: Send>() {}
    assert_send::<Zone>();

    let config = SimulationConfig {
        zone_width: 16,
        zone_height: 16,
        zone_columns: 2,
        zone_rows: 1,
        worker_count: 2,
        ..SimulationConfig::default()
    };
    let mut world = WorldManager::new(config).unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut zone_of: HashMap<EntityId, ZoneId> = HashMap::new();
    for zone in [ZoneId(0), ZoneId(1)] {
        let origin_x = zone.0 as i32 * 16;
        for i in 0..6 {
            let mut entity = Entity::new("probe", TilePos::new(origin_x + 2 * i, 3));
            let probe = ProbeAction {
                core: ActionCore::new(ActionKind::Roam, entity.id, None, 1.0, None),
                log: Arc::clone(&log),
            };
            entity.plan = Some(ActionPlan::new().with_action(Box::new(probe)));
            let id = world.add_entity(entity).unwrap();
            zone_of.insert(id, zone);
        }
    }

    let ticks = 25;
    for _ in 0..ticks {
        let report = world.step(Duration::from_secs(1));
        assert_eq!(report.entity_updates, 12);
    }

    // Every entity is touched exactly once per tick, and all entities of a
    // zone share a single worker within a tick
    let log = log.lock().unwrap();
    let mut per_tick: BTreeMap<Duration, Vec<(EntityId, ThreadId)>> = BTreeMap::new();
    for (id, now, thread) in log.iter() {
        per_tick.entry(*now).or_default().push((*id, *thread));
    }
    assert_eq!(per_tick.len(), ticks);
    for (now, touches) in per_tick {
        assert_eq!(touches.len(), zone_of.len(), "at {now:?}");
        let mut seen = HashMap::new();
        let mut zone_thread: HashMap<ZoneId, ThreadId> = HashMap::new();
        for (id, thread) in touches {
            assert!(seen.insert(id, thread).is_none(), "{id} touched twice at {now:?}");
            let zone = zone_of[&id];
            assert_eq!(*zone_thread.entry(zone).or_insert(thread), thread);
        }
    }

    for zone in world.zones() {
        assert_eq!(zone.diagnostics().ticks, ticks as u64);
        assert!(zone.diagnostics().last_worker.is_some());
        for entity in zone.entities() {
            assert_eq!(entity.updates, ticks as u64);
        }
    }
}

#[test]
fn test_action_plan_report_shape() {
    let mut zone = Zone::new(ZoneId(0), TilePos::new(0, 0), 16, 16, 4);
    let actor = zone.add_entity(fighter(TilePos::new(4, 4), 1000.0)).unwrap();
    let foe = zone.add_entity(fighter(TilePos::new(6, 4), 300.0)).unwrap();
    zone.entity_mut(foe).unwrap().kind = "lickquidator".to_string();
    let plan = ActionPlan::new()
        .with_action(AttackAction::boxed(actor, Some(foe), 1.0, None))
        .with_action(RoamAction::boxed(actor, 0.0));
    zone.entity_mut(actor).unwrap().plan = Some(plan);

    let idle = serde_json::to_value(zone.action_plan_report(actor).unwrap()).unwrap();
    assert!(idle.get("currentAction").is_none());
    assert_eq!(
        idle["actions"][0],
        serde_json::json!({
            "type": "attack",
            "actorType": "gotchi",
            "actorId": actor,
            "targetType": "lickquidator",
            "targetId": foe,
            "weighting": 1.0,
        })
    );
    assert_eq!(
        idle["actions"][1],
        serde_json::json!({
            "type": "roam",
            "actorType": "gotchi",
            "actorId": actor,
            "weighting": 0.0,
        })
    );

    let config = SimulationConfig::default();
    let mut rng = SimRng::seed_from_u64(1);
    zone.update(1.0, Duration::ZERO, &mut rng, &config);
    let busy = serde_json::to_value(zone.action_plan_report(actor).unwrap()).unwrap();
    assert_eq!(busy["currentAction"]["type"], "attack");
    assert_eq!(busy["currentAction"]["targetId"], serde_json::json!(foe));
}

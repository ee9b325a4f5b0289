//! Benchmarks for the dispatch hot path.
//!
//! A server runs `tick_actor` for every online actor every tick and a
//! damage dispatch for every hit, so both need to stay well under a tick.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_synergy::bridge::{EnergyPool, InstalledModules, SimulatedActors};
use rust_synergy::core::{ActorId, EngineConfig, Position};
use rust_synergy::dispatch::{DispatchRequest, SynergyEngine};
use rust_synergy::effects::{
    ComboCounter, Condition, CooldownGate, DamageMultiplier, DamageReduction, Effect, EnergyCost, EventKind,
    Heal, HostEvent, Synergy,
};

const PLAYER: ActorId = ActorId::new(1);

fn engine_with_effects(count: usize) -> SynergyEngine {
    let mut engine = SynergyEngine::new(
        EngineConfig::default(),
        Box::new(EnergyPool::new().with_account(PLAYER, 1_000_000, 1_000_000)),
        Box::new(
            InstalledModules::new()
                .with_module(PLAYER, "kinetic", 2)
                .with_module(PLAYER, "armor", 1),
        ),
        Box::new(SimulatedActors::new().with_actor(PLAYER, Position::default(), 20.0)),
    )
    .unwrap();

    engine.register_effect(Box::new(ComboCounter::new("combo"))).unwrap();
    for i in 0..count {
        let effect: Box<dyn Effect> = match i % 4 {
            0 => Box::new(DamageMultiplier::new(format!("mult_{}", i), 1.01).with_priority(i as i32)),
            1 => Box::new(DamageReduction::new(format!("plate_{}", i), 1.0).with_priority(i as i32)),
            2 => Box::new(CooldownGate::new(
                500,
                Box::new(EnergyCost::new(1, Box::new(Heal::new(format!("heal_{}", i)).flat(1.0)))),
            )),
            _ => Box::new(
                Synergy::new(format!("synergy_{}", i))
                    .requires("kinetic")
                    .requires("armor")
                    .when(Condition::ComboAtLeast(2).and(Condition::AmountAtLeast(1.0)))
                    .with_effect(Box::new(DamageMultiplier::new(format!("synergy_{}.damage", i), 1.05))),
            ),
        };
        engine.register_effect(effect).unwrap();
    }
    engine
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    for count in [4, 16, 64] {
        let mut engine = engine_with_effects(count);
        group.bench_with_input(BenchmarkId::new("outgoing_damage", count), &count, |b, _| {
            b.iter(|| {
                let mut event = HostEvent::new(10.0);
                let request = DispatchRequest::new(EventKind::OutgoingDamage, PLAYER).with_amount(10.0);
                black_box(engine.dispatch(request, &mut event))
            });
        });
    }

    group.finish();
}

fn bench_tick_actor(c: &mut Criterion) {
    let mut engine = engine_with_effects(16);
    let mut tick = 0_u64;

    c.bench_function("tick_actor", |b| {
        b.iter(|| {
            tick += 1;
            engine.set_time(tick, tick * 50);
            black_box(engine.tick_actor(PLAYER))
        });
    });
}

criterion_group!(benches, bench_dispatch, bench_tick_actor);
criterion_main!(benches);

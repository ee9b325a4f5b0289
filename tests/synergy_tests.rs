//! Synergy, condition and built-in effect integration tests.

use std::cell::Cell;
use std::rc::Rc;

use rust_synergy::bridge::{
    ActorHost, EnergyPool, InstalledModule, InstalledModules, ResourceBridge, SimulatedActors,
};
use rust_synergy::core::{ActorId, EngineConfig, Position};
use rust_synergy::dispatch::{DispatchReport, DispatchRequest, SynergyEngine};
use rust_synergy::effects::{
    CancelEvent, Chance, ComboCounter, Condition, DamageMultiplier, DamageReduction, Effect, EffectOutcome,
    EnergyGain, EventHandle, EventKind, FnEffect, Heal, HostEvent, Synergy,
};
use rust_synergy::error::EffectError;

const PLAYER: ActorId = ActorId::new(1);
const TARGET: ActorId = ActorId::new(2);

fn modules(overclock_active: bool) -> InstalledModules {
    let mut modules = InstalledModules::new().with_module(PLAYER, "kinetic", 2);
    let overclock = InstalledModule::new("overclock", 1);
    modules.install(PLAYER, if overclock_active { overclock } else { overclock.inactive() });
    modules
}

fn engine_with_energy(current: u64) -> SynergyEngine {
    SynergyEngine::new(
        EngineConfig::default(),
        Box::new(EnergyPool::new().with_account(PLAYER, current, 1_000)),
        Box::new(modules(true)),
        Box::new(
            SimulatedActors::new()
                .with_actor(PLAYER, Position::default(), 20.0)
                .with_actor(TARGET, Position::new(3.0, 64.0, 0.0), 20.0),
        ),
    )
    .unwrap()
}

fn engine() -> SynergyEngine {
    engine_with_energy(500)
}

fn dispatch(engine: &mut SynergyEngine, request: DispatchRequest) -> (DispatchReport, HostEvent) {
    let mut event = HostEvent::new(request.amount);
    let report = engine.dispatch(request, &mut event);
    (report, event)
}

fn hit(amount: f32) -> DispatchRequest {
    DispatchRequest::new(EventKind::OutgoingDamage, PLAYER).with_amount(amount)
}

/// A synergy that counts how often its inner effect ran.
fn gated_counter(condition: Condition, runs: &Rc<Cell<u32>>) -> Box<dyn Effect> {
    let runs = Rc::clone(runs);
    Box::new(Synergy::new("gated").when(condition).with_effect(Box::new(FnEffect::new(
        "gated.count",
        move |_| {
            runs.set(runs.get() + 1);
            Ok(EffectOutcome::Applied)
        },
    ))))
}

/// Register a counting synergy gated on `condition`, dispatch `request` once, report whether it ran.
fn passes(engine: &mut SynergyEngine, condition: Condition, request: DispatchRequest) -> bool {
    let runs = Rc::new(Cell::new(0));
    engine.unregister_effect("gated");
    engine.register_effect(gated_counter(condition, &runs)).unwrap();
    dispatch(engine, request);
    runs.get() == 1
}

// ============================================================================
// Synergy Gates
// ============================================================================

fn kinetic_overload() -> Synergy {
    Synergy::new("kinetic_overload")
        .named("Kinetic Overload")
        .requires("kinetic")
        .requires("overclock")
        .on(EventKind::OutgoingDamage)
        .with_effect(Box::new(DamageMultiplier::new("kinetic_overload.damage", 1.25)))
}

/// Test a synergy applies only when all required modules are active.
#[test]
fn test_synergy_requires_active_modules() {
    let mut engine = engine();
    engine.world_mut().set_modules(Box::new(modules(false)));
    engine.register_effect(Box::new(kinetic_overload())).unwrap();

    let (report, event) = dispatch(&mut engine, hit(10.0));
    assert_eq!(report.skipped, 1);
    assert_eq!(event.amount(), 10.0);

    engine.world_mut().set_modules(Box::new(modules(true)));
    let (report, event) = dispatch(&mut engine, hit(10.0));
    assert_eq!(report.applied, 1);
    assert_eq!(event.amount(), 12.5);
}

/// Test a synergy ignores event kinds it isn't triggered by.
#[test]
fn test_synergy_trigger_filter() {
    let mut engine = engine();
    engine.register_effect(Box::new(kinetic_overload())).unwrap();

    let (report, event) = dispatch(
        &mut engine,
        DispatchRequest::new(EventKind::IncomingDamage, PLAYER).with_amount(10.0),
    );
    assert_eq!(report.skipped, 1);
    assert_eq!(event.amount(), 10.0);
}

/// Test a disabled synergy never applies.
#[test]
fn test_disabled_synergy() {
    let mut engine = engine();
    engine.register_effect(Box::new(kinetic_overload().disabled())).unwrap();

    let (_, event) = dispatch(&mut engine, hit(10.0));
    assert_eq!(event.amount(), 10.0);
}

/// Test inner effects stop once one of them cancels.
#[test]
fn test_synergy_inner_cancel_stops_chain() {
    let mut engine = engine();
    engine
        .register_effect(Box::new(
            Synergy::new("phase_guard")
                .requires("overclock")
                .with_effect(Box::new(
                    DamageMultiplier::new("phase_guard.amplify", 3.0)
                        .on(&[EventKind::IncomingDamage])
                        .with_priority(20),
                ))
                .with_effect(Box::new(CancelEvent::new("phase_guard.cancel").with_priority(10))),
        ))
        .unwrap();

    let (report, event) = dispatch(
        &mut engine,
        DispatchRequest::new(EventKind::IncomingDamage, PLAYER).with_amount(9.0),
    );
    assert!(event.is_cancelled());
    assert_eq!(event.amount(), 9.0);
    assert_eq!(report.cancelled_by.as_deref(), Some("phase_guard"));
}

/// Test a combo synergy fires from the third hit on.
#[test]
fn test_combo_synergy() {
    let mut engine = engine();
    engine.register_effect(Box::new(ComboCounter::new("combo"))).unwrap();
    engine
        .register_effect(Box::new(
            Synergy::new("flurry")
                .requires("kinetic")
                .on(EventKind::OutgoingDamage)
                .when(Condition::ComboAtLeast(3))
                .with_effect(Box::new(DamageMultiplier::new("flurry.damage", 2.0))),
        ))
        .unwrap();

    let amounts: Vec<f32> = (0..4)
        .map(|i| {
            engine.set_time(i, i * 200);
            dispatch(&mut engine, hit(5.0)).1.amount()
        })
        .collect();
    assert_eq!(amounts, vec![5.0, 5.0, 10.0, 10.0]);
}

// ============================================================================
// Conditions
// ============================================================================

/// Test module conditions.
#[test]
fn test_module_conditions() {
    let mut engine = engine();
    assert!(passes(&mut engine, Condition::ModuleActive("Kinetic".into()), hit(1.0)));
    assert!(passes(&mut engine, Condition::module_level_at_least("kinetic", 2), hit(1.0)));
    assert!(!passes(&mut engine, Condition::module_level_at_least("kinetic", 3), hit(1.0)));
    assert!(!passes(&mut engine, Condition::ModuleActive("magnet".into()), hit(1.0)));

    engine.world_mut().set_modules(Box::new(modules(false)));
    assert!(!passes(&mut engine, Condition::module_level_at_least("overclock", 1), hit(1.0)));
}

/// Test resource and body conditions.
#[test]
fn test_resource_and_health_conditions() {
    let mut engine = engine_with_energy(300);
    assert!(passes(&mut engine, Condition::EnergyBelowPercent(50.0), hit(1.0)));
    assert!(!passes(&mut engine, Condition::EnergyBelowPercent(30.0), hit(1.0)));
    assert!(passes(&mut engine, Condition::EnergyAtLeast(300), hit(1.0)));
    assert!(!passes(&mut engine, Condition::EnergyAtLeast(301), hit(1.0)));

    assert!(!passes(&mut engine, Condition::HealthBelowPercent(50.0), hit(1.0)));
    engine.world_mut().host_mut().set_health(PLAYER, 5.0);
    assert!(passes(&mut engine, Condition::HealthBelowPercent(50.0), hit(1.0)));
}

/// Test event conditions.
#[test]
fn test_event_conditions() {
    let mut engine = engine();
    assert!(passes(&mut engine, Condition::AmountAtLeast(4.0), hit(4.0)));
    assert!(!passes(&mut engine, Condition::AmountAtLeast(4.0), hit(3.5)));
    assert!(!passes(&mut engine, Condition::HasTarget, hit(1.0)));
    assert!(passes(&mut engine, Condition::HasTarget, hit(1.0).with_target(TARGET)));
    assert!(passes(
        &mut engine,
        Condition::CustomFlag("overcharged".into()),
        hit(1.0).with_custom("overcharged", true)
    ));
    assert!(!passes(
        &mut engine,
        Condition::CustomFlag("overcharged".into()),
        hit(1.0).with_custom("overcharged", "yes")
    ));
}

/// Test state conditions.
#[test]
fn test_state_conditions() {
    let mut engine = engine();
    engine.set_time(10, 500);
    {
        let state = engine.actor_state_mut(PLAYER);
        state.timed.activate("frenzy", 5, 10);
        state.cooldowns.set_cooldown("dash", 1_000, 500);
        state.rejection.set(100.0);
    }

    assert!(passes(&mut engine, Condition::state_active("frenzy"), hit(1.0)));
    assert!(passes(&mut engine, Condition::state_inactive("calm"), hit(1.0)));
    assert!(!passes(&mut engine, Condition::not_on_cooldown("dash"), hit(1.0)));
    assert!(passes(&mut engine, Condition::not_on_cooldown("blink"), hit(1.0)));
    assert!(passes(&mut engine, Condition::RejectionCritical, hit(1.0)));
    assert!(!passes(&mut engine, Condition::RejectionBelow(50.0), hit(1.0)));

    engine.set_time(15, 1_500);
    assert!(!passes(&mut engine, Condition::state_active("frenzy"), hit(1.0)));
    assert!(passes(&mut engine, Condition::not_on_cooldown("dash"), hit(1.0)));
}

/// Test combinators.
#[test]
fn test_condition_combinators() {
    let mut engine = engine();
    assert!(passes(&mut engine, Condition::Always.and(Condition::AmountAtLeast(1.0)), hit(2.0)));
    assert!(!passes(&mut engine, Condition::Always.and(Condition::Never), hit(2.0)));
    assert!(passes(&mut engine, Condition::Never.or(Condition::HasTarget.negate()), hit(2.0)));
    assert!(passes(
        &mut engine,
        Condition::any([Condition::Never, Condition::all([Condition::Always, Condition::AmountAtLeast(2.0)])]),
        hit(2.0)
    ));
}

/// Test an unmet precondition is a skip, not a fault.
#[test]
fn test_unmet_condition_is_not_a_fault() {
    let mut engine = engine();
    engine
        .register_effect(Box::new(
            Synergy::new("execute")
                .when(Condition::HasTarget)
                .with_effect(Box::new(DamageMultiplier::new("execute.damage", 3.0))),
        ))
        .unwrap();

    let (report, event) = dispatch(&mut engine, hit(4.0));
    assert!(report.faulted.is_empty());
    assert_eq!(report.skipped, 1);
    assert_eq!(event.amount(), 4.0);
}

// ============================================================================
// Built-in Effects
// ============================================================================

/// Test lifesteal heals by a share of the damage dealt.
#[test]
fn test_lifesteal() {
    let mut engine = engine();
    engine.register_effect(Box::new(Heal::new("lifesteal").percent_of_amount(50.0))).unwrap();
    engine.world_mut().host_mut().set_health(PLAYER, 10.0);

    dispatch(&mut engine, hit(8.0));
    assert_eq!(engine.world().host().health(PLAYER), Some(14.0));

    // At full health nothing is restored
    engine.world_mut().host_mut().set_health(PLAYER, 20.0);
    let (report, _) = dispatch(&mut engine, hit(8.0));
    assert_eq!(report.skipped, 1);
}

/// Test energy gain is clamped by capacity and reports a full store.
#[test]
fn test_energy_gain_on_kill() {
    let mut engine = engine_with_energy(990);
    engine.register_effect(Box::new(EnergyGain::new("harvest", 50))).unwrap();

    let kill = || DispatchRequest::new(EventKind::Kill, PLAYER);
    let (report, _) = dispatch(&mut engine, kill());
    assert_eq!(report.applied, 1);
    assert_eq!(engine.world().resources().current_energy(PLAYER), 1_000);

    let (report, _) = dispatch(&mut engine, kill());
    assert_eq!(report.unavailable, vec![("harvest".to_string(), "energy storage full".to_string())]);
}

/// Test damage reduction and its range check.
#[test]
fn test_damage_reduction() {
    let mut engine = engine();
    engine.register_effect(Box::new(DamageReduction::new("plating", 25.0).with_priority(10))).unwrap();
    engine.register_effect(Box::new(DamageReduction::new("overplated", 150.0).with_priority(20))).unwrap();

    let (report, event) = dispatch(
        &mut engine,
        DispatchRequest::new(EventKind::IncomingDamage, PLAYER).with_amount(8.0),
    );
    assert_eq!(event.amount(), 6.0);
    assert_eq!(report.faulted, vec!["overplated"]);
}

/// Test chance wrappers at the extremes, and invalid probabilities.
#[test]
fn test_chance() {
    let mut engine = engine();
    engine
        .register_effect(Box::new(Chance::new(0.0, Box::new(DamageMultiplier::new("never", 2.0)))))
        .unwrap();
    engine
        .register_effect(Box::new(Chance::new(1.0, Box::new(DamageMultiplier::new("always", 3.0)))))
        .unwrap();
    engine
        .register_effect(Box::new(Chance::new(1.5, Box::new(DamageMultiplier::new("broken", 4.0)))))
        .unwrap();
    engine
        .register_effect(Box::new(Chance::new(f64::NAN, Box::new(DamageMultiplier::new("unset", 5.0)))))
        .unwrap();

    for _ in 0..20 {
        let (report, event) = dispatch(&mut engine, hit(1.0));
        assert_eq!(event.amount(), 3.0);
        // Out-of-range and NaN probabilities fault instead of clamping
        assert_eq!(report.faulted, vec!["broken", "unset"]);
    }
}

/// Test saving the RNG position replays the same chance rolls.
#[test]
fn test_chance_rolls_resume_from_saved_rng() {
    let mut engine = engine();
    engine
        .register_effect(Box::new(Chance::new(0.5, Box::new(DamageMultiplier::new("coin", 2.0)))))
        .unwrap();

    let saved = engine.rng_state();
    let first: Vec<f32> = (0..32).map(|_| dispatch(&mut engine, hit(1.0)).1.amount()).collect();
    assert!(first.contains(&1.0) && first.contains(&2.0));

    engine.restore_rng(&saved);
    let replay: Vec<f32> = (0..32).map(|_| dispatch(&mut engine, hit(1.0)).1.amount()).collect();
    assert_eq!(first, replay);
}

/// Test an effect that reaches for the target's state.
#[test]
fn test_effect_marks_target() {
    let mut engine = engine();
    engine
        .register_effect(Box::new(FnEffect::new("mark", |ctx| {
            let Some(target) = ctx.target() else {
                return Ok(EffectOutcome::Skipped);
            };
            let tick = ctx.tick();
            ctx.state_of(target).timed.activate("marked", 60, tick);
            Ok(EffectOutcome::Applied)
        })))
        .unwrap();

    dispatch(&mut engine, hit(2.0).with_target(TARGET));
    assert!(engine.actor_state_mut(TARGET).timed.is_active("marked", 59));
}

/// Test a host-side fault inside a synergy is isolated like any other.
#[test]
fn test_synergy_fault_isolated() {
    let mut engine = engine();
    engine
        .register_effect(Box::new(
            Synergy::new("unstable")
                .with_priority(10)
                .with_effect(Box::new(FnEffect::new("unstable.boom", |_| {
                    Err(EffectError::MissingCollaborator("reactor".into()))
                }))),
        ))
        .unwrap();
    engine.register_effect(Box::new(DamageMultiplier::new("steady", 2.0).with_priority(20))).unwrap();

    let (report, event) = dispatch(&mut engine, hit(3.0));
    assert_eq!(report.faulted, vec!["unstable"]);
    assert_eq!(event.amount(), 6.0);
}

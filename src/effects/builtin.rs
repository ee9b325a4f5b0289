//! Built-in effect variants.
//!
//! Each variant filters on a set of event kinds and is a no-op on anything
//! else. Wrappers (`CooldownGate`, `EnergyCost`, `Chance`) take the id and
//! priority of the effect they wrap, so the wrapped effect's cooldown and
//! ordering stay the same however it is gated.

use smallvec::{smallvec, SmallVec};
use tracing::warn;

use crate::error::EffectError;

use super::context::EffectContext;
use super::effect::{Effect, EffectOutcome, EffectResult, DEFAULT_PRIORITY};
use super::event::EventKind;

/// Custom data key: energy actually added by `EnergyGain`.
pub const ENERGY_ADDED_KEY: &str = "energy_added";
/// Custom data key: health actually restored by `Heal`.
pub const HEALED_KEY: &str = "healed";
/// Custom data key: combo count after `ComboCounter` ran.
pub const COMBO_KEY: &str = "combo";

/// Id, priority and the event kinds an effect reacts to.
#[derive(Clone, Debug, PartialEq)]
struct Header {
    id: String,
    priority: i32,
    kinds: SmallVec<[EventKind; 2]>,
}

impl Header {
    fn new(id: impl Into<String>, kind: EventKind) -> Self {
        Self {
            id: id.into(),
            priority: DEFAULT_PRIORITY,
            kinds: smallvec![kind],
        }
    }

    fn matches(&self, kind: EventKind) -> bool {
        self.kinds.contains(&kind)
    }

    fn set_kinds(&mut self, kinds: &[EventKind]) {
        self.kinds = kinds.iter().copied().collect();
    }
}

/// Builder methods shared by every header-carrying effect.
macro_rules! header_builders {
    ($ty:ty) => {
        impl $ty {
            /// Override the priority.
            #[must_use]
            pub fn with_priority(mut self, priority: i32) -> Self {
                self.header.priority = priority;
                self
            }

            /// React to these event kinds instead of the default.
            #[must_use]
            pub fn on(mut self, kinds: &[EventKind]) -> Self {
                self.header.set_kinds(kinds);
                self
            }
        }
    };
}

fn check_percent(what: &'static str, value: f32, min: f32, max: f32) -> Result<f32, EffectError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(EffectError::MalformedPercent { what, value })
    }
}

// === Damage ===

/// Multiply the event amount. Defaults to `OutgoingDamage`.
#[derive(Clone, Debug, PartialEq)]
pub struct DamageMultiplier {
    header: Header,
    multiplier: f32,
}

impl DamageMultiplier {
    pub fn new(id: impl Into<String>, multiplier: f32) -> Self {
        Self {
            header: Header::new(id, EventKind::OutgoingDamage),
            multiplier,
        }
    }
}

header_builders!(DamageMultiplier);

impl Effect for DamageMultiplier {
    fn id(&self) -> &str {
        &self.header.id
    }

    fn priority(&self) -> i32 {
        self.header.priority
    }

    fn apply(&self, ctx: &mut EffectContext<'_>) -> EffectResult {
        if !self.header.matches(ctx.kind()) {
            return Ok(EffectOutcome::Skipped);
        }
        if !self.multiplier.is_finite() || self.multiplier < 0.0 {
            return Err(EffectError::InvalidArgument(format!(
                "damage multiplier must be finite and non-negative, got {}",
                self.multiplier
            )));
        }
        ctx.set_amount(ctx.amount() * self.multiplier);
        Ok(EffectOutcome::Applied)
    }

    fn description(&self) -> String {
        format!("x{} damage", self.multiplier)
    }
}

/// Reduce incoming damage by a percentage in `[0, 100]`.
#[derive(Clone, Debug, PartialEq)]
pub struct DamageReduction {
    header: Header,
    percent: f32,
}

impl DamageReduction {
    pub fn new(id: impl Into<String>, percent: f32) -> Self {
        Self {
            header: Header::new(id, EventKind::IncomingDamage),
            percent,
        }
    }
}

header_builders!(DamageReduction);

impl Effect for DamageReduction {
    fn id(&self) -> &str {
        &self.header.id
    }

    fn priority(&self) -> i32 {
        self.header.priority
    }

    fn apply(&self, ctx: &mut EffectContext<'_>) -> EffectResult {
        if !self.header.matches(ctx.kind()) {
            return Ok(EffectOutcome::Skipped);
        }
        let percent = check_percent("damage reduction", self.percent, 0.0, 100.0)?;
        ctx.set_amount(ctx.amount() * (1.0 - percent / 100.0));
        Ok(EffectOutcome::Applied)
    }

    fn description(&self) -> String {
        format!("-{}% incoming damage", self.percent)
    }
}

/// Cancel the event, optionally only while a timed state is active.
#[derive(Clone, Debug, PartialEq)]
pub struct CancelEvent {
    header: Header,
    while_state: Option<String>,
}

impl CancelEvent {
    /// Cancels `IncomingDamage` by default.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            header: Header::new(id, EventKind::IncomingDamage),
            while_state: None,
        }
    }

    /// Only cancel while `state_id` is active (an immunity window).
    #[must_use]
    pub fn while_state(mut self, state_id: impl Into<String>) -> Self {
        self.while_state = Some(state_id.into());
        self
    }
}

header_builders!(CancelEvent);

impl Effect for CancelEvent {
    fn id(&self) -> &str {
        &self.header.id
    }

    fn priority(&self) -> i32 {
        self.header.priority
    }

    fn apply(&self, ctx: &mut EffectContext<'_>) -> EffectResult {
        if !self.header.matches(ctx.kind()) {
            return Ok(EffectOutcome::Skipped);
        }
        if let Some(state_id) = &self.while_state {
            if !ctx.is_state_active(state_id) {
                return Ok(EffectOutcome::Skipped);
            }
        }
        ctx.cancel();
        Ok(EffectOutcome::from_applied(ctx.is_cancelled()))
    }
}

// === Healing and resources ===

/// Heal the actor by a flat amount plus a percentage of the event amount.
///
/// Defaults to `OutgoingDamage`, i.e. lifesteal.
#[derive(Clone, Debug, PartialEq)]
pub struct Heal {
    header: Header,
    flat: f32,
    percent_of_amount: f32,
}

impl Heal {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            header: Header::new(id, EventKind::OutgoingDamage),
            flat: 0.0,
            percent_of_amount: 0.0,
        }
    }

    #[must_use]
    pub fn flat(mut self, amount: f32) -> Self {
        self.flat = amount;
        self
    }

    #[must_use]
    pub fn percent_of_amount(mut self, percent: f32) -> Self {
        self.percent_of_amount = percent;
        self
    }
}

header_builders!(Heal);

impl Effect for Heal {
    fn id(&self) -> &str {
        &self.header.id
    }

    fn priority(&self) -> i32 {
        self.header.priority
    }

    fn apply(&self, ctx: &mut EffectContext<'_>) -> EffectResult {
        if !self.header.matches(ctx.kind()) {
            return Ok(EffectOutcome::Skipped);
        }
        let percent = check_percent("heal ratio", self.percent_of_amount, 0.0, f32::MAX)?;
        let amount = self.flat.max(0.0) + ctx.amount().max(0.0) * percent / 100.0;
        if amount <= 0.0 {
            return Ok(EffectOutcome::Skipped);
        }

        let actor = ctx.actor();
        if ctx.host().health(actor).is_none() {
            return Err(EffectError::MissingCollaborator(format!("no host body for {}", actor)));
        }
        let healed = ctx.host().heal(actor, amount);
        ctx.set_custom(HEALED_KEY, healed);
        Ok(EffectOutcome::from_applied(healed > 0.0))
    }

    fn description(&self) -> String {
        format!("heal {} + {}% of amount", self.flat, self.percent_of_amount)
    }
}

/// Add energy to the actor: flat plus a percentage of the event amount.
///
/// Defaults to `Kill`. Records the actually added amount under
/// [`ENERGY_ADDED_KEY`].
#[derive(Clone, Debug, PartialEq)]
pub struct EnergyGain {
    header: Header,
    flat: u64,
    percent_of_amount: f32,
}

impl EnergyGain {
    pub fn new(id: impl Into<String>, flat: u64) -> Self {
        Self {
            header: Header::new(id, EventKind::Kill),
            flat,
            percent_of_amount: 0.0,
        }
    }

    #[must_use]
    pub fn percent_of_amount(mut self, percent: f32) -> Self {
        self.percent_of_amount = percent;
        self
    }
}

header_builders!(EnergyGain);

impl Effect for EnergyGain {
    fn id(&self) -> &str {
        &self.header.id
    }

    fn priority(&self) -> i32 {
        self.header.priority
    }

    fn apply(&self, ctx: &mut EffectContext<'_>) -> EffectResult {
        if !self.header.matches(ctx.kind()) {
            return Ok(EffectOutcome::Skipped);
        }
        let percent = check_percent("energy conversion", self.percent_of_amount, 0.0, f32::MAX)?;
        let converted = (ctx.amount().max(0.0) * percent / 100.0) as u64;
        let requested = self.flat.saturating_add(converted);
        if requested == 0 {
            return Ok(EffectOutcome::Skipped);
        }

        let actor = ctx.actor();
        let added = ctx.resources().add_energy(actor, requested);
        ctx.set_custom(ENERGY_ADDED_KEY, added);
        if added == 0 {
            return Ok(EffectOutcome::unavailable("energy storage full"));
        }
        Ok(EffectOutcome::Applied)
    }

    fn description(&self) -> String {
        format!("+{} energy + {}% of amount", self.flat, self.percent_of_amount)
    }
}

// === Actor state ===

/// Shift the actor's max-health ledger by a percentage.
#[derive(Clone, Debug, PartialEq)]
pub struct MaxHealthShift {
    header: Header,
    percent: f32,
}

impl MaxHealthShift {
    /// Defaults to `Kill`.
    pub fn new(id: impl Into<String>, percent: f32) -> Self {
        Self {
            header: Header::new(id, EventKind::Kill),
            percent,
        }
    }
}

header_builders!(MaxHealthShift);

impl Effect for MaxHealthShift {
    fn id(&self) -> &str {
        &self.header.id
    }

    fn priority(&self) -> i32 {
        self.header.priority
    }

    fn apply(&self, ctx: &mut EffectContext<'_>) -> EffectResult {
        if !self.header.matches(ctx.kind()) {
            return Ok(EffectOutcome::Skipped);
        }
        ctx.add_max_health_percent(self.percent)?;
        Ok(EffectOutcome::Applied)
    }

    fn description(&self) -> String {
        format!("{:+}% max health", self.percent)
    }
}

/// Change the actor's rejection.
#[derive(Clone, Debug, PartialEq)]
pub struct RejectionShift {
    header: Header,
    amount: f32,
}

impl RejectionShift {
    /// Defaults to `Tick`.
    pub fn new(id: impl Into<String>, amount: f32) -> Self {
        Self {
            header: Header::new(id, EventKind::Tick),
            amount,
        }
    }
}

header_builders!(RejectionShift);

impl Effect for RejectionShift {
    fn id(&self) -> &str {
        &self.header.id
    }

    fn priority(&self) -> i32 {
        self.header.priority
    }

    fn apply(&self, ctx: &mut EffectContext<'_>) -> EffectResult {
        if !self.header.matches(ctx.kind()) {
            return Ok(EffectOutcome::Skipped);
        }
        if !self.amount.is_finite() {
            return Err(EffectError::InvalidArgument(format!("rejection change {}", self.amount)));
        }
        ctx.state().rejection.add(self.amount);
        Ok(EffectOutcome::Applied)
    }
}

/// Start a timed state, optionally shifting max health while it lasts and
/// chaining a follow-up state when it expires.
///
/// Re-triggering while active restarts the timer without shifting max
/// health a second time.
#[derive(Clone, Debug, PartialEq)]
pub struct TimedBuff {
    header: Header,
    state_id: String,
    duration_ticks: u64,
    max_health_percent: Option<f32>,
    follow_up: Option<(String, u64)>,
}

impl TimedBuff {
    /// Defaults to `Kill`.
    pub fn new(id: impl Into<String>, state_id: impl Into<String>, duration_ticks: u64) -> Self {
        Self {
            header: Header::new(id, EventKind::Kill),
            state_id: state_id.into(),
            duration_ticks,
            max_health_percent: None,
            follow_up: None,
        }
    }

    /// Shift max health by `percent` for the duration.
    #[must_use]
    pub fn with_max_health_percent(mut self, percent: f32) -> Self {
        self.max_health_percent = Some(percent);
        self
    }

    /// When the buff expires, activate `state_id` for `duration_ticks`.
    #[must_use]
    pub fn then(mut self, state_id: impl Into<String>, duration_ticks: u64) -> Self {
        self.follow_up = Some((state_id.into(), duration_ticks));
        self
    }
}

header_builders!(TimedBuff);

impl Effect for TimedBuff {
    fn id(&self) -> &str {
        &self.header.id
    }

    fn priority(&self) -> i32 {
        self.header.priority
    }

    fn apply(&self, ctx: &mut EffectContext<'_>) -> EffectResult {
        if !self.header.matches(ctx.kind()) {
            return Ok(EffectOutcome::Skipped);
        }

        let already_active = ctx.is_state_active(&self.state_id);
        if let Some(percent) = self.max_health_percent {
            if !already_active {
                ctx.add_max_health_percent(percent)?;
            }
        }

        let revert = self.max_health_percent;
        let follow_up = self.follow_up.clone();
        let state_id = self.state_id.clone();
        let tick = ctx.tick();
        ctx.state()
            .timed
            .activate_with(&self.state_id, self.duration_ticks, tick, move |scope| {
                if let Some(percent) = revert {
                    if let Err(err) = scope.state.max_health.add_percent(-percent, scope.actor, scope.host) {
                        warn!(actor = %scope.actor, state_id = %state_id, error = %err, "could not revert max health");
                    }
                }
                if let Some((next, duration)) = follow_up {
                    scope.state.timed.activate(&next, duration, scope.tick);
                }
            });
        Ok(EffectOutcome::Applied)
    }

    fn description(&self) -> String {
        format!("{} for {} ticks", self.state_id, self.duration_ticks)
    }
}

/// What `Rewind` does when history doesn't reach back far enough.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RewindFallback {
    /// Do nothing.
    #[default]
    Skip,
    /// Use the oldest retained entry.
    Oldest,
}

/// Teleport the actor back to where it was `ticks_ago` ticks ago and
/// restore the health it had then.
#[derive(Clone, Debug, PartialEq)]
pub struct Rewind {
    header: Header,
    ticks_ago: u64,
    fallback: RewindFallback,
    lethal_only: bool,
}

impl Rewind {
    /// Defaults to `IncomingDamage`.
    pub fn new(id: impl Into<String>, ticks_ago: u64) -> Self {
        Self {
            header: Header::new(id, EventKind::IncomingDamage),
            ticks_ago,
            fallback: RewindFallback::Skip,
            lethal_only: false,
        }
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: RewindFallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Only trigger on a hit that would kill, and cancel that hit.
    #[must_use]
    pub fn lethal_only(mut self) -> Self {
        self.lethal_only = true;
        self
    }
}

header_builders!(Rewind);

impl Effect for Rewind {
    fn id(&self) -> &str {
        &self.header.id
    }

    fn priority(&self) -> i32 {
        self.header.priority
    }

    fn apply(&self, ctx: &mut EffectContext<'_>) -> EffectResult {
        if !self.header.matches(ctx.kind()) {
            return Ok(EffectOutcome::Skipped);
        }

        let actor = ctx.actor();
        let Some(health) = ctx.host().health(actor) else {
            return Err(EffectError::MissingCollaborator(format!("no host body for {}", actor)));
        };
        if self.lethal_only && ctx.amount() < health {
            return Ok(EffectOutcome::Skipped);
        }

        let snapshot = match ctx.history_snapshot(self.ticks_ago) {
            Some(snapshot) => snapshot,
            None if self.fallback == RewindFallback::Oldest => match ctx.state().history.oldest() {
                Some(oldest) => *oldest,
                None => return Ok(EffectOutcome::Skipped),
            },
            None => return Ok(EffectOutcome::Skipped),
        };

        let host = ctx.host();
        host.teleport(actor, snapshot.position);
        host.set_health(actor, snapshot.health.max(1.0));
        if self.lethal_only {
            ctx.cancel();
        }
        Ok(EffectOutcome::Applied)
    }

    fn description(&self) -> String {
        format!("rewind {} ticks", self.ticks_ago)
    }
}

/// Count hits toward a combo. Defaults to `OutgoingDamage` at priority 0.
#[derive(Clone, Debug, PartialEq)]
pub struct ComboCounter {
    header: Header,
}

impl ComboCounter {
    pub fn new(id: impl Into<String>) -> Self {
        let mut header = Header::new(id, EventKind::OutgoingDamage);
        header.priority = 0;
        Self { header }
    }
}

header_builders!(ComboCounter);

impl Effect for ComboCounter {
    fn id(&self) -> &str {
        &self.header.id
    }

    fn priority(&self) -> i32 {
        self.header.priority
    }

    fn apply(&self, ctx: &mut EffectContext<'_>) -> EffectResult {
        if !self.header.matches(ctx.kind()) {
            return Ok(EffectOutcome::Skipped);
        }
        let now = ctx.now_ms();
        let count = ctx.state().register_hit(now);
        ctx.set_custom(COMBO_KEY, i64::from(count));
        Ok(EffectOutcome::Applied)
    }
}

// === Wrappers ===

/// Skip the wrapped effect while its cooldown runs; start the cooldown
/// whenever it applies.
pub struct CooldownGate {
    inner: Box<dyn Effect>,
    cooldown_ms: u64,
}

impl CooldownGate {
    pub fn new(cooldown_ms: u64, inner: Box<dyn Effect>) -> Self {
        Self { inner, cooldown_ms }
    }
}

impl Effect for CooldownGate {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn priority(&self) -> i32 {
        self.inner.priority()
    }

    fn apply(&self, ctx: &mut EffectContext<'_>) -> EffectResult {
        let id = self.inner.id();
        if ctx.is_on_cooldown(id) {
            return Ok(EffectOutcome::Skipped);
        }
        let outcome = self.inner.apply(ctx)?;
        if outcome.is_applied() {
            ctx.set_cooldown(id, self.cooldown_ms);
        }
        Ok(outcome)
    }

    fn description(&self) -> String {
        format!("{} ({} ms cooldown)", self.inner.description(), self.cooldown_ms)
    }
}

/// Pay energy before running the wrapped effect.
///
/// If payment fails the wrapped effect does not run and nothing else is
/// touched. If the wrapped effect does not apply, the payment is refunded.
pub struct EnergyCost {
    inner: Box<dyn Effect>,
    cost: u64,
}

impl EnergyCost {
    pub fn new(cost: u64, inner: Box<dyn Effect>) -> Self {
        Self { inner, cost }
    }
}

impl Effect for EnergyCost {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn priority(&self) -> i32 {
        self.inner.priority()
    }

    fn apply(&self, ctx: &mut EffectContext<'_>) -> EffectResult {
        let actor = ctx.actor();
        if !ctx.resources().consume_energy(actor, self.cost) {
            return Ok(EffectOutcome::unavailable(format!("needs {} energy", self.cost)));
        }
        let outcome = self.inner.apply(ctx);
        if !matches!(outcome, Ok(EffectOutcome::Applied)) {
            ctx.resources().add_energy(actor, self.cost);
        }
        outcome
    }

    fn description(&self) -> String {
        format!("{} ({} energy)", self.inner.description(), self.cost)
    }
}

/// Run the wrapped effect with a probability in `[0, 1]`.
///
/// Any other value, NaN included, is an `InvalidArgument` fault.
pub struct Chance {
    inner: Box<dyn Effect>,
    probability: f64,
}

impl Chance {
    pub fn new(probability: f64, inner: Box<dyn Effect>) -> Self {
        Self { inner, probability }
    }
}

impl Effect for Chance {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn priority(&self) -> i32 {
        self.inner.priority()
    }

    fn apply(&self, ctx: &mut EffectContext<'_>) -> EffectResult {
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(EffectError::InvalidArgument(format!(
                "probability must be in [0, 1], got {}",
                self.probability
            )));
        }
        if !ctx.rng().roll(self.probability) {
            return Ok(EffectOutcome::Skipped);
        }
        self.inner.apply(ctx)
    }

    fn description(&self) -> String {
        format!("{:.0}%: {}", self.probability * 100.0, self.inner.description())
    }
}

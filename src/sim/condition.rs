//! Timed status effects (buffs and debuffs)
//!
//! A [`ConditionTemplate`] is an immutable recipe stored in the skill table.
//! Landing it on a combatant builds a fresh [`Condition`] stamped with the
//! current time; the combatant's [`ConditionSet`] is the sole owner of every
//! live instance. Each kind keeps its own payload in [`Effect`], so expiry
//! and side effects dispatch on the enum rather than on a type hierarchy.

use serde::{Deserialize, Serialize};

use crate::format_tenths;

/// The eleven condition kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConditionKind {
    Stun,
    Slow,
    Snare,
    Dot,
    Silence,
    /// Reduces HP regen
    Wounded,
    /// Reduces energy regen
    Weakened,
    Speed,
    Shield,
    /// Increases HP regen
    Invigorated,
    /// Increases energy regen
    Empowered,
}

impl ConditionKind {
    pub const COUNT: usize = 11;

    pub const ALL: [ConditionKind; Self::COUNT] = [
        ConditionKind::Stun,
        ConditionKind::Slow,
        ConditionKind::Snare,
        ConditionKind::Dot,
        ConditionKind::Silence,
        ConditionKind::Wounded,
        ConditionKind::Weakened,
        ConditionKind::Speed,
        ConditionKind::Shield,
        ConditionKind::Invigorated,
        ConditionKind::Empowered,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ConditionKind::Stun => "STUN",
            ConditionKind::Slow => "SLOW",
            ConditionKind::Snare => "SNARE",
            ConditionKind::Dot => "DOT",
            ConditionKind::Silence => "SILENCE",
            ConditionKind::Wounded => "WOUNDED",
            ConditionKind::Weakened => "WEAKENED",
            ConditionKind::Speed => "SPEED",
            ConditionKind::Shield => "SHIELD",
            ConditionKind::Invigorated => "INVIGORATED",
            ConditionKind::Empowered => "EMPOWERED",
        }
    }
}

/// Countdown text for a condition ("SLOW: 2.0")
pub fn condition_text(kind: ConditionKind, ms: u64) -> String {
    format!("{}: {}", kind.name(), format_tenths(ms))
}

/// Kind-specific payload of a condition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    Stun,
    /// Fractional slow (0..1)
    Slow { magnitude: f32 },
    Snare,
    /// Flat damage every `frequency_ms`, `ticks` times
    Dot {
        magnitude: i32,
        ticks: u32,
        frequency_ms: u64,
    },
    Silence,
    Wounded,
    Weakened,
    /// Fractional speed-up (0..1)
    Speed { magnitude: f32 },
    /// Remaining absorption pool
    Shield { magnitude: i32 },
    Invigorated,
    Empowered,
}

impl Effect {
    pub fn kind(&self) -> ConditionKind {
        match self {
            Effect::Stun => ConditionKind::Stun,
            Effect::Slow { .. } => ConditionKind::Slow,
            Effect::Snare => ConditionKind::Snare,
            Effect::Dot { .. } => ConditionKind::Dot,
            Effect::Silence => ConditionKind::Silence,
            Effect::Wounded => ConditionKind::Wounded,
            Effect::Weakened => ConditionKind::Weakened,
            Effect::Speed { .. } => ConditionKind::Speed,
            Effect::Shield { .. } => ConditionKind::Shield,
            Effect::Invigorated => ConditionKind::Invigorated,
            Effect::Empowered => ConditionKind::Empowered,
        }
    }
}

/// Immutable recipe for a condition, stored in skill definitions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditionTemplate {
    pub effect: Effect,
    pub duration_ms: u64,
}

impl ConditionTemplate {
    pub const fn stun(duration_ms: u64) -> Self {
        Self {
            effect: Effect::Stun,
            duration_ms,
        }
    }

    pub const fn slow(duration_ms: u64, magnitude: f32) -> Self {
        Self {
            effect: Effect::Slow { magnitude },
            duration_ms,
        }
    }

    pub const fn snare(duration_ms: u64) -> Self {
        Self {
            effect: Effect::Snare,
            duration_ms,
        }
    }

    /// Damage over time; total duration is `ticks * frequency_ms`
    pub const fn dot(magnitude: i32, ticks: u32, frequency_ms: u64) -> Self {
        Self {
            effect: Effect::Dot {
                magnitude,
                ticks,
                frequency_ms,
            },
            duration_ms: ticks as u64 * frequency_ms,
        }
    }

    pub const fn silence(duration_ms: u64) -> Self {
        Self {
            effect: Effect::Silence,
            duration_ms,
        }
    }

    pub const fn wounded(duration_ms: u64) -> Self {
        Self {
            effect: Effect::Wounded,
            duration_ms,
        }
    }

    pub const fn weakened(duration_ms: u64) -> Self {
        Self {
            effect: Effect::Weakened,
            duration_ms,
        }
    }

    pub const fn speed(duration_ms: u64, magnitude: f32) -> Self {
        Self {
            effect: Effect::Speed { magnitude },
            duration_ms,
        }
    }

    pub const fn shield(duration_ms: u64, magnitude: i32) -> Self {
        Self {
            effect: Effect::Shield { magnitude },
            duration_ms,
        }
    }

    pub const fn invigorated(duration_ms: u64) -> Self {
        Self {
            effect: Effect::Invigorated,
            duration_ms,
        }
    }

    pub const fn empowered(duration_ms: u64) -> Self {
        Self {
            effect: Effect::Empowered,
            duration_ms,
        }
    }

    pub fn kind(&self) -> ConditionKind {
        self.effect.kind()
    }

    /// Build a live instance starting at `now_ms`
    pub fn instantiate(&self, now_ms: u64) -> Condition {
        Condition {
            effect: self.effect,
            start_ms: now_ms,
            duration_ms: self.duration_ms,
            last_tick_ms: now_ms,
            announced: !matches!(self.effect, Effect::Shield { .. }),
            expired: false,
        }
    }

    /// Text shown when the condition lands (Shield defers its own)
    pub fn announcement(&self) -> Option<String> {
        match self.effect {
            Effect::Shield { .. } => None,
            Effect::Dot {
                ticks,
                frequency_ms,
                ..
            } => Some(condition_text(ConditionKind::Dot, ticks as u64 * frequency_ms)),
            _ => Some(condition_text(self.kind(), self.duration_ms)),
        }
    }
}

/// Side effects produced by advancing one condition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionTick {
    /// Damage to route through the target's damage routine
    pub damage: i32,
    /// Late announcement (Shield's first check)
    pub announcement: Option<String>,
    /// False once the condition should be dropped
    pub active: bool,
}

/// A live condition owned by a combatant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    effect: Effect,
    start_ms: u64,
    duration_ms: u64,
    /// Dot cadence anchor
    last_tick_ms: u64,
    /// Shield announces on its first expiry check
    announced: bool,
    expired: bool,
}

impl Condition {
    pub fn kind(&self) -> ConditionKind {
        self.effect.kind()
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Time left before the nominal duration elapses
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.duration_ms
            .saturating_sub(now_ms.saturating_sub(self.start_ms))
    }

    /// Slow/Speed modifier; zero for other kinds
    pub fn magnitude(&self) -> f32 {
        match self.effect {
            Effect::Slow { magnitude } | Effect::Speed { magnitude } => magnitude,
            _ => 0.0,
        }
    }

    /// Remaining absorption pool for shields
    pub fn shield_pool(&self) -> Option<i32> {
        match self.effect {
            Effect::Shield { magnitude } => Some(magnitude),
            _ => None,
        }
    }

    /// Cancel the condition; it is dropped on the next advance
    pub fn expire(&mut self) {
        self.expired = true;
    }

    /// Run the expiry check and any kind-specific side effect.
    ///
    /// Once a condition reports inactive it stays inactive and produces
    /// no further side effects.
    pub fn advance(&mut self, now_ms: u64) -> ConditionTick {
        if self.expired {
            return ConditionTick::default();
        }

        let mut tick = ConditionTick::default();
        match &mut self.effect {
            Effect::Dot {
                magnitude,
                ticks,
                frequency_ms,
            } => {
                // The tick countdown decides expiry, not the nominal duration
                if *ticks > 0 && now_ms.saturating_sub(self.last_tick_ms) >= *frequency_ms {
                    self.last_tick_ms += *frequency_ms;
                    tick.damage = *magnitude;
                    *ticks -= 1;
                }
                self.expired = *ticks == 0;
            }
            Effect::Shield { magnitude } => {
                if !self.announced {
                    self.announced = true;
                    tick.announcement = Some(condition_text(ConditionKind::Shield, self.duration_ms));
                }
                let drained = *magnitude <= 0;
                self.expired = drained || now_ms.saturating_sub(self.start_ms) >= self.duration_ms;
            }
            _ => {
                self.expired = now_ms.saturating_sub(self.start_ms) >= self.duration_ms;
            }
        }
        tick.active = !self.expired;
        tick
    }

    /// Absorb incoming damage into a shield pool, returning what gets through.
    ///
    /// Non-shield conditions, drained shields and expired shields pass the
    /// damage through unchanged.
    pub fn exchange(&mut self, damage: i32) -> i32 {
        if self.expired {
            return damage;
        }
        match &mut self.effect {
            Effect::Shield { magnitude } if *magnitude > 0 => {
                if *magnitude > damage {
                    *magnitude -= damage;
                    0
                } else {
                    let through = damage - *magnitude;
                    *magnitude = 0;
                    through
                }
            }
            _ => damage,
        }
    }
}

/// Everything a combatant's conditions produced during one advance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionReport {
    /// Dot damage, one entry per tick that fired
    pub damage: Vec<i32>,
    pub announcements: Vec<String>,
    /// Kinds that had at least one instance removed
    pub expired: Vec<ConditionKind>,
}

/// Per-kind lists of live conditions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionSet {
    lists: [Vec<Condition>; ConditionKind::COUNT],
}

impl ConditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, condition: Condition) {
        self.lists[condition.kind().index()].push(condition);
    }

    pub fn has(&self, kind: ConditionKind) -> bool {
        !self.lists[kind.index()].is_empty()
    }

    pub fn of(&self, kind: ConditionKind) -> &[Condition] {
        &self.lists[kind.index()]
    }

    pub fn of_mut(&mut self, kind: ConditionKind) -> &mut Vec<Condition> {
        &mut self.lists[kind.index()]
    }

    pub fn len(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(Vec::is_empty)
    }

    pub fn clear(&mut self) {
        for list in &mut self.lists {
            list.clear();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.lists.iter().flatten()
    }

    /// Largest magnitude among live instances of `kind`
    pub fn strongest(&self, kind: ConditionKind) -> f32 {
        self.of(kind)
            .iter()
            .map(Condition::magnitude)
            .fold(0.0, f32::max)
    }

    /// Combined movement multiplier from the strongest Speed and Slow.
    ///
    /// Clamped at zero so a heavy slow halts movement rather than reversing it.
    pub fn movement_multiplier(&self) -> f32 {
        let speed = self.strongest(ConditionKind::Speed);
        let slow = self.strongest(ConditionKind::Slow);
        (1.0 + speed - slow).max(0.0)
    }

    /// Drain shields soonest-expiring first; returns damage left over
    pub fn absorb(&mut self, damage: i32, now_ms: u64) -> i32 {
        let shields = &mut self.lists[ConditionKind::Shield.index()];
        if damage <= 0 || shields.is_empty() {
            return damage;
        }

        let mut order: Vec<usize> = (0..shields.len()).collect();
        order.sort_by_key(|&i| shields[i].remaining_ms(now_ms));

        let mut damage = damage;
        for i in order {
            damage = shields[i].exchange(damage);
            if damage == 0 {
                break;
            }
        }
        damage
    }

    /// Advance every condition and drop the ones that expired
    pub fn advance(&mut self, now_ms: u64) -> ConditionReport {
        let mut report = ConditionReport::default();
        for (kind, list) in ConditionKind::ALL.iter().zip(self.lists.iter_mut()) {
            let before = list.len();
            list.retain_mut(|condition| {
                let tick = condition.advance(now_ms);
                if tick.damage != 0 {
                    report.damage.push(tick.damage);
                }
                if let Some(text) = tick.announcement {
                    report.announcements.push(text);
                }
                tick.active
            });
            if list.len() < before {
                report.expired.push(*kind);
            }
        }
        report
    }
}

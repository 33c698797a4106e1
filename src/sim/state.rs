//! World state and core simulation types
//!
//! The [`World`] is the single writer for everything a match mutates:
//! arena, players, monsters, live particles, the timed-event scheduler and
//! the seeded RNG. Same seed + same inputs = same match.

use std::fmt;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ai::{Monster, MonsterInfo};
use super::arena::{Arena, ArenaLayout};
use super::combatant::{Combatant, CombatantRef, ScrollingText};
use super::particle::Particle;
use super::skills::{SkillId, SkillTable};
use crate::tuning::Tuning;

/// What a scheduled event does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimedEventKind {
    /// The combatant may trigger skills again
    CooldownExpired,
    /// Meditation lock ends
    LockExpired,
}

/// "Fire at time T" request emitted by the core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub fire_at_ms: u64,
    pub target: CombatantRef,
    pub kind: TimedEventKind,
}

/// Pending timed events, kept ordered by fire time (FIFO among equals)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    pending: Vec<TimedEvent>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, event: TimedEvent) {
        let at = self
            .pending
            .partition_point(|e| e.fire_at_ms <= event.fire_at_ms);
        self.pending.insert(at, event);
    }

    /// Remove and return every event due at or before `now_ms`
    pub fn take_due(&mut self, now_ms: u64) -> Vec<TimedEvent> {
        let due = self.pending.partition_point(|e| e.fire_at_ms <= now_ms);
        self.pending.drain(..due).collect()
    }

    pub fn next_fire_ms(&self) -> Option<u64> {
        self.pending.first().map(|e| e.fire_at_ms)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Monotonic game clock at quarter-second resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClock {
    /// Whole clock steps since match start
    pub steps: u64,
    pub step_ms: u64,
}

impl GameClock {
    pub fn new(step_ms: u64) -> Self {
        Self { steps: 0, step_ms }
    }

    /// Catch up with the simulation time; never runs backwards
    pub fn sync(&mut self, now_ms: u64) {
        self.steps = self.steps.max(now_ms / self.step_ms.max(1));
    }

    pub fn as_ms(&self) -> u64 {
        self.steps * self.step_ms
    }

    pub fn as_seconds(&self) -> u64 {
        self.as_ms() / 1000
    }
}

impl fmt::Display for GameClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.as_seconds();
        write!(f, "{}:{:02}", secs / 60, secs % 60)
    }
}

/// Notable things that happened during the last tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    SkillCast { by: CombatantRef, skill: SkillId },
    Hit { by: CombatantRef, target: CombatantRef, skill: SkillId },
    TerrainDestroyed { id: u32 },
    SkillPickedUp { player: usize, skill: SkillId },
    MonsterSpawned { uid: u32 },
    MonsterDied { uid: u32 },
    PlayerDied { player: usize },
}

/// Complete match state
#[derive(Debug, Clone)]
pub struct World {
    /// Match seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    /// Simulation time
    pub now_ms: u64,
    pub ticks: u64,
    pub clock: GameClock,
    pub arena: Arena,
    pub players: [Combatant; 2],
    /// Live monsters, in spawn order
    pub monsters: Vec<Monster>,
    pub particles: Vec<Particle>,
    pub scheduler: Scheduler,
    pub skills: SkillTable,
    pub tuning: Tuning,
    /// Events from the most recent tick
    pub events: Vec<WorldEvent>,
    pub(crate) next_regen_ms: u64,
    pub(crate) next_monster_spawn_ms: u64,
    next_id: u32,
}

impl World {
    pub fn new(seed: u64, arena: Arena, tuning: Tuning) -> Self {
        let players = [
            Combatant::player(1, arena.p1_spawn, &tuning),
            Combatant::player(2, arena.p2_spawn, &tuning),
        ];
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            now_ms: 0,
            ticks: 0,
            clock: GameClock::new(tuning.game_clock_ms),
            arena,
            players,
            monsters: Vec::new(),
            particles: Vec::new(),
            scheduler: Scheduler::new(),
            skills: SkillTable::standard(),
            next_regen_ms: tuning.regen.interval_ms,
            next_monster_spawn_ms: tuning.monster_spawn_interval_ms,
            tuning,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Default arena and tuning
    pub fn with_seed(seed: u64) -> Self {
        Self::new(seed, Arena::from_layout(&ArenaLayout::default()), Tuning::default())
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn monster(&self, uid: u32) -> Option<&Monster> {
        self.monsters.iter().find(|m| m.uid == uid)
    }

    pub fn combatant(&self, who: CombatantRef) -> Option<&Combatant> {
        match who {
            CombatantRef::Player(i) => self.players.get(i),
            CombatantRef::Monster(uid) => self.monster(uid).map(|m| &m.body),
        }
    }

    pub fn combatant_mut(&mut self, who: CombatantRef) -> Option<&mut Combatant> {
        match who {
            CombatantRef::Player(i) => self.players.get_mut(i),
            CombatantRef::Monster(uid) => self
                .monsters
                .iter_mut()
                .find(|m| m.uid == uid)
                .map(|m| &mut m.body),
        }
    }

    /// Spawn a monster with its top-left at `topleft`
    pub fn spawn_monster_at(&mut self, info: MonsterInfo, topleft: Vec2) -> u32 {
        let uid = self.next_entity_id();
        let monster = Monster::new(uid, info, topleft, &self.tuning, self.clock.as_ms());
        log::debug!("Spawned {:?} monster {} at {:?}", info.kind, uid, topleft);
        self.monsters.push(monster);
        self.events.push(WorldEvent::MonsterSpawned { uid });
        uid
    }

    /// Spawn a random preset from the arena's roster at a random spawn anchor
    pub fn spawn_random_monster(&mut self) -> Option<u32> {
        let roster: Vec<MonsterInfo> = self
            .tuning
            .monsters
            .iter()
            .filter(|info| self.arena.allows_monster(info.kind))
            .copied()
            .collect();
        if roster.is_empty() {
            log::warn!("Arena allows no configured monster preset");
            return None;
        }
        let info = roster[self.rng.random_range(0..roster.len())];
        let anchor = self.arena.random_spawn_point(&mut self.rng);
        // Anchor marks the monster's bottom center
        let topleft = anchor - Vec2::new(info.width / 2.0, info.height);
        Some(self.spawn_monster_at(info, topleft))
    }

    /// Automatic spawning on the configured interval, up to the arena's cap
    pub(crate) fn spawn_monsters_if_due(&mut self) {
        let interval = self.tuning.monster_spawn_interval_ms;
        if interval == 0 || self.now_ms < self.next_monster_spawn_ms {
            return;
        }
        self.next_monster_spawn_ms += interval;
        if self.monsters.len() < self.arena.max_monsters {
            self.spawn_random_monster();
        }
    }

    /// Deliver every scheduled event that is due
    pub(crate) fn fire_due_events(&mut self) {
        for event in self.scheduler.take_due(self.now_ms) {
            // Monsters removed since scheduling just drop their events
            let Some(target) = self.combatant_mut(event.target) else {
                continue;
            };
            match event.kind {
                TimedEventKind::CooldownExpired => target.attack_cooldown_expired = true,
                TimedEventKind::LockExpired => target.locked = false,
            }
        }
    }

    /// Periodic regen for living players, capped at max
    pub(crate) fn regenerate(&mut self) {
        let interval = self.tuning.regen.interval_ms;
        if self.now_ms < self.next_regen_ms {
            return;
        }
        self.next_regen_ms += interval;

        let regen = self.tuning.regen;
        let now = self.now_ms;
        for p in self.players.iter_mut().filter(|p| !p.is_dead()) {
            let hp = regen
                .hit_points_for(p)
                .min(p.hit_points_max - p.hit_points)
                .max(0);
            p.heal(hp, now);
            let energy = regen.energy_for(p).min(p.energy_max - p.energy).max(0);
            p.gain_energy(energy, now);
        }
    }

    /// Take every combatant's pending feedback text, players first
    pub fn drain_scrolling_text(&mut self) -> Vec<(CombatantRef, ScrollingText)> {
        let players = self
            .players
            .iter_mut()
            .enumerate()
            .flat_map(|(i, p)| {
                let who = CombatantRef::Player(i);
                p.drain_scrolling_text().into_iter().map(move |t| (who, t))
            });
        let monsters = self.monsters.iter_mut().flat_map(|m| {
            let who = CombatantRef::Monster(m.uid);
            m.body.drain_scrolling_text().into_iter().map(move |t| (who, t))
        });
        players.chain(monsters).collect()
    }

    /// Index of the surviving player once the other is down
    pub fn winner(&self) -> Option<usize> {
        match (self.players[0].is_dead(), self.players[1].is_dead()) {
            (false, true) => Some(0),
            (true, false) => Some(1),
            _ => None,
        }
    }

    pub fn is_over(&self) -> bool {
        self.players.iter().any(|p| p.is_dead())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ai::MonsterKind;
    use crate::sim::condition::ConditionTemplate;

    #[test]
    fn test_scheduler_orders_by_time() {
        let mut s = Scheduler::new();
        let ev = |t, kind| TimedEvent {
            fire_at_ms: t,
            target: CombatantRef::Player(0),
            kind,
        };
        s.schedule(ev(900, TimedEventKind::CooldownExpired));
        s.schedule(ev(300, TimedEventKind::LockExpired));
        s.schedule(ev(900, TimedEventKind::LockExpired));
        assert_eq!(s.next_fire_ms(), Some(300));

        assert!(s.take_due(299).is_empty());
        let due = s.take_due(900);
        let kinds: Vec<_> = due.iter().map(|e| (e.fire_at_ms, e.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (300, TimedEventKind::LockExpired),
                (900, TimedEventKind::CooldownExpired),
                (900, TimedEventKind::LockExpired),
            ]
        );
        assert!(s.is_empty());
    }

    #[test]
    fn test_clock_formats_minutes_and_seconds() {
        let mut clock = GameClock::new(250);
        clock.sync(0);
        assert_eq!(clock.to_string(), "0:00");
        clock.sync(65_100);
        assert_eq!(clock.steps, 260);
        assert_eq!(clock.to_string(), "1:05");
        // Never runs backwards
        clock.sync(1000);
        assert_eq!(clock.steps, 260);
    }

    #[test]
    fn test_world_starts_players_at_spawns() {
        let world = World::with_seed(1);
        assert_eq!(world.players[0].rect.topleft(), world.arena.p1_spawn);
        assert_eq!(world.players[1].rect.topleft(), world.arena.p2_spawn);
        assert_eq!(world.players[0].id, 1);
        assert_eq!(world.players[1].id, 2);
        assert!(world.winner().is_none());
    }

    #[test]
    fn test_due_events_restore_cooldown_and_lock() {
        let mut world = World::with_seed(1);
        world.players[0].attack_cooldown_expired = false;
        world.players[1].locked = true;
        world.scheduler.schedule(TimedEvent {
            fire_at_ms: 500,
            target: CombatantRef::Player(0),
            kind: TimedEventKind::CooldownExpired,
        });
        world.scheduler.schedule(TimedEvent {
            fire_at_ms: 500,
            target: CombatantRef::Player(1),
            kind: TimedEventKind::LockExpired,
        });
        world.scheduler.schedule(TimedEvent {
            fire_at_ms: 500,
            target: CombatantRef::Monster(99),
            kind: TimedEventKind::CooldownExpired,
        });

        world.now_ms = 499;
        world.fire_due_events();
        assert!(!world.players[0].attack_cooldown_expired);

        world.now_ms = 500;
        world.fire_due_events();
        assert!(world.players[0].attack_cooldown_expired);
        assert!(!world.players[1].locked);
        assert!(world.scheduler.is_empty());
    }

    #[test]
    fn test_regen_caps_and_skips_dead() {
        let mut world = World::with_seed(1);
        world.players[0].hit_points = 50;
        world.players[0].energy = world.players[0].energy_max;
        world.players[0].apply_condition(&ConditionTemplate::invigorated(5000), 0);
        world.players[1].hit_points = 0;
        world.players[1].energy = 0;

        world.now_ms = 999;
        world.regenerate();
        assert_eq!(world.players[0].hit_points, 50);

        world.now_ms = 1000;
        world.regenerate();
        assert_eq!(world.players[0].hit_points, 52);
        assert_eq!(world.players[0].energy, world.players[0].energy_max);
        assert_eq!(world.players[1].energy, 0);
    }

    #[test]
    fn test_spawn_random_monster_uses_anchor() {
        let mut world = World::with_seed(5);
        let uid = world.spawn_random_monster().expect("presets exist");
        let m = world.monster(uid).expect("spawned");
        let anchors: Vec<Vec2> = world.arena.spawn_points().map(|t| t.rect.topleft()).collect();
        let foot = Vec2::new(m.body.rect.center().x, m.body.rect.bottom());
        assert!(anchors.iter().any(|a| (*a - foot).length() < 1e-3));
        assert!(world.combatant(CombatantRef::Monster(uid)).is_some());
        assert_eq!(world.events, vec![WorldEvent::MonsterSpawned { uid }]);
    }

    #[test]
    fn test_spawns_only_the_arena_roster() {
        let mut world = World::with_seed(1);
        assert_eq!(world.arena.possible_monsters, vec![MonsterKind::Weak, MonsterKind::Medium]);
        let mut kinds = Vec::new();
        for _ in 0..60 {
            let uid = world.spawn_random_monster().expect("roster is not empty");
            kinds.push(world.monster(uid).map(|m| m.info.kind));
        }
        assert!(kinds.iter().all(|k| *k != Some(MonsterKind::Ultimate)));
        assert!(kinds.contains(&Some(MonsterKind::Weak)));
        assert!(kinds.contains(&Some(MonsterKind::Medium)));
    }

    #[test]
    fn test_empty_roster_spawns_nothing() {
        let mut world = World::with_seed(2);
        world.arena.possible_monsters = vec![MonsterKind::Ultimate];
        world.tuning.monsters = vec![MonsterInfo::WEAK];
        assert_eq!(world.spawn_random_monster(), None);
        assert!(world.monsters.is_empty());
    }

    #[test]
    fn test_interval_spawns_stop_at_arena_cap() {
        let mut world = World::with_seed(3);
        world.arena.max_monsters = 1;
        for step in 1..=4 {
            world.now_ms = step * world.tuning.monster_spawn_interval_ms;
            world.spawn_monsters_if_due();
        }
        assert_eq!(world.monsters.len(), 1);
    }

    #[test]
    fn test_drain_scrolling_text_includes_monsters() {
        let mut world = World::with_seed(6);
        let uid = world.spawn_monster_at(MonsterInfo::WEAK, Vec2::new(300.0, 400.0));
        world.players[0].apply_damage(3, 0);
        if let Some(m) = world.combatant_mut(CombatantRef::Monster(uid)) {
            m.apply_damage(4, 0);
        }

        let drained = world.drain_scrolling_text();
        let who: Vec<CombatantRef> = drained.iter().map(|(w, _)| *w).collect();
        assert!(who.contains(&CombatantRef::Player(0)));
        assert!(who.contains(&CombatantRef::Monster(uid)));
        assert!(world.players.iter().all(|p| p.scrolling_text.is_empty()));
        assert!(world.monsters.iter().all(|m| m.body.scrolling_text.is_empty()));
    }
}

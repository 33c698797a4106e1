//! Static skill table
//!
//! Each skill id maps to a [`SkillDef`]: dimensions, timing, damage, cost,
//! shape-specific numbers and optional typed hooks. Hooks are plain function
//! pointers fixed at table construction; particles copy them at spawn.
//!
//! Id ranges double as pickup tiers: 1..=99 basic attacks, 100..=999 skills,
//! 1000+ ultimates. Id 0 is an empty slot and -1 is meditate.

use std::collections::BTreeMap;
use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec2;

use super::arena::Terrain;
use super::combatant::Combatant;
use super::condition::ConditionTemplate;
use super::particle::Particle;

pub type SkillId = i32;

pub const EMPTY_SLOT: SkillId = 0;
pub const MEDITATE: SkillId = -1;

/// Pickup tier, derived from the id range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillTier {
    Weak,
    Medium,
    Ultimate,
}

impl SkillTier {
    pub fn of(id: SkillId) -> Option<Self> {
        match id {
            1..=99 => Some(SkillTier::Weak),
            100..=999 => Some(SkillTier::Medium),
            1000.. => Some(SkillTier::Ultimate),
            _ => None,
        }
    }
}

/// Shape-specific parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkillShape {
    /// Arc swinging around the owner
    Melee {
        /// Sweep angle (radians) from overhead to horizontal
        arc: f32,
        start_radius: f32,
        max_radius: f32,
        /// Widen the particle instead of pushing it outward
        extend: bool,
    },
    /// Projectile integrating velocity + acceleration per tick
    Ranged { speed: f32, acceleration: f32 },
    /// Buff on the caster only, no particle
    SelfCast,
    /// Rooted channel with regen buffs
    Meditate,
}

/// What a particle does after its center enters terrain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerrainContact {
    /// Expire, registering one hit on destructible terrain
    Stop,
    PassThrough,
}

/// Skill to spawn where an expiring particle ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowUp {
    pub skill: SkillId,
    pub at: Vec2,
}

pub type HitHook = fn(&Particle, &mut Combatant, u64);
pub type ExpireHook = fn(&Particle, u64) -> Option<FollowUp>;
pub type TerrainHook = fn(&Particle, &Terrain, u64) -> TerrainContact;
pub type PersistentHook = fn(&mut Particle, u64);
/// Returns the particle center for this tick
pub type MotionHook = fn(&Particle, u64) -> Vec2;

/// Optional per-skill behavior layered over the default update/hit logic
#[derive(Debug, Clone, Copy, Default)]
pub struct SkillHooks {
    pub on_hit: Option<HitHook>,
    pub on_expire: Option<ExpireHook>,
    pub on_terrain: Option<TerrainHook>,
    pub persistent: Option<PersistentHook>,
    pub special_motion: Option<MotionHook>,
}

#[derive(Debug, Clone)]
pub struct SkillDef {
    pub id: SkillId,
    pub name: &'static str,
    pub width: f32,
    pub height: f32,
    pub cooldown_ms: u64,
    pub duration_ms: u64,
    pub damage: i32,
    pub energy: i32,
    /// Render hint only
    pub color: [u8; 3],
    pub shape: SkillShape,
    /// Applied to whoever the particle hits
    pub conditions: Vec<ConditionTemplate>,
    /// Applied to the caster on trigger
    pub self_conditions: Vec<ConditionTemplate>,
    pub hooks: SkillHooks,
    /// Can appear as a dropped pickup
    pub droppable: bool,
}

impl SkillDef {
    fn base(id: SkillId, name: &'static str, shape: SkillShape) -> Self {
        Self {
            id,
            name,
            width: 16.0,
            height: 16.0,
            cooldown_ms: 500,
            duration_ms: 500,
            damage: 0,
            energy: 0,
            color: [255, 255, 255],
            shape,
            conditions: Vec::new(),
            self_conditions: Vec::new(),
            hooks: SkillHooks::default(),
            droppable: true,
        }
    }

    pub fn melee(id: SkillId, name: &'static str, arc: f32, start_radius: f32, max_radius: f32) -> Self {
        Self::base(
            id,
            name,
            SkillShape::Melee {
                arc,
                start_radius,
                max_radius,
                extend: false,
            },
        )
    }

    pub fn ranged(id: SkillId, name: &'static str, speed: f32, acceleration: f32) -> Self {
        Self::base(id, name, SkillShape::Ranged { speed, acceleration })
    }

    pub fn self_cast(id: SkillId, name: &'static str) -> Self {
        Self::base(id, name, SkillShape::SelfCast)
    }

    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn timing(mut self, cooldown_ms: u64, duration_ms: u64) -> Self {
        self.cooldown_ms = cooldown_ms;
        self.duration_ms = duration_ms;
        self
    }

    pub fn damage(mut self, damage: i32) -> Self {
        self.damage = damage;
        self
    }

    pub fn energy(mut self, energy: i32) -> Self {
        self.energy = energy;
        self
    }

    pub fn color(mut self, color: [u8; 3]) -> Self {
        self.color = color;
        self
    }

    pub fn extend(mut self) -> Self {
        if let SkillShape::Melee { extend, .. } = &mut self.shape {
            *extend = true;
        }
        self
    }

    pub fn on_target(mut self, template: ConditionTemplate) -> Self {
        self.conditions.push(template);
        self
    }

    pub fn on_self(mut self, template: ConditionTemplate) -> Self {
        self.self_conditions.push(template);
        self
    }

    pub fn hooks(mut self, hooks: SkillHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn not_droppable(mut self) -> Self {
        self.droppable = false;
        self
    }

    pub fn tier(&self) -> Option<SkillTier> {
        SkillTier::of(self.id)
    }
}

/// Skill id -> definition
#[derive(Debug, Clone)]
pub struct SkillTable {
    skills: BTreeMap<SkillId, SkillDef>,
}

impl Default for SkillTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl SkillTable {
    pub fn empty() -> Self {
        Self {
            skills: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, def: SkillDef) {
        self.skills.insert(def.id, def);
    }

    pub fn get(&self, id: SkillId) -> Option<&SkillDef> {
        self.skills.get(&id)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Ids that may drop as pickups in the given tier, ascending
    pub fn droppable(&self, tier: SkillTier) -> Vec<SkillId> {
        self.skills
            .values()
            .filter(|d| d.droppable && d.tier() == Some(tier))
            .map(|d| d.id)
            .collect()
    }

    /// The built-in roster
    pub fn standard() -> Self {
        let mut table = Self::empty();

        // --- Basic attacks ---
        table.insert(
            SkillDef::melee(1, "Slash", FRAC_PI_2, 20.0, 50.0)
                .size(30.0, 30.0)
                .timing(400, 250)
                .damage(5)
                .color([220, 220, 220]),
        );
        table.insert(
            SkillDef::melee(2, "Lunge", 0.0, 15.0, 60.0)
                .extend()
                .size(20.0, 16.0)
                .timing(500, 300)
                .damage(6)
                .color([200, 200, 160]),
        );
        table.insert(
            SkillDef::ranged(3, "Spark", 8.0, 0.5)
                .size(12.0, 12.0)
                .timing(450, 700)
                .damage(4)
                .energy(1)
                .color([255, 255, 0]),
        );

        // --- Skills ---
        table.insert(
            SkillDef::ranged(100, "Frost Bolt", 9.0, 0.0)
                .timing(900, 1000)
                .damage(6)
                .energy(3)
                .color([80, 191, 201])
                .on_target(ConditionTemplate::slow(2000, 0.5)),
        );
        table.insert(
            SkillDef::melee(101, "Concussive Blow", FRAC_PI_2, 20.0, 55.0)
                .size(34.0, 34.0)
                .timing(1200, 300)
                .damage(8)
                .energy(4)
                .color([139, 69, 19])
                .on_target(ConditionTemplate::stun(1000)),
        );
        table.insert(
            SkillDef::ranged(102, "Venom Dart", 11.0, 0.0)
                .size(10.0, 10.0)
                .timing(900, 900)
                .damage(2)
                .energy(3)
                .color([0, 128, 0])
                .on_target(ConditionTemplate::dot(5, 4, 1000)),
        );
        table.insert(
            SkillDef::self_cast(103, "Barrier")
                .timing(1500, 0)
                .energy(4)
                .color([0, 128, 255])
                .on_self(ConditionTemplate::shield(3000, 20)),
        );
        table.insert(
            SkillDef::ranged(104, "Snare Net", 7.0, -0.2)
                .size(24.0, 24.0)
                .timing(1000, 1200)
                .damage(1)
                .energy(3)
                .color([100, 100, 100])
                .on_target(ConditionTemplate::snare(1500)),
        );
        table.insert(
            SkillDef::self_cast(105, "Haste")
                .timing(1500, 0)
                .energy(3)
                .color([0, 255, 0])
                .on_self(ConditionTemplate::speed(3000, 0.5)),
        );
        table.insert(
            SkillDef::ranged(106, "Boomerang", 0.0, 0.0)
                .size(18.0, 18.0)
                .timing(1200, 1200)
                .damage(5)
                .energy(3)
                .color([255, 153, 0])
                .hooks(SkillHooks {
                    special_motion: Some(boomerang_path),
                    on_terrain: Some(pass_through),
                    ..Default::default()
                }),
        );
        table.insert(
            SkillDef::ranged(107, "Silencing Shot", 12.0, 0.0)
                .size(10.0, 6.0)
                .timing(1100, 800)
                .damage(3)
                .energy(4)
                .color([153, 0, 153])
                .on_target(ConditionTemplate::silence(1500))
                .on_target(ConditionTemplate::weakened(3000)),
        );
        table.insert(
            SkillDef::melee(108, "Sapping Strike", FRAC_PI_2, 20.0, 45.0)
                .size(28.0, 28.0)
                .timing(900, 250)
                .damage(6)
                .energy(3)
                .color([128, 0, 0])
                .on_target(ConditionTemplate::wounded(4000))
                .hooks(SkillHooks {
                    on_hit: Some(sap_energy),
                    ..Default::default()
                }),
        );
        table.insert(
            SkillDef::ranged(109, "Swelling Orb", 4.0, 0.0)
                .size(8.0, 8.0)
                .timing(1200, 1500)
                .damage(7)
                .energy(4)
                .color([255, 0, 255])
                .hooks(SkillHooks {
                    persistent: Some(swell),
                    ..Default::default()
                }),
        );

        // --- Ultimates ---
        table.insert(
            SkillDef::ranged(1000, "Meteor", 6.0, 0.3)
                .size(30.0, 30.0)
                .timing(3000, 1000)
                .damage(15)
                .energy(8)
                .color([255, 0, 0])
                .on_target(ConditionTemplate::stun(500))
                .hooks(SkillHooks {
                    on_expire: Some(meteor_impact),
                    ..Default::default()
                }),
        );
        table.insert(
            SkillDef::melee(1001, "Shockwave", 0.0, 10.0, 120.0)
                .extend()
                .size(10.0, 20.0)
                .timing(0, 400)
                .damage(12)
                .color([255, 92, 0])
                .hooks(SkillHooks {
                    special_motion: Some(anchored_at_origin),
                    persistent: Some(swell),
                    ..Default::default()
                })
                .not_droppable(),
        );
        table.insert(
            SkillDef::melee(1002, "Earthsplitter", PI, 30.0, 90.0)
                .size(40.0, 40.0)
                .timing(2500, 500)
                .damage(20)
                .energy(8)
                .color([153, 92, 0])
                .on_target(ConditionTemplate::stun(1500))
                .on_target(ConditionTemplate::wounded(5000)),
        );
        table.insert(
            SkillDef::self_cast(1003, "Sanctuary")
                .timing(3000, 0)
                .energy(6)
                .color([255, 255, 255])
                .on_self(ConditionTemplate::shield(5000, 40))
                .on_self(ConditionTemplate::invigorated(5000))
                .on_self(ConditionTemplate::empowered(5000)),
        );

        table.insert(SkillDef {
            energy: 0,
            cooldown_ms: 2000,
            duration_ms: 2000,
            droppable: false,
            ..SkillDef::base(MEDITATE, "Meditate", SkillShape::Meditate)
                .on_self(ConditionTemplate::invigorated(2000))
                .on_self(ConditionTemplate::empowered(2000))
        });

        table
    }
}

// --- Hooks used by the built-in roster ---

/// Out along the facing direction and back to the origin over the lifetime
fn boomerang_path(particle: &Particle, now_ms: u64) -> Vec2 {
    let t = particle.progress(now_ms) * PI;
    particle.origin
        + Vec2::new(
            particle.facing.sign() * 220.0 * t.sin(),
            -40.0 * (2.0 * t).sin(),
        )
}

fn pass_through(_: &Particle, _: &Terrain, _: u64) -> TerrainContact {
    TerrainContact::PassThrough
}

/// Burns a chunk of the target's energy
fn sap_energy(_: &Particle, target: &mut Combatant, now_ms: u64) {
    let drained = target.energy.min(2);
    target.gain_energy(-drained, now_ms);
}

/// Grows the particle around its center every tick
fn swell(particle: &mut Particle, _: u64) {
    let center = particle.rect.center();
    particle.rect.width += 1.5;
    particle.rect.height += 1.5;
    particle.rect.set_center(center);
}

fn meteor_impact(particle: &Particle, _: u64) -> Option<FollowUp> {
    Some(FollowUp {
        skill: 1001,
        at: particle.rect.center(),
    })
}

fn anchored_at_origin(particle: &Particle, _: u64) -> Vec2 {
    particle.origin
}

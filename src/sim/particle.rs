//! Skill-effect particles
//!
//! A particle is spawned by a successful skill trigger (or by an on-expire
//! follow-up) and lives until its duration elapses:
//! - Melee particles swing along an arc around their owner, growing outward
//!   (or widening when `extend` is set) and remembering whom they hit
//! - Ranged particles integrate velocity + acceleration each tick and are
//!   spent on their first hit
//!
//! Skill hooks are copied from the [`SkillDef`] at spawn and layered over
//! the default behavior.

use glam::Vec2;

use super::arena::Terrain;
use super::combatant::{CombatInput, Combatant, CombatantRef, Facing};
use super::condition::ConditionTemplate;
use super::rect::Rect;
use super::skills::{FollowUp, SkillDef, SkillHooks, SkillId, SkillShape, TerrainContact};
use crate::consts::{HIT_MEMORY_MS, MELEE_ARC_LIFT, MONSTER_KNOCKBACK, RANGED_SPAWN_OFFSET};
use crate::lerp;

/// Vertical aim held at trigger time: -1 up, +1 down, 0 level
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aim {
    pub vertical: f32,
}

impl Aim {
    pub const LEVEL: Aim = Aim { vertical: 0.0 };

    pub fn from_input(input: &CombatInput) -> Self {
        let vertical = if input.up {
            -1.0
        } else if input.down {
            1.0
        } else {
            0.0
        };
        Self { vertical }
    }
}

#[derive(Debug, Clone)]
pub struct MeleeState {
    /// Sweep angle (radians)
    pub arc: f32,
    pub radius: f32,
    pub start_radius: f32,
    pub max_radius: f32,
    /// Width at spawn, before any `extend` widening
    pub base_width: f32,
    pub extend: bool,
    /// Targets hit and when; entries drop after `HIT_MEMORY_MS`
    pub hit_memory: Vec<(CombatantRef, u64)>,
}

#[derive(Debug, Clone)]
pub struct RangedState {
    pub vel: Vec2,
    pub accel: Vec2,
}

#[derive(Debug, Clone)]
pub enum ParticleKind {
    Melee(MeleeState),
    Ranged(RangedState),
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub skill: SkillId,
    pub rect: Rect,
    /// Stamped on the first update
    pub spawn_ms: Option<u64>,
    pub duration_ms: u64,
    pub expired: bool,
    pub owner: CombatantRef,
    pub damage: i32,
    /// Informational; already paid by the owner
    pub energy: i32,
    pub color: [u8; 3],
    pub conditions: Vec<ConditionTemplate>,
    pub hooks: SkillHooks,
    /// Owner center at spawn (or the follow-up point)
    pub origin: Vec2,
    pub facing: Facing,
    pub kind: ParticleKind,
}

impl Particle {
    /// Spawn the particle for `def` cast by `owner`.
    ///
    /// Self-cast and meditate skills have no particle.
    pub fn spawn(def: &SkillDef, owner_ref: CombatantRef, owner: &Combatant, aim: Aim) -> Option<Self> {
        Self::spawn_at(def, owner_ref, owner.center(), owner.facing, aim)
    }

    /// Spawn centered on an explicit origin; used for on-expire follow-ups
    pub fn spawn_at(
        def: &SkillDef,
        owner: CombatantRef,
        origin: Vec2,
        facing: Facing,
        aim: Aim,
    ) -> Option<Self> {
        let size = Vec2::new(def.width, def.height);
        let (rect, kind) = match def.shape {
            SkillShape::Melee {
                arc,
                start_radius,
                max_radius,
                extend,
            } => (
                Rect::centered(origin, size),
                ParticleKind::Melee(MeleeState {
                    arc,
                    radius: start_radius,
                    start_radius,
                    max_radius,
                    base_width: def.width,
                    extend,
                    hit_memory: Vec::new(),
                }),
            ),
            SkillShape::Ranged {
                speed,
                acceleration,
            } => {
                let dir = facing.sign();
                let center = origin + Vec2::new(dir * RANGED_SPAWN_OFFSET, 0.0);
                (
                    Rect::centered(center, size),
                    ParticleKind::Ranged(RangedState {
                        vel: Vec2::new(dir * speed, aim.vertical * speed),
                        accel: Vec2::new(dir * acceleration, aim.vertical * acceleration),
                    }),
                )
            }
            SkillShape::SelfCast | SkillShape::Meditate => return None,
        };

        Some(Self {
            skill: def.id,
            rect,
            spawn_ms: None,
            duration_ms: def.duration_ms,
            expired: false,
            owner,
            damage: def.damage,
            energy: def.energy,
            color: def.color,
            conditions: def.conditions.clone(),
            hooks: def.hooks,
            origin,
            facing,
            kind,
        })
    }

    #[inline]
    pub fn is_melee(&self) -> bool {
        matches!(self.kind, ParticleKind::Melee(_))
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        self.spawn_ms.map_or(0, |spawn| now_ms.saturating_sub(spawn))
    }

    /// Fraction of the lifetime elapsed, in [0, 1]
    pub fn progress(&self, now_ms: u64) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        (self.elapsed_ms(now_ms) as f32 / self.duration_ms as f32).min(1.0)
    }

    /// Advance one tick.
    ///
    /// `anchor` is the owner's current center; melee arcs swing around it.
    pub fn update(&mut self, now_ms: u64, anchor: Vec2) {
        self.spawn_ms.get_or_insert(now_ms);
        let r = self.progress(now_ms);
        self.expired |= self.elapsed_ms(now_ms) >= self.duration_ms;

        if let Some(motion) = self.hooks.special_motion {
            if let ParticleKind::Melee(melee) = &mut self.kind {
                melee.hit_memory.retain(|(_, t)| t + HIT_MEMORY_MS > now_ms);
            }
            let center = motion(self, now_ms);
            self.rect.set_center(center);
        } else {
            match &mut self.kind {
                ParticleKind::Melee(melee) => {
                    melee.hit_memory.retain(|(_, t)| t + HIT_MEMORY_MS > now_ms);
                    if melee.extend {
                        let reach = melee.max_radius - melee.start_radius;
                        self.rect.width = melee.base_width + reach * r;
                        melee.radius = melee.start_radius + reach * r * 0.5;
                    } else {
                        melee.radius = lerp(melee.start_radius, melee.max_radius, r);
                    }
                    let angle = (1.0 - r) * melee.arc;
                    let center = anchor
                        + Vec2::new(
                            self.facing.sign() * melee.radius * angle.cos(),
                            -MELEE_ARC_LIFT - melee.radius * angle.sin(),
                        );
                    self.rect.set_center(center);
                }
                ParticleKind::Ranged(ranged) => {
                    ranged.vel += ranged.accel;
                    self.rect.translate(ranged.vel);
                }
            }
        }

        if let Some(persistent) = self.hooks.persistent {
            persistent(self, now_ms);
        }
    }

    /// Apply this particle to a target it overlaps.
    ///
    /// Returns true if the hit landed. Owners are immune, melee particles
    /// skip targets hit within the memory window, ranged particles are
    /// spent by their first hit.
    pub fn on_hit(&mut self, target_ref: CombatantRef, target: &mut Combatant, now_ms: u64) -> bool {
        if self.expired || target_ref == self.owner || target.is_dead() {
            return false;
        }
        match &mut self.kind {
            ParticleKind::Melee(melee) => {
                if melee.hit_memory.iter().any(|(r, _)| *r == target_ref) {
                    return false;
                }
                melee.hit_memory.push((target_ref, now_ms));
            }
            ParticleKind::Ranged(_) => self.expired = true,
        }

        target.apply_damage(self.damage, now_ms);
        for template in &self.conditions {
            target.apply_condition(template, now_ms);
        }
        if target.is_monster() {
            target.rect.left += -MONSTER_KNOCKBACK * target.vel.x;
            target.vel.x = -target.vel.x;
        }
        if let Some(hook) = self.hooks.on_hit {
            hook(self, target, now_ms);
        }
        true
    }

    /// Response to the particle's center entering `terrain`
    pub fn terrain_contact(&self, terrain: &Terrain, now_ms: u64) -> TerrainContact {
        match self.hooks.on_terrain {
            Some(hook) => hook(self, terrain, now_ms),
            None if self.is_melee() => TerrainContact::PassThrough,
            None => TerrainContact::Stop,
        }
    }

    /// Follow-up requested by the skill when this particle expires
    pub fn on_expire(&self, now_ms: u64) -> Option<FollowUp> {
        self.hooks.on_expire.and_then(|hook| hook(self, now_ms))
    }
}

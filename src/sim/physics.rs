//! Per-frame movement integration and terrain collision response
//!
//! Velocities are in pixels per tick. Order within a tick:
//! 1. `accelerate`: input, jump, friction, gravity, limits
//! 2. `displace`: move by velocity, scaled by Speed/Slow, zeroed by Snare
//! 3. `resolve_terrain`: push out of terrain, set ground/wall contact
//! 4. `Arena::clamp_to_play_area`
//! 5. `collect_pickups` (players only)

use glam::Vec2;
use rand::Rng;

use super::arena::Arena;
use super::combatant::{Combatant, Facing};
use super::condition::ConditionKind;
use super::rect::Rect;
use super::skills::{SkillId, SkillTier};
use crate::consts::*;

/// Input-driven acceleration plus friction, gravity and velocity limits
pub fn accelerate(c: &mut Combatant) {
    let free_to_move =
        c.attack_cooldown_expired && c.can_act() && !c.has(ConditionKind::Silence);
    if free_to_move {
        apply_input_accel(c);
        apply_jump(c);
    }
    apply_friction(c);
    apply_gravity(c);
    apply_limits(c);
}

fn apply_input_accel(c: &mut Combatant) {
    if c.input.right {
        c.vel.x += c.motion.dx_movement;
    } else if c.input.left {
        c.vel.x -= c.motion.dx_movement;
    }
}

fn apply_jump(c: &mut Combatant) {
    if !c.input.jump {
        return;
    }
    if c.is_monster() {
        if c.touching_ground {
            c.vel.y -= c.motion.dy_jump;
        }
        return;
    }

    if c.touching_ground || c.hit_wall_from.is_some() {
        c.vel.y -= c.motion.dy_jump;
    }
    // Wall jump kicks away from the wall
    if !c.touching_ground {
        match c.hit_wall_from {
            Some(Facing::Left) => c.vel.x += c.motion.dx_wall_jump,
            Some(Facing::Right) => c.vel.x -= c.motion.dx_wall_jump,
            None => {}
        }
    }
}

/// Decelerate toward zero by a fixed step without overshooting
fn apply_friction(c: &mut Combatant) {
    let friction = c.motion.dx_friction;
    if c.vel.x.abs() <= friction {
        c.vel.x = 0.0;
    } else {
        c.vel.x -= friction * c.vel.x.signum();
    }
}

/// Half gravity inside the floaty band smooths the jump apex
fn apply_gravity(c: &mut Combatant) {
    if FLOATY_BAND_LOW < c.vel.y && c.vel.y < FLOATY_BAND_HIGH {
        c.vel.y += c.motion.dy_gravity * 0.5;
    } else {
        c.vel.y += c.motion.dy_gravity;
    }
}

fn apply_limits(c: &mut Combatant) {
    let m = &c.motion;
    c.vel.x = c.vel.x.clamp(-m.dx_max, m.dx_max);
    c.vel.y = c.vel.y.min(m.dy_max).max(-m.dy_jump);
}

/// Displacement for this tick after condition modifiers.
///
/// Snare pins the combatant. Speed/Slow scale horizontal and upward motion;
/// falling is never slowed.
pub fn displacement(c: &Combatant) -> Vec2 {
    if c.has(ConditionKind::Snare) {
        return Vec2::ZERO;
    }
    let m = c.conditions.movement_multiplier();
    let dy = if c.vel.y < 0.0 { c.vel.y * m } else { c.vel.y };
    Vec2::new(c.vel.x * m, dy)
}

pub fn displace(c: &mut Combatant) {
    c.prev_topleft = c.rect.topleft();
    let delta = displacement(c);
    c.rect.translate(delta);
}

#[inline]
fn strictly_between(lo: f32, x: f32, hi: f32) -> bool {
    lo < x && x < hi
}

fn overlaps_horizontally(s: &Rect, t: &Rect) -> bool {
    strictly_between(t.left, s.left, t.right())
        || strictly_between(t.left, s.right(), t.right())
        || strictly_between(s.left, t.left, s.right())
        || strictly_between(s.left, t.right(), s.right())
}

fn overlaps_vertically(s: &Rect, t: &Rect) -> bool {
    strictly_between(t.top, s.bottom(), t.bottom())
        || strictly_between(t.top, s.top, t.bottom())
        || strictly_between(s.top, t.top, s.bottom())
        || strictly_between(s.top, t.bottom(), s.bottom())
}

/// Push the combatant out of every collidable terrain rect.
///
/// Landing requires the previous bottom edge to have been at most
/// `LANDING_TOLERANCE` below the terrain top, so rising through a thin
/// platform from below never snaps onto it.
pub fn resolve_terrain(c: &mut Combatant, arena: &Arena) {
    c.hit_wall_from = None;
    c.touching_ground = false;
    let monster = c.is_monster();
    let prev_top = c.prev_topleft.y;

    for terrain in arena.collidable() {
        let t = &terrain.rect;

        if overlaps_horizontally(&c.rect, t) {
            // Floor
            if strictly_between(c.rect.top, t.top, c.rect.bottom()) {
                if prev_top + c.rect.height - LANDING_TOLERANCE <= t.top {
                    c.rect.set_bottom(t.top);
                    c.vel.y = 0.0;
                    c.touching_ground = true;
                }
                if monster {
                    c.hit_wall_from = None;
                    c.touching_ground = true;
                }
            }
            // Ceiling
            if strictly_between(c.rect.top, t.bottom(), c.rect.bottom())
                && c.vel.y < 0.0
                && prev_top >= t.bottom()
            {
                c.rect.top = t.bottom();
                c.vel.y *= CEILING_DAMPING;
            }
        }

        if overlaps_vertically(&c.rect, t) {
            if strictly_between(c.rect.left, t.right(), c.rect.right()) && c.vel.x <= 0.0 {
                c.rect.left = t.right();
                c.hit_wall_from = Some(Facing::Left);
                c.vel.x = 0.0;
                // Players stick and slide down walls
                if c.vel.y > 0.0 && !monster {
                    c.vel.y = 0.0;
                }
            } else if strictly_between(c.rect.left, t.left, c.rect.right()) && c.vel.x >= 0.0 {
                c.rect.set_right(t.left);
                c.hit_wall_from = Some(Facing::Right);
                c.vel.x = 0.0;
                if c.vel.y > 0.0 && !monster {
                    c.vel.y = 0.0;
                }
            }
        }
    }
}

/// Move, collide and clamp for one tick
pub fn step_movement(c: &mut Combatant, arena: &Arena) {
    displace(c);
    resolve_terrain(c, arena);
    arena.clamp_to_play_area(&mut c.rect);
}

/// Consume any dropped skills the player is touching.
///
/// Weak pickups replace the basic attack, medium ones a random skill slot,
/// ultimates the ultimate slot. Monsters never pick anything up.
pub fn collect_pickups<R: Rng>(c: &mut Combatant, arena: &mut Arena, rng: &mut R) -> Vec<SkillId> {
    if c.is_monster() {
        return Vec::new();
    }

    let mut taken = Vec::new();
    let rect = c.rect;
    arena.dropped_skills.retain(|pickup| {
        if !rect.collides(&pickup.rect) {
            return true;
        }
        match SkillTier::of(pickup.skill) {
            Some(SkillTier::Weak) => c.loadout.attack = pickup.skill,
            Some(SkillTier::Medium) => {
                let slot = rng.random_range(1..=3u8);
                if let Some(s) = c.loadout.skill_slot_mut(slot) {
                    *s = pickup.skill;
                }
            }
            Some(SkillTier::Ultimate) => c.loadout.ult = pickup.skill,
            None => {
                log::warn!("Ignoring pickup with invalid skill id {}", pickup.skill);
                return true;
            }
        }
        taken.push(pickup.skill);
        false
    });

    for skill in &taken {
        log::debug!("Player {} picked up skill {}", c.id, skill);
    }
    taken
}

//! Player- and monster-controlled fighters
//!
//! A [`Combatant`] carries everything the per-tick pipeline mutates:
//! bounding rect, velocity, health/energy, conditions, equipped skills and
//! the semantic input snapshot for this frame. Players read their input from
//! an external poller; monsters get theirs synthesized by the AI.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::condition::{ConditionKind, ConditionSet, ConditionTemplate};
use super::particle::{Aim, Particle};
use super::rect::Rect;
use super::skills::{EMPTY_SLOT, MEDITATE, SkillId, SkillShape, SkillTable};
use super::state::{TimedEvent, TimedEventKind};
use crate::consts::SCROLLING_TEXT_MS;
use crate::tuning::{MotionTuning, Tuning};

/// Stable handle to a combatant inside the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatantRef {
    /// Index into the two-player array (0 = player 1)
    Player(usize),
    /// Monster entity id
    Monster(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Player,
    Monster,
}

/// Horizontal facing, also used for the side a wall was touched from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// Animation-relevant state, derived once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnimState {
    #[default]
    Stand,
    LWalk,
    RWalk,
    Jump,
    Fall,
    Attack,
    Death,
}

/// Semantic button state for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CombatInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
    pub attack: bool,
    pub skill1: bool,
    pub skill2: bool,
    pub skill3: bool,
    pub ult: bool,
    pub meditate: bool,
    pub drop_skill: bool,
}

/// Equipped skill ids (0 = empty slot)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadout {
    pub attack: SkillId,
    pub skill1: SkillId,
    pub skill2: SkillId,
    pub skill3: SkillId,
    pub ult: SkillId,
}

impl Default for Loadout {
    fn default() -> Self {
        Self {
            attack: 1,
            skill1: EMPTY_SLOT,
            skill2: EMPTY_SLOT,
            skill3: EMPTY_SLOT,
            ult: EMPTY_SLOT,
        }
    }
}

impl Loadout {
    /// Mutable access to skill slot 1..=3
    pub fn skill_slot_mut(&mut self, slot: u8) -> Option<&mut SkillId> {
        match slot {
            1 => Some(&mut self.skill1),
            2 => Some(&mut self.skill2),
            3 => Some(&mut self.skill3),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextTone {
    Condition,
    Damage,
    Heal,
    Energy,
}

/// One floating feedback message for the UI layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollingText {
    pub tone: TextTone,
    pub text: String,
    pub expires_at_ms: u64,
}

/// A skill that passed its energy and cooldown gates this tick
#[derive(Debug, Clone)]
pub struct SkillCast {
    pub skill: SkillId,
    pub particle: Option<Particle>,
    pub events: Vec<TimedEvent>,
}

/// A player or monster fighter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    /// 1 or 2 for players, 0 for monsters
    pub id: u8,
    pub role: Role,
    pub rect: Rect,
    /// Top-left before this tick's move (landing/ceiling tunneling guard)
    pub prev_topleft: Vec2,
    pub vel: Vec2,
    pub motion: MotionTuning,
    pub hit_points: i32,
    pub hit_points_max: i32,
    pub energy: i32,
    pub energy_max: i32,
    pub facing: Facing,
    pub loadout: Loadout,
    pub conditions: ConditionSet,
    pub attack_cooldown_expired: bool,
    /// Meditation lock window
    pub locked: bool,
    pub touching_ground: bool,
    pub hit_wall_from: Option<Facing>,
    pub state: AnimState,
    pub previous_state: AnimState,
    pub input: CombatInput,
    #[serde(skip)]
    pub scrolling_text: Vec<ScrollingText>,
}

impl Combatant {
    /// Player 1 starts facing right and drifting right; player 2 mirrors it
    pub fn player(id: u8, topleft: Vec2, tuning: &Tuning) -> Self {
        let facing = if id == 2 { Facing::Left } else { Facing::Right };
        let size = Vec2::new(tuning.player_size.0, tuning.player_size.1);
        let mut combatant = Self::new(
            id,
            Role::Player,
            Rect::from_topleft_and_size(topleft, size),
            tuning.player,
            tuning.player_hit_points,
            tuning.player_energy,
        );
        combatant.facing = facing;
        combatant.vel = Vec2::new(tuning.player_initial_dx * facing.sign(), tuning.initial_fall);
        combatant
    }

    pub fn monster(rect: Rect, motion: MotionTuning, hit_points: i32, tuning: &Tuning) -> Self {
        let mut combatant = Self::new(0, Role::Monster, rect, motion, hit_points, 0);
        combatant.vel = Vec2::new(0.0, tuning.initial_fall);
        combatant
    }

    fn new(
        id: u8,
        role: Role,
        rect: Rect,
        motion: MotionTuning,
        hit_points: i32,
        energy: i32,
    ) -> Self {
        Self {
            id,
            role,
            prev_topleft: rect.topleft(),
            rect,
            vel: Vec2::ZERO,
            motion,
            hit_points,
            hit_points_max: hit_points,
            energy,
            energy_max: energy,
            facing: Facing::Right,
            loadout: Loadout::default(),
            conditions: ConditionSet::new(),
            attack_cooldown_expired: true,
            locked: false,
            touching_ground: false,
            hit_wall_from: None,
            state: AnimState::Stand,
            previous_state: AnimState::Stand,
            input: CombatInput::default(),
            scrolling_text: Vec::new(),
        }
    }

    #[inline]
    pub fn is_monster(&self) -> bool {
        self.role == Role::Monster
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.hit_points <= 0
    }

    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }

    pub fn distance_from(&self, other: &Combatant) -> f32 {
        self.rect.distance_to(&other.rect)
    }

    pub fn has(&self, kind: ConditionKind) -> bool {
        self.conditions.has(kind)
    }

    /// Stunned or locked combatants ignore movement input
    pub fn can_act(&self) -> bool {
        !self.has(ConditionKind::Stun) && !self.locked
    }

    /// Stunned or silenced combatants cannot trigger skills
    pub fn can_cast(&self) -> bool {
        !self.has(ConditionKind::Stun) && !self.has(ConditionKind::Silence)
    }

    fn push_text(&mut self, tone: TextTone, text: String, now_ms: u64) {
        self.scrolling_text.push(ScrollingText {
            tone,
            text,
            expires_at_ms: now_ms + SCROLLING_TEXT_MS,
        });
    }

    /// Hand the accumulated feedback messages to the UI
    pub fn drain_scrolling_text(&mut self) -> Vec<ScrollingText> {
        std::mem::take(&mut self.scrolling_text)
    }

    /// Shared damage routine: shields absorb first, health floors at zero.
    ///
    /// Returns the damage that reached health.
    pub fn apply_damage(&mut self, amount: i32, now_ms: u64) -> i32 {
        if amount <= 0 {
            return 0;
        }
        let through = self.conditions.absorb(amount, now_ms);
        self.hit_points = (self.hit_points - through).clamp(0, self.hit_points_max);
        self.push_text(TextTone::Damage, amount.to_string(), now_ms);
        through
    }

    /// Restore health up to max; the dead stay dead
    pub fn heal(&mut self, amount: i32, now_ms: u64) {
        if amount == 0 || self.is_dead() {
            return;
        }
        self.hit_points = (self.hit_points + amount).clamp(0, self.hit_points_max);
        self.push_text(TextTone::Heal, amount.to_string(), now_ms);
    }

    /// Adjust energy; never drops below zero
    pub fn gain_energy(&mut self, amount: i32, now_ms: u64) {
        if amount == 0 {
            return;
        }
        self.energy = (self.energy + amount).max(0);
        self.push_text(TextTone::Energy, amount.to_string(), now_ms);
    }

    /// Begin a condition against this combatant
    pub fn apply_condition(&mut self, template: &ConditionTemplate, now_ms: u64) {
        if self.is_dead() {
            return;
        }
        self.conditions.push(template.instantiate(now_ms));
        if let Some(text) = template.announcement() {
            self.push_text(TextTone::Condition, text, now_ms);
        }
        log::debug!(
            "{:?} {} gains {} for {}ms",
            self.role,
            self.id,
            template.kind().name(),
            template.duration_ms
        );
    }

    /// Advance conditions, routing Dot ticks through the damage routine
    pub fn advance_conditions(&mut self, now_ms: u64) {
        let report = self.conditions.advance(now_ms);
        for text in report.announcements {
            self.push_text(TextTone::Condition, text, now_ms);
        }
        for damage in report.damage {
            self.apply_damage(damage, now_ms);
        }
    }

    /// Facing follows left/right input unless stunned or mid-attack
    pub fn update_facing(&mut self) {
        if !self.attack_cooldown_expired || !self.can_act() {
            return;
        }
        if self.input.right {
            self.facing = Facing::Right;
        } else if self.input.left {
            self.facing = Facing::Left;
        }
    }

    /// Requested skill by priority: ult > skill3 > skill2 > skill1 > attack > meditate
    pub fn requested_skill(&self) -> Option<SkillId> {
        let input = &self.input;
        let id = if input.ult {
            self.loadout.ult
        } else if input.skill3 {
            self.loadout.skill3
        } else if input.skill2 {
            self.loadout.skill2
        } else if input.skill1 {
            self.loadout.skill1
        } else if input.attack {
            self.loadout.attack
        } else if input.meditate {
            MEDITATE
        } else {
            EMPTY_SLOT
        };
        (id != EMPTY_SLOT).then_some(id)
    }

    /// Trigger the requested skill if the cooldown and energy gates allow it.
    ///
    /// Insufficient energy is a silent no-op: no cost, no cooldown.
    pub fn cast_requested_skill(
        &mut self,
        me: CombatantRef,
        skills: &SkillTable,
        now_ms: u64,
    ) -> Option<SkillCast> {
        if self.input.drop_skill || !self.attack_cooldown_expired || self.is_dead() {
            return None;
        }
        let id = self.requested_skill()?;
        let Some(def) = skills.get(id) else {
            log::warn!("{:?} requested unknown skill id {}", me, id);
            return None;
        };
        if self.energy < def.energy {
            return None;
        }

        self.energy -= def.energy;
        self.attack_cooldown_expired = false;
        for template in &def.self_conditions {
            self.apply_condition(template, now_ms);
        }

        let aim = Aim::from_input(&self.input);
        let particle = Particle::spawn(def, me, self, aim);

        let mut events = vec![TimedEvent {
            fire_at_ms: now_ms + def.cooldown_ms,
            target: me,
            kind: TimedEventKind::CooldownExpired,
        }];
        if matches!(def.shape, SkillShape::Meditate) {
            self.locked = true;
            events.push(TimedEvent {
                fire_at_ms: now_ms + def.cooldown_ms,
                target: me,
                kind: TimedEventKind::LockExpired,
            });
        }

        log::debug!("{:?} casts {} ({})", me, def.name, id);
        Some(SkillCast {
            skill: id,
            particle,
            events,
        })
    }

    /// Pick the animation state for this tick
    pub fn determine_state(&mut self) {
        self.previous_state = self.state;
        self.state = if self.is_dead() {
            AnimState::Death
        } else if !self.attack_cooldown_expired {
            AnimState::Attack
        } else if self.vel.y < 0.0 {
            AnimState::Jump
        } else if !self.touching_ground {
            AnimState::Fall
        } else if self.input.right {
            AnimState::RWalk
        } else if self.input.left {
            AnimState::LWalk
        } else {
            AnimState::Stand
        };
    }
}

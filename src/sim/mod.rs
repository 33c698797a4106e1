//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (players by index, monsters by spawn order)
//! - No rendering, audio or input-device dependencies

pub mod ai;
pub mod arena;
pub mod combatant;
pub mod condition;
pub mod particle;
pub mod physics;
pub mod rect;
pub mod skills;
pub mod state;
pub mod tick;

pub use ai::{AiStatus, Monster, MonsterAi, MonsterInfo, MonsterKind};
pub use arena::{Arena, ArenaLayout, PlatformSpec, SkillPickup, Terrain};
pub use combatant::{
    AnimState, CombatInput, Combatant, CombatantRef, Facing, Loadout, Role, ScrollingText,
    TextTone,
};
pub use condition::{Condition, ConditionKind, ConditionSet, ConditionTemplate, Effect};
pub use particle::{Aim, Particle, ParticleKind};
pub use rect::Rect;
pub use skills::{SkillDef, SkillId, SkillShape, SkillTable, SkillTier};
pub use state::{GameClock, Scheduler, TimedEvent, TimedEventKind, World, WorldEvent};
pub use tick::{TickInput, tick};

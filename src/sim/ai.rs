//! Monster AI
//!
//! Two-state machine driven by the game clock:
//! - IDLE wanders: random direction flips and the odd jump
//! - CHASING runs at a target player, hopping when the target is above
//!
//! The AI only writes a [`CombatInput`]; the body then goes through the same
//! acceleration/movement pipeline as a player. Monsters never cast skills.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::combatant::{CombatInput, Combatant};
use super::rect::Rect;
use crate::tuning::{MotionTuning, Tuning, TuningError};

/// Monster size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonsterKind {
    Weak,
    Medium,
    Ultimate,
}

/// Spawnable monster preset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonsterInfo {
    pub kind: MonsterKind,
    pub width: f32,
    pub height: f32,
    pub dx_max: f32,
    pub dy_max: f32,
    pub hit_points: i32,
    /// Time spent chasing before going idle
    pub chase_ms: u64,
    /// Time spent idle before picking a target
    pub idle_ms: u64,
}

impl MonsterInfo {
    pub const WEAK: MonsterInfo = MonsterInfo {
        kind: MonsterKind::Weak,
        width: 30.0,
        height: 40.0,
        dx_max: 2.0,
        dy_max: 10.0,
        hit_points: 50,
        chase_ms: 5000,
        idle_ms: 5000,
    };

    pub const MEDIUM: MonsterInfo = MonsterInfo {
        kind: MonsterKind::Medium,
        width: 50.0,
        height: 60.0,
        dx_max: 3.0,
        dy_max: 12.0,
        hit_points: 100,
        chase_ms: 7000,
        idle_ms: 5000,
    };

    pub const ULTIMATE: MonsterInfo = MonsterInfo {
        kind: MonsterKind::Ultimate,
        width: 80.0,
        height: 80.0,
        dx_max: 4.0,
        dy_max: 13.0,
        hit_points: 150,
        chase_ms: 10000,
        idle_ms: 5000,
    };

    pub const PRESETS: [MonsterInfo; 3] = [Self::WEAK, Self::MEDIUM, Self::ULTIMATE];

    /// Monster base motion with this preset's speed caps
    pub fn motion(&self, base: &MotionTuning) -> MotionTuning {
        MotionTuning {
            dx_max: self.dx_max,
            dy_max: self.dy_max,
            ..*base
        }
    }

    pub(crate) fn validate(&self) -> Result<(), TuningError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(TuningError::Invalid(format!("{:?} monster has no size", self.kind)));
        }
        if self.hit_points <= 0 {
            return Err(TuningError::Invalid(format!(
                "{:?} monster hit_points must be positive",
                self.kind
            )));
        }
        if self.chase_ms == 0 || self.idle_ms == 0 {
            return Err(TuningError::Invalid(format!(
                "{:?} monster idle/chase times must be positive",
                self.kind
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiStatus {
    #[default]
    Idle,
    Chasing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonsterAi {
    pub status: AiStatus,
    /// Index into the players array
    pub target: Option<usize>,
    pub last_status_change_ms: u64,
    pub idle_ms: u64,
    pub chase_ms: u64,
}

impl MonsterAi {
    pub fn new(info: &MonsterInfo, now_ms: u64) -> Self {
        Self {
            status: AiStatus::Idle,
            target: None,
            last_status_change_ms: now_ms,
            idle_ms: info.idle_ms,
            chase_ms: info.chase_ms,
        }
    }

    /// Flip state once time-in-state exceeds its budget.
    ///
    /// Returns true if the status changed this call.
    fn switch_mode<R: Rng>(
        &mut self,
        clock_ms: u64,
        me: &Combatant,
        players: &[Combatant; 2],
        rng: &mut R,
    ) -> bool {
        let in_state = clock_ms.saturating_sub(self.last_status_change_ms);
        match self.status {
            AiStatus::Chasing if in_state > self.chase_ms => {
                self.status = AiStatus::Idle;
                self.last_status_change_ms = clock_ms;
                log::debug!("Monster gives up the chase at {}ms", clock_ms);
                true
            }
            AiStatus::Idle if in_state > self.idle_ms => {
                self.status = AiStatus::Chasing;
                self.last_status_change_ms = clock_ms;
                let target = pick_target(me, players, rng);
                self.target = Some(target);
                log::debug!("Monster starts chasing player {} at {}ms", target + 1, clock_ms);
                true
            }
            _ => false,
        }
    }

    /// Synthesize this tick's input for `me`.
    ///
    /// `clock_ms` is the game clock (quarter-second resolution), not the
    /// raw tick time.
    pub fn think<R: Rng>(
        &mut self,
        clock_ms: u64,
        me: &mut Combatant,
        players: &[Combatant; 2],
        rng: &mut R,
    ) {
        let changed = self.switch_mode(clock_ms, me, players, rng);
        if changed && self.status == AiStatus::Idle {
            me.input = CombatInput::default();
            return;
        }

        let target = match (self.status, self.target) {
            (AiStatus::Chasing, Some(i)) => players.get(i),
            _ => None,
        };
        match target {
            Some(target) => chase(me, target.center(), rng),
            None => wander(&mut me.input, rng),
        }
    }
}

/// 70% of the time go for the nearer player; otherwise (or on a tie) a coin flip
pub fn pick_target<R: Rng>(me: &Combatant, players: &[Combatant; 2], rng: &mut R) -> usize {
    let d1 = me.distance_from(&players[0]);
    let d2 = me.distance_from(&players[1]);
    if d1 != d2 && rng.random_bool(0.7) {
        if d1 < d2 { 0 } else { 1 }
    } else {
        rng.random_range(0..2)
    }
}

fn chase<R: Rng>(me: &mut Combatant, target: Vec2, rng: &mut R) {
    let here = me.center();
    me.input = CombatInput::default();
    if target.x >= here.x {
        me.input.right = true;
    } else {
        me.input.left = true;
    }
    if target.y < here.y && rng.random_range(1..=50) == 1 {
        me.input.jump = true;
    }
}

fn wander<R: Rng>(input: &mut CombatInput, rng: &mut R) {
    input.jump = false;
    if rng.random_range(1..=30) < 5 {
        let going_right = input.right;
        input.right = !going_right;
        input.left = going_right;
    }
    if rng.random_range(1..=100) == 2 {
        input.jump = true;
    }
}

/// A live monster: body, brain and the preset it came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monster {
    pub uid: u32,
    pub info: MonsterInfo,
    pub body: Combatant,
    pub ai: MonsterAi,
}

impl Monster {
    pub fn new(uid: u32, info: MonsterInfo, topleft: Vec2, tuning: &Tuning, now_ms: u64) -> Self {
        let rect = Rect::from_topleft_and_size(topleft, Vec2::new(info.width, info.height));
        let body = Combatant::monster(rect, info.motion(&tuning.monster), info.hit_points, tuning);
        Self {
            uid,
            info,
            body,
            ai: MonsterAi::new(&info, now_ms),
        }
    }
}

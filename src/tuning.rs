//! Balance tuning
//!
//! Movement, health, regen and monster numbers live here so matches can be
//! re-tuned from a JSON file without touching the simulation. Every field
//! has a default, so a tuning file only needs the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{GAME_CLOCK_MS, TICK_MS};
use crate::sim::ai::MonsterInfo;
use crate::sim::combatant::Combatant;
use crate::sim::condition::ConditionKind;

/// Failure loading tuning or arena layout data
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Per-combatant velocity limits and acceleration tunables (pixels per tick)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionTuning {
    pub dx_max: f32,
    pub dy_max: f32,
    pub dx_movement: f32,
    pub dy_jump: f32,
    pub dx_wall_jump: f32,
    pub dx_friction: f32,
    pub dy_gravity: f32,
}

impl MotionTuning {
    pub const PLAYER: MotionTuning = MotionTuning {
        dx_max: 12.0,
        dy_max: 15.0,
        dx_movement: 2.0,
        dy_jump: 35.0,
        dx_wall_jump: 15.0,
        dx_friction: 0.5,
        dy_gravity: 4.0,
    };

    /// Base monster motion; presets override the speed caps
    pub const MONSTER: MotionTuning = MotionTuning {
        dx_max: 3.0,
        dy_max: 12.0,
        dx_movement: 2.0,
        dy_jump: 30.0,
        dx_wall_jump: 0.0,
        dx_friction: 0.5,
        dy_gravity: 2.0,
    };

    fn validate(&self, who: &str) -> Result<(), TuningError> {
        let fields = [
            ("dx_max", self.dx_max),
            ("dy_max", self.dy_max),
            ("dx_movement", self.dx_movement),
            ("dy_jump", self.dy_jump),
            ("dx_wall_jump", self.dx_wall_jump),
            ("dx_friction", self.dx_friction),
            ("dy_gravity", self.dy_gravity),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(TuningError::Invalid(format!(
                    "{who}.{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Periodic health/energy regeneration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegenTuning {
    pub interval_ms: u64,
    pub hit_points: i32,
    pub energy: i32,
}

impl Default for RegenTuning {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            hit_points: 1,
            energy: 1,
        }
    }
}

impl RegenTuning {
    /// Health regained per interval: doubled by Invigorated, halved by Wounded
    pub fn hit_points_for(&self, c: &Combatant) -> i32 {
        scaled(
            self.hit_points,
            c.has(ConditionKind::Invigorated),
            c.has(ConditionKind::Wounded),
        )
    }

    /// Energy regained per interval: doubled by Empowered, halved by Weakened
    pub fn energy_for(&self, c: &Combatant) -> i32 {
        scaled(
            self.energy,
            c.has(ConditionKind::Empowered),
            c.has(ConditionKind::Weakened),
        )
    }
}

fn scaled(base: i32, boosted: bool, reduced: bool) -> i32 {
    let mut amount = base;
    if boosted {
        amount *= 2;
    }
    if reduced {
        amount /= 2;
    }
    amount.max(0)
}

/// Match-wide balance numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Timing ===
    /// Simulation step (30 FPS)
    pub tick_ms: u64,
    /// Game clock resolution (quarter seconds)
    pub game_clock_ms: u64,

    // === Players ===
    pub player: MotionTuning,
    /// Bounding box (width, height)
    pub player_size: (f32, f32),
    pub player_hit_points: i32,
    pub player_energy: i32,
    /// Horizontal drift at spawn, toward the opponent
    pub player_initial_dx: f32,
    /// Downward speed at spawn
    pub initial_fall: f32,

    // === Regeneration ===
    pub regen: RegenTuning,

    // === Monsters ===
    pub monster: MotionTuning,
    /// Monster presets; each arena picks from these by kind
    pub monsters: Vec<MonsterInfo>,
    /// 0 disables automatic spawning
    pub monster_spawn_interval_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            game_clock_ms: GAME_CLOCK_MS,

            player: MotionTuning::PLAYER,
            player_size: (40.0, 60.0),
            player_hit_points: 100,
            player_energy: 10,
            player_initial_dx: 10.0,
            initial_fall: 4.0,

            regen: RegenTuning::default(),

            monster: MotionTuning::MONSTER,
            monsters: MonsterInfo::PRESETS.to_vec(),
            monster_spawn_interval_ms: 5000,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if self.tick_ms == 0 {
            return Err(TuningError::Invalid("tick_ms must be positive".into()));
        }
        if self.game_clock_ms == 0 {
            return Err(TuningError::Invalid("game_clock_ms must be positive".into()));
        }
        if self.regen.interval_ms == 0 {
            return Err(TuningError::Invalid("regen.interval_ms must be positive".into()));
        }
        let (w, h) = self.player_size;
        if w <= 0.0 || h <= 0.0 {
            return Err(TuningError::Invalid(format!(
                "player_size must be positive, got ({w}, {h})"
            )));
        }
        if self.player_hit_points <= 0 {
            return Err(TuningError::Invalid("player_hit_points must be positive".into()));
        }
        if self.player_energy < 0 {
            return Err(TuningError::Invalid("player_energy must not be negative".into()));
        }
        self.player.validate("player")?;
        self.monster.validate("monster")?;
        for info in &self.monsters {
            info.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::condition::ConditionTemplate;
    use glam::Vec2;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "player_hit_points": 250, "monster_spawn_interval_ms": 0 }"#)
            .expect("partial tuning parses");
        assert_eq!(tuning.player_hit_points, 250);
        assert_eq!(tuning.monster_spawn_interval_ms, 0);
        assert_eq!(tuning.tick_ms, TICK_MS);
        assert_eq!(tuning.player, MotionTuning::PLAYER);
    }

    #[test]
    fn test_json_round_trip() {
        let tuning = Tuning::default();
        let json = tuning.to_json().expect("serializes");
        let back = Tuning::from_json(&json).expect("parses");
        assert_eq!(back, tuning);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            Tuning::from_json(r#"{ "tick_ms": 0 }"#),
            Err(TuningError::Invalid(_))
        ));
        assert!(matches!(
            Tuning::from_json(r#"{ "player_size": [0.0, 60.0] }"#),
            Err(TuningError::Invalid(_))
        ));
        let mut tuning = Tuning::default();
        tuning.player.dx_max = -1.0;
        assert!(matches!(tuning.validate(), Err(TuningError::Invalid(_))));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            Tuning::load("/definitely/not/here/tuning.json"),
            Err(TuningError::Io(_))
        ));
    }

    #[test]
    fn test_regen_modifiers() {
        let tuning = Tuning::default();
        let regen = RegenTuning {
            interval_ms: 1000,
            hit_points: 4,
            energy: 4,
        };
        let mut c = Combatant::player(1, Vec2::ZERO, &tuning);
        assert_eq!(regen.hit_points_for(&c), 4);

        c.apply_condition(&ConditionTemplate::invigorated(1000), 0);
        assert_eq!(regen.hit_points_for(&c), 8);
        assert_eq!(regen.energy_for(&c), 4);

        c.apply_condition(&ConditionTemplate::wounded(1000), 0);
        c.apply_condition(&ConditionTemplate::weakened(1000), 0);
        assert_eq!(regen.hit_points_for(&c), 4);
        assert_eq!(regen.energy_for(&c), 2);
    }
}

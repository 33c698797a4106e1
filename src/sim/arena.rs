//! Arena geometry: terrain rectangles, play area and dropped skill pickups
//!
//! Terrain is authored externally and treated as read-only apart from
//! destructible blocks, which lose a hit each time a particle stops on them
//! and are removed when the counter reaches zero.

use std::path::Path;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ai::MonsterKind;
use super::rect::Rect;
use super::skills::SkillId;
use crate::consts::{FLOOR_THICKNESS, WORLD_HEIGHT, WORLD_WIDTH};
use crate::tuning::TuningError;

/// A terrain rectangle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terrain {
    pub id: u32,
    pub rect: Rect,
    /// -1 = indestructible, >0 = hits left before removal
    pub hits_to_destroy: i32,
    /// Monster spawn anchor, never collidable
    pub spawn_point: bool,
    /// Render hint only
    pub color: Option<[u8; 3]>,
}

impl Terrain {
    pub fn solid(id: u32, rect: Rect) -> Self {
        Self {
            id,
            rect,
            hits_to_destroy: -1,
            spawn_point: false,
            color: None,
        }
    }

    pub fn destructible(id: u32, rect: Rect, hits: i32) -> Self {
        Self {
            hits_to_destroy: hits.max(1),
            ..Self::solid(id, rect)
        }
    }

    pub fn spawn_anchor(id: u32, point: Vec2) -> Self {
        Self {
            spawn_point: true,
            ..Self::solid(id, Rect::anchor(point))
        }
    }

    /// Spawn anchors and zero-area rects are never terrain
    #[inline]
    pub fn is_collidable(&self) -> bool {
        !self.spawn_point && !self.rect.is_anchor()
    }

    #[inline]
    pub fn is_destructible(&self) -> bool {
        self.hits_to_destroy > 0
    }
}

/// A skill lying on the ground waiting to be picked up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillPickup {
    pub skill: SkillId,
    pub rect: Rect,
}

/// Platform entry in an authored layout (coordinates relative to the play area)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSpec {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default = "indestructible")]
    pub hits_to_destroy: i32,
    #[serde(default)]
    pub spawn_point: bool,
    #[serde(default)]
    pub color: Option<[u8; 3]>,
}

fn indestructible() -> i32 {
    -1
}

fn default_max_monsters() -> usize {
    3
}

fn default_possible_monsters() -> Vec<MonsterKind> {
    vec![MonsterKind::Weak, MonsterKind::Medium]
}

/// Authored arena description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaLayout {
    pub floor_y: f32,
    pub left_wall_x: f32,
    pub right_wall_x: f32,
    /// Spawn offsets relative to the play area's left edge
    pub p1_spawn: (f32, f32),
    pub p2_spawn: (f32, f32),
    pub platforms: Vec<PlatformSpec>,
    /// Live monster cap for this arena
    #[serde(default = "default_max_monsters")]
    pub max_monsters: usize,
    /// Monster kinds allowed to spawn here
    #[serde(default = "default_possible_monsters")]
    pub possible_monsters: Vec<MonsterKind>,
}

impl Default for ArenaLayout {
    fn default() -> Self {
        let platform = |left, top, width, height| PlatformSpec {
            left,
            top,
            width,
            height,
            hits_to_destroy: -1,
            spawn_point: false,
            color: None,
        };
        let anchor = |left, top| PlatformSpec {
            spawn_point: true,
            ..platform(left, top, 0.0, 0.0)
        };
        Self {
            floor_y: 550.0,
            left_wall_x: 65.0,
            right_wall_x: 1215.0,
            p1_spawn: (100.0, 400.0),
            p2_spawn: (1000.0, 400.0),
            platforms: vec![
                platform(150.0, 420.0, 200.0, 20.0),
                platform(800.0, 420.0, 200.0, 20.0),
                platform(475.0, 300.0, 200.0, 20.0),
                PlatformSpec {
                    hits_to_destroy: 3,
                    color: Some([139, 69, 19]),
                    ..platform(560.0, 480.0, 30.0, 70.0)
                },
                anchor(250.0, 380.0),
                anchor(900.0, 380.0),
                anchor(575.0, 260.0),
            ],
            max_monsters: default_max_monsters(),
            possible_monsters: default_possible_monsters(),
        }
    }
}

impl ArenaLayout {
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let layout: Self = serde_json::from_str(json)?;
        if layout.right_wall_x <= layout.left_wall_x || layout.floor_y <= 0.0 {
            return Err(TuningError::Invalid(format!(
                "arena layout has no play area (walls {}..{}, floor {})",
                layout.left_wall_x, layout.right_wall_x, layout.floor_y
            )));
        }
        Ok(layout)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Live arena: play area bounds, terrain and pickups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    pub play_area: Rect,
    pub terrain: Vec<Terrain>,
    pub dropped_skills: Vec<SkillPickup>,
    pub p1_spawn: Vec2,
    pub p2_spawn: Vec2,
    pub max_monsters: usize,
    pub possible_monsters: Vec<MonsterKind>,
}

impl Arena {
    pub fn new(play_area: Rect, terrain: Vec<Terrain>) -> Self {
        let left = play_area.left;
        let bottom = play_area.bottom();
        Self {
            play_area,
            terrain,
            dropped_skills: Vec::new(),
            p1_spawn: Vec2::new(left, bottom),
            p2_spawn: Vec2::new(play_area.right(), bottom),
            max_monsters: default_max_monsters(),
            possible_monsters: default_possible_monsters(),
        }
    }

    /// Build floor, walls and platforms from an authored layout.
    ///
    /// Platforms and spawn offsets are authored relative to the play area
    /// and shifted right by its left edge.
    pub fn from_layout(layout: &ArenaLayout) -> Self {
        let floor = Rect::from_topleft_and_size(
            Vec2::new(0.0, layout.floor_y),
            Vec2::new(WORLD_WIDTH, FLOOR_THICKNESS),
        );
        let left_wall = Rect::from_edges(0.0, 0.0, layout.left_wall_x, WORLD_HEIGHT);
        let right_wall = Rect::from_edges(layout.right_wall_x, 0.0, WORLD_WIDTH, WORLD_HEIGHT);
        let play_area = Rect::from_edges(left_wall.right(), 0.0, right_wall.left, floor.top);
        let shift = Vec2::new(play_area.left, 0.0);

        let mut terrain = vec![
            Terrain::solid(0, floor),
            Terrain::solid(1, left_wall),
            Terrain::solid(2, right_wall),
        ];
        for (i, spec) in layout.platforms.iter().enumerate() {
            let mut rect = Rect::from_topleft_and_size(
                Vec2::new(spec.left, spec.top),
                Vec2::new(spec.width, spec.height),
            );
            rect.translate(shift);
            terrain.push(Terrain {
                id: i as u32 + 3,
                rect,
                hits_to_destroy: spec.hits_to_destroy,
                spawn_point: spec.spawn_point,
                color: spec.color,
            });
        }

        let mut arena = Self::new(play_area, terrain);
        arena.p1_spawn = Vec2::new(layout.p1_spawn.0, layout.p1_spawn.1) + shift;
        // Both players share player 1's spawn height
        arena.p2_spawn = Vec2::new(layout.p2_spawn.0, layout.p1_spawn.1) + shift;
        arena.max_monsters = layout.max_monsters;
        arena.possible_monsters = layout.possible_monsters.clone();
        log::info!(
            "Arena built: play area {:?}, {} terrain rects",
            arena.play_area,
            arena.terrain.len()
        );
        arena
    }

    /// Terrain that combatants and particles collide with
    pub fn collidable(&self) -> impl Iterator<Item = &Terrain> {
        self.terrain.iter().filter(|t| t.is_collidable())
    }

    pub fn spawn_points(&self) -> impl Iterator<Item = &Terrain> {
        self.terrain.iter().filter(|t| t.spawn_point)
    }

    pub fn destructible_terrain(&self) -> impl Iterator<Item = &Terrain> {
        self.terrain.iter().filter(|t| t.is_destructible())
    }

    /// A random spawn anchor, falling back to the play area's top center
    pub fn random_spawn_point<R: Rng>(&self, rng: &mut R) -> Vec2 {
        let anchors: Vec<Vec2> = self.spawn_points().map(|t| t.rect.topleft()).collect();
        if anchors.is_empty() {
            return Vec2::new(self.play_area.center().x, self.play_area.top);
        }
        anchors[rng.random_range(0..anchors.len())]
    }

    pub fn allows_monster(&self, kind: MonsterKind) -> bool {
        self.possible_monsters.contains(&kind)
    }

    /// Register one hit on terrain `id`; returns true if it was destroyed
    pub fn damage_terrain(&mut self, id: u32) -> bool {
        let Some(index) = self.terrain.iter().position(|t| t.id == id) else {
            return false;
        };
        let terrain = &mut self.terrain[index];
        if !terrain.is_destructible() {
            return false;
        }
        terrain.hits_to_destroy -= 1;
        if terrain.hits_to_destroy == 0 {
            self.terrain.remove(index);
            log::debug!("Terrain {} destroyed", id);
            return true;
        }
        false
    }

    /// Pin a rect inside the play area (left, right, bottom; no ceiling).
    ///
    /// Returns true if the rect had to be moved.
    pub fn clamp_to_play_area(&self, rect: &mut Rect) -> bool {
        let area = &self.play_area;
        let mut fixed = false;
        if rect.left < area.left {
            rect.left = area.left;
            fixed = true;
        }
        if rect.bottom() > area.bottom() {
            rect.set_bottom(area.bottom());
            fixed = true;
        }
        if rect.right() > area.right() {
            rect.set_right(area.right());
            fixed = true;
        }
        fixed
    }

    pub fn drop_skill(&mut self, skill: SkillId, at: Vec2) {
        self.dropped_skills.push(SkillPickup {
            skill,
            rect: Rect::centered(at, Vec2::splat(20.0)),
        });
    }
}

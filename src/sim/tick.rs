//! Fixed timestep simulation tick
//!
//! One call advances the world by `tuning.tick_ms`:
//! 1. Advance time and the game clock, fire due timed events
//! 2. Players: facing, skill trigger, acceleration, movement, pickups
//! 3. Monsters: AI input, facing, acceleration, movement
//! 4. Particles: update, terrain contact, hits, on-expire follow-ups
//! 5. Conditions advance and expire
//! 6. Regen, monster spawning, animation state, death cleanup

use super::combatant::{CombatInput, Combatant, CombatantRef};
use super::particle::{Aim, Particle};
use super::physics;
use super::skills::TerrainContact;
use super::state::{World, WorldEvent};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Button snapshot per player (index 0 = player 1)
    pub players: [CombatInput; 2],
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput) {
    world.events.clear();
    world.ticks += 1;
    world.now_ms += world.tuning.tick_ms;
    world.clock.sync(world.now_ms);

    world.fire_due_events();
    update_players(world, input);
    update_monsters(world);
    update_particles(world);
    advance_conditions(world);
    world.regenerate();
    world.spawn_monsters_if_due();
    finish_tick(world);
}

fn update_players(world: &mut World, input: &TickInput) {
    let now = world.now_ms;
    for (i, p) in world.players.iter_mut().enumerate() {
        let me = CombatantRef::Player(i);
        p.input = if p.is_dead() {
            CombatInput::default()
        } else {
            input.players[i]
        };
        p.update_facing();

        if p.can_cast() {
            if let Some(cast) = p.cast_requested_skill(me, &world.skills, now) {
                world.events.push(WorldEvent::SkillCast {
                    by: me,
                    skill: cast.skill,
                });
                for event in cast.events {
                    world.scheduler.schedule(event);
                }
                world.particles.extend(cast.particle);
            }
        }

        physics::accelerate(p);
        physics::step_movement(p, &world.arena);
        for skill in physics::collect_pickups(p, &mut world.arena, &mut world.rng) {
            world.events.push(WorldEvent::SkillPickedUp { player: i, skill });
        }
    }
}

fn update_monsters(world: &mut World) {
    let clock_ms = world.clock.as_ms();
    for m in world.monsters.iter_mut().filter(|m| !m.body.is_dead()) {
        m.ai.think(clock_ms, &mut m.body, &world.players, &mut world.rng);
        m.body.update_facing();
        physics::accelerate(&mut m.body);
        physics::step_movement(&mut m.body, &world.arena);
    }
}

fn update_particles(world: &mut World) {
    let now = world.now_ms;
    let mut particles = std::mem::take(&mut world.particles);
    let mut follow_ups = Vec::new();

    for p in particles.iter_mut() {
        let anchor = world.combatant(p.owner).map_or(p.origin, Combatant::center);
        p.update(now, anchor);
        particle_terrain(world, p);
        particle_hits(world, p);
        if p.expired {
            if let Some(follow) = p.on_expire(now) {
                follow_ups.push((p.owner, p.facing, follow));
            }
        }
    }
    particles.retain(|p| !p.expired);

    for (owner, facing, follow) in follow_ups {
        let Some(def) = world.skills.get(follow.skill) else {
            log::warn!("Follow-up references unknown skill id {}", follow.skill);
            continue;
        };
        particles.extend(Particle::spawn_at(def, owner, follow.at, facing, Aim::LEVEL));
    }
    world.particles = particles;
}

/// First terrain rect containing the particle center decides the contact
fn particle_terrain(world: &mut World, p: &mut Particle) {
    if p.expired {
        return;
    }
    let Some(terrain) = world
        .arena
        .collidable()
        .find(|t| p.rect.center_inside(&t.rect))
        .cloned()
    else {
        return;
    };
    if p.terrain_contact(&terrain, world.now_ms) == TerrainContact::PassThrough {
        return;
    }
    p.expired = true;
    if terrain.is_destructible() && world.arena.damage_terrain(terrain.id) {
        world.events.push(WorldEvent::TerrainDestroyed { id: terrain.id });
    }
}

fn particle_hits(world: &mut World, p: &mut Particle) {
    let now = world.now_ms;
    let rect = p.rect;

    for (i, target) in world.players.iter_mut().enumerate() {
        let who = CombatantRef::Player(i);
        if target.rect.collides(&rect) && p.on_hit(who, target, now) {
            world.events.push(WorldEvent::Hit {
                by: p.owner,
                target: who,
                skill: p.skill,
            });
        }
    }
    for m in world.monsters.iter_mut() {
        let who = CombatantRef::Monster(m.uid);
        if m.body.rect.collides(&rect) && p.on_hit(who, &mut m.body, now) {
            world.events.push(WorldEvent::Hit {
                by: p.owner,
                target: who,
                skill: p.skill,
            });
        }
    }
}

fn advance_conditions(world: &mut World) {
    let now = world.now_ms;
    for p in world.players.iter_mut() {
        p.advance_conditions(now);
    }
    for m in world.monsters.iter_mut() {
        m.body.advance_conditions(now);
    }
}

fn finish_tick(world: &mut World) {
    for (i, p) in world.players.iter_mut().enumerate() {
        p.determine_state();
        if p.is_dead() && p.previous_state != p.state {
            log::info!("Player {} is down at {}", i + 1, world.clock);
            world.events.push(WorldEvent::PlayerDied { player: i });
        }
    }
    for m in world.monsters.iter_mut() {
        m.body.determine_state();
    }

    let events = &mut world.events;
    world.monsters.retain(|m| {
        if m.body.is_dead() {
            log::info!("{:?} monster {} slain", m.info.kind, m.uid);
            events.push(WorldEvent::MonsterDied { uid: m.uid });
            return false;
        }
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ai::MonsterInfo;
    use crate::sim::arena::{Arena, ArenaLayout, Terrain};
    use crate::sim::combatant::AnimState;
    use crate::sim::condition::{ConditionKind, ConditionTemplate};
    use crate::sim::rect::Rect;
    use crate::tuning::Tuning;
    use glam::Vec2;
    use proptest::prelude::*;

    fn quiet_tuning() -> Tuning {
        Tuning {
            monster_spawn_interval_ms: 0,
            ..Tuning::default()
        }
    }

    fn quiet_world(seed: u64) -> World {
        World::new(seed, Arena::from_layout(&ArenaLayout::default()), quiet_tuning())
    }

    fn press(f: impl Fn(&mut CombatInput)) -> TickInput {
        let mut input = TickInput::default();
        f(&mut input.players[0]);
        input
    }

    fn run(world: &mut World, input: &TickInput, ticks: usize) {
        for _ in 0..ticks {
            tick(world, input);
        }
    }

    #[test]
    fn test_tick_advances_time_and_clock() {
        let mut world = quiet_world(1);
        run(&mut world, &TickInput::default(), 8);
        assert_eq!(world.ticks, 8);
        assert_eq!(world.now_ms, 8 * 33);
        assert_eq!(world.clock.steps, 264 / 250);
    }

    #[test]
    fn test_players_settle_on_floor() {
        let mut world = quiet_world(1);
        run(&mut world, &TickInput::default(), 120);
        let floor = world.arena.play_area.bottom();
        for p in &world.players {
            assert!(p.touching_ground);
            assert!(p.rect.bottom() <= floor);
            assert_eq!(p.state, AnimState::Stand);
        }
    }

    #[test]
    fn test_attack_cooldown_round_trip() {
        let mut world = quiet_world(1);
        run(&mut world, &TickInput::default(), 60);
        let attack = press(|i| i.attack = true);
        tick(&mut world, &attack);
        assert!(!world.players[0].attack_cooldown_expired);
        assert!(
            world
                .events
                .contains(&WorldEvent::SkillCast { by: CombatantRef::Player(0), skill: 1 })
        );
        assert_eq!(world.players[0].state, AnimState::Attack);

        // Slash cools down in 400ms
        run(&mut world, &TickInput::default(), 13);
        assert!(world.players[0].attack_cooldown_expired);
        assert!(world.particles.is_empty());
    }

    fn cast_by_player_one(world: &World) -> bool {
        world
            .events
            .iter()
            .any(|e| matches!(e, WorldEvent::SkillCast { by: CombatantRef::Player(0), .. }))
    }

    fn assert_blocked_until_expiry(template: ConditionTemplate) {
        let mut world = quiet_world(7);
        run(&mut world, &TickInput::default(), 60);
        let now = world.now_ms;
        world.players[0].apply_condition(&template, now);
        let energy = world.players[0].energy;

        let attack = press(|i| i.attack = true);
        for _ in 0..5 {
            tick(&mut world, &attack);
            assert!(!cast_by_player_one(&world));
        }
        assert_eq!(world.players[0].energy, energy);
        assert!(world.players[0].attack_cooldown_expired);
        assert!(world.particles.is_empty());

        // Casting works again once the condition runs out
        run(&mut world, &TickInput::default(), 40);
        tick(&mut world, &attack);
        assert!(cast_by_player_one(&world));
    }

    #[test]
    fn test_silence_blocks_skill_trigger() {
        assert_blocked_until_expiry(ConditionTemplate::silence(1000));
    }

    #[test]
    fn test_stun_blocks_skill_trigger() {
        assert_blocked_until_expiry(ConditionTemplate::stun(1000));
    }

    #[test]
    fn test_slash_hits_adjacent_opponent() {
        let mut world = quiet_world(3);
        run(&mut world, &TickInput::default(), 60);
        // Stand player 2 right next to player 1, both grounded
        let p1 = world.players[0].rect;
        world.players[1].rect.left = p1.right() + 5.0;
        world.players[1].rect.top = p1.top;
        world.players[1].vel = Vec2::ZERO;
        world.players[0].facing = crate::sim::combatant::Facing::Right;

        let attack = press(|i| i.attack = true);
        tick(&mut world, &attack);
        run(&mut world, &TickInput::default(), 10);

        let p2 = &world.players[1];
        assert_eq!(p2.hit_points, p2.hit_points_max - 5);
    }

    #[test]
    fn test_ranged_stops_on_wall_and_breaks_destructible() {
        let layout = ArenaLayout {
            platforms: Vec::new(),
            ..ArenaLayout::default()
        };
        let mut arena = Arena::from_layout(&layout);
        let block = Rect::from_edges(400.0, 380.0, 430.0, 560.0);
        arena.terrain.push(Terrain::destructible(99, block, 1));
        let mut world = World::new(2, arena, quiet_tuning());
        run(&mut world, &TickInput::default(), 60);
        world.players[0].energy = 10;
        world.players[0].facing = crate::sim::combatant::Facing::Right;
        world.players[0].loadout.attack = 3;

        let shoot = press(|i| i.attack = true);
        tick(&mut world, &shoot);
        let mut destroyed = false;
        for _ in 0..40 {
            tick(&mut world, &TickInput::default());
            destroyed |= world.events.contains(&WorldEvent::TerrainDestroyed { id: 99 });
        }
        assert!(destroyed);
        assert!(world.arena.terrain.iter().all(|t| t.id != 99));
        assert!(world.particles.is_empty());
    }

    #[test]
    fn test_meditate_locks_then_releases() {
        let mut world = quiet_world(1);
        run(&mut world, &TickInput::default(), 60);
        let x = world.players[0].rect.left;
        tick(&mut world, &press(|i| i.meditate = true));
        assert!(world.players[0].locked);
        assert!(world.players[0].has(ConditionKind::Invigorated));

        // Locked: walking input is ignored
        run(&mut world, &press(|i| i.right = true), 30);
        assert_eq!(world.players[0].rect.left, x);

        run(&mut world, &TickInput::default(), 40);
        assert!(!world.players[0].locked);
        assert!(world.players[0].attack_cooldown_expired);
    }

    #[test]
    fn test_pickup_collected_during_tick() {
        let mut world = quiet_world(1);
        run(&mut world, &TickInput::default(), 60);
        let at = world.players[0].center();
        world.arena.drop_skill(1002, at);
        tick(&mut world, &TickInput::default());
        assert_eq!(world.players[0].loadout.ult, 1002);
        assert!(world.events.contains(&WorldEvent::SkillPickedUp { player: 0, skill: 1002 }));
    }

    #[test]
    fn test_dead_monster_removed_at_end_of_tick() {
        let mut world = quiet_world(1);
        let uid = world.spawn_monster_at(MonsterInfo::WEAK, Vec2::new(600.0, 300.0));
        tick(&mut world, &TickInput::default());
        assert_eq!(world.monsters.len(), 1);

        world.monsters[0].body.hit_points = 0;
        tick(&mut world, &TickInput::default());
        assert!(world.monsters.is_empty());
        assert!(world.events.contains(&WorldEvent::MonsterDied { uid }));
    }

    #[test]
    fn test_dot_kills_and_reports_death() {
        let mut world = quiet_world(1);
        world.players[1].hit_points = 5;
        world.players[1].apply_condition(&ConditionTemplate::dot(5, 1, 100), 0);
        let mut died = false;
        for _ in 0..10 {
            tick(&mut world, &TickInput::default());
            died |= world.events.contains(&WorldEvent::PlayerDied { player: 1 });
        }
        assert!(died);
        assert_eq!(world.winner(), Some(0));
        assert_eq!(world.players[1].state, AnimState::Death);
    }

    #[test]
    fn test_monsters_spawn_on_interval() {
        let tuning = Tuning {
            monster_spawn_interval_ms: 330,
            ..Tuning::default()
        };
        let layout = ArenaLayout {
            max_monsters: 2,
            ..ArenaLayout::default()
        };
        let mut world = World::new(4, Arena::from_layout(&layout), tuning);
        run(&mut world, &TickInput::default(), 40);
        assert_eq!(world.monsters.len(), 2);
    }

    #[test]
    fn test_determinism() {
        let tuning = Tuning {
            monster_spawn_interval_ms: 500,
            ..Tuning::default()
        };
        let arena = Arena::from_layout(&ArenaLayout::default());
        let mut w1 = World::new(99999, arena.clone(), tuning.clone());
        let mut w2 = World::new(99999, arena, tuning);

        let script = [
            press(|i| i.right = true),
            press(|i| i.jump = true),
            press(|i| i.attack = true),
            press(|i| {
                i.skill1 = true;
                i.up = true;
            }),
            TickInput::default(),
        ];
        for step in 0..300 {
            let input = &script[step % script.len()];
            tick(&mut w1, input);
            tick(&mut w2, input);
        }

        assert_eq!(w1.now_ms, w2.now_ms);
        assert_eq!(w1.monsters.len(), w2.monsters.len());
        for (a, b) in w1.monsters.iter().zip(&w2.monsters) {
            assert_eq!(a.body.rect, b.body.rect);
            assert_eq!(a.ai.status, b.ai.status);
        }
        for (a, b) in w1.players.iter().zip(&w2.players) {
            assert_eq!(a.rect, b.rect);
            assert_eq!(a.hit_points, b.hit_points);
            assert_eq!(a.energy, b.energy);
        }
    }

    fn arb_input() -> impl Strategy<Value = CombatInput> {
        (any::<[bool; 6]>(), any::<[bool; 6]>()).prop_map(|(a, b)| CombatInput {
            left: a[0],
            right: a[1],
            up: a[2],
            down: a[3],
            jump: a[4],
            attack: a[5],
            skill1: b[0],
            skill2: b[1],
            skill3: b[2],
            ult: b[3],
            meditate: b[4],
            drop_skill: b[5],
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_health_and_energy_stay_in_bounds(
            seed in any::<u64>(),
            inputs in prop::collection::vec((arb_input(), arb_input()), 1..120),
        ) {
            let mut world = World::with_seed(seed);
            for p in world.players.iter_mut() {
                p.loadout.skill1 = 100;
                p.loadout.skill2 = 102;
                p.loadout.skill3 = 107;
                p.loadout.ult = 1000;
            }
            for (a, b) in inputs {
                tick(&mut world, &TickInput { players: [a, b] });
                for c in world.players.iter().chain(world.monsters.iter().map(|m| &m.body)) {
                    prop_assert!(c.hit_points >= 0);
                    prop_assert!(c.hit_points <= c.hit_points_max);
                    prop_assert!(c.energy >= 0);
                    prop_assert!(c.vel.x.abs() <= c.motion.dx_max);
                }
            }
        }
    }
}

use glam::Vec2;
use hecs::World;
use tracing::debug;

use crate::systems::gc;
use crate::{Config, GameRng, Lifetime, Obstacle, SpawnerConfig};

/// Monotonic spawn counter; entity ids are recycled after despawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct SpawnOrder(u64);

/// Owns the obstacle field for one game: a fixed set of permanent obstacles
/// plus temporary ones that come and go on wall-clock timers.
///
/// Time is supplied by the caller in milliseconds; nothing here reads a clock.
pub struct ObstacleSpawner {
    config: SpawnerConfig,
    hole_radius: f32,
    pole_size: Vec2,
    zone: (Vec2, Vec2),
    world: World,
    next_id: u32,
    next_order: u64,
    next_spawn_ms: Option<u64>,
    score_spawns_due: Vec<u64>,
}

impl ObstacleSpawner {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.spawner.clone(),
            hole_radius: config.hole_radius,
            pole_size: Vec2::new(config.pole_width, config.pole_height),
            zone: config.obstacle_zone(),
            world: World::new(),
            next_id: 0,
            next_order: 0,
            next_spawn_ms: None,
            score_spawns_due: Vec::new(),
        }
    }

    /// Clear the field, lay out the permanent obstacles and arm the spawn timer.
    /// Permanent obstacles alternate hole, pole, hole, ...
    pub fn begin_game(&mut self, now_ms: u64, rng: &mut GameRng) {
        self.world.clear();
        self.score_spawns_due.clear();
        self.next_id = 0;
        self.next_order = 0;

        for i in 0..self.config.permanent_obstacles {
            let pos = self.place(rng);
            let obstacle = if i % 2 == 0 {
                Obstacle::hole(pos, self.hole_radius)
            } else {
                Obstacle::pole(pos, self.pole_size.x, self.pole_size.y)
            };
            let order = self.take_order();
            self.world.spawn((obstacle, order));
        }

        self.next_spawn_ms = Some(now_ms + self.config.initial_delay_ms);
        debug!(
            permanent = self.config.permanent_obstacles,
            "obstacle field laid out"
        );
    }

    /// Advance timers: expire temporaries, then run any due spawn rolls.
    pub fn update(&mut self, now_ms: u64, rng: &mut GameRng) {
        let Some(due) = self.next_spawn_ms else {
            return;
        };

        let expired = gc(&mut self.world, now_ms);
        if expired > 0 {
            debug!(expired, "temporary obstacles despawned");
        }

        if now_ms >= due {
            if rng.chance(self.config.spawn_chance) {
                self.spawn_temporary(now_ms, rng);
            }
            self.next_spawn_ms = Some(now_ms + self.config.spawn_interval_ms.max(1));
        }

        let before = self.score_spawns_due.len();
        self.score_spawns_due.retain(|&at| at > now_ms);
        for _ in self.score_spawns_due.len()..before {
            self.spawn_temporary(now_ms, rng);
        }
    }

    /// Score changed: maybe queue one extra spawn after the configured delay
    pub fn on_score_change(&mut self, now_ms: u64, rng: &mut GameRng) {
        if self.next_spawn_ms.is_none() || !self.config.spawn_on_score {
            return;
        }
        if rng.chance(self.config.score_spawn_chance) {
            self.score_spawns_due
                .push(now_ms + self.config.score_spawn_delay_ms);
        }
    }

    /// Drop every pending timer. Obstacles stay where they are but never
    /// change again until the next `begin_game`.
    pub fn cancel(&mut self) {
        self.next_spawn_ms = None;
        self.score_spawns_due.clear();
    }

    pub fn is_running(&self) -> bool {
        self.next_spawn_ms.is_some()
    }

    /// Live obstacles in spawn order
    pub fn obstacles(&self) -> Vec<Obstacle> {
        let mut live: Vec<_> = self
            .world
            .query::<(&Obstacle, &SpawnOrder)>()
            .iter()
            .map(|(_entity, (obstacle, order))| (*order, *obstacle))
            .collect();
        live.sort_by_key(|(order, _)| *order);
        live.into_iter().map(|(_, obstacle)| obstacle).collect()
    }

    fn take_order(&mut self) -> SpawnOrder {
        let order = SpawnOrder(self.next_order);
        self.next_order += 1;
        order
    }

    pub fn temporary_count(&self) -> usize {
        self.world.query::<&Lifetime>().iter().count()
    }

    /// Spawn one temporary obstacle unless the ceiling is reached
    fn spawn_temporary(&mut self, now_ms: u64, rng: &mut GameRng) -> Option<Obstacle> {
        if self.temporary_count() >= self.config.max_temporary {
            return None;
        }

        let pos = self.place(rng);
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        let obstacle = if rng.chance(self.config.hole_chance) {
            Obstacle::hole(pos, self.hole_radius)
        } else {
            Obstacle::pole(pos, self.pole_size.x, self.pole_size.y)
        }
        .temporary(id);

        let lifetime = Lifetime {
            despawn_at_ms: now_ms + self.config.lifetime_ms,
        };
        let order = self.take_order();
        self.world.spawn((obstacle, lifetime, order));
        debug!(id, hole = obstacle.is_hole(), x = pos.x, y = pos.y, "temporary obstacle spawned");
        Some(obstacle)
    }

    /// Random center inside the safe zone, kept `min_spacing` away from every
    /// live obstacle. Gives up after the configured attempts and takes the
    /// last candidate anyway.
    fn place(&self, rng: &mut GameRng) -> Vec2 {
        let (min, max) = self.zone;
        let taken: Vec<Vec2> = self
            .world
            .query::<&Obstacle>()
            .iter()
            .map(|(_e, obstacle)| obstacle.pos)
            .collect();

        let mut candidate = Vec2::new(rng.range(min.x, max.x), rng.range(min.y, max.y));
        for _ in 1..self.config.placement_attempts.max(1) {
            if taken
                .iter()
                .all(|pos| pos.distance(candidate) >= self.config.min_spacing)
            {
                return candidate;
            }
            candidate = Vec2::new(rng.range(min.x, max.x), rng.range(min.y, max.y));
        }
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eager_config() -> Config {
        let mut config = Config::new();
        config.spawner.spawn_chance = 1.0;
        config.spawner.score_spawn_chance = 1.0;
        config
    }

    #[test]
    fn test_begin_game_lays_out_permanent_obstacles() {
        let config = Config::new();
        let mut spawner = ObstacleSpawner::new(&config);
        let mut rng = GameRng::new(42);

        spawner.begin_game(0, &mut rng);

        let obstacles = spawner.obstacles();
        assert_eq!(obstacles.len(), 2);
        assert!(obstacles.iter().all(|o| o.permanent && o.id.is_none()));
        assert!(obstacles[0].is_hole());
        assert!(!obstacles[1].is_hole());
        assert_eq!(spawner.temporary_count(), 0);

        let (min, max) = config.obstacle_zone();
        for obstacle in &obstacles {
            assert!(obstacle.pos.cmpge(min).all() && obstacle.pos.cmple(max).all());
        }
        assert!(
            obstacles[0].pos.distance(obstacles[1].pos) >= config.spawner.min_spacing,
            "Plenty of room for spacing on the default canvas"
        );
    }

    #[test]
    fn test_nothing_spawns_before_initial_delay() {
        let config = eager_config();
        let mut spawner = ObstacleSpawner::new(&config);
        let mut rng = GameRng::new(1);
        spawner.begin_game(1_000, &mut rng);

        spawner.update(5_999, &mut rng);
        assert_eq!(spawner.temporary_count(), 0);

        spawner.update(6_000, &mut rng);
        assert_eq!(spawner.temporary_count(), 1);

        spawner.update(6_001, &mut rng);
        assert_eq!(spawner.temporary_count(), 1, "Next roll waits a full interval");
    }

    #[test]
    fn test_temporary_obstacles_expire() {
        let config = eager_config();
        let mut spawner = ObstacleSpawner::new(&config);
        let mut rng = GameRng::new(1);
        spawner.begin_game(0, &mut rng);

        spawner.update(5_000, &mut rng);
        let temp = spawner
            .obstacles()
            .into_iter()
            .find(|o| !o.permanent)
            .expect("temporary spawned");
        assert_eq!(temp.id, Some(0));

        spawner.update(16_999, &mut rng);
        assert!(spawner.obstacles().iter().any(|o| o.id == Some(0)));

        spawner.update(17_000, &mut rng);
        assert!(
            !spawner.obstacles().iter().any(|o| o.id == Some(0)),
            "Lifetime of 12s has elapsed"
        );
        assert_eq!(spawner.obstacles().iter().filter(|o| o.permanent).count(), 2);
    }

    #[test]
    fn test_temporary_ceiling() {
        let mut config = eager_config();
        config.spawner.lifetime_ms = 1_000_000;
        let mut spawner = ObstacleSpawner::new(&config);
        let mut rng = GameRng::new(1);
        spawner.begin_game(0, &mut rng);

        let mut now = 0;
        for _ in 0..10 {
            now += 8_000;
            spawner.update(now, &mut rng);
        }
        assert_eq!(spawner.temporary_count(), config.spawner.max_temporary);
    }

    #[test]
    fn test_score_change_spawns_after_delay() {
        let mut config = eager_config();
        config.spawner.spawn_chance = 0.0;
        let mut spawner = ObstacleSpawner::new(&config);
        let mut rng = GameRng::new(1);
        spawner.begin_game(0, &mut rng);

        spawner.on_score_change(100, &mut rng);
        spawner.update(1_099, &mut rng);
        assert_eq!(spawner.temporary_count(), 0);

        spawner.update(1_100, &mut rng);
        assert_eq!(spawner.temporary_count(), 1);
    }

    #[test]
    fn test_score_spawn_can_be_disabled() {
        let mut config = eager_config();
        config.spawner.spawn_chance = 0.0;
        config.spawner.spawn_on_score = false;
        let mut spawner = ObstacleSpawner::new(&config);
        let mut rng = GameRng::new(1);
        spawner.begin_game(0, &mut rng);

        spawner.on_score_change(0, &mut rng);
        spawner.update(10_000, &mut rng);
        assert_eq!(spawner.temporary_count(), 0);
    }

    #[test]
    fn test_cancel_freezes_field() {
        let config = eager_config();
        let mut spawner = ObstacleSpawner::new(&config);
        let mut rng = GameRng::new(1);
        spawner.begin_game(0, &mut rng);
        spawner.update(5_000, &mut rng);
        spawner.on_score_change(5_000, &mut rng);
        let before = spawner.obstacles();

        spawner.cancel();
        assert!(!spawner.is_running());
        spawner.update(100_000, &mut rng);

        assert_eq!(spawner.obstacles(), before, "No spawns or despawns after cancel");
    }

    #[test]
    fn test_placement_accepts_overlap_when_crowded() {
        let mut config = Config::new();
        config.spawner.permanent_obstacles = 6;
        config.spawner.min_spacing = 10_000.0;
        let mut spawner = ObstacleSpawner::new(&config);
        let mut rng = GameRng::new(5);

        spawner.begin_game(0, &mut rng);

        assert_eq!(spawner.obstacles().len(), 6, "Every obstacle is still placed");
    }

    #[test]
    fn test_obstacles_listed_in_spawn_order_after_despawn() {
        let mut config = eager_config();
        config.spawner.spawn_interval_ms = 1_000;
        config.spawner.lifetime_ms = 1_500;
        config.spawner.max_temporary = 10;
        let mut spawner = ObstacleSpawner::new(&config);
        let mut rng = GameRng::new(1);
        spawner.begin_game(0, &mut rng);

        spawner.update(5_000, &mut rng); // id 0, gone at 6_500
        spawner.update(6_000, &mut rng); // id 1
        spawner.update(7_000, &mut rng); // id 0 expires, id 2 takes its slot

        let ids: Vec<Option<u32>> = spawner.obstacles().iter().map(|o| o.id).collect();
        assert_eq!(ids, [None, None, Some(1), Some(2)]);
    }

    #[test]
    fn test_same_seed_same_field() {
        let config = Config::new();
        let mut a = ObstacleSpawner::new(&config);
        let mut b = ObstacleSpawner::new(&config);
        a.begin_game(0, &mut GameRng::new(77));
        b.begin_game(0, &mut GameRng::new(77));
        assert_eq!(a.obstacles(), b.obstacles());
    }
}

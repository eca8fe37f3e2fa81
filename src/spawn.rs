//! Spawn pacing: when new enemies enter the field and when the boss shows up.

use log::debug;
use rand::Rng;

use crate::entities::{Enemy, EnemyKind, ENEMY_SPAWN_Y};

const BASE_SPAWN_INTERVAL: u32 = 60;
const MIN_SPAWN_INTERVAL: u32 = 30;
const SPAWN_INTERVAL_STEP: u32 = 5;
const BASE_ENEMY_TARGET: u32 = 20;
const ENEMY_TARGET_STEP: u32 = 5;
const BASIC_SPAWN_CHANCE: f64 = 0.7;
/// Horizontal band kept free at both field edges when picking a spawn column.
const SPAWN_MARGIN: f32 = 20.0;

// ── Difficulty tables ────────────────────────────────────────────────────────

/// Frames between spawns; shrinks each stage down to a floor.
pub fn spawn_interval(stage: u32) -> u32 {
    BASE_SPAWN_INTERVAL
        .saturating_sub(SPAWN_INTERVAL_STEP.saturating_mul(stage))
        .max(MIN_SPAWN_INTERVAL)
}

/// Kills needed before the boss is summoned.
pub fn stage_enemy_target(stage: u32) -> u32 {
    BASE_ENEMY_TARGET + ENEMY_TARGET_STEP * stage
}

// ── Predicates evaluated once per frame ──────────────────────────────────────

pub fn should_spawn_boss(destroyed: u32, target: u32, boss_active: bool, field_empty: bool) -> bool {
    destroyed >= target && !boss_active && field_empty
}

pub fn is_stage_clear(boss_active: bool, field_empty: bool) -> bool {
    boss_active && field_empty
}

// ── Director ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnDirector {
    pub timer: u32,
    pub interval: u32,
}

impl SpawnDirector {
    pub fn for_stage(stage: u32) -> Self {
        SpawnDirector {
            timer: 0,
            interval: spawn_interval(stage),
        }
    }

    /// Count one playing frame. Returns a fresh enemy when the interval has
    /// elapsed and no boss is on the field; the timer keeps running during
    /// the boss fight but never fires.
    pub fn tick(
        &mut self,
        boss_active: bool,
        field_width: f32,
        stage: u32,
        rng: &mut impl Rng,
    ) -> Option<Enemy> {
        self.timer += 1;
        if self.timer < self.interval || boss_active {
            return None;
        }
        self.timer = 0;

        let kind = if rng.gen_bool(BASIC_SPAWN_CHANCE) {
            EnemyKind::Basic
        } else {
            EnemyKind::Advanced
        };
        let span = (field_width - 2.0 * SPAWN_MARGIN).max(0.0);
        let x = rng.gen::<f32>() * span + SPAWN_MARGIN;
        debug!("spawning {:?} enemy at x={:.1}", kind, x);
        Some(Enemy::new(x, ENEMY_SPAWN_Y, kind, stage, rng))
    }
}

//! The simulation engine.
//!
//! [`GameSession`] holds every piece of mutable game state; [`Game`] wraps it
//! together with the injected collaborators (RNG, audio sink, high-score
//! store) and runs the per-frame pipeline. All randomness goes through the
//! injected RNG so a seeded game replays identically.

use log::{debug, info, warn};
use rand::Rng;

use crate::audio::{AudioSink, SoundCue};
use crate::collision::{overlaps, HasHitbox};
use crate::config::GameConfig;
use crate::entities::{
    advance_and_prune, Boss, Bullet, BulletOwner, Explosion, GameState, Hostile, Input, Particle,
    PlayerCraft, PowerUp, WeaponType,
};
use crate::error::{Command, GameError};
use crate::persistence::HighScoreStore;
use crate::spawn::{is_stage_clear, should_spawn_boss, stage_enemy_target, SpawnDirector};

pub const STARTING_LIVES: u32 = 3;
pub const SHOOT_COOLDOWN_MICROS: u64 = 100_000;
pub const POWER_UP_DROP_CHANCE: f64 = 0.2;
pub const POWER_UP_SCORE: u32 = 500;
pub const PARTICLES_PER_EXPLOSION: usize = 20;
/// Power-ups are dropped once they fall this far past the bottom edge.
const POWER_UP_EXIT_MARGIN: f32 = 20.0;
/// Ordinary enemies are dropped once their top edge passes this far below the field.
const ENEMY_ESCAPE_MARGIN: f32 = 50.0;

// ── Session state ────────────────────────────────────────────────────────────

/// Everything that changes while playing. Owned exclusively by [`Game`].
#[derive(Clone, Debug)]
pub struct GameSession {
    pub state: GameState,
    pub score: u32,
    pub high_score: u32,
    pub lives: u32,
    pub stage: u32,
    pub stage_score: u32,
    pub stage_enemies_destroyed: u32,
    pub stage_enemy_target: u32,
    pub boss_active: bool,
    pub spawner: SpawnDirector,
    /// Empty after the last life is lost.
    pub player: Option<PlayerCraft>,
    pub bullets: Vec<Bullet>,
    /// Ordinary enemies and the boss, told apart by variant.
    pub enemies: Vec<Hostile>,
    pub power_ups: Vec<PowerUp>,
    pub particles: Vec<Particle>,
    pub explosions: Vec<Explosion>,
    /// Simulated time; advances only on playing frames.
    pub clock_micros: u64,
    pub frame_micros: u64,
    pub last_shot_micros: Option<u64>,
    pub frame: u64,
    pub width: f32,
    pub height: f32,
}

impl GameSession {
    pub fn new(config: &GameConfig, high_score: u32) -> Self {
        let width = config.field_width as f32;
        let height = config.field_height as f32;
        let mut session = GameSession {
            state: GameState::Menu,
            score: 0,
            high_score,
            lives: STARTING_LIVES,
            stage: 1,
            stage_score: 0,
            stage_enemies_destroyed: 0,
            stage_enemy_target: stage_enemy_target(1),
            boss_active: false,
            spawner: SpawnDirector::for_stage(1),
            player: None,
            bullets: Vec::new(),
            enemies: Vec::new(),
            power_ups: Vec::new(),
            particles: Vec::new(),
            explosions: Vec::new(),
            clock_micros: 0,
            frame_micros: config.frame_micros(),
            last_shot_micros: None,
            frame: 0,
            width,
            height,
        };
        session.load_stage(1);
        session
    }

    /// Clear the field and set up stage-local counters. Score and lives
    /// carry over.
    pub fn load_stage(&mut self, stage: u32) {
        self.stage = stage;
        self.bullets.clear();
        self.enemies.clear();
        self.power_ups.clear();
        self.particles.clear();
        self.explosions.clear();
        self.stage_enemies_destroyed = 0;
        self.stage_enemy_target = stage_enemy_target(stage);
        self.boss_active = false;
        self.spawner = SpawnDirector::for_stage(stage);
        self.player = Some(PlayerCraft::spawn(self.width, self.height));
        self.last_shot_micros = None;
    }

    /// Back to stage 1 with a full set of lives.
    pub fn reset(&mut self) {
        self.score = 0;
        self.lives = STARTING_LIVES;
        self.stage_score = 0;
        self.load_stage(1);
    }

    pub fn boss(&self) -> Option<&Boss> {
        self.enemies.iter().find_map(|h| match h {
            Hostile::Boss(b) => Some(b),
            Hostile::Enemy(_) => None,
        })
    }
}

// ── Render snapshot ──────────────────────────────────────────────────────────

/// Read-only view handed to the presentation layer after each frame.
#[derive(Clone, Debug)]
pub struct Snapshot<'a> {
    pub state: GameState,
    pub score: u32,
    pub high_score: u32,
    pub lives: u32,
    pub stage: u32,
    pub stage_score: u32,
    pub stage_enemies_destroyed: u32,
    pub stage_enemy_target: u32,
    pub weapon: Option<WeaponType>,
    pub power_level: Option<u8>,
    /// Boss health in 0..=1 while a boss is on the field.
    pub boss_health: Option<f32>,
    pub player: Option<&'a PlayerCraft>,
    pub bullets: &'a [Bullet],
    pub enemies: &'a [Hostile],
    pub power_ups: &'a [PowerUp],
    pub particles: &'a [Particle],
    pub explosions: &'a [Explosion],
    pub width: f32,
    pub height: f32,
}

// ── Engine ───────────────────────────────────────────────────────────────────

pub struct Game<R: Rng> {
    pub session: GameSession,
    rng: R,
    audio: Box<dyn AudioSink>,
    store: Box<dyn HighScoreStore>,
}

impl<R: Rng> Game<R> {
    /// Build a game in the menu state. The high score is read from `store`
    /// once, here.
    pub fn new(
        config: &GameConfig,
        rng: R,
        audio: Box<dyn AudioSink>,
        store: Box<dyn HighScoreStore>,
    ) -> Self {
        let high_score = store.load().unwrap_or_else(|e| {
            warn!("could not read high score, starting from 0: {e}");
            0
        });
        Game {
            session: GameSession::new(config, high_score),
            rng,
            audio,
            store,
        }
    }

    pub fn state(&self) -> GameState {
        self.session.state
    }

    // ── Lifecycle commands ───────────────────────────────────────────────────

    /// Menu → Playing.
    pub fn start(&mut self) -> Result<(), GameError> {
        self.require(Command::Start, |s| s == GameState::Menu)?;
        self.session.reset();
        self.session.state = GameState::Playing;
        info!("game started");
        Ok(())
    }

    /// Playing ⇄ Paused.
    pub fn toggle_pause(&mut self) -> Result<(), GameError> {
        self.session.state = match self.session.state {
            GameState::Playing => GameState::Paused,
            GameState::Paused => GameState::Playing,
            from => {
                return Err(GameError::InvalidTransition {
                    from,
                    command: Command::TogglePause,
                })
            }
        };
        info!("game {:?}", self.session.state);
        Ok(())
    }

    /// Any in-game state → a fresh stage 1.
    pub fn restart(&mut self) -> Result<(), GameError> {
        self.require(Command::Restart, |s| s != GameState::Menu)?;
        self.session.reset();
        self.session.state = GameState::Playing;
        info!("game restarted");
        Ok(())
    }

    /// StageClear → Playing on the following stage.
    pub fn next_stage(&mut self) -> Result<(), GameError> {
        self.require(Command::NextStage, |s| s == GameState::StageClear)?;
        let stage = self.session.stage + 1;
        self.session.stage_score = 0;
        self.session.load_stage(stage);
        self.session.state = GameState::Playing;
        self.audio.play(SoundCue::PowerUp);
        info!("entering stage {stage}");
        Ok(())
    }

    fn require(&self, command: Command, allowed: impl Fn(GameState) -> bool) -> Result<(), GameError> {
        let from = self.session.state;
        if allowed(from) {
            Ok(())
        } else {
            Err(GameError::InvalidTransition { from, command })
        }
    }

    // ── Per-frame pipeline ───────────────────────────────────────────────────

    /// Advance the simulation by one frame. Does nothing unless playing.
    pub fn advance_frame(&mut self, input: &Input) {
        if self.session.state != GameState::Playing {
            return;
        }
        self.session.frame += 1;
        self.session.clock_micros += self.session.frame_micros;

        let (width, height) = (self.session.width, self.session.height);
        if let Some(player) = self.session.player.as_mut() {
            player.advance(input, width, height);
        }
        if input.firing {
            self.try_fire();
        }

        self.update_bullets();
        if self.session.state != GameState::Playing {
            return;
        }

        self.update_enemies();
        self.run_spawner();
        self.update_power_ups();
        advance_and_prune(&mut self.session.particles);
        advance_and_prune(&mut self.session.explosions);
        self.check_stage_progress();
    }

    fn try_fire(&mut self) {
        let Some(player) = self.session.player.as_ref() else {
            return;
        };
        let now = self.session.clock_micros;
        let ready = self
            .session
            .last_shot_micros
            .map_or(true, |last| now - last > SHOOT_COOLDOWN_MICROS);
        if !ready {
            return;
        }
        let volley = player.fire();
        if volley.is_empty() {
            return;
        }
        self.session.bullets.extend(volley);
        self.session.last_shot_micros = Some(now);
        self.audio.play(SoundCue::Shoot);
    }

    /// Move every bullet and resolve its hits. Hits are recorded against
    /// per-entity flags first and the collections are compacted afterwards,
    /// so no index shifts while the pass is running.
    fn update_bullets(&mut self) {
        let mut bullets = std::mem::take(&mut self.session.bullets);
        let mut spent = vec![false; bullets.len()];
        let mut destroyed = vec![false; self.session.enemies.len()];
        let (width, height) = (self.session.width, self.session.height);

        for (bi, bullet) in bullets.iter_mut().enumerate() {
            bullet.advance();

            match bullet.owner {
                BulletOwner::Player => {
                    // Newest hostile first; one target per bullet.
                    let target = (0..self.session.enemies.len())
                        .rev()
                        .find(|&ei| !destroyed[ei] && overlaps(&*bullet, &self.session.enemies[ei]));
                    if let Some(ei) = target {
                        spent[bi] = true;
                        if self.session.enemies[ei].apply_damage(bullet.damage) {
                            destroyed[ei] = true;
                            self.on_hostile_destroyed(ei);
                        } else {
                            self.audio.play(SoundCue::Hit);
                        }
                        continue;
                    }
                }
                BulletOwner::Enemy => {
                    let hit = self
                        .session
                        .player
                        .as_ref()
                        .is_some_and(|player| overlaps(&*bullet, player));
                    if hit {
                        spent[bi] = true;
                        self.on_player_hit();
                        continue;
                    }
                }
            }

            if !bullet.in_field(width, height) {
                spent[bi] = true;
            }
        }

        assert_eq!(
            destroyed.len(),
            self.session.enemies.len(),
            "hostile roster changed during the collision pass"
        );
        let mut flags = destroyed.into_iter();
        self.session.enemies.retain(|_| !flags.next().unwrap_or(false));

        // Nothing else may have queued bullets during the pass.
        debug_assert!(self.session.bullets.is_empty());
        self.session.bullets = bullets
            .into_iter()
            .zip(spent)
            .filter_map(|(bullet, spent)| (!spent).then_some(bullet))
            .collect();
    }

    fn on_hostile_destroyed(&mut self, index: usize) {
        let hostile = &self.session.enemies[index];
        let bounds = hostile.hitbox();
        let points = hostile.points();
        let was_boss = hostile.is_boss();

        let (cx, cy) = bounds.centre();
        self.create_explosion(cx, cy);
        self.session.score += points;
        self.session.stage_score += points;
        self.session.stage_enemies_destroyed += 1;

        if self.rng.gen_bool(POWER_UP_DROP_CHANCE) {
            let weapon = WeaponType::ALL[self.rng.gen_range(0..WeaponType::ALL.len())];
            self.session
                .power_ups
                .push(PowerUp::new(bounds.x, bounds.y, weapon));
            debug!("{} power-up dropped at ({:.0}, {:.0})", weapon.name(), bounds.x, bounds.y);
        }

        self.audio.play(SoundCue::Explosion);
        if was_boss {
            info!("boss destroyed on stage {}", self.session.stage);
        } else {
            debug!(
                "enemy destroyed (+{points}), {}/{} this stage",
                self.session.stage_enemies_destroyed, self.session.stage_enemy_target
            );
        }
    }

    fn on_player_hit(&mut self) {
        let Some(player) = self.session.player.take() else {
            return;
        };
        let (cx, cy) = player.centre();
        self.session.lives = self.session.lives.saturating_sub(1);
        self.create_explosion(cx, cy);
        self.audio.play(SoundCue::PlayerHit);

        if self.session.lives == 0 {
            self.game_over();
        } else {
            debug!("player hit, {} lives left", self.session.lives);
            self.session.player = Some(PlayerCraft::spawn(self.session.width, self.session.height));
        }
    }

    fn update_enemies(&mut self) {
        let session = &mut self.session;
        for hostile in session.enemies.iter_mut() {
            hostile.advance(session.player.as_ref(), &mut session.bullets, &mut self.rng);
        }
        let limit = session.height + ENEMY_ESCAPE_MARGIN;
        session
            .enemies
            .retain(|h| h.is_boss() || h.hitbox().y <= limit);
    }

    fn run_spawner(&mut self) {
        let session = &mut self.session;
        if let Some(enemy) =
            session
                .spawner
                .tick(session.boss_active, session.width, session.stage, &mut self.rng)
        {
            session.enemies.push(Hostile::Enemy(enemy));
        }
    }

    fn update_power_ups(&mut self) {
        let mut power_ups = std::mem::take(&mut self.session.power_ups);
        let limit = self.session.height + POWER_UP_EXIT_MARGIN;

        power_ups.retain_mut(|power_up| {
            power_up.advance();
            if let Some(player) = self.session.player.as_mut() {
                if overlaps(&*power_up, &*player) {
                    player.collect_power_up(power_up.weapon);
                    self.session.score += POWER_UP_SCORE;
                    self.session.stage_score += POWER_UP_SCORE;
                    self.audio.play(SoundCue::PowerUp);
                    debug!(
                        "picked up {}, power level {}",
                        power_up.weapon.name(),
                        player.power_level
                    );
                    return false;
                }
            }
            power_up.y < limit
        });

        self.session.power_ups = power_ups;
    }

    fn check_stage_progress(&mut self) {
        let session = &self.session;
        if should_spawn_boss(
            session.stage_enemies_destroyed,
            session.stage_enemy_target,
            session.boss_active,
            session.enemies.is_empty(),
        ) {
            self.spawn_boss();
        }

        if is_stage_clear(self.session.boss_active, self.session.enemies.is_empty()) {
            self.stage_clear();
        }
    }

    fn spawn_boss(&mut self) {
        let boss = Boss::new(self.session.width, self.session.stage);
        info!("boss incoming, health {}", boss.health);
        self.session.boss_active = true;
        self.session.enemies.push(Hostile::Boss(boss));
        self.audio.play(SoundCue::Boss);
    }

    fn create_explosion(&mut self, x: f32, y: f32) {
        self.session.explosions.push(Explosion::new(x, y));
        for _ in 0..PARTICLES_PER_EXPLOSION {
            let particle = Particle::new(x, y, &mut self.rng);
            self.session.particles.push(particle);
        }
    }

    fn stage_clear(&mut self) {
        self.session.state = GameState::StageClear;
        info!(
            "stage {} clear, stage score {}",
            self.session.stage, self.session.stage_score
        );
        if self.session.stage_score > self.session.high_score {
            self.session.high_score = self.session.stage_score;
            if let Err(e) = self.store.save(self.session.high_score) {
                warn!("could not save high score: {e}");
            }
        }
    }

    fn game_over(&mut self) {
        self.session.state = GameState::GameOver;
        self.audio.play(SoundCue::GameOver);
        info!(
            "game over on stage {} with {} points",
            self.session.stage, self.session.score
        );
    }

    // ── Presentation ─────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Snapshot<'_> {
        let s = &self.session;
        Snapshot {
            state: s.state,
            score: s.score,
            high_score: s.high_score,
            lives: s.lives,
            stage: s.stage,
            stage_score: s.stage_score,
            stage_enemies_destroyed: s.stage_enemies_destroyed,
            stage_enemy_target: s.stage_enemy_target,
            weapon: s.player.as_ref().map(|p| p.weapon),
            power_level: s.player.as_ref().map(|p| p.power_level),
            boss_health: s.boss().map(Boss::health_ratio),
            player: s.player.as_ref(),
            bullets: &s.bullets,
            enemies: &s.enemies,
            power_ups: &s.power_ups,
            particles: &s.particles,
            explosions: &s.explosions,
            width: s.width,
            height: s.height,
        }
    }
}

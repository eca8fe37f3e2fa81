//! Game entity types and their per-frame advance rules.
//!
//! Positions are in field pixels with the origin at the top-left corner and
//! y growing downward. Nothing here knows about the session: advance rules
//! receive whatever they need (the player, a bullet sink, the RNG) from the
//! engine in `compute`.

use std::f32::consts::TAU;

use rand::Rng;

use crate::collision::{HasHitbox, Rect};

// ── Session-level enums & input ──────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Menu,
    Playing,
    Paused,
    GameOver,
    StageClear,
}

/// Normalized controls, refreshed once per frame by the input adapter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Input {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub firing: bool,
}

// ── Weapons & bullets ────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeaponType {
    Vulcan,
    Laser,
    Plasma,
    Missile,
}

impl WeaponType {
    pub const ALL: [WeaponType; 4] = [
        WeaponType::Vulcan,
        WeaponType::Laser,
        WeaponType::Plasma,
        WeaponType::Missile,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WeaponType::Vulcan => "vulcan",
            WeaponType::Laser => "laser",
            WeaponType::Plasma => "plasma",
            WeaponType::Missile => "missile",
        }
    }

    /// Projectile (width, height) for this weapon.
    pub fn bullet_size(self) -> (f32, f32) {
        match self {
            WeaponType::Vulcan => (4.0, 8.0),
            WeaponType::Laser => (2.0, 20.0),
            WeaponType::Plasma => (6.0, 6.0),
            WeaponType::Missile => (8.0, 12.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulletOwner {
    Player,
    Enemy,
}

pub const ENEMY_BULLET_SIZE: (f32, f32) = (4.0, 8.0);
/// Bullets survive while inside the field grown by this much on every side.
pub const BULLET_FIELD_SLACK: f32 = 10.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub width: f32,
    pub height: f32,
    pub owner: BulletOwner,
    /// `None` for enemy fire.
    pub weapon: Option<WeaponType>,
    pub damage: i32,
}

impl Bullet {
    pub fn player(x: f32, y: f32, dx: f32, dy: f32, weapon: WeaponType, power: u8) -> Self {
        let (width, height) = weapon.bullet_size();
        Bullet {
            x,
            y,
            dx,
            dy,
            width,
            height,
            owner: BulletOwner::Player,
            weapon: Some(weapon),
            damage: power as i32 * 10,
        }
    }

    pub fn enemy(x: f32, y: f32, dx: f32, dy: f32) -> Self {
        let (width, height) = ENEMY_BULLET_SIZE;
        Bullet {
            x,
            y,
            dx,
            dy,
            width,
            height,
            owner: BulletOwner::Enemy,
            weapon: None,
            damage: 10,
        }
    }

    /// One Euler step. Bounds are the engine's business.
    pub fn advance(&mut self) {
        self.x += self.dx;
        self.y += self.dy;
    }

    pub fn in_field(&self, width: f32, height: f32) -> bool {
        self.x > -BULLET_FIELD_SLACK
            && self.x < width + BULLET_FIELD_SLACK
            && self.y > -BULLET_FIELD_SLACK
            && self.y < height + BULLET_FIELD_SLACK
    }
}

impl HasHitbox for Bullet {
    fn hitbox(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

// ── Player ───────────────────────────────────────────────────────────────────

pub const PLAYER_WIDTH: f32 = 30.0;
pub const PLAYER_HEIGHT: f32 = 40.0;
pub const PLAYER_SPEED: f32 = 5.0;
/// Distance the craft keeps from every field edge.
pub const FIELD_MARGIN: f32 = 20.0;
/// Spawn row, measured up from the bottom edge.
pub const PLAYER_SPAWN_OFFSET: f32 = 80.0;
pub const MAX_POWER_LEVEL: u8 = 3;

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerCraft {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub weapon: WeaponType,
    /// 1..=MAX_POWER_LEVEL
    pub power_level: u8,
}

impl PlayerCraft {
    pub fn new(x: f32, y: f32) -> Self {
        PlayerCraft {
            x,
            y,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            speed: PLAYER_SPEED,
            weapon: WeaponType::Vulcan,
            power_level: 1,
        }
    }

    /// A fresh craft at the standard spawn point for a field.
    pub fn spawn(field_width: f32, field_height: f32) -> Self {
        PlayerCraft::new(field_width / 2.0, field_height - PLAYER_SPAWN_OFFSET)
    }

    /// Move one step per held direction, clamped inside the field margins.
    pub fn advance(&mut self, input: &Input, field_width: f32, field_height: f32) {
        let max_x = (field_width - self.width - FIELD_MARGIN).max(FIELD_MARGIN);
        let max_y = (field_height - self.height - FIELD_MARGIN).max(FIELD_MARGIN);

        if input.up && self.y > FIELD_MARGIN {
            self.y = (self.y - self.speed).max(FIELD_MARGIN);
        }
        if input.down && self.y < max_y {
            self.y = (self.y + self.speed).min(max_y);
        }
        if input.left && self.x > FIELD_MARGIN {
            self.x = (self.x - self.speed).max(FIELD_MARGIN);
        }
        if input.right && self.x < max_x {
            self.x = (self.x + self.speed).min(max_x);
        }
    }

    /// The volley for the current weapon and power level. The caller owns
    /// the cooldown.
    pub fn fire(&self) -> Vec<Bullet> {
        let cx = self.x + self.width / 2.0;
        let top = self.y;
        let power = self.power_level;
        let shot = |x: f32, y: f32, dx: f32, dy: f32| {
            Bullet::player(x, y, dx, dy, self.weapon, power)
        };

        let mut volley = Vec::with_capacity(4);
        match self.weapon {
            WeaponType::Vulcan => {
                volley.push(shot(cx - 2.0, top, 0.0, -10.0));
                if power >= 2 {
                    volley.push(shot(cx - 8.0, top + 5.0, -1.0, -10.0));
                    volley.push(shot(cx + 8.0, top + 5.0, 1.0, -10.0));
                }
            }
            WeaponType::Laser => {
                volley.push(shot(cx, top, 0.0, -15.0));
            }
            WeaponType::Plasma => {
                volley.push(shot(cx - 5.0, top, -2.0, -8.0));
                volley.push(shot(cx + 5.0, top, 2.0, -8.0));
                if power >= 2 {
                    volley.push(shot(cx, top, 0.0, -12.0));
                }
            }
            WeaponType::Missile => {
                volley.push(shot(cx - 10.0, top, -2.0, -6.0));
                volley.push(shot(cx + 10.0, top, 2.0, -6.0));
            }
        }
        volley
    }

    pub fn collect_power_up(&mut self, weapon: WeaponType) {
        self.weapon = weapon;
        self.power_level = (self.power_level + 1).min(MAX_POWER_LEVEL);
    }

    pub fn centre(&self) -> (f32, f32) {
        self.hitbox().centre()
    }
}

impl HasHitbox for PlayerCraft {
    fn hitbox(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

// ── Enemies ──────────────────────────────────────────────────────────────────

pub const ENEMY_SPAWN_Y: f32 = -50.0;
pub const ENEMY_BULLET_SPEED: f32 = 5.0;
pub const ENEMY_FIRE_CHANCE: f64 = 0.3;
const ZIGZAG_STEP: f32 = 0.1;
const ZIGZAG_AMPLITUDE: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyKind {
    Basic,
    Advanced,
}

impl EnemyKind {
    pub fn size(self) -> f32 {
        match self {
            EnemyKind::Basic => 25.0,
            EnemyKind::Advanced => 35.0,
        }
    }

    pub fn health(self) -> i32 {
        match self {
            EnemyKind::Basic => 10,
            EnemyKind::Advanced => 20,
        }
    }

    pub fn points(self) -> u32 {
        match self {
            EnemyKind::Basic => 100,
            EnemyKind::Advanced => 200,
        }
    }

    /// Descent speed, rising with the stage number.
    pub fn speed(self, stage: u32) -> f32 {
        let stage = stage as f32;
        match self {
            EnemyKind::Basic => 1.0 + 0.2 * stage,
            EnemyKind::Advanced => 1.5 + 0.3 * stage,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MovePattern {
    Straight,
    /// Sine weave; `phase` advances every frame.
    Zigzag { phase: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: EnemyKind,
    pub health: i32,
    pub points: u32,
    pub speed: f32,
    pub pattern: MovePattern,
    pub shoot_timer: u32,
    pub shoot_interval: u32,
}

impl Enemy {
    pub fn new(x: f32, y: f32, kind: EnemyKind, stage: u32, rng: &mut impl Rng) -> Self {
        let shoot_interval = rng.gen_range(60..120);
        let pattern = if rng.gen_bool(0.5) {
            MovePattern::Straight
        } else {
            MovePattern::Zigzag {
                phase: rng.gen_range(0.0..TAU),
            }
        };
        Enemy {
            x,
            y,
            width: kind.size(),
            height: kind.size(),
            kind,
            health: kind.health(),
            points: kind.points(),
            speed: kind.speed(stage),
            pattern,
            shoot_timer: 0,
            shoot_interval,
        }
    }

    /// Move one frame and maybe drop a bullet straight down. Enemies never
    /// fire while the player slot is empty.
    pub fn advance(
        &mut self,
        player: Option<&PlayerCraft>,
        bullets: &mut Vec<Bullet>,
        rng: &mut impl Rng,
    ) {
        self.y += self.speed;
        if let MovePattern::Zigzag { phase } = &mut self.pattern {
            self.x += phase.sin() * ZIGZAG_AMPLITUDE;
            *phase += ZIGZAG_STEP;
        }

        self.shoot_timer += 1;
        if self.shoot_timer >= self.shoot_interval {
            self.shoot_timer = 0;
            if player.is_some() && rng.gen_bool(ENEMY_FIRE_CHANCE) {
                bullets.push(Bullet::enemy(
                    self.x + self.width / 2.0,
                    self.y + self.height,
                    0.0,
                    ENEMY_BULLET_SPEED,
                ));
            }
        }
    }
}

// ── Boss ─────────────────────────────────────────────────────────────────────

pub const BOSS_WIDTH: f32 = 120.0;
pub const BOSS_HEIGHT: f32 = 80.0;
pub const BOSS_SPAWN_Y: f32 = -100.0;
/// Row where the boss stops descending and starts to sway.
pub const BOSS_HOLD_Y: f32 = 100.0;
pub const BOSS_POINTS: u32 = 1000;
const BOSS_SPEED: f32 = 0.5;
const BOSS_SWAY_STEP: f32 = 0.05;
const BOSS_SWAY_AMPLITUDE: f32 = 2.0;
const BOSS_SPREAD_INTERVAL: u32 = 40;
const BOSS_RAPID_INTERVAL: u32 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BossPhase {
    /// Five-way spread.
    Normal,
    /// Fast single bolts; entered below half health and never left.
    Enraged,
}

impl BossPhase {
    pub fn number(self) -> u8 {
        match self {
            BossPhase::Normal => 1,
            BossPhase::Enraged => 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Boss {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub health: i32,
    pub max_health: i32,
    pub points: u32,
    pub speed: f32,
    pub shoot_timer: u32,
    pub move_phase: f32,
    pub phase: BossPhase,
}

impl Boss {
    pub fn new(field_width: f32, stage: u32) -> Self {
        let health = 100 + 50 * stage as i32;
        Boss {
            x: field_width / 2.0 - BOSS_WIDTH / 2.0,
            y: BOSS_SPAWN_Y,
            width: BOSS_WIDTH,
            height: BOSS_HEIGHT,
            health,
            max_health: health,
            points: BOSS_POINTS,
            speed: BOSS_SPEED,
            shoot_timer: 0,
            move_phase: 0.0,
            phase: BossPhase::Normal,
        }
    }

    /// One-way latch into the enraged phase.
    pub fn update_phase(&mut self) {
        if self.phase == BossPhase::Normal && (self.health as f32) < self.max_health as f32 * 0.5 {
            self.phase = BossPhase::Enraged;
        }
    }

    pub fn health_ratio(&self) -> f32 {
        (self.health.max(0) as f32 / self.max_health as f32).clamp(0.0, 1.0)
    }

    fn fire_interval(&self) -> u32 {
        match self.phase {
            BossPhase::Normal => BOSS_SPREAD_INTERVAL,
            BossPhase::Enraged => BOSS_RAPID_INTERVAL,
        }
    }

    pub fn advance(&mut self, player: Option<&PlayerCraft>, bullets: &mut Vec<Bullet>) {
        self.y += self.speed;
        if self.y > BOSS_HOLD_Y {
            self.y = BOSS_HOLD_Y;
            self.x += self.move_phase.sin() * BOSS_SWAY_AMPLITUDE;
            self.move_phase += BOSS_SWAY_STEP;
        }

        self.update_phase();

        self.shoot_timer += 1;
        if self.shoot_timer >= self.fire_interval() && player.is_some() {
            self.shoot_timer = 0;
            let cx = self.x + self.width / 2.0;
            let bottom = self.y + self.height;
            match self.phase {
                BossPhase::Normal => {
                    for i in -2i8..=2 {
                        let i = i as f32;
                        bullets.push(Bullet::enemy(cx + i * 15.0, bottom, i * 2.0, 5.0));
                    }
                }
                BossPhase::Enraged => {
                    bullets.push(Bullet::enemy(cx, bottom, 0.0, 8.0));
                }
            }
        }
    }
}

// ── Hostiles: enemies and the boss share one roster ──────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum Hostile {
    Enemy(Enemy),
    Boss(Boss),
}

impl Hostile {
    pub fn is_boss(&self) -> bool {
        matches!(self, Hostile::Boss(_))
    }

    pub fn health(&self) -> i32 {
        match self {
            Hostile::Enemy(e) => e.health,
            Hostile::Boss(b) => b.health,
        }
    }

    pub fn points(&self) -> u32 {
        match self {
            Hostile::Enemy(e) => e.points,
            Hostile::Boss(b) => b.points,
        }
    }

    /// Subtract `damage`; returns true once health has dropped to zero or below.
    pub fn apply_damage(&mut self, damage: i32) -> bool {
        match self {
            Hostile::Enemy(e) => {
                e.health -= damage;
                e.health <= 0
            }
            Hostile::Boss(b) => {
                b.health -= damage;
                b.update_phase();
                b.health <= 0
            }
        }
    }

    pub fn advance(
        &mut self,
        player: Option<&PlayerCraft>,
        bullets: &mut Vec<Bullet>,
        rng: &mut impl Rng,
    ) {
        match self {
            Hostile::Enemy(e) => e.advance(player, bullets, rng),
            Hostile::Boss(b) => b.advance(player, bullets),
        }
    }
}

impl HasHitbox for Hostile {
    fn hitbox(&self) -> Rect {
        match self {
            Hostile::Enemy(e) => Rect::new(e.x, e.y, e.width, e.height),
            Hostile::Boss(b) => Rect::new(b.x, b.y, b.width, b.height),
        }
    }
}

// ── Power-ups ────────────────────────────────────────────────────────────────

pub const POWER_UP_SIZE: f32 = 20.0;
const POWER_UP_FALL_SPEED: f32 = 2.0;
const POWER_UP_FLOAT_STEP: f32 = 0.1;
const POWER_UP_FLOAT_AMPLITUDE: f32 = 0.5;

#[derive(Clone, Debug, PartialEq)]
pub struct PowerUp {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub weapon: WeaponType,
    pub speed: f32,
    pub float_phase: f32,
}

impl PowerUp {
    pub fn new(x: f32, y: f32, weapon: WeaponType) -> Self {
        PowerUp {
            x,
            y,
            width: POWER_UP_SIZE,
            height: POWER_UP_SIZE,
            weapon,
            speed: POWER_UP_FALL_SPEED,
            float_phase: 0.0,
        }
    }

    pub fn advance(&mut self) {
        self.y += self.speed;
        self.float_phase += POWER_UP_FLOAT_STEP;
        self.x += self.float_phase.sin() * POWER_UP_FLOAT_AMPLITUDE;
    }
}

impl HasHitbox for PowerUp {
    fn hitbox(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

// ── Visual effects ───────────────────────────────────────────────────────────

/// Short-lived entities that count down and disappear.
pub trait Ephemeral {
    fn tick(&mut self);
    fn is_alive(&self) -> bool;
}

/// Advance every effect once and drop the ones that have expired.
pub fn advance_and_prune<T: Ephemeral>(effects: &mut Vec<T>) {
    for effect in effects.iter_mut() {
        effect.tick();
    }
    effects.retain(|e| e.is_alive());
}

pub const PARTICLE_LIFE: u32 = 30;
const PARTICLE_MAX_SPEED: f32 = 4.0;
const PARTICLE_DRAG: f32 = 0.98;

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub life: u32,
    /// Fire palette, 0..60 degrees.
    pub hue: f32,
}

impl Particle {
    pub fn new(x: f32, y: f32, rng: &mut impl Rng) -> Self {
        Particle {
            x,
            y,
            dx: rng.gen_range(-PARTICLE_MAX_SPEED..PARTICLE_MAX_SPEED),
            dy: rng.gen_range(-PARTICLE_MAX_SPEED..PARTICLE_MAX_SPEED),
            life: PARTICLE_LIFE,
            hue: rng.gen_range(0.0..60.0),
        }
    }
}

impl Ephemeral for Particle {
    fn tick(&mut self) {
        self.x += self.dx;
        self.y += self.dy;
        self.dx *= PARTICLE_DRAG;
        self.dy *= PARTICLE_DRAG;
        self.life = self.life.saturating_sub(1);
    }

    fn is_alive(&self) -> bool {
        self.life > 0
    }
}

pub const EXPLOSION_LIFE: u32 = 20;
const EXPLOSION_BASE_RADIUS: f32 = 10.0;
const EXPLOSION_GROWTH: f32 = 2.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Explosion {
    pub x: f32,
    pub y: f32,
    pub life: u32,
    pub max_life: u32,
    pub radius: f32,
}

impl Explosion {
    pub fn new(x: f32, y: f32) -> Self {
        Explosion {
            x,
            y,
            life: EXPLOSION_LIFE,
            max_life: EXPLOSION_LIFE,
            radius: EXPLOSION_BASE_RADIUS,
        }
    }
}

impl Ephemeral for Explosion {
    fn tick(&mut self) {
        self.life = self.life.saturating_sub(1);
        self.radius = EXPLOSION_BASE_RADIUS + (self.max_life - self.life) as f32 * EXPLOSION_GROWTH;
    }

    fn is_alive(&self) -> bool {
        self.life > 0
    }
}

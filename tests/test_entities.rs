use raiden_shooter::audio::SoundCue;
use raiden_shooter::collision::HasHitbox;
use raiden_shooter::entities::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

const EPSILON: f32 = 1e-4;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn craft(weapon: WeaponType, power_level: u8) -> PlayerCraft {
    PlayerCraft {
        weapon,
        power_level,
        ..PlayerCraft::new(100.0, 300.0)
    }
}

fn straight_enemy(kind: EnemyKind) -> Enemy {
    let mut enemy = Enemy::new(100.0, 50.0, kind, 1, &mut seeded_rng());
    enemy.pattern = MovePattern::Straight;
    enemy
}

// ── PlayerCraft::fire ─────────────────────────────────────────────────────────

#[test]
fn vulcan_level_one_is_single_centre_shot() {
    let volley = craft(WeaponType::Vulcan, 1).fire();
    assert_eq!(volley.len(), 1);
    let b = &volley[0];
    assert_eq!((b.x, b.y), (113.0, 300.0)); // cx = 115, minus 2
    assert_eq!((b.dx, b.dy), (0.0, -10.0));
    assert_eq!(b.owner, BulletOwner::Player);
    assert_eq!(b.damage, 10);
}

#[test]
fn vulcan_level_two_adds_diagonals() {
    let volley = craft(WeaponType::Vulcan, 2).fire();
    assert_eq!(volley.len(), 3);
    assert_eq!((volley[1].x, volley[1].y, volley[1].dx), (107.0, 305.0, -1.0));
    assert_eq!((volley[2].x, volley[2].y, volley[2].dx), (123.0, 305.0, 1.0));
    assert!(volley.iter().all(|b| b.damage == 20));
}

#[test]
fn laser_is_one_fast_narrow_bolt_at_every_level() {
    for level in 1..=3 {
        let volley = craft(WeaponType::Laser, level).fire();
        assert_eq!(volley.len(), 1);
        assert_eq!(volley[0].dy, -15.0);
        assert_eq!((volley[0].width, volley[0].height), (2.0, 20.0));
        assert_eq!(volley[0].damage, level as i32 * 10);
    }
}

#[test]
fn plasma_diverges_and_adds_centre_at_level_two() {
    let low = craft(WeaponType::Plasma, 1).fire();
    assert_eq!(low.len(), 2);
    assert_eq!((low[0].dx, low[0].dy), (-2.0, -8.0));
    assert_eq!((low[1].dx, low[1].dy), (2.0, -8.0));

    let high = craft(WeaponType::Plasma, 2).fire();
    assert_eq!(high.len(), 3);
    assert_eq!((high[2].x, high[2].dx, high[2].dy), (115.0, 0.0, -12.0));
}

#[test]
fn missile_fires_two_outward() {
    let volley = craft(WeaponType::Missile, 3).fire();
    assert_eq!(volley.len(), 2);
    assert_eq!((volley[0].x, volley[0].dx), (105.0, -2.0));
    assert_eq!((volley[1].x, volley[1].dx), (125.0, 2.0));
    assert!(volley.iter().all(|b| b.dy == -6.0 && b.damage == 30));
    assert!(volley.iter().all(|b| b.weapon == Some(WeaponType::Missile)));
}

// ── PlayerCraft::collect_power_up / advance ───────────────────────────────────

#[test]
fn collect_power_up_switches_weapon_and_caps_level() {
    let mut p = craft(WeaponType::Vulcan, 1);
    p.collect_power_up(WeaponType::Laser);
    assert_eq!((p.weapon, p.power_level), (WeaponType::Laser, 2));
    p.collect_power_up(WeaponType::Plasma);
    p.collect_power_up(WeaponType::Missile);
    assert_eq!((p.weapon, p.power_level), (WeaponType::Missile, 3));
}

#[test]
fn advance_moves_by_speed() {
    let mut p = PlayerCraft::new(100.0, 300.0);
    p.advance(&Input { left: true, up: true, ..Input::default() }, 480.0, 640.0);
    assert_eq!((p.x, p.y), (95.0, 295.0));
}

#[test]
fn advance_clamps_to_margins() {
    let mut p = PlayerCraft::new(22.0, 22.0);
    let up_left = Input { left: true, up: true, ..Input::default() };
    p.advance(&up_left, 480.0, 640.0);
    assert_eq!((p.x, p.y), (FIELD_MARGIN, FIELD_MARGIN));
    p.advance(&up_left, 480.0, 640.0);
    assert_eq!((p.x, p.y), (FIELD_MARGIN, FIELD_MARGIN));

    let mut p = PlayerCraft::new(428.0, 578.0);
    let down_right = Input { right: true, down: true, ..Input::default() };
    p.advance(&down_right, 480.0, 640.0);
    assert_eq!((p.x, p.y), (430.0, 580.0)); // 480-30-20, 640-40-20
}

#[test]
fn advance_ignores_fire_flag() {
    let mut p = PlayerCraft::new(100.0, 300.0);
    p.advance(&Input { firing: true, ..Input::default() }, 480.0, 640.0);
    assert_eq!((p.x, p.y), (100.0, 300.0));
}

// ── Bullet ────────────────────────────────────────────────────────────────────

#[test]
fn bullet_position_is_linear_in_frames() {
    let mut b = Bullet::player(100.0, 400.0, 2.0, -10.0, WeaponType::Plasma, 1);
    for _ in 0..7 {
        b.advance();
    }
    assert_eq!((b.x, b.y), (114.0, 330.0));
}

#[test]
fn bullet_field_bounds_have_slack() {
    let inside = Bullet::enemy(-9.0, 649.0, 0.0, 5.0);
    let outside = Bullet::enemy(240.0, 650.0, 0.0, 5.0);
    assert!(inside.in_field(480.0, 640.0));
    assert!(!outside.in_field(480.0, 640.0));
}

#[test]
fn bullet_sizes_follow_weapon() {
    assert_eq!(WeaponType::Vulcan.bullet_size(), (4.0, 8.0));
    assert_eq!(WeaponType::Plasma.bullet_size(), (6.0, 6.0));
    assert_eq!(WeaponType::Missile.bullet_size(), (8.0, 12.0));
    let enemy = Bullet::enemy(0.0, 0.0, 0.0, 5.0);
    assert_eq!((enemy.width, enemy.height), ENEMY_BULLET_SIZE);
    assert_eq!(enemy.weapon, None);
}

// ── Enemy ─────────────────────────────────────────────────────────────────────

#[test]
fn enemy_kind_stats() {
    let basic = straight_enemy(EnemyKind::Basic);
    assert_eq!((basic.width, basic.health, basic.points), (25.0, 10, 100));
    assert!(approx_eq(basic.speed, 1.2));

    let advanced = straight_enemy(EnemyKind::Advanced);
    assert_eq!((advanced.width, advanced.health, advanced.points), (35.0, 20, 200));
    assert!(approx_eq(advanced.speed, 1.8));
    assert!(approx_eq(EnemyKind::Advanced.speed(2), 2.1));
}

#[test]
fn enemy_shoot_interval_in_range() {
    let mut rng = seeded_rng();
    for _ in 0..200 {
        let e = Enemy::new(0.0, ENEMY_SPAWN_Y, EnemyKind::Basic, 1, &mut rng);
        assert!((60..120).contains(&e.shoot_interval));
    }
}

#[test]
fn straight_enemy_descends_only() {
    let mut e = straight_enemy(EnemyKind::Basic);
    e.shoot_interval = u32::MAX;
    let mut bullets = Vec::new();
    e.advance(None, &mut bullets, &mut seeded_rng());
    assert_eq!(e.x, 100.0);
    assert!(approx_eq(e.y, 51.2));
}

#[test]
fn zigzag_enemy_weaves() {
    let mut e = straight_enemy(EnemyKind::Basic);
    e.pattern = MovePattern::Zigzag { phase: std::f32::consts::FRAC_PI_2 };
    e.shoot_interval = u32::MAX;
    let mut bullets = Vec::new();
    e.advance(None, &mut bullets, &mut seeded_rng());
    assert!(approx_eq(e.x, 102.0)); // sin(π/2) * 2
    match e.pattern {
        MovePattern::Zigzag { phase } => {
            assert!(approx_eq(phase, std::f32::consts::FRAC_PI_2 + 0.1))
        }
        MovePattern::Straight => panic!("pattern changed"),
    }
}

#[test]
fn enemy_holds_fire_without_player() {
    let mut e = straight_enemy(EnemyKind::Basic);
    e.shoot_interval = 1;
    let mut bullets = Vec::new();
    let mut rng = seeded_rng();
    for _ in 0..500 {
        e.advance(None, &mut bullets, &mut rng);
    }
    assert!(bullets.is_empty());
}

#[test]
fn enemy_fires_straight_down() {
    let player = PlayerCraft::new(300.0, 500.0);
    let mut e = straight_enemy(EnemyKind::Basic);
    e.shoot_interval = 1;
    let mut rng = seeded_rng();
    let mut fired = 0;
    for _ in 0..500 {
        let mut bullets = Vec::new();
        e.advance(Some(&player), &mut bullets, &mut rng);
        if let Some(b) = bullets.first() {
            fired += 1;
            assert_eq!(b.owner, BulletOwner::Enemy);
            assert_eq!((b.dx, b.dy), (0.0, ENEMY_BULLET_SPEED));
            assert_eq!(b.x, e.x + e.width / 2.0);
            assert_eq!(b.y, e.y + e.height);
        }
    }
    // 30% chance per opportunity
    assert!(fired > 100 && fired < 200, "fired {fired} times");
}

// ── Boss ──────────────────────────────────────────────────────────────────────

#[test]
fn boss_stats_scale_with_stage() {
    let boss = Boss::new(480.0, 1);
    assert_eq!((boss.health, boss.max_health), (150, 150));
    assert_eq!((boss.x, boss.y), (180.0, BOSS_SPAWN_Y));
    assert_eq!(boss.phase, BossPhase::Normal);
    assert_eq!(Boss::new(480.0, 3).health, 250);
}

#[test]
fn boss_descends_then_holds() {
    let mut boss = Boss::new(480.0, 1);
    let mut bullets = Vec::new();
    for _ in 0..500 {
        boss.advance(None, &mut bullets);
    }
    assert_eq!(boss.y, BOSS_HOLD_Y);
    assert!(boss.move_phase > 0.0);
    assert!(bullets.is_empty());
}

#[test]
fn boss_spread_every_forty_frames() {
    let player = PlayerCraft::new(240.0, 560.0);
    let mut boss = Boss::new(480.0, 1);
    let mut bullets = Vec::new();
    for _ in 0..39 {
        boss.advance(Some(&player), &mut bullets);
    }
    assert!(bullets.is_empty());
    boss.advance(Some(&player), &mut bullets);
    assert_eq!(bullets.len(), 5);

    let dxs: Vec<f32> = bullets.iter().map(|b| b.dx).collect();
    assert_eq!(dxs, vec![-4.0, -2.0, 0.0, 2.0, 4.0]);
    assert!(bullets.iter().all(|b| b.dy == 5.0));
    let cx = boss.x + boss.width / 2.0;
    assert_eq!(bullets[0].x, cx - 30.0);
    assert_eq!(bullets[4].x, cx + 30.0);
}

#[test]
fn enraged_boss_fires_fast_single_bolts() {
    let player = PlayerCraft::new(240.0, 560.0);
    let mut boss = Boss::new(480.0, 1);
    let mut hostile = Hostile::Boss(boss.clone());
    hostile.apply_damage(80);
    if let Hostile::Boss(b) = hostile {
        boss = b;
    }
    assert_eq!(boss.phase, BossPhase::Enraged);

    let mut bullets = Vec::new();
    for _ in 0..40 {
        boss.advance(Some(&player), &mut bullets);
    }
    assert_eq!(bullets.len(), 2);
    assert!(bullets.iter().all(|b| b.dx == 0.0 && b.dy == 8.0));
}

#[test]
fn boss_phase_flips_below_half_and_never_reverts() {
    let mut hostile = Hostile::Boss(Boss::new(480.0, 1));

    assert!(!hostile.apply_damage(75)); // exactly half: still normal
    let Hostile::Boss(boss) = &hostile else { unreachable!() };
    assert_eq!(boss.phase, BossPhase::Normal);

    assert!(!hostile.apply_damage(1));
    let Hostile::Boss(boss) = &mut hostile else { unreachable!() };
    assert_eq!(boss.phase, BossPhase::Enraged);
    assert_eq!(boss.phase.number(), 2);

    boss.health = boss.max_health;
    boss.update_phase();
    assert_eq!(boss.phase, BossPhase::Enraged);
}

// ── Hostile ───────────────────────────────────────────────────────────────────

#[test]
fn hostile_reports_destruction_at_zero() {
    let mut h = Hostile::Enemy(straight_enemy(EnemyKind::Advanced));
    assert!(!h.apply_damage(10));
    assert_eq!(h.health(), 10);
    assert!(h.apply_damage(10));
    assert_eq!(h.health(), 0);
    assert_eq!(h.points(), 200);
    assert!(!h.is_boss());
}

#[test]
fn hostile_hitbox_matches_body() {
    let h = Hostile::Boss(Boss::new(480.0, 1));
    let r = h.hitbox();
    assert_eq!((r.x, r.y, r.width, r.height), (180.0, -100.0, 120.0, 80.0));
}

// ── Power-ups & effects ───────────────────────────────────────────────────────

#[test]
fn power_up_falls_and_floats() {
    let mut p = PowerUp::new(100.0, 100.0, WeaponType::Laser);
    p.advance();
    assert_eq!(p.y, 102.0);
    assert!(approx_eq(p.x, 100.0 + 0.1f32.sin() * 0.5));
}

#[test]
fn particles_expire_after_thirty_ticks() {
    let mut rng = seeded_rng();
    let mut particles: Vec<Particle> = (0..20).map(|_| Particle::new(0.0, 0.0, &mut rng)).collect();
    assert!(particles.iter().all(|p| p.dx.abs() <= 4.0 && p.dy.abs() <= 4.0));
    for _ in 0..29 {
        advance_and_prune(&mut particles);
    }
    assert_eq!(particles.len(), 20);
    advance_and_prune(&mut particles);
    assert!(particles.is_empty());
}

#[test]
fn explosion_grows_then_expires() {
    let mut explosions = vec![Explosion::new(10.0, 10.0)];
    advance_and_prune(&mut explosions);
    assert_eq!(explosions[0].radius, 12.0);
    for _ in 0..19 {
        advance_and_prune(&mut explosions);
    }
    assert!(explosions.is_empty());
}

// ── Names ─────────────────────────────────────────────────────────────────────

#[test]
fn cue_and_weapon_names() {
    let names: Vec<&str> = [
        SoundCue::Shoot,
        SoundCue::Hit,
        SoundCue::Explosion,
        SoundCue::PowerUp,
        SoundCue::PlayerHit,
        SoundCue::GameOver,
        SoundCue::Boss,
    ]
    .iter()
    .map(|c| c.name())
    .collect();
    assert_eq!(
        names,
        vec!["shoot", "hit", "explosion", "powerup", "playerHit", "gameover", "boss"]
    );
    assert_eq!(WeaponType::Laser.name(), "laser");
}

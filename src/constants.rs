//! Centralised gameplay constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! [`crate::config::GameConfig`] mirrors every constant and can override any
//! subset from `assets/game.toml` at startup.

// ── Arena ─────────────────────────────────────────────────────────────────────

/// Playfield width in world units, centred on the origin.
pub const ARENA_WIDTH: f32 = 1280.0;

/// Playfield height in world units, centred on the origin.
pub const ARENA_HEIGHT: f32 = 720.0;

/// Distance outside the arena edge at which wave enemies materialise.
pub const SPAWN_EDGE_MARGIN: f32 = 50.0;

/// Extra clearance kept between the player centre and the arena edge.
pub const PLAYER_EDGE_MARGIN: f32 = 5.0;

// ── Player ────────────────────────────────────────────────────────────────────

/// Player collision radius (world units).
pub const PLAYER_RADIUS: f32 = 50.0;

/// Movement speed while dashing (world units/s).
pub const PLAYER_DASH_SPEED: f32 = 900.0;

/// Duration of one dash burst (s). The player is untouchable for this window.
pub const PLAYER_DASH_DURATION: f32 = 0.2;

/// Maximum number of trail positions retained for the motion-trail effect.
pub const PLAYER_TRAIL_CAPACITY: usize = 15;

// ── Bullets ───────────────────────────────────────────────────────────────────

/// Bullet travel speed (world units/s).
pub const BULLET_SPEED: f32 = 900.0;

/// Bullet collision radius.
pub const BULLET_RADIUS: f32 = 4.0;

/// Bullet lifetime (s); expired bullets despawn even in open space.
pub const BULLET_LIFETIME: f32 = 1.7;

// ── Waves ─────────────────────────────────────────────────────────────────────

/// Stagger between consecutive enemy spawns within one wave (s).
pub const WAVE_SPAWN_STAGGER: f32 = 0.4;

/// Delay before a boss materialises after its wave is announced (s).
pub const BOSS_SPAWN_DELAY: f32 = 2.0;

/// Pause between wave completion and the next wave starting (s).
pub const WAVE_INTERMISSION: f32 = 2.0;

/// Short settle delay after an upgrade pick or vowel review closes (s).
pub const POST_REVIEW_DELAY: f32 = 0.5;

/// A wave counts as a "speed wave" when cleared faster than this (s).
pub const SPEED_WAVE_THRESHOLD: f32 = 30.0;

/// Minimum shots fired for an accuracy achievement check to be meaningful.
pub const ACCURACY_MIN_SHOTS: u32 = 5;

// ── Combo & scoring ───────────────────────────────────────────────────────────

/// Window after a kill during which the next kill extends the combo (s).
/// Special events may scale this at runtime.
pub const COMBO_DECAY_WINDOW: f32 = 2.0;

/// Additive score bonus per combo step: multiplier = 1 + (combo-1) * this.
pub const COMBO_SCORE_STEP: f32 = 0.1;

/// Flat score awarded at wave completion, scaled by the difficulty multiplier.
pub const WAVE_CLEAR_BONUS: u32 = 50;

// ── Enemies ───────────────────────────────────────────────────────────────────

/// Per-wave additive enemy health growth: hp = base + 5 * (wave - 1).
pub const ENEMY_HEALTH_PER_WAVE: f32 = 5.0;

/// Per-wave additive enemy speed growth (world units/s per wave), capped.
pub const ENEMY_SPEED_PER_WAVE: f32 = 1.8;

/// Cap on the additive per-wave speed growth.
pub const ENEMY_SPEED_GROWTH_CAP: f32 = 30.0;

/// Minimum interval between contact-damage applications from one enemy (s).
pub const ENEMY_ATTACK_INTERVAL: f32 = 1.0;

/// Base score value per kill before difficulty / archetype multipliers.
pub const ENEMY_BASE_SCORE: f32 = 10.0;

/// Contact damage dealt by any boss regardless of difficulty.
pub const BOSS_CONTACT_DAMAGE: f32 = 20.0;

/// Distance from the boss at which summoned minions appear.
pub const MINION_SUMMON_RADIUS: f32 = 100.0;

/// Bosses only fire aimed projectiles when the player is closer than this.
pub const BOSS_PROJECTILE_RANGE: f32 = 400.0;

// ── Power-ups ─────────────────────────────────────────────────────────────────

/// Base probability that a kill drops a power-up.
pub const POWERUP_BASE_CHANCE: f32 = 0.15;

/// Additional drop probability per active combo step.
pub const POWERUP_COMBO_CHANCE: f32 = 0.02;

/// Power-up pickup radius.
pub const POWERUP_RADIUS: f32 = 20.0;

/// Seconds an uncollected power-up persists before fading out.
pub const POWERUP_LIFETIME: f32 = 5.0;

/// Flat heal granted by a Health power-up.
pub const POWERUP_HEAL_AMOUNT: f32 = 30.0;

/// Instant score granted by a Star power-up.
pub const POWERUP_STAR_SCORE: u32 = 50;

/// Speed power-up: movement multiplier while active, and duration (s).
pub const POWERUP_SPEED_MULT: f32 = 1.5;
pub const POWERUP_SPEED_DURATION: f32 = 10.0;

/// Shield power-up duration (s).
pub const POWERUP_SHIELD_DURATION: f32 = 8.0;

/// Rapid-fire power-up: fire-interval multiplier while active, and duration (s).
pub const POWERUP_RAPID_FIRE_MULT: f32 = 0.5;
pub const POWERUP_RAPID_FIRE_DURATION: f32 = 7.0;

// ── Boss hazards ──────────────────────────────────────────────────────────────

/// Shockwave ring expansion rate (world units/s).
pub const SHOCKWAVE_GROWTH_RATE: f32 = 300.0;

/// Shockwave maximum radius; the ring dissipates past this.
pub const SHOCKWAVE_MAX_RADIUS: f32 = 300.0;

/// Half-width of the damaging annulus around the ring edge.
pub const SHOCKWAVE_RING_WIDTH: f32 = 20.0;

/// Rings smaller than this are still "charging" and deal no damage.
pub const SHOCKWAVE_MIN_RADIUS: f32 = 50.0;

/// Damage dealt by one shockwave ring crossing.
pub const SHOCKWAVE_DAMAGE: f32 = 15.0;

/// Boss projectile travel speed (world units/s).
pub const BOSS_PROJECTILE_SPEED: f32 = 240.0;

/// Boss projectile collision radius.
pub const BOSS_PROJECTILE_RADIUS: f32 = 8.0;

/// Boss projectile damage on hit.
pub const BOSS_PROJECTILE_DAMAGE: f32 = 10.0;

/// Boss projectile lifetime (s).
pub const BOSS_PROJECTILE_LIFETIME: f32 = 3.3;

// ── Leaderboard ───────────────────────────────────────────────────────────────

/// Maximum number of retained leaderboard entries.
pub const LEADERBOARD_CAP: usize = 10;

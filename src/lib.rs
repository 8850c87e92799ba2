//! Vowel Hunter — an arcade survival-wave game.
//!
//! A single hunter fights staggered waves of vowel-tagged aliens in a 2D
//! arena: boss waves every fifth wave, combo-scaled scoring, power-ups,
//! between-wave upgrade drafts, and persistent meta-progression
//! (achievements, daily challenges, a battle pass, and clans) that feeds
//! stat bonuses back into each new run.

pub mod achievements;
pub mod audio;
pub mod battlepass;
pub mod boss;
pub mod challenges;
pub mod clans;
pub mod combat;
pub mod config;
pub mod constants;
pub mod difficulty;
pub mod enemy;
pub mod error;
pub mod graphics;
pub mod hud;
pub mod leaderboard;
pub mod menu;
pub mod particles;
pub mod player;
pub mod powerup;
pub mod rewards;
pub mod session;
pub mod shapes;
pub mod simulation;
pub mod storage;
pub mod tutorial;
pub mod upgrades;
pub mod vowels;
pub mod wave;

//! Between-wave upgrade drafts.
//!
//! Every third completed wave offers three random upgrades drawn from the
//! catalog (excluding maxed-out ones); the intermission holds until the
//! player picks one with the 1/2/3 keys.  Levels reset with each run.

use crate::audio::{PlaySfx, SfxKind};
use crate::menu::GameState;
use crate::player::{Dash, Movement, Player, PlayerHealth, Weapon};
use crate::wave::{WaveBanner, WaveDirector};
use bevy::prelude::*;
use rand::seq::SliceRandom;
use std::collections::HashMap;

/// Floors for the shrinking-value upgrades.
const FIRE_INTERVAL_FLOOR: f32 = 0.1;
const DASH_COOLDOWN_FLOOR: f32 = 1.5;

// ── Catalog ───────────────────────────────────────────────────────────────────

/// The six draftable upgrades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpgradeKind {
    /// +20 max health per level (granted immediately).
    Vitality,
    /// +15 bullet damage per level.
    Firepower,
    /// -0.04 s fire interval per level, floored.
    RapidFire,
    /// +30 u/s movement per level.
    Agility,
    /// -0.5 s dash cooldown per level, floored.
    QuickDash,
    /// +1 bullet pass-through per level.
    Piercing,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 6] = [
        UpgradeKind::Vitality,
        UpgradeKind::Firepower,
        UpgradeKind::RapidFire,
        UpgradeKind::Agility,
        UpgradeKind::QuickDash,
        UpgradeKind::Piercing,
    ];

    pub fn name(self) -> &'static str {
        match self {
            UpgradeKind::Vitality => "Vitality",
            UpgradeKind::Firepower => "Firepower",
            UpgradeKind::RapidFire => "Rapid Fire",
            UpgradeKind::Agility => "Agility",
            UpgradeKind::QuickDash => "Quick Dash",
            UpgradeKind::Piercing => "Piercing Shots",
        }
    }

    pub fn max_level(self) -> u32 {
        match self {
            UpgradeKind::Piercing => 3,
            _ => 5,
        }
    }
}

/// Per-run upgrade levels.
#[derive(Resource, Debug, Default)]
pub struct UpgradeLevels {
    levels: HashMap<UpgradeKind, u32>,
}

impl UpgradeLevels {
    pub fn level(&self, kind: UpgradeKind) -> u32 {
        self.levels.get(&kind).copied().unwrap_or(0)
    }

    pub fn is_maxed(&self, kind: UpgradeKind) -> bool {
        self.level(kind) >= kind.max_level()
    }

    /// Kinds still below their cap.
    pub fn available(&self) -> Vec<UpgradeKind> {
        UpgradeKind::ALL
            .into_iter()
            .filter(|kind| !self.is_maxed(*kind))
            .collect()
    }

    /// Bump the level, respecting the cap.  Returns the new level, or `None`
    /// when already maxed.
    pub fn raise(&mut self, kind: UpgradeKind) -> Option<u32> {
        if self.is_maxed(kind) {
            return None;
        }
        let next = self.level(kind) + 1;
        self.levels.insert(kind, next);
        Some(next)
    }

    pub fn reset(&mut self) {
        self.levels.clear();
    }
}

/// The three choices currently on offer, if a draft is open.
#[derive(Resource, Debug, Default)]
pub struct UpgradeOffer(pub Option<Vec<UpgradeKind>>);

/// Apply one level of `kind` to the player's live stats.
pub fn apply_upgrade(
    kind: UpgradeKind,
    health: &mut PlayerHealth,
    movement: &mut Movement,
    dash: &mut Dash,
    weapon: &mut Weapon,
) {
    match kind {
        UpgradeKind::Vitality => health.raise_max(20.0),
        UpgradeKind::Firepower => weapon.damage += 15.0,
        UpgradeKind::RapidFire => {
            weapon.fire_interval = (weapon.fire_interval - 0.04).max(FIRE_INTERVAL_FLOOR)
        }
        UpgradeKind::Agility => movement.speed += 30.0,
        UpgradeKind::QuickDash => {
            dash.max_cooldown = (dash.max_cooldown - 0.5).max(DASH_COOLDOWN_FLOOR)
        }
        UpgradeKind::Piercing => weapon.piercing += 1,
    }
}

// ── Plugin & systems ──────────────────────────────────────────────────────────

pub struct UpgradePlugin;

impl Plugin for UpgradePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UpgradeLevels>()
            .init_resource::<UpgradeOffer>()
            .add_systems(OnEnter(GameState::Playing), reset_upgrades)
            .add_systems(OnEnter(GameState::Tutorial), reset_upgrades)
            .add_systems(
                Update,
                (open_upgrade_offer, pick_upgrade_system)
                    .chain()
                    .run_if(crate::menu::simulation_active),
            );
    }
}

fn reset_upgrades(mut levels: ResMut<UpgradeLevels>, mut offer: ResMut<UpgradeOffer>) {
    levels.reset();
    offer.0 = None;
}

/// Open a three-card draft when the wave director flags one (after any vowel
/// review has been dismissed).
pub fn open_upgrade_offer(
    mut director: ResMut<WaveDirector>,
    levels: Res<UpgradeLevels>,
    mut offer: ResMut<UpgradeOffer>,
    mut banners: MessageWriter<WaveBanner>,
) {
    if !director.upgrade_pending || director.review_pending || offer.0.is_some() {
        return;
    }

    let mut available = levels.available();
    if available.is_empty() {
        director.upgrade_pending = false;
        return;
    }

    let mut rng = rand::thread_rng();
    available.shuffle(&mut rng);
    available.truncate(3);

    let labels: Vec<String> = available
        .iter()
        .enumerate()
        .map(|(i, kind)| format!("[{}] {} (Lv{})", i + 1, kind.name(), levels.level(*kind) + 1))
        .collect();
    banners.write(WaveBanner {
        text: format!("Choose an upgrade: {}", labels.join("  ")),
    });

    offer.0 = Some(available);
}

/// Apply the picked card and release the intermission.
pub fn pick_upgrade_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut director: ResMut<WaveDirector>,
    mut levels: ResMut<UpgradeLevels>,
    mut offer: ResMut<UpgradeOffer>,
    mut q_player: Query<
        (&mut PlayerHealth, &mut Movement, &mut Dash, &mut Weapon),
        With<Player>,
    >,
    mut sfx: MessageWriter<PlaySfx>,
) {
    let Some(choices) = offer.0.as_ref() else {
        return;
    };

    let picked = [KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3]
        .iter()
        .position(|key| keys.just_pressed(*key))
        .and_then(|i| choices.get(i).copied());

    let Some(kind) = picked else {
        return;
    };
    let Ok((mut health, mut movement, mut dash, mut weapon)) = q_player.single_mut() else {
        return;
    };

    if levels.raise(kind).is_some() {
        apply_upgrade(kind, &mut health, &mut movement, &mut dash, &mut weapon);
        info!("Upgrade picked: {} (Lv{})", kind.name(), levels.level(kind));
        sfx.write(PlaySfx::new(SfxKind::Upgrade));
    }

    offer.0 = None;
    director.upgrade_pending = false;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_cap_at_the_catalog_maximum() {
        let mut levels = UpgradeLevels::default();
        for expected in 1..=3 {
            assert_eq!(levels.raise(UpgradeKind::Piercing), Some(expected));
        }
        assert_eq!(levels.raise(UpgradeKind::Piercing), None);
        assert!(levels.is_maxed(UpgradeKind::Piercing));
    }

    #[test]
    fn maxed_upgrades_leave_the_draft_pool() {
        let mut levels = UpgradeLevels::default();
        for _ in 0..3 {
            levels.raise(UpgradeKind::Piercing);
        }
        assert!(!levels.available().contains(&UpgradeKind::Piercing));
        assert_eq!(levels.available().len(), UpgradeKind::ALL.len() - 1);
    }

    #[test]
    fn shrinking_upgrades_respect_their_floors() {
        let mut health = PlayerHealth::new(100.0);
        let mut movement = Movement { speed: 300.0 };
        let mut dash = Dash::new(1.6);
        let mut weapon = Weapon {
            damage: 50.0,
            fire_interval: 0.12,
            cooldown: 0.0,
            piercing: 0,
        };

        apply_upgrade(
            UpgradeKind::RapidFire,
            &mut health,
            &mut movement,
            &mut dash,
            &mut weapon,
        );
        assert_eq!(weapon.fire_interval, FIRE_INTERVAL_FLOOR);

        apply_upgrade(
            UpgradeKind::QuickDash,
            &mut health,
            &mut movement,
            &mut dash,
            &mut weapon,
        );
        assert_eq!(dash.max_cooldown, DASH_COOLDOWN_FLOOR);
    }

    #[test]
    fn vitality_raises_max_and_current_health() {
        let mut health = PlayerHealth {
            hp: 60.0,
            max_hp: 100.0,
        };
        let mut movement = Movement { speed: 300.0 };
        let mut dash = Dash::new(4.0);
        let mut weapon = Weapon {
            damage: 50.0,
            fire_interval: 0.3,
            cooldown: 0.0,
            piercing: 0,
        };

        apply_upgrade(
            UpgradeKind::Vitality,
            &mut health,
            &mut movement,
            &mut dash,
            &mut weapon,
        );
        assert_eq!(health.max_hp, 120.0);
        assert_eq!(health.hp, 80.0);
    }
}

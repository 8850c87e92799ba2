//! Short-vowel side feature: per-enemy vowel tags and the per-wave tracker
//! feeding the post-wave review step.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The five short vowels an enemy can carry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Vowel {
    A,
    E,
    I,
    O,
    U,
}

impl Vowel {
    pub const ALL: [Vowel; 5] = [Vowel::A, Vowel::E, Vowel::I, Vowel::O, Vowel::U];

    /// Uniformly random vowel, assigned to each non-boss enemy at spawn.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    #[inline]
    pub fn letter(self) -> char {
        match self {
            Vowel::A => 'a',
            Vowel::E => 'e',
            Vowel::I => 'i',
            Vowel::O => 'o',
            Vowel::U => 'u',
        }
    }

    /// Example words shown on the post-wave review for this vowel.
    pub fn example_words(self) -> &'static [&'static str] {
        match self {
            Vowel::A => &["Apple", "Ant", "Astronaut", "Alligator", "Airplane", "Anchor"],
            Vowel::E => &["Elephant", "Egg", "Engine", "Eskimo", "Eagle", "Envelope"],
            Vowel::I => &["Igloo", "Insect", "Ice cream", "Island", "Iguana", "Ink"],
            Vowel::O => &["Octopus", "Orange", "Owl", "Ocean", "Olive", "Otter"],
            Vowel::U => &["Umbrella", "Unicorn", "UFO", "Ukulele", "Urchin", "Universe"],
        }
    }
}

/// Records which vowels were defeated during the current wave.
///
/// Read at wave end to decide whether a review step runs; reset afterwards.
#[derive(Resource, Debug, Default)]
pub struct VowelTracker {
    encountered: BTreeSet<Vowel>,
}

impl VowelTracker {
    pub fn record(&mut self, vowel: Vowel) {
        self.encountered.insert(vowel);
    }

    pub fn has_vowels(&self) -> bool {
        !self.encountered.is_empty()
    }

    pub fn vowels(&self) -> impl Iterator<Item = Vowel> + '_ {
        self.encountered.iter().copied()
    }

    pub fn reset(&mut self) {
        self.encountered.clear();
    }
}

// ── Post-wave review ──────────────────────────────────────────────────────────

/// Seconds before an unattended review dismisses itself.
const REVIEW_AUTO_DISMISS: f32 = 6.0;

/// State of the post-wave vowel review step.
#[derive(Resource, Debug, Default)]
pub struct VowelReview {
    pub active: bool,
    pub remaining: f32,
}

/// Run the review step the wave director flagged: show the defeated vowels'
/// example words, then count a completed learning screen when dismissed
/// (Enter, or automatically after a few seconds).
pub fn vowel_review_system(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    mut review: ResMut<VowelReview>,
    mut director: ResMut<crate::wave::WaveDirector>,
    mut session: ResMut<crate::session::GameSession>,
    mut achievements: ResMut<crate::achievements::AchievementLog>,
    mut tracker: ResMut<VowelTracker>,
) {
    if !director.review_pending {
        review.active = false;
        return;
    }

    if !review.active {
        review.active = true;
        review.remaining = REVIEW_AUTO_DISMISS;
        for vowel in tracker.vowels() {
            info!(
                "Vowel '{}': {}",
                vowel.letter(),
                vowel.example_words().join(", ")
            );
        }
        return;
    }

    review.remaining -= time.delta_secs();
    if keys.just_pressed(KeyCode::Enter) || review.remaining <= 0.0 {
        review.active = false;
        director.review_pending = false;
        session.learning_screens += 1;
        achievements.add_learning_screen();
        tracker.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_dedupes_and_resets() {
        let mut tracker = VowelTracker::default();
        assert!(!tracker.has_vowels());

        tracker.record(Vowel::A);
        tracker.record(Vowel::A);
        tracker.record(Vowel::E);
        assert_eq!(tracker.vowels().count(), 2);

        tracker.reset();
        assert!(!tracker.has_vowels());
    }

    #[test]
    fn every_vowel_has_example_words() {
        for vowel in Vowel::ALL {
            assert!(!vowel.example_words().is_empty());
        }
    }
}

//! Spaced repetition scheduler.
//!
//! [`review`] is a pure transition function: given a word, a grade, and the
//! current time it returns the rescheduled word. No I/O, no clock access,
//! fully deterministic -- the collection store owns persistence and the
//! caller owns the clock.
//!
//! ## Maturity states
//!
//! ```text
//! New(0) -> Learning(1) -> Young(2) -> Mature(>=3)
//!                ^
//!                +-- any failed review, repetitions reset to 0
//! ```

mod policy;

pub use policy::ReviewPolicy;

use serde::{Deserialize, Serialize};

use crate::word::{ReviewEntry, Word, DAY_MS};

/// Learner's self-assessed recall outcome for one review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    /// Failed to recall.
    Wrong,
    /// Recalled with difficulty.
    Hard,
    /// Recalled.
    Good,
    /// Recalled effortlessly.
    Easy,
}

impl Grade {
    /// Clamp an arbitrary raw grade into `[0, 3]`.
    ///
    /// Invalid grades are never an error; anything at or below 0 is a fail,
    /// anything at or above 3 is an easy pass.
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            i64::MIN..=0 => Grade::Wrong,
            1 => Grade::Hard,
            2 => Grade::Good,
            _ => Grade::Easy,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Grade::Wrong => 0,
            Grade::Hard => 1,
            Grade::Good => 2,
            Grade::Easy => 3,
        }
    }

    pub fn is_pass(self) -> bool {
        self != Grade::Wrong
    }
}

/// Conceptual scheduling state, derived from the repetition count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Maturity {
    New,
    Learning,
    Young,
    Mature,
}

impl Maturity {
    pub fn of(word: &Word) -> Self {
        match word.repetitions {
            0 => Maturity::New,
            1 => Maturity::Learning,
            2 => Maturity::Young,
            _ => Maturity::Mature,
        }
    }
}

/// Apply one graded review and return the rescheduled word.
///
/// A fail resets the repetition streak and shortens ease; a pass walks the
/// 1 -> 6 -> round(interval * ease) ladder. The next review is always at
/// least one day out, and ease stays within `[policy.min_ease,
/// policy.max_ease]`.
pub fn review(word: &Word, grade: Grade, now_ms: i64, policy: &ReviewPolicy) -> Word {
    let mut next = word.clone();

    if grade.is_pass() {
        next.repetitions = word.repetitions + 1;
        next.interval = match next.repetitions {
            1 => policy.first_interval,
            2 => policy.second_interval,
            _ => {
                let previous = f64::from(word.interval.max(1));
                (previous * word.ease).round() as u32
            }
        };
        let bonus = match grade {
            Grade::Easy => policy.easy_ease_bonus,
            Grade::Good => policy.good_ease_bonus,
            _ => 0.0,
        };
        next.ease = (word.ease + bonus).clamp(policy.min_ease, policy.max_ease);
    } else {
        next.repetitions = 0;
        next.interval = 1;
        next.ease = (word.ease - policy.fail_ease_penalty).max(policy.min_ease);
    }

    next.history.push(ReviewEntry {
        date: now_ms,
        grade: grade.as_u8(),
    });
    next.next_review = now_ms + i64::from(next.interval.max(1)) * DAY_MS;
    next.updated_at = Some(now_ms);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word::LookupResult;
    use proptest::prelude::*;

    fn new_word() -> Word {
        Word::new(
            LookupResult {
                word: "ephemeral".to_string(),
                ..Default::default()
            },
            0,
        )
    }

    #[test]
    fn grade_clamps_out_of_range_values() {
        assert_eq!(Grade::from_raw(-7), Grade::Wrong);
        assert_eq!(Grade::from_raw(0), Grade::Wrong);
        assert_eq!(Grade::from_raw(1), Grade::Hard);
        assert_eq!(Grade::from_raw(2), Grade::Good);
        assert_eq!(Grade::from_raw(3), Grade::Easy);
        assert_eq!(Grade::from_raw(250), Grade::Easy);
    }

    #[test]
    fn fail_resets_streak_and_shortens_ease() {
        let w = new_word();
        let policy = ReviewPolicy::default();
        let w = review(&w, Grade::Wrong, 0, &policy);
        assert_eq!(w.repetitions, 0);
        assert_eq!(w.interval, 1);
        assert!((w.ease - 2.3).abs() < 1e-9);
        assert_eq!(w.next_review, DAY_MS);
    }

    #[test]
    fn pass_ladder_is_one_six_then_multiplied() {
        let policy = ReviewPolicy::default();
        let mut w = new_word();
        let mut now = 0;
        for (expected_interval, expected_reps) in [(1u32, 1u32), (6, 2), (15, 3)] {
            w = review(&w, Grade::Good, now, &policy);
            assert_eq!(w.interval, expected_interval);
            assert_eq!(w.repetitions, expected_reps);
            now = w.next_review;
        }
        // third interval is round(6 * 2.5) with the default good bonus of 0
        assert_eq!(w.interval, 15);
    }

    #[test]
    fn fail_pass_pass_yields_spec_sequence() {
        let policy = ReviewPolicy::default();
        let mut w = new_word();
        let mut intervals = Vec::new();
        let mut reps = Vec::new();
        for grade in [Grade::Wrong, Grade::Good, Grade::Good] {
            w = review(&w, grade, 0, &policy);
            intervals.push(w.interval);
            reps.push(w.repetitions);
        }
        assert_eq!(intervals, vec![1, 1, 6]);
        assert_eq!(reps, vec![0, 1, 2]);
    }

    #[test]
    fn concrete_walkthrough_matches_reference() {
        // ease 2.5 -> fail -> good -> good -> easy
        let policy = ReviewPolicy::default();
        let mut w = new_word();

        w = review(&w, Grade::Wrong, 0, &policy);
        assert_eq!((w.interval, w.repetitions), (1, 0));
        assert!((w.ease - 2.3).abs() < 1e-9);

        w = review(&w, Grade::Good, 0, &policy);
        assert_eq!((w.interval, w.repetitions), (1, 1));

        w = review(&w, Grade::Good, 0, &policy);
        assert_eq!((w.interval, w.repetitions), (6, 2));

        w = review(&w, Grade::Easy, 0, &policy);
        assert_eq!((w.interval, w.repetitions), (14, 3));
        assert!((w.ease - 2.45).abs() < 1e-9);
    }

    #[test]
    fn good_bonus_variant_applies_when_configured() {
        let policy = ReviewPolicy {
            good_ease_bonus: 0.1,
            ..Default::default()
        };
        let w = review(&new_word(), Grade::Good, 0, &policy);
        assert!((w.ease - 2.6).abs() < 1e-9);
    }

    #[test]
    fn hard_pass_leaves_ease_unchanged() {
        let policy = ReviewPolicy::default();
        let w = review(&new_word(), Grade::Hard, 0, &policy);
        assert_eq!(w.ease, 2.5);
        assert_eq!(w.repetitions, 1);
    }

    #[test]
    fn easy_bonus_is_capped_at_max_ease() {
        let policy = ReviewPolicy::default();
        let mut w = new_word();
        w.ease = 3.45;
        let w = review(&w, Grade::Easy, 0, &policy);
        assert_eq!(w.ease, 3.5);
    }

    #[test]
    fn interval_floor_keeps_next_review_in_the_future() {
        // A new word has interval 0; even a hypothetical 0-day result must
        // schedule at least one day out.
        let policy = ReviewPolicy::default();
        let w = review(&new_word(), Grade::Good, 1_000, &policy);
        assert!(w.next_review >= 1_000 + DAY_MS);
    }

    #[test]
    fn history_is_append_only() {
        let policy = ReviewPolicy::default();
        let mut w = new_word();
        w = review(&w, Grade::Wrong, 10, &policy);
        w = review(&w, Grade::Easy, 20, &policy);
        assert_eq!(
            w.history,
            vec![
                ReviewEntry { date: 10, grade: 0 },
                ReviewEntry { date: 20, grade: 3 },
            ]
        );
    }

    #[test]
    fn maturity_follows_repetitions() {
        let policy = ReviewPolicy::default();
        let mut w = new_word();
        assert_eq!(Maturity::of(&w), Maturity::New);
        w = review(&w, Grade::Good, 0, &policy);
        assert_eq!(Maturity::of(&w), Maturity::Learning);
        w = review(&w, Grade::Good, 0, &policy);
        assert_eq!(Maturity::of(&w), Maturity::Young);
        w = review(&w, Grade::Good, 0, &policy);
        assert_eq!(Maturity::of(&w), Maturity::Mature);
        w = review(&w, Grade::Wrong, 0, &policy);
        assert_eq!(Maturity::of(&w), Maturity::New);
    }

    proptest! {
        #[test]
        fn ease_stays_in_bounds_for_any_grade_sequence(
            raw_grades in prop::collection::vec(-5i64..10, 0..60)
        ) {
            let policy = ReviewPolicy::default();
            let mut w = new_word();
            let mut now = 0;
            for raw in raw_grades {
                w = review(&w, Grade::from_raw(raw), now, &policy);
                prop_assert!(w.ease >= policy.min_ease - 1e-9);
                prop_assert!(w.ease <= policy.max_ease + 1e-9);
                now = w.next_review;
            }
        }

        #[test]
        fn zero_repetitions_implies_interval_at_most_one(
            raw_grades in prop::collection::vec(-1i64..4, 1..40)
        ) {
            let policy = ReviewPolicy::default();
            let mut w = new_word();
            for raw in raw_grades {
                w = review(&w, Grade::from_raw(raw), 0, &policy);
                if w.repetitions == 0 {
                    prop_assert!(w.interval <= 1);
                }
            }
        }
    }
}

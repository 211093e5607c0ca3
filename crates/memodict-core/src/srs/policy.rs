//! Tunable constants for the review transition.
//!
//! Observed deployments of this scheduling family disagree on two points:
//! whether a plain "good" pass nudges ease (+0 vs +0.1), and where the fail
//! threshold sits. Both live here as named fields instead of inline
//! constants; the fail threshold is handled by grade clamping (see
//! [`crate::srs::Grade::from_raw`]).

use serde::{Deserialize, Serialize};

/// Constants driving [`crate::srs::review`].
///
/// Serialized as the `[review]` section of config.toml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewPolicy {
    /// Subtracted from ease on a failed review.
    #[serde(default = "default_fail_ease_penalty")]
    pub fail_ease_penalty: f64,
    /// Added to ease on a plain pass (grade 2). 0.0 or 0.1 in the wild.
    #[serde(default)]
    pub good_ease_bonus: f64,
    /// Added to ease on an easy pass (grade 3).
    #[serde(default = "default_easy_ease_bonus")]
    pub easy_ease_bonus: f64,
    /// Hard floor for ease.
    #[serde(default = "default_min_ease")]
    pub min_ease: f64,
    /// Soft ceiling for ease.
    #[serde(default = "default_max_ease")]
    pub max_ease: f64,
    /// Interval after the first successful review, days.
    #[serde(default = "default_first_interval")]
    pub first_interval: u32,
    /// Interval after the second successful review, days.
    #[serde(default = "default_second_interval")]
    pub second_interval: u32,
}

fn default_fail_ease_penalty() -> f64 {
    0.2
}
fn default_easy_ease_bonus() -> f64 {
    0.15
}
fn default_min_ease() -> f64 {
    1.3
}
fn default_max_ease() -> f64 {
    3.5
}
fn default_first_interval() -> u32 {
    1
}
fn default_second_interval() -> u32 {
    6
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self {
            fail_ease_penalty: default_fail_ease_penalty(),
            good_ease_bonus: 0.0,
            easy_ease_bonus: default_easy_ease_bonus(),
            min_ease: default_min_ease(),
            max_ease: default_max_ease(),
            first_interval: default_first_interval(),
            second_interval: default_second_interval(),
        }
    }
}

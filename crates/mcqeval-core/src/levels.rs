//! Categorical levels for difficulty and discrimination.
//!
//! Both classifications split a value range into three left-open,
//! right-closed bands at two ordered cut points. They share one bucketing
//! function so the boundary rule lives in a single place.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Two ordered cut points over a value range that is open at `floor`.
///
/// Only built from validated thresholds (see [`crate::config`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cuts {
    floor: f64,
    lower: f64,
    upper: f64,
}

impl Cuts {
    pub(crate) fn new(floor: f64, lower: f64, upper: f64) -> Self {
        debug_assert!(
            floor < lower && lower < upper,
            "cut points out of order: {floor}, {lower}, {upper}"
        );
        Self {
            floor,
            lower,
            upper,
        }
    }
}

/// One of the three bands produced by [`Cuts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Low,
    Middle,
    High,
}

/// Place a value into its band: `(floor, lower]` is low, `(lower, upper]` is
/// middle, `(upper, ..)` is high. A value equal to a cut point falls into the
/// band below it. The floor itself (difficulty 0, discrimination -1) is
/// outside every band.
pub fn band(value: f64, cuts: Cuts) -> Option<Band> {
    if value <= cuts.floor {
        None
    } else if value <= cuts.lower {
        Some(Band::Low)
    } else if value <= cuts.upper {
        Some(Band::Middle)
    } else {
        Some(Band::High)
    }
}

/// Difficulty category of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Hard,
    Medium,
    Easy,
}

impl DifficultyLevel {
    /// Column order of the discrimination × difficulty grid.
    pub const GRID_ORDER: [DifficultyLevel; 3] = [
        DifficultyLevel::Easy,
        DifficultyLevel::Medium,
        DifficultyLevel::Hard,
    ];

    /// `None` for a difficulty of exactly 0.
    pub fn classify(difficulty: f64, cuts: Cuts) -> Option<Self> {
        band(difficulty, cuts).map(|b| match b {
            Band::Low => DifficultyLevel::Hard,
            Band::Middle => DifficultyLevel::Medium,
            Band::High => DifficultyLevel::Easy,
        })
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyLevel::Hard => write!(f, "hard"),
            DifficultyLevel::Medium => write!(f, "medium"),
            DifficultyLevel::Easy => write!(f, "easy"),
        }
    }
}

/// Discrimination category of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscriminationLevel {
    Poor,
    Fair,
    Good,
}

impl DiscriminationLevel {
    /// Row order of the discrimination × difficulty grid.
    pub const GRID_ORDER: [DiscriminationLevel; 3] = [
        DiscriminationLevel::Poor,
        DiscriminationLevel::Fair,
        DiscriminationLevel::Good,
    ];

    /// `None` for a discrimination of exactly -1.
    pub fn classify(discrimination: f64, cuts: Cuts) -> Option<Self> {
        band(discrimination, cuts).map(|b| match b {
            Band::Low => DiscriminationLevel::Poor,
            Band::Middle => DiscriminationLevel::Fair,
            Band::High => DiscriminationLevel::Good,
        })
    }
}

impl fmt::Display for DiscriminationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscriminationLevel::Poor => write!(f, "poor"),
            DiscriminationLevel::Fair => write!(f, "fair"),
            DiscriminationLevel::Good => write!(f, "good"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn difficulty_cuts() -> Cuts {
        Cuts::new(0.0, 20.0, 70.0)
    }

    fn discrimination_cuts() -> Cuts {
        Cuts::new(-1.0, 0.2, 0.4)
    }

    #[test]
    fn cut_points_belong_to_the_band_below() {
        let cuts = difficulty_cuts();
        assert_eq!(band(20.0, cuts), Some(Band::Low));
        assert_eq!(band(20.000001, cuts), Some(Band::Middle));
        assert_eq!(band(70.0, cuts), Some(Band::Middle));
        assert_eq!(band(70.5, cuts), Some(Band::High));
    }

    #[test]
    fn range_floor_has_no_level() {
        assert_eq!(DifficultyLevel::classify(0.0, difficulty_cuts()), None);
        assert_eq!(DiscriminationLevel::classify(-1.0, discrimination_cuts()), None);
    }

    #[test]
    fn just_above_the_floor_is_lowest_band() {
        assert_eq!(
            DifficultyLevel::classify(0.5, difficulty_cuts()),
            Some(DifficultyLevel::Hard)
        );
        assert_eq!(
            DiscriminationLevel::classify(-0.5, discrimination_cuts()),
            Some(DiscriminationLevel::Poor)
        );
        assert_eq!(
            DifficultyLevel::classify(100.0, difficulty_cuts()),
            Some(DifficultyLevel::Easy)
        );
        assert_eq!(
            DiscriminationLevel::classify(1.0, discrimination_cuts()),
            Some(DiscriminationLevel::Good)
        );
    }

    #[test]
    fn discrimination_thresholds_are_exact() {
        let cuts = discrimination_cuts();
        // 1/5 and 2/5 come out exactly equal to the threshold literals
        assert_eq!(
            DiscriminationLevel::classify(1.0 / 5.0, cuts),
            Some(DiscriminationLevel::Poor)
        );
        assert_eq!(
            DiscriminationLevel::classify(2.0 / 5.0, cuts),
            Some(DiscriminationLevel::Fair)
        );
        assert_eq!(
            DiscriminationLevel::classify(0.5, cuts),
            Some(DiscriminationLevel::Good)
        );
    }

    #[test]
    fn levels_display_lowercase() {
        assert_eq!(DifficultyLevel::Medium.to_string(), "medium");
        assert_eq!(DiscriminationLevel::Good.to_string(), "good");
        assert_eq!(
            serde_json::to_string(&DifficultyLevel::Hard).unwrap(),
            r#""hard""#
        );
    }
}

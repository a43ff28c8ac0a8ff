use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a finished match, always from the home side's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

/// Class-index order used by the classifier. Both directions of the
/// index mapping go through this table so they cannot drift apart.
const CLASS_ORDER: [Outcome; 3] = [Outcome::Win, Outcome::Loss, Outcome::Draw];

/// Wire names aligned with [`CLASS_ORDER`]; `Display` and [`Outcome::parse`]
/// both go through this table.
const NAMES: [&str; 3] = ["win", "loss", "draw"];

/// Number of outcome classes
pub const NUM_CLASSES: usize = CLASS_ORDER.len();

impl Outcome {
    /// Label a finished match: win iff the home side scored more,
    /// loss iff fewer, draw otherwise.
    pub fn label(home_goals: u32, away_goals: u32) -> Outcome {
        if home_goals > away_goals {
            Outcome::Win
        } else if home_goals < away_goals {
            Outcome::Loss
        } else {
            Outcome::Draw
        }
    }

    /// Integer class encoding for the classifier
    pub fn class_index(&self) -> usize {
        CLASS_ORDER.iter().position(|o| o == self).unwrap()
    }

    /// Inverse of [`class_index`](Self::class_index); `None` for indices
    /// outside the 3-class space.
    pub fn from_class_index(index: usize) -> Option<Outcome> {
        CLASS_ORDER.get(index).copied()
    }

    /// Inverse of `Display`; `None` for anything but the three wire names.
    pub fn parse(s: &str) -> Option<Outcome> {
        NAMES
            .iter()
            .position(|n| *n == s)
            .and_then(Outcome::from_class_index)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(NAMES[self.class_index()])
    }
}

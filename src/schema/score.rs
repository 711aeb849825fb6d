use serde::{Deserialize, Serialize};

/// Gold every play-through starts with unless the story overrides it.
pub const DEFAULT_STARTING_GOLD: i32 = 50;

/// A boolean marker a choice can set on the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flag {
    /// The player promised to testify for a freedman in court.
    Testified,
    /// The player physically shielded someone during the raid.
    Shielded,
}

/// Running counters for one play-through.
///
/// Only [`ScoreEffect::apply`] mutates a score held by the engine; the
/// ending rules and the status display read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub gold: i32,
    pub favor_settlers: i32,
    pub favor_others: i32,
    pub testified: bool,
    pub shielded: bool,
}

impl Default for ScoreState {
    fn default() -> Self {
        Self::new(DEFAULT_STARTING_GOLD)
    }
}

impl ScoreState {
    pub fn new(starting_gold: i32) -> Self {
        Self {
            gold: starting_gold,
            favor_settlers: 0,
            favor_others: 0,
            testified: false,
            shielded: false,
        }
    }

    pub fn flag(&self, flag: Flag) -> bool {
        match flag {
            Flag::Testified => self.testified,
            Flag::Shielded => self.shielded,
        }
    }

    /// Favor toward the displaced, counting each set conscience flag as one point.
    pub fn conscience(&self) -> i32 {
        self.favor_others + i32::from(self.testified) + i32::from(self.shielded)
    }
}

/// Counter deltas and flag sets carried by a choice.
///
/// Every field defaults to "no change", so story files only spell out
/// what a choice actually touches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreEffect {
    pub gold: i32,
    pub favor_settlers: i32,
    pub favor_others: i32,
    pub set: Vec<Flag>,
}

impl ScoreEffect {
    pub fn apply(&self, score: &mut ScoreState) {
        score.gold = score.gold.saturating_add(self.gold);
        score.favor_settlers = score.favor_settlers.saturating_add(self.favor_settlers);
        score.favor_others = score.favor_others.saturating_add(self.favor_others);
        for flag in &self.set {
            match flag {
                Flag::Testified => score.testified = true,
                Flag::Shielded => score.shielded = true,
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gold == 0 && self.favor_settlers == 0 && self.favor_others == 0 && self.set.is_empty()
    }
}

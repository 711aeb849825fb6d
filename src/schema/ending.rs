use serde::{Deserialize, Serialize};
use std::fmt;

use super::score::ScoreState;

/// The three ways a play-through can close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndingKind {
    SettlerProsperity,
    MoralCommunion,
    TaintedRegret,
}

impl EndingKind {
    pub const ALL: [EndingKind; 3] = [
        EndingKind::SettlerProsperity,
        EndingKind::MoralCommunion,
        EndingKind::TaintedRegret,
    ];

    /// Display title, e.g. "Settler Prosperity".
    pub fn title(&self) -> &'static str {
        match self {
            Self::SettlerProsperity => "Settler Prosperity",
            Self::MoralCommunion => "Moral Communion",
            Self::TaintedRegret => "Tainted Regret",
        }
    }

    /// Select the ending for a score snapshot. The first matching rule in
    /// [`ENDING_RULES`] wins.
    pub fn select(score: &ScoreState) -> EndingKind {
        ENDING_RULES
            .iter()
            .find(|rule| (rule.matches)(score))
            .map_or(EndingKind::TaintedRegret, |rule| rule.kind)
    }
}

impl fmt::Display for EndingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One entry of the ordered ending rule list.
#[derive(Clone, Copy)]
pub struct EndingRule {
    pub kind: EndingKind,
    pub matches: fn(&ScoreState) -> bool,
}

impl fmt::Debug for EndingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndingRule").field("kind", &self.kind).finish()
    }
}

/// Ending rules in priority order.
pub const ENDING_RULES: [EndingRule; 3] = [
    EndingRule {
        kind: EndingKind::SettlerProsperity,
        matches: |s| s.gold >= 80 || s.favor_settlers >= 3,
    },
    EndingRule {
        kind: EndingKind::MoralCommunion,
        matches: |s| s.conscience() >= 3 || s.gold < 40,
    },
    EndingRule {
        kind: EndingKind::TaintedRegret,
        matches: |_| true,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn score(gold: i32, favor_settlers: i32, favor_others: i32) -> ScoreState {
        ScoreState {
            gold,
            favor_settlers,
            favor_others,
            testified: false,
            shielded: false,
        }
    }

    #[test]
    fn rich_settler_prospers() {
        assert_eq!(EndingKind::select(&score(90, 1, 0)), EndingKind::SettlerProsperity);
    }

    #[test]
    fn settler_favor_alone_prospers() {
        assert_eq!(EndingKind::select(&score(50, 3, 0)), EndingKind::SettlerProsperity);
    }

    #[test]
    fn poor_player_reaches_communion() {
        assert_eq!(EndingKind::select(&score(30, 0, 0)), EndingKind::MoralCommunion);
    }

    #[test]
    fn flags_count_toward_communion() {
        let mut s = score(60, 0, 1);
        s.testified = true;
        assert_eq!(EndingKind::select(&s), EndingKind::TaintedRegret);
        s.shielded = true;
        assert_eq!(EndingKind::select(&s), EndingKind::MoralCommunion);
    }

    #[test]
    fn neutral_player_falls_through_to_regret() {
        assert_eq!(EndingKind::select(&score(60, 1, 1)), EndingKind::TaintedRegret);
    }

    #[test]
    fn prosperity_outranks_communion() {
        // Matches both the first and second rules.
        let mut s = score(85, 0, 3);
        s.testified = true;
        assert_eq!(EndingKind::select(&s), EndingKind::SettlerProsperity);
    }

    #[test]
    fn thresholds_are_inclusive_where_stated() {
        assert_eq!(EndingKind::select(&score(80, 0, 0)), EndingKind::SettlerProsperity);
        assert_eq!(EndingKind::select(&score(79, 2, 0)), EndingKind::TaintedRegret);
        assert_eq!(EndingKind::select(&score(40, 0, 0)), EndingKind::TaintedRegret);
        assert_eq!(EndingKind::select(&score(39, 0, 0)), EndingKind::MoralCommunion);
    }

    #[test]
    fn titles() {
        assert_eq!(EndingKind::MoralCommunion.to_string(), "Moral Communion");
        assert_eq!(EndingKind::ALL.len(), ENDING_RULES.len());
    }
}

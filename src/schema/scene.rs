use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use super::ending::EndingKind;
use super::score::ScoreEffect;
use crate::core::template::LineTemplate;

/// Newtype wrapper for scene identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneId(pub String);

impl SceneId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SceneId {
    fn from(s: &str) -> Self {
        SceneId(s.to_string())
    }
}

impl From<String> for SceneId {
    fn from(s: String) -> Self {
        SceneId(s)
    }
}

impl Borrow<str> for SceneId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which scene renders each ending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndingTable {
    pub settler_prosperity: SceneId,
    pub moral_communion: SceneId,
    pub tainted_regret: SceneId,
}

impl EndingTable {
    pub fn scene_for(&self, kind: EndingKind) -> &SceneId {
        match kind {
            EndingKind::SettlerProsperity => &self.settler_prosperity,
            EndingKind::MoralCommunion => &self.moral_communion,
            EndingKind::TaintedRegret => &self.tainted_regret,
        }
    }
}

/// A player-selectable branch.
#[derive(Debug, Clone)]
pub struct Choice {
    pub label: String,
    /// Shown as a single line after the choice is taken, before the transition.
    pub response: Option<LineTemplate>,
    pub effect: Option<ScoreEffect>,
    pub goto: SceneId,
}

/// What a scene does once all its lines have been acknowledged.
#[derive(Debug, Clone)]
pub enum Transition {
    /// Offer a choice menu.
    Choices(Vec<Choice>),
    /// Continue to another scene without player input.
    Next(SceneId),
    /// Pick an ending from the current score.
    Dispatch(EndingTable),
    /// The play-through is over.
    End,
}

impl Transition {
    /// Every scene id this transition can lead to.
    pub fn destinations(&self) -> Vec<&SceneId> {
        match self {
            Self::Choices(choices) => choices.iter().map(|c| &c.goto).collect(),
            Self::Next(id) => vec![id],
            Self::Dispatch(table) => EndingKind::ALL
                .iter()
                .map(|kind| table.scene_for(*kind))
                .collect(),
            Self::End => Vec::new(),
        }
    }

    /// True for transitions that proceed without asking the player anything.
    pub fn is_automatic(&self) -> bool {
        matches!(self, Self::Next(_) | Self::Dispatch(_))
    }
}

/// A node in the story graph.
#[derive(Debug, Clone)]
pub struct Scene {
    pub id: SceneId,
    /// Backdrop key handed to the renderer; falls back to the scene id.
    pub backdrop: Option<String>,
    pub lines: Vec<LineTemplate>,
    pub then: Transition,
}

impl Scene {
    pub fn backdrop(&self) -> &str {
        self.backdrop.as_deref().unwrap_or(self.id.as_str())
    }

    pub fn choices(&self) -> &[Choice] {
        match &self.then {
            Transition::Choices(choices) => choices,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> EndingTable {
        EndingTable {
            settler_prosperity: "rich".into(),
            moral_communion: "kind".into(),
            tainted_regret: "sorry".into(),
        }
    }

    #[test]
    fn scene_id_display_and_borrow() {
        let id = SceneId::from("camp");
        assert_eq!(id.to_string(), "camp");
        let borrowed: &str = id.borrow();
        assert_eq!(borrowed, "camp");
    }

    #[test]
    fn ending_table_lookup() {
        let t = table();
        assert_eq!(t.scene_for(EndingKind::MoralCommunion).as_str(), "kind");
        assert_eq!(t.scene_for(EndingKind::TaintedRegret).as_str(), "sorry");
    }

    #[test]
    fn dispatch_destinations_cover_all_endings() {
        let dispatch = Transition::Dispatch(table());
        let dests = dispatch.destinations();
        assert_eq!(dests.len(), 3);
        assert!(Transition::Dispatch(table()).is_automatic());
        assert!(Transition::End.destinations().is_empty());
        assert!(!Transition::End.is_automatic());
    }

    #[test]
    fn backdrop_falls_back_to_id() {
        let scene = Scene {
            id: "river".into(),
            backdrop: None,
            lines: Vec::new(),
            then: Transition::End,
        };
        assert_eq!(scene.backdrop(), "river");
        assert!(scene.choices().is_empty());
    }
}

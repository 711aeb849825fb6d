/// Story graph: loading, validation, and reachability.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use thiserror::Error;

use crate::core::template::{LineTemplate, TemplateError};
use crate::schema::scene::{Choice, EndingTable, Scene, SceneId, Transition};
use crate::schema::score::{ScoreEffect, DEFAULT_STARTING_GOLD};

#[derive(Debug, Error)]
pub enum StoryError {
    #[error("scene '{from}' leads to unknown scene '{to}'")]
    UnknownScene { from: SceneId, to: SceneId },
    #[error("start scene '{0}' does not exist")]
    UnknownStart(SceneId),
    #[error("scene '{0}' offers an empty choice list")]
    EmptyChoices(SceneId),
    #[error("scene '{0}' loops through automatic transitions without ever asking the player")]
    AutomaticCycle(SceneId),
    #[error("scene '{from}' dispatches to '{to}', which does not end the story")]
    DispatchTarget { from: SceneId, to: SceneId },
    #[error("ending scene '{0}' can be reached without an ending being dispatched")]
    UndispatchedEnding(SceneId),
    #[error("template error in scene '{scene}': {source}")]
    Template {
        scene: SceneId,
        source: TemplateError,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// A validated, read-only scene graph.
///
/// Every destination resolves, the start scene exists, and no chain of
/// automatic transitions (`Next` / `Dispatch`) can loop forever. `End`
/// scenes are reachable only through a `Dispatch`, and every `Dispatch`
/// target is an `End` scene, so a finished play-through records exactly
/// one ending.
#[derive(Debug, Clone)]
pub struct StoryGraph {
    title: String,
    start: SceneId,
    starting_gold: i32,
    scenes: FxHashMap<SceneId, Scene>,
}

// RON deserialization helpers. Story files carry raw strings that are
// parsed into templates and ids after loading.

fn default_starting_gold() -> i32 {
    DEFAULT_STARTING_GOLD
}

#[derive(Debug, Deserialize)]
#[serde(rename = "Story")]
struct RonStory {
    #[serde(default)]
    title: String,
    start: String,
    #[serde(default = "default_starting_gold")]
    starting_gold: i32,
    scenes: HashMap<String, RonScene>,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "Scene")]
struct RonScene {
    #[serde(default)]
    backdrop: Option<String>,
    #[serde(default)]
    lines: Vec<String>,
    then: RonTransition,
}

#[derive(Debug, Deserialize)]
enum RonTransition {
    Choices(Vec<RonChoice>),
    Next(String),
    Dispatch(EndingTable),
    End,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "Choice")]
struct RonChoice {
    label: String,
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    effect: Option<ScoreEffect>,
    goto: String,
}

impl StoryGraph {
    /// Load and validate a story from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<StoryGraph, StoryError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse and validate a story from a RON string.
    pub fn parse_ron(input: &str) -> Result<StoryGraph, StoryError> {
        let raw: RonStory = ron::from_str(input)?;
        let mut scenes = FxHashMap::default();

        for (name, ron_scene) in raw.scenes {
            let id = SceneId(name);
            let scene = Self::build_scene(id.clone(), ron_scene)?;
            scenes.insert(id, scene);
        }

        Self::from_scenes(raw.title, SceneId(raw.start), raw.starting_gold, scenes)
    }

    /// Assemble a graph from already-built scenes, validating it.
    pub fn from_scenes(
        title: String,
        start: SceneId,
        starting_gold: i32,
        scenes: FxHashMap<SceneId, Scene>,
    ) -> Result<StoryGraph, StoryError> {
        let graph = StoryGraph {
            title,
            start,
            starting_gold,
            scenes,
        };
        graph.validate()?;
        Ok(graph)
    }

    fn build_scene(id: SceneId, raw: RonScene) -> Result<Scene, StoryError> {
        let parse = |text: &str| {
            LineTemplate::parse(text).map_err(|source| StoryError::Template {
                scene: id.clone(),
                source,
            })
        };

        let lines = raw
            .lines
            .iter()
            .map(|line| parse(line.as_str()))
            .collect::<Result<Vec<_>, _>>()?;

        let then = match raw.then {
            RonTransition::Choices(choices) => {
                let mut built = Vec::with_capacity(choices.len());
                for choice in choices {
                    let response = choice.response.as_deref().map(&parse).transpose()?;
                    built.push(Choice {
                        label: choice.label,
                        response,
                        effect: choice.effect.filter(|e| !e.is_empty()),
                        goto: SceneId(choice.goto),
                    });
                }
                Transition::Choices(built)
            }
            RonTransition::Next(next) => Transition::Next(SceneId(next)),
            RonTransition::Dispatch(table) => Transition::Dispatch(table),
            RonTransition::End => Transition::End,
        };

        Ok(Scene {
            id,
            backdrop: raw.backdrop,
            lines,
            then,
        })
    }

    /// Check graph closure and the other load-time invariants.
    pub fn validate(&self) -> Result<(), StoryError> {
        if !self.scenes.contains_key(&self.start) {
            return Err(StoryError::UnknownStart(self.start.clone()));
        }

        // Sorted so the first reported error is stable across runs.
        let mut ids: Vec<&SceneId> = self.scenes.keys().collect();
        ids.sort();

        let mut dispatched: FxHashSet<&SceneId> = FxHashSet::default();
        let mut entered_directly: FxHashSet<&SceneId> = FxHashSet::default();

        for id in &ids {
            let scene = &self.scenes[*id];
            if let Transition::Choices(choices) = &scene.then {
                if choices.is_empty() {
                    return Err(StoryError::EmptyChoices((*id).clone()));
                }
            }
            for dest in scene.then.destinations() {
                if !self.scenes.contains_key(dest) {
                    return Err(StoryError::UnknownScene {
                        from: (*id).clone(),
                        to: dest.clone(),
                    });
                }
            }
            match &scene.then {
                Transition::Dispatch(_) => {
                    for dest in scene.then.destinations() {
                        if !matches!(self.scenes[dest].then, Transition::End) {
                            return Err(StoryError::DispatchTarget {
                                from: (*id).clone(),
                                to: dest.clone(),
                            });
                        }
                        dispatched.insert(dest);
                    }
                }
                _ => entered_directly.extend(scene.then.destinations()),
            }
        }

        for id in &ids {
            let is_ending = matches!(self.scenes[*id].then, Transition::End);
            let undispatched = **id == self.start
                || entered_directly.contains(*id)
                || !dispatched.contains(*id);
            if is_ending && undispatched {
                return Err(StoryError::UndispatchedEnding((*id).clone()));
            }
        }

        self.check_automatic_cycles()
    }

    /// Three-colour DFS over the `Next` / `Dispatch` edges. Meeting a scene
    /// that is still on the stack means the player could never leave.
    fn check_automatic_cycles(&self) -> Result<(), StoryError> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            OnStack,
            Done,
        }

        let mut marks: FxHashMap<&SceneId, Mark> = FxHashMap::default();
        let mut roots: Vec<&SceneId> = self.scenes.keys().collect();
        roots.sort();

        for root in roots {
            if marks.contains_key(root) {
                continue;
            }
            marks.insert(root, Mark::OnStack);
            let mut stack = vec![(root, self.automatic_edges(root))];

            loop {
                let Some((id, pending)) = stack.last_mut() else {
                    break;
                };
                let id = *id;
                match pending.pop() {
                    Some(next) => match marks.get(next).copied() {
                        Some(Mark::OnStack) => return Err(StoryError::AutomaticCycle(next.clone())),
                        Some(Mark::Done) => {}
                        None => {
                            marks.insert(next, Mark::OnStack);
                            stack.push((next, self.automatic_edges(next)));
                        }
                    },
                    None => {
                        marks.insert(id, Mark::Done);
                        stack.pop();
                    }
                }
            }
        }
        Ok(())
    }

    fn automatic_edges(&self, id: &SceneId) -> Vec<&SceneId> {
        match self.scenes.get(id) {
            Some(scene) if scene.then.is_automatic() => scene.then.destinations(),
            _ => Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start(&self) -> &SceneId {
        &self.start
    }

    pub fn starting_gold(&self) -> i32 {
        self.starting_gold
    }

    pub fn scene(&self, id: &str) -> Option<&Scene> {
        self.scenes.get(id)
    }

    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.values()
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Scenes reachable from the start scene.
    pub fn reachable(&self) -> FxHashSet<&SceneId> {
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::from([&self.start]);
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(scene) = self.scenes.get(id) {
                queue.extend(scene.then.destinations());
            }
        }
        seen
    }

    /// Scenes no play-through can visit, sorted by id.
    pub fn unreachable(&self) -> Vec<&SceneId> {
        let reachable = self.reachable();
        let mut ids: Vec<&SceneId> = self
            .scenes
            .keys()
            .filter(|id| !reachable.contains(id))
            .collect();
        ids.sort();
        ids
    }
}

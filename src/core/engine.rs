/// The narrative engine: scene flow, scoring, and ending dispatch.
///
/// Drives a [`RevealScheduler`] with each scene's lines and runs the
/// scene's transition once the player has acknowledged the last one.
/// All input arrives through [`NarrativeEngine::advance`],
/// [`NarrativeEngine::choose`] and [`NarrativeEngine::tick`]; each returns
/// a [`Step`] telling the host whether to schedule another reveal tick.

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::config::{ConfigError, PresentationConfig};
use crate::core::presenter::Presenter;
use crate::core::scheduler::{AdvanceOutcome, RevealPhase, RevealScheduler, Tick, TickOutcome};
use crate::core::story::{StoryError, StoryGraph};
use crate::schema::ending::EndingKind;
use crate::schema::scene::{SceneId, Transition};
use crate::schema::score::ScoreState;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("story error: {0}")]
    Story(#[from] StoryError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("unknown scene: {0}")]
    UnknownScene(SceneId),
    #[error("no story was provided to the builder")]
    MissingStory,
}

/// What the host should do after handing the engine an input or tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The input had no effect.
    Ignored,
    /// Handled; nothing to schedule until the next player input.
    Waiting,
    /// Handled; call [`NarrativeEngine::tick`] with this token after the
    /// reveal interval.
    Schedule(Tick),
}

impl Step {
    pub fn tick(&self) -> Option<Tick> {
        match self {
            Self::Schedule(tick) => Some(*tick),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    /// Not started.
    Title,
    /// Lines are being revealed or acknowledged.
    Playing,
    /// A choice menu is up.
    AwaitingChoice,
    /// An ending scene was played to its last line.
    Finished,
}

/// One step of the play-through transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
    Entered(SceneId),
    Chose {
        scene: SceneId,
        index: usize,
        label: String,
    },
    Ending(EndingKind),
}

/// What runs once the scheduler drains.
#[derive(Debug, Clone)]
enum Continuation {
    /// Run the scene's own transition.
    ExitScene(SceneId),
    /// A choice response was acknowledged; go to its destination.
    Goto(SceneId),
}

enum Flow {
    Enter(SceneId),
    Stop(Step),
}

/// The top-level engine. Built via `NarrativeEngine::builder()`.
pub struct NarrativeEngine {
    graph: StoryGraph,
    config: PresentationConfig,
    score: ScoreState,
    scheduler: RevealScheduler,
    phase: EnginePhase,
    current: Option<SceneId>,
    pending: Option<Continuation>,
    ending: Option<EndingKind>,
    history: Vec<HistoryEntry>,
}

/// Builder for constructing a `NarrativeEngine`.
pub struct NarrativeEngineBuilder {
    story: Option<StoryGraph>,
    story_path: Option<PathBuf>,
    config: Option<PresentationConfig>,
    config_path: Option<PathBuf>,
    reveal_interval: Option<Duration>,
    skip_hint: Option<String>,
}

impl NarrativeEngine {
    pub fn builder() -> NarrativeEngineBuilder {
        NarrativeEngineBuilder {
            story: None,
            story_path: None,
            config: None,
            config_path: None,
            reveal_interval: None,
            skip_hint: None,
        }
    }

    /// An engine over `graph` with default presentation settings.
    pub fn new(graph: StoryGraph) -> Self {
        Self::with_config(graph, PresentationConfig::default())
    }

    fn with_config(graph: StoryGraph, config: PresentationConfig) -> Self {
        let score = ScoreState::new(graph.starting_gold());
        Self {
            graph,
            config,
            score,
            scheduler: RevealScheduler::new(),
            phase: EnginePhase::Title,
            current: None,
            pending: None,
            ending: None,
            history: Vec::new(),
        }
    }

    /// Begin a fresh play-through at the story's start scene.
    ///
    /// Calling this again mid-game restarts with a new score.
    pub fn start(&mut self, presenter: &mut dyn Presenter) -> Result<Step, EngineError> {
        info!(title = self.graph.title(), start = %self.graph.start(), "starting play-through");
        self.scheduler.cancel();
        self.score = ScoreState::new(self.graph.starting_gold());
        self.history.clear();
        self.ending = None;
        self.pending = None;
        self.current = None;
        self.phase = EnginePhase::Playing;
        presenter.display_status(&self.score);
        let start = self.graph.start().clone();
        self.follow(Flow::Enter(start), presenter)
    }

    /// The single skip/advance input.
    ///
    /// While a line is being revealed this shows it in full; once it is
    /// fully shown this moves to the next line, or runs the scene's
    /// transition when none remain.
    pub fn advance(&mut self, presenter: &mut dyn Presenter) -> Result<Step, EngineError> {
        if self.phase != EnginePhase::Playing {
            debug!(phase = ?self.phase, "advance ignored");
            return Ok(Step::Ignored);
        }
        match self.scheduler.advance() {
            AdvanceOutcome::Skipped => {
                self.show_text(presenter);
                Ok(Step::Waiting)
            }
            AdvanceOutcome::NextLine(tick) => {
                self.show_text(presenter);
                Ok(tick.map_or(Step::Waiting, Step::Schedule))
            }
            AdvanceOutcome::Drained => match self.pending.take() {
                Some(Continuation::ExitScene(id)) => {
                    let flow = self.exit_scene(&id, presenter)?;
                    self.follow(flow, presenter)
                }
                Some(Continuation::Goto(id)) => self.follow(Flow::Enter(id), presenter),
                None => Ok(Step::Ignored),
            },
            AdvanceOutcome::Ignored => Ok(Step::Ignored),
        }
    }

    /// Take the choice at `index` in the menu currently offered.
    ///
    /// Out-of-range indices and input arriving while no menu is up are
    /// ignored, so a double click cannot apply an effect twice.
    pub fn choose(
        &mut self,
        index: usize,
        presenter: &mut dyn Presenter,
    ) -> Result<Step, EngineError> {
        if self.phase != EnginePhase::AwaitingChoice {
            debug!(phase = ?self.phase, index, "choice ignored");
            return Ok(Step::Ignored);
        }
        let Some(scene_id) = self.current.clone() else {
            return Ok(Step::Ignored);
        };
        let scene = self
            .graph
            .scene(scene_id.as_str())
            .ok_or_else(|| EngineError::UnknownScene(scene_id.clone()))?;
        let Some(choice) = scene.choices().get(index) else {
            debug!(scene = %scene_id, index, "invalid choice index ignored");
            return Ok(Step::Ignored);
        };

        info!(scene = %scene_id, index, label = %choice.label, "choice taken");
        if let Some(effect) = &choice.effect {
            effect.apply(&mut self.score);
            debug!(score = ?self.score, "score updated");
            presenter.display_status(&self.score);
        }
        self.history.push(HistoryEntry::Chose {
            scene: scene_id.clone(),
            index,
            label: choice.label.clone(),
        });
        presenter.clear_choices();
        self.phase = EnginePhase::Playing;

        let goto = choice.goto.clone();
        match &choice.response {
            Some(response) => {
                let line = response.render(&self.score);
                self.pending = Some(Continuation::Goto(goto));
                let tick = self.scheduler.play([line]);
                self.show_text(presenter);
                Ok(tick.map_or(Step::Waiting, Step::Schedule))
            }
            None => self.follow(Flow::Enter(goto), presenter),
        }
    }

    /// Reveal the next character if `tick` is still current.
    pub fn tick(&mut self, tick: Tick, presenter: &mut dyn Presenter) -> Step {
        match self.scheduler.tick(tick) {
            TickOutcome::Continue(next) => {
                self.show_text(presenter);
                Step::Schedule(next)
            }
            TickOutcome::LineComplete => {
                self.show_text(presenter);
                Step::Waiting
            }
            TickOutcome::Stale => Step::Ignored,
        }
    }

    /// Press advance until a choice menu is up or the game is over.
    pub fn skip_to_decision(&mut self, presenter: &mut dyn Presenter) -> Result<(), EngineError> {
        while self.phase == EnginePhase::Playing {
            if self.advance(presenter)? == Step::Ignored {
                break;
            }
        }
        Ok(())
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    pub fn current_scene(&self) -> Option<&SceneId> {
        self.current.as_ref()
    }

    /// The ending selected for this play-through, once dispatched.
    pub fn ending(&self) -> Option<EndingKind> {
        self.ending
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn is_finished(&self) -> bool {
        self.phase == EnginePhase::Finished
    }

    /// Labels of the menu currently offered; empty when no menu is up.
    pub fn choices(&self) -> Vec<&str> {
        if self.phase != EnginePhase::AwaitingChoice {
            return Vec::new();
        }
        self.current
            .as_ref()
            .and_then(|id| self.graph.scene(id.as_str()))
            .map(|scene| scene.choices().iter().map(|c| c.label.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn visible_text(&self) -> &str {
        self.scheduler.visible_text()
    }

    pub fn reveal_phase(&self) -> RevealPhase {
        self.scheduler.phase()
    }

    pub fn reveal_interval(&self) -> Duration {
        self.config.reveal_interval()
    }

    pub fn config(&self) -> &PresentationConfig {
        &self.config
    }

    pub fn graph(&self) -> &StoryGraph {
        &self.graph
    }

    fn follow(&mut self, mut flow: Flow, presenter: &mut dyn Presenter) -> Result<Step, EngineError> {
        loop {
            match flow {
                Flow::Stop(step) => return Ok(step),
                Flow::Enter(id) => flow = self.enter_scene(id, presenter)?,
            }
        }
    }

    fn enter_scene(&mut self, id: SceneId, presenter: &mut dyn Presenter) -> Result<Flow, EngineError> {
        let scene = self
            .graph
            .scene(id.as_str())
            .ok_or_else(|| EngineError::UnknownScene(id.clone()))?;
        let lines: Vec<String> = scene.lines.iter().map(|l| l.render(&self.score)).collect();
        info!(scene = %id, lines = lines.len(), "entering scene");

        presenter.clear_choices();
        presenter.render_backdrop(scene.backdrop());
        self.history.push(HistoryEntry::Entered(id.clone()));
        self.current = Some(id.clone());
        self.phase = EnginePhase::Playing;

        let tick = self.scheduler.play(lines);
        if self.scheduler.phase() == RevealPhase::Done {
            presenter.display_text("", None);
            return self.exit_scene(&id, presenter);
        }
        self.pending = Some(Continuation::ExitScene(id));
        self.show_text(presenter);
        Ok(Flow::Stop(tick.map_or(Step::Waiting, Step::Schedule)))
    }

    fn exit_scene(&mut self, id: &SceneId, presenter: &mut dyn Presenter) -> Result<Flow, EngineError> {
        let scene = self
            .graph
            .scene(id.as_str())
            .ok_or_else(|| EngineError::UnknownScene(id.clone()))?;
        match &scene.then {
            Transition::Choices(choices) => {
                let labels: Vec<&str> = choices.iter().map(|c| c.label.as_str()).collect();
                presenter.display_choices(&labels);
                self.phase = EnginePhase::AwaitingChoice;
                Ok(Flow::Stop(Step::Waiting))
            }
            Transition::Next(next) => Ok(Flow::Enter(next.clone())),
            Transition::Dispatch(table) => {
                let kind = EndingKind::select(&self.score);
                info!(
                    ending = %kind,
                    gold = self.score.gold,
                    favor_settlers = self.score.favor_settlers,
                    conscience = self.score.conscience(),
                    "ending selected"
                );
                self.ending = Some(kind);
                self.history.push(HistoryEntry::Ending(kind));
                Ok(Flow::Enter(table.scene_for(kind).clone()))
            }
            Transition::End => {
                info!(scene = %id, ending = ?self.ending, "play-through finished");
                self.phase = EnginePhase::Finished;
                presenter.show_ending(self.ending, &self.score);
                Ok(Flow::Stop(Step::Waiting))
            }
        }
    }

    fn show_text(&self, presenter: &mut dyn Presenter) {
        let hint = (self.scheduler.phase() == RevealPhase::AwaitingAck)
            .then_some(self.config.skip_hint.as_str());
        presenter.display_text(self.scheduler.visible_text(), hint);
    }
}

impl NarrativeEngineBuilder {
    /// Use an already-loaded story.
    pub fn story(mut self, graph: StoryGraph) -> Self {
        self.story = Some(graph);
        self
    }

    /// Load the story from a RON file at build time.
    pub fn story_file(mut self, path: impl AsRef<Path>) -> Self {
        self.story_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn presentation(mut self, config: PresentationConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load presentation settings from a RON file at build time.
    pub fn presentation_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Override the delay between revealed characters.
    pub fn reveal_interval(mut self, interval: Duration) -> Self {
        self.reveal_interval = Some(interval);
        self
    }

    pub fn skip_hint(mut self, hint: impl Into<String>) -> Self {
        self.skip_hint = Some(hint.into());
        self
    }

    pub fn build(self) -> Result<NarrativeEngine, EngineError> {
        let graph = match (self.story, self.story_path) {
            (Some(graph), _) => graph,
            (None, Some(path)) => StoryGraph::load_from_ron(&path)?,
            (None, None) => return Err(EngineError::MissingStory),
        };

        let mut config = match (self.config, self.config_path) {
            (Some(config), _) => config,
            (None, Some(path)) => PresentationConfig::load_from_ron(&path)?,
            (None, None) => PresentationConfig::default(),
        };
        if let Some(interval) = self.reveal_interval {
            config.reveal_interval_ms = u64::try_from(interval.as_millis())
                .unwrap_or(u64::MAX)
                .max(1);
        }
        if let Some(hint) = self.skip_hint {
            config.skip_hint = hint;
        }

        Ok(NarrativeEngine::with_config(graph, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::presenter::SilentPresenter;

    const STORY: &str = r#"Story(
        title: "Ford",
        start: "bank",
        starting_gold: 50,
        scenes: {
            "bank": Scene(
                lines: ["The river is high.", "A ferryman waits."],
                then: Choices([
                    Choice(
                        label: "Pay the ferryman",
                        response: Some("He takes your coin."),
                        effect: Some((gold: -20)),
                        goto: "crossing",
                    ),
                    Choice(
                        label: "Wade across",
                        goto: "crossing",
                    ),
                ]),
            ),
            "crossing": Scene(
                lines: ["You reach the far bank with {gold} gold."],
                then: Next("verdict"),
            ),
            "verdict": Scene(
                then: Dispatch((
                    settler_prosperity: "rich",
                    moral_communion: "poor",
                    tainted_regret: "plain",
                )),
            ),
            "rich": Scene(lines: ["Rich."], then: End),
            "poor": Scene(lines: ["Poor but whole."], then: End),
            "plain": Scene(lines: ["Plain."], then: End),
        },
    )"#;

    fn engine() -> NarrativeEngine {
        NarrativeEngine::new(StoryGraph::parse_ron(STORY).unwrap())
    }

    #[test]
    fn start_enters_first_scene() {
        let mut e = engine();
        assert_eq!(e.phase(), EnginePhase::Title);
        let step = e.start(&mut SilentPresenter).unwrap();
        assert!(matches!(step, Step::Schedule(_)));
        assert_eq!(e.phase(), EnginePhase::Playing);
        assert_eq!(e.current_scene().map(|s| s.as_str()), Some("bank"));
        assert_eq!(e.score().gold, 50);
    }

    #[test]
    fn choices_only_after_lines_acknowledged() {
        let mut e = engine();
        let mut p = SilentPresenter;
        e.start(&mut p).unwrap();
        assert!(e.choices().is_empty());
        // skip, ack, skip, ack
        for _ in 0..3 {
            e.advance(&mut p).unwrap();
            assert!(e.choices().is_empty());
        }
        e.advance(&mut p).unwrap();
        assert_eq!(e.phase(), EnginePhase::AwaitingChoice);
        assert_eq!(e.choices(), vec!["Pay the ferryman", "Wade across"]);
    }

    #[test]
    fn response_line_plays_before_transition() {
        let mut e = engine();
        let mut p = SilentPresenter;
        e.start(&mut p).unwrap();
        e.skip_to_decision(&mut p).unwrap();

        let step = e.choose(0, &mut p).unwrap();
        assert!(matches!(step, Step::Schedule(_)));
        assert_eq!(e.score().gold, 30);
        assert_eq!(e.current_scene().map(|s| s.as_str()), Some("bank"));

        e.advance(&mut p).unwrap(); // skip
        assert_eq!(e.visible_text(), "He takes your coin.");
        e.advance(&mut p).unwrap(); // ack
        assert_eq!(e.current_scene().map(|s| s.as_str()), Some("crossing"));
    }

    #[test]
    fn choice_without_response_transitions_immediately() {
        let mut e = engine();
        let mut p = SilentPresenter;
        e.start(&mut p).unwrap();
        e.skip_to_decision(&mut p).unwrap();
        e.choose(1, &mut p).unwrap();
        assert_eq!(e.current_scene().map(|s| s.as_str()), Some("crossing"));
        assert_eq!(e.score().gold, 50);
    }

    #[test]
    fn second_choose_is_ignored() {
        let mut e = engine();
        let mut p = SilentPresenter;
        e.start(&mut p).unwrap();
        e.skip_to_decision(&mut p).unwrap();
        e.choose(0, &mut p).unwrap();
        assert_eq!(e.choose(0, &mut p).unwrap(), Step::Ignored);
        assert_eq!(e.score().gold, 30);
    }

    #[test]
    fn invalid_choice_index_ignored() {
        let mut e = engine();
        let mut p = SilentPresenter;
        e.start(&mut p).unwrap();
        e.skip_to_decision(&mut p).unwrap();
        assert_eq!(e.choose(7, &mut p).unwrap(), Step::Ignored);
        assert_eq!(e.phase(), EnginePhase::AwaitingChoice);
        assert_eq!(e.score().gold, 50);
    }

    #[test]
    fn ending_lines_interpolate_score() {
        let mut e = engine();
        let mut p = SilentPresenter;
        e.start(&mut p).unwrap();
        e.skip_to_decision(&mut p).unwrap();
        e.choose(0, &mut p).unwrap();
        e.advance(&mut p).unwrap();
        e.advance(&mut p).unwrap();
        e.advance(&mut p).unwrap(); // skip crossing line
        assert_eq!(e.visible_text(), "You reach the far bank with 30 gold.");
    }

    #[test]
    fn dispatch_selects_ending_from_score() {
        let mut e = engine();
        let mut p = SilentPresenter;
        e.start(&mut p).unwrap();
        e.skip_to_decision(&mut p).unwrap();
        e.choose(0, &mut p).unwrap(); // gold 30 → communion
        e.skip_to_decision(&mut p).unwrap();
        assert!(e.is_finished());
        assert_eq!(e.ending(), Some(EndingKind::MoralCommunion));
        assert!(e
            .history()
            .contains(&HistoryEntry::Entered(SceneId::from("poor"))));
    }

    #[test]
    fn neutral_path_reaches_regret() {
        let mut e = engine();
        let mut p = SilentPresenter;
        e.start(&mut p).unwrap();
        e.skip_to_decision(&mut p).unwrap();
        e.choose(1, &mut p).unwrap();
        e.skip_to_decision(&mut p).unwrap();
        assert_eq!(e.ending(), Some(EndingKind::TaintedRegret));
    }

    #[test]
    fn input_after_finish_is_ignored() {
        let mut e = engine();
        let mut p = SilentPresenter;
        e.start(&mut p).unwrap();
        e.skip_to_decision(&mut p).unwrap();
        e.choose(1, &mut p).unwrap();
        e.skip_to_decision(&mut p).unwrap();
        assert_eq!(e.advance(&mut p).unwrap(), Step::Ignored);
        assert_eq!(e.choose(0, &mut p).unwrap(), Step::Ignored);
    }

    #[test]
    fn restart_resets_score_and_history() {
        let mut e = engine();
        let mut p = SilentPresenter;
        e.start(&mut p).unwrap();
        e.skip_to_decision(&mut p).unwrap();
        e.choose(0, &mut p).unwrap();
        assert_eq!(e.score().gold, 30);

        e.start(&mut p).unwrap();
        assert_eq!(e.score().gold, 50);
        assert_eq!(e.ending(), None);
        assert_eq!(e.history(), &[HistoryEntry::Entered(SceneId::from("bank"))]);
    }

    #[test]
    fn builder_requires_a_story() {
        assert!(matches!(
            NarrativeEngine::builder().build(),
            Err(EngineError::MissingStory)
        ));
    }

    #[test]
    fn builder_overrides_presentation() {
        let e = NarrativeEngine::builder()
            .story(StoryGraph::parse_ron(STORY).unwrap())
            .reveal_interval(Duration::from_millis(32))
            .skip_hint("more...")
            .build()
            .unwrap();
        assert_eq!(e.reveal_interval(), Duration::from_millis(32));
        assert_eq!(e.config().skip_hint, "more...");
    }

    #[test]
    fn builder_loads_files() {
        let e = NarrativeEngine::builder()
            .story_file("tests/fixtures/crossroads.ron")
            .presentation_file("tests/fixtures/presentation.ron")
            .build()
            .unwrap();
        assert_eq!(e.graph().start().as_str(), "crossroads");
        assert_eq!(e.config().reveal_interval_ms, 28);
    }

    #[test]
    fn step_tick_accessor() {
        assert_eq!(Step::Waiting.tick(), None);
        let tick = Tick { generation: 4 };
        assert_eq!(Step::Schedule(tick).tick(), Some(tick));
    }
}

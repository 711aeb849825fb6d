//! Shared test doubles.

use goldrush_story::core::engine::{NarrativeEngine, Step};
use goldrush_story::core::presenter::Presenter;
use goldrush_story::schema::ending::EndingKind;
use goldrush_story::schema::score::ScoreState;

/// Records everything the engine shows.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub backdrops: Vec<String>,
    pub text: String,
    pub hint: Option<String>,
    pub text_updates: Vec<String>,
    pub status: Vec<ScoreState>,
    pub choices: Vec<String>,
    pub menus_shown: usize,
    pub ending: Option<Option<EndingKind>>,
}

impl Presenter for RecordingPresenter {
    fn render_backdrop(&mut self, backdrop: &str) {
        self.backdrops.push(backdrop.to_string());
    }

    fn display_text(&mut self, text: &str, hint: Option<&str>) {
        self.text = text.to_string();
        self.hint = hint.map(str::to_string);
        self.text_updates.push(text.to_string());
    }

    fn display_status(&mut self, score: &ScoreState) {
        self.status.push(score.clone());
    }

    fn display_choices(&mut self, labels: &[&str]) {
        self.choices = labels.iter().map(|l| l.to_string()).collect();
        self.menus_shown += 1;
    }

    fn clear_choices(&mut self) {
        self.choices.clear();
    }

    fn show_ending(&mut self, ending: Option<EndingKind>, _score: &ScoreState) {
        self.ending = Some(ending);
    }
}

/// Fire scheduled ticks until the current line is fully revealed.
#[allow(dead_code)]
pub fn reveal_line(engine: &mut NarrativeEngine, presenter: &mut RecordingPresenter, mut step: Step) {
    while let Step::Schedule(tick) = step {
        step = engine.tick(tick, presenter);
    }
}

/// Acknowledge lines until a menu is up, then take `choices` in order.
#[allow(dead_code)]
pub fn play_choices(
    engine: &mut NarrativeEngine,
    presenter: &mut RecordingPresenter,
    choices: &[usize],
) {
    engine.start(presenter).unwrap();
    for &index in choices {
        engine.skip_to_decision(presenter).unwrap();
        assert!(
            !engine.choices().is_empty(),
            "expected a menu before choice {index}, scene {:?}",
            engine.current_scene()
        );
        engine.choose(index, presenter).unwrap();
    }
    engine.skip_to_decision(presenter).unwrap();
}

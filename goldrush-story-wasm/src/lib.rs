//! WASM bindings for goldrush-story: the browser front end for the game.
//!
//! The page owns the timer. Every call that can start a reveal returns a
//! step object `{"tick": n | null, "ignored": bool}`; when `tick` is set
//! the page calls `tick(n)` after `reveal_interval_ms()` milliseconds.
//! `n` is a `u32`, so it stays a plain JS number on both sides.
//! Ticks from a superseded line are ignored, so the page never has to
//! cancel its timers. `view()` returns everything to draw.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use goldrush_story::content;
use goldrush_story::core::engine::{NarrativeEngine, Step};
use goldrush_story::core::presenter::Presenter;
use goldrush_story::core::scheduler::Tick;
use goldrush_story::core::story::StoryGraph;
use goldrush_story::schema::ending::EndingKind;
use goldrush_story::schema::score::ScoreState;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn init() {
    tracing_wasm::set_as_global_default();
}

// ---------------------------------------------------------------------------
// JSON types for the WASM boundary
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
struct WebView {
    backdrop: String,
    text: String,
    hint: Option<String>,
    gold: i32,
    choices: Vec<String>,
    ending: Option<String>,
    finished: bool,
}

#[derive(Serialize)]
struct StepInfo {
    tick: Option<u32>,
    ignored: bool,
}

impl From<Step> for StepInfo {
    fn from(step: Step) -> Self {
        StepInfo {
            tick: step.tick().map(|t| t.generation),
            ignored: step == Step::Ignored,
        }
    }
}

impl Presenter for WebView {
    fn render_backdrop(&mut self, backdrop: &str) {
        self.backdrop = backdrop.to_string();
    }

    fn display_text(&mut self, text: &str, hint: Option<&str>) {
        self.text = text.to_string();
        self.hint = hint.map(str::to_string);
    }

    fn display_status(&mut self, score: &ScoreState) {
        self.gold = score.gold;
    }

    fn display_choices(&mut self, labels: &[&str]) {
        self.choices = labels.iter().map(|l| l.to_string()).collect();
    }

    fn clear_choices(&mut self) {
        self.choices.clear();
    }

    fn show_ending(&mut self, ending: Option<EndingKind>, score: &ScoreState) {
        self.ending = Some(ending.map_or("The End", |kind| kind.title()).to_string());
        self.gold = score.gold;
        self.finished = true;
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
}

// ---------------------------------------------------------------------------
// GoldRushGame: the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct GoldRushGame {
    engine: NarrativeEngine,
    view: WebView,
}

#[wasm_bindgen]
impl GoldRushGame {
    /// Load the bundled Gold Country story.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<GoldRushGame, JsError> {
        let graph = content::gold_country()
            .map_err(|e| JsError::new(&format!("Story load error: {e}")))?;
        Ok(Self::with_graph(graph))
    }

    /// Load a story from RON source instead of the bundled one.
    pub fn from_ron(source: &str) -> Result<GoldRushGame, JsError> {
        let graph = StoryGraph::parse_ron(source)
            .map_err(|e| JsError::new(&format!("Story parse error: {e}")))?;
        Ok(Self::with_graph(graph))
    }

    pub fn title(&self) -> String {
        self.engine.graph().title().to_string()
    }

    /// Begin a play-through. Returns a step object.
    pub fn start(&mut self) -> Result<String, JsError> {
        self.view = WebView::default();
        let step = self
            .engine
            .start(&mut self.view)
            .map_err(|e| JsError::new(&format!("Engine error: {e}")))?;
        to_json(&StepInfo::from(step))
    }

    /// Same as `start`; kept as the name the page's restart button uses.
    pub fn restart(&mut self) -> Result<String, JsError> {
        self.start()
    }

    /// The skip/advance input (click or Enter). Returns a step object.
    pub fn advance(&mut self) -> Result<String, JsError> {
        let step = self
            .engine
            .advance(&mut self.view)
            .map_err(|e| JsError::new(&format!("Engine error: {e}")))?;
        to_json(&StepInfo::from(step))
    }

    /// Pick a choice from the current menu. Returns a step object.
    pub fn choose(&mut self, index: usize) -> Result<String, JsError> {
        let step = self
            .engine
            .choose(index, &mut self.view)
            .map_err(|e| JsError::new(&format!("Engine error: {e}")))?;
        to_json(&StepInfo::from(step))
    }

    /// Fire a scheduled reveal tick. Returns a step object.
    pub fn tick(&mut self, generation: u32) -> Result<String, JsError> {
        let step = self.engine.tick(Tick { generation }, &mut self.view);
        to_json(&StepInfo::from(step))
    }

    /// Everything the page draws, as JSON.
    pub fn view(&self) -> Result<String, JsError> {
        to_json(&self.view)
    }

    pub fn reveal_interval_ms(&self) -> u32 {
        u32::try_from(self.engine.config().reveal_interval_ms).unwrap_or(u32::MAX)
    }

    pub fn skip_hint(&self) -> String {
        self.engine.config().skip_hint.clone()
    }
}

impl GoldRushGame {
    fn with_graph(graph: StoryGraph) -> Self {
        tracing::info!(title = graph.title(), scenes = graph.len(), "story loaded");
        GoldRushGame {
            engine: NarrativeEngine::new(graph),
            view: WebView::default(),
        }
    }
}

/// The engine's view of the outside world.
///
/// A host implements this to draw backdrops, show text and choices, and
/// report the ending. The engine never reads anything back.

use crate::schema::ending::EndingKind;
use crate::schema::score::ScoreState;

pub trait Presenter {
    /// Draw the decorative backdrop for a scene.
    fn render_backdrop(&mut self, backdrop: &str);

    /// Replace the text box contents. `hint` is set once the line is
    /// fully revealed and the player is expected to press advance.
    fn display_text(&mut self, text: &str, hint: Option<&str>);

    /// Refresh the status readout after the score changed.
    fn display_status(&mut self, score: &ScoreState);

    /// Offer a choice menu; the player answers with an index into `labels`.
    fn display_choices(&mut self, labels: &[&str]);

    fn clear_choices(&mut self);

    /// The last line of an ending scene was acknowledged.
    fn show_ending(&mut self, ending: Option<EndingKind>, score: &ScoreState);
}

/// A presenter that discards everything, for headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentPresenter;

impl Presenter for SilentPresenter {
    fn render_backdrop(&mut self, _backdrop: &str) {}
    fn display_text(&mut self, _text: &str, _hint: Option<&str>) {}
    fn display_status(&mut self, _score: &ScoreState) {}
    fn display_choices(&mut self, _labels: &[&str]) {}
    fn clear_choices(&mut self) {}
    fn show_ending(&mut self, _ending: Option<EndingKind>, _score: &ScoreState) {}
}

/// Headless play-through: drives the Gold Country story without a terminal UI.
///
/// Plays the same story three times with scripted choices, firing every
/// reveal tick immediately, and prints each full line and the ending.
///
/// Run with: cargo run --example headless_playthrough

use goldrush_story::content;
use goldrush_story::core::engine::{HistoryEntry, NarrativeEngine, Step};
use goldrush_story::core::presenter::Presenter;
use goldrush_story::schema::ending::EndingKind;
use goldrush_story::schema::score::ScoreState;

/// Prints only completed lines.
struct TranscriptPresenter;

impl Presenter for TranscriptPresenter {
    fn render_backdrop(&mut self, backdrop: &str) {
        println!("\n  [{}]", backdrop);
    }

    fn display_text(&mut self, text: &str, hint: Option<&str>) {
        if hint.is_some() {
            println!("  {}", text);
        }
    }

    fn display_status(&mut self, score: &ScoreState) {
        println!(
            "  (gold {}, settlers {}, others {})",
            score.gold, score.favor_settlers, score.favor_others
        );
    }

    fn display_choices(&mut self, labels: &[&str]) {
        for (i, label) in labels.iter().enumerate() {
            println!("    {}. {}", i + 1, label);
        }
    }

    fn clear_choices(&mut self) {}

    fn show_ending(&mut self, ending: Option<EndingKind>, score: &ScoreState) {
        let title = ending.map_or("The End", |kind| kind.title());
        println!("\n  *** {} *** (gold {})", title, score.gold);
    }
}

/// Reveal every line to the end, acknowledge it, and stop at a menu.
fn run_to_decision(engine: &mut NarrativeEngine, presenter: &mut TranscriptPresenter, mut step: Step) {
    loop {
        while let Step::Schedule(tick) = step {
            step = engine.tick(tick, presenter);
        }
        step = engine.advance(presenter).expect("advance failed");
        if step == Step::Ignored {
            return;
        }
    }
}

fn main() {
    let graph = content::gold_country().expect("Failed to load bundled story");
    let mut engine = NarrativeEngine::new(graph);
    let mut presenter = TranscriptPresenter;

    let routes: [(&str, &[usize]); 3] = [
        ("The prospector", &[1, 0, 2, 2, 0, 0]),
        ("The witness", &[0, 1, 2, 3, 1, 2]),
        ("The bystander", &[1, 2, 2, 2, 2, 1]),
    ];

    for (name, choices) in routes {
        println!("\n=== {} ===", name);
        let step = engine.start(&mut presenter).expect("Failed to start");
        run_to_decision(&mut engine, &mut presenter, step);

        for &index in choices {
            let label = engine.choices().get(index).map(|l| l.to_string());
            println!("  > {}", label.unwrap_or_default());
            let step = engine.choose(index, &mut presenter).expect("Choice failed");
            run_to_decision(&mut engine, &mut presenter, step);
        }

        assert!(engine.is_finished(), "route '{}' did not finish", name);
        let visited = engine
            .history()
            .iter()
            .filter(|entry| matches!(entry, HistoryEntry::Entered(_)))
            .count();
        println!("  {} scenes visited", visited);
    }
}

/// Play: runs a story in the terminal with a typewriter text reveal.
///
/// Usage: play [--story <story.ron>] [--config <presentation.ron>] [--speed <ms>]
///
/// Controls:
///   ENTER      show the whole line, or continue once it is shown
///   1..9       pick a choice when a menu is up
///   r          restart from the first scene
///   q          quit
///
/// Set RUST_LOG=goldrush_story=debug to trace engine decisions on stderr.

use goldrush_story::content;
use goldrush_story::core::engine::{NarrativeEngine, Step};
use goldrush_story::core::presenter::Presenter;
use goldrush_story::schema::ending::EndingKind;
use goldrush_story::schema::score::ScoreState;
use std::io::{self, BufRead, Write};
use std::process;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Prints the revealed text incrementally.
#[derive(Default)]
struct TerminalPresenter {
    shown: String,
    hint_shown: bool,
}

impl TerminalPresenter {
    fn break_line(&mut self) {
        if !self.shown.is_empty() || self.hint_shown {
            println!();
        }
        self.shown.clear();
        self.hint_shown = false;
    }
}

impl Presenter for TerminalPresenter {
    fn render_backdrop(&mut self, backdrop: &str) {
        self.break_line();
        println!("\n~~~ {} ~~~\n", backdrop.replace('_', " "));
    }

    fn display_text(&mut self, text: &str, hint: Option<&str>) {
        if text.is_empty() {
            self.break_line();
            return;
        }
        if self.hint_shown || !text.starts_with(self.shown.as_str()) {
            self.break_line();
        }
        print!("{}", &text[self.shown.len()..]);
        self.shown = text.to_string();
        if let (Some(hint), false) = (hint, self.hint_shown) {
            print!("\n    {hint}");
            self.hint_shown = true;
        }
        let _ = io::stdout().flush();
    }

    fn display_status(&mut self, score: &ScoreState) {
        self.break_line();
        println!("[gold: {}]", score.gold);
    }

    fn display_choices(&mut self, labels: &[&str]) {
        self.break_line();
        println!();
        for (i, label) in labels.iter().enumerate() {
            println!("  {}. {}", i + 1, label);
        }
        print!("> ");
        let _ = io::stdout().flush();
    }

    fn clear_choices(&mut self) {}

    fn show_ending(&mut self, ending: Option<EndingKind>, score: &ScoreState) {
        self.break_line();
        println!();
        match ending {
            Some(kind) => println!("=== {} ===", kind.title()),
            None => println!("=== The End ==="),
        }
        println!("Final gold: {}", score.gold);
        println!("\nType r to play again or q to quit.");
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut story_path = None;
    let mut config_path = None;
    let mut speed_ms = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage();
                return;
            }
            "--story" if i + 1 < args.len() => {
                i += 1;
                story_path = Some(args[i].clone());
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--speed" if i + 1 < args.len() => {
                i += 1;
                match args[i].parse::<u64>() {
                    Ok(ms) => speed_ms = Some(ms),
                    Err(_) => {
                        eprintln!("Invalid speed: {}", args[i]);
                        process::exit(1);
                    }
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let mut builder = NarrativeEngine::builder();
    builder = match story_path {
        Some(path) => builder.story_file(path),
        None => match content::gold_country() {
            Ok(graph) => builder.story(graph),
            Err(e) => {
                eprintln!("ERROR: bundled story failed to load: {e}");
                process::exit(1);
            }
        },
    };
    if let Some(path) = config_path {
        builder = builder.presentation_file(path);
    }
    if let Some(ms) = speed_ms {
        builder = builder.reveal_interval(Duration::from_millis(ms));
    }

    let mut engine = match builder.build() {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("ERROR: {e}");
            process::exit(1);
        }
    };

    println!("{}\n", engine.graph().title());
    if let Err(e) = run(&mut engine) {
        eprintln!("\nERROR: {e}");
        process::exit(1);
    }
}

fn run(engine: &mut NarrativeEngine) -> Result<(), goldrush_story::core::engine::EngineError> {
    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut presenter = TerminalPresenter::default();
    let interval = engine.reveal_interval();
    let mut pending = engine.start(&mut presenter)?.tick();

    loop {
        let input = match pending {
            Some(tick) => match rx.recv_timeout(interval) {
                Ok(line) => line,
                Err(RecvTimeoutError::Timeout) => {
                    pending = engine.tick(tick, &mut presenter).tick();
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
            },
            None => match rx.recv() {
                Ok(line) => line,
                Err(_) => return Ok(()),
            },
        };

        let step = match input.trim() {
            "q" | "quit" => return Ok(()),
            "r" | "restart" => {
                presenter.break_line();
                engine.start(&mut presenter)?
            }
            digits if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => {
                match digits.parse::<usize>() {
                    Ok(n) if n >= 1 => engine.choose(n - 1, &mut presenter)?,
                    _ => Step::Ignored,
                }
            }
            _ => engine.advance(&mut presenter)?,
        };

        if step != Step::Ignored {
            pending = step.tick();
        }
    }
}

fn print_usage() {
    println!("Usage: play [--story <story.ron>] [--config <presentation.ron>] [--speed <ms>]");
    println!();
    println!("Without --story the bundled Gold Country story is played.");
    println!("ENTER advances, a number picks a choice, r restarts, q quits.");
}

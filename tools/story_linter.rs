/// Story Linter: validates a story file and samples its ending distribution.
///
/// Usage: story_linter <story.ron> [--simulate <runs>] [--seed <n>]

use goldrush_story::core::engine::NarrativeEngine;
use goldrush_story::core::simulate::tally_endings;
use goldrush_story::core::story::StoryGraph;
use goldrush_story::schema::ending::EndingKind;
use goldrush_story::schema::scene::Transition;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::process;

const MAX_CHOICES: usize = 1000;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: story_linter <story.ron> [--simulate <runs>] [--seed <n>]");
        process::exit(0);
    }

    let story_path = &args[1];
    let mut runs: usize = 0;
    let mut seed: u64 = 1851;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--simulate" if i + 1 < args.len() => {
                i += 1;
                runs = args[i].parse().unwrap_or(0);
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(1851);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let graph = match StoryGraph::load_from_ron(Path::new(story_path)) {
        Ok(graph) => graph,
        Err(e) => {
            println!("ERROR: {}", e);
            println!("\nSummary: 1 errors, 0 warnings");
            process::exit(1);
        }
    };

    println!("Loaded '{}' with {} scenes", graph.title(), graph.len());

    let mut errors = Vec::new();
    let mut warnings = lint_story(&graph);

    if runs > 0 {
        println!("\n=== Ending Distribution ({} runs, seed {}) ===\n", runs, seed);
        let mut engine = NarrativeEngine::new(graph);
        let mut rng = StdRng::seed_from_u64(seed);
        match tally_endings(&mut engine, &mut rng, runs, MAX_CHOICES) {
            Ok(counts) => {
                for kind in EndingKind::ALL {
                    let count = counts.get(&Some(kind)).copied().unwrap_or(0);
                    println!(
                        "  {:<20} {:>6}  ({:.1}%)",
                        kind.title(),
                        count,
                        100.0 * count as f64 / runs as f64
                    );
                    if count == 0 {
                        warnings.push(format!("Ending '{}' was never reached", kind));
                    }
                }
                if let Some(count) = counts.get(&None) {
                    println!("  {:<20} {:>6}", "(no ending)", count);
                }
            }
            Err(e) => errors.push(format!("Simulation failed: {}", e)),
        }
    }

    println!("\n=== Story Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if !errors.is_empty() {
        process::exit(1);
    }
}

fn lint_story(graph: &StoryGraph) -> Vec<String> {
    let mut warnings = Vec::new();

    for id in graph.unreachable() {
        warnings.push(format!("Scene '{}' is unreachable from '{}'", id, graph.start()));
    }

    let mut scenes: Vec<_> = graph.scenes().collect();
    scenes.sort_by(|a, b| a.id.cmp(&b.id));

    for scene in scenes {
        match &scene.then {
            Transition::Choices(choices) => {
                if scene.lines.is_empty() {
                    warnings.push(format!(
                        "Scene '{}' opens a menu without any lines",
                        scene.id
                    ));
                }
                if choices.len() == 1 {
                    warnings.push(format!(
                        "Scene '{}' offers a single choice; consider Next(..)",
                        scene.id
                    ));
                }
            }
            Transition::End if scene.lines.is_empty() => {
                warnings.push(format!("Ending scene '{}' has no lines", scene.id));
            }
            _ => {}
        }
    }

    warnings
}

/// Gold Country story tests: graph closure, scripted routes, and random play.

mod common;

use common::{play_choices, RecordingPresenter};
use goldrush_story::content;
use goldrush_story::core::engine::NarrativeEngine;
use goldrush_story::core::simulate::{random_playthrough, tally_endings};
use goldrush_story::core::story::StoryGraph;
use goldrush_story::schema::ending::EndingKind;
use goldrush_story::schema::scene::Transition;
use goldrush_story::schema::score::ScoreState;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn gold_country() -> NarrativeEngine {
    NarrativeEngine::new(content::gold_country().unwrap())
}

#[test]
fn story_file_matches_bundled_copy() {
    let from_disk =
        StoryGraph::load_from_ron(std::path::Path::new("story_data/gold_country/story.ron")).unwrap();
    let bundled = content::gold_country().unwrap();
    assert_eq!(from_disk.len(), bundled.len());
    assert_eq!(from_disk.title(), "Gold Country, 1851");
}

#[test]
fn every_destination_resolves() {
    let graph = content::gold_country().unwrap();
    for scene in graph.scenes() {
        for dest in scene.then.destinations() {
            assert!(
                graph.scene(dest.as_str()).is_some(),
                "{} leads to missing {}",
                scene.id,
                dest
            );
        }
    }
    assert!(graph.unreachable().is_empty());
}

#[test]
fn endings_are_terminal_and_dispatched() {
    let graph = content::gold_country().unwrap();
    let reckoning = graph.scene("reckoning").unwrap();
    let Transition::Dispatch(table) = &reckoning.then else {
        panic!("reckoning should dispatch an ending");
    };
    for kind in EndingKind::ALL {
        let scene = graph.scene(table.scene_for(kind).as_str()).unwrap();
        assert!(matches!(scene.then, Transition::End));
        assert!(!scene.lines.is_empty());
    }
}

#[test]
fn ruthless_route_prospers() {
    let mut engine = gold_country();
    let mut p = RecordingPresenter::default();
    // not sure, approve, reassure, turn away, join fully, fire at the fleeing
    play_choices(&mut engine, &mut p, &[1, 0, 2, 2, 0, 0]);
    assert_eq!(engine.ending(), Some(EndingKind::SettlerProsperity));
    assert_eq!(engine.score().gold, 100);
}

#[test]
fn generous_route_reaches_communion_through_poverty() {
    let mut engine = gold_country();
    let mut p = RecordingPresenter::default();
    // not sure, ask advice, buy baskets, turn away, refuse the expedition
    play_choices(&mut engine, &mut p, &[1, 2, 0, 2, 1]);
    assert_eq!(engine.score().gold, 35);
    assert_eq!(engine.ending(), Some(EndingKind::MoralCommunion));
}

#[test]
fn conscience_route_reaches_communion() {
    let mut engine = gold_country();
    let mut p = RecordingPresenter::default();
    // hopeful, ask about villages, reassure, object, testify, shield
    play_choices(&mut engine, &mut p, &[0, 1, 2, 3, 1, 2]);
    let score = engine.score();
    assert!(score.testified);
    assert!(score.shielded);
    assert_eq!(score.gold, 50);
    assert_eq!(engine.ending(), Some(EndingKind::MoralCommunion));
}

#[test]
fn bystander_route_regrets() {
    let mut engine = gold_country();
    let mut p = RecordingPresenter::default();
    // not sure, ask advice, reassure, turn away, cautious join, fire overhead
    play_choices(&mut engine, &mut p, &[1, 2, 2, 2, 2, 1]);
    assert_eq!(
        engine.score(),
        &ScoreState {
            gold: 50,
            favor_settlers: 0,
            favor_others: 0,
            testified: false,
            shielded: false,
        }
    );
    assert_eq!(engine.ending(), Some(EndingKind::TaintedRegret));
    assert_eq!(p.ending, Some(Some(EndingKind::TaintedRegret)));
}

#[test]
fn objecting_at_trial_leads_to_claim_jumping() {
    let mut engine = gold_country();
    let mut p = RecordingPresenter::default();
    engine.start(&mut p).unwrap();
    for index in [1, 2, 2, 3] {
        engine.skip_to_decision(&mut p).unwrap();
        engine.choose(index, &mut p).unwrap();
    }
    engine.skip_to_decision(&mut p).unwrap();
    assert_eq!(engine.current_scene().map(|s| s.as_str()), Some("claim_jumped"));
    assert!(engine.choices().contains(&"Promise to testify for him"));
}

#[test]
fn claim_forwards_to_courthouse_without_a_menu() {
    let mut engine = gold_country();
    let mut p = RecordingPresenter::default();
    play_choices(&mut engine, &mut p, &[1, 2, 2]);
    // play_choices stops at the next menu: the courthouse.
    assert_eq!(engine.current_scene().map(|s| s.as_str()), Some("courthouse"));
    assert_eq!(p.menus_shown, 4);
    assert!(p.backdrops.contains(&"settlement_night".to_string()));
}

#[test]
fn random_playthroughs_reach_exactly_one_ending() {
    let mut engine = gold_country();
    let mut rng = StdRng::seed_from_u64(1851);
    for _ in 0..200 {
        let run = random_playthrough(&mut engine, &mut rng, 50).unwrap();
        let endings = run
            .history
            .iter()
            .filter(|entry| matches!(entry, goldrush_story::core::engine::HistoryEntry::Ending(_)))
            .count();
        assert_eq!(endings, 1);
        assert_eq!(run.ending, Some(EndingKind::select(&run.score)));
    }
}

#[test]
fn all_endings_occur_in_random_play() {
    let mut engine = gold_country();
    let mut rng = StdRng::seed_from_u64(49);
    let counts = tally_endings(&mut engine, &mut rng, 500, 50).unwrap();
    for kind in EndingKind::ALL {
        assert!(
            counts.get(&Some(kind)).copied().unwrap_or(0) > 0,
            "{kind} never reached"
        );
    }
}

#[test]
fn scenario_rich_settler() {
    let score = ScoreState {
        gold: 90,
        favor_settlers: 1,
        ..ScoreState::default()
    };
    assert_eq!(EndingKind::select(&score), EndingKind::SettlerProsperity);
}

#[test]
fn scenario_poor_player() {
    let score = ScoreState {
        gold: 30,
        favor_settlers: 0,
        favor_others: 0,
        ..ScoreState::default()
    };
    assert_eq!(EndingKind::select(&score), EndingKind::MoralCommunion);
}

#[test]
fn scenario_middle_of_the_road() {
    let score = ScoreState {
        gold: 60,
        favor_settlers: 1,
        favor_others: 1,
        testified: false,
        shielded: false,
    };
    assert_eq!(EndingKind::select(&score), EndingKind::TaintedRegret);
}

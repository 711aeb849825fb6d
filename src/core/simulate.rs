/// Random play-throughs for linting and tests.

use rand::Rng;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::core::engine::{EngineError, EnginePhase, HistoryEntry, NarrativeEngine};
use crate::core::presenter::SilentPresenter;
use crate::schema::ending::EndingKind;
use crate::schema::score::ScoreState;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("play-through did not finish within {0} choices")]
    ChoiceLimit(usize),
    #[error("engine stopped in phase {0:?} without a menu or an ending")]
    Stuck(EnginePhase),
}

/// The outcome of one finished play-through.
#[derive(Debug, Clone)]
pub struct Playthrough {
    pub ending: Option<EndingKind>,
    pub score: ScoreState,
    pub history: Vec<HistoryEntry>,
}

impl Playthrough {
    /// Number of choices the player made.
    pub fn choices_made(&self) -> usize {
        self.history
            .iter()
            .filter(|entry| matches!(entry, HistoryEntry::Chose { .. }))
            .count()
    }
}

/// Play `engine` from the start, picking uniformly among offered choices.
pub fn random_playthrough<R: Rng>(
    engine: &mut NarrativeEngine,
    rng: &mut R,
    max_choices: usize,
) -> Result<Playthrough, SimulationError> {
    let mut presenter = SilentPresenter;
    engine.start(&mut presenter)?;
    let mut taken = 0;

    loop {
        engine.skip_to_decision(&mut presenter)?;
        match engine.phase() {
            EnginePhase::Finished => break,
            EnginePhase::AwaitingChoice => {
                if taken == max_choices {
                    return Err(SimulationError::ChoiceLimit(max_choices));
                }
                let count = engine.choices().len();
                engine.choose(rng.gen_range(0..count), &mut presenter)?;
                taken += 1;
            }
            phase => return Err(SimulationError::Stuck(phase)),
        }
    }

    Ok(Playthrough {
        ending: engine.ending(),
        score: engine.score().clone(),
        history: engine.history().to_vec(),
    })
}

/// Run `runs` random play-throughs and count how often each ending occurs.
/// Play-throughs that finish without a dispatched ending are keyed `None`.
pub fn tally_endings<R: Rng>(
    engine: &mut NarrativeEngine,
    rng: &mut R,
    runs: usize,
    max_choices: usize,
) -> Result<FxHashMap<Option<EndingKind>, usize>, SimulationError> {
    let mut counts = FxHashMap::default();
    for _ in 0..runs {
        let playthrough = random_playthrough(engine, rng, max_choices)?;
        *counts.entry(playthrough.ending).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Cooperative typewriter scheduler.
///
/// Plays a queue of lines one at a time, revealing each a character per
/// tick. The host owns the timer: every call that starts or continues a
/// reveal hands back a [`Tick`] to fire after the reveal interval. Every
/// new line and every [`RevealScheduler::play`] bumps the generation, so
/// ticks scheduled for an older line or queue are recognised and dropped.

use std::collections::VecDeque;

/// Token for one pending reveal step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tick {
    pub generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    /// Nothing has been played yet.
    Idle,
    /// The current line is still being typed out.
    Revealing,
    /// The current line is fully shown; waiting for the player.
    AwaitingAck,
    /// The queue is drained and the last line acknowledged.
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// One more character is visible; schedule the returned tick.
    Continue(Tick),
    /// The last character of the line was revealed.
    LineComplete,
    /// The tick belongs to a cancelled queue or no reveal is running.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The running reveal was completed in full.
    Skipped,
    /// Moved to the next queued line.
    NextLine(Option<Tick>),
    /// The queue is exhausted; the caller runs its continuation.
    Drained,
    /// Nothing to advance.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct RevealScheduler {
    queue: VecDeque<String>,
    current: String,
    current_len: usize,
    revealed: usize,
    phase: RevealPhase,
    generation: u32,
}

impl Default for RevealScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RevealScheduler {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            current: String::new(),
            current_len: 0,
            revealed: 0,
            phase: RevealPhase::Idle,
            generation: 0,
        }
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Lines still waiting behind the current one.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// The full text of the current line.
    pub fn current_line(&self) -> &str {
        &self.current
    }

    /// The revealed prefix of the current line.
    pub fn visible_text(&self) -> &str {
        match self.current.char_indices().nth(self.revealed) {
            Some((byte_idx, _)) => &self.current[..byte_idx],
            None => &self.current,
        }
    }

    /// Replace whatever is playing with `lines`.
    ///
    /// An empty list goes straight to [`RevealPhase::Done`].
    pub fn play<I>(&mut self, lines: I) -> Option<Tick>
    where
        I: IntoIterator<Item = String>,
    {
        self.generation = self.generation.wrapping_add(1);
        self.queue = lines.into_iter().collect();
        self.current.clear();
        self.current_len = 0;
        self.revealed = 0;
        match self.queue.pop_front() {
            Some(line) => self.start_line(line),
            None => {
                self.phase = RevealPhase::Done;
                None
            }
        }
    }

    /// Reveal one more character if `tick` is still current.
    pub fn tick(&mut self, tick: Tick) -> TickOutcome {
        if tick.generation != self.generation || self.phase != RevealPhase::Revealing {
            return TickOutcome::Stale;
        }
        self.revealed += 1;
        if self.revealed >= self.current_len {
            self.phase = RevealPhase::AwaitingAck;
            TickOutcome::LineComplete
        } else {
            TickOutcome::Continue(self.next_tick())
        }
    }

    /// The single skip/advance input.
    pub fn advance(&mut self) -> AdvanceOutcome {
        match self.phase {
            RevealPhase::Revealing => {
                self.revealed = self.current_len;
                self.phase = RevealPhase::AwaitingAck;
                AdvanceOutcome::Skipped
            }
            RevealPhase::AwaitingAck => match self.queue.pop_front() {
                Some(line) => AdvanceOutcome::NextLine(self.start_line(line)),
                None => {
                    self.phase = RevealPhase::Done;
                    AdvanceOutcome::Drained
                }
            },
            RevealPhase::Idle | RevealPhase::Done => AdvanceOutcome::Ignored,
        }
    }

    /// Drop the queue and invalidate any scheduled tick.
    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.queue.clear();
        self.current.clear();
        self.current_len = 0;
        self.revealed = 0;
        self.phase = RevealPhase::Idle;
    }

    fn start_line(&mut self, line: String) -> Option<Tick> {
        self.generation = self.generation.wrapping_add(1);
        self.current_len = line.chars().count();
        self.current = line;
        self.revealed = 0;
        if self.current_len == 0 {
            self.phase = RevealPhase::AwaitingAck;
            None
        } else {
            self.phase = RevealPhase::Revealing;
            Some(self.next_tick())
        }
    }

    fn next_tick(&self) -> Tick {
        Tick {
            generation: self.generation,
        }
    }
}

use std::collections::{HashMap, HashSet};

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::{LevelConfig, Settings};
use crate::error::{ActionError, LevelError};
use crate::event::Event;
use crate::grid::{Blocker, Grid};
use crate::matcher::{self, Match};
use crate::position::Position;

mod combo;
mod gravity;
mod resolve;
mod settle;
mod shuffle;

pub use gravity::{apply_gravity, refill, step_conveyors};
pub use resolve::round_score;
pub use shuffle::{Hint, MAX_RESHUFFLES, best_move, has_legal_move, reshuffle};

/// Resolution rounds allowed per action before the engine gives up.
pub const MAX_ROUNDS: u32 = 20;

/// Where the engine stands. Every phase other than `Idle` and `Exhausted`
/// is a suspension point between two steps of one resolution sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    /// Matched and detonated cells are about to be cleared.
    Clear,
    /// Conveyors, then falling tokens, then ingredient collection.
    Gravity,
    Refill,
    /// Looking for new matches after a refill.
    Detect,
    /// End-of-move effects: bomb timers, spreads, stalemate check.
    Settle,
    /// The round cap was hit.
    Exhausted,
}

impl Phase {
    pub fn is_busy(self) -> bool {
        !matches!(self, Phase::Idle | Phase::Exhausted)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Swap(Position, Position),
    /// Tap a special token to detonate it in place.
    Activate(Position),
    /// Hit a single cell as if a detonation reached it. Does not count as a move.
    Hammer(Position),
    /// Forced reshuffle. Does not count as a move.
    Shuffle,
}

/// Everything the next `Clear` phase has to remove.
#[derive(Clone, Debug, Default)]
pub(crate) struct Round {
    pub(crate) matches: Vec<Match>,
    /// Cells hit directly rather than through a run.
    pub(crate) seeds: Vec<Position>,
    /// Specials that are cleared without detonating again.
    pub(crate) consumed: HashSet<Position>,
    /// Color bombs told which color to take out.
    pub(crate) color_targets: HashMap<Position, u8>,
}

/// One play session on one board.
#[derive(Clone, Debug)]
pub struct Game {
    grid: Grid,
    settings: Settings,
    rng: SmallRng,
    phase: Phase,
    round: Round,
    /// Cascade level of the round most recently started; 0 before the first.
    level: u32,
    /// A player move is being resolved and still owes its end-of-move effects.
    move_pending: bool,
    /// The current chain already reshuffled once.
    reshuffle_spent: bool,
    score: u64,
    moves: u32,
    bomb_expired: bool,
    events: Vec<Event>,
}

impl Game {
    /// Takes the board as given; empty cells stay empty until something refills them.
    pub fn new(grid: Grid, settings: Settings, seed: u64) -> Self {
        Self {
            grid,
            settings,
            rng: SmallRng::seed_from_u64(seed),
            phase: Phase::Idle,
            round: Round::default(),
            level: 0,
            move_pending: false,
            reshuffle_spent: false,
            score: 0,
            moves: 0,
            bomb_expired: false,
            events: Vec::new(),
        }
    }

    /// Builds the level's board and readies it with [`Game::prepare_board`].
    pub fn from_config(config: &LevelConfig) -> Result<Self, LevelError> {
        let grid = config.build_grid()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut game = Self::new(grid, config.settings(), seed);
        game.prepare_board();
        log::debug!("level {:?} ready (seed {seed})", config.name);
        Ok(game)
    }

    /// Fills the board and reshuffles once if the fill left no legal move.
    /// Matches left by that reshuffle are resolved here, unscored, so play
    /// starts on a quiet board with an empty event list.
    pub fn prepare_board(&mut self) {
        gravity::refill(&mut self.grid, &mut self.rng, self.settings.token_types, &mut Vec::new());
        if !has_legal_move(&self.grid) {
            log::info!("board filled without a legal move");
            if self.recover_stalemate() {
                self.start_rescan();
                self.reshuffle_spent = true;
                self.resolve_all();
                self.score = 0;
            }
        }
        self.events.clear();
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase.is_busy()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Cascade level of the current or last resolution sequence.
    pub fn cascade_level(&self) -> u32 {
        self.level
    }

    /// Latched once any bomb timer has run out.
    pub fn bomb_expired(&self) -> bool {
        self.bomb_expired
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn hint(&self) -> Option<Hint> {
        best_move(&self.grid)
    }

    /// Validates the action and prepares its first phase without running it.
    pub fn begin_action(&mut self, action: Action) -> Result<(), ActionError> {
        if self.is_busy() {
            return Err(ActionError::Busy);
        }
        self.round = Round::default();
        self.level = 0;
        self.reshuffle_spent = false;
        match action {
            Action::Swap(a, b) => {
                self.begin_swap(a, b)?;
                self.move_pending = true;
                self.start_round();
            }
            Action::Activate(pos) => {
                self.check_special(pos)?;
                self.round.seeds.push(pos);
                self.move_pending = true;
                self.start_round();
            }
            Action::Hammer(pos) => {
                if !self.grid.in_bounds(pos) {
                    return Err(ActionError::OutOfBounds(pos));
                }
                if self.grid.at(pos).is_empty() {
                    return Err(ActionError::Empty(pos));
                }
                self.round.seeds.push(pos);
                self.move_pending = false;
                self.start_round();
            }
            Action::Shuffle => {
                self.move_pending = false;
                self.reshuffle_spent = true;
                self.recover_stalemate();
                self.phase = Phase::Detect;
            }
        }
        Ok(())
    }

    /// Instant resolution: the same phases an animated caller would step through.
    pub fn apply_action(&mut self, action: Action) -> Result<(), ActionError> {
        self.begin_action(action)?;
        self.resolve_all();
        Ok(())
    }

    /// Resolves whatever already stands on the board without counting a move.
    pub fn rescan(&mut self) -> Result<(), ActionError> {
        if self.is_busy() {
            return Err(ActionError::Busy);
        }
        self.start_rescan();
        Ok(())
    }

    fn start_rescan(&mut self) {
        self.round = Round::default();
        self.level = 0;
        self.move_pending = false;
        self.reshuffle_spent = false;
        self.phase = Phase::Detect;
    }

    /// Runs exactly one phase and returns the phase that comes next.
    pub fn advance(&mut self) -> Phase {
        self.phase = match self.phase {
            Phase::Idle => Phase::Idle,
            Phase::Exhausted => Phase::Exhausted,
            Phase::Clear => {
                self.clear_round();
                Phase::Gravity
            }
            Phase::Gravity => {
                gravity::step_conveyors(&mut self.grid, &mut self.events);
                gravity::apply_gravity(&mut self.grid, &mut self.events);
                Phase::Refill
            }
            Phase::Refill => {
                gravity::refill(
                    &mut self.grid,
                    &mut self.rng,
                    self.settings.token_types,
                    &mut self.events,
                );
                Phase::Detect
            }
            Phase::Detect => self.detect(),
            Phase::Settle => self.settle(),
        };
        self.phase
    }

    /// Drives phases until the engine is no longer busy.
    pub fn resolve_all(&mut self) {
        // Each round passes through at most four phases; the cap bounds the rounds.
        let limit = (MAX_ROUNDS as usize + 2) * 8;
        for _ in 0..limit {
            if !self.is_busy() {
                return;
            }
            self.advance();
        }
        if self.is_busy() {
            self.force_idle();
        }
    }

    /// Watchdog escape hatch: drops any pending work and accepts input again.
    pub fn force_idle(&mut self) {
        if self.is_busy() {
            log::warn!("forcing idle during {:?} at cascade level {}", self.phase, self.level);
        }
        self.round = Round::default();
        self.move_pending = false;
        self.reshuffle_spent = false;
        self.phase = Phase::Idle;
    }

    fn start_round(&mut self) {
        self.level += 1;
        self.phase = Phase::Clear;
    }

    fn check_special(&self, pos: Position) -> Result<(), ActionError> {
        if !self.grid.in_bounds(pos) {
            return Err(ActionError::OutOfBounds(pos));
        }
        if self.grid.at(pos).is_empty() {
            return Err(ActionError::Empty(pos));
        }
        if !self.grid.at(pos).special().is_special() {
            return Err(ActionError::NotSpecial(pos));
        }
        if self.grid.has(Blocker::Locked, pos) {
            return Err(ActionError::Blocked);
        }
        Ok(())
    }

    fn detect(&mut self) -> Phase {
        let matches = matcher::find_matches(&self.grid);
        if matches.is_empty() {
            return Phase::Settle;
        }
        if self.level >= MAX_ROUNDS {
            log::warn!(
                "cascade still producing matches after {} rounds; stopping",
                self.level
            );
            self.events.push(Event::CascadeExhausted { rounds: self.level });
            self.round = Round::default();
            self.move_pending = false;
            return Phase::Exhausted;
        }
        self.round.matches = matches;
        self.level += 1;
        Phase::Clear
    }
}

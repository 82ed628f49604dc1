use crate::event::Event;
use crate::grid::Blocker;
use crate::position::Position;
use crate::rules;

use super::{Game, Phase, has_legal_move};

impl Game {
    /// Closes a resolution sequence. A finished player move also pays its
    /// end-of-move costs here. Any sequence may end in a reshuffle whose
    /// standing matches start a fresh one; only one reshuffle runs per chain.
    pub(super) fn settle(&mut self) -> Phase {
        if self.move_pending {
            self.move_pending = false;
            self.moves += 1;
            self.tick_bomb_timers();
            self.spread_hazards();
        }
        if !self.reshuffle_spent && !has_legal_move(&self.grid) {
            self.reshuffle_spent = true;
            if self.recover_stalemate() {
                self.events.push(Event::CascadeComplete { rounds: self.level });
                self.level = 0;
                return Phase::Detect;
            }
        }
        log::debug!(
            "sequence complete after {} rounds, score {}",
            self.level,
            self.score
        );
        self.reshuffle_spent = false;
        self.events.push(Event::CascadeComplete { rounds: self.level });
        Phase::Idle
    }

    fn tick_bomb_timers(&mut self) {
        let timers: Vec<Position> = self.grid.blocker_positions(Blocker::BombTimer).collect();
        for pos in timers {
            if self.grid.decrement(Blocker::BombTimer, pos) == Some(0) {
                log::info!("bomb timer at {pos:?} ran out on move {}", self.moves);
                self.bomb_expired = true;
                self.events.push(Event::BombTimerExpired { pos });
            }
        }
    }

    /// Honey first, then chocolate, each on its own cadence. The move counter
    /// advances whether or not anything could spread.
    fn spread_hazards(&mut self) {
        let honey = self.settings.honey_spread;
        if honey.is_due(self.moves) {
            rules::spread_honey(&mut self.grid, &mut self.rng, honey.probability, &mut self.events);
        }
        let chocolate = self.settings.chocolate_spread;
        if chocolate.is_due(self.moves) {
            rules::spread_chocolate(
                &mut self.grid,
                &mut self.rng,
                chocolate.probability,
                &mut self.events,
            );
        }
    }
}

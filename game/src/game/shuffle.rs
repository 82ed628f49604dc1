use rand::Rng;
use rand::seq::SliceRandom;

use crate::event::Event;
use crate::grid::{Blocker, Cell, Grid, Special, Token};
use crate::matcher::find_matches;
use crate::position::{Position, PositionDelta};
use crate::rules;
use crate::swap;

use super::Game;

pub const MAX_RESHUFFLES: usize = 100;

const COMBO_VALUE: u32 = 300;
const COLOR_BOMB_VALUE: u32 = 150;
const LONE_SPECIAL_VALUE: u32 = 60;

/// A suggested swap and what it is worth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hint {
    pub from: Position,
    pub to: Position,
    pub value: u32,
}

/// Worth of swapping `a` and `b`, or `None` if the swap is not a legal move.
/// The scratch grid is restored before returning.
fn move_value(scratch: &mut Grid, a: Position, b: Position) -> Option<u32> {
    if !swap::can_swap(scratch, a, b) {
        return None;
    }
    let (special_a, special_b) = (scratch.at(a).special(), scratch.at(b).special());
    let plain = |cell: Cell| matches!(cell, Cell::Token(t) if t.special == Special::None);
    if special_a.is_special() && special_b.is_special() {
        return Some(COMBO_VALUE);
    }
    if (special_a == Special::ColorBomb && plain(scratch.at(b)))
        || (special_b == Special::ColorBomb && plain(scratch.at(a)))
    {
        return Some(COLOR_BOMB_VALUE);
    }

    scratch.swap_cells(a, b);
    let value: u32 = find_matches(scratch).iter().map(|m| m.value()).sum();
    scratch.swap_cells(a, b);

    if value > 0 {
        Some(value)
    } else if [special_a, special_b]
        .into_iter()
        .any(|s| matches!(s, Special::LineRow | Special::LineCol | Special::AreaBomb))
    {
        Some(LONE_SPECIAL_VALUE)
    } else {
        None
    }
}

/// Candidate pairs in row-major order, right neighbor before bottom neighbor.
fn candidate_pairs(grid: &Grid) -> impl Iterator<Item = (Position, Position)> + use<> {
    grid.positions().flat_map(|pos| {
        [PositionDelta::new(1, 0), PositionDelta::new(0, 1)]
            .into_iter()
            .map(move |delta| (pos, pos + delta))
    })
}

/// The most valuable legal move; the first one found wins ties.
pub fn best_move(grid: &Grid) -> Option<Hint> {
    let mut scratch = grid.clone();
    let mut best: Option<Hint> = None;
    for (from, to) in candidate_pairs(grid) {
        let Some(value) = move_value(&mut scratch, from, to) else {
            continue;
        };
        if best.is_none_or(|b| value > b.value) {
            best = Some(Hint { from, to, value });
        }
    }
    best
}

pub fn has_legal_move(grid: &Grid) -> bool {
    let mut scratch = grid.clone();
    candidate_pairs(grid).any(|(a, b)| move_value(&mut scratch, a, b).is_some())
}

fn shuffled_cells(grid: &Grid) -> Vec<Position> {
    grid.positions()
        .filter(|&pos| {
            grid.at(pos).token().is_some_and(|t| t.special == Special::None)
                && !grid.has(Blocker::Locked, pos)
                && rules::is_occupiable(grid, pos)
        })
        .collect()
}

fn paint(grid: &mut Grid, cells: &[Position], colors: &[u8]) {
    for (&pos, &color) in cells.iter().zip(colors) {
        grid.set(pos, Cell::Token(Token::plain(color)));
    }
}

/// Permutes the colors of plain, unlocked tokens until the board has a legal
/// move, preferring arrangements without standing matches. Leaves the board
/// untouched and returns false if no permutation within the cap helps.
pub fn reshuffle<R: Rng>(grid: &mut Grid, rng: &mut R) -> bool {
    let cells = shuffled_cells(grid);
    let original: Vec<u8> = cells
        .iter()
        .filter_map(|&pos| grid.token(pos).map(|t| t.color))
        .collect();
    let mut colors = original.clone();
    let mut fallback: Option<Vec<u8>> = None;

    for _ in 0..MAX_RESHUFFLES {
        colors.shuffle(rng);
        paint(grid, &cells, &colors);
        if !has_legal_move(grid) {
            continue;
        }
        if find_matches(grid).is_empty() {
            return true;
        }
        if fallback.is_none() {
            fallback = Some(colors.clone());
        }
    }

    match fallback {
        Some(colors) => {
            paint(grid, &cells, &colors);
            true
        }
        None => {
            paint(grid, &cells, &original);
            false
        }
    }
}

impl Game {
    /// Reshuffles the board and reports the outcome. Returns whether the
    /// accepted arrangement still holds matches to resolve.
    pub(super) fn recover_stalemate(&mut self) -> bool {
        if reshuffle(&mut self.grid, &mut self.rng) {
            log::info!("board reshuffled after {} moves", self.moves);
            self.events.push(Event::Reshuffled);
            !find_matches(&self.grid).is_empty()
        } else {
            log::warn!("no reshuffle produced a legal move; keeping the board");
            self.events.push(Event::ReshuffleFailed);
            false
        }
    }
}

use std::collections::HashSet;

use rand::Rng;

use crate::event::Event;
use crate::grid::{Blocker, Cell, Grid, Token};
use crate::position::Position;
use crate::rules;

/// Moves every conveyor-borne cell one step at once. A cell only moves onto an
/// occupiable, unlocked cell that is empty or vacated by another belt this step.
pub fn step_conveyors(grid: &mut Grid, events: &mut Vec<Event>) {
    let mut moves: Vec<(Position, Position)> = grid
        .conveyor_cells()
        .filter(|&(from, _)| !grid.at(from).is_empty() && !grid.has(Blocker::Locked, from))
        .map(|(from, dir)| (from, from + dir.delta()))
        .filter(|&(_, to)| rules::is_occupiable(grid, to) && !grid.has(Blocker::Locked, to))
        .collect();

    // Dropping one move can block the belt feeding into it, so repeat until stable.
    loop {
        let vacated: HashSet<Position> = moves.iter().map(|&(from, _)| from).collect();
        let mut claimed: HashSet<Position> = HashSet::new();
        let before = moves.len();
        moves.retain(|&(_, to)| {
            (grid.at(to).is_empty() || vacated.contains(&to)) && claimed.insert(to)
        });
        if moves.len() == before {
            break;
        }
    }

    let carried: Vec<(Position, Position, Cell)> = moves
        .into_iter()
        .map(|(from, to)| (from, to, grid.take(from)))
        .collect();
    for (from, to, cell) in carried {
        grid.set(to, cell);
        events.push(Event::TokenMoved { from, to });
    }
}

/// Compacts every column segment downwards. Stone and chocolate split a
/// column into independent segments.
fn compact(grid: &mut Grid, events: &mut Vec<Event>) {
    let (width, height) = grid.bounds();
    for x in 0..width {
        let mut slot: Option<usize> = None;
        for y in (0..height).rev() {
            let pos = Position::new(x, y);
            if rules::blocks_gravity(grid, pos) {
                slot = None;
                continue;
            }
            if grid.at(pos).is_empty() {
                slot = slot.or(Some(y));
                continue;
            }
            if let Some(to_y) = slot {
                let to = Position::new(x, to_y);
                let cell = grid.take(pos);
                grid.set(to, cell);
                events.push(Event::TokenMoved { from: pos, to });
                slot = Some(to_y - 1);
            }
        }
    }
}

/// Lowest cell of a column that a falling cell can rest on.
fn floor_of(grid: &Grid, x: usize) -> Option<Position> {
    (0..grid.height())
        .rev()
        .map(|y| Position::new(x, y))
        .find(|&pos| !rules::blocks_gravity(grid, pos))
}

/// Gravity followed by ingredient collection, repeated while collection
/// opens new gaps.
pub fn apply_gravity(grid: &mut Grid, events: &mut Vec<Event>) {
    loop {
        compact(grid, events);
        let mut collected = false;
        for x in 0..grid.width() {
            if let Some(pos) = floor_of(grid, x)
                && matches!(grid.at(pos), Cell::Ingredient(_))
            {
                grid.take(pos);
                events.push(Event::IngredientCollected { pos });
                collected = true;
            }
        }
        if !collected {
            break;
        }
    }
}

fn completes_run(grid: &Grid, pos: Position, color: u8, step: (i32, i32)) -> bool {
    let (dx, dy) = step;
    (1..=2).all(|k| {
        let p = Position {
            x: pos.x - dx * k,
            y: pos.y - dy * k,
        };
        rules::match_color(grid, p) == Some(color)
    })
}

/// Fills every empty occupiable cell, top to bottom and left to right, with a
/// color that does not extend the two cells above or the two cells to the left.
pub fn refill<R: Rng>(grid: &mut Grid, rng: &mut R, token_types: u8, events: &mut Vec<Event>) {
    let token_types = token_types.max(1);
    for pos in grid.positions() {
        if !grid.at(pos).is_empty() || !rules::is_occupiable(grid, pos) {
            continue;
        }
        let allowed: Vec<u8> = (0..token_types)
            .filter(|&c| !completes_run(grid, pos, c, (0, 1)) && !completes_run(grid, pos, c, (1, 0)))
            .collect();
        let color = if allowed.is_empty() {
            rng.random_range(0..token_types)
        } else {
            allowed[rng.random_range(0..allowed.len())]
        };
        let cell = Cell::Token(Token::plain(color));
        grid.set(pos, cell);
        events.push(Event::TokenSpawned { pos, cell });
    }
}

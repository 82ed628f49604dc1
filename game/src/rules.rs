//! Per-blocker behavior: what each kind prevents and how a hit wears it down.

use crate::event::Event;
use crate::grid::{Blocker, Cell, Grid};
use crate::position::Position;

mod spread;

pub use spread::SpreadConfig;
pub(crate) use spread::{spread_chocolate, spread_honey};

/// What happens to a blocker when the token in its cell is cleared or hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitEffect {
    /// Lose one layer; the kind is gone at zero.
    Decrement,
    /// Removed outright.
    Remove,
    /// Removed, and the token underneath survives the hit.
    Absorb,
    /// Untouched by hits; cleared when an orthogonal neighbor is cleared.
    AdjacentOnly,
    Immune,
}

impl Blocker {
    pub fn blocks_matching(self) -> bool {
        matches!(self, Blocker::Locked | Blocker::Stone | Blocker::Chocolate)
    }

    pub fn blocks_swapping(self) -> bool {
        match self {
            Blocker::Locked
            | Blocker::Ice
            | Blocker::Chains
            | Blocker::Stone
            | Blocker::Honey
            | Blocker::Chocolate
            | Blocker::Crate => true,
            Blocker::Jelly | Blocker::BombTimer => false,
        }
    }

    pub fn blocks_occupancy(self) -> bool {
        matches!(self, Blocker::Stone | Blocker::Chocolate)
    }

    pub fn blocks_gravity(self) -> bool {
        matches!(self, Blocker::Stone | Blocker::Chocolate)
    }

    pub fn hit_effect(self) -> HitEffect {
        match self {
            Blocker::Jelly | Blocker::Ice | Blocker::Chains | Blocker::Crate => {
                HitEffect::Decrement
            }
            Blocker::Honey | Blocker::BombTimer => HitEffect::Remove,
            Blocker::Locked => HitEffect::Absorb,
            Blocker::Chocolate => HitEffect::AdjacentOnly,
            Blocker::Stone => HitEffect::Immune,
        }
    }
}

fn any_blocker(grid: &Grid, pos: Position, pred: impl Fn(Blocker) -> bool) -> bool {
    Blocker::ALL
        .into_iter()
        .any(|kind| pred(kind) && grid.has(kind, pos))
}

/// In bounds and not covered by stone or chocolate.
pub fn is_occupiable(grid: &Grid, pos: Position) -> bool {
    grid.in_bounds(pos) && !any_blocker(grid, pos, Blocker::blocks_occupancy)
}

/// The color a cell contributes to runs, if it may take part in one at all.
pub fn match_color(grid: &Grid, pos: Position) -> Option<u8> {
    if !grid.in_bounds(pos) || any_blocker(grid, pos, Blocker::blocks_matching) {
        return None;
    }
    grid.token(pos)?.match_color()
}

/// Whether an occupiable cell's blockers allow its token to be swapped.
pub fn can_swap_cell(grid: &Grid, pos: Position) -> bool {
    is_occupiable(grid, pos) && !any_blocker(grid, pos, Blocker::blocks_swapping)
}

pub fn blocks_gravity(grid: &Grid, pos: Position) -> bool {
    !grid.in_bounds(pos) || any_blocker(grid, pos, Blocker::blocks_gravity)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Hit {
    /// The token is to be removed this round.
    Cleared(Cell),
    /// A lock took the hit; the token stays.
    Absorbed,
    Missed,
}

/// Applies the blocker side effects of hitting one cell. The token itself is
/// left in place so later checks in the same round still see it.
pub(crate) fn hit(grid: &mut Grid, pos: Position, events: &mut Vec<Event>) -> Hit {
    if !is_occupiable(grid, pos) {
        return Hit::Missed;
    }
    if grid.has(Blocker::Locked, pos) {
        grid.set_level(Blocker::Locked, pos, 0);
        events.push(Event::BlockerCleared {
            kind: Blocker::Locked,
            pos,
        });
        return Hit::Absorbed;
    }
    let cell = grid.at(pos);
    if cell.is_empty() {
        return Hit::Missed;
    }

    for kind in Blocker::ALL {
        match kind.hit_effect() {
            HitEffect::Decrement => match grid.decrement(kind, pos) {
                Some(0) => events.push(Event::BlockerCleared { kind, pos }),
                Some(remaining) => events.push(Event::BlockerHit {
                    kind,
                    pos,
                    remaining,
                }),
                None => {}
            },
            HitEffect::Remove => {
                if grid.has(kind, pos) {
                    grid.set_level(kind, pos, 0);
                    events.push(Event::BlockerCleared { kind, pos });
                }
            }
            HitEffect::Absorb | HitEffect::AdjacentOnly | HitEffect::Immune => {}
        }
    }
    Hit::Cleared(cell)
}

/// Frees every lock orthogonally adjacent to a cleared cell.
pub(crate) fn unlock_adjacent(grid: &mut Grid, cleared: &[Position], events: &mut Vec<Event>) {
    clear_adjacent(grid, Blocker::Locked, cleared, events);
}

/// Dissolves every chocolate cell orthogonally adjacent to a cleared cell.
pub(crate) fn clear_adjacent_chocolate(
    grid: &mut Grid,
    cleared: &[Position],
    events: &mut Vec<Event>,
) {
    clear_adjacent(grid, Blocker::Chocolate, cleared, events);
}

fn clear_adjacent(grid: &mut Grid, kind: Blocker, cleared: &[Position], events: &mut Vec<Event>) {
    for &pos in cleared {
        for neighbor in pos.neighbors4() {
            if grid.has(kind, neighbor) {
                grid.set_level(kind, neighbor, 0);
                events.push(Event::BlockerCleared {
                    kind,
                    pos: neighbor,
                });
            }
        }
    }
}

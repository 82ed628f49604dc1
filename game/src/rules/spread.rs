use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::grid::{Blocker, Grid};
use crate::position::Position;

use super::is_occupiable;

/// Cadence of a spreading hazard: attempted every `interval` moves, each
/// source cell spreading with `probability`. An interval of zero disables it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpreadConfig {
    pub interval: u32,
    pub probability: f64,
}

impl SpreadConfig {
    pub const DISABLED: SpreadConfig = SpreadConfig {
        interval: 0,
        probability: 0.0,
    };

    pub fn is_due(&self, moves: u32) -> bool {
        self.interval > 0 && moves > 0 && moves % self.interval == 0
    }
}

impl Default for SpreadConfig {
    fn default() -> Self {
        Self {
            interval: 3,
            probability: 0.5,
        }
    }
}

/// Layers that only make sense on top of a token. Chocolate takes them with it.
const TOKEN_LAYERS: [Blocker; 6] = [
    Blocker::Locked,
    Blocker::Ice,
    Blocker::Chains,
    Blocker::Honey,
    Blocker::Crate,
    Blocker::BombTimer,
];

fn honey_target(grid: &Grid, pos: Position) -> bool {
    is_occupiable(grid, pos) && !grid.has(Blocker::Honey, pos) && !grid.at(pos).is_empty()
}

fn chocolate_target(grid: &Grid, pos: Position) -> bool {
    is_occupiable(grid, pos) && !grid.at(pos).special().is_special()
}

/// Runs one spread pass for `kind`. Sources are fixed before any cell changes,
/// so a cell reached this pass does not spread again until the next one.
fn spread<R: Rng>(
    grid: &mut Grid,
    rng: &mut R,
    kind: Blocker,
    probability: f64,
    valid: fn(&Grid, Position) -> bool,
    mut apply: impl FnMut(&mut Grid, Position),
) -> Vec<(Position, Position)> {
    let sources: Vec<Position> = grid.blocker_positions(kind).collect();
    let probability = probability.clamp(0.0, 1.0);
    let mut spread_to = Vec::new();

    for from in sources {
        if !rng.random_bool(probability) {
            continue;
        }
        let targets: Vec<Position> = from.neighbors4().filter(|&p| valid(grid, p)).collect();
        if targets.is_empty() {
            continue;
        }
        let to = targets[rng.random_range(0..targets.len())];
        // An earlier source may have claimed this cell during the same pass.
        if !valid(grid, to) {
            continue;
        }
        apply(grid, to);
        spread_to.push((from, to));
    }
    spread_to
}

/// Honey creeps onto occupied neighbors without disturbing their tokens.
/// Returns whether any honey spread.
pub(crate) fn spread_honey<R: Rng>(
    grid: &mut Grid,
    rng: &mut R,
    probability: f64,
    events: &mut Vec<Event>,
) -> bool {
    let spread_to = spread(grid, rng, Blocker::Honey, probability, honey_target, |g, to| {
        g.set_level(Blocker::Honey, to, 1)
    });
    for &(from, to) in &spread_to {
        events.push(Event::HoneySpread { from, to });
    }
    !spread_to.is_empty()
}

/// Chocolate swallows a neighbor, destroying its token unless that token is
/// special, along with any blocker that sat on the token. Jelly stays underneath.
/// Returns whether any chocolate spread.
pub(crate) fn spread_chocolate<R: Rng>(
    grid: &mut Grid,
    rng: &mut R,
    probability: f64,
    events: &mut Vec<Event>,
) -> bool {
    let mut swallowed = Vec::new();
    let spread_to = spread(
        grid,
        rng,
        Blocker::Chocolate,
        probability,
        chocolate_target,
        |g, to| {
            g.take(to);
            for kind in TOKEN_LAYERS {
                if g.has(kind, to) {
                    g.set_level(kind, to, 0);
                    swallowed.push(Event::BlockerCleared { kind, pos: to });
                }
            }
            g.set_level(Blocker::Chocolate, to, 1);
        },
    );
    for &(from, to) in &spread_to {
        events.push(Event::ChocolateSpread { from, to });
    }
    events.extend(swallowed);
    !spread_to.is_empty()
}

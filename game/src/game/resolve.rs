use std::collections::{HashSet, VecDeque};

use rand::Rng;

use crate::event::Event;
use crate::grid::{Blocker, Cell, Grid, Special, Token};
use crate::position::Position;
use crate::rules::{self, Hit};

use super::{Game, Round};

/// Score for one round: `floor(10 × cleared × 1.5^(level − 1))`.
pub fn round_score(cleared: usize, level: u32) -> u32 {
    let factor = 1.5_f64.powi(level.saturating_sub(1) as i32);
    (10.0 * cleared as f64 * factor).floor() as u32
}

/// Cells a detonating special reaches, itself excluded.
pub(crate) fn blast(grid: &Grid, pos: Position, kind: Special, target: Option<u8>) -> Vec<Position> {
    let (width, height) = grid.bounds();
    match kind {
        Special::None => Vec::new(),
        Special::LineRow => (0..width)
            .map(|x| Position { x: x as i32, y: pos.y })
            .filter(|&p| p != pos)
            .collect(),
        Special::LineCol => (0..height)
            .map(|y| Position { x: pos.x, y: y as i32 })
            .filter(|&p| p != pos)
            .collect(),
        Special::AreaBomb => pos.square(1, (width, height)).filter(|&p| p != pos).collect(),
        Special::ColorBomb => match target {
            Some(color) => grid
                .find_entities(|cell| {
                    cell.token()
                        .is_some_and(|t| t.color == color && t.special != Special::ColorBomb)
                })
                .map(|(p, _)| p)
                .filter(|&p| p != pos)
                .collect(),
            None => Vec::new(),
        },
    }
}

/// A color present on the board for an untargeted color bomb.
fn random_present_color<R: Rng>(grid: &Grid, rng: &mut R) -> Option<u8> {
    let mut colors: Vec<u8> = grid
        .entries()
        .filter_map(|(_, cell)| cell.token()?.match_color())
        .collect();
    colors.sort_unstable();
    colors.dedup();
    if colors.is_empty() {
        return None;
    }
    Some(colors[rng.random_range(0..colors.len())])
}

impl Game {
    /// Breadth-first expansion of everything this round touches, then one
    /// pass of blocker hits over that snapshot before any token is removed.
    pub(super) fn clear_round(&mut self) {
        let round = std::mem::take(&mut self.round);
        let affected = self.expand(&round);

        let mut cleared: Vec<(Position, Cell)> = Vec::new();
        for &pos in &affected {
            match rules::hit(&mut self.grid, pos, &mut self.events) {
                Hit::Cleared(cell @ Cell::Token(_)) => cleared.push((pos, cell)),
                // Ingredients only leave through the bottom row.
                Hit::Cleared(Cell::Ingredient(_) | Cell::Empty) | Hit::Absorbed | Hit::Missed => {}
            }
        }

        let cleared_positions: Vec<Position> = cleared.iter().map(|&(pos, _)| pos).collect();
        rules::unlock_adjacent(&mut self.grid, &cleared_positions, &mut self.events);
        rules::clear_adjacent_chocolate(&mut self.grid, &cleared_positions, &mut self.events);

        let amount = round_score(cleared.len(), self.level);
        log::debug!(
            "round {}: {} matches, {} cells cleared, +{amount}",
            self.level,
            round.matches.len(),
            cleared.len()
        );
        if amount > 0 {
            self.score += u64::from(amount);
            self.events.push(Event::ScoreDelta {
                amount,
                cascade_level: self.level,
            });
        }

        for (pos, cell) in cleared {
            self.grid.take(pos);
            self.events.push(Event::CellCleared { pos, cell });
        }

        for m in &round.matches {
            let Some(pos) = m.special_position else {
                continue;
            };
            if !m.special.is_special()
                || !self.grid.at(pos).is_empty()
                || !rules::is_occupiable(&self.grid, pos)
            {
                continue;
            }
            let token = Token::special(m.color, m.special);
            self.grid.set(pos, Cell::Token(token));
            self.events.push(Event::SpecialCreated { pos, token });
        }
    }

    fn expand(&mut self, round: &Round) -> Vec<Position> {
        let mut queued: HashSet<Position> = HashSet::new();
        let mut queue: VecDeque<Position> = VecDeque::new();
        let mut affected: Vec<Position> = Vec::new();

        let initial = round
            .matches
            .iter()
            .flat_map(|m| m.cells.iter().copied())
            .chain(round.seeds.iter().copied())
            .chain(round.consumed.iter().copied());
        for pos in initial {
            if self.grid.in_bounds(pos) && queued.insert(pos) {
                queue.push_back(pos);
            }
        }

        while let Some(pos) = queue.pop_front() {
            affected.push(pos);
            let Some(token) = self.grid.token(pos) else {
                continue;
            };
            if !token.special.is_special()
                || round.consumed.contains(&pos)
                || self.grid.has(Blocker::Locked, pos)
            {
                continue;
            }
            let target = match token.special {
                Special::ColorBomb => round
                    .color_targets
                    .get(&pos)
                    .copied()
                    .or_else(|| random_present_color(&self.grid, &mut self.rng)),
                _ => None,
            };
            self.events.push(Event::SpecialActivated {
                kind: token.special,
                pos,
            });
            for next in blast(&self.grid, pos, token.special, target) {
                if queued.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        affected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_grows_with_cascade_level() {
        assert_eq!(round_score(4, 1), 40);
        assert_eq!(round_score(3, 1), 30);
        assert_eq!(round_score(3, 2), 45);
        assert_eq!(round_score(3, 3), 67);
        assert_eq!(round_score(0, 5), 0);
    }

    #[test]
    fn line_and_area_blasts_cover_their_shapes() {
        let grid = Grid::from_csv("r,g,b,y\ng,b,y,r\nb,y,r,g").unwrap();
        let center = Position::new(1, 1);
        assert_eq!(blast(&grid, center, Special::LineRow, None).len(), 3);
        assert_eq!(blast(&grid, center, Special::LineCol, None).len(), 2);
        assert_eq!(blast(&grid, center, Special::AreaBomb, None).len(), 8);
        let corner = Position::new(0, 0);
        assert_eq!(blast(&grid, corner, Special::AreaBomb, None).len(), 3);
    }

    #[test]
    fn color_blast_takes_every_token_of_the_target() {
        let grid = Grid::from_csv("*,r,g\nr-,b,r").unwrap();
        let mut hit = blast(&grid, Position::new(0, 0), Special::ColorBomb, Some(0));
        hit.sort();
        assert_eq!(
            hit,
            vec![Position::new(0, 1), Position::new(1, 0), Position::new(2, 1)]
        );
        assert!(blast(&grid, Position::new(0, 0), Special::ColorBomb, None).is_empty());
    }
}

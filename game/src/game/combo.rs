use std::ops::RangeInclusive;

use crate::error::ActionError;
use crate::event::Event;
use crate::grid::{Cell, Special, Token};
use crate::matcher;
use crate::position::Position;
use crate::swap;

use super::Game;

impl Game {
    /// Performs the swap and seeds the first round, or reverts it.
    pub(super) fn begin_swap(&mut self, a: Position, b: Position) -> Result<(), ActionError> {
        swap::validate_swap(&self.grid, a, b)?;
        let (cell_a, cell_b) = (self.grid.at(a), self.grid.at(b));
        self.grid.swap_cells(a, b);

        // After the exchange the token that was at `a` sits at `b` and vice versa.
        match (cell_a, cell_b) {
            (Cell::Token(first), Cell::Token(second))
                if first.special.is_special() && second.special.is_special() =>
            {
                self.begin_combo((b, first), (a, second));
                return Ok(());
            }
            (Cell::Token(bomb), Cell::Token(plain))
                if bomb.special == Special::ColorBomb && plain.special == Special::None =>
            {
                self.round.seeds.push(b);
                self.round.color_targets.insert(b, plain.color);
                return Ok(());
            }
            (Cell::Token(plain), Cell::Token(bomb))
                if bomb.special == Special::ColorBomb && plain.special == Special::None =>
            {
                self.round.seeds.push(a);
                self.round.color_targets.insert(a, plain.color);
                return Ok(());
            }
            _ => {}
        }

        let matches = matcher::find_matches(&self.grid);
        if !matches.is_empty() {
            self.round.matches = matches;
            return Ok(());
        }

        let lone_special = [(b, cell_a), (a, cell_b)].into_iter().find(|(_, cell)| {
            matches!(
                cell.special(),
                Special::LineRow | Special::LineCol | Special::AreaBomb
            )
        });
        if let Some((pos, _)) = lone_special {
            self.round.seeds.push(pos);
            return Ok(());
        }

        self.grid.swap_cells(a, b);
        self.events.push(Event::InvalidSwap { a, b });
        Err(ActionError::NoMatch)
    }

    /// Two specials swapped into each other. `moved` is the token the player
    /// dragged, now resting on the swap target.
    fn begin_combo(&mut self, moved: (Position, Token), other: (Position, Token)) {
        let (target, first) = moved;
        let (_, second) = other;
        let (width, height) = self.grid.bounds();
        let area = |rows: RangeInclusive<i32>, cols: RangeInclusive<i32>| {
            rows.flat_map(move |y| cols.clone().map(move |x| Position { x, y }))
                .filter(|p| p.in_bounds((width, height)))
                .collect::<Vec<_>>()
        };
        let across = 0..=(width as i32 - 1);
        let down = 0..=(height as i32 - 1);
        let Position { x, y } = target;

        let (seeds, consumed): (Vec<Position>, Vec<(Position, Token)>) =
            match (first.special, second.special) {
                (Special::ColorBomb, Special::ColorBomb) => {
                    (self.grid.positions().collect(), vec![moved, other])
                }
                (Special::ColorBomb, kind) | (kind, Special::ColorBomb) => {
                    let (bomb, partner) = if first.special == Special::ColorBomb {
                        (moved, second)
                    } else {
                        (other, first)
                    };
                    let recolor: Vec<Position> = self
                        .grid
                        .find_entities(|cell| {
                            cell.token().is_some_and(|t| {
                                t.color == partner.color && t.special != Special::ColorBomb
                            })
                        })
                        .map(|(pos, _)| pos)
                        .collect();
                    for &pos in &recolor {
                        self.grid
                            .set(pos, Cell::Token(Token::special(partner.color, kind)));
                    }
                    (recolor, vec![bomb])
                }
                (Special::LineRow | Special::LineCol, Special::LineRow | Special::LineCol) => {
                    let mut cells = area(y..=y, across);
                    cells.extend(area(down, x..=x));
                    (cells, vec![moved, other])
                }
                (Special::AreaBomb, Special::AreaBomb) => {
                    (area(y - 2..=y + 2, x - 2..=x + 2), vec![moved, other])
                }
                (Special::LineRow, Special::AreaBomb) | (Special::AreaBomb, Special::LineRow) => {
                    (area(y - 1..=y + 1, across), vec![moved, other])
                }
                (Special::LineCol, Special::AreaBomb) | (Special::AreaBomb, Special::LineCol) => {
                    (area(down, x - 1..=x + 1), vec![moved, other])
                }
                (Special::None, _) | (_, Special::None) => (Vec::new(), Vec::new()),
            };

        log::debug!(
            "combo {:?} + {:?} at {target:?}: {} cells",
            first.special,
            second.special,
            seeds.len()
        );
        for (pos, token) in consumed {
            self.events.push(Event::SpecialActivated {
                kind: token.special,
                pos,
            });
            self.round.consumed.insert(pos);
        }
        self.round.seeds.extend(seeds);
    }
}

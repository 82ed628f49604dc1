use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::direction::Dir4;
use crate::position::Position;

mod layer;
mod parse;

pub(crate) use layer::Layer;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Special {
    #[default]
    None,
    LineRow,
    LineCol,
    AreaBomb,
    ColorBomb,
}

impl Special {
    pub fn is_special(self) -> bool {
        !matches!(self, Special::None)
    }

    pub fn is_line(self) -> bool {
        matches!(self, Special::LineRow | Special::LineCol)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub color: u8,
    pub special: Special,
}

impl Token {
    pub fn plain(color: u8) -> Self {
        Self {
            color,
            special: Special::None,
        }
    }

    pub fn special(color: u8, special: Special) -> Self {
        Self { color, special }
    }

    /// The color this token contributes to runs. Color bombs never join a run.
    pub fn match_color(self) -> Option<u8> {
        match self.special {
            Special::ColorBomb => None,
            Special::None | Special::LineRow | Special::LineCol | Special::AreaBomb => {
                Some(self.color)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Token(Token),
    /// Must be carried down to the bottom row; never matches.
    Ingredient(u8),
}

impl Cell {
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn token(self) -> Option<Token> {
        match self {
            Cell::Token(token) => Some(token),
            Cell::Empty | Cell::Ingredient(_) => None,
        }
    }

    pub fn special(self) -> Special {
        self.token().map_or(Special::None, |t| t.special)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Blocker {
    Jelly,
    Locked,
    Ice,
    Chains,
    Stone,
    Honey,
    Chocolate,
    Crate,
    BombTimer,
}

impl Blocker {
    pub const COUNT: usize = 9;

    pub const ALL: [Blocker; Blocker::COUNT] = [
        Blocker::Jelly,
        Blocker::Locked,
        Blocker::Ice,
        Blocker::Chains,
        Blocker::Stone,
        Blocker::Honey,
        Blocker::Chocolate,
        Blocker::Crate,
        Blocker::BombTimer,
    ];

    pub fn max_level(self) -> u8 {
        match self {
            Blocker::Jelly | Blocker::Ice | Blocker::Chains => 2,
            Blocker::Crate => 3,
            Blocker::BombTimer => 99,
            Blocker::Locked | Blocker::Stone | Blocker::Honey | Blocker::Chocolate => 1,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Licorice wall segments owned by a cell: towards its right and bottom neighbor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Walls {
    pub right: bool,
    pub bottom: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Layer<Cell>,
    blockers: [Layer<u8>; Blocker::COUNT],
    walls: Layer<Walls>,
    conveyors: Layer<Option<Dir4>>,
    portals: BTreeMap<Position, Position>,
}

impl Grid {
    pub fn create_empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: Layer::new(width, height),
            blockers: std::array::from_fn(|_| Layer::new(width, height)),
            walls: Layer::new(width, height),
            conveyors: Layer::new(width, height),
            portals: BTreeMap::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bounds(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.in_bounds(self.bounds())
    }

    /// Token layer content. Out of bounds reads as empty.
    pub fn at(&self, pos: Position) -> Cell {
        self.cells.get(pos)
    }

    pub fn set(&mut self, pos: Position, cell: Cell) {
        self.cells.set(pos, cell);
    }

    pub fn take(&mut self, pos: Position) -> Cell {
        let cell = self.at(pos);
        self.set(pos, Cell::Empty);
        cell
    }

    pub fn token(&self, pos: Position) -> Option<Token> {
        self.at(pos).token()
    }

    pub fn swap_cells(&mut self, a: Position, b: Position) {
        if !self.in_bounds(a) || !self.in_bounds(b) {
            return;
        }
        let cell_a = self.at(a);
        let cell_b = self.at(b);
        self.set(a, cell_b);
        self.set(b, cell_a);
    }

    pub fn level(&self, kind: Blocker, pos: Position) -> u8 {
        self.blockers[kind.index()].get(pos)
    }

    pub fn has(&self, kind: Blocker, pos: Position) -> bool {
        self.level(kind, pos) > 0
    }

    pub fn set_level(&mut self, kind: Blocker, pos: Position, level: u8) {
        self.blockers[kind.index()].set(pos, level.min(kind.max_level()));
    }

    /// Lowers a layered blocker by one. Returns the remaining level, or
    /// `None` if there was nothing to lower.
    pub(crate) fn decrement(&mut self, kind: Blocker, pos: Position) -> Option<u8> {
        let slot = self.blockers[kind.index()].get_mut(pos)?;
        if *slot == 0 {
            return None;
        }
        *slot -= 1;
        Some(*slot)
    }

    pub fn blocker_positions(&self, kind: Blocker) -> impl Iterator<Item = Position> + '_ {
        self.blockers[kind.index()]
            .iter()
            .filter_map(|(pos, level)| (level > 0).then_some(pos))
    }

    pub fn walls(&self, pos: Position) -> Walls {
        self.walls.get(pos)
    }

    pub fn set_walls(&mut self, pos: Position, walls: Walls) {
        self.walls.set(pos, walls);
    }

    /// True if a licorice segment separates two adjacent cells.
    pub fn wall_between(&self, a: Position, b: Position) -> bool {
        let delta = b - a;
        match (delta.dx, delta.dy) {
            (1, 0) => self.walls(a).right,
            (-1, 0) => self.walls(b).right,
            (0, 1) => self.walls(a).bottom,
            (0, -1) => self.walls(b).bottom,
            _ => false,
        }
    }

    pub fn conveyor(&self, pos: Position) -> Option<Dir4> {
        self.conveyors.get(pos)
    }

    pub fn set_conveyor(&mut self, pos: Position, dir: Option<Dir4>) {
        self.conveyors.set(pos, dir);
    }

    pub(crate) fn conveyor_cells(&self) -> impl Iterator<Item = (Position, Dir4)> + '_ {
        self.conveyors
            .iter()
            .filter_map(|(pos, dir)| dir.map(|d| (pos, d)))
    }

    pub fn portal_exit(&self, entrance: Position) -> Option<Position> {
        self.portals.get(&entrance).copied()
    }

    /// Portal pairs ordered by entrance.
    pub fn portals(&self) -> impl Iterator<Item = (Position, Position)> + '_ {
        self.portals.iter().map(|(&entrance, &exit)| (entrance, exit))
    }

    pub fn insert_portal(&mut self, entrance: Position, exit: Position) {
        if self.in_bounds(entrance) && self.in_bounds(exit) {
            self.portals.insert(entrance, exit);
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + use<> {
        let (width, height) = self.bounds();
        (0..height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }

    pub fn entries(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        self.cells.iter()
    }

    pub fn find_entities<F: FnMut(Cell) -> bool>(
        &self,
        mut f: F,
    ) -> impl Iterator<Item = (Position, Cell)> + use<'_, F> {
        self.entries().filter(move |&(_, cell)| f(cell))
    }
}

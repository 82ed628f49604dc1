use serde::{Deserialize, Serialize};

use crate::position::PositionDelta;

/// Heading of a conveyor belt. Level files spell it in lowercase, board notation as an arrow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dir4 {
    North,
    South,
    East,
    West,
}

impl Dir4 {
    const ARROWS: [(char, Dir4); 4] = [
        ('^', Dir4::North),
        ('v', Dir4::South),
        ('>', Dir4::East),
        ('<', Dir4::West),
    ];

    /// Neighbor order is up, right, down, left.
    pub fn all() -> [Self; 4] {
        [Dir4::North, Dir4::East, Dir4::South, Dir4::West]
    }

    /// Unit step in grid coordinates, where north is toward row 0.
    pub fn delta(self) -> PositionDelta {
        let (dx, dy) = match self {
            Dir4::North => (0, -1),
            Dir4::South => (0, 1),
            Dir4::East => (1, 0),
            Dir4::West => (-1, 0),
        };
        PositionDelta::new(dx, dy)
    }

    pub fn arrow(self) -> char {
        Self::ARROWS
            .iter()
            .find_map(|&(c, dir)| (dir == self).then_some(c))
            .unwrap_or('^')
    }

    pub fn from_arrow(c: char) -> Option<Self> {
        Self::ARROWS
            .iter()
            .find_map(|&(arrow, dir)| (arrow == c).then_some(dir))
    }
}

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::direction::Dir4;

/// A cell coordinate. `x` is the column, `y` the row; `y = 0` is the top row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self {
            x: x.try_into().unwrap_or(i32::MAX),
            y: y.try_into().unwrap_or(i32::MAX),
        }
    }

    /// Row/column constructor, matching the order level files use.
    pub fn at(row: usize, col: usize) -> Self {
        Self::new(col, row)
    }

    pub fn in_bounds(self, bounds: (usize, usize)) -> bool {
        let (width, height) = bounds;
        let x_in_bounds = self.x >= 0 && (self.x as usize) < width;
        let y_in_bounds = self.y >= 0 && (self.y as usize) < height;
        x_in_bounds && y_in_bounds
    }

    /// True when exactly one of row/column differs, by exactly one.
    pub fn is_adjacent(self, other: Position) -> bool {
        (other - self).magnitude_sq() == 1
    }

    pub fn neighbors4(self) -> impl Iterator<Item = Position> {
        Dir4::all().into_iter().map(move |dir| self + dir.delta())
    }

    /// The `(2r + 1) × (2r + 1)` square centered here, clipped to `bounds`, center included.
    pub fn square(self, radius: i32, bounds: (usize, usize)) -> impl Iterator<Item = Position> {
        (-radius..=radius)
            .flat_map(move |dy| (-radius..=radius).map(move |dx| self + PositionDelta::new(dx, dy)))
            .filter(move |p| p.in_bounds(bounds))
    }

    pub(crate) fn index(self, width: usize) -> usize {
        self.y as usize * width + self.x as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PositionDelta {
    pub dx: i32,
    pub dy: i32,
}

impl PositionDelta {
    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    pub fn magnitude_sq(self) -> i32 {
        self.dx * self.dx + self.dy * self.dy
    }
}

impl Add<PositionDelta> for Position {
    type Output = Position;

    fn add(self, delta: PositionDelta) -> Position {
        let x = self.x + delta.dx;
        let y = self.y + delta.dy;
        Position { x, y }
    }
}

impl Sub for Position {
    type Output = PositionDelta;

    fn sub(self, other: Position) -> PositionDelta {
        PositionDelta {
            dx: self.x - other.x,
            dy: self.y - other.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_is_orthogonal_only() {
        let p = Position::new(3, 3);
        assert!(p.is_adjacent(Position::new(4, 3)));
        assert!(p.is_adjacent(Position::new(3, 2)));
        assert!(!p.is_adjacent(Position::new(4, 4)));
        assert!(!p.is_adjacent(Position::new(5, 3)));
        assert!(!p.is_adjacent(p));
    }

    #[test]
    fn squares_are_clipped_at_the_edge() {
        let corner: Vec<_> = Position::new(0, 0).square(1, (5, 5)).collect();
        assert_eq!(corner.len(), 4);
        assert_eq!(Position::new(2, 2).square(2, (5, 5)).count(), 25);
    }

    #[test]
    fn row_col_constructor_maps_to_xy() {
        assert_eq!(Position::at(2, 5), Position { x: 5, y: 2 });
    }
}

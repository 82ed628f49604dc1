use crate::error::ActionError;
use crate::grid::Grid;
use crate::position::Position;
use crate::rules;

/// Whether two cells may be exchanged. Says nothing about whether the
/// exchange produces a match; callers run the matcher afterwards.
pub fn validate_swap(grid: &Grid, a: Position, b: Position) -> Result<(), ActionError> {
    for pos in [a, b] {
        if !grid.in_bounds(pos) {
            return Err(ActionError::OutOfBounds(pos));
        }
    }
    if !a.is_adjacent(b) {
        return Err(ActionError::NotAdjacent);
    }
    for pos in [a, b] {
        if !rules::can_swap_cell(grid, pos) {
            return Err(ActionError::Blocked);
        }
    }
    if grid.wall_between(a, b) {
        return Err(ActionError::Blocked);
    }
    for pos in [a, b] {
        if grid.at(pos).is_empty() {
            return Err(ActionError::Empty(pos));
        }
    }
    Ok(())
}

pub fn can_swap(grid: &Grid, a: Position, b: Position) -> bool {
    validate_swap(grid, a, b).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(csv: &str) -> Grid {
        Grid::from_csv(csv).unwrap()
    }

    #[test]
    fn adjacent_free_cells_swap() {
        let g = grid("r,g\nb,y");
        assert!(can_swap(&g, Position::new(0, 0), Position::new(1, 0)));
        assert!(can_swap(&g, Position::new(0, 0), Position::new(0, 1)));
        assert_eq!(
            validate_swap(&g, Position::new(0, 0), Position::new(1, 1)),
            Err(ActionError::NotAdjacent)
        );
        assert_eq!(
            validate_swap(&g, Position::new(0, 0), Position::new(0, 0)),
            Err(ActionError::NotAdjacent)
        );
    }

    #[test]
    fn each_swap_blocker_forbids_the_swap() {
        for code in ["rI", "rC", "rH", "rK", "rL"] {
            let g = grid(&format!("{code},g"));
            assert_eq!(
                validate_swap(&g, Position::new(0, 0), Position::new(1, 0)),
                Err(ActionError::Blocked),
                "{code}"
            );
        }
        for code in ["rJ2", "rT4"] {
            let g = grid(&format!("{code},g"));
            assert!(can_swap(&g, Position::new(0, 0), Position::new(1, 0)), "{code}");
        }
    }

    #[test]
    fn licorice_blocks_only_its_own_edge() {
        let g = grid("r],g\nb_,y\ng,r");
        assert!(!can_swap(&g, Position::new(0, 0), Position::new(1, 0)));
        assert!(!can_swap(&g, Position::new(1, 0), Position::new(0, 0)));
        assert!(can_swap(&g, Position::new(0, 0), Position::new(0, 1)));
        assert!(!can_swap(&g, Position::new(0, 1), Position::new(0, 2)));
        assert!(can_swap(&g, Position::new(0, 1), Position::new(1, 1)));
    }

    #[test]
    fn stone_and_empty_cells_cannot_swap() {
        let g = grid("r,#,.,g");
        assert_eq!(
            validate_swap(&g, Position::new(0, 0), Position::new(1, 0)),
            Err(ActionError::Blocked)
        );
        assert_eq!(
            validate_swap(&g, Position::new(3, 0), Position::new(2, 0)),
            Err(ActionError::Empty(Position::new(2, 0)))
        );
        assert_eq!(
            validate_swap(&g, Position::new(3, 0), Position::new(4, 0)),
            Err(ActionError::OutOfBounds(Position::new(4, 0)))
        );
    }
}

//! Run detection: straight runs of three or more, merged where a horizontal
//! and a vertical run of the same color cross.

use std::collections::HashMap;

use crate::grid::{Grid, Special};
use crate::position::Position;
use crate::rules;

pub const MIN_RUN: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Horizontal,
    Vertical,
    Intersection,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    pub color: u8,
    /// Discovery order: left to right, top to bottom, horizontal run first.
    pub cells: Vec<Position>,
    pub shape: Shape,
    pub special: Special,
    pub special_position: Option<Position>,
}

impl Match {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Worth of this match when ranking hints.
    pub fn value(&self) -> u32 {
        let bonus = match self.special {
            Special::None => 0,
            Special::LineRow | Special::LineCol => 50,
            Special::AreaBomb => 75,
            Special::ColorBomb => 100,
        };
        10 * self.cells.len() as u32 + bonus
    }

    fn straight(run: Run) -> Self {
        let (special, special_position) = match run.cells.len() {
            0..=3 => (Special::None, None),
            4 if run.horizontal => (Special::LineRow, Some(run.cells[2])),
            4 => (Special::LineCol, Some(run.cells[2])),
            len => (Special::ColorBomb, Some(run.cells[len / 2])),
        };
        Self {
            color: run.color,
            shape: if run.horizontal {
                Shape::Horizontal
            } else {
                Shape::Vertical
            },
            cells: run.cells,
            special,
            special_position,
        }
    }
}

#[derive(Clone, Debug)]
struct Run {
    color: u8,
    cells: Vec<Position>,
    horizontal: bool,
}

/// Greedy scan of one line; a cell belongs to at most one run per direction.
fn scan_line(grid: &Grid, line: impl Iterator<Item = Position>, horizontal: bool) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut current: Option<Run> = None;

    for pos in line {
        let color = rules::match_color(grid, pos);
        if let Some(run) = current.as_mut()
            && color == Some(run.color)
        {
            run.cells.push(pos);
            continue;
        }
        if let Some(run) = current.take()
            && run.cells.len() >= MIN_RUN
        {
            runs.push(run);
        }
        current = color.map(|c| Run {
            color: c,
            cells: vec![pos],
            horizontal,
        });
    }
    if let Some(run) = current
        && run.cells.len() >= MIN_RUN
    {
        runs.push(run);
    }
    runs
}

fn find(parent: &mut [usize], i: usize) -> usize {
    let mut root = i;
    while parent[root] != root {
        root = parent[root];
    }
    let mut node = i;
    while parent[node] != root {
        let next = parent[node];
        parent[node] = root;
        node = next;
    }
    root
}

/// Every match on the board, with intersecting runs merged into one group.
pub fn find_matches(grid: &Grid) -> Vec<Match> {
    let (width, height) = grid.bounds();
    let mut runs = Vec::new();
    for y in 0..height {
        runs.extend(scan_line(grid, (0..width).map(|x| Position::new(x, y)), true));
    }
    let horizontal_count = runs.len();
    for x in 0..width {
        runs.extend(scan_line(grid, (0..height).map(|y| Position::new(x, y)), false));
    }
    if runs.is_empty() {
        return Vec::new();
    }

    let mut owner: HashMap<Position, usize> = HashMap::new();
    for (i, run) in runs[..horizontal_count].iter().enumerate() {
        for &pos in &run.cells {
            owner.insert(pos, i);
        }
    }

    let mut parent: Vec<usize> = (0..runs.len()).collect();
    let mut shared: Vec<Position> = Vec::new();
    for (j, run) in runs.iter().enumerate().skip(horizontal_count) {
        for pos in &run.cells {
            if let Some(&i) = owner.get(pos) {
                // Crossing runs share a cell, so they already share a color.
                let (a, b) = (find(&mut parent, i), find(&mut parent, j));
                parent[b.max(a)] = a.min(b);
                shared.push(*pos);
            }
        }
    }

    let mut groups: Vec<(usize, Vec<usize>)> = Vec::new();
    for i in 0..runs.len() {
        let root = find(&mut parent, i);
        match groups.iter_mut().find(|(r, _)| *r == root) {
            Some((_, members)) => members.push(i),
            None => groups.push((root, vec![i])),
        }
    }

    let mut matches = Vec::with_capacity(groups.len());
    for (root, members) in groups {
        if let &[only] = members.as_slice() {
            matches.push(Match::straight(runs[only].clone()));
            continue;
        }
        let mut cells: Vec<Position> = Vec::new();
        for &i in &members {
            for &pos in &runs[i].cells {
                if !cells.contains(&pos) {
                    cells.push(pos);
                }
            }
        }
        let center = shared
            .iter()
            .copied()
            .find(|pos| owner.get(pos).is_some_and(|&i| find(&mut parent, i) == root));
        matches.push(Match {
            color: runs[root].color,
            cells,
            shape: Shape::Intersection,
            special: Special::AreaBomb,
            special_position: center,
        });
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches_of(csv: &str) -> Vec<Match> {
        find_matches(&Grid::from_csv(csv).unwrap())
    }

    #[test]
    fn run_of_three_creates_nothing() {
        let found = matches_of("b,r,r,r,g\ng,b,g,b,y");
        assert_eq!(found.len(), 1);
        let m = &found[0];
        assert_eq!(m.shape, Shape::Horizontal);
        assert_eq!(m.color, 0);
        assert_eq!(m.len(), 3);
        assert_eq!(m.special, Special::None);
        assert_eq!(m.special_position, None);
    }

    #[test]
    fn run_of_four_creates_a_line_at_index_two() {
        let found = matches_of("r,r,r,r,g");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].special, Special::LineRow);
        assert_eq!(found[0].special_position, Some(Position::new(2, 0)));

        let found = matches_of("b\ng\ng\ng\ng");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].shape, Shape::Vertical);
        assert_eq!(found[0].special, Special::LineCol);
        assert_eq!(found[0].special_position, Some(Position::new(0, 3)));
    }

    #[test]
    fn run_of_five_or_more_creates_a_color_bomb_in_the_middle() {
        let found = matches_of("y,y,y,y,y");
        assert_eq!(found[0].special, Special::ColorBomb);
        assert_eq!(found[0].special_position, Some(Position::new(2, 0)));

        let found = matches_of("g,y,y,y,y,y,y");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].len(), 6);
        assert_eq!(found[0].special_position, Some(Position::new(4, 0)));
    }

    #[test]
    fn crossing_runs_merge_into_one_area_bomb() {
        let csv = "\
g,r,b
r,r,r
b,r,g";
        let found = matches_of(csv);
        assert_eq!(found.len(), 1);
        let m = &found[0];
        assert_eq!(m.shape, Shape::Intersection);
        assert_eq!(m.len(), 5);
        assert_eq!(m.special, Special::AreaBomb);
        assert_eq!(m.special_position, Some(Position::new(1, 1)));
    }

    #[test]
    fn l_shape_puts_the_bomb_on_the_corner() {
        let csv = "\
p,b,g,y
p,g,b,y
p,p,p,g";
        let found = matches_of(csv);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].special, Special::AreaBomb);
        assert_eq!(found[0].special_position, Some(Position::new(0, 2)));
        assert_eq!(found[0].len(), 5);
    }

    #[test]
    fn long_runs_still_make_an_area_bomb_when_crossed() {
        let csv = "\
g,b,o,b,g
o,o,o,o,o
g,b,o,b,g
b,g,o,g,b";
        let found = matches_of(csv);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].special, Special::AreaBomb);
        assert_eq!(found[0].len(), 8);
    }

    #[test]
    fn separate_runs_stay_separate() {
        let csv = "\
r,r,r,g,b,b,b
g,b,g,b,g,r,g";
        let found = matches_of(csv);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].color, 0);
        assert_eq!(found[1].color, 2);
    }

    #[test]
    fn ice_and_honey_do_not_break_a_run_but_locks_do() {
        assert_eq!(matches_of("rI2,rH,rC").len(), 1);
        assert!(matches_of("r,rL,r,r").is_empty());
        assert!(matches_of("r,r,*,r").is_empty());
        assert!(matches_of("r,i,r,r").is_empty());
    }

    #[test]
    fn matched_cells_never_overlap_between_groups() {
        let csv = "\
r,r,r,g
r,g,g,g
r,b,b,b";
        let found = matches_of(csv);
        let mut seen = Vec::new();
        for m in &found {
            for pos in &m.cells {
                assert!(!seen.contains(pos));
                seen.push(*pos);
            }
        }
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn hint_value_rewards_specials() {
        let plain = matches_of("r,r,r")[0].value();
        let line = matches_of("r,r,r,r")[0].value();
        let bomb = matches_of("r,r,r,r,r")[0].value();
        assert!(plain < line && line < bomb);
    }
}

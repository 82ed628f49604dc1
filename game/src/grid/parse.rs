use csv::ReaderBuilder;

use crate::direction::Dir4;
use crate::error::LevelError;
use crate::position::Position;

use super::{Blocker, Cell, Grid, Special, Token, Walls};

/// Single-letter color codes, indexed by color.
pub(crate) const COLOR_CODES: [char; 8] = ['r', 'g', 'b', 'y', 'p', 'o', 'w', 'n'];

const BLOCKER_CODES: [(char, Blocker); 7] = [
    ('J', Blocker::Jelly),
    ('L', Blocker::Locked),
    ('I', Blocker::Ice),
    ('C', Blocker::Chains),
    ('H', Blocker::Honey),
    ('K', Blocker::Crate),
    ('T', Blocker::BombTimer),
];

impl Grid {
    /// Parses the compact board notation: one CSV field per cell, one record per row.
    ///
    /// A field is a base (`r g b y p o w n` colors, `*` color bomb, `i` ingredient,
    /// `.` empty, `#` stone, `%` chocolate), an optional special suffix (`-` row line,
    /// `|` column line, `+` area bomb), then blocker codes (`J L I C H K T`, each with
    /// an optional level), conveyor arrows (`^ v > <`) and licorice walls (`]` right,
    /// `_` bottom). For example `rI2L` is a red token under two layers of ice and a lock.
    pub fn from_csv(csv_str: &str) -> Result<Self, LevelError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(false)
            .from_reader(csv_str.as_bytes());

        let mut rows: Vec<Vec<String>> = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(|f| f.trim().to_string()).collect());
        }

        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 || height == 0 {
            return Err(LevelError::Dimensions {
                rows: height,
                cols: width,
            });
        }

        let mut grid = Grid::create_empty(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, field) in row.iter().enumerate() {
                let pos = Position::new(x, y);
                parse_field(&mut grid, pos, field).ok_or_else(|| LevelError::UnknownCell {
                    row: y,
                    col: x,
                    field: field.clone(),
                })?;
            }
        }
        Ok(grid)
    }

    /// Writes the board back in the notation accepted by [`Grid::from_csv`].
    pub fn to_csv(&self) -> String {
        let mut lines = Vec::new();
        for y in 0..self.height {
            let mut row = Vec::new();
            for x in 0..self.width {
                row.push(self.cell_code(Position::new(x, y)));
            }
            lines.push(row.join(",") + "\n");
        }
        lines.join("")
    }

    fn cell_code(&self, pos: Position) -> String {
        let mut code = String::new();
        if self.has(Blocker::Stone, pos) {
            code.push('#');
        } else if self.has(Blocker::Chocolate, pos) {
            code.push('%');
        } else {
            match self.at(pos) {
                Cell::Empty => code.push('.'),
                Cell::Ingredient(_) => code.push('i'),
                Cell::Token(token) => {
                    if token.special == Special::ColorBomb {
                        code.push('*');
                    } else {
                        code.push(COLOR_CODES.get(token.color as usize).copied().unwrap_or('?'));
                        match token.special {
                            Special::LineRow => code.push('-'),
                            Special::LineCol => code.push('|'),
                            Special::AreaBomb => code.push('+'),
                            Special::None | Special::ColorBomb => {}
                        }
                    }
                }
            }
        }
        for (letter, kind) in BLOCKER_CODES {
            match self.level(kind, pos) {
                0 => {}
                1 => code.push(letter),
                n => code.push_str(&format!("{letter}{n}")),
            }
        }
        if let Some(dir) = self.conveyor(pos) {
            code.push(dir.arrow());
        }
        let walls = self.walls(pos);
        if walls.right {
            code.push(']');
        }
        if walls.bottom {
            code.push('_');
        }
        code
    }
}

/// Returns `None` on any unrecognized character.
fn parse_field(grid: &mut Grid, pos: Position, field: &str) -> Option<()> {
    let mut chars = field.chars().peekable();

    match chars.next() {
        None | Some('.') => {}
        Some('#') => grid.set_level(Blocker::Stone, pos, 1),
        Some('%') => grid.set_level(Blocker::Chocolate, pos, 1),
        Some('i') => grid.set(pos, Cell::Ingredient(0)),
        Some('*') => grid.set(pos, Cell::Token(Token::special(0, Special::ColorBomb))),
        Some(c) => {
            let color = COLOR_CODES.iter().position(|&code| code == c)? as u8;
            let special = match chars.peek() {
                Some('-') => Special::LineRow,
                Some('|') => Special::LineCol,
                Some('+') => Special::AreaBomb,
                _ => Special::None,
            };
            if special.is_special() {
                chars.next();
            }
            grid.set(pos, Cell::Token(Token::special(color, special)));
        }
    }

    let mut walls = Walls::default();
    while let Some(c) = chars.next() {
        if let Some(&(_, kind)) = BLOCKER_CODES.iter().find(|(letter, _)| *letter == c) {
            let mut digits = String::new();
            while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                digits.push(*d);
                chars.next();
            }
            let level = if digits.is_empty() {
                1
            } else {
                digits.parse().ok()?
            };
            grid.set_level(kind, pos, level);
        } else if let Some(dir) = Dir4::from_arrow(c) {
            grid.set_conveyor(pos, Some(dir));
        } else if c == ']' {
            walls.right = true;
        } else if c == '_' {
            walls.bottom = true;
        } else {
            return None;
        }
    }
    grid.set_walls(pos, walls);
    Some(())
}

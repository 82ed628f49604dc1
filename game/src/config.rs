use serde::{Deserialize, Serialize};

use crate::direction::Dir4;
use crate::error::LevelError;
use crate::grid::{Blocker, Cell, Grid, Walls};
use crate::position::Position;
pub use crate::rules::SpreadConfig;

pub const MAX_SIDE: usize = 32;
pub const MIN_TOKEN_TYPES: u8 = 3;
pub const MAX_TOKEN_TYPES: u8 = 8;

/// Level description handed over by whoever maps levels to parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelConfig {
    #[serde(default)]
    pub name: String,
    pub rows: usize,
    pub cols: usize,
    pub token_type_count: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jelly: Vec<CellSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locked: Vec<CellSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ice: Vec<CellSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chains: Vec<CellSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stone: Vec<CellSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub honey: Vec<CellSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub licorice: Vec<WallSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chocolate: Vec<CellSpec>,
    #[serde(default, rename = "crate", skip_serializing_if = "Vec::is_empty")]
    pub crates: Vec<CellSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bomb_timer: Vec<CellSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conveyor: Vec<ConveyorSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub portals: Vec<PortalSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ingredients: Vec<CellSpec>,
    #[serde(default)]
    pub honey_spread: SpreadConfig,
    #[serde(default)]
    pub chocolate_spread: SpreadConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn one() -> u8 {
    1
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellSpec {
    pub row: usize,
    pub col: usize,
    /// Layer count for layered kinds, countdown for bomb timers.
    #[serde(default = "one")]
    pub layers: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WallSpec {
    pub row: usize,
    pub col: usize,
    #[serde(default)]
    pub right: bool,
    #[serde(default)]
    pub bottom: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConveyorSpec {
    pub row: usize,
    pub col: usize,
    pub dir: Dir4,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl From<Coord> for Position {
    fn from(c: Coord) -> Self {
        Position::at(c.row, c.col)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortalSpec {
    pub entrance: Coord,
    pub exit: Coord,
}

/// Rule parameters that live beside the grid for a whole session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    pub token_types: u8,
    pub honey_spread: SpreadConfig,
    pub chocolate_spread: SpreadConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            token_types: 6,
            honey_spread: SpreadConfig::default(),
            chocolate_spread: SpreadConfig::default(),
        }
    }
}

impl LevelConfig {
    pub fn parse(json_str: &str) -> Result<Self, LevelError> {
        let config: LevelConfig = serde_json::from_str(json_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        if self.rows == 0 || self.cols == 0 || self.rows > MAX_SIDE || self.cols > MAX_SIDE {
            return Err(LevelError::Dimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if !(MIN_TOKEN_TYPES..=MAX_TOKEN_TYPES).contains(&self.token_type_count) {
            return Err(LevelError::TokenTypes(self.token_type_count));
        }
        for (kind, spread) in [
            ("honey", self.honey_spread),
            ("chocolate", self.chocolate_spread),
        ] {
            if !(0.0..=1.0).contains(&spread.probability) {
                return Err(LevelError::Probability {
                    kind,
                    probability: spread.probability,
                });
            }
        }

        let coords = self
            .cell_lists()
            .into_iter()
            .flat_map(|(kind, list)| list.iter().map(move |c| (kind, c.row, c.col)))
            .chain(self.licorice.iter().map(|w| ("licorice", w.row, w.col)))
            .chain(self.conveyor.iter().map(|c| ("conveyor", c.row, c.col)))
            .chain(self.portals.iter().flat_map(|p| {
                [
                    ("portal", p.entrance.row, p.entrance.col),
                    ("portal", p.exit.row, p.exit.col),
                ]
            }));
        for (kind, row, col) in coords {
            if row >= self.rows || col >= self.cols {
                return Err(LevelError::OutOfBounds { kind, row, col });
            }
        }
        Ok(())
    }

    fn cell_lists(&self) -> [(&'static str, &[CellSpec]); 10] {
        [
            ("jelly", &self.jelly),
            ("locked", &self.locked),
            ("ice", &self.ice),
            ("chains", &self.chains),
            ("stone", &self.stone),
            ("honey", &self.honey),
            ("chocolate", &self.chocolate),
            ("crate", &self.crates),
            ("bombTimer", &self.bomb_timer),
            ("ingredients", &self.ingredients),
        ]
    }

    /// Builds the blocker layers. Token cells are left empty except for
    /// ingredients; the game fills the rest.
    pub fn build_grid(&self) -> Result<Grid, LevelError> {
        self.validate()?;
        let mut grid = Grid::create_empty(self.cols, self.rows);
        let layered = [
            (Blocker::Jelly, &self.jelly),
            (Blocker::Locked, &self.locked),
            (Blocker::Ice, &self.ice),
            (Blocker::Chains, &self.chains),
            (Blocker::Stone, &self.stone),
            (Blocker::Honey, &self.honey),
            (Blocker::Chocolate, &self.chocolate),
            (Blocker::Crate, &self.crates),
            (Blocker::BombTimer, &self.bomb_timer),
        ];
        for (kind, list) in layered {
            for spec in list {
                grid.set_level(kind, Position::at(spec.row, spec.col), spec.layers);
            }
        }
        for wall in &self.licorice {
            let pos = Position::at(wall.row, wall.col);
            let mut walls: Walls = grid.walls(pos);
            walls.right |= wall.right;
            walls.bottom |= wall.bottom;
            grid.set_walls(pos, walls);
        }
        for belt in &self.conveyor {
            grid.set_conveyor(Position::at(belt.row, belt.col), Some(belt.dir));
        }
        for portal in &self.portals {
            grid.insert_portal(portal.entrance.into(), portal.exit.into());
        }
        for spec in &self.ingredients {
            grid.set(Position::at(spec.row, spec.col), Cell::Ingredient(0));
        }
        Ok(grid)
    }

    pub fn settings(&self) -> Settings {
        Settings {
            token_types: self.token_type_count,
            honey_spread: self.honey_spread,
            chocolate_spread: self.chocolate_spread,
        }
    }
}

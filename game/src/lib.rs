pub mod config;
pub mod direction;
pub mod error;
pub mod event;
pub mod game;
pub mod grid;
pub mod levels;
pub mod matcher;
pub mod position;
pub mod rules;
pub mod swap;

pub use config::{LevelConfig, Settings};
pub use error::{ActionError, LevelError};
pub use event::Event;
pub use game::{Action, Game, Hint, Phase};
pub use grid::{Blocker, Cell, Grid, Special, Token};
pub use position::Position;

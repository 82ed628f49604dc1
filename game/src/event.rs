use crate::grid::{Blocker, Cell, Special, Token};
use crate::position::Position;

/// Notifications produced while the engine works. A presentation layer drains
/// them with [`Game::take_events`](crate::game::Game::take_events) between phases.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    ScoreDelta {
        amount: u32,
        cascade_level: u32,
    },
    CellCleared {
        pos: Position,
        cell: Cell,
    },
    SpecialCreated {
        pos: Position,
        token: Token,
    },
    SpecialActivated {
        kind: Special,
        pos: Position,
    },
    BlockerHit {
        kind: Blocker,
        pos: Position,
        remaining: u8,
    },
    BlockerCleared {
        kind: Blocker,
        pos: Position,
    },
    /// A countdown ran out. Losing the level is up to the caller.
    BombTimerExpired {
        pos: Position,
    },
    HoneySpread {
        from: Position,
        to: Position,
    },
    ChocolateSpread {
        from: Position,
        to: Position,
    },
    TokenMoved {
        from: Position,
        to: Position,
    },
    TokenSpawned {
        pos: Position,
        cell: Cell,
    },
    IngredientCollected {
        pos: Position,
    },
    Reshuffled,
    ReshuffleFailed,
    InvalidSwap {
        a: Position,
        b: Position,
    },
    CascadeComplete {
        rounds: u32,
    },
    CascadeExhausted {
        rounds: u32,
    },
}

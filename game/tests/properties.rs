//! Invariants that must hold on arbitrary boards, not just hand-built ones.

use std::collections::HashSet;

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tilecrush::config::SpreadConfig;
use tilecrush::game::{apply_gravity, has_legal_move, reshuffle};
use tilecrush::matcher::find_matches;
use tilecrush::rules::{self, is_occupiable};
use tilecrush::{Action, Blocker, Cell, Game, Grid, Phase, Position, Settings, Token};

const EMPTY: u8 = 5;
const STONE: u8 = 6;

fn build(width: usize, height: usize, codes: &[u8]) -> Grid {
    let mut grid = Grid::create_empty(width, height);
    for (pos, &code) in grid.positions().zip(codes) {
        match code {
            EMPTY => {}
            STONE => grid.set_level(Blocker::Stone, pos, 1),
            color => grid.set(pos, Cell::Token(Token::plain(color))),
        }
    }
    grid
}

/// Boards with tokens, holes and stone.
fn board() -> impl Strategy<Value = Grid> {
    (3usize..9, 3usize..9).prop_flat_map(|(w, h)| {
        prop::collection::vec(0u8..7, w * h).prop_map(move |codes| build(w, h, &codes))
    })
}

/// Boards with no holes, as the engine leaves them between moves.
fn full_board() -> impl Strategy<Value = Grid> {
    (3usize..9, 3usize..9).prop_flat_map(|(w, h)| {
        prop::collection::vec(prop_oneof![9 => 0u8..5, 1 => Just(STONE)], w * h)
            .prop_map(move |codes| build(w, h, &codes))
    })
}

fn settings() -> Settings {
    Settings {
        token_types: 5,
        honey_spread: SpreadConfig::DISABLED,
        chocolate_spread: SpreadConfig::DISABLED,
    }
}

fn shuffled_colors(grid: &Grid) -> Vec<u8> {
    let mut colors: Vec<u8> = grid
        .entries()
        .filter_map(|(pos, cell)| {
            let token = cell.token()?;
            (!token.special.is_special() && !grid.has(Blocker::Locked, pos))
                .then_some(token.color)
        })
        .collect();
    colors.sort_unstable();
    colors
}

proptest! {
    #[test]
    fn match_groups_never_overlap(grid in board()) {
        let mut seen: HashSet<Position> = HashSet::new();
        for m in find_matches(&grid) {
            prop_assert!(m.len() >= 3);
            for pos in &m.cells {
                prop_assert!(seen.insert(*pos), "{pos:?} in two matches");
                prop_assert_eq!(rules::match_color(&grid, *pos), Some(m.color));
            }
        }
    }

    #[test]
    fn gravity_leaves_no_holes_under_tokens(mut grid in board()) {
        apply_gravity(&mut grid, &mut Vec::new());
        let (width, height) = grid.bounds();
        for x in 0..width {
            let mut hole_below = false;
            for y in (0..height).rev() {
                let pos = Position::new(x, y);
                if !is_occupiable(&grid, pos) {
                    hole_below = false;
                } else if grid.at(pos).is_empty() {
                    hole_below = true;
                } else {
                    prop_assert!(!hole_below, "token above a hole at {pos:?}");
                }
            }
        }
    }

    #[test]
    fn reshuffle_permutes_and_finds_a_move(mut grid in full_board(), seed in any::<u64>()) {
        let before = shuffled_colors(&grid);
        let mut rng = SmallRng::seed_from_u64(seed);
        let accepted = reshuffle(&mut grid, &mut rng);
        prop_assert_eq!(shuffled_colors(&grid), before);
        if accepted {
            prop_assert!(has_legal_move(&grid));
        }
    }

    #[test]
    fn cascades_terminate_on_a_full_quiet_board(grid in board(), seed in any::<u64>()) {
        let mut game = Game::new(grid, settings(), seed);
        game.prepare_board();
        game.rescan().unwrap();
        game.resolve_all();
        prop_assert!(!game.is_busy());
        if game.phase() == Phase::Idle {
            prop_assert!(find_matches(game.grid()).is_empty());
        }
        let grid = game.grid();
        prop_assert!(
            grid.positions().all(|p| !is_occupiable(grid, p) || !grid.at(p).is_empty())
        );
    }

    #[test]
    fn hinted_moves_are_always_accepted(grid in full_board(), seed in any::<u64>()) {
        let mut game = Game::new(grid, settings(), seed);
        game.rescan().unwrap();
        game.resolve_all();
        if let Some(hint) = game.hint() {
            prop_assert_eq!(game.apply_action(Action::Swap(hint.from, hint.to)), Ok(()));
            prop_assert_eq!(game.moves(), 1);
            prop_assert!(!game.is_busy());
        }
    }
}

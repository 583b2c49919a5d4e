//! Rules of the sliding-tile puzzle, checked through the public API

use rand::{Rng, SeedableRng, rngs::StdRng};
use tilemind::{
    Board, Direction, Game, encode,
    game::{Grid, slide_merge_line},
};

fn board(grid: Grid) -> Board {
    Board::from_grid(grid).unwrap()
}

#[test]
fn test_line_merges() {
    assert_eq!(slide_merge_line([2, 2, 2, 2]), [4, 4, 0, 0]);
    assert_eq!(slide_merge_line([2, 2, 4, 0]), [4, 4, 0, 0]);
    assert_eq!(slide_merge_line([4, 0, 4, 4]), [8, 4, 0, 0]);
    assert_eq!(slide_merge_line([0, 0, 0, 2]), [2, 0, 0, 0]);
    assert_eq!(slide_merge_line([0, 2, 0, 2]), [4, 0, 0, 0]);
    assert_eq!(slide_merge_line([2, 0, 2, 4]), [4, 4, 0, 0]);
    assert_eq!(slide_merge_line([2, 4, 8, 16]), [2, 4, 8, 16]);
    assert_eq!(slide_merge_line([0; 4]), [0; 4]);
}

#[test]
fn test_merged_tile_does_not_merge_again() {
    assert_eq!(slide_merge_line([4, 4, 8, 0]), [8, 8, 0, 0]);
    assert_eq!(slide_merge_line([8, 4, 4, 0]), [8, 8, 0, 0]);
}

#[test]
fn test_every_direction_on_one_board() {
    let start = board([[2, 2, 0, 0], [0, 4, 0, 4], [0; 4], [2, 0, 0, 2]]);

    assert_eq!(
        start.shifted(Direction::Left).grid(),
        [[4, 0, 0, 0], [8, 0, 0, 0], [0; 4], [4, 0, 0, 0]]
    );
    assert_eq!(
        start.shifted(Direction::Right).grid(),
        [[0, 0, 0, 4], [0, 0, 0, 8], [0; 4], [0, 0, 0, 4]]
    );
    assert_eq!(
        start.shifted(Direction::Up).grid(),
        [[4, 2, 0, 4], [0, 4, 0, 2], [0; 4], [0; 4]]
    );
    assert_eq!(
        start.shifted(Direction::Down).grid(),
        [[0; 4], [0; 4], [0, 2, 0, 4], [4, 4, 0, 2]]
    );
}

#[test]
fn test_full_board_without_merges_is_terminal() {
    let stuck = board([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
    assert!(stuck.is_terminal());
    assert!(stuck.legal_moves().is_empty());

    let one_gap = board([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 0]]);
    assert!(!one_gap.is_terminal());
    assert_eq!(one_gap.legal_moves(), vec![Direction::Down, Direction::Right]);
}

#[test]
fn test_fresh_game_has_two_small_tiles() {
    for seed in 0..20 {
        let game = Game::with_seed(seed);
        let start = game.current_board();
        assert_eq!(start.count_tiles(), 2);
        assert!(start.cells().iter().all(|&v| v == 0 || v == 2 || v == 4));
        assert_eq!(game.moves_made(), 0);
    }
}

#[test]
fn test_random_play_keeps_board_invariants() {
    let mut rng = StdRng::seed_from_u64(11);

    for seed in 0..10 {
        let mut game = Game::with_seed(seed);
        let mut moves = 0;

        while !game.is_terminal() && moves < 2_000 {
            let direction = Direction::ALL[rng.random_range(0..Direction::COUNT)];
            let before = game.current_board();
            let shifted = before.shifted(direction);
            let outcome = game.apply_move(direction);
            let after = game.current_board();

            // Merges keep the sum, so the score rises by the spawned tile alone
            match outcome.spawned {
                Some(tile) => {
                    assert!(outcome.moved);
                    assert!(tile.value == 2 || tile.value == 4);
                    assert_eq!(after.score(), before.score() + u64::from(tile.value));
                    assert_eq!(after.count_tiles(), shifted.count_tiles() + 1);
                    assert_eq!(shifted.get(tile.row, tile.col), Some(0));
                    assert_eq!(after.get(tile.row, tile.col), Some(tile.value));
                }
                None => {
                    assert!(!outcome.moved);
                    assert_eq!(after, before);
                }
            }

            assert!(
                after
                    .cells()
                    .iter()
                    .all(|&v| v == 0 || (v >= 2 && v.is_power_of_two()))
            );
            moves += 1;
        }
    }
}

#[test]
fn test_left_merge_then_spawn() {
    let start = board([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
    let mut game = Game::from_board(start, Some(5));

    let outcome = game.apply_move(Direction::Left);
    let after = game.current_board();

    assert!(outcome.moved);
    assert_eq!(after.get(0, 0), Some(4));
    assert_eq!(after.count_tiles(), 2);
    let spawned = outcome.spawned.unwrap();
    assert_ne!((spawned.row, spawned.col), (0, 0));
    assert_eq!(game.moves_made(), 1);

    // Repeating a move that changes nothing spawns nothing
    let mut stuck = Game::from_board(board([[4, 0, 0, 0], [0; 4], [0; 4], [0; 4]]), Some(5));
    let outcome = stuck.apply_move(Direction::Left);
    assert!(!outcome.moved);
    assert!(outcome.spawned.is_none());
    assert_eq!(stuck.current_board().count_tiles(), 1);
    assert_eq!(stuck.moves_made(), 0);
}

#[test]
fn test_seeded_games_replay_identically() {
    let directions = [
        Direction::Left,
        Direction::Up,
        Direction::Right,
        Direction::Down,
    ];
    let mut a = Game::with_seed(99);
    let mut b = Game::with_seed(99);

    for direction in directions.iter().cycle().take(200) {
        assert_eq!(a.apply_move(*direction), b.apply_move(*direction));
        assert_eq!(a.current_board(), b.current_board());
    }
}

#[test]
fn test_keys_follow_board_contents() {
    let a = board([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
    let b = board([[0; 4], [0; 4], [0; 4], [0, 0, 0, 2]]);
    let a_again = board([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);

    assert_eq!(encode(&a), encode(&a_again));
    assert_ne!(encode(&a), encode(&b));
    assert_eq!(encode(&a).to_string().parse::<tilemind::StateKey>().unwrap(), encode(&a));
}

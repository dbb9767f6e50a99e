/**
 * Property tests for the board, matcher and session.
 *
 * Invariants covered:
 * - The idiom check agrees with a plain multiset comparison, and the claimed
 *   indices are distinct and spell the idiom.
 * - A tile is clickable iff nothing visible above it overlaps; collecting the
 *   only occluder exposes it.
 * - Difficulty 1 arrangement ignores the random source.
 * - Tiles are conserved across any sequence of player actions.
 */
use std::collections::{BTreeMap, HashSet};

use idiom_stack::arrange::arrange;
use idiom_stack::board::occlusion::is_clickable;
use idiom_stack::board::stacked;
use idiom_stack::matcher::{char_counts, find_completion, has_completable_idiom};
use idiom_stack::{ActionBudget, Board, IdiomLibrary, LevelId, LevelSession, levels};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

const ALPHABET: [char; 5] = ['一', '心', '意', '山', '水'];

fn chars_from(indices: &[usize]) -> Vec<char> {
    indices.iter().map(|&i| ALPHABET[i % ALPHABET.len()]).collect()
}

fn assert_conserved(s: &LevelSession) {
    let total = s.board().tiles().len();
    let mut seen = HashSet::new();
    for t in s.board().visible_tiles() {
        assert!(seen.insert(t.id));
    }
    for c in s.slot().cards().iter().chain(s.buffer().cards()) {
        assert!(seen.insert(c.tile_id), "tile {} held twice", c.tile_id);
        assert!(!s.board().tile(c.tile_id).unwrap().is_visible());
    }
    for &id in s.completed_tiles() {
        assert!(seen.insert(id), "completed tile {id} still in play");
    }
    assert_eq!(seen.len(), total);
}

proptest! {
    #[test]
    fn completion_matches_multiset_containment(
        slot in prop::collection::vec(0usize..5, 0..10),
        idiom in prop::collection::vec(0usize..5, 4),
    ) {
        let slot = chars_from(&slot);
        let idiom: String = chars_from(&idiom).into_iter().collect();
        let have = char_counts(slot.iter().copied());
        let need = char_counts(idiom.chars());
        let expected = need.iter().all(|(c, n)| have.get(c).copied().unwrap_or(0) >= *n);
        prop_assert_eq!(has_completable_idiom(&slot, &[idiom.as_str()]), expected);

        if let Some(hit) = find_completion(&slot, &[idiom.as_str()]) {
            prop_assert_eq!(hit.indices.len(), 4);
            let distinct: HashSet<usize> = hit.indices.iter().copied().collect();
            prop_assert_eq!(distinct.len(), 4);
            let picked = char_counts(hit.indices.iter().map(|&i| slot[i]));
            prop_assert_eq!(picked, need);
            prop_assert_eq!(find_completion(&slot, &[idiom.as_str()]), Some(hit));
        }
    }

    #[test]
    fn stacked_clickability_follows_visible_stack_tops(
        seed in any::<u64>(),
        difficulty in 1u8..=10,
        collect in prop::collection::vec(any::<bool>(), 18),
    ) {
        let layout = stacked::stacked_grid(3, 2);
        let pool: Vec<char> = chars_from(&(0..18).collect::<Vec<_>>());
        let mut rng = StdRng::seed_from_u64(seed);
        let mut board = Board::initialize(&layout, &pool, difficulty, &[], &mut rng).unwrap();
        for (id, take) in collect.iter().enumerate() {
            if *take {
                board.mark_collected(id);
            }
        }
        for tile in board.tiles() {
            let covered = board
                .visible_tiles()
                .any(|o| o.position == tile.position && o.layer > tile.layer);
            prop_assert_eq!(is_clickable(tile, &board), tile.is_visible() && !covered);
        }
    }

    #[test]
    fn difficulty_one_ignores_the_seed(a in any::<u64>(), b in any::<u64>()) {
        let layout = stacked::stacked_grid(3, 4).positions_by_layer();
        let pool: Vec<char> = chars_from(&(0..36).collect::<Vec<_>>());
        let first = arrange(&pool, &layout, 1, &[], &mut StdRng::seed_from_u64(a));
        let second = arrange(&pool, &layout, 1, &[], &mut StdRng::seed_from_u64(b));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn actions_conserve_tiles(
        seed in any::<u64>(),
        difficulty in 1u8..=10,
        steps in prop::collection::vec(0usize..16, 1..120),
    ) {
        let config = levels::level(LevelId::One)
            .with_difficulty(difficulty)
            .with_buffer(Some(10), 4)
            .with_budgets(ActionBudget::Unlimited, ActionBudget::Unlimited, ActionBudget::Unlimited);
        let mut s = LevelSession::new(config, IdiomLibrary::bundled(), seed).unwrap();
        for step in steps {
            match step {
                0 => { let _ = s.undo(); }
                1 => { let _ = s.move_to_buffer(); }
                2 => { let _ = s.return_from_buffer(0); }
                3 => { let _ = s.shuffle(); }
                pick => {
                    let open: Vec<usize> = s
                        .board()
                        .visible_tiles()
                        .filter(|t| is_clickable(t, s.board()))
                        .map(|t| t.id)
                        .collect();
                    if !open.is_empty() {
                        s.tap(open[pick % open.len()]);
                    }
                }
            }
            assert_conserved(&s);
            prop_assert!(s.slot().len() <= s.slot().capacity());
        }
    }
}

#[test]
fn occluder_removal_flips_clickability() {
    let layout = stacked::stacked_grid(1, 2);
    let assignment: BTreeMap<_, _> = layout.placements.iter().copied().zip(['一', '心']).collect();
    let mut board = Board::from_assignment(&layout, &assignment).unwrap();
    assert!(!is_clickable(board.tile(0).unwrap(), &board));
    board.mark_collected(1);
    assert!(is_clickable(board.tile(0).unwrap(), &board));
}

// Integration tests (native) for the `idiom-stack` crate.
// Whole-level scenarios driven through the public session API.

use idiom_stack::board::occlusion::topmost_clickable_at;
use idiom_stack::board::stacked;
use idiom_stack::{
    Action, ActionBudget, BoardShape, GamePhase, IdiomLibrary, IdiomRecord, LevelConfig, LevelId, LevelSession,
    LossReason, Position, SessionError, SessionEvent, levels,
};

fn bundled_subset(n: usize) -> IdiomLibrary {
    IdiomLibrary::from_records(IdiomLibrary::bundled().records()[..n].to_vec())
}

/// Pixel center of a level-1 style grid cell.
fn cell_center(x: i32, y: i32) -> (f64, f64) {
    let step = stacked::CELL_SIZE + stacked::SPACING;
    (x as f64 * step + stacked::CELL_SIZE / 2.0, y as f64 * step + stacked::CELL_SIZE / 2.0)
}

/// Nine idioms sharing no characters, so a completion can only be the idiom tapped.
fn distinct_library() -> IdiomLibrary {
    IdiomLibrary::from_records(
        ["画龙点睛", "守株待兔", "亡羊补牢", "杯弓蛇影", "愚公移山", "对牛弹琴", "井底之蛙", "拔苗助长", "胸有成竹"]
            .into_iter()
            .map(|i| IdiomRecord::new(i, "")),
    )
}

// Level 1 deals idioms in pool order, layer by layer, so clearing the grid one
// layer at a time never fills the slot.
#[test]
fn level_one_is_won_by_clearing_layer_by_layer() {
    let mut s = LevelSession::new(levels::level(LevelId::One), distinct_library(), 2024).unwrap();
    let mut completed = 0;
    for _layer in 0..4 {
        for y in 0..3 {
            for x in 0..3 {
                let (px, py) = cell_center(x, y);
                let events = s.handle_tap(px, py);
                assert!(matches!(events.first(), Some(SessionEvent::Collected { .. })), "{events:?}");
                completed += events.iter().filter(|e| matches!(e, SessionEvent::IdiomCompleted { .. })).count();
                assert!(!s.slot().is_full());
            }
        }
    }
    assert!(topmost_clickable_at(s.board(), Position::new(1, 1)).is_none());
    assert_eq!(completed, 9);
    assert_eq!(s.phase(), GamePhase::Won);
    assert!(s.targets().is_empty());
}

// Buffer holding 9 of 10, then a batch of 4 arrives: all move, then the level is lost.
#[test]
fn buffer_overflow_ends_level_after_insertion() {
    let config = LevelConfig::default()
        .with_shape(BoardShape::StackedGrid { size: 4, layers: 4 })
        .with_idiom_count(16)
        .with_difficulty(1)
        .with_buffer(Some(10), 4)
        .with_budgets(ActionBudget::Unlimited, ActionBudget::Unlimited, ActionBudget::Unlimited);
    let mut s = LevelSession::new(config, bundled_subset(16), 9).unwrap();

    let mut cells = (0..4).flat_map(|y| (0..4).map(move |x| Position::new(x, y)));
    for _ in 0..9 {
        let pos = cells.next().unwrap();
        let id = topmost_clickable_at(s.board(), pos).unwrap().id;
        s.tap(id);
        s.move_slot_card_to_buffer(0).unwrap();
    }
    assert_eq!(s.buffer().len(), 9);
    for _ in 0..4 {
        let pos = cells.next().unwrap();
        let id = topmost_clickable_at(s.board(), pos).unwrap().id;
        s.tap(id);
    }
    assert_eq!(s.slot().len(), 4);

    let events = s.move_to_buffer().unwrap();
    assert_eq!(s.buffer().len(), 13);
    assert!(s.slot().is_empty());
    assert_eq!(
        events.last(),
        Some(&SessionEvent::Lost {
            reason: LossReason::BufferOverflow
        })
    );
    assert_eq!(s.phase(), GamePhase::Lost);
}

#[test]
fn limited_buttons_run_out() {
    let mut s = LevelSession::new(levels::level(LevelId::Three), IdiomLibrary::bundled(), 77).unwrap();
    for _ in 0..3 {
        s.shuffle().unwrap();
    }
    assert_eq!(s.budget(Action::Shuffle), ActionBudget::Limited(0));
    assert!(s.shuffle().is_err());
    assert_eq!(s.phase(), GamePhase::Playing);
}

// Level 3 limits the batch move to three uses; tapping a card aside one at a time
// is never counted against it.
#[test]
fn single_cards_go_aside_past_the_batch_limit() {
    let mut s = LevelSession::new(levels::level(LevelId::Three), IdiomLibrary::bundled(), 31).unwrap();
    for moved in 1..=5 {
        let id = s.snapshot().tiles.iter().find(|t| t.clickable).unwrap().id;
        s.tap(id);
        s.move_slot_card_to_buffer(0).unwrap();
        assert_eq!(s.buffer().len(), moved);
        assert_eq!(s.budget(Action::MoveToBuffer), ActionBudget::Limited(3));
    }
    assert_eq!(s.phase(), GamePhase::Playing);

    let id = s.snapshot().tiles.iter().find(|t| t.clickable).unwrap().id;
    s.tap(id);
    s.move_to_buffer().unwrap();
    assert_eq!(s.budget(Action::MoveToBuffer), ActionBudget::Limited(2));
}

#[test]
fn level_needs_as_many_distinct_idioms_as_targets() {
    let err = LevelSession::new(levels::level(LevelId::One), bundled_subset(8), 3).err();
    assert!(matches!(
        err,
        Some(SessionError::NotEnoughIdioms {
            needed: 9,
            available: 8
        })
    ));
    let s = LevelSession::new(levels::level(LevelId::One), bundled_subset(9), 3).unwrap();
    let distinct: std::collections::HashSet<_> = s.targets().iter().map(|r| r.idiom.clone()).collect();
    assert_eq!(distinct.len(), 9);
}

#[test]
fn extreme_config_values_do_not_panic() {
    let json = r#"{"shape": {"kind": "stacked_grid", "size": 3, "layers": 4}, "idiom_count": 9, "slot_capacity": 18446744073709551615}"#;
    let config = LevelConfig::from_json(json).unwrap();
    let s = LevelSession::new(config, bundled_subset(9), 8).unwrap();
    assert_eq!(s.slot().capacity(), usize::MAX);

    let json = r#"{"shape": {"kind": "stacked_grid", "size": 4294967295, "layers": 4294967295}, "idiom_count": 9}"#;
    let config = LevelConfig::from_json(json).unwrap();
    let err = LevelSession::new(config, bundled_subset(9), 8).err();
    assert!(matches!(err, Some(SessionError::Config(_))));
}

// Every clickable tile on a pyramid can be picked by tapping its center.
#[test]
fn pyramid_taps_hit_the_tile_under_the_finger() {
    let s = LevelSession::new(levels::level(LevelId::Four), IdiomLibrary::bundled(), 5).unwrap();
    let snap = s.snapshot();
    assert_eq!(snap.tiles.len(), 240);
    let clickable: Vec<_> = snap.tiles.iter().filter(|t| t.clickable).collect();
    assert!(!clickable.is_empty());
    for view in clickable {
        let mut fresh = LevelSession::new(levels::level(LevelId::Four), IdiomLibrary::bundled(), 5).unwrap();
        let events = fresh.handle_tap(view.rect.x + view.rect.w / 2.0, view.rect.y + view.rect.h / 2.0);
        assert_eq!(
            events.first(),
            Some(&SessionEvent::Collected {
                tile_id: view.id,
                character: view.character
            })
        );
    }
}

#[test]
fn custom_config_from_json_builds_a_session() {
    let json = r#"{
        "name": "custom",
        "shape": {"kind": "stacked_grid", "size": 2, "layers": 4},
        "difficulty": 7,
        "idiom_count": 4,
        "buffer_capacity": 6,
        "move_to_buffer": {"limited": 1}
    }"#;
    let config = LevelConfig::from_json(json).unwrap();
    let lib = IdiomLibrary::from_records(vec![
        IdiomRecord::new("一心一意", ""),
        IdiomRecord::new("三心二意", ""),
        IdiomRecord::new("四面八方", ""),
        IdiomRecord::new("五光十色", ""),
    ]);
    let mut s = LevelSession::new(config, lib, 1).unwrap();
    assert_eq!(s.board().tiles().len(), 16);
    assert_eq!(s.targets().len(), 4);
    s.config_mut().increase_difficulty();
    s.reset().unwrap();
    assert_eq!(s.config().difficulty, 8);
    assert_eq!(s.board().visible_count(), 16);
}

//! Board, container and partner table behaviour through the public API.

use hole_match::core::types::{ContainerId, HoleColor, HoleId, SpecialKind, Vec3};
use hole_match::core::{
    Board, BoardError, ContainerError, ContainerPool, Hole, HoleState, Layout,
};

fn column(ids: &[u32]) -> Vec<Hole> {
    ids.iter().map(|&i| Hole::new(HoleId(i), HoleColor::Red)).collect()
}

fn assert_rows_contiguous(board: &Board, col: usize) {
    for (i, hole) in board.column(col).unwrap().iter().enumerate() {
        assert_eq!(
            hole.state,
            HoleState::OnBoard { column: col, row: i },
            "hole {} at index {}",
            hole.id,
            i
        );
        assert_eq!(hole.is_front_row(), i == 0);
    }
}

#[test]
fn test_new_board_numbers_rows() {
    let board = Board::new(vec![column(&[0, 1, 2]), column(&[3])], Layout::default());
    assert_eq!(board.column_count(), 2);
    assert_eq!(board.hole_count(), 4);
    assert_rows_contiguous(&board, 0);
    assert_rows_contiguous(&board, 1);
}

#[test]
fn test_remove_front_then_shift_keeps_rows_contiguous() {
    let layout = Layout::default();
    let mut board = Board::new(vec![column(&[0, 1, 2])], layout);

    let removed = board.remove_front(0).unwrap();
    assert_eq!(removed.id, HoleId(0));
    board.shift_forward(0);

    assert_rows_contiguous(&board, 0);
    let front = board.front(0).unwrap();
    assert_eq!(front.id, HoleId(1));
    assert_eq!(front.position, layout.hole_position(0, 0, 1));
}

#[test]
fn test_remove_front_errors() {
    let mut board = Board::new(vec![column(&[0])], Layout::default());
    assert_eq!(board.remove_front(4).unwrap_err(), BoardError::UnknownColumn(4));
    board.remove_front(0).unwrap();
    assert_eq!(board.remove_front(0).unwrap_err(), BoardError::EmptyColumn(0));
}

#[test]
fn test_grouped_pairs_with_hole_behind() {
    let holes = vec![
        Hole::new(HoleId(0), HoleColor::Red).with_special(SpecialKind::Grouped),
        Hole::new(HoleId(1), HoleColor::Red),
        Hole::new(HoleId(2), HoleColor::Blue).with_special(SpecialKind::Grouped),
    ];
    let board = Board::new(vec![holes], Layout::default());
    let partners = board.pair_grouped();

    assert_eq!(partners.partner(HoleId(0)), Some(HoleId(1)));
    assert_eq!(partners.partner(HoleId(1)), Some(HoleId(0)));
    // Last hole of the column has nobody behind it.
    assert_eq!(partners.partner(HoleId(2)), None);
}

#[test]
fn test_forget_drops_both_directions() {
    let holes = vec![
        Hole::new(HoleId(0), HoleColor::Red).with_special(SpecialKind::Grouped),
        Hole::new(HoleId(1), HoleColor::Red),
    ];
    let board = Board::new(vec![holes], Layout::default());
    let mut partners = board.pair_grouped();
    partners.forget(HoleId(1));
    assert!(partners.is_empty());
    assert_eq!(partners.partner(HoleId(0)), None);
}

fn pool(n: usize) -> ContainerPool {
    let layout = Layout::default();
    ContainerPool::new((0..n).map(|i| layout.container_position(i, n)))
}

#[test]
fn test_occupied_container_rejects_second_hole() {
    let mut containers = pool(2);
    containers
        .occupy(ContainerId(0), Hole::new(HoleId(0), HoleColor::Red))
        .unwrap();

    let err = containers
        .occupy(ContainerId(0), Hole::new(HoleId(1), HoleColor::Blue))
        .unwrap_err();
    assert!(matches!(err, ContainerError::AlreadyOccupied { .. }));
    assert_eq!(err.into_rejected().id, HoleId(1));
    assert_eq!(
        containers.get(ContainerId(0)).unwrap().hole().unwrap().id,
        HoleId(0)
    );
    assert_eq!(containers.count_empty(), 1);
}

#[test]
fn test_nearest_empty_prefers_first_on_tie() {
    let mut containers = pool(3);
    let origin = Vec3::new(0.0, 1.0, 5.0);
    let nearest = containers.find_nearest_empty(|c| c.position.distance(origin));
    assert_eq!(nearest, Some(ContainerId(1)));

    containers
        .occupy(ContainerId(1), Hole::new(HoleId(0), HoleColor::Red))
        .unwrap();
    // Containers 0 and 2 are equally far away.
    let nearest = containers.find_nearest_empty(|c| c.position.distance(origin));
    assert_eq!(nearest, Some(ContainerId(0)));
}

#[test]
fn test_all_full_needs_waiting_holes() {
    let mut containers = pool(2);
    assert!(!containers.are_all_full());

    let mut moving = Hole::new(HoleId(0), HoleColor::Red);
    moving.state = HoleState::Moving;
    let mut waiting = Hole::new(HoleId(1), HoleColor::Blue);
    waiting.state = HoleState::Waiting;
    containers.occupy(ContainerId(0), moving).unwrap();
    containers.occupy(ContainerId(1), waiting).unwrap();

    // Still flying in: not full yet.
    assert!(!containers.are_all_full());

    containers
        .get_mut(ContainerId(0))
        .unwrap()
        .hole_mut()
        .unwrap()
        .state = HoleState::Waiting;
    assert!(containers.are_all_full());

    // A claimed hole is on its way out.
    containers
        .get_mut(ContainerId(1))
        .unwrap()
        .hole_mut()
        .unwrap()
        .state = HoleState::Claimed {
        car: hole_match::core::types::CarId(0),
    };
    assert!(!containers.are_all_full());
}

#[test]
fn test_release_is_noop_when_empty() {
    let mut containers = pool(1);
    assert!(containers.release(ContainerId(0)).is_none());
    containers
        .occupy(ContainerId(0), Hole::new(HoleId(3), HoleColor::Red))
        .unwrap();
    assert_eq!(containers.release(ContainerId(0)).unwrap().id, HoleId(3));
    assert!(containers.get(ContainerId(0)).unwrap().is_empty());
}

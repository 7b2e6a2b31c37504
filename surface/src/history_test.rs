use super::*;
use crate::raster::Surface;

/// A tiny surface whose single marker pixel distinguishes snapshots.
fn marked_snapshot(mark: u8) -> Snapshot {
    let mut surface = Surface::new(2, 2);
    let stroke = protocol::DrawAction {
        kind: protocol::ActionKind::Draw,
        points: Some(vec![protocol::Point { x: 0.0, y: 0.0 }]),
        color: Some(format!("#{mark:02X}0000")),
        size: Some(1.0),
        tool: None,
        layer_id: None,
        user_id: uuid::Uuid::new_v4(),
        timestamp: 0,
    };
    surface.apply(&stroke);
    surface.snapshot()
}

fn blank() -> Snapshot {
    Surface::new(2, 2).snapshot()
}

// =============================================================
// Push
// =============================================================

#[test]
fn new_stack_holds_one_entry_at_cursor_zero() {
    let stack = HistoryStack::new(blank());
    assert_eq!(stack.len(), 1);
    assert_eq!(stack.cursor_index(), 0);
    assert!(!stack.can_undo());
    assert!(!stack.can_redo());
}

#[test]
fn push_appends_and_advances_cursor() {
    let mut stack = HistoryStack::new(blank());
    stack.push(marked_snapshot(1));
    stack.push(marked_snapshot(2));

    assert_eq!(stack.len(), 3);
    assert_eq!(stack.cursor_index(), 2);
    assert_eq!(*stack.current(), marked_snapshot(2));
}

#[test]
fn push_after_undo_discards_redo_branch() {
    let mut stack = HistoryStack::new(blank());
    stack.push(marked_snapshot(1));
    stack.push(marked_snapshot(2));
    assert!(stack.undo().is_some());

    stack.push(marked_snapshot(3));

    // blank, 1, 3 — entry 2 is gone and redo is a no-op.
    assert_eq!(stack.len(), 3);
    assert_eq!(stack.cursor_index(), 2);
    assert_eq!(*stack.current(), marked_snapshot(3));
    assert!(stack.redo().is_none());
}

#[test]
fn push_over_capacity_evicts_oldest_and_rebases_cursor() {
    let mut stack = HistoryStack::with_capacity(marked_snapshot(0), 3);
    stack.push(marked_snapshot(1));
    stack.push(marked_snapshot(2));
    assert_eq!(stack.len(), 3);

    stack.push(marked_snapshot(3));

    // Entry 0 was evicted; the retained window is 1, 2, 3.
    assert_eq!(stack.len(), 3);
    assert_eq!(stack.cursor_index(), 2);
    assert!(stack.undo().is_some());
    assert!(stack.undo().is_some());
    assert_eq!(*stack.current(), marked_snapshot(1));
    assert!(stack.undo().is_none());
}

// =============================================================
// Undo / redo boundaries
// =============================================================

#[test]
fn undo_at_oldest_is_a_noop() {
    let mut stack = HistoryStack::new(blank());
    assert!(stack.undo().is_none());
    assert_eq!(stack.cursor_index(), 0);
}

#[test]
fn redo_at_newest_is_a_noop() {
    let mut stack = HistoryStack::new(blank());
    stack.push(marked_snapshot(1));
    assert!(stack.redo().is_none());
    assert_eq!(stack.cursor_index(), 1);
}

#[test]
fn undo_then_redo_restores_the_same_snapshot() {
    let mut stack = HistoryStack::new(blank());
    stack.push(marked_snapshot(1));
    let before = stack.current().clone();

    let undone = stack.undo().cloned();
    assert_eq!(undone, Some(blank()));

    let redone = stack.redo().cloned();
    assert_eq!(redone, Some(before));
    assert_eq!(stack.cursor_index(), 1);
}

#[test]
fn scenario_draw_draw_undo_draw() {
    // draw, draw, undo, draw → blank, first-draw, replacement; cursor = 2.
    let mut stack = HistoryStack::new(blank());
    stack.push(marked_snapshot(1));
    stack.push(marked_snapshot(2));
    assert!(stack.undo().is_some());
    stack.push(marked_snapshot(3));

    assert_eq!(stack.len(), 3);
    assert_eq!(stack.cursor_index(), 2);
    assert_eq!(*stack.current(), marked_snapshot(3));
}

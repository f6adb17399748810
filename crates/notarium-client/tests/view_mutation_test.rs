//! Scope view mutation behavior against the in-memory backend: optimistic
//! updates, uniform rollback, cycle rejection, atomic multi-delete, pin
//! ordering, and the last-load-wins guard.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use notarium_client::{MockBackend, ScopeView};
use notarium_core::{
    Error, EventBus, MutationPhase, NoteId, NoteStore, OrderMode, Scope, ScopeEvent,
};

fn ts(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 20, hour, 0, 0).unwrap()
}

fn view_for(mock: &MockBackend, scope: Scope) -> (ScopeView, Arc<EventBus>) {
    let bus = Arc::new(EventBus::new(32));
    let view = ScopeView::new(Arc::new(mock.clone()), bus.clone(), scope);
    (view, bus)
}

fn display_ids(view: &ScopeView) -> Vec<NoteId> {
    view.display().iter().map(|n| n.id).collect()
}

// =============================================================================
// LOADING
// =============================================================================

#[tokio::test]
async fn loads_file_scope_and_sorts_unpinned() {
    let mock = MockBackend::new();
    let file = mock.seed_file("Physics");
    let c = mock.seed_note("c", None, Some(file), ts(11));
    let a = mock.seed_note("a", None, Some(file), ts(9));
    let b = mock.seed_note("b", None, Some(file), ts(10));

    let (mut view, _bus) = view_for(&mock, Scope::File(file));
    view.set_order(Some(OrderMode::LatestLast));
    view.reload().await.unwrap();
    assert_eq!(display_ids(&view), vec![a, b, c]);

    view.set_order(Some(OrderMode::LatestFirst));
    assert_eq!(display_ids(&view), vec![c, b, a]);
}

#[tokio::test]
async fn unset_order_keeps_backend_order() {
    let mock = MockBackend::new();
    let file = mock.seed_file("f");
    let x = mock.seed_note("x", None, Some(file), ts(11));
    let y = mock.seed_note("y", None, Some(file), ts(9));

    let (mut view, _bus) = view_for(&mock, Scope::File(file));
    view.reload().await.unwrap();
    // Backend reports by created_at; with the sentinel unset the view must
    // not reorder what the backend sent.
    assert_eq!(display_ids(&view), vec![y, x]);
    assert_eq!(view.order(), None);
}

#[tokio::test]
async fn read_failure_degrades_to_empty_list() {
    let mock = MockBackend::new();
    mock.seed_note("quick", None, None, ts(9));
    mock.fail_on("list_recent");

    let (mut view, _bus) = view_for(&mock, Scope::Recent);
    view.reload().await.unwrap();
    assert!(view.is_loaded());
    assert!(view.notes().is_empty());
}

#[tokio::test]
async fn stale_load_is_discarded() {
    let mock = MockBackend::new();
    let file = mock.seed_file("f");
    let a = mock.seed_note("a", None, Some(file), ts(9));

    let (mut view, _bus) = view_for(&mock, Scope::File(file));

    let stale = view.begin_load();
    let fresh = view.begin_load();

    let fresh_notes = mock.list_file_notes(file).await.unwrap();
    assert!(view.apply_load(fresh, fresh_notes));
    // The superseded load must not clobber the newer one.
    assert!(!view.apply_load(stale, vec![]));
    assert_eq!(display_ids(&view), vec![a]);
}

#[tokio::test]
async fn hide_completed_filters_loads() {
    let mock = MockBackend::new();
    let file = mock.seed_file("f");
    let open = mock.seed_note("open", None, Some(file), ts(9));
    let done = mock.seed_note("done", None, Some(file), ts(10));
    mock.update(
        done,
        notarium_core::UpdateNoteRequest {
            completed: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let (mut view, _bus) = view_for(&mock, Scope::File(file));
    view.set_hide_completed(true);
    view.reload().await.unwrap();
    assert_eq!(display_ids(&view), vec![open]);
}

// =============================================================================
// CREATE
// =============================================================================

#[tokio::test]
async fn create_rejects_blank_title_locally() {
    let mock = MockBackend::new();
    let file = mock.seed_file("f");
    let (mut view, _bus) = view_for(&mock, Scope::File(file));

    let err = view.create("   ", "").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(mock.call_count("create"), 0);
}

#[tokio::test]
async fn create_inserts_at_order_appropriate_end() {
    let mock = MockBackend::new();
    let file = mock.seed_file("f");
    mock.seed_note("existing", None, Some(file), ts(9));

    let (mut view, _bus) = view_for(&mock, Scope::File(file));
    view.set_order(Some(OrderMode::LatestLast));
    view.reload().await.unwrap();

    let created = view.create("new last", "").await.unwrap();
    assert_eq!(view.notes().last().unwrap().id, created.id);
    assert_eq!(view.last_phase(), Some(MutationPhase::Confirmed));

    view.set_order(Some(OrderMode::LatestFirst));
    let created_first = view.create("new first", "").await.unwrap();
    assert_eq!(view.notes().first().unwrap().id, created_first.id);
}

#[tokio::test]
async fn create_scopes_and_deadlines_follow_the_view() {
    let mock = MockBackend::new();
    let file = mock.seed_file("f");
    let parent = mock.seed_note("parent", None, Some(file), ts(9));

    let (mut view, _bus) = view_for(&mock, Scope::File(file));
    view.reload().await.unwrap();
    let top = view.create("top level", "").await.unwrap();
    assert_eq!(top.file_id, Some(file));
    assert!(top.deadline.is_some(), "top-level notes get a same-day deadline");

    let (mut child_view, _bus) = view_for(&mock, Scope::Children(parent));
    child_view.reload().await.unwrap();
    let child = child_view.create("child", "").await.unwrap();
    assert_eq!(child.parent_id, Some(parent));
    assert!(child.deadline.is_none(), "child notes carry no default deadline");
}

#[tokio::test(start_paused = true)]
async fn settle_reload_supersedes_optimistic_state() {
    let mock = MockBackend::new();
    let file = mock.seed_file("f");
    mock.seed_note("a", None, Some(file), ts(9));

    let (mut view, _bus) = view_for(&mock, Scope::File(file));
    view.set_order(Some(OrderMode::LatestLast));
    view.reload().await.unwrap();

    let created = view.create("b", "").await.unwrap();
    view.settle().await.unwrap();
    // After the consistency reload the list reflects backend truth and
    // still contains the created note.
    assert!(view.notes().iter().any(|n| n.id == created.id));
    assert_eq!(view.notes().len(), 2);
}

// =============================================================================
// REPARENT
// =============================================================================

#[tokio::test]
async fn reparent_removes_locally_updates_backend_and_notifies() {
    let mock = MockBackend::new();
    let file = mock.seed_file("f");
    let target = mock.seed_note("target", None, Some(file), ts(9));
    let moved = mock.seed_note("moved", None, Some(file), ts(10));

    let (mut view, bus) = view_for(&mock, Scope::File(file));
    let mut rx = bus.subscribe();
    view.reload().await.unwrap();

    view.reparent(moved, Some(target)).await.unwrap();

    assert_eq!(display_ids(&view), vec![target]);
    assert_eq!(mock.note(moved).unwrap().parent_id, Some(target));
    assert_eq!(view.last_phase(), Some(MutationPhase::Confirmed));

    let notification = view.notification().unwrap();
    assert_eq!(notification.message, "\"moved\" moved under \"target\"");

    match rx.recv().await.unwrap() {
        ScopeEvent::ParentChanged {
            note_id,
            previous_parent_id,
            new_parent_id,
        } => {
            assert_eq!(note_id, moved);
            assert_eq!(previous_parent_id, None);
            assert_eq!(new_parent_id, Some(target));
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn reparent_onto_descendant_is_rejected_without_state_change() {
    let mock = MockBackend::new();
    let file = mock.seed_file("f");
    let x = mock.seed_note("x", None, Some(file), ts(9));
    let d = mock.seed_note("d", Some(x), None, ts(10));
    let grandchild = mock.seed_note("g", Some(d), None, ts(11));

    let (mut view, _bus) = view_for(&mock, Scope::File(file));
    view.reload().await.unwrap();

    // Direct child and deeper descendant both reject.
    for target in [d, grandchild, x] {
        let err = view.reparent(x, Some(target)).await.unwrap_err();
        assert!(matches!(err, Error::Cycle { .. }), "target {} must cycle", target);
    }

    assert_eq!(display_ids(&view), vec![x]);
    assert_eq!(mock.note(x).unwrap().parent_id, None);
    assert_eq!(mock.call_count("update"), 0);
}

#[tokio::test]
async fn reparent_failure_rolls_back_local_removal() {
    let mock = MockBackend::new();
    let file = mock.seed_file("f");
    let target = mock.seed_note("target", None, Some(file), ts(9));
    let moved = mock.seed_note("moved", None, Some(file), ts(10));

    let (mut view, _bus) = view_for(&mock, Scope::File(file));
    view.reload().await.unwrap();
    let before = display_ids(&view);

    mock.fail_on("update");
    let err = view.reparent(moved, Some(target)).await.unwrap_err();
    assert!(matches!(err, Error::Request(_)));

    assert_eq!(display_ids(&view), before, "local list restored exactly");
    assert_eq!(view.last_phase(), Some(MutationPhase::Failed));
    assert_eq!(mock.note(moved).unwrap().parent_id, None);
    assert!(view.notification().is_none(), "failed mutations are not undoable");
}

#[tokio::test]
async fn reparent_to_top_level_uses_explicit_null() {
    let mock = MockBackend::new();
    let file = mock.seed_file("f");
    let parent = mock.seed_note("parent", None, Some(file), ts(9));
    let child = mock.seed_note("child", Some(parent), None, ts(10));

    let (mut view, _bus) = view_for(&mock, Scope::Children(parent));
    view.reload().await.unwrap();

    view.reparent(child, None).await.unwrap();
    assert_eq!(mock.note(child).unwrap().parent_id, None);
    assert_eq!(
        view.notification().unwrap().message,
        "\"child\" moved to top level"
    );
}

// =============================================================================
// DELETE
// =============================================================================

#[tokio::test]
async fn delete_then_undo_recreates_with_new_id() {
    let mock = MockBackend::new();
    let file = mock.seed_file("f");
    let doomed = mock.seed_note("Physics homework", None, Some(file), ts(9));

    let (mut view, _bus) = view_for(&mock, Scope::File(file));
    view.reload().await.unwrap();

    view.delete_one(doomed).await.unwrap();
    assert!(view.notes().is_empty());
    assert!(mock.note(doomed).is_none());
    assert_eq!(view.notification().unwrap().message, "\"Physics homework\" deleted");

    assert!(view.undo().await.unwrap());
    let recreated: Vec<_> = view
        .notes()
        .iter()
        .filter(|n| n.title == "Physics homework")
        .collect();
    assert_eq!(recreated.len(), 1);
    assert_ne!(recreated[0].id, doomed, "recreation yields a new id");
    assert_eq!(recreated[0].file_id, Some(file), "scope survives the round trip");

    // One-level undo: a second undo with nothing recorded is a no-op.
    assert!(!view.undo().await.unwrap());
    assert_eq!(view.notes().len(), 1);
}

#[tokio::test]
async fn delete_failure_rolls_back_local_removal() {
    let mock = MockBackend::new();
    let file = mock.seed_file("f");
    let doomed = mock.seed_note("stays", None, Some(file), ts(9));

    let (mut view, _bus) = view_for(&mock, Scope::File(file));
    view.reload().await.unwrap();

    mock.fail_on("delete");
    assert!(view.delete_one(doomed).await.is_err());
    assert_eq!(display_ids(&view), vec![doomed]);
    assert!(mock.note(doomed).is_some());
    assert_eq!(view.last_phase(), Some(MutationPhase::Failed));
}

#[tokio::test]
async fn delete_many_removes_all_or_nothing() {
    let mock = MockBackend::new();
    let file = mock.seed_file("f");
    let a = mock.seed_note("a", None, Some(file), ts(9));
    let b = mock.seed_note("b", None, Some(file), ts(10));
    let c = mock.seed_note("c", None, Some(file), ts(11));

    let (mut view, _bus) = view_for(&mock, Scope::File(file));
    view.reload().await.unwrap();

    // Simulated backend failure: nothing changes locally or remotely.
    mock.fail_on("delete_many");
    assert!(view.delete_many(&[a, b, c]).await.is_err());
    assert_eq!(display_ids(&view), vec![a, b, c]);
    assert!(mock.note(a).is_some() && mock.note(b).is_some() && mock.note(c).is_some());

    // Success: all three disappear together.
    mock.recover("delete_many");
    view.delete_many(&[a, b, c]).await.unwrap();
    assert!(view.notes().is_empty());
    assert!(mock.note(a).is_none() && mock.note(b).is_none() && mock.note(c).is_none());
    assert!(view.notification().is_none(), "multi-delete is not undoable");
}

// =============================================================================
// PIN
// =============================================================================

#[tokio::test]
async fn pin_position_counts_preceding_pinned_notes() {
    let mock = MockBackend::new();
    let file = mock.seed_file("f");
    let notes: Vec<NoteId> = (0u32..5)
        .map(|i| mock.seed_note(&format!("n{}", i), None, Some(file), ts(9 + i)))
        .collect();

    let (mut view, _bus) = view_for(&mock, Scope::File(file));
    view.set_order(Some(OrderMode::LatestLast));
    view.reload().await.unwrap();

    view.pin(notes[0], 0).await.unwrap();
    view.pin(notes[1], 1).await.unwrap();
    view.pin(notes[4], 2).await.unwrap();

    // After the authoritative reload, exactly two pinned notes precede the
    // one dropped at position 2.
    let display = view.display();
    let pinned: Vec<NoteId> = display.iter().filter(|n| n.is_pinned).map(|n| n.id).collect();
    assert_eq!(pinned, vec![notes[0], notes[1], notes[4]]);
    let preceding = pinned.iter().take_while(|id| **id != notes[4]).count();
    assert_eq!(preceding, 2);

    // Pinned block sits above the chronological remainder.
    assert_eq!(display_ids(&view), vec![notes[0], notes[1], notes[4], notes[2], notes[3]]);
}

#[tokio::test]
async fn pin_beyond_pinned_set_clamps() {
    let mock = MockBackend::new();
    let file = mock.seed_file("f");
    let a = mock.seed_note("a", None, Some(file), ts(9));
    mock.seed_note("b", None, Some(file), ts(10));

    let (mut view, _bus) = view_for(&mock, Scope::File(file));
    view.reload().await.unwrap();

    // No other pinned notes exist, so position 2 clamps to the front.
    view.pin(a, 2).await.unwrap();
    assert_eq!(mock.note(a).unwrap().pin_position, Some(0));
}

#[tokio::test]
async fn unpin_restores_chronological_placement() {
    let mock = MockBackend::new();
    let file = mock.seed_file("f");
    let a = mock.seed_note("a", None, Some(file), ts(9));
    let b = mock.seed_note("b", None, Some(file), ts(10));

    let (mut view, _bus) = view_for(&mock, Scope::File(file));
    view.set_order(Some(OrderMode::LatestLast));
    view.reload().await.unwrap();

    view.pin(b, 0).await.unwrap();
    assert_eq!(display_ids(&view), vec![b, a]);

    view.unpin(b).await.unwrap();
    assert_eq!(display_ids(&view), vec![a, b]);
    assert_eq!(view.notification().unwrap().message, "Note unpinned");
}

#[tokio::test]
async fn pin_undo_unpins() {
    let mock = MockBackend::new();
    let file = mock.seed_file("f");
    let a = mock.seed_note("a", None, Some(file), ts(9));

    let (mut view, _bus) = view_for(&mock, Scope::File(file));
    view.reload().await.unwrap();

    view.pin(a, 0).await.unwrap();
    assert!(mock.note(a).unwrap().is_pinned);

    assert!(view.undo().await.unwrap());
    assert!(!mock.note(a).unwrap().is_pinned);
}

#[tokio::test]
async fn pin_failure_leaves_state_untouched() {
    let mock = MockBackend::new();
    let file = mock.seed_file("f");
    let a = mock.seed_note("a", None, Some(file), ts(9));

    let (mut view, _bus) = view_for(&mock, Scope::File(file));
    view.reload().await.unwrap();

    mock.fail_on("pin");
    assert!(view.pin(a, 0).await.is_err());
    assert!(!mock.note(a).unwrap().is_pinned);
    assert_eq!(view.last_phase(), Some(MutationPhase::Failed));
    assert!(view.notification().is_none());
}

// =============================================================================
// GESTURE WIRING
// =============================================================================

#[tokio::test]
async fn drag_intent_maps_display_indices_to_operations() {
    use notarium_client::{DragGesture, DropZone};

    let mock = MockBackend::new();
    let file = mock.seed_file("f");
    let a = mock.seed_note("a", None, Some(file), ts(9));
    let b = mock.seed_note("b", None, Some(file), ts(10));

    let (mut view, _bus) = view_for(&mock, Scope::File(file));
    view.set_order(Some(OrderMode::LatestLast));
    view.reload().await.unwrap();

    let mut gesture = DragGesture::new();
    let descendants = view.collect_descendants(b).await.unwrap();
    gesture.begin(1, b, descendants);
    gesture.hover(0, a, DropZone::Parent);
    let intent = gesture.release().unwrap();

    view.apply_intent(intent).await.unwrap();
    assert_eq!(mock.note(b).unwrap().parent_id, Some(a));
}

#[tokio::test]
async fn drag_over_own_subtree_emits_nothing() {
    use notarium_client::{DragGesture, DragState, DropZone};

    let mock = MockBackend::new();
    let file = mock.seed_file("f");
    let x = mock.seed_note("x", None, Some(file), ts(9));
    let child = mock.seed_note("child", Some(x), None, ts(10));

    let (view, _bus) = view_for(&mock, Scope::File(file));
    let descendants = view.collect_descendants(x).await.unwrap();
    assert!(descendants.contains(&child));

    let mut gesture = DragGesture::new();
    gesture.begin(0, x, descendants);
    gesture.hover(3, child, DropZone::Parent);
    assert_eq!(gesture.state(), DragState::Dragging { source: 0 });
    assert_eq!(gesture.release(), None);
}

//! Pure chronological sort engine for note lists.
//!
//! Establishes the base order among unpinned notes only. Pin placement is a
//! positional override applied by the scope view after sorting; this module
//! never inspects pin state.

use crate::models::{Note, OrderMode};

/// Sort notes by creation time according to the given order mode.
///
/// Pure, total, and deterministic: the input is never mutated, ties on
/// `created_at` preserve their relative input order, and an unset order
/// (`None`) returns the input unchanged; callers must not sort before the
/// real preference has been resolved, or the list visibly reflows once it
/// arrives.
pub fn sort_notes(notes: &[Note], order: Option<OrderMode>) -> Vec<Note> {
    let mut sorted: Vec<Note> = notes.to_vec();
    let Some(order) = order else {
        return sorted;
    };
    match order {
        OrderMode::LatestLast => sorted.sort_by_key(|n| n.created_at),
        OrderMode::LatestFirst => sorted.sort_by_key(|n| std::cmp::Reverse(n.created_at)),
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn note(id: i64, hour: u32) -> Note {
        note_at(id, hour, 0)
    }

    fn note_at(id: i64, hour: u32, minute: u32) -> Note {
        Note {
            id,
            title: format!("note-{id}"),
            description: String::new(),
            content: None,
            note_type: "text".to_string(),
            parent_id: None,
            file_id: None,
            created_at: Utc.with_ymd_and_hms(2026, 5, 20, hour, minute, 0).unwrap(),
            is_pinned: false,
            pin_position: None,
            deadline: None,
            completed: false,
            priority: None,
            display_order: None,
            tags: vec![],
        }
    }

    fn ids(notes: &[Note]) -> Vec<i64> {
        notes.iter().map(|n| n.id).collect()
    }

    #[test]
    fn test_latest_last_is_ascending() {
        // A(09:00), B(10:00), C(11:00): [C, A, B] -> [A, B, C]
        let input = vec![note(3, 11), note(1, 9), note(2, 10)];
        assert_eq!(ids(&sort_notes(&input, Some(OrderMode::LatestLast))), vec![1, 2, 3]);
    }

    #[test]
    fn test_latest_first_is_descending() {
        let input = vec![note(3, 11), note(1, 9), note(2, 10)];
        assert_eq!(ids(&sort_notes(&input, Some(OrderMode::LatestFirst))), vec![3, 2, 1]);
    }

    #[test]
    fn test_orders_are_reverses_for_distinct_timestamps() {
        let input = vec![note(5, 14), note(2, 8), note(9, 23), note(4, 11)];
        let mut last = sort_notes(&input, Some(OrderMode::LatestLast));
        let first = sort_notes(&input, Some(OrderMode::LatestFirst));
        last.reverse();
        assert_eq!(ids(&last), ids(&first));
    }

    #[test]
    fn test_sort_is_idempotent() {
        let input = vec![note(3, 11), note(1, 9), note(2, 10)];
        for mode in [OrderMode::LatestFirst, OrderMode::LatestLast] {
            let once = sort_notes(&input, Some(mode));
            let twice = sort_notes(&once, Some(mode));
            assert_eq!(ids(&once), ids(&twice));
        }
    }

    #[test]
    fn test_unset_order_is_identity() {
        let input = vec![note(3, 11), note(1, 9), note(2, 10)];
        assert_eq!(ids(&sort_notes(&input, None)), vec![3, 1, 2]);
    }

    #[test]
    fn test_ties_preserve_input_order() {
        let input = vec![note_at(7, 10, 30), note_at(1, 10, 30), note_at(4, 10, 30)];
        assert_eq!(ids(&sort_notes(&input, Some(OrderMode::LatestLast))), vec![7, 1, 4]);
        assert_eq!(ids(&sort_notes(&input, Some(OrderMode::LatestFirst))), vec![7, 1, 4]);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let input = vec![note(3, 11), note(1, 9)];
        let _ = sort_notes(&input, Some(OrderMode::LatestLast));
        assert_eq!(ids(&input), vec![3, 1]);
    }

    #[test]
    fn test_empty_input() {
        assert!(sort_notes(&[], Some(OrderMode::LatestLast)).is_empty());
    }
}

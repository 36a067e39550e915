#![cfg(feature = "serde")]

//! Integration tests for serde support in eventree.
//!
//! These tests verify that trees of events survive a JSON round trip with
//! their traversal, identities and provenance intact.

use chrono::{Days, NaiveDate};
use eventree::event::{Event, EventDate};
use eventree::key::ReverseOrder;
use eventree::tree::BalancedTree;
use proptest::prelude::*;
use rstest::rstest;

fn day(offset: u64) -> EventDate {
    let base = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    EventDate::from(base + Days::new(offset))
}

fn titles<C>(tree: &BalancedTree<Event, C>) -> Vec<&str> {
    tree.iter().map(Event::title).collect()
}

// =============================================================================
// Round Trip
// =============================================================================

proptest! {
    /// 50 records with distinct, randomly chosen dates come back with an
    /// identical traversal.
    #[test]
    fn prop_fifty_random_events_round_trip(
        offsets in prop::collection::hash_set(0u64..20_000, 50)
    ) {
        let tree: BalancedTree<Event> = offsets
            .iter()
            .map(|&offset| Event::on(format!("event {offset}"), day(offset), "generated"))
            .collect();

        let json = serde_json::to_string(&tree).unwrap();
        let restored: BalancedTree<Event> = serde_json::from_str(&json).unwrap();

        prop_assert_eq!(restored.len(), 50);
        prop_assert_eq!(restored.iter().collect::<Vec<_>>(), tree.iter().collect::<Vec<_>>());
        prop_assert_eq!(restored.validate(), Ok(()));
    }

    /// Provenance of every record survives the round trip.
    #[test]
    fn prop_provenance_round_trips(offsets in prop::collection::vec(0u64..60, 0..40)) {
        let mut tree = BalancedTree::new();
        for (index, offset) in offsets.iter().enumerate() {
            tree.insert(Event::on(format!("e{}", index % 12), day(*offset), ""));
        }

        let json = serde_json::to_string(&tree).unwrap();
        let restored: BalancedTree<Event> = serde_json::from_str(&json).unwrap();

        let before: Vec<(String, u64)> = tree
            .entries()
            .map(|entry| (entry.record.title().to_string(), entry.provenance))
            .collect();
        let after: Vec<(String, u64)> = restored
            .entries()
            .map(|entry| (entry.record.title().to_string(), entry.provenance))
            .collect();
        prop_assert_eq!(before, after);
    }
}

#[rstest]
fn test_event_json_shape() {
    let mut tree = BalancedTree::new();
    tree.insert(Event::new("Launch", "2025-01-01", "v1").unwrap());

    let json = serde_json::to_string(&tree).unwrap();

    assert_eq!(
        json,
        r#"[{"record":{"title":"Launch","date":"2025-01-01","description":"v1"},"provenance":0}]"#
    );
}

#[rstest]
fn test_events_on_the_same_day_round_trip() {
    let mut tree = BalancedTree::new();
    for title in ["Breakfast", "Lunch", "Dinner"] {
        tree.insert(Event::new(title, "2024-04-01", "").unwrap());
    }

    let json = serde_json::to_string(&tree).unwrap();
    let restored: BalancedTree<Event> = serde_json::from_str(&json).unwrap();

    assert_eq!(titles(&restored), titles(&tree));
    assert_eq!(restored.validate(), Ok(()));
}

#[rstest]
fn test_reverse_ordered_tree_round_trip() {
    let tree: BalancedTree<Event, ReverseOrder> = {
        let mut tree = BalancedTree::with_comparator(ReverseOrder);
        tree.extend((0..10).map(|offset| Event::on(format!("e{offset}"), day(offset), "")));
        tree
    };

    let json = serde_json::to_string(&tree).unwrap();
    let restored: BalancedTree<Event, ReverseOrder> = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, tree);
    assert_eq!(titles(&restored).first(), Some(&"e9"));
}

#[rstest]
fn test_empty_tree_round_trip() {
    let tree: BalancedTree<Event> = BalancedTree::new();
    let json = serde_json::to_string(&tree).unwrap();
    assert_eq!(json, "[]");

    let restored: BalancedTree<Event> = serde_json::from_str(&json).unwrap();
    assert!(restored.is_empty());
}

// =============================================================================
// Rejected Input
// =============================================================================

fn snapshot(entries: &[(&str, &str, u64)]) -> String {
    let entries: Vec<serde_json::Value> = entries
        .iter()
        .map(|(title, date, provenance)| {
            serde_json::json!({
                "record": { "title": title, "date": date, "description": "" },
                "provenance": provenance,
            })
        })
        .collect();
    serde_json::Value::from(entries).to_string()
}

#[rstest]
#[case::malformed_date(&[("a", "2024-13-01", 0)])]
#[case::unsorted(&[("a", "2024-02-01", 0), ("b", "2024-01-01", 1)])]
#[case::duplicate_title(&[("a", "2024-01-01", 0), ("a", "2024-02-01", 1)])]
#[case::repeated_provenance(&[("a", "2024-01-01", 4), ("b", "2024-02-01", 4)])]
#[case::exhausted_provenance(&[("a", "2024-01-01", u64::MAX)])]
fn test_invalid_entries_are_rejected(#[case] entries: &[(&str, &str, u64)]) {
    let result: Result<BalancedTree<Event>, _> = serde_json::from_str(&snapshot(entries));
    assert!(result.is_err());
}

#[rstest]
#[case::not_a_sequence(r#"{"title":"a"}"#)]
#[case::truncated(r#"[{"record":{"title":"a","#)]
fn test_invalid_json_is_rejected(#[case] json: &str) {
    let result: Result<BalancedTree<Event>, _> = serde_json::from_str(json);
    assert!(result.is_err());
}

#[rstest]
fn test_near_limit_provenance_round_trips_and_accepts_inserts() {
    let json = snapshot(&[("a", "2024-01-01", u64::MAX - 1)]);
    let mut tree: BalancedTree<Event> = serde_json::from_str(&json).unwrap();

    tree.insert(Event::new("b", "2024-02-01", "").unwrap());

    assert_eq!(tree.provenance("a"), Some(0));
    assert_eq!(tree.provenance("b"), Some(1));
    assert_eq!(tree.validate(), Ok(()));
}

//! Tests for chunk-to-bound translation.
//!
//! # Test Strategy
//!
//! 1. **Scenarios**: sentinel-bounded layouts, prefix split keys, malformed chunks
//! 2. **Properties**: coverage, order preservation, idempotence (proptest)
//! 3. **Thread safety**: concurrent translation of independent inputs

use corelib::document::get_field;
use corelib::value::compare_values;
use corelib::{translate, translate_chunk, BoundValue, ChunkRecord, Document, Error, SplitKey};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::collections::BTreeSet;

fn doc(value: Value) -> Document {
    value.as_object().cloned().unwrap()
}

fn key(s: &str) -> SplitKey {
    s.parse().unwrap()
}

/// Evaluates the subset of query operators `PartitionBoundary::to_filter` emits.
/// Missing fields read as null, as in `PartitionBoundary::contains`.
fn filter_matches(filter: &Document, record: &Document) -> bool {
    filter.iter().all(|(name, cond)| match name.as_str() {
        "$and" => cond
            .as_array()
            .unwrap()
            .iter()
            .all(|c| filter_matches(c.as_object().unwrap(), record)),
        "$or" => cond
            .as_array()
            .unwrap()
            .iter()
            .any(|c| filter_matches(c.as_object().unwrap(), record)),
        field => {
            let actual = get_field(record, field).cloned().unwrap_or(Value::Null);
            cond.as_object().unwrap().iter().all(|(op, operand)| {
                let ord = compare_values(&actual, operand);
                match op.as_str() {
                    "$eq" => ord == Ordering::Equal,
                    "$gt" => ord == Ordering::Greater,
                    "$gte" => ord != Ordering::Less,
                    "$lt" => ord == Ordering::Less,
                    "$lte" => ord != Ordering::Greater,
                    "$in" => operand
                        .as_array()
                        .unwrap()
                        .iter()
                        .any(|v| compare_values(&actual, v) == Ordering::Equal),
                    other => panic!("unexpected operator {}", other),
                }
            })
        }
    })
}

/// Builds a contiguous single-field layout `[$minKey, p0), [p0, p1), ... [pn, $maxKey)`.
fn single_field_layout(points: &BTreeSet<i64>) -> Vec<ChunkRecord> {
    let mut edges = vec![json!({"$minKey": 1})];
    edges.extend(points.iter().map(|p| json!(p)));
    edges.push(json!({"$maxKey": 1}));
    edges
        .windows(2)
        .map(|w| ChunkRecord::new(doc(json!({"a": w[0].clone()})), doc(json!({"a": w[1].clone()}))))
        .collect()
}

/// Builds a contiguous layout over the compound shard key `{a: 1, b: 1}`.
fn compound_layout(points: &BTreeSet<(i64, i64)>) -> Vec<ChunkRecord> {
    let min = json!({"a": {"$minKey": 1}, "b": {"$minKey": 1}});
    let max = json!({"a": {"$maxKey": 1}, "b": {"$maxKey": 1}});
    let mut edges = vec![min];
    edges.extend(points.iter().map(|(a, b)| json!({"a": a, "b": b})));
    edges.push(max);
    edges
        .windows(2)
        .map(|w| ChunkRecord::new(doc(w[0].clone()), doc(w[1].clone())))
        .collect()
}

// ============================================================================
// Scenario Tests
// ============================================================================

#[test]
fn test_minkey_maxkey_layout() {
    // Two chunks split at a = 5
    let chunks = vec![
        ChunkRecord::new(doc(json!({"a": {"$minKey": 1}})), doc(json!({"a": 5}))),
        ChunkRecord::new(doc(json!({"a": 5})), doc(json!({"a": {"$maxKey": 1}}))),
    ];

    let bounds = translate(&chunks, &key("a")).unwrap();

    assert_eq!(bounds.len(), 2);
    assert!(bounds[0].lower().is_min_key(), "First lower bound should be $minKey");
    assert_eq!(bounds[0].upper(), &BoundValue::from(json!(5)));
    assert_eq!(bounds[1].lower(), &BoundValue::from(json!(5)));
    assert!(bounds[1].upper().is_max_key(), "Last upper bound should be $maxKey");
}

#[test]
fn test_single_chunk_collection() {
    // A freshly sharded collection has exactly one chunk covering everything
    let chunks = vec![ChunkRecord::new(
        doc(json!({"a": {"$minKey": 1}})),
        doc(json!({"a": {"$maxKey": 1}})),
    )];

    let bounds = translate(&chunks, &key("a")).unwrap();

    assert_eq!(bounds.len(), 1);
    assert!(bounds[0].to_filter().is_empty(), "Fully open bound should not filter");
    assert!(bounds[0].contains(&doc(json!({"a": "anything"}))));
}

#[test]
fn test_prefix_split_key_is_not_an_error() {
    // Sharded on {a: 1, b: 1}, partitioned on a only
    let chunks = vec![ChunkRecord::new(
        doc(json!({"a": 1, "b": 1})),
        doc(json!({"a": 1, "b": 100})),
    )];

    let bounds = translate(&chunks, &key("a")).unwrap();

    assert_eq!(
        Value::Object(bounds[0].to_document()),
        json!({"min": {"a": 1}, "max": {"a": 1}})
    );
    assert!(bounds[0].is_degenerate());
}

#[test]
fn test_malformed_chunk_aborts_whole_pass() {
    // The middle chunk carries neither a value nor a sentinel for `a`
    let chunks = vec![
        ChunkRecord::new(doc(json!({"a": {"$minKey": 1}})), doc(json!({"a": 0}))),
        ChunkRecord::new(doc(json!({"x": 0})), doc(json!({"x": 10}))),
        ChunkRecord::new(doc(json!({"a": 10})), doc(json!({"a": {"$maxKey": 1}}))),
    ];

    let result = translate(&chunks, &key("a"));

    match result {
        Err(Error::MalformedChunk { index, reason }) => {
            assert_eq!(index, 1);
            assert!(reason.contains("`a`"), "Reason should name the field: {}", reason);
        }
        other => panic!("expected a malformed chunk error, got {:?}", other),
    }
}

#[test]
fn test_boundaries_serialize_for_scan_planner() {
    let chunks = single_field_layout(&[10, 20].into_iter().collect());
    let bounds = translate(&chunks, &key("a")).unwrap();

    let encoded = serde_json::to_value(&bounds).unwrap();
    assert_eq!(
        encoded,
        json!([
            {"min": {"a": {"$minKey": 1}}, "max": {"a": 10}},
            {"min": {"a": 10}, "max": {"a": 20}},
            {"min": {"a": 20}, "max": {"a": {"$maxKey": 1}}}
        ])
    );
}

#[test]
fn test_canonical_number_bounds_order_numerically() {
    // Exports written in canonical extended JSON wrap int64 split points
    let chunks = vec![
        ChunkRecord::new(doc(json!({"a": {"$minKey": 1}})), doc(json!({"a": {"$numberLong": "5"}}))),
        ChunkRecord::new(doc(json!({"a": {"$numberLong": "5"}})), doc(json!({"a": {"$maxKey": 1}}))),
    ];
    let bounds = translate(&chunks, &key("a")).unwrap();

    let record = doc(json!({"a": 7}));
    let hits: Vec<usize> = (0..bounds.len()).filter(|&i| bounds[i].contains(&record)).collect();
    assert_eq!(hits, vec![1]);
    assert!(bounds[0].contains(&doc(json!({"a": 4}))));
    assert!(!bounds[0].is_degenerate());
}

#[test]
fn test_compound_filter_keeps_records_inside_chunk() {
    // One chunk of a {a: 1, b: 1} collection, split on the full shard key
    let chunks = vec![ChunkRecord::new(doc(json!({"a": 1, "b": 1})), doc(json!({"a": 1, "b": 100})))];
    let bounds = translate(&chunks, &key("a,b")).unwrap();
    let filter = bounds[0].to_filter();

    assert!(filter_matches(&filter, &doc(json!({"a": 1, "b": 50}))));
    assert!(filter_matches(&filter, &doc(json!({"a": 1, "b": 1}))));
    assert!(!filter_matches(&filter, &doc(json!({"a": 1, "b": 100}))));
    assert!(!filter_matches(&filter, &doc(json!({"a": 2, "b": 50}))));
}

// ============================================================================
// Thread Safety
// ============================================================================

#[test]
fn test_concurrent_translation() {
    // Translation is pure; independent inputs need no coordination
    let layouts: Vec<Vec<ChunkRecord>> = (0..8)
        .map(|n| single_field_layout(&(0..n * 10).step_by(10).collect()))
        .collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = layouts
            .iter()
            .map(|chunks| scope.spawn(move || translate(chunks, &key("a"))))
            .collect();

        for (handle, chunks) in handles.into_iter().zip(layouts.iter()) {
            let bounds = handle.join().unwrap().unwrap();
            assert_eq!(bounds.len(), chunks.len());
        }
    });
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_output_is_contiguous_and_sentinel_capped(points in prop::collection::btree_set(-1000i64..1000, 0..32)) {
        let chunks = single_field_layout(&points);
        let bounds = translate(&chunks, &key("a")).unwrap();

        prop_assert_eq!(bounds.len(), chunks.len());
        prop_assert!(bounds[0].lower().is_min_key());
        prop_assert!(bounds[bounds.len() - 1].upper().is_max_key());
        for pair in bounds.windows(2) {
            prop_assert_eq!(pair[0].upper(), pair[1].lower());
        }
    }

    #[test]
    fn prop_every_value_lands_in_exactly_one_partition(
        points in prop::collection::btree_set(-100i64..100, 0..16),
        value in -150i64..150,
    ) {
        let chunks = single_field_layout(&points);
        let bounds = translate(&chunks, &key("a")).unwrap();
        let record = doc(json!({"a": value}));

        let hits = bounds.iter().filter(|b| b.contains(&record)).count();
        prop_assert_eq!(hits, 1);
    }

    #[test]
    fn prop_prefix_projection_keeps_layout(points in prop::collection::btree_set((0i64..5, 0i64..100), 0..24)) {
        let chunks = compound_layout(&points);
        let bounds = translate(&chunks, &key("a")).unwrap();

        prop_assert_eq!(bounds.len(), chunks.len());
        prop_assert!(bounds[0].lower().is_min_key());
        prop_assert!(bounds[bounds.len() - 1].upper().is_max_key());
        for b in &bounds {
            // Projection never inverts a range; it can only collapse it
            prop_assert!(b.lower() <= b.upper());
        }
        for pair in bounds.windows(2) {
            prop_assert_eq!(pair[0].upper(), pair[1].lower());
        }
    }

    #[test]
    fn prop_order_preserved_under_shuffle(
        shuffled in prop::collection::btree_set(-500i64..500, 1..16)
            .prop_map(|points| single_field_layout(&points))
            .prop_shuffle()
    ) {
        let bounds = translate(&shuffled, &key("a")).unwrap();

        for (i, (chunk, bound)) in shuffled.iter().zip(bounds.iter()).enumerate() {
            prop_assert_eq!(&translate_chunk(chunk, i, &key("a")).unwrap(), bound);
        }
    }

    #[test]
    fn prop_translation_is_idempotent(points in prop::collection::btree_set((0i64..5, 0i64..100), 0..24)) {
        let chunks = compound_layout(&points);
        let first = translate(&chunks, &key("a,b")).unwrap();
        let second = translate(&chunks, &key("a,b")).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_filter_agrees_with_contains(
        points in prop::collection::btree_set((0i64..5, 0i64..20), 0..16),
        a in -1i64..6,
        b in -1i64..21,
    ) {
        let chunks = compound_layout(&points);
        let record = doc(json!({"a": a, "b": b}));

        for split in ["a,b", "a"] {
            let bounds = translate(&chunks, &key(split)).unwrap();
            for bound in &bounds {
                prop_assert_eq!(
                    filter_matches(&bound.to_filter(), &record),
                    bound.contains(&record),
                    "{} on {:?}",
                    bound,
                    record
                );
            }
            if split == "a,b" {
                let hits = bounds.iter().filter(|bound| filter_matches(&bound.to_filter(), &record)).count();
                prop_assert_eq!(hits, 1);
            }
        }
    }
}

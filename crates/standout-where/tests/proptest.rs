//! Property-based tests for where using proptest.

use proptest::prelude::*;
use serde_json::json;
use standout_where::{Expression, Operators, Record, Timestamp, Value};

// ============================================================================
// Test helpers
// ============================================================================

#[derive(Debug, Clone)]
struct TestItem {
    value: i64,
    name: String,
    active: bool,
    tags: Vec<String>,
}

impl TestItem {
    fn to_record(&self) -> Record {
        Record::new()
            .with("value", self.value)
            .with("name", self.name.as_str())
            .with("active", self.active)
            .with("tags", self.tags.clone())
    }
}

// Strategy to generate test items
fn test_item_strategy() -> impl Strategy<Value = TestItem> {
    (
        any::<i64>(),
        "[a-zA-Z]{1,10}",
        any::<bool>(),
        prop::collection::vec("[a-d]", 0..4),
    )
        .prop_map(|(value, name, active, tags)| TestItem {
            value,
            name,
            active,
            tags,
        })
}

fn dataset_strategy(max: usize) -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(test_item_strategy(), 0..max)
        .prop_map(|items| items.iter().map(TestItem::to_record).collect())
}

// A small family of expressions over the test item fields
fn expression_strategy() -> impl Strategy<Value = Expression> {
    prop_oneof![
        any::<i64>().prop_map(|t| Expression::new().field("value", Operators::new().greater_than(t))),
        any::<i64>().prop_map(|t| Expression::new().field("value", Operators::new().less_than_or_equal(t))),
        any::<bool>().prop_map(|b| Expression::new().field("active", b)),
        "[a-z]{1,2}".prop_map(|s| Expression::new().field(
            "name",
            Operators::new().includes(s).case_insensitive(true)
        )),
        "[a-d]".prop_map(|t| Expression::new().field("tags", Operators::new().includes_some([t]))),
        (0usize..4).prop_map(|n| Expression::new().field(
            "tags",
            Operators::new().length(Operators::new().greater_than_or_equal(n))
        )),
    ]
}

fn matching(expr: &Expression, data: &[Record]) -> Vec<bool> {
    (0..data.len())
        .map(|i| expr.matches(data, i).unwrap())
        .collect()
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Filter should never return more records than the input.
    #[test]
    fn filter_never_grows_collection(
        data in dataset_strategy(60),
        expr in expression_strategy(),
    ) {
        let results = expr.filter(&data).unwrap();
        prop_assert!(results.len() <= data.len());
    }

    /// Filtering the filtered records again changes nothing.
    #[test]
    fn filter_is_idempotent(
        data in dataset_strategy(60),
        expr in expression_strategy(),
    ) {
        let once = expr.filter_cloned(&data).unwrap();
        let twice = expr.filter_cloned(&once).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Count should equal the length of filtered results.
    #[test]
    fn count_equals_filter_len(
        data in dataset_strategy(60),
        expr in expression_strategy(),
    ) {
        prop_assert_eq!(expr.count(&data).unwrap(), expr.filter(&data).unwrap().len());
    }

    /// Empty expression should match every record.
    #[test]
    fn empty_expression_matches_all(data in dataset_strategy(40)) {
        let results = Expression::new().filter(&data).unwrap();
        prop_assert_eq!(results.len(), data.len());
    }

    /// Field keys combine by conjunction.
    #[test]
    fn field_keys_are_conjoined(
        data in dataset_strategy(40),
        threshold in any::<i64>(),
        active in any::<bool>(),
    ) {
        let value = Operators::new().greater_than_or_equal(threshold);
        let both = Expression::new().field("value", value.clone()).field("active", active);
        let left = Expression::new().field("value", value);
        let right = Expression::new().field("active", active);

        let expected: Vec<bool> = matching(&left, &data)
            .into_iter()
            .zip(matching(&right, &data))
            .map(|(l, r)| l && r)
            .collect();
        prop_assert_eq!(matching(&both, &data), expected);
    }

    /// A single $AND operand behaves like the operand itself.
    #[test]
    fn single_and_reduces_to_operand(
        data in dataset_strategy(40),
        expr in expression_strategy(),
    ) {
        let wrapped = Expression::new().and(expr.clone());
        prop_assert_eq!(matching(&wrapped, &data), matching(&expr, &data));
    }

    /// A single $NOT operand negates the operand.
    #[test]
    fn single_not_negates_operand(
        data in dataset_strategy(40),
        expr in expression_strategy(),
    ) {
        let negated = Expression::new().not(expr.clone());
        let expected: Vec<bool> = matching(&expr, &data).into_iter().map(|m| !m).collect();
        prop_assert_eq!(matching(&negated, &data), expected);
    }

    /// A $OR list keeps exactly the records some member keeps.
    #[test]
    fn or_list_is_disjunction(
        data in dataset_strategy(40),
        a in expression_strategy(),
        b in expression_strategy(),
    ) {
        let either = Expression::new().or(vec![a.clone(), b.clone()]);
        let expected: Vec<bool> = matching(&a, &data)
            .into_iter()
            .zip(matching(&b, &data))
            .map(|(l, r)| l || r)
            .collect();
        prop_assert_eq!(matching(&either, &data), expected);
    }

    /// Timestamps order by their epoch milliseconds.
    #[test]
    fn timestamp_ordering_is_normalized(
        millis in prop::collection::vec(any::<i64>(), 1..50),
        threshold in any::<i64>(),
    ) {
        let data: Vec<Record> = millis
            .iter()
            .map(|&ms| Record::new().with("at", Timestamp(ms)))
            .collect();

        let after = Expression::new().field("at", Operators::new().greater_than(Timestamp(threshold)));
        let before_number = Expression::new().field("at", Operators::new().less_than(threshold));

        let after_expected: Vec<bool> = millis.iter().map(|&ms| ms > threshold).collect();
        let before_expected: Vec<bool> = millis.iter().map(|&ms| ms < threshold).collect();
        prop_assert_eq!(matching(&after, &data), after_expected);
        prop_assert_eq!(matching(&before_number, &data), before_expected);
    }

    /// Case-insensitive includes matches any casing of a substring.
    #[test]
    fn case_insensitive_includes_any_casing(
        name in "[a-z]{3,12}",
        start in 0usize..3,
    ) {
        let needle = name[start..].to_uppercase();
        let data = vec![Record::new().with("name", name.as_str())];
        let expr = Expression::new().field(
            "name",
            Operators::new().includes(needle).case_insensitive(true),
        );
        prop_assert!(expr.matches(&data, 0).unwrap());
    }

    /// Every array includes all of its own elements and none of an empty list.
    #[test]
    fn array_includes_its_elements(tags in prop::collection::vec("[a-z]{1,3}", 0..6)) {
        let data = vec![Record::new().with("tags", tags.clone())];
        let every = Expression::new().field("tags", Operators::new().includes_every(tags.clone()));
        let none = Expression::new().field("tags", Operators::new().includes_none(Vec::<Value>::new()));
        let length = Expression::new().field(
            "tags",
            Operators::new().length(Operators::new().equals(tags.len())),
        );

        prop_assert!(every.matches(&data, 0).unwrap());
        prop_assert!(none.matches(&data, 0).unwrap());
        prop_assert!(length.matches(&data, 0).unwrap());
    }

    /// any() should return true iff filter returns non-empty.
    #[test]
    fn any_consistent_with_filter(
        data in dataset_strategy(40),
        expr in expression_strategy(),
    ) {
        prop_assert_eq!(expr.any(&data).unwrap(), !expr.filter(&data).unwrap().is_empty());
    }

    /// all() should return true iff filter returns all records.
    #[test]
    fn all_consistent_with_filter(
        data in dataset_strategy(40),
        expr in expression_strategy(),
    ) {
        prop_assert_eq!(expr.all(&data).unwrap(), expr.count(&data).unwrap() == data.len());
    }

    /// find() should return the same as filter().first().
    #[test]
    fn find_consistent_with_filter(
        data in dataset_strategy(40),
        expr in expression_strategy(),
    ) {
        let found = expr.find(&data).unwrap();
        let filtered = expr.filter(&data).unwrap();
        prop_assert_eq!(found, filtered.first().copied());
    }

    /// JSON and builder forms of an expression agree.
    #[test]
    fn json_matches_builder(
        data in dataset_strategy(40),
        threshold in any::<i64>(),
        prefix in "[a-z]",
    ) {
        let parsed = Expression::from_json(&json!({
            "value": {"lessThan": threshold},
            "$OR": [{"active": true}, {"name": {"startsWith": prefix.clone(), "caseInsensitive": true}}],
        }))
        .unwrap();
        let built = Expression::new()
            .field("value", Operators::new().less_than(threshold))
            .or(vec![
                Expression::new().field("active", true),
                Expression::new().field(
                    "name",
                    Operators::new().starts_with(prefix).case_insensitive(true),
                ),
            ]);

        prop_assert_eq!(matching(&parsed, &data), matching(&built, &data));
    }
}

// ============================================================================
// Additional edge case tests
// ============================================================================

#[test]
fn empty_collection_returns_empty() {
    let data: Vec<Record> = vec![];
    let expr = Expression::new().field("value", 42);

    assert!(expr.filter(&data).unwrap().is_empty());
    assert_eq!(expr.count(&data).unwrap(), 0);
    assert!(!expr.any(&data).unwrap());
    assert!(expr.all(&data).unwrap()); // vacuously true
    assert!(expr.find(&data).unwrap().is_none());
}

//! Collection scans.
//!
//! Every scan validates the expression once, then evaluates records in
//! dataset order. An error from any record aborts the scan; there are no
//! partial results.

use crate::error::Result;
use crate::expression::{Expression, Scope};
use crate::options::Options;
use crate::record::Record;

/// Returns every record of `dataset` that matches `expression`, in order.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use standout_where::{filter, Expression, Record};
///
/// let data: Vec<Record> = serde_json::from_value(json!([
///     {"name": "Alice", "age": 30},
///     {"name": "Bob", "age": 25},
/// ]))
/// .unwrap();
///
/// let expr = Expression::from_json(&json!({"age": {"lessThan": 30}})).unwrap();
/// let results = filter(&data, &expr).unwrap();
///
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0].get("name").and_then(|v| v.as_str()), Some("Bob"));
/// ```
pub fn filter<'a>(dataset: &'a [Record], expression: &Expression) -> Result<Vec<&'a Record>> {
    expression.filter(dataset)
}

impl Expression {
    /// Filters a dataset, returning references to matching records.
    pub fn filter<'a>(&self, dataset: &'a [Record]) -> Result<Vec<&'a Record>> {
        self.filter_with(dataset, &Options::default())
    }

    /// Filters a dataset with explicit options.
    pub fn filter_with<'a>(
        &self,
        dataset: &'a [Record],
        options: &Options,
    ) -> Result<Vec<&'a Record>> {
        self.validate(options)?;
        log::debug!(
            "filtering {} records with {} fields and {} combinators",
            dataset.len(),
            self.fields.len(),
            self.combinators.len()
        );

        let mut results = Vec::new();
        for (index, record) in dataset.iter().enumerate() {
            if self.evaluate_at(dataset, index, record)? {
                results.push(record);
            }
        }

        log::debug!("matched {} of {} records", results.len(), dataset.len());
        Ok(results)
    }

    /// Filters and clones matching records.
    pub fn filter_cloned(&self, dataset: &[Record]) -> Result<Vec<Record>> {
        self.filter_cloned_with(dataset, &Options::default())
    }

    /// Filters and clones matching records with explicit options.
    pub fn filter_cloned_with(&self, dataset: &[Record], options: &Options) -> Result<Vec<Record>> {
        Ok(self
            .filter_with(dataset, options)?
            .into_iter()
            .cloned()
            .collect())
    }

    /// Counts matching records.
    pub fn count(&self, dataset: &[Record]) -> Result<usize> {
        self.count_with(dataset, &Options::default())
    }

    /// Counts matching records with explicit options.
    pub fn count_with(&self, dataset: &[Record], options: &Options) -> Result<usize> {
        Ok(self.filter_with(dataset, options)?.len())
    }

    /// Returns `true` if any record matches. Stops at the first match.
    pub fn any(&self, dataset: &[Record]) -> Result<bool> {
        self.any_with(dataset, &Options::default())
    }

    /// Returns `true` if any record matches, with explicit options.
    pub fn any_with(&self, dataset: &[Record], options: &Options) -> Result<bool> {
        Ok(self.position_with(dataset, options)?.is_some())
    }

    /// Returns `true` if every record matches. Stops at the first miss.
    pub fn all(&self, dataset: &[Record]) -> Result<bool> {
        self.all_with(dataset, &Options::default())
    }

    /// Returns `true` if every record matches, with explicit options.
    pub fn all_with(&self, dataset: &[Record], options: &Options) -> Result<bool> {
        Ok(self.scan(dataset, options, false)?.is_none())
    }

    /// Finds the first matching record.
    pub fn find<'a>(&self, dataset: &'a [Record]) -> Result<Option<&'a Record>> {
        self.find_with(dataset, &Options::default())
    }

    /// Finds the first matching record with explicit options.
    pub fn find_with<'a>(
        &self,
        dataset: &'a [Record],
        options: &Options,
    ) -> Result<Option<&'a Record>> {
        Ok(self
            .position_with(dataset, options)?
            .and_then(|index| dataset.get(index)))
    }

    /// Finds the index of the first matching record.
    pub fn position(&self, dataset: &[Record]) -> Result<Option<usize>> {
        self.position_with(dataset, &Options::default())
    }

    /// Finds the index of the first matching record with explicit options.
    pub fn position_with(&self, dataset: &[Record], options: &Options) -> Result<Option<usize>> {
        self.scan(dataset, options, true)
    }

    /// Returns the index of the first record whose verdict is `stop_on`.
    fn scan(&self, dataset: &[Record], options: &Options, stop_on: bool) -> Result<Option<usize>> {
        self.validate(options)?;
        for (index, record) in dataset.iter().enumerate() {
            if self.evaluate_at(dataset, index, record)? == stop_on {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    fn evaluate_at(&self, dataset: &[Record], index: usize, record: &Record) -> Result<bool> {
        let scope = Scope {
            dataset,
            index,
            record,
        };
        self.evaluate(&scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WhereError;
    use crate::options::DEFAULT_MAX_DEPTH;
    use crate::operators::Operators;
    use crate::predicate::Predicate;
    use crate::value::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn people() -> Vec<Record> {
        vec![
            Record::new().with("name", "Alice").with("age", 30),
            Record::new().with("name", "Bob").with("age", 25),
            Record::new().with("name", "Charlie").with("age", 35),
            Record::new().with("name", "David").with("age", 28),
        ]
    }

    fn names(records: &[&Record]) -> Vec<String> {
        records
            .iter()
            .filter_map(|r| r.get("name").and_then(|v| v.as_str()).map(str::to_owned))
            .collect()
    }

    fn adults_over(age: i64) -> Expression {
        Expression::new().field("age", Operators::new().greater_than(age))
    }

    #[test]
    fn filter_keeps_order() {
        let data = people();
        let results = filter(&data, &adults_over(27)).unwrap();
        assert_eq!(names(&results), vec!["Alice", "Charlie", "David"]);
    }

    #[test]
    fn filter_empty_dataset() {
        assert!(adults_over(0).filter(&[]).unwrap().is_empty());
    }

    #[test]
    fn filter_cloned_owns_records() {
        let data = people();
        let owned = adults_over(30).filter_cloned(&data).unwrap();
        drop(data);
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].get("name").and_then(|v| v.as_str()), Some("Charlie"));
    }

    #[test]
    fn count_any_all() {
        let data = people();
        assert_eq!(adults_over(26).count(&data).unwrap(), 3);
        assert!(adults_over(34).any(&data).unwrap());
        assert!(!adults_over(35).any(&data).unwrap());
        assert!(adults_over(20).all(&data).unwrap());
        assert!(!adults_over(25).all(&data).unwrap());
        assert!(adults_over(99).all(&[]).unwrap());
    }

    #[test]
    fn find_and_position() {
        let data = people();
        let expr = adults_over(30);
        assert_eq!(expr.position(&data).unwrap(), Some(2));
        assert_eq!(
            expr.find(&data).unwrap().and_then(|r| r.get("name")),
            Some(&Value::from("Charlie"))
        );
        assert_eq!(adults_over(40).find(&data).unwrap(), None);
    }

    #[test]
    fn any_stops_at_first_match() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let expr = Expression::new().field(
            "age",
            Predicate::new(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
                true
            }),
        );

        assert!(expr.any(&people()).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn invalid_expression_fails_before_scanning() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let expr = Expression::new()
            .field(
                "name",
                Predicate::new(move |_| {
                    seen.fetch_add(1, Ordering::SeqCst);
                    true
                }),
            )
            .field("$bad", 1);

        let err = expr.filter(&people()).unwrap_err();
        assert!(matches!(err, WhereError::ReservedFieldName { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn predicate_error_aborts_scan() {
        let expr = Expression::new().field(
            "age",
            Predicate::try_new(|ctx| match ctx.value.and_then(|v| v.as_number()) {
                Some(age) if age.to_f64() < 26.0 => Err("too young to compare"),
                _ => Ok(true),
            }),
        );

        let err = expr.filter(&people()).unwrap_err();
        match err {
            WhereError::Predicate { field, source } => {
                assert_eq!(field, "age");
                assert_eq!(source.to_string(), "too young to compare");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn every_scan_honors_options() {
        // Nested 70 deep, past the default limit
        let mut expr = adults_over(26);
        for _ in 0..70 {
            expr = Expression::new().and(expr);
        }
        let data = people();
        let relaxed = Options::new().max_depth(100);

        assert_eq!(expr.filter_with(&data, &relaxed).unwrap().len(), 3);
        assert_eq!(expr.filter_cloned_with(&data, &relaxed).unwrap().len(), 3);
        assert_eq!(expr.count_with(&data, &relaxed).unwrap(), 3);
        assert!(expr.any_with(&data, &relaxed).unwrap());
        assert!(!expr.all_with(&data, &relaxed).unwrap());
        assert_eq!(expr.position_with(&data, &relaxed).unwrap(), Some(0));
        assert_eq!(
            expr.find_with(&data, &relaxed)
                .unwrap()
                .and_then(|r| r.get("name")),
            Some(&Value::from("Alice"))
        );

        let too_deep = |result: Result<bool>| {
            matches!(result, Err(WhereError::DepthExceeded { max: DEFAULT_MAX_DEPTH }))
        };
        assert!(too_deep(expr.count(&data).map(|n| n > 0)));
        assert!(too_deep(expr.any(&data)));
        assert!(too_deep(expr.all(&data)));
        assert!(too_deep(expr.position(&data).map(|p| p.is_some())));
        assert!(too_deep(expr.find(&data).map(|r| r.is_some())));
    }

    #[test]
    fn filter_with_options() {
        let expr = Expression::new().and(Expression::new().and(adults_over(20)));
        let strict = Options::new().max_depth(1);

        let err = expr.filter_with(&people(), &strict).unwrap_err();
        assert!(matches!(err, WhereError::DepthExceeded { max: 1 }));
        assert_eq!(expr.filter(&people()).unwrap().len(), 4);
    }
}

//! Typed queries over document collections.

use std::cmp::Ordering;

use serde_json::Value;
use yotc_core::timestamp::to_timestamp;

use crate::backend::Document;

/// Which documents a query ranges over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// The direct children of one collection path (e.g. `clubs/c1/events`).
    Collection(String),
    /// Every collection with this name anywhere in the tree (e.g. `memberships`).
    Group(String),
}

/// Sort direction for [`Query::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A query: a scope, equality filters, and at most one ordering.
///
/// Documents lacking the ordering field are excluded from ordered results.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub scope: Scope,
    pub filters: Vec<(String, Value)>,
    pub order: Option<(String, Direction)>,
}

impl Query {
    /// Ranges over the direct children of `path`.
    pub fn collection(path: impl Into<String>) -> Self {
        Self { scope: Scope::Collection(path.into()), filters: Vec::new(), order: None }
    }

    /// Ranges over every collection named `name`.
    pub fn group(name: impl Into<String>) -> Self {
        Self { scope: Scope::Group(name.into()), filters: Vec::new(), order: None }
    }

    /// Keeps documents whose `field` equals `value`.
    #[must_use]
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    /// Orders results by `field`.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order = Some((field.into(), direction));
        self
    }

    /// Whether a document stored at `path` falls within this query's scope.
    #[must_use]
    pub fn in_scope(&self, path: &str) -> bool {
        match &self.scope {
            Scope::Collection(collection) => path
                .strip_prefix(collection.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
                .is_some_and(|id| !id.is_empty() && !id.contains('/')),
            Scope::Group(name) => {
                let mut parts = path.rsplit('/');
                parts.next();
                parts.next() == Some(name.as_str())
            }
        }
    }

    /// Whether `doc` passes every filter.
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        self.filters
            .iter()
            .all(|(field, value)| doc.get(field) == Some(value))
    }

    /// Sorts `(path, doc)` pairs in place according to the query's ordering,
    /// dropping documents that lack the ordering field.
    pub fn sort<T>(&self, rows: &mut Vec<(T, Document)>) {
        let Some((field, direction)) = &self.order else {
            return;
        };
        rows.retain(|(_, doc)| doc.get(field).is_some_and(|v| !v.is_null()));
        rows.sort_by(|(_, a), (_, b)| {
            let ord = compare_values(
                a.get(field).unwrap_or(&Value::Null),
                b.get(field).unwrap_or(&Value::Null),
            );
            match direction {
                Direction::Ascending => ord,
                Direction::Descending => ord.reverse(),
            }
        });
    }
}

/// Total order over JSON values used for sorting.
///
/// Values of different kinds order as null < bool < number < string, with
/// arrays and objects last. Strings and timestamp objects that both parse as
/// timestamps compare chronologically.
#[must_use]
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    let timestamp_like = |v: &Value| matches!(v, Value::String(_) | Value::Object(_));
    if timestamp_like(a) && timestamp_like(b) {
        if let (Some(tx), Some(ty)) = (to_timestamp(a), to_timestamp(b)) {
            return tx.cmp(&ty);
        }
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn collection_scope_excludes_nested_documents() {
        let q = Query::collection("clubs/c1/events");
        assert!(q.in_scope("clubs/c1/events/e1"));
        assert!(!q.in_scope("clubs/c1/events/e1/rsvps/u1"));
        assert!(!q.in_scope("clubs/c1/eventsx/e1"));
        assert!(!q.in_scope("clubs/c2/events/e1"));
    }

    #[test]
    fn group_scope_matches_any_parent() {
        let q = Query::group("memberships");
        assert!(q.in_scope("clubs/c1/memberships/u1"));
        assert!(q.in_scope("clubs/c2/memberships/u1"));
        assert!(!q.in_scope("clubs/c1"));
        assert!(!q.in_scope("clubs/c1/events/e1"));
    }

    #[test]
    fn timestamps_sort_chronologically_across_precisions() {
        let a = json!("2025-03-01T10:00:00.5Z");
        let b = json!("2025-03-01T10:00:00Z");
        assert_eq!(compare_values(&a, &b), Ordering::Greater);
    }

    #[test]
    fn stored_timestamp_objects_sort_alongside_strings() {
        let earlier = json!({"seconds": 1_736_015_400, "nanoseconds": 0});
        let later = json!("2025-01-05T00:00:00Z");
        assert_eq!(compare_values(&earlier, &later), Ordering::Less);
        assert_eq!(compare_values(&later, &earlier), Ordering::Greater);
    }

    #[test]
    fn ordering_drops_documents_without_field() {
        let q = Query::collection("clubs").order_by("name", Direction::Descending);
        let doc = |v: Value| match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        };
        let mut rows = vec![
            ("a", doc(json!({"name": "Alpha"}))),
            ("b", doc(json!({"other": 1}))),
            ("c", doc(json!({"name": "Charlie"}))),
        ];
        q.sort(&mut rows);
        let order: Vec<&str> = rows.iter().map(|(id, _)| *id).collect();
        assert_eq!(order, vec!["c", "a"]);
    }
}

//! Document trait and query options.

use std::cmp::Ordering;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::filter::field_value;

/// A type stored as a JSON document in a named collection.
pub trait Document: Serialize + DeserializeOwned {
    /// Collection the document lives in.
    const COLLECTION: &'static str;

    /// Unique id of the document within its collection.
    fn id(&self) -> &str;
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

/// Sort key for a find.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    /// Dotted field path.
    pub field: String,
    /// Direction.
    pub order: SortOrder,
}

/// Options controlling ordering and windowing of a find.
///
/// Without a sort, documents come back in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub sort: Option<Sort>,
    pub skip: usize,
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort by a field.
    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(Sort {
            field: field.into(),
            order,
        });
        self
    }

    /// Skip and limit for one page.
    pub fn window(mut self, skip: usize, limit: usize) -> Self {
        self.skip = skip;
        self.limit = Some(limit);
        self
    }
}

/// Total order over JSON values used for sorting.
///
/// Missing and null sort first, then booleans, numbers, strings
/// (case-insensitive, raw bytes as tiebreak), arrays and objects.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(Value::Array(_)) => 4,
            Some(Value::Object(_)) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x
            .to_lowercase()
            .cmp(&y.to_lowercase())
            .then_with(|| x.cmp(y)),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Sort documents in place by a field.
pub(crate) fn sort_documents(docs: &mut [Value], sort: &Sort) {
    docs.sort_by(|a, b| {
        let ord = compare_values(field_value(a, &sort.field), field_value(b, &sort.field));
        match sort.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compare_numbers_and_nulls() {
        assert_eq!(
            compare_values(Some(&json!(1)), Some(&json!(2.5))),
            Ordering::Less
        );
        assert_eq!(compare_values(None, Some(&json!(0))), Ordering::Less);
    }

    #[test]
    fn test_compare_strings_ignores_case() {
        assert_eq!(
            compare_values(Some(&json!("apple")), Some(&json!("Banana"))),
            Ordering::Less
        );
    }

    #[test]
    fn test_sort_desc() {
        let mut docs = vec![json!({"n": 1}), json!({"n": 3}), json!({"n": 2})];
        sort_documents(
            &mut docs,
            &Sort {
                field: "n".to_string(),
                order: SortOrder::Desc,
            },
        );
        let ns: Vec<i64> = docs.iter().filter_map(|d| d["n"].as_i64()).collect();
        assert_eq!(ns, vec![3, 2, 1]);
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::from_str("DESC"), Some(SortOrder::Desc));
        assert_eq!(SortOrder::from_str("sideways"), None);
    }
}

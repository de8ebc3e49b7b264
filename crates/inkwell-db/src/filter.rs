//! Document filters.
//!
//! Field names are dotted paths into the stored JSON (`price.amountCents`).

use serde_json::Value;

/// A predicate over a stored document.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document.
    All,
    /// Field equals the value.
    Eq(String, Value),
    /// Field equals one of the values.
    In(String, Vec<Value>),
    /// Array field contains the value.
    Contains(String, Value),
    /// Array field contains at least one of the values.
    ContainsAny(String, Vec<Value>),
    /// Case-insensitive substring match on a string field.
    Text(String, String),
    /// String field equals the value, optionally ignoring case.
    TextEquals {
        field: String,
        value: String,
        case_sensitive: bool,
    },
    /// Numeric field within an inclusive range.
    Range {
        field: String,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Field is present and not null.
    Exists(String),
    /// All filters match.
    And(Vec<Filter>),
    /// At least one filter matches.
    Or(Vec<Filter>),
    /// The filter does not match.
    Not(Box<Filter>),
}

impl Filter {
    /// Create an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    /// Create an array-contains filter.
    pub fn contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Contains(field.into(), value.into())
    }

    /// Create a case-insensitive substring filter.
    pub fn text(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Filter::Text(field.into(), needle.into())
    }

    /// Create a numeric range filter.
    pub fn range(field: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        Filter::Range {
            field: field.into(),
            min,
            max,
        }
    }

    /// Combine with another filter, flattening nested `And`s.
    pub fn and(self, other: Filter) -> Filter {
        match (self, other) {
            (Filter::All, f) | (f, Filter::All) => f,
            (Filter::And(mut a), Filter::And(b)) => {
                a.extend(b);
                Filter::And(a)
            }
            (Filter::And(mut a), f) => {
                a.push(f);
                Filter::And(a)
            }
            (f, Filter::And(mut b)) => {
                b.insert(0, f);
                Filter::And(b)
            }
            (a, b) => Filter::And(vec![a, b]),
        }
    }

    /// Evaluate the filter against a document.
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(field, value) => field_value(doc, field) == Some(value),
            Filter::In(field, values) => {
                field_value(doc, field).is_some_and(|v| values.contains(v))
            }
            Filter::Contains(field, value) => match field_value(doc, field) {
                Some(Value::Array(items)) => items.contains(value),
                _ => false,
            },
            Filter::ContainsAny(field, values) => match field_value(doc, field) {
                Some(Value::Array(items)) => items.iter().any(|i| values.contains(i)),
                _ => false,
            },
            Filter::Text(field, needle) => match field_value(doc, field) {
                Some(Value::String(s)) => s.to_lowercase().contains(&needle.to_lowercase()),
                _ => false,
            },
            Filter::TextEquals {
                field,
                value,
                case_sensitive,
            } => match field_value(doc, field) {
                Some(Value::String(s)) if *case_sensitive => s == value,
                Some(Value::String(s)) => s.to_lowercase() == value.to_lowercase(),
                _ => false,
            },
            Filter::Range { field, min, max } => {
                match field_value(doc, field).and_then(Value::as_f64) {
                    Some(n) => min.map_or(true, |m| n >= m) && max.map_or(true, |m| n <= m),
                    None => false,
                }
            }
            Filter::Exists(field) => field_value(doc, field).is_some_and(|v| !v.is_null()),
            Filter::And(filters) => filters.iter().all(|f| f.matches(doc)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(doc)),
            Filter::Not(filter) => !filter.matches(doc),
        }
    }
}

/// Resolve a dotted path inside a JSON document.
pub fn field_value<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |current, key| current.get(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn book() -> Value {
        json!({
            "id": "b1",
            "name": "Kobzar",
            "price": { "amountCents": 25000, "currency": "UAH" },
            "authors": ["a1", "a2"],
            "discount": null,
        })
    }

    #[test]
    fn test_nested_field_range() {
        let filter = Filter::range("price.amountCents", Some(10000.0), Some(30000.0));
        assert!(filter.matches(&book()));

        let filter = Filter::range("price.amountCents", Some(30000.0), None);
        assert!(!filter.matches(&book()));
    }

    #[test]
    fn test_contains_and_text() {
        assert!(Filter::contains("authors", "a2").matches(&book()));
        assert!(!Filter::contains("authors", "a3").matches(&book()));
        assert!(Filter::text("name", "kob").matches(&book()));
    }

    #[test]
    fn test_exists_treats_null_as_missing() {
        assert!(!Filter::Exists("discount".to_string()).matches(&book()));
        assert!(Filter::Exists("name".to_string()).matches(&book()));
    }

    #[test]
    fn test_and_flattens() {
        let f = Filter::All
            .and(Filter::eq("id", "b1"))
            .and(Filter::text("name", "zar"));
        match &f {
            Filter::And(parts) => assert_eq!(parts.len(), 2),
            other => panic!("expected And, got {:?}", other),
        }
        assert!(f.matches(&book()));
    }

    #[test]
    fn test_case_sensitive_equals() {
        let strict = Filter::TextEquals {
            field: "name".to_string(),
            value: "kobzar".to_string(),
            case_sensitive: true,
        };
        let loose = Filter::TextEquals {
            field: "name".to_string(),
            value: "kobzar".to_string(),
            case_sensitive: false,
        };
        assert!(!strict.matches(&book()));
        assert!(loose.matches(&book()));
    }
}

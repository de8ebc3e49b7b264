//! Address lookup results.

use serde::{Deserialize, Serialize};

/// A carrier-addressable locality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    /// Carrier reference, used to scope street and warehouse lookups.
    pub settlement_ref: String,
    pub city: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default)]
    pub settlement_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_city_ref: Option<String>,
    /// Full human-readable name, e.g. "м. Київ, Київська обл.".
    pub label: String,
}

impl Settlement {
    /// Exact city + region match, plus district when one is given.
    pub fn matches(&self, city: &str, region: &str, district: Option<&str>) -> bool {
        if self.city != city || self.region != region {
            return false;
        }
        match district.filter(|d| !d.is_empty()) {
            Some(district) => self.district.as_deref() == Some(district),
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Street {
    pub street_ref: String,
    pub settlement_ref: String,
    pub name: String,
    #[serde(default)]
    pub street_type: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub warehouse_ref: String,
    pub settlement_ref: String,
    pub number: String,
    pub description: String,
    #[serde(default)]
    pub short_address: String,
}

/// An address as stored on an order, to be re-resolved against the carrier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAddress {
    pub city: String,
    pub region: String,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub warehouse: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settlement(district: Option<&str>) -> Settlement {
        Settlement {
            settlement_ref: "s1".into(),
            city: "Бровари".into(),
            region: "Київська".into(),
            district: district.map(String::from),
            settlement_type: "м.".into(),
            delivery_city_ref: None,
            label: "м. Бровари, Київська обл.".into(),
        }
    }

    #[test]
    fn test_match_ignores_missing_district() {
        let s = settlement(Some("Броварський"));
        assert!(s.matches("Бровари", "Київська", None));
        assert!(s.matches("Бровари", "Київська", Some("")));
        assert!(s.matches("Бровари", "Київська", Some("Броварський")));
        assert!(!s.matches("Бровари", "Київська", Some("Обухівський")));
        assert!(!s.matches("Бровари", "Львівська", None));
    }

    #[test]
    fn test_match_requires_district_when_given() {
        let s = settlement(None);
        assert!(!s.matches("Бровари", "Київська", Some("Броварський")));
    }
}

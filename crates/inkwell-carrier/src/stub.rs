//! In-memory carrier for tests and offline development.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::client::CarrierApi;
use crate::error::CarrierError;
use crate::model::{Settlement, Street, Warehouse};

/// A [`CarrierApi`] answering from fixed data.
///
/// Settlements match by case-insensitive prefix, streets and warehouse
/// descriptions by substring. Per-query delays simulate a slow network.
#[derive(Debug, Clone, Default)]
pub struct StubCarrier {
    settlements: Vec<Settlement>,
    streets: Vec<Street>,
    warehouses: Vec<Warehouse>,
    delays: HashMap<String, Duration>,
    completed: Arc<Mutex<Vec<String>>>,
}

impl StubCarrier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settlement(mut self, city: &str, region: &str, district: Option<&str>) -> Self {
        let n = self.settlements.len() + 1;
        self.settlements.push(Settlement {
            settlement_ref: format!("settlement-{n}"),
            city: city.to_string(),
            region: region.to_string(),
            district: district.map(String::from),
            settlement_type: "м.".to_string(),
            delivery_city_ref: None,
            label: match district {
                Some(d) => format!("{city}, {region} обл., {d} р-н"),
                None => format!("{city}, {region} обл."),
            },
        });
        self
    }

    /// Add a street to the first settlement named `city`.
    pub fn with_street(mut self, city: &str, name: &str) -> Self {
        let settlement_ref = self.ref_of(city);
        let n = self.streets.len() + 1;
        self.streets.push(Street {
            street_ref: format!("street-{n}"),
            settlement_ref,
            name: name.to_string(),
            street_type: "вул.".to_string(),
            label: format!("вул. {name}"),
        });
        self
    }

    /// Add a warehouse to the first settlement named `city`.
    pub fn with_warehouse(mut self, city: &str, number: &str, description: &str) -> Self {
        let settlement_ref = self.ref_of(city);
        self.warehouses.push(Warehouse {
            warehouse_ref: format!("warehouse-{settlement_ref}-{number}"),
            settlement_ref,
            number: number.to_string(),
            description: description.to_string(),
            short_address: format!("{city}, {description}"),
        });
        self
    }

    /// Delay answers to `query` by `delay`.
    pub fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    /// Queries whose lookups ran to completion, in completion order.
    pub fn completed_calls(&self) -> Arc<Mutex<Vec<String>>> {
        self.completed.clone()
    }

    fn ref_of(&self, city: &str) -> String {
        self.settlements
            .iter()
            .find(|s| s.city == city)
            .map(|s| s.settlement_ref.clone())
            .unwrap_or_default()
    }

    async fn respond(&self, query: &str) {
        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if let Ok(mut completed) = self.completed.lock() {
            completed.push(query.to_string());
        }
    }
}

#[async_trait]
impl CarrierApi for StubCarrier {
    async fn search_settlements(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Settlement>, CarrierError> {
        self.respond(query).await;
        let needle = query.to_lowercase();
        Ok(self
            .settlements
            .iter()
            .filter(|s| s.city.to_lowercase().starts_with(&needle))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn search_streets(
        &self,
        settlement_ref: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Street>, CarrierError> {
        self.respond(query).await;
        let needle = query.to_lowercase();
        Ok(self
            .streets
            .iter()
            .filter(|s| s.settlement_ref == settlement_ref)
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn search_warehouses(
        &self,
        settlement_ref: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Warehouse>, CarrierError> {
        self.respond(query).await;
        let needle = query.to_lowercase();
        Ok(self
            .warehouses
            .iter()
            .filter(|w| w.settlement_ref == settlement_ref)
            .filter(|w| {
                needle.is_empty()
                    || w.number == needle
                    || w.description.to_lowercase().contains(&needle)
            })
            .take(limit)
            .cloned()
            .collect())
    }
}

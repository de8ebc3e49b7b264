//! Settlement → street / warehouse address cascade.
//!
//! Mirrors the checkout address form: the customer types a settlement, picks
//! one of the options, then narrows down to a street or a warehouse inside
//! it. Every field owns a [`LatestRequest`] slot so a burst of keystrokes
//! resolves to the options of the last one only.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, info};

use crate::client::CarrierApi;
use crate::config::CarrierConfig;
use crate::error::CarrierError;
use crate::latest::LatestRequest;
use crate::model::{SavedAddress, Settlement, Street, Warehouse};

/// What happened to a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome", content = "count")]
pub enum LookupOutcome {
    /// Options replaced with this many results.
    Applied(usize),
    /// A newer lookup on the same field took over; nothing changed.
    Superseded,
    /// Query too short or no settlement selected; options cleared.
    Gated,
}

/// Visible state of the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeState {
    pub settlement_query: String,
    pub settlements: Vec<Settlement>,
    pub settlement: Option<Settlement>,
    pub street_query: String,
    pub streets: Vec<Street>,
    pub street: Option<Street>,
    pub warehouse_query: String,
    pub warehouses: Vec<Warehouse>,
    pub warehouse: Option<Warehouse>,
}

impl CascadeState {
    fn clear_below_settlement(&mut self) {
        self.street_query.clear();
        self.streets.clear();
        self.street = None;
        self.warehouse_query.clear();
        self.warehouses.clear();
        self.warehouse = None;
    }
}

/// Which parts of a saved address were re-selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    pub settlement: bool,
    pub street: bool,
    pub warehouse: bool,
}

pub struct AddressCascade {
    api: Arc<dyn CarrierApi>,
    config: CarrierConfig,
    state: Mutex<CascadeState>,
    settlements: LatestRequest,
    streets: LatestRequest,
    warehouses: LatestRequest,
}

impl std::fmt::Debug for AddressCascade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressCascade")
            .field("config", &self.config)
            .field("state", &*self.state())
            .finish_non_exhaustive()
    }
}

impl AddressCascade {
    pub fn new(api: Arc<dyn CarrierApi>, config: CarrierConfig) -> Self {
        Self {
            api,
            config,
            state: Mutex::new(CascadeState::default()),
            settlements: LatestRequest::new(),
            streets: LatestRequest::new(),
            warehouses: LatestRequest::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, CascadeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> CascadeState {
        self.state().clone()
    }

    pub fn selected_settlement(&self) -> Option<Settlement> {
        self.state().settlement.clone()
    }

    /// Look up settlements for a keystroke in the settlement field.
    pub async fn search_settlements(&self, query: &str) -> Result<LookupOutcome, CarrierError> {
        self.state().settlement_query = query.to_string();
        if !self.config.accepts(query) {
            self.settlements.cancel();
            self.state().settlements.clear();
            return Ok(LookupOutcome::Gated);
        }
        self.lookup_settlements(query).await
    }

    async fn lookup_settlements(&self, query: &str) -> Result<LookupOutcome, CarrierError> {
        let api = self.api.clone();
        let owned = query.trim().to_string();
        let limit = self.config.limit;

        let Some(issued) = self
            .settlements
            .run(async move { api.search_settlements(&owned, limit).await })
            .await
        else {
            debug!(query, "settlement lookup superseded");
            return Ok(LookupOutcome::Superseded);
        };
        let options = issued.value?;

        let mut state = self.state();
        if !self.settlements.is_latest(issued.seq) {
            return Ok(LookupOutcome::Superseded);
        }
        let count = options.len();
        state.settlements = options;
        Ok(LookupOutcome::Applied(count))
    }

    /// Pick a settlement from the current options by its carrier reference.
    ///
    /// Changing the settlement clears the street and warehouse fields.
    pub fn select_settlement(&self, settlement_ref: &str) -> Option<Settlement> {
        let mut state = self.state();
        let chosen = state
            .settlements
            .iter()
            .find(|s| s.settlement_ref == settlement_ref)
            .cloned()?;
        if state.settlement.as_ref() != Some(&chosen) {
            self.streets.cancel();
            self.warehouses.cancel();
            state.clear_below_settlement();
        }
        state.settlement_query = chosen.label.clone();
        state.settlement = Some(chosen.clone());
        Some(chosen)
    }

    /// Clear the settlement along with everything that depends on it.
    pub fn clear_settlement(&self) {
        self.streets.cancel();
        self.warehouses.cancel();
        let mut state = self.state();
        state.settlement = None;
        state.clear_below_settlement();
    }

    /// Look up streets of the selected settlement.
    pub async fn search_streets(&self, query: &str) -> Result<LookupOutcome, CarrierError> {
        let settlement = {
            let mut state = self.state();
            state.street_query = query.to_string();
            state.settlement.clone()
        };
        let Some(settlement) = settlement.filter(|_| self.config.accepts(query)) else {
            self.streets.cancel();
            self.state().streets.clear();
            return Ok(LookupOutcome::Gated);
        };
        self.lookup_streets(&settlement.settlement_ref, query).await
    }

    async fn lookup_streets(
        &self,
        settlement_ref: &str,
        query: &str,
    ) -> Result<LookupOutcome, CarrierError> {
        let api = self.api.clone();
        let settlement_ref = settlement_ref.to_string();
        let owned = query.trim().to_string();
        let limit = self.config.limit;

        let Some(issued) = self
            .streets
            .run(async move { api.search_streets(&settlement_ref, &owned, limit).await })
            .await
        else {
            return Ok(LookupOutcome::Superseded);
        };
        let options = issued.value?;

        let mut state = self.state();
        if !self.streets.is_latest(issued.seq) {
            return Ok(LookupOutcome::Superseded);
        }
        let count = options.len();
        state.streets = options;
        Ok(LookupOutcome::Applied(count))
    }

    pub fn select_street(&self, street_ref: &str) -> Option<Street> {
        let mut state = self.state();
        let chosen = state
            .streets
            .iter()
            .find(|s| s.street_ref == street_ref)
            .cloned()?;
        state.street_query = chosen.name.clone();
        state.street = Some(chosen.clone());
        Some(chosen)
    }

    /// Look up warehouses of the selected settlement.
    ///
    /// Warehouse numbers are short, so only the settlement gates this lookup.
    pub async fn search_warehouses(&self, query: &str) -> Result<LookupOutcome, CarrierError> {
        let settlement = {
            let mut state = self.state();
            state.warehouse_query = query.to_string();
            state.settlement.clone()
        };
        let Some(settlement) = settlement else {
            self.warehouses.cancel();
            self.state().warehouses.clear();
            return Ok(LookupOutcome::Gated);
        };

        let api = self.api.clone();
        let settlement_ref = settlement.settlement_ref;
        let owned = query.trim().to_string();
        let limit = self.config.limit;

        let Some(issued) = self
            .warehouses
            .run(async move { api.search_warehouses(&settlement_ref, &owned, limit).await })
            .await
        else {
            return Ok(LookupOutcome::Superseded);
        };
        let options = issued.value?;

        let mut state = self.state();
        if !self.warehouses.is_latest(issued.seq) {
            return Ok(LookupOutcome::Superseded);
        }
        let count = options.len();
        state.warehouses = options;
        Ok(LookupOutcome::Applied(count))
    }

    pub fn select_warehouse(&self, warehouse_ref: &str) -> Option<Warehouse> {
        let mut state = self.state();
        let chosen = state
            .warehouses
            .iter()
            .find(|w| w.warehouse_ref == warehouse_ref)
            .cloned()?;
        state.warehouse_query = chosen.description.clone();
        state.warehouse = Some(chosen.clone());
        Some(chosen)
    }

    /// Re-resolve a saved address.
    ///
    /// Looks the city up and selects the option whose city, region and (when
    /// saved) district match exactly. Without an exact match nothing is
    /// selected and the typed text stays in the field for editing. Street and
    /// warehouse are restored the same way once a settlement is selected.
    pub async fn restore(&self, saved: &SavedAddress) -> Result<RestoreReport, CarrierError> {
        let mut report = RestoreReport::default();
        self.clear_settlement();
        self.state().settlement_query = saved.city.clone();

        if let LookupOutcome::Applied(_) = self.lookup_settlements(&saved.city).await? {
            let matched = self
                .state()
                .settlements
                .iter()
                .find(|s| s.matches(&saved.city, &saved.region, saved.district.as_deref()))
                .map(|s| s.settlement_ref.clone());
            if let Some(settlement_ref) = matched {
                report.settlement = self.select_settlement(&settlement_ref).is_some();
            }
        }
        let Some(settlement) = self.selected_settlement() else {
            info!(city = %saved.city, "saved settlement has no exact match");
            return Ok(report);
        };

        if let Some(street) = saved.street.as_deref().filter(|s| !s.is_empty()) {
            self.state().street_query = street.to_string();
            if let LookupOutcome::Applied(_) =
                self.lookup_streets(&settlement.settlement_ref, street).await?
            {
                let matched = self
                    .state()
                    .streets
                    .iter()
                    .find(|s| s.name == street)
                    .map(|s| s.street_ref.clone());
                if let Some(street_ref) = matched {
                    report.street = self.select_street(&street_ref).is_some();
                }
            }
        }

        if let Some(warehouse) = saved.warehouse.as_deref().filter(|w| !w.is_empty()) {
            if let LookupOutcome::Applied(_) = self.search_warehouses(warehouse).await? {
                let matched = self
                    .state()
                    .warehouses
                    .iter()
                    .find(|w| w.description == warehouse || w.number == warehouse)
                    .map(|w| w.warehouse_ref.clone());
                if let Some(warehouse_ref) = matched {
                    report.warehouse = self.select_warehouse(&warehouse_ref).is_some();
                }
            }
        }

        Ok(report)
    }
}

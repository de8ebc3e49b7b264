//! Shared application state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use inkwell_carrier::{AddressCascade, CarrierApi, CarrierConfig, CarrierError};
use inkwell_commerce::{Shop, UserId};
use inkwell_observability::LoggingConfig;

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub shop: Arc<Shop>,
    carrier: Option<Arc<dyn CarrierApi>>,
    carrier_config: CarrierConfig,
    /// One address form per user.
    cascades: Arc<Mutex<HashMap<UserId, Arc<AddressCascade>>>>,
    pub logging: LoggingConfig,
}

impl AppState {
    pub fn new(shop: Arc<Shop>) -> Self {
        Self {
            shop,
            carrier: None,
            carrier_config: CarrierConfig::default(),
            cascades: Arc::new(Mutex::new(HashMap::new())),
            logging: LoggingConfig::default(),
        }
    }

    pub fn with_carrier(mut self, carrier: Arc<dyn CarrierApi>, config: CarrierConfig) -> Self {
        self.carrier = Some(carrier);
        self.carrier_config = config;
        self
    }

    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// The user's address cascade, created on first use.
    pub fn cascade(&self, user: &UserId) -> Result<Arc<AddressCascade>, CarrierError> {
        let carrier = self.carrier.clone().ok_or(CarrierError::MissingApiKey)?;
        let mut cascades = self
            .cascades
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let cascade = cascades
            .entry(user.clone())
            .or_insert_with(|| Arc::new(AddressCascade::new(carrier, self.carrier_config.clone())));
        Ok(cascade.clone())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("shop", &self.shop)
            .field("carrier", &self.carrier.is_some())
            .finish_non_exhaustive()
    }
}

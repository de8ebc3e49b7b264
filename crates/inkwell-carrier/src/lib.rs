//! Carrier address lookups for Inkwell checkout.
//!
//! Provides the Nova Poshta client behind the [`CarrierApi`] trait and the
//! [`AddressCascade`] that drives the settlement → street / warehouse form
//! with latest-request-wins cancellation.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use inkwell_carrier::{AddressCascade, CarrierConfig, NovaPoshtaClient};
//!
//! let config = CarrierConfig::default().with_api_key("...");
//! let client = NovaPoshtaClient::new(&config)?;
//! let cascade = AddressCascade::new(Arc::new(client), config);
//!
//! cascade.search_settlements("Київ").await?;
//! ```

mod cascade;
mod client;
mod config;
mod error;
mod latest;
mod model;
pub mod stub;

pub use cascade::{AddressCascade, CascadeState, LookupOutcome, RestoreReport};
pub use client::{parse_settlements, parse_streets, parse_warehouses, CarrierApi, NovaPoshtaClient};
pub use config::{CarrierConfig, DEFAULT_API_URL};
pub use error::CarrierError;
pub use latest::{Issued, LatestRequest};
pub use model::{SavedAddress, Settlement, Street, Warehouse};

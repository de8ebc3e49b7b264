//! Nova Poshta JSON API client.
//!
//! Every call is a `POST` of `{apiKey, modelName, calledMethod, methodProperties}`
//! to a single endpoint; the answer is wrapped in `{success, data, errors}`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::config::CarrierConfig;
use crate::error::CarrierError;
use crate::model::{Settlement, Street, Warehouse};

/// Carrier lookups used by the address cascade.
#[async_trait]
pub trait CarrierApi: Send + Sync {
    /// Settlements whose name matches `query`.
    async fn search_settlements(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Settlement>, CarrierError>;

    /// Streets of one settlement matching `query`.
    async fn search_streets(
        &self,
        settlement_ref: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Street>, CarrierError>;

    /// Warehouses of one settlement; an empty `query` lists the first page.
    async fn search_warehouses(
        &self,
        settlement_ref: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Warehouse>, CarrierError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CarrierRequest<'a> {
    api_key: &'a str,
    model_name: &'static str,
    called_method: &'static str,
    method_properties: Value,
}

#[derive(Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    errors: Vec<String>,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<Vec<T>, CarrierError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(CarrierError::Rejected(self.errors))
        }
    }
}

#[derive(Deserialize)]
struct AddressPage<T> {
    #[serde(rename = "Addresses", default = "Vec::new")]
    addresses: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawSettlement {
    #[serde(rename = "Ref")]
    settlement_ref: String,
    present: String,
    main_description: String,
    #[serde(default)]
    area: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    settlement_type_code: String,
    #[serde(default)]
    delivery_city: Option<String>,
}

impl From<RawSettlement> for Settlement {
    fn from(raw: RawSettlement) -> Self {
        // Nova Poshta calls the oblast "Area" and the raion "Region".
        Settlement {
            settlement_ref: raw.settlement_ref,
            city: raw.main_description,
            region: raw.area,
            district: Some(raw.region).filter(|d| !d.is_empty()),
            settlement_type: raw.settlement_type_code,
            delivery_city_ref: raw.delivery_city.filter(|r| !r.is_empty()),
            label: raw.present,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawStreet {
    settlement_ref: String,
    settlement_street_ref: String,
    settlement_street_description: String,
    #[serde(default)]
    streets_type_description: String,
    present: String,
}

impl From<RawStreet> for Street {
    fn from(raw: RawStreet) -> Self {
        Street {
            street_ref: raw.settlement_street_ref,
            settlement_ref: raw.settlement_ref,
            name: raw.settlement_street_description,
            street_type: raw.streets_type_description,
            label: raw.present,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawWarehouse {
    #[serde(rename = "Ref")]
    warehouse_ref: String,
    #[serde(default)]
    settlement_ref: String,
    #[serde(default)]
    number: String,
    description: String,
    #[serde(default)]
    short_address: String,
}

impl From<RawWarehouse> for Warehouse {
    fn from(raw: RawWarehouse) -> Self {
        Warehouse {
            warehouse_ref: raw.warehouse_ref,
            settlement_ref: raw.settlement_ref,
            number: raw.number,
            description: raw.description,
            short_address: raw.short_address,
        }
    }
}

/// Parse a `searchSettlements` response body.
pub fn parse_settlements(body: &str) -> Result<Vec<Settlement>, CarrierError> {
    let envelope: Envelope<AddressPage<RawSettlement>> = serde_json::from_str(body)?;
    Ok(envelope
        .into_data()?
        .into_iter()
        .flat_map(|page| page.addresses)
        .map(Settlement::from)
        .collect())
}

/// Parse a `searchSettlementStreets` response body.
pub fn parse_streets(body: &str) -> Result<Vec<Street>, CarrierError> {
    let envelope: Envelope<AddressPage<RawStreet>> = serde_json::from_str(body)?;
    Ok(envelope
        .into_data()?
        .into_iter()
        .flat_map(|page| page.addresses)
        .map(Street::from)
        .collect())
}

/// Parse a `getWarehouses` response body.
pub fn parse_warehouses(body: &str) -> Result<Vec<Warehouse>, CarrierError> {
    let envelope: Envelope<RawWarehouse> = serde_json::from_str(body)?;
    Ok(envelope
        .into_data()?
        .into_iter()
        .map(Warehouse::from)
        .collect())
}

/// HTTP client for the Nova Poshta lookup API.
#[derive(Debug, Clone)]
pub struct NovaPoshtaClient {
    http: Client,
    api_url: String,
    api_key: String,
}

impl NovaPoshtaClient {
    pub fn new(config: &CarrierConfig) -> Result<Self, CarrierError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(CarrierError::MissingApiKey)?;
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("inkwell/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CarrierError::RequestError(e.to_string()))?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key,
        })
    }

    async fn call(
        &self,
        model_name: &'static str,
        called_method: &'static str,
        method_properties: Value,
    ) -> Result<String, CarrierError> {
        let request = CarrierRequest {
            api_key: &self.api_key,
            model_name,
            called_method,
            method_properties,
        };
        debug!(method = called_method, "carrier lookup");

        let res = self.http.post(&self.api_url).json(&request).send().await?;
        let status = res.status();
        if !status.is_success() {
            let message = res.text().await.unwrap_or_default();
            return Err(CarrierError::HttpError {
                status: status.as_u16(),
                message,
            });
        }
        Ok(res.text().await?)
    }
}

#[async_trait]
impl CarrierApi for NovaPoshtaClient {
    async fn search_settlements(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Settlement>, CarrierError> {
        let body = self
            .call(
                "Address",
                "searchSettlements",
                json!({ "CityName": query, "Limit": limit.to_string(), "Page": "1" }),
            )
            .await?;
        parse_settlements(&body)
    }

    async fn search_streets(
        &self,
        settlement_ref: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Street>, CarrierError> {
        let body = self
            .call(
                "Address",
                "searchSettlementStreets",
                json!({
                    "SettlementRef": settlement_ref,
                    "StreetName": query,
                    "Limit": limit.to_string(),
                }),
            )
            .await?;
        parse_streets(&body)
    }

    async fn search_warehouses(
        &self,
        settlement_ref: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Warehouse>, CarrierError> {
        let body = self
            .call(
                "AddressGeneral",
                "getWarehouses",
                json!({
                    "SettlementRef": settlement_ref,
                    "FindByString": query,
                    "Limit": limit.to_string(),
                    "Page": "1",
                }),
            )
            .await?;
        parse_warehouses(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTLEMENTS: &str = r#"{
        "success": true,
        "data": [{
            "TotalCount": 2,
            "Addresses": [
                {
                    "Present": "м. Київ, Київська обл.",
                    "Warehouses": 2200,
                    "MainDescription": "Київ",
                    "Area": "Київська",
                    "Region": "",
                    "SettlementTypeCode": "м.",
                    "Ref": "e718a680-4b33-11e4-ab6d-005056801329",
                    "DeliveryCity": "8d5a980d-391c-11dd-90d9-001a92567626"
                },
                {
                    "Present": "с. Київець, Львівська обл., Миколаївський р-н",
                    "MainDescription": "Київець",
                    "Area": "Львівська",
                    "Region": "Миколаївський",
                    "SettlementTypeCode": "с.",
                    "Ref": "0df8aa3e-4b3a-11e4-ab6d-005056801329",
                    "DeliveryCity": ""
                }
            ]
        }],
        "errors": [],
        "warnings": []
    }"#;

    #[test]
    fn test_parse_settlements() {
        let settlements = parse_settlements(SETTLEMENTS).unwrap();
        assert_eq!(settlements.len(), 2);

        let kyiv = &settlements[0];
        assert_eq!(kyiv.city, "Київ");
        assert_eq!(kyiv.region, "Київська");
        assert_eq!(kyiv.district, None);
        assert!(kyiv.delivery_city_ref.is_some());

        let village = &settlements[1];
        assert_eq!(village.district.as_deref(), Some("Миколаївський"));
        assert_eq!(village.delivery_city_ref, None);
        assert!(village.matches("Київець", "Львівська", Some("Миколаївський")));
    }

    #[test]
    fn test_parse_streets() {
        let body = r#"{
            "success": true,
            "data": [{
                "TotalCount": 1,
                "Addresses": [{
                    "SettlementRef": "e718a680",
                    "SettlementStreetRef": "st-1",
                    "SettlementStreetDescription": "Хрещатик",
                    "Present": "вул. Хрещатик",
                    "StreetsType": "d4450bdb",
                    "StreetsTypeDescription": "вул."
                }]
            }],
            "errors": []
        }"#;
        let streets = parse_streets(body).unwrap();
        assert_eq!(streets.len(), 1);
        assert_eq!(streets[0].name, "Хрещатик");
        assert_eq!(streets[0].street_type, "вул.");
        assert_eq!(streets[0].settlement_ref, "e718a680");
    }

    #[test]
    fn test_parse_warehouses() {
        let body = r#"{
            "success": true,
            "data": [{
                "Ref": "w-1",
                "SettlementRef": "e718a680",
                "Number": "1",
                "Description": "Відділення №1: вул. Пирогівський шлях, 135",
                "ShortAddress": "Київ, Пирогівський шлях, 135"
            }],
            "errors": []
        }"#;
        let warehouses = parse_warehouses(body).unwrap();
        assert_eq!(warehouses[0].number, "1");
        assert_eq!(warehouses[0].warehouse_ref, "w-1");
    }

    #[test]
    fn test_rejected_response() {
        let body = r#"{"success": false, "data": [], "errors": ["API key expired"]}"#;
        match parse_settlements(body) {
            Err(CarrierError::Rejected(errors)) => assert_eq!(errors, vec!["API key expired"]),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_body() {
        assert!(matches!(
            parse_streets("<html>"),
            Err(CarrierError::ParseError(_))
        ));
    }

    #[test]
    fn test_client_requires_api_key() {
        let err = NovaPoshtaClient::new(&CarrierConfig::default()).unwrap_err();
        assert!(matches!(err, CarrierError::MissingApiKey));

        let client = NovaPoshtaClient::new(&CarrierConfig::default().with_api_key("k"));
        assert!(client.is_ok());
    }
}

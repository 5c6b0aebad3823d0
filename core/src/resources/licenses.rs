//! License records: conversion SKUs and license search results.

use serde_json::Value;

use crate::classify::Outcome;
use crate::client::PublicApiClient;
use crate::entity::Entity;
use crate::envelope::ResultEnvelope;
use crate::error::Error;
use crate::http::{HttpRequest, TransportOutcome};
use crate::pagination::Paging;
use crate::schema::{FieldKind, FieldSpec, Schema};

/// A SKU a license can be converted to. `seats`, `endDate`,
/// `friendlyName` and `licenseReference` only appear for existing licenses.
pub const CONVERSION_SKU: Schema = Schema {
    name: "conversionSkuResult",
    fields: &[
        FieldSpec::required("billingCycle", FieldKind::Integer),
        FieldSpec::optional("endDate", FieldKind::Text),
        FieldSpec::optional("friendlyName", FieldKind::Text),
        FieldSpec::optional("licenseReference", FieldKind::Text),
        FieldSpec::required("name", FieldKind::Text),
        FieldSpec::optional("seats", FieldKind::Integer),
        FieldSpec::required("sku", FieldKind::Text),
        FieldSpec::required("term", FieldKind::Integer),
        FieldSpec::required("totalBuyPrice", FieldKind::Number),
    ],
};

pub const LICENSE_PRICE: Schema = Schema {
    name: "licensePrice",
    fields: &[
        FieldSpec::optional("buyPrice", FieldKind::Number),
        FieldSpec::optional("listPrice", FieldKind::Number),
        FieldSpec::optional("currency", FieldKind::Text),
    ],
};

pub const LICENSE: Schema = Schema {
    name: "license",
    fields: &[
        FieldSpec::required("reference", FieldKind::Text),
        FieldSpec::required("sku", FieldKind::Text),
        FieldSpec::required("name", FieldKind::Text),
        FieldSpec::optional("seats", FieldKind::Integer),
        FieldSpec::optional("state", FieldKind::Text),
        FieldSpec::optional("autoRenew", FieldKind::Boolean),
        FieldSpec::optional("startDate", FieldKind::Text),
        FieldSpec::optional("endDate", FieldKind::Text),
        FieldSpec::optional("price", FieldKind::Record(&LICENSE_PRICE)),
        FieldSpec::optional("tags", FieldKind::List(&FieldKind::Text)),
    ],
};

/// Typed read-only view over a `CONVERSION_SKU` entity.
#[derive(Debug, Clone, Copy)]
pub struct ConversionSku<'a> {
    entity: &'a Entity,
}

impl<'a> ConversionSku<'a> {
    /// `None` when the entity was hydrated against another schema.
    pub fn view(entity: &'a Entity) -> Option<Self> {
        (entity.schema().name == CONVERSION_SKU.name).then_some(Self { entity })
    }

    pub fn billing_cycle(&self) -> i64 {
        self.entity.integer("billingCycle").unwrap_or_default()
    }

    pub fn end_date(&self) -> Option<&'a str> {
        self.entity.text("endDate")
    }

    pub fn friendly_name(&self) -> Option<&'a str> {
        self.entity.text("friendlyName")
    }

    pub fn license_reference(&self) -> Option<&'a str> {
        self.entity.text("licenseReference")
    }

    pub fn name(&self) -> &'a str {
        self.entity.text("name").unwrap_or_default()
    }

    pub fn seats(&self) -> Option<i64> {
        self.entity.integer("seats")
    }

    pub fn sku(&self) -> &'a str {
        self.entity.text("sku").unwrap_or_default()
    }

    pub fn term(&self) -> i64 {
        self.entity.integer("term").unwrap_or_default()
    }

    pub fn total_buy_price(&self) -> f64 {
        self.entity.number("totalBuyPrice").unwrap_or_default()
    }

    pub fn to_json(&self) -> Value {
        self.entity.to_json()
    }
}

/// Filters for a license search. Paging travels in the same JSON body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicenseFilters {
    pub sku: Option<String>,
    pub state: Option<String>,
}

/// License endpoints.
#[derive(Debug, Clone)]
pub struct LicensesClient {
    api: PublicApiClient,
}

impl LicensesClient {
    pub fn new(api: PublicApiClient) -> Self {
        Self { api }
    }

    pub fn build_get_conversion_skus(&self, license_reference: &str) -> HttpRequest {
        self.api
            .build_get(&format!("/licenses/{license_reference}/conversion/skus"), &Paging::Default)
    }

    pub fn parse_get_conversion_skus(
        &self,
        request: &HttpRequest,
        outcome: &TransportOutcome,
    ) -> Result<Outcome<ResultEnvelope<Vec<Entity>>>, Error> {
        self.api.parse_list(request, outcome, &CONVERSION_SKU)
    }

    pub fn build_find_licenses(&self, paging: &Paging) -> HttpRequest {
        self.api.build_get("/licenses", paging)
    }

    pub fn parse_find_licenses(
        &self,
        request: &HttpRequest,
        outcome: &TransportOutcome,
    ) -> Result<Outcome<ResultEnvelope<Vec<Entity>>>, Error> {
        self.api.parse_list(request, outcome, &LICENSE)
    }

    pub fn build_search_licenses(&self, filters: &LicenseFilters, paging: &Paging) -> Result<HttpRequest, Error> {
        let mut body = paging.body_fields();
        let filters = [("sku", &filters.sku), ("state", &filters.state)];
        for (key, value) in filters {
            if let Some(value) = value {
                body.insert(key.to_string(), Value::String(value.clone()));
            }
        }
        self.api.build_post("/licenses/search", &body)
    }

    pub fn parse_search_licenses(
        &self,
        request: &HttpRequest,
        outcome: &TransportOutcome,
    ) -> Result<Outcome<ResultEnvelope<Vec<Entity>>>, Error> {
        self.api.parse_list(request, outcome, &LICENSE)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::classify::Reply;
    use crate::http::HttpResponse;

    #[test]
    fn minimal_conversion_sku_keeps_exactly_its_keys() {
        let input = json!({"name": "Pro", "sku": "SKU1", "term": 12, "billingCycle": 1, "totalBuyPrice": 99.5});
        let entity = Entity::hydrate(&input, &CONVERSION_SKU).unwrap();
        let output = entity.to_json();

        assert_eq!(output, input);
        assert_eq!(output.as_object().unwrap().len(), 5);
        assert!(output.get("seats").is_none());
        assert!(output.get("endDate").is_none());
    }

    #[test]
    fn full_conversion_sku_round_trips() {
        let input = json!({
            "billingCycle": 1,
            "endDate": "2026-12-31",
            "friendlyName": "Office",
            "licenseReference": "XSP12345",
            "name": "Pro",
            "seats": 10,
            "sku": "SKU1",
            "term": 12,
            "totalBuyPrice": 99.5
        });
        let entity = Entity::hydrate(&input, &CONVERSION_SKU).unwrap();
        assert_eq!(entity.to_json(), input);
    }

    #[test]
    fn view_exposes_typed_accessors() {
        let input = json!({"name": "Pro", "sku": "SKU1", "term": 12, "billingCycle": 1, "totalBuyPrice": 99.5, "seats": 3});
        let entity = Entity::hydrate(&input, &CONVERSION_SKU).unwrap();
        let sku = ConversionSku::view(&entity).unwrap();

        assert_eq!(sku.name(), "Pro");
        assert_eq!(sku.sku(), "SKU1");
        assert_eq!(sku.term(), 12);
        assert_eq!(sku.billing_cycle(), 1);
        assert_eq!(sku.total_buy_price(), 99.5);
        assert_eq!(sku.seats(), Some(3));
        assert!(sku.license_reference().is_none());
        assert!(sku.end_date().is_none());
    }

    #[test]
    fn view_rejects_other_schemas() {
        let license = json!({"reference": "L1", "sku": "S", "name": "N"});
        let entity = Entity::hydrate(&license, &LICENSE).unwrap();
        assert!(ConversionSku::view(&entity).is_none());
    }

    #[test]
    fn missing_sku_is_malformed() {
        let input = json!({"name": "Pro", "term": 12, "billingCycle": 1, "totalBuyPrice": 99.5});
        let err = Entity::hydrate(&input, &CONVERSION_SKU).unwrap_err();
        assert_eq!(err.path, "sku");
    }

    #[test]
    fn conversion_skus_round_trip_through_the_client() {
        let client = LicensesClient::new(PublicApiClient::new("https://licenses.localhost"));
        let req = client.build_get_conversion_skus("XSP12345");
        assert_eq!(req.path, "https://licenses.localhost/licenses/XSP12345/conversion/skus");

        let body = json!({
            "status": 200,
            "data": [
                {"name": "Pro", "sku": "SKU1", "term": 12, "billingCycle": 1, "totalBuyPrice": 99.5},
                {"name": "Ent", "sku": "SKU2", "term": 12, "billingCycle": 12, "totalBuyPrice": 1200, "seats": 5, "licenseReference": "XSP12345"}
            ]
        });
        let outcome = TransportOutcome::Received(HttpResponse::new(200, body.to_string()));
        let parsed = client.parse_get_conversion_skus(&req, &outcome).unwrap();
        assert_eq!(parsed.to_json(), body);

        let Outcome::Success(Reply::Content(envelope)) = parsed else {
            panic!("expected content");
        };
        let seats: Vec<_> = envelope
            .data()
            .iter()
            .filter_map(ConversionSku::view)
            .map(|sku| sku.seats())
            .collect();
        assert_eq!(seats, vec![None, Some(5)]);
    }

    #[test]
    fn search_licenses_sends_paging_in_the_body() {
        let client = LicensesClient::new(PublicApiClient::new("https://licenses.localhost"));
        let filters = LicenseFilters {
            sku: Some("SKU-2".to_string()),
            state: None,
        };
        let req = client
            .build_search_licenses(&filters, &Paging::page(2, 5).unwrap())
            .unwrap();

        assert_eq!(req.path, "https://licenses.localhost/licenses/search");
        assert!(req.query.is_empty());
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"page": 2, "perPage": 5, "sku": "SKU-2"}));
    }

    #[test]
    fn search_licenses_with_cursor_and_no_filters() {
        let client = LicensesClient::new(PublicApiClient::new("https://licenses.localhost"));
        let req = client
            .build_search_licenses(&LicenseFilters::default(), &Paging::cursor("t2").unwrap())
            .unwrap();
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"cursor": "t2"}));
    }

    #[test]
    fn find_licenses_sends_paging() {
        let client = LicensesClient::new(PublicApiClient::new("https://licenses.localhost"));
        let req = client.build_find_licenses(&Paging::cursor("next-token").unwrap());
        assert_eq!(req.url(), "https://licenses.localhost/licenses?cursor=next-token");
    }
}

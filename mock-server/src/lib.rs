//! In-memory stand-in for the public API, used by the core's integration
//! tests and for manual runs.
//!
//! Every response follows the service's envelope: `{"status", "data",
//! "metadata"?}` on success, `{"status", "error"}` on failure.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const ACTIVE_CAMPAIGN: Uuid = Uuid::from_u128(0x0ce70536_a59d_4c21_b39d_272b034367fa);
pub const DEFAULT_PER_PAGE: usize = 10;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Customer {
    pub reference: String,
    pub company_name: String,
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub country_code: String,
    pub zip: String,
    pub reception_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_contact: Option<String>,
}

/// Missing keys default to empty so validation can answer 400 itself.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CreateCustomer {
    pub company_name: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub country_code: String,
    pub zip: String,
    pub reception_phone: String,
    pub website_url: Option<String>,
    pub email_contact: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UpdateCustomer {
    pub company_name: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Migration {
    pub program: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub reference: String,
    pub sku: String,
    pub name: String,
    pub seats: u32,
    pub state: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionSku {
    pub billing_cycle: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_reference: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,
    pub sku: String,
    pub term: u32,
    pub total_buy_price: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// Body of a license search: filters and paging side by side.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LicenseSearch {
    pub sku: Option<String>,
    pub state: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageMetadata {
    page: usize,
    per_page: usize,
    total: usize,
    total_pages: usize,
}

#[derive(Debug)]
pub struct Store {
    pub customers: Vec<Customer>,
    pub licenses: Vec<License>,
    pub notified: Vec<Value>,
    next_customer: usize,
}

impl Store {
    pub fn seeded() -> Self {
        let customers = ["Acme", "Globex", "Initech"]
            .iter()
            .enumerate()
            .map(|(i, name)| Customer {
                reference: format!("XSP{:05}", i + 1),
                company_name: (*name).to_string(),
                address_line1: format!("{} Main Street", i + 1),
                address_line2: None,
                city: "Paris".to_string(),
                country_code: "FR".to_string(),
                zip: "75001".to_string(),
                reception_phone: "+33100000000".to_string(),
                website_url: None,
                email_contact: None,
            })
            .collect::<Vec<_>>();
        let licenses = (1..=5)
            .map(|i| License {
                reference: format!("LIC{i:04}"),
                sku: format!("SKU-{i}"),
                name: format!("Office {i}"),
                seats: i * 5,
                state: "active".to_string(),
            })
            .collect();

        Self {
            next_customer: customers.len() + 1,
            customers,
            licenses,
            notified: Vec::new(),
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    Router::new()
        .route("/campaigns/active", get(active_campaign))
        .route("/campaigns/{id}", get(campaign_details))
        .route("/campaigns/{id}/notify", post(notify_campaign))
        .route("/customers", get(list_customers).post(create_customer))
        .route("/customers/{reference}", patch(update_customer))
        .route("/customers/{reference}/migration", post(migrate_customer))
        .route("/licenses", get(list_licenses))
        .route("/licenses/search", post(search_licenses))
        .route("/licenses/{reference}/conversion/skus", get(conversion_skus))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock public API listening");
    }
    axum::serve(listener, app()).await
}

fn success<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(json!({"status": status.as_u16(), "data": data}))).into_response()
}

fn failure(status: StatusCode, message: &str) -> Response {
    debug!(status = status.as_u16(), message, "answering with an error");
    (status, Json(json!({"status": status.as_u16(), "error": message}))).into_response()
}

fn paged<T: Serialize + Clone>(items: &[T], query: &PageQuery) -> (Vec<T>, PageMetadata) {
    let per_page = query.per_page.filter(|n| *n > 0).unwrap_or(DEFAULT_PER_PAGE);
    let page = query.page.filter(|n| *n > 0).unwrap_or(1);
    let total = items.len();
    let slice = items
        .iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .cloned()
        .collect();
    let metadata = PageMetadata {
        page,
        per_page,
        total,
        total_pages: total.div_ceil(per_page),
    };
    (slice, metadata)
}

fn campaign() -> Value {
    json!({
        "reference": ACTIVE_CAMPAIGN,
        "name": "Spring push",
        "category": "LANDING_PAGE",
        "isActivated": true,
        "startDate": "2026-03-01",
        "endDate": "2026-05-31",
        "weight": 10,
        "banners": [
            {"type": "BANNER_1", "backgroundImageUuid": "b1", "text": "Spring is here"}
        ],
        "landingPage": {
            "url": "https://example.invalid/spring",
            "footer": {"title": "Why us", "features": []}
        },
        "rules": {"locations": ["FR"]}
    })
}

async fn active_campaign() -> Response {
    success(StatusCode::OK, campaign())
}

async fn campaign_details(Path(id): Path<Uuid>) -> Response {
    if id == ACTIVE_CAMPAIGN {
        success(StatusCode::OK, campaign())
    } else {
        failure(StatusCode::NOT_FOUND, "Campaign not found")
    }
}

async fn notify_campaign(State(db): State<Db>, Path(id): Path<Uuid>, Json(input): Json<Value>) -> Response {
    if id != ACTIVE_CAMPAIGN {
        return failure(StatusCode::NOT_FOUND, "Campaign not found");
    }
    db.write().await.notified.push(input);
    StatusCode::NO_CONTENT.into_response()
}

async fn list_customers(State(db): State<Db>, Query(query): Query<PageQuery>) -> Response {
    let store = db.read().await;
    let (customers, metadata) = paged(&store.customers, &query);
    let mut body = json!({"status": 200, "data": {"customers": customers}});
    body["metadata"] = json!(metadata);
    (StatusCode::OK, Json(body)).into_response()
}

async fn create_customer(State(db): State<Db>, Json(input): Json<CreateCustomer>) -> Response {
    if input.company_name.trim().is_empty() {
        return failure(StatusCode::BAD_REQUEST, "Bad value for CompanyName");
    }
    let mut store = db.write().await;
    let reference = format!("XSP{:05}", store.next_customer);
    store.next_customer += 1;
    store.customers.push(Customer {
        reference: reference.clone(),
        company_name: input.company_name,
        address_line1: input.address_line1,
        address_line2: input.address_line2,
        city: input.city,
        country_code: input.country_code,
        zip: input.zip,
        reception_phone: input.reception_phone,
        website_url: input.website_url,
        email_contact: input.email_contact,
    });
    success(StatusCode::CREATED, json!({"reference": reference}))
}

async fn update_customer(
    State(db): State<Db>,
    Path(reference): Path<String>,
    Json(input): Json<UpdateCustomer>,
) -> Response {
    let mut store = db.write().await;
    let Some(customer) = store.customers.iter_mut().find(|c| c.reference == reference) else {
        return failure(StatusCode::NOT_FOUND, "Customer not found");
    };
    if let Some(name) = input.company_name {
        if name.trim().is_empty() {
            return failure(StatusCode::BAD_REQUEST, "Bad value for CompanyName");
        }
        customer.company_name = name;
    }
    if let Some(line) = input.address_line1 {
        customer.address_line1 = line;
    }
    if let Some(line) = input.address_line2 {
        customer.address_line2 = Some(line);
    }
    if let Some(city) = input.city {
        customer.city = city;
    }
    success(StatusCode::OK, json!({"customers": [customer.clone()]}))
}

async fn migrate_customer(
    State(db): State<Db>,
    Path(reference): Path<String>,
    Json(input): Json<Migration>,
) -> Response {
    let store = db.read().await;
    if !store.customers.iter().any(|c| c.reference == reference) {
        return failure(StatusCode::NOT_FOUND, "Customer not found");
    }
    if input.program.trim().is_empty() {
        return failure(StatusCode::BAD_REQUEST, "Bad value for program");
    }
    StatusCode::ACCEPTED.into_response()
}

async fn list_licenses(State(db): State<Db>, Query(query): Query<PageQuery>) -> Response {
    let store = db.read().await;
    let (licenses, metadata) = paged(&store.licenses, &query);
    let body = json!({"status": 200, "data": licenses, "metadata": metadata});
    (StatusCode::OK, Json(body)).into_response()
}

async fn search_licenses(State(db): State<Db>, Json(input): Json<LicenseSearch>) -> Response {
    let store = db.read().await;
    let matching: Vec<License> = store
        .licenses
        .iter()
        .filter(|l| input.sku.as_ref().is_none_or(|sku| &l.sku == sku))
        .filter(|l| input.state.as_ref().is_none_or(|state| &l.state == state))
        .cloned()
        .collect();
    let query = PageQuery {
        page: input.page,
        per_page: input.per_page,
    };
    let (licenses, metadata) = paged(&matching, &query);
    let body = json!({"status": 200, "data": licenses, "metadata": metadata});
    (StatusCode::OK, Json(body)).into_response()
}

async fn conversion_skus(State(db): State<Db>, Path(reference): Path<String>) -> Response {
    let store = db.read().await;
    let Some(license) = store.licenses.iter().find(|l| l.reference == reference) else {
        return failure(StatusCode::NOT_FOUND, "License not found");
    };
    let skus = vec![
        ConversionSku {
            billing_cycle: 1,
            end_date: None,
            friendly_name: None,
            license_reference: None,
            name: "Business Basic".to_string(),
            seats: None,
            sku: "BB-1".to_string(),
            term: 12,
            total_buy_price: 60.0,
        },
        ConversionSku {
            billing_cycle: 12,
            end_date: Some("2027-01-31".to_string()),
            friendly_name: Some(license.name.clone()),
            license_reference: Some(license.reference.clone()),
            name: "Business Premium".to_string(),
            seats: Some(license.seats),
            sku: "BP-12".to_string(),
            term: 12,
            total_buy_price: 264.5,
        },
    ];
    success(StatusCode::OK, skus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_serializes_with_pascal_case_keys() {
        let customer = Store::seeded().customers.remove(0);
        let json = serde_json::to_value(&customer).unwrap();
        assert_eq!(json["Reference"], "XSP00001");
        assert_eq!(json["CompanyName"], "Acme");
        assert_eq!(json["AddressLine1"], "1 Main Street");
        assert!(json.get("AddressLine2").is_none());
    }

    #[test]
    fn create_customer_defaults_missing_keys() {
        let input: CreateCustomer = serde_json::from_str(r#"{"City":"Lyon"}"#).unwrap();
        assert_eq!(input.city, "Lyon");
        assert!(input.company_name.is_empty());
        assert!(input.website_url.is_none());
    }

    #[test]
    fn conversion_sku_omits_unset_optionals() {
        let sku = ConversionSku {
            billing_cycle: 1,
            end_date: None,
            friendly_name: None,
            license_reference: None,
            name: "N".to_string(),
            seats: None,
            sku: "S".to_string(),
            term: 12,
            total_buy_price: 1.5,
        };
        let json = serde_json::to_value(&sku).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 5);
        assert_eq!(json["billingCycle"], 1);
        assert_eq!(json["totalBuyPrice"], 1.5);
    }

    #[test]
    fn paged_slices_and_counts() {
        let items: Vec<u32> = (0..5).collect();
        let query = PageQuery { page: Some(2), per_page: Some(2) };
        let (slice, metadata) = paged(&items, &query);
        assert_eq!(slice, vec![2, 3]);
        assert_eq!(metadata.total, 5);
        assert_eq!(metadata.total_pages, 3);
    }

    #[test]
    fn paged_past_the_end_is_empty() {
        let items: Vec<u32> = (0..3).collect();
        let (slice, metadata) = paged(&items, &PageQuery { page: Some(9), per_page: None });
        assert!(slice.is_empty());
        assert_eq!(metadata.per_page, DEFAULT_PER_PAGE);
        assert_eq!(metadata.total_pages, 1);
    }

    #[test]
    fn zero_page_falls_back_to_first() {
        let items: Vec<u32> = (0..3).collect();
        let (slice, metadata) = paged(&items, &PageQuery { page: Some(0), per_page: Some(0) });
        assert_eq!(slice.len(), 3);
        assert_eq!(metadata.page, 1);
    }

    #[test]
    fn active_campaign_reference_is_stable() {
        assert_eq!(ACTIVE_CAMPAIGN.to_string(), "0ce70536-a59d-4c21-b39d-272b034367fa");
        assert_eq!(campaign()["reference"], ACTIVE_CAMPAIGN.to_string());
    }
}

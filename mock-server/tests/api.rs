use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, ACTIVE_CAMPAIGN};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- campaigns ---

#[tokio::test]
async fn active_campaign_is_enveloped() {
    let resp = app().oneshot(get_request("/campaigns/active")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], 200);
    assert_eq!(body["data"]["reference"], ACTIVE_CAMPAIGN.to_string());
    assert_eq!(body["data"]["landingPage"]["footer"]["features"], serde_json::json!([]));
}

#[tokio::test]
async fn unknown_campaign_returns_404_with_error() {
    let resp = app()
        .oneshot(get_request("/campaigns/00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["status"], 404);
    assert_eq!(body["error"], "Campaign not found");
}

#[tokio::test]
async fn campaign_bad_uuid_returns_400() {
    let resp = app().oneshot(get_request("/campaigns/not-a-uuid")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn campaign_notify_returns_204_without_body() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            &format!("/campaigns/{ACTIVE_CAMPAIGN}/notify"),
            r#"{"emails":["a@b.c"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());
}

// --- customers ---

#[tokio::test]
async fn customers_are_paged() {
    let resp = app().oneshot(get_request("/customers?page=2&perPage=2")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let customers = body["data"]["customers"].as_array().unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0]["CompanyName"], "Initech");
    assert_eq!(body["metadata"]["page"], 2);
    assert_eq!(body["metadata"]["perPage"], 2);
    assert_eq!(body["metadata"]["total"], 3);
    assert_eq!(body["metadata"]["totalPages"], 2);
}

#[tokio::test]
async fn create_customer_returns_201_with_reference() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/customers",
            r#"{"CompanyName":"Umbrella","AddressLine1":"1 Road","City":"Nice","CountryCode":"FR","Zip":"06000","ReceptionPhone":"+33400000000"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["status"], 201);
    assert_eq!(body["data"]["reference"], "XSP00004");
}

#[tokio::test]
async fn create_customer_without_company_name_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/customers", r#"{"CompanyName":""}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body, serde_json::json!({"status": 400, "error": "Bad value for CompanyName"}));
}

#[tokio::test]
async fn update_unknown_customer_returns_404() {
    let resp = app()
        .oneshot(json_request("PATCH", "/customers/NOPE", r#"{"City":"Lyon"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn migration_is_accepted_or_rejected() {
    let accepted = app()
        .oneshot(json_request("POST", "/customers/XSP00001/migration", r#"{"program":"csp"}"#))
        .await
        .unwrap();
    assert_eq!(accepted.status(), StatusCode::ACCEPTED);
    assert!(body_bytes(accepted).await.is_empty());

    let rejected = app()
        .oneshot(json_request("POST", "/customers/XSP00001/migration", r#"{"program":""}"#))
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(rejected).await["error"], "Bad value for program");
}

// --- licenses ---

#[tokio::test]
async fn licenses_list_carries_metadata() {
    let resp = app().oneshot(get_request("/licenses?perPage=2")).await.unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["metadata"]["totalPages"], 3);
}

#[tokio::test]
async fn license_search_filters_and_pages_from_the_body() {
    let resp = app()
        .oneshot(json_request("POST", "/licenses/search", r#"{"state":"active","page":2,"perPage":2}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"][0]["reference"], "LIC0003");
    assert_eq!(body["metadata"]["page"], 2);
    assert_eq!(body["metadata"]["total"], 5);

    let resp = app()
        .oneshot(json_request("POST", "/licenses/search", r#"{"sku":"SKU-4"}"#))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["reference"], "LIC0004");
}

#[tokio::test]
async fn conversion_skus_for_known_license() {
    let resp = app()
        .oneshot(get_request("/licenses/LIC0002/conversion/skus"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let skus = body["data"].as_array().unwrap();
    assert_eq!(skus.len(), 2);
    assert!(skus[0].get("seats").is_none());
    assert_eq!(skus[1]["seats"], 10);
    assert_eq!(skus[1]["licenseReference"], "LIC0002");
}

#[tokio::test]
async fn conversion_skus_for_unknown_license_returns_404() {
    let resp = app()
        .oneshot(get_request("/licenses/LIC9999/conversion/skus"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- stateful lifecycle ---

#[tokio::test]
async fn created_customer_can_be_updated_and_listed() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/customers", r#"{"CompanyName":"Hooli","City":"Palo Alto"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let reference = body_json(resp).await["data"]["reference"].as_str().unwrap().to_string();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PATCH", &format!("/customers/{reference}"), r#"{"City":"Mountain View"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json(resp).await;
    assert_eq!(updated["data"]["customers"][0]["City"], "Mountain View");
    assert_eq!(updated["data"]["customers"][0]["CompanyName"], "Hooli");

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/customers"))
        .await
        .unwrap();
    let listed = body_json(resp).await;
    assert_eq!(listed["metadata"]["total"], 4);
    assert_eq!(listed["data"]["customers"][3]["Reference"], reference);
}

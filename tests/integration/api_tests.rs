//! API integration tests

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use lending_server::{
    api,
    clock::FixedClock,
    config::AppConfig,
    repository::{Library, Repository},
    seed::SeedData,
    services::Services,
    AppState,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Router over the demo library, with "today" pinned
fn app(today: NaiveDate) -> Router {
    let mut library = Library::default();
    SeedData::demo().apply(&mut library).unwrap();
    let services = Services::new(Repository::new(library), Arc::new(FixedClock(today)));
    api::router(AppState {
        config: Arc::new(AppConfig::default()),
        services: Arc::new(services),
    })
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn json_call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = call(app, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn money(value: &Value) -> Decimal {
    value.as_str().expect("money is serialized as a string").parse().unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = app(date(2021, 3, 1));
    let (status, body) = json_call(&app, Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = json_call(&app, Method::GET, "/api/v1/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = app(date(2021, 3, 1));
    let (status, body) = json_call(&app, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/members/{id}/borrow"].is_object());
}

#[tokio::test]
async fn test_catalog_endpoints() {
    let app = app(date(2021, 3, 1));

    let (status, items) = json_call(&app, Method::GET, "/api/v1/items", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(items.as_array().unwrap().len(), 4);
    assert_eq!(items[0]["title"], "The Road to Forget");
    assert_eq!(items[0]["nb_copies"], 2);

    let (status, item) = json_call(&app, Method::GET, "/api/v1/items/dark%20knight", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["media_type"], "book");
    assert_eq!(item["authors"], json!(["Allyson Day"]));

    let (status, error) = json_call(&app, Method::GET, "/api/v1/items/Unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], 5);

    let (status, created) = json_call(
        &app,
        Method::POST,
        "/api/v1/items",
        Some(json!({
            "title": "Rust in Action",
            "year_published": 2021,
            "cost": "40.50",
            "media_type": "book",
            "authors": ["Tim McNamara"],
            "copies": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["nb_available"], 1);

    let (status, _) = json_call(
        &app,
        Method::POST,
        "/api/v1/items",
        Some(json!({ "title": "rust in action", "year_published": 2021, "cost": "1", "media_type": "media" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, copies) = json_call(
        &app,
        Method::POST,
        "/api/v1/items/Rust%20in%20Action/copies",
        Some(json!({ "count": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(copies[0]["copy_id"], 11);
    assert_eq!(copies[1]["copy_id"], 12);

    let (_, copies) = json_call(&app, Method::GET, "/api/v1/items/Rust%20in%20Action/copies", None).await;
    assert_eq!(copies.as_array().unwrap().len(), 3);

    let (status, copy) = json_call(&app, Method::GET, "/api/v1/copies/6", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(copy["item"]["title"], "Dark Knight");
    assert_eq!(copy["available"], true);

    let (status, error) = json_call(&app, Method::GET, "/api/v1/copies/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], 13);
}

#[tokio::test]
async fn test_member_registration() {
    let app = app(date(2021, 3, 1));

    let (status, member) = json_call(
        &app,
        Method::POST,
        "/api/v1/members",
        Some(json!({ "member_id": "j222", "name": "Leo", "kind": "junior" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(member["member_id"], "J222");
    assert_eq!(member["quota"], 2);

    let (status, _) = json_call(
        &app,
        Method::POST,
        "/api/v1/members",
        Some(json!({ "member_id": "S123", "name": "Other" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = json_call(
        &app,
        Method::POST,
        "/api/v1/members",
        Some(json!({ "member_id": "", "name": "Nobody" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, members) = json_call(&app, Method::GET, "/api/v1/members", None).await;
    assert_eq!(members.as_array().unwrap().len(), 3);

    let (status, error) = json_call(&app, Method::GET, "/api/v1/members/X999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], 4);
}

#[tokio::test]
async fn test_borrow_renew_return_pay() {
    let app = app(date(2021, 3, 22));

    for copy_id in [1, 3, 6, 8] {
        let (status, body) = json_call(
            &app,
            Method::POST,
            "/api/v1/members/S123/borrow",
            Some(json!({ "copy_id": copy_id, "date": "2021-03-01" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "copy {}", copy_id);
        assert_eq!(body["loan"]["copy_id"], copy_id);
    }

    // quota of four reached
    let (status, error) = json_call(
        &app,
        Method::POST,
        "/api/v1/members/S123/borrow",
        Some(json!({ "copy_id": 2, "date": "2021-03-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["code"], 11);

    // copy already out
    let (status, error) = json_call(
        &app,
        Method::POST,
        "/api/v1/members/J111/borrow",
        Some(json!({ "copy_id": 8, "date": "2021-03-03" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], 7);

    let (status, body) = json_call(
        &app,
        Method::POST,
        "/api/v1/members/J111/borrow",
        Some(json!({ "copy_id": 9, "date": "2021-03-03" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["loan"]["due_date"], "2021-03-06");

    let (status, loan) = json_call(
        &app,
        Method::POST,
        "/api/v1/members/J111/renew",
        Some(json!({ "title": "powerpoint presentation tips", "date": "2021-03-05" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loan["due_date"], "2021-03-09");
    assert_eq!(loan["nb_renews"], 1);

    let (status, returned) = json_call(
        &app,
        Method::POST,
        "/api/v1/members/S123/return",
        Some(json!({ "title": "Dark Knight", "date": "2021-03-17" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["status"], "returned");
    assert_eq!(money(&returned["amount_owed"]), Decimal::new(50, 2));

    // outstanding fines block borrowing
    let (status, error) = json_call(
        &app,
        Method::POST,
        "/api/v1/members/S123/borrow",
        Some(json!({ "copy_id": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(money(&error["amount"]), Decimal::new(50, 2));

    let (status, paid) = json_call(
        &app,
        Method::POST,
        "/api/v1/members/S123/payments",
        Some(json!({ "amount": "2.00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(money(&paid["change"]), Decimal::new(150, 2));
    assert_eq!(money(&paid["amount_owed"]), Decimal::ZERO);

    let (status, body) = json_call(
        &app,
        Method::POST,
        "/api/v1/members/S123/borrow",
        Some(json!({ "copy_id": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["loan"]["loan_date"], "2021-03-22");

    // returned 8 days after the renewed due date, media fine 2.50 a day
    let (_, returned) = json_call(
        &app,
        Method::POST,
        "/api/v1/members/J111/return",
        Some(json!({ "title": "Powerpoint Presentation Tips", "date": "2021-03-17" })),
    )
    .await;
    assert_eq!(money(&returned["amount_owed"]), Decimal::from(20));

    let (status, error) = json_call(
        &app,
        Method::POST,
        "/api/v1/members/J111/return",
        Some(json!({ "title": "Powerpoint Presentation Tips", "date": "2021-03-18" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        error["message"],
        "Item: Powerpoint Presentation Tips has been returned on 17 Mar 2021"
    );

    let (_, present) = json_call(&app, Method::GET, "/api/v1/members/S123/loans", None).await;
    assert_eq!(present.as_array().unwrap().len(), 4);
    let (_, past) = json_call(&app, Method::GET, "/api/v1/members/S123/loans?scope=past", None).await;
    assert_eq!(past.as_array().unwrap().len(), 1);
    assert_eq!(past[0]["title"], "Dark Knight");
    let (_, all) = json_call(&app, Method::GET, "/api/v1/members/s123/loans?scope=all", None).await;
    assert_eq!(all.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_renewal_after_due_date_refused() {
    let app = app(date(2021, 3, 20));
    json_call(
        &app,
        Method::POST,
        "/api/v1/members/S123/borrow",
        Some(json!({ "copy_id": 1, "date": "2021-03-01" })),
    )
    .await;

    let (status, error) = json_call(
        &app,
        Method::POST,
        "/api/v1/members/S123/renew",
        Some(json!({ "title": "The Road to Forget" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        error["message"],
        "Date of renewal on 20 Mar 2021 exceed the existing due date on 15 Mar 2021"
    );

    let (status, error) = json_call(
        &app,
        Method::POST,
        "/api/v1/members/S123/renew",
        Some(json!({ "title": "Dark Knight" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["message"], "There is no loan recorded for Dark Knight");

    let (_, overdue) = json_call(&app, Method::GET, "/api/v1/loans/overdue", None).await;
    assert_eq!(overdue.as_array().unwrap().len(), 1);
    assert_eq!(overdue[0]["days_overdue"], 5);
}

#[tokio::test]
async fn test_report_lost_charges_member() {
    let app = app(date(2021, 3, 10));
    json_call(
        &app,
        Method::POST,
        "/api/v1/members/J111/borrow",
        Some(json!({ "copy_id": 6, "date": "2021-03-01" })),
    )
    .await;

    let (status, lost) = json_call(
        &app,
        Method::POST,
        "/api/v1/members/J111/lost",
        Some(json!({ "title": "Dark Knight" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lost["status"], "lost");
    assert_eq!(lost["loan"]["lost"], true);
    // 2021 book from 2010: floor admin rate 10% of 29.00, plus the cost
    assert_eq!(money(&lost["amount_owed"]), Decimal::new(3190, 2));

    let (_, copy) = json_call(&app, Method::GET, "/api/v1/copies/6", None).await;
    assert_eq!(copy["status"], "lost");
    assert_eq!(copy["available"], false);

    let (_, available) = json_call(&app, Method::GET, "/api/v1/copies?available=true", None).await;
    assert_eq!(available.as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_out_of_range_values_refused() {
    let app = app(date(2021, 3, 1));

    let (status, error) = json_call(
        &app,
        Method::POST,
        "/api/v1/members/S123/borrow",
        Some(json!({ "copy_id": 1, "date": NaiveDate::MAX.to_string() })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], 18);
    let (_, copy) = json_call(&app, Method::GET, "/api/v1/copies/1", None).await;
    assert_eq!(copy["available"], true);

    let (status, _) = json_call(
        &app,
        Method::POST,
        "/api/v1/items",
        Some(json!({
            "title": "Gold Tape",
            "year_published": 2020,
            "cost": "79228162514264337593543950335",
            "media_type": "media"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = json_call(&app, Method::GET, "/api/v1/items/Gold%20Tape", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_remove_member() {
    let app = app(date(2021, 3, 1));
    json_call(
        &app,
        Method::POST,
        "/api/v1/members/J111/borrow",
        Some(json!({ "copy_id": 3 })),
    )
    .await;

    let (status, error) = json_call(&app, Method::DELETE, "/api/v1/members/J111", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], 21);

    let (status, _) = call(&app, Method::DELETE, "/api/v1/members/S123", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, Method::GET, "/api/v1/members/S123", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_and_reports() {
    let app = app(date(2021, 3, 20));
    json_call(
        &app,
        Method::POST,
        "/api/v1/members/S123/borrow",
        Some(json!({ "copy_id": 1, "date": "2021-03-01" })),
    )
    .await;
    json_call(
        &app,
        Method::POST,
        "/api/v1/members/J111/borrow",
        Some(json!({ "copy_id": 3, "date": "2021-03-19" })),
    )
    .await;

    let (status, stats) = json_call(&app, Method::GET, "/api/v1/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["items"], 4);
    assert_eq!(stats["copies"], 9);
    assert_eq!(stats["available_copies"], 7);
    assert_eq!(stats["members"], 2);
    assert_eq!(stats["active_loans"], 2);
    assert_eq!(stats["overdue_loans"], 1);
    assert_eq!(money(&stats["fines_owed"]), Decimal::ZERO);

    let (status, report) = call(&app, Method::GET, "/api/v1/report", None).await;
    assert_eq!(status, StatusCode::OK);
    let report = String::from_utf8(report).unwrap();
    assert!(report.contains("Dark Knight 2010 Cost: $29.00"));
    assert!(report.contains("Id: S123 John"));

    let (status, statement) = call(&app, Method::GET, "/api/v1/members/S123/report", None).await;
    assert_eq!(status, StatusCode::OK);
    let statement = String::from_utf8(statement).unwrap();
    assert!(statement.starts_with("Id: S123 John Owed: $0.00"));
    assert!(statement.ends_with("Outstanding loans: 1"));
}

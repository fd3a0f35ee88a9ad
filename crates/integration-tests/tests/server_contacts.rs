//! Integration tests for the contacts API.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p copperline-server)
//!
//! Run with: cargo test -p copperline-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::json;

use copperline_integration_tests::TestContext;

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_contact_create_persists_trimmed_fields() {
    let ctx = TestContext::signed_up().await;

    let (status, body) = ctx
        .post(
            "/api/contacts",
            &json!({
                "name": "  John Doe  ",
                "email": " john@example.com ",
                "company": "   "
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["contact"]["name"], "John Doe");
    assert_eq!(body["contact"]["email"], "john@example.com");
    // Blank optional fields collapse to null rather than empty strings.
    assert!(body["contact"]["company"].is_null());
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_contact_create_rejects_blank_name() {
    let ctx = TestContext::signed_up().await;

    let (status, body) = ctx.post("/api/contacts", &json!({ "name": "" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name is required");
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_contact_search_and_count() {
    let ctx = TestContext::signed_up().await;

    for (name, company) in [
        ("Ada Lovelace", "Analytical Engines Ltd"),
        ("Charles Babbage", "Analytical Engines Ltd"),
        ("Grace Hopper", "Navy"),
    ] {
        let (status, _) = ctx
            .post("/api/contacts", &json!({ "name": name, "company": company }))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    // Case-insensitive substring search across name/email/company.
    let (_, found) = ctx.get("/api/contacts?search=lovelace").await;
    assert_eq!(found.as_array().map(Vec::len), Some(1));
    assert_eq!(found[0]["name"], "Ada Lovelace");

    let (_, count) = ctx.get("/api/contacts/count?company=Navy").await;
    assert_eq!(count, json!(1));

    let (_, companies) = ctx.get("/api/companies").await;
    assert_eq!(
        companies,
        json!(["Analytical Engines Ltd", "Navy"])
    );
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_contact_delete_then_get_is_not_found() {
    let ctx = TestContext::signed_up().await;

    let (_, created) = ctx
        .post("/api/contacts", &json!({ "name": "Ada Lovelace" }))
        .await;
    let id = created["contact"]["id"].as_str().expect("contact id").to_owned();

    let (status, deleted) = ctx.delete(&format!("/api/contacts/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["success"], true);

    let (status, _) = ctx.get(&format!("/api/contacts/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_users_cannot_see_each_other() {
    let alice = TestContext::signed_up().await;
    let bob = TestContext::signed_up().await;

    let (_, created) = alice
        .post("/api/contacts", &json!({ "name": "Alice's Contact" }))
        .await;
    let id = created["contact"]["id"].as_str().expect("contact id").to_owned();

    // Bob can neither read nor delete Alice's row, even with its id.
    let (status, _) = bob.get(&format!("/api/contacts/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = bob.delete(&format!("/api/contacts/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, contacts) = bob.get("/api/contacts").await;
    assert_eq!(contacts.as_array().map(Vec::len), Some(0));
}

//! End-to-end tests simulating API clients
//!
//! These tests drive the full router (extractors, access policy, validators,
//! in-memory stores) over HTTP with `axum-test`.

use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use serde_json::{Value, json};
use std::sync::Arc;
use stockroom::prelude::*;

const SECRET: &str = "e2e-test-secret-value";

// =============================================================================
// Test Setup
// =============================================================================

/// Reversible stand-in for Argon2 so the suite stays fast
struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        Ok(format!("plain${}", plaintext))
    }

    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        hash.strip_prefix("plain$") == Some(plaintext)
    }
}

fn seed() -> SeedConfig {
    SeedConfig {
        admin: Some(SeedAdmin {
            username: "admin".to_string(),
            password: "admin123".to_string(),
            email: Some("admin@example.com".to_string()),
        }),
        items: vec![
            SeedItem {
                name: "Wireless Mouse".to_string(),
                description: "Ergonomic wireless mouse".to_string(),
                quantity: 45,
                price: 99.99,
            },
            SeedItem {
                name: "Webcam".to_string(),
                description: "Full HD webcam".to_string(),
                quantity: 5,
                price: 79.99,
            },
            SeedItem {
                name: "Cable Kit".to_string(),
                description: "Clips and sleeves".to_string(),
                quantity: 3,
                price: 19.99,
            },
        ],
    }
}

async fn create_test_server() -> TestServer {
    let mut builder = ServerBuilder::new()
        .with_auth_provider(JwtAuthProvider::new(SECRET, 1))
        .with_hasher(PlainHasher);
    let host = Arc::new(builder.build_host().expect("host"));
    stockroom::seed::run(&host, &seed()).await.expect("seed");

    let app = RestExposure::build_router(host, vec![]).expect("router");
    TestServer::try_new(app).expect("Failed to create test server")
}

async fn login(server: &TestServer, username: &str, password: &str) -> String {
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "username": username, "password": password }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()["data"]["token"]
        .as_str()
        .expect("token")
        .to_string()
}

async fn admin_token(server: &TestServer) -> String {
    login(server, "admin", "admin123").await
}

/// Register a staff account and return `(id, token)`
async fn staff_account(server: &TestServer, admin: &str) -> (i64, String) {
    let response = server
        .post("/api/auth/register")
        .authorization_bearer(admin)
        .json(&json!({
            "username": "sam",
            "email": "sam@example.com",
            "password": "staff123",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let id = response.json::<Value>()["data"]["user"]["id"]
        .as_i64()
        .expect("id");
    (id, login(server, "sam", "staff123").await)
}

fn body(response: &TestResponse) -> Value {
    response.json::<Value>()
}

// =============================================================================
// Public Routes
// =============================================================================

mod public_routes {
    use super::*;

    #[tokio::test]
    async fn test_welcome_and_health() {
        let server = create_test_server().await;

        server.get("/").await.assert_status_ok();

        let response = server.get("/api/health").await;
        response.assert_status_ok();
        let json = body(&response);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["data"]["items"], 3);
    }

    #[tokio::test]
    async fn test_unknown_route_returns_json_404() {
        let server = create_test_server().await;

        let response = server.get("/api/nope").await;
        response.assert_status(StatusCode::NOT_FOUND);
        let json = body(&response);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Route not found");
        assert_eq!(json["path"], "/api/nope");
    }
}

// =============================================================================
// Authentication
// =============================================================================

mod authentication {
    use super::*;

    #[tokio::test]
    async fn test_login_returns_token_and_user() {
        let server = create_test_server().await;

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "username": "admin", "password": "admin123" }))
            .await;
        response.assert_status_ok();
        let json = body(&response);
        assert!(json["data"]["token"].is_string());
        assert_eq!(json["data"]["user"]["role"], "admin");
        assert!(json["data"]["user"].get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn test_login_failures_share_one_message() {
        let server = create_test_server().await;

        let wrong_password = server
            .post("/api/auth/login")
            .json(&json!({ "username": "admin", "password": "nope123" }))
            .await;
        wrong_password.assert_status(StatusCode::UNAUTHORIZED);

        let unknown_user = server
            .post("/api/auth/login")
            .json(&json!({ "username": "ghost", "password": "admin123" }))
            .await;
        unknown_user.assert_status(StatusCode::UNAUTHORIZED);

        assert_eq!(body(&wrong_password)["message"], "Invalid username or password");
        assert_eq!(body(&wrong_password)["message"], body(&unknown_user)["message"]);
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let server = create_test_server().await;

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "username": "admin" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(body(&response)["details"]["fields"][0]["field"], "password");
    }

    #[tokio::test]
    async fn test_protected_routes_require_a_valid_token() {
        let server = create_test_server().await;

        server
            .get("/api/items")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        server
            .get("/api/items")
            .authorization_bearer("not-a-jwt")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_me_returns_the_caller() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let (staff_id, staff) = staff_account(&server, &admin).await;

        let response = server.get("/api/auth/me").authorization_bearer(&staff).await;
        response.assert_status_ok();
        assert_eq!(body(&response)["data"]["user"]["id"], staff_id);

        let response = server.get("/api/users/me").authorization_bearer(&staff).await;
        response.assert_status_ok();
        assert_eq!(body(&response)["data"]["user"]["username"], "sam");
    }

    #[tokio::test]
    async fn test_register_is_admin_only_and_unique() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let (_, staff) = staff_account(&server, &admin).await;

        server
            .post("/api/auth/register")
            .authorization_bearer(&staff)
            .json(&json!({ "username": "eve", "password": "secret1" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let duplicate = server
            .post("/api/auth/register")
            .authorization_bearer(&admin)
            .json(&json!({ "username": "sam", "password": "secret1" }))
            .await;
        duplicate.assert_status(StatusCode::CONFLICT);
        assert_eq!(body(&duplicate)["message"], "duplicate username");

        let short = server
            .post("/api/auth/register")
            .authorization_bearer(&admin)
            .json(&json!({ "username": "eve", "password": "123" }))
            .await;
        short.assert_status(StatusCode::BAD_REQUEST);
    }
}

// =============================================================================
// Items
// =============================================================================

mod items {
    use super::*;

    #[tokio::test]
    async fn test_admin_create_then_duplicate() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;

        let response = server
            .post("/api/items")
            .authorization_bearer(&admin)
            .json(&json!({ "name": "Widget", "quantity": 5, "price": 9.99 }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let json = body(&response);
        assert_eq!(json["message"], "Item created successfully");
        assert_eq!(json["data"]["item"]["name"], "Widget");
        assert_eq!(json["data"]["item"]["description"], "");
        assert_eq!(json["data"]["item"]["quantity"], 5);
        assert_eq!(json["data"]["item"]["price"], 9.99);

        let duplicate = server
            .post("/api/items")
            .authorization_bearer(&admin)
            .json(&json!({ "name": "Widget", "quantity": 1, "price": 1.0 }))
            .await;
        duplicate.assert_status(StatusCode::CONFLICT);
        assert_eq!(body(&duplicate)["message"], "duplicate name");
    }

    #[tokio::test]
    async fn test_create_normalizes_input() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;

        let response = server
            .post("/api/items")
            .authorization_bearer(&admin)
            .json(&json!({ "name": "  Drill  ", "quantity": "12", "price": "24.999" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let item = &body(&response)["data"]["item"];
        assert_eq!(item["name"], "Drill");
        assert_eq!(item["quantity"], 12);
        assert_eq!(item["price"], 25.0);
    }

    #[tokio::test]
    async fn test_name_length_and_quantity_boundaries() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;

        let short = server
            .post("/api/items")
            .authorization_bearer(&admin)
            .json(&json!({ "name": "A" }))
            .await;
        short.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(body(&short)["details"]["fields"][0]["field"], "name");

        server
            .post("/api/items")
            .authorization_bearer(&admin)
            .json(&json!({ "name": "AB", "quantity": 0 }))
            .await
            .assert_status(StatusCode::CREATED);

        let negative = server
            .post("/api/items")
            .authorization_bearer(&admin)
            .json(&json!({ "name": "Negative", "quantity": -1 }))
            .await;
        negative.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            body(&negative)["details"]["fields"][0]["message"],
            "invalid quantity"
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;

        let response = server
            .post("/api/items")
            .authorization_bearer(&admin)
            .json(&json!(["not", "an", "object"]))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(body(&response)["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_staff_cannot_create_or_delete() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let (_, staff) = staff_account(&server, &admin).await;

        server
            .post("/api/items")
            .authorization_bearer(&staff)
            .json(&json!({ "name": "Widget" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        server
            .delete("/api/items/1")
            .authorization_bearer(&staff)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_staff_quantity_update() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let (_, staff) = staff_account(&server, &admin).await;

        let response = server
            .put("/api/items/2")
            .authorization_bearer(&staff)
            .json(&json!({ "quantity": "7" }))
            .await;
        response.assert_status_ok();
        assert_eq!(body(&response)["data"]["item"]["quantity"], 7);
        assert_eq!(body(&response)["data"]["item"]["name"], "Webcam");
    }

    #[tokio::test]
    async fn test_staff_restricted_update_leaves_item_unchanged() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let (_, staff) = staff_account(&server, &admin).await;

        let response = server
            .put("/api/items/2")
            .authorization_bearer(&staff)
            .json(&json!({ "name": "Renamed", "quantity": 1 }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(body(&response)["code"], "AUTHORIZATION_DENIED");

        let item = server.get("/api/items/2").authorization_bearer(&staff).await;
        item.assert_status_ok();
        assert_eq!(body(&item)["data"]["item"]["name"], "Webcam");
        assert_eq!(body(&item)["data"]["item"]["quantity"], 5);
    }

    #[tokio::test]
    async fn test_update_edge_cases() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let (_, staff) = staff_account(&server, &admin).await;

        server
            .put("/api/items/1")
            .authorization_bearer(&admin)
            .json(&json!({}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .put("/api/items/999")
            .authorization_bearer(&admin)
            .json(&json!({ "quantity": 1 }))
            .await
            .assert_status(StatusCode::NOT_FOUND);

        // refused before the lookup, so staff learn nothing about the id
        server
            .put("/api/items/999")
            .authorization_bearer(&staff)
            .json(&json!({ "price": 1 }))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        // unchanged name is not a duplicate of itself
        server
            .put("/api/items/1")
            .authorization_bearer(&admin)
            .json(&json!({ "name": "Wireless Mouse", "price": 89.5 }))
            .await
            .assert_status_ok();

        server
            .put("/api/items/1")
            .authorization_bearer(&admin)
            .json(&json!({ "name": "Webcam" }))
            .await
            .assert_status(StatusCode::CONFLICT);

        server
            .get("/api/items/abc")
            .authorization_bearer(&admin)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_delete_returns_summary() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;

        let response = server.delete("/api/items/3").authorization_bearer(&admin).await;
        response.assert_status_ok();
        let deleted = &body(&response)["data"]["deletedItem"];
        assert_eq!(deleted["id"], 3);
        assert_eq!(deleted["name"], "Cable Kit");
        assert_eq!(deleted["price"], 19.99);

        server
            .delete("/api/items/3")
            .authorization_bearer(&admin)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_search_and_low_stock() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let (_, staff) = staff_account(&server, &admin).await;

        let list = server.get("/api/items").authorization_bearer(&staff).await;
        list.assert_status_ok();
        let json = body(&list);
        assert_eq!(json["data"]["count"], 3);
        assert_eq!(json["data"]["items"][0]["name"], "Cable Kit");

        let search = server
            .get("/api/items/search?query=WEB&maxPrice=80")
            .authorization_bearer(&staff)
            .await;
        search.assert_status_ok();
        let json = body(&search);
        assert_eq!(json["message"], "Search completed successfully");
        assert_eq!(json["data"]["count"], 1);
        assert_eq!(json["data"]["items"][0]["name"], "Webcam");
        assert_eq!(json["data"]["filters"]["query"], "WEB");

        let low = server
            .get("/api/items/low-stock")
            .authorization_bearer(&staff)
            .await;
        low.assert_status_ok();
        let json = body(&low);
        assert_eq!(json["data"]["threshold"], 10);
        assert_eq!(json["data"]["count"], 2);
        assert_eq!(json["data"]["items"][0]["name"], "Cable Kit");

        server
            .get("/api/items/low-stock?threshold=lots")
            .authorization_bearer(&staff)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}

// =============================================================================
// Users
// =============================================================================

mod users {
    use super::*;

    #[tokio::test]
    async fn test_user_listing_is_admin_only() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let (staff_id, staff) = staff_account(&server, &admin).await;

        server
            .get("/api/users")
            .authorization_bearer(&staff)
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let list = server.get("/api/users").authorization_bearer(&admin).await;
        list.assert_status_ok();
        assert_eq!(body(&list)["data"]["count"], 2);

        let one = server
            .get(&format!("/api/users/{}", staff_id))
            .authorization_bearer(&admin)
            .await;
        one.assert_status_ok();
        assert_eq!(body(&one)["data"]["user"]["role"], "staff");
    }

    #[tokio::test]
    async fn test_admin_cannot_delete_or_demote_self() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;

        let delete = server.delete("/api/users/1").authorization_bearer(&admin).await;
        delete.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(
            body(&delete)["details"]["denials"][0]["reason"],
            "OWN_ACCOUNT"
        );

        server
            .put("/api/users/1/role")
            .authorization_bearer(&admin)
            .json(&json!({ "role": "staff" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        server.get("/api/auth/me").authorization_bearer(&admin).await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_role_change() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let (staff_id, staff) = staff_account(&server, &admin).await;
        let path = format!("/api/users/{}/role", staff_id);

        server
            .put(&path)
            .authorization_bearer(&staff)
            .json(&json!({ "role": "admin" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        server
            .put(&path)
            .authorization_bearer(&admin)
            .json(&json!({ "role": "ADMIN" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .put(&path)
            .authorization_bearer(&admin)
            .json(&json!({ "role": "admin" }))
            .await;
        response.assert_status_ok();
        assert_eq!(body(&response)["data"]["user"]["role"], "admin");

        server
            .put("/api/users/999/role")
            .authorization_bearer(&admin)
            .json(&json!({ "role": "admin" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_password_reset() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let (staff_id, _) = staff_account(&server, &admin).await;

        server
            .put(&format!("/api/users/{}/password", staff_id))
            .authorization_bearer(&admin)
            .json(&json!({ "newPassword": "reset456" }))
            .await
            .assert_status_ok();

        login(&server, "sam", "reset456").await;
    }

    #[tokio::test]
    async fn test_own_password_change() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let (_, staff) = staff_account(&server, &admin).await;

        let wrong = server
            .put("/api/users/me/password")
            .authorization_bearer(&staff)
            .json(&json!({ "currentPassword": "guess99", "newPassword": "changed1" }))
            .await;
        wrong.assert_status(StatusCode::FORBIDDEN);

        server
            .put("/api/users/me/password")
            .authorization_bearer(&staff)
            .json(&json!({ "currentPassword": "staff123", "newPassword": "tiny" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .put("/api/users/me/password")
            .authorization_bearer(&staff)
            .json(&json!({ "currentPassword": "staff123", "newPassword": "changed1" }))
            .await;
        response.assert_status_ok();
        assert_eq!(body(&response)["message"], "Password updated successfully");

        login(&server, "sam", "changed1").await;
    }

    #[tokio::test]
    async fn test_admin_deletes_staff() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let (staff_id, _) = staff_account(&server, &admin).await;

        let response = server
            .delete(&format!("/api/users/{}", staff_id))
            .authorization_bearer(&admin)
            .await;
        response.assert_status_ok();
        assert_eq!(body(&response)["data"]["deletedUser"]["username"], "sam");

        server
            .post("/api/auth/login")
            .json(&json!({ "username": "sam", "password": "staff123" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_role_and_deletion_apply_to_issued_tokens() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;

        let response = server
            .post("/api/auth/register")
            .authorization_bearer(&admin)
            .json(&json!({
                "username": "boss",
                "email": "boss@example.com",
                "password": "boss1234",
                "role": "admin",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let boss_id = body(&response)["data"]["user"]["id"].as_i64().expect("id");
        let boss = login(&server, "boss", "boss1234").await;

        server
            .put(&format!("/api/users/{}/role", boss_id))
            .authorization_bearer(&admin)
            .json(&json!({ "role": "staff" }))
            .await
            .assert_status_ok();

        server
            .post("/api/items")
            .authorization_bearer(&boss)
            .json(&json!({ "name": "Desk Lamp", "quantity": 2, "price": 24.5 }))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let me = server.get("/api/auth/me").authorization_bearer(&boss).await;
        me.assert_status_ok();
        assert_eq!(body(&me)["data"]["user"]["role"], "staff");

        server
            .delete(&format!("/api/users/{}", boss_id))
            .authorization_bearer(&admin)
            .await
            .assert_status_ok();

        server
            .post("/api/items")
            .authorization_bearer(&boss)
            .json(&json!({ "name": "Desk Lamp", "quantity": 2, "price": 24.5 }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .get("/api/items")
            .authorization_bearer(&boss)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}

//! API integration tests
//!
//! These tests expect a running server seeded with the sample data
//! (`cargo run --bin seed`). Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Login and return the bearer token for the given sample user
async fn get_token(client: &Client, username: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin_user",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_me_reports_role_and_permissions() {
    let client = Client::new();
    let token = get_token(&client, "admin_user").await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["user"]["username"], "admin_user");
    assert_eq!(body["role"], "admin");
    let permissions = body["permissions"].as_array().expect("permissions array");
    assert!(permissions.iter().any(|p| p == "book.edit"));
}

#[tokio::test]
#[ignore]
async fn test_registration_creates_member_profile() {
    let client = Client::new();
    let username = format!("reg_test_{}", std::process::id());

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "a-long-password"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    // The fresh account has exactly the default member role and no grants
    let token = {
        let response = client
            .post(format!("{}/auth/login", BASE_URL))
            .json(&json!({ "username": username, "password": "a-long-password" }))
            .send()
            .await
            .expect("Failed to login as fresh user");
        let body: Value = response.json().await.expect("Failed to parse response");
        body["token"].as_str().expect("No token").to_string()
    };

    let me: Value = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(me["role"], "member");
    assert_eq!(me["permissions"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore]
async fn test_registration_rejects_duplicate_username() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": "member_user",
            "password": "a-long-password"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_edit_without_permission_is_forbidden() {
    let client = Client::new();
    // member_user belongs to no group and holds no direct grants
    let token = get_token(&client, "member_user").await;

    let response = client
        .put(format!("{}/books/1", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "title": "Hijacked Title" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_open_admin_dashboard() {
    let client = Client::new();
    let token = get_token(&client, "member_user").await;

    let response = client
        .get(format!("{}/dashboard/admin", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_admin_dashboard_counts() {
    let client = Client::new();
    let token = get_token(&client, "admin_user").await;

    let response = client
        .get(format!("{}/dashboard/admin", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["users"].as_i64().unwrap() >= 3);
    assert!(body["books"].as_i64().unwrap() >= 4);
    assert!(body["groups"].as_i64().unwrap() >= 3);
}

#[tokio::test]
#[ignore]
async fn test_empty_title_is_rejected() {
    let client = Client::new();
    let token = get_token(&client, "admin_user").await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "title": "   ", "author_name": "Someone" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_book_lifecycle() {
    let client = Client::new();
    let token = get_token(&client, "admin_user").await;
    let auth = format!("Bearer {}", token);

    // Create a book for George Orwell (author created on the fly if needed)
    let created: Value = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", &auth)
        .json(&json!({ "title": "1984 (lifecycle)", "author_name": "George Orwell" }))
        .send()
        .await
        .expect("Failed to create book")
        .json()
        .await
        .expect("Failed to parse response");
    let book_id = created["id"].as_i64().expect("No book ID");
    assert_eq!(created["author_name"], "George Orwell");

    // Listing includes it
    let listing: Value = client
        .get(format!("{}/books?title=lifecycle", BASE_URL))
        .header("Authorization", &auth)
        .send()
        .await
        .expect("Failed to list books")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(listing["items"]
        .as_array()
        .unwrap()
        .iter()
        .any(|b| b["id"].as_i64() == Some(book_id)));

    // Rename it
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", &auth)
        .json(&json!({ "title": "Nineteen Eighty-Four (lifecycle)" }))
        .send()
        .await
        .expect("Failed to update book");
    assert!(response.status().is_success());

    let detail: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", &auth)
        .send()
        .await
        .expect("Failed to fetch book")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(detail["title"], "Nineteen Eighty-Four (lifecycle)");

    // Delete it: the listing shrinks and direct lookup 404s
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", &auth)
        .send()
        .await
        .expect("Failed to delete book");
    assert_eq!(response.status(), 204);

    let listing: Value = client
        .get(format!("{}/books?title=lifecycle", BASE_URL))
        .header("Authorization", &auth)
        .send()
        .await
        .expect("Failed to list books")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(!listing["items"]
        .as_array()
        .unwrap()
        .iter()
        .any(|b| b["id"].as_i64() == Some(book_id)));

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", &auth)
        .send()
        .await
        .expect("Failed to fetch book");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_author_with_books_cannot_be_deleted() {
    let client = Client::new();
    let token = get_token(&client, "admin_user").await;
    let auth = format!("Bearer {}", token);

    // George Orwell is seeded with books attached
    let authors: Value = client
        .get(format!("{}/authors", BASE_URL))
        .send()
        .await
        .expect("Failed to list authors")
        .json()
        .await
        .expect("Failed to parse response");
    let orwell = authors
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["name"] == "George Orwell")
        .expect("Seeded author missing");
    assert!(orwell["book_count"].as_i64().unwrap() > 0);

    let response = client
        .delete(format!("{}/authors/{}", BASE_URL, orwell["id"].as_i64().unwrap()))
        .header("Authorization", &auth)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_library_detail_lists_books_and_librarian() {
    let client = Client::new();

    let libraries: Value = client
        .get(format!("{}/libraries", BASE_URL))
        .send()
        .await
        .expect("Failed to list libraries")
        .json()
        .await
        .expect("Failed to parse response");
    let central = libraries
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["name"] == "Central Library")
        .expect("Seeded library missing");

    let detail: Value = client
        .get(format!("{}/libraries/{}", BASE_URL, central["id"].as_i64().unwrap()))
        .send()
        .await
        .expect("Failed to fetch library")
        .json()
        .await
        .expect("Failed to parse response");

    assert!(detail["books"].as_array().unwrap().len() >= 4);
    assert_eq!(detail["librarian"]["name"], "John Smith");
}

#[tokio::test]
#[ignore]
async fn test_direct_grant_takes_effect_immediately() {
    let client = Client::new();
    let admin_token = get_token(&client, "admin_user").await;
    let username = format!("grant_test_{}", std::process::id());

    // Fresh member with no permissions
    let created: Value = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({ "username": username, "password": "a-long-password" }))
        .send()
        .await
        .expect("Failed to register")
        .json()
        .await
        .expect("Failed to parse response");
    let user_id = created["id"].as_i64().expect("No user ID");
    let token = get_token_with(&client, &username, "a-long-password").await;

    let response = client
        .get(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to list books");
    assert_eq!(response.status(), 403);

    // Grant book.view directly; the same token now passes because the
    // permission set is reloaded per request
    let response = client
        .post(format!("{}/users/{}/permissions", BASE_URL, user_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({ "permission": "book.view" }))
        .send()
        .await
        .expect("Failed to grant permission");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to list books");
    assert!(response.status().is_success());
}

async fn get_token_with(client: &Client, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

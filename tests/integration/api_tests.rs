//! API integration tests
//!
//! Run against a live server (`cargo run`) with a fresh database: the
//! `admin` account comes from the startup bootstrap, the `regular` account
//! is registered here and belongs to no group.

use reqwest::{multipart, Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080";

/// Register an account, ignoring the conflict when it already exists
async fn ensure_user(client: &Client, login: &str, password: &str) {
    let _ = client
        .post(format!("{}/bookshelf/register", BASE_URL))
        .json(&json!({ "login": login, "password": password }))
        .send()
        .await;
}

async fn get_auth_token(client: &Client, login: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/bookshelf/login", BASE_URL))
        .json(&json!({ "login": login, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn regular_token(client: &Client) -> String {
    ensure_user(client, "regular", "regular123").await;
    get_auth_token(client, "regular", "regular123").await
}

fn book_form(title: &str) -> multipart::Form {
    multipart::Form::new()
        .text("title", title.to_string())
        .text("pages", "100")
        .text("status", "PE")
        .text("published_date", "2020-01-01")
}

/// Create a book as admin and return its id
async fn create_book(client: &Client, token: &str, title: &str) -> i64 {
    let response = client
        .post(format!("{}/bookshelf/form", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(book_form(title))
        .send()
        .await
        .expect("Failed to send create request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No book ID")
}

async fn delete_book(client: &Client, token: &str, id: i64) {
    let _ = client
        .post(format!("{}/bookshelf/{}/delete", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await;
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
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
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/bookshelf/login", BASE_URL))
        .json(&json!({ "login": "admin", "password": "admin123" }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["user"]["permissions"]
        .as_array()
        .expect("permissions array")
        .iter()
        .any(|p| p == "add_book"));
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/bookshelf/login", BASE_URL))
        .json(&json!({ "login": "admin", "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthenticated_list_redirects_to_login() {
    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("client");

    let response = client
        .get(format!("{}/bookshelf/list", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok()),
        Some("/bookshelf/login")
    );
}

#[tokio::test]
#[ignore]
async fn test_form_route_with_admin_user() {
    let client = Client::new();
    let token = get_auth_token(&client, "admin", "admin123").await;

    let response = client
        .get(format!("{}/bookshelf/form", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["statuses"].is_array());
    assert!(body["authors"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_form_route_with_regular_user() {
    let client = Client::new();
    let token = regular_token(&client).await;

    let response = client
        .get(format!("{}/bookshelf/form", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    // No add permission: forbidden, not a login redirect
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_list_route_with_regular_user() {
    let client = Client::new();
    let token = regular_token(&client).await;

    let response = client
        .get(format!("{}/bookshelf/list", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    // The list is permission-exempt
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["books"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_edit_route_permissions() {
    let client = Client::new();
    let admin = get_auth_token(&client, "admin", "admin123").await;
    let regular = regular_token(&client).await;
    let book_id = create_book(&client, &admin, "Edit Permissions Book").await;

    let response = client
        .get(format!("{}/bookshelf/{}/edit", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let response = client
        .get(format!("{}/bookshelf/{}/edit", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", regular))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    delete_book(&client, &admin, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_delete_route_permissions() {
    let client = Client::new();
    let admin = get_auth_token(&client, "admin", "admin123").await;
    let regular = regular_token(&client).await;
    let book_id = create_book(&client, &admin, "Delete Permissions Book").await;

    let response = client
        .get(format!("{}/bookshelf/{}/delete", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", regular))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .get(format!("{}/bookshelf/{}/delete", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    delete_book(&client, &admin, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_detail_route_with_regular_user() {
    let client = Client::new();
    let admin = get_auth_token(&client, "admin", "admin123").await;
    let regular = regular_token(&client).await;
    let book_id = create_book(&client, &admin, "Detail Book").await;

    let response = client
        .get(format!("{}/bookshelf/{}/detail", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", regular))
        .send()
        .await
        .expect("Failed to send request");

    // Detail only needs authentication
    assert_eq!(response.status(), 200);

    delete_book(&client, &admin, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_create_book_without_author_and_cover() {
    let client = Client::new();
    let token = get_auth_token(&client, "admin", "admin123").await;

    let response = client
        .post(format!("{}/bookshelf/form", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(book_form("Cien años de soledad"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["title"], "Cien años de soledad");
    assert_eq!(body["pages"], 100);
    assert_eq!(body["status"], "PE");
    assert!(body["rating"].is_null());
    assert!(body["read_date"].is_null());
    assert!(body["authors"].as_array().expect("authors").is_empty());

    let book_id = body["id"].as_i64().expect("No book ID");
    delete_book(&client, &token, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_create_book_with_overlong_title() {
    let client = Client::new();
    let token = get_auth_token(&client, "admin", "admin123").await;

    let response = client
        .post(format!("{}/bookshelf/form", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(book_form(&"A".repeat(51)))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body["fields"]["title"][0],
        "The title must be less than 50 characters long"
    );
}

#[tokio::test]
#[ignore]
async fn test_book_author_round_trip() {
    let client = Client::new();
    let token = get_auth_token(&client, "admin", "admin123").await;

    // Create the author
    let response = client
        .post(format!("{}/bookshelf/authors", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "name": "Gabriel", "last_name": "García Márquez" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let author: Value = response.json().await.expect("Failed to parse response");
    let author_id = author["id"].as_i64().expect("No author ID");

    // Create a book linked to the author
    let form = book_form("Round Trip Book").text("authors", author_id.to_string());
    let response = client
        .post(format!("{}/bookshelf/form", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let book: Value = response.json().await.expect("Failed to parse response");
    let book_id = book["id"].as_i64().expect("No book ID");

    // The book's author set is exactly the attached author
    let response = client
        .get(format!("{}/bookshelf/{}/detail", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let detail: Value = response.json().await.expect("Failed to parse response");
    let authors = detail["authors"].as_array().expect("authors");
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0]["id"].as_i64(), Some(author_id));
    assert_eq!(authors[0]["name"], "Gabriel");

    // Cleanup
    delete_book(&client, &token, book_id).await;
    let _ = client
        .delete(format!("{}/bookshelf/authors/{}", BASE_URL, author_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_detail_of_missing_book_is_404() {
    let client = Client::new();
    let token = get_auth_token(&client, "admin", "admin123").await;

    let response = client
        .get(format!("{}/bookshelf/999999/detail", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

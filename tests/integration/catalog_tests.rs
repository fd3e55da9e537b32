//! Catalog, loan renewal and deletion rules against a running server

use chrono::{Duration, Local};
use reqwest::Client;
use serde_json::{json, Value};

use super::api_tests::{get_auth_token, BASE_URL};

/// 13 digits that differ between runs
fn unique_isbn() -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{:013}", nanos.rem_euclid(10_000_000_000_000))
}

async fn post(client: &Client, token: &str, path: &str, body: Value) -> reqwest::Response {
    client
        .post(format!("{}{}", BASE_URL, path))
        .header("Authorization", format!("Bearer {}", token))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request")
}

async fn create_author(client: &Client, token: &str) -> i64 {
    let response = post(
        client,
        token,
        "/authors",
        json!({ "first_name": "Octavia", "last_name": "Butler" }),
    )
    .await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("author id")
}

async fn send_delete(client: &Client, token: &str, path: &str) -> reqwest::Response {
    client
        .delete(format!("{}{}", BASE_URL, path))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request")
}

async fn get_json(client: &Client, path: &str) -> Value {
    client
        .get(format!("{}{}", BASE_URL, path))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response")
}

async fn create_book(client: &Client, token: &str, author_id: i64, language_id: Option<i64>) -> i64 {
    let response = post(
        client,
        token,
        "/books",
        json!({
            "title": "Kindred",
            "author_id": author_id,
            "summary": "A writer is pulled back in time.",
            "isbn": unique_isbn(),
            "language_id": language_id
        }),
    )
    .await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("book id")
}

#[tokio::test]
#[ignore]
async fn test_list_books_pagination() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
    assert_eq!(body["per_page"], 5);

    let zero = client
        .get(format!("{}/books?page=0", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(zero.status(), 400);

    let beyond = client
        .get(format!("{}/books?page=100000", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(beyond.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_renewal_window() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let today = Local::now().date_naive();

    let author_id = create_author(&client, &token).await;
    let book_id = create_book(&client, &token, author_id, None).await;

    let response = post(
        &client,
        &token,
        &format!("/books/{}/instances", book_id),
        json!({ "imprint": "Doubleday, 1979", "status": "o", "due_back": today }),
    )
    .await;
    assert_eq!(response.status(), 201);
    let instance: Value = response.json().await.expect("Failed to parse response");
    let id = instance["id"].as_str().expect("instance id").to_string();
    let renew_path = format!("/bookinstances/{}/renew", id);

    let form: Value = client
        .get(format!("{}{}", BASE_URL, renew_path))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(
        form["proposed_renewal_date"],
        json!(today + Duration::weeks(3))
    );

    let past = post(&client, &token, &renew_path, json!({ "renewal_date": today - Duration::days(1) })).await;
    assert_eq!(past.status(), 400);
    let body: Value = past.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Invalid date - renewal in past");

    let far = post(&client, &token, &renew_path, json!({ "renewal_date": today + Duration::days(29) })).await;
    assert_eq!(far.status(), 400);

    let ok = post(&client, &token, &renew_path, json!({ "renewal_date": today + Duration::days(28) })).await;
    assert!(ok.status().is_success());
    let renewed: Value = ok.json().await.expect("Failed to parse response");
    assert_eq!(renewed["due_back"], json!(today + Duration::days(28)));
    assert_eq!(renewed["status"], "o");

    let returned = post(&client, &token, &format!("/bookinstances/{}/return", id), json!({})).await;
    assert!(returned.status().is_success());
    let returned: Value = returned.json().await.expect("Failed to parse response");
    assert_eq!(returned["status"], "a");
    assert!(returned["due_back"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_referenced_author_is_not_deleted() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let author_id = create_author(&client, &token).await;
    create_book(&client, &token, author_id, None).await;

    let response = client
        .delete(format!("{}/authors/{}", BASE_URL, author_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["confirmation"]["book_count"], 1);
    assert_eq!(
        body["confirmation"]["confirm_path"],
        format!("/api/v1/authors/{}", author_id)
    );

    let still_there = client
        .get(format!("{}/authors/{}", BASE_URL, author_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(still_there.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_unreferenced_author_is_deleted() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let author_id = create_author(&client, &token).await;

    let response = client
        .delete(format!("{}/authors/{}", BASE_URL, author_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let gone = client
        .get(format!("{}/authors/{}", BASE_URL, author_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(gone.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_deleting_language_keeps_book() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let name = format!("Klingon {}", unique_isbn());
    let response = post(&client, &token, "/languages", json!({ "name": name })).await;
    assert_eq!(response.status(), 201);
    let language: Value = response.json().await.expect("Failed to parse response");
    let language_id = language["id"].as_i64().expect("language id");

    let author_id = create_author(&client, &token).await;
    let book_id = create_book(&client, &token, author_id, Some(language_id)).await;

    let response = client
        .delete(format!("{}/languages/{}", BASE_URL, language_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(book["language"].is_null());
    assert!(book["language_id"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_duplicate_genre_is_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let name = format!("Afrofuturism {}", unique_isbn());
    let first = post(&client, &token, "/genres", json!({ "name": name })).await;
    assert_eq!(first.status(), 201);

    let second = post(&client, &token, "/genres", json!({ "name": name.to_uppercase() })).await;
    assert_eq!(second.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_lend_available_copy() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let due = Local::now().date_naive() + Duration::weeks(2);

    let me: Value = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let user_id = me["id"].as_i64().expect("user id");

    let author_id = create_author(&client, &token).await;
    let book_id = create_book(&client, &token, author_id, None).await;
    let response = post(
        &client,
        &token,
        &format!("/books/{}/instances", book_id),
        json!({ "imprint": "Beacon Press, 2003", "status": "a" }),
    )
    .await;
    assert_eq!(response.status(), 201);
    let instance: Value = response.json().await.expect("Failed to parse response");
    let path = format!("/bookinstances/{}", instance["id"].as_str().expect("instance id"));

    let response = client
        .put(format!("{}{}", BASE_URL, path))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "imprint": "Beacon Press, 2003",
            "status": "o",
            "due_back": due,
            "borrower_id": user_id
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let lent: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(lent["status"], "o");
    assert_eq!(lent["borrower_id"], user_id);
    assert_eq!(lent["due_back"], json!(due));

    let book = get_json(&client, &format!("/books/{}", book_id)).await;
    assert_eq!(book["instances"][0]["status"], "o");
    assert_eq!(book["author"]["id"], author_id);

    let unknown_borrower = client
        .put(format!("{}{}", BASE_URL, path))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "imprint": "Beacon Press, 2003", "status": "o", "borrower_id": -1 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(unknown_borrower.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_book_with_copies_is_not_deleted() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let author_id = create_author(&client, &token).await;
    let book_id = create_book(&client, &token, author_id, None).await;
    let response = post(
        &client,
        &token,
        &format!("/books/{}/instances", book_id),
        json!({ "imprint": "Doubleday, 1979", "status": "d" }),
    )
    .await;
    assert_eq!(response.status(), 201);
    let instance: Value = response.json().await.expect("Failed to parse response");
    let instance_path = format!("/bookinstances/{}", instance["id"].as_str().expect("instance id"));
    let book_path = format!("/books/{}", book_id);

    let refused = send_delete(&client, &token, &book_path).await;
    assert_eq!(refused.status(), 409);

    assert_eq!(send_delete(&client, &token, &instance_path).await.status(), 204);
    assert_eq!(send_delete(&client, &token, &instance_path).await.status(), 404);
    assert_eq!(send_delete(&client, &token, &book_path).await.status(), 204);

    let gone = client
        .get(format!("{}{}", BASE_URL, book_path))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(gone.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_update_author_clears_date_of_death() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = post(
        &client,
        &token,
        "/authors",
        json!({
            "first_name": "Ursula",
            "last_name": "Le Guin",
            "date_of_birth": "1929-10-21",
            "date_of_death": "2018-01-22"
        }),
    )
    .await;
    assert_eq!(response.status(), 201);
    let author: Value = response.json().await.expect("Failed to parse response");
    let path = format!("/authors/{}", author["id"].as_i64().expect("author id"));

    let response = client
        .put(format!("{}{}", BASE_URL, path))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "first_name": "Ursula",
            "last_name": "Le Guin",
            "date_of_birth": "1929-10-21",
            "date_of_death": null
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let updated = get_json(&client, &path).await;
    assert!(updated["date_of_death"].is_null());
    assert_eq!(updated["date_of_birth"], "1929-10-21");
}

mod common;

use anyhow::Result;
use chrono::{Datelike, Utc};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn create_computes_all_reserved_fields() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let token = common::login(&client, &server.base_url, "alice", "alice123").await?;

    let res = client
        .post(format!("{}/api/claims", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "title": "Leaky pipe", "description": "Hall B" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let row = res.json::<serde_json::Value>().await?;
    let year = Utc::now().year();
    assert_eq!(row["claim_number"], json!(format!("NZG-{}-001", year)));
    assert_eq!(row["status"], json!("Nowe"));
    assert_eq!(row["reporter"], json!("Alice Kowalska"));
    assert_eq!(row["department"], json!("Operations"));
    assert_eq!(row["submission_date"], json!(Utc::now().format("%Y-%m-%d").to_string()));
    assert!(row["rowId"].as_i64().is_some());
    assert!(row["created_at"].as_str().is_some_and(|s| !s.is_empty()));
    Ok(())
}

#[tokio::test]
async fn sequential_creates_increment_claim_numbers_by_one() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let token = common::login(&client, &server.base_url, "alice", "alice123").await?;

    let mut previous: Option<u32> = None;
    for i in 0..3 {
        let res = client
            .post(format!("{}/api/claims", server.base_url))
            .bearer_auth(&token)
            .json(&json!({ "title": format!("claim {}", i) }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);

        let row = res.json::<serde_json::Value>().await?;
        let number = row["claim_number"].as_str().unwrap();
        let suffix: u32 = number.rsplit('-').next().unwrap().parse()?;
        if let Some(prev) = previous {
            assert_eq!(suffix, prev + 1, "numbers must increment by exactly 1");
        }
        previous = Some(suffix);
    }
    Ok(())
}

#[tokio::test]
async fn client_supplied_reserved_fields_are_discarded() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let token = common::login(&client, &server.base_url, "alice", "alice123").await?;

    let res = client
        .post(format!("{}/api/claims", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Forgery attempt",
            "claim_number": "NZG-1999-999",
            "status": "Closed",
            "reporter": "Someone Else",
            "department": "Forged"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let row = res.json::<serde_json::Value>().await?;
    assert_ne!(row["claim_number"], json!("NZG-1999-999"));
    assert_eq!(row["status"], json!("Nowe"));
    assert_eq!(row["reporter"], json!("Alice Kowalska"));
    assert_eq!(row["department"], json!("Operations"));
    Ok(())
}

#[tokio::test]
async fn create_without_required_column_names_it() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let token = common::login(&client, &server.base_url, "alice", "alice123").await?;

    // No body at all: every reserved column has a server default, but title
    // is NOT NULL with no default and no client value
    let res = client
        .post(format!("{}/api/claims", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("title"), "error must name the column: {}", message);
    Ok(())
}

#[tokio::test]
async fn empty_create_succeeds_once_required_columns_have_defaults() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let token = common::login(&client, &server.base_url, "alice", "alice123").await?;

    // Give the one defaultless required column a default; a bodyless create
    // must then succeed on server-computed fields alone
    common::exec_sql(&server.store, "DROP TABLE claims").await?;
    common::exec_sql(
        &server.store,
        "CREATE TABLE claims (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            claim_number TEXT NOT NULL,
            status TEXT,
            submission_date TEXT,
            created_at TEXT,
            reporter TEXT,
            department TEXT,
            title TEXT NOT NULL DEFAULT 'Untitled',
            description TEXT
        )",
    )
    .await?;

    let res = client
        .post(format!("{}/api/claims", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let row = res.json::<serde_json::Value>().await?;
    assert_eq!(row["title"], json!("Untitled"));
    assert_eq!(row["status"], json!("Nowe"));
    Ok(())
}

#[tokio::test]
async fn update_overwrites_only_listed_columns() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let token = common::login(&client, &server.base_url, "alice", "alice123").await?;

    let created = client
        .post(format!("{}/api/claims", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "title": "Original", "description": "Keep me" }))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    let row_id = created["rowId"].as_i64().unwrap();

    let res = client
        .put(format!("{}/api/claims/{}", server.base_url, row_id))
        .bearer_auth(&token)
        .json(&json!({ "status": "Closed", "not_a_column": 42 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let updated = res.json::<serde_json::Value>().await?;
    assert_eq!(updated["status"], json!("Closed"));
    assert_eq!(updated["title"], created["title"]);
    assert_eq!(updated["description"], created["description"]);
    assert_eq!(updated["claim_number"], created["claim_number"]);
    assert_eq!(updated["rowId"], created["rowId"]);
    assert!(updated.get("not_a_column").is_none());
    Ok(())
}

#[tokio::test]
async fn update_with_nothing_usable_is_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let token = common::login(&client, &server.base_url, "alice", "alice123").await?;

    let created = client
        .post(format!("{}/api/claims", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "title": "Target" }))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    let row_id = created["rowId"].as_i64().unwrap();

    // Unknown keys are dropped silently; with nothing left the update fails
    let res = client
        .put(format!("{}/api/claims/{}", server.base_url, row_id))
        .bearer_auth(&token)
        .json(&json!({ "not_a_column": 1 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .put(format!("{}/api/claims/{}", server.base_url, row_id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn row_ids_must_parse_as_integers() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let token = common::login(&client, &server.base_url, "alice", "alice123").await?;

    let res = client
        .put(format!("{}/api/claims/abc", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "status": "Closed" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .delete(format!("{}/api/claims/1.5", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn delete_acknowledges_identity_and_then_404s() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let token = common::login(&client, &server.base_url, "alice", "alice123").await?;

    let first = client
        .post(format!("{}/api/claims", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "title": "Keep" }))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    let doomed = client
        .post(format!("{}/api/claims", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "title": "Remove" }))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    let doomed_id = doomed["rowId"].as_i64().unwrap();

    let res = client
        .delete(format!("{}/api/claims/{}", server.base_url, doomed_id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let ack = res.json::<serde_json::Value>().await?;
    assert_eq!(ack, json!({ "ok": true, "rowId": doomed_id }));

    // Deleting again, or any nonexistent id, is a plain 404
    let res = client
        .delete(format!("{}/api/claims/{}", server.base_url, doomed_id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // The surviving row is untouched
    let rows = client
        .get(format!("{}/api/claims", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?
        .json::<Vec<serde_json::Value>>()
        .await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["rowId"], first["rowId"]);
    assert_eq!(rows[0]["title"], json!("Keep"));
    Ok(())
}

#![allow(dead_code)]

use anyhow::{Context, Result};

use nzg_claims_api::database::manager::StoreManager;
use nzg_claims_api::state::AppState;

pub struct TestServer {
    pub base_url: String,
    pub store: StoreManager,
}

/// Stand up a fresh in-process server with its own temp-file store so each
/// test suite is fully isolated. The admin account is seeded by store init;
/// two regular users are added on top.
pub async fn spawn_server() -> Result<TestServer> {
    let db_path =
        std::env::temp_dir().join(format!("nzg-claims-test-{}.db", uuid::Uuid::new_v4()));
    let store = StoreManager::new(&db_path);
    store.init().await.context("store init")?;

    seed_user(&store, "alice", "alice123", "Alice", "Kowalska", "user", "Operations").await?;
    seed_user(&store, "bob", "bob123", "Bob", "Nowak", "user", "Logistics").await?;

    let state = AppState::new(store.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, nzg_claims_api::app(state)).await.expect("test server");
    });

    Ok(TestServer { base_url: format!("http://{}", addr), store })
}

pub async fn seed_user(
    store: &StoreManager,
    username: &str,
    password: &str,
    first_name: &str,
    last_name: &str,
    role: &str,
    department: &str,
) -> Result<()> {
    let mut conn = store.acquire().await?;
    sqlx::query(
        "INSERT INTO users (username, password, first_name, last_name, role, department) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(username)
    .bind(password)
    .bind(first_name)
    .bind(last_name)
    .bind(role)
    .bind(department)
    .execute(&mut conn)
    .await?;
    Ok(())
}

/// Run raw SQL against the store, for fixtures the API itself cannot create.
pub async fn exec_sql(store: &StoreManager, sql: &str) -> Result<()> {
    let mut conn = store.acquire().await?;
    sqlx::query(sql).execute(&mut conn).await?;
    Ok(())
}

/// Log in and return the bearer token.
pub async fn login(
    client: &reqwest::Client,
    base_url: &str,
    username: &str,
    password: &str,
) -> Result<String> {
    let res = client
        .post(format!("{}/api/auth/login", base_url))
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == reqwest::StatusCode::OK, "login failed: {}", res.status());

    let body: serde_json::Value = res.json().await?;
    let token = body["token"].as_str().context("missing token in login response")?;
    Ok(token.to_string())
}

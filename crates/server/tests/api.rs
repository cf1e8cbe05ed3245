use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use ledger::Ledger;
use migration::MigratorTrait;
use server::ServerState;
use server::types::account::AccountView;
use server::types::transaction::SummaryView;

use std::sync::Arc;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder().database(db).build().await.unwrap();
    server::router(ServerState {
        ledger: Arc::new(ledger),
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

async fn seed_account(app: &Router, name: &str, initial: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/accounts",
        Some(json!({ "name": name, "type": "checking", "initial_balance": initial })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

async fn seed_category(app: &Router, name: &str, kind: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/categories",
        Some(json!({ "name": name, "type": kind })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

#[allow(clippy::too_many_arguments)]
async fn seed_transaction(
    app: &Router,
    description: &str,
    amount: &str,
    kind: &str,
    status: &str,
    date: &str,
    account_id: i64,
    category_id: i64,
) -> i64 {
    let (code, body) = send(
        app,
        "POST",
        "/transactions",
        Some(json!({
            "description": description,
            "amount": amount,
            "type": kind,
            "status": status,
            "transaction_date": date,
            "account_id": account_id,
            "category_id": category_id,
        })),
    )
    .await;
    assert_eq!(code, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

async fn account_balance(app: &Router, account_id: i64) -> Value {
    let (status, body) = send(app, "GET", &format!("/accounts/{account_id}/balance"), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["current_balance"].clone()
}

#[tokio::test]
async fn root_and_health_report_service() {
    let app = app().await;

    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "saldo");
    assert_eq!(body["status"], "running");
    assert!(body["version"].as_str().is_some_and(|v| !v.is_empty()));

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn create_account_returns_normalized_view() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/accounts",
        Some(json!({
            "name": "  Main Checking ",
            "type": "checking",
            "description": "Everyday spending",
            "initial_balance": "500.00",
            "color": "#3b82f6",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    let view: AccountView = serde_json::from_value(body).unwrap();
    assert_eq!(view.name, "Main Checking");
    assert_eq!(view.color, "#3B82F6");
    assert_eq!(view.icon, "wallet");
    assert_eq!(view.initial_balance, view.current_balance);
    assert!(view.is_active);
    assert!(view.archived_at.is_none());
}

#[tokio::test]
async fn duplicate_account_name_conflicts() {
    let app = app().await;
    seed_account(&app, "Wallet", "0").await;

    let (status, body) = send(
        &app,
        "POST",
        "/accounts",
        Some(json!({ "name": "wallet", "type": "cash" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn unknown_account_is_404() {
    let app = app().await;

    let (status, body) = send(&app, "GET", "/accounts/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn malformed_account_body_is_422() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/accounts",
        Some(json!({ "type": "checking" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn blank_account_name_is_400() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/accounts",
        Some(json!({ "name": "   ", "type": "cash" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("must not be empty"));
}

#[tokio::test]
async fn bad_color_is_400() {
    let app = app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/accounts",
        Some(json!({ "name": "Cash", "type": "cash", "color": "red" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bad_query_kind_is_400() {
    let app = app().await;

    let (status, _) = send(&app, "GET", "/accounts?type=bogus", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn archive_restore_roundtrip() {
    let app = app().await;
    let checking = seed_account(&app, "Checking", "100.00").await;
    seed_account(&app, "Savings", "50.00").await;

    let (status, body) = send(&app, "DELETE", &format!("/accounts/{checking}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], format!("account {checking} archived"));

    let (_, body) = send(&app, "GET", "/accounts", None).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["total_balance"], "50.00");

    let (_, body) = send(&app, "GET", "/accounts?only_active=true", None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["accounts"][0]["name"], "Savings");

    let (_, body) = send(&app, "GET", "/accounts/active", None).await;
    assert_eq!(body["total"], 1);

    let (_, body) = send(&app, "GET", "/accounts?is_active=false", None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["accounts"][0]["name"], "Checking");

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/accounts/{checking}/restore"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], true);

    let (_, body) = send(&app, "GET", "/accounts/active", None).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["total_balance"], "150.00");
}

#[tokio::test]
async fn permanent_delete_drops_the_account() {
    let app = app().await;
    let id = seed_account(&app, "Old", "0").await;

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/accounts/{id}?permanent=true"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], format!("account {id} deleted"));

    let (status, _) = send(&app, "GET", &format!("/accounts/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn account_in_use_refuses_removal() {
    let app = app().await;
    let account = seed_account(&app, "Checking", "100.00").await;
    let category = seed_category(&app, "Food", "expense").await;
    seed_transaction(
        &app, "Lunch", "10.00", "expense", "completed", "2026-01-10", account, category,
    )
    .await;

    let (status, body) = send(&app, "DELETE", &format!("/accounts/{account}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("still has transactions"));

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/accounts/{account}?permanent=true"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, "DELETE", &format!("/categories/{category}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn categories_by_kind_lists_active_of_one_direction() {
    let app = app().await;
    seed_category(&app, "Salary", "income").await;
    let food = seed_category(&app, "Food", "expense").await;
    seed_category(&app, "Rent", "expense").await;

    let (_, body) = send(&app, "GET", "/categories", None).await;
    assert_eq!(body["total"], 3);

    let (status, body) = send(&app, "GET", "/categories/by-type/income", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["categories"][0]["name"], "Salary");

    let (_, body) = send(&app, "GET", "/categories/by-type/expense", None).await;
    assert_eq!(body["total"], 2);

    let (status, body) = send(&app, "GET", "/categories/by-type/stocks", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("unknown kind"));

    let (status, _) = send(&app, "DELETE", &format!("/categories/{food}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, "GET", "/categories/by-type/expense", None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["categories"][0]["name"], "Rent");
}

#[tokio::test]
async fn completed_transactions_move_the_balance() {
    let app = app().await;
    let account = seed_account(&app, "Checking", "1000.00").await;
    let salary = seed_category(&app, "Salary", "income").await;
    let food = seed_category(&app, "Food", "expense").await;

    let (status, body) = send(
        &app,
        "POST",
        "/transactions",
        Some(json!({
            "description": "January salary",
            "amount": "200.00",
            "type": "income",
            "status": "completed",
            "transaction_date": "2026-01-05",
            "account_id": account,
            "category_id": salary,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["account"]["current_balance"], "1200.00");
    assert_eq!(account_balance(&app, account).await, "1200.00");

    seed_transaction(
        &app, "Groceries", "50.00", "expense", "completed", "2026-01-08", account, food,
    )
    .await;
    assert_eq!(account_balance(&app, account).await, "1150.00");
}

#[tokio::test]
async fn pending_transactions_leave_the_balance_alone() {
    let app = app().await;
    let account = seed_account(&app, "Checking", "1000.00").await;
    let food = seed_category(&app, "Food", "expense").await;

    let (status, body) = send(
        &app,
        "POST",
        "/transactions",
        Some(json!({
            "description": "Rent",
            "amount": "200.00",
            "type": "expense",
            "transaction_date": "2026-01-31",
            "account_id": account,
            "category_id": food,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["status"], "pending");
    assert_eq!(account_balance(&app, account).await, "1000.00");
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/transactions/{id}/status"),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"]["current_balance"], "800.00");

    let (_, body) = send(
        &app,
        "PATCH",
        &format!("/transactions/{id}/status"),
        Some(json!({ "status": "pending" })),
    )
    .await;
    assert_eq!(body["account"]["current_balance"], "1000.00");

    let (status, body) = send(&app, "DELETE", &format!("/transactions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], format!("transaction {id} deleted"));
    assert_eq!(account_balance(&app, account).await, "1000.00");
}

#[tokio::test]
async fn deleting_a_completed_transaction_reverts_the_balance() {
    let app = app().await;
    let account = seed_account(&app, "Checking", "1000.00").await;
    let food = seed_category(&app, "Food", "expense").await;
    let id = seed_transaction(
        &app, "Groceries", "150.00", "expense", "completed", "2026-01-08", account, food,
    )
    .await;
    assert_eq!(account_balance(&app, account).await, "850.00");

    let (status, _) = send(&app, "DELETE", &format!("/transactions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account_balance(&app, account).await, "1000.00");
}

#[tokio::test]
async fn kind_mismatch_is_rejected() {
    let app = app().await;
    let account = seed_account(&app, "Checking", "100.00").await;
    let salary = seed_category(&app, "Salary", "income").await;

    let (status, body) = send(
        &app,
        "POST",
        "/transactions",
        Some(json!({
            "description": "Broken",
            "amount": "10.00",
            "type": "expense",
            "transaction_date": "2026-01-10",
            "account_id": account,
            "category_id": salary,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("cannot use"));
    assert_eq!(account_balance(&app, account).await, "100.00");
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let app = app().await;
    let account = seed_account(&app, "Checking", "100.00").await;
    let food = seed_category(&app, "Food", "expense").await;

    for amount in ["0", "-5.00"] {
        let (status, body) = send(
            &app,
            "POST",
            "/transactions",
            Some(json!({
                "description": "Broken",
                "amount": amount,
                "type": "expense",
                "transaction_date": "2026-01-10",
                "account_id": account,
                "category_id": food,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(body["message"].as_str().unwrap().contains("greater than zero"));
    }
}

#[tokio::test]
async fn transaction_against_missing_references_is_404() {
    let app = app().await;
    let account = seed_account(&app, "Checking", "100.00").await;
    let food = seed_category(&app, "Food", "expense").await;

    let (status, _) = send(
        &app,
        "POST",
        "/transactions",
        Some(json!({
            "description": "Orphan",
            "amount": "10.00",
            "type": "expense",
            "transaction_date": "2026-01-10",
            "account_id": 99,
            "category_id": food,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/transactions",
        Some(json!({
            "description": "Orphan",
            "amount": "10.00",
            "type": "expense",
            "transaction_date": "2026-01-10",
            "account_id": account,
            "category_id": 99,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

async fn seed_mixed_transactions(app: &Router) -> (i64, i64, i64) {
    let account = seed_account(app, "Checking", "0").await;
    let salary = seed_category(app, "Salary", "income").await;
    let food = seed_category(app, "Food", "expense").await;

    seed_transaction(
        app, "January salary", "1000.00", "income", "completed", "2026-01-05", account, salary,
    )
    .await;
    seed_transaction(
        app, "Team lunch", "200.00", "expense", "completed", "2026-01-10", account, food,
    )
    .await;
    seed_transaction(
        app, "Groceries", "75.00", "expense", "pending", "2026-01-15", account, food,
    )
    .await;
    seed_transaction(
        app, "Interest", "50.00", "income", "completed", "2026-02-01", account, salary,
    )
    .await;
    (account, salary, food)
}

#[tokio::test]
async fn transaction_listing_filters_and_totals() {
    let app = app().await;
    let (_, _, food) = seed_mixed_transactions(&app).await;

    let (_, body) = send(&app, "GET", "/transactions", None).await;
    assert_eq!(body["total"], 4);
    assert_eq!(body["total_income"], "1050.00");
    assert_eq!(body["total_expense"], "200.00");
    assert_eq!(body["balance"], "850.00");
    // Newest first.
    assert_eq!(body["transactions"][0]["description"], "Interest");
    assert_eq!(body["transactions"][0]["category"]["name"], "Salary");

    let (_, body) = send(&app, "GET", "/transactions?type=expense", None).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["total_income"], "0");
    assert_eq!(body["total_expense"], "200.00");
    assert_eq!(body["balance"], "-200.00");

    // A pending listing still reports the completed totals of the filter.
    let (_, body) = send(&app, "GET", "/transactions?status=pending", None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["transactions"][0]["description"], "Groceries");
    assert_eq!(body["total_income"], "1050.00");
    assert_eq!(body["total_expense"], "200.00");

    let (_, body) = send(
        &app,
        "GET",
        "/transactions?date_from=2026-01-01&date_to=2026-01-31",
        None,
    )
    .await;
    assert_eq!(body["total"], 3);
    // February's interest stays outside the window, and the totals shrink
    // to the window's completed rows.
    assert_eq!(body["transactions"][0]["description"], "Groceries");
    assert_eq!(body["total_income"], "1000.00");
    assert_eq!(body["total_expense"], "200.00");

    let (_, body) = send(&app, "GET", "/transactions?date_from=2026-02-01", None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["transactions"][0]["description"], "Interest");
    assert_eq!(body["total_income"], "50.00");
    assert_eq!(body["total_expense"], "0");

    let (_, body) = send(&app, "GET", "/transactions?search=lunch", None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["transactions"][0]["description"], "Team lunch");

    let (_, body) = send(&app, "GET", "/transactions?min_amount=100.00", None).await;
    assert_eq!(body["total"], 2);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/transactions?category_id={food}&status=completed"),
        None,
    )
    .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["transactions"][0]["description"], "Team lunch");
}

#[tokio::test]
async fn transaction_listing_paginates() {
    let app = app().await;
    seed_mixed_transactions(&app).await;

    let (_, body) = send(&app, "GET", "/transactions?per_page=2", None).await;
    assert_eq!(body["total"], 4);
    assert_eq!(body["transactions"].as_array().unwrap().len(), 2);
    assert_eq!(body["transactions"][0]["description"], "Interest");

    let (_, body) = send(&app, "GET", "/transactions?page=2&per_page=2", None).await;
    assert_eq!(body["transactions"].as_array().unwrap().len(), 2);
    assert_eq!(body["transactions"][1]["description"], "January salary");
}

#[tokio::test]
async fn summary_defaults_to_completed_only() {
    let app = app().await;
    seed_mixed_transactions(&app).await;

    let (status, body) = send(&app, "GET", "/transactions/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    let summary: SummaryView = serde_json::from_value(body).unwrap();
    assert_eq!(summary.total_transactions, 3);
    assert_eq!(summary.total_income.to_string(), "1050.00");
    assert_eq!(summary.total_expense.to_string(), "200.00");
    assert_eq!(summary.balance.to_string(), "850.00");
    assert!(summary.period_start.is_none());

    let (_, body) = send(
        &app,
        "GET",
        "/transactions/summary?only_completed=false",
        None,
    )
    .await;
    assert_eq!(body["total_transactions"], 4);
    assert_eq!(body["total_expense"], "275.00");

    let (_, body) = send(
        &app,
        "GET",
        "/transactions/summary?start_date=2026-02-01&end_date=2026-02-28",
        None,
    )
    .await;
    assert_eq!(body["total_transactions"], 1);
    assert_eq!(body["total_income"], "50.00");
    assert_eq!(body["period_start"], "2026-02-01");
    assert_eq!(body["period_end"], "2026-02-28");
}

#[tokio::test]
async fn updating_a_transaction_rebalances_both_accounts() {
    let app = app().await;
    let checking = seed_account(&app, "Checking", "1000.00").await;
    let savings = seed_account(&app, "Savings", "500.00").await;
    let food = seed_category(&app, "Food", "expense").await;
    let id = seed_transaction(
        &app, "Groceries", "200.00", "expense", "completed", "2026-01-08", checking, food,
    )
    .await;
    assert_eq!(account_balance(&app, checking).await, "800.00");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/transactions/{id}"),
        Some(json!({ "account_id": savings })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["account"]["name"], "Savings");
    assert_eq!(account_balance(&app, checking).await, "1000.00");
    assert_eq!(account_balance(&app, savings).await, "300.00");

    let (_, body) = send(
        &app,
        "PUT",
        &format!("/transactions/{id}"),
        Some(json!({ "amount": "50.00" })),
    )
    .await;
    assert_eq!(body["amount"], "50.00");
    assert_eq!(account_balance(&app, savings).await, "450.00");
}

#[tokio::test]
async fn update_kind_must_match_the_effective_category() {
    let app = app().await;
    let account = seed_account(&app, "Checking", "1000.00").await;
    let food = seed_category(&app, "Food", "expense").await;
    let id = seed_transaction(
        &app, "Groceries", "200.00", "expense", "completed", "2026-01-08", account, food,
    )
    .await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/transactions/{id}"),
        Some(json!({ "type": "income" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("cannot use"));
    // The refused update must not leak into the balance.
    assert_eq!(account_balance(&app, account).await, "800.00");
}

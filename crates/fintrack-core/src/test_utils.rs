//! Test utilities for fintrack-core
//!
//! This module provides a mock dashboard backend that speaks the same REST
//! contract as the real one, for development and integration tests.

use std::collections::{BTreeMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::models::CategoryBudget;

#[derive(Default)]
struct ServerData {
    saved: BTreeMap<String, f64>,
    generate_response: Value,
    transactions: Value,
    failing_categories: HashSet<String>,
    generate_calls: usize,
}

type Shared = Arc<Mutex<ServerData>>;

fn lock(data: &Shared) -> MutexGuard<'_, ServerData> {
    data.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock budget backend server for testing and development
pub struct MockBudgetServer {
    addr: SocketAddr,
    data: Shared,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockBudgetServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let data: Shared = Arc::new(Mutex::new(ServerData {
            generate_response: json!({"estimated_monthly_income": 0.0, "suggestions": []}),
            transactions: json!([]),
            ..Default::default()
        }));

        let app = Router::new()
            .route("/budget", get(handle_list).post(handle_upsert))
            .route("/budget/generate", post(handle_generate))
            .route("/transactions", get(handle_transactions))
            .route("/config", get(handle_config))
            .with_state(data.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            data,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Pre-populate saved budgets
    pub fn seed_budgets(&self, budgets: &[(&str, f64)]) {
        let mut data = lock(&self.data);
        for (category, limit) in budgets {
            data.saved.insert(category.to_string(), *limit);
        }
    }

    /// Raw JSON body returned by `POST /budget/generate`
    pub fn set_generate_response(&self, body: Value) {
        lock(&self.data).generate_response = body;
    }

    /// Raw JSON body returned by `GET /transactions`
    pub fn set_transactions(&self, body: Value) {
        lock(&self.data).transactions = body;
    }

    /// Answer 500 to upserts for `category`
    pub fn fail_category(&self, category: &str) {
        lock(&self.data)
            .failing_categories
            .insert(category.to_string());
    }

    pub fn saved(&self) -> BTreeMap<String, f64> {
        lock(&self.data).saved.clone()
    }

    pub fn generate_calls(&self) -> usize {
        lock(&self.data).generate_calls
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockBudgetServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_list(State(data): State<Shared>) -> Json<Vec<CategoryBudget>> {
    let data = lock(&data);
    Json(
        data.saved
            .iter()
            .map(|(c, v)| CategoryBudget::new(c.clone(), *v))
            .collect(),
    )
}

async fn handle_upsert(
    State(data): State<Shared>,
    Json(budget): Json<CategoryBudget>,
) -> Result<Json<Value>, StatusCode> {
    let mut data = lock(&data);
    if data.failing_categories.contains(&budget.category) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    data.saved.insert(budget.category, budget.monthly_limit);
    Ok(Json(json!({"status": "ok"})))
}

async fn handle_generate(State(data): State<Shared>) -> Json<Value> {
    let mut data = lock(&data);
    data.generate_calls += 1;
    Json(data.generate_response.clone())
}

async fn handle_transactions(State(data): State<Shared>) -> Json<Value> {
    Json(lock(&data).transactions.clone())
}

async fn handle_config() -> Json<Value> {
    Json(json!({"llm_type": "local"}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendClient, BudgetBackend, HttpBackend};
    use crate::error::Error;
    use crate::planner::{BudgetPlanner, LoadOutcome};

    #[tokio::test]
    async fn test_mock_server_starts() {
        let server = MockBudgetServer::start().await;
        assert!(server.url().starts_with("http://127.0.0.1:"));
    }

    #[tokio::test]
    async fn test_fetch_and_upsert() {
        let server = MockBudgetServer::start().await;
        server.seed_budgets(&[("Rent", 1500.0)]);
        let client = HttpBackend::new(&server.url());

        client
            .upsert_budget(&CategoryBudget::new("Food", 320.5))
            .await
            .unwrap();
        let budgets = client.fetch_budgets().await.unwrap();

        assert_eq!(
            budgets,
            vec![
                CategoryBudget::new("Food", 320.5),
                CategoryBudget::new("Rent", 1500.0),
            ]
        );
    }

    #[tokio::test]
    async fn test_upsert_server_error() {
        let server = MockBudgetServer::start().await;
        server.fail_category("Rent");
        let client = HttpBackend::new(&server.url());

        let result = client
            .upsert_budget(&CategoryBudget::new("Rent", 1500.0))
            .await;
        assert!(matches!(result, Err(Error::Http(_))));
        assert!(server.saved().is_empty());
    }

    #[tokio::test]
    async fn test_generate_full_shape() {
        let server = MockBudgetServer::start().await;
        server.set_generate_response(json!({
            "estimated_monthly_income": 4200.0,
            "suggestions": [
                {"category": "Food", "historical_avg": 450.0, "suggested_limit": 500.0, "reasoning": "Variable"}
            ]
        }));
        let client = HttpBackend::new(&server.url());

        let set = client.generate_suggestions().await.unwrap();
        assert_eq!(set.estimated_monthly_income, Some(4200.0));
        assert_eq!(set.suggestions[0].category, "Food");
        assert_eq!(server.generate_calls(), 1);
    }

    #[tokio::test]
    async fn test_generate_bare_list() {
        let server = MockBudgetServer::start().await;
        server.set_generate_response(json!([
            {"category": "Transport", "historical_avg": 90.0, "suggested_limit": 100.0}
        ]));
        let client = HttpBackend::new(&server.url());

        let set = client.generate_suggestions().await.unwrap();
        assert_eq!(set.estimated_monthly_income, None);
        assert_eq!(set.suggestions[0].suggested_limit, 100.0);
    }

    #[tokio::test]
    async fn test_generate_malformed_body() {
        let server = MockBudgetServer::start().await;
        server.set_generate_response(json!({"suggestions": "nope"}));
        let client = HttpBackend::new(&server.url());

        let result = client.generate_suggestions().await;
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[tokio::test]
    async fn test_generate_unrelated_object() {
        let server = MockBudgetServer::start().await;
        server.set_generate_response(json!({"detail": "LLM unavailable"}));
        let client = HttpBackend::new(&server.url());

        let result = client.generate_suggestions().await;
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[tokio::test]
    async fn test_transactions_and_config() {
        let server = MockBudgetServer::start().await;
        server.set_transactions(json!([
            {"id": 1, "date": "2026-03-04", "description": "GROCER", "amount": -52.1, "category": "Food"},
            {"id": 2, "date": "2026-03-05", "description": "PAYROLL", "amount": 2500.0}
        ]));
        let client = HttpBackend::new(&server.url());

        let transactions = client.fetch_transactions().await.unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[1].category, None);

        let info = client.backend_info().await.unwrap();
        assert_eq!(info.llm_type, "local");
    }

    #[tokio::test]
    async fn test_planner_over_http() {
        let server = MockBudgetServer::start().await;
        server.seed_budgets(&[("Rent", 1500.0)]);
        server.set_generate_response(json!({
            "estimated_monthly_income": 2000.0,
            "suggestions": [
                {"category": "Rent", "historical_avg": 1500.0, "suggested_limit": 1400.0},
                {"category": "Food", "historical_avg": 450.0, "suggested_limit": 500.0}
            ]
        }));
        let planner = BudgetPlanner::new(BackendClient::http(&server.url()));

        assert_eq!(
            planner.refresh_budgets().await.unwrap(),
            LoadOutcome::Applied { categories: 1 }
        );
        planner.generate().await.unwrap();

        let state = planner.state();
        assert_eq!(state.budgets.get("Rent"), Some(&1500.0));
        assert_eq!(state.budgets.get("Food"), Some(&500.0));
        assert_eq!(state.estimated_income, 2000.0);
        assert!(planner.reconciliation().balanced);

        let report = planner.save().await.unwrap();
        assert!(report.is_success());
        assert_eq!(server.saved().get("Food"), Some(&500.0));
    }
}

//! Dashboard backend abstraction
//!
//! The planner talks to the dashboard's REST backend through the
//! `BudgetBackend` trait. Persisting budgets, generating suggestions and
//! serving transactions all happen on the other side of this boundary.
//!
//! # Architecture
//!
//! - `BudgetBackend` trait: the calls the planner needs
//! - `BackendClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Implementations: `HttpBackend` (reqwest), `MockBackend` (in-memory)

mod http;
mod mock;

pub use http::HttpBackend;
pub use mock::MockBackend;

use async_trait::async_trait;

use crate::config::BackendConfig;
use crate::error::Result;
use crate::models::{BackendInfo, CategoryBudget, SuggestionSet, Transaction};

/// Calls the planner makes against the dashboard backend
#[async_trait]
pub trait BudgetBackend: Send + Sync {
    /// Fetch every saved budget limit
    async fn fetch_budgets(&self) -> Result<Vec<CategoryBudget>>;

    /// Create or replace the saved limit for one category
    async fn upsert_budget(&self, budget: &CategoryBudget) -> Result<()>;

    /// Ask the backend for suggested limits and an income estimate
    async fn generate_suggestions(&self) -> Result<SuggestionSet>;

    /// Fetch transactions for spend aggregation
    async fn fetch_transactions(&self) -> Result<Vec<Transaction>>;

    /// Backend runtime info (LLM mode)
    async fn backend_info(&self) -> Result<BackendInfo>;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete backend client enum
#[derive(Clone)]
pub enum BackendClient {
    /// Dashboard REST backend
    Http(HttpBackend),
    /// In-memory backend for testing
    Mock(MockBackend),
}

impl BackendClient {
    /// Create an HTTP client from backend configuration
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        Ok(BackendClient::Http(HttpBackend::with_timeout(
            &config.base_url,
            config.timeout(),
        )?))
    }

    /// Create an HTTP client with default settings
    pub fn http(base_url: &str) -> Self {
        BackendClient::Http(HttpBackend::new(base_url))
    }
}

impl From<MockBackend> for BackendClient {
    fn from(backend: MockBackend) -> Self {
        BackendClient::Mock(backend)
    }
}

impl From<HttpBackend> for BackendClient {
    fn from(backend: HttpBackend) -> Self {
        BackendClient::Http(backend)
    }
}

// Implement BudgetBackend for BackendClient by delegating to the inner backend
#[async_trait]
impl BudgetBackend for BackendClient {
    async fn fetch_budgets(&self) -> Result<Vec<CategoryBudget>> {
        match self {
            BackendClient::Http(b) => b.fetch_budgets().await,
            BackendClient::Mock(b) => b.fetch_budgets().await,
        }
    }

    async fn upsert_budget(&self, budget: &CategoryBudget) -> Result<()> {
        match self {
            BackendClient::Http(b) => b.upsert_budget(budget).await,
            BackendClient::Mock(b) => b.upsert_budget(budget).await,
        }
    }

    async fn generate_suggestions(&self) -> Result<SuggestionSet> {
        match self {
            BackendClient::Http(b) => b.generate_suggestions().await,
            BackendClient::Mock(b) => b.generate_suggestions().await,
        }
    }

    async fn fetch_transactions(&self) -> Result<Vec<Transaction>> {
        match self {
            BackendClient::Http(b) => b.fetch_transactions().await,
            BackendClient::Mock(b) => b.fetch_transactions().await,
        }
    }

    async fn backend_info(&self) -> Result<BackendInfo> {
        match self {
            BackendClient::Http(b) => b.backend_info().await,
            BackendClient::Mock(b) => b.backend_info().await,
        }
    }

    fn host(&self) -> &str {
        match self {
            BackendClient::Http(b) => b.host(),
            BackendClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_client_mock() {
        let client = BackendClient::from(MockBackend::new());
        assert_eq!(client.host(), "mock://localhost");
    }

    #[test]
    fn test_backend_client_from_config() {
        let config = BackendConfig {
            base_url: "http://budget.lan:8000/".to_string(),
            timeout_secs: 5,
        };
        let client = BackendClient::from_config(&config).unwrap();
        assert_eq!(client.host(), "http://budget.lan:8000");
    }

    #[tokio::test]
    async fn test_mock_round_trip_through_client() {
        let client = BackendClient::from(MockBackend::new());
        client
            .upsert_budget(&CategoryBudget::new("Food", 300.0))
            .await
            .unwrap();
        let budgets = client.fetch_budgets().await.unwrap();
        assert_eq!(budgets, vec![CategoryBudget::new("Food", 300.0)]);
    }
}

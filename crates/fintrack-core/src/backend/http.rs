//! REST client for the dashboard backend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::Result;
use crate::models::{BackendInfo, CategoryBudget, SuggestionSet, Transaction};

use super::BudgetBackend;

/// HTTP backend
///
/// | Call | Route |
/// |---|---|
/// | saved budgets | `GET /budget` |
/// | upsert one budget | `POST /budget` |
/// | suggestions | `POST /budget/generate` |
/// | transactions | `GET /transactions` |
/// | runtime info | `GET /config` |
#[derive(Clone)]
pub struct HttpBackend {
    http_client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a backend with reqwest's default client
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a backend whose requests time out after `timeout`
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl BudgetBackend for HttpBackend {
    async fn fetch_budgets(&self) -> Result<Vec<CategoryBudget>> {
        let response = self
            .http_client
            .get(self.url("/budget"))
            .send()
            .await?
            .error_for_status()?;

        let budgets: Vec<CategoryBudget> = response.json().await?;
        debug!(count = budgets.len(), "Fetched saved budgets");
        Ok(budgets)
    }

    async fn upsert_budget(&self, budget: &CategoryBudget) -> Result<()> {
        self.http_client
            .post(self.url("/budget"))
            .json(budget)
            .send()
            .await?
            .error_for_status()?;

        debug!(category = %budget.category, limit = budget.monthly_limit, "Saved budget");
        Ok(())
    }

    async fn generate_suggestions(&self) -> Result<SuggestionSet> {
        let response = self
            .http_client
            .post(self.url("/budget/generate"))
            .send()
            .await?
            .error_for_status()?;

        // Decode from text so a malformed body surfaces as a JSON error
        let body = response.text().await?;
        let set: SuggestionSet = serde_json::from_str(&body)?;
        debug!(
            count = set.suggestions.len(),
            income = ?set.estimated_monthly_income,
            "Generated suggestions"
        );
        Ok(set)
    }

    async fn fetch_transactions(&self) -> Result<Vec<Transaction>> {
        let response = self
            .http_client
            .get(self.url("/transactions"))
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let transactions: Vec<Transaction> = serde_json::from_str(&body)?;
        debug!(count = transactions.len(), "Fetched transactions");
        Ok(transactions)
    }

    async fn backend_info(&self) -> Result<BackendInfo> {
        let response = self
            .http_client
            .get(self.url("/config"))
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_url_building() {
        let backend = HttpBackend::new("http://localhost:8000/");
        assert_eq!(backend.host(), "http://localhost:8000");
        assert_eq!(backend.url("/budget/generate"), "http://localhost:8000/budget/generate");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_http_error() {
        // Port 9 (discard) is not expected to host an HTTP server
        let backend =
            HttpBackend::with_timeout("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let result = backend.fetch_budgets().await;
        assert!(matches!(result, Err(Error::Http(_))));
    }
}

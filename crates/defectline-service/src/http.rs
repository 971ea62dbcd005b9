use async_trait::async_trait;
use defectline_core::{DefectReport, NewDefectReport};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{ReportStore, ServiceError};

#[derive(Debug, Deserialize)]
struct CreatedReport {
    id: u64,
}

/// Async HTTP implementation of [`ReportStore`].
/// Connects to the remote store's report endpoints.
pub struct HttpReportStore {
    base_url: String,
    client: Client,
}

impl HttpReportStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the store is reachable.
    pub async fn health_check(&self) -> Result<(), ServiceError> {
        let resp = self
            .client
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Internal(format!("connection failed: {e}")))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ServiceError::Internal(format!(
                "health check failed: {}",
                resp.status()
            )))
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ServiceError> {
        let resp = self
            .client
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let resp = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::Internal(format!("json decode: {e}")))
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn parse_error(status: StatusCode, resp: reqwest::Response) -> ServiceError {
    let body = resp.text().await.unwrap_or_default();
    let msg = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"].as_str().map(String::from))
        .unwrap_or(body);

    if status == StatusCode::NOT_FOUND {
        ServiceError::NotFound(msg)
    } else if status == StatusCode::BAD_REQUEST {
        ServiceError::InvalidInput(msg)
    } else {
        ServiceError::Internal(msg)
    }
}

#[async_trait]
impl ReportStore for HttpReportStore {
    async fn create_report(&self, report: &NewDefectReport) -> Result<u64, ServiceError> {
        let created: CreatedReport = self.post_json("/api/reports", report).await?;
        Ok(created.id)
    }

    async fn list_reports(&self) -> Result<Vec<DefectReport>, ServiceError> {
        self.get_json("/api/reports", &[]).await
    }

    async fn reports_by_department(
        &self,
        department: &str,
    ) -> Result<Vec<DefectReport>, ServiceError> {
        self.get_json("/api/reports", &[("department", department)])
            .await
    }

    async fn reports_by_product(
        &self,
        product_name: &str,
    ) -> Result<Vec<DefectReport>, ServiceError> {
        self.get_json("/api/reports", &[("product", product_name)])
            .await
    }
}

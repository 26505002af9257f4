//! HTTP client for the audit REST backend.

use audit_types::{
    AuditRecord, AuditSubmission, DashboardStats, ExportFormat, Gateway, GatewayError,
    RegulationRecord, SearchFilters,
};
use serde::de::DeserializeOwned;

/// Gateway that talks JSON over HTTP to the backend (e.g. `http://localhost:3001`).
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, GatewayError> {
        let res = req
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(res)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, GatewayError> {
        let res = self.send(req).await?;
        let body = res
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl Gateway for HttpGateway {
    async fn list_regulations(&self) -> Result<Vec<RegulationRecord>, GatewayError> {
        let req = self.client.get(self.url("/api/reglementation"));
        let rows: Vec<RegulationRecord> = self.get_json(req).await?;
        tracing::debug!(rows = rows.len(), "catalog fetched");
        Ok(rows)
    }

    async fn search_regulations(
        &self,
        filters: &SearchFilters,
    ) -> Result<Vec<AuditRecord>, GatewayError> {
        let req = self
            .client
            .get(self.url("/api/reglementation"))
            .query(&filters.query_pairs());
        let rows: Vec<AuditRecord> = self.get_json(req).await?;
        tracing::debug!(rows = rows.len(), query = %filters.query, "search answered");
        Ok(rows)
    }

    async fn submit_audit(&self, submission: &AuditSubmission) -> Result<(), GatewayError> {
        let req = self.client.post(self.url("/api/audit")).json(submission);
        self.send(req).await?;
        tracing::debug!(regulation_id = submission.regulation_id, "audit submitted");
        Ok(())
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, GatewayError> {
        let req = self.client.get(self.url("/api/dashboard/stats"));
        self.get_json(req).await
    }

    async fn export(&self, format: ExportFormat) -> Result<Vec<u8>, GatewayError> {
        let req = self
            .client
            .get(self.url("/api/dashboard/export"))
            .query(&[("format", format.as_str())]);
        let res = self.send(req).await?;
        let bytes = res
            .bytes()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

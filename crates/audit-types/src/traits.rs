//! Trait for the remote data gateway.

use crate::{
    AuditRecord, AuditSubmission, DashboardStats, ExportFormat, RegulationRecord, SearchFilters,
};
use async_trait::async_trait;

/// REST backend serving regulations, dashboard aggregates and audit persistence.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Full regulation catalog (`GET /api/reglementation`).
    async fn list_regulations(&self) -> Result<Vec<RegulationRecord>, GatewayError>;

    /// Filtered rows (`GET /api/reglementation?search=&titre=&domaine=`).
    async fn search_regulations(
        &self,
        filters: &SearchFilters,
    ) -> Result<Vec<AuditRecord>, GatewayError>;

    /// Persist one row's audit fields (`POST /api/audit`).
    async fn submit_audit(&self, submission: &AuditSubmission) -> Result<(), GatewayError>;

    /// Precomputed dashboard aggregate (`GET /api/dashboard/stats`).
    async fn dashboard_stats(&self) -> Result<DashboardStats, GatewayError>;

    /// Server-generated export blob (`GET /api/dashboard/export?format=`).
    async fn export(&self, format: ExportFormat) -> Result<Vec<u8>, GatewayError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("gateway returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("decode error: {0}")]
    Decode(String),
}

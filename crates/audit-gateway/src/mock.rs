//! Mock gateway for tests: in-memory catalog, scripted failures and delays, no network.

use audit_types::{
    AuditRecord, AuditSubmission, DashboardStats, ExportFormat, Gateway, GatewayError,
    RegulationRecord, SearchFilters,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Gateway operation, used to script failures and count calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockCall {
    ListRegulations,
    SearchRegulations,
    SubmitAudit,
    DashboardStats,
    Export,
}

/// Mock gateway that filters an in-memory catalog the way the backend does.
#[derive(Default)]
pub struct MockGateway {
    catalog: Mutex<Vec<AuditRecord>>,
    stats: Mutex<DashboardStats>,
    export_body: Mutex<Vec<u8>>,
    failing: Mutex<HashSet<MockCall>>,
    search_delays: Mutex<HashMap<String, Duration>>,
    stats_delay: Mutex<Option<Duration>>,
    submissions: Mutex<Vec<AuditSubmission>>,
    calls: Mutex<HashMap<MockCall, usize>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(records: Vec<AuditRecord>) -> Self {
        let gw = Self::new();
        *lock(&gw.catalog) = records;
        gw
    }

    /// Catalog row with unset audit fields.
    pub fn record(id: i64, title: &str, domain: &str, requirement: &str) -> AuditRecord {
        AuditRecord::from(RegulationRecord {
            id,
            title: title.to_string(),
            domain: domain.to_string(),
            requirement: requirement.to_string(),
        })
    }

    pub fn set_stats(&self, stats: DashboardStats) {
        *lock(&self.stats) = stats;
    }

    pub fn set_export_body(&self, body: impl Into<Vec<u8>>) {
        *lock(&self.export_body) = body.into();
    }

    /// Make `call` answer with a 500 until [`MockGateway::recover`].
    pub fn fail(&self, call: MockCall) {
        lock(&self.failing).insert(call);
    }

    pub fn recover(&self, call: MockCall) {
        lock(&self.failing).remove(&call);
    }

    /// Delay searches whose free-text query equals `query`.
    pub fn delay_search(&self, query: &str, delay: Duration) {
        lock(&self.search_delays).insert(query.to_string(), delay);
    }

    /// Delay every dashboard stats request.
    pub fn delay_stats(&self, delay: Duration) {
        *lock(&self.stats_delay) = Some(delay);
    }

    pub fn submissions(&self) -> Vec<AuditSubmission> {
        lock(&self.submissions).clone()
    }

    pub fn calls(&self, call: MockCall) -> usize {
        lock(&self.calls).get(&call).copied().unwrap_or(0)
    }

    fn enter(&self, call: MockCall) -> Result<(), GatewayError> {
        *lock(&self.calls).entry(call).or_insert(0) += 1;
        if lock(&self.failing).contains(&call) {
            return Err(GatewayError::Status {
                status: 500,
                body: format!("mock failure: {call:?}"),
            });
        }
        Ok(())
    }

    fn matches(rec: &AuditRecord, filters: &SearchFilters) -> bool {
        let reg = &rec.regulation;
        if !filters.title.is_empty() && reg.title != filters.title {
            return false;
        }
        if !filters.domain.is_empty() && reg.domain != filters.domain {
            return false;
        }
        if filters.query.is_empty() {
            return true;
        }
        let needle = filters.query.to_lowercase();
        [&reg.title, &reg.domain, &reg.requirement]
            .iter()
            .any(|text| text.to_lowercase().contains(&needle))
    }
}

#[async_trait::async_trait]
impl Gateway for MockGateway {
    async fn list_regulations(&self) -> Result<Vec<RegulationRecord>, GatewayError> {
        self.enter(MockCall::ListRegulations)?;
        Ok(lock(&self.catalog)
            .iter()
            .map(|r| r.regulation.clone())
            .collect())
    }

    async fn search_regulations(
        &self,
        filters: &SearchFilters,
    ) -> Result<Vec<AuditRecord>, GatewayError> {
        let delay = lock(&self.search_delays).get(&filters.query).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.enter(MockCall::SearchRegulations)?;
        Ok(lock(&self.catalog)
            .iter()
            .filter(|r| Self::matches(r, filters))
            .cloned()
            .collect())
    }

    async fn submit_audit(&self, submission: &AuditSubmission) -> Result<(), GatewayError> {
        self.enter(MockCall::SubmitAudit)?;
        lock(&self.submissions).push(submission.clone());
        Ok(())
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, GatewayError> {
        let delay = *lock(&self.stats_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.enter(MockCall::DashboardStats)?;
        Ok(lock(&self.stats).clone())
    }

    async fn export(&self, _format: ExportFormat) -> Result<Vec<u8>, GatewayError> {
        self.enter(MockCall::Export)?;
        Ok(lock(&self.export_body).clone())
    }
}

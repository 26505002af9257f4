//! Dashboard page: server-computed aggregates, manual refresh, export download.

use crate::{Notifier, ViewError};
use audit_types::{
    Conformity, DashboardStats, DeadlineItem, ExportFormat, Gateway, RiskLevel,
    FALLBACK_CHART_COLOR,
};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

pub(crate) const DASHBOARD_FAILED: &str = "Erreur lors du chargement du dashboard";
pub(crate) const EXPORT_FAILED: &str = "Erreur lors de l'export";

/// One bar or pie slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSlice {
    pub label: String,
    pub count: u64,
    pub color: &'static str,
}

const UNSET_LABEL: &str = "Non évalué";

pub fn compliance_chart(stats: &DashboardStats) -> Vec<ChartSlice> {
    stats
        .compliance
        .iter()
        .map(|b| ChartSlice {
            label: b.status.map(Conformity::as_str).unwrap_or(UNSET_LABEL).to_string(),
            count: b.count,
            color: b
                .status
                .map(|s| s.badge().chart_color)
                .unwrap_or(FALLBACK_CHART_COLOR),
        })
        .collect()
}

pub fn risk_chart(stats: &DashboardStats) -> Vec<ChartSlice> {
    stats
        .risk
        .iter()
        .map(|b| ChartSlice {
            label: b.level.map(RiskLevel::as_str).unwrap_or(UNSET_LABEL).to_string(),
            count: b.count,
            color: b
                .level
                .map(|l| l.badge().chart_color)
                .unwrap_or(FALLBACK_CHART_COLOR),
        })
        .collect()
}

/// Last fetched aggregate plus the refresh and export actions.
pub struct DashboardView {
    gateway: Arc<dyn Gateway>,
    notifier: Arc<Notifier>,
    download_dir: PathBuf,
    stats: RwLock<Option<DashboardStats>>,
    /// Refreshes in flight.
    refreshing: AtomicUsize,
}

impl DashboardView {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        notifier: Arc<Notifier>,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            gateway,
            notifier,
            download_dir: download_dir.into(),
            stats: RwLock::new(None),
            refreshing: AtomicUsize::new(0),
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::SeqCst) > 0
    }

    pub async fn stats(&self) -> Option<DashboardStats> {
        self.stats.read().await.clone()
    }

    /// Fetch a fresh aggregate. On failure the previous snapshot stays displayed.
    pub async fn refresh(&self) -> Result<DashboardStats, ViewError> {
        self.refreshing.fetch_add(1, Ordering::SeqCst);
        let result = self.gateway.dashboard_stats().await;
        self.refreshing.fetch_sub(1, Ordering::SeqCst);
        match result {
            Ok(stats) => {
                tracing::info!(
                    regulations = stats.totals.regulation_count,
                    audits = stats.totals.audit_count,
                    "dashboard refreshed"
                );
                *self.stats.write().await = Some(stats.clone());
                Ok(stats)
            }
            Err(e) => {
                tracing::warn!(error = %e, "dashboard refresh failed");
                self.notifier.error(DASHBOARD_FAILED).await;
                Err(e.into())
            }
        }
    }

    /// Upcoming deadlines due no later than `days` after `today` (overdue ones included).
    pub async fn upcoming_within(&self, days: u32, today: NaiveDate) -> Vec<DeadlineItem> {
        let limit = today + Duration::days(i64::from(days));
        self.stats
            .read()
            .await
            .as_ref()
            .map(|s| {
                s.upcoming_deadlines
                    .iter()
                    .filter(|d| d.deadline.is_some_and(|date| date <= limit))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Fetch the export blob for `format`.
    pub async fn download(&self, format: ExportFormat) -> Result<Vec<u8>, ViewError> {
        match self.gateway.export(format).await {
            Ok(bytes) => {
                tracing::info!(%format, bytes = bytes.len(), "export downloaded");
                Ok(bytes)
            }
            Err(e) => {
                tracing::warn!(%format, error = %e, "export failed");
                self.notifier.error(EXPORT_FAILED).await;
                Err(e.into())
            }
        }
    }

    /// Download the export and write it as `audit_export.<format>` in the download directory.
    pub async fn export_to_file(&self, format: ExportFormat) -> Result<PathBuf, ViewError> {
        let bytes = self.download(format).await?;
        let path = self.download_dir.join(format.file_name());
        if let Err(e) = tokio::fs::write(&path, &bytes).await {
            tracing::warn!(path = %path.display(), error = %e, "writing export failed");
            self.notifier.error(EXPORT_FAILED).await;
            return Err(e.into());
        }
        Ok(path)
    }
}

//! AuditSession: the single owner of all view state.

use crate::{
    AuditEditor, Catalog, DashboardView, EditBuffer, FilterController, FilterOptions,
    FilterState, Notification, Notifier, SearchExecutor, SearchOutcome, Settings, SettingsPatch,
    ViewConfig, ViewError,
};
use audit_types::{
    AuditEdit, AuditField, AuditRecord, DashboardStats, DeadlineItem, ExportFormat, Gateway,
    RegulationId, SearchFilters, UnknownVariant,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

pub(crate) const CATALOG_FAILED: &str = "Erreur lors du chargement des données";

/// Sidebar entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Dashboard,
    Search,
    Settings,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Dashboard, Page::Search, Page::Settings];

    pub fn as_str(self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::Search => "search",
            Page::Settings => "settings",
        }
    }

    /// Sidebar label.
    pub fn label(self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Search => "Recherche",
            Page::Settings => "Paramètres",
        }
    }

    /// Unknown names fall back to the dashboard.
    pub fn from_name(name: &str) -> Page {
        name.parse().unwrap_or_default()
    }
}

impl FromStr for Page {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dashboard" => Ok(Page::Dashboard),
            "search" => Ok(Page::Search),
            "settings" => Ok(Page::Settings),
            other => Err(UnknownVariant {
                kind: "page",
                value: other.to_string(),
            }),
        }
    }
}

/// Serializable picture of the whole session, for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub page: Page,
    pub filters: FilterState,
    pub options: FilterOptions,
    pub results: Vec<AuditRecord>,
    pub searching: bool,
    pub catalog_loading: bool,
    pub catalog_size: usize,
    pub notification: Option<Notification>,
    pub settings: Settings,
}

/// State container for one dashboard user: catalog, filters, results under edit,
/// notification, dashboard snapshot, settings and the current page.
pub struct AuditSession {
    notifier: Arc<Notifier>,
    gateway: Arc<dyn Gateway>,
    catalog: RwLock<Catalog>,
    filters: RwLock<FilterController>,
    buffer: Arc<RwLock<EditBuffer>>,
    search: SearchExecutor,
    editor: AuditEditor,
    dashboard: DashboardView,
    settings: RwLock<Settings>,
    page: RwLock<Page>,
    catalog_loading: AtomicBool,
}

impl AuditSession {
    pub fn new(gateway: Arc<dyn Gateway>, config: &ViewConfig) -> Self {
        let notifier = Arc::new(Notifier::new(config.notify_ttl));
        let buffer = Arc::new(RwLock::new(EditBuffer::default()));
        Self {
            search: SearchExecutor::new(
                Arc::clone(&gateway),
                Arc::clone(&notifier),
                Arc::clone(&buffer),
            ),
            editor: AuditEditor::new(
                Arc::clone(&gateway),
                Arc::clone(&notifier),
                Arc::clone(&buffer),
            ),
            dashboard: DashboardView::new(
                Arc::clone(&gateway),
                Arc::clone(&notifier),
                config.download_dir.clone(),
            ),
            gateway,
            notifier,
            buffer,
            catalog: RwLock::new(Catalog::default()),
            filters: RwLock::new(FilterController::default()),
            settings: RwLock::new(Settings::from_config(config)),
            page: RwLock::new(Page::default()),
            catalog_loading: AtomicBool::new(false),
        }
    }

    /// Build a session and run the startup loads (catalog, then dashboard). Load failures
    /// are notified; the session is usable either way.
    pub async fn start(gateway: Arc<dyn Gateway>, config: &ViewConfig) -> Self {
        let session = Self::new(gateway, config);
        let _ = session.load_catalog().await;
        let _ = session.refresh_dashboard().await;
        session
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    /// Fetch the regulation catalog and reset the dropdowns to it.
    pub async fn load_catalog(&self) -> Result<usize, ViewError> {
        self.catalog_loading.store(true, Ordering::SeqCst);
        let result = self.gateway.list_regulations().await;
        self.catalog_loading.store(false, Ordering::SeqCst);
        match result {
            Ok(records) => {
                let catalog = Catalog::new(records);
                let size = catalog.len();
                self.filters.write().await.load(&catalog);
                *self.catalog.write().await = catalog;
                tracing::info!(size, "catalog loaded");
                Ok(size)
            }
            Err(e) => {
                tracing::warn!(error = %e, "catalog load failed");
                self.notifier.error(CATALOG_FAILED).await;
                Err(e.into())
            }
        }
    }

    pub async fn page(&self) -> Page {
        *self.page.read().await
    }

    pub async fn navigate(&self, page: Page) {
        *self.page.write().await = page;
        tracing::debug!(page = page.as_str(), "navigated");
    }

    pub async fn set_query(&self, query: impl Into<String>) {
        self.filters.write().await.set_query(query);
    }

    pub async fn set_domain(&self, domain: impl Into<String>) -> FilterOptions {
        let catalog = self.catalog.read().await;
        self.filters
            .write()
            .await
            .set_domain(&catalog, domain)
            .clone()
    }

    pub async fn set_title(&self, title: impl Into<String>) -> FilterOptions {
        let catalog = self.catalog.read().await;
        self.filters.write().await.set_title(&catalog, title).clone()
    }

    pub async fn filter_state(&self) -> FilterState {
        self.filters.read().await.state().clone()
    }

    pub async fn filter_options(&self) -> FilterOptions {
        self.filters.read().await.options().clone()
    }

    /// Search with the current filter values.
    pub async fn search(&self) -> SearchOutcome {
        let filters = self.filters.read().await.filters();
        self.search.search(&filters).await
    }

    /// Confirm key on the query field: store the text, then search.
    pub async fn submit_query(&self, query: impl Into<String>) -> SearchOutcome {
        self.set_query(query).await;
        self.search().await
    }

    /// Search with explicit values, leaving the filter controls as they are.
    pub async fn search_with(&self, filters: &SearchFilters) -> SearchOutcome {
        self.search.search(filters).await
    }

    pub fn is_searching(&self) -> bool {
        self.search.is_searching()
    }

    pub async fn results(&self) -> Vec<AuditRecord> {
        self.buffer.read().await.rows().to_vec()
    }

    pub async fn set_field(&self, id: RegulationId, edit: AuditEdit) -> Result<(), ViewError> {
        self.editor.set_field(id, edit).await
    }

    /// Apply every edit of a row form at once.
    pub async fn set_fields(
        &self,
        id: RegulationId,
        edits: Vec<AuditEdit>,
    ) -> Result<(), ViewError> {
        self.editor.set_fields(id, edits).await
    }

    pub async fn set_field_str(
        &self,
        id: RegulationId,
        field: AuditField,
        raw: &str,
    ) -> Result<(), ViewError> {
        self.editor.set_field_str(id, field, raw).await
    }

    pub async fn save(&self, id: RegulationId) -> Result<(), ViewError> {
        self.editor.save(id).await
    }

    pub fn dashboard(&self) -> &DashboardView {
        &self.dashboard
    }

    pub async fn refresh_dashboard(&self) -> Result<DashboardStats, ViewError> {
        self.dashboard.refresh().await
    }

    /// Deadlines inside the configured alert window.
    pub async fn upcoming_deadlines(&self, today: NaiveDate) -> Vec<DeadlineItem> {
        let days = self.settings.read().await.alert_days;
        self.dashboard.upcoming_within(days, today).await
    }

    /// Export blob in `format`, or in the default format from the settings.
    pub async fn download_export(
        &self,
        format: Option<ExportFormat>,
    ) -> Result<(ExportFormat, Vec<u8>), ViewError> {
        let format = match format {
            Some(f) => f,
            None => self.settings.read().await.export_format,
        };
        let bytes = self.dashboard.download(format).await?;
        Ok((format, bytes))
    }

    pub async fn export_to_file(&self, format: Option<ExportFormat>) -> Result<PathBuf, ViewError> {
        let format = match format {
            Some(f) => f,
            None => self.settings.read().await.export_format,
        };
        self.dashboard.export_to_file(format).await
    }

    pub async fn settings(&self) -> Settings {
        self.settings.read().await.clone()
    }

    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<Settings, ViewError> {
        let mut settings = self.settings.write().await;
        settings.apply(patch)?;
        self.notifier.set_enabled(settings.notifications_enabled);
        tracing::info!(
            alert_days = settings.alert_days,
            notifications = settings.notifications_enabled,
            export_format = %settings.export_format,
            "settings updated"
        );
        Ok(settings.clone())
    }

    pub async fn notification(&self) -> Option<Notification> {
        self.notifier.current().await
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let (filters, options) = {
            let f = self.filters.read().await;
            (f.state().clone(), f.options().clone())
        };
        SessionSnapshot {
            page: self.page().await,
            filters,
            options,
            results: self.results().await,
            searching: self.is_searching(),
            catalog_loading: self.catalog_loading.load(Ordering::SeqCst),
            catalog_size: self.catalog.read().await.len(),
            notification: self.notification().await,
            settings: self.settings().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NotificationKind;
    use audit_gateway::{MockCall, MockGateway};
    use audit_types::{Conformity, RiskLevel};

    fn gateway() -> Arc<MockGateway> {
        Arc::new(MockGateway::with_catalog(vec![
            MockGateway::record(3, "Code du travail", "Sécurité", "Fire safety: extincteurs"),
            MockGateway::record(5, "ICPE", "Environnement", "Rejets"),
            MockGateway::record(7, "ERP", "Sécurité", "Fire safety: issues de secours"),
        ]))
    }

    #[tokio::test]
    async fn startup_loads_catalog_and_full_options() {
        let session = AuditSession::start(gateway(), &ViewConfig::default()).await;
        let snap = session.snapshot().await;
        assert_eq!(snap.page, Page::Dashboard);
        assert_eq!(snap.catalog_size, 3);
        assert_eq!(snap.options.titles, vec!["Code du travail", "ICPE", "ERP"]);
        assert_eq!(snap.options.domains, vec!["Sécurité", "Environnement"]);
        assert!(snap.results.is_empty());
    }

    #[tokio::test]
    async fn failed_catalog_load_is_notified_and_session_survives() {
        let gw = gateway();
        gw.fail(MockCall::ListRegulations);
        let session = AuditSession::new(gw, &ViewConfig::default());

        assert!(session.load_catalog().await.is_err());
        let n = session.notification().await.unwrap();
        assert_eq!(n.kind, NotificationKind::Error);
        assert_eq!(n.message, CATALOG_FAILED);
        assert!(session.filter_options().await.titles.is_empty());
        assert!(matches!(session.search().await, SearchOutcome::Applied(_)));
    }

    #[tokio::test]
    async fn filters_drive_search() {
        let session = AuditSession::start(gateway(), &ViewConfig::default()).await;
        let options = session.set_domain("Environnement").await;
        assert_eq!(options.titles, vec!["ICPE"]);

        let outcome = session.search().await;
        let ids: Vec<i64> = session.results().await.iter().map(|r| r.id()).collect();
        assert_eq!(outcome.count(), Some(1));
        assert_eq!(ids, vec![5]);
    }

    #[tokio::test]
    async fn confirm_key_searches_with_the_typed_query() {
        let session = AuditSession::start(gateway(), &ViewConfig::default()).await;
        let outcome = session.submit_query("fire safety").await;
        assert_eq!(outcome.count(), Some(2));
        assert_eq!(session.filter_state().await.query, "fire safety");
        assert_eq!(
            session.notification().await.unwrap().message,
            "2 résultats trouvés"
        );
    }

    #[tokio::test]
    async fn failed_save_leaves_row_unchanged() {
        let gw = gateway();
        let session = AuditSession::start(gw.clone(), &ViewConfig::default()).await;
        session.search().await;
        session
            .set_field(7, AuditEdit::Conformity(Some(Conformity::Compliant)))
            .await
            .unwrap();
        session
            .set_field_str(7, AuditField::Risk, "Moyen")
            .await
            .unwrap();
        let before = session.results().await;

        gw.fail(MockCall::SubmitAudit);
        assert!(session.save(7).await.is_err());

        assert_eq!(session.results().await, before);
        let row = session.results().await.into_iter().find(|r| r.id() == 7).unwrap();
        assert_eq!(row.conformity, Some(Conformity::Compliant));
        assert_eq!(row.risk, Some(RiskLevel::Medium));
        assert_eq!(
            session.notification().await.unwrap().kind,
            NotificationKind::Error
        );
    }

    #[tokio::test]
    async fn navigation_and_unknown_pages() {
        let session = AuditSession::new(gateway(), &ViewConfig::default());
        session.navigate(Page::Settings).await;
        assert_eq!(session.page().await, Page::Settings);
        assert_eq!(Page::from_name("reports"), Page::Dashboard);
        assert_eq!(Page::from_name("search"), Page::Search);
    }

    #[tokio::test]
    async fn disabling_notifications_silences_the_notifier() {
        let session = AuditSession::start(gateway(), &ViewConfig::default()).await;
        session
            .update_settings(SettingsPatch {
                notifications_enabled: Some(false),
                ..SettingsPatch::default()
            })
            .await
            .unwrap();
        session.notifier().dismiss().await;
        session.search().await;
        assert!(session.notification().await.is_none());
    }

    #[tokio::test]
    async fn export_uses_default_format_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        let gw = gateway();
        gw.set_export_body("{}");
        let config = ViewConfig {
            download_dir: dir.path().to_path_buf(),
            export_format: ExportFormat::Json,
            ..ViewConfig::default()
        };
        let session = AuditSession::new(gw, &config);
        let path = session.export_to_file(None).await.unwrap();
        assert_eq!(path, dir.path().join("audit_export.json"));
    }
}

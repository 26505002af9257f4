//! HTML pages and their form posts. Every post redirects back to its page, which shows
//! the outcome through the notification banner.

use crate::html;
use crate::server::{dashboard_data, AppState};
use audit_types::{AuditEdit, AuditField, ExportFormat, RegulationId};
use audit_view::{Page, SettingsPatch};
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;

const SETTINGS_SAVED: &str = "Paramètres sauvegardés";
const SETTINGS_INVALID: &str = "Paramètres invalides";

pub async fn index(State(state): State<Arc<AppState>>) -> Redirect {
    Redirect::to(html::page_path(state.session.page().await))
}

pub async fn dashboard(State(state): State<Arc<AppState>>) -> Html<String> {
    state.session.navigate(Page::Dashboard).await;
    let data = dashboard_data(&state.session).await;
    Html(html::dashboard_page(&state.session.snapshot().await, &data))
}

pub async fn refresh_dashboard(State(state): State<Arc<AppState>>) -> Redirect {
    // Failure is notified by the session; the previous snapshot stays displayed.
    let _ = state.session.refresh_dashboard().await;
    Redirect::to("/dashboard")
}

/// Query string of the search form: `search`, `titre` and `domaine` mirror the backend
/// parameters; `run` triggers the search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub titre: Option<String>,
    #[serde(default)]
    pub domaine: Option<String>,
    #[serde(default)]
    pub run: Option<String>,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(form): Query<SearchForm>,
) -> Html<String> {
    let session = &state.session;
    session.navigate(Page::Search).await;
    if let Some(domain) = form.domaine {
        session.set_domain(domain).await;
    }
    if let Some(title) = form.titre {
        session.set_title(title).await;
    }
    if let Some(query) = form.search {
        session.set_query(query).await;
    }
    if form.run.is_some() {
        session.search().await;
    }
    Html(html::search_page(&session.snapshot().await))
}

/// One result row as posted by its form. Missing fields post as empty, which clears them.
#[derive(Debug, Default, Deserialize)]
pub struct RowForm {
    #[serde(default)]
    pub conformite: String,
    #[serde(default)]
    pub risque: String,
    #[serde(default)]
    pub faisabilite: String,
    #[serde(default)]
    pub plan_action: String,
    #[serde(default)]
    pub deadline: String,
    #[serde(default)]
    pub owner: String,
}

impl RowForm {
    fn fields(&self) -> [(AuditField, &str); 6] {
        [
            (AuditField::Conformity, self.conformite.as_str()),
            (AuditField::Risk, self.risque.as_str()),
            (AuditField::Feasibility, self.faisabilite.as_str()),
            (AuditField::ActionPlan, self.plan_action.as_str()),
            (AuditField::Deadline, self.deadline.as_str()),
            (AuditField::Owner, self.owner.as_str()),
        ]
    }
}

/// Apply every field of the row, then save it. Values are all parsed first so a bad one
/// leaves the row untouched.
pub async fn save_row(
    State(state): State<Arc<AppState>>,
    Path(id): Path<RegulationId>,
    Form(form): Form<RowForm>,
) -> Redirect {
    let session = &state.session;
    let edits: Result<Vec<AuditEdit>, _> = form
        .fields()
        .into_iter()
        .map(|(field, raw)| AuditEdit::parse(field, raw))
        .collect();
    let edits = match edits {
        Ok(edits) => edits,
        Err(e) => {
            tracing::warn!(id, error = %e, "rejected row form");
            session
                .notifier()
                .error(format!("Valeur invalide pour {}", e.field))
                .await;
            return Redirect::to("/search");
        }
    };
    if let Err(e) = session.set_fields(id, edits).await {
        tracing::warn!(id, error = %e, "row edit failed");
        session.notifier().error(e.to_string()).await;
        return Redirect::to("/search");
    }
    let _ = session.save(id).await;
    Redirect::to("/search")
}

pub async fn settings(State(state): State<Arc<AppState>>) -> Html<String> {
    state.session.navigate(Page::Settings).await;
    Html(html::settings_page(&state.session.snapshot().await))
}

/// Settings form. An unchecked checkbox is absent from the body.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub alert_days: String,
    #[serde(default)]
    pub notifications_enabled: Option<String>,
    #[serde(default)]
    pub export_format: String,
}

impl SettingsForm {
    fn into_patch(self) -> Option<SettingsPatch> {
        let alert_days = match self.alert_days.trim() {
            "" => None,
            raw => Some(raw.parse().ok()?),
        };
        let export_format = match self.export_format.trim() {
            "" => None,
            raw => Some(raw.parse::<ExportFormat>().ok()?),
        };
        Some(SettingsPatch {
            alert_days,
            notifications_enabled: Some(self.notifications_enabled.is_some()),
            export_format,
        })
    }
}

pub async fn save_settings(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SettingsForm>,
) -> Redirect {
    let session = &state.session;
    let Some(patch) = form.into_patch() else {
        session.notifier().error(SETTINGS_INVALID).await;
        return Redirect::to("/settings");
    };
    match session.update_settings(patch).await {
        Ok(_) => {
            session.notifier().success(SETTINGS_SAVED).await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "settings rejected");
            session.notifier().error(SETTINGS_INVALID).await;
        }
    }
    Redirect::to("/settings")
}

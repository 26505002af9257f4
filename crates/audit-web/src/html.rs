//! Server-side HTML rendering of the sidebar layout and the three pages.

use crate::server::DashboardData;
use audit_types::{
    AuditRecord, Conformity, DeadlineItem, DomainStats, ExportFormat, Feasibility, RiskLevel,
};
use audit_view::{ChartSlice, NotificationKind, Page, SessionSnapshot};

const STYLE: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; background: #f9fafb; color: #111827; }
.app { display: flex; min-height: 100vh; }
.sidebar { width: 16rem; background: #fff; border-right: 1px solid #e5e7eb; display: flex; flex-direction: column; }
.sidebar h2 { padding: 1.5rem; margin: 0; font-size: 1.25rem; }
.sidebar nav a { display: block; padding: .75rem 1.5rem; color: #4b5563; text-decoration: none; }
.sidebar nav a.active { background: #eff6ff; color: #1d4ed8; border-right: 2px solid #1d4ed8; }
.sidebar .version { margin-top: auto; padding: 1.5rem; font-size: .75rem; color: #6b7280; }
main { flex: 1; padding: 2rem; }
.notification { position: fixed; top: 1rem; right: 1rem; padding: 1rem; border-radius: .5rem; color: #fff; }
.notification.success { background: #22c55e; }
.notification.error { background: #ef4444; }
.cards { display: grid; grid-template-columns: repeat(4, 1fr); gap: 1rem; margin-bottom: 1.5rem; }
.card { background: #fff; border-radius: .5rem; padding: 1.25rem; box-shadow: 0 1px 2px rgba(0,0,0,.05); }
.card p { margin: 0; }
.card .value { font-size: 1.5rem; font-weight: 600; }
.bar { height: .75rem; border-radius: .25rem; }
table { width: 100%; border-collapse: collapse; background: #fff; }
th, td { padding: .5rem .75rem; border-bottom: 1px solid #e5e7eb; text-align: left; vertical-align: top; }
.badge { display: inline-block; padding: .125rem .5rem; border-radius: 9999px; font-size: .75rem; }
.muted { color: #6b7280; font-size: .875rem; }
"#;

pub fn page_path(page: Page) -> &'static str {
    match page {
        Page::Dashboard => "/dashboard",
        Page::Search => "/search",
        Page::Settings => "/settings",
    }
}

fn esc(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(snapshot: &SessionSnapshot, title: &str, body: &str) -> String {
    let mut nav = String::new();
    for page in Page::ALL {
        let class = if page == snapshot.page { " class=\"active\"" } else { "" };
        nav.push_str(&format!(
            "<a href=\"{}\"{}>{}</a>",
            page_path(page),
            class,
            esc(page.label())
        ));
    }
    let notification = snapshot
        .notification
        .as_ref()
        .map(|n| {
            let kind = match n.kind {
                NotificationKind::Success => "success",
                NotificationKind::Error => "error",
            };
            format!(
                "<div class=\"notification {kind}\" role=\"status\">{}</div>",
                esc(&n.message)
            )
        })
        .unwrap_or_default();
    format!(
        "<!DOCTYPE html>\n<html lang=\"fr\"><head><meta charset=\"utf-8\">\
         <title>{} · Audit Pro</title><style>{STYLE}</style></head>\
         <body><div class=\"app\"><aside class=\"sidebar\"><h2>Audit Pro</h2><nav>{nav}</nav>\
         <div class=\"version\">v{}</div></aside><main>{notification}{body}</main></div>\
         </body></html>",
        esc(title),
        esc(snapshot.settings.version)
    )
}

fn card(label: &str, value: &str) -> String {
    format!(
        "<div class=\"card\"><p class=\"muted\">{}</p><p class=\"value\">{}</p></div>",
        esc(label),
        esc(value)
    )
}

fn chart(title: &str, slices: &[ChartSlice]) -> String {
    let max = slices.iter().map(|s| s.count).max().unwrap_or(0).max(1);
    let mut rows = String::new();
    for slice in slices {
        let width = u128::from(slice.count) * 100 / u128::from(max);
        rows.push_str(&format!(
            "<tr><td>{}</td><td style=\"width:60%\"><div class=\"bar\" \
             style=\"width:{width}%;background:{}\"></div></td><td>{}</td></tr>",
            esc(&slice.label),
            slice.color,
            slice.count
        ));
    }
    format!("<div class=\"card\"><h3>{}</h3><table>{rows}</table></div>", esc(title))
}

fn domain_row(domain: &DomainStats) -> String {
    let rate = domain.audit_rate();
    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
         <td><div class=\"bar\" style=\"width:{rate}%;background:#2563eb\"></div>{rate}%</td></tr>",
        esc(&domain.domain),
        domain.total,
        domain.audited,
        domain.compliant,
        domain.non_compliant
    )
}

fn deadline_row(item: &DeadlineItem) -> String {
    let deadline = item
        .deadline
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_default();
    let status = match item.conformity {
        Some(c) => conformity_badge(c),
        None => format!("<span class=\"badge\">{}</span>", esc(item.status_label())),
    };
    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{status}</td></tr>",
        esc(&item.title),
        esc(&item.domain),
        deadline,
        esc(item.owner_label())
    )
}

pub fn dashboard_page(snapshot: &SessionSnapshot, data: &DashboardData) -> String {
    let mut body = String::from(
        "<header><h1>Dashboard Audit</h1>\
         <p class=\"muted\">Vue d'ensemble de la conformité réglementaire</p>",
    );
    let disabled = if data.refreshing { " disabled" } else { "" };
    body.push_str(&format!(
        "<form method=\"post\" action=\"/dashboard/refresh\">\
         <button type=\"submit\"{disabled}>Actualiser</button></form>"
    ));
    for format in ExportFormat::ALL {
        body.push_str(&format!(
            " <a href=\"/view/dashboard/export?format={0}\">Exporter {1}</a>",
            format.as_str(),
            format.as_str().to_uppercase()
        ));
    }
    body.push_str("</header>");

    let Some(stats) = &data.stats else {
        body.push_str("<p>Erreur lors du chargement des données</p>");
        return layout(snapshot, "Dashboard", &body);
    };

    body.push_str("<section class=\"cards\">");
    body.push_str(&card(
        "Total Réglementations",
        &stats.totals.regulation_count.to_string(),
    ));
    body.push_str(&card("Audits Réalisés", &stats.totals.audit_count.to_string()));
    body.push_str(&card("Taux d'Audit", &format!("{}%", stats.totals.audit_rate)));
    body.push_str(&card("Échéances Proches", &data.upcoming.len().to_string()));
    body.push_str("</section>");

    body.push_str("<section class=\"cards\" style=\"grid-template-columns:1fr 1fr\">");
    body.push_str(&chart("Répartition par Conformité", &data.compliance_chart));
    body.push_str(&chart("Répartition par Risque", &data.risk_chart));
    body.push_str("</section>");

    body.push_str(
        "<section><h3>Audit par Domaine</h3><table><thead><tr><th>Domaine</th><th>Total</th>\
         <th>Audités</th><th>Conformes</th><th>Non Conformes</th><th>Taux Audit</th></tr>\
         </thead><tbody>",
    );
    for domain in &stats.domains {
        body.push_str(&domain_row(domain));
    }
    body.push_str("</tbody></table></section>");

    if !data.upcoming.is_empty() {
        body.push_str(&format!(
            "<section><h3>Échéances dans les {} prochains jours</h3><table><thead><tr>\
             <th>Titre</th><th>Domaine</th><th>Échéance</th><th>Responsable</th>\
             <th>Status</th></tr></thead><tbody>",
            snapshot.settings.alert_days
        ));
        for item in &data.upcoming {
            body.push_str(&deadline_row(item));
        }
        body.push_str("</tbody></table></section>");
    }
    layout(snapshot, "Dashboard", &body)
}

fn conformity_badge(conformity: Conformity) -> String {
    let badge = conformity.badge();
    format!(
        "<span class=\"badge {}\" data-icon=\"{}\" style=\"color:{}\">{}</span>",
        badge.badge_class,
        badge.icon,
        badge.chart_color,
        esc(conformity.as_str())
    )
}

fn risk_badge(risk: RiskLevel) -> String {
    let badge = risk.badge();
    format!(
        "<span class=\"badge {}\" style=\"color:{}\">{}</span>",
        badge.badge_class,
        badge.chart_color,
        esc(risk.as_str())
    )
}

/// `<select>` with an empty placeholder option first; `attrs` is appended to the tag.
fn select<'a>(
    name: &str,
    attrs: &str,
    placeholder: &str,
    values: impl IntoIterator<Item = &'a str>,
    selected: &str,
) -> String {
    let mut out = format!(
        "<select name=\"{name}\"{attrs}><option value=\"\">{}</option>",
        esc(placeholder)
    );
    for value in values {
        let attr = if value == selected { " selected" } else { "" };
        out.push_str(&format!(
            "<option value=\"{0}\"{attr}>{0}</option>",
            esc(value)
        ));
    }
    out.push_str("</select>");
    out
}

const CHOOSE: &str = "--Choisir--";

fn result_row(row: &AuditRecord) -> String {
    let id = row.id();
    let form = format!(" form=\"row-{id}\"");
    let conformity = select(
        "conformite",
        &form,
        CHOOSE,
        Conformity::ALL.iter().map(|c| c.as_str()),
        row.conformity.map(Conformity::as_str).unwrap_or(""),
    );
    let risk = select(
        "risque",
        &form,
        CHOOSE,
        RiskLevel::ALL.iter().map(|r| r.as_str()),
        row.risk.map(RiskLevel::as_str).unwrap_or(""),
    );
    let feasibility = select(
        "faisabilite",
        &form,
        CHOOSE,
        Feasibility::ALL.iter().map(|f| f.as_str()),
        row.feasibility.map(Feasibility::as_str).unwrap_or(""),
    );
    let deadline = row
        .deadline
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    format!(
        "<tr><td><form id=\"row-{id}\" method=\"post\" action=\"/search/rows/{id}\"></form>\
         <strong>{}</strong><div class=\"muted\">{}</div><div class=\"muted\">{}</div></td>\
         <td>{}{}</td><td>{}{}</td><td>{}</td>\
         <td><textarea name=\"plan_action\" form=\"row-{id}\" rows=\"2\">{}</textarea></td>\
         <td><input type=\"date\" name=\"deadline\" form=\"row-{id}\" value=\"{deadline}\"></td>\
         <td><input type=\"text\" name=\"owner\" form=\"row-{id}\" value=\"{}\" \
         placeholder=\"Responsable\"></td>\
         <td><button type=\"submit\" form=\"row-{id}\">Sauvegarder</button></td></tr>",
        esc(&row.regulation.title),
        esc(&row.regulation.domain),
        esc(&row.regulation.requirement),
        conformity,
        row.conformity.map(conformity_badge).unwrap_or_default(),
        risk,
        row.risk.map(risk_badge).unwrap_or_default(),
        feasibility,
        esc(row.action_plan.as_deref().unwrap_or("")),
        esc(row.owner.as_deref().unwrap_or(""))
    )
}

pub fn search_page(snapshot: &SessionSnapshot) -> String {
    let filters = &snapshot.filters;
    let mut body = String::from(
        "<header><h1>Audit Réglementaire</h1>\
         <p class=\"muted\">Recherche et audit de conformité des réglementations</p></header>",
    );
    body.push_str(&format!(
        "<form method=\"get\" action=\"/search\">\
         <input type=\"text\" name=\"search\" value=\"{}\" \
         placeholder=\"Rechercher par mot-clé...\">\
         {}{}<button type=\"submit\" name=\"run\" value=\"1\">{}</button></form>",
        esc(&filters.query),
        select(
            "domaine",
            "",
            "Tous les domaines",
            snapshot.options.domains.iter().map(String::as_str),
            &filters.domain,
        ),
        select(
            "titre",
            "",
            "Tous les titres",
            snapshot.options.titles.iter().map(String::as_str),
            &filters.title,
        ),
        if snapshot.searching { "Recherche..." } else { "Rechercher" }
    ));

    if !snapshot.results.is_empty() {
        body.push_str(&format!(
            "<p>{} résultats trouvés <a href=\"/view/dashboard/export\">Exporter</a></p>",
            snapshot.results.len()
        ));
    }
    body.push_str(
        "<table><thead><tr><th>Réglementation</th><th>Conformité</th><th>Risque</th>\
         <th>Faisabilité</th><th>Plan d'action</th><th>Échéance</th><th>Responsable</th>\
         <th>Actions</th></tr></thead><tbody>",
    );
    if snapshot.results.is_empty() {
        let empty = if snapshot.searching || snapshot.catalog_loading {
            "Chargement..."
        } else {
            "Aucun résultat trouvé"
        };
        body.push_str(&format!("<tr><td colspan=\"8\">{empty}</td></tr>"));
    }
    for row in &snapshot.results {
        body.push_str(&result_row(row));
    }
    body.push_str("</tbody></table>");
    layout(snapshot, "Recherche", &body)
}

pub fn settings_page(snapshot: &SessionSnapshot) -> String {
    let settings = &snapshot.settings;
    let checked = if settings.notifications_enabled { " checked" } else { "" };
    let formats = ExportFormat::ALL
        .iter()
        .map(|f| {
            let label = match f {
                ExportFormat::Csv => "CSV",
                ExportFormat::Xlsx => "Excel",
                ExportFormat::Json => "JSON",
            };
            let attr = if *f == settings.export_format { " selected" } else { "" };
            format!("<option value=\"{}\"{attr}>{label}</option>", f.as_str())
        })
        .collect::<String>();
    let body = format!(
        "<header><h1>Paramètres</h1><p class=\"muted\">Configuration de l'application</p></header>\
         <form method=\"post\" action=\"/settings\">\
         <section class=\"card\"><h3>Configuration Générale</h3>\
         <label>URL de l'API <input type=\"text\" value=\"{}\" readonly></label><br>\
         <label>Délai d'alerte (jours) <input type=\"number\" name=\"alert_days\" min=\"1\" \
         max=\"365\" value=\"{}\"></label><br>\
         <label><input type=\"checkbox\" name=\"notifications_enabled\"{checked}> \
         Activer les notifications</label></section>\
         <section class=\"card\"><h3>Export</h3>\
         <label>Format d'export par défaut \
         <select name=\"export_format\">{formats}</select></label>\
         </section><button type=\"submit\">Enregistrer</button></form>\
         <section class=\"card\"><h3>Informations Système</h3>\
         <p>Version: {}</p><p>Réglementations chargées: {}</p></section>",
        esc(&settings.api_url),
        settings.alert_days,
        esc(settings.version),
        snapshot.catalog_size
    );
    layout(snapshot, "Paramètres", &body)
}

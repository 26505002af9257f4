//! View state for the Audit Pro dashboard.
//!
//! [`AuditSession`] owns everything a browser tab would hold: the regulation
//! catalog, the dependent filter dropdowns, the search results being edited,
//! the transient notification, the dashboard snapshot and the settings.

mod buffer;
mod catalog;
mod dashboard;
mod error;
mod filter;
mod notify;
mod search;
mod session;
mod settings;

pub use audit_types::{Gateway, GatewayError};
pub use buffer::{AuditEditor, EditBuffer};
pub use catalog::Catalog;
pub use dashboard::{compliance_chart, risk_chart, ChartSlice, DashboardView};
pub use error::ViewError;
pub use filter::{FilterController, FilterOptions, FilterState};
pub use notify::{Notification, NotificationKind, Notifier, DEFAULT_NOTIFY_TTL};
pub use search::{SearchExecutor, SearchOutcome};
pub use session::{AuditSession, Page, SessionSnapshot};
pub use settings::{Settings, SettingsPatch, ViewConfig, APP_VERSION};

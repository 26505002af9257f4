//! Request and response DTOs compatible with the audit REST backend.

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Primary key of a regulation row.
pub type RegulationId = i64;

/// A value outside one of the closed enumerations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a closed enumeration carried on the wire as one of a fixed set of strings.
macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(de::Error::custom)
            }
        }
    };
}

closed_enum! {
    /// Compliance status of a regulation for the audited entity.
    Conformity, "conformity" {
        Compliant => "Conforme",
        NonCompliant => "Non Conforme",
        NotApplicable => "Non Applicable",
    }
}

closed_enum! {
    /// Assessed severity of non-compliance.
    RiskLevel, "risk level" {
        Low => "Faible",
        Medium => "Moyen",
        High => "Élevé",
    }
}

closed_enum! {
    /// Estimated difficulty of remediation.
    Feasibility, "feasibility" {
        Easy => "Facile",
        Medium => "Moyen",
        Hard => "Difficile",
    }
}

closed_enum! {
    /// Export formats offered by `/api/dashboard/export`.
    ExportFormat, "export format" {
        Csv => "csv",
        Xlsx => "xlsx",
        Json => "json",
    }
}

impl ExportFormat {
    /// File name the export is delivered under.
    pub fn file_name(self) -> String {
        format!("audit_export.{}", self.as_str())
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Json => "application/json",
        }
    }
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat::Csv
    }
}

/// Parse a deadline as sent by forms (`YYYY-MM-DD`) or by the backend
/// (full ISO timestamp; only the date part is kept).
pub fn parse_deadline(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    let raw = raw.trim();
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
}

/// Regulation row (read-only reference data owned by the backend).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegulationRecord {
    pub id: RegulationId,
    #[serde(rename = "titre", default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(rename = "domaine", default, deserialize_with = "null_as_empty")]
    pub domain: String,
    #[serde(rename = "exigence", default, deserialize_with = "null_as_empty")]
    pub requirement: String,
}

/// Mutable audit view of a regulation row, as returned by a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    #[serde(flatten)]
    pub regulation: RegulationRecord,
    #[serde(rename = "conformite", default, deserialize_with = "blank_as_none")]
    pub conformity: Option<Conformity>,
    #[serde(rename = "risque", default, deserialize_with = "blank_as_none")]
    pub risk: Option<RiskLevel>,
    #[serde(rename = "faisabilite", default, deserialize_with = "blank_as_none")]
    pub feasibility: Option<Feasibility>,
    #[serde(rename = "plan_action", default, deserialize_with = "blank_as_none")]
    pub action_plan: Option<String>,
    #[serde(default, deserialize_with = "deadline_or_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub owner: Option<String>,
}

impl AuditRecord {
    pub fn id(&self) -> RegulationId {
        self.regulation.id
    }

    /// Payload persisted by `POST /api/audit` for this row.
    pub fn submission(&self) -> AuditSubmission {
        AuditSubmission {
            regulation_id: self.regulation.id,
            conformity: self.conformity,
            risk: self.risk,
            feasibility: self.feasibility,
            action_plan: self.action_plan.clone(),
            deadline: self.deadline,
            owner: self.owner.clone(),
        }
    }
}

impl From<RegulationRecord> for AuditRecord {
    fn from(regulation: RegulationRecord) -> Self {
        Self {
            regulation,
            conformity: None,
            risk: None,
            feasibility: None,
            action_plan: None,
            deadline: None,
            owner: None,
        }
    }
}

/// Body of `POST /api/audit`. Unset fields are sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSubmission {
    #[serde(rename = "reglementation_id")]
    pub regulation_id: RegulationId,
    #[serde(rename = "conformite", default, deserialize_with = "blank_as_none")]
    pub conformity: Option<Conformity>,
    #[serde(rename = "risque", default, deserialize_with = "blank_as_none")]
    pub risk: Option<RiskLevel>,
    #[serde(rename = "faisabilite", default, deserialize_with = "blank_as_none")]
    pub feasibility: Option<Feasibility>,
    #[serde(rename = "plan_action", default, deserialize_with = "blank_as_none")]
    pub action_plan: Option<String>,
    #[serde(default, deserialize_with = "deadline_or_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub owner: Option<String>,
}

/// Search filters; an empty value means "no constraint on this field".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub domain: String,
}

impl SearchFilters {
    pub fn new(
        query: impl Into<String>,
        title: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            title: title.into(),
            domain: domain.into(),
        }
    }

    /// Query-string pairs for `GET /api/reglementation`. All three are always sent.
    pub fn query_pairs(&self) -> [(&'static str, &str); 3] {
        [
            ("search", self.query.as_str()),
            ("titre", self.title.as_str()),
            ("domaine", self.domain.as_str()),
        ]
    }
}

/// Aggregate returned by `GET /api/dashboard/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(rename = "totaux", default)]
    pub totals: Totals,
    #[serde(rename = "conformite", default)]
    pub compliance: Vec<ComplianceBucket>,
    #[serde(rename = "risque", default)]
    pub risk: Vec<RiskBucket>,
    #[serde(rename = "domaines", default)]
    pub domains: Vec<DomainStats>,
    #[serde(rename = "echeances_proches", default)]
    pub upcoming_deadlines: Vec<DeadlineItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    #[serde(rename = "reglementations", default, deserialize_with = "count")]
    pub regulation_count: u64,
    #[serde(rename = "audits", default, deserialize_with = "count")]
    pub audit_count: u64,
    #[serde(rename = "taux_audit", default, deserialize_with = "rate")]
    pub audit_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceBucket {
    #[serde(rename = "conformite", default, deserialize_with = "blank_as_none")]
    pub status: Option<Conformity>,
    #[serde(default, deserialize_with = "count")]
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBucket {
    #[serde(rename = "risque", default, deserialize_with = "blank_as_none")]
    pub level: Option<RiskLevel>,
    #[serde(default, deserialize_with = "count")]
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainStats {
    #[serde(rename = "domaine", default, deserialize_with = "null_as_empty")]
    pub domain: String,
    #[serde(default, deserialize_with = "count")]
    pub total: u64,
    #[serde(rename = "audites", default, deserialize_with = "count")]
    pub audited: u64,
    #[serde(rename = "conformes", default, deserialize_with = "count")]
    pub compliant: u64,
    #[serde(rename = "non_conformes", default, deserialize_with = "count")]
    pub non_compliant: u64,
}

impl DomainStats {
    /// Audited share of the domain in whole percent (0 for an empty domain).
    pub fn audit_rate(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.audited as f64 / self.total as f64) * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadlineItem {
    #[serde(rename = "titre", default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(rename = "domaine", default, deserialize_with = "null_as_empty")]
    pub domain: String,
    #[serde(default, deserialize_with = "deadline_or_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub owner: Option<String>,
    #[serde(rename = "conformite", default, deserialize_with = "blank_as_none")]
    pub conformity: Option<Conformity>,
}

impl DeadlineItem {
    pub fn owner_label(&self) -> &str {
        self.owner.as_deref().unwrap_or("Non assigné")
    }

    pub fn status_label(&self) -> &str {
        self.conformity.map(Conformity::as_str).unwrap_or("En attente")
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.parse().map(Some).map_err(de::Error::custom),
    }
}

fn deadline_or_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_deadline(&s).map(Some).map_err(de::Error::custom),
    }
}

/// Aggregates may come back as JSON numbers or as numeric strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Int(u64),
    Float(f64),
    Text(String),
}

impl Numeric {
    fn as_f64<E: de::Error>(&self) -> Result<f64, E> {
        match self {
            Numeric::Int(v) => Ok(*v as f64),
            Numeric::Float(v) => Ok(*v),
            Numeric::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("not a number: {s:?}"))),
        }
    }
}

fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Numeric>::deserialize(deserializer)? {
        None => Ok(0),
        Some(Numeric::Int(v)) => Ok(v),
        Some(other) => {
            let v: f64 = other.as_f64()?;
            if v < 0.0 {
                return Err(de::Error::custom(format!("negative count: {v}")));
            }
            Ok(v.round() as u64)
        }
    }
}

fn rate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Numeric>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(n) => n.as_f64(),
    }
}

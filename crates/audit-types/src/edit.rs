//! Per-field edits of an audit row.

use crate::{parse_deadline, AuditRecord, Conformity, Feasibility, RiskLevel, UnknownVariant};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Editable column of an audit row, named as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditField {
    #[serde(rename = "conformite")]
    Conformity,
    #[serde(rename = "risque")]
    Risk,
    #[serde(rename = "faisabilite")]
    Feasibility,
    #[serde(rename = "plan_action")]
    ActionPlan,
    #[serde(rename = "deadline")]
    Deadline,
    #[serde(rename = "owner")]
    Owner,
}

impl AuditField {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditField::Conformity => "conformite",
            AuditField::Risk => "risque",
            AuditField::Feasibility => "faisabilite",
            AuditField::ActionPlan => "plan_action",
            AuditField::Deadline => "deadline",
            AuditField::Owner => "owner",
        }
    }
}

impl fmt::Display for AuditField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditField {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conformite" => Ok(AuditField::Conformity),
            "risque" => Ok(AuditField::Risk),
            "faisabilite" => Ok(AuditField::Feasibility),
            "plan_action" => Ok(AuditField::ActionPlan),
            "deadline" => Ok(AuditField::Deadline),
            "owner" => Ok(AuditField::Owner),
            other => Err(UnknownVariant {
                kind: "audit field",
                value: other.to_string(),
            }),
        }
    }
}

/// Form input that does not fit the target field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value {value:?} for {field}: {reason}")]
pub struct InvalidFieldValue {
    pub field: AuditField,
    pub value: String,
    pub reason: String,
}

/// New value for exactly one field of an audit row. `None` clears the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEdit {
    Conformity(Option<Conformity>),
    Risk(Option<RiskLevel>),
    Feasibility(Option<Feasibility>),
    ActionPlan(Option<String>),
    Deadline(Option<NaiveDate>),
    Owner(Option<String>),
}

impl AuditEdit {
    /// Parse raw form input for `field`. An empty (or blank) value clears the field.
    pub fn parse(field: AuditField, raw: &str) -> Result<Self, InvalidFieldValue> {
        let blank = raw.trim().is_empty();
        let invalid = |reason: String| InvalidFieldValue {
            field,
            value: raw.to_string(),
            reason,
        };
        let edit = match field {
            AuditField::Conformity if blank => AuditEdit::Conformity(None),
            AuditField::Conformity => AuditEdit::Conformity(Some(
                raw.parse().map_err(|e: UnknownVariant| invalid(e.to_string()))?,
            )),
            AuditField::Risk if blank => AuditEdit::Risk(None),
            AuditField::Risk => AuditEdit::Risk(Some(
                raw.parse().map_err(|e: UnknownVariant| invalid(e.to_string()))?,
            )),
            AuditField::Feasibility if blank => AuditEdit::Feasibility(None),
            AuditField::Feasibility => AuditEdit::Feasibility(Some(
                raw.parse().map_err(|e: UnknownVariant| invalid(e.to_string()))?,
            )),
            AuditField::ActionPlan if blank => AuditEdit::ActionPlan(None),
            AuditField::ActionPlan => AuditEdit::ActionPlan(Some(raw.to_string())),
            AuditField::Deadline if blank => AuditEdit::Deadline(None),
            AuditField::Deadline => AuditEdit::Deadline(Some(
                parse_deadline(raw).map_err(|e| invalid(e.to_string()))?,
            )),
            AuditField::Owner if blank => AuditEdit::Owner(None),
            AuditField::Owner => AuditEdit::Owner(Some(raw.to_string())),
        };
        Ok(edit)
    }

    pub fn field(&self) -> AuditField {
        match self {
            AuditEdit::Conformity(_) => AuditField::Conformity,
            AuditEdit::Risk(_) => AuditField::Risk,
            AuditEdit::Feasibility(_) => AuditField::Feasibility,
            AuditEdit::ActionPlan(_) => AuditField::ActionPlan,
            AuditEdit::Deadline(_) => AuditField::Deadline,
            AuditEdit::Owner(_) => AuditField::Owner,
        }
    }

    /// Overwrite the one field this edit targets.
    pub fn apply(self, record: &mut AuditRecord) {
        match self {
            AuditEdit::Conformity(v) => record.conformity = v,
            AuditEdit::Risk(v) => record.risk = v,
            AuditEdit::Feasibility(v) => record.feasibility = v,
            AuditEdit::ActionPlan(v) => record.action_plan = v,
            AuditEdit::Deadline(v) => record.deadline = v,
            AuditEdit::Owner(v) => record.owner = v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_form_values() {
        assert_eq!(
            AuditEdit::parse(AuditField::Risk, "Élevé").unwrap(),
            AuditEdit::Risk(Some(RiskLevel::High))
        );
        assert_eq!(
            AuditEdit::parse(AuditField::Feasibility, "Moyen").unwrap(),
            AuditEdit::Feasibility(Some(Feasibility::Medium))
        );
        assert_eq!(
            AuditEdit::parse(AuditField::Deadline, "2025-06-30").unwrap(),
            AuditEdit::Deadline(NaiveDate::from_ymd_opt(2025, 6, 30))
        );
        assert_eq!(
            AuditEdit::parse(AuditField::Conformity, "").unwrap(),
            AuditEdit::Conformity(None)
        );
    }

    #[test]
    fn rejects_values_outside_the_enumeration() {
        let err = AuditEdit::parse(AuditField::Conformity, "Partiel").unwrap_err();
        assert_eq!(err.field, AuditField::Conformity);
        assert!(AuditEdit::parse(AuditField::Deadline, "demain").is_err());
    }

    #[test]
    fn field_names_round_trip_through_from_str() {
        for name in ["conformite", "risque", "faisabilite", "plan_action", "deadline", "owner"] {
            assert_eq!(name.parse::<AuditField>().unwrap().as_str(), name);
        }
        assert!("titre".parse::<AuditField>().is_err());
    }
}

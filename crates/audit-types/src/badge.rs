//! Fixed display table for the closed enumerations (badges and chart colours).

use crate::{Conformity, RiskLevel};

/// Bar/pie colour for a bucket with no status.
pub const FALLBACK_CHART_COLOR: &str = "#8884d8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConformityBadge {
    pub icon: &'static str,
    pub badge_class: &'static str,
    pub icon_class: &'static str,
    pub chart_color: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskBadge {
    pub badge_class: &'static str,
    pub chart_color: &'static str,
}

impl Conformity {
    pub const fn badge(self) -> ConformityBadge {
        match self {
            Conformity::Compliant => ConformityBadge {
                icon: "check-circle",
                badge_class: "bg-green-100 text-green-800",
                icon_class: "text-green-600",
                chart_color: "#10B981",
            },
            Conformity::NonCompliant => ConformityBadge {
                icon: "x-circle",
                badge_class: "bg-red-100 text-red-800",
                icon_class: "text-red-600",
                chart_color: "#EF4444",
            },
            Conformity::NotApplicable => ConformityBadge {
                icon: "alert-circle",
                badge_class: "bg-gray-100 text-gray-800",
                icon_class: "text-gray-600",
                chart_color: "#6B7280",
            },
        }
    }
}

impl RiskLevel {
    pub const fn badge(self) -> RiskBadge {
        match self {
            RiskLevel::Low => RiskBadge {
                badge_class: "bg-green-100 text-green-800",
                chart_color: "#10B981",
            },
            RiskLevel::Medium => RiskBadge {
                badge_class: "bg-yellow-100 text-yellow-800",
                chart_color: "#F59E0B",
            },
            RiskLevel::High => RiskBadge {
                badge_class: "bg-red-100 text-red-800",
                chart_color: "#EF4444",
            },
        }
    }
}

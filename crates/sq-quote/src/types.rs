//! Quote engine input and output types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discovery answers accumulated across tools.
///
/// The engine never rejects incomplete input: absent fields fall back to
/// the documented defaults so some quote is always produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    /// Zero means "not provided".
    #[serde(default)]
    pub square_footage: u32,
    /// Zero means "not provided".
    #[serde(default)]
    pub building_count: u32,
    #[serde(default)]
    pub security_concerns: Vec<String>,
    #[serde(default)]
    pub compliance_requirements: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub category: String,
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total: f64,
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refinement_needed: Option<String>,
}

/// Four independent 0-100 sub-factors behind the aggregate confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceFactors {
    pub site_information: u8,
    pub requirements: u8,
    pub compliance: u8,
    pub installation: u8,
}

impl ConfidenceFactors {
    /// Rounded mean of the four sub-factors.
    pub fn overall(&self) -> u8 {
        let sum = self.site_information as f64
            + self.requirements as f64
            + self.compliance as f64
            + self.installation as f64;
        (sum / 4.0).round() as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefinementCategory {
    SiteVisit,
    EndUserMeeting,
    TechnicalReview,
    ComplianceVerification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefinementImpact {
    CostSavings,
    CostIncrease,
    TimelineChange,
    ScopeChange,
}

/// A named follow-up required to raise quote confidence toward 90%.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementNeed {
    pub category: RefinementCategory,
    pub title: String,
    pub description: String,
    pub impact: RefinementImpact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potential_savings: Option<String>,
    pub required_for_90_percent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
}

/// Priced, confidence-scored output of the quote engine.
/// Not persisted by this core; the caller decides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub project_name: String,
    pub company_name: String,
    pub contact: ContactInfo,

    pub line_items: Vec<LineItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,

    pub overall_confidence: u8,
    pub confidence_factors: ConfidenceFactors,

    pub refinement_needs: Vec<RefinementNeed>,
    pub next_steps: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub estimated_implementation_time: String,
}

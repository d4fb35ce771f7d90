//! Known estimation tools and their display labels

use serde::{Deserialize, Serialize};

/// A tool a visitor can complete a project phase with.
///
/// The kebab-case wire names are shared with the remote store's
/// `sessions` log and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    QuickEstimate,
    AiAssistant,
    AiAssessment,
    ContactForm,
}

impl Tool {
    /// Stable wire name (kebab-case).
    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::QuickEstimate => "quick-estimate",
            Tool::AiAssistant => "ai-assistant",
            Tool::AiAssessment => "ai-assessment",
            Tool::ContactForm => "contact-form",
        }
    }

    /// Human-readable phase label shown in project timelines.
    pub fn display_name(&self) -> &'static str {
        match self {
            Tool::QuickEstimate => "Quick Security Estimate",
            Tool::AiAssistant => "AI Refinement",
            Tool::AiAssessment => "AI Discovery Assessment",
            Tool::ContactForm => "Contact & Consultation",
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

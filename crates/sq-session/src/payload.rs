//! Phase payloads, tagged by the tool that produced them
//!
//! Each known tool writes a payload with a fixed schema; anything else
//! travels in the `Opaque` variant as raw JSON.

use serde::{Deserialize, Serialize};
use sq_core::Tool;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", content = "data", rename_all = "kebab-case")]
pub enum PhasePayload {
    QuickEstimate(QuickEstimatePayload),
    AiAssessment(AssessmentPayload),
    AiAssistant(RefinementPayload),
    ContactForm(ContactPayload),
    Opaque(serde_json::Value),
}

impl PhasePayload {
    /// The tool this payload belongs to, if it is a known schema.
    pub fn tool(&self) -> Option<Tool> {
        match self {
            PhasePayload::QuickEstimate(_) => Some(Tool::QuickEstimate),
            PhasePayload::AiAssessment(_) => Some(Tool::AiAssessment),
            PhasePayload::AiAssistant(_) => Some(Tool::AiAssistant),
            PhasePayload::ContactForm(_) => Some(Tool::ContactForm),
            PhasePayload::Opaque(_) => None,
        }
    }
}

/// Output of the instant estimate form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickEstimatePayload {
    pub facility_size: u32,
    pub facility_type: String,
    pub estimated_cost: f64,
    #[serde(default)]
    pub systems: Vec<String>,
}

/// Answers collected by the AI discovery assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentPayload {
    pub responses: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_id: Option<String>,
}

/// Pointer to an AI refinement chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementPayload {
    pub chat_session_id: String,
    #[serde(default)]
    pub message_count: u32,
}

/// Contact & consultation form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactPayload {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_known_payload_is_tagged_by_tool_name() {
        let payload = PhasePayload::QuickEstimate(QuickEstimatePayload {
            facility_size: 5000,
            facility_type: "Commercial Office".to_string(),
            estimated_cost: 15_000.0,
            systems: vec!["surveillance".to_string()],
        });

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["tool"], "quick-estimate");
        assert_eq!(value["data"]["facility_size"], 5000);

        let back: PhasePayload = serde_json::from_value(value).unwrap();
        assert_eq!(back, payload);
        assert_eq!(back.tool(), Some(sq_core::Tool::QuickEstimate));
    }

    #[test]
    fn test_opaque_payload_round_trips_arbitrary_json() {
        let payload = PhasePayload::Opaque(json!({"anything": [1, 2, 3]}));
        let text = serde_json::to_string(&payload).unwrap();
        let back: PhasePayload = serde_json::from_str(&text).unwrap();
        assert_eq!(back, payload);
        assert_eq!(back.tool(), None);
    }

    #[test]
    fn test_assessment_payload_carries_scenario_selection() {
        let payload = PhasePayload::AiAssessment(AssessmentPayload {
            responses: json!({"square_footage": 10_000}),
            scenario_id: Some("warehouse".to_string()),
        });
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["tool"], "ai-assessment");
        assert_eq!(value["data"]["scenario_id"], "warehouse");
    }
}

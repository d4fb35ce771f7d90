//! Deterministic quote generation
//!
//! Pure given its inputs: no store access, no network, no hidden state.
//! Only `id`, `created_at`, and `valid_until` vary between runs. Missing
//! inputs are coerced to defaults rather than rejected, so the engine
//! always produces some quote from partial discovery data.

use chrono::{Duration, Utc};
use sq_core::new_entity_id;

use crate::assumptions::{SystemAssumptions, derive_assumptions};
use crate::scenario::SecurityScenario;
use crate::types::{
    Confidence, ConfidenceFactors, ContactInfo, DiscoveryData, LineItem, Quote,
    RefinementCategory, RefinementImpact, RefinementNeed,
};

const TAX_RATE: f64 = 0.08;
const INSTALLATION_RATE: f64 = 0.35;
const DOOR_UNIT_PRICE: f64 = 850.0;
const ZONE_UNIT_PRICE: f64 = 200.0;
const SENSOR_UNIT_PRICE: f64 = 75.0;
const CONTROL_PANEL_BASE: f64 = 800.0;
const QUOTE_VALID_DAYS: i64 = 30;
/// Assumed floor area when discovery never captured one.
const FALLBACK_SQFT: u32 = 5000;

/// Generate a quote from discovery answers, optionally seeded by a
/// scenario's assumptions (which score higher confidence than the
/// heuristic fallback).
pub fn generate(discovery: &DiscoveryData, scenario: Option<&SecurityScenario>) -> Quote {
    let assumptions = scenario
        .map(|s| s.assumptions.clone())
        .unwrap_or_else(|| derive_assumptions(discovery));

    let line_items = build_line_items(&assumptions, scenario.is_some());
    let subtotal: f64 = line_items.iter().map(|item| item.total).sum();
    let tax = subtotal * TAX_RATE;
    let total = subtotal + tax;

    let confidence_factors = confidence_factors(discovery, scenario.is_some());
    let overall_confidence = confidence_factors.overall();

    let now = Utc::now();

    Quote {
        id: format!("QUOTE-{}", new_entity_id()),
        project_name: non_empty_or(&discovery.project_name, "Security System Project"),
        company_name: non_empty_or(&discovery.company_name, "Your Company"),
        contact: ContactInfo {
            name: non_empty_or(&discovery.contact_name, "Contact Name"),
            email: non_empty_or(&discovery.contact_email, "contact@company.com"),
        },
        line_items,
        subtotal,
        tax,
        total,
        overall_confidence,
        confidence_factors,
        refinement_needs: refinement_needs(discovery),
        next_steps: next_steps(overall_confidence),
        created_at: now,
        valid_until: now + Duration::days(QUOTE_VALID_DAYS),
        estimated_implementation_time: implementation_time(discovery.square_footage).to_string(),
    }
}

fn build_line_items(assumptions: &SystemAssumptions, from_scenario: bool) -> Vec<LineItem> {
    let mut items = Vec::new();

    // Scenario assumptions are vetted archetype numbers; derived ones are
    // guesses from partial discovery data.
    let assumed_confidence = if from_scenario {
        Confidence::Medium
    } else {
        Confidence::Low
    };

    let surveillance = &assumptions.surveillance;
    let camera_total = surveillance.coverage.camera_unit_price() * surveillance.cameras as f64;
    items.push(LineItem {
        category: "Surveillance".to_string(),
        description: format!(
            "Security Camera System ({} cameras, {} coverage)",
            surveillance.cameras,
            surveillance.coverage.as_str()
        ),
        quantity: 1,
        unit_price: camera_total,
        total: camera_total,
        confidence: assumed_confidence,
        refinement_needed: Some(
            "Site survey needed for camera placement and coverage".to_string(),
        ),
    });

    // The recorder is a step function of camera count with no ambiguous
    // inputs, so it stays high confidence either way.
    let recorder = recorder_price(surveillance.cameras);
    items.push(LineItem {
        category: "Surveillance".to_string(),
        description: format!(
            "Network Video Recorder ({} channel)",
            surveillance.cameras.div_ceil(8) * 8
        ),
        quantity: 1,
        unit_price: recorder,
        total: recorder,
        confidence: Confidence::High,
        refinement_needed: None,
    });

    let access = &assumptions.access_control;
    let access_total = (access.doors as f64 * DOOR_UNIT_PRICE * access.level.multiplier()).round();
    items.push(LineItem {
        category: "Access Control".to_string(),
        description: format!(
            "Access Control System ({} doors, {} card readers)",
            access.doors, access.card_readers
        ),
        quantity: 1,
        unit_price: access_total,
        total: access_total,
        confidence: assumed_confidence,
        refinement_needed: Some(
            "Door hardware assessment and integration requirements".to_string(),
        ),
    });

    let intrusion = &assumptions.intrusion;
    let intrusion_total = intrusion.zones as f64 * ZONE_UNIT_PRICE
        + intrusion.sensors as f64 * SENSOR_UNIT_PRICE
        + CONTROL_PANEL_BASE;
    items.push(LineItem {
        category: "Intrusion Detection".to_string(),
        description: format!(
            "Intrusion Detection System ({} zones, {} sensors)",
            intrusion.zones, intrusion.sensors
        ),
        quantity: 1,
        unit_price: intrusion_total,
        total: intrusion_total,
        confidence: assumed_confidence,
        refinement_needed: Some("Zone layout and sensor placement walkthrough".to_string()),
    });

    // Installation must come last: it is a percentage of everything above.
    let equipment_total: f64 = items.iter().map(|item| item.total).sum();
    let installation = (equipment_total * INSTALLATION_RATE).round();
    items.push(LineItem {
        category: "Installation".to_string(),
        description: "Professional Installation, Configuration, and Training".to_string(),
        quantity: 1,
        unit_price: installation,
        total: installation,
        confidence: Confidence::Low,
        refinement_needed: Some(
            "Site conditions, existing infrastructure, and installation complexity assessment"
                .to_string(),
        ),
    });

    items
}

fn recorder_price(cameras: u32) -> f64 {
    if cameras <= 8 {
        800.0
    } else if cameras <= 16 {
        1400.0
    } else if cameras <= 32 {
        2200.0
    } else {
        3500.0
    }
}

fn confidence_factors(discovery: &DiscoveryData, from_scenario: bool) -> ConfidenceFactors {
    ConfidenceFactors {
        site_information: if from_scenario {
            75
        } else if discovery.square_footage > 0 {
            65
        } else {
            45
        },
        requirements: if from_scenario {
            80
        } else if !discovery.security_concerns.is_empty() {
            70
        } else {
            50
        },
        compliance: if !discovery.compliance_requirements.is_empty() {
            85
        } else {
            60
        },
        // Always low until someone has walked the site.
        installation: 55,
    }
}

fn refinement_needs(discovery: &DiscoveryData) -> Vec<RefinementNeed> {
    let mut needs = vec![
        RefinementNeed {
            category: RefinementCategory::SiteVisit,
            title: "Site Survey and Infrastructure Assessment".to_string(),
            description: "On-site evaluation of existing infrastructure, cable pathways, power \
                          availability, and installation complexity"
                .to_string(),
            impact: RefinementImpact::CostSavings,
            potential_savings: Some(
                "$2,000-5,000 if existing infrastructure can be utilized".to_string(),
            ),
            required_for_90_percent: true,
        },
        RefinementNeed {
            category: RefinementCategory::EndUserMeeting,
            title: "End User Requirements Workshop".to_string(),
            description: "Meet with actual system users to understand daily workflows, specific \
                          security concerns, and operational preferences"
                .to_string(),
            impact: RefinementImpact::ScopeChange,
            potential_savings: None,
            required_for_90_percent: true,
        },
        RefinementNeed {
            category: RefinementCategory::TechnicalReview,
            title: "IT Infrastructure Integration Review".to_string(),
            description: "Assess network capacity, IT policies, and integration requirements \
                          with existing systems"
                .to_string(),
            impact: RefinementImpact::CostIncrease,
            potential_savings: None,
            required_for_90_percent: true,
        },
    ];

    if !discovery.compliance_requirements.is_empty() {
        needs.push(RefinementNeed {
            category: RefinementCategory::ComplianceVerification,
            title: "Compliance Requirements Verification".to_string(),
            description: format!(
                "Detailed review of {} requirements and audit preparation",
                discovery.compliance_requirements.join(", ")
            ),
            impact: RefinementImpact::TimelineChange,
            potential_savings: None,
            required_for_90_percent: true,
        });
    }

    needs
}

fn next_steps(confidence: u8) -> Vec<String> {
    let mut steps: Vec<String> = [
        "Schedule site survey and technical assessment",
        "Meet with end users and decision makers",
        "Finalize detailed specifications and compliance requirements",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    if confidence < 70 {
        steps.insert(
            0,
            "Gather additional project requirements and constraints".to_string(),
        );
    }

    steps.push("Receive final 90%+ accurate quote and project timeline".to_string());
    steps.push("Begin procurement and implementation planning".to_string());

    steps
}

fn implementation_time(square_footage: u32) -> &'static str {
    let sqft = if square_footage == 0 {
        FALLBACK_SQFT
    } else {
        square_footage
    };

    if sqft < 5000 {
        "2-3 weeks"
    } else if sqft < 20_000 {
        "3-5 weeks"
    } else if sqft < 50_000 {
        "4-8 weeks"
    } else {
        "6-12 weeks"
    }
}

fn non_empty_or(value: &Option<String>, fallback: &str) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario;

    fn sample_discovery() -> DiscoveryData {
        DiscoveryData {
            square_footage: 10_000,
            building_count: 2,
            security_concerns: vec!["Theft".to_string()],
            compliance_requirements: vec![],
            ..Default::default()
        }
    }

    #[test]
    fn test_totals_invariant() {
        let quote = generate(&sample_discovery(), None);
        let line_sum: f64 = quote.line_items.iter().map(|item| item.total).sum();
        assert!((quote.subtotal - line_sum).abs() < 1e-9);
        assert!((quote.tax - quote.subtotal * 0.08).abs() < 1e-9);
        assert!((quote.total - (quote.subtotal + quote.tax)).abs() < 1e-9);
    }

    #[test]
    fn test_determinism_modulo_timestamps() {
        let discovery = sample_discovery();
        let a = generate(&discovery, None);
        let b = generate(&discovery, None);

        assert_eq!(a.line_items, b.line_items);
        assert_eq!(a.overall_confidence, b.overall_confidence);
        assert_eq!(a.confidence_factors, b.confidence_factors);
        assert!((a.total - b.total).abs() < 1e-9);
        assert_eq!(a.refinement_needs, b.refinement_needs);
        assert_eq!(a.next_steps, b.next_steps);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_end_to_end_heuristic_quote() {
        let quote = generate(&sample_discovery(), None);

        // cameras max(4, 10000/500) = 20 @ 550 standard
        let cameras = &quote.line_items[0];
        assert!(cameras.description.contains("20 cameras"));
        assert!(cameras.description.contains("standard coverage"));
        assert_eq!(cameras.total, 11_000.0);
        assert_eq!(cameras.confidence, Confidence::Low);

        // 20 cameras -> 24-channel recorder at the <=32 step
        let recorder = &quote.line_items[1];
        assert!(recorder.description.contains("24 channel"));
        assert_eq!(recorder.total, 2200.0);
        assert_eq!(recorder.confidence, Confidence::High);
        assert!(recorder.refinement_needed.is_none());

        // doors = 2 buildings * 2 = 4 @ 850, standard multiplier
        let access = &quote.line_items[2];
        assert!(access.description.contains("4 doors"));
        assert_eq!(access.total, 3400.0);

        // zones max(3, 10) = 10, sensors max(6, 20) = 20
        let intrusion = &quote.line_items[3];
        assert!(intrusion.description.contains("10 zones"));
        assert!(intrusion.description.contains("20 sensors"));
        assert_eq!(intrusion.total, 10.0 * 200.0 + 20.0 * 75.0 + 800.0);

        // installation = 35% of everything above
        let installation = &quote.line_items[4];
        let equipment: f64 = quote.line_items[..4].iter().map(|item| item.total).sum();
        assert_eq!(installation.total, (equipment * 0.35).round());
        assert_eq!(installation.confidence, Confidence::Low);

        // factors: site 65 (sqft known), requirements 70, compliance 60,
        // installation 55 -> mean 62.5 -> 63
        assert_eq!(quote.confidence_factors.site_information, 65);
        assert_eq!(quote.confidence_factors.requirements, 70);
        assert_eq!(quote.confidence_factors.compliance, 60);
        assert_eq!(quote.confidence_factors.installation, 55);
        assert_eq!(quote.overall_confidence, 63);

        // no compliance requirements -> only the three fixed needs
        assert_eq!(quote.refinement_needs.len(), 3);

        assert_eq!(quote.estimated_implementation_time, "3-5 weeks");
    }

    #[test]
    fn test_scenario_quote_uses_scenario_assumptions() {
        let scenario = scenario::by_id("warehouse").unwrap();
        let quote = generate(&sample_discovery(), Some(scenario));

        let cameras = &quote.line_items[0];
        assert!(cameras.description.contains("20 cameras"));
        assert!(cameras.description.contains("perimeter-focused coverage"));
        assert_eq!(cameras.total, 20.0 * 600.0);
        assert_eq!(cameras.confidence, Confidence::Medium);

        assert_eq!(quote.confidence_factors.site_information, 75);
        assert_eq!(quote.confidence_factors.requirements, 80);
    }

    #[test]
    fn test_unknown_site_scores_lowest() {
        let quote = generate(&DiscoveryData::default(), None);
        assert_eq!(quote.confidence_factors.site_information, 45);
        assert_eq!(quote.confidence_factors.requirements, 50);
        assert_eq!(quote.confidence_factors.compliance, 60);
        // (45 + 50 + 60 + 55) / 4 = 52.5 -> 53
        assert_eq!(quote.overall_confidence, 53);
    }

    #[test]
    fn test_access_control_tier_multiplier_is_rounded() {
        let scenario = scenario::by_id("elementary-school").unwrap();
        let quote = generate(&DiscoveryData::default(), Some(scenario));

        // 12 doors @ 850 with the high-security 1.4 multiplier
        let access = &quote.line_items[2];
        assert_eq!(access.total, (12.0 * 850.0 * 1.4_f64).round());
    }

    #[test]
    fn test_compliance_requirements_add_fourth_need() {
        let mut discovery = sample_discovery();
        discovery.compliance_requirements = vec!["HIPAA".to_string(), "PCI".to_string()];

        let quote = generate(&discovery, None);
        assert_eq!(quote.refinement_needs.len(), 4);

        let verification = &quote.refinement_needs[3];
        assert_eq!(
            verification.category,
            RefinementCategory::ComplianceVerification
        );
        assert_eq!(verification.impact, RefinementImpact::TimelineChange);
        assert!(verification.description.contains("HIPAA, PCI"));
        assert!(verification.required_for_90_percent);

        assert_eq!(quote.confidence_factors.compliance, 85);
    }

    #[test]
    fn test_every_low_or_medium_item_names_a_refinement() {
        for scenario in [None, Some(scenario::by_id("medium-office").unwrap())] {
            let quote = generate(&sample_discovery(), scenario);
            for item in &quote.line_items {
                match item.confidence {
                    Confidence::High => assert!(item.refinement_needed.is_none()),
                    Confidence::Medium | Confidence::Low => assert!(
                        item.refinement_needed.is_some(),
                        "{} missing refinement note",
                        item.description
                    ),
                }
            }
        }
    }

    #[test]
    fn test_low_confidence_prepends_requirements_step() {
        let quote = generate(&sample_discovery(), None);
        assert!(quote.overall_confidence < 70);
        assert_eq!(quote.next_steps.len(), 6);
        assert_eq!(
            quote.next_steps[0],
            "Gather additional project requirements and constraints"
        );
        assert_eq!(
            quote.next_steps[4],
            "Receive final 90%+ accurate quote and project timeline"
        );
        assert_eq!(
            quote.next_steps[5],
            "Begin procurement and implementation planning"
        );
    }

    #[test]
    fn test_confident_quote_skips_requirements_step() {
        let mut discovery = sample_discovery();
        discovery.compliance_requirements = vec!["PCI".to_string()];
        let scenario = scenario::by_id("retail-boutique").unwrap();

        let quote = generate(&discovery, Some(scenario));
        // (75 + 80 + 85 + 55) / 4 = 73.75 -> 74
        assert_eq!(quote.overall_confidence, 74);
        assert_eq!(quote.next_steps.len(), 5);
        assert_eq!(
            quote.next_steps[0],
            "Schedule site survey and technical assessment"
        );
    }

    #[test]
    fn test_implementation_time_steps() {
        assert_eq!(implementation_time(4999), "2-3 weeks");
        assert_eq!(implementation_time(5000), "3-5 weeks");
        assert_eq!(implementation_time(19_999), "3-5 weeks");
        assert_eq!(implementation_time(20_000), "4-8 weeks");
        assert_eq!(implementation_time(49_999), "4-8 weeks");
        assert_eq!(implementation_time(50_000), "6-12 weeks");
        // Unknown floor area falls back to the 5000 sqft assumption.
        assert_eq!(implementation_time(0), "3-5 weeks");
    }

    #[test]
    fn test_recorder_price_steps() {
        assert_eq!(recorder_price(4), 800.0);
        assert_eq!(recorder_price(8), 800.0);
        assert_eq!(recorder_price(9), 1400.0);
        assert_eq!(recorder_price(16), 1400.0);
        assert_eq!(recorder_price(32), 2200.0);
        assert_eq!(recorder_price(33), 3500.0);
    }

    #[test]
    fn test_echo_fields_fall_back_to_placeholders() {
        let quote = generate(&DiscoveryData::default(), None);
        assert_eq!(quote.project_name, "Security System Project");
        assert_eq!(quote.company_name, "Your Company");
        assert_eq!(quote.contact.name, "Contact Name");
        assert_eq!(quote.contact.email, "contact@company.com");

        let named = DiscoveryData {
            project_name: Some("HQ retrofit".to_string()),
            contact_email: Some(String::new()),
            ..Default::default()
        };
        let quote = generate(&named, None);
        assert_eq!(quote.project_name, "HQ retrofit");
        assert_eq!(quote.contact.email, "contact@company.com");
    }

    #[test]
    fn test_quote_validity_window() {
        let quote = generate(&DiscoveryData::default(), None);
        assert_eq!(quote.valid_until - quote.created_at, Duration::days(30));
        assert!(quote.id.starts_with("QUOTE-"));
    }
}

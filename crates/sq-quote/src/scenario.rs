//! Static catalog of facility archetypes with pre-filled assumptions
//!
//! Confidence levels are hand-tuned per archetype: the more standardized
//! the facility type, the higher a scenario-seeded quote can score.

use std::sync::OnceLock;

use serde::Serialize;

use crate::assumptions::{
    AccessControlAssumptions, AccessTier, CoverageTier, FireAssumptions, IntrusionAssumptions,
    SurveillanceAssumptions, SystemAssumptions,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SqftRange {
    pub min: u32,
    pub max: u32,
    pub typical: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetRange {
    pub min: u32,
    pub max: u32,
    pub typical: u32,
}

impl BudgetRange {
    pub fn contains(&self, budget: u32) -> bool {
        budget >= self.min && budget <= self.max
    }
}

/// A named facility archetype used to seed quote assumptions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityScenario {
    pub id: String,
    pub name: String,
    pub description: String,
    pub facility_type: String,
    pub sqft_range: SqftRange,
    pub assumptions: SystemAssumptions,
    pub compliance: Vec<String>,
    pub security_concerns: Vec<String>,
    pub budget_range: BudgetRange,
    /// 65-80, hand-tuned per archetype.
    pub confidence_level: u8,
}

/// All known archetypes, built once.
pub fn catalog() -> &'static [SecurityScenario] {
    static CATALOG: OnceLock<Vec<SecurityScenario>> = OnceLock::new();
    CATALOG.get_or_init(build_catalog)
}

/// Exact-id lookup. Not found is `None`, never an error.
pub fn by_id(id: &str) -> Option<&'static SecurityScenario> {
    catalog().iter().find(|scenario| scenario.id == id)
}

/// Case-insensitive substring match on facility type.
pub fn by_facility_type(facility_type: &str) -> Vec<&'static SecurityScenario> {
    let needle = facility_type.to_lowercase();
    catalog()
        .iter()
        .filter(|scenario| scenario.facility_type.to_lowercase().contains(&needle))
        .collect()
}

/// Archetypes whose budget range contains the given budget.
pub fn by_budget(budget: u32) -> Vec<&'static SecurityScenario> {
    catalog()
        .iter()
        .filter(|scenario| scenario.budget_range.contains(budget))
        .collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn build_catalog() -> Vec<SecurityScenario> {
    vec![
        SecurityScenario {
            id: "small-office".to_string(),
            name: "Small Office".to_string(),
            description: "1-25 employees, single location professional office".to_string(),
            facility_type: "Commercial Office".to_string(),
            sqft_range: SqftRange { min: 1000, max: 5000, typical: 2500 },
            assumptions: SystemAssumptions {
                surveillance: SurveillanceAssumptions { cameras: 6, coverage: CoverageTier::Standard },
                access_control: AccessControlAssumptions { doors: 3, card_readers: 2, level: AccessTier::Standard },
                intrusion: IntrusionAssumptions { zones: 4, sensors: 8, monitored: true },
                fire: Some(FireAssumptions { detectors: 12, coverage: "code-minimum".to_string() }),
            },
            compliance: strings(&["General Business Security"]),
            security_concerns: strings(&[
                "After-hours access",
                "Visitor management",
                "Equipment protection",
            ]),
            budget_range: BudgetRange { min: 8000, max: 25_000, typical: 15_000 },
            confidence_level: 75,
        },
        SecurityScenario {
            id: "medium-office".to_string(),
            name: "Medium Office".to_string(),
            description: "25-100 employees, multi-department office building".to_string(),
            facility_type: "Commercial Office".to_string(),
            sqft_range: SqftRange { min: 5000, max: 20_000, typical: 10_000 },
            assumptions: SystemAssumptions {
                surveillance: SurveillanceAssumptions { cameras: 16, coverage: CoverageTier::Comprehensive },
                access_control: AccessControlAssumptions { doors: 8, card_readers: 6, level: AccessTier::Advanced },
                intrusion: IntrusionAssumptions { zones: 8, sensors: 16, monitored: true },
                fire: Some(FireAssumptions { detectors: 35, coverage: "enhanced".to_string() }),
            },
            compliance: strings(&["General Business Security", "Data Protection"]),
            security_concerns: strings(&[
                "Multi-floor access control",
                "Visitor tracking",
                "Asset protection",
                "After-hours monitoring",
            ]),
            budget_range: BudgetRange { min: 25_000, max: 70_000, typical: 45_000 },
            confidence_level: 70,
        },
        SecurityScenario {
            id: "retail-boutique".to_string(),
            name: "Retail Boutique".to_string(),
            description: "Small retail store, high-value merchandise".to_string(),
            facility_type: "Retail Store".to_string(),
            sqft_range: SqftRange { min: 500, max: 3000, typical: 1200 },
            assumptions: SystemAssumptions {
                surveillance: SurveillanceAssumptions { cameras: 8, coverage: CoverageTier::Comprehensive },
                access_control: AccessControlAssumptions { doors: 2, card_readers: 1, level: AccessTier::Standard },
                intrusion: IntrusionAssumptions { zones: 3, sensors: 6, monitored: true },
                fire: Some(FireAssumptions { detectors: 8, coverage: "code-minimum".to_string() }),
            },
            compliance: strings(&["PCI Compliance", "Retail Security Standards"]),
            security_concerns: strings(&[
                "Theft prevention",
                "Customer safety",
                "Inventory protection",
                "Point-of-sale security",
            ]),
            budget_range: BudgetRange { min: 6000, max: 22_000, typical: 12_000 },
            confidence_level: 80,
        },
        SecurityScenario {
            id: "elementary-school".to_string(),
            name: "Elementary School".to_string(),
            description: "K-5 school building with multiple classrooms".to_string(),
            facility_type: "Educational Facility".to_string(),
            sqft_range: SqftRange { min: 15_000, max: 40_000, typical: 25_000 },
            assumptions: SystemAssumptions {
                surveillance: SurveillanceAssumptions { cameras: 24, coverage: CoverageTier::Comprehensive },
                access_control: AccessControlAssumptions { doors: 12, card_readers: 8, level: AccessTier::HighSecurity },
                intrusion: IntrusionAssumptions { zones: 12, sensors: 24, monitored: true },
                fire: Some(FireAssumptions { detectors: 60, coverage: "enhanced".to_string() }),
            },
            compliance: strings(&[
                "FERPA",
                "School Safety Standards",
                "State Education Requirements",
            ]),
            security_concerns: strings(&[
                "Student safety",
                "Visitor screening",
                "Lockdown procedures",
                "Perimeter security",
            ]),
            budget_range: BudgetRange { min: 45_000, max: 110_000, typical: 75_000 },
            confidence_level: 65,
        },
        SecurityScenario {
            id: "medical-clinic".to_string(),
            name: "Medical Clinic".to_string(),
            description: "Healthcare facility with patient privacy requirements".to_string(),
            facility_type: "Healthcare Facility".to_string(),
            sqft_range: SqftRange { min: 3000, max: 12_000, typical: 6000 },
            assumptions: SystemAssumptions {
                surveillance: SurveillanceAssumptions { cameras: 12, coverage: CoverageTier::PrivacyCompliant },
                access_control: AccessControlAssumptions { doors: 6, card_readers: 4, level: AccessTier::HighSecurity },
                intrusion: IntrusionAssumptions { zones: 6, sensors: 12, monitored: true },
                fire: Some(FireAssumptions { detectors: 25, coverage: "healthcare-grade".to_string() }),
            },
            compliance: strings(&[
                "HIPAA",
                "Healthcare Security Standards",
                "Patient Privacy Laws",
            ]),
            security_concerns: strings(&[
                "Patient privacy",
                "Medication security",
                "Staff safety",
                "Records protection",
            ]),
            budget_range: BudgetRange { min: 18_000, max: 50_000, typical: 32_000 },
            confidence_level: 70,
        },
        SecurityScenario {
            id: "warehouse".to_string(),
            name: "Warehouse/Distribution".to_string(),
            description: "Industrial storage and distribution facility".to_string(),
            facility_type: "Industrial Warehouse".to_string(),
            sqft_range: SqftRange { min: 10_000, max: 100_000, typical: 30_000 },
            assumptions: SystemAssumptions {
                surveillance: SurveillanceAssumptions { cameras: 20, coverage: CoverageTier::PerimeterFocused },
                access_control: AccessControlAssumptions { doors: 6, card_readers: 4, level: AccessTier::Industrial },
                intrusion: IntrusionAssumptions { zones: 8, sensors: 16, monitored: true },
                fire: Some(FireAssumptions { detectors: 40, coverage: "industrial-grade".to_string() }),
            },
            compliance: strings(&["Industrial Security Standards", "OSHA Requirements"]),
            security_concerns: strings(&[
                "Cargo theft",
                "Perimeter security",
                "Employee safety",
                "Inventory protection",
            ]),
            budget_range: BudgetRange { min: 35_000, max: 100_000, typical: 65_000 },
            confidence_level: 70,
        },
        SecurityScenario {
            id: "gas-station".to_string(),
            name: "Gas Station".to_string(),
            description: "Fuel retail location with high-theft risk and compliance requirements"
                .to_string(),
            facility_type: "Gas Station/Convenience Store".to_string(),
            sqft_range: SqftRange { min: 2000, max: 6000, typical: 3500 },
            assumptions: SystemAssumptions {
                surveillance: SurveillanceAssumptions { cameras: 16, coverage: CoverageTier::Comprehensive },
                access_control: AccessControlAssumptions { doors: 4, card_readers: 2, level: AccessTier::HighSecurity },
                intrusion: IntrusionAssumptions { zones: 8, sensors: 12, monitored: true },
                fire: Some(FireAssumptions { detectors: 20, coverage: "enhanced".to_string() }),
            },
            compliance: strings(&[
                "PCI Compliance",
                "Petroleum Equipment Institute",
                "State Fuel Regulations",
            ]),
            security_concerns: strings(&[
                "Drive-off theft",
                "Armed robbery",
                "Shoplifting",
                "Employee theft",
                "Vandalism",
            ]),
            budget_range: BudgetRange { min: 18_000, max: 50_000, typical: 32_000 },
            confidence_level: 70,
        },
        SecurityScenario {
            id: "qsr-restaurant".to_string(),
            name: "Quick Service Restaurant".to_string(),
            description: "Fast-food restaurant with drive-thru and dining area".to_string(),
            facility_type: "Restaurant".to_string(),
            sqft_range: SqftRange { min: 2500, max: 4500, typical: 3200 },
            assumptions: SystemAssumptions {
                surveillance: SurveillanceAssumptions { cameras: 12, coverage: CoverageTier::Comprehensive },
                access_control: AccessControlAssumptions { doors: 4, card_readers: 2, level: AccessTier::Standard },
                intrusion: IntrusionAssumptions { zones: 6, sensors: 10, monitored: true },
                fire: Some(FireAssumptions { detectors: 18, coverage: "commercial-kitchen-grade".to_string() }),
            },
            compliance: strings(&[
                "Health Department",
                "PCI Compliance",
                "Food Safety Regulations",
            ]),
            security_concerns: strings(&[
                "Employee theft",
                "Customer disputes",
                "Drive-thru incidents",
                "After-hours break-ins",
            ]),
            budget_range: BudgetRange { min: 15_000, max: 45_000, typical: 28_000 },
            confidence_level: 75,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_eight_archetypes_with_unique_ids() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 8);

        let mut ids: Vec<&str> = catalog.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn test_confidence_levels_are_hand_tuned_range() {
        for scenario in catalog() {
            assert!(
                (65..=80).contains(&scenario.confidence_level),
                "{} out of range",
                scenario.id
            );
        }
    }

    #[test]
    fn test_by_id() {
        let scenario = by_id("warehouse").unwrap();
        assert_eq!(scenario.name, "Warehouse/Distribution");
        assert_eq!(scenario.assumptions.surveillance.cameras, 20);
        assert!(by_id("moon-base").is_none());
    }

    #[test]
    fn test_by_facility_type_is_substring_and_case_insensitive() {
        let offices = by_facility_type("office");
        assert_eq!(offices.len(), 2);

        let all_with_i = by_facility_type("FACILITY");
        assert_eq!(all_with_i.len(), 2); // educational + healthcare

        assert!(by_facility_type("stadium").is_empty());
    }

    #[test]
    fn test_by_budget_containment() {
        let matches = by_budget(20_000);
        assert!(matches.iter().any(|s| s.id == "small-office"));
        assert!(matches.iter().any(|s| s.id == "retail-boutique"));
        assert!(!matches.iter().any(|s| s.id == "elementary-school"));

        assert!(by_budget(1_000_000).is_empty());
    }

    #[test]
    fn test_every_scenario_carries_fire_assumptions() {
        for scenario in catalog() {
            assert!(scenario.assumptions.fire.is_some(), "{}", scenario.id);
        }
    }
}

//! Subsystem assumptions: scenario-provided or derived from discovery data

use serde::{Deserialize, Serialize};

use crate::types::DiscoveryData;

/// Camera coverage tier. Drives the per-camera unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoverageTier {
    Basic,
    Standard,
    Comprehensive,
    PrivacyCompliant,
    PerimeterFocused,
}

impl CoverageTier {
    pub fn camera_unit_price(&self) -> f64 {
        match self {
            CoverageTier::Basic => 400.0,
            CoverageTier::Standard => 550.0,
            CoverageTier::Comprehensive => 750.0,
            CoverageTier::PrivacyCompliant => 650.0,
            CoverageTier::PerimeterFocused => 600.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CoverageTier::Basic => "basic",
            CoverageTier::Standard => "standard",
            CoverageTier::Comprehensive => "comprehensive",
            CoverageTier::PrivacyCompliant => "privacy-compliant",
            CoverageTier::PerimeterFocused => "perimeter-focused",
        }
    }
}

/// Access control hardening level. Drives the per-door multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessTier {
    Standard,
    Advanced,
    HighSecurity,
    Industrial,
}

impl AccessTier {
    pub fn multiplier(&self) -> f64 {
        match self {
            AccessTier::HighSecurity => 1.4,
            AccessTier::Advanced => 1.2,
            AccessTier::Standard | AccessTier::Industrial => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveillanceAssumptions {
    pub cameras: u32,
    pub coverage: CoverageTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControlAssumptions {
    pub doors: u32,
    pub card_readers: u32,
    pub level: AccessTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntrusionAssumptions {
    pub zones: u32,
    pub sensors: u32,
    pub monitored: bool,
}

/// Fire detection is carried for scenario completeness; the engine does
/// not price it (fire systems are quoted by licensed specialists).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireAssumptions {
    pub detectors: u32,
    pub coverage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemAssumptions {
    pub surveillance: SurveillanceAssumptions,
    pub access_control: AccessControlAssumptions,
    pub intrusion: IntrusionAssumptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fire: Option<FireAssumptions>,
}

/// Heuristic fallback when no scenario is selected.
///
/// Camera count scales with floor area (one per ~500 sqft, minimum 4),
/// doors with building count (two per building, default 3), intrusion
/// zones with area (one per ~1000 sqft, minimum 3) and sensors like
/// cameras (minimum 6).
pub fn derive_assumptions(discovery: &DiscoveryData) -> SystemAssumptions {
    let sqft = discovery.square_footage as f64;

    SystemAssumptions {
        surveillance: SurveillanceAssumptions {
            cameras: ((sqft / 500.0).round() as u32).max(4),
            coverage: CoverageTier::Standard,
        },
        access_control: AccessControlAssumptions {
            doors: if discovery.building_count > 0 {
                discovery.building_count * 2
            } else {
                3
            },
            card_readers: if discovery.building_count > 0 {
                discovery.building_count * 2
            } else {
                2
            },
            level: AccessTier::Standard,
        },
        intrusion: IntrusionAssumptions {
            zones: ((sqft / 1000.0).round() as u32).max(3),
            sensors: ((sqft / 500.0).round() as u32).max(6),
            monitored: true,
        },
        fire: None,
    }
}

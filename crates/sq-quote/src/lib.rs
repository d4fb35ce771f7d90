pub mod assumptions;
pub mod engine;
pub mod scenario;
pub mod types;

pub use assumptions::{
    AccessControlAssumptions, AccessTier, CoverageTier, FireAssumptions, IntrusionAssumptions,
    SurveillanceAssumptions, SystemAssumptions, derive_assumptions,
};
pub use engine::generate;
pub use scenario::{BudgetRange, SecurityScenario, SqftRange, by_budget, by_facility_type, by_id, catalog};
pub use types::{
    Confidence, ConfidenceFactors, ContactInfo, DiscoveryData, LineItem, Quote, RefinementCategory,
    RefinementImpact, RefinementNeed,
};

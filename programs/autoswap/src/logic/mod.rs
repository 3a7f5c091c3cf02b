pub mod eligibility;
pub mod fills;

// CV variant generation: rewrites a CV towards one job's vocabulary using the
// match result, without ever adding skills the CV does not evidence.

pub mod generator;
pub mod handlers;
pub mod policy;

pub use generator::{generate_variant, CvVariant};
pub use policy::policy_for;

//! Modification policies: decide whether each CV section gets rewritten.
//!
//! Default: `AlwaysModify` (deterministic, every section).
//! `SeededPolicy` draws from a seeded `StdRng`, so a given seed always makes
//! the same decisions for the same inputs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Sections the generator may rewrite, consulted in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantSection {
    Vocabulary,
    Skills,
    Summary,
}

/// Implement this to change how aggressively variants are tailored.
pub trait ModificationPolicy: Send {
    fn should_modify(&mut self, section: VariantSection) -> bool;

    /// Short label recorded on the generated variant.
    fn describe(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysModify;

impl ModificationPolicy for AlwaysModify {
    fn should_modify(&mut self, _section: VariantSection) -> bool {
        true
    }

    fn describe(&self) -> String {
        "always".to_string()
    }
}

#[derive(Debug, Clone)]
pub struct SeededPolicy {
    rng: StdRng,
    seed: u64,
    probability: f64,
}

impl SeededPolicy {
    /// `probability` is clamped to [0, 1].
    pub fn new(seed: u64, probability: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
            probability: if probability.is_nan() { 0.0 } else { probability.clamp(0.0, 1.0) },
        }
    }
}

impl ModificationPolicy for SeededPolicy {
    fn should_modify(&mut self, _section: VariantSection) -> bool {
        self.rng.gen_bool(self.probability)
    }

    fn describe(&self) -> String {
        format!("seeded(seed={}, p={})", self.seed, self.probability)
    }
}

/// Seeded when a seed is known, otherwise every section is modified.
pub fn policy_for(seed: Option<u64>, probability: f64) -> Box<dyn ModificationPolicy> {
    match seed {
        Some(seed) => Box::new(SeededPolicy::new(seed, probability)),
        None => Box::new(AlwaysModify),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTIONS: [VariantSection; 3] = [
        VariantSection::Vocabulary,
        VariantSection::Skills,
        VariantSection::Summary,
    ];

    fn decisions(policy: &mut dyn ModificationPolicy, rounds: usize) -> Vec<bool> {
        (0..rounds)
            .flat_map(|_| SECTIONS)
            .map(|s| policy.should_modify(s))
            .collect()
    }

    #[test]
    fn test_same_seed_same_decisions() {
        let a = decisions(&mut SeededPolicy::new(42, 0.5), 20);
        let b = decisions(&mut SeededPolicy::new(42, 0.5), 20);
        assert_eq!(a, b);
    }

    #[test]
    fn test_probability_bounds() {
        assert!(decisions(&mut SeededPolicy::new(7, 1.0), 10).iter().all(|d| *d));
        assert!(decisions(&mut SeededPolicy::new(7, 0.0), 10).iter().all(|d| !*d));
        // Out-of-range probabilities are clamped instead of panicking.
        assert!(decisions(&mut SeededPolicy::new(7, 3.0), 2).iter().all(|d| *d));
        assert!(decisions(&mut SeededPolicy::new(7, f64::NAN), 2).iter().all(|d| !*d));
    }

    #[test]
    fn test_policy_for_without_seed_always_modifies() {
        let mut policy = policy_for(None, 0.0);
        assert!(decisions(policy.as_mut(), 5).iter().all(|d| *d));
        assert_eq!(policy.describe(), "always");
        assert!(policy_for(Some(1), 0.7).describe().starts_with("seeded"));
    }
}

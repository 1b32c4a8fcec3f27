use std::sync::OnceLock;

use crate::affinity_alert_import::AffinityPatterns;
use crate::capitalone_alert_import::CapitalOnePatterns;
use crate::chase_alert_import::ChasePatterns;
use crate::discover_alert_import::DiscoverPatterns;
use crate::paypal_alert_import::PaypalPatterns;
use crate::target_alert_import::TargetPatterns;

/// Every provider's compiled templates. Built once, then only read.
#[derive(Debug)]
pub struct Patterns {
    pub(crate) chase: ChasePatterns,
    pub(crate) discover: DiscoverPatterns,
    pub(crate) capital_one: CapitalOnePatterns,
    pub(crate) paypal: PaypalPatterns,
    pub(crate) target: TargetPatterns,
    pub(crate) affinity: AffinityPatterns,
}

impl Patterns {
    pub fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            chase: ChasePatterns::compile()?,
            discover: DiscoverPatterns::compile()?,
            capital_one: CapitalOnePatterns::compile()?,
            paypal: PaypalPatterns::compile()?,
            target: TargetPatterns::compile()?,
            affinity: AffinityPatterns::compile()?,
        })
    }

    pub fn shared() -> &'static Patterns {
        static PATTERNS: OnceLock<Patterns> = OnceLock::new();
        PATTERNS.get_or_init(|| Patterns::compile().expect("invalid built-in alert patterns"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_patterns_compile() {
        assert!(Patterns::compile().is_ok());
        assert!(std::ptr::eq(Patterns::shared(), Patterns::shared()));
    }
}

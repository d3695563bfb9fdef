use std::collections::BTreeMap;

use crate::tts::voice::PricingTier;

pub const CURRENCY: &str = "USD";

pub const PRICING_NOTE: &str = "Estimates use list prices per 1M characters and ignore free-tier \
allowances, discounts and taxes. Markup is billed as input characters.";

/// USD per one million characters, by tier.
#[derive(Debug, Clone)]
pub struct PricingTable {
    rates: BTreeMap<PricingTier, f64>,
    default_rate: f64,
}

impl Default for PricingTable {
    fn default() -> Self {
        let rates = BTreeMap::from([
            (PricingTier::Standard, 4.0),
            (PricingTier::Wavenet, 16.0),
            (PricingTier::Neural2, 16.0),
            (PricingTier::Polyglot, 16.0),
            (PricingTier::Chirp, 30.0),
            (PricingTier::Studio, 160.0),
        ]);
        Self {
            rates,
            default_rate: 16.0,
        }
    }
}

impl PricingTable {
    pub fn rate_per_million(&self, tier: PricingTier) -> f64 {
        self.rates.get(&tier).copied().unwrap_or(self.default_rate)
    }

    pub fn default_rate(&self) -> f64 {
        self.default_rate
    }

    pub fn rates(&self) -> &BTreeMap<PricingTier, f64> {
        &self.rates
    }

    pub fn estimate_cost(&self, tier: PricingTier, characters: usize) -> f64 {
        self.rate_per_million(tier) / 1_000_000.0 * characters as f64
    }
}

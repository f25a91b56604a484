//! Static narrative conditions per forecast type and scenario band.
//!
//! Planning copy maintained with the business side; no computation here.

use super::{ForecastType, ScenarioBand};

/// Ordered narrative conditions for one type/band combination.
pub(crate) fn conditions(
    forecast_type: ForecastType,
    band: ScenarioBand,
) -> &'static [&'static str] {
    match (forecast_type, band) {
        (ForecastType::Revenue, ScenarioBand::Optimistic) => &[
            "New product lines gain traction in key accounts",
            "Pricing holds through the annual contract renewals",
            "Top-two customer segments expand order volumes",
        ],
        (ForecastType::Revenue, ScenarioBand::Base) => &[
            "Current demand patterns continue",
            "No major pricing or channel changes",
            "Customer churn stays at historical levels",
        ],
        (ForecastType::Revenue, ScenarioBand::Conservative) => &[
            "A key account reduces order volumes",
            "Competitive pressure forces selective discounting",
            "Macroeconomic softness delays purchase decisions",
        ],
        (ForecastType::Demand, ScenarioBand::Optimistic) => &[
            "Retail partners increase shelf allocation",
            "Seasonal peak arrives on schedule and holds longer",
            "Substitution away from competing materials accelerates",
        ],
        (ForecastType::Demand, ScenarioBand::Base) => &[
            "Order cadence follows the established seasonal cycle",
            "Inventory policies at distributors stay unchanged",
        ],
        (ForecastType::Demand, ScenarioBand::Conservative) => &[
            "Distributors run down inventory before reordering",
            "A soft consumer market trims replenishment volumes",
        ],
        (ForecastType::Esg, ScenarioBand::Optimistic) => &[
            "Renewable energy contracts come online as planned",
            "Recycled-material sourcing scales without quality issues",
            "Efficiency retrofits land ahead of schedule",
        ],
        (ForecastType::Esg, ScenarioBand::Base) => &[
            "Sustainability initiatives progress at the planned pace",
            "Energy mix and material sourcing stay on current contracts",
        ],
        (ForecastType::Esg, ScenarioBand::Conservative) => &[
            "Recycled feedstock supply tightens",
            "Retrofit projects slip into the next fiscal year",
        ],
        (ForecastType::CustomerBehavior, ScenarioBand::Optimistic) => &[
            "Loyalty program uptake exceeds pilot results",
            "Digital ordering adoption keeps climbing",
        ],
        (ForecastType::CustomerBehavior, ScenarioBand::Base) => &[
            "Engagement follows recent cohort behavior",
            "No major changes to the customer portal",
        ],
        (ForecastType::CustomerBehavior, ScenarioBand::Conservative) => &[
            "Key accounts consolidate purchasing through fewer channels",
            "Engagement dips as contract renewals come up",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_combination_has_copy() {
        for forecast_type in [
            ForecastType::Revenue,
            ForecastType::Demand,
            ForecastType::Esg,
            ForecastType::CustomerBehavior,
        ] {
            for band in [
                ScenarioBand::Optimistic,
                ScenarioBand::Base,
                ScenarioBand::Conservative,
            ] {
                assert!(!conditions(forecast_type, band).is_empty());
            }
        }
    }
}

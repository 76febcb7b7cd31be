use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Constants for turning a JPY auction price into a KRW landed cost.
///
/// Shipping is quoted in KRW per kilogram and converted back to JPY before
/// the agent and customs fees (both JPY) are added. That order is kept as is
/// so totals match historical outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSchedule {
    /// KRW per JPY
    pub exchange_rate: f64,
    /// Average shipped weight of one glove
    pub weight_kg: f64,
    /// Forwarding cost in KRW per kilogram
    pub shipping_fee_per_kg: f64,
    /// Purchasing agent commission as a fraction of the JPY price
    pub agent_fee_rate: f64,
    /// Duty applies only above this JPY price
    pub customs_threshold: i64,
    pub customs_rate: f64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            exchange_rate: 9.2,
            weight_kg: 0.6,
            shipping_fee_per_kg: 5000.0,
            agent_fee_rate: 0.10,
            customs_threshold: 21_739,
            customs_rate: 0.23,
        }
    }
}

/// Cost breakdown of one auction listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandedCost {
    pub foreign_price: i64,
    /// List price converted to KRW, fees excluded
    pub local_price: i64,
    pub shipping_fee_foreign: f64,
    pub agent_fee_foreign: f64,
    pub customs_fee_foreign: f64,
    pub total_cost_foreign: f64,
    pub total_cost_local: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("landed cost needs a positive price, got {0}")]
pub struct NonPositivePrice(pub i64);

impl FeeSchedule {
    /// Convert a JPY amount to whole KRW, rounding half up.
    pub fn to_local(&self, amount_foreign: f64) -> i64 {
        round_half_up(amount_foreign * self.exchange_rate)
    }

    pub fn landed_cost(&self, foreign_price: i64) -> Result<LandedCost, NonPositivePrice> {
        if foreign_price <= 0 {
            return Err(NonPositivePrice(foreign_price));
        }

        let price = foreign_price as f64;
        let local_price = self.to_local(price);

        let shipping_fee_local = round_half_up(self.weight_kg * self.shipping_fee_per_kg);
        let shipping_fee_foreign = shipping_fee_local as f64 / self.exchange_rate;
        let agent_fee_foreign = price * self.agent_fee_rate;
        let customs_fee_foreign = if foreign_price > self.customs_threshold {
            price * self.customs_rate
        } else {
            0.0
        };

        let total_cost_foreign =
            price + shipping_fee_foreign + agent_fee_foreign + customs_fee_foreign;

        Ok(LandedCost {
            foreign_price,
            local_price,
            shipping_fee_foreign,
            agent_fee_foreign,
            customs_fee_foreign,
            total_cost_foreign,
            total_cost_local: self.to_local(total_cost_foreign),
        })
    }
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_threshold_has_no_customs() {
        let cost = FeeSchedule::default().landed_cost(20_000).unwrap();

        assert_eq!(cost.local_price, 184_000);
        assert_eq!(cost.customs_fee_foreign, 0.0);
        assert!((cost.agent_fee_foreign - 2_000.0).abs() < 1e-9);
        assert!((cost.shipping_fee_foreign - 3_000.0 / 9.2).abs() < 1e-9);
        assert!((cost.total_cost_foreign - 22_326.087).abs() < 0.01);
        assert_eq!(cost.total_cost_local, 205_400);
    }

    #[test]
    fn threshold_itself_is_duty_free() {
        let cost = FeeSchedule::default().landed_cost(21_739).unwrap();
        assert_eq!(cost.customs_fee_foreign, 0.0);

        let cost = FeeSchedule::default().landed_cost(21_740).unwrap();
        assert!(cost.customs_fee_foreign > 0.0);
    }

    #[test]
    fn above_threshold_adds_customs() {
        let cost = FeeSchedule::default().landed_cost(30_000).unwrap();

        assert!((cost.customs_fee_foreign - 6_900.0).abs() < 1e-9);
        assert_eq!(cost.total_cost_local, 370_080);
    }

    #[test]
    fn rejects_non_positive_prices() {
        let fees = FeeSchedule::default();
        assert_eq!(fees.landed_cost(0), Err(NonPositivePrice(0)));
        assert_eq!(fees.landed_cost(-5), Err(NonPositivePrice(-5)));
    }

    #[test]
    fn rounds_half_up() {
        let fees = FeeSchedule {
            exchange_rate: 0.5,
            ..FeeSchedule::default()
        };
        assert_eq!(fees.to_local(3.0), 2);
        assert_eq!(fees.to_local(2.0), 1);
    }
}

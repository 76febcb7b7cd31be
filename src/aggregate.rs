use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::models::{AgeGroup, Condition, Market, NormalizedProduct, Position};

/// KRW price ranges used for the price breakdown.
///
/// Each bound is an inclusive upper limit; prices above the last bound fall
/// into an open-ended top range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceBuckets {
    pub upper_bounds: Vec<i64>,
}

impl Default for PriceBuckets {
    fn default() -> Self {
        Self {
            upper_bounds: vec![100_000, 300_000, 500_000],
        }
    }
}

impl PriceBuckets {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upper_bounds.is_empty() {
            return Err(ConfigError::invalid("price buckets need at least one bound"));
        }
        if self.upper_bounds[0] <= 0 {
            return Err(ConfigError::invalid("price bucket bounds must be positive"));
        }
        if self.upper_bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::invalid(
                "price bucket bounds must be strictly ascending",
            ));
        }
        Ok(())
    }

    /// Labels in ascending order, e.g. `~100k`, `100k~300k`, `500k~`.
    /// Always one more label than bounds; no bounds is a single `all` range.
    pub fn labels(&self) -> Vec<String> {
        if self.upper_bounds.is_empty() {
            return vec!["all".to_string()];
        }
        let mut labels = Vec::with_capacity(self.upper_bounds.len() + 1);
        let mut lower: Option<i64> = None;
        for &bound in &self.upper_bounds {
            labels.push(match lower {
                None => format!("~{}", short_amount(bound)),
                Some(lower) => format!("{}~{}", short_amount(lower), short_amount(bound)),
            });
            lower = Some(bound);
        }
        if let Some(top) = lower {
            labels.push(format!("{}~", short_amount(top)));
        }
        labels
    }

    fn index_for(&self, price: i64) -> usize {
        self.upper_bounds
            .iter()
            .position(|&bound| price <= bound)
            .unwrap_or(self.upper_bounds.len())
    }

    pub fn label_for(&self, price: i64) -> String {
        let mut labels = self.labels();
        labels.swap_remove(self.index_for(price))
    }
}

fn short_amount(amount: i64) -> String {
    if amount != 0 && amount % 1000 == 0 {
        format!("{}k", amount / 1000)
    } else {
        amount.to_string()
    }
}

/// Counts and averages for one group of products
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStats {
    pub count: usize,
    /// Saturates at `i64::MAX`
    pub total_price: i64,
    /// Floor of total / count; zero when there are no products
    pub average_price: i64,
    pub brands: BTreeMap<String, usize>,
    pub brand_average_prices: BTreeMap<String, i64>,
    pub positions: BTreeMap<String, usize>,
    pub conditions: BTreeMap<String, usize>,
    pub age_groups: BTreeMap<String, usize>,
    pub price_ranges: BTreeMap<String, usize>,
}

fn floor_average(total: i128, count: usize) -> i64 {
    if count == 0 {
        0
    } else {
        clamp_i64(total.div_euclid(count as i128))
    }
}

fn clamp_i64(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

impl SourceStats {
    /// Summarize products. Every product lands in exactly one key of each
    /// breakdown, so each breakdown sums to `count`.
    pub fn from_products<'a, I>(products: I, buckets: &PriceBuckets) -> Self
    where
        I: IntoIterator<Item = &'a NormalizedProduct>,
    {
        let labels = buckets.labels();
        let mut stats = SourceStats {
            positions: zeroed(Position::ALL.iter().map(|p| p.as_str())),
            conditions: zeroed(Condition::ALL.iter().map(|c| c.as_str())),
            age_groups: zeroed(AgeGroup::ALL.iter().map(|a| a.as_str())),
            price_ranges: zeroed(labels.iter().map(String::as_str)),
            ..SourceStats::default()
        };
        // i128 so that prices near i64::MAX cannot overflow the sums
        let mut total: i128 = 0;
        let mut brand_totals: BTreeMap<String, i128> = BTreeMap::new();

        for product in products {
            stats.count += 1;
            total += i128::from(product.price);

            *stats.brands.entry(product.brand.clone()).or_insert(0) += 1;
            *brand_totals.entry(product.brand.clone()).or_insert(0) += i128::from(product.price);
            *stats
                .positions
                .entry(product.position.as_str().to_string())
                .or_insert(0) += 1;
            *stats
                .conditions
                .entry(product.condition.as_str().to_string())
                .or_insert(0) += 1;
            *stats
                .age_groups
                .entry(product.age_group.as_str().to_string())
                .or_insert(0) += 1;
            let range = &labels[buckets.index_for(product.price)];
            *stats.price_ranges.entry(range.clone()).or_insert(0) += 1;
        }

        stats.total_price = clamp_i64(total);
        stats.average_price = floor_average(total, stats.count);
        stats.brand_average_prices = brand_totals
            .into_iter()
            .map(|(brand, total)| {
                let count = stats.brands.get(&brand).copied().unwrap_or(0);
                (brand, floor_average(total, count))
            })
            .collect();

        stats
    }
}

fn zeroed<'a>(keys: impl Iterator<Item = &'a str>) -> BTreeMap<String, usize> {
    keys.map(|k| (k.to_string(), 0)).collect()
}

/// Statistics bundle handed to the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub auction: SourceStats,
    pub cafe: SourceStats,
    pub overall: SourceStats,
}

impl Statistics {
    pub fn for_market(&self, market: Market) -> &SourceStats {
        match market {
            Market::Auction => &self.auction,
            Market::Cafe => &self.cafe,
        }
    }
}

/// Partition products by market and summarize each partition and the whole.
pub fn aggregate(products: &[NormalizedProduct], buckets: &PriceBuckets) -> Statistics {
    let of = |market: Market| products.iter().filter(move |p| p.market == market);

    Statistics {
        auction: SourceStats::from_products(of(Market::Auction), buckets),
        cafe: SourceStats::from_products(of(Market::Cafe), buckets),
        overall: SourceStats::from_products(products, buckets),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Extras;

    fn product(market: Market, price: i64, brand: &str, position: Position) -> NormalizedProduct {
        NormalizedProduct {
            title: format!("{} {}", brand, price),
            price,
            source_price: None,
            url: String::new(),
            image: String::new(),
            market,
            brand: brand.to_string(),
            position,
            condition: Condition::Used,
            age_group: AgeGroup::Adult,
            extras: Extras::Cafe {
                author: String::new(),
                date: String::new(),
                views: "0".to_string(),
                board: String::new(),
            },
        }
    }

    fn sample() -> Vec<NormalizedProduct> {
        vec![
            product(Market::Auction, 205_400, "Mizuno", Position::Pitcher),
            product(Market::Auction, 90_000, "other", Position::AllRound),
            product(Market::Cafe, 150_000, "Mizuno", Position::Infield),
            product(Market::Cafe, 100_001, "Wilson", Position::Outfield),
            product(Market::Cafe, 800_000, "Rawlings", Position::Catcher),
        ]
    }

    #[test]
    fn labels_cover_every_range() {
        assert_eq!(
            PriceBuckets::default().labels(),
            vec!["~100k", "100k~300k", "300k~500k", "500k~"]
        );
    }

    #[test]
    fn bounds_are_inclusive() {
        let buckets = PriceBuckets::default();
        assert_eq!(buckets.label_for(100_000), "~100k");
        assert_eq!(buckets.label_for(100_001), "100k~300k");
        assert_eq!(buckets.label_for(500_000), "300k~500k");
        assert_eq!(buckets.label_for(500_001), "500k~");
    }

    #[test]
    fn partitions_by_market() {
        let stats = aggregate(&sample(), &PriceBuckets::default());

        assert_eq!(stats.auction.count, 2);
        assert_eq!(stats.cafe.count, 3);
        assert_eq!(stats.overall.count, 5);
        assert_eq!(stats.auction.average_price, (205_400 + 90_000) / 2);
        assert_eq!(stats.cafe.average_price, (150_000 + 100_001 + 800_000) / 3);
        assert_eq!(stats.overall.brands.get("Mizuno"), Some(&2));
        assert_eq!(
            stats.overall.brand_average_prices.get("Mizuno"),
            Some(&((205_400 + 150_000) / 2))
        );
    }

    #[test]
    fn breakdowns_sum_to_count() {
        let stats = aggregate(&sample(), &PriceBuckets::default());

        for source in [&stats.auction, &stats.cafe, &stats.overall] {
            for breakdown in [
                &source.brands,
                &source.positions,
                &source.conditions,
                &source.age_groups,
                &source.price_ranges,
            ] {
                assert_eq!(breakdown.values().sum::<usize>(), source.count);
            }
        }
    }

    #[test]
    fn empty_input_averages_to_zero() {
        let stats = aggregate(&[], &PriceBuckets::default());

        assert_eq!(stats.overall.count, 0);
        assert_eq!(stats.overall.average_price, 0);
        assert_eq!(stats.auction.price_ranges.len(), 4);
        assert!(stats.auction.price_ranges.values().all(|&n| n == 0));
    }

    #[test]
    fn huge_prices_saturate_instead_of_overflowing() {
        let near_max = i64::MAX - 1;
        let products = vec![
            product(Market::Cafe, near_max, "Mizuno", Position::Infield),
            product(Market::Cafe, near_max, "Mizuno", Position::Infield),
        ];

        let stats = aggregate(&products, &PriceBuckets::default());

        assert_eq!(stats.cafe.count, 2);
        assert_eq!(stats.cafe.total_price, i64::MAX);
        assert_eq!(stats.cafe.average_price, near_max);
        assert_eq!(stats.cafe.brand_average_prices.get("Mizuno"), Some(&near_max));
        assert_eq!(stats.overall.price_ranges.get("500k~"), Some(&2));
    }

    #[test]
    fn no_bounds_is_one_open_range() {
        let buckets = PriceBuckets { upper_bounds: vec![] };
        assert_eq!(buckets.labels(), vec!["all"]);
        assert_eq!(buckets.label_for(42), "all");

        let stats = aggregate(&sample(), &buckets);
        assert_eq!(stats.overall.price_ranges.get("all"), Some(&5));
    }

    #[test]
    fn rejects_unordered_bounds() {
        let buckets = PriceBuckets {
            upper_bounds: vec![300_000, 100_000],
        };
        assert!(buckets.validate().is_err());
        assert!(PriceBuckets { upper_bounds: vec![] }.validate().is_err());
        assert!(PriceBuckets::default().validate().is_ok());
    }
}

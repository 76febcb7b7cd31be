use crate::classify::Classifier;
use crate::error::SkipReason;
use crate::filter::{Candidate, ListingFilter};
use crate::models::{Extras, Market, NormalizedProduct, RawAuctionListing};
use crate::pricing::FeeSchedule;
use crate::sources::traits::SourceNormalizer;

/// Normalizer for Yahoo! Auctions Japan listings.
///
/// The unified price is the KRW landed cost; the JPY bid is kept as
/// `source_price`.
#[derive(Debug, Clone)]
pub struct AuctionNormalizer {
    filter: ListingFilter,
    classifier: Classifier,
    fees: FeeSchedule,
}

impl AuctionNormalizer {
    pub fn new(filter: ListingFilter, classifier: Classifier, fees: FeeSchedule) -> Self {
        Self {
            filter,
            classifier,
            fees,
        }
    }
}

impl Default for AuctionNormalizer {
    fn default() -> Self {
        Self::new(
            ListingFilter::default(),
            Classifier::default(),
            FeeSchedule::default(),
        )
    }
}

impl SourceNormalizer for AuctionNormalizer {
    type Raw = RawAuctionListing;

    fn market(&self) -> Market {
        Market::Auction
    }

    fn normalize(&self, raw: &RawAuctionListing) -> Result<NormalizedProduct, SkipReason> {
        let title = raw
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SkipReason::malformed("missing title"))?;
        let price = raw
            .current_price
            .as_ref()
            .ok_or_else(|| SkipReason::malformed("missing current_price"))?
            .amount();
        let time_left = raw.time_left.as_deref().unwrap_or("").trim();

        self.filter.check(&Candidate::auction(title, price, time_left))?;

        let landed_cost = self
            .fees
            .landed_cost(price)
            .map_err(|_| SkipReason::NonPositivePrice)?;

        let image = raw
            .image
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(raw.image_url.as_deref())
            .unwrap_or("")
            .to_string();

        Ok(NormalizedProduct {
            title: title.to_string(),
            price: landed_cost.total_cost_local,
            source_price: Some(price),
            url: raw.url.clone().unwrap_or_default(),
            image,
            market: Market::Auction,
            brand: self.classifier.brand(title),
            position: self.classifier.position(title),
            condition: self.classifier.condition(title),
            age_group: self.classifier.age_group(title),
            extras: Extras::Auction {
                bids: raw
                    .bids
                    .as_ref()
                    .map(|b| b.to_string())
                    .unwrap_or_else(|| "0".to_string()),
                time_left: time_left.to_string(),
                landed_cost,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Condition, Position};
    use serde_json::json;

    #[test]
    fn normalizes_a_live_listing() {
        let normalizer = AuctionNormalizer::default();
        let value = json!({
            "title": "ミズノプロ 硬式 投手用 グラブ 新品",
            "current_price": 20000,
            "url": "https://auctions.yahoo.co.jp/jp/auction/x1",
            "image_url": "https://img/x1.jpg",
            "bids": "3",
            "time_left": "2日"
        });

        let product = normalizer.normalize_value(&value).unwrap();

        assert_eq!(product.market, Market::Auction);
        assert_eq!(product.price, 205_400);
        assert_eq!(product.source_price, Some(20_000));
        assert_eq!(product.brand, "Mizuno");
        assert_eq!(product.position, Position::Pitcher);
        assert_eq!(product.condition, Condition::New);
        assert_eq!(product.image, "https://img/x1.jpg");
        match product.extras {
            Extras::Auction { bids, time_left, .. } => {
                assert_eq!(bids, "3");
                assert_eq!(time_left, "2日");
            }
            other => panic!("unexpected extras: {:?}", other),
        }
    }

    #[test]
    fn prefers_image_over_image_url() {
        let normalizer = AuctionNormalizer::default();
        let value = json!({
            "title": "グローブ",
            "current_price": 5000,
            "image": "https://img/main.jpg",
            "image_url": "https://img/other.jpg"
        });

        let product = normalizer.normalize_value(&value).unwrap();
        assert_eq!(product.image, "https://img/main.jpg");
        assert_eq!(product.url, "");
    }

    #[test]
    fn missing_fields_are_malformed() {
        let normalizer = AuctionNormalizer::default();

        let no_title = json!({ "current_price": 5000 });
        let no_price = json!({ "title": "グローブ" });
        let wrong_shape = json!({ "title": ["not", "text"], "current_price": 5000 });

        for value in [no_title, no_price, wrong_shape] {
            assert!(matches!(
                normalizer.normalize_value(&value),
                Err(SkipReason::Malformed(_))
            ));
        }
    }

    #[test]
    fn negative_price_text_is_not_admitted() {
        let normalizer = AuctionNormalizer::default();
        let value = json!({
            "title": "ミズノ グローブ",
            "current_price": "-5000",
            "url": "https://auctions.yahoo.co.jp/jp/auction/neg"
        });

        assert_eq!(
            normalizer.normalize_value(&value),
            Err(SkipReason::NonPositivePrice)
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let normalizer = AuctionNormalizer::default();
        let value = json!({
            "title": "ZETT 内野手用 グラブ",
            "current_price": "12,800円",
            "url": "https://auctions.yahoo.co.jp/jp/auction/x2",
            "bids": 0,
            "time_left": "5時間"
        });

        let first = serde_json::to_vec(&normalizer.normalize_value(&value).unwrap()).unwrap();
        let second = serde_json::to_vec(&normalizer.normalize_value(&value).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn duplicates_keep_the_first_listing() {
        let normalizer = AuctionNormalizer::default();
        let listing = json!({
            "title": "ミズノ グローブ",
            "current_price": 5000,
            "url": "https://auctions.yahoo.co.jp/jp/auction/dup"
        });

        let report = normalizer.normalize_all(&[listing.clone(), listing]);

        assert_eq!(report.products.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 1);
        assert_eq!(report.skipped[0].reason, SkipReason::Duplicate);
    }
}

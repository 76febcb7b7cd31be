use crate::classify::Classifier;
use crate::error::SkipReason;
use crate::filter::{Candidate, ListingFilter};
use crate::models::{Extras, Market, NormalizedProduct, RawCafeListing};
use crate::sources::traits::SourceNormalizer;

/// Normalizer for yayongsa cafe board posts. Prices are already KRW.
#[derive(Debug, Clone, Default)]
pub struct CafeNormalizer {
    filter: ListingFilter,
    classifier: Classifier,
}

impl CafeNormalizer {
    pub fn new(filter: ListingFilter, classifier: Classifier) -> Self {
        Self { filter, classifier }
    }
}

/// The second image is the full-size one; the first is a thumbnail.
pub fn display_image(images: &[String]) -> String {
    images
        .get(1)
        .or_else(|| images.first())
        .cloned()
        .unwrap_or_default()
}

impl SourceNormalizer for CafeNormalizer {
    type Raw = RawCafeListing;

    fn market(&self) -> Market {
        Market::Cafe
    }

    fn normalize(&self, raw: &RawCafeListing) -> Result<NormalizedProduct, SkipReason> {
        let title = raw
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SkipReason::malformed("missing title"))?;
        let price = raw
            .price
            .as_ref()
            .ok_or_else(|| SkipReason::malformed("missing price"))?
            .amount();

        self.filter.check(&Candidate::cafe(title, price, raw.sold_out))?;

        Ok(NormalizedProduct {
            title: title.to_string(),
            price,
            source_price: None,
            url: raw.url.clone().unwrap_or_default(),
            image: display_image(&raw.images),
            market: Market::Cafe,
            brand: self.classifier.brand(title),
            position: self.classifier.position(title),
            condition: self.classifier.condition(title),
            age_group: self.classifier.age_group(title),
            extras: Extras::Cafe {
                author: raw.author.clone().unwrap_or_default(),
                date: raw.date.clone().unwrap_or_default(),
                views: raw
                    .views
                    .as_ref()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "0".to_string()),
                board: raw.board.clone().unwrap_or_default(),
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
    fn display_image_prefers_second_entry() {
        let images = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert_eq!(display_image(&images(&["thumb", "full", "extra"])), "full");
        assert_eq!(display_image(&images(&["only"])), "only");
        assert_eq!(display_image(&[]), "");
    }

    #[test]
    fn normalizes_a_board_post() {
        let normalizer = CafeNormalizer::default();
        let value = json!({
            "title": "윌슨 A2000 외야 글러브 새상품",
            "price": "320,000원",
            "url": "https://cafe.daum.net/baseballsale/79XF/1",
            "images": ["https://img/thumb.jpg", "https://img/full.jpg"],
            "author": "seller",
            "date": "25.09.28",
            "views": 41,
            "board": "중고글러브벼룩시장"
        });

        let product = normalizer.normalize_value(&value).unwrap();

        assert_eq!(product.market, Market::Cafe);
        assert_eq!(product.price, 320_000);
        assert_eq!(product.source_price, None);
        assert_eq!(product.brand, "Wilson");
        assert_eq!(product.position, Position::Outfield);
        assert_eq!(product.condition, Condition::New);
        assert_eq!(product.image, "https://img/full.jpg");
        assert_eq!(
            product.extras,
            Extras::Cafe {
                author: "seller".to_string(),
                date: "25.09.28".to_string(),
                views: "41".to_string(),
                board: "중고글러브벼룩시장".to_string(),
            }
        );
    }

    #[test]
    fn price_without_digits_is_filtered() {
        let normalizer = CafeNormalizer::default();
        let value = json!({ "title": "미즈노 내야", "price": "가격문의" });

        assert_eq!(
            normalizer.normalize_value(&value),
            Err(SkipReason::NonPositivePrice)
        );
    }

    #[test]
    fn signed_or_fractional_price_text_is_filtered() {
        let normalizer = CafeNormalizer::default();

        for price in ["-5000", "-150,000원", "5000.5"] {
            let value = json!({ "title": "미즈노 내야", "price": price, "url": "u" });
            assert_eq!(
                normalizer.normalize_value(&value),
                Err(SkipReason::NonPositivePrice),
                "price {:?}",
                price
            );
        }
    }

    #[test]
    fn one_bad_record_does_not_stop_the_rest() {
        let normalizer = CafeNormalizer::default();
        let values = vec![
            json!({ "title": "미즈노 내야", "price": 150000, "url": "u1" }),
            json!("not an object"),
            json!({ "price": 90000, "url": "u3" }),
            json!({ "title": "[거래완료] 롤링스", "price": 90000, "url": "u4" }),
            json!({ "title": "제트 포수 미트", "price": 200000, "url": "u5" }),
        ];

        let report = normalizer.normalize_all(&values);

        assert_eq!(report.products.len(), 2);
        assert_eq!(report.total(), 5);
        let counts = report.skip_counts();
        assert_eq!(counts.get("malformed"), Some(&2));
        assert_eq!(counts.get("sold"), Some(&1));
    }
}

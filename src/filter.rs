use serde::{Deserialize, Serialize};

use crate::classify::{contains_any, lowercase_all};
use crate::error::SkipReason;
use crate::models::Market;

/// Keyword sets deciding which raw listings are admitted.
///
/// All title and status matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Auction `time_left` tokens for ended, won or cancelled auctions
    pub ended_tokens: Vec<String>,
    pub auction_sold_keywords: Vec<String>,
    pub cafe_sold_keywords: Vec<String>,
    pub notice_keywords: Vec<String>,
    /// Title must contain one of these; an empty list admits every title
    pub auction_required_keywords: Vec<String>,
    pub cafe_required_keywords: Vec<String>,
    /// Accessories and consumables sharing the glove vocabulary
    pub excluded_keywords: Vec<String>,
    /// Minimum price in the listing's own currency
    pub min_source_price: Option<i64>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            ended_tokens: strings(&[
                "終了", "落札", "取消", "キャンセル", "売却済", "ended", "cancelled",
            ]),
            auction_sold_keywords: strings(&["終了", "売り切れ", "完売", "SOLD", "落札", "売却済"]),
            cafe_sold_keywords: strings(&["판매완료", "거래완료", "완료", "sold"]),
            notice_keywords: strings(&["공지", "필독"]),
            auction_required_keywords: strings(&["グローブ", "グラブ", "ミット", "glove"]),
            cafe_required_keywords: Vec::new(),
            excluded_keywords: strings(&[
                "スクワランオイル",
                "ミンクオイル",
                "メンテナンスオイル",
                "艶出し",
                "みつろう",
                "ワックス",
                "レースのみ",
                "紐のみ",
                "グラブレース単品",
                "グラブピン",
                "紐通し",
                "ニードル",
                "修理用",
                "バッティンググローブ",
                "バッティング手袋",
                "守備用手袋",
                "サングラス",
                "アームガード",
                "芯材のみ",
            ]),
            min_source_price: None,
        }
    }
}

/// The fields of a raw listing that admission depends on
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub market: Market,
    pub title: &'a str,
    pub price: i64,
    /// Auction `time_left`, empty for cafe posts
    pub status: &'a str,
    /// Scraper already flagged the post as sold
    pub sold_flag: bool,
}

impl<'a> Candidate<'a> {
    pub fn auction(title: &'a str, price: i64, time_left: &'a str) -> Self {
        Self {
            market: Market::Auction,
            title,
            price,
            status: time_left,
            sold_flag: false,
        }
    }

    pub fn cafe(title: &'a str, price: i64, sold_flag: bool) -> Self {
        Self {
            market: Market::Cafe,
            title,
            price,
            status: "",
            sold_flag,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListingFilter {
    ended_tokens: Vec<String>,
    auction_sold: Vec<String>,
    cafe_sold: Vec<String>,
    notices: Vec<String>,
    auction_required: Vec<String>,
    cafe_required: Vec<String>,
    excluded: Vec<String>,
    min_source_price: Option<i64>,
}

impl ListingFilter {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            ended_tokens: lowercase_all(&config.ended_tokens),
            auction_sold: lowercase_all(&config.auction_sold_keywords),
            cafe_sold: lowercase_all(&config.cafe_sold_keywords),
            notices: lowercase_all(&config.notice_keywords),
            auction_required: lowercase_all(&config.auction_required_keywords),
            cafe_required: lowercase_all(&config.cafe_required_keywords),
            excluded: lowercase_all(&config.excluded_keywords),
            min_source_price: config.min_source_price,
        }
    }

    /// Admit or reject one listing. Price is checked first, then sale
    /// status, then the title tests.
    pub fn check(&self, candidate: &Candidate<'_>) -> Result<(), SkipReason> {
        if candidate.price <= 0 {
            return Err(SkipReason::NonPositivePrice);
        }

        let title = candidate.title.to_lowercase();

        match candidate.market {
            Market::Auction => {
                if contains_any(&candidate.status.to_lowercase(), &self.ended_tokens) {
                    return Err(SkipReason::Ended);
                }
                if contains_any(&title, &self.auction_sold) {
                    return Err(SkipReason::Sold);
                }
            }
            Market::Cafe => {
                if candidate.sold_flag || contains_any(&title, &self.cafe_sold) {
                    return Err(SkipReason::Sold);
                }
                if contains_any(&title, &self.notices) {
                    return Err(SkipReason::Notice);
                }
            }
        }

        let required = match candidate.market {
            Market::Auction => &self.auction_required,
            Market::Cafe => &self.cafe_required,
        };
        if !required.is_empty() && !contains_any(&title, required) {
            return Err(SkipReason::OffTopic);
        }

        if contains_any(&title, &self.excluded) {
            return Err(SkipReason::Accessory);
        }

        if let Some(min) = self.min_source_price {
            if candidate.price < min {
                return Err(SkipReason::BelowMinimumPrice);
            }
        }

        Ok(())
    }

    pub fn keep(&self, candidate: &Candidate<'_>) -> bool {
        self.check(candidate).is_ok()
    }
}

impl Default for ListingFilter {
    fn default() -> Self {
        Self::new(&FilterConfig::default())
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::pricing::LandedCost;

/// Brand assigned when no brand keyword matches a title
pub const OTHER_BRAND: &str = "other";

/// Marketplace a listing was scraped from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Market {
    /// Yahoo! Auctions Japan, priced in JPY
    Auction,
    /// Yayongsa baseball cafe, priced in KRW
    Cafe,
}

impl Market {
    pub const ALL: [Market; 2] = [Market::Auction, Market::Cafe];

    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Auction => "auction",
            Market::Cafe => "cafe",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auction" | "yahoo" | "a" => Ok(Market::Auction),
            "cafe" | "yayongsa" | "b" => Ok(Market::Cafe),
            other => Err(format!("unknown market: {}", other)),
        }
    }
}

/// Fielding position a glove is made for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Pitcher,
    Catcher,
    Infield,
    Outfield,
    #[default]
    #[serde(rename = "all-round")]
    AllRound,
}

impl Position {
    pub const ALL: [Position; 5] = [
        Position::Pitcher,
        Position::Catcher,
        Position::Infield,
        Position::Outfield,
        Position::AllRound,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Pitcher => "pitcher",
            Position::Catcher => "catcher",
            Position::Infield => "infield",
            Position::Outfield => "outfield",
            Position::AllRound => "all-round",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    #[default]
    Used,
}

impl Condition {
    pub const ALL: [Condition; 2] = [Condition::New, Condition::Used];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::Used => "used",
        }
    }
}

/// Intended wearer, youth gloves are sized differently
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum AgeGroup {
    Youth,
    #[default]
    Adult,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 2] = [AgeGroup::Youth, AgeGroup::Adult];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeGroup::Youth => "youth",
            AgeGroup::Adult => "adult",
        }
    }
}

/// A price as scrapers write it: a JSON number or text such as "150,000원"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PriceField {
    Integer(i64),
    Float(f64),
    Text(String),
}

/// Thousands separators and currency marks allowed around a price
const PRICE_NOISE: [char; 6] = [',', '円', '¥', '￥', '₩', '원'];

impl PriceField {
    /// Integer amount in the listing currency.
    ///
    /// Text must be a whole number once separators, currency marks and
    /// spaces are removed; a leading `-` keeps the value negative. Any other
    /// text is zero, which the listing filter rejects.
    pub fn amount(&self) -> i64 {
        match self {
            PriceField::Integer(value) => *value,
            PriceField::Float(value) => value.trunc() as i64,
            PriceField::Text(text) => parse_price_text(text).unwrap_or(0),
        }
    }
}

fn parse_price_text(text: &str) -> Option<i64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && !PRICE_NOISE.contains(c))
        .collect();
    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let value: i64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Free-form counter such as bid count or views, text or number
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TextField {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextField::Number(n) => write!(f, "{}", n),
            TextField::Text(s) => f.write_str(s.trim()),
        }
    }
}

/// One auction result card as stored in a `yahoo_auction_*.json` snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawAuctionListing {
    pub title: Option<String>,
    /// Current bid in JPY
    pub current_price: Option<PriceField>,
    pub url: Option<String>,
    pub image: Option<String>,
    pub image_url: Option<String>,
    pub bids: Option<TextField>,
    /// Remaining time, or a status token once the auction is over
    pub time_left: Option<String>,
}

/// One cafe board post as stored in a `yayongsa_*.json` snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawCafeListing {
    pub title: Option<String>,
    /// Asking price in KRW
    pub price: Option<PriceField>,
    pub url: Option<String>,
    /// Image URLs in page order; the first is usually a thumbnail
    #[serde(default)]
    pub images: Vec<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub views: Option<TextField>,
    pub board: Option<String>,
    #[serde(default)]
    pub sold_out: bool,
}

/// Source-specific fields carried through normalization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Extras {
    Auction {
        bids: String,
        time_left: String,
        landed_cost: LandedCost,
    },
    Cafe {
        author: String,
        date: String,
        views: String,
        board: String,
    },
}

/// Unified product record shared by both markets
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedProduct {
    pub title: String,
    /// KRW. Landed cost for auction listings, asking price for cafe posts.
    pub price: i64,
    /// JPY list price, auction listings only
    pub source_price: Option<i64>,
    pub url: String,
    pub image: String,
    pub market: Market,
    pub brand: String,
    pub position: Position,
    pub condition: Condition,
    pub age_group: AgeGroup,
    pub extras: Extras,
}

//! Keyword classifiers for listing titles.
//!
//! Each classifier walks an ordered table and returns the first match. There
//! is no scoring: table order is the tie-break.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::{AgeGroup, Condition, Position, OTHER_BRAND};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandRule {
    pub keyword: String,
    pub brand: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRule {
    pub keywords: Vec<String>,
    pub position: Position,
}

/// Keyword tables in declaration order, covering Japanese, Korean and Latin
/// spellings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordTables {
    pub brands: Vec<BrandRule>,
    pub positions: Vec<PositionRule>,
    /// Matched case-sensitively so "new" inside ordinary words is ignored
    pub new_condition: Vec<String>,
    pub youth: Vec<String>,
}

fn brand(keyword: &str, brand: &str) -> BrandRule {
    BrandRule {
        keyword: keyword.to_string(),
        brand: brand.to_string(),
    }
}

fn position(keywords: &[&str], position: Position) -> PositionRule {
    PositionRule {
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        position,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for KeywordTables {
    fn default() -> Self {
        Self {
            brands: vec![
                brand("ミズノ", "Mizuno"),
                brand("미즈노", "Mizuno"),
                brand("mizuno", "Mizuno"),
                brand("ウィルソン", "Wilson"),
                brand("윌슨", "Wilson"),
                brand("wilson", "Wilson"),
                brand("ローリングス", "Rawlings"),
                brand("롤링스", "Rawlings"),
                brand("rawlings", "Rawlings"),
                brand("ゼット", "ZETT"),
                brand("제트", "ZETT"),
                brand("zett", "ZETT"),
                brand("ssk", "SSK"),
                brand("アシックス", "ASICS"),
                brand("아식스", "ASICS"),
                brand("asics", "ASICS"),
                brand("久保田", "Kubota Slugger"),
                brand("구보타", "Kubota Slugger"),
                brand("kubota", "Kubota Slugger"),
                brand("ハタケヤマ", "Hatakeyama"),
                brand("하타케야마", "Hatakeyama"),
                brand("hatakeyama", "Hatakeyama"),
                brand("アトムズ", "ATOMS"),
                brand("아톰즈", "ATOMS"),
                brand("atoms", "ATOMS"),
                brand("ザナックス", "Xanax"),
                brand("xanax", "Xanax"),
                brand("アイピーセレクト", "IP Select"),
                brand("ip select", "IP Select"),
                brand("デサント", "Descente"),
                brand("descente", "Descente"),
                brand("アンダーアーマー", "Under Armour"),
                brand("언더아머", "Under Armour"),
                brand("under armour", "Under Armour"),
            ],
            positions: vec![
                position(&["投手", "ピッチャー", "pitcher", "투수"], Position::Pitcher),
                position(
                    &["捕手", "キャッチャー", "ミット", "catcher", "포수"],
                    Position::Catcher,
                ),
                position(
                    &[
                        "内野", "二塁", "三塁", "一塁", "ショート", "セカンド", "サード",
                        "ファースト", "infield", "내야", "유격수", "2루수", "3루수", "1루수",
                    ],
                    Position::Infield,
                ),
                position(
                    &["外野", "アウトフィールド", "outfield", "외야"],
                    Position::Outfield,
                ),
                position(
                    &["オールラウンド", "オールポジション", "all-round", "올라운드"],
                    Position::AllRound,
                ),
            ],
            new_condition: strings(&["新品", "未使用", "NEW", "새상품", "신품", "미사용"]),
            youth: strings(&["キッズ", "少年", "ジュニア", "子供", "유소년", "아동", "주니어"]),
        }
    }
}

/// Title classifier built from validated [`KeywordTables`].
///
/// Brand, position and age keywords are pre-lowercased for
/// case-insensitive substring matching.
#[derive(Debug, Clone)]
pub struct Classifier {
    brands: Vec<(String, String)>,
    positions: Vec<(Vec<String>, Position)>,
    new_condition: Vec<String>,
    youth: Vec<String>,
}

impl Classifier {
    pub fn new(tables: &KeywordTables) -> Result<Self, ConfigError> {
        if tables.brands.is_empty() {
            return Err(ConfigError::invalid("brand keyword table is empty"));
        }
        if tables.positions.is_empty() {
            return Err(ConfigError::invalid("position keyword table is empty"));
        }
        if tables.new_condition.is_empty() {
            return Err(ConfigError::invalid("condition keyword list is empty"));
        }
        if let Some(rule) = tables.brands.iter().find(|r| r.keyword.trim().is_empty()) {
            return Err(ConfigError::invalid(format!(
                "brand '{}' has an empty keyword",
                rule.brand
            )));
        }

        Ok(Self::from_tables(tables))
    }

    fn from_tables(tables: &KeywordTables) -> Self {
        Self {
            brands: tables
                .brands
                .iter()
                .map(|r| (r.keyword.to_lowercase(), r.brand.clone()))
                .collect(),
            positions: tables
                .positions
                .iter()
                .map(|r| (lowercase_all(&r.keywords), r.position))
                .collect(),
            new_condition: tables.new_condition.clone(),
            youth: lowercase_all(&tables.youth),
        }
    }

    pub fn brand(&self, title: &str) -> String {
        let title = title.to_lowercase();
        self.brands
            .iter()
            .find(|(keyword, _)| title.contains(keyword.as_str()))
            .map(|(_, brand)| brand.clone())
            .unwrap_or_else(|| OTHER_BRAND.to_string())
    }

    pub fn position(&self, title: &str) -> Position {
        let title = title.to_lowercase();
        self.positions
            .iter()
            .find(|(keywords, _)| contains_any(&title, keywords))
            .map(|(_, position)| *position)
            .unwrap_or_default()
    }

    pub fn condition(&self, title: &str) -> Condition {
        if contains_any(title, &self.new_condition) {
            Condition::New
        } else {
            Condition::Used
        }
    }

    pub fn age_group(&self, title: &str) -> AgeGroup {
        if contains_any(&title.to_lowercase(), &self.youth) {
            AgeGroup::Youth
        } else {
            AgeGroup::Adult
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::from_tables(&KeywordTables::default())
    }
}

pub(crate) fn lowercase_all(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

pub(crate) fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle.as_str()))
}

//! Weighted additive product scoring.
//!
//! Each matching signal adds a fixed weight to the score and appends a
//! human-readable reason:
//!
//! | Signal | Weight |
//! |--------|--------|
//! | Category match | +10 |
//! | Type match | +10 |
//! | Color match (once) | +5 |
//! | Navy compound (black + blue requested, product is navy / dark blue) | +8 |
//! | Each keyword contained | +3 |
//! | Price within max / min | +5 each, +3 when both bounds hold |
//! | Scenario alignment | +5 |
//! | Each query word (len > 3) in the title | +8 |
//! | Each style keyword contained | +3 |
//! | Requested size available | +5 |
//! | In stock / out of stock | +2 / −10 |
//!
//! Reasons are diagnostic only and never affect ordering.

use crate::models::{Product, QueryIntent, Scenario};
use crate::query::{has_size, ProductText};
use crate::vocab::{self, mentions, words};

pub const CATEGORY_WEIGHT: i64 = 10;
pub const TYPE_WEIGHT: i64 = 10;
pub const COLOR_WEIGHT: i64 = 5;
pub const NAVY_WEIGHT: i64 = 8;
pub const KEYWORD_WEIGHT: i64 = 3;
pub const PRICE_BOUND_WEIGHT: i64 = 5;
pub const PRICE_RANGE_BONUS: i64 = 3;
pub const SCENARIO_WEIGHT: i64 = 5;
pub const TITLE_WORD_WEIGHT: i64 = 8;
pub const STYLE_WEIGHT: i64 = 3;
pub const SIZE_WEIGHT: i64 = 5;
pub const IN_STOCK_WEIGHT: i64 = 2;
pub const OUT_OF_STOCK_PENALTY: i64 = -10;

/// Score plus the reasons that produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductScore {
    pub score: i64,
    pub reasons: Vec<String>,
}

impl ProductScore {
    fn add(&mut self, weight: i64, reason: String) {
        self.score += weight;
        self.reasons.push(reason);
    }
}

/// Score `product` against an extracted intent and the raw query text.
pub fn score_product(product: &Product, intent: &QueryIntent, raw_query: &str) -> ProductScore {
    let view = ProductText::new(product);
    let mut out = ProductScore::default();

    if let Some(category) = &intent.category {
        if view.matches_category(category) {
            out.add(CATEGORY_WEIGHT, format!("category: {}", category));
        }
    }
    if let Some(ty) = &intent.product_type {
        if view.matches_type(ty) {
            out.add(TYPE_WEIGHT, format!("type: {}", ty));
        }
    }

    if let Some(color) = intent.colors.iter().find(|c| view.matches_color(c)) {
        out.add(COLOR_WEIGHT, format!("color: {}", color));
    }
    if intent.wants_navy_compound()
        && (mentions(&view.words, &view.text, "navy")
            || vocab::contains_phrase(&view.text, "dark blue"))
    {
        out.add(NAVY_WEIGHT, "navy (black + blue)".to_string());
    }

    for keyword in &intent.keywords {
        if view.text.contains(keyword.as_str()) {
            out.add(KEYWORD_WEIGHT, format!("keyword: {}", keyword));
        }
    }

    let range = intent.price_range;
    let under_max = range.max.is_some_and(|max| product.price <= max);
    let over_min = range.min.is_some_and(|min| product.price >= min);
    if under_max {
        out.add(PRICE_BOUND_WEIGHT, "within max price".to_string());
    }
    if over_min {
        out.add(PRICE_BOUND_WEIGHT, "above min price".to_string());
    }
    if under_max && over_min {
        out.add(PRICE_RANGE_BONUS, "within price range".to_string());
    }

    if let Some(scenario) = intent.scenario {
        if scenario_aligned(scenario, &view) {
            out.add(SCENARIO_WEIGHT, format!("scenario: {}", scenario.as_str()));
        }
    }

    let title = product.title.to_lowercase();
    let mut seen: Vec<String> = Vec::new();
    for word in words(raw_query) {
        if word.chars().count() <= 3 || seen.contains(&word) {
            continue;
        }
        if title.contains(word.as_str()) {
            out.add(TITLE_WORD_WEIGHT, format!("title: {}", word));
        }
        seen.push(word);
    }

    for style in &intent.style_keywords {
        if view.text.contains(style.as_str()) {
            out.add(STYLE_WEIGHT, format!("style: {}", style));
        }
    }

    if let Some(size) = intent
        .sizes
        .iter()
        .chain(intent.size.iter())
        .find(|s| has_size(product, s))
    {
        out.add(SIZE_WEIGHT, format!("size: {}", size));
    }

    if product.in_stock {
        out.add(IN_STOCK_WEIGHT, "in stock".to_string());
    } else {
        out.add(OUT_OF_STOCK_PENALTY, "out of stock".to_string());
    }

    out
}

/// Scenario bias only applies to the occasions with a clear apparel
/// vocabulary, checked against category, type, title and tags.
fn scenario_aligned(scenario: Scenario, view: &ProductText) -> bool {
    let terms: &[&str] = match scenario {
        Scenario::Formal => vocab::FORMAL_TERMS,
        Scenario::Casual => vocab::CASUAL_TERMS,
        Scenario::Winter => vocab::WINTER_TERMS,
        Scenario::Summer => vocab::SUMMER_TERMS,
        Scenario::Wedding | Scenario::Interview => return false,
    };
    terms
        .iter()
        .any(|term| mentions(&view.kind_words, &view.kind_text, term))
}

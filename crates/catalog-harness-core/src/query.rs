//! Query intent extraction and strict product filtering.
//!
//! [`extract_query_intent`] turns free text into a [`QueryIntent`]:
//!
//! | Signal | Recognized forms |
//! |--------|------------------|
//! | Price | `under/below/less than/max/up to $N`, `over/above/more than/min $N`, `between $X and $Y`, with `$`, `₹`, `rs`, `inr`, `dollars`, `usd`, `bucks`, `rupees` |
//! | Category / type | Curated nouns, synonyms canonicalized (`sneakers` → `footwear`) |
//! | Color | Fixed palette; black + blue also implies navy |
//! | Size | `XS`/`XL`/`XXL`, capital `S`/`M`/`L`, `size: X`, shoe sizes 4–15 near footwear words |
//! | Scenario | wedding, interview/job, casual/weekend, formal/business, winter/cold, summer/hot |
//!
//! When nothing structured is found, leftover non-stop-words become keywords.
//!
//! [`filter_products`] applies [`FilterCriteria`] strictly: a product must
//! satisfy every criterion that is present.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::models::{FilterCriteria, PriceRange, Product, QueryIntent, Scenario};
use crate::vocab::{self, canonical_color, is_stop_word, lookup_category, mentions, words};

const AMOUNT: &str = r"(\d+(?:,\d{3})*(?:\.\d+)?)";
const PREFIX_UNIT: &str = r"(?:\$|₹|rs\.?|inr)";
const SUFFIX_UNIT: &str = r"(?:dollars?|usd|bucks|rupees?|rs|inr)\b";

static MAX_PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(?:less than|under|below|max(?:imum)?|up to|upto|cheaper than)\s*(?:{p}\s*{a}|{a}\s*{s})",
        p = PREFIX_UNIT,
        a = AMOUNT,
        s = SUFFIX_UNIT
    ))
    .expect("valid max price pattern")
});

static MIN_PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(?:more than|over|above|min(?:imum)?|at least|starting at)\s*(?:{p}\s*{a}|{a}\s*{s})",
        p = PREFIX_UNIT,
        a = AMOUNT,
        s = SUFFIX_UNIT
    ))
    .expect("valid min price pattern")
});

static BETWEEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\bbetween\s*{p}?\s*{a}\s*{s}?\s*(?:and|to|-)\s*{p}?\s*{a}",
        p = PREFIX_UNIT,
        a = AMOUNT,
        s = r"(?:dollars?|usd|bucks|rupees?|rs|inr)?"
    ))
    .expect("valid between pattern")
});

/// Any currency-marked amount; stripped before bare numbers are read as sizes.
static MONEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"{p}\s*{a}|{a}\s*{s}",
        p = PREFIX_UNIT,
        a = AMOUNT,
        s = SUFFIX_UNIT
    ))
    .expect("valid money pattern")
});

static EXPLICIT_SIZE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bsize\s*:?\s*(xxxl|xxl|xl|xxs|xs|s|m|l|\d{1,2}(?:\.5)?)\b")
        .expect("valid explicit size pattern")
});

static MULTI_LETTER_SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(xxxl|xxl|xl|xxs|xs)\b").expect("valid letter size pattern"));

/// Single-letter sizes only count when written in capitals, so "I'm" and
/// "a m" don't read as sizes.
static CAPITAL_SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[\s,(/])([SML])(?:$|[\s,.!?)/])").expect("valid capital size pattern"));

static BARE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2}(?:\.5)?)\b").expect("valid number pattern"));

const SCENARIOS: &[(Scenario, &[&str])] = &[
    (Scenario::Wedding, &["wedding", "weddings", "bridal", "reception"]),
    (Scenario::Interview, &["interview", "interviews", "job"]),
    (Scenario::Casual, &["casual", "weekend", "everyday"]),
    (Scenario::Formal, &["formal", "business", "office"]),
    (Scenario::Winter, &["winter", "cold", "snow", "chilly"]),
    (Scenario::Summer, &["summer", "hot", "beach", "warm"]),
];

/// Extract a [`QueryIntent`] from raw query text.
pub fn extract_query_intent(query: &str) -> QueryIntent {
    let lowered = query.to_lowercase();
    let tokens = words(&lowered);

    let price_range = extract_price_range(&lowered);

    let mut category = None;
    let mut product_type = None;
    for token in &tokens {
        if let Some((cat, ty)) = lookup_category(token) {
            category = Some(cat.to_string());
            product_type = Some(ty);
            break;
        }
    }

    let colors = extract_colors(&tokens);
    let sizes = extract_sizes(query, &tokens);
    let scenario = extract_scenario(&tokens);

    let mut style_keywords = Vec::new();
    for token in &tokens {
        if vocab::STYLE_KEYWORDS.contains(&token.as_str()) && !style_keywords.contains(token) {
            style_keywords.push(token.clone());
        }
    }

    let structured = category.is_some()
        || !colors.is_empty()
        || !price_range.is_empty()
        || !sizes.is_empty()
        || scenario.is_some()
        || !style_keywords.is_empty();

    let keywords = if structured {
        Vec::new()
    } else {
        extract_keywords(&tokens)
    };

    QueryIntent {
        is_category_query: category.is_some(),
        is_price_query: !price_range.is_empty(),
        is_size_query: !sizes.is_empty(),
        category,
        product_type,
        colors,
        keywords,
        price_range,
        style_keywords,
        scenario,
        size: sizes.first().cloned(),
        sizes,
    }
}

fn parse_amount(raw: &str) -> Option<u64> {
    let cleaned = raw.replace(',', "");
    let value: f64 = cleaned.parse().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some((value * 100.0).round() as u64)
    } else {
        None
    }
}

fn captured_amount(caps: &regex::Captures<'_>) -> Option<u64> {
    caps.get(1)
        .or_else(|| caps.get(2))
        .and_then(|m| parse_amount(m.as_str()))
}

/// Price bounds in minor units. An explicit `between` range wins over
/// one-sided phrasing.
pub fn extract_price_range(lowered: &str) -> PriceRange {
    if let Some(caps) = BETWEEN_RE.captures(lowered) {
        let a = caps.get(1).and_then(|m| parse_amount(m.as_str()));
        let b = caps.get(2).and_then(|m| parse_amount(m.as_str()));
        if let (Some(a), Some(b)) = (a, b) {
            return PriceRange {
                min: Some(a.min(b)),
                max: Some(a.max(b)),
            };
        }
    }

    PriceRange {
        min: MIN_PRICE_RE.captures(lowered).and_then(|c| captured_amount(&c)),
        max: MAX_PRICE_RE.captures(lowered).and_then(|c| captured_amount(&c)),
    }
}

/// Palette colors in mention order. Black together with blue adds navy.
pub fn extract_colors(tokens: &[String]) -> Vec<String> {
    let mut colors: Vec<String> = Vec::new();
    for token in tokens {
        if let Some(color) = canonical_color(token) {
            if !colors.iter().any(|c| c == color) {
                colors.push(color.to_string());
            }
        }
    }
    let has = |name: &str| colors.iter().any(|c| c == name);
    if has("black") && has("blue") && !has("navy") {
        colors.push("navy".to_string());
    }
    colors
}

/// Letter and numeric sizes, uppercased, deduplicated, in discovery order.
pub fn extract_sizes(original: &str, tokens: &[String]) -> Vec<String> {
    let mut sizes: Vec<String> = Vec::new();
    let mut push = |size: String| {
        if !sizes.contains(&size) {
            sizes.push(size);
        }
    };

    for caps in EXPLICIT_SIZE_RE.captures_iter(original) {
        let raw = &caps[1];
        if raw.chars().all(|c| c.is_ascii_digit() || c == '.') {
            if is_shoe_size(raw) {
                push(raw.to_string());
            }
        } else {
            push(raw.to_uppercase());
        }
    }

    for caps in MULTI_LETTER_SIZE_RE.captures_iter(original) {
        push(caps[1].to_uppercase());
    }

    for caps in CAPITAL_SIZE_RE.captures_iter(original) {
        push(caps[1].to_string());
    }

    let footwear = tokens
        .iter()
        .any(|t| vocab::FOOTWEAR_TERMS.contains(&t.as_str()));
    if footwear {
        let lowered = original.to_lowercase();
        let without_money = MONEY_RE.replace_all(&lowered, " ");
        let without_prices = BETWEEN_RE.replace_all(&without_money, " ");
        for caps in BARE_NUMBER_RE.captures_iter(&without_prices) {
            let raw = &caps[1];
            if is_shoe_size(raw) {
                push(raw.to_string());
            }
        }
    }

    sizes
}

fn is_shoe_size(raw: &str) -> bool {
    raw.parse::<f64>()
        .map(|n| (4.0..=15.0).contains(&n))
        .unwrap_or(false)
}

pub fn extract_scenario(tokens: &[String]) -> Option<Scenario> {
    SCENARIOS
        .iter()
        .find(|(_, triggers)| tokens.iter().any(|t| triggers.contains(&t.as_str())))
        .map(|(scenario, _)| *scenario)
}

fn extract_keywords(tokens: &[String]) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for token in tokens {
        let numeric_or_currency = token
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == ',');
        if token.len() < 2 || numeric_or_currency || is_stop_word(token) {
            continue;
        }
        if !keywords.contains(token) {
            keywords.push(token.clone());
        }
    }
    keywords
}

/// Per-product lowercase text views used by filtering and scoring.
pub(crate) struct ProductText {
    pub text: String,
    pub words: HashSet<String>,
    /// Category, type, title and tags only.
    pub kind_text: String,
    pub kind_words: HashSet<String>,
}

impl ProductText {
    pub fn new(product: &Product) -> Self {
        let text = product.search_text();
        let kind_text = format!(
            "{} {} {} {}",
            product.category,
            product.product_type,
            product.title,
            product.tags.join(" ")
        )
        .to_lowercase();
        Self {
            words: vocab::word_set(&text),
            kind_words: vocab::word_set(&kind_text),
            text,
            kind_text,
        }
    }

    pub fn matches_category(&self, category: &str) -> bool {
        let category = category.to_lowercase();
        vocab::category_terms(&category)
            .iter()
            .any(|term| mentions(&self.kind_words, &self.kind_text, term))
    }

    pub fn matches_type(&self, product_type: &str) -> bool {
        let ty = product_type.to_lowercase();
        mentions(&self.kind_words, &self.kind_text, &ty)
    }

    pub fn matches_color(&self, color: &str) -> bool {
        if color == "navy" {
            return mentions(&self.words, &self.text, "navy")
                || vocab::contains_phrase(&self.text, "dark blue");
        }
        mentions(&self.words, &self.text, color)
            || (color == "grey" && mentions(&self.words, &self.text, "gray"))
    }
}

/// Whether the product offers `size` among its variant options or tags.
pub fn has_size(product: &Product, size: &str) -> bool {
    let wanted = size.to_lowercase();
    product.variant_values().iter().any(|v| *v == wanted)
        || product.tags.iter().any(|t| t.trim().eq_ignore_ascii_case(size))
        || product
            .tags
            .iter()
            .any(|t| t.to_lowercase() == format!("size:{}", wanted) || t.to_lowercase() == format!("size {}", wanted))
}

/// Keep only products satisfying every present criterion, in input order.
pub fn filter_products(products: &[Product], criteria: &FilterCriteria) -> Vec<Product> {
    products
        .iter()
        .filter(|product| passes(product, criteria))
        .cloned()
        .collect()
}

fn passes(product: &Product, criteria: &FilterCriteria) -> bool {
    let view = ProductText::new(product);

    if let Some(category) = &criteria.category {
        if !view.matches_category(category) {
            return false;
        }
    }
    if let Some(ty) = &criteria.product_type {
        if !view.matches_type(ty) {
            return false;
        }
    }
    if let Some(max) = criteria.max_price {
        if product.price > max {
            return false;
        }
    }
    if let Some(min) = criteria.min_price {
        if product.price < min {
            return false;
        }
    }
    if let Some(color) = &criteria.color {
        if !view.matches_color(&color.to_lowercase()) {
            return false;
        }
    }
    let mut sizes: Vec<&str> = criteria.sizes.iter().map(String::as_str).collect();
    if let Some(size) = &criteria.size {
        if !sizes.contains(&size.as_str()) {
            sizes.push(size);
        }
    }
    if !sizes.is_empty() && !sizes.iter().any(|s| has_size(product, s)) {
        return false;
    }
    true
}

/// Products whose title, description, category or type contain any keyword.
pub fn keyword_matches(products: &[Product], keywords: &[String]) -> Vec<Product> {
    products
        .iter()
        .filter(|product| {
            let haystack = format!(
                "{} {} {} {}",
                product.title, product.description, product.category, product.product_type
            )
            .to_lowercase();
            keywords.iter().any(|k| haystack.contains(&k.to_lowercase()))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blue_jackets_under_100() {
        let intent = extract_query_intent("Show me blue jackets under $100");
        assert_eq!(intent.category.as_deref(), Some("jacket"));
        assert_eq!(intent.product_type.as_deref(), Some("jacket"));
        assert_eq!(intent.colors, vec!["blue"]);
        assert_eq!(intent.price_range.max, Some(10000));
        assert_eq!(intent.price_range.min, None);
        assert!(intent.is_category_query);
        assert!(intent.is_price_query);
        assert!(!intent.is_size_query);
        assert!(intent.keywords.is_empty());
    }

    #[test]
    fn test_price_phrasings() {
        assert_eq!(extract_price_range("over 50 dollars").min, Some(5000));
        assert_eq!(extract_price_range("up to rs 1,500").max, Some(150000));
        assert_eq!(extract_price_range("less than ₹999").max, Some(99900));
        assert_eq!(extract_price_range("at least $19.99").min, Some(1999));
        let range = extract_price_range("between $80 and $40");
        assert_eq!((range.min, range.max), (Some(4000), Some(8000)));
        let range = extract_price_range("between 20 and 60 usd");
        assert_eq!((range.min, range.max), (Some(2000), Some(6000)));
    }

    #[test]
    fn test_unitless_number_is_not_a_price() {
        assert!(extract_price_range("under 5 items").is_empty());
    }

    #[test]
    fn test_black_and_blue_implies_navy() {
        let intent = extract_query_intent("black and blue shirt");
        assert_eq!(intent.colors, vec!["black", "blue", "navy"]);
    }

    #[test]
    fn test_gray_folds_into_grey() {
        let intent = extract_query_intent("gray hoodie");
        assert_eq!(intent.colors, vec!["grey"]);
        assert_eq!(intent.category.as_deref(), Some("sweater"));
        assert_eq!(intent.product_type.as_deref(), Some("hoodie"));
    }

    #[test]
    fn test_letter_sizes() {
        let intent = extract_query_intent("jeans in size: m or XL");
        assert_eq!(intent.sizes, vec!["M", "XL"]);
        assert_eq!(intent.size.as_deref(), Some("M"));
        assert!(intent.is_size_query);

        let intent = extract_query_intent("I'm looking for a tee in L");
        assert_eq!(intent.sizes, vec!["L"]);
    }

    #[test]
    fn test_lowercase_single_letters_are_not_sizes() {
        let intent = extract_query_intent("i'm after a linen shirt");
        assert!(intent.sizes.is_empty());
    }

    #[test]
    fn test_shoe_sizes_need_footwear_context() {
        let intent = extract_query_intent("running shoes 10 under $90");
        assert_eq!(intent.sizes, vec!["10"]);
        assert_eq!(intent.price_range.max, Some(9000));
        assert_eq!(intent.category.as_deref(), Some("footwear"));

        let intent = extract_query_intent("top 10 gifts");
        assert!(intent.sizes.is_empty());

        let intent = extract_query_intent("boots size 22");
        assert!(intent.sizes.is_empty());
    }

    #[test]
    fn test_scenarios() {
        let tags: Vec<_> = [
            "something for a wedding",
            "outfit for a job interview",
            "weekend wear",
            "business meeting",
            "cold weather",
            "hot day at the beach",
        ]
        .iter()
        .map(|q| extract_query_intent(q).scenario)
        .collect();
        assert_eq!(
            tags,
            vec![
                Some(Scenario::Wedding),
                Some(Scenario::Interview),
                Some(Scenario::Casual),
                Some(Scenario::Formal),
                Some(Scenario::Winter),
                Some(Scenario::Summer),
            ]
        );
    }

    #[test]
    fn test_keywords_only_without_structured_signals() {
        let intent = extract_query_intent("do you have the Aurora 3000 lamp?");
        assert_eq!(intent.keywords, vec!["aurora", "lamp"]);

        let intent = extract_query_intent("red aurora lamp");
        assert!(intent.keywords.is_empty());
        assert_eq!(intent.colors, vec!["red"]);
    }

    fn product(id: &str, title: &str, category: &str, price: u64) -> Product {
        let mut p = Product::new(id, title);
        p.category = category.to_string();
        p.price = price;
        p
    }

    #[test]
    fn test_filter_products_strict() {
        let mut navy = product("1", "Navy Bomber Jacket", "Outerwear", 8000);
        navy.variants = json!([{ "option1": "M" }, { "option1": "L" }]);
        let products = vec![
            navy,
            product("2", "Blue Denim Jacket", "Outerwear", 12000),
            product("3", "Blue Tee", "Tops", 2000),
        ];

        let criteria = FilterCriteria {
            category: Some("jacket".into()),
            max_price: Some(10000),
            ..Default::default()
        };
        let ids: Vec<_> = filter_products(&products, &criteria)
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["1"]);

        let criteria = FilterCriteria {
            color: Some("blue".into()),
            ..Default::default()
        };
        assert_eq!(filter_products(&products, &criteria).len(), 2);

        let criteria = FilterCriteria {
            size: Some("M".into()),
            ..Default::default()
        };
        assert_eq!(filter_products(&products, &criteria).len(), 1);

        assert_eq!(filter_products(&products, &FilterCriteria::default()).len(), 3);
    }

    #[test]
    fn test_keyword_matches_fields() {
        let products = vec![
            product("1", "Aurora Lamp", "Lighting", 0),
            product("2", "Desk", "Furniture", 0),
        ];
        let found = keyword_matches(&products, &["aurora".to_string()]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");
    }
}

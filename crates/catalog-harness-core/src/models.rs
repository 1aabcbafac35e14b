//! Core data models used throughout Catalog Harness.
//!
//! These types represent the canonical products produced by adapters and the
//! per-request artifacts (query intents, conversational intents, scored
//! products) that flow through the matching pipeline.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical product shape produced by every adapter.
///
/// `price` is always in minor currency units (cents), whatever the source
/// representation was. Products are never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: u64,
    #[serde(default)]
    pub category: String,
    #[serde(default, rename = "type")]
    pub product_type: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub variants: Value,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

fn default_in_stock() -> bool {
    true
}

impl Product {
    /// Minimal in-stock product with only an id and title set.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            price: 0,
            category: String::new(),
            product_type: String::new(),
            vendor: String::new(),
            tags: Vec::new(),
            images: Vec::new(),
            variants: Value::Null,
            in_stock: true,
            metadata: Map::new(),
        }
    }

    /// Lowercased title, description, category, type, vendor and tags joined
    /// by spaces. Used for containment checks during filtering and scoring.
    pub fn search_text(&self) -> String {
        let mut text = String::with_capacity(
            self.title.len() + self.description.len() + self.category.len() + 64,
        );
        for part in [
            &self.title,
            &self.description,
            &self.category,
            &self.product_type,
            &self.vendor,
        ] {
            text.push_str(part);
            text.push(' ');
        }
        for tag in &self.tags {
            text.push_str(tag);
            text.push(' ');
        }
        text.to_lowercase()
    }

    /// All string and number leaves found in `variants`, lowercased.
    ///
    /// Variants are opaque, so size availability is answered by looking at
    /// every option value regardless of how the source nests them.
    pub fn variant_values(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_leaves(&self.variants, &mut out);
        out
    }
}

fn collect_leaves(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.trim().to_lowercase()),
        Value::Number(n) => out.push(n.to_string()),
        Value::Array(items) => items.iter().for_each(|v| collect_leaves(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_leaves(v, out)),
        Value::Bool(_) | Value::Null => {}
    }
}

/// Structured search constraints. Every field is optional; an absent field
/// never excludes anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

impl FilterCriteria {
    /// True when no constraint is set.
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.product_type.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.color.is_none()
            && self.size.is_none()
            && self.sizes.is_empty()
            && self.keywords.is_empty()
    }
}

/// Inclusive price bounds in minor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
}

impl PriceRange {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Occasion a shopper mentions, used to bias toward matching apparel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Wedding,
    Interview,
    Casual,
    Formal,
    Winter,
    Summer,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Wedding => "wedding",
            Scenario::Interview => "interview",
            Scenario::Casual => "casual",
            Scenario::Formal => "formal",
            Scenario::Winter => "winter",
            Scenario::Summer => "summer",
        }
    }
}

/// Search-focused interpretation of a single query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryIntent {
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    pub colors: Vec<String>,
    pub keywords: Vec<String>,
    pub price_range: PriceRange,
    pub style_keywords: Vec<String>,
    pub scenario: Option<Scenario>,
    pub is_price_query: bool,
    pub is_category_query: bool,
    pub is_size_query: bool,
    pub size: Option<String>,
    pub sizes: Vec<String>,
}

impl QueryIntent {
    /// True when black and blue were both requested, which implies navy.
    pub fn wants_navy_compound(&self) -> bool {
        self.colors.iter().any(|c| c == "black") && self.colors.iter().any(|c| c == "blue")
    }

    /// Convert to strict filter criteria. A black+blue request collapses to
    /// the compound `navy` color.
    pub fn to_criteria(&self) -> FilterCriteria {
        let color = if self.wants_navy_compound() {
            Some("navy".to_string())
        } else {
            self.colors.first().cloned()
        };
        FilterCriteria {
            category: self.category.clone(),
            product_type: self.product_type.clone(),
            min_price: self.price_range.min,
            max_price: self.price_range.max,
            color,
            size: self.size.clone(),
            sizes: self.sizes.clone(),
            keywords: self.keywords.clone(),
        }
    }
}

/// Conversational purpose of one user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentType {
    Search,
    Recommendation,
    Question,
    TicketCreation,
    Comparison,
    PolicyQuery,
}

impl IntentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentType::Search => "search",
            IntentType::Recommendation => "recommendation",
            IntentType::Question => "question",
            IntentType::TicketCreation => "ticket_creation",
            IntentType::Comparison => "comparison",
            IntentType::PolicyQuery => "policy_query",
        }
    }
}

/// Where a support-ticket conversation currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStage {
    Offer,
    AwaitingConfirmation,
    Create,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Price,
    Size,
    Category,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Neutral,
    Frustrated,
}

/// Classified conversational intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    #[serde(rename = "type")]
    pub intent_type: IntentType,
    pub confidence: f64,
    pub wants_recommendations: bool,
    pub wants_ticket: bool,
    pub ticket_stage: Option<TicketStage>,
    pub filters: FilterCriteria,
    pub query_type: QueryType,
    pub sentiment: Sentiment,
}

/// The product a shopper is currently looking at, if any.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductContext {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: String,
}

impl From<&Product> for ProductContext {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            category: product.category.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One prior message in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A product paired with its relevance score for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredProduct {
    pub product: Product,
    pub score: i64,
    pub match_reasons: Vec<String>,
}

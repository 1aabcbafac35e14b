//! Rule-based conversational intent classification.
//!
//! [`classify_intent`] assigns one [`IntentType`] per user message. Rules are
//! evaluated in a fixed order and the first match wins:
//!
//! | Step | Trigger | Result |
//! |------|---------|--------|
//! | 0 | Affirmative reply to a ticket offer / confirmation request | `ticket_creation` (awaiting_confirmation / create) |
//! | 1 | Ticket or complaint phrasing | `ticket_creation` (offer) |
//! | 2 | Policy, shipping, returns, privacy | `policy_query` |
//! | 3 | Short greeting, or phrasing about the open product | `question` |
//! | 4 | Recommendation verbs | `recommendation` |
//! | 5 | Comparison phrasing | `comparison` |
//! | 6 | Search verbs, category nouns, colors, price bounds | `search` |
//! | 7 | Anything else | `question` |
//!
//! Filters are extracted for every message regardless of the branch taken.

use crate::models::{
    ConversationTurn, FilterCriteria, Intent, IntentType, ProductContext, QueryType, Role,
    Sentiment, TicketStage,
};
use crate::query::extract_query_intent;
use crate::vocab::{contains_any_phrase, contains_phrase, lookup_category, words};

const TICKET_PHRASES: &[&str] = &[
    "ticket",
    "support request",
    "complaint",
    "complain",
    "issue",
    "problem",
    "not working",
    "broken",
    "damaged",
    "defective",
    "wrong item",
    "never arrived",
    "talk to a human",
    "speak to a human",
    "talk to someone",
    "speak to someone",
    "real person",
    "human agent",
    "customer service",
];

const POLICY_PHRASES: &[&str] = &[
    "policy",
    "policies",
    "shipping",
    "delivery",
    "deliver",
    "return",
    "returns",
    "refund",
    "refunds",
    "exchange",
    "privacy",
    "warranty",
    "terms of service",
    "terms and conditions",
];

const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "hiya",
    "howdy",
    "greetings",
    "good morning",
    "good afternoon",
    "good evening",
];

const ABOUT_PRODUCT_PHRASES: &[&str] = &[
    "this product",
    "this item",
    "current product",
    "this one",
    "about this",
    "tell me more",
];

/// Questions that point at the open product without naming it. Only
/// consulted when a product context is present.
const PRODUCT_QUESTION_PHRASES: &[&str] = &[
    "is it",
    "is this",
    "is that",
    "does it",
    "does this",
    "does that",
    "will it",
    "will this",
    "can it",
    "can this",
    "how does it",
    "how is it",
    "what is it",
    "what's it",
    "it's",
    "its",
];

/// Words that make a bare "small" / "medium" / "large" read as a size.
const SIZE_LEADS: &[&str] = &["size", "in", "sized"];

const RECOMMENDATION_PHRASES: &[&str] = &[
    "recommend",
    "recommendation",
    "recommendations",
    "suggest",
    "suggestion",
    "suggestions",
    "goes with",
    "go with",
    "pair with",
    "pairs with",
    "match with",
    "complete the look",
    "what should i wear",
];

const COMPARISON_PHRASES: &[&str] = &[
    "compare",
    "comparison",
    "vs",
    "versus",
    "difference between",
    "which is better",
    "better than",
];

const SEARCH_VERBS: &[&str] = &[
    "show",
    "find",
    "search",
    "looking for",
    "look for",
    "browse",
    "do you have",
    "do you sell",
    "i want",
    "i need",
    "get me",
];

const AFFIRMATIONS: &[&str] = &[
    "yes",
    "yeah",
    "yep",
    "yup",
    "sure",
    "ok",
    "okay",
    "please",
    "please do",
    "go ahead",
    "do it",
    "confirm",
    "confirmed",
    "correct",
    "create it",
];

const OFFER_PHRASES: &[&str] = &[
    "would you like",
    "want me to",
    "shall i",
    "should i",
    "can i",
    "like me to",
];

/// Classify one user message.
///
/// `context` is the product currently open on the page, if any; `history` is
/// the prior conversation, oldest first.
pub fn classify_intent(
    message: &str,
    context: Option<&ProductContext>,
    history: &[ConversationTurn],
) -> Intent {
    let lowered = message.trim().to_lowercase();
    let tokens = words(&lowered);
    let filters = extract_filters(message, &tokens);
    let query_type = query_type_for(&filters);

    let ticket_matched = contains_any_phrase(&lowered, TICKET_PHRASES);
    let sentiment = if ticket_matched {
        Sentiment::Frustrated
    } else {
        Sentiment::Neutral
    };

    let build = |intent_type: IntentType, confidence: f64, wants_recommendations: bool| Intent {
        intent_type,
        confidence,
        wants_recommendations,
        wants_ticket: intent_type == IntentType::TicketCreation,
        ticket_stage: None,
        filters: filters.clone(),
        query_type,
        sentiment,
    };

    if let Some(stage) = ticket_stage_from_history(&lowered, &tokens, history) {
        let mut intent = build(IntentType::TicketCreation, 0.95, false);
        intent.ticket_stage = Some(stage);
        return intent;
    }

    if ticket_matched {
        let mut intent = build(IntentType::TicketCreation, 0.9, false);
        intent.ticket_stage = Some(TicketStage::Offer);
        return intent;
    }

    if contains_any_phrase(&lowered, POLICY_PHRASES) {
        return build(IntentType::PolicyQuery, 0.85, false);
    }

    if is_greeting(&lowered, &tokens) {
        return build(IntentType::Question, 0.9, false);
    }
    if is_about_product(&lowered, context) {
        return build(IntentType::Question, 0.8, false);
    }

    if contains_any_phrase(&lowered, RECOMMENDATION_PHRASES) {
        return build(IntentType::Recommendation, 0.8, true);
    }

    if contains_any_phrase(&lowered, COMPARISON_PHRASES) {
        return build(IntentType::Comparison, 0.75, false);
    }

    let has_verb = contains_any_phrase(&lowered, SEARCH_VERBS);
    let has_noun = tokens.iter().any(|t| lookup_category(t).is_some());
    let has_color = filters.color.is_some();
    let has_price = filters.min_price.is_some() || filters.max_price.is_some();
    let signals = [has_verb, has_noun, has_color, has_price]
        .iter()
        .filter(|s| **s)
        .count();
    if signals > 0 {
        let confidence = 0.7 + 0.05 * (signals - 1) as f64;
        return build(IntentType::Search, confidence, has_verb || has_noun);
    }

    build(IntentType::Question, 0.5, false)
}

/// Stage implied by an affirmative reply to the assistant's last ticket turn.
fn ticket_stage_from_history(
    lowered: &str,
    tokens: &[String],
    history: &[ConversationTurn],
) -> Option<TicketStage> {
    if !is_affirmation(lowered, tokens) {
        return None;
    }
    let last = history.iter().rev().find(|t| t.role == Role::Assistant)?;
    let said = last.content.to_lowercase();
    if !said.contains("ticket") {
        return None;
    }
    if said.contains("confirm") {
        Some(TicketStage::Create)
    } else if contains_any_phrase(&said, OFFER_PHRASES) {
        Some(TicketStage::AwaitingConfirmation)
    } else {
        None
    }
}

fn is_affirmation(lowered: &str, tokens: &[String]) -> bool {
    if tokens.is_empty() || tokens.len() > 6 {
        return false;
    }
    AFFIRMATIONS
        .iter()
        .any(|a| lowered.starts_with(a) && crate::vocab::contains_phrase(lowered, a))
}

fn is_greeting(lowered: &str, tokens: &[String]) -> bool {
    tokens.len() <= 3
        && GREETINGS.iter().any(|g| {
            lowered.starts_with(g)
                && lowered[g.len()..]
                    .chars()
                    .next()
                    .map_or(true, |c| !c.is_alphanumeric())
        })
}

/// Phrasing about the open product. A bare pronoun is not enough: "show me
/// jackets that are waterproof" is a search even with a product open.
fn is_about_product(lowered: &str, context: Option<&ProductContext>) -> bool {
    if contains_any_phrase(lowered, ABOUT_PRODUCT_PHRASES) {
        return true;
    }
    let Some(product) = context else {
        return false;
    };
    if contains_any_phrase(lowered, PRODUCT_QUESTION_PHRASES) {
        return true;
    }
    // Naming the open product only counts when no other branch would claim
    // the message.
    !product.title.is_empty()
        && contains_phrase(lowered, &product.title.to_lowercase())
        && !contains_any_phrase(lowered, RECOMMENDATION_PHRASES)
        && !contains_any_phrase(lowered, COMPARISON_PHRASES)
        && !contains_any_phrase(lowered, SEARCH_VERBS)
}

/// Query-extractor filters, plus spelled-out clothing sizes written next to
/// size vocabulary ("in medium", "in a large", "size small", "small size").
fn extract_filters(message: &str, tokens: &[String]) -> FilterCriteria {
    let mut criteria = extract_query_intent(message).to_criteria();
    if criteria.sizes.is_empty() {
        for (i, token) in tokens.iter().enumerate() {
            let size = match token.as_str() {
                "small" => "S",
                "medium" => "M",
                "large" => "L",
                _ => continue,
            };
            if !reads_as_size(tokens, i) {
                continue;
            }
            if !criteria.sizes.iter().any(|s| s == size) {
                criteria.sizes.push(size.to_string());
            }
        }
        criteria.size = criteria.sizes.first().cloned();
    }
    criteria
}

fn reads_as_size(tokens: &[String], i: usize) -> bool {
    let at = |j: usize| tokens.get(j).map(String::as_str);
    let prev = i.checked_sub(1).and_then(at);
    let before_prev = i.checked_sub(2).and_then(at);
    let next = at(i + 1);
    prev.is_some_and(|w| SIZE_LEADS.contains(&w))
        || (matches!(prev, Some("a")) && matches!(before_prev, Some("in")))
        || matches!(next, Some("size"))
}

fn query_type_for(filters: &FilterCriteria) -> QueryType {
    if filters.min_price.is_some() || filters.max_price.is_some() {
        QueryType::Price
    } else if filters.size.is_some() || !filters.sizes.is_empty() {
        QueryType::Size
    } else if filters.category.is_some() {
        QueryType::Category
    } else {
        QueryType::General
    }
}

//! Maximum candidate count per intent type.

use crate::models::IntentType;

/// How many ranked products to hand downstream for `intent_type`, never more
/// than the catalog holds.
pub fn result_limit(intent_type: IntentType, catalog_len: usize) -> usize {
    let limit = match intent_type {
        IntentType::Search => 10,
        IntentType::Recommendation => 20,
        IntentType::Question => 5,
        IntentType::Comparison => 4,
        IntentType::TicketCreation | IntentType::PolicyQuery => 15,
    };
    limit.min(catalog_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_per_intent() {
        assert_eq!(result_limit(IntentType::Search, 100), 10);
        assert_eq!(result_limit(IntentType::Recommendation, 100), 20);
        assert_eq!(result_limit(IntentType::Question, 100), 5);
        assert_eq!(result_limit(IntentType::Comparison, 100), 4);
        assert_eq!(result_limit(IntentType::PolicyQuery, 100), 15);
        assert_eq!(result_limit(IntentType::TicketCreation, 100), 15);
    }

    #[test]
    fn test_limit_bounded_by_catalog() {
        assert_eq!(result_limit(IntentType::Recommendation, 7), 7);
        assert_eq!(result_limit(IntentType::Search, 0), 0);
    }
}

//! Curated vocabularies shared by the query extractor, the intent
//! classifier, and the scorer.

use std::collections::HashSet;

/// Canonical category → query nouns that select it.
pub const CATEGORY_TERMS: &[(&str, &[&str])] = &[
    (
        "footwear",
        &[
            "shoe", "shoes", "sneaker", "sneakers", "boot", "boots", "sandal", "sandals", "heels",
            "loafer", "loafers", "trainers", "slippers", "flats",
        ],
    ),
    (
        "jacket",
        &[
            "jacket", "jackets", "coat", "coats", "parka", "parkas", "windbreaker", "windbreakers",
        ],
    ),
    (
        "shirt",
        &[
            "shirt", "shirts", "tee", "tees", "t-shirt", "t-shirts", "tshirt", "tshirts", "blouse",
            "blouses", "polo", "polos", "top", "tops",
        ],
    ),
    (
        "pants",
        &[
            "pants", "trousers", "jeans", "chinos", "leggings", "joggers",
        ],
    ),
    ("dress", &["dress", "dresses", "gown", "gowns"]),
    ("skirt", &["skirt", "skirts"]),
    ("shorts", &["shorts"]),
    (
        "sweater",
        &[
            "sweater", "sweaters", "hoodie", "hoodies", "cardigan", "cardigans", "sweatshirt",
            "sweatshirts", "pullover", "pullovers",
        ],
    ),
    ("suit", &["suit", "suits", "blazer", "blazers", "tuxedo", "tuxedos"]),
    (
        "bag",
        &[
            "bag", "bags", "backpack", "backpacks", "handbag", "handbags", "purse", "purses",
            "tote", "totes", "wallet", "wallets",
        ],
    ),
    (
        "accessories",
        &[
            "hat", "hats", "cap", "caps", "scarf", "scarves", "belt", "belts", "sunglasses",
            "watch", "watches", "jewelry", "gloves", "tie", "ties", "socks",
        ],
    ),
];

/// Nouns that are plural in form but singular in meaning.
const PLURAL_ONLY: &[&str] = &[
    "pants", "trousers", "jeans", "chinos", "leggings", "joggers", "shorts", "sunglasses",
    "trainers", "slippers", "flats", "heels", "gloves", "socks",
];

/// Fixed color palette. `gray` is folded into `grey`.
pub const COLORS: &[&str] = &[
    "black", "white", "red", "blue", "green", "yellow", "orange", "purple", "pink", "brown",
    "grey", "gray", "navy", "beige", "maroon", "olive", "teal", "cream", "gold", "silver", "khaki",
    "tan", "burgundy",
];

pub const STYLE_KEYWORDS: &[&str] = &[
    "vintage", "retro", "classic", "modern", "elegant", "slim", "oversized", "relaxed",
    "minimalist", "sporty", "athletic", "boho", "bohemian", "streetwear", "chic", "cozy",
    "lightweight", "waterproof", "leather", "denim", "cotton", "linen", "wool", "silk", "floral",
    "striped", "graphic",
];

/// Words that mark a query as being about footwear, used to accept bare
/// numbers as shoe sizes.
pub const FOOTWEAR_TERMS: &[&str] = &[
    "shoe", "shoes", "sneaker", "sneakers", "boot", "boots", "sandal", "sandals", "heels",
    "loafer", "loafers", "trainers", "footwear", "slippers", "flats",
];

pub const FORMAL_TERMS: &[&str] = &[
    "suit", "blazer", "tuxedo", "formal", "dress shirt", "oxford", "loafer", "tie", "gown",
    "trousers", "heels",
];
pub const CASUAL_TERMS: &[&str] = &[
    "t-shirt", "tee", "jeans", "sneaker", "hoodie", "casual", "shorts", "polo", "joggers",
    "sweatshirt",
];
pub const WINTER_TERMS: &[&str] = &[
    "coat", "jacket", "parka", "sweater", "boot", "scarf", "wool", "thermal", "gloves", "beanie",
    "cardigan",
];
pub const SUMMER_TERMS: &[&str] = &[
    "shorts", "t-shirt", "tee", "sandal", "linen", "tank", "dress", "skirt", "sunglasses", "swim",
];

pub const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "i", "me", "my", "we", "us", "you", "your", "show", "find", "want", "need",
    "looking", "look", "for", "some", "any", "with", "and", "or", "of", "to", "in", "on", "at",
    "is", "are", "do", "does", "have", "has", "can", "could", "would", "should", "please", "get",
    "give", "buy", "something", "items", "item", "products", "product", "like", "what", "which",
    "that", "this", "it", "be", "am", "im", "search", "see", "there", "good", "best", "under",
    "over", "between", "less", "more", "than", "above", "below", "up", "max", "min", "price",
    "priced", "cost", "cheap", "about", "around", "from", "by", "all", "any", "got", "them",
    "those", "these", "one", "ones", "size", "sizes", "color", "colour", "dollars", "dollar",
    "usd", "bucks", "rupees", "rs", "inr", "much", "how", "let", "lets", "also", "too", "really",
];

/// Lowercase alphanumeric words (hyphens kept) of `text`, in order.
pub fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .map(|w| w.trim_matches('-'))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn word_set(text: &str) -> HashSet<String> {
    words(text).into_iter().collect()
}

/// Whether `term` (one or more words) occurs in `text` on word boundaries.
/// Single-word terms also match their simple plural.
pub fn mentions(text_words: &HashSet<String>, lowered_text: &str, term: &str) -> bool {
    if term.contains(' ') {
        return contains_phrase(lowered_text, term);
    }
    text_words.contains(term)
        || text_words.contains(&format!("{}s", term))
        || text_words.contains(&format!("{}es", term))
}

/// Phrase containment on word boundaries.
pub fn contains_phrase(lowered_text: &str, phrase: &str) -> bool {
    let mut start = 0;
    while let Some(pos) = lowered_text[start..].find(phrase) {
        let begin = start + pos;
        let end = begin + phrase.len();
        let before_ok = lowered_text[..begin]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = lowered_text[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        start = begin + phrase.len().max(1);
        if start >= lowered_text.len() {
            break;
        }
    }
    false
}

pub fn contains_any_phrase(lowered_text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| contains_phrase(lowered_text, p))
}

/// Canonical category for a query noun, with the noun's singular form.
pub fn lookup_category(word: &str) -> Option<(&'static str, String)> {
    CATEGORY_TERMS
        .iter()
        .find(|(_, terms)| terms.contains(&word))
        .map(|(category, _)| (*category, singular(word)))
}

/// Every term that selects `category`, or the category itself when it is
/// not one of the curated groups.
pub fn category_terms(category: &str) -> Vec<&str> {
    match CATEGORY_TERMS.iter().find(|(c, _)| *c == category) {
        Some((c, terms)) => std::iter::once(*c).chain(terms.iter().copied()).collect(),
        None => vec![category],
    }
}

pub fn singular(word: &str) -> String {
    if PLURAL_ONLY.contains(&word) {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("ves") {
        return format!("{}f", stem);
    }
    if let Some(stem) = word.strip_suffix("sses") {
        return format!("{}ss", stem);
    }
    if word == "shoes" {
        return "shoe".to_string();
    }
    if let Some(stem) = word.strip_suffix("ches") {
        return format!("{}ch", stem);
    }
    if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

pub fn canonical_color(word: &str) -> Option<&'static str> {
    if word == "gray" {
        return Some("grey");
    }
    COLORS.iter().find(|c| **c == word).copied()
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular_forms() {
        assert_eq!(singular("jackets"), "jacket");
        assert_eq!(singular("dresses"), "dress");
        assert_eq!(singular("scarves"), "scarf");
        assert_eq!(singular("watches"), "watch");
        assert_eq!(singular("shoes"), "shoe");
        assert_eq!(singular("jeans"), "jeans");
        assert_eq!(singular("tee"), "tee");
    }

    #[test]
    fn test_lookup_category_canonicalizes_synonyms() {
        assert_eq!(lookup_category("sneakers"), Some(("footwear", "sneaker".to_string())));
        assert_eq!(lookup_category("boots"), Some(("footwear", "boot".to_string())));
        assert_eq!(lookup_category("jackets"), Some(("jacket", "jacket".to_string())));
        assert_eq!(lookup_category("laptop"), None);
    }

    #[test]
    fn test_phrase_needs_word_boundaries() {
        assert!(contains_phrase("a dark blue coat", "dark blue"));
        assert!(!contains_phrase("steeltee", "tee"));
        assert!(contains_phrase("tee", "tee"));
        assert!(!contains_phrase("returned", "return"));
    }

    #[test]
    fn test_words_keep_hyphens() {
        assert_eq!(words("Cool T-Shirts, $20!"), vec!["cool", "t-shirts", "20"]);
    }
}

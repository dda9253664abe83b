use serde::{Deserialize, Serialize};

/// Normalize a string for matching: trim, optionally lowercase, collapse
/// whitespace runs into single spaces.
pub fn normalize_string(s: &str, lower: bool) -> String {
    let s = s.trim();
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if lower {
        collapsed.to_lowercase()
    } else {
        collapsed
    }
}

/// Normalize a word: strip all whitespace, inside and out.
pub fn normalize_word(s: &str) -> String {
    s.split_whitespace().collect()
}

/// Similarity ratio from the beginning of the two strings: common-prefix
/// length over the length of `a`.
pub fn prefix_similarity(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.is_empty() {
        return 1.0;
    }
    let common = a_chars
        .iter()
        .zip(&b_chars)
        .take_while(|(x, y)| x == y)
        .count();
    common as f64 / a_chars.len() as f64
}

/// Exact substring match on normalized text.
pub fn target_match(text: &str, target: &str) -> bool {
    let target = normalize_string(target, true);
    let text = normalize_string(text, true);
    text.contains(&target)
}

/// Edit-distance similarity of the normalized strings against a threshold.
pub fn target_fuzzy_match(text: &str, target: &str, ratio: f64) -> bool {
    let text = normalize_string(text, true);
    let target = normalize_string(target, true);
    strsim::normalized_levenshtein(&target, &text) >= ratio
}

/// Prefix similarity of the normalized target against a threshold.
pub fn target_prefix_match(text: &str, target: &str, ratio: f64) -> bool {
    let text = normalize_string(text, true);
    let target = normalize_string(target, true);
    prefix_similarity(&target, &text) >= ratio
}

/// How a format matches row text against target company names. Thresholded
/// strategies can be combined to cut false positives from short names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Exact,
    Fuzzy { ratio: f64 },
    Prefix { ratio: f64 },
    FuzzyAndPrefix { fuzzy: f64, prefix: f64 },
}

impl MatchStrategy {
    pub fn matches(&self, text: &str, target: &str) -> bool {
        match *self {
            MatchStrategy::Exact => target_match(text, target),
            MatchStrategy::Fuzzy { ratio } => target_fuzzy_match(text, target, ratio),
            MatchStrategy::Prefix { ratio } => target_prefix_match(text, target, ratio),
            MatchStrategy::FuzzyAndPrefix { fuzzy, prefix } => {
                target_fuzzy_match(text, target, fuzzy) && target_prefix_match(text, target, prefix)
            }
        }
    }
}

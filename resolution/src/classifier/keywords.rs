//! Keyword rules for the heuristic classification tier.
//!
//! One keyword set per category, each pinned to a tier. A keyword matches
//! when its words appear as consecutive tokens. Leading words must match
//! exactly; the last word also matches its regular inflections, so
//! "charge" matches "charged" and "charging", "crash" matches "crashing",
//! but "hack" does not match "hackathon" and "log in" does not match "log
//! includes". Keyword words shorter than four characters ("500", "2fa")
//! only match exactly. Each keyword counts once no matter how often it
//! appears.
//!
//! ```text
//! Category        | Tier     | Priority (ties)
//! ----------------|----------|----------------
//! Security        | Complex  | 1
//! Billing         | Tier 2   | 2
//! Auth            | Tier 1   | 3
//! Technical       | Complex  | 4
//! FeatureRequest  | Tier 2   | 5
//! Other           | Tier 1   | 6
//! ```

use crate::types::{Category, Tier};

/// Starting confidence for a keyword classification.
pub const BASE_CONFIDENCE: f64 = 0.5;
/// Added per distinct matched keyword.
pub const CONFIDENCE_PER_MATCH: f64 = 0.1;
/// Keyword matching is never treated as certain.
pub const CONFIDENCE_CEILING: f64 = 0.85;

/// A keyword set and the (tier, category) it maps to.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub category: Category,
    pub tier: Tier,
    pub keywords: &'static [&'static str],
}

pub const KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        category: Category::Security,
        tier: Tier::Complex,
        keywords: &[
            "security",
            "breach",
            "hack",
            "unauthorized",
            "phishing",
            "compromised",
            "fraud",
            "vulnerability",
            "suspicious",
            "stolen",
        ],
    },
    KeywordRule {
        category: Category::Billing,
        tier: Tier::Tier2,
        keywords: &[
            "billing",
            "payment",
            "invoice",
            "charge",
            "overcharge",
            "refund",
            "subscription",
            "receipt",
            "credit card",
            "pricing",
            "upgrade",
            "downgrade",
        ],
    },
    KeywordRule {
        category: Category::Auth,
        tier: Tier::Tier1,
        keywords: &[
            "password",
            "reset",
            "login",
            "log in",
            "sign in",
            "forgot",
            "username",
            "locked out",
            "unlock",
            "credentials",
            "2fa",
            "two factor",
            "verification code",
        ],
    },
    KeywordRule {
        category: Category::Technical,
        tier: Tier::Complex,
        keywords: &[
            "error",
            "bug",
            "crash",
            "broken",
            "not working",
            "outage",
            "exception",
            "500",
            "timeout",
            "freeze",
        ],
    },
    KeywordRule {
        category: Category::FeatureRequest,
        tier: Tier::Tier2,
        keywords: &[
            "feature",
            "suggestion",
            "enhancement",
            "would be nice",
            "wish",
            "roadmap",
            "add support",
        ],
    },
    KeywordRule {
        category: Category::Other,
        tier: Tier::Tier1,
        keywords: &[
            "how to",
            "tutorial",
            "guide",
            "documentation",
            "download",
            "install",
            "getting started",
        ],
    },
];

/// Any match raises the tier to Complex regardless of category.
pub const URGENCY_KEYWORDS: &[&str] = &[
    "urgent",
    "critical",
    "emergency",
    "asap",
    "immediately",
    "system down",
    "production down",
    "data loss",
];

/// Outcome of running the keyword rules over a ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordMatch {
    pub category: Category,
    pub tier: Tier,
    pub confidence: f64,
    /// Category keywords first, then urgency keywords
    pub matched: Vec<String>,
}

/// Confidence for `matches` distinct keywords, capped below certainty.
pub fn keyword_confidence(matches: usize) -> f64 {
    (BASE_CONFIDENCE + CONFIDENCE_PER_MATCH * matches as f64).min(CONFIDENCE_CEILING)
}

/// Whether `keyword` occurs in the token stream.
pub fn keyword_matches(tokens: &[String], keyword: &str) -> bool {
    let parts: Vec<&str> = keyword.split_whitespace().collect();
    if parts.is_empty() || parts.len() > tokens.len() {
        return false;
    }
    let last = parts.len() - 1;
    tokens.windows(parts.len()).any(|window| {
        window.iter().zip(&parts).enumerate().all(|(i, (token, part))| {
            if i == last {
                inflects(token, part)
            } else {
                token == part
            }
        })
    })
}

/// Suffixes accepted after the last word of a keyword.
const INFLECTIONS: &[&str] = &["s", "es", "d", "ed", "ing", "er", "ers"];

/// Shorter keyword words only match exactly.
const MIN_INFLECTED_LEN: usize = 4;

/// `token` is `word` or a regular inflection of it. A trailing "e" may be
/// dropped before the suffix ("freeze" / "freezing").
fn inflects(token: &str, word: &str) -> bool {
    if token == word {
        return true;
    }
    if word.len() < MIN_INFLECTED_LEN {
        return false;
    }
    let with_suffix = |stem: &str| {
        token
            .strip_prefix(stem)
            .is_some_and(|rest| INFLECTIONS.contains(&rest))
    };
    with_suffix(word) || word.strip_suffix('e').is_some_and(with_suffix)
}

fn matched_keywords(tokens: &[String], keywords: &[&str]) -> Vec<String> {
    keywords
        .iter()
        .filter(|k| keyword_matches(tokens, k))
        .map(|k| k.to_string())
        .collect()
}

/// Apply the rules to pre-tokenized ticket text.
///
/// The category with the most matched keywords wins; ties go to the
/// category that comes first in [`Category::PRIORITY`]. Returns `None` when
/// nothing matched.
pub fn match_rules(tokens: &[String]) -> Option<KeywordMatch> {
    let best = KEYWORD_RULES
        .iter()
        .map(|rule| (rule, matched_keywords(tokens, rule.keywords)))
        .filter(|(_, matched)| !matched.is_empty())
        .min_by_key(|(rule, matched)| {
            (std::cmp::Reverse(matched.len()), rule.category.priority_rank())
        });
    let urgent = matched_keywords(tokens, URGENCY_KEYWORDS);

    let (category, tier, mut matched) = match best {
        Some((rule, matched)) => (rule.category, rule.tier, matched),
        None if !urgent.is_empty() => (Category::Other, Tier::Complex, Vec::new()),
        None => return None,
    };

    let tier = if urgent.is_empty() { tier } else { Tier::Complex };
    matched.extend(urgent);

    Some(KeywordMatch {
        category,
        tier,
        confidence: keyword_confidence(matched.len()),
        matched,
    })
}

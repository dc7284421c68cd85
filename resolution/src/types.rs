//! Data model shared by every stage of the pipeline.
//!
//! All result types are built fresh per ticket and handed to the next
//! stage by value. Only [`KnowledgeDocument`]s outlive a request, and those
//! are read-only after startup.

use serde::{Deserialize, Serialize};

use crate::text::sanitize_text;

/// An incoming support ticket, already authenticated by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Opaque identifier assigned by the ticketing backend
    pub id: String,
    pub subject: String,
    pub description: String,
}

impl Ticket {
    pub fn new(
        id: impl Into<String>,
        subject: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            description: description.into(),
        }
    }

    /// Sanitized `subject + " " + description`, used for both
    /// classification and retrieval.
    pub fn text(&self) -> String {
        sanitize_text(&format!("{} {}", self.subject, self.description))
    }

    /// True when subject and description carry no content.
    pub fn is_blank(&self) -> bool {
        self.subject.trim().is_empty() && self.description.trim().is_empty()
    }
}

/// Urgency/complexity bucket of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Auto-resolvable from the knowledge base
    #[serde(rename = "tier_1")]
    Tier1,
    /// Moderate; bot can help but a human may be needed
    #[serde(rename = "tier_2")]
    Tier2,
    /// Needs a human
    #[serde(rename = "complex")]
    Complex,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Tier1, Tier::Tier2, Tier::Complex];
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tier1 => write!(f, "tier_1"),
            Self::Tier2 => write!(f, "tier_2"),
            Self::Complex => write!(f, "complex"),
        }
    }
}

/// Subject-matter category of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Auth,
    Billing,
    Technical,
    FeatureRequest,
    Security,
    Other,
}

impl Category {
    /// Tie-break order for keyword classification, highest priority first.
    pub const PRIORITY: [Category; 6] = [
        Category::Security,
        Category::Billing,
        Category::Auth,
        Category::Technical,
        Category::FeatureRequest,
        Category::Other,
    ];

    /// Position in [`Category::PRIORITY`]; lower wins a tie.
    pub fn priority_rank(&self) -> usize {
        Self::PRIORITY
            .iter()
            .position(|c| c == self)
            .unwrap_or(Self::PRIORITY.len())
    }

    /// Agent team that owns escalations in this category.
    pub fn team(&self) -> &'static str {
        match self {
            Self::Auth => "accounts",
            Self::Billing => "billing",
            Self::Technical => "engineering",
            Self::FeatureRequest => "product",
            Self::Security => "security",
            Self::Other => "general-support",
        }
    }

    /// Human-readable label used in customer-facing text.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Auth => "account access",
            Self::Billing => "billing",
            Self::Technical => "technical",
            Self::FeatureRequest => "feature request",
            Self::Security => "security",
            Self::Other => "general",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth => write!(f, "auth"),
            Self::Billing => write!(f, "billing"),
            Self::Technical => write!(f, "technical"),
            Self::FeatureRequest => write!(f, "feature_request"),
            Self::Security => write!(f, "security"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Which classifier strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMethod {
    Model,
    Keyword,
    Default,
}

impl std::fmt::Display for ClassificationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Model => write!(f, "model"),
            Self::Keyword => write!(f, "keyword"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Output of the classifier.
///
/// `method == Default` implies `tier == Complex` and `confidence == 0.0`;
/// [`ClassificationResult::fallback`] is the only constructor producing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub tier: Tier,
    pub category: Category,
    /// In [0, 1]
    pub confidence: f64,
    pub method: ClassificationMethod,
    /// Keywords that drove a keyword classification; empty otherwise
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_keywords: Vec<String>,
}

impl ClassificationResult {
    pub fn model(tier: Tier, category: Category, probability: f64) -> Self {
        Self {
            tier,
            category,
            confidence: probability.clamp(0.0, 1.0),
            method: ClassificationMethod::Model,
            matched_keywords: Vec::new(),
        }
    }

    pub fn keyword(
        tier: Tier,
        category: Category,
        confidence: f64,
        matched_keywords: Vec<String>,
    ) -> Self {
        Self {
            tier,
            category,
            confidence: confidence.clamp(0.0, 1.0),
            method: ClassificationMethod::Keyword,
            matched_keywords,
        }
    }

    /// Conservative default: unmatched tickets go to a human.
    pub fn fallback() -> Self {
        Self {
            tier: Tier::Complex,
            category: Category::Other,
            confidence: 0.0,
            method: ClassificationMethod::Default,
            matched_keywords: Vec::new(),
        }
    }
}

/// A unit of FAQ/support content eligible for retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precomputed_embedding: Option<Vec<f32>>,
}

impl KnowledgeDocument {
    pub fn new(id: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            precomputed_embedding: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.precomputed_embedding = Some(embedding);
        self
    }

    /// Title and body as one searchable string.
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }
}

/// Which retriever strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMethod {
    Semantic,
    Keyword,
    Default,
}

impl std::fmt::Display for RetrievalMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Semantic => write!(f, "semantic"),
            Self::Keyword => write!(f, "keyword"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// A retrieved document and its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDocument {
    pub document: KnowledgeDocument,
    pub score: f64,
}

/// Non-empty list of candidates, best first.
///
/// Strategies hand one of these to the retriever, which is how the
/// "document present unless DEFAULT" invariant is kept by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking(Vec<RankedDocument>);

impl Ranking {
    /// Returns `None` for an empty list.
    pub fn new(ranked: Vec<RankedDocument>) -> Option<Self> {
        if ranked.is_empty() {
            None
        } else {
            Some(Self(ranked))
        }
    }

    pub fn best(&self) -> &RankedDocument {
        &self.0[0]
    }

    pub fn into_inner(self) -> Vec<RankedDocument> {
        self.0
    }
}

/// Output of the retriever.
///
/// `document.is_none()` iff `method == Default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub document: Option<KnowledgeDocument>,
    pub score: f64,
    pub method: RetrievalMethod,
    /// Top-K candidates, score descending, insertion order on ties
    #[serde(default)]
    pub ranked: Vec<RankedDocument>,
}

impl RetrievalResult {
    pub fn found(method: RetrievalMethod, ranking: Ranking) -> Self {
        debug_assert_ne!(method, RetrievalMethod::Default);
        let best = ranking.best();
        let document = Some(best.document.clone());
        let score = best.score;
        Self {
            document,
            score,
            method,
            ranked: ranking.into_inner(),
        }
    }

    /// Nothing relevant; the policy supplies the generic message.
    pub fn fallback() -> Self {
        Self {
            document: None,
            score: 0.0,
            method: RetrievalMethod::Default,
            ranked: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_text_joins_and_sanitizes() {
        let t = Ticket::new("1", "  Login\tissue ", "cannot\n\nsign in");
        assert_eq!(t.text(), "Login issue cannot sign in");
        assert!(!t.is_blank());
        assert!(Ticket::new("2", " ", "\n").is_blank());
    }

    #[test]
    fn test_fallback_classification_invariant() {
        let c = ClassificationResult::fallback();
        assert_eq!(c.method, ClassificationMethod::Default);
        assert_eq!(c.tier, Tier::Complex);
        assert_eq!(c.confidence, 0.0);
    }

    #[test]
    fn test_confidence_clamped() {
        let c = ClassificationResult::model(Tier::Tier1, Category::Auth, 1.7);
        assert_eq!(c.confidence, 1.0);
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(Category::Security.priority_rank(), 0);
        assert_eq!(Category::Other.priority_rank(), 5);
        assert!(Category::Billing.priority_rank() < Category::Auth.priority_rank());
        assert!(Category::Auth.priority_rank() < Category::Technical.priority_rank());
    }

    #[test]
    fn test_ranking_rejects_empty() {
        assert!(Ranking::new(Vec::new()).is_none());
    }

    #[test]
    fn test_found_mirrors_best_candidate() {
        let ranking = Ranking::new(vec![
            RankedDocument {
                document: KnowledgeDocument::new("a", "A", "alpha"),
                score: 0.9,
            },
            RankedDocument {
                document: KnowledgeDocument::new("b", "B", "beta"),
                score: 0.4,
            },
        ])
        .unwrap();
        let r = RetrievalResult::found(RetrievalMethod::Keyword, ranking);
        assert_eq!(r.document.as_ref().map(|d| d.id.as_str()), Some("a"));
        assert_eq!(r.score, 0.9);
        assert_eq!(r.ranked.len(), 2);
    }

    #[test]
    fn test_tier_serde_names() {
        assert_eq!(serde_json::to_string(&Tier::Tier1).unwrap(), "\"tier_1\"");
        assert_eq!(
            serde_json::to_string(&Category::FeatureRequest).unwrap(),
            "\"feature_request\""
        );
    }
}

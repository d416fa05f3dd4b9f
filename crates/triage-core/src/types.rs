//! Domain types shared by the classification and retrieval engines.

use serde::{Deserialize, Serialize};

/// A knowledge-base answer eligible for retrieval.
///
/// Immutable once indexed. `answer` is the text that was embedded and is
/// also the artifact returned to callers; `body` is the source ticket
/// text the answer was written for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub id: u64,
    pub answer: String,
    pub body: String,
}

/// An L2-normalized embedding paired with the document it belongs to.
///
/// Owned exclusively by the vector index; position in the index's vector
/// sequence is the lookup key into the parallel document sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedVector {
    pub document_id: u64,
    pub vector: Vec<f32>,
}

/// A raw corpus record as delivered by a rebuild source.
///
/// Records with a blank `answer` are discarded before embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    #[serde(default)]
    pub id: Option<u64>,
    pub answer: String,
    #[serde(default)]
    pub body: String,
}

/// A ranked retrieval result. Produced fresh per query, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub document_id: u64,
    pub answer: String,
    pub body: String,
    /// Cosine similarity in `[-1, 1]`.
    pub similarity_score: f32,
    /// 1-based position in the result list.
    pub rank: usize,
}

/// Which rung of the detection chain produced a language result.
///
/// Required, not cosmetic: callers use it to judge the trust level of
/// the answer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    PrimaryModel,
    SecondaryModel,
    KeywordFallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageDetection {
    pub language: String,
    pub iso_code: String,
    /// In `[0, 1]`.
    pub confidence: f64,
    pub method: DetectionMethod,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        };
        write!(f, "{s}")
    }
}

/// Fixed ticket categories, in tie-breaking declaration order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Category {
    #[serde(rename = "Technical Issue")]
    TechnicalIssue,
    #[serde(rename = "Account Problem")]
    AccountProblem,
    #[serde(rename = "Billing Question")]
    BillingQuestion,
    #[serde(rename = "Feature Request")]
    FeatureRequest,
    #[serde(rename = "General Inquiry")]
    GeneralInquiry,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Category::TechnicalIssue => "Technical Issue",
            Category::AccountProblem => "Account Problem",
            Category::BillingQuestion => "Billing Question",
            Category::FeatureRequest => "Feature Request",
            Category::GeneralInquiry => "General Inquiry",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        };
        write!(f, "{s}")
    }
}

/// Combined output of the rule-based scorers.
///
/// `confidence` is the priority confidence; `matched_keywords` lists the
/// priority keywords that fired, high tier before medium tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub priority: Priority,
    pub confidence: f64,
    pub matched_keywords: Vec<String>,
    pub category: Category,
    pub sentiment: Sentiment,
}

/// The assembled per-ticket analysis returned to the request layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketAnalysis {
    pub priority: Priority,
    pub confidence: f64,
    pub category: Category,
    pub sentiment: Sentiment,
    pub language: LanguageDetection,
    pub recommendations: Vec<Recommendation>,
    pub matched_keywords: Vec<String>,
    /// First few components of the ticket embedding, for display only.
    pub embedding_preview: Vec<f32>,
    /// Knowledge-base answers, or canned suggestions when retrieval
    /// produced nothing.
    pub suggested_articles: Vec<String>,
    pub processing_time_ms: f64,
}

/// Snapshot of the vector index, for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub vector_count: usize,
    pub dimension: usize,
    pub document_count: usize,
    pub index_path: String,
}

/// Startup state of an optional capability (model, detector, index).
///
/// Resolved once per process; `Failed` is permanent and triggers
/// fallback behavior rather than per-request retries.
#[derive(Debug, Clone)]
pub enum Capability<T> {
    Uninitialized,
    Ready(T),
    Failed(String),
}

impl<T> Capability<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Capability::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Capability::Ready(inner) => Some(inner),
            _ => None,
        }
    }
}

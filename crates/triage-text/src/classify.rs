//! Keyword-driven priority, category, and sentiment scoring.
//!
//! Three independent deterministic scorers, each a pure function of a
//! fixed keyword table over normalized (lower-cased) text. Confidence
//! formulas mirror the knowledge-base service this replaces.

use triage_core::types::{Category, Classification, Priority, Sentiment};

const HIGH_PRIORITY_KEYWORDS: &[&str] = &[
    "error",
    "failed",
    "urgent",
    "critical",
    "not working",
    "crash",
    "down",
    "issue immediately",
    "broken",
    "emergency",
    "asap",
];

const MEDIUM_PRIORITY_KEYWORDS: &[&str] = &[
    "delay",
    "problem",
    "help",
    "trouble",
    "stuck",
    "confusion",
    "question",
    "issue",
    "bug",
    "slow",
    "difficulty",
];

/// Category keyword tables, in tie-breaking declaration order.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::TechnicalIssue,
        &["error", "bug", "crash", "not working", "failed", "broken"],
    ),
    (
        Category::AccountProblem,
        &["login", "password", "account", "access", "authentication"],
    ),
    (
        Category::BillingQuestion,
        &["payment", "billing", "invoice", "charge", "refund", "cost"],
    ),
    (
        Category::FeatureRequest,
        &["feature", "enhancement", "improvement", "suggestion", "add"],
    ),
    (
        Category::GeneralInquiry,
        &["question", "information", "help", "how", "what", "where"],
    ),
];

const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "amazing",
    "wonderful",
    "perfect",
    "love",
    "like",
    "satisfied",
    "happy",
    "pleased",
    "thank",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "terrible",
    "awful",
    "hate",
    "angry",
    "frustrated",
    "disappointed",
    "annoyed",
    "upset",
    "wrong",
    "broken",
    "failed",
];

#[derive(Debug, Clone)]
pub struct PriorityScore {
    pub priority: Priority,
    pub confidence: f64,
    pub matched_keywords: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CategoryScore {
    pub category: Category,
    pub confidence: f64,
}

#[derive(Debug, Clone)]
pub struct SentimentScore {
    pub sentiment: Sentiment,
    pub confidence: f64,
    /// Every positive or negative word that occurred, positives first.
    pub indicators: Vec<String>,
}

fn matches_in(text: &str, table: &[&str]) -> Vec<String> {
    table
        .iter()
        .filter(|kw| text.contains(*kw))
        .map(|kw| (*kw).to_string())
        .collect()
}

/// Stateless facade over the three scorers.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleClassifier;

impl RuleClassifier {
    pub fn new() -> Self {
        Self
    }

    /// High-priority keywords win outright; the medium tier is only
    /// consulted when no high keyword fired. No keyword evidence is
    /// needed for the Low default.
    pub fn priority(&self, text: &str) -> PriorityScore {
        let high = matches_in(text, HIGH_PRIORITY_KEYWORDS);
        let medium = matches_in(text, MEDIUM_PRIORITY_KEYWORDS);

        let (priority, confidence) = if !high.is_empty() {
            (Priority::High, (0.7 + high.len() as f64 * 0.05).min(0.95))
        } else if !medium.is_empty() {
            (Priority::Medium, (0.6 + medium.len() as f64 * 0.05).min(0.9))
        } else {
            (Priority::Low, 0.7)
        };

        let mut matched_keywords = high;
        matched_keywords.extend(medium);
        PriorityScore {
            priority,
            confidence,
            matched_keywords,
        }
    }

    /// Arg-max keyword count over the category table; ties go to the
    /// earlier declaration.
    pub fn category(&self, text: &str) -> CategoryScore {
        let mut best: Option<(Category, usize)> = None;
        for (category, keywords) in CATEGORY_KEYWORDS {
            let score = keywords.iter().filter(|kw| text.contains(*kw)).count();
            if score == 0 {
                continue;
            }
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((*category, score)),
            }
        }
        match best {
            Some((category, score)) => CategoryScore {
                category,
                confidence: (0.5 + score as f64 * 0.1).min(0.9),
            },
            None => CategoryScore {
                category: Category::GeneralInquiry,
                confidence: 0.5,
            },
        }
    }

    /// Strict-majority vote between the positive and negative word
    /// lists; equal counts (including 0-0) are neutral.
    pub fn sentiment(&self, text: &str) -> SentimentScore {
        let positive = matches_in(text, POSITIVE_WORDS);
        let negative = matches_in(text, NEGATIVE_WORDS);

        let (sentiment, confidence) = if positive.len() > negative.len() {
            (
                Sentiment::Positive,
                (0.5 + positive.len() as f64 * 0.1).min(0.9),
            )
        } else if negative.len() > positive.len() {
            (
                Sentiment::Negative,
                (0.5 + negative.len() as f64 * 0.1).min(0.9),
            )
        } else {
            (Sentiment::Neutral, 0.5)
        };

        let mut indicators = positive;
        indicators.extend(negative);
        SentimentScore {
            sentiment,
            confidence,
            indicators,
        }
    }
}

/// Run all three scorers over already-normalized text.
///
/// The combined `confidence` is the priority confidence, matching the
/// contract of the original analysis endpoint.
pub fn classify(text: &str) -> Classification {
    let classifier = RuleClassifier::new();
    let priority = classifier.priority(text);
    let category = classifier.category(text);
    let sentiment = classifier.sentiment(text);
    Classification {
        priority: priority.priority,
        confidence: priority.confidence,
        matched_keywords: priority.matched_keywords,
        category: category.category,
        sentiment: sentiment.sentiment,
    }
}

//! Deterministic text stages of the ticket pipeline: normalization,
//! rule-based classification, and the language detection chain.

pub mod classify;
pub mod language;
pub mod normalize;

pub use classify::{classify, RuleClassifier};
pub use language::{keyword_fallback, LanguageDetector};
pub use normalize::{extract_keywords, normalize};

//! Language detection as an ordered chain of fallback strategies.
//!
//! Primary: a statistical classifier over subword features (lingua).
//! Secondary: a lightweight general-purpose identifier (whatlang).
//! Terminal: function-word counting over a fixed candidate set, which
//! always succeeds. Strategy availability is resolved once at
//! construction; failures cascade silently through the chain and are
//! never surfaced as errors.

use lingua::{Language, LanguageDetector as LinguaDetector, LanguageDetectorBuilder};
use tracing::debug;
use triage_core::types::{Capability, DetectionMethod, LanguageDetection};

/// One rung of the detection chain, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    PrimaryModel,
    SecondaryModel,
    KeywordFallback,
}

/// Languages the chain can name, as `(iso 639-1, display name)`.
/// Codes outside this table pass through with an upper-cased name.
const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("en", "English"),
    ("de", "German"),
    ("fr", "French"),
    ("es", "Spanish"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("zh", "Chinese"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
    ("nl", "Dutch"),
    ("sv", "Swedish"),
    ("pl", "Polish"),
    ("tr", "Turkish"),
];

fn language_name(code: &str) -> String {
    LANGUAGE_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map_or_else(|| code.to_uppercase(), |(_, name)| (*name).to_string())
}

fn lingua_iso_code(language: Language) -> &'static str {
    match language {
        Language::English => "en",
        Language::German => "de",
        Language::French => "fr",
        Language::Spanish => "es",
        Language::Italian => "it",
        Language::Portuguese => "pt",
        Language::Russian => "ru",
        Language::Chinese => "zh",
        Language::Japanese => "ja",
        Language::Korean => "ko",
        Language::Arabic => "ar",
        Language::Hindi => "hi",
        Language::Dutch => "nl",
        Language::Swedish => "sv",
        Language::Polish => "pl",
        Language::Turkish => "tr",
    }
}

/// Map whatlang's ISO 639-3 codes onto the 639-1 codes the rest of the
/// pipeline reports. Unknown codes pass through unchanged.
fn whatlang_iso_code(code: &str) -> &str {
    match code {
        "eng" => "en",
        "deu" => "de",
        "fra" => "fr",
        "spa" => "es",
        "ita" => "it",
        "por" => "pt",
        "rus" => "ru",
        "cmn" => "zh",
        "jpn" => "ja",
        "kor" => "ko",
        "ara" => "ar",
        "hin" => "hi",
        "nld" => "nl",
        "swe" => "sv",
        "pol" => "pl",
        "tur" => "tr",
        other => other,
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

pub struct LanguageDetector {
    primary: Capability<LinguaDetector>,
    secondary_available: bool,
}

impl LanguageDetector {
    /// Build the chain, loading the primary statistical model.
    ///
    /// Model construction is CPU-heavy; callers that must stay
    /// responsive should run this on the background init task.
    pub fn new() -> Self {
        let languages: Vec<Language> = vec![
            Language::English,
            Language::German,
            Language::French,
            Language::Spanish,
            Language::Italian,
            Language::Portuguese,
            Language::Russian,
            Language::Chinese,
            Language::Japanese,
            Language::Korean,
            Language::Arabic,
            Language::Hindi,
            Language::Dutch,
            Language::Swedish,
            Language::Polish,
            Language::Turkish,
        ];
        let detector = LanguageDetectorBuilder::from_languages(&languages).build();
        Self {
            primary: Capability::Ready(detector),
            secondary_available: true,
        }
    }

    /// A chain with every model strategy disabled; only the keyword
    /// fallback runs. Used when model init failed and in tests.
    pub fn without_models(reason: &str) -> Self {
        Self {
            primary: Capability::Failed(reason.to_string()),
            secondary_available: false,
        }
    }

    fn chain(&self, prefer_secondary: bool) -> [Strategy; 3] {
        if prefer_secondary {
            [
                Strategy::SecondaryModel,
                Strategy::PrimaryModel,
                Strategy::KeywordFallback,
            ]
        } else {
            [
                Strategy::PrimaryModel,
                Strategy::SecondaryModel,
                Strategy::KeywordFallback,
            ]
        }
    }

    /// Detect the language of `text`, cascading through the strategy
    /// chain. Never fails: the terminal fallback always produces a
    /// result, and blank text short-circuits to English at zero
    /// confidence.
    pub fn detect(&self, text: &str, prefer_secondary: bool) -> LanguageDetection {
        if text.trim().is_empty() {
            return LanguageDetection {
                language: "English".to_string(),
                iso_code: "en".to_string(),
                confidence: 0.0,
                method: DetectionMethod::KeywordFallback,
            };
        }

        for strategy in self.chain(prefer_secondary) {
            let result = match strategy {
                Strategy::PrimaryModel => self.try_primary(text),
                Strategy::SecondaryModel => self.try_secondary(text),
                Strategy::KeywordFallback => Some(keyword_fallback(text)),
            };
            if let Some(detection) = result {
                return detection;
            }
            debug!(?strategy, "language strategy produced no answer, cascading");
        }
        // The chain ends in the infallible keyword rung.
        keyword_fallback(text)
    }

    fn try_primary(&self, text: &str) -> Option<LanguageDetection> {
        let detector = self.primary.ready()?;
        if text.split_whitespace().next().is_none() {
            return None;
        }
        let (language, confidence) = detector
            .compute_language_confidence_values(text)
            .into_iter()
            .next()?;
        if confidence <= 0.0 {
            return None;
        }
        let iso_code = lingua_iso_code(language);
        Some(LanguageDetection {
            language: language_name(iso_code),
            iso_code: iso_code.to_string(),
            confidence: round4(confidence),
            method: DetectionMethod::PrimaryModel,
        })
    }

    fn try_secondary(&self, text: &str) -> Option<LanguageDetection> {
        if !self.secondary_available || text.split_whitespace().count() < 2 {
            return None;
        }
        let info = whatlang::detect(text)?;
        let iso_code = whatlang_iso_code(info.lang().code()).to_string();
        Some(LanguageDetection {
            language: language_name(&iso_code),
            iso_code,
            confidence: round4(info.confidence()),
            method: DetectionMethod::SecondaryModel,
        })
    }
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new()
    }
}

const GERMAN_WORDS: &[&str] = &["der", "die", "das", "und", "ist", "für", "mit", "zu"];
const FRENCH_WORDS: &[&str] = &["le", "la", "les", "et", "est", "pour", "avec", "de"];
const SPANISH_WORDS: &[&str] = &["el", "la", "los", "y", "es", "para", "con", "de"];

// Presence counting, not token matching: "le" inside a longer word
// still counts. Crude, but this rung only runs when both statistical
// models are gone and the bias it introduces is stable and testable.
fn count_function_words(text: &str, words: &[&str]) -> usize {
    words.iter().filter(|word| text.contains(*word)).count()
}

/// Terminal detection rung: count candidate-language function words and
/// take the strict majority, defaulting to English on a tie or zero
/// matches. Always succeeds.
pub fn keyword_fallback(text: &str) -> LanguageDetection {
    let lower = text.to_lowercase();
    let german = count_function_words(&lower, GERMAN_WORDS);
    let french = count_function_words(&lower, FRENCH_WORDS);
    let spanish = count_function_words(&lower, SPANISH_WORDS);

    let (code, count) = if german > french && german > spanish {
        ("de", german)
    } else if french > spanish {
        ("fr", french)
    } else if spanish > 0 {
        ("es", spanish)
    } else {
        ("en", 0)
    };

    let confidence = if code == "en" {
        0.6
    } else {
        (0.5 + count as f64 * 0.05).min(0.7)
    };

    LanguageDetection {
        language: language_name(code),
        iso_code: code.to_string(),
        confidence,
        method: DetectionMethod::KeywordFallback,
    }
}

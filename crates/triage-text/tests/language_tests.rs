use triage_core::types::DetectionMethod;
use triage_text::{keyword_fallback, LanguageDetector};

#[test]
fn blank_text_short_circuits_to_english_at_zero_confidence() {
    let detector = LanguageDetector::without_models("disabled for test");
    let detection = detector.detect("   ", false);
    assert_eq!(detection.iso_code, "en");
    assert_eq!(detection.language, "English");
    assert_eq!(detection.confidence, 0.0);
    assert_eq!(detection.method, DetectionMethod::KeywordFallback);
}

#[test]
fn primary_model_detects_plain_english() {
    let detector = LanguageDetector::new();
    let detection = detector.detect("please reset my password, the login page keeps failing", false);
    assert_eq!(detection.iso_code, "en");
    assert_eq!(detection.language, "English");
    assert_eq!(detection.method, DetectionMethod::PrimaryModel);
    assert!(detection.confidence > 0.0);
}

#[test]
fn disabled_models_cascade_to_keyword_fallback() {
    let detector = LanguageDetector::without_models("disabled for test");
    let detection = detector.detect("die Anwendung ist kaputt und das Update für den Server fehlt", false);
    assert_eq!(detection.method, DetectionMethod::KeywordFallback);
    assert_eq!(detection.iso_code, "de");
    assert_eq!(detection.language, "German");
}

#[test]
fn keyword_fallback_defaults_to_english() {
    // No candidate function word occurs, even as a substring.
    let detection = keyword_fallback("fix it now");
    assert_eq!(detection.iso_code, "en");
    assert!((detection.confidence - 0.6).abs() < 1e-9);
    assert_eq!(detection.method, DetectionMethod::KeywordFallback);
}

#[test]
fn keyword_fallback_confidence_scales_with_matches_and_caps() {
    let detection = keyword_fallback("der die das und ist für mit zu");
    assert_eq!(detection.iso_code, "de");
    // Eight function words would score 0.9 uncapped.
    assert!((detection.confidence - 0.7).abs() < 1e-9);
}

#[test]
fn fallback_language_detection_never_fails_on_noise() {
    let detector = LanguageDetector::without_models("disabled for test");
    let detection = detector.detect("@@@@ 1234 ????", false);
    assert_eq!(detection.method, DetectionMethod::KeywordFallback);
    assert!(!detection.iso_code.is_empty());
}

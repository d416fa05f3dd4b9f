use triage_core::types::{Category, Priority, Sentiment};
use triage_text::{classify, normalize, RuleClassifier};

#[test]
fn urgent_crash_is_high_priority_with_both_keywords() {
    let classifier = RuleClassifier::new();
    let score = classifier.priority("urgent, the app will crash on startup");
    assert_eq!(score.priority, Priority::High);
    assert!((score.confidence - 0.8).abs() < 1e-9);
    assert_eq!(score.matched_keywords, vec!["urgent", "crash"]);
}

#[test]
fn medium_tier_only_fires_without_high_keywords() {
    let classifier = RuleClassifier::new();
    let score = classifier.priority("i have a question about a slow page");
    assert_eq!(score.priority, Priority::Medium);
    assert!((score.confidence - 0.7).abs() < 1e-9);

    // A single high keyword overrides any number of medium matches.
    let score = classifier.priority("question about a slow, stuck, broken page");
    assert_eq!(score.priority, Priority::High);
}

#[test]
fn no_keywords_defaults_to_low_priority() {
    let score = RuleClassifier::new().priority("please update my shipping address");
    assert_eq!(score.priority, Priority::Low);
    assert!((score.confidence - 0.7).abs() < 1e-9);
    assert!(score.matched_keywords.is_empty());
}

#[test]
fn high_priority_confidence_is_capped() {
    let score = RuleClassifier::new()
        .priority("error failed urgent critical crash down broken emergency asap");
    assert_eq!(score.priority, Priority::High);
    assert!((score.confidence - 0.95).abs() < 1e-9);
}

#[test]
fn login_password_maps_to_account_problem() {
    let score = RuleClassifier::new().category("i forgot my login password");
    assert_eq!(score.category, Category::AccountProblem);
    assert!((score.confidence - 0.7).abs() < 1e-9);
}

#[test]
fn category_ties_resolve_to_earlier_table_entry() {
    // One technical keyword, one account keyword: technical is declared
    // first and keeps the tie.
    let score = RuleClassifier::new().category("the login shows an error");
    assert_eq!(score.category, Category::TechnicalIssue);
}

#[test]
fn no_category_keywords_is_general_inquiry() {
    let score = RuleClassifier::new().category("see attached screenshot");
    assert_eq!(score.category, Category::GeneralInquiry);
    assert!((score.confidence - 0.5).abs() < 1e-9);
}

#[test]
fn gratitude_is_positive_sentiment() {
    let score = RuleClassifier::new().sentiment(&normalize("This is great, thank you!"));
    assert_eq!(score.sentiment, Sentiment::Positive);
    assert!((score.confidence - 0.7).abs() < 1e-9);
    assert_eq!(score.indicators, vec!["great", "thank"]);
}

#[test]
fn balanced_or_absent_sentiment_words_are_neutral() {
    let classifier = RuleClassifier::new();
    let score = classifier.sentiment("the export finished overnight");
    assert_eq!(score.sentiment, Sentiment::Neutral);
    assert!((score.confidence - 0.5).abs() < 1e-9);

    // One positive and one negative word cancel out.
    let score = classifier.sentiment("great app but a terrible upgrade");
    assert_eq!(score.sentiment, Sentiment::Neutral);
}

#[test]
fn classify_combines_scorers_and_reports_priority_confidence() {
    let result = classify(&normalize("URGENT: payment page is broken and I am frustrated"));
    assert_eq!(result.priority, Priority::High);
    assert_eq!(result.category, Category::TechnicalIssue);
    assert_eq!(result.sentiment, Sentiment::Negative);
    // "urgent" and "broken" matched the high tier.
    assert!((result.confidence - 0.8).abs() < 1e-9);
    assert!(result.matched_keywords.contains(&"urgent".to_string()));
    assert!(result.matched_keywords.contains(&"broken".to_string()));
}

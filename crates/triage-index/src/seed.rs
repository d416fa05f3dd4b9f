//! Built-in seed corpus.
//!
//! The terminal fallback for index builds: when the configured rebuild
//! source fails or yields nothing usable, these articles keep the
//! service answering instead of running indexless.

use triage_core::types::SourceDocument;

pub fn seed_documents() -> Vec<SourceDocument> {
    vec![
        SourceDocument {
            id: Some(1),
            answer: "To reset your password, go to the login page and click \"Forgot Password\". \
                     Enter your email address and check your inbox for reset instructions."
                .to_string(),
            body: "I forgot my password".to_string(),
        },
        SourceDocument {
            id: Some(2),
            answer: "Payment issues can be resolved by checking your payment method in account \
                     settings. Ensure your card is not expired and has sufficient funds."
                .to_string(),
            body: "My payment failed".to_string(),
        },
        SourceDocument {
            id: Some(3),
            answer: "If you cannot log in, try clearing your browser cache and cookies. If the \
                     problem persists, contact support with your account email."
                .to_string(),
            body: "Unable to login".to_string(),
        },
        SourceDocument {
            id: Some(4),
            answer: "To update your account information, navigate to Settings > Account and make \
                     the necessary changes. Changes take effect immediately."
                .to_string(),
            body: "How do I update my account?".to_string(),
        },
        SourceDocument {
            id: Some(5),
            answer: "For subscription cancellation, go to Billing > Subscription and click \
                     Cancel. Your subscription will remain active until the end of the billing \
                     period."
                .to_string(),
            body: "I want to cancel my subscription".to_string(),
        },
    ]
}

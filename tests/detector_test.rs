use phish_detect::*;

/// Classifier that must never be consulted
struct Unreachable;

impl Classifier for Unreachable {
    fn predict_proba(&self, _features: &FeatureVector) -> [f64; 2] {
        panic!("classifier should not be called");
    }
}

/// Classifier returning fixed probabilities
struct Fixed([f64; 2]);

impl Classifier for Fixed {
    fn predict_proba(&self, _features: &FeatureVector) -> [f64; 2] {
        self.0
    }
}

const PHISHING_EMAIL: &str = "From: security@phish.example.com\r\n\
                              To: victim@example.com\r\n\
                              Subject: Urgent: verify your account\r\n\
                              \r\n\
                              please verify your account at http://phish.example.com now!";

const BENIGN_EMAIL: &str = "From: alice@example.com\r\n\
                            To: team@example.com\r\n\
                            Subject: Lunch\r\n\
                            \r\n\
                            Hi team, lunch is at noon tomorrow.";

#[test]
fn test_empty_input_short_circuits() {
    let report = check_email("", &Unreachable);

    assert_eq!(report, Report::Empty);
    assert!(report.prediction().is_none());
    assert_eq!(report.to_string(), EMPTY_INPUT_WARNING);
}

#[test]
fn test_whitespace_input_is_classified() {
    let report = check_email("  \r\n\t ", &Fixed([0.8, 0.2]));

    assert!(matches!(report, Report::Verdict { .. }));
    assert_eq!(report.prediction().unwrap().label, Label::Safe);
}

#[test]
fn test_phishing_verdict_rendering() {
    let report = check_email(PHISHING_EMAIL, &Fixed([0.0275, 0.9725]));

    assert_eq!(
        report.to_string(),
        "This email is likely a **Phishing** attempt.\nConfidence: 97.25%"
    );
}

#[test]
fn test_safe_verdict_rendering() {
    let report = check_email(BENIGN_EMAIL, &Fixed([0.8, 0.2]));

    assert_eq!(
        report.to_string(),
        "This email appears to be **Safe**.\nConfidence: 80.00%"
    );
}

#[test]
fn test_verdict_carries_parsed_email_and_features() {
    let report = check_email(PHISHING_EMAIL, &Fixed([0.5, 0.5]));

    let Report::Verdict {
        parsed, features, ..
    } = report
    else {
        panic!("expected a verdict");
    };
    assert_eq!(parsed.subject.as_deref(), Some("Urgent: verify your account"));
    assert_eq!(features.url_count, 1);
    assert_eq!(features.special_char_count, 1);
    assert_eq!(features.suspicious_keyword_count, 2);
}

#[test]
fn test_shipped_model_flags_phishing_email() {
    let model = shared_model().unwrap();
    let report = check_email(PHISHING_EMAIL, model);

    let prediction = report.prediction().unwrap();
    assert_eq!(prediction.label, Label::Phishing);
    assert_eq!(prediction.confidence_percent(), "68.09%");
}

#[test]
fn test_shipped_model_passes_benign_email() {
    let model = shared_model().unwrap();
    let report = check_email(BENIGN_EMAIL, model);

    let prediction = report.prediction().unwrap();
    assert_eq!(prediction.label, Label::Safe);
    assert_eq!(prediction.confidence_percent(), "85.01%");
}

#[test]
fn test_classification_is_deterministic() {
    let model = shared_model().unwrap();

    let first = check_email(PHISHING_EMAIL, model);
    let second = check_email(PHISHING_EMAIL, model);

    assert_eq!(first, second);
}

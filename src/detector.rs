//! End-to-end check of pasted email text

use crate::model::Classifier;
use crate::parser::parse_email;
use crate::types::{FeatureVector, ParsedEmail, PredictionResult};
use std::fmt;
use tracing::info;

/// Shown instead of a verdict when no email text was supplied
pub const EMPTY_INPUT_WARNING: &str = "Please paste some email content to check.";

/// Outcome of checking one pasted email
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// Input was empty; nothing was classified
    Empty,

    /// Input was parsed and classified
    Verdict {
        parsed: ParsedEmail,
        features: FeatureVector,
        prediction: PredictionResult,
    },
}

impl Report {
    #[must_use]
    pub const fn prediction(&self) -> Option<&PredictionResult> {
        match self {
            Self::Empty => None,
            Self::Verdict { prediction, .. } => Some(prediction),
        }
    }

    /// Headline for the verdict, or the empty-input warning
    #[must_use]
    pub fn banner(&self) -> &'static str {
        match self.prediction() {
            None => EMPTY_INPUT_WARNING,
            Some(prediction) if prediction.is_phishing() => {
                "This email is likely a **Phishing** attempt."
            }
            Some(_) => "This email appears to be **Safe**.",
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prediction() {
            None => write!(f, "{}", self.banner()),
            Some(prediction) => write!(
                f,
                "{}\nConfidence: {}",
                self.banner(),
                prediction.confidence_percent()
            ),
        }
    }
}

/// Parse, extract features and classify raw email text
///
/// Only the empty string short-circuits to [`Report::Empty`]; whitespace is
/// still classified.
pub fn check_email<C: Classifier + ?Sized>(raw: &str, classifier: &C) -> Report {
    if raw.is_empty() {
        return Report::Empty;
    }

    let parsed = parse_email(raw);
    let features = FeatureVector::extract(&parsed);
    let prediction = classifier.classify(&features);

    info!("Classified email as {prediction}");

    Report::Verdict {
        parsed,
        features,
        prediction,
    }
}
